//! OpenFlow Extensible Match (OXM) entries and the `ofp_match` container that carries them.

use byteorder::{BigEndian, WriteBytesExt};

use crate::bits::{bit, test_bit};
use crate::ofp_header::TlvHeader;
use crate::ofp_list::{marshal_list, parse_list, size_of_list, ListItem};
use crate::ofp_message::OfpSerializationError;
use crate::ofp_utils::{len_u16, pad_len, pad_to_8, write_padding_bytes, OfpReader};

/// The only OXM class this codec understands.
pub const OFPXMC_OPENFLOW_BASIC: u16 = 0x8000;

/// Match type of an OXM match structure. The 1.0 style standard match (0) is not carried by
/// OpenFlow 1.3 messages.
const OFPMT_OXM: u16 = 1;

/// OXM header size: class, field/has-mask, length.
const OXM_HEADER_LEN: usize = 4;

/// OpenFlow basic match fields, numbered as on the wire.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum OxmField {
    InPort = 0,
    InPhyPort = 1,
    Metadata = 2,
    EthDst = 3,
    EthSrc = 4,
    EthType = 5,
    VlanVid = 6,
    VlanPcp = 7,
    IpDscp = 8,
    IpEcn = 9,
    IpProto = 10,
    Ipv4Src = 11,
    Ipv4Dst = 12,
    TcpSrc = 13,
    TcpDst = 14,
    UdpSrc = 15,
    UdpDst = 16,
    SctpSrc = 17,
    SctpDst = 18,
    Icmpv4Type = 19,
    Icmpv4Code = 20,
    ArpOp = 21,
    ArpSpa = 22,
    ArpTpa = 23,
    ArpSha = 24,
    ArpTha = 25,
    Ipv6Src = 26,
    Ipv6Dst = 27,
    Ipv6Flabel = 28,
    Icmpv6Type = 29,
    Icmpv6Code = 30,
    Ipv6NdTarget = 31,
    Ipv6NdSll = 32,
    Ipv6NdTll = 33,
    MplsLabel = 34,
    MplsTc = 35,
    MplsBos = 36,
    PbbIsid = 37,
    TunnelId = 38,
    Ipv6Exthdr = 39,
}

impl OxmField {
    /// Every basic field, in wire order.
    pub const ALL: [OxmField; 40] = [OxmField::InPort,
                                     OxmField::InPhyPort,
                                     OxmField::Metadata,
                                     OxmField::EthDst,
                                     OxmField::EthSrc,
                                     OxmField::EthType,
                                     OxmField::VlanVid,
                                     OxmField::VlanPcp,
                                     OxmField::IpDscp,
                                     OxmField::IpEcn,
                                     OxmField::IpProto,
                                     OxmField::Ipv4Src,
                                     OxmField::Ipv4Dst,
                                     OxmField::TcpSrc,
                                     OxmField::TcpDst,
                                     OxmField::UdpSrc,
                                     OxmField::UdpDst,
                                     OxmField::SctpSrc,
                                     OxmField::SctpDst,
                                     OxmField::Icmpv4Type,
                                     OxmField::Icmpv4Code,
                                     OxmField::ArpOp,
                                     OxmField::ArpSpa,
                                     OxmField::ArpTpa,
                                     OxmField::ArpSha,
                                     OxmField::ArpTha,
                                     OxmField::Ipv6Src,
                                     OxmField::Ipv6Dst,
                                     OxmField::Ipv6Flabel,
                                     OxmField::Icmpv6Type,
                                     OxmField::Icmpv6Code,
                                     OxmField::Ipv6NdTarget,
                                     OxmField::Ipv6NdSll,
                                     OxmField::Ipv6NdTll,
                                     OxmField::MplsLabel,
                                     OxmField::MplsTc,
                                     OxmField::MplsBos,
                                     OxmField::PbbIsid,
                                     OxmField::TunnelId,
                                     OxmField::Ipv6Exthdr];

    pub fn of_int(code: u8) -> Option<OxmField> {
        OxmField::ALL.get(code as usize).copied()
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Width in bytes of the field's value (and of its mask, when present).
    pub fn value_len(self) -> usize {
        match self {
            OxmField::VlanPcp | OxmField::IpDscp | OxmField::IpEcn | OxmField::IpProto |
            OxmField::Icmpv4Type | OxmField::Icmpv4Code | OxmField::Icmpv6Type |
            OxmField::Icmpv6Code | OxmField::MplsTc | OxmField::MplsBos => 1,
            OxmField::EthType | OxmField::VlanVid | OxmField::TcpSrc | OxmField::TcpDst |
            OxmField::UdpSrc | OxmField::UdpDst | OxmField::SctpSrc | OxmField::SctpDst |
            OxmField::ArpOp | OxmField::Ipv6Exthdr => 2,
            OxmField::PbbIsid => 3,
            OxmField::InPort | OxmField::InPhyPort | OxmField::Ipv4Src | OxmField::Ipv4Dst |
            OxmField::ArpSpa | OxmField::ArpTpa | OxmField::Ipv6Flabel | OxmField::MplsLabel => 4,
            OxmField::EthDst | OxmField::EthSrc | OxmField::ArpSha | OxmField::ArpTha |
            OxmField::Ipv6NdSll | OxmField::Ipv6NdTll => 6,
            OxmField::Metadata | OxmField::TunnelId => 8,
            OxmField::Ipv6Src | OxmField::Ipv6Dst | OxmField::Ipv6NdTarget => 16,
        }
    }
}

/// A single match criterion: one header field, its value, and an optional mask of the same
/// width.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Oxm {
    pub field: OxmField,
    pub value: Vec<u8>,
    pub mask: Option<Vec<u8>>,
}

impl Oxm {
    pub fn new(field: OxmField, value: &[u8]) -> Oxm {
        Oxm {
            field,
            value: value.to_vec(),
            mask: None,
        }
    }

    pub fn masked(field: OxmField, value: &[u8], mask: &[u8]) -> Oxm {
        Oxm {
            field,
            value: value.to_vec(),
            mask: Some(mask.to_vec()),
        }
    }

    /// Build an entry for an integer-valued field, keeping the low `value_len` bytes.
    pub fn of_uint(field: OxmField, value: u64) -> Oxm {
        Oxm::new(field, &Oxm::uint_bytes(field, value))
    }

    pub fn of_uint_masked(field: OxmField, value: u64, mask: u64) -> Oxm {
        Oxm::masked(field,
                    &Oxm::uint_bytes(field, value),
                    &Oxm::uint_bytes(field, mask))
    }

    fn uint_bytes(field: OxmField, v: u64) -> Vec<u8> {
        let n = field.value_len().min(8);
        v.to_be_bytes()[8 - n..].to_vec()
    }

    pub fn in_port(port: u32) -> Oxm {
        Oxm::of_uint(OxmField::InPort, port as u64)
    }

    pub fn in_port_masked(port: u32, mask: u32) -> Oxm {
        Oxm::of_uint_masked(OxmField::InPort, port as u64, mask as u64)
    }

    pub fn in_phy_port(port: u32) -> Oxm {
        Oxm::of_uint(OxmField::InPhyPort, port as u64)
    }

    pub fn in_phy_port_masked(port: u32, mask: u32) -> Oxm {
        Oxm::of_uint_masked(OxmField::InPhyPort, port as u64, mask as u64)
    }

    pub fn metadata_masked(metadata: u64, mask: u64) -> Oxm {
        Oxm::of_uint_masked(OxmField::Metadata, metadata, mask)
    }

    pub fn eth_dst(addr: [u8; 6]) -> Oxm {
        Oxm::new(OxmField::EthDst, &addr)
    }

    pub fn eth_src(addr: [u8; 6]) -> Oxm {
        Oxm::new(OxmField::EthSrc, &addr)
    }

    pub fn eth_type(typ: u16) -> Oxm {
        Oxm::of_uint(OxmField::EthType, typ as u64)
    }

    pub fn vlan_vid(vid: u16) -> Oxm {
        Oxm::of_uint(OxmField::VlanVid, vid as u64)
    }

    pub fn ip_proto(proto: u8) -> Oxm {
        Oxm::of_uint(OxmField::IpProto, proto as u64)
    }

    pub fn ipv4_src(addr: u32) -> Oxm {
        Oxm::of_uint(OxmField::Ipv4Src, addr as u64)
    }

    pub fn ipv4_dst_masked(addr: u32, mask: u32) -> Oxm {
        Oxm::of_uint_masked(OxmField::Ipv4Dst, addr as u64, mask as u64)
    }

    pub fn tcp_dst(port: u16) -> Oxm {
        Oxm::of_uint(OxmField::TcpDst, port as u64)
    }

    pub fn arp_op(op: u16) -> Oxm {
        Oxm::of_uint(OxmField::ArpOp, op as u64)
    }

    pub fn ipv6_dst(addr: [u8; 16]) -> Oxm {
        Oxm::new(OxmField::Ipv6Dst, &addr)
    }

    pub fn tunnel_id(id: u64) -> Oxm {
        Oxm::of_uint(OxmField::TunnelId, id)
    }

    /// The value of an integer-valued field, `None` for fields wider than 64 bits.
    pub fn value_as_u64(&self) -> Option<u64> {
        if self.value.len() > 8 {
            None
        } else {
            Some(self.value.iter().fold(0, |acc, b| (acc << 8) | *b as u64))
        }
    }

    /// Length of value plus mask, as written in the header's length byte.
    fn payload_len(&self) -> usize {
        self.value.len() + self.mask.as_ref().map_or(0, |m| m.len())
    }

    /// The 32-bit OXM header of this entry, as it also appears in table-feature match lists.
    pub fn header(&self) -> u32 {
        let field_and_mask = bit(0, (self.field.code() as u64) << 1, self.mask.is_some());
        ((OFPXMC_OPENFLOW_BASIC as u32) << 16) | ((field_and_mask as u32) << 8) |
        self.payload_len() as u32
    }

    fn check(oxm: &Oxm) -> Result<(), OfpSerializationError> {
        let width = oxm.field.value_len();
        if oxm.value.len() != width {
            return Err(OfpSerializationError::invalid("oxm value length",
                                                      format!("{} for {:?} (expected {})",
                                                              oxm.value.len(),
                                                              oxm.field,
                                                              width)));
        }
        match oxm.mask {
            Some(ref mask) if mask.len() != width => {
                Err(OfpSerializationError::invalid("oxm mask length",
                                                   format!("{} for {:?} (expected {})",
                                                           mask.len(),
                                                           oxm.field,
                                                           width)))
            }
            _ => Ok(()),
        }
    }
}

impl ListItem for Oxm {
    const WHAT: &'static str = "oxm";
    const MIN_LEN: usize = OXM_HEADER_LEN;

    fn wire_len(head: &[u8]) -> usize {
        OXM_HEADER_LEN + head[3] as usize
    }

    fn size_of(oxm: &Oxm) -> usize {
        OXM_HEADER_LEN + oxm.payload_len()
    }

    fn parse(bytes: &mut OfpReader) -> Result<Option<Oxm>, OfpSerializationError> {
        let class = bytes.read_u16()?;
        let field_and_mask = bytes.read_u8()?;
        let len = bytes.read_u8()? as usize;
        let code = field_and_mask >> 1;
        if class != OFPXMC_OPENFLOW_BASIC {
            return Err(OfpSerializationError::UnsupportedMatchField { class, field: code });
        }
        let field = OxmField::of_int(code)
            .ok_or(OfpSerializationError::UnsupportedMatchField { class, field: code })?;
        let has_mask = test_bit(0, field_and_mask as u64);
        let width = field.value_len();
        let expected = if has_mask { 2 * width } else { width };
        if len != expected {
            return Err(OfpSerializationError::invalid("oxm length",
                                                      format!("{} for {:?} (expected {})",
                                                              len,
                                                              field,
                                                              expected)));
        }
        let value = bytes.read_bytes(width)?;
        let mask = if has_mask {
            Some(bytes.read_bytes(width)?)
        } else {
            None
        };
        Ok(Some(Oxm { field, value, mask }))
    }

    fn marshal(oxm: &Oxm, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        Oxm::check(oxm)?;
        bytes.write_u32::<BigEndian>(oxm.header())?;
        bytes.extend_from_slice(&oxm.value);
        if let Some(ref mask) = oxm.mask {
            bytes.extend_from_slice(mask);
        }
        Ok(())
    }
}

/// Fields to match against flows: an ordered list of OXM entries.
///
/// On the wire the entries follow a `(type, length)` header and are zero padded to a multiple
/// of 8 bytes. The padding is not counted by `length`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Match {
    pub oxm_list: Vec<Oxm>,
}

impl Match {
    pub fn new(oxm_list: Vec<Oxm>) -> Match {
        Match { oxm_list }
    }

    /// A match with no criteria, matching every packet.
    pub fn match_all() -> Match {
        Match { oxm_list: vec![] }
    }

    /// Value of the match `length` field: header plus entries, without padding.
    fn length(m: &Match) -> usize {
        TlvHeader::size() + size_of_list(&m.oxm_list)
    }

    /// Return the byte-size of a match on the wire, padding included.
    pub fn size_of(m: &Match) -> usize {
        pad_to_8(Match::length(m))
    }

    pub fn parse(bytes: &mut OfpReader) -> Result<Match, OfpSerializationError> {
        let header = TlvHeader::parse(bytes, "match", TlvHeader::size())?;
        if header.typ != OFPMT_OXM {
            return Err(OfpSerializationError::invalid("match type", header.typ));
        }
        let oxm_list = parse_list(bytes, header.body_len())?;
        bytes.skip(pad_len(header.length as usize))?;
        Ok(Match { oxm_list })
    }

    pub fn marshal(m: &Match, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        let length = Match::length(m);
        TlvHeader::marshal(bytes, TlvHeader::new(OFPMT_OXM, len_u16(length, "match length")?))?;
        marshal_list(&m.oxm_list, bytes)?;
        write_padding_bytes(bytes, pad_len(length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marshal_oxm(oxm: &Oxm) -> Vec<u8> {
        let mut bytes = vec![];
        Oxm::marshal(oxm, &mut bytes).unwrap();
        bytes
    }

    fn parse_oxm(bytes: &[u8]) -> Result<Vec<Oxm>, OfpSerializationError> {
        crate::ofp_list::parse_list_to_end(&mut OfpReader::new(bytes))
    }

    #[test]
    fn test_oxm_in_phy_port() {
        let bytes = marshal_oxm(&Oxm::in_phy_port(42));
        assert_eq!(bytes, vec![0x80, 0x00, 0x02, 0x04, 0x00, 0x00, 0x00, 0x2a]);
        assert_eq!(parse_oxm(&bytes).unwrap(), vec![Oxm::in_phy_port(42)]);
    }

    #[test]
    fn test_oxm_in_phy_port_masked() {
        let oxm = Oxm::in_phy_port_masked(42, 0xaabbccdd);
        let bytes = marshal_oxm(&oxm);
        assert_eq!(bytes,
                   vec![0x80, 0x00, 0x03, 0x08, 0x00, 0x00, 0x00, 0x2a, 0xaa, 0xbb, 0xcc, 0xdd]);
        assert_eq!(parse_oxm(&bytes).unwrap(), vec![oxm]);
    }

    #[test]
    fn test_oxm_ipv6_dst() {
        let addr = [0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c,
                    0x0d, 0x0d, 0x0f];
        let bytes = marshal_oxm(&Oxm::ipv6_dst(addr));
        assert_eq!(&bytes[..4], &[0x80, 0x00, 0x36, 0x10]);
        assert_eq!(&bytes[4..], &addr);
    }

    #[test]
    fn test_oxm_widths_round_trip() {
        for field in OxmField::ALL.iter() {
            assert_eq!(OxmField::of_int(field.code()), Some(*field));
            let width = field.value_len();
            let value: Vec<u8> = (0..width as u8).collect();
            let mask = vec![0xff; width];
            let oxms = vec![Oxm::new(*field, &value), Oxm::masked(*field, &value, &mask)];
            let mut bytes = vec![];
            marshal_list(&oxms, &mut bytes).unwrap();
            assert_eq!(bytes.len(), 8 + 3 * width);
            assert_eq!(parse_oxm(&bytes).unwrap(), oxms);
        }
        assert_eq!(OxmField::of_int(40), None);
    }

    #[test]
    fn test_value_as_u64() {
        assert_eq!(Oxm::arp_op(1).value_as_u64(), Some(1));
        assert_eq!(Oxm::tunnel_id(0xfedcba9876543210).value_as_u64(),
                   Some(0xfedcba9876543210));
        assert_eq!(Oxm::ipv6_dst([0; 16]).value_as_u64(), None);
    }

    #[test]
    fn test_unsupported_fields() {
        let unknown_field = [0x80, 0x00, 0x50, 0x02, 0x00, 0x01];
        assert!(matches!(parse_oxm(&unknown_field),
                         Err(OfpSerializationError::UnsupportedMatchField { class: 0x8000,
                                                                            field: 40 })));
        let unknown_class = [0xff, 0xff, 0x00, 0x04, 0x00, 0x00, 0x00, 0x01];
        assert!(matches!(parse_oxm(&unknown_class),
                         Err(OfpSerializationError::UnsupportedMatchField { class: 0xffff, .. })));
    }

    #[test]
    fn test_bad_lengths() {
        let short_value = [0x80, 0x00, 0x2a, 0x01, 0x00];
        assert!(matches!(parse_oxm(&short_value),
                         Err(OfpSerializationError::InvalidFieldValue { .. })));
        let bad_mask = Oxm::masked(OxmField::InPort, &[0, 0, 0, 1], &[0xff, 0xff]);
        assert!(Oxm::marshal(&bad_mask, &mut vec![]).is_err());
        let bad_value = Oxm::new(OxmField::EthDst, &[1, 2, 3]);
        assert!(Oxm::marshal(&bad_value, &mut vec![]).is_err());
    }

    #[test]
    fn test_match_padding() {
        let m = Match::new(vec![Oxm::arp_op(1), Oxm::in_port_masked(4, 5)]);
        let mut bytes = vec![];
        Match::marshal(&m, &mut bytes).unwrap();
        assert_eq!(bytes.len(), 24);
        assert_eq!(Match::size_of(&m), 24);
        assert_eq!(&bytes[..4], &[0x00, 0x01, 0x00, 0x16]);
        assert_eq!(&bytes[22..], &[0, 0]);
        let mut reader = OfpReader::new(&bytes);
        assert_eq!(Match::parse(&mut reader).unwrap(), m);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_match_padding_not_checked_on_parse() {
        let bytes = [0x00, 0x01, 0x00, 0x04, 0xde, 0xad, 0xbe, 0xef];
        let mut reader = OfpReader::new(&bytes);
        assert_eq!(Match::parse(&mut reader).unwrap(), Match::match_all());
        assert!(reader.is_empty());
    }

    #[test]
    fn test_match_type_must_be_oxm() {
        let bytes = [0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00];
        assert!(matches!(Match::parse(&mut OfpReader::new(&bytes)),
                         Err(OfpSerializationError::InvalidFieldValue { field: "match type", .. })));
    }
}
