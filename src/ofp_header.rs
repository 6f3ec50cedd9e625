use byteorder::{BigEndian, WriteBytesExt};

use crate::ofp_message::OfpSerializationError;
use crate::ofp_utils::OfpReader;
use crate::openflow0x04::MsgCode;

/// Wire version byte of OpenFlow 1.3.
pub const OFP_VERSION: u8 = 0x04;

/// OpenFlow Header
///
/// The first fields of every OpenFlow message, no matter the protocol version.
/// This is parsed to determine version and length of the remaining message, so that
/// it can be properly handled.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OfpHeader {
    version: u8,
    typ: u8,
    length: u16,
    xid: u32,
}

impl OfpHeader {
    /// Create an `OfpHeader` out of the arguments.
    pub fn new(version: u8, typ: u8, length: u16, xid: u32) -> OfpHeader {
        OfpHeader {
            version,
            typ,
            length,
            xid,
        }
    }

    /// Return the byte-size of an `OfpHeader`.
    pub fn size() -> usize {
        8
    }

    /// Fills a message buffer with the header fields of an `OfpHeader`.
    pub fn marshal(bytes: &mut Vec<u8>, header: &OfpHeader) -> Result<(), OfpSerializationError> {
        bytes.write_u8(header.version())?;
        bytes.write_u8(header.typ)?;
        bytes.write_u16::<BigEndian>(header.length)?;
        bytes.write_u32::<BigEndian>(header.xid())?;
        Ok(())
    }

    /// Reads an `OfpHeader` off the front of `bytes`.
    ///
    /// Only the header itself is checked here: the declared length must at least cover the
    /// header. Whether the rest of the message is present is up to the caller.
    pub fn parse(bytes: &mut OfpReader) -> Result<Self, OfpSerializationError> {
        let offset = bytes.offset();
        let header = OfpHeader {
            version: bytes.read_u8()?,
            typ: bytes.read_u8()?,
            length: bytes.read_u16()?,
            xid: bytes.read_u32()?,
        };
        if header.length() < OfpHeader::size() {
            return Err(OfpSerializationError::Malformed {
                what: "message header",
                offset,
                expected: OfpHeader::size(),
                found: header.length(),
            });
        }
        Ok(header)
    }

    /// Return the `version` field of a header.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Return the raw message type byte of a header.
    pub fn type_byte(&self) -> u8 {
        self.typ
    }

    /// Return the OpenFlow message type code of a header, failing for codes outside the
    /// 1.3 message registry.
    pub fn type_code(&self) -> Result<MsgCode, OfpSerializationError> {
        MsgCode::of_int(self.typ)
    }

    /// Return the `length` field of a header. Includes the length of the header itself.
    pub fn length(&self) -> usize {
        self.length as usize
    }

    /// Return the `xid` field of a header, the transaction id associated with this packet.
    ///  Replies use the same id to facilitate pairing.
    pub fn xid(&self) -> u32 {
        self.xid
    }
}

/// The `(type, length)` pair leading every variable-length record below the message level:
/// actions, instructions, hello elements, meter bands, properties and the match itself.
///
/// `length` counts the header. Whether trailing alignment padding is counted depends on the
/// container and is handled by the record codecs, not here.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TlvHeader {
    pub typ: u16,
    pub length: u16,
}

impl TlvHeader {
    pub fn size() -> usize {
        4
    }

    pub fn new(typ: u16, length: u16) -> TlvHeader {
        TlvHeader { typ, length }
    }

    /// Read a header and validate its declared length against `min_len` and against the bytes
    /// left in the enclosing span (header included).
    pub fn parse(bytes: &mut OfpReader,
                 what: &'static str,
                 min_len: usize)
                 -> Result<TlvHeader, OfpSerializationError> {
        let offset = bytes.offset();
        let available = bytes.remaining();
        let typ = bytes.read_u16()?;
        let length = bytes.read_u16()?;
        let declared = length as usize;
        if declared < min_len {
            return Err(OfpSerializationError::Malformed {
                what,
                offset,
                expected: min_len,
                found: declared,
            });
        }
        if declared > available {
            return Err(OfpSerializationError::Malformed {
                what,
                offset,
                expected: declared,
                found: available,
            });
        }
        Ok(TlvHeader { typ, length })
    }

    pub fn marshal(bytes: &mut Vec<u8>, header: TlvHeader) -> Result<(), OfpSerializationError> {
        bytes.write_u16::<BigEndian>(header.typ)?;
        bytes.write_u16::<BigEndian>(header.length)?;
        Ok(())
    }

    /// `Malformed` unless the declared length is a multiple of `unit`.
    pub fn check_multiple(&self,
                          what: &'static str,
                          offset: usize,
                          unit: usize)
                          -> Result<(), OfpSerializationError> {
        let declared = self.length as usize;
        if declared % unit != 0 {
            return Err(OfpSerializationError::Malformed {
                what,
                offset,
                expected: (declared + unit - 1) / unit * unit,
                found: declared,
            });
        }
        Ok(())
    }

    /// Declared length minus the header.
    pub fn body_len(&self) -> usize {
        self.length as usize - TlvHeader::size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_round_trip() {
        let header = OfpHeader::new(OFP_VERSION, 2, 11, 0x12345678);
        let mut bytes = vec![];
        OfpHeader::marshal(&mut bytes, &header).unwrap();
        assert_eq!(bytes, vec![0x04, 0x02, 0x00, 0x0b, 0x12, 0x34, 0x56, 0x78]);
        let parsed = OfpHeader::parse(&mut OfpReader::new(&bytes)).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(parsed.type_code().unwrap(), MsgCode::EchoReq);
    }

    #[test]
    fn test_header_length_below_minimum() {
        let bytes = [0x04, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x01];
        match OfpHeader::parse(&mut OfpReader::new(&bytes)) {
            Err(OfpSerializationError::Malformed { expected: 8, found: 4, .. }) => (),
            r => panic!("expected malformed header, got {:?}", r),
        }
    }

    #[test]
    fn test_tlv_header_bounds() {
        let bytes = [0x00, 0x01, 0x00, 0x02];
        assert!(matches!(TlvHeader::parse(&mut OfpReader::new(&bytes), "action", 4),
                         Err(OfpSerializationError::Malformed { found: 2, .. })));
        let bytes = [0x00, 0x01, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00];
        assert!(matches!(TlvHeader::parse(&mut OfpReader::new(&bytes), "action", 4),
                         Err(OfpSerializationError::Malformed { expected: 16, found: 8, .. })));
        let bytes = [0x00, 0x01, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00];
        let header = TlvHeader::parse(&mut OfpReader::new(&bytes), "action", 4).unwrap();
        assert_eq!(header, TlvHeader::new(1, 8));
        assert_eq!(header.body_len(), 4);
    }
}
