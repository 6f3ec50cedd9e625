//! Bodies of the small controller/switch handshake and configuration messages.

use byteorder::{BigEndian, WriteBytesExt};

use crate::ofp_header::TlvHeader;
use crate::ofp_list::ListItem;
use crate::ofp_message::OfpSerializationError;
use crate::ofp_utils::{len_u16, length_at, write_padding_bytes, OfpReader};

use super::MessageType;

/// Hello element carrying the bitmap of supported versions.
const OFPHET_VERSIONBITMAP: u16 = 1;

/// An element of a hello message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelloElem {
    /// Bit `n` of the bitmap set means wire version `n` is supported.
    VersionBitmap(Vec<u32>),
}

impl ListItem for HelloElem {
    const WHAT: &'static str = "hello element";
    const MIN_LEN: usize = 4;

    fn wire_len(head: &[u8]) -> usize {
        length_at(head, 2)
    }

    fn size_of(elem: &HelloElem) -> usize {
        match *elem {
            HelloElem::VersionBitmap(ref bitmaps) => TlvHeader::size() + 4 * bitmaps.len(),
        }
    }

    fn parse(bytes: &mut OfpReader) -> Result<Option<HelloElem>, OfpSerializationError> {
        let offset = bytes.offset();
        let header = TlvHeader::parse(bytes, Self::WHAT, Self::MIN_LEN)?;
        if header.typ != OFPHET_VERSIONBITMAP {
            bytes.skip(header.body_len())?;
            return Ok(None);
        }
        header.check_multiple(Self::WHAT, offset, 4)?;
        let mut bitmaps = vec![];
        while !bytes.is_empty() {
            bitmaps.push(bytes.read_u32()?);
        }
        Ok(Some(HelloElem::VersionBitmap(bitmaps)))
    }

    fn marshal(elem: &HelloElem, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        let len = len_u16(HelloElem::size_of(elem), "hello element length")?;
        match *elem {
            HelloElem::VersionBitmap(ref bitmaps) => {
                TlvHeader::marshal(bytes, TlvHeader::new(OFPHET_VERSIONBITMAP, len))?;
                for b in bitmaps {
                    bytes.write_u32::<BigEndian>(*b)?;
                }
            }
        }
        Ok(())
    }
}

pub const OFPET_HELLO_FAILED: u16 = 0;
pub const OFPET_BAD_REQUEST: u16 = 1;
pub const OFPET_BAD_ACTION: u16 = 2;
pub const OFPET_BAD_INSTRUCTION: u16 = 3;
pub const OFPET_BAD_MATCH: u16 = 4;
pub const OFPET_FLOW_MOD_FAILED: u16 = 5;
pub const OFPET_GROUP_MOD_FAILED: u16 = 6;
pub const OFPET_PORT_MOD_FAILED: u16 = 7;
pub const OFPET_TABLE_MOD_FAILED: u16 = 8;
pub const OFPET_QUEUE_OP_FAILED: u16 = 9;
pub const OFPET_SWITCH_CONFIG_FAILED: u16 = 10;
pub const OFPET_ROLE_REQUEST_FAILED: u16 = 11;
pub const OFPET_METER_MOD_FAILED: u16 = 12;
pub const OFPET_TABLE_FEATURES_FAILED: u16 = 13;
pub const OFPET_EXPERIMENTER: u16 = 0xffff;

/// Unsupported mask in an OXM entry, under `OFPET_BAD_MATCH`.
pub const OFPBMC_BAD_MASK: u16 = 8;

/// Error reported by the switch. `data` usually holds the start of the failed request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorMsg {
    pub err_type: u16,
    pub code: u16,
    pub data: Vec<u8>,
}

impl MessageType for ErrorMsg {
    fn size_of(err: &ErrorMsg) -> usize {
        4 + err.data.len()
    }

    fn parse(bytes: &mut OfpReader) -> Result<ErrorMsg, OfpSerializationError> {
        Ok(ErrorMsg {
            err_type: bytes.read_u16()?,
            code: bytes.read_u16()?,
            data: bytes.read_to_end()?,
        })
    }

    fn marshal(err: &ErrorMsg, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u16::<BigEndian>(err.err_type)?;
        bytes.write_u16::<BigEndian>(err.code)?;
        bytes.extend_from_slice(&err.data);
        Ok(())
    }
}

/// Vendor-defined message, passed through opaquely.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExperimenterMsg {
    pub experimenter: u32,
    pub exp_type: u32,
    pub data: Vec<u8>,
}

impl MessageType for ExperimenterMsg {
    fn size_of(msg: &ExperimenterMsg) -> usize {
        8 + msg.data.len()
    }

    fn parse(bytes: &mut OfpReader) -> Result<ExperimenterMsg, OfpSerializationError> {
        Ok(ExperimenterMsg {
            experimenter: bytes.read_u32()?,
            exp_type: bytes.read_u32()?,
            data: bytes.read_to_end()?,
        })
    }

    fn marshal(msg: &ExperimenterMsg, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u32::<BigEndian>(msg.experimenter)?;
        bytes.write_u32::<BigEndian>(msg.exp_type)?;
        bytes.extend_from_slice(&msg.data);
        Ok(())
    }
}

pub const OFPC_FLOW_STATS: u32 = 1 << 0;
pub const OFPC_TABLE_STATS: u32 = 1 << 1;
pub const OFPC_PORT_STATS: u32 = 1 << 2;
pub const OFPC_GROUP_STATS: u32 = 1 << 3;
pub const OFPC_IP_REASM: u32 = 1 << 5;
pub const OFPC_QUEUE_STATS: u32 = 1 << 6;
pub const OFPC_PORT_BLOCKED: u32 = 1 << 8;

/// Switch features.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SwitchFeatures {
    pub datapath_id: u64,
    pub num_buffers: u32,
    pub num_tables: u8,
    /// Identifies auxiliary connections; 0 for the main one.
    pub auxiliary_id: u8,
    /// `OFPC_*` bits.
    pub capabilities: u32,
    pub reserved: u32,
}

impl MessageType for SwitchFeatures {
    fn size_of(_: &SwitchFeatures) -> usize {
        24
    }

    fn parse(bytes: &mut OfpReader) -> Result<SwitchFeatures, OfpSerializationError> {
        let datapath_id = bytes.read_u64()?;
        let num_buffers = bytes.read_u32()?;
        let num_tables = bytes.read_u8()?;
        let auxiliary_id = bytes.read_u8()?;
        bytes.skip(2)?;
        Ok(SwitchFeatures {
            datapath_id,
            num_buffers,
            num_tables,
            auxiliary_id,
            capabilities: bytes.read_u32()?,
            reserved: bytes.read_u32()?,
        })
    }

    fn marshal(sf: &SwitchFeatures, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u64::<BigEndian>(sf.datapath_id)?;
        bytes.write_u32::<BigEndian>(sf.num_buffers)?;
        bytes.write_u8(sf.num_tables)?;
        bytes.write_u8(sf.auxiliary_id)?;
        write_padding_bytes(bytes, 2)?;
        bytes.write_u32::<BigEndian>(sf.capabilities)?;
        bytes.write_u32::<BigEndian>(sf.reserved)?;
        Ok(())
    }
}

pub const OFPC_FRAG_NORMAL: u16 = 0;
pub const OFPC_FRAG_DROP: u16 = 1;
pub const OFPC_FRAG_REASM: u16 = 2;

/// Switch configuration, as carried by get-config replies and set-config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SwitchConfig {
    /// `OFPC_FRAG_*` handling of IP fragments.
    pub flags: u16,
    /// Bytes of a table-miss packet to send to the controller.
    pub miss_send_len: u16,
}

impl MessageType for SwitchConfig {
    fn size_of(_: &SwitchConfig) -> usize {
        4
    }

    fn parse(bytes: &mut OfpReader) -> Result<SwitchConfig, OfpSerializationError> {
        Ok(SwitchConfig {
            flags: bytes.read_u16()?,
            miss_send_len: bytes.read_u16()?,
        })
    }

    fn marshal(sc: &SwitchConfig, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u16::<BigEndian>(sc.flags)?;
        bytes.write_u16::<BigEndian>(sc.miss_send_len)?;
        Ok(())
    }
}

/// Configure a flow table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableMod {
    pub table_id: u8,
    pub config: u32,
}

impl MessageType for TableMod {
    fn size_of(_: &TableMod) -> usize {
        8
    }

    fn parse(bytes: &mut OfpReader) -> Result<TableMod, OfpSerializationError> {
        let table_id = bytes.read_u8()?;
        bytes.skip(3)?;
        Ok(TableMod {
            table_id,
            config: bytes.read_u32()?,
        })
    }

    fn marshal(tm: &TableMod, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u8(tm.table_id)?;
        write_padding_bytes(bytes, 3)?;
        bytes.write_u32::<BigEndian>(tm.config)?;
        Ok(())
    }
}

/// Role of a controller towards a switch.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum ControllerRole {
    /// Query the current role without changing it.
    #[default]
    NoChange = 0,
    Equal = 1,
    Master = 2,
    Slave = 3,
}

impl ControllerRole {
    pub fn of_int(role: u32) -> Result<ControllerRole, OfpSerializationError> {
        match role {
            0 => Ok(ControllerRole::NoChange),
            1 => Ok(ControllerRole::Equal),
            2 => Ok(ControllerRole::Master),
            3 => Ok(ControllerRole::Slave),
            r => Err(OfpSerializationError::invalid("controller role", r)),
        }
    }
}

/// Body of role requests and replies.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoleMsg {
    pub role: ControllerRole,
    /// Master election generation id.
    pub generation_id: u64,
}

impl MessageType for RoleMsg {
    fn size_of(_: &RoleMsg) -> usize {
        16
    }

    fn parse(bytes: &mut OfpReader) -> Result<RoleMsg, OfpSerializationError> {
        let role = ControllerRole::of_int(bytes.read_u32()?)?;
        bytes.skip(4)?;
        Ok(RoleMsg {
            role,
            generation_id: bytes.read_u64()?,
        })
    }

    fn marshal(rm: &RoleMsg, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u32::<BigEndian>(rm.role as u32)?;
        write_padding_bytes(bytes, 4)?;
        bytes.write_u64::<BigEndian>(rm.generation_id)?;
        Ok(())
    }
}

/// Asynchronous message filters. Index 0 applies in the master or equal role, index 1 in the
/// slave role. Each mask is a bitmap of reason codes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AsyncConfig {
    pub packet_in_mask: [u32; 2],
    pub port_status_mask: [u32; 2],
    pub flow_removed_mask: [u32; 2],
}

impl MessageType for AsyncConfig {
    fn size_of(_: &AsyncConfig) -> usize {
        24
    }

    fn parse(bytes: &mut OfpReader) -> Result<AsyncConfig, OfpSerializationError> {
        let mut masks = [0u32; 6];
        for m in masks.iter_mut() {
            *m = bytes.read_u32()?;
        }
        Ok(AsyncConfig {
            packet_in_mask: [masks[0], masks[1]],
            port_status_mask: [masks[2], masks[3]],
            flow_removed_mask: [masks[4], masks[5]],
        })
    }

    fn marshal(ac: &AsyncConfig, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        for m in ac.packet_in_mask
            .iter()
            .chain(ac.port_status_mask.iter())
            .chain(ac.flow_removed_mask.iter()) {
            bytes.write_u32::<BigEndian>(*m)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ofp_list::{marshal_list, parse_list_to_end};

    #[test]
    fn test_version_bitmap() {
        let elem = HelloElem::VersionBitmap(vec![0x01234567, 0x89abcdef]);
        let mut bytes = vec![];
        HelloElem::marshal(&elem, &mut bytes).unwrap();
        assert_eq!(bytes,
                   vec![0x00, 0x01, 0x00, 0x0c, 0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef]);
        let parsed: Vec<HelloElem> = parse_list_to_end(&mut OfpReader::new(&bytes)).unwrap();
        assert_eq!(parsed, vec![elem]);
    }

    #[test]
    fn test_unknown_hello_elements_are_skipped() {
        let bytes = [0x00, 0x01, 0x00, 0x04, 0x00, 0x00, 0x00, 0x04, 0x00, 0x01, 0x00, 0x04];
        let parsed: Vec<HelloElem> = parse_list_to_end(&mut OfpReader::new(&bytes)).unwrap();
        assert_eq!(parsed,
                   vec![HelloElem::VersionBitmap(vec![]), HelloElem::VersionBitmap(vec![])]);
        let mut out = vec![];
        marshal_list(&parsed, &mut out).unwrap();
        assert_eq!(out.len(), 8);
    }

    #[test]
    fn test_role_msg() {
        let rm = RoleMsg {
            role: ControllerRole::Slave,
            generation_id: 0x1122334455667788,
        };
        let mut bytes = vec![];
        RoleMsg::marshal(&rm, &mut bytes).unwrap();
        assert_eq!(&bytes[..8], &[0, 0, 0, 3, 0, 0, 0, 0]);
        assert_eq!(RoleMsg::parse(&mut OfpReader::new(&bytes)).unwrap(), rm);
        bytes[3] = 4;
        assert!(RoleMsg::parse(&mut OfpReader::new(&bytes)).is_err());
    }

    #[test]
    fn test_async_config_order() {
        let ac = AsyncConfig {
            packet_in_mask: [1, 2],
            port_status_mask: [3, 4],
            flow_removed_mask: [5, 6],
        };
        let mut bytes = vec![];
        AsyncConfig::marshal(&ac, &mut bytes).unwrap();
        assert_eq!(bytes.len(), 24);
        assert_eq!(&bytes[8..12], &[0, 0, 0, 3]);
        assert_eq!(AsyncConfig::parse(&mut OfpReader::new(&bytes)).unwrap(), ac);
    }

    #[test]
    fn test_version_bitmap_of_partial_word() {
        let bytes = [0x00, 0x01, 0x00, 0x0a, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00];
        assert!(matches!(parse_list_to_end::<HelloElem>(&mut OfpReader::new(&bytes)),
                         Err(OfpSerializationError::Malformed { what: "hello element", .. })));
    }
}
