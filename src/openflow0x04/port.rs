use byteorder::{BigEndian, WriteBytesExt};

use crate::ofp_list::ListItem;
use crate::ofp_message::OfpSerializationError;
use crate::ofp_utils::{write_fixed_size_string, write_padding_bytes, OfpReader};

use super::MessageType;

pub const OFP_MAX_PORT_NAME_LEN: usize = 16;

/// Port is administratively down.
pub const OFPPC_PORT_DOWN: u32 = 1 << 0;
/// Drop all packets received by port.
pub const OFPPC_NO_RECV: u32 = 1 << 2;
/// Drop packets forwarded to port.
pub const OFPPC_NO_FWD: u32 = 1 << 5;
/// Do not send packet-in messages for port.
pub const OFPPC_NO_PACKET_IN: u32 = 1 << 6;

pub const OFPPS_LINK_DOWN: u32 = 1 << 0;
pub const OFPPS_BLOCKED: u32 = 1 << 1;
pub const OFPPS_LIVE: u32 = 1 << 2;

pub const OFPPF_10MB_HD: u32 = 1 << 0;
pub const OFPPF_10MB_FD: u32 = 1 << 1;
pub const OFPPF_100MB_HD: u32 = 1 << 2;
pub const OFPPF_100MB_FD: u32 = 1 << 3;
pub const OFPPF_1GB_HD: u32 = 1 << 4;
pub const OFPPF_1GB_FD: u32 = 1 << 5;
pub const OFPPF_10GB_FD: u32 = 1 << 6;
pub const OFPPF_40GB_FD: u32 = 1 << 7;
pub const OFPPF_100GB_FD: u32 = 1 << 8;
pub const OFPPF_1TB_FD: u32 = 1 << 9;
pub const OFPPF_OTHER: u32 = 1 << 10;
pub const OFPPF_COPPER: u32 = 1 << 11;
pub const OFPPF_FIBER: u32 = 1 << 12;
pub const OFPPF_AUTONEG: u32 = 1 << 13;
pub const OFPPF_PAUSE: u32 = 1 << 14;
pub const OFPPF_PAUSE_ASYM: u32 = 1 << 15;

/// Description of a port.
///
/// `config`, `state` and the feature fields are bitmaps of the `OFPPC_*`, `OFPPS_*` and
/// `OFPPF_*` constants. Bits without a constant are kept as they are.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortDesc {
    pub port_no: u32,
    pub hw_addr: [u8; 6],
    pub name: String,
    pub config: u32,
    pub state: u32,
    pub curr: u32,
    pub advertised: u32,
    pub supported: u32,
    pub peer: u32,
    /// Current port bitrate in kbps.
    pub curr_speed: u32,
    pub max_speed: u32,
}

const PORT_DESC_LEN: usize = 64;

impl ListItem for PortDesc {
    const WHAT: &'static str = "port desc";
    const MIN_LEN: usize = PORT_DESC_LEN;

    fn wire_len(_: &[u8]) -> usize {
        PORT_DESC_LEN
    }

    fn size_of(_: &PortDesc) -> usize {
        PORT_DESC_LEN
    }

    fn parse(bytes: &mut OfpReader) -> Result<Option<PortDesc>, OfpSerializationError> {
        let port_no = bytes.read_u32()?;
        bytes.skip(4)?;
        let hw_addr = bytes.read_array::<6>()?;
        bytes.skip(2)?;
        let name = bytes.read_fixed_size_string(OFP_MAX_PORT_NAME_LEN)?;
        Ok(Some(PortDesc {
            port_no,
            hw_addr,
            name,
            config: bytes.read_u32()?,
            state: bytes.read_u32()?,
            curr: bytes.read_u32()?,
            advertised: bytes.read_u32()?,
            supported: bytes.read_u32()?,
            peer: bytes.read_u32()?,
            curr_speed: bytes.read_u32()?,
            max_speed: bytes.read_u32()?,
        }))
    }

    fn marshal(pd: &PortDesc, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u32::<BigEndian>(pd.port_no)?;
        write_padding_bytes(bytes, 4)?;
        bytes.extend_from_slice(&pd.hw_addr);
        write_padding_bytes(bytes, 2)?;
        write_fixed_size_string(bytes, &pd.name, OFP_MAX_PORT_NAME_LEN)?;
        for field in &[pd.config,
                       pd.state,
                       pd.curr,
                       pd.advertised,
                       pd.supported,
                       pd.peer,
                       pd.curr_speed,
                       pd.max_speed] {
            bytes.write_u32::<BigEndian>(*field)?;
        }
        Ok(())
    }
}

/// What changed about a port.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PortReason {
    PortAdd = 0,
    PortDelete = 1,
    PortModify = 2,
}

impl PortReason {
    pub fn of_int(reason: u8) -> Result<PortReason, OfpSerializationError> {
        match reason {
            0 => Ok(PortReason::PortAdd),
            1 => Ok(PortReason::PortDelete),
            2 => Ok(PortReason::PortModify),
            r => Err(OfpSerializationError::invalid("port_status reason", r)),
        }
    }
}

/// A port has changed in the datapath.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortStatus {
    pub reason: PortReason,
    pub desc: PortDesc,
}

impl MessageType for PortStatus {
    fn size_of(_: &PortStatus) -> usize {
        8 + PORT_DESC_LEN
    }

    fn parse(bytes: &mut OfpReader) -> Result<PortStatus, OfpSerializationError> {
        let reason = PortReason::of_int(bytes.read_u8()?)?;
        bytes.skip(7)?;
        let mut desc_bytes = bytes.slice(PORT_DESC_LEN)?;
        let desc = PortDesc::parse(&mut desc_bytes)?.unwrap_or_default();
        Ok(PortStatus { reason, desc })
    }

    fn marshal(ps: &PortStatus, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u8(ps.reason as u8)?;
        write_padding_bytes(bytes, 7)?;
        PortDesc::marshal(&ps.desc, bytes)
    }
}

/// Modify the behavior of a port.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortMod {
    pub port_no: u32,
    pub hw_addr: [u8; 6],
    /// `OFPPC_*` bits to set.
    pub config: u32,
    /// `OFPPC_*` bits of `config` to change.
    pub mask: u32,
    /// `OFPPF_*` bits to advertise, zero to leave unchanged.
    pub advertise: u32,
}

impl MessageType for PortMod {
    fn size_of(_: &PortMod) -> usize {
        32
    }

    fn parse(bytes: &mut OfpReader) -> Result<PortMod, OfpSerializationError> {
        let port_no = bytes.read_u32()?;
        bytes.skip(4)?;
        let hw_addr = bytes.read_array::<6>()?;
        bytes.skip(2)?;
        let config = bytes.read_u32()?;
        let mask = bytes.read_u32()?;
        let advertise = bytes.read_u32()?;
        bytes.skip(4)?;
        Ok(PortMod {
            port_no,
            hw_addr,
            config,
            mask,
            advertise,
        })
    }

    fn marshal(pm: &PortMod, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u32::<BigEndian>(pm.port_no)?;
        write_padding_bytes(bytes, 4)?;
        bytes.extend_from_slice(&pm.hw_addr);
        write_padding_bytes(bytes, 2)?;
        bytes.write_u32::<BigEndian>(pm.config)?;
        bytes.write_u32::<BigEndian>(pm.mask)?;
        bytes.write_u32::<BigEndian>(pm.advertise)?;
        write_padding_bytes(bytes, 4)
    }
}
