//! OpenFlow 1.3 (wire version 0x04) messages and the records nested inside them.

use byteorder::{BigEndian, WriteBytesExt};

use crate::ofp_message::OfpSerializationError;
use crate::ofp_utils::OfpReader;

pub mod action;
pub mod common;
pub mod flow;
pub mod group;
pub mod instruction;
pub mod message;
pub mod meter;
pub mod multipart;
pub mod oxm;
pub mod port;
pub mod queue;
pub mod table_features;

pub use self::action::{Action, ActionType};
pub use self::common::*;
pub use self::flow::*;
pub use self::group::*;
pub use self::instruction::{Instruction, InstructionType};
pub use self::message::{decode, encode, Message};
pub use self::meter::*;
pub use self::multipart::*;
pub use self::oxm::{Match, Oxm, OxmField};
pub use self::port::*;
pub use self::queue::*;
pub use self::table_features::*;

/// Buffer id meaning the packet is carried in full and not buffered on the switch.
pub const OFP_NO_BUFFER: u32 = 0xffffffff;
/// Wildcard group for flow-mod, flow-stats and group-stats filters.
pub const OFPG_ANY: u32 = 0xffffffff;
/// Every group, for group deletion and group stats.
pub const OFPG_ALL: u32 = 0xfffffffc;
/// Every table, for flow deletion and table-mod.
pub const OFPTT_ALL: u8 = 0xff;
/// `max_len` asking the switch to send the whole packet to the controller.
pub const OFPCML_NO_BUFFER: u16 = 0xffff;

/// OpenFlow 1.3 message type codes, used by headers to identify meaning of the rest of a message.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MsgCode {
    Hello = 0,
    Error = 1,
    EchoReq = 2,
    EchoResp = 3,
    Experimenter = 4,
    FeaturesReq = 5,
    FeaturesResp = 6,
    GetConfigReq = 7,
    GetConfigResp = 8,
    SetConfig = 9,
    PacketIn = 10,
    FlowRemoved = 11,
    PortStatus = 12,
    PacketOut = 13,
    FlowMod = 14,
    GroupMod = 15,
    PortMod = 16,
    TableMod = 17,
    MultipartReq = 18,
    MultipartResp = 19,
    BarrierReq = 20,
    BarrierResp = 21,
    QueueGetConfigReq = 22,
    QueueGetConfigResp = 23,
    RoleReq = 24,
    RoleResp = 25,
    GetAsyncReq = 26,
    GetAsyncResp = 27,
    SetAsync = 28,
    MeterMod = 29,
}

impl MsgCode {
    /// Every message code, in wire order.
    pub const ALL: [MsgCode; 30] = [MsgCode::Hello,
                                    MsgCode::Error,
                                    MsgCode::EchoReq,
                                    MsgCode::EchoResp,
                                    MsgCode::Experimenter,
                                    MsgCode::FeaturesReq,
                                    MsgCode::FeaturesResp,
                                    MsgCode::GetConfigReq,
                                    MsgCode::GetConfigResp,
                                    MsgCode::SetConfig,
                                    MsgCode::PacketIn,
                                    MsgCode::FlowRemoved,
                                    MsgCode::PortStatus,
                                    MsgCode::PacketOut,
                                    MsgCode::FlowMod,
                                    MsgCode::GroupMod,
                                    MsgCode::PortMod,
                                    MsgCode::TableMod,
                                    MsgCode::MultipartReq,
                                    MsgCode::MultipartResp,
                                    MsgCode::BarrierReq,
                                    MsgCode::BarrierResp,
                                    MsgCode::QueueGetConfigReq,
                                    MsgCode::QueueGetConfigResp,
                                    MsgCode::RoleReq,
                                    MsgCode::RoleResp,
                                    MsgCode::GetAsyncReq,
                                    MsgCode::GetAsyncResp,
                                    MsgCode::SetAsync,
                                    MsgCode::MeterMod];

    pub fn of_int(code: u8) -> Result<MsgCode, OfpSerializationError> {
        MsgCode::ALL
            .get(code as usize)
            .copied()
            .ok_or(OfpSerializationError::UnsupportedMessageType { code })
    }
}

/// Common API for message types implementing OpenFlow Message Codes (see `MsgCode` enum).
pub trait MessageType: Sized {
    /// Return the byte-size of a message body.
    fn size_of(msg: &Self) -> usize;
    /// Parse a message body. The reader spans exactly the body.
    fn parse(bytes: &mut OfpReader) -> Result<Self, OfpSerializationError>;
    /// Marshal a message body into a `u8` buffer.
    fn marshal(msg: &Self, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError>;
}

#[repr(u32)]
enum OfpPort {
    OFPPMax = 0xffffff00,
    OFPPInPort = 0xfffffff8,
    OFPPTable = 0xfffffff9,
    OFPPNormal = 0xfffffffa,
    OFPPFlood = 0xfffffffb,
    OFPPAll = 0xfffffffc,
    OFPPController = 0xfffffffd,
    OFPPLocal = 0xfffffffe,
    OFPPAny = 0xffffffff,
}

/// Wildcard port for flow-mod and stats filters.
pub const OFPP_ANY: u32 = OfpPort::OFPPAny as u32;
/// Port number of the controller itself.
pub const OFPP_CONTROLLER: u32 = OfpPort::OFPPController as u32;

/// Port behavior.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PseudoPort {
    PhysicalPort(u32),
    InPort,
    Table,
    Normal,
    Flood,
    AllPorts,
    Controller,
    Local,
}

impl PseudoPort {
    /// Decode a port field where `OFPP_ANY` stands for "no port".
    pub fn of_int(p: u32) -> Result<Option<PseudoPort>, OfpSerializationError> {
        if (OfpPort::OFPPAny as u32) == p {
            Ok(None)
        } else {
            Ok(Some(PseudoPort::make(p)?))
        }
    }

    pub fn make(p: u32) -> Result<PseudoPort, OfpSerializationError> {
        let pp = match p {
            p if p == (OfpPort::OFPPInPort as u32) => PseudoPort::InPort,
            p if p == (OfpPort::OFPPTable as u32) => PseudoPort::Table,
            p if p == (OfpPort::OFPPNormal as u32) => PseudoPort::Normal,
            p if p == (OfpPort::OFPPFlood as u32) => PseudoPort::Flood,
            p if p == (OfpPort::OFPPAll as u32) => PseudoPort::AllPorts,
            p if p == (OfpPort::OFPPController as u32) => PseudoPort::Controller,
            p if p == (OfpPort::OFPPLocal as u32) => PseudoPort::Local,
            _ => {
                if p <= (OfpPort::OFPPMax as u32) {
                    PseudoPort::PhysicalPort(p)
                } else {
                    return Err(OfpSerializationError::invalid("port number", format!("{:#x}", p)));
                }
            }
        };
        Ok(pp)
    }

    pub fn to_int(pp: PseudoPort) -> u32 {
        match pp {
            PseudoPort::PhysicalPort(p) => p,
            PseudoPort::InPort => OfpPort::OFPPInPort as u32,
            PseudoPort::Table => OfpPort::OFPPTable as u32,
            PseudoPort::Normal => OfpPort::OFPPNormal as u32,
            PseudoPort::Flood => OfpPort::OFPPFlood as u32,
            PseudoPort::AllPorts => OfpPort::OFPPAll as u32,
            PseudoPort::Controller => OfpPort::OFPPController as u32,
            PseudoPort::Local => OfpPort::OFPPLocal as u32,
        }
    }

    fn marshal(pp: PseudoPort, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        if let PseudoPort::PhysicalPort(p) = pp {
            if p > OfpPort::OFPPMax as u32 {
                return Err(OfpSerializationError::invalid("port number", format!("{:#x}", p)));
            }
        }
        bytes.write_u32::<BigEndian>(PseudoPort::to_int(pp))?;
        Ok(())
    }

    /// Marshal an optional port, writing `OFPP_ANY` for `None`.
    fn marshal_opt(pp: Option<PseudoPort>, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        match pp {
            None => bytes.write_u32::<BigEndian>(OfpPort::OFPPAny as u32)?,
            Some(pp) => PseudoPort::marshal(pp, bytes)?,
        }
        Ok(())
    }
}

/// How long before a flow entry expires.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Timeout {
    #[default]
    Permanent,
    ExpiresAfter(u16),
}

impl Timeout {
    pub fn of_int(tm: u16) -> Timeout {
        match tm {
            0 => Timeout::Permanent,
            d => Timeout::ExpiresAfter(d),
        }
    }

    pub fn to_int(tm: Timeout) -> u16 {
        match tm {
            Timeout::Permanent => 0,
            Timeout::ExpiresAfter(d) => d,
        }
    }
}

/// The packet data carried by packet-in and packet-out, either buffered on the switch under a
/// buffer id or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Buffered(u32, Vec<u8>),
    NotBuffered(Vec<u8>),
}

impl Default for Payload {
    fn default() -> Payload {
        Payload::NotBuffered(vec![])
    }
}

impl Payload {
    pub fn make(buffer_id: u32, data: Vec<u8>) -> Payload {
        match buffer_id {
            OFP_NO_BUFFER => Payload::NotBuffered(data),
            n => Payload::Buffered(n, data),
        }
    }

    pub fn size_of(payload: &Payload) -> usize {
        Payload::data(payload).len()
    }

    pub fn buffer_id(payload: &Payload) -> u32 {
        match *payload {
            Payload::Buffered(n, _) => n,
            Payload::NotBuffered(_) => OFP_NO_BUFFER,
        }
    }

    pub fn data(payload: &Payload) -> &[u8] {
        match *payload {
            Payload::Buffered(_, ref buf) |
            Payload::NotBuffered(ref buf) => buf,
        }
    }

    fn check(payload: &Payload) -> Result<(), OfpSerializationError> {
        match *payload {
            Payload::Buffered(OFP_NO_BUFFER, _) => {
                Err(OfpSerializationError::invalid("buffer_id", format!("{:#x}", OFP_NO_BUFFER)))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msg_code_registry() {
        for (i, code) in MsgCode::ALL.iter().enumerate() {
            assert_eq!(*code as u8 as usize, i);
            assert_eq!(MsgCode::of_int(i as u8).unwrap(), *code);
        }
        assert!(matches!(MsgCode::of_int(30),
                         Err(OfpSerializationError::UnsupportedMessageType { code: 30 })));
    }

    #[test]
    fn test_pseudo_port() {
        assert_eq!(PseudoPort::of_int(OFPP_ANY).unwrap(), None);
        assert_eq!(PseudoPort::make(OFPP_CONTROLLER).unwrap(), PseudoPort::Controller);
        assert_eq!(PseudoPort::make(7).unwrap(), PseudoPort::PhysicalPort(7));
        assert!(PseudoPort::make(0xffffff01).is_err());
        let mut bytes = vec![];
        assert!(PseudoPort::marshal(PseudoPort::PhysicalPort(0xfffffff8), &mut bytes).is_err());
    }

    #[test]
    fn test_payload_buffer_id() {
        assert_eq!(Payload::make(OFP_NO_BUFFER, vec![1]), Payload::NotBuffered(vec![1]));
        assert_eq!(Payload::buffer_id(&Payload::make(100, vec![])), 100);
        assert!(Payload::check(&Payload::Buffered(OFP_NO_BUFFER, vec![])).is_err());
    }
}
