use byteorder::{BigEndian, WriteBytesExt};

use crate::bits::{bit, test_bit, unknown_bits};
use crate::ofp_list::{marshal_list, parse_list, parse_list_to_end, size_of_list};
use crate::ofp_message::OfpSerializationError;
use crate::ofp_utils::{len_u16, write_padding_bytes, OfpReader};

use super::action::Action;
use super::instruction::Instruction;
use super::oxm::Match;
use super::{MessageType, Payload, PseudoPort, Timeout, OFPG_ANY, OFP_NO_BUFFER};

/// Type of modification to perform on a flow table.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FlowModCmd {
    AddFlow = 0,
    ModFlow = 1,
    ModStrictFlow = 2,
    DeleteFlow = 3,
    DeleteStrictFlow = 4,
}

impl FlowModCmd {
    pub fn of_int(cmd: u8) -> Result<FlowModCmd, OfpSerializationError> {
        match cmd {
            0 => Ok(FlowModCmd::AddFlow),
            1 => Ok(FlowModCmd::ModFlow),
            2 => Ok(FlowModCmd::ModStrictFlow),
            3 => Ok(FlowModCmd::DeleteFlow),
            4 => Ok(FlowModCmd::DeleteStrictFlow),
            c => Err(OfpSerializationError::invalid("flow_mod command", c)),
        }
    }
}

/// Flags of a flow entry, shared by flow-mod and flow stats.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct FlowModFlags {
    /// Send a flow-removed message when the entry expires or is deleted.
    pub send_flow_rem: bool,
    pub check_overlap: bool,
    pub reset_counts: bool,
    pub no_pkt_counts: bool,
    pub no_byt_counts: bool,
}

const FLOW_MOD_FLAGS_KNOWN: u64 = 0x1f;

impl FlowModFlags {
    pub fn of_int(flags: u16) -> Result<FlowModFlags, OfpSerializationError> {
        let d = flags as u64;
        if unknown_bits(d, FLOW_MOD_FLAGS_KNOWN) != 0 {
            return Err(OfpSerializationError::invalid("flow_mod flags", format!("{:#06x}", flags)));
        }
        Ok(FlowModFlags {
            send_flow_rem: test_bit(0, d),
            check_overlap: test_bit(1, d),
            reset_counts: test_bit(2, d),
            no_pkt_counts: test_bit(3, d),
            no_byt_counts: test_bit(4, d),
        })
    }

    pub fn to_int(flags: FlowModFlags) -> u16 {
        let mut d = 0;
        d = bit(0, d, flags.send_flow_rem);
        d = bit(1, d, flags.check_overlap);
        d = bit(2, d, flags.reset_counts);
        d = bit(3, d, flags.no_pkt_counts);
        d = bit(4, d, flags.no_byt_counts);
        d as u16
    }
}

/// Represents modifications to a flow table from the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowMod {
    pub cookie: u64,
    /// Restricts modify and delete commands to entries whose cookie matches under this mask.
    pub cookie_mask: u64,
    pub table_id: u8,
    pub command: FlowModCmd,
    pub idle_timeout: Timeout,
    pub hard_timeout: Timeout,
    pub priority: u16,
    /// Buffered packet to apply the flow to, if any.
    pub apply_to_packet: Option<u32>,
    /// For delete commands, require matching entries to output to this port.
    pub out_port: Option<PseudoPort>,
    pub out_group: u32,
    pub flags: FlowModFlags,
    pub pattern: Match,
    pub instructions: Vec<Instruction>,
}

const FLOW_MOD_FIXED_LEN: usize = 40;

impl FlowMod {
    /// Return a `FlowMod` adding a flow to table 0, parameterized by the given `priority`,
    /// `pattern`, and `instructions`.
    pub fn add_flow(prio: u16, pattern: Match, instructions: Vec<Instruction>) -> FlowMod {
        FlowMod {
            cookie: 0,
            cookie_mask: 0,
            table_id: 0,
            command: FlowModCmd::AddFlow,
            idle_timeout: Timeout::Permanent,
            hard_timeout: Timeout::Permanent,
            priority: prio,
            apply_to_packet: None,
            out_port: None,
            out_group: OFPG_ANY,
            flags: FlowModFlags::default(),
            pattern,
            instructions,
        }
    }
}

impl MessageType for FlowMod {
    fn size_of(fm: &FlowMod) -> usize {
        FLOW_MOD_FIXED_LEN + Match::size_of(&fm.pattern) + size_of_list(&fm.instructions)
    }

    fn parse(bytes: &mut OfpReader) -> Result<FlowMod, OfpSerializationError> {
        let cookie = bytes.read_u64()?;
        let cookie_mask = bytes.read_u64()?;
        let table_id = bytes.read_u8()?;
        let command = FlowModCmd::of_int(bytes.read_u8()?)?;
        let idle = Timeout::of_int(bytes.read_u16()?);
        let hard = Timeout::of_int(bytes.read_u16()?);
        let priority = bytes.read_u16()?;
        let apply_to_packet = match bytes.read_u32()? {
            OFP_NO_BUFFER => None,
            n => Some(n),
        };
        let out_port = PseudoPort::of_int(bytes.read_u32()?)?;
        let out_group = bytes.read_u32()?;
        let flags = FlowModFlags::of_int(bytes.read_u16()?)?;
        bytes.skip(2)?;
        let pattern = Match::parse(bytes)?;
        let instructions = parse_list_to_end(bytes)?;
        Ok(FlowMod {
            cookie,
            cookie_mask,
            table_id,
            command,
            idle_timeout: idle,
            hard_timeout: hard,
            priority,
            apply_to_packet,
            out_port,
            out_group,
            flags,
            pattern,
            instructions,
        })
    }

    fn marshal(fm: &FlowMod, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u64::<BigEndian>(fm.cookie)?;
        bytes.write_u64::<BigEndian>(fm.cookie_mask)?;
        bytes.write_u8(fm.table_id)?;
        bytes.write_u8(fm.command as u8)?;
        bytes.write_u16::<BigEndian>(Timeout::to_int(fm.idle_timeout))?;
        bytes.write_u16::<BigEndian>(Timeout::to_int(fm.hard_timeout))?;
        bytes.write_u16::<BigEndian>(fm.priority)?;
        bytes.write_u32::<BigEndian>(match fm.apply_to_packet {
                None => OFP_NO_BUFFER,
                Some(OFP_NO_BUFFER) => {
                    return Err(OfpSerializationError::invalid("buffer_id",
                                                              format!("{:#x}", OFP_NO_BUFFER)))
                }
                Some(buf_id) => buf_id,
            })?;
        PseudoPort::marshal_opt(fm.out_port, bytes)?;
        bytes.write_u32::<BigEndian>(fm.out_group)?;
        bytes.write_u16::<BigEndian>(FlowModFlags::to_int(fm.flags))?;
        write_padding_bytes(bytes, 2)?;
        Match::marshal(&fm.pattern, bytes)?;
        marshal_list(&fm.instructions, bytes)
    }
}

/// Why a flow entry was removed.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FlowRemovedReason {
    IdleTimeout = 0,
    HardTimeout = 1,
    Delete = 2,
    GroupDelete = 3,
}

impl FlowRemovedReason {
    pub fn of_int(reason: u8) -> Result<FlowRemovedReason, OfpSerializationError> {
        match reason {
            0 => Ok(FlowRemovedReason::IdleTimeout),
            1 => Ok(FlowRemovedReason::HardTimeout),
            2 => Ok(FlowRemovedReason::Delete),
            3 => Ok(FlowRemovedReason::GroupDelete),
            r => Err(OfpSerializationError::invalid("flow_removed reason", r)),
        }
    }
}

/// A flow entry was removed from a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRemoved {
    pub cookie: u64,
    pub priority: u16,
    pub reason: FlowRemovedReason,
    pub table_id: u8,
    pub duration_sec: u32,
    pub duration_nsec: u32,
    pub idle_timeout: Timeout,
    pub hard_timeout: Timeout,
    pub packet_count: u64,
    pub byte_count: u64,
    pub pattern: Match,
}

impl MessageType for FlowRemoved {
    fn size_of(f: &FlowRemoved) -> usize {
        40 + Match::size_of(&f.pattern)
    }

    fn parse(bytes: &mut OfpReader) -> Result<FlowRemoved, OfpSerializationError> {
        let cookie = bytes.read_u64()?;
        let priority = bytes.read_u16()?;
        let reason = FlowRemovedReason::of_int(bytes.read_u8()?)?;
        Ok(FlowRemoved {
            cookie,
            priority,
            reason,
            table_id: bytes.read_u8()?,
            duration_sec: bytes.read_u32()?,
            duration_nsec: bytes.read_u32()?,
            idle_timeout: Timeout::of_int(bytes.read_u16()?),
            hard_timeout: Timeout::of_int(bytes.read_u16()?),
            packet_count: bytes.read_u64()?,
            byte_count: bytes.read_u64()?,
            pattern: Match::parse(bytes)?,
        })
    }

    fn marshal(f: &FlowRemoved, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u64::<BigEndian>(f.cookie)?;
        bytes.write_u16::<BigEndian>(f.priority)?;
        bytes.write_u8(f.reason as u8)?;
        bytes.write_u8(f.table_id)?;
        bytes.write_u32::<BigEndian>(f.duration_sec)?;
        bytes.write_u32::<BigEndian>(f.duration_nsec)?;
        bytes.write_u16::<BigEndian>(Timeout::to_int(f.idle_timeout))?;
        bytes.write_u16::<BigEndian>(Timeout::to_int(f.hard_timeout))?;
        bytes.write_u64::<BigEndian>(f.packet_count)?;
        bytes.write_u64::<BigEndian>(f.byte_count)?;
        Match::marshal(&f.pattern, bytes)
    }
}

/// The reason a packet arrives at the controller.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PacketInReason {
    NoMatch = 0,
    /// An output-to-controller action sent it.
    ExplicitSend = 1,
    InvalidTtl = 2,
}

impl PacketInReason {
    pub fn of_int(reason: u8) -> Result<PacketInReason, OfpSerializationError> {
        match reason {
            0 => Ok(PacketInReason::NoMatch),
            1 => Ok(PacketInReason::ExplicitSend),
            2 => Ok(PacketInReason::InvalidTtl),
            r => Err(OfpSerializationError::invalid("packet_in reason", r)),
        }
    }
}

/// Represents packets received by the datapath and sent to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketIn {
    pub input_payload: Payload,
    /// Full length of the frame, which may exceed the data carried.
    pub total_len: u16,
    pub reason: PacketInReason,
    pub table_id: u8,
    /// Cookie of the flow entry that sent the packet.
    pub cookie: u64,
    /// Pipeline fields of the packet, including the input port.
    pub pattern: Match,
}

impl MessageType for PacketIn {
    fn size_of(pi: &PacketIn) -> usize {
        16 + Match::size_of(&pi.pattern) + 2 + Payload::size_of(&pi.input_payload)
    }

    fn parse(bytes: &mut OfpReader) -> Result<PacketIn, OfpSerializationError> {
        let buf_id = bytes.read_u32()?;
        let total_len = bytes.read_u16()?;
        let reason = PacketInReason::of_int(bytes.read_u8()?)?;
        let table_id = bytes.read_u8()?;
        let cookie = bytes.read_u64()?;
        let pattern = Match::parse(bytes)?;
        bytes.skip(2)?;
        let input_payload = Payload::make(buf_id, bytes.read_to_end()?);
        Ok(PacketIn {
            input_payload,
            total_len,
            reason,
            table_id,
            cookie,
            pattern,
        })
    }

    fn marshal(pi: &PacketIn, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        Payload::check(&pi.input_payload)?;
        bytes.write_u32::<BigEndian>(Payload::buffer_id(&pi.input_payload))?;
        bytes.write_u16::<BigEndian>(pi.total_len)?;
        bytes.write_u8(pi.reason as u8)?;
        bytes.write_u8(pi.table_id)?;
        bytes.write_u64::<BigEndian>(pi.cookie)?;
        Match::marshal(&pi.pattern, bytes)?;
        write_padding_bytes(bytes, 2)?;
        bytes.extend_from_slice(Payload::data(&pi.input_payload));
        Ok(())
    }
}

/// Send packet, either buffered on the switch or carried in the message, through actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketOut {
    pub output_payload: Payload,
    /// Port the packet is treated as having arrived on.
    pub in_port: Option<PseudoPort>,
    pub actions: Vec<Action>,
}

impl MessageType for PacketOut {
    fn size_of(po: &PacketOut) -> usize {
        16 + size_of_list(&po.actions) + Payload::size_of(&po.output_payload)
    }

    fn parse(bytes: &mut OfpReader) -> Result<PacketOut, OfpSerializationError> {
        let buf_id = bytes.read_u32()?;
        let in_port = PseudoPort::of_int(bytes.read_u32()?)?;
        let actions_len = bytes.read_u16()? as usize;
        bytes.skip(6)?;
        let actions = parse_list(bytes, actions_len)?;
        let output_payload = Payload::make(buf_id, bytes.read_to_end()?);
        Ok(PacketOut {
            output_payload,
            in_port,
            actions,
        })
    }

    fn marshal(po: &PacketOut, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        Payload::check(&po.output_payload)?;
        bytes.write_u32::<BigEndian>(Payload::buffer_id(&po.output_payload))?;
        PseudoPort::marshal_opt(po.in_port, bytes)?;
        bytes.write_u16::<BigEndian>(len_u16(size_of_list(&po.actions), "actions_len")?)?;
        write_padding_bytes(bytes, 6)?;
        marshal_list(&po.actions, bytes)?;
        bytes.extend_from_slice(Payload::data(&po.output_payload));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openflow0x04::oxm::Oxm;

    #[test]
    fn test_flow_mod_flags() {
        let flags = FlowModFlags {
            send_flow_rem: true,
            no_byt_counts: true,
            ..FlowModFlags::default()
        };
        assert_eq!(FlowModFlags::to_int(flags), 0x11);
        assert_eq!(FlowModFlags::of_int(0x11).unwrap(), flags);
        assert!(matches!(FlowModFlags::of_int(0x20),
                         Err(OfpSerializationError::InvalidFieldValue { .. })));
    }

    #[test]
    fn test_flow_mod_round_trip() {
        let mut fm = FlowMod::add_flow(100,
                                       Match::new(vec![Oxm::eth_type(0x0800),
                                                       Oxm::ipv4_dst_masked(0x0a000000,
                                                                            0xff000000)]),
                                       vec![Instruction::GotoTable(1)]);
        fm.flags.check_overlap = true;
        fm.out_port = Some(PseudoPort::PhysicalPort(3));
        fm.idle_timeout = Timeout::ExpiresAfter(30);
        let mut bytes = vec![];
        FlowMod::marshal(&fm, &mut bytes).unwrap();
        assert_eq!(bytes.len(), FlowMod::size_of(&fm));
        assert_eq!(FlowMod::parse(&mut OfpReader::new(&bytes)).unwrap(), fm);
    }

    #[test]
    fn test_flow_mod_buffer_id_sentinel() {
        let mut fm = FlowMod::add_flow(1, Match::match_all(), vec![]);
        fm.apply_to_packet = Some(OFP_NO_BUFFER);
        assert!(FlowMod::marshal(&fm, &mut vec![]).is_err());
    }

    #[test]
    fn test_packet_out_actions_span() {
        let po = PacketOut {
            output_payload: Payload::NotBuffered(vec![0xde, 0xad]),
            in_port: Some(PseudoPort::Controller),
            actions: vec![Action::output(PseudoPort::Flood, 0)],
        };
        let mut bytes = vec![];
        PacketOut::marshal(&po, &mut bytes).unwrap();
        assert_eq!(&bytes[..10], &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfd, 0x00, 0x10]);
        assert_eq!(bytes.len(), 34);
        assert_eq!(PacketOut::parse(&mut OfpReader::new(&bytes)).unwrap(), po);
    }

    #[test]
    fn test_packet_out_actions_len_overrun() {
        let mut bytes = vec![0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfd, 0x00, 0x10];
        bytes.extend_from_slice(&[0; 6]);
        bytes.extend_from_slice(&[0x00, 0x18, 0x00, 0x08, 0, 0, 0, 0]);
        assert!(matches!(PacketOut::parse(&mut OfpReader::new(&bytes)),
                         Err(OfpSerializationError::Malformed { .. })));
    }

    #[test]
    fn test_packet_in_reason() {
        let pi = PacketIn {
            input_payload: Payload::Buffered(7, vec![1, 2, 3]),
            total_len: 3,
            reason: PacketInReason::InvalidTtl,
            table_id: 0,
            cookie: 0,
            pattern: Match::new(vec![Oxm::in_port(1)]),
        };
        let mut bytes = vec![];
        PacketIn::marshal(&pi, &mut bytes).unwrap();
        assert_eq!(bytes.len(), PacketIn::size_of(&pi));
        assert_eq!(PacketIn::parse(&mut OfpReader::new(&bytes)).unwrap(), pi);
        bytes[6] = 9;
        assert!(PacketIn::parse(&mut OfpReader::new(&bytes)).is_err());
    }
}
