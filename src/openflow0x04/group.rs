use byteorder::{BigEndian, WriteBytesExt};

use crate::ofp_list::{marshal_list, parse_list_to_end, size_of_list, ListItem};
use crate::ofp_message::OfpSerializationError;
use crate::ofp_utils::{len_u16, length_at, write_padding_bytes, OfpReader};

use super::action::Action;
use super::{MessageType, OFPG_ANY, OFPP_ANY};

/// Kind of group.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GroupType {
    /// Execute all buckets.
    All = 0,
    /// Execute one bucket, picked by the switch.
    Select = 1,
    Indirect = 2,
    /// Execute the first live bucket.
    FastFailover = 3,
}

impl GroupType {
    pub fn of_int(typ: u8) -> Result<GroupType, OfpSerializationError> {
        match typ {
            0 => Ok(GroupType::All),
            1 => Ok(GroupType::Select),
            2 => Ok(GroupType::Indirect),
            3 => Ok(GroupType::FastFailover),
            t => Err(OfpSerializationError::invalid("group type", t)),
        }
    }
}

/// Type of modification to perform on the group table.
#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GroupModCmd {
    Add = 0,
    Modify = 1,
    Delete = 2,
}

impl GroupModCmd {
    pub fn of_int(cmd: u16) -> Result<GroupModCmd, OfpSerializationError> {
        match cmd {
            0 => Ok(GroupModCmd::Add),
            1 => Ok(GroupModCmd::Modify),
            2 => Ok(GroupModCmd::Delete),
            c => Err(OfpSerializationError::invalid("group_mod command", c)),
        }
    }
}

/// A set of actions executed as one unit of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    /// Relative weight, only meaningful for select groups.
    pub weight: u16,
    /// Port whose liveness gates this bucket, for fast failover groups.
    pub watch_port: u32,
    pub watch_group: u32,
    pub actions: Vec<Action>,
}

const BUCKET_HEADER_LEN: usize = 16;

impl Bucket {
    /// A bucket watching nothing.
    pub fn new(weight: u16, actions: Vec<Action>) -> Bucket {
        Bucket {
            weight,
            watch_port: OFPP_ANY,
            watch_group: OFPG_ANY,
            actions,
        }
    }
}

impl ListItem for Bucket {
    const WHAT: &'static str = "bucket";
    const MIN_LEN: usize = BUCKET_HEADER_LEN;

    fn wire_len(head: &[u8]) -> usize {
        length_at(head, 0)
    }

    fn size_of(b: &Bucket) -> usize {
        BUCKET_HEADER_LEN + size_of_list(&b.actions)
    }

    fn parse(bytes: &mut OfpReader) -> Result<Option<Bucket>, OfpSerializationError> {
        bytes.skip(2)?;
        let weight = bytes.read_u16()?;
        let watch_port = bytes.read_u32()?;
        let watch_group = bytes.read_u32()?;
        bytes.skip(4)?;
        Ok(Some(Bucket {
            weight,
            watch_port,
            watch_group,
            actions: parse_list_to_end(bytes)?,
        }))
    }

    fn marshal(b: &Bucket, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u16::<BigEndian>(len_u16(Bucket::size_of(b), "bucket length")?)?;
        bytes.write_u16::<BigEndian>(b.weight)?;
        bytes.write_u32::<BigEndian>(b.watch_port)?;
        bytes.write_u32::<BigEndian>(b.watch_group)?;
        write_padding_bytes(bytes, 4)?;
        marshal_list(&b.actions, bytes)
    }
}

/// Represents modifications to the group table from the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMod {
    pub command: GroupModCmd,
    pub group_type: GroupType,
    pub group_id: u32,
    pub buckets: Vec<Bucket>,
}

impl MessageType for GroupMod {
    fn size_of(gm: &GroupMod) -> usize {
        8 + size_of_list(&gm.buckets)
    }

    fn parse(bytes: &mut OfpReader) -> Result<GroupMod, OfpSerializationError> {
        let command = GroupModCmd::of_int(bytes.read_u16()?)?;
        let group_type = GroupType::of_int(bytes.read_u8()?)?;
        bytes.skip(1)?;
        Ok(GroupMod {
            command,
            group_type,
            group_id: bytes.read_u32()?,
            buckets: parse_list_to_end(bytes)?,
        })
    }

    fn marshal(gm: &GroupMod, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u16::<BigEndian>(gm.command as u16)?;
        bytes.write_u8(gm.group_type as u8)?;
        write_padding_bytes(bytes, 1)?;
        bytes.write_u32::<BigEndian>(gm.group_id)?;
        marshal_list(&gm.buckets, bytes)
    }
}
