//! Multipart (statistics) requests and replies.
//!
//! Both directions share the `(type, flags, pad)` preamble; the body that follows is selected
//! by the type and differs between requests and replies.

use byteorder::{BigEndian, WriteBytesExt};

use crate::ofp_list::{marshal_list, parse_list_to_end, size_of_list, ListItem};
use crate::ofp_message::OfpSerializationError;
use crate::ofp_utils::{len_u16, length_at, write_fixed_size_string, write_padding_bytes,
                       OfpReader};

use super::flow::FlowModFlags;
use super::group::{Bucket, GroupType};
use super::instruction::Instruction;
use super::meter::MeterBand;
use super::oxm::Match;
use super::port::PortDesc;
use super::table_features::TableFeatures;
use super::{MessageType, Timeout};

/// More requests follow this one.
pub const OFPMPF_REQ_MORE: u16 = 1 << 0;
/// More replies follow this one.
pub const OFPMPF_REPLY_MORE: u16 = 1 << 0;

pub const DESC_STR_LEN: usize = 256;
pub const SERIAL_NUM_LEN: usize = 32;

/// Multipart type codes.
#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MultipartType {
    Desc = 0,
    Flow = 1,
    Aggregate = 2,
    Table = 3,
    PortStats = 4,
    Queue = 5,
    Group = 6,
    GroupDesc = 7,
    GroupFeatures = 8,
    Meter = 9,
    MeterConfig = 10,
    MeterFeatures = 11,
    TableFeatures = 12,
    PortDesc = 13,
    Experimenter = 0xffff,
}

impl MultipartType {
    pub const ALL: [MultipartType; 15] = [MultipartType::Desc,
                                          MultipartType::Flow,
                                          MultipartType::Aggregate,
                                          MultipartType::Table,
                                          MultipartType::PortStats,
                                          MultipartType::Queue,
                                          MultipartType::Group,
                                          MultipartType::GroupDesc,
                                          MultipartType::GroupFeatures,
                                          MultipartType::Meter,
                                          MultipartType::MeterConfig,
                                          MultipartType::MeterFeatures,
                                          MultipartType::TableFeatures,
                                          MultipartType::PortDesc,
                                          MultipartType::Experimenter];

    pub fn of_int(code: u16) -> Result<MultipartType, OfpSerializationError> {
        MultipartType::ALL
            .iter()
            .find(|t| **t as u16 == code)
            .copied()
            .ok_or(OfpSerializationError::UnsupportedMultipartType { code })
    }
}

/// A fixed-size record repeated to fill the rest of a multipart body.
macro_rules! fixed_size_item {
    ($t:ty, $what:expr, $len:expr) => {
        impl ListItem for $t {
            const WHAT: &'static str = $what;
            const MIN_LEN: usize = $len;

            fn wire_len(_: &[u8]) -> usize {
                $len
            }

            fn size_of(_: &$t) -> usize {
                $len
            }

            fn parse(bytes: &mut OfpReader) -> Result<Option<$t>, OfpSerializationError> {
                Ok(Some(<$t>::parse_fixed(bytes)?))
            }

            fn marshal(item: &$t, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
                <$t>::marshal_fixed(item, bytes)
            }
        }
    };
}

/// Filter selecting the flow entries covered by flow and aggregate stats requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowStatsRequest {
    /// Table to read, or `OFPTT_ALL`.
    pub table_id: u8,
    pub out_port: u32,
    pub out_group: u32,
    pub cookie: u64,
    pub cookie_mask: u64,
    pub pattern: Match,
}

impl MessageType for FlowStatsRequest {
    fn size_of(req: &FlowStatsRequest) -> usize {
        32 + Match::size_of(&req.pattern)
    }

    fn parse(bytes: &mut OfpReader) -> Result<FlowStatsRequest, OfpSerializationError> {
        let table_id = bytes.read_u8()?;
        bytes.skip(3)?;
        let out_port = bytes.read_u32()?;
        let out_group = bytes.read_u32()?;
        bytes.skip(4)?;
        Ok(FlowStatsRequest {
            table_id,
            out_port,
            out_group,
            cookie: bytes.read_u64()?,
            cookie_mask: bytes.read_u64()?,
            pattern: Match::parse(bytes)?,
        })
    }

    fn marshal(req: &FlowStatsRequest, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u8(req.table_id)?;
        write_padding_bytes(bytes, 3)?;
        bytes.write_u32::<BigEndian>(req.out_port)?;
        bytes.write_u32::<BigEndian>(req.out_group)?;
        write_padding_bytes(bytes, 4)?;
        bytes.write_u64::<BigEndian>(req.cookie)?;
        bytes.write_u64::<BigEndian>(req.cookie_mask)?;
        Match::marshal(&req.pattern, bytes)
    }
}

/// Vendor-defined multipart body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MultipartExperimenter {
    pub experimenter: u32,
    pub exp_type: u32,
    pub data: Vec<u8>,
}

impl MessageType for MultipartExperimenter {
    fn size_of(exp: &MultipartExperimenter) -> usize {
        8 + exp.data.len()
    }

    fn parse(bytes: &mut OfpReader) -> Result<MultipartExperimenter, OfpSerializationError> {
        Ok(MultipartExperimenter {
            experimenter: bytes.read_u32()?,
            exp_type: bytes.read_u32()?,
            data: bytes.read_to_end()?,
        })
    }

    fn marshal(exp: &MultipartExperimenter,
               bytes: &mut Vec<u8>)
               -> Result<(), OfpSerializationError> {
        bytes.write_u32::<BigEndian>(exp.experimenter)?;
        bytes.write_u32::<BigEndian>(exp.exp_type)?;
        bytes.extend_from_slice(&exp.data);
        Ok(())
    }
}

/// Write a `u32` selector followed by four bytes of padding.
fn marshal_id(id: u32, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
    bytes.write_u32::<BigEndian>(id)?;
    write_padding_bytes(bytes, 4)
}

fn parse_id(bytes: &mut OfpReader) -> Result<u32, OfpSerializationError> {
    let id = bytes.read_u32()?;
    bytes.skip(4)?;
    Ok(id)
}

/// Body of a multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartRequestBody {
    Desc,
    Flow(FlowStatsRequest),
    Aggregate(FlowStatsRequest),
    Table,
    /// Port to read, or `OFPP_ANY`.
    PortStats(u32),
    Queue { port_no: u32, queue_id: u32 },
    /// Group to read, or `OFPG_ALL`.
    Group(u32),
    GroupDesc,
    GroupFeatures,
    Meter(u32),
    MeterConfig(u32),
    MeterFeatures,
    /// Empty to query, non-empty to configure.
    TableFeatures(Vec<TableFeatures>),
    PortDesc,
    Experimenter(MultipartExperimenter),
}

impl MultipartRequestBody {
    pub fn type_code(body: &MultipartRequestBody) -> MultipartType {
        match *body {
            MultipartRequestBody::Desc => MultipartType::Desc,
            MultipartRequestBody::Flow(_) => MultipartType::Flow,
            MultipartRequestBody::Aggregate(_) => MultipartType::Aggregate,
            MultipartRequestBody::Table => MultipartType::Table,
            MultipartRequestBody::PortStats(_) => MultipartType::PortStats,
            MultipartRequestBody::Queue { .. } => MultipartType::Queue,
            MultipartRequestBody::Group(_) => MultipartType::Group,
            MultipartRequestBody::GroupDesc => MultipartType::GroupDesc,
            MultipartRequestBody::GroupFeatures => MultipartType::GroupFeatures,
            MultipartRequestBody::Meter(_) => MultipartType::Meter,
            MultipartRequestBody::MeterConfig(_) => MultipartType::MeterConfig,
            MultipartRequestBody::MeterFeatures => MultipartType::MeterFeatures,
            MultipartRequestBody::TableFeatures(_) => MultipartType::TableFeatures,
            MultipartRequestBody::PortDesc => MultipartType::PortDesc,
            MultipartRequestBody::Experimenter(_) => MultipartType::Experimenter,
        }
    }

    fn size_of(body: &MultipartRequestBody) -> usize {
        match *body {
            MultipartRequestBody::Desc |
            MultipartRequestBody::Table |
            MultipartRequestBody::GroupDesc |
            MultipartRequestBody::GroupFeatures |
            MultipartRequestBody::MeterFeatures |
            MultipartRequestBody::PortDesc => 0,
            MultipartRequestBody::Flow(ref req) |
            MultipartRequestBody::Aggregate(ref req) => FlowStatsRequest::size_of(req),
            MultipartRequestBody::PortStats(_) |
            MultipartRequestBody::Queue { .. } |
            MultipartRequestBody::Group(_) |
            MultipartRequestBody::Meter(_) |
            MultipartRequestBody::MeterConfig(_) => 8,
            MultipartRequestBody::TableFeatures(ref tfs) => size_of_list(tfs),
            MultipartRequestBody::Experimenter(ref exp) => MultipartExperimenter::size_of(exp),
        }
    }

    fn parse(typ: MultipartType,
             bytes: &mut OfpReader)
             -> Result<MultipartRequestBody, OfpSerializationError> {
        let body = match typ {
            MultipartType::Desc => MultipartRequestBody::Desc,
            MultipartType::Flow => MultipartRequestBody::Flow(FlowStatsRequest::parse(bytes)?),
            MultipartType::Aggregate => {
                MultipartRequestBody::Aggregate(FlowStatsRequest::parse(bytes)?)
            }
            MultipartType::Table => MultipartRequestBody::Table,
            MultipartType::PortStats => MultipartRequestBody::PortStats(parse_id(bytes)?),
            MultipartType::Queue => {
                MultipartRequestBody::Queue {
                    port_no: bytes.read_u32()?,
                    queue_id: bytes.read_u32()?,
                }
            }
            MultipartType::Group => MultipartRequestBody::Group(parse_id(bytes)?),
            MultipartType::GroupDesc => MultipartRequestBody::GroupDesc,
            MultipartType::GroupFeatures => MultipartRequestBody::GroupFeatures,
            MultipartType::Meter => MultipartRequestBody::Meter(parse_id(bytes)?),
            MultipartType::MeterConfig => MultipartRequestBody::MeterConfig(parse_id(bytes)?),
            MultipartType::MeterFeatures => MultipartRequestBody::MeterFeatures,
            MultipartType::TableFeatures => {
                MultipartRequestBody::TableFeatures(parse_list_to_end(bytes)?)
            }
            MultipartType::PortDesc => MultipartRequestBody::PortDesc,
            MultipartType::Experimenter => {
                MultipartRequestBody::Experimenter(MultipartExperimenter::parse(bytes)?)
            }
        };
        Ok(body)
    }

    fn marshal(body: &MultipartRequestBody,
               bytes: &mut Vec<u8>)
               -> Result<(), OfpSerializationError> {
        match *body {
            MultipartRequestBody::Desc |
            MultipartRequestBody::Table |
            MultipartRequestBody::GroupDesc |
            MultipartRequestBody::GroupFeatures |
            MultipartRequestBody::MeterFeatures |
            MultipartRequestBody::PortDesc => Ok(()),
            MultipartRequestBody::Flow(ref req) |
            MultipartRequestBody::Aggregate(ref req) => FlowStatsRequest::marshal(req, bytes),
            MultipartRequestBody::PortStats(id) |
            MultipartRequestBody::Group(id) |
            MultipartRequestBody::Meter(id) |
            MultipartRequestBody::MeterConfig(id) => marshal_id(id, bytes),
            MultipartRequestBody::Queue { port_no, queue_id } => {
                bytes.write_u32::<BigEndian>(port_no)?;
                bytes.write_u32::<BigEndian>(queue_id)?;
                Ok(())
            }
            MultipartRequestBody::TableFeatures(ref tfs) => marshal_list(tfs, bytes),
            MultipartRequestBody::Experimenter(ref exp) => MultipartExperimenter::marshal(exp, bytes),
        }
    }
}

/// A multipart request from the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartRequest {
    /// `OFPMPF_REQ_*` bits.
    pub flags: u16,
    pub body: MultipartRequestBody,
}

impl MessageType for MultipartRequest {
    fn size_of(req: &MultipartRequest) -> usize {
        8 + MultipartRequestBody::size_of(&req.body)
    }

    fn parse(bytes: &mut OfpReader) -> Result<MultipartRequest, OfpSerializationError> {
        let typ = MultipartType::of_int(bytes.read_u16()?)?;
        let flags = bytes.read_u16()?;
        bytes.skip(4)?;
        Ok(MultipartRequest {
            flags,
            body: MultipartRequestBody::parse(typ, bytes)?,
        })
    }

    fn marshal(req: &MultipartRequest, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u16::<BigEndian>(MultipartRequestBody::type_code(&req.body) as u16)?;
        bytes.write_u16::<BigEndian>(req.flags)?;
        write_padding_bytes(bytes, 4)?;
        MultipartRequestBody::marshal(&req.body, bytes)
    }
}

/// Description of the switch, as NUL padded strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SwitchDesc {
    pub mfr_desc: String,
    pub hw_desc: String,
    pub sw_desc: String,
    pub serial_num: String,
    /// Human readable description of the datapath.
    pub dp_desc: String,
}

impl MessageType for SwitchDesc {
    fn size_of(_: &SwitchDesc) -> usize {
        4 * DESC_STR_LEN + SERIAL_NUM_LEN
    }

    fn parse(bytes: &mut OfpReader) -> Result<SwitchDesc, OfpSerializationError> {
        Ok(SwitchDesc {
            mfr_desc: bytes.read_fixed_size_string(DESC_STR_LEN)?,
            hw_desc: bytes.read_fixed_size_string(DESC_STR_LEN)?,
            sw_desc: bytes.read_fixed_size_string(DESC_STR_LEN)?,
            serial_num: bytes.read_fixed_size_string(SERIAL_NUM_LEN)?,
            dp_desc: bytes.read_fixed_size_string(DESC_STR_LEN)?,
        })
    }

    fn marshal(desc: &SwitchDesc, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        write_fixed_size_string(bytes, &desc.mfr_desc, DESC_STR_LEN)?;
        write_fixed_size_string(bytes, &desc.hw_desc, DESC_STR_LEN)?;
        write_fixed_size_string(bytes, &desc.sw_desc, DESC_STR_LEN)?;
        write_fixed_size_string(bytes, &desc.serial_num, SERIAL_NUM_LEN)?;
        write_fixed_size_string(bytes, &desc.dp_desc, DESC_STR_LEN)
    }
}

/// Statistics of one flow entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowStats {
    pub table_id: u8,
    pub duration_sec: u32,
    pub duration_nsec: u32,
    pub priority: u16,
    pub idle_timeout: Timeout,
    pub hard_timeout: Timeout,
    pub flags: FlowModFlags,
    pub cookie: u64,
    pub packet_count: u64,
    pub byte_count: u64,
    pub pattern: Match,
    pub instructions: Vec<Instruction>,
}

const FLOW_STATS_FIXED_LEN: usize = 48;

impl ListItem for FlowStats {
    const WHAT: &'static str = "flow stats";
    const MIN_LEN: usize = FLOW_STATS_FIXED_LEN;

    fn wire_len(head: &[u8]) -> usize {
        length_at(head, 0)
    }

    fn size_of(fs: &FlowStats) -> usize {
        FLOW_STATS_FIXED_LEN + Match::size_of(&fs.pattern) + size_of_list(&fs.instructions)
    }

    fn parse(bytes: &mut OfpReader) -> Result<Option<FlowStats>, OfpSerializationError> {
        bytes.skip(2)?;
        let table_id = bytes.read_u8()?;
        bytes.skip(1)?;
        let duration_sec = bytes.read_u32()?;
        let duration_nsec = bytes.read_u32()?;
        let priority = bytes.read_u16()?;
        let idle_timeout = Timeout::of_int(bytes.read_u16()?);
        let hard_timeout = Timeout::of_int(bytes.read_u16()?);
        let flags = FlowModFlags::of_int(bytes.read_u16()?)?;
        bytes.skip(4)?;
        Ok(Some(FlowStats {
            table_id,
            duration_sec,
            duration_nsec,
            priority,
            idle_timeout,
            hard_timeout,
            flags,
            cookie: bytes.read_u64()?,
            packet_count: bytes.read_u64()?,
            byte_count: bytes.read_u64()?,
            pattern: Match::parse(bytes)?,
            instructions: parse_list_to_end(bytes)?,
        }))
    }

    fn marshal(fs: &FlowStats, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u16::<BigEndian>(len_u16(FlowStats::size_of(fs), "flow stats length")?)?;
        bytes.write_u8(fs.table_id)?;
        write_padding_bytes(bytes, 1)?;
        bytes.write_u32::<BigEndian>(fs.duration_sec)?;
        bytes.write_u32::<BigEndian>(fs.duration_nsec)?;
        bytes.write_u16::<BigEndian>(fs.priority)?;
        bytes.write_u16::<BigEndian>(Timeout::to_int(fs.idle_timeout))?;
        bytes.write_u16::<BigEndian>(Timeout::to_int(fs.hard_timeout))?;
        bytes.write_u16::<BigEndian>(FlowModFlags::to_int(fs.flags))?;
        write_padding_bytes(bytes, 4)?;
        bytes.write_u64::<BigEndian>(fs.cookie)?;
        bytes.write_u64::<BigEndian>(fs.packet_count)?;
        bytes.write_u64::<BigEndian>(fs.byte_count)?;
        Match::marshal(&fs.pattern, bytes)?;
        marshal_list(&fs.instructions, bytes)
    }
}

/// Totals over the flow entries selected by an aggregate request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AggregateStats {
    pub packet_count: u64,
    pub byte_count: u64,
    pub flow_count: u32,
}

impl MessageType for AggregateStats {
    fn size_of(_: &AggregateStats) -> usize {
        24
    }

    fn parse(bytes: &mut OfpReader) -> Result<AggregateStats, OfpSerializationError> {
        let stats = AggregateStats {
            packet_count: bytes.read_u64()?,
            byte_count: bytes.read_u64()?,
            flow_count: bytes.read_u32()?,
        };
        bytes.skip(4)?;
        Ok(stats)
    }

    fn marshal(stats: &AggregateStats, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u64::<BigEndian>(stats.packet_count)?;
        bytes.write_u64::<BigEndian>(stats.byte_count)?;
        bytes.write_u32::<BigEndian>(stats.flow_count)?;
        write_padding_bytes(bytes, 4)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableStats {
    pub table_id: u8,
    pub active_count: u32,
    pub lookup_count: u64,
    pub matched_count: u64,
}

impl TableStats {
    fn parse_fixed(bytes: &mut OfpReader) -> Result<TableStats, OfpSerializationError> {
        let table_id = bytes.read_u8()?;
        bytes.skip(3)?;
        Ok(TableStats {
            table_id,
            active_count: bytes.read_u32()?,
            lookup_count: bytes.read_u64()?,
            matched_count: bytes.read_u64()?,
        })
    }

    fn marshal_fixed(ts: &TableStats, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u8(ts.table_id)?;
        write_padding_bytes(bytes, 3)?;
        bytes.write_u32::<BigEndian>(ts.active_count)?;
        bytes.write_u64::<BigEndian>(ts.lookup_count)?;
        bytes.write_u64::<BigEndian>(ts.matched_count)?;
        Ok(())
    }
}

fixed_size_item!(TableStats, "table stats", 24);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortStats {
    pub port_no: u32,
    pub rx_packets: u64,
    pub tx_packets: u64,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_dropped: u64,
    pub tx_dropped: u64,
    pub rx_errors: u64,
    pub tx_errors: u64,
    pub rx_frame_err: u64,
    pub rx_over_err: u64,
    pub rx_crc_err: u64,
    pub collisions: u64,
    pub duration_sec: u32,
    pub duration_nsec: u32,
}

impl PortStats {
    fn parse_fixed(bytes: &mut OfpReader) -> Result<PortStats, OfpSerializationError> {
        let port_no = bytes.read_u32()?;
        bytes.skip(4)?;
        Ok(PortStats {
            port_no,
            rx_packets: bytes.read_u64()?,
            tx_packets: bytes.read_u64()?,
            rx_bytes: bytes.read_u64()?,
            tx_bytes: bytes.read_u64()?,
            rx_dropped: bytes.read_u64()?,
            tx_dropped: bytes.read_u64()?,
            rx_errors: bytes.read_u64()?,
            tx_errors: bytes.read_u64()?,
            rx_frame_err: bytes.read_u64()?,
            rx_over_err: bytes.read_u64()?,
            rx_crc_err: bytes.read_u64()?,
            collisions: bytes.read_u64()?,
            duration_sec: bytes.read_u32()?,
            duration_nsec: bytes.read_u32()?,
        })
    }

    fn marshal_fixed(ps: &PortStats, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u32::<BigEndian>(ps.port_no)?;
        write_padding_bytes(bytes, 4)?;
        for counter in &[ps.rx_packets,
                         ps.tx_packets,
                         ps.rx_bytes,
                         ps.tx_bytes,
                         ps.rx_dropped,
                         ps.tx_dropped,
                         ps.rx_errors,
                         ps.tx_errors,
                         ps.rx_frame_err,
                         ps.rx_over_err,
                         ps.rx_crc_err,
                         ps.collisions] {
            bytes.write_u64::<BigEndian>(*counter)?;
        }
        bytes.write_u32::<BigEndian>(ps.duration_sec)?;
        bytes.write_u32::<BigEndian>(ps.duration_nsec)?;
        Ok(())
    }
}

fixed_size_item!(PortStats, "port stats", 112);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueueStats {
    pub port_no: u32,
    pub queue_id: u32,
    pub tx_bytes: u64,
    pub tx_packets: u64,
    pub tx_errors: u64,
    pub duration_sec: u32,
    pub duration_nsec: u32,
}

impl QueueStats {
    fn parse_fixed(bytes: &mut OfpReader) -> Result<QueueStats, OfpSerializationError> {
        Ok(QueueStats {
            port_no: bytes.read_u32()?,
            queue_id: bytes.read_u32()?,
            tx_bytes: bytes.read_u64()?,
            tx_packets: bytes.read_u64()?,
            tx_errors: bytes.read_u64()?,
            duration_sec: bytes.read_u32()?,
            duration_nsec: bytes.read_u32()?,
        })
    }

    fn marshal_fixed(qs: &QueueStats, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u32::<BigEndian>(qs.port_no)?;
        bytes.write_u32::<BigEndian>(qs.queue_id)?;
        bytes.write_u64::<BigEndian>(qs.tx_bytes)?;
        bytes.write_u64::<BigEndian>(qs.tx_packets)?;
        bytes.write_u64::<BigEndian>(qs.tx_errors)?;
        bytes.write_u32::<BigEndian>(qs.duration_sec)?;
        bytes.write_u32::<BigEndian>(qs.duration_nsec)?;
        Ok(())
    }
}

fixed_size_item!(QueueStats, "queue stats", 40);

/// Packet and byte counters of a group bucket.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BucketCounter {
    pub packet_count: u64,
    pub byte_count: u64,
}

impl BucketCounter {
    fn parse_fixed(bytes: &mut OfpReader) -> Result<BucketCounter, OfpSerializationError> {
        Ok(BucketCounter {
            packet_count: bytes.read_u64()?,
            byte_count: bytes.read_u64()?,
        })
    }

    fn marshal_fixed(bc: &BucketCounter, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u64::<BigEndian>(bc.packet_count)?;
        bytes.write_u64::<BigEndian>(bc.byte_count)?;
        Ok(())
    }
}

fixed_size_item!(BucketCounter, "bucket counter", 16);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupStats {
    pub group_id: u32,
    /// Number of flow entries or groups forwarding to this group.
    pub ref_count: u32,
    pub packet_count: u64,
    pub byte_count: u64,
    pub duration_sec: u32,
    pub duration_nsec: u32,
    pub bucket_stats: Vec<BucketCounter>,
}

const GROUP_STATS_FIXED_LEN: usize = 40;

impl ListItem for GroupStats {
    const WHAT: &'static str = "group stats";
    const MIN_LEN: usize = GROUP_STATS_FIXED_LEN;

    fn wire_len(head: &[u8]) -> usize {
        length_at(head, 0)
    }

    fn size_of(gs: &GroupStats) -> usize {
        GROUP_STATS_FIXED_LEN + size_of_list(&gs.bucket_stats)
    }

    fn parse(bytes: &mut OfpReader) -> Result<Option<GroupStats>, OfpSerializationError> {
        bytes.skip(4)?;
        let group_id = bytes.read_u32()?;
        let ref_count = bytes.read_u32()?;
        bytes.skip(4)?;
        Ok(Some(GroupStats {
            group_id,
            ref_count,
            packet_count: bytes.read_u64()?,
            byte_count: bytes.read_u64()?,
            duration_sec: bytes.read_u32()?,
            duration_nsec: bytes.read_u32()?,
            bucket_stats: parse_list_to_end(bytes)?,
        }))
    }

    fn marshal(gs: &GroupStats, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u16::<BigEndian>(len_u16(GroupStats::size_of(gs), "group stats length")?)?;
        write_padding_bytes(bytes, 2)?;
        bytes.write_u32::<BigEndian>(gs.group_id)?;
        bytes.write_u32::<BigEndian>(gs.ref_count)?;
        write_padding_bytes(bytes, 4)?;
        bytes.write_u64::<BigEndian>(gs.packet_count)?;
        bytes.write_u64::<BigEndian>(gs.byte_count)?;
        bytes.write_u32::<BigEndian>(gs.duration_sec)?;
        bytes.write_u32::<BigEndian>(gs.duration_nsec)?;
        marshal_list(&gs.bucket_stats, bytes)
    }
}

/// A group and its buckets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDesc {
    pub group_type: GroupType,
    pub group_id: u32,
    pub buckets: Vec<Bucket>,
}

impl ListItem for GroupDesc {
    const WHAT: &'static str = "group desc";
    const MIN_LEN: usize = 8;

    fn wire_len(head: &[u8]) -> usize {
        length_at(head, 0)
    }

    fn size_of(gd: &GroupDesc) -> usize {
        8 + size_of_list(&gd.buckets)
    }

    fn parse(bytes: &mut OfpReader) -> Result<Option<GroupDesc>, OfpSerializationError> {
        bytes.skip(2)?;
        let group_type = GroupType::of_int(bytes.read_u8()?)?;
        bytes.skip(1)?;
        Ok(Some(GroupDesc {
            group_type,
            group_id: bytes.read_u32()?,
            buckets: parse_list_to_end(bytes)?,
        }))
    }

    fn marshal(gd: &GroupDesc, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u16::<BigEndian>(len_u16(GroupDesc::size_of(gd), "group desc length")?)?;
        bytes.write_u8(gd.group_type as u8)?;
        write_padding_bytes(bytes, 1)?;
        bytes.write_u32::<BigEndian>(gd.group_id)?;
        marshal_list(&gd.buckets, bytes)
    }
}

/// Group capabilities of the switch. Arrays are indexed by `GroupType`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupFeatures {
    /// Bitmap of supported `GroupType`s.
    pub types: u32,
    pub capabilities: u32,
    pub max_groups: [u32; 4],
    /// Bitmaps of `ActionType`s supported per group type.
    pub actions: [u32; 4],
}

impl MessageType for GroupFeatures {
    fn size_of(_: &GroupFeatures) -> usize {
        40
    }

    fn parse(bytes: &mut OfpReader) -> Result<GroupFeatures, OfpSerializationError> {
        let types = bytes.read_u32()?;
        let capabilities = bytes.read_u32()?;
        let mut max_groups = [0u32; 4];
        for g in max_groups.iter_mut() {
            *g = bytes.read_u32()?;
        }
        let mut actions = [0u32; 4];
        for a in actions.iter_mut() {
            *a = bytes.read_u32()?;
        }
        Ok(GroupFeatures {
            types,
            capabilities,
            max_groups,
            actions,
        })
    }

    fn marshal(gf: &GroupFeatures, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u32::<BigEndian>(gf.types)?;
        bytes.write_u32::<BigEndian>(gf.capabilities)?;
        for v in gf.max_groups.iter().chain(gf.actions.iter()) {
            bytes.write_u32::<BigEndian>(*v)?;
        }
        Ok(())
    }
}

/// Counters of one meter band.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeterBandStats {
    pub packet_band_count: u64,
    pub byte_band_count: u64,
}

impl MeterBandStats {
    fn parse_fixed(bytes: &mut OfpReader) -> Result<MeterBandStats, OfpSerializationError> {
        Ok(MeterBandStats {
            packet_band_count: bytes.read_u64()?,
            byte_band_count: bytes.read_u64()?,
        })
    }

    fn marshal_fixed(mbs: &MeterBandStats,
                     bytes: &mut Vec<u8>)
                     -> Result<(), OfpSerializationError> {
        bytes.write_u64::<BigEndian>(mbs.packet_band_count)?;
        bytes.write_u64::<BigEndian>(mbs.byte_band_count)?;
        Ok(())
    }
}

fixed_size_item!(MeterBandStats, "meter band stats", 16);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeterStats {
    pub meter_id: u32,
    pub flow_count: u32,
    pub packet_in_count: u64,
    pub byte_in_count: u64,
    pub duration_sec: u32,
    pub duration_nsec: u32,
    pub band_stats: Vec<MeterBandStats>,
}

const METER_STATS_FIXED_LEN: usize = 40;

impl ListItem for MeterStats {
    const WHAT: &'static str = "meter stats";
    const MIN_LEN: usize = METER_STATS_FIXED_LEN;

    fn wire_len(head: &[u8]) -> usize {
        length_at(head, 4)
    }

    fn size_of(ms: &MeterStats) -> usize {
        METER_STATS_FIXED_LEN + size_of_list(&ms.band_stats)
    }

    fn parse(bytes: &mut OfpReader) -> Result<Option<MeterStats>, OfpSerializationError> {
        let meter_id = bytes.read_u32()?;
        bytes.skip(8)?;
        Ok(Some(MeterStats {
            meter_id,
            flow_count: bytes.read_u32()?,
            packet_in_count: bytes.read_u64()?,
            byte_in_count: bytes.read_u64()?,
            duration_sec: bytes.read_u32()?,
            duration_nsec: bytes.read_u32()?,
            band_stats: parse_list_to_end(bytes)?,
        }))
    }

    fn marshal(ms: &MeterStats, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u32::<BigEndian>(ms.meter_id)?;
        bytes.write_u16::<BigEndian>(len_u16(MeterStats::size_of(ms), "meter stats length")?)?;
        write_padding_bytes(bytes, 6)?;
        bytes.write_u32::<BigEndian>(ms.flow_count)?;
        bytes.write_u64::<BigEndian>(ms.packet_in_count)?;
        bytes.write_u64::<BigEndian>(ms.byte_in_count)?;
        bytes.write_u32::<BigEndian>(ms.duration_sec)?;
        bytes.write_u32::<BigEndian>(ms.duration_nsec)?;
        marshal_list(&ms.band_stats, bytes)
    }
}

/// Meter capabilities of the switch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeterFeatures {
    pub max_meter: u32,
    /// Bitmap of supported `MeterBandType`s.
    pub band_types: u32,
    /// `OFPMF_*` bits.
    pub capabilities: u32,
    pub max_bands: u8,
    pub max_color: u8,
}

impl MessageType for MeterFeatures {
    fn size_of(_: &MeterFeatures) -> usize {
        16
    }

    fn parse(bytes: &mut OfpReader) -> Result<MeterFeatures, OfpSerializationError> {
        let mf = MeterFeatures {
            max_meter: bytes.read_u32()?,
            band_types: bytes.read_u32()?,
            capabilities: bytes.read_u32()?,
            max_bands: bytes.read_u8()?,
            max_color: bytes.read_u8()?,
        };
        bytes.skip(2)?;
        Ok(mf)
    }

    fn marshal(mf: &MeterFeatures, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u32::<BigEndian>(mf.max_meter)?;
        bytes.write_u32::<BigEndian>(mf.band_types)?;
        bytes.write_u32::<BigEndian>(mf.capabilities)?;
        bytes.write_u8(mf.max_bands)?;
        bytes.write_u8(mf.max_color)?;
        write_padding_bytes(bytes, 2)
    }
}

/// Body of a multipart reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartReplyBody {
    Desc(SwitchDesc),
    Flow(Vec<FlowStats>),
    Aggregate(AggregateStats),
    Table(Vec<TableStats>),
    PortStats(Vec<PortStats>),
    Queue(Vec<QueueStats>),
    Group(Vec<GroupStats>),
    GroupDesc(Vec<GroupDesc>),
    GroupFeatures(GroupFeatures),
    Meter(Vec<MeterStats>),
    /// Bands of the meters selected by the request.
    MeterConfig(Vec<MeterBand>),
    MeterFeatures(MeterFeatures),
    TableFeatures(Vec<TableFeatures>),
    PortDesc(Vec<PortDesc>),
    Experimenter(MultipartExperimenter),
}

impl MultipartReplyBody {
    pub fn type_code(body: &MultipartReplyBody) -> MultipartType {
        match *body {
            MultipartReplyBody::Desc(_) => MultipartType::Desc,
            MultipartReplyBody::Flow(_) => MultipartType::Flow,
            MultipartReplyBody::Aggregate(_) => MultipartType::Aggregate,
            MultipartReplyBody::Table(_) => MultipartType::Table,
            MultipartReplyBody::PortStats(_) => MultipartType::PortStats,
            MultipartReplyBody::Queue(_) => MultipartType::Queue,
            MultipartReplyBody::Group(_) => MultipartType::Group,
            MultipartReplyBody::GroupDesc(_) => MultipartType::GroupDesc,
            MultipartReplyBody::GroupFeatures(_) => MultipartType::GroupFeatures,
            MultipartReplyBody::Meter(_) => MultipartType::Meter,
            MultipartReplyBody::MeterConfig(_) => MultipartType::MeterConfig,
            MultipartReplyBody::MeterFeatures(_) => MultipartType::MeterFeatures,
            MultipartReplyBody::TableFeatures(_) => MultipartType::TableFeatures,
            MultipartReplyBody::PortDesc(_) => MultipartType::PortDesc,
            MultipartReplyBody::Experimenter(_) => MultipartType::Experimenter,
        }
    }

    fn size_of(body: &MultipartReplyBody) -> usize {
        match *body {
            MultipartReplyBody::Desc(ref d) => SwitchDesc::size_of(d),
            MultipartReplyBody::Flow(ref v) => size_of_list(v),
            MultipartReplyBody::Aggregate(ref a) => AggregateStats::size_of(a),
            MultipartReplyBody::Table(ref v) => size_of_list(v),
            MultipartReplyBody::PortStats(ref v) => size_of_list(v),
            MultipartReplyBody::Queue(ref v) => size_of_list(v),
            MultipartReplyBody::Group(ref v) => size_of_list(v),
            MultipartReplyBody::GroupDesc(ref v) => size_of_list(v),
            MultipartReplyBody::GroupFeatures(ref gf) => GroupFeatures::size_of(gf),
            MultipartReplyBody::Meter(ref v) => size_of_list(v),
            MultipartReplyBody::MeterConfig(ref v) => size_of_list(v),
            MultipartReplyBody::MeterFeatures(ref mf) => MeterFeatures::size_of(mf),
            MultipartReplyBody::TableFeatures(ref v) => size_of_list(v),
            MultipartReplyBody::PortDesc(ref v) => size_of_list(v),
            MultipartReplyBody::Experimenter(ref exp) => MultipartExperimenter::size_of(exp),
        }
    }

    fn parse(typ: MultipartType,
             bytes: &mut OfpReader)
             -> Result<MultipartReplyBody, OfpSerializationError> {
        let body = match typ {
            MultipartType::Desc => MultipartReplyBody::Desc(SwitchDesc::parse(bytes)?),
            MultipartType::Flow => MultipartReplyBody::Flow(parse_list_to_end(bytes)?),
            MultipartType::Aggregate => {
                MultipartReplyBody::Aggregate(AggregateStats::parse(bytes)?)
            }
            MultipartType::Table => MultipartReplyBody::Table(parse_list_to_end(bytes)?),
            MultipartType::PortStats => MultipartReplyBody::PortStats(parse_list_to_end(bytes)?),
            MultipartType::Queue => MultipartReplyBody::Queue(parse_list_to_end(bytes)?),
            MultipartType::Group => MultipartReplyBody::Group(parse_list_to_end(bytes)?),
            MultipartType::GroupDesc => MultipartReplyBody::GroupDesc(parse_list_to_end(bytes)?),
            MultipartType::GroupFeatures => {
                MultipartReplyBody::GroupFeatures(GroupFeatures::parse(bytes)?)
            }
            MultipartType::Meter => MultipartReplyBody::Meter(parse_list_to_end(bytes)?),
            MultipartType::MeterConfig => {
                MultipartReplyBody::MeterConfig(parse_list_to_end(bytes)?)
            }
            MultipartType::MeterFeatures => {
                MultipartReplyBody::MeterFeatures(MeterFeatures::parse(bytes)?)
            }
            MultipartType::TableFeatures => {
                MultipartReplyBody::TableFeatures(parse_list_to_end(bytes)?)
            }
            MultipartType::PortDesc => MultipartReplyBody::PortDesc(parse_list_to_end(bytes)?),
            MultipartType::Experimenter => {
                MultipartReplyBody::Experimenter(MultipartExperimenter::parse(bytes)?)
            }
        };
        Ok(body)
    }

    fn marshal(body: &MultipartReplyBody, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        match *body {
            MultipartReplyBody::Desc(ref d) => SwitchDesc::marshal(d, bytes),
            MultipartReplyBody::Flow(ref v) => marshal_list(v, bytes),
            MultipartReplyBody::Aggregate(ref a) => AggregateStats::marshal(a, bytes),
            MultipartReplyBody::Table(ref v) => marshal_list(v, bytes),
            MultipartReplyBody::PortStats(ref v) => marshal_list(v, bytes),
            MultipartReplyBody::Queue(ref v) => marshal_list(v, bytes),
            MultipartReplyBody::Group(ref v) => marshal_list(v, bytes),
            MultipartReplyBody::GroupDesc(ref v) => marshal_list(v, bytes),
            MultipartReplyBody::GroupFeatures(ref gf) => GroupFeatures::marshal(gf, bytes),
            MultipartReplyBody::Meter(ref v) => marshal_list(v, bytes),
            MultipartReplyBody::MeterConfig(ref v) => marshal_list(v, bytes),
            MultipartReplyBody::MeterFeatures(ref mf) => MeterFeatures::marshal(mf, bytes),
            MultipartReplyBody::TableFeatures(ref v) => marshal_list(v, bytes),
            MultipartReplyBody::PortDesc(ref v) => marshal_list(v, bytes),
            MultipartReplyBody::Experimenter(ref exp) => MultipartExperimenter::marshal(exp, bytes),
        }
    }
}

/// A multipart reply from the switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartReply {
    /// `OFPMPF_REPLY_*` bits.
    pub flags: u16,
    pub body: MultipartReplyBody,
}

impl MessageType for MultipartReply {
    fn size_of(rep: &MultipartReply) -> usize {
        8 + MultipartReplyBody::size_of(&rep.body)
    }

    fn parse(bytes: &mut OfpReader) -> Result<MultipartReply, OfpSerializationError> {
        let typ = MultipartType::of_int(bytes.read_u16()?)?;
        let flags = bytes.read_u16()?;
        bytes.skip(4)?;
        Ok(MultipartReply {
            flags,
            body: MultipartReplyBody::parse(typ, bytes)?,
        })
    }

    fn marshal(rep: &MultipartReply, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u16::<BigEndian>(MultipartReplyBody::type_code(&rep.body) as u16)?;
        bytes.write_u16::<BigEndian>(rep.flags)?;
        write_padding_bytes(bytes, 4)?;
        MultipartReplyBody::marshal(&rep.body, bytes)
    }
}
