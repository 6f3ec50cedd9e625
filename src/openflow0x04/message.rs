use crate::ofp_header::{OfpHeader, OFP_VERSION};
use crate::ofp_list::{marshal_list, parse_list_to_end, size_of_list};
use crate::ofp_message::{OfpMessage, OfpSerializationError};
use crate::ofp_utils::{len_u16, OfpReader};

use super::*;

/// Abstractions of OpenFlow 1.3 messages mapping to message codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Hello(Vec<HelloElem>),
    Error(ErrorMsg),
    EchoRequest(Vec<u8>),
    EchoReply(Vec<u8>),
    Experimenter(ExperimenterMsg),
    FeaturesReq,
    FeaturesReply(SwitchFeatures),
    GetConfigRequest,
    GetConfigReply(SwitchConfig),
    SetConfig(SwitchConfig),
    PacketIn(PacketIn),
    FlowRemoved(FlowRemoved),
    PortStatus(PortStatus),
    PacketOut(PacketOut),
    FlowMod(FlowMod),
    GroupMod(GroupMod),
    PortMod(PortMod),
    TableMod(TableMod),
    MultipartRequest(MultipartRequest),
    MultipartReply(MultipartReply),
    BarrierRequest,
    BarrierReply,
    QueueGetConfigRequest(QueueGetConfigRequest),
    QueueGetConfigReply(QueueGetConfigReply),
    RoleRequest(RoleMsg),
    RoleReply(RoleMsg),
    GetAsyncRequest,
    GetAsyncReply(AsyncConfig),
    SetAsync(AsyncConfig),
    MeterMod(MeterMod),
}

impl Message {
    /// Map `Message` to associated OpenFlow message type code `MsgCode`.
    pub fn msg_code_of_message(msg: &Message) -> MsgCode {
        match *msg {
            Message::Hello(_) => MsgCode::Hello,
            Message::Error(_) => MsgCode::Error,
            Message::EchoRequest(_) => MsgCode::EchoReq,
            Message::EchoReply(_) => MsgCode::EchoResp,
            Message::Experimenter(_) => MsgCode::Experimenter,
            Message::FeaturesReq => MsgCode::FeaturesReq,
            Message::FeaturesReply(_) => MsgCode::FeaturesResp,
            Message::GetConfigRequest => MsgCode::GetConfigReq,
            Message::GetConfigReply(_) => MsgCode::GetConfigResp,
            Message::SetConfig(_) => MsgCode::SetConfig,
            Message::PacketIn(_) => MsgCode::PacketIn,
            Message::FlowRemoved(_) => MsgCode::FlowRemoved,
            Message::PortStatus(_) => MsgCode::PortStatus,
            Message::PacketOut(_) => MsgCode::PacketOut,
            Message::FlowMod(_) => MsgCode::FlowMod,
            Message::GroupMod(_) => MsgCode::GroupMod,
            Message::PortMod(_) => MsgCode::PortMod,
            Message::TableMod(_) => MsgCode::TableMod,
            Message::MultipartRequest(_) => MsgCode::MultipartReq,
            Message::MultipartReply(_) => MsgCode::MultipartResp,
            Message::BarrierRequest => MsgCode::BarrierReq,
            Message::BarrierReply => MsgCode::BarrierResp,
            Message::QueueGetConfigRequest(_) => MsgCode::QueueGetConfigReq,
            Message::QueueGetConfigReply(_) => MsgCode::QueueGetConfigResp,
            Message::RoleRequest(_) => MsgCode::RoleReq,
            Message::RoleReply(_) => MsgCode::RoleResp,
            Message::GetAsyncRequest => MsgCode::GetAsyncReq,
            Message::GetAsyncReply(_) => MsgCode::GetAsyncResp,
            Message::SetAsync(_) => MsgCode::SetAsync,
            Message::MeterMod(_) => MsgCode::MeterMod,
        }
    }

    /// Return the byte-size of the body of a `Message`, header excluded.
    fn size_of_body(msg: &Message) -> usize {
        match *msg {
            Message::Hello(ref elems) => size_of_list(elems),
            Message::Error(ref err) => ErrorMsg::size_of(err),
            Message::EchoRequest(ref buf) |
            Message::EchoReply(ref buf) => buf.len(),
            Message::Experimenter(ref exp) => ExperimenterMsg::size_of(exp),
            Message::FeaturesReq |
            Message::GetConfigRequest |
            Message::BarrierRequest |
            Message::BarrierReply |
            Message::GetAsyncRequest => 0,
            Message::FeaturesReply(ref feats) => SwitchFeatures::size_of(feats),
            Message::GetConfigReply(ref cfg) |
            Message::SetConfig(ref cfg) => SwitchConfig::size_of(cfg),
            Message::PacketIn(ref packet_in) => PacketIn::size_of(packet_in),
            Message::FlowRemoved(ref fr) => FlowRemoved::size_of(fr),
            Message::PortStatus(ref ps) => PortStatus::size_of(ps),
            Message::PacketOut(ref po) => PacketOut::size_of(po),
            Message::FlowMod(ref flow_mod) => FlowMod::size_of(flow_mod),
            Message::GroupMod(ref gm) => GroupMod::size_of(gm),
            Message::PortMod(ref pm) => PortMod::size_of(pm),
            Message::TableMod(ref tm) => TableMod::size_of(tm),
            Message::MultipartRequest(ref req) => MultipartRequest::size_of(req),
            Message::MultipartReply(ref rep) => MultipartReply::size_of(rep),
            Message::QueueGetConfigRequest(ref req) => QueueGetConfigRequest::size_of(req),
            Message::QueueGetConfigReply(ref rep) => QueueGetConfigReply::size_of(rep),
            Message::RoleRequest(ref role) |
            Message::RoleReply(ref role) => RoleMsg::size_of(role),
            Message::GetAsyncReply(ref cfg) |
            Message::SetAsync(ref cfg) => AsyncConfig::size_of(cfg),
            Message::MeterMod(ref mm) => MeterMod::size_of(mm),
        }
    }

    /// Marshal the body of the OpenFlow message `msg`.
    fn marshal_body(msg: &Message, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        match *msg {
            Message::Hello(ref elems) => marshal_list(elems, bytes),
            Message::Error(ref err) => ErrorMsg::marshal(err, bytes),
            Message::EchoRequest(ref buf) |
            Message::EchoReply(ref buf) => {
                bytes.extend_from_slice(buf);
                Ok(())
            }
            Message::Experimenter(ref exp) => ExperimenterMsg::marshal(exp, bytes),
            Message::FeaturesReq |
            Message::GetConfigRequest |
            Message::BarrierRequest |
            Message::BarrierReply |
            Message::GetAsyncRequest => Ok(()),
            Message::FeaturesReply(ref feats) => SwitchFeatures::marshal(feats, bytes),
            Message::GetConfigReply(ref cfg) |
            Message::SetConfig(ref cfg) => SwitchConfig::marshal(cfg, bytes),
            Message::PacketIn(ref packet_in) => PacketIn::marshal(packet_in, bytes),
            Message::FlowRemoved(ref fr) => FlowRemoved::marshal(fr, bytes),
            Message::PortStatus(ref ps) => PortStatus::marshal(ps, bytes),
            Message::PacketOut(ref po) => PacketOut::marshal(po, bytes),
            Message::FlowMod(ref flow_mod) => FlowMod::marshal(flow_mod, bytes),
            Message::GroupMod(ref gm) => GroupMod::marshal(gm, bytes),
            Message::PortMod(ref pm) => PortMod::marshal(pm, bytes),
            Message::TableMod(ref tm) => TableMod::marshal(tm, bytes),
            Message::MultipartRequest(ref req) => MultipartRequest::marshal(req, bytes),
            Message::MultipartReply(ref rep) => MultipartReply::marshal(rep, bytes),
            Message::QueueGetConfigRequest(ref req) => QueueGetConfigRequest::marshal(req, bytes),
            Message::QueueGetConfigReply(ref rep) => QueueGetConfigReply::marshal(rep, bytes),
            Message::RoleRequest(ref role) |
            Message::RoleReply(ref role) => RoleMsg::marshal(role, bytes),
            Message::GetAsyncReply(ref cfg) |
            Message::SetAsync(ref cfg) => AsyncConfig::marshal(cfg, bytes),
            Message::MeterMod(ref mm) => MeterMod::marshal(mm, bytes),
        }
    }

    fn parse_body(typ: MsgCode, bytes: &mut OfpReader) -> Result<Message, OfpSerializationError> {
        let msg = match typ {
            MsgCode::Hello => Message::Hello(parse_list_to_end(bytes)?),
            MsgCode::Error => Message::Error(ErrorMsg::parse(bytes)?),
            MsgCode::EchoReq => Message::EchoRequest(bytes.read_to_end()?),
            MsgCode::EchoResp => Message::EchoReply(bytes.read_to_end()?),
            MsgCode::Experimenter => Message::Experimenter(ExperimenterMsg::parse(bytes)?),
            MsgCode::FeaturesReq => Message::FeaturesReq,
            MsgCode::FeaturesResp => Message::FeaturesReply(SwitchFeatures::parse(bytes)?),
            MsgCode::GetConfigReq => Message::GetConfigRequest,
            MsgCode::GetConfigResp => Message::GetConfigReply(SwitchConfig::parse(bytes)?),
            MsgCode::SetConfig => Message::SetConfig(SwitchConfig::parse(bytes)?),
            MsgCode::PacketIn => Message::PacketIn(PacketIn::parse(bytes)?),
            MsgCode::FlowRemoved => Message::FlowRemoved(FlowRemoved::parse(bytes)?),
            MsgCode::PortStatus => Message::PortStatus(PortStatus::parse(bytes)?),
            MsgCode::PacketOut => Message::PacketOut(PacketOut::parse(bytes)?),
            MsgCode::FlowMod => Message::FlowMod(FlowMod::parse(bytes)?),
            MsgCode::GroupMod => Message::GroupMod(GroupMod::parse(bytes)?),
            MsgCode::PortMod => Message::PortMod(PortMod::parse(bytes)?),
            MsgCode::TableMod => Message::TableMod(TableMod::parse(bytes)?),
            MsgCode::MultipartReq => Message::MultipartRequest(MultipartRequest::parse(bytes)?),
            MsgCode::MultipartResp => Message::MultipartReply(MultipartReply::parse(bytes)?),
            MsgCode::BarrierReq => Message::BarrierRequest,
            MsgCode::BarrierResp => Message::BarrierReply,
            MsgCode::QueueGetConfigReq => {
                Message::QueueGetConfigRequest(QueueGetConfigRequest::parse(bytes)?)
            }
            MsgCode::QueueGetConfigResp => {
                Message::QueueGetConfigReply(QueueGetConfigReply::parse(bytes)?)
            }
            MsgCode::RoleReq => Message::RoleRequest(RoleMsg::parse(bytes)?),
            MsgCode::RoleResp => Message::RoleReply(RoleMsg::parse(bytes)?),
            MsgCode::GetAsyncReq => Message::GetAsyncRequest,
            MsgCode::GetAsyncResp => Message::GetAsyncReply(AsyncConfig::parse(bytes)?),
            MsgCode::SetAsync => Message::SetAsync(AsyncConfig::parse(bytes)?),
            MsgCode::MeterMod => Message::MeterMod(MeterMod::parse(bytes)?),
        };
        Ok(msg)
    }
}

impl OfpMessage for Message {
    fn size_of(msg: &Message) -> usize {
        OfpHeader::size() + Message::size_of_body(msg)
    }

    fn header_of(xid: u32, msg: &Message) -> Result<OfpHeader, OfpSerializationError> {
        let sizeof_buf = len_u16(<Message as OfpMessage>::size_of(msg), "message length")?;
        Ok(OfpHeader::new(OFP_VERSION,
                          Message::msg_code_of_message(msg) as u8,
                          sizeof_buf,
                          xid))
    }

    fn marshal(xid: u32, msg: &Message) -> Result<Vec<u8>, OfpSerializationError> {
        let hdr = Message::header_of(xid, msg)?;
        let mut bytes = Vec::with_capacity(hdr.length());
        OfpHeader::marshal(&mut bytes, &hdr)?;
        Message::marshal_body(msg, &mut bytes)?;
        debug!("Encoded {:?} message of {} bytes, xid {}",
               Message::msg_code_of_message(msg),
               bytes.len(),
               xid);
        Ok(bytes)
    }

    /// The reader must span exactly the body announced by `header`.
    fn parse(header: &OfpHeader, bytes: &mut OfpReader) -> Result<(u32, Message), OfpSerializationError> {
        if header.version() != OFP_VERSION && header.type_byte() != MsgCode::Hello as u8 {
            return Err(OfpSerializationError::UnsupportedVersion { version: header.version() });
        }
        let typ = header.type_code()?;
        let msg = Message::parse_body(typ, bytes)?;
        bytes.finish("message body")?;
        debug!("Decoded {:?} message of {} bytes, xid {}",
               typ,
               header.length(),
               header.xid());
        Ok((header.xid(), msg))
    }
}

/// Return a marshaled buffer holding `msg` under transaction id `xid`.
pub fn encode(xid: u32, msg: &Message) -> Result<Vec<u8>, OfpSerializationError> {
    Message::marshal(xid, msg)
}

/// Decode exactly one message from `buf`.
///
/// The buffer must hold the whole message and nothing else: a buffer shorter than the header
/// or than the length it announces is `Truncated`, and bytes past that length are `Malformed`.
pub fn decode(buf: &[u8]) -> Result<(OfpHeader, Message), OfpSerializationError> {
    let mut bytes = OfpReader::new(buf);
    let header = OfpHeader::parse(&mut bytes)?;
    let body_len = header.length() - OfpHeader::size();
    if body_len > bytes.remaining() {
        return Err(OfpSerializationError::Truncated {
            offset: bytes.offset(),
            needed: body_len,
            available: bytes.remaining(),
        });
    }
    if body_len < bytes.remaining() {
        return Err(OfpSerializationError::Malformed {
            what: "message",
            offset: header.length(),
            expected: header.length(),
            found: buf.len(),
        });
    }
    let mut body = bytes.slice(body_len)?;
    let (_, msg) = Message::parse(&header, &mut body)?;
    Ok((header, msg))
}

/// Return a `FlowMod` adding a flow parameterized by the given `priority`, `pattern`,
/// and `instructions`.
pub fn add_flow(prio: u16, pattern: Match, instructions: Vec<Instruction>) -> Message {
    Message::FlowMod(FlowMod::add_flow(prio, pattern, instructions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_only_messages() {
        for (msg, code) in vec![(Message::FeaturesReq, 5u8),
                                (Message::GetConfigRequest, 7),
                                (Message::BarrierRequest, 20),
                                (Message::BarrierReply, 21),
                                (Message::GetAsyncRequest, 26)] {
            let bytes = encode(0x12345678, &msg).unwrap();
            assert_eq!(bytes, vec![0x04, code, 0x00, 0x08, 0x12, 0x34, 0x56, 0x78]);
            let (header, parsed) = decode(&bytes).unwrap();
            assert_eq!(header.xid(), 0x12345678);
            assert_eq!(parsed, msg);
        }
    }

    #[test]
    fn test_echo_payload() {
        let msg = Message::EchoRequest(b"abc".to_vec());
        let bytes = encode(1, &msg).unwrap();
        assert_eq!(bytes.len(), 11);
        assert_eq!(decode(&bytes).unwrap().1, msg);
    }

    #[test]
    fn test_version_is_checked() {
        let bytes = [0x01, 0x02, 0x00, 0x08, 0, 0, 0, 1];
        assert!(matches!(decode(&bytes),
                         Err(OfpSerializationError::UnsupportedVersion { version: 1 })));
        let hello = [0x01, 0x00, 0x00, 0x08, 0, 0, 0, 1];
        assert_eq!(decode(&hello).unwrap().1, Message::Hello(vec![]));
    }

    #[test]
    fn test_unknown_message_type() {
        let bytes = [0x04, 30, 0x00, 0x08, 0, 0, 0, 1];
        assert!(matches!(decode(&bytes),
                         Err(OfpSerializationError::UnsupportedMessageType { code: 30 })));
    }

    #[test]
    fn test_envelope_boundaries() {
        assert!(matches!(decode(&[0x04, 0x00, 0x00]),
                         Err(OfpSerializationError::Truncated { .. })));
        assert!(matches!(decode(&[0x04, 0x02, 0x00, 0x0b, 0, 0, 0, 1, b'a']),
                         Err(OfpSerializationError::Truncated { needed: 3, available: 1, .. })));
        assert!(matches!(decode(&[0x04, 0x02, 0x00, 0x08, 0, 0, 0, 1, 0xff]),
                         Err(OfpSerializationError::Malformed { what: "message", .. })));
        assert!(matches!(decode(&[0x04, 0x02, 0x00, 0x04, 0, 0, 0, 1]),
                         Err(OfpSerializationError::Malformed { .. })));
    }

    #[test]
    fn test_body_must_be_consumed() {
        let bytes = [0x04, 0x09, 0x00, 0x0d, 0, 0, 0, 1, 0, 2, 0xff, 0xff, 0];
        assert!(matches!(decode(&bytes),
                         Err(OfpSerializationError::Malformed { what: "message body", .. })));
    }

    #[test]
    fn test_oversized_message() {
        let msg = Message::EchoReply(vec![0; 0x10000]);
        assert!(matches!(encode(0, &msg),
                         Err(OfpSerializationError::InvalidFieldValue { .. })));
    }
}
