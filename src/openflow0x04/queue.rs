use byteorder::{BigEndian, WriteBytesExt};

use crate::ofp_header::TlvHeader;
use crate::ofp_list::{marshal_list, parse_list_to_end, size_of_list, ListItem};
use crate::ofp_message::OfpSerializationError;
use crate::ofp_utils::{len_u16, length_at, write_padding_bytes, OfpReader};

use super::MessageType;

/// Queue property type codes.
#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum QueuePropType {
    MinRate = 1,
    MaxRate = 2,
    Experimenter = 0xffff,
}

impl QueuePropType {
    pub const ALL: [QueuePropType; 3] = [QueuePropType::MinRate,
                                         QueuePropType::MaxRate,
                                         QueuePropType::Experimenter];

    pub fn of_int(code: u16) -> Result<QueuePropType, OfpSerializationError> {
        QueuePropType::ALL
            .iter()
            .find(|t| **t as u16 == code)
            .copied()
            .ok_or(OfpSerializationError::UnsupportedProperty {
                what: "queue",
                code,
            })
    }
}

/// A property of a queue. Rates are in tenths of a percent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueProp {
    MinRate(u16),
    MaxRate(u16),
    Experimenter { experimenter: u32, data: Vec<u8> },
}

impl QueueProp {
    pub fn type_code(prop: &QueueProp) -> QueuePropType {
        match *prop {
            QueueProp::MinRate(_) => QueuePropType::MinRate,
            QueueProp::MaxRate(_) => QueuePropType::MaxRate,
            QueueProp::Experimenter { .. } => QueuePropType::Experimenter,
        }
    }

    pub fn default_of(typ: QueuePropType) -> QueueProp {
        match typ {
            QueuePropType::MinRate => QueueProp::MinRate(0),
            QueuePropType::MaxRate => QueueProp::MaxRate(0),
            QueuePropType::Experimenter => {
                QueueProp::Experimenter {
                    experimenter: 0,
                    data: vec![],
                }
            }
        }
    }
}

impl ListItem for QueueProp {
    const WHAT: &'static str = "queue property";
    const MIN_LEN: usize = 8;

    fn wire_len(head: &[u8]) -> usize {
        length_at(head, 2)
    }

    fn size_of(prop: &QueueProp) -> usize {
        match *prop {
            QueueProp::MinRate(_) |
            QueueProp::MaxRate(_) => 16,
            QueueProp::Experimenter { ref data, .. } => 16 + data.len(),
        }
    }

    fn parse(bytes: &mut OfpReader) -> Result<Option<QueueProp>, OfpSerializationError> {
        let header = TlvHeader::parse(bytes, Self::WHAT, Self::MIN_LEN)?;
        bytes.skip(4)?;
        let prop = match QueuePropType::of_int(header.typ)? {
            QueuePropType::MinRate => {
                let rate = bytes.read_u16()?;
                bytes.skip(6)?;
                QueueProp::MinRate(rate)
            }
            QueuePropType::MaxRate => {
                let rate = bytes.read_u16()?;
                bytes.skip(6)?;
                QueueProp::MaxRate(rate)
            }
            QueuePropType::Experimenter => {
                let experimenter = bytes.read_u32()?;
                bytes.skip(4)?;
                QueueProp::Experimenter {
                    experimenter,
                    data: bytes.read_to_end()?,
                }
            }
        };
        Ok(Some(prop))
    }

    fn marshal(prop: &QueueProp, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        TlvHeader::marshal(bytes,
                           TlvHeader::new(QueueProp::type_code(prop) as u16,
                                          len_u16(QueueProp::size_of(prop), "queue property length")?))?;
        write_padding_bytes(bytes, 4)?;
        match *prop {
            QueueProp::MinRate(rate) |
            QueueProp::MaxRate(rate) => {
                bytes.write_u16::<BigEndian>(rate)?;
                write_padding_bytes(bytes, 6)?;
            }
            QueueProp::Experimenter { experimenter, ref data } => {
                bytes.write_u32::<BigEndian>(experimenter)?;
                write_padding_bytes(bytes, 4)?;
                bytes.extend_from_slice(data);
            }
        }
        Ok(())
    }
}

/// A queue attached to a port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketQueue {
    pub queue_id: u32,
    pub port: u32,
    pub properties: Vec<QueueProp>,
}

const PACKET_QUEUE_HEADER_LEN: usize = 16;

impl ListItem for PacketQueue {
    const WHAT: &'static str = "packet queue";
    const MIN_LEN: usize = PACKET_QUEUE_HEADER_LEN;

    fn wire_len(head: &[u8]) -> usize {
        length_at(head, 8)
    }

    fn size_of(q: &PacketQueue) -> usize {
        PACKET_QUEUE_HEADER_LEN + size_of_list(&q.properties)
    }

    fn parse(bytes: &mut OfpReader) -> Result<Option<PacketQueue>, OfpSerializationError> {
        let queue_id = bytes.read_u32()?;
        let port = bytes.read_u32()?;
        bytes.skip(8)?;
        Ok(Some(PacketQueue {
            queue_id,
            port,
            properties: parse_list_to_end(bytes)?,
        }))
    }

    fn marshal(q: &PacketQueue, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u32::<BigEndian>(q.queue_id)?;
        bytes.write_u32::<BigEndian>(q.port)?;
        bytes.write_u16::<BigEndian>(len_u16(PacketQueue::size_of(q), "packet queue length")?)?;
        write_padding_bytes(bytes, 6)?;
        marshal_list(&q.properties, bytes)
    }
}

/// Query the queues configured on a port, or on all ports with `OFPP_ANY`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueueGetConfigRequest {
    pub port: u32,
}

impl MessageType for QueueGetConfigRequest {
    fn size_of(_: &QueueGetConfigRequest) -> usize {
        8
    }

    fn parse(bytes: &mut OfpReader) -> Result<QueueGetConfigRequest, OfpSerializationError> {
        let port = bytes.read_u32()?;
        bytes.skip(4)?;
        Ok(QueueGetConfigRequest { port })
    }

    fn marshal(req: &QueueGetConfigRequest,
               bytes: &mut Vec<u8>)
               -> Result<(), OfpSerializationError> {
        bytes.write_u32::<BigEndian>(req.port)?;
        write_padding_bytes(bytes, 4)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueueGetConfigReply {
    pub port: u32,
    pub queues: Vec<PacketQueue>,
}

impl MessageType for QueueGetConfigReply {
    fn size_of(rep: &QueueGetConfigReply) -> usize {
        8 + size_of_list(&rep.queues)
    }

    fn parse(bytes: &mut OfpReader) -> Result<QueueGetConfigReply, OfpSerializationError> {
        let port = bytes.read_u32()?;
        bytes.skip(4)?;
        Ok(QueueGetConfigReply {
            port,
            queues: parse_list_to_end(bytes)?,
        })
    }

    fn marshal(rep: &QueueGetConfigReply,
               bytes: &mut Vec<u8>)
               -> Result<(), OfpSerializationError> {
        bytes.write_u32::<BigEndian>(rep.port)?;
        write_padding_bytes(bytes, 4)?;
        marshal_list(&rep.queues, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_reply_lengths() {
        let rep = QueueGetConfigReply {
            port: 1,
            queues: vec![PacketQueue {
                             queue_id: 7,
                             port: 1,
                             properties: vec![QueueProp::MinRate(100), QueueProp::MaxRate(500)],
                         },
                         PacketQueue {
                             queue_id: 8,
                             port: 1,
                             properties: vec![],
                         }],
        };
        let mut bytes = vec![];
        QueueGetConfigReply::marshal(&rep, &mut bytes).unwrap();
        assert_eq!(bytes.len(), QueueGetConfigReply::size_of(&rep));
        assert_eq!(bytes.len(), 8 + 48 + 16);
        assert_eq!(&bytes[16..18], &[0x00, 0x30]);
        assert_eq!(&bytes[24..32], &[0x00, 0x01, 0x00, 0x10, 0, 0, 0, 0]);
        assert_eq!(QueueGetConfigReply::parse(&mut OfpReader::new(&bytes)).unwrap(), rep);
    }

    #[test]
    fn test_every_property_round_trips() {
        for typ in QueuePropType::ALL.iter() {
            let prop = QueueProp::default_of(*typ);
            let mut bytes = vec![];
            QueueProp::marshal(&prop, &mut bytes).unwrap();
            let parsed: Vec<QueueProp> = parse_list_to_end(&mut OfpReader::new(&bytes)).unwrap();
            assert_eq!(parsed, vec![prop]);
        }
    }

    #[test]
    fn test_unknown_property() {
        let bytes = [0x00, 0x03, 0x00, 0x10, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(parse_list_to_end::<QueueProp>(&mut OfpReader::new(&bytes)),
                         Err(OfpSerializationError::UnsupportedProperty { code: 3, .. })));
    }
}
