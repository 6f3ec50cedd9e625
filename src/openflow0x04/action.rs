use byteorder::{BigEndian, WriteBytesExt};

use crate::ofp_header::TlvHeader;
use crate::ofp_list::ListItem;
use crate::ofp_message::OfpSerializationError;
use crate::ofp_utils::{len_u16, length_at, pad_len, pad_to_8, write_padding_bytes, OfpReader};

use super::oxm::Oxm;
use super::PseudoPort;

/// Action type codes.
#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ActionType {
    Output = 0,
    CopyTtlOut = 11,
    CopyTtlIn = 12,
    SetMplsTtl = 15,
    DecMplsTtl = 16,
    PushVlan = 17,
    PopVlan = 18,
    PushMpls = 19,
    PopMpls = 20,
    SetQueue = 21,
    Group = 22,
    SetNwTtl = 23,
    DecNwTtl = 24,
    SetField = 25,
    PushPbb = 26,
    PopPbb = 27,
    Experimenter = 0xffff,
}

impl ActionType {
    pub const ALL: [ActionType; 17] = [ActionType::Output,
                                       ActionType::CopyTtlOut,
                                       ActionType::CopyTtlIn,
                                       ActionType::SetMplsTtl,
                                       ActionType::DecMplsTtl,
                                       ActionType::PushVlan,
                                       ActionType::PopVlan,
                                       ActionType::PushMpls,
                                       ActionType::PopMpls,
                                       ActionType::SetQueue,
                                       ActionType::Group,
                                       ActionType::SetNwTtl,
                                       ActionType::DecNwTtl,
                                       ActionType::SetField,
                                       ActionType::PushPbb,
                                       ActionType::PopPbb,
                                       ActionType::Experimenter];

    pub fn of_int(code: u16) -> Result<ActionType, OfpSerializationError> {
        ActionType::ALL
            .iter()
            .find(|t| **t as u16 == code)
            .copied()
            .ok_or(OfpSerializationError::UnsupportedActionType { code })
    }
}

/// Actions associated with flows, buckets and packets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Output { port: PseudoPort, max_len: u16 },
    CopyTtlOut,
    CopyTtlIn,
    SetMplsTtl(u8),
    DecMplsTtl,
    PushVlan(u16),
    PopVlan,
    PushMpls(u16),
    PopMpls(u16),
    SetQueue(u32),
    Group(u32),
    SetNwTtl(u8),
    DecNwTtl,
    SetField(Oxm),
    PushPbb(u16),
    PopPbb,
    Experimenter { experimenter: u32, data: Vec<u8> },
}

/// Size of the fixed-size actions that carry at most four bytes of arguments.
const ACTION_HEADER_ONLY_LEN: usize = 8;
const ACTION_OUTPUT_LEN: usize = 16;

impl Action {
    /// Output to `port`, sending at most `max_len` bytes when `port` is the controller.
    pub fn output(port: PseudoPort, max_len: u16) -> Action {
        Action::Output { port, max_len }
    }

    pub fn type_code(a: &Action) -> ActionType {
        match *a {
            Action::Output { .. } => ActionType::Output,
            Action::CopyTtlOut => ActionType::CopyTtlOut,
            Action::CopyTtlIn => ActionType::CopyTtlIn,
            Action::SetMplsTtl(_) => ActionType::SetMplsTtl,
            Action::DecMplsTtl => ActionType::DecMplsTtl,
            Action::PushVlan(_) => ActionType::PushVlan,
            Action::PopVlan => ActionType::PopVlan,
            Action::PushMpls(_) => ActionType::PushMpls,
            Action::PopMpls(_) => ActionType::PopMpls,
            Action::SetQueue(_) => ActionType::SetQueue,
            Action::Group(_) => ActionType::Group,
            Action::SetNwTtl(_) => ActionType::SetNwTtl,
            Action::DecNwTtl => ActionType::DecNwTtl,
            Action::SetField(_) => ActionType::SetField,
            Action::PushPbb(_) => ActionType::PushPbb,
            Action::PopPbb => ActionType::PopPbb,
            Action::Experimenter { .. } => ActionType::Experimenter,
        }
    }

    /// An action of the given type with zeroed arguments.
    pub fn default_of(typ: ActionType) -> Action {
        match typ {
            ActionType::Output => Action::output(PseudoPort::PhysicalPort(0), 0),
            ActionType::CopyTtlOut => Action::CopyTtlOut,
            ActionType::CopyTtlIn => Action::CopyTtlIn,
            ActionType::SetMplsTtl => Action::SetMplsTtl(0),
            ActionType::DecMplsTtl => Action::DecMplsTtl,
            ActionType::PushVlan => Action::PushVlan(0),
            ActionType::PopVlan => Action::PopVlan,
            ActionType::PushMpls => Action::PushMpls(0),
            ActionType::PopMpls => Action::PopMpls(0),
            ActionType::SetQueue => Action::SetQueue(0),
            ActionType::Group => Action::Group(0),
            ActionType::SetNwTtl => Action::SetNwTtl(0),
            ActionType::DecNwTtl => Action::DecNwTtl,
            ActionType::SetField => Action::SetField(Oxm::in_port(0)),
            ActionType::PushPbb => Action::PushPbb(0),
            ActionType::PopPbb => Action::PopPbb,
            ActionType::Experimenter => {
                Action::Experimenter {
                    experimenter: 0,
                    data: vec![],
                }
            }
        }
    }

    fn parse_body(typ: ActionType,
                  bytes: &mut OfpReader)
                  -> Result<Action, OfpSerializationError> {
        let action = match typ {
            ActionType::Output => {
                let port = PseudoPort::make(bytes.read_u32()?)?;
                let max_len = bytes.read_u16()?;
                bytes.skip(6)?;
                Action::Output { port, max_len }
            }
            ActionType::CopyTtlOut => Action::skip_pad(bytes, Action::CopyTtlOut)?,
            ActionType::CopyTtlIn => Action::skip_pad(bytes, Action::CopyTtlIn)?,
            ActionType::DecMplsTtl => Action::skip_pad(bytes, Action::DecMplsTtl)?,
            ActionType::PopVlan => Action::skip_pad(bytes, Action::PopVlan)?,
            ActionType::DecNwTtl => Action::skip_pad(bytes, Action::DecNwTtl)?,
            ActionType::PopPbb => Action::skip_pad(bytes, Action::PopPbb)?,
            ActionType::SetMplsTtl => {
                let ttl = bytes.read_u8()?;
                bytes.skip(3)?;
                Action::SetMplsTtl(ttl)
            }
            ActionType::SetNwTtl => {
                let ttl = bytes.read_u8()?;
                bytes.skip(3)?;
                Action::SetNwTtl(ttl)
            }
            ActionType::PushVlan => Action::PushVlan(Action::read_ethertype(bytes)?),
            ActionType::PushMpls => Action::PushMpls(Action::read_ethertype(bytes)?),
            ActionType::PopMpls => Action::PopMpls(Action::read_ethertype(bytes)?),
            ActionType::PushPbb => Action::PushPbb(Action::read_ethertype(bytes)?),
            ActionType::SetQueue => Action::SetQueue(bytes.read_u32()?),
            ActionType::Group => Action::Group(bytes.read_u32()?),
            ActionType::SetField => {
                let field = match Oxm::parse(bytes)? {
                    Some(oxm) => oxm,
                    None => return Err(OfpSerializationError::invalid("set_field", "empty")),
                };
                let consumed = TlvHeader::size() + Oxm::size_of(&field);
                bytes.skip(pad_len(consumed))?;
                Action::SetField(field)
            }
            ActionType::Experimenter => {
                let experimenter = bytes.read_u32()?;
                let data = bytes.read_to_end()?;
                Action::Experimenter { experimenter, data }
            }
        };
        Ok(action)
    }

    fn skip_pad(bytes: &mut OfpReader, action: Action) -> Result<Action, OfpSerializationError> {
        bytes.skip(4)?;
        Ok(action)
    }

    fn read_ethertype(bytes: &mut OfpReader) -> Result<u16, OfpSerializationError> {
        let ethertype = bytes.read_u16()?;
        bytes.skip(2)?;
        Ok(ethertype)
    }
}

impl ListItem for Action {
    const WHAT: &'static str = "action";
    const MIN_LEN: usize = 4;

    fn wire_len(head: &[u8]) -> usize {
        length_at(head, 2)
    }

    fn size_of(a: &Action) -> usize {
        match *a {
            Action::Output { .. } => ACTION_OUTPUT_LEN,
            Action::SetField(ref oxm) => pad_to_8(TlvHeader::size() + Oxm::size_of(oxm)),
            Action::Experimenter { ref data, .. } => ACTION_HEADER_ONLY_LEN + data.len(),
            _ => ACTION_HEADER_ONLY_LEN,
        }
    }

    fn parse(bytes: &mut OfpReader) -> Result<Option<Action>, OfpSerializationError> {
        let offset = bytes.offset();
        let header = TlvHeader::parse(bytes, Self::WHAT, Self::MIN_LEN)?;
        header.check_multiple(Self::WHAT, offset, 8)?;
        let typ = ActionType::of_int(header.typ)?;
        Ok(Some(Action::parse_body(typ, bytes)?))
    }

    fn marshal(act: &Action, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        let len = Action::size_of(act);
        if len % 8 != 0 {
            return Err(OfpSerializationError::invalid("action length", len));
        }
        TlvHeader::marshal(bytes,
                           TlvHeader::new(Action::type_code(act) as u16,
                                          len_u16(len, "action length")?))?;
        match *act {
            Action::Output { port, max_len } => {
                PseudoPort::marshal(port, bytes)?;
                bytes.write_u16::<BigEndian>(max_len)?;
                write_padding_bytes(bytes, 6)?;
            }
            Action::CopyTtlOut | Action::CopyTtlIn | Action::DecMplsTtl | Action::PopVlan |
            Action::DecNwTtl | Action::PopPbb => write_padding_bytes(bytes, 4)?,
            Action::SetMplsTtl(ttl) |
            Action::SetNwTtl(ttl) => {
                bytes.write_u8(ttl)?;
                write_padding_bytes(bytes, 3)?;
            }
            Action::PushVlan(ethertype) |
            Action::PushMpls(ethertype) |
            Action::PopMpls(ethertype) |
            Action::PushPbb(ethertype) => {
                bytes.write_u16::<BigEndian>(ethertype)?;
                write_padding_bytes(bytes, 2)?;
            }
            Action::SetQueue(id) |
            Action::Group(id) => bytes.write_u32::<BigEndian>(id)?,
            Action::SetField(ref oxm) => {
                Oxm::marshal(oxm, bytes)?;
                write_padding_bytes(bytes, pad_len(TlvHeader::size() + Oxm::size_of(oxm)))?;
            }
            Action::Experimenter { experimenter, ref data } => {
                bytes.write_u32::<BigEndian>(experimenter)?;
                bytes.extend_from_slice(data);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ofp_list::{marshal_list, parse_list_to_end};

    fn round_trip(actions: &[Action]) -> Vec<u8> {
        let mut bytes = vec![];
        marshal_list(actions, &mut bytes).unwrap();
        let parsed: Vec<Action> = parse_list_to_end(&mut OfpReader::new(&bytes)).unwrap();
        assert_eq!(parsed, actions);
        bytes
    }

    #[test]
    fn test_output_and_dec_nw_ttl() {
        let bytes = round_trip(&[Action::output(PseudoPort::PhysicalPort(2), 0xffff),
                                 Action::DecNwTtl]);
        assert_eq!(bytes,
                   vec![0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x02, 0xff, 0xff, 0, 0, 0, 0,
                        0, 0, 0x00, 0x18, 0x00, 0x08, 0, 0, 0, 0]);
    }

    #[test]
    fn test_every_type_is_padded() {
        for typ in ActionType::ALL.iter() {
            let action = Action::default_of(*typ);
            assert_eq!(Action::type_code(&action), *typ);
            assert_eq!(ActionType::of_int(*typ as u16).unwrap(), *typ);
            let bytes = round_trip(&[action.clone()]);
            assert_eq!(bytes.len() % 8, 0);
            assert_eq!(bytes.len(), Action::size_of(&action));
        }
    }

    #[test]
    fn test_set_field_padding() {
        let action = Action::SetField(Oxm::eth_dst([1, 2, 3, 4, 5, 6]));
        let bytes = round_trip(&[action]);
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[..4], &[0x00, 0x19, 0x00, 0x10]);
        assert_eq!(&bytes[14..], &[0, 0]);
    }

    #[test]
    fn test_experimenter_must_align() {
        let ok = Action::Experimenter {
            experimenter: 0x2320,
            data: vec![1, 2, 3, 4, 5, 6, 7, 8],
        };
        round_trip(&[ok]);
        let unaligned = Action::Experimenter {
            experimenter: 0x2320,
            data: vec![1, 2, 3],
        };
        assert!(matches!(Action::marshal(&unaligned, &mut vec![]),
                         Err(OfpSerializationError::InvalidFieldValue { .. })));
    }

    #[test]
    fn test_unknown_action_type() {
        let bytes = [0x00, 0x01, 0x00, 0x08, 0, 0, 0, 0];
        assert!(matches!(parse_list_to_end::<Action>(&mut OfpReader::new(&bytes)),
                         Err(OfpSerializationError::UnsupportedActionType { code: 1 })));
    }

    #[test]
    fn test_declared_length_too_long() {
        let bytes = [0x00, 0x18, 0x00, 0x10, 0, 0, 0, 0];
        assert!(matches!(parse_list_to_end::<Action>(&mut OfpReader::new(&bytes)),
                         Err(OfpSerializationError::Malformed { .. })));
        let trailing = [0x00, 0x18, 0x00, 0x0c, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(parse_list_to_end::<Action>(&mut OfpReader::new(&trailing)),
                         Err(OfpSerializationError::Malformed { .. })));
    }

    #[test]
    fn test_length_must_be_multiple_of_8() {
        let bytes = [0xff, 0xff, 0x00, 0x0c, 0x00, 0x00, 0x23, 0x20, 0x01, 0x02, 0x03, 0x04];
        match parse_list_to_end::<Action>(&mut OfpReader::new(&bytes)) {
            Err(OfpSerializationError::Malformed { what, offset, expected, found }) => {
                assert_eq!(what, "action");
                assert_eq!((offset, expected, found), (0, 16, 12));
            }
            r => panic!("expected malformed, got {:?}", r),
        }
    }
}
