use byteorder::{BigEndian, WriteBytesExt};

use crate::ofp_header::TlvHeader;
use crate::ofp_list::{marshal_list, parse_list_to_end, size_of_list, ListItem};
use crate::ofp_message::OfpSerializationError;
use crate::ofp_utils::{len_u16, length_at, write_padding_bytes, OfpReader};

use super::action::Action;

/// Instruction type codes.
#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum InstructionType {
    GotoTable = 1,
    WriteMetadata = 2,
    WriteActions = 3,
    ApplyActions = 4,
    ClearActions = 5,
    Meter = 6,
    Experimenter = 0xffff,
}

impl InstructionType {
    pub const ALL: [InstructionType; 7] = [InstructionType::GotoTable,
                                           InstructionType::WriteMetadata,
                                           InstructionType::WriteActions,
                                           InstructionType::ApplyActions,
                                           InstructionType::ClearActions,
                                           InstructionType::Meter,
                                           InstructionType::Experimenter];

    pub fn of_int(code: u16) -> Result<InstructionType, OfpSerializationError> {
        InstructionType::ALL
            .iter()
            .find(|t| **t as u16 == code)
            .copied()
            .ok_or(OfpSerializationError::UnsupportedInstructionType { code })
    }
}

/// What to do with packets matching a flow entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Continue the pipeline at the given table.
    GotoTable(u8),
    WriteMetadata { metadata: u64, metadata_mask: u64 },
    /// Merge actions into the packet's action set.
    WriteActions(Vec<Action>),
    /// Run actions immediately.
    ApplyActions(Vec<Action>),
    ClearActions,
    Meter(u32),
    Experimenter { experimenter: u32, data: Vec<u8> },
}

impl Instruction {
    pub fn type_code(i: &Instruction) -> InstructionType {
        match *i {
            Instruction::GotoTable(_) => InstructionType::GotoTable,
            Instruction::WriteMetadata { .. } => InstructionType::WriteMetadata,
            Instruction::WriteActions(_) => InstructionType::WriteActions,
            Instruction::ApplyActions(_) => InstructionType::ApplyActions,
            Instruction::ClearActions => InstructionType::ClearActions,
            Instruction::Meter(_) => InstructionType::Meter,
            Instruction::Experimenter { .. } => InstructionType::Experimenter,
        }
    }

    /// An instruction of the given type with zeroed arguments and no actions.
    pub fn default_of(typ: InstructionType) -> Instruction {
        match typ {
            InstructionType::GotoTable => Instruction::GotoTable(0),
            InstructionType::WriteMetadata => {
                Instruction::WriteMetadata {
                    metadata: 0,
                    metadata_mask: 0,
                }
            }
            InstructionType::WriteActions => Instruction::WriteActions(vec![]),
            InstructionType::ApplyActions => Instruction::ApplyActions(vec![]),
            InstructionType::ClearActions => Instruction::ClearActions,
            InstructionType::Meter => Instruction::Meter(0),
            InstructionType::Experimenter => {
                Instruction::Experimenter {
                    experimenter: 0,
                    data: vec![],
                }
            }
        }
    }
}

impl ListItem for Instruction {
    const WHAT: &'static str = "instruction";
    const MIN_LEN: usize = 4;

    fn wire_len(head: &[u8]) -> usize {
        length_at(head, 2)
    }

    fn size_of(i: &Instruction) -> usize {
        let body = match *i {
            Instruction::WriteMetadata { .. } => 20,
            Instruction::WriteActions(ref acts) |
            Instruction::ApplyActions(ref acts) => 4 + size_of_list(acts),
            Instruction::Experimenter { ref data, .. } => 4 + data.len(),
            Instruction::GotoTable(_) |
            Instruction::ClearActions |
            Instruction::Meter(_) => 4,
        };
        TlvHeader::size() + body
    }

    fn parse(bytes: &mut OfpReader) -> Result<Option<Instruction>, OfpSerializationError> {
        let offset = bytes.offset();
        let header = TlvHeader::parse(bytes, Self::WHAT, Self::MIN_LEN)?;
        header.check_multiple(Self::WHAT, offset, 8)?;
        let inst = match InstructionType::of_int(header.typ)? {
            InstructionType::GotoTable => {
                let table_id = bytes.read_u8()?;
                bytes.skip(3)?;
                Instruction::GotoTable(table_id)
            }
            InstructionType::WriteMetadata => {
                bytes.skip(4)?;
                Instruction::WriteMetadata {
                    metadata: bytes.read_u64()?,
                    metadata_mask: bytes.read_u64()?,
                }
            }
            InstructionType::WriteActions => {
                bytes.skip(4)?;
                Instruction::WriteActions(parse_list_to_end(bytes)?)
            }
            InstructionType::ApplyActions => {
                bytes.skip(4)?;
                Instruction::ApplyActions(parse_list_to_end(bytes)?)
            }
            InstructionType::ClearActions => {
                bytes.skip(4)?;
                Instruction::ClearActions
            }
            InstructionType::Meter => Instruction::Meter(bytes.read_u32()?),
            InstructionType::Experimenter => {
                Instruction::Experimenter {
                    experimenter: bytes.read_u32()?,
                    data: bytes.read_to_end()?,
                }
            }
        };
        Ok(Some(inst))
    }

    fn marshal(inst: &Instruction, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        let len = Instruction::size_of(inst);
        if len % 8 != 0 {
            return Err(OfpSerializationError::invalid("instruction length", len));
        }
        TlvHeader::marshal(bytes,
                           TlvHeader::new(Instruction::type_code(inst) as u16,
                                          len_u16(len, "instruction length")?))?;
        match *inst {
            Instruction::GotoTable(table_id) => {
                bytes.write_u8(table_id)?;
                write_padding_bytes(bytes, 3)?;
            }
            Instruction::WriteMetadata { metadata, metadata_mask } => {
                write_padding_bytes(bytes, 4)?;
                bytes.write_u64::<BigEndian>(metadata)?;
                bytes.write_u64::<BigEndian>(metadata_mask)?;
            }
            Instruction::WriteActions(ref acts) |
            Instruction::ApplyActions(ref acts) => {
                write_padding_bytes(bytes, 4)?;
                marshal_list(acts, bytes)?;
            }
            Instruction::ClearActions => write_padding_bytes(bytes, 4)?,
            Instruction::Meter(meter_id) => bytes.write_u32::<BigEndian>(meter_id)?,
            Instruction::Experimenter { experimenter, ref data } => {
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
    use crate::openflow0x04::PseudoPort;

    fn marshal(inst: &Instruction) -> Vec<u8> {
        let mut bytes = vec![];
        Instruction::marshal(inst, &mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_goto_table() {
        let bytes = marshal(&Instruction::GotoTable(5));
        assert_eq!(bytes, vec![0x00, 0x01, 0x00, 0x08, 0x05, 0x00, 0x00, 0x00]);
        let parsed: Vec<Instruction> = parse_list_to_end(&mut OfpReader::new(&bytes)).unwrap();
        assert_eq!(parsed, vec![Instruction::GotoTable(5)]);
    }

    #[test]
    fn test_apply_actions_length() {
        let inst = Instruction::ApplyActions(vec![Action::output(PseudoPort::Controller, 0xffe5),
                                                  Action::PopVlan]);
        let bytes = marshal(&inst);
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[..4], &[0x00, 0x04, 0x00, 0x20]);
        let parsed: Vec<Instruction> = parse_list_to_end(&mut OfpReader::new(&bytes)).unwrap();
        assert_eq!(parsed, vec![inst]);
    }

    #[test]
    fn test_every_type_round_trips() {
        for typ in InstructionType::ALL.iter() {
            let inst = Instruction::default_of(*typ);
            assert_eq!(Instruction::type_code(&inst), *typ);
            let bytes = marshal(&inst);
            assert_eq!(bytes.len() % 8, 0);
            let parsed: Vec<Instruction> = parse_list_to_end(&mut OfpReader::new(&bytes)).unwrap();
            assert_eq!(parsed, vec![inst]);
        }
    }

    #[test]
    fn test_unknown_instruction_type() {
        let bytes = [0x00, 0x07, 0x00, 0x08, 0, 0, 0, 0];
        assert!(matches!(parse_list_to_end::<Instruction>(&mut OfpReader::new(&bytes)),
                         Err(OfpSerializationError::UnsupportedInstructionType { code: 7 })));
    }

    #[test]
    fn test_length_must_be_multiple_of_8() {
        let bytes = [0xff, 0xff, 0x00, 0x0c, 0x00, 0x00, 0x23, 0x20, 0x01, 0x02, 0x03, 0x04];
        match parse_list_to_end::<Instruction>(&mut OfpReader::new(&bytes)) {
            Err(OfpSerializationError::Malformed { what, offset, expected, found }) => {
                assert_eq!(what, "instruction");
                assert_eq!((offset, expected, found), (0, 16, 12));
            }
            r => panic!("expected malformed, got {:?}", r),
        }
    }
}
