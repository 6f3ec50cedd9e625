//! Table features, as exchanged in table-features multipart requests and replies.

use byteorder::{BigEndian, WriteBytesExt};

use crate::ofp_header::TlvHeader;
use crate::ofp_list::{marshal_list, parse_list_to_end, size_of_list, ListItem};
use crate::ofp_message::OfpSerializationError;
use crate::ofp_utils::{len_u16, length_at, pad_len, pad_to_8, write_fixed_size_string,
                       write_padding_bytes, OfpReader};

pub const OFP_MAX_TABLE_NAME_LEN: usize = 32;

/// Table feature property type codes.
#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TableFeaturePropType {
    Instructions = 0,
    InstructionsMiss = 1,
    NextTables = 2,
    NextTablesMiss = 3,
    WriteActions = 4,
    WriteActionsMiss = 5,
    ApplyActions = 6,
    ApplyActionsMiss = 7,
    Match = 8,
    Wildcards = 10,
    WriteSetfield = 12,
    WriteSetfieldMiss = 13,
    ApplySetfield = 14,
    ApplySetfieldMiss = 15,
    Experimenter = 0xfffe,
    ExperimenterMiss = 0xffff,
}

impl TableFeaturePropType {
    pub const ALL: [TableFeaturePropType; 16] = [TableFeaturePropType::Instructions,
                                                 TableFeaturePropType::InstructionsMiss,
                                                 TableFeaturePropType::NextTables,
                                                 TableFeaturePropType::NextTablesMiss,
                                                 TableFeaturePropType::WriteActions,
                                                 TableFeaturePropType::WriteActionsMiss,
                                                 TableFeaturePropType::ApplyActions,
                                                 TableFeaturePropType::ApplyActionsMiss,
                                                 TableFeaturePropType::Match,
                                                 TableFeaturePropType::Wildcards,
                                                 TableFeaturePropType::WriteSetfield,
                                                 TableFeaturePropType::WriteSetfieldMiss,
                                                 TableFeaturePropType::ApplySetfield,
                                                 TableFeaturePropType::ApplySetfieldMiss,
                                                 TableFeaturePropType::Experimenter,
                                                 TableFeaturePropType::ExperimenterMiss];

    pub fn of_int(code: u16) -> Result<TableFeaturePropType, OfpSerializationError> {
        TableFeaturePropType::ALL
            .iter()
            .find(|t| **t as u16 == code)
            .copied()
            .ok_or(OfpSerializationError::UnsupportedProperty {
                what: "table feature",
                code,
            })
    }
}

/// An instruction or action type supported by a table: its `(type, length)` header and, for
/// experimenter types, whatever follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureId {
    pub typ: u16,
    pub data: Vec<u8>,
}

impl FeatureId {
    pub fn new(typ: u16) -> FeatureId {
        FeatureId { typ, data: vec![] }
    }
}

impl ListItem for FeatureId {
    const WHAT: &'static str = "feature id";
    const MIN_LEN: usize = 4;

    fn wire_len(head: &[u8]) -> usize {
        length_at(head, 2)
    }

    fn size_of(id: &FeatureId) -> usize {
        TlvHeader::size() + id.data.len()
    }

    fn parse(bytes: &mut OfpReader) -> Result<Option<FeatureId>, OfpSerializationError> {
        let header = TlvHeader::parse(bytes, Self::WHAT, Self::MIN_LEN)?;
        Ok(Some(FeatureId {
            typ: header.typ,
            data: bytes.read_to_end()?,
        }))
    }

    fn marshal(id: &FeatureId, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        TlvHeader::marshal(bytes,
                           TlvHeader::new(id.typ, len_u16(FeatureId::size_of(id), "feature id length")?))?;
        bytes.extend_from_slice(&id.data);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableFeatureExperimenter {
    pub experimenter: u32,
    pub exp_type: u32,
    pub data: Vec<u8>,
}

/// A capability of a flow table. The `*Miss` variants describe the table-miss flow entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableFeatureProp {
    Instructions(Vec<FeatureId>),
    InstructionsMiss(Vec<FeatureId>),
    /// Tables reachable with goto-table.
    NextTables(Vec<u8>),
    NextTablesMiss(Vec<u8>),
    WriteActions(Vec<FeatureId>),
    WriteActionsMiss(Vec<FeatureId>),
    ApplyActions(Vec<FeatureId>),
    ApplyActionsMiss(Vec<FeatureId>),
    /// OXM headers of the fields the table can match on.
    Match(Vec<u32>),
    Wildcards(Vec<u32>),
    WriteSetfield(Vec<u32>),
    WriteSetfieldMiss(Vec<u32>),
    ApplySetfield(Vec<u32>),
    ApplySetfieldMiss(Vec<u32>),
    Experimenter(TableFeatureExperimenter),
    ExperimenterMiss(TableFeatureExperimenter),
}

/// The shapes a property body can take.
enum PropBody<'a> {
    Ids(&'a [FeatureId]),
    Tables(&'a [u8]),
    Oxms(&'a [u32]),
    Experimenter(&'a TableFeatureExperimenter),
}

impl TableFeatureProp {
    pub fn type_code(prop: &TableFeatureProp) -> TableFeaturePropType {
        use self::TableFeatureProp as P;
        use self::TableFeaturePropType as T;
        match *prop {
            P::Instructions(_) => T::Instructions,
            P::InstructionsMiss(_) => T::InstructionsMiss,
            P::NextTables(_) => T::NextTables,
            P::NextTablesMiss(_) => T::NextTablesMiss,
            P::WriteActions(_) => T::WriteActions,
            P::WriteActionsMiss(_) => T::WriteActionsMiss,
            P::ApplyActions(_) => T::ApplyActions,
            P::ApplyActionsMiss(_) => T::ApplyActionsMiss,
            P::Match(_) => T::Match,
            P::Wildcards(_) => T::Wildcards,
            P::WriteSetfield(_) => T::WriteSetfield,
            P::WriteSetfieldMiss(_) => T::WriteSetfieldMiss,
            P::ApplySetfield(_) => T::ApplySetfield,
            P::ApplySetfieldMiss(_) => T::ApplySetfieldMiss,
            P::Experimenter(_) => T::Experimenter,
            P::ExperimenterMiss(_) => T::ExperimenterMiss,
        }
    }

    /// A property of the given type with an empty body.
    pub fn default_of(typ: TableFeaturePropType) -> TableFeatureProp {
        use self::TableFeatureProp as P;
        use self::TableFeaturePropType as T;
        match typ {
            T::Instructions => P::Instructions(vec![]),
            T::InstructionsMiss => P::InstructionsMiss(vec![]),
            T::NextTables => P::NextTables(vec![]),
            T::NextTablesMiss => P::NextTablesMiss(vec![]),
            T::WriteActions => P::WriteActions(vec![]),
            T::WriteActionsMiss => P::WriteActionsMiss(vec![]),
            T::ApplyActions => P::ApplyActions(vec![]),
            T::ApplyActionsMiss => P::ApplyActionsMiss(vec![]),
            T::Match => P::Match(vec![]),
            T::Wildcards => P::Wildcards(vec![]),
            T::WriteSetfield => P::WriteSetfield(vec![]),
            T::WriteSetfieldMiss => P::WriteSetfieldMiss(vec![]),
            T::ApplySetfield => P::ApplySetfield(vec![]),
            T::ApplySetfieldMiss => P::ApplySetfieldMiss(vec![]),
            T::Experimenter => P::Experimenter(TableFeatureExperimenter::default()),
            T::ExperimenterMiss => P::ExperimenterMiss(TableFeatureExperimenter::default()),
        }
    }

    fn body(prop: &TableFeatureProp) -> PropBody<'_> {
        use self::TableFeatureProp as P;
        match *prop {
            P::Instructions(ref ids) |
            P::InstructionsMiss(ref ids) |
            P::WriteActions(ref ids) |
            P::WriteActionsMiss(ref ids) |
            P::ApplyActions(ref ids) |
            P::ApplyActionsMiss(ref ids) => PropBody::Ids(ids),
            P::NextTables(ref tables) |
            P::NextTablesMiss(ref tables) => PropBody::Tables(tables),
            P::Match(ref oxms) |
            P::Wildcards(ref oxms) |
            P::WriteSetfield(ref oxms) |
            P::WriteSetfieldMiss(ref oxms) |
            P::ApplySetfield(ref oxms) |
            P::ApplySetfieldMiss(ref oxms) => PropBody::Oxms(oxms),
            P::Experimenter(ref exp) |
            P::ExperimenterMiss(ref exp) => PropBody::Experimenter(exp),
        }
    }

    /// Value of the property's `length` field, which leaves out the trailing padding.
    fn length(prop: &TableFeatureProp) -> usize {
        let body = match TableFeatureProp::body(prop) {
            PropBody::Ids(ids) => size_of_list(ids),
            PropBody::Tables(tables) => tables.len(),
            PropBody::Oxms(oxms) => 4 * oxms.len(),
            PropBody::Experimenter(exp) => 8 + exp.data.len(),
        };
        TlvHeader::size() + body
    }

    fn read_oxm_ids(bytes: &mut OfpReader) -> Result<Vec<u32>, OfpSerializationError> {
        let remaining = bytes.remaining();
        if remaining % 4 != 0 {
            return Err(OfpSerializationError::Malformed {
                what: "oxm id",
                offset: bytes.offset(),
                expected: (remaining + 3) / 4 * 4,
                found: remaining,
            });
        }
        let mut oxms = vec![];
        while !bytes.is_empty() {
            oxms.push(bytes.read_u32()?);
        }
        Ok(oxms)
    }

    fn read_experimenter(bytes: &mut OfpReader)
                         -> Result<TableFeatureExperimenter, OfpSerializationError> {
        Ok(TableFeatureExperimenter {
            experimenter: bytes.read_u32()?,
            exp_type: bytes.read_u32()?,
            data: bytes.read_to_end()?,
        })
    }

    fn parse_body(typ: TableFeaturePropType,
                  bytes: &mut OfpReader)
                  -> Result<TableFeatureProp, OfpSerializationError> {
        use self::TableFeatureProp as P;
        use self::TableFeaturePropType as T;
        let prop = match typ {
            T::Instructions => P::Instructions(parse_list_to_end(bytes)?),
            T::InstructionsMiss => P::InstructionsMiss(parse_list_to_end(bytes)?),
            T::NextTables => P::NextTables(bytes.read_to_end()?),
            T::NextTablesMiss => P::NextTablesMiss(bytes.read_to_end()?),
            T::WriteActions => P::WriteActions(parse_list_to_end(bytes)?),
            T::WriteActionsMiss => P::WriteActionsMiss(parse_list_to_end(bytes)?),
            T::ApplyActions => P::ApplyActions(parse_list_to_end(bytes)?),
            T::ApplyActionsMiss => P::ApplyActionsMiss(parse_list_to_end(bytes)?),
            T::Match => P::Match(TableFeatureProp::read_oxm_ids(bytes)?),
            T::Wildcards => P::Wildcards(TableFeatureProp::read_oxm_ids(bytes)?),
            T::WriteSetfield => P::WriteSetfield(TableFeatureProp::read_oxm_ids(bytes)?),
            T::WriteSetfieldMiss => P::WriteSetfieldMiss(TableFeatureProp::read_oxm_ids(bytes)?),
            T::ApplySetfield => P::ApplySetfield(TableFeatureProp::read_oxm_ids(bytes)?),
            T::ApplySetfieldMiss => P::ApplySetfieldMiss(TableFeatureProp::read_oxm_ids(bytes)?),
            T::Experimenter => P::Experimenter(TableFeatureProp::read_experimenter(bytes)?),
            T::ExperimenterMiss => P::ExperimenterMiss(TableFeatureProp::read_experimenter(bytes)?),
        };
        Ok(prop)
    }
}

impl ListItem for TableFeatureProp {
    const WHAT: &'static str = "table feature property";
    const MIN_LEN: usize = 4;

    fn wire_len(head: &[u8]) -> usize {
        pad_to_8(length_at(head, 2))
    }

    fn size_of(prop: &TableFeatureProp) -> usize {
        pad_to_8(TableFeatureProp::length(prop))
    }

    fn parse(bytes: &mut OfpReader) -> Result<Option<TableFeatureProp>, OfpSerializationError> {
        let header = TlvHeader::parse(bytes, Self::WHAT, Self::MIN_LEN)?;
        let typ = TableFeaturePropType::of_int(header.typ)?;
        let mut body = bytes.slice(header.body_len())?;
        let prop = TableFeatureProp::parse_body(typ, &mut body)?;
        body.finish(Self::WHAT)?;
        bytes.skip(pad_len(header.length as usize))?;
        Ok(Some(prop))
    }

    fn marshal(prop: &TableFeatureProp, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        let length = TableFeatureProp::length(prop);
        TlvHeader::marshal(bytes,
                           TlvHeader::new(TableFeatureProp::type_code(prop) as u16,
                                          len_u16(length, "table feature property length")?))?;
        match TableFeatureProp::body(prop) {
            PropBody::Ids(ids) => marshal_list(ids, bytes)?,
            PropBody::Tables(tables) => bytes.extend_from_slice(tables),
            PropBody::Oxms(oxms) => {
                for oxm in oxms {
                    bytes.write_u32::<BigEndian>(*oxm)?;
                }
            }
            PropBody::Experimenter(exp) => {
                bytes.write_u32::<BigEndian>(exp.experimenter)?;
                bytes.write_u32::<BigEndian>(exp.exp_type)?;
                bytes.extend_from_slice(&exp.data);
            }
        }
        write_padding_bytes(bytes, pad_len(length))
    }
}

/// Features of one flow table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableFeatures {
    pub table_id: u8,
    pub name: String,
    /// Bits of metadata the table can match on.
    pub metadata_match: u64,
    /// Bits of metadata the table can write.
    pub metadata_write: u64,
    pub config: u32,
    pub max_entries: u32,
    pub properties: Vec<TableFeatureProp>,
}

const TABLE_FEATURES_HEADER_LEN: usize = 64;

impl ListItem for TableFeatures {
    const WHAT: &'static str = "table features";
    const MIN_LEN: usize = TABLE_FEATURES_HEADER_LEN;

    fn wire_len(head: &[u8]) -> usize {
        length_at(head, 0)
    }

    fn size_of(tf: &TableFeatures) -> usize {
        TABLE_FEATURES_HEADER_LEN + size_of_list(&tf.properties)
    }

    fn parse(bytes: &mut OfpReader) -> Result<Option<TableFeatures>, OfpSerializationError> {
        bytes.skip(2)?;
        let table_id = bytes.read_u8()?;
        bytes.skip(5)?;
        let name = bytes.read_fixed_size_string(OFP_MAX_TABLE_NAME_LEN)?;
        Ok(Some(TableFeatures {
            table_id,
            name,
            metadata_match: bytes.read_u64()?,
            metadata_write: bytes.read_u64()?,
            config: bytes.read_u32()?,
            max_entries: bytes.read_u32()?,
            properties: parse_list_to_end(bytes)?,
        }))
    }

    fn marshal(tf: &TableFeatures, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u16::<BigEndian>(len_u16(TableFeatures::size_of(tf), "table features length")?)?;
        bytes.write_u8(tf.table_id)?;
        write_padding_bytes(bytes, 5)?;
        write_fixed_size_string(bytes, &tf.name, OFP_MAX_TABLE_NAME_LEN)?;
        bytes.write_u64::<BigEndian>(tf.metadata_match)?;
        bytes.write_u64::<BigEndian>(tf.metadata_write)?;
        bytes.write_u32::<BigEndian>(tf.config)?;
        bytes.write_u32::<BigEndian>(tf.max_entries)?;
        marshal_list(&tf.properties, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openflow0x04::{ActionType, InstructionType, Oxm};

    fn round_trip(prop: &TableFeatureProp) -> Vec<u8> {
        let mut bytes = vec![];
        TableFeatureProp::marshal(prop, &mut bytes).unwrap();
        assert_eq!(bytes.len(), TableFeatureProp::size_of(prop));
        let parsed: Vec<TableFeatureProp> = parse_list_to_end(&mut OfpReader::new(&bytes)).unwrap();
        assert_eq!(parsed, vec![prop.clone()]);
        bytes
    }

    #[test]
    fn test_action_ids() {
        let prop = TableFeatureProp::ApplyActions(vec![FeatureId::new(ActionType::Output as u16),
                                                       FeatureId::new(ActionType::PopVlan as u16)]);
        let bytes = round_trip(&prop);
        assert_eq!(bytes,
                   vec![0x00, 0x06, 0x00, 0x0c, 0x00, 0x00, 0x00, 0x04, 0x00, 0x12, 0x00, 0x04,
                        0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_instruction_ids_with_experimenter() {
        let prop = TableFeatureProp::InstructionsMiss(vec![
            FeatureId::new(InstructionType::GotoTable as u16),
            FeatureId {
                typ: InstructionType::Experimenter as u16,
                data: vec![0x00, 0x00, 0x23, 0x20],
            },
        ]);
        let bytes = round_trip(&prop);
        assert_eq!(&bytes[..4], &[0x00, 0x01, 0x00, 0x10]);
        assert_eq!(bytes.len(), 16);
    }

    #[test]
    fn test_next_tables_and_oxm_ids() {
        let bytes = round_trip(&TableFeatureProp::NextTables(vec![1, 2, 3]));
        assert_eq!(bytes, vec![0x00, 0x02, 0x00, 0x07, 1, 2, 3, 0]);
        round_trip(&TableFeatureProp::Match(vec![Oxm::in_port(0).header(),
                                                 Oxm::eth_dst([0; 6]).header()]));
    }

    #[test]
    fn test_every_property_type() {
        for typ in TableFeaturePropType::ALL.iter() {
            let prop = TableFeatureProp::default_of(*typ);
            assert_eq!(TableFeatureProp::type_code(&prop), *typ);
            round_trip(&prop);
        }
        assert!(matches!(TableFeaturePropType::of_int(9),
                         Err(OfpSerializationError::UnsupportedProperty { code: 9, .. })));
    }

    #[test]
    fn test_table_features_entry() {
        let tf = TableFeatures {
            table_id: 1,
            name: "acl".to_string(),
            metadata_match: u64::MAX,
            metadata_write: 0xff,
            config: 0,
            max_entries: 1000,
            properties: vec![TableFeatureProp::NextTables(vec![2]),
                             TableFeatureProp::Experimenter(TableFeatureExperimenter {
                                 experimenter: 0x2320,
                                 exp_type: 1,
                                 data: vec![9],
                             })],
        };
        let mut bytes = vec![];
        TableFeatures::marshal(&tf, &mut bytes).unwrap();
        assert_eq!(bytes.len(), 64 + 8 + 16);
        assert_eq!(&bytes[..2], &[0x00, 88]);
        let parsed: Vec<TableFeatures> = parse_list_to_end(&mut OfpReader::new(&bytes)).unwrap();
        assert_eq!(parsed, vec![tf]);
    }

    #[test]
    fn test_oxm_ids_of_partial_word() {
        let bytes = [0x00, 0x08, 0x00, 0x0a, 0x80, 0x00, 0x00, 0x04, 0x00, 0x00, 0, 0, 0, 0, 0, 0];
        match parse_list_to_end::<TableFeatureProp>(&mut OfpReader::new(&bytes)) {
            Err(OfpSerializationError::Malformed { what, offset, expected, found }) => {
                assert_eq!(what, "oxm id");
                assert_eq!((offset, expected, found), (4, 8, 6));
            }
            r => panic!("expected malformed, got {:?}", r),
        }
    }
}
