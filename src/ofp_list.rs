use crate::ofp_message::OfpSerializationError;
use crate::ofp_utils::OfpReader;

/// A record that can appear in a span-delimited list.
///
/// OpenFlow never states element counts: a list is whatever fits in a byte span whose size is
/// known from the enclosing record. Each item is self-delimiting, either through a length field
/// somewhere in its first `MIN_LEN` bytes or by having a fixed size.
pub trait ListItem: Sized {
    /// Name of the record, used for error context.
    const WHAT: &'static str;
    /// Bytes needed before the item's total size can be computed.
    const MIN_LEN: usize;

    /// Total wire size, trailing padding included, of the item starting with `head`.
    /// `head` holds exactly `MIN_LEN` bytes.
    fn wire_len(head: &[u8]) -> usize;

    /// Return the byte-size of an item as `wire_len` would report it.
    fn size_of(item: &Self) -> usize;

    /// Parse one item out of a span of exactly `wire_len` bytes. The whole span must be
    /// consumed. Returning `Ok(None)` drops the item from the list.
    fn parse(bytes: &mut OfpReader) -> Result<Option<Self>, OfpSerializationError>;

    /// Marshal an item into a `u8` buffer.
    fn marshal(item: &Self, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError>;
}

/// Decode the next `span_len` bytes of `bytes` as a list of `T`.
pub fn parse_list<T: ListItem>(bytes: &mut OfpReader,
                               span_len: usize)
                               -> Result<Vec<T>, OfpSerializationError> {
    if span_len > bytes.remaining() {
        return Err(OfpSerializationError::Malformed {
            what: T::WHAT,
            offset: bytes.offset(),
            expected: span_len,
            found: bytes.remaining(),
        });
    }
    let mut span = bytes.slice(span_len)?;
    let mut items = vec![];
    while !span.is_empty() {
        let offset = span.offset();
        let remaining = span.remaining();
        if remaining < T::MIN_LEN {
            return Err(OfpSerializationError::Malformed {
                what: T::WHAT,
                offset,
                expected: T::MIN_LEN,
                found: remaining,
            });
        }
        let len = T::wire_len(span.peek(T::MIN_LEN)?);
        if len < T::MIN_LEN || len > remaining {
            return Err(OfpSerializationError::Malformed {
                what: T::WHAT,
                offset,
                expected: len.max(T::MIN_LEN),
                found: if len < T::MIN_LEN { len } else { remaining },
            });
        }
        let mut item_bytes = span.slice(len)?;
        let item = T::parse(&mut item_bytes)?;
        item_bytes.finish(T::WHAT)?;
        match item {
            Some(item) => items.push(item),
            None => debug!("Skipping unrecognized {} of {} bytes at offset {}", T::WHAT, len, offset),
        }
    }
    trace!("Parsed {} {} item(s) from {} bytes", items.len(), T::WHAT, span_len);
    Ok(items)
}

/// Decode everything left in `bytes` as a list of `T`.
pub fn parse_list_to_end<T: ListItem>(bytes: &mut OfpReader) -> Result<Vec<T>, OfpSerializationError> {
    let n = bytes.remaining();
    parse_list(bytes, n)
}

pub fn size_of_list<T: ListItem>(items: &[T]) -> usize {
    items.iter().map(T::size_of).sum()
}

/// Encode `items` back to back, in order.
pub fn marshal_list<T: ListItem>(items: &[T], bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
    for item in items {
        T::marshal(item, bytes)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{BigEndian, WriteBytesExt};

    /// `(length: u8, payload)` records, or a dropped record when the payload starts with 0xff.
    #[derive(Debug, PartialEq)]
    struct Blob(Vec<u8>);

    impl ListItem for Blob {
        const WHAT: &'static str = "blob";
        const MIN_LEN: usize = 2;

        fn wire_len(head: &[u8]) -> usize {
            head[0] as usize
        }

        fn size_of(item: &Blob) -> usize {
            1 + item.0.len()
        }

        fn parse(bytes: &mut OfpReader) -> Result<Option<Blob>, OfpSerializationError> {
            bytes.read_u8()?;
            let data = bytes.read_to_end()?;
            if data[0] == 0xff {
                Ok(None)
            } else {
                Ok(Some(Blob(data)))
            }
        }

        fn marshal(item: &Blob, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
            bytes.write_u8(Blob::size_of(item) as u8)?;
            bytes.extend_from_slice(&item.0);
            Ok(())
        }
    }

    #[test]
    fn test_order_is_preserved() {
        let items = vec![Blob(vec![2, 2]), Blob(vec![1])];
        let mut bytes = vec![];
        marshal_list(&items, &mut bytes).unwrap();
        assert_eq!(bytes, vec![3, 2, 2, 2, 1]);
        assert_eq!(size_of_list(&items), bytes.len());
        let parsed: Vec<Blob> = parse_list_to_end(&mut OfpReader::new(&bytes)).unwrap();
        assert_eq!(parsed, items);
    }

    #[test]
    fn test_dropped_items() {
        let bytes = [2, 1, 3, 0xff, 0, 2, 7];
        let parsed: Vec<Blob> = parse_list_to_end(&mut OfpReader::new(&bytes)).unwrap();
        assert_eq!(parsed, vec![Blob(vec![1]), Blob(vec![7])]);
    }

    #[test]
    fn test_overrun_and_trailing_bytes() {
        let overrun = [2, 1, 5, 1];
        assert!(matches!(parse_list_to_end::<Blob>(&mut OfpReader::new(&overrun)),
                         Err(OfpSerializationError::Malformed { expected: 5, found: 2, .. })));
        let trailing = [2, 1, 9];
        assert!(matches!(parse_list_to_end::<Blob>(&mut OfpReader::new(&trailing)),
                         Err(OfpSerializationError::Malformed { expected: 2, found: 1, .. })));
        let zero_len = [0, 0];
        assert!(parse_list_to_end::<Blob>(&mut OfpReader::new(&zero_len)).is_err());
    }

    #[test]
    fn test_span_stops_at_declared_length() {
        let mut bytes = vec![];
        bytes.write_u16::<BigEndian>(0x0201).unwrap();
        bytes.push(0xaa);
        let mut reader = OfpReader::new(&bytes);
        let parsed: Vec<Blob> = parse_list(&mut reader, 2).unwrap();
        assert_eq!(parsed, vec![Blob(vec![1])]);
        assert_eq!(reader.read_u8().unwrap(), 0xaa);
        assert!(parse_list::<Blob>(&mut OfpReader::new(&bytes), 4).is_err());
    }
}
