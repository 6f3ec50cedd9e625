use std::io::{BufRead, Cursor, Read};

use byteorder::{BigEndian, ByteOrder, ReadBytesExt, WriteBytesExt};

use crate::ofp_message::OfpSerializationError;

/// Cursor over a borrowed span of an OpenFlow buffer.
///
/// Every read checks the remaining span first, so running short yields
/// `OfpSerializationError::Truncated` instead of a bare IO error. Offsets reported in errors are
/// absolute, counted from the start of the buffer the outermost reader was created over.
/// Values read out of an `OfpReader` are always copied; nothing borrows the input past a call.
pub struct OfpReader<'a> {
    bytes: Cursor<&'a [u8]>,
    base: usize,
}

impl<'a> OfpReader<'a> {
    pub fn new(buf: &'a [u8]) -> OfpReader<'a> {
        OfpReader::at(buf, 0)
    }

    fn at(buf: &'a [u8], base: usize) -> OfpReader<'a> {
        OfpReader {
            bytes: Cursor::new(buf),
            base,
        }
    }

    fn position(&self) -> usize {
        self.bytes.position() as usize
    }

    fn buf(&self) -> &'a [u8] {
        *self.bytes.get_ref()
    }

    /// Absolute offset of the next unread byte.
    pub fn offset(&self) -> usize {
        self.base + self.position()
    }

    /// Number of bytes consumed from this span so far.
    pub fn consumed(&self) -> usize {
        self.position()
    }

    pub fn remaining(&self) -> usize {
        self.buf().len() - self.position()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn need(&self, n: usize) -> Result<(), OfpSerializationError> {
        if self.remaining() < n {
            Err(OfpSerializationError::Truncated {
                offset: self.offset(),
                needed: n,
                available: self.remaining(),
            })
        } else {
            Ok(())
        }
    }

    pub fn read_u8(&mut self) -> Result<u8, OfpSerializationError> {
        self.need(1)?;
        Ok(self.bytes.read_u8()?)
    }

    pub fn read_u16(&mut self) -> Result<u16, OfpSerializationError> {
        self.need(2)?;
        Ok(self.bytes.read_u16::<BigEndian>()?)
    }

    pub fn read_u32(&mut self) -> Result<u32, OfpSerializationError> {
        self.need(4)?;
        Ok(self.bytes.read_u32::<BigEndian>()?)
    }

    pub fn read_u64(&mut self) -> Result<u64, OfpSerializationError> {
        self.need(8)?;
        Ok(self.bytes.read_u64::<BigEndian>()?)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, OfpSerializationError> {
        self.need(n)?;
        let mut v = vec![0; n];
        self.bytes.read_exact(&mut v)?;
        Ok(v)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], OfpSerializationError> {
        self.need(N)?;
        let mut arr = [0; N];
        self.bytes.read_exact(&mut arr)?;
        Ok(arr)
    }

    /// Copy out whatever is left of the span.
    pub fn read_to_end(&mut self) -> Result<Vec<u8>, OfpSerializationError> {
        let n = self.remaining();
        self.read_bytes(n)
    }

    /// Read a NUL padded string occupying exactly `size` bytes.
    pub fn read_fixed_size_string(&mut self, size: usize) -> Result<String, OfpSerializationError> {
        let offset = self.offset();
        let mut raw = self.read_bytes(size)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(size);
        raw.truncate(end);
        String::from_utf8(raw)
            .map_err(|_| OfpSerializationError::invalid("string", format!("non UTF-8 at offset {}", offset)))
    }

    pub fn skip(&mut self, n: usize) -> Result<(), OfpSerializationError> {
        self.need(n)?;
        self.bytes.consume(n);
        Ok(())
    }

    /// Look at the next `n` bytes without consuming them.
    pub fn peek(&self, n: usize) -> Result<&'a [u8], OfpSerializationError> {
        self.need(n)?;
        let pos = self.position();
        Ok(&self.buf()[pos..pos + n])
    }

    /// Split off the next `n` bytes as a reader of their own and advance past them.
    pub fn slice(&mut self, n: usize) -> Result<OfpReader<'a>, OfpSerializationError> {
        self.need(n)?;
        let pos = self.position();
        let sub = OfpReader::at(&self.buf()[pos..pos + n], self.offset());
        self.bytes.consume(n);
        Ok(sub)
    }

    /// Fail with `Malformed` unless the whole span has been consumed.
    pub fn finish(&self, what: &'static str) -> Result<(), OfpSerializationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(OfpSerializationError::Malformed {
                what,
                offset: self.offset(),
                expected: self.consumed(),
                found: self.buf().len(),
            })
        }
    }
}

/// Number of zero bytes needed to bring `len` up to a multiple of 8.
pub fn pad_len(len: usize) -> usize {
    (8 - len % 8) % 8
}

/// Round `len` up to the next multiple of 8.
pub fn pad_to_8(len: usize) -> usize {
    len + pad_len(len)
}

pub fn write_padding_bytes(bytes: &mut Vec<u8>, count: usize) -> Result<(), OfpSerializationError> {
    for _ in 0..count {
        bytes.write_u8(0)?;
    }
    Ok(())
}

/// Write `s` into a field of exactly `size` bytes, NUL padded.
pub fn write_fixed_size_string(bytes: &mut Vec<u8>,
                               s: &str,
                               size: usize)
                               -> Result<(), OfpSerializationError> {
    if s.len() > size {
        return Err(OfpSerializationError::invalid("string", format!("{:?} longer than {}", s, size)));
    }
    if s.contains('\0') {
        return Err(OfpSerializationError::invalid("string", format!("{:?} contains NUL", s)));
    }
    bytes.extend_from_slice(s.as_bytes());
    write_padding_bytes(bytes, size - s.len())
}

/// The big-endian `u16` at `offset` of an already bounds-checked record head, as a length.
pub fn length_at(head: &[u8], offset: usize) -> usize {
    BigEndian::read_u16(&head[offset..offset + 2]) as usize
}

/// Checked conversion of a computed length into a 16-bit length field.
pub fn len_u16(len: usize, field: &'static str) -> Result<u16, OfpSerializationError> {
    if len > u16::MAX as usize {
        Err(OfpSerializationError::invalid(field, len))
    } else {
        Ok(len as u16)
    }
}
