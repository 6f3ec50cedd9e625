use std::io;

use thiserror::Error;

use crate::ofp_header::OfpHeader;
use crate::ofp_utils::OfpReader;

/// Errors raised while marshaling or parsing OpenFlow wire data.
///
/// Every variant is terminal for the call that produced it. Offsets are measured from the
/// first byte of the buffer handed to the decoder.
#[derive(Debug, Error)]
pub enum OfpSerializationError {
    #[error("truncated at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("malformed {what} at offset {offset}: expected {expected} bytes, found {found}")]
    Malformed {
        what: &'static str,
        offset: usize,
        expected: usize,
        found: usize,
    },
    #[error("unsupported OpenFlow version {version:#04x}")]
    UnsupportedVersion { version: u8 },
    #[error("unsupported message type {code}")]
    UnsupportedMessageType { code: u8 },
    #[error("unsupported action type {code:#06x}")]
    UnsupportedActionType { code: u16 },
    #[error("unsupported instruction type {code:#06x}")]
    UnsupportedInstructionType { code: u16 },
    #[error("unsupported match field class {class:#06x} field {field}")]
    UnsupportedMatchField { class: u16, field: u8 },
    #[error("unsupported meter band type {code:#06x}")]
    UnsupportedMeterBandType { code: u16 },
    #[error("unsupported multipart type {code:#06x}")]
    UnsupportedMultipartType { code: u16 },
    #[error("unsupported {what} property {code:#06x}")]
    UnsupportedProperty { what: &'static str, code: u16 },
    #[error("invalid value {value} for field {field}")]
    InvalidFieldValue { field: &'static str, value: String },
    #[error("IO: {0}")]
    Io(#[from] io::Error),
}

impl OfpSerializationError {
    pub(crate) fn invalid<T: std::fmt::Display>(field: &'static str, value: T) -> Self {
        OfpSerializationError::InvalidFieldValue {
            field,
            value: value.to_string(),
        }
    }
}

/// OpenFlow Message
///
/// Version-agnostic API for handling OpenFlow messages at the byte-buffer level.
pub trait OfpMessage: Sized {
    /// Return the byte-size of an `OfpMessage`, header included.
    fn size_of(msg: &Self) -> usize;
    /// Create an `OfpHeader` for the given transaction id and OpenFlow message.
    fn header_of(xid: u32, msg: &Self) -> Result<OfpHeader, OfpSerializationError>;
    /// Return a marshaled buffer containing an OpenFlow header and the message `msg`.
    fn marshal(xid: u32, msg: &Self) -> Result<Vec<u8>, OfpSerializationError>;
    /// Returns a pair `(u32, OfpMessage)` of the transaction id and OpenFlow message parsed from
    /// the given OpenFlow header `header`, and the message body held by `bytes`.
    fn parse(header: &OfpHeader, bytes: &mut OfpReader) -> Result<(u32, Self), OfpSerializationError>;
}
