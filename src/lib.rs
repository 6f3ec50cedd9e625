#![crate_name = "rust_ofp13"]
#![crate_type = "lib"]

extern crate byteorder;
#[macro_use]
extern crate log;

mod bits;
pub mod dump;
pub mod ofp_header;
pub mod ofp_list;
pub mod ofp_message;
pub mod ofp_utils;
pub mod openflow0x04;

pub use crate::ofp_header::OfpHeader;
pub use crate::ofp_message::{OfpMessage, OfpSerializationError};
pub use crate::openflow0x04::{decode, encode, Message};
