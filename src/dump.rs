//! Human readable renderings of wire buffers and decoded messages, for logs and test failures.

use std::fmt::Write;

use crate::ofp_header::OfpHeader;
use crate::openflow0x04::Message;

const BYTES_PER_LINE: usize = 8;

/// Lowercase hex, two digits per byte, eight bytes per line.
pub fn hex_dump(buf: &[u8]) -> String {
    buf.chunks(BYTES_PER_LINE)
        .map(|line| line.iter().map(|b| format!("{:02x}", b)).collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line of header fields followed by the pretty-printed message.
pub fn show(header: &OfpHeader, msg: &Message) -> String {
    let mut out = String::new();
    let _ = writeln!(out,
                     "version={:#04x} type={} length={} xid={:#010x}",
                     header.version(),
                     header.type_byte(),
                     header.length(),
                     header.xid());
    let _ = write!(out, "{:#?}", msg);
    out
}
