//! `%!HEXDUMP!`: a `(pointer, length)` blob as rows of hex and ASCII.
//!
//! ```text
//! \n\t0000: 48 65 6c 6c 6f 00 01 02 03 04 05 06 07 08 09 0a  Hello...........
//! \n\t0010: ff                                               .
//! ```

use core::fmt::Write as _;

use crate::appender::TraceWrite;
use crate::args::{ArgCursor, TraceArg};
use crate::dispatch::RenderContext;

/// Bytes per row.
pub const ROW_BYTES: usize = 16;

/// Rendered for a null or empty blob.
pub const NO_DATA: &[u8] = b"<no data>";

pub(super) fn decode(out: &mut dyn TraceWrite, args: &mut ArgCursor<'_>, _ctx: &RenderContext<'_>) {
    let bytes = match args.next_pointer() {
        TraceArg::Data(data) => data.bytes(),
        TraceArg::Str(s) => s,
        TraceArg::Guid(g) => g.map(|g| &g[..]),
        _ => None,
    };
    match bytes {
        Some(bytes) if !bytes.is_empty() => dump(out, bytes),
        _ => out.push_bytes(NO_DATA),
    }
}

fn dump(out: &mut dyn TraceWrite, bytes: &[u8]) {
    for (row, chunk) in bytes.chunks(ROW_BYTES).enumerate() {
        let _ = write!(out, "\n\t{:04x}:", row * ROW_BYTES);
        for b in chunk {
            let _ = write!(out, " {b:02x}");
        }
        out.pad(b' ', 3 * (ROW_BYTES - chunk.len()));
        out.push_bytes(b"  ");
        for &b in chunk {
            out.push_byte(if b.is_ascii_graphic() || b == b' ' { b } else { b'.' });
        }
    }
}
