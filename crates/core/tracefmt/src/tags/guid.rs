//! `%!GUID!`: a pointer to a 16-byte GUID.

use core::fmt::{self, Write as _};

use crate::appender::{NULL_TEXT, TraceWrite};
use crate::args::{ArgCursor, TraceArg};
use crate::dispatch::RenderContext;

/// A globally unique identifier in its in-memory layout.
///
/// Formatted as `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Guid {
    /// The first 32 bits of the GUID.
    pub data1: u32,
    /// The next 16 bits of the GUID.
    pub data2: u16,
    /// The next 16 bits of the GUID.
    pub data3: u16,
    /// The remaining 64 bits of the GUID.
    pub data4: [u8; 8],
}

impl Guid {
    /// Creates a new GUID from its component parts.
    #[must_use]
    pub const fn new(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self { data1, data2, data3, data4 }
    }

    /// Reads a GUID from its 16-byte in-memory form (little-endian fields).
    #[must_use]
    pub const fn from_bytes(b: &[u8; 16]) -> Self {
        Self {
            data1: u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            data2: u16::from_le_bytes([b[4], b[5]]),
            data3: u16::from_le_bytes([b[6], b[7]]),
            data4: [b[8], b[9], b[10], b[11], b[12], b[13], b[14], b[15]],
        }
    }

    /// The 16-byte in-memory form.
    #[must_use]
    pub const fn to_bytes(&self) -> [u8; 16] {
        let d1 = self.data1.to_le_bytes();
        let d2 = self.data2.to_le_bytes();
        let d3 = self.data3.to_le_bytes();
        let d4 = self.data4;
        [
            d1[0], d1[1], d1[2], d1[3], d2[0], d2[1], d3[0], d3[1], d4[0], d4[1], d4[2], d4[3], d4[4], d4[5],
            d4[6], d4[7],
        ]
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({self})")
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            self.data1,
            self.data2,
            self.data3,
            self.data4[0],
            self.data4[1],
            self.data4[2],
            self.data4[3],
            self.data4[4],
            self.data4[5],
            self.data4[6],
            self.data4[7],
        )
    }
}

const _: () = assert!(core::mem::size_of::<Guid>() == 16);

pub(super) fn decode(out: &mut dyn TraceWrite, args: &mut ArgCursor<'_>, _ctx: &RenderContext<'_>) {
    let arg = args.next_pointer();
    match arg {
        TraceArg::Guid(Some(bytes)) => {
            let _ = write!(out, "{}", Guid::from_bytes(bytes));
        }
        TraceArg::Data(data) if data.len() >= 16 => {
            let mut bytes = [0u8; 16];
            if let Some(src) = data.bytes() {
                bytes.copy_from_slice(&src[..16]);
            }
            let _ = write!(out, "{}", Guid::from_bytes(&bytes));
        }
        arg if arg.is_null() => out.push_bytes(NULL_TEXT),
        arg => {
            let _ = write!(out, "0x{:x}", arg.bits());
        }
    }
}
