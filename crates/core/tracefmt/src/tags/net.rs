//! `%!IPADDR!` and `%!PORT!`.

use core::fmt::Write as _;

use crate::appender::TraceWrite;
use crate::args::{ArgCursor, IntWidth};
use crate::dispatch::RenderContext;

/// A 32-bit IPv4 address rendered least-significant byte first, which is
/// network order for an address stored as a little-endian `u32`.
pub(super) fn decode_ipaddr(out: &mut dyn TraceWrite, args: &mut ArgCursor<'_>, _ctx: &RenderContext<'_>) {
    #[expect(clippy::cast_possible_truncation, reason = "masked to 32 bits")]
    let [a, b, c, d] = (args.next_int(IntWidth::Int) as u32).to_le_bytes();
    let _ = write!(out, "{a}.{b}.{c}.{d}");
}

/// A 16-bit port in network byte order, rendered in host order.
pub(super) fn decode_port(out: &mut dyn TraceWrite, args: &mut ArgCursor<'_>, _ctx: &RenderContext<'_>) {
    #[expect(clippy::cast_possible_truncation, reason = "masked to 16 bits")]
    let port = args.next_int(IntWidth::Short) as u16;
    let _ = write!(out, "{}", u16::from_be_bytes(port.to_le_bytes()));
}
