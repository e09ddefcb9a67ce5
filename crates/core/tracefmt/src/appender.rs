//! Fixed-capacity output buffer for rendered trace messages.
//!
//! [`Appender`] stores its bytes in a stack-allocated [`ArrayVec`] and keeps
//! a NUL terminator as the final element at all times, so the buffer can be
//! handed to a C-string consumer at any point. Writes past the capacity are
//! truncated, never rejected.

use core::ffi::CStr;
use core::fmt;

use planck_noalloc::vec::ArrayVec;

use crate::args::ArgCursor;

/// Visible characters in a rendered trace message.
pub const MESSAGE_CAPACITY: usize = 512;

/// Text rendered in place of a null string or pointer.
pub const NULL_TEXT: &[u8] = b"(null)";

/// The buffer used for a single trace message: 512 visible characters plus
/// the terminator.
pub type MessageBuffer = Appender<{ MESSAGE_CAPACITY + 1 }>;

/// Output side of the formatter.
///
/// Implemented by [`Appender`]; decoders receive `&mut dyn TraceWrite` so
/// they are independent of the buffer's capacity.
pub trait TraceWrite: fmt::Write {
    /// Appends at most `max_count` bytes of `src`, stopping at the first NUL.
    ///
    /// `None` renders `"(null)"`.
    fn append(&mut self, src: Option<&[u8]>, max_count: usize);

    /// Appends at most `max_count` UTF-16 units of `src`, stopping at the
    /// first NUL. Units outside printable ASCII render as `?`.
    fn append_wide(&mut self, src: Option<&[u16]>, max_count: usize);

    /// Returns the last visible byte, if any.
    fn last_byte(&self) -> Option<u8>;

    /// Visible bytes that can still be written.
    fn remaining(&self) -> usize;

    /// Appends all of `bytes`.
    fn push_bytes(&mut self, bytes: &[u8]) {
        self.append(Some(bytes), usize::MAX);
    }

    /// Appends a single byte.
    fn push_byte(&mut self, byte: u8) {
        self.append(Some(&[byte]), 1);
    }

    /// Appends `count` copies of `byte`, as many as fit.
    fn pad(&mut self, byte: u8, count: usize) {
        for _ in 0..count.min(self.remaining()) {
            self.push_byte(byte);
        }
    }
}

/// A bounded, always NUL-terminated byte buffer.
///
/// `N` is the total storage including the terminator, so at most `N - 1`
/// visible bytes are ever stored.
pub struct Appender<const N: usize> {
    buf: ArrayVec<u8, N>,
}

impl<const N: usize> Appender<N> {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        const { assert!(N > 0, "appender needs room for the terminator") };
        let mut buf = ArrayVec::new();
        buf.push(0);
        Self { buf }
    }

    /// Maximum number of visible bytes.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Number of visible bytes currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len() - 1
    }

    /// Returns `true` if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visible bytes still available.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity() - self.len()
    }

    /// Returns `true` once the capacity is exhausted.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.buf.is_full()
    }

    /// Discards the contents.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.buf.push(0);
    }

    /// The visible bytes, without the terminator.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        let bytes = self.buf.as_slice();
        &bytes[..bytes.len() - 1]
    }

    /// The visible bytes followed by the terminator.
    #[must_use]
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        self.buf.as_slice()
    }

    /// The contents as a C string.
    #[must_use]
    pub fn as_c_str(&self) -> &CStr {
        CStr::from_bytes_until_nul(self.buf.as_slice()).unwrap_or_default()
    }

    /// The contents as UTF-8, cut at the first invalid sequence.
    ///
    /// Everything the formatter produces itself is ASCII; only raw narrow
    /// string arguments can introduce other bytes.
    #[must_use]
    pub fn as_str(&self) -> &str {
        let bytes = self.as_bytes();
        match core::str::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default(),
        }
    }

    /// Renders a tag-free format string in one bounded write.
    ///
    /// Directives beyond the capacity are still evaluated so the cursor ends
    /// up where a full render would leave it.
    pub fn printf_into(&mut self, fmt: &[u8], args: &mut ArgCursor<'_>) {
        crate::directive::format_into(self, fmt, args);
    }

    /// Writes as much of `bytes` as fits.
    fn write_clamped(&mut self, bytes: impl ExactSizeIterator<Item = u8>) {
        let room = self.remaining();
        if room == 0 || bytes.len() == 0 {
            return;
        }
        // Drop the terminator, write, then restore it.
        let _ = self.buf.pop();
        for byte in bytes.take(room) {
            if self.buf.try_push(byte).is_err() {
                break;
            }
        }
        let _ = self.buf.try_push(0);
    }
}

impl<const N: usize> Default for Appender<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> TraceWrite for Appender<N> {
    fn append(&mut self, src: Option<&[u8]>, max_count: usize) {
        let src = src.unwrap_or(NULL_TEXT);
        let limit = max_count.min(src.len());
        let end = src[..limit].iter().position(|&b| b == 0).unwrap_or(limit);
        let mut src = &src[..end];
        if src.first() == Some(&b'\n') && self.last_byte() == Some(b'\n') {
            src = &src[1..];
        }
        self.write_clamped(src.iter().copied());
    }

    fn append_wide(&mut self, src: Option<&[u16]>, max_count: usize) {
        let Some(src) = src else {
            self.append(None, max_count);
            return;
        };
        let limit = max_count.min(src.len());
        let end = src[..limit].iter().position(|&c| c == 0).unwrap_or(limit);
        let mut src = &src[..end];
        if src.first() == Some(&u16::from(b'\n')) && self.last_byte() == Some(b'\n') {
            src = &src[1..];
        }
        self.write_clamped(src.iter().map(|&unit| narrow_unit(unit)));
    }

    fn last_byte(&self) -> Option<u8> {
        self.as_bytes().last().copied()
    }

    fn remaining(&self) -> usize {
        Appender::remaining(self)
    }
}

impl<const N: usize> fmt::Write for Appender<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_bytes(s.as_bytes());
        Ok(())
    }
}

impl<const N: usize> fmt::Debug for Appender<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Appender")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("text", &self.as_str())
            .finish()
    }
}

/// Maps a UTF-16 unit onto printable ASCII.
pub(crate) fn narrow_unit(unit: u16) -> u8 {
    match u8::try_from(unit) {
        Ok(b @ (0x20..=0x7e | b'\t' | b'\n' | b'\r')) => b,
        _ => b'?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn starts_empty_and_terminated() {
        let buf = Appender::<8>::new();
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.capacity(), 7);
        assert_eq!(buf.as_bytes_with_nul(), b"\0");
    }

    #[test]
    fn truncates_at_capacity() {
        let mut buf = Appender::<6>::new();
        buf.push_bytes(b"hello world");
        assert_eq!(buf.as_bytes(), b"hello");
        assert_eq!(buf.as_bytes_with_nul(), b"hello\0");
        assert!(buf.is_full());
        buf.push_bytes(b"more");
        assert_eq!(buf.as_bytes(), b"hello");
    }

    #[test]
    fn pad_stops_when_full() {
        let mut buf = Appender::<4>::new();
        buf.pad(b'-', usize::MAX);
        assert_eq!(buf.as_bytes_with_nul(), b"---\0");
        assert_eq!(TraceWrite::remaining(&buf), 0);
    }

    #[test]
    fn max_count_limits_write() {
        let mut buf = Appender::<16>::new();
        buf.append(Some(b"abcdef"), 3);
        assert_eq!(buf.as_str(), "abc");
    }

    #[test]
    fn stops_at_embedded_nul() {
        let mut buf = Appender::<16>::new();
        buf.push_bytes(b"ab\0cd");
        assert_eq!(buf.as_str(), "ab");
    }

    #[test]
    fn null_source_renders_placeholder() {
        let mut buf = Appender::<16>::new();
        buf.append(None, usize::MAX);
        buf.append_wide(None, usize::MAX);
        assert_eq!(buf.as_str(), "(null)(null)");
    }

    #[test]
    fn newline_coalesces_at_join() {
        let mut buf = Appender::<16>::new();
        buf.push_bytes(b"a\n");
        buf.push_bytes(b"\nb");
        assert_eq!(buf.as_str(), "a\nb");
    }

    #[test]
    fn newline_coalescing_only_at_join() {
        let mut buf = Appender::<16>::new();
        buf.push_bytes(b"a\n\n");
        buf.push_bytes(b"b\n\nc");
        assert_eq!(buf.as_str(), "a\n\nb\n\nc");
    }

    #[test]
    fn coalescing_drops_a_single_newline() {
        let mut buf = Appender::<16>::new();
        buf.push_bytes(b"x\n");
        buf.push_bytes(b"\n\ny");
        assert_eq!(buf.as_str(), "x\n\ny");
    }

    #[test]
    fn wide_units_are_narrowed() {
        let mut buf = Appender::<32>::new();
        buf.append_wide(Some(&wide("caf\u{e9} \u{2603}!")), usize::MAX);
        assert_eq!(buf.as_str(), "caf? ?!");
    }

    #[test]
    fn wide_newline_coalesces() {
        let mut buf = Appender::<16>::new();
        buf.push_bytes(b"a\n");
        buf.append_wide(Some(&wide("\nb")), usize::MAX);
        assert_eq!(buf.as_str(), "a\nb");
    }

    #[test]
    fn fmt_write_truncates_silently() {
        use core::fmt::Write as _;
        let mut buf = Appender::<5>::new();
        assert!(write!(buf, "{}", 123_456_789).is_ok());
        assert_eq!(buf.as_str(), "1234");
    }

    #[test]
    fn c_str_view() {
        let mut buf = Appender::<8>::new();
        buf.push_bytes(b"abc");
        assert_eq!(buf.as_c_str().to_bytes(), b"abc");
    }

    #[test]
    fn clear_resets() {
        let mut buf = Appender::<8>::new();
        buf.push_bytes(b"abc");
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.as_bytes_with_nul(), b"\0");
    }

    #[test]
    fn message_buffer_capacity() {
        let mut buf = MessageBuffer::new();
        for _ in 0..100 {
            buf.push_bytes(b"0123456789");
        }
        assert_eq!(buf.len(), MESSAGE_CAPACITY);
        assert_eq!(buf.as_bytes_with_nul().len(), MESSAGE_CAPACITY + 1);
        assert_eq!(buf.as_bytes_with_nul().last(), Some(&0));
    }
}
