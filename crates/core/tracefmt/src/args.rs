//! Trace arguments and the cursor that walks them.
//!
//! A trace call passes its arguments as a slice of [`TraceArg`] slots. The
//! [`ArgCursor`] hands them out strictly in order, one slot per read, and
//! coerces each slot to whatever type the directive asks for, the same way
//! a C `va_arg` would reinterpret the bits.

/// Integer argument width selected by a length modifier or machine type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    /// `hh`: one byte.
    Byte,
    /// `h`: two bytes.
    Short,
    /// Plain `int` and `I32`.
    Int,
    /// `l`: a `long`, 32 bits on the LLP64 platforms these traces come from.
    Long,
    /// `ll` and `I64`.
    LongLong,
    /// Bare `I`: pointer-sized.
    Ptr,
}

impl IntWidth {
    /// Width in bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Byte => 8,
            Self::Short => 16,
            Self::Int | Self::Long => 32,
            Self::LongLong => 64,
            Self::Ptr => usize::BITS,
        }
    }

    /// Mask selecting the low [`bits`](Self::bits) bits.
    #[must_use]
    pub const fn mask(self) -> u64 {
        match self.bits() {
            64 => u64::MAX,
            bits => (1 << bits) - 1,
        }
    }

    /// Truncates `bits` to this width.
    #[must_use]
    pub const fn truncate(self, bits: u64) -> u64 {
        bits & self.mask()
    }

    /// Truncates `bits` to this width and sign-extends the result.
    #[must_use]
    #[expect(clippy::cast_possible_wrap, reason = "reinterpreting raw argument bits")]
    pub const fn sign_extend(self, bits: u64) -> i64 {
        let shift = 64 - self.bits();
        ((bits << shift) as i64) >> shift
    }
}

/// The type of one argument slot, as seen by the shadow-walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// An integer of the given width.
    Int(IntWidth),
    /// A pointer: strings, `%p`, `%n`, GUIDs, data blobs.
    Pointer,
    /// A narrow character.
    Char,
    /// A UTF-16 character.
    WideChar,
}

/// A `(pointer, length)` blob passed as a single argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraceData<'a> {
    data: Option<&'a [u8]>,
}

impl<'a> TraceData<'a> {
    /// Wraps a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data: Some(data) }
    }

    /// A null blob.
    #[must_use]
    pub const fn null() -> Self {
        Self { data: None }
    }

    /// The bytes, or `None` for a null blob.
    #[must_use]
    pub const fn bytes(&self) -> Option<&'a [u8]> {
        self.data
    }

    /// Length in bytes (zero when null).
    #[must_use]
    pub const fn len(&self) -> usize {
        match self.data {
            Some(data) => data.len(),
            None => 0,
        }
    }

    /// Returns `true` for a null or zero-length blob.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One argument slot of a trace call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceArg<'a> {
    /// Any signed integer.
    Int(i64),
    /// Any unsigned integer.
    UInt(u64),
    /// A narrow character.
    Char(u8),
    /// A UTF-16 character.
    WideChar(u16),
    /// A raw address that is never dereferenced.
    Ptr(usize),
    /// A narrow string; `None` is a null pointer.
    Str(Option<&'a [u8]>),
    /// A UTF-16 string; `None` is a null pointer.
    WideStr(Option<&'a [u16]>),
    /// A pointer to a 16-byte GUID.
    Guid(Option<&'a [u8; 16]>),
    /// A `(pointer, length)` blob.
    Data(TraceData<'a>),
}

impl TraceArg<'_> {
    /// The slot reinterpreted as raw integer bits.
    ///
    /// Pointer-like slots yield their address, or zero when null.
    #[must_use]
    #[expect(clippy::cast_sign_loss, reason = "reinterpreting raw argument bits")]
    pub fn bits(&self) -> u64 {
        match *self {
            Self::Int(v) => v as u64,
            Self::UInt(v) => v,
            Self::Char(c) => u64::from(c),
            Self::WideChar(c) => u64::from(c),
            Self::Ptr(addr) => addr as u64,
            Self::Str(s) => s.map_or(0, |s| s.as_ptr() as usize as u64),
            Self::WideStr(s) => s.map_or(0, |s| s.as_ptr() as usize as u64),
            Self::Guid(g) => g.map_or(0, |g| g.as_ptr() as usize as u64),
            Self::Data(d) => d.bytes().map_or(0, |d| d.as_ptr() as usize as u64),
        }
    }

    /// Returns `true` if the slot is a null pointer of any kind.
    #[must_use]
    pub fn is_null(&self) -> bool {
        match self {
            Self::Ptr(addr) => *addr == 0,
            Self::Str(s) => s.is_none(),
            Self::WideStr(s) => s.is_none(),
            Self::Guid(g) => g.is_none(),
            Self::Data(d) => d.bytes().is_none(),
            Self::Int(_) | Self::UInt(_) | Self::Char(_) | Self::WideChar(_) => self.bits() == 0,
        }
    }
}

macro_rules! impl_from_int {
    ($variant:ident as $wide:ty: $($ty:ty),*) => {
        $(
            impl From<$ty> for TraceArg<'_> {
                fn from(v: $ty) -> Self {
                    Self::$variant(<$wide>::from(v))
                }
            }
        )*
    };
}

impl_from_int!(Int as i64: i8, i16, i32, i64);
impl_from_int!(UInt as u64: u8, u16, u32, u64, bool);

impl From<isize> for TraceArg<'_> {
    fn from(v: isize) -> Self {
        Self::Int(v as i64)
    }
}

impl From<usize> for TraceArg<'_> {
    fn from(v: usize) -> Self {
        Self::UInt(v as u64)
    }
}

impl<'a> From<&'a str> for TraceArg<'a> {
    fn from(s: &'a str) -> Self {
        Self::Str(Some(s.as_bytes()))
    }
}

impl<'a> From<Option<&'a str>> for TraceArg<'a> {
    fn from(s: Option<&'a str>) -> Self {
        Self::Str(s.map(str::as_bytes))
    }
}

impl<'a> From<&'a [u16]> for TraceArg<'a> {
    fn from(s: &'a [u16]) -> Self {
        Self::WideStr(Some(s))
    }
}

impl<'a> From<&'a [u8; 16]> for TraceArg<'a> {
    fn from(guid: &'a [u8; 16]) -> Self {
        Self::Guid(Some(guid))
    }
}

impl<'a> From<TraceData<'a>> for TraceArg<'a> {
    fn from(data: TraceData<'a>) -> Self {
        Self::Data(data)
    }
}

/// Position-only iterator over the arguments of one trace call.
///
/// Every read consumes exactly one slot, whatever its type. Reads past the
/// end yield zero or null and still advance, so the consumption count stays
/// meaningful for malformed calls. Cloning snapshots the position.
#[derive(Debug, Clone)]
pub struct ArgCursor<'a> {
    args: &'a [TraceArg<'a>],
    pos: usize,
}

impl<'a> ArgCursor<'a> {
    /// Creates a cursor at the first argument.
    #[must_use]
    pub const fn new(args: &'a [TraceArg<'a>]) -> Self {
        Self { args, pos: 0 }
    }

    /// Number of slots consumed so far.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Number of slots not yet consumed.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.args.len().saturating_sub(self.pos)
    }

    /// Consumes the next slot.
    pub fn next_arg(&mut self) -> Option<TraceArg<'a>> {
        let arg = self.args.get(self.pos).copied();
        self.pos += 1;
        arg
    }

    /// Consumes the next slot as an unsigned integer of `width`.
    pub fn next_int(&mut self, width: IntWidth) -> u64 {
        width.truncate(self.next_arg().map_or(0, |arg| arg.bits()))
    }

    /// Consumes the next slot as a signed integer of `width`.
    pub fn next_signed(&mut self, width: IntWidth) -> i64 {
        width.sign_extend(self.next_arg().map_or(0, |arg| arg.bits()))
    }

    /// Consumes the next slot as a narrow character.
    #[expect(clippy::cast_possible_truncation, reason = "char promotion is undone here")]
    pub fn next_char(&mut self) -> u8 {
        self.next_int(IntWidth::Byte) as u8
    }

    /// Consumes the next slot as a UTF-16 character.
    #[expect(clippy::cast_possible_truncation, reason = "wchar promotion is undone here")]
    pub fn next_wide_char(&mut self) -> u16 {
        self.next_int(IntWidth::Short) as u16
    }

    /// Consumes the next slot as a pointer; a missing slot is null.
    pub fn next_pointer(&mut self) -> TraceArg<'a> {
        self.next_arg().unwrap_or(TraceArg::Ptr(0))
    }

    /// Consumes one slot of the given kind without rendering it.
    pub fn skip(&mut self, kind: ArgKind) {
        match kind {
            ArgKind::Int(width) => {
                let _ = self.next_int(width);
            }
            ArgKind::Pointer => {
                let _ = self.next_pointer();
            }
            ArgKind::Char => {
                let _ = self.next_char();
            }
            ArgKind::WideChar => {
                let _ = self.next_wide_char();
            }
        }
    }
}
