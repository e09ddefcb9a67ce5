//! Call-site origin records.
//!
//! An origin record is a run of NUL-terminated fields laid out by position:
//! source file, line, function, flags and, optionally, level. Fields are
//! addressed by index only. The [`origin!`](crate::origin!) macro builds
//! one at compile time.

/// Positional fields of an origin record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum OriginField {
    /// Source file.
    File = 0,
    /// Source line.
    Line = 1,
    /// Enclosing function (module path for Rust call sites).
    Function = 2,
    /// Trace flags the message was filed under.
    Flags = 3,
    /// Trace level name, when the call site supplied one.
    Level = 4,
}

/// A borrowed origin record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Origin<'a> {
    record: &'a [u8],
}

impl<'a> Origin<'a> {
    /// A record with no fields.
    pub const EMPTY: Origin<'static> = Origin { record: &[] };

    /// Wraps a record of NUL-terminated fields.
    #[must_use]
    pub const fn new(record: &'a [u8]) -> Self {
        Self { record }
    }

    /// Returns the field at `index`, without its terminator.
    ///
    /// Counts NUL-terminated substrings from the start of the record; an
    /// index past the last field yields `None`.
    #[must_use]
    pub fn field(&self, index: usize) -> Option<&'a [u8]> {
        let mut rest = self.record;
        for _ in 0..index {
            let end = rest.iter().position(|&b| b == 0)?;
            rest = &rest[end + 1..];
        }
        if rest.is_empty() {
            return None;
        }
        let end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
        Some(&rest[..end])
    }

    /// Returns a named field.
    #[must_use]
    pub fn get(&self, field: OriginField) -> Option<&'a [u8]> {
        self.field(field as usize)
    }
}

/// Builds an origin record (`&'static str`) for the current call site.
///
/// ```ignore
/// let origin = tracefmt::Origin::new(tracefmt::origin!("IO").as_bytes());
/// ```
#[macro_export]
macro_rules! origin {
    () => {
        $crate::origin!("")
    };
    ($flags:literal) => {
        concat!(file!(), "\0", line!(), "\0", module_path!(), "\0", $flags, "\0")
    };
    ($flags:literal, $level:literal) => {
        concat!(file!(), "\0", line!(), "\0", module_path!(), "\0", $flags, "\0", $level, "\0")
    };
    (flags: $flags:path, level: $level:ident) => {
        concat!(
            file!(),
            "\0",
            line!(),
            "\0",
            module_path!(),
            "\0",
            stringify!($flags),
            "\0",
            stringify!($level),
            "\0"
        )
    };
}
