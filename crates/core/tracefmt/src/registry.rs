//! Custom tag registry.
//!
//! Tags are declared in static tables of [`TagDef`] built with the `const`
//! constructors below, so a table is plain read-only data with no
//! initialization order to worry about. A [`TagRegistry`] layers one user
//! table over the built-in set; user entries shadow built-ins of the same
//! name.
//!
//! Lookup is exact on the full name. Each entry carries a two-byte bucket
//! key computed at compile time, which only short-circuits comparisons.

use core::fmt;

use crate::appender::TraceWrite;
use crate::args::{ArgCursor, ArgKind, IntWidth, TraceArg};
use crate::dispatch::RenderContext;

/// Maximum number of alias hops followed before giving up.
pub const MAX_ALIAS_DEPTH: usize = 8;

/// Decoder for a structured tag.
///
/// Consumes its arguments from the cursor and writes the rendering.
pub type DecodeFn = fn(&mut dyn TraceWrite, &mut ArgCursor<'_>, &RenderContext<'_>);

/// Machine type of a tag's argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineType {
    /// `i8`
    I8,
    /// `u8`
    U8,
    /// `i16`
    I16,
    /// `u16`
    U16,
    /// `i32`
    I32,
    /// `u32`
    U32,
    /// `i64`
    I64,
    /// `u64`
    U64,
    /// Pointer-sized signed.
    Isize,
    /// Pointer-sized unsigned.
    Usize,
    /// Narrow character.
    Char,
    /// UTF-16 character.
    WideChar,
    /// Any pointer.
    Ptr,
}

impl MachineType {
    /// The integer width, for integer types.
    #[must_use]
    pub const fn int_width(self) -> Option<IntWidth> {
        match self {
            Self::I8 | Self::U8 | Self::Char => Some(IntWidth::Byte),
            Self::I16 | Self::U16 | Self::WideChar => Some(IntWidth::Short),
            Self::I32 | Self::U32 => Some(IntWidth::Int),
            Self::I64 | Self::U64 => Some(IntWidth::LongLong),
            Self::Isize | Self::Usize => Some(IntWidth::Ptr),
            Self::Ptr => None,
        }
    }

    /// The slot kind this type consumes.
    #[must_use]
    pub const fn arg_kind(self) -> ArgKind {
        match self {
            Self::Char => ArgKind::Char,
            Self::WideChar => ArgKind::WideChar,
            Self::Ptr => ArgKind::Pointer,
            _ => match self.int_width() {
                Some(width) => ArgKind::Int(width),
                None => ArgKind::Pointer,
            },
        }
    }

    /// Consumes one argument of this type.
    pub fn read<'a>(self, args: &mut ArgCursor<'a>) -> TraceArg<'a> {
        match self {
            Self::I8 => TraceArg::Int(args.next_signed(IntWidth::Byte)),
            Self::I16 => TraceArg::Int(args.next_signed(IntWidth::Short)),
            Self::I32 => TraceArg::Int(args.next_signed(IntWidth::Int)),
            Self::I64 => TraceArg::Int(args.next_signed(IntWidth::LongLong)),
            Self::Isize => TraceArg::Int(args.next_signed(IntWidth::Ptr)),
            Self::U8 => TraceArg::UInt(args.next_int(IntWidth::Byte)),
            Self::U16 => TraceArg::UInt(args.next_int(IntWidth::Short)),
            Self::U32 => TraceArg::UInt(args.next_int(IntWidth::Int)),
            Self::U64 => TraceArg::UInt(args.next_int(IntWidth::LongLong)),
            Self::Usize => TraceArg::UInt(args.next_int(IntWidth::Ptr)),
            Self::Char => TraceArg::Char(args.next_char()),
            Self::WideChar => TraceArg::WideChar(args.next_wide_char()),
            Self::Ptr => args.next_pointer(),
        }
    }

    /// Raw bits of `arg` truncated to this type, for table comparisons.
    #[must_use]
    pub fn bits_of(self, arg: &TraceArg<'_>) -> u64 {
        let bits = arg.bits();
        self.int_width().map_or(bits, |w| w.truncate(bits))
    }
}

/// How an enumerated tag combines its numeric and symbolic forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumStyle {
    /// `(SYMBOL)` when known, the numeric form otherwise.
    Exclusive,
    /// Always the numeric form, followed by `(SYMBOL)` when known.
    Additive,
}

/// The decoder shape of a tag.
#[derive(Clone, Copy)]
pub enum TagKind {
    /// Renders as another tag.
    Alias(&'static str),
    /// One argument rendered with a standard format string.
    Primitive {
        /// Argument type.
        ty: MachineType,
        /// Standard format string with a single conversion.
        format: &'static str,
    },
    /// One argument looked up in a `(value, symbol)` table.
    Enumerated {
        /// Argument type.
        ty: MachineType,
        /// Numeric fallback format.
        format: &'static str,
        /// Known values, in lookup order.
        values: &'static [(u64, &'static str)],
        /// Numeric/symbolic combination.
        style: EnumStyle,
    },
    /// A custom decoder.
    Structured(DecodeFn),
}

impl fmt::Debug for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alias(target) => f.debug_tuple("Alias").field(target).finish(),
            Self::Primitive { ty, format } => f
                .debug_struct("Primitive")
                .field("ty", ty)
                .field("format", format)
                .finish(),
            Self::Enumerated { ty, format, values, style } => f
                .debug_struct("Enumerated")
                .field("ty", ty)
                .field("format", format)
                .field("values", &values.len())
                .field("style", style)
                .finish(),
            Self::Structured(_) => f.write_str("Structured"),
        }
    }
}

/// One registered tag.
#[derive(Debug, Clone, Copy)]
pub struct TagDef {
    /// Exact tag name, as written between the `!` delimiters.
    pub name: &'static str,
    /// Decoder shape.
    pub kind: TagKind,
    key: u16,
}

impl TagDef {
    /// Creates a tag of any shape.
    #[must_use]
    pub const fn new(name: &'static str, kind: TagKind) -> Self {
        Self { name, kind, key: bucket_key(name.as_bytes()) }
    }

    /// `name` renders exactly like `target`.
    #[must_use]
    pub const fn alias(name: &'static str, target: &'static str) -> Self {
        Self::new(name, TagKind::Alias(target))
    }

    /// One `ty` argument rendered with `format`.
    #[must_use]
    pub const fn primitive(name: &'static str, ty: MachineType, format: &'static str) -> Self {
        Self::new(name, TagKind::Primitive { ty, format })
    }

    /// One `ty` argument rendered as `(SYMBOL)`, or with `format` if unknown.
    #[must_use]
    pub const fn enumerated(
        name: &'static str,
        ty: MachineType,
        format: &'static str,
        values: &'static [(u64, &'static str)],
    ) -> Self {
        Self::new(name, TagKind::Enumerated { ty, format, values, style: EnumStyle::Exclusive })
    }

    /// One `ty` argument rendered with `format`, followed by `(SYMBOL)` if known.
    #[must_use]
    pub const fn status(
        name: &'static str,
        ty: MachineType,
        format: &'static str,
        values: &'static [(u64, &'static str)],
    ) -> Self {
        Self::new(name, TagKind::Enumerated { ty, format, values, style: EnumStyle::Additive })
    }

    /// A custom decoder.
    #[must_use]
    pub const fn structured(name: &'static str, decode: DecodeFn) -> Self {
        Self::new(name, TagKind::Structured(decode))
    }

    fn matches(&self, name: &[u8], key: u16) -> bool {
        self.key == key && self.name.as_bytes() == name
    }
}

/// Coarse lookup key: the first two bytes of the name.
const fn bucket_key(name: &[u8]) -> u16 {
    match name {
        [] => 0,
        [a] => (*a as u16) << 8,
        [a, b, ..] => ((*a as u16) << 8) | *b as u16,
    }
}

/// A problem found by [`TagRegistry::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// A tag name is empty or contains characters that cannot appear
    /// between `!` delimiters.
    InvalidName(&'static str),
    /// Two entries in the same table share a name.
    DuplicateName(&'static str),
    /// An alias points at a name that is not registered.
    DanglingAlias {
        /// The alias.
        name: &'static str,
        /// Its missing target.
        target: &'static str,
    },
    /// An alias chain loops or exceeds [`MAX_ALIAS_DEPTH`].
    AliasCycle(&'static str),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidName(name) => write!(f, "invalid tag name {name:?}"),
            Self::DuplicateName(name) => write!(f, "tag {name:?} registered twice"),
            Self::DanglingAlias { name, target } => {
                write!(f, "alias {name:?} points at unknown tag {target:?}")
            }
            Self::AliasCycle(name) => write!(f, "alias chain from {name:?} does not terminate"),
        }
    }
}

impl core::error::Error for RegistryError {}

/// A read-only tag registry: one user table over the built-in set.
#[derive(Debug, Clone, Copy)]
pub struct TagRegistry {
    user: &'static [TagDef],
    builtin: &'static [TagDef],
}

impl TagRegistry {
    /// Built-in tags with `user` layered on top.
    #[must_use]
    pub const fn new(user: &'static [TagDef]) -> Self {
        Self { user, builtin: crate::tags::BUILTIN_TAGS }
    }

    /// Only the built-in tags.
    #[must_use]
    pub const fn builtin() -> Self {
        Self::new(&[])
    }

    /// Only `user`, without any built-ins.
    #[must_use]
    pub const fn standalone(user: &'static [TagDef]) -> Self {
        Self { user, builtin: &[] }
    }

    /// Finds the entry registered under exactly `name`, without following
    /// aliases.
    #[must_use]
    pub fn lookup(&self, name: &[u8]) -> Option<&'static TagDef> {
        let key = bucket_key(name);
        self.user
            .iter()
            .chain(self.builtin)
            .find(|def| def.matches(name, key))
    }

    /// Finds the entry for `name`, following aliases.
    ///
    /// Returns `None` for unknown names, dangling aliases and alias chains
    /// longer than [`MAX_ALIAS_DEPTH`].
    #[must_use]
    pub fn resolve(&self, name: &[u8]) -> Option<&'static TagDef> {
        let mut def = self.lookup(name)?;
        for _ in 0..=MAX_ALIAS_DEPTH {
            match def.kind {
                TagKind::Alias(target) => def = self.lookup(target.as_bytes())?,
                _ => return Some(def),
            }
        }
        None
    }

    /// Returns `true` if `name` is registered (alias or not).
    #[must_use]
    pub fn contains(&self, name: &[u8]) -> bool {
        self.lookup(name).is_some()
    }

    /// Every entry, user table first. Shadowed built-ins are included.
    pub fn iter(&self) -> impl Iterator<Item = &'static TagDef> {
        self.user.iter().chain(self.builtin)
    }

    /// Checks names, duplicates and alias chains.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), RegistryError> {
        for table in [self.user, self.builtin] {
            for (i, def) in table.iter().enumerate() {
                if !is_valid_name(def.name) {
                    return Err(RegistryError::InvalidName(def.name));
                }
                if table[..i].iter().any(|other| other.name == def.name) {
                    return Err(RegistryError::DuplicateName(def.name));
                }
            }
        }
        for def in self.iter() {
            if let TagKind::Alias(target) = def.kind {
                if !self.contains(target.as_bytes()) {
                    return Err(RegistryError::DanglingAlias { name: def.name, target });
                }
                if self.resolve(def.name.as_bytes()).is_none() {
                    return Err(RegistryError::AliasCycle(def.name));
                }
            }
        }
        Ok(())
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_graphic() && b != b'!' && b != b'%')
}
