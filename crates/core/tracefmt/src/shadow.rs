//! Shadow-walker: advances the argument cursor past a standard directive
//! without rendering it.
//!
//! The renderer in [`directive`](crate::directive) takes its argument reads
//! from [`arity`] as well, so the two can only ever consume the same slots.
//! A divergence here would shift every later argument of the call.

use crate::args::{ArgCursor, ArgKind, IntWidth};

/// The arguments one standard directive consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    /// `int` arguments consumed by `*` width/precision tokens, read first.
    pub stars: usize,
    /// The principal value, if the conversion takes one.
    pub value: Option<ArgKind>,
}

impl Arity {
    /// Total number of argument slots consumed.
    #[must_use]
    pub const fn slots(&self) -> usize {
        self.stars + if self.value.is_some() { 1 } else { 0 }
    }
}

/// Computes the arity of a complete standard directive (`%` .. conversion).
///
/// Anything that is not a well-formed directive consumes nothing.
#[must_use]
pub fn arity(directive: &[u8]) -> Arity {
    let [b'%', modifiers @ .., conv] = directive else {
        return Arity { stars: 0, value: None };
    };
    Arity {
        stars: modifiers.iter().filter(|&&b| b == b'*').count(),
        value: value_kind(modifiers, *conv),
    }
}

/// Advances `args` past the arguments `directive` consumes.
pub fn shadow_walk(directive: &[u8], args: &mut ArgCursor<'_>) {
    let arity = arity(directive);
    for _ in 0..arity.stars {
        args.skip(ArgKind::Int(IntWidth::Int));
    }
    if let Some(kind) = arity.value {
        args.skip(kind);
    }
}

fn value_kind(modifiers: &[u8], conv: u8) -> Option<ArgKind> {
    match conv {
        b'%' => None,
        b'n' | b'p' | b's' | b'S' | b'Z' => Some(ArgKind::Pointer),
        b'c' | b'C' => {
            if conv == b'C' || modifiers.contains(&b'l') || modifiers.contains(&b'w') {
                Some(ArgKind::WideChar)
            } else {
                Some(ArgKind::Char)
            }
        }
        _ => Some(ArgKind::Int(int_width(modifiers))),
    }
}

/// Selects the integer width from the length modifiers.
pub(crate) fn int_width(modifiers: &[u8]) -> IntWidth {
    if contains_seq(modifiers, b"I64") {
        IntWidth::LongLong
    } else if contains_seq(modifiers, b"I32") {
        IntWidth::Int
    } else if modifiers.contains(&b'I') {
        IntWidth::Ptr
    } else if let Some(i) = modifiers.iter().position(|&b| b == b'h') {
        if modifiers.get(i + 1) == Some(&b'h') {
            IntWidth::Byte
        } else {
            IntWidth::Short
        }
    } else if let Some(i) = modifiers.iter().position(|&b| b == b'l') {
        if modifiers.get(i + 1) == Some(&b'l') {
            IntWidth::LongLong
        } else {
            IntWidth::Long
        }
    } else {
        IntWidth::Int
    }
}

fn contains_seq(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
