//! Standard printf-style conversions.
//!
//! Syntax: `%[flags][width][.precision][length]conv` with
//! `conv` one of `c C d i o u x X n p s S Z %`. A directive ends at the
//! first conversion character after the `%`; everything in between is
//! treated as modifiers. Argument reads come from [`shadow::arity`], the
//! same function the shadow-walker uses.

use core::fmt::Write as _;

use bitflags::bitflags;

use crate::appender::TraceWrite;
use crate::args::{ArgCursor, ArgKind, IntWidth, TraceArg};
use crate::shadow;

/// Every conversion character that terminates a standard directive.
pub const CONVERSIONS: &[u8] = b"cCdiouxXnpsSZ%";

bitflags! {
    /// Conversion flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ConvFlags: u8 {
        /// `-`: left-justify within the field.
        const LEFT = 1 << 0;
        /// `+`: always print a sign for signed conversions.
        const PLUS = 1 << 1;
        /// ` `: print a space in place of a `+` sign.
        const SPACE = 1 << 2;
        /// `#`: alternate form (`0x` prefix, leading octal zero).
        const ALT = 1 << 3;
        /// `0`: pad numbers with zeros instead of spaces.
        const ZERO = 1 << 4;
    }
}

/// A width or precision field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    /// Not given.
    None,
    /// A literal number.
    Fixed(usize),
    /// `*`: taken from the argument list.
    Star,
}

/// A parsed standard directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionSpec {
    /// Flags preceding the width.
    pub flags: ConvFlags,
    /// Minimum field width.
    pub width: Count,
    /// Precision: minimum digits for integers, maximum characters for strings.
    pub precision: Count,
    /// Integer width selected by the length modifiers.
    pub int_width: IntWidth,
    /// The conversion character.
    pub conv: u8,
}

impl ConversionSpec {
    /// Parses a complete directive (`%` .. conversion character).
    #[must_use]
    pub fn parse(directive: &[u8]) -> Option<Self> {
        let [b'%', body @ .., conv] = directive else {
            return None;
        };
        if !is_conversion(*conv) {
            return None;
        }

        let mut i = 0;
        let mut flags = ConvFlags::empty();
        while let Some(&b) = body.get(i) {
            let flag = match b {
                b'-' => ConvFlags::LEFT,
                b'+' => ConvFlags::PLUS,
                b' ' => ConvFlags::SPACE,
                b'#' => ConvFlags::ALT,
                b'0' => ConvFlags::ZERO,
                _ => break,
            };
            flags |= flag;
            i += 1;
        }

        let (width, used) = parse_count(&body[i..]);
        i += used;

        let mut precision = Count::None;
        if body.get(i) == Some(&b'.') {
            i += 1;
            let (count, used) = parse_count(&body[i..]);
            i += used;
            precision = match count {
                Count::None => Count::Fixed(0),
                count => count,
            };
        }

        Some(Self {
            flags,
            width,
            precision,
            int_width: shadow::int_width(body),
            conv: *conv,
        })
    }
}

/// Returns `true` for a character that terminates a standard directive.
#[must_use]
pub fn is_conversion(b: u8) -> bool {
    CONVERSIONS.contains(&b)
}

/// Length of the standard directive at the start of `s` (which must begin
/// with `%`), or `None` if no conversion character follows.
///
/// `%!` opens a tag, never a standard directive, so it also yields `None`.
#[must_use]
pub fn directive_len(s: &[u8]) -> Option<usize> {
    if s.get(1) == Some(&b'!') {
        return None;
    }
    s.get(1..)?.iter().position(|&b| is_conversion(b)).map(|i| i + 2)
}

fn parse_count(s: &[u8]) -> (Count, usize) {
    if s.first() == Some(&b'*') {
        return (Count::Star, 1);
    }
    let digits = s.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return (Count::None, 0);
    }
    let value = s[..digits]
        .iter()
        .fold(0usize, |acc, &d| acc.saturating_mul(10).saturating_add(usize::from(d - b'0')));
    (Count::Fixed(value), digits)
}

/// Renders a tag-free format string.
///
/// Literal spans are copied, directives rendered in order. An incomplete
/// directive or an unterminated `%!` tag stops the output.
pub fn format_into(out: &mut dyn TraceWrite, fmt: &[u8], args: &mut ArgCursor<'_>) {
    let mut rest = fmt;
    while !rest.is_empty() {
        let Some(start) = rest.iter().position(|&b| b == b'%') else {
            out.push_bytes(rest);
            return;
        };
        if start > 0 {
            out.push_bytes(&rest[..start]);
        }
        rest = &rest[start..];
        let Some(len) = directive_len(rest) else {
            return;
        };
        render_directive(out, &rest[..len], args);
        rest = &rest[len..];
    }
}

/// Renders one complete standard directive, consuming its arguments.
pub fn render_directive(out: &mut dyn TraceWrite, directive: &[u8], args: &mut ArgCursor<'_>) {
    let arity = shadow::arity(directive);
    let Some(spec) = ConversionSpec::parse(directive) else {
        shadow::shadow_walk(directive, args);
        return;
    };

    let mut flags = spec.flags;
    let mut stars = arity.stars;

    let width = match spec.width {
        Count::None => 0,
        Count::Fixed(w) => w,
        Count::Star => {
            let w = take_star(&mut stars, args);
            if w < 0 {
                flags |= ConvFlags::LEFT;
            }
            usize::try_from(w.unsigned_abs()).unwrap_or(usize::MAX)
        }
    };
    let precision = match spec.precision {
        Count::None => None,
        Count::Fixed(p) => Some(p),
        Count::Star => usize::try_from(take_star(&mut stars, args)).ok(),
    };
    // Stray `*` tokens in the modifiers still consume their argument.
    for _ in 0..stars {
        args.skip(ArgKind::Int(IntWidth::Int));
    }

    let field = Field { flags, width, precision };
    match (spec.conv, arity.value) {
        (b'%', _) => out.push_byte(b'%'),
        (b'd' | b'i', _) => {
            let v = args.next_signed(spec.int_width);
            let sign = if v < 0 { Sign::Negative } else { Sign::Positive };
            field.integer(out, sign, v.unsigned_abs(), 10, false);
        }
        (b'u', _) => field.integer(out, Sign::Unsigned, args.next_int(spec.int_width), 10, false),
        (b'o', _) => field.integer(out, Sign::Unsigned, args.next_int(spec.int_width), 8, false),
        (b'x', _) => field.integer(out, Sign::Unsigned, args.next_int(spec.int_width), 16, false),
        (b'X', _) => field.integer(out, Sign::Unsigned, args.next_int(spec.int_width), 16, true),
        (b'c' | b'C', Some(ArgKind::WideChar)) => {
            let c = args.next_wide_char();
            field.padded(out, usize::from(c != 0), |out| out.append_wide(Some(&[c]), 1));
        }
        (b'c' | b'C', _) => {
            let c = args.next_char();
            field.padded(out, usize::from(c != 0), |out| out.append(Some(&[c]), 1));
        }
        (b'p', _) => {
            let addr = args.next_pointer().bits();
            let digits = Some(field.precision.unwrap_or(2 * core::mem::size_of::<usize>()));
            Field { precision: digits, ..field }.integer(out, Sign::Unsigned, addr, 16, true);
        }
        (b'n', _) => {
            // Never written through; the slot is only consumed.
            let _ = args.next_pointer();
        }
        (b's' | b'S' | b'Z', _) => field.string(out, args.next_pointer()),
        _ => shadow::shadow_walk(directive, args),
    }
}

fn take_star(stars: &mut usize, args: &mut ArgCursor<'_>) -> i64 {
    *stars = stars.saturating_sub(1);
    args.next_signed(IntWidth::Int)
}

#[derive(Clone, Copy)]
enum Sign {
    Unsigned,
    Positive,
    Negative,
}

/// Width, precision and flags of one conversion.
#[derive(Clone, Copy)]
struct Field {
    flags: ConvFlags,
    width: usize,
    precision: Option<usize>,
}

impl Field {
    /// Writes `len` bytes produced by `body`, padded to the field width.
    fn padded(self, out: &mut dyn TraceWrite, len: usize, body: impl FnOnce(&mut dyn TraceWrite)) {
        let fill = self.width.saturating_sub(len);
        if self.flags.contains(ConvFlags::LEFT) {
            body(&mut *out);
            out.pad(b' ', fill);
        } else {
            out.pad(b' ', fill);
            body(&mut *out);
        }
    }

    fn integer(self, out: &mut dyn TraceWrite, sign: Sign, magnitude: u64, radix: u64, upper: bool) {
        let mut digits = [0u8; 24];
        let mut start = digits.len();
        let mut n = magnitude;
        if !(magnitude == 0 && self.precision == Some(0)) {
            loop {
                start -= 1;
                digits[start] = digit(n % radix, upper);
                n /= radix;
                if n == 0 {
                    break;
                }
            }
        }
        let digits = &digits[start..];

        let sign: &[u8] = match sign {
            Sign::Negative => b"-",
            Sign::Positive if self.flags.contains(ConvFlags::PLUS) => b"+",
            Sign::Positive if self.flags.contains(ConvFlags::SPACE) => b" ",
            _ => b"",
        };

        let alt = self.flags.contains(ConvFlags::ALT);
        let prefix: &[u8] = match (radix, alt, upper) {
            (16, true, false) if magnitude != 0 => b"0x",
            (16, true, true) if magnitude != 0 => b"0X",
            _ => b"",
        };

        let mut zeros = self.precision.unwrap_or(0).saturating_sub(digits.len());
        if radix == 8 && alt && zeros == 0 && digits.first() != Some(&b'0') {
            zeros = 1;
        }

        let body = (sign.len() + prefix.len() + digits.len()).saturating_add(zeros);
        let fill = self.width.saturating_sub(body);
        if self.flags.contains(ConvFlags::LEFT) {
            emit_number(out, sign, prefix, zeros, digits);
            out.pad(b' ', fill);
        } else if self.flags.contains(ConvFlags::ZERO) && self.precision.is_none() {
            emit_number(out, sign, prefix, zeros.saturating_add(fill), digits);
        } else {
            out.pad(b' ', fill);
            emit_number(out, sign, prefix, zeros, digits);
        }
    }

    fn string(self, out: &mut dyn TraceWrite, arg: TraceArg<'_>) {
        let limit = self.precision.unwrap_or(usize::MAX);
        match arg {
            TraceArg::Str(Some(s)) => {
                let len = visible_len(s.iter().map(|&b| b == 0), limit);
                self.padded(out, len, |out| out.append(Some(s), len));
            }
            TraceArg::WideStr(Some(s)) => {
                let len = visible_len(s.iter().map(|&c| c == 0), limit);
                self.padded(out, len, |out| out.append_wide(Some(s), len));
            }
            arg if arg.is_null() => {
                let len = limit.min(crate::appender::NULL_TEXT.len());
                self.padded(out, len, |out| out.append(None, len));
            }
            // Not a string: show the address instead of dereferencing it.
            arg => {
                let _ = write!(out, "0x{:x}", arg.bits());
            }
        }
    }
}

fn visible_len(mut is_nul: impl Iterator<Item = bool>, limit: usize) -> usize {
    let mut len = 0;
    while len < limit && is_nul.next() == Some(false) {
        len += 1;
    }
    len
}

fn emit_number(out: &mut dyn TraceWrite, sign: &[u8], prefix: &[u8], zeros: usize, digits: &[u8]) {
    out.push_bytes(sign);
    out.push_bytes(prefix);
    out.pad(b'0', zeros);
    out.push_bytes(digits);
}

#[expect(clippy::cast_possible_truncation, reason = "d < 16")]
fn digit(d: u64, upper: bool) -> u8 {
    let d = d as u8;
    match d {
        0..=9 => b'0' + d,
        _ if upper => b'A' + d - 10,
        _ => b'a' + d - 10,
    }
}
