//! Tag dispatcher: expands one `%!NAME!` directive.

use core::fmt::Write as _;

use crate::appender::TraceWrite;
use crate::args::{ArgCursor, IntWidth, TraceArg};
use crate::directive;
use crate::origin::Origin;
use crate::registry::{EnumStyle, MachineType, TagKind, TagRegistry};

/// Converts a UTC FILETIME tick value to the offset, in 100 ns ticks, that
/// must be added to obtain local time. `None` when no conversion is
/// available.
pub type LocalBiasFn = fn(u64) -> Option<i64>;

/// Local time is UTC.
#[must_use]
pub fn utc(_ticks: u64) -> Option<i64> {
    Some(0)
}

/// Per-call state shared by all tag decoders.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'r> {
    /// Registry the tags are looked up in.
    pub registry: &'r TagRegistry,
    /// Call-site origin record.
    pub origin: Origin<'r>,
    /// Local-time conversion for timestamps.
    pub local_bias: LocalBiasFn,
}

impl<'r> RenderContext<'r> {
    /// A context with no origin record and UTC timestamps.
    #[must_use]
    pub fn new(registry: &'r TagRegistry) -> Self {
        Self { registry, origin: Origin::new(&[]), local_bias: utc }
    }

    /// Replaces the origin record.
    #[must_use]
    pub fn with_origin(self, origin: Origin<'r>) -> Self {
        Self { origin, ..self }
    }

    /// Replaces the local-time conversion.
    #[must_use]
    pub fn with_local_bias(self, local_bias: LocalBiasFn) -> Self {
        Self { local_bias, ..self }
    }
}

/// Expands the tag `name`, consuming its arguments from `args`.
///
/// Unknown names (including dangling or cyclic aliases) consume one `int`
/// and render it as bare hex after `0x`.
pub fn expand(out: &mut dyn TraceWrite, name: &[u8], args: &mut ArgCursor<'_>, ctx: &RenderContext<'_>) {
    let Some(def) = ctx.registry.resolve(name) else {
        let _ = write!(out, "0x{:x}", args.next_int(IntWidth::Int));
        return;
    };

    match def.kind {
        // `resolve` never stops on an alias.
        TagKind::Alias(_) => {}
        TagKind::Primitive { ty, format } => render_primitive(out, format, ty.read(args)),
        TagKind::Enumerated { ty, format, values, style } => {
            let arg = ty.read(args);
            let symbol = lookup_symbol(values, ty, &arg);
            match (style, symbol) {
                (EnumStyle::Exclusive, Some(symbol)) => {
                    out.push_byte(b'(');
                    out.push_bytes(symbol.as_bytes());
                    out.push_byte(b')');
                }
                (EnumStyle::Exclusive, None) => render_primitive(out, format, arg),
                (EnumStyle::Additive, symbol) => {
                    render_primitive(out, format, arg);
                    if let Some(symbol) = symbol {
                        out.push_byte(b'(');
                        out.push_bytes(symbol.as_bytes());
                        out.push_byte(b')');
                    }
                }
            }
        }
        TagKind::Structured(decode) => decode(out, args, ctx),
    }
}

/// Renders one already-consumed argument with a single-conversion format.
fn render_primitive(out: &mut dyn TraceWrite, format: &str, arg: TraceArg<'_>) {
    let slot = [arg];
    let mut one = ArgCursor::new(&slot);
    directive::format_into(out, format.as_bytes(), &mut one);
}

fn lookup_symbol(
    values: &'static [(u64, &'static str)],
    ty: MachineType,
    arg: &TraceArg<'_>,
) -> Option<&'static str> {
    let bits = ty.bits_of(arg);
    values.iter().find(|(value, _)| *value == bits).map(|(_, symbol)| *symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appender::Appender;
    use crate::registry::TagDef;

    const COLORS: &[(u64, &str)] = &[(0, "RED"), (1, "GREEN")];

    static USER: [TagDef; 5] = [
        TagDef::primitive("HEX16", MachineType::U16, "%04x"),
        TagDef::enumerated("COLOR", MachineType::U8, "%u", COLORS),
        TagDef::status("RESULT", MachineType::U32, "0x%08X", COLORS),
        TagDef::alias("COLOUR", "COLOR"),
        TagDef::structured("MARK", mark),
    ];

    fn mark(out: &mut dyn TraceWrite, args: &mut ArgCursor<'_>, _ctx: &RenderContext<'_>) {
        let _ = write!(out, "<{}>", args.next_int(IntWidth::Int));
    }

    fn expand_one(name: &str, args: &[TraceArg<'_>]) -> (String, usize) {
        static REGISTRY: TagRegistry = TagRegistry::standalone(&USER);
        let ctx = RenderContext::new(&REGISTRY);
        let mut buf = Appender::<128>::new();
        let mut cursor = ArgCursor::new(args);
        expand(&mut buf, name.as_bytes(), &mut cursor, &ctx);
        (buf.as_str().to_owned(), cursor.position())
    }

    #[test]
    fn primitive_uses_its_format() {
        assert_eq!(expand_one("HEX16", &[0x1_00abu32.into()]), ("00ab".to_owned(), 1));
    }

    #[test]
    fn exclusive_enumeration() {
        assert_eq!(expand_one("COLOR", &[1u8.into()]).0, "(GREEN)");
        assert_eq!(expand_one("COLOR", &[7u8.into()]).0, "7");
        assert_eq!(expand_one("COLOUR", &[0u8.into()]).0, "(RED)");
    }

    #[test]
    fn additive_enumeration() {
        assert_eq!(expand_one("RESULT", &[1u32.into()]).0, "0x00000001(GREEN)");
        assert_eq!(expand_one("RESULT", &[9u32.into()]).0, "0x00000009");
    }

    #[test]
    fn structured_decoder_is_called() {
        assert_eq!(expand_one("MARK", &[5i32.into()]), ("<5>".to_owned(), 1));
    }

    #[test]
    fn unknown_tag_renders_bare_hex() {
        assert_eq!(expand_one("DoesNotExist", &[255i32.into(), 1i32.into()]), ("0xff".to_owned(), 1));
        assert_eq!(expand_one("Nope", &[]), ("0x0".to_owned(), 1));
    }

    #[test]
    fn context_builders() {
        fn plus_hour(_: u64) -> Option<i64> {
            Some(36_000_000_000)
        }
        let registry = TagRegistry::builtin();
        let ctx = RenderContext::new(&registry)
            .with_origin(Origin::new(b"f\0"))
            .with_local_bias(plus_hour);
        assert_eq!((ctx.local_bias)(0), Some(36_000_000_000));
        assert_eq!(ctx.origin.field(0), Some(&b"f"[..]));
        assert_eq!(utc(12345), Some(0));
    }
}
