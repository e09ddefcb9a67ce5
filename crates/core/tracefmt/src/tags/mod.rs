//! Built-in tags.
//!
//! | Tag | Argument | Rendering |
//! |---|---|---|
//! | `GUID` | `&[u8; 16]` | `8-4-4-4-12` lower-case hex |
//! | `TIMESTAMP` | `u64` FILETIME ticks | `MM/DD/YYYY-HH:MM:SS.mmm` local time |
//! | `DELTA`, `delta` | `i64` 100 ns ticks | `S.mmms` up to `D~H:MM:SS.mmms` |
//! | `IPADDR` | `u32` | dotted quad, low byte first |
//! | `PORT` | `u16`, network order | decimal |
//! | `HEXDUMP` | [`TraceData`](crate::TraceData) | offset, hex and ASCII rows |
//! | `FILE` `LINE` `FUNC` `FLAGS` `LEVEL` | none | origin record field |
//! | `STATUS`, `NTSTATUS` | `u32` | `0x%08X` then `(NAME)` if known |
//! | `IRPMJ` `IRPMN` `POWMN` `BOOLEAN` `IRQL` `DEVPOWER` `SYSPOWER` | integer | `(NAME)`, number if unknown |
//!
//! plus integer primitives (`ULONG`, `XLONG`, `PTR`, ...) and a few aliases.

mod guid;
mod hexdump;
mod irp;
mod net;
mod power;
mod status;
mod time;

pub use guid::Guid;
pub use hexdump::{NO_DATA, ROW_BYTES};
pub use irp::{MAJOR_FUNCTIONS, PNP_MINOR_FUNCTIONS, POWER_MINOR_FUNCTIONS};
pub use power::{BOOLEAN_VALUES, DEVICE_POWER_STATES, IRQL_VALUES, SYSTEM_POWER_STATES};
pub use status::STATUS_VALUES;
pub use time::CivilTime;

use crate::appender::TraceWrite;
use crate::args::ArgCursor;
use crate::dispatch::RenderContext;
use crate::origin::OriginField;
use crate::registry::{MachineType, TagDef};

/// Every built-in tag.
pub const BUILTIN_TAGS: &[TagDef] = &[
    // ── Structured ───────────────────────────────────────────────────
    TagDef::structured("GUID", guid::decode),
    TagDef::structured("TIMESTAMP", time::decode_timestamp),
    TagDef::structured("DELTA", time::decode_delta),
    TagDef::alias("delta", "DELTA"),
    TagDef::structured("IPADDR", net::decode_ipaddr),
    TagDef::structured("PORT", net::decode_port),
    TagDef::structured("HEXDUMP", hexdump::decode),
    // ── Origin record ────────────────────────────────────────────────
    TagDef::structured("FILE", origin_field::<{ OriginField::File as usize }>),
    TagDef::structured("LINE", origin_field::<{ OriginField::Line as usize }>),
    TagDef::structured("FUNC", origin_field::<{ OriginField::Function as usize }>),
    TagDef::structured("FLAGS", origin_field::<{ OriginField::Flags as usize }>),
    TagDef::structured("LEVEL", origin_field::<{ OriginField::Level as usize }>),
    // ── Enumerations ─────────────────────────────────────────────────
    TagDef::status("STATUS", MachineType::U32, "0x%08X", STATUS_VALUES),
    TagDef::alias("NTSTATUS", "STATUS"),
    TagDef::enumerated("IRPMJ", MachineType::U8, "0x%02X", MAJOR_FUNCTIONS),
    TagDef::enumerated("IRPMN", MachineType::U8, "0x%02X", PNP_MINOR_FUNCTIONS),
    TagDef::enumerated("POWMN", MachineType::U8, "0x%02X", POWER_MINOR_FUNCTIONS),
    TagDef::enumerated("BOOLEAN", MachineType::U8, "%u", BOOLEAN_VALUES),
    TagDef::enumerated("IRQL", MachineType::U8, "%u", IRQL_VALUES),
    TagDef::enumerated("DEVPOWER", MachineType::I32, "%d", DEVICE_POWER_STATES),
    TagDef::enumerated("SYSPOWER", MachineType::I32, "%d", SYSTEM_POWER_STATES),
    // ── Primitives ───────────────────────────────────────────────────
    TagDef::primitive("UCHAR", MachineType::U8, "%u"),
    TagDef::primitive("USHORT", MachineType::U16, "%u"),
    TagDef::primitive("ULONG", MachineType::U32, "%u"),
    TagDef::primitive("ULONGLONG", MachineType::U64, "%I64u"),
    TagDef::primitive("CHAR", MachineType::I8, "%d"),
    TagDef::primitive("SHORT", MachineType::I16, "%d"),
    TagDef::primitive("LONG", MachineType::I32, "%d"),
    TagDef::primitive("LONGLONG", MachineType::I64, "%I64d"),
    TagDef::primitive("XBYTE", MachineType::U8, "0x%02X"),
    TagDef::primitive("XSHORT", MachineType::U16, "0x%04X"),
    TagDef::primitive("XLONG", MachineType::U32, "0x%08X"),
    TagDef::primitive("XLONGLONG", MachineType::U64, "0x%016I64X"),
    TagDef::primitive("XINT", MachineType::U32, "0x%X"),
    TagDef::primitive("PTR", MachineType::Ptr, "0x%p"),
    TagDef::primitive("SIZE", MachineType::Usize, "%Iu"),
    TagDef::alias("HANDLE", "PTR"),
    TagDef::alias("ULONG64", "ULONGLONG"),
    TagDef::alias("HRESULT", "XLONG"),
];

/// Renders field `I` of the origin record; consumes no argument.
fn origin_field<const I: usize>(out: &mut dyn TraceWrite, _args: &mut ArgCursor<'_>, ctx: &RenderContext<'_>) {
    out.append(ctx.origin.field(I), usize::MAX);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appender::Appender;
    use crate::args::TraceArg;
    use crate::dispatch::expand;
    use crate::origin::Origin;
    use crate::registry::TagRegistry;

    fn expand_builtin(name: &str, args: &[TraceArg<'_>]) -> (String, usize) {
        let registry = TagRegistry::builtin();
        let ctx = RenderContext::new(&registry).with_origin(Origin::new(b"drv.c\x00120\x00Probe\x00PNP\x00"));
        let mut buf = Appender::<128>::new();
        let mut cursor = ArgCursor::new(args);
        expand(&mut buf, name.as_bytes(), &mut cursor, &ctx);
        (buf.as_str().to_owned(), cursor.position())
    }

    fn text(name: &str, args: &[TraceArg<'_>]) -> String {
        expand_builtin(name, args).0
    }

    #[test]
    fn status_is_additive() {
        assert_eq!(text("STATUS", &[0u32.into()]), "0x00000000(STATUS_SUCCESS)");
        assert_eq!(text("NTSTATUS", &[0xC000_0022u32.into()]), "0xC0000022(STATUS_ACCESS_DENIED)");
        assert_eq!(text("STATUS", &[0xC0DE_0001u32.into()]), "0xC0DE0001");
    }

    #[test]
    fn negative_status_matches_table() {
        assert_eq!(text("STATUS", &[(-1_073_741_823i32).into()]), "0xC0000001(STATUS_UNSUCCESSFUL)");
    }

    #[test]
    fn exclusive_enumerations() {
        assert_eq!(text("IRPMJ", &[0x1bu8.into()]), "(IRP_MJ_PNP)");
        assert_eq!(text("IRPMJ", &[0x40u8.into()]), "0x40");
        assert_eq!(text("IRPMN", &[0x17u8.into()]), "(IRP_MN_SURPRISE_REMOVAL)");
        assert_eq!(text("POWMN", &[2u8.into()]), "(IRP_MN_SET_POWER)");
        assert_eq!(text("BOOLEAN", &[true.into()]), "(TRUE)");
        assert_eq!(text("IRQL", &[2u8.into()]), "(DISPATCH_LEVEL)");
        assert_eq!(text("DEVPOWER", &[1i32.into()]), "(PowerDeviceD0)");
        assert_eq!(text("SYSPOWER", &[(-3i32).into()]), "-3");
    }

    #[test]
    fn primitives() {
        assert_eq!(text("ULONG", &[u32::MAX.into()]), "4294967295");
        assert_eq!(text("CHAR", &[0xffu8.into()]), "-1");
        assert_eq!(text("SHORT", &[(-2i16).into()]), "-2");
        assert_eq!(text("XBYTE", &[0x1abu32.into()]), "0xAB");
        assert_eq!(text("XLONGLONG", &[0xdead_beefu64.into()]), "0x00000000DEADBEEF");
        assert_eq!(text("HRESULT", &[0x8000_4005u32.into()]), "0x80004005");
        assert_eq!(text("ULONG64", &[u64::MAX.into()]), "18446744073709551615");
        assert_eq!(text("SIZE", &[42usize.into()]), "42");
    }

    #[test]
    fn pointer_primitive_and_alias() {
        let digits = 2 * core::mem::size_of::<usize>();
        let expected = format!("0x{:0digits$X}", 0xbeefusize);
        assert_eq!(text("PTR", &[TraceArg::Ptr(0xbeef)]), expected);
        assert_eq!(text("HANDLE", &[TraceArg::Ptr(0xbeef)]), expected);
    }

    #[test]
    fn origin_fields_consume_nothing() {
        assert_eq!(expand_builtin("FILE", &[1i32.into()]), ("drv.c".to_owned(), 0));
        assert_eq!(text("LINE", &[]), "120");
        assert_eq!(text("FUNC", &[]), "Probe");
        assert_eq!(text("FLAGS", &[]), "PNP");
        assert_eq!(text("LEVEL", &[]), "(null)");
    }

    #[test]
    fn structured_tags_are_registered() {
        assert_eq!(text("IPADDR", &[0x0100_007fu32.into()]), "127.0.0.1");
        assert_eq!(text("PORT", &[0x9a1fu16.into()]), "8090");
        assert_eq!(text("delta", &[10_000_000i64.into()]), "1.000s");
        assert_eq!(text("TIMESTAMP", &[0u64.into()]), "01/01/1601-00:00:00.000");
        assert_eq!(text("GUID", &[TraceArg::Guid(None)]), "(null)");
        assert_eq!(text("HEXDUMP", &[crate::TraceData::null().into()]), "<no data>");
    }

    #[test]
    fn every_builtin_resolves() {
        let registry = TagRegistry::builtin();
        for def in BUILTIN_TAGS {
            assert!(registry.resolve(def.name.as_bytes()).is_some(), "{}", def.name);
        }
    }
}
