//! End-to-end rendering through the public API.

use tracefmt::{
    Appender, ArgCursor, ExecContext, MessageBuffer, Origin, RenderContext, RenderPath, TagDef, TagRegistry,
    TraceArg, TraceData, TraceWrite, render,
};
use tracefmt::registry::MachineType;

fn render_with(registry: &TagRegistry, fmt: &str, args: &[TraceArg<'_>]) -> (String, usize) {
    let ctx = RenderContext::new(registry);
    let mut buf = MessageBuffer::new();
    let mut cursor = ArgCursor::new(args);
    render(&mut buf, fmt, &mut cursor, &ctx, ExecContext::Normal);
    (buf.as_str().to_owned(), cursor.position())
}

fn builtin(fmt: &str, args: &[TraceArg<'_>]) -> String {
    render_with(&TagRegistry::builtin(), fmt, args).0
}

/// Small xorshift generator so the corpus is the same on every run.
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next() % items.len() as u64) as usize]
    }
}

#[test]
fn output_never_exceeds_capacity() {
    const PIECES: &[&str] = &[
        "text ", "%d", "%*.*lld", "%s", "%ws", "%!STATUS!", "%!HEXDUMP!", "%!GUID!", "%!Unknown!", "\n", "%%",
        "%08I64X", "%!TIMESTAMP!", "%!FILE!", "%c", "%p", "%-40s",
    ];
    let data = [0x5au8; 100];
    let wide: Vec<u16> = "wide string".encode_utf16().collect();
    let args = [
        TraceArg::from(40i32),
        TraceArg::from(3i32),
        TraceArg::Data(TraceData::new(&data)),
        TraceArg::from("a fairly long narrow string argument"),
        TraceArg::from(wide.as_slice()),
        TraceArg::from(-1i64),
        TraceArg::Guid(None),
    ];
    let registry = TagRegistry::builtin();
    let ctx = RenderContext::new(&registry).with_origin(Origin::new(tracefmt::origin!("TEST").as_bytes()));
    let mut rng = XorShift(0x2545_f491_4f6c_dd1d);

    for _ in 0..200 {
        let mut fmt = String::new();
        for _ in 0..(rng.next() % 40) {
            fmt.push_str(rng.pick(PIECES));
        }

        let mut small = Appender::<33>::new();
        let mut message = MessageBuffer::new();
        for exec in [ExecContext::Normal, ExecContext::Restricted] {
            small.clear();
            message.clear();
            render(&mut small, &fmt, &mut ArgCursor::new(&args), &ctx, exec);
            render(&mut message, &fmt, &mut ArgCursor::new(&args), &ctx, exec);

            assert!(small.len() <= 32, "{fmt}");
            assert!(message.len() <= tracefmt::MESSAGE_CAPACITY, "{fmt}");
            assert_eq!(small.as_bytes_with_nul().last(), Some(&0));
            assert_eq!(message.as_bytes_with_nul().last(), Some(&0));
            assert!(message.as_bytes().starts_with(small.as_bytes()), "{fmt}");
        }
    }
}

#[test]
fn newline_coalescing() {
    let mut buf = MessageBuffer::new();
    buf.push_bytes(b"a\n");
    buf.push_bytes(b"\nb");
    assert_eq!(buf.as_str(), "a\nb");

    assert_eq!(builtin("a\n%s", &["\nb".into()]), "a\nb");
}

#[test]
fn enumerated_symbol_or_number() {
    const STATES: &[(u64, &str)] = &[(1, "IDLE"), (2, "BUSY")];
    static USER: [TagDef; 1] = [TagDef::enumerated("STATE", MachineType::U32, "%u", STATES)];
    let registry = TagRegistry::new(&USER);

    assert_eq!(render_with(&registry, "%!STATE!", &[2u32.into()]).0, "(BUSY)");
    assert_eq!(render_with(&registry, "%!STATE!", &[3u32.into()]).0, "3");
}

#[test]
fn status_always_starts_with_ten_characters() {
    for code in [0u32, 0x103, 0xC000_0022, 0x1234_5678, u32::MAX] {
        let text = builtin("%!STATUS!", &[code.into()]);
        let numeric = format!("0x{code:08X}");
        assert_eq!(&text[..10], numeric);
        let known = tracefmt::tags::STATUS_VALUES.iter().find(|(v, _)| *v == u64::from(code));
        match known {
            Some((_, name)) => assert_eq!(&text[10..], format!("({name})")),
            None => assert_eq!(text.len(), 10),
        }
    }
}

#[test]
fn hexdump_rows() {
    assert_eq!(builtin("%!HEXDUMP!", &[TraceData::null().into()]), "<no data>");
    assert_eq!(builtin("%!HEXDUMP!", &[TraceData::new(&[]).into()]), "<no data>");

    for n in [1usize, 15, 16, 17, 31, 32, 48] {
        let data: Vec<u8> = (0..n).map(|i| i as u8).collect();
        let text = builtin("%!HEXDUMP!", &[TraceData::new(&data).into()]);
        let rows: Vec<&str> = text.split("\n\t").skip(1).collect();
        assert_eq!(rows.len(), n.div_ceil(16), "n = {n}");

        let last = rows.last().unwrap();
        let filled = n - 16 * (rows.len() - 1);
        // "0000:" + 16 three-character slots + two-space gutter + ASCII column.
        assert_eq!(last.len(), 5 + 48 + 2 + filled, "n = {n}");
        assert!(last[5 + 3 * filled..5 + 48].bytes().all(|b| b == b' '));
    }
}

#[test]
fn all_zero_guid() {
    let zero = [0u8; 16];
    assert_eq!(builtin("%!GUID!", &[(&zero).into()]), "00000000-0000-0000-0000-000000000000");
}

#[test]
fn unknown_tag_consumes_one_int() {
    let (text, consumed) = render_with(&TagRegistry::builtin(), "%!DoesNotExist! %d", &[255i32.into(), 7i32.into()]);
    assert_eq!(text, "0xff 7");
    assert_eq!(consumed, 2);
}

#[test]
fn two_stars_then_value() {
    let (text, consumed) = render_with(
        &TagRegistry::builtin(),
        "[%*.*lld]%d",
        &[8i32.into(), 4i32.into(), 42i64.into(), 9i32.into()],
    );
    assert_eq!(text, "[    0042]9");
    assert_eq!(consumed, 4);
}

#[test]
fn fast_path_matches_full_path() {
    let registry = TagRegistry::builtin();
    let ctx = RenderContext::new(&registry);
    let args = [TraceArg::from(-12i32), TraceArg::from("str"), TraceArg::from(0xabcu32), TraceArg::Char(b'q')];
    for fmt in ["plain", "%d|%s|%#x|%c", "%5.3d%%", "%-6s|", "tail %", "x %!abc %d", "val %!Status"] {
        let mut fast = MessageBuffer::new();
        let mut full = MessageBuffer::new();
        let fast_path = render(&mut fast, fmt, &mut ArgCursor::new(&args), &ctx, ExecContext::Restricted);
        let full_path = render(&mut full, fmt, &mut ArgCursor::new(&args), &ctx, ExecContext::Normal);
        assert_eq!(fast_path, RenderPath::Fast);
        assert_eq!(full_path, RenderPath::Full);
        assert_eq!(fast.as_str(), full.as_str(), "{fmt}");
    }
}

#[test]
fn oversized_fields_fill_the_message_and_stop() {
    let registry = TagRegistry::builtin();
    let ctx = RenderContext::new(&registry);
    for (fmt, args) in [
        ("%*d", [TraceArg::from(i32::MAX), TraceArg::from(1i32)]),
        ("%99999999999999999999d%d", [TraceArg::from(1i32), TraceArg::from(2i32)]),
        ("%.99999999999999999999d%d", [TraceArg::from(1i32), TraceArg::from(2i32)]),
    ] {
        let mut buf = MessageBuffer::new();
        let mut cursor = ArgCursor::new(&args);
        render(&mut buf, fmt, &mut cursor, &ctx, ExecContext::Normal);
        assert!(buf.is_full(), "{fmt}");
        assert_eq!(cursor.position(), 2, "{fmt}");
    }
}

#[test]
fn origin_tags_read_the_call_site() {
    let registry = TagRegistry::builtin();
    let record = tracefmt::origin!("INIT", "VERBOSE");
    let ctx = RenderContext::new(&registry).with_origin(Origin::new(record.as_bytes()));
    let mut buf = MessageBuffer::new();
    render(&mut buf, "%!FUNC! %!FLAGS! %!LEVEL! %!LINE!", &mut ArgCursor::new(&[]), &ctx, ExecContext::Normal);
    let text = buf.as_str();
    assert!(text.starts_with("render INIT VERBOSE "), "{text}");
    assert!(text.rsplit(' ').next().is_some_and(|line| line.parse::<u32>().is_ok()));
}
