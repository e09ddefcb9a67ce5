//! Typed argument tokens (`i:-5`, `s:text`, `g:<guid>`, ...).

use std::str::FromStr;

use anyhow::{Context, Result, bail};
use tracefmt::tags::Guid;
use tracefmt::{TraceArg, TraceData};

/// One owned argument parsed from the command line or a batch file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgToken {
    /// `i:<decimal>`
    Int(i64),
    /// `u:<decimal>` or `x:<hex>`
    UInt(u64),
    /// `c:<ascii char>`
    Char(u8),
    /// `C:<char>`
    WideChar(u16),
    /// `p:<hex address>`
    Ptr(usize),
    /// `s:<text>`
    Str(String),
    /// `S:<text>`
    WideStr(Vec<u16>),
    /// `null`
    Null,
    /// `g:<8-4-4-4-12 guid>`
    Guid([u8; 16]),
    /// `d:<hex bytes>`
    Data(Vec<u8>),
}

impl ArgToken {
    /// Borrows the token as a trace argument slot.
    pub fn as_trace_arg(&self) -> TraceArg<'_> {
        match self {
            Self::Int(v) => TraceArg::Int(*v),
            Self::UInt(v) => TraceArg::UInt(*v),
            Self::Char(c) => TraceArg::Char(*c),
            Self::WideChar(c) => TraceArg::WideChar(*c),
            Self::Ptr(addr) => TraceArg::Ptr(*addr),
            Self::Str(s) => TraceArg::Str(Some(s.as_bytes())),
            Self::WideStr(s) => TraceArg::WideStr(Some(s.as_slice())),
            Self::Null => TraceArg::Ptr(0),
            Self::Guid(g) => TraceArg::Guid(Some(g)),
            Self::Data(d) => TraceArg::Data(TraceData::new(d)),
        }
    }
}

impl FromStr for ArgToken {
    type Err = anyhow::Error;

    fn from_str(token: &str) -> Result<Self> {
        if token == "null" {
            return Ok(Self::Null);
        }
        let Some((kind, value)) = token.split_once(':') else {
            bail!("argument `{token}` has no type prefix (expected e.g. `i:5` or `s:text`)");
        };
        let parsed = match kind {
            "i" => Self::Int(value.parse().context("invalid signed integer")?),
            "u" => Self::UInt(value.parse().context("invalid unsigned integer")?),
            "x" => Self::UInt(u64::from_str_radix(strip_hex(value), 16).context("invalid hex integer")?),
            "p" => Self::Ptr(usize::from_str_radix(strip_hex(value), 16).context("invalid pointer")?),
            "c" => match value.as_bytes() {
                [c] => Self::Char(*c),
                _ => bail!("`c:` takes exactly one ASCII character"),
            },
            "C" => {
                let mut units = value.encode_utf16();
                match (units.next(), units.next()) {
                    (Some(c), None) => Self::WideChar(c),
                    _ => bail!("`C:` takes exactly one UTF-16 unit"),
                }
            }
            "s" => Self::Str(value.to_owned()),
            "S" => Self::WideStr(value.encode_utf16().collect()),
            "g" => Self::Guid(parse_guid(value)?.to_bytes()),
            "d" => Self::Data(parse_hex_bytes(value)?),
            _ => bail!("unknown argument type `{kind}:`"),
        };
        Ok(parsed)
    }
}

/// Parses a list of tokens, naming the failing one.
pub fn parse_all<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<ArgToken>> {
    tokens
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let t = t.as_ref();
            t.parse().with_context(|| format!("argument {} (`{t}`)", i + 1))
        })
        .collect()
}

fn strip_hex(s: &str) -> &str {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s)
}

fn parse_guid(s: &str) -> Result<Guid> {
    let s = s.trim_start_matches('{').trim_end_matches('}');
    let parts: Vec<&str> = s.split('-').collect();
    let [d1, d2, d3, d4, d5] = parts.as_slice() else {
        bail!("GUID must have five hyphen-separated groups");
    };
    if [d1.len(), d2.len(), d3.len(), d4.len(), d5.len()] != [8, 4, 4, 4, 12] {
        bail!("GUID groups must be 8-4-4-4-12 hex digits");
    }
    let tail = parse_hex_bytes(&format!("{d4}{d5}"))?;
    let mut data4 = [0u8; 8];
    data4.copy_from_slice(&tail);
    Ok(Guid::new(
        u32::from_str_radix(d1, 16).context("invalid GUID group 1")?,
        u16::from_str_radix(d2, 16).context("invalid GUID group 2")?,
        u16::from_str_radix(d3, 16).context("invalid GUID group 3")?,
        data4,
    ))
}

fn parse_hex_bytes(s: &str) -> Result<Vec<u8>> {
    let digits: Vec<u8> = s.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        bail!("hex data has an odd number of digits");
    }
    digits
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).context("hex data is not ASCII")?;
            u8::from_str_radix(pair, 16).with_context(|| format!("invalid hex byte `{pair}`"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(token: &str) -> ArgToken {
        token.parse().unwrap()
    }

    #[test]
    fn integers() {
        assert_eq!(parse("i:-5"), ArgToken::Int(-5));
        assert_eq!(parse("u:7"), ArgToken::UInt(7));
        assert_eq!(parse("x:ff"), ArgToken::UInt(255));
        assert_eq!(parse("x:0xC0000022"), ArgToken::UInt(0xC000_0022));
        assert_eq!(parse("p:0x10"), ArgToken::Ptr(16));
    }

    #[test]
    fn characters_and_strings() {
        assert_eq!(parse("c:A"), ArgToken::Char(b'A'));
        assert_eq!(parse("C:Z"), ArgToken::WideChar(u16::from(b'Z')));
        assert_eq!(parse("s:a:b"), ArgToken::Str("a:b".into()));
        assert_eq!(parse("s:"), ArgToken::Str(String::new()));
        assert_eq!(parse("S:hi"), ArgToken::WideStr(vec![0x68, 0x69]));
        assert_eq!(parse("null"), ArgToken::Null);
    }

    #[test]
    fn guid() {
        let token = parse("g:9042a9de-23dc-4a38-96fb-7aded080516a");
        let ArgToken::Guid(bytes) = token else { panic!("expected a GUID") };
        assert_eq!(Guid::from_bytes(&bytes).to_string(), "9042a9de-23dc-4a38-96fb-7aded080516a");
        assert!("g:1234".parse::<ArgToken>().is_err());
    }

    #[test]
    fn data() {
        assert_eq!(parse("d:48 65 6c"), ArgToken::Data(b"Hel".to_vec()));
        assert_eq!(parse("d:"), ArgToken::Data(Vec::new()));
        assert!("d:abc".parse::<ArgToken>().is_err());
        assert!("d:zz".parse::<ArgToken>().is_err());
    }

    #[test]
    fn rejects_malformed_tokens() {
        for bad in ["5", "q:1", "i:x", "c:AB", "c:", "C:"] {
            assert!(bad.parse::<ArgToken>().is_err(), "{bad}");
        }
    }

    #[test]
    fn errors_name_the_argument() {
        let err = parse_all(&["i:1", "i:nope"]).unwrap_err();
        assert!(format!("{err:#}").starts_with("argument 2 (`i:nope`)"));
    }

    #[test]
    fn trace_args_borrow_the_tokens() {
        let tokens = parse_all(&["s:x", "null", "d:00ff"]).unwrap();
        let args: Vec<TraceArg<'_>> = tokens.iter().map(ArgToken::as_trace_arg).collect();
        assert_eq!(args[0], TraceArg::Str(Some(&b"x"[..])));
        assert!(args[1].is_null());
        assert_eq!(args[2], TraceArg::Data(TraceData::new(&[0, 0xff])));
    }
}
