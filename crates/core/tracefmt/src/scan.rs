//! Scan driver.
//!
//! [`Scanner`] splits a format string into literal spans, standard
//! directives and tag directives. [`render`] walks those tokens and writes
//! the message; in a restricted context it first checks whether the string
//! contains any tag at all and, if not, hands it to the plain formatter.

use crate::appender::TraceWrite;
use crate::args::ArgCursor;
use crate::directive;
use crate::dispatch::{self, RenderContext};
use crate::registry::TagRegistry;
use crate::shadow;

/// Execution context of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecContext {
    /// Any context where all decoders may run.
    #[default]
    Normal,
    /// Atomic or non-preemptible: tag-free messages take the fast path.
    Restricted,
}

/// How a message was rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPath {
    /// Forwarded unmodified to the standard formatter.
    Fast,
    /// Token by token, with tag expansion.
    Full,
}

/// One piece of a format string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'f> {
    /// Text copied verbatim.
    Literal(&'f [u8]),
    /// A complete standard directive, `%` through the conversion character.
    Standard(&'f [u8]),
    /// The name of a `%!NAME!` directive.
    Tag(&'f [u8]),
    /// An unterminated directive at the end of the string. Always last.
    Incomplete(&'f [u8]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Literal,
    DirectiveStart,
    CustomTag,
    StandardDirective,
    Done,
}

/// Tokenizer over a format string.
#[derive(Debug, Clone)]
pub struct Scanner<'f> {
    fmt: &'f [u8],
    pos: usize,
    state: ScanState,
}

impl<'f> Scanner<'f> {
    /// Starts scanning `fmt`.
    #[must_use]
    pub const fn new(fmt: &'f [u8]) -> Self {
        Self { fmt, pos: 0, state: ScanState::Literal }
    }

    fn emit(&mut self, len: usize, token: Token<'f>) -> Option<Token<'f>> {
        self.pos += len;
        self.state = ScanState::Literal;
        Some(token)
    }
}

impl<'f> Iterator for Scanner<'f> {
    type Item = Token<'f>;

    fn next(&mut self) -> Option<Token<'f>> {
        let fmt = self.fmt;
        loop {
            let rest = fmt.get(self.pos..).unwrap_or_default();
            match self.state {
                ScanState::Done => return None,
                ScanState::Literal => match rest.iter().position(|&b| b == b'%') {
                    _ if rest.is_empty() => self.state = ScanState::Done,
                    Some(0) => self.state = ScanState::DirectiveStart,
                    Some(len) => {
                        self.pos += len;
                        self.state = ScanState::DirectiveStart;
                        return Some(Token::Literal(&rest[..len]));
                    }
                    None => {
                        self.pos = fmt.len();
                        self.state = ScanState::Done;
                        return Some(Token::Literal(rest));
                    }
                },
                ScanState::DirectiveStart => {
                    self.state = if rest.get(1) == Some(&b'!') {
                        ScanState::CustomTag
                    } else {
                        ScanState::StandardDirective
                    };
                }
                ScanState::CustomTag => {
                    let name = &rest[2..];
                    return match name.iter().position(|&b| b == b'!') {
                        Some(end) => self.emit(end + 3, Token::Tag(&name[..end])),
                        None => {
                            self.state = ScanState::Done;
                            Some(Token::Incomplete(rest))
                        }
                    };
                }
                ScanState::StandardDirective => {
                    return match directive::directive_len(rest) {
                        Some(len) => self.emit(len, Token::Standard(&rest[..len])),
                        None => {
                            self.state = ScanState::Done;
                            Some(Token::Incomplete(rest))
                        }
                    };
                }
            }
        }
    }
}

/// Tag directives found by a detect-only scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TagSummary {
    /// Tags present in the registry.
    pub registered: usize,
    /// Tags the registry does not know; these render as bare hex.
    pub unregistered: usize,
}

impl TagSummary {
    /// Returns `true` if the string contains any tag directive.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.registered + self.unregistered > 0
    }
}

/// Scans `fmt` for tag directives without rendering anything.
#[must_use]
pub fn detect_tags(fmt: &[u8], registry: &TagRegistry) -> TagSummary {
    let mut summary = TagSummary::default();
    for token in Scanner::new(fmt) {
        if let Token::Tag(name) = token {
            if registry.contains(name) {
                summary.registered += 1;
            } else {
                summary.unregistered += 1;
            }
        }
    }
    summary
}

/// Renders `fmt` with `args` into `out`.
///
/// Never fails. Output past the buffer's capacity is dropped and an
/// unterminated directive ends the message.
pub fn render(
    out: &mut dyn TraceWrite,
    fmt: &str,
    args: &mut ArgCursor<'_>,
    ctx: &RenderContext<'_>,
    exec: ExecContext,
) -> RenderPath {
    let fmt = fmt.as_bytes();
    if exec == ExecContext::Restricted && !detect_tags(fmt, ctx.registry).any() {
        directive::format_into(out, fmt, args);
        return RenderPath::Fast;
    }

    for token in Scanner::new(fmt) {
        match token {
            Token::Literal(text) => out.push_bytes(text),
            Token::Standard(d) => {
                let mut snapshot = args.clone();
                directive::render_directive(out, d, &mut snapshot);
                shadow::shadow_walk(d, args);
                debug_assert_eq!(
                    snapshot.position(),
                    args.position(),
                    "renderer and shadow-walker disagree on {:?}",
                    core::str::from_utf8(d)
                );
            }
            Token::Tag(name) => dispatch::expand(out, name, args, ctx),
            Token::Incomplete(_) => break,
        }
    }
    RenderPath::Full
}
