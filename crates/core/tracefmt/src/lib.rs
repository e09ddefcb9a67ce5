//! Bounded trace message formatter.
//!
//! Renders a format string that mixes standard printf conversions
//! (`%d`, `%08I64X`, `%ws`, ...) with named custom directives (`%!STATUS!`,
//! `%!HEXDUMP!`, ...) into a fixed-capacity, NUL-terminated buffer.
//!
//! Rendering never allocates, never blocks and never fails: malformed or
//! truncated input degrades to defined output instead of an error. This
//! makes the formatter usable from interrupt handlers and other contexts
//! with no recovery path.
//!
//! Layering, leaf first:
//!
//! - [`appender`]: the bounded, truncating, newline-coalescing buffer.
//! - [`args`] / [`shadow`]: the argument cursor and the shadow-walker that
//!   advances it by a directive's arity without rendering.
//! - [`directive`]: standard conversion parsing and rendering.
//! - [`registry`] / [`dispatch`] / [`tags`]: custom tag lookup, decoding and
//!   the built-in tag set.
//! - [`scan`]: the scan driver tying everything together.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

pub mod appender;
pub mod args;
pub mod directive;
pub mod dispatch;
pub mod origin;
pub mod registry;
pub mod scan;
pub mod shadow;
pub mod tags;

pub use appender::{Appender, MESSAGE_CAPACITY, MessageBuffer, TraceWrite};
pub use args::{ArgCursor, ArgKind, IntWidth, TraceArg, TraceData};
pub use dispatch::RenderContext;
pub use origin::{Origin, OriginField};
pub use registry::{MachineType, RegistryError, TagDef, TagKind, TagRegistry};
pub use scan::{ExecContext, RenderPath, render};
