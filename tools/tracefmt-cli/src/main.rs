//! tracefmt host tool.
//!
//! Renders format strings with typed arguments exactly as the trace
//! formatter would on the target, lists the tag registry, and replays JSON
//! batches of messages.

mod cli;
mod tagfile;
mod token;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Deserialize;
use tracefmt::registry::{EnumStyle, TagKind};
use tracefmt::{ArgCursor, ExecContext, MessageBuffer, Origin, RenderContext, RenderPath, TagRegistry, TraceArg};

use crate::cli::OriginArgs;
use crate::token::ArgToken;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    let registry = tagfile::load_registry(cli.tags.as_deref())?;

    match cli.command {
        cli::Command::Render(ref args) => cmd_render(registry, args, cli.verbose),
        cli::Command::Tags(ref args) => cmd_tags(registry, args),
        cli::Command::Batch(ref args) => cmd_batch(registry, &args.file, cli.verbose),
    }
}

// ===========================================================================
// Rendering
// ===========================================================================

/// Result of rendering one message.
struct Rendered {
    text: String,
    path: RenderPath,
    consumed: usize,
    supplied: usize,
}

fn render_message(
    registry: &TagRegistry,
    format: &str,
    tokens: &[ArgToken],
    restricted: bool,
    origin: &OriginArgs,
) -> Rendered {
    let args: Vec<TraceArg<'_>> = tokens.iter().map(ArgToken::as_trace_arg).collect();
    let record = origin.to_record();
    let ctx = RenderContext::new(registry).with_origin(Origin::new(&record));
    let exec = if restricted { ExecContext::Restricted } else { ExecContext::Normal };

    let mut buf = MessageBuffer::new();
    let mut cursor = ArgCursor::new(&args);
    let path = tracefmt::render(&mut buf, format, &mut cursor, &ctx, exec);
    Rendered {
        text: String::from_utf8_lossy(buf.as_bytes()).into_owned(),
        path,
        consumed: cursor.position(),
        supplied: args.len(),
    }
}

fn report(rendered: &Rendered, verbose: bool) {
    println!("{}", rendered.text);
    if verbose {
        eprintln!(
            "  path: {:?}, arguments consumed: {} of {}",
            rendered.path, rendered.consumed, rendered.supplied
        );
    }
    if rendered.consumed > rendered.supplied {
        eprintln!(
            "warning: format reads {} arguments but only {} were given",
            rendered.consumed, rendered.supplied
        );
    }
}

fn cmd_render(registry: &TagRegistry, args: &cli::RenderArgs, verbose: bool) -> Result<()> {
    let tokens = token::parse_all(&args.args)?;
    let rendered = render_message(registry, &args.format, &tokens, args.restricted, &args.origin);
    report(&rendered, verbose);
    Ok(())
}

// ===========================================================================
// Batch
// ===========================================================================

/// One message of a batch file.
#[derive(Debug, Deserialize)]
struct BatchEntry {
    format: String,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    restricted: bool,
    #[serde(default)]
    origin: OriginArgs,
}

fn parse_batch(json: &str) -> Result<Vec<BatchEntry>> {
    serde_json::from_str(json).context("batch file must be a JSON array of messages")
}

fn cmd_batch(registry: &TagRegistry, file: &Path, verbose: bool) -> Result<()> {
    let json = fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let entries = parse_batch(&json)?;
    for (i, entry) in entries.iter().enumerate() {
        let tokens = token::parse_all(&entry.args).with_context(|| format!("message {}", i + 1))?;
        let rendered = render_message(registry, &entry.format, &tokens, entry.restricted, &entry.origin);
        report(&rendered, verbose);
    }
    Ok(())
}

// ===========================================================================
// Tags
// ===========================================================================

fn describe(kind: &TagKind) -> String {
    match kind {
        TagKind::Alias(target) => format!("alias -> {target}"),
        TagKind::Primitive { ty, format } => format!("primitive {ty:?} {format:?}"),
        TagKind::Enumerated { ty, format, values, style } => {
            let style = match style {
                EnumStyle::Exclusive => "enumerated",
                EnumStyle::Additive => "status",
            };
            format!("{style} {ty:?} {format:?} ({} values)", values.len())
        }
        TagKind::Structured(_) => "structured".to_owned(),
    }
}

fn cmd_tags(registry: &TagRegistry, args: &cli::TagsArgs) -> Result<()> {
    if args.check {
        if let Err(err) = registry.validate() {
            bail!("tag registry is invalid: {err}");
        }
        println!("tag registry OK ({} entries)", registry.iter().count());
        return Ok(());
    }

    let width = registry.iter().map(|def| def.name.len()).max().unwrap_or(0);
    for def in registry.iter() {
        let shadowed = registry.lookup(def.name.as_bytes()).is_some_and(|found| !core::ptr::eq(found, def));
        let note = if shadowed { "  (shadowed)" } else { "" };
        println!("{:<width$}  {}{note}", def.name, describe(&def.kind));
    }
    Ok(())
}
