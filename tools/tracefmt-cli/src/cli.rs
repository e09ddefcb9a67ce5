//! Command-line interface definitions for the tracefmt host tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

/// Render and inspect trace format strings.
#[derive(Parser)]
#[command(name = "tracefmt", version, about)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// JSON file of additional tag definitions layered over the built-ins.
    #[arg(long, short = 't', global = true)]
    pub tags: Option<PathBuf>,

    /// Report the render path and argument consumption on stderr.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Render one format string.
    Render(RenderArgs),
    /// List the registered tags.
    Tags(TagsArgs),
    /// Render every message in a JSON batch file.
    Batch(BatchArgs),
}

/// Arguments for the `render` subcommand.
#[derive(Parser)]
pub struct RenderArgs {
    /// Format string, e.g. `"read %u bytes: %!STATUS!"`.
    pub format: String,

    /// Typed arguments: `i:-5 u:7 x:ff c:A C:Z p:0x10 s:text S:text null
    /// g:<guid> d:<hex bytes>`.
    #[arg(allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Render as from a restricted (atomic) context.
    #[arg(long)]
    pub restricted: bool,

    /// Call-site fields for `%!FILE!`, `%!LINE!` and friends.
    #[command(flatten)]
    pub origin: OriginArgs,
}

/// Arguments for the `tags` subcommand.
#[derive(Parser)]
pub struct TagsArgs {
    /// Validate the registry and fail on the first problem.
    #[arg(long)]
    pub check: bool,
}

/// Arguments for the `batch` subcommand.
#[derive(Parser)]
pub struct BatchArgs {
    /// JSON array of `{ "format", "args", "restricted", "origin" }` objects.
    pub file: PathBuf,
}

/// Origin record fields, in record order.
#[derive(Args, Deserialize, Default, Debug, Clone)]
#[serde(default)]
pub struct OriginArgs {
    /// Source file.
    #[arg(long)]
    pub file: Option<String>,
    /// Source line.
    #[arg(long)]
    pub line: Option<u32>,
    /// Function name.
    #[arg(long)]
    pub func: Option<String>,
    /// Trace flags.
    #[arg(long)]
    pub flags: Option<String>,
    /// Trace level.
    #[arg(long)]
    pub level: Option<String>,
}

impl OriginArgs {
    /// Builds the NUL-separated origin record.
    ///
    /// Fields after the last one given are left out, so they render as
    /// `(null)`; gaps before it become empty fields.
    pub fn to_record(&self) -> Vec<u8> {
        let fields = [
            self.file.clone(),
            self.line.map(|l| l.to_string()),
            self.func.clone(),
            self.flags.clone(),
            self.level.clone(),
        ];
        let present = fields.iter().rposition(Option::is_some).map_or(0, |i| i + 1);
        let mut record = Vec::new();
        for field in &fields[..present] {
            record.extend_from_slice(field.as_deref().unwrap_or_default().as_bytes());
            record.push(0);
        }
        record
    }
}
