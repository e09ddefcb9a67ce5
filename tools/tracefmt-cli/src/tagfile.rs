//! User tag definitions loaded from JSON.
//!
//! ```json
//! [
//!   { "kind": "primitive", "name": "PID", "type": "u32", "format": "%u" },
//!   { "kind": "enumerated", "name": "STATE", "type": "u8", "format": "%u",
//!     "values": [{ "value": 0, "name": "IDLE" }, { "value": 1, "name": "BUSY" }] },
//!   { "kind": "alias", "name": "TID", "target": "PID" }
//! ]
//! ```
//!
//! The registry wants `'static` tables, so loaded definitions are leaked.
//! That is fine for a process that loads them once and exits.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracefmt::registry::{MachineType, TagDef};
use tracefmt::TagRegistry;

/// Argument type names accepted in tag files.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeName {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    Isize,
    Usize,
    Char,
    Wchar,
    Ptr,
}

impl From<TypeName> for MachineType {
    fn from(ty: TypeName) -> Self {
        match ty {
            TypeName::I8 => Self::I8,
            TypeName::U8 => Self::U8,
            TypeName::I16 => Self::I16,
            TypeName::U16 => Self::U16,
            TypeName::I32 => Self::I32,
            TypeName::U32 => Self::U32,
            TypeName::I64 => Self::I64,
            TypeName::U64 => Self::U64,
            TypeName::Isize => Self::Isize,
            TypeName::Usize => Self::Usize,
            TypeName::Char => Self::Char,
            TypeName::Wchar => Self::WideChar,
            TypeName::Ptr => Self::Ptr,
        }
    }
}

/// One `(value, name)` pair of an enumerated tag.
#[derive(Debug, Deserialize)]
pub struct EnumValue {
    value: u64,
    name: String,
}

/// One tag definition.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TagSpec {
    /// Renders as another tag.
    Alias { name: String, target: String },
    /// One argument with a standard format.
    Primitive {
        name: String,
        #[serde(rename = "type")]
        ty: TypeName,
        format: String,
    },
    /// `(NAME)` when known, the format otherwise.
    Enumerated {
        name: String,
        #[serde(rename = "type")]
        ty: TypeName,
        format: String,
        values: Vec<EnumValue>,
    },
    /// The format, then `(NAME)` when known.
    Status {
        name: String,
        #[serde(rename = "type")]
        ty: TypeName,
        format: String,
        values: Vec<EnumValue>,
    },
}

fn leak_str(s: String) -> &'static str {
    Box::leak(s.into_boxed_str())
}

fn leak_values(values: Vec<EnumValue>) -> &'static [(u64, &'static str)] {
    let pairs: Vec<(u64, &'static str)> = values.into_iter().map(|v| (v.value, leak_str(v.name))).collect();
    Box::leak(pairs.into_boxed_slice())
}

impl TagSpec {
    fn into_def(self) -> TagDef {
        match self {
            Self::Alias { name, target } => TagDef::alias(leak_str(name), leak_str(target)),
            Self::Primitive { name, ty, format } => TagDef::primitive(leak_str(name), ty.into(), leak_str(format)),
            Self::Enumerated { name, ty, format, values } => {
                TagDef::enumerated(leak_str(name), ty.into(), leak_str(format), leak_values(values))
            }
            Self::Status { name, ty, format, values } => {
                TagDef::status(leak_str(name), ty.into(), leak_str(format), leak_values(values))
            }
        }
    }
}

/// Parses tag definitions from JSON text.
pub fn parse(json: &str) -> Result<&'static [TagDef]> {
    let specs: Vec<TagSpec> = serde_json::from_str(json).context("malformed tag definitions")?;
    let defs: Vec<TagDef> = specs.into_iter().map(TagSpec::into_def).collect();
    Ok(Box::leak(defs.into_boxed_slice()))
}

/// Builds the registry: built-ins, with the definitions in `path` on top.
pub fn load_registry(path: Option<&Path>) -> Result<&'static TagRegistry> {
    let user = match path {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
            parse(&json).with_context(|| format!("in {}", path.display()))?
        }
        None => &[],
    };
    Ok(Box::leak(Box::new(TagRegistry::new(user))))
}
