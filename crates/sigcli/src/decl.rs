//! TOML signature declarations, for commands whose signature lives outside Rust code.
//!
//! ```toml
//! name = "resize"
//! version = "1.2.0"
//! doc = """
//! Resize an image.
//!
//! :param src: Input file
//! """
//!
//! [enums]
//! Fit = ["contain", "cover"]
//!
//! [[params]]
//! name = "src"
//!
//! [[params]]
//! name = "size"
//! type = "Tuple[int, int]"
//! default = { tuple = [640, 480] }
//!
//! [[params]]
//! name = "fit"
//! type = "Fit"
//! default = "cover"
//! kind = "keyword-only"
//! ```
//!
//! Defaults map from TOML directly for strings, integers, floats, booleans and
//! arrays (lists). Tables spell out the rest: `{ tuple = [...] }`,
//! `{ bytes = "..." }`, `{ none = true }` and `{ enum = "Fit", variant = "cover" }`.

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::command::Command;
use crate::dispatch::BoundArgs;
use crate::docstring::DocText;
use crate::error::SchemaError;
use crate::signature::{Param, ParamKind, Signature};
use crate::types::TypeExpr;
use crate::value::{EnumType, Value};

/// A loaded declaration: everything needed to build a [`Command`] except the closure.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub version: Option<String>,
    pub signature: Signature,
    pub docs: DocText,
}

impl Declaration {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawDecl = toml::from_str(content)?;
        Self::try_from(raw)
    }

    /// Compile the declaration into a command running `callable`.
    pub fn command<T, F>(&self, callable: F) -> Result<Command<T>, SchemaError>
    where
        F: Fn(BoundArgs) -> T + 'static,
    {
        let cmd = Command::new(self.name.clone(), &self.signature, callable)?.with_docs(&self.docs);
        Ok(match &self.version {
            Some(version) => cmd.version(version.clone()),
            None => cmd,
        })
    }
}

// --- Serde layer: TOML file ↔ Declaration ---

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDecl {
    name: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    doc: Option<String>,
    /// Enum name → variants, in choice order
    #[serde(default)]
    enums: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    params: Vec<RawParam>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawParam {
    name: String,
    #[serde(rename = "type", default)]
    type_expr: Option<String>,
    #[serde(default)]
    default: Option<toml::Value>,
    #[serde(default)]
    kind: ParamKind,
}

impl TryFrom<RawDecl> for Declaration {
    type Error = anyhow::Error;

    fn try_from(raw: RawDecl) -> Result<Self> {
        anyhow::ensure!(!raw.name.trim().is_empty(), "command name cannot be empty");

        let enums = raw
            .enums
            .into_iter()
            .map(|(name, variants)| -> Result<Arc<EnumType>> {
                anyhow::ensure!(!variants.is_empty(), "enum '{name}' has no variants");
                let mut seen = std::collections::HashSet::new();
                for v in &variants {
                    anyhow::ensure!(seen.insert(v), "duplicate variant '{v}' in enum '{name}'");
                }
                Ok(Arc::new(EnumType::new(name, variants)))
            })
            .collect::<Result<Vec<_>>>()?;

        let signature = raw
            .params
            .into_iter()
            .map(|p| {
                let name = p.name.clone();
                param(p, &enums).with_context(|| format!("invalid parameter '{name}'"))
            })
            .collect::<Result<Signature>>()?;

        Ok(Declaration {
            name: raw.name,
            version: raw.version,
            signature,
            docs: raw.doc.as_deref().map(DocText::parse).unwrap_or_default(),
        })
    }
}

fn param(raw: RawParam, enums: &[Arc<EnumType>]) -> Result<Param> {
    let annotation = raw
        .type_expr
        .as_deref()
        .map(|src| TypeExpr::parse(src, enums))
        .transpose()?;

    let mut param = Param::new(raw.name).kind(raw.kind);
    if let Some(default) = &raw.default {
        param = param.default(default_value(default, annotation.as_ref(), enums)?);
    }
    if let Some(annotation) = annotation {
        param = param.annotated(annotation);
    }
    Ok(param)
}

fn default_value(
    value: &toml::Value,
    annotation: Option<&TypeExpr>,
    enums: &[Arc<EnumType>],
) -> Result<Value> {
    Ok(match value {
        toml::Value::String(s) => match annotation {
            Some(TypeExpr::Enum(ty)) => Value::Enum(variant_of(ty, s)?),
            Some(TypeExpr::Bytes) => Value::bytes(s.as_bytes()),
            _ => Value::Str(s.clone()),
        },
        toml::Value::Integer(n) => Value::Int(*n),
        toml::Value::Float(x) => Value::Float(*x),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Array(items) => match annotation {
            Some(TypeExpr::Tuple(_) | TypeExpr::VarTuple(_)) => {
                Value::tuple(elements(items, annotation, enums)?)
            }
            _ => Value::list(elements(items, annotation, enums)?),
        },
        toml::Value::Table(table) => table_value(table, annotation, enums)?,
        toml::Value::Datetime(d) => bail!("datetime default '{d}' is not supported"),
    })
}

fn table_value(
    table: &toml::Table,
    annotation: Option<&TypeExpr>,
    enums: &[Arc<EnumType>],
) -> Result<Value> {
    let mut keys: Vec<&str> = table.keys().map(String::as_str).collect();
    keys.sort_unstable();

    Ok(match keys.as_slice() {
        ["tuple"] => {
            let items = table
                .get("tuple")
                .and_then(toml::Value::as_array)
                .ok_or_else(|| anyhow!("`tuple` must be an array"))?;
            Value::tuple(elements(items, annotation, enums)?)
        }
        ["bytes"] => Value::bytes(string_field(table, "bytes")?.as_bytes()),
        ["none"] => {
            anyhow::ensure!(
                table.get("none") == Some(&toml::Value::Boolean(true)),
                "`none` must be true"
            );
            Value::None
        }
        ["enum", "variant"] => {
            let name = string_field(table, "enum")?;
            let ty = enums
                .iter()
                .find(|e| e.name() == name)
                .ok_or_else(|| anyhow!("unknown enum '{name}'"))?;
            Value::Enum(variant_of(ty, string_field(table, "variant")?)?)
        }
        _ => bail!(
            "unrecognised default table with keys [{}]; expected tuple, bytes, none or enum + variant",
            keys.join(", ")
        ),
    })
}

fn elements(
    items: &[toml::Value],
    annotation: Option<&TypeExpr>,
    enums: &[Arc<EnumType>],
) -> Result<Vec<Value>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| default_value(item, element_annotation(annotation, i), enums))
        .collect()
}

fn element_annotation(annotation: Option<&TypeExpr>, index: usize) -> Option<&TypeExpr> {
    match annotation? {
        TypeExpr::List(Some(item)) | TypeExpr::VarTuple(Some(item)) => Some(item.as_ref()),
        TypeExpr::Tuple(items) => items.get(index),
        _ => None,
    }
}

fn variant_of(ty: &Arc<EnumType>, variant: &str) -> Result<crate::value::EnumValue> {
    ty.value(variant).ok_or_else(|| {
        anyhow!(
            "'{variant}' is not a variant of {} {}",
            ty.name(),
            ty.choices_label()
        )
    })
}

fn string_field<'a>(table: &'a toml::Table, key: &str) -> Result<&'a str> {
    table
        .get(key)
        .and_then(toml::Value::as_str)
        .ok_or_else(|| anyhow!("`{key}` must be a string"))
}
