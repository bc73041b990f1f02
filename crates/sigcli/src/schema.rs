//! The command-line schema: one `ArgumentSpec` per parameter, positionals first.

use std::collections::HashMap;
use std::fmt;

use crate::error::SchemaError;
use crate::signature::{self, ParameterDescriptor, Signature};
use crate::types::{self, TypeRule};
use crate::value::Value;

/// Dest names the generated parser claims for itself.
const RESERVED_DESTS: &[&str] = &["help"];

/// How many raw tokens an argument consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Flags only: presence is the value.
    Zero,
    One,
    Fixed(usize),
    /// One or more.
    Variadic,
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Zero => count == 0,
            Arity::One => count == 1,
            Arity::Fixed(n) => count == *n,
            Arity::Variadic => count >= 1,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Zero => f.write_str("0"),
            Arity::One => f.write_str("1"),
            Arity::Fixed(n) => write!(f, "{n}"),
            Arity::Variadic => f.write_str("1+"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Flag,
    Value,
}

/// One command-line argument derived from one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentSpec {
    /// CLI-visible name, also the key for parsed values
    pub dest: String,
    /// Parameter identifier the value is bound back to
    pub name: String,
    pub position: usize,
    pub required: bool,
    pub arity: Arity,
    pub kind: ArgKind,
    pub help: Option<String>,
    pub type_rule: TypeRule,
    pub default: Option<Value>,
}

impl ArgumentSpec {
    pub fn is_positional(&self) -> bool {
        self.required
    }

    pub fn is_flag(&self) -> bool {
        self.kind == ArgKind::Flag
    }
}

/// Ordered argument specs plus the command's help summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliSchema {
    args: Vec<ArgumentSpec>,
    pub(crate) summary: Option<String>,
    pub(crate) description: Option<String>,
}

impl CliSchema {
    /// Inspect, resolve and build in one step.
    pub fn from_signature(signature: &Signature) -> Result<Self, SchemaError> {
        let descriptors = signature::inspect(signature)?;
        let pairs = descriptors
            .into_iter()
            .map(|d| types::resolve(&d).map(|rule| (d, rule)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::build(&pairs)
    }

    /// Aggregate resolved parameters into a schema.
    ///
    /// Required parameters become positionals in declaration order; the rest become
    /// named options. Fails when two parameters map to the same dest.
    pub fn build(params: &[(ParameterDescriptor, TypeRule)]) -> Result<Self, SchemaError> {
        let mut owners: HashMap<String, &str> = HashMap::new();
        let mut positionals = Vec::new();
        let mut options = Vec::new();

        for (descriptor, rule) in params {
            let dest = cli_name(&descriptor.name);

            if let Some(first) = owners.get(&dest) {
                return Err(SchemaError::DuplicateArgumentName {
                    dest,
                    first: first.to_string(),
                    second: descriptor.name.clone(),
                });
            }
            if RESERVED_DESTS.contains(&dest.as_str()) {
                return Err(SchemaError::DuplicateArgumentName {
                    first: format!("--{dest}"),
                    second: descriptor.name.clone(),
                    dest,
                });
            }
            owners.insert(dest.clone(), &descriptor.name);

            let is_flag = rule.is_bool() && descriptor.has_default();
            let spec = ArgumentSpec {
                dest,
                name: descriptor.name.clone(),
                position: descriptor.position,
                required: !descriptor.has_default(),
                arity: if is_flag { Arity::Zero } else { rule.arity() },
                kind: if is_flag { ArgKind::Flag } else { ArgKind::Value },
                help: None,
                type_rule: rule.clone(),
                default: descriptor.default_value.clone(),
            };

            if spec.required {
                positionals.push(spec);
            } else {
                options.push(spec);
            }
        }

        positionals.sort_by_key(|s| s.position);
        options.sort_by_key(|s| s.position);
        positionals.append(&mut options);

        tracing::debug!(args = positionals.len(), "built command-line schema");
        Ok(Self {
            args: positionals,
            summary: None,
            description: None,
        })
    }

    pub fn args(&self) -> &[ArgumentSpec] {
        &self.args
    }

    pub(crate) fn args_mut(&mut self) -> &mut [ArgumentSpec] {
        &mut self.args
    }

    pub fn positionals(&self) -> impl Iterator<Item = &ArgumentSpec> {
        self.args.iter().filter(|a| a.is_positional())
    }

    pub fn options(&self) -> impl Iterator<Item = &ArgumentSpec> {
        self.args.iter().filter(|a| !a.is_positional())
    }

    pub fn get(&self, dest: &str) -> Option<&ArgumentSpec> {
        self.args.iter().find(|a| a.dest == dest)
    }

    /// First paragraph of the command's documentation.
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Documentation beyond the summary.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Identifier to CLI token: `snake_case` becomes `snake-case`.
///
/// Only underscores between words are swapped; leading and trailing ones stay,
/// so `_private` keeps a valid long option.
pub fn cli_name(name: &str) -> String {
    let body = name.trim_matches('_');
    if body.is_empty() {
        return name.to_string();
    }
    let start = name.len() - name.trim_start_matches('_').len();
    let end = start + body.len();
    format!("{}{}{}", &name[..start], body.replace('_', "-"), &name[end..])
}
