//! Coerce parsed tokens into typed values and hand them to the callable.

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use std::collections::BTreeMap;

use crate::error::{DispatchError, ValueError};
use crate::schema::{ArgKind, ArgumentSpec, CliSchema};
use crate::value::{FromValue, Value};

/// Raw tokens per dest, as produced by the argument parser.
///
/// A flag that was passed is recorded with no tokens; an absent dest has no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawValues {
    tokens: BTreeMap<String, Vec<String>>,
}

impl RawValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<I, S>(&mut self, dest: impl Into<String>, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens
            .insert(dest.into(), tokens.into_iter().map(Into::into).collect());
    }

    pub fn set_flag(&mut self, dest: impl Into<String>) {
        self.tokens.insert(dest.into(), Vec::new());
    }

    pub fn with<I, S>(mut self, dest: impl Into<String>, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(dest, tokens);
        self
    }

    pub fn with_flag(mut self, dest: impl Into<String>) -> Self {
        self.set_flag(dest);
        self
    }

    pub fn get(&self, dest: &str) -> Option<&[String]> {
        self.tokens.get(dest).map(Vec::as_slice)
    }

    pub fn contains(&self, dest: &str) -> bool {
        self.tokens.contains_key(dest)
    }
}

/// Coerced arguments in the callable's declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArgs {
    values: Vec<(String, Value)>,
}

impl BoundArgs {
    /// Typed access by parameter identifier.
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T, ValueError> {
        let value = self
            .value(name)
            .ok_or_else(|| ValueError::Missing(name.to_string()))?;
        T::from_value(value)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_vec(self) -> Vec<(String, Value)> {
        self.values
    }
}

impl Serialize for BoundArgs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Convert every argument of `schema` from `raw`, in declaration order.
pub fn coerce(schema: &CliSchema, raw: &RawValues) -> Result<BoundArgs, DispatchError> {
    let mut bound = schema
        .args()
        .iter()
        .map(|spec| coerce_one(spec, raw).map(|value| (spec.position, spec.name.clone(), value)))
        .collect::<Result<Vec<_>, _>>()?;
    bound.sort_by_key(|(position, _, _)| *position);

    Ok(BoundArgs {
        values: bound
            .into_iter()
            .map(|(_, name, value)| (name, value))
            .collect(),
    })
}

fn coerce_one(spec: &ArgumentSpec, raw: &RawValues) -> Result<Value, DispatchError> {
    let default = || spec.default.clone().unwrap_or(Value::None);

    if spec.kind == ArgKind::Flag {
        return Ok(match (raw.contains(&spec.dest), &spec.default) {
            (false, _) => default(),
            (true, Some(Value::Bool(b))) => Value::Bool(!b),
            (true, _) => Value::Bool(true),
        });
    }

    let Some(tokens) = raw.get(&spec.dest) else {
        if spec.required {
            return Err(DispatchError::MissingArgument {
                dest: spec.dest.clone(),
            });
        }
        return Ok(default());
    };

    if !spec.arity.accepts(tokens.len()) {
        return Err(DispatchError::WrongTokenCount {
            dest: spec.dest.clone(),
            expected: spec.arity.to_string(),
            got: tokens.len(),
        });
    }

    spec.type_rule.convert(&spec.dest, tokens)
}

/// Coerce `raw` and, only if every argument converts, invoke `callable`.
///
/// The callable's return value is passed through untouched.
pub fn dispatch<T, F>(schema: &CliSchema, raw: &RawValues, callable: F) -> Result<T, DispatchError>
where
    F: FnOnce(BoundArgs) -> T,
{
    let args = coerce(schema, raw)?;
    tracing::debug!(args = args.len(), "dispatching");
    Ok(callable(args))
}
