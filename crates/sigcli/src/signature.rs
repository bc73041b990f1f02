//! Signature declarations and the inspector that turns them into ordered parameter descriptors.

use serde::Deserialize;
use std::collections::HashSet;

use crate::error::SchemaError;
use crate::types::TypeExpr;
use crate::value::Value;

/// How a parameter can be bound by a caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParamKind {
    #[default]
    PositionalOrKeyword,
    KeywordOnly,
    /// `*args`-style catch-all
    VarPositional,
    /// `**kwargs`-style catch-all
    VarKeyword,
}

/// One declared parameter of a callable.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
    pub annotation: Option<TypeExpr>,
    pub default: Option<Value>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::PositionalOrKeyword,
            annotation: None,
            default: None,
        }
    }

    pub fn var_positional(name: impl Into<String>) -> Self {
        Self::new(name).kind(ParamKind::VarPositional)
    }

    pub fn var_keyword(name: impl Into<String>) -> Self {
        Self::new(name).kind(ParamKind::VarKeyword)
    }

    pub fn kind(mut self, kind: ParamKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn keyword_only(self) -> Self {
        self.kind(ParamKind::KeywordOnly)
    }

    pub fn annotated(mut self, annotation: TypeExpr) -> Self {
        self.annotation = Some(annotation);
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// An ordered parameter list: the explicit stand-in for reflecting over a function.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn push(&mut self, param: Param) {
        self.params.push(param);
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }
}

impl FromIterator<Param> for Signature {
    fn from_iter<I: IntoIterator<Item = Param>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

/// A parameter as the schema compiler sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub annotation: Option<TypeExpr>,
    pub default_value: Option<Value>,
    /// Declaration ordinal; fixes left-to-right CLI ordering.
    pub position: usize,
}

impl ParameterDescriptor {
    pub fn has_default(&self) -> bool {
        self.default_value.is_some()
    }
}

/// Inspect a signature into descriptors, rejecting shapes a CLI cannot represent.
pub fn inspect(signature: &Signature) -> Result<Vec<ParameterDescriptor>, SchemaError> {
    let mut seen = HashSet::new();
    let mut saw_default = false;
    let mut descriptors = Vec::with_capacity(signature.params.len());

    for (position, param) in signature.params.iter().enumerate() {
        if !seen.insert(param.name.as_str()) {
            return Err(SchemaError::unsupported_signature(
                &param.name,
                "is declared more than once",
            ));
        }

        if param.name.is_empty()
            || param.name.starts_with('-')
            || param.name.contains(|c: char| c.is_whitespace() || c == '=')
        {
            return Err(SchemaError::unsupported_signature(
                &param.name,
                "cannot be spelled as a command-line option",
            ));
        }

        match param.kind {
            ParamKind::VarPositional => {
                return Err(SchemaError::unsupported_signature(
                    &param.name,
                    "is a variadic positional catch-all",
                ));
            }
            ParamKind::VarKeyword => {
                return Err(SchemaError::unsupported_signature(
                    &param.name,
                    "is a variadic keyword catch-all",
                ));
            }
            ParamKind::KeywordOnly if param.default.is_none() => {
                return Err(SchemaError::unsupported_signature(
                    &param.name,
                    "is keyword-only without a default",
                ));
            }
            ParamKind::KeywordOnly => {}
            ParamKind::PositionalOrKeyword => {
                if param.default.is_some() {
                    saw_default = true;
                } else if saw_default {
                    return Err(SchemaError::unsupported_signature(
                        &param.name,
                        "has no default but follows a parameter with one",
                    ));
                }
            }
        }

        descriptors.push(ParameterDescriptor {
            name: param.name.clone(),
            annotation: param.annotation.clone(),
            default_value: param.default.clone(),
            position,
        });
    }

    tracing::debug!(count = descriptors.len(), "inspected signature");
    Ok(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unsupported(sig: Signature) -> String {
        match inspect(&sig) {
            Err(SchemaError::UnsupportedSignature { param, .. }) => param,
            other => panic!("expected UnsupportedSignature, got {other:?}"),
        }
    }

    #[test]
    fn descriptors_keep_declaration_order() {
        let sig = Signature::new()
            .param(Param::new("src"))
            .param(Param::new("dst").annotated(TypeExpr::Str))
            .param(Param::new("force").default(false));
        let descriptors = inspect(&sig).unwrap();

        let names: Vec<_> = descriptors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["src", "dst", "force"]);
        assert_eq!(descriptors[2].position, 2);
        assert!(!descriptors[0].has_default());
        assert!(descriptors[2].has_default());
        assert_eq!(descriptors[1].annotation, Some(TypeExpr::Str));
    }

    #[test]
    fn rejects_catch_alls() {
        let sig = Signature::new()
            .param(Param::new("a"))
            .param(Param::var_positional("args"));
        assert_eq!(unsupported(sig), "args");

        let sig = Signature::new().param(Param::var_keyword("kwargs"));
        assert_eq!(unsupported(sig), "kwargs");
    }

    #[test]
    fn keyword_only_needs_default() {
        let sig = Signature::new().param(Param::new("level").keyword_only());
        assert_eq!(unsupported(sig), "level");

        let sig = Signature::new()
            .param(Param::new("a").default(1))
            .param(Param::new("level").keyword_only().default(3));
        assert_eq!(inspect(&sig).unwrap().len(), 2);
    }

    #[test]
    fn required_after_default_is_rejected() {
        let sig = Signature::new()
            .param(Param::new("a").default(1))
            .param(Param::new("b"));
        assert_eq!(unsupported(sig), "b");
    }

    #[test]
    fn duplicate_identifiers_are_rejected() {
        let sig: Signature = [Param::new("x"), Param::new("x")].into_iter().collect();
        assert_eq!(unsupported(sig), "x");
    }

    #[test]
    fn names_that_cannot_be_options_are_rejected() {
        for name in ["", "-x", "two words", "a=b"] {
            let sig = Signature::new().param(Param::new(name).default(1));
            assert_eq!(unsupported(sig), name);
        }
        let sig = Signature::new().param(Param::new("_private").default(1));
        assert!(inspect(&sig).is_ok());
    }

    #[test]
    fn empty_signature_is_fine() {
        assert!(inspect(&Signature::new()).unwrap().is_empty());
    }
}
