//! Type expressions, coercion rules and the resolver that picks a rule for each parameter.
//!
//! Resolution order: a declared annotation is authoritative; without one the
//! default value's shape decides; with neither the parameter is a required string.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::error::{DispatchError, SchemaError};
use crate::schema::Arity;
use crate::signature::ParameterDescriptor;
use crate::value::{CliEnum, EnumType, Value};

/// A declared type annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Str,
    Bytes,
    Int,
    Float,
    Bool,
    Enum(Arc<EnumType>),
    /// `List[T]`; `None` for a bare `list`.
    List(Option<Box<TypeExpr>>),
    /// `Tuple[T1, T2, ...]` with a fixed element count.
    Tuple(Vec<TypeExpr>),
    /// `Tuple[T, ...]`; `None` for a bare `tuple`.
    VarTuple(Option<Box<TypeExpr>>),
    /// Anything else. Always rejected by the resolver.
    Named(String),
}

impl TypeExpr {
    pub fn enum_type(ty: EnumType) -> Self {
        TypeExpr::Enum(Arc::new(ty))
    }

    pub fn enum_of<E: CliEnum>() -> Self {
        Self::enum_type(E::enum_type())
    }

    pub fn list(item: TypeExpr) -> Self {
        TypeExpr::List(Some(Box::new(item)))
    }

    pub fn tuple<I: IntoIterator<Item = TypeExpr>>(items: I) -> Self {
        TypeExpr::Tuple(items.into_iter().collect())
    }

    pub fn var_tuple(item: TypeExpr) -> Self {
        TypeExpr::VarTuple(Some(Box::new(item)))
    }

    /// Parse a textual annotation such as `Tuple[int, ...]` or `List[Color]`.
    ///
    /// `enums` resolves enum names; a `typing.` or `t.` prefix on any name is ignored.
    pub fn parse(src: &str, enums: &[Arc<EnumType>]) -> Result<Self, TypeSyntaxError> {
        let mut parser = ExprParser {
            src,
            pos: 0,
            enums,
        };
        let expr = parser.expr()?;
        parser.skip_ws();
        if parser.pos != src.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(expr)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Str => f.write_str("str"),
            TypeExpr::Bytes => f.write_str("bytes"),
            TypeExpr::Int => f.write_str("int"),
            TypeExpr::Float => f.write_str("float"),
            TypeExpr::Bool => f.write_str("bool"),
            TypeExpr::Enum(ty) => f.write_str(ty.name()),
            TypeExpr::List(None) => f.write_str("list"),
            TypeExpr::List(Some(item)) => write!(f, "List[{item}]"),
            TypeExpr::Tuple(items) => {
                f.write_str("Tuple[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            TypeExpr::VarTuple(None) => f.write_str("tuple"),
            TypeExpr::VarTuple(Some(item)) => write!(f, "Tuple[{item}, ...]"),
            TypeExpr::Named(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid type expression `{expr}` at offset {offset}: {reason}")]
pub struct TypeSyntaxError {
    pub expr: String,
    pub offset: usize,
    pub reason: String,
}

enum TypeArg {
    Expr(TypeExpr),
    Ellipsis,
}

struct ExprParser<'a> {
    src: &'a str,
    pos: usize,
    enums: &'a [Arc<EnumType>],
}

impl ExprParser<'_> {
    fn error(&self, reason: &str) -> TypeSyntaxError {
        TypeSyntaxError {
            expr: self.src.to_string(),
            offset: self.pos,
            reason: reason.to_string(),
        }
    }

    fn rest(&self) -> &str {
        &self.src[self.pos..]
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Result<&str, TypeSyntaxError> {
        self.skip_ws();
        let len = self
            .rest()
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
            .unwrap_or(self.rest().len());
        if len == 0 {
            return Err(self.error("expected a type name"));
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.src[start..self.pos])
    }

    fn expr(&mut self) -> Result<TypeExpr, TypeSyntaxError> {
        self.skip_ws();
        let start = self.pos;
        let full = self.ident()?;
        let name = full
            .strip_prefix("typing.")
            .or_else(|| full.strip_prefix("t."))
            .unwrap_or(full)
            .to_string();

        let args = if self.eat("[") {
            let args = self.args()?;
            if !self.eat("]") {
                return Err(self.error("expected `]`"));
            }
            Some(args)
        } else {
            None
        };

        let text = self.src[start..self.pos].to_string();
        self.classify(name, text, args)
    }

    fn args(&mut self) -> Result<Vec<TypeArg>, TypeSyntaxError> {
        let mut args = Vec::new();
        loop {
            if self.eat("...") {
                args.push(TypeArg::Ellipsis);
            } else {
                args.push(TypeArg::Expr(self.expr()?));
            }
            if !self.eat(",") {
                return Ok(args);
            }
        }
    }

    fn classify(
        &self,
        name: String,
        text: String,
        args: Option<Vec<TypeArg>>,
    ) -> Result<TypeExpr, TypeSyntaxError> {
        let scalar = match name.as_str() {
            "str" => Some(TypeExpr::Str),
            "bytes" => Some(TypeExpr::Bytes),
            "int" => Some(TypeExpr::Int),
            "float" => Some(TypeExpr::Float),
            "bool" => Some(TypeExpr::Bool),
            _ => None,
        };
        if let Some(scalar) = scalar {
            return match args {
                None => Ok(scalar),
                Some(_) => Err(self.error(&format!("`{name}` takes no type arguments"))),
            };
        }

        match (name.as_str(), args) {
            ("list" | "List", None) => Ok(TypeExpr::List(None)),
            ("list" | "List", Some(mut args)) => match (args.pop(), args.is_empty()) {
                (Some(TypeArg::Expr(item)), true) => Ok(TypeExpr::list(item)),
                _ => Err(self.error("`List` takes exactly one type argument")),
            },
            ("tuple" | "Tuple", None) => Ok(TypeExpr::VarTuple(None)),
            ("tuple" | "Tuple", Some(args)) => tuple_from_args(args).ok_or_else(|| {
                self.error("`...` is only allowed as the second and last `Tuple` argument")
            }),
            (_, None) => Ok(match self.enums.iter().find(|e| e.name() == name) {
                Some(ty) => TypeExpr::Enum(Arc::clone(ty)),
                None => TypeExpr::Named(name.clone()),
            }),
            (_, Some(_)) => Ok(TypeExpr::Named(text)),
        }
    }
}

fn tuple_from_args(args: Vec<TypeArg>) -> Option<TypeExpr> {
    match args.as_slice() {
        [TypeArg::Expr(item), TypeArg::Ellipsis] => Some(TypeExpr::var_tuple(item.clone())),
        _ => args
            .into_iter()
            .map(|arg| match arg {
                TypeArg::Expr(expr) => Some(expr),
                TypeArg::Ellipsis => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(TypeExpr::Tuple),
    }
}

/// Element type that a single token converts into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Str,
    Bytes,
    Int,
    Float,
    Bool,
    Enum(Arc<EnumType>),
}

impl Kind {
    pub fn name(&self) -> &str {
        match self {
            Kind::Str => "str",
            Kind::Bytes => "bytes",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Bool => "bool",
            Kind::Enum(ty) => ty.name(),
        }
    }

    /// Convert one raw token. `dest` only labels errors.
    pub fn convert(&self, dest: &str, token: &str) -> Result<Value, DispatchError> {
        let conversion_error = || DispatchError::ArgumentConversion {
            dest: dest.to_string(),
            token: token.to_string(),
            kind: self.name().to_string(),
        };

        match self {
            Kind::Str => Ok(Value::Str(token.to_string())),
            Kind::Bytes => Ok(Value::Bytes(token.as_bytes().to_vec())),
            Kind::Int => token
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| conversion_error()),
            Kind::Float => token
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| conversion_error()),
            Kind::Bool => parse_bool(token)
                .map(Value::Bool)
                .ok_or_else(conversion_error),
            Kind::Enum(ty) => {
                ty.value(token)
                    .map(Value::Enum)
                    .ok_or_else(|| DispatchError::InvalidChoice {
                        dest: dest.to_string(),
                        token: token.to_string(),
                        choices: ty.variants().to_vec(),
                    })
            }
        }
    }

    fn of_expr(param: &str, expr: &TypeExpr) -> Result<Kind, SchemaError> {
        match expr {
            TypeExpr::Str => Ok(Kind::Str),
            TypeExpr::Bytes => Ok(Kind::Bytes),
            TypeExpr::Int => Ok(Kind::Int),
            TypeExpr::Float => Ok(Kind::Float),
            TypeExpr::Bool => Ok(Kind::Bool),
            TypeExpr::Enum(ty) => Ok(Kind::Enum(Arc::clone(ty))),
            TypeExpr::List(_) | TypeExpr::Tuple(_) | TypeExpr::VarTuple(_) => Err(
                SchemaError::unsupported_type(param, format!("nested container `{expr}`")),
            ),
            TypeExpr::Named(name) => Err(SchemaError::unsupported_type(
                param,
                format!("`{name}` is not a supported type"),
            )),
        }
    }

    fn of_value(param: &str, value: &Value) -> Result<Kind, SchemaError> {
        match value {
            Value::Str(_) => Ok(Kind::Str),
            Value::Bytes(_) => Ok(Kind::Bytes),
            Value::Int(_) => Ok(Kind::Int),
            Value::Float(_) => Ok(Kind::Float),
            Value::Bool(_) => Ok(Kind::Bool),
            Value::Enum(e) => Ok(Kind::Enum(Arc::clone(e.enum_type()))),
            Value::None => Err(SchemaError::unsupported_type(
                param,
                "a `None` default needs a type annotation",
            )),
            Value::List(_) | Value::Tuple(_) => Err(SchemaError::unsupported_type(
                param,
                format!("nested container in default `{value}`"),
            )),
        }
    }
}

/// Accepts the usual spellings of true and false, case-insensitively.
fn parse_bool(token: &str) -> Option<bool> {
    match token.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// How a parameter's tokens turn into a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRule {
    Scalar(Kind),
    FixedTuple(Vec<Kind>),
    VariableTuple(Kind),
    List(Kind),
    Enum(Arc<EnumType>),
}

impl TypeRule {
    pub fn arity(&self) -> Arity {
        match self {
            TypeRule::Scalar(_) | TypeRule::Enum(_) => Arity::One,
            TypeRule::FixedTuple(kinds) => Arity::Fixed(kinds.len()),
            TypeRule::VariableTuple(_) | TypeRule::List(_) => Arity::Variadic,
        }
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, TypeRule::Scalar(Kind::Bool))
    }

    /// The variant set when every token must name one of its variants.
    pub fn choices(&self) -> Option<&EnumType> {
        match self {
            TypeRule::Enum(ty)
            | TypeRule::Scalar(Kind::Enum(ty))
            | TypeRule::VariableTuple(Kind::Enum(ty))
            | TypeRule::List(Kind::Enum(ty)) => Some(ty),
            TypeRule::FixedTuple(kinds) => match kinds.first() {
                Some(Kind::Enum(first)) if kinds.iter().all(|k| k == &kinds[0]) => Some(first),
                _ => None,
            },
            TypeRule::Scalar(_) | TypeRule::VariableTuple(_) | TypeRule::List(_) => None,
        }
    }

    /// Convert a token run whose length already satisfies [`TypeRule::arity`].
    pub fn convert(&self, dest: &str, tokens: &[String]) -> Result<Value, DispatchError> {
        let each = |kind: &Kind| {
            tokens
                .iter()
                .map(|t| kind.convert(dest, t))
                .collect::<Result<Vec<_>, _>>()
        };

        match self {
            TypeRule::Scalar(kind) => single(dest, tokens).and_then(|t| kind.convert(dest, t)),
            TypeRule::Enum(ty) => {
                single(dest, tokens).and_then(|t| Kind::Enum(Arc::clone(ty)).convert(dest, t))
            }
            TypeRule::FixedTuple(kinds) => {
                if tokens.len() != kinds.len() {
                    return Err(DispatchError::WrongTokenCount {
                        dest: dest.to_string(),
                        expected: kinds.len().to_string(),
                        got: tokens.len(),
                    });
                }
                kinds
                    .iter()
                    .zip(tokens)
                    .map(|(kind, t)| kind.convert(dest, t))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Tuple)
            }
            TypeRule::VariableTuple(kind) => each(kind).map(Value::Tuple),
            TypeRule::List(kind) => each(kind).map(Value::List),
        }
    }
}

fn single<'a>(dest: &str, tokens: &'a [String]) -> Result<&'a str, DispatchError> {
    match tokens {
        [token] => Ok(token),
        _ => Err(DispatchError::WrongTokenCount {
            dest: dest.to_string(),
            expected: "1".to_string(),
            got: tokens.len(),
        }),
    }
}

impl fmt::Display for TypeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRule::Scalar(kind) => f.write_str(kind.name()),
            TypeRule::Enum(ty) => write!(f, "{}{}", ty.name(), ty.choices_label()),
            TypeRule::FixedTuple(kinds) => {
                let names: Vec<_> = kinds.iter().map(Kind::name).collect();
                write!(f, "Tuple[{}]", names.join(", "))
            }
            TypeRule::VariableTuple(kind) => write!(f, "Tuple[{}, ...]", kind.name()),
            TypeRule::List(kind) => write!(f, "List[{}]", kind.name()),
        }
    }
}

/// Pick the coercion rule for one parameter.
pub fn resolve(descriptor: &ParameterDescriptor) -> Result<TypeRule, SchemaError> {
    let name = descriptor.name.as_str();
    let rule = match (&descriptor.annotation, &descriptor.default_value) {
        (Some(annotation), default) => {
            let rule = from_annotation(name, annotation)?;
            if let (TypeRule::FixedTuple(kinds), Some(Value::Tuple(items))) = (&rule, default)
                && kinds.len() != items.len()
            {
                return Err(SchemaError::AmbiguousArity {
                    param: name.to_string(),
                    annotated: kinds.len(),
                    default: items.len(),
                });
            }
            rule
        }
        (None, Some(default)) => from_default(name, default)?,
        (None, None) => TypeRule::Scalar(Kind::Str),
    };

    tracing::debug!(param = name, rule = %rule, "resolved type rule");
    Ok(rule)
}

fn from_annotation(param: &str, annotation: &TypeExpr) -> Result<TypeRule, SchemaError> {
    match annotation {
        TypeExpr::Enum(ty) => Ok(TypeRule::Enum(Arc::clone(ty))),
        TypeExpr::List(None) => Ok(TypeRule::List(Kind::Str)),
        TypeExpr::List(Some(item)) => Kind::of_expr(param, item).map(TypeRule::List),
        TypeExpr::VarTuple(None) => Ok(TypeRule::VariableTuple(Kind::Str)),
        TypeExpr::VarTuple(Some(item)) => Kind::of_expr(param, item).map(TypeRule::VariableTuple),
        TypeExpr::Tuple(items) if items.is_empty() => Err(SchemaError::unsupported_type(
            param,
            "an empty tuple takes no command-line values",
        )),
        TypeExpr::Tuple(items) => items
            .iter()
            .map(|item| Kind::of_expr(param, item))
            .collect::<Result<Vec<_>, _>>()
            .map(TypeRule::FixedTuple),
        scalar => Kind::of_expr(param, scalar).map(TypeRule::Scalar),
    }
}

fn from_default(param: &str, default: &Value) -> Result<TypeRule, SchemaError> {
    match default {
        Value::Enum(e) => Ok(TypeRule::Enum(Arc::clone(e.enum_type()))),
        Value::Tuple(items) => {
            let kinds = items
                .iter()
                .map(|item| Kind::of_value(param, item))
                .collect::<Result<Vec<_>, _>>()?;
            match kinds.first() {
                None => Ok(TypeRule::VariableTuple(Kind::Str)),
                Some(first) if kinds.iter().all(|k| k == first) => {
                    Ok(TypeRule::VariableTuple(first.clone()))
                }
                Some(_) => Ok(TypeRule::FixedTuple(kinds)),
            }
        }
        Value::List(items) => {
            let kinds = items
                .iter()
                .map(|item| Kind::of_value(param, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(TypeRule::List(kinds.into_iter().next().unwrap_or(Kind::Str)))
        }
        scalar => Kind::of_value(param, scalar).map(TypeRule::Scalar),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice() -> Arc<EnumType> {
        Arc::new(EnumType::new("Choice", ["first", "second"]))
    }

    fn descriptor(annotation: Option<TypeExpr>, default: Option<Value>) -> ParameterDescriptor {
        ParameterDescriptor {
            name: "p".into(),
            annotation,
            default_value: default,
            position: 0,
        }
    }

    fn rule(annotation: Option<TypeExpr>, default: Option<Value>) -> TypeRule {
        resolve(&descriptor(annotation, default)).unwrap()
    }

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    // -- parsing --

    #[test]
    fn parses_scalars_and_containers() {
        let enums = [choice()];
        let parse = |s: &str| TypeExpr::parse(s, &enums).unwrap();

        assert_eq!(parse("int"), TypeExpr::Int);
        assert_eq!(parse("List"), TypeExpr::List(None));
        assert_eq!(parse("typing.List[int]"), TypeExpr::list(TypeExpr::Int));
        assert_eq!(parse("tuple"), TypeExpr::VarTuple(None));
        assert_eq!(
            parse("Tuple[int, str]"),
            TypeExpr::tuple([TypeExpr::Int, TypeExpr::Str])
        );
        assert_eq!(parse("t.Tuple[ int , ... ]"), TypeExpr::var_tuple(TypeExpr::Int));
        assert_eq!(parse("Choice"), TypeExpr::Enum(choice()));
        assert_eq!(parse("dict"), TypeExpr::Named("dict".into()));
        assert_eq!(parse("Dict[str, int]"), TypeExpr::Named("Dict[str, int]".into()));
    }

    #[test]
    fn rejects_malformed_expressions() {
        for bad in ["", "List[int", "int[str]", "Tuple[..., int]", "List[int, str]", "int ]"] {
            assert!(TypeExpr::parse(bad, &[]).is_err(), "{bad:?} should fail");
        }
    }

    #[test]
    fn display_matches_parse_syntax() {
        let expr = TypeExpr::parse("Tuple[int, ...]", &[]).unwrap();
        assert_eq!(expr.to_string(), "Tuple[int, ...]");
        assert_eq!(TypeExpr::parse(&expr.to_string(), &[]).unwrap(), expr);
    }

    // -- annotation rules --

    #[test]
    fn annotation_rules() {
        assert_eq!(rule(Some(TypeExpr::Int), None), TypeRule::Scalar(Kind::Int));
        assert_eq!(rule(Some(TypeExpr::List(None)), None), TypeRule::List(Kind::Str));
        assert_eq!(
            rule(Some(TypeExpr::list(TypeExpr::Int)), None),
            TypeRule::List(Kind::Int)
        );
        assert_eq!(
            rule(Some(TypeExpr::VarTuple(None)), None),
            TypeRule::VariableTuple(Kind::Str)
        );
        assert_eq!(
            rule(Some(TypeExpr::tuple([TypeExpr::Int, TypeExpr::Str])), None),
            TypeRule::FixedTuple(vec![Kind::Int, Kind::Str])
        );
        assert_eq!(
            rule(Some(TypeExpr::Enum(choice())), None),
            TypeRule::Enum(choice())
        );
    }

    #[test]
    fn annotation_beats_default_type() {
        assert_eq!(
            rule(Some(TypeExpr::Float), Some(Value::Int(1))),
            TypeRule::Scalar(Kind::Float)
        );
        assert_eq!(
            rule(Some(TypeExpr::Str), Some(Value::None)),
            TypeRule::Scalar(Kind::Str)
        );
    }

    #[test]
    fn tuple_annotation_and_default_must_agree_on_arity() {
        let annotation = TypeExpr::tuple([TypeExpr::Int, TypeExpr::Int]);
        let err = resolve(&descriptor(
            Some(annotation.clone()),
            Some(Value::tuple([Value::Int(1), Value::Int(2), Value::Int(3)])),
        ))
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::AmbiguousArity {
                param: "p".into(),
                annotated: 2,
                default: 3
            }
        );

        let ok = rule(
            Some(annotation),
            Some(Value::tuple([Value::Int(1), Value::Int(2)])),
        );
        assert_eq!(ok.arity(), Arity::Fixed(2));
    }

    #[test]
    fn unsupported_annotations() {
        for expr in [
            TypeExpr::Named("dict".into()),
            TypeExpr::list(TypeExpr::list(TypeExpr::Int)),
            TypeExpr::Tuple(vec![]),
        ] {
            let err = resolve(&descriptor(Some(expr.clone()), None)).unwrap_err();
            assert!(
                matches!(err, SchemaError::UnsupportedType { .. }),
                "{expr}: {err}"
            );
        }
    }

    // -- default inference --

    #[test]
    fn default_inference() {
        assert_eq!(rule(None, Some(Value::Bool(false))), TypeRule::Scalar(Kind::Bool));
        assert_eq!(rule(None, Some(Value::Int(0))), TypeRule::Scalar(Kind::Int));
        assert_eq!(rule(None, Some(Value::from(""))), TypeRule::Scalar(Kind::Str));
        assert_eq!(rule(None, Some(Value::list([]))), TypeRule::List(Kind::Str));
        assert_eq!(
            rule(None, Some(Value::list([Value::Int(1)]))),
            TypeRule::List(Kind::Int)
        );
        assert_eq!(
            rule(None, Some(Value::tuple([]))),
            TypeRule::VariableTuple(Kind::Str)
        );
        assert_eq!(
            rule(None, Some(Value::tuple([Value::Int(1), Value::Int(2)]))),
            TypeRule::VariableTuple(Kind::Int)
        );
        assert_eq!(
            rule(None, Some(Value::tuple([Value::Int(1), Value::from("2")]))),
            TypeRule::FixedTuple(vec![Kind::Int, Kind::Str])
        );
    }

    #[test]
    fn enum_defaults_carry_their_variant_set() {
        let first = choice().value("first").unwrap();
        assert_eq!(rule(None, Some(Value::Enum(first.clone()))), TypeRule::Enum(choice()));
        assert_eq!(
            rule(None, Some(Value::tuple([Value::Enum(first)]))),
            TypeRule::VariableTuple(Kind::Enum(choice()))
        );
    }

    #[test]
    fn no_annotation_no_default_is_str() {
        assert_eq!(rule(None, None), TypeRule::Scalar(Kind::Str));
    }

    #[test]
    fn unsupported_defaults() {
        for default in [
            Value::None,
            Value::list([Value::list([])]),
            Value::tuple([Value::tuple([])]),
        ] {
            let err = resolve(&descriptor(None, Some(default))).unwrap_err();
            assert!(matches!(err, SchemaError::UnsupportedType { .. }), "{err}");
        }
    }

    // -- conversion --

    #[test]
    fn converts_scalars() {
        let int = TypeRule::Scalar(Kind::Int);
        assert_eq!(int.convert("n", &tokens(&["-3"])).unwrap(), Value::Int(-3));
        assert_eq!(
            TypeRule::Scalar(Kind::Bytes).convert("b", &tokens(&["hi"])).unwrap(),
            Value::bytes(*b"hi")
        );

        let err = int.convert("n", &tokens(&["three"])).unwrap_err();
        assert_eq!(
            err,
            DispatchError::ArgumentConversion {
                dest: "n".into(),
                token: "three".into(),
                kind: "int".into()
            }
        );
        assert!(
            TypeRule::Scalar(Kind::Float)
                .convert("x", &tokens(&["1.5e3"]))
                .is_ok()
        );
    }

    #[test]
    fn rejects_non_numeric_float() {
        let err = TypeRule::Scalar(Kind::Float)
            .convert("ratio", &tokens(&["abc"]))
            .unwrap_err();
        assert_eq!(
            err,
            DispatchError::ArgumentConversion {
                dest: "ratio".into(),
                token: "abc".into(),
                kind: "float".into()
            }
        );
    }

    #[test]
    fn converts_bool_tokens() {
        let rule = TypeRule::Scalar(Kind::Bool);
        for (token, expected) in [("true", true), ("No", false), ("1", true), ("OFF", false)] {
            assert_eq!(
                rule.convert("b", &tokens(&[token])).unwrap(),
                Value::Bool(expected)
            );
        }
        assert!(rule.convert("b", &tokens(&["maybe"])).is_err());
    }

    #[test]
    fn converts_fixed_tuples_positionally() {
        let rule = TypeRule::FixedTuple(vec![Kind::Int, Kind::Str]);
        assert_eq!(
            rule.convert("t", &tokens(&["1", "2"])).unwrap(),
            Value::tuple([Value::Int(1), Value::from("2")])
        );
        assert!(matches!(
            rule.convert("t", &tokens(&["1", "2", "3"])),
            Err(DispatchError::WrongTokenCount { got: 3, .. })
        ));
    }

    #[test]
    fn enum_tokens_must_match_exactly() {
        let rule = TypeRule::Enum(choice());
        assert_eq!(
            rule.convert("c", &tokens(&["second"])).unwrap(),
            Value::Enum(choice().value("second").unwrap())
        );
        let err = rule.convert("c", &tokens(&["Second"])).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidChoice { .. }), "{err}");
    }

    #[test]
    fn choices_for_enum_containers() {
        assert!(TypeRule::List(Kind::Enum(choice())).choices().is_some());
        assert!(
            TypeRule::FixedTuple(vec![Kind::Enum(choice()), Kind::Enum(choice())])
                .choices()
                .is_some()
        );
        assert!(
            TypeRule::FixedTuple(vec![Kind::Enum(choice()), Kind::Int])
                .choices()
                .is_none()
        );
    }
}
