//! Error taxonomy. Schema errors are raised while building a command (author mistakes),
//! dispatch errors after user input has been read (usage mistakes).

use thiserror::Error;

/// Raised while turning a signature into a schema, before any argv is read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unsupported signature: parameter `{param}` {reason}")]
    UnsupportedSignature { param: String, reason: String },

    #[error("unsupported type for parameter `{param}`: {detail}")]
    UnsupportedType { param: String, detail: String },

    #[error(
        "ambiguous arity for parameter `{param}`: annotation expects {annotated} values, default has {default}"
    )]
    AmbiguousArity {
        param: String,
        annotated: usize,
        default: usize,
    },

    #[error("duplicate argument name `{dest}` (from parameters `{first}` and `{second}`)")]
    DuplicateArgumentName {
        dest: String,
        first: String,
        second: String,
    },
}

impl SchemaError {
    pub(crate) fn unsupported_signature(param: &str, reason: impl Into<String>) -> Self {
        SchemaError::UnsupportedSignature {
            param: param.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported_type(param: &str, detail: impl Into<String>) -> Self {
        SchemaError::UnsupportedType {
            param: param.to_string(),
            detail: detail.into(),
        }
    }
}

/// Raised while coercing parsed tokens; the callable has not been invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("invalid value '{token}' for '{dest}': expected {kind}")]
    ArgumentConversion {
        dest: String,
        token: String,
        kind: String,
    },

    #[error("invalid choice '{token}' for '{dest}' (choose from {})", .choices.join(", "))]
    InvalidChoice {
        dest: String,
        token: String,
        choices: Vec<String>,
    },

    #[error("the argument '{dest}' is required")]
    MissingArgument { dest: String },

    #[error("'{dest}' takes {expected} value(s), got {got}")]
    WrongTokenCount {
        dest: String,
        expected: String,
        got: usize,
    },
}

impl DispatchError {
    /// The CLI-visible name of the argument that failed.
    pub fn dest(&self) -> &str {
        match self {
            DispatchError::ArgumentConversion { dest, .. }
            | DispatchError::InvalidChoice { dest, .. }
            | DispatchError::MissingArgument { dest }
            | DispatchError::WrongTokenCount { dest, .. } => dest,
        }
    }
}

/// Raised when reading a typed value back out of bound arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("no argument named `{0}`")]
    Missing(String),

    #[error("expected {expected}, found {found}")]
    Mismatch { expected: String, found: String },

    #[error("unknown variant `{variant}` for enum `{enum_name}`")]
    UnknownVariant { enum_name: String, variant: String },
}

/// Everything that can go wrong between argv and the callable.
#[derive(Debug, Error)]
pub enum CliError {
    /// Tokenizer-level failure, or a help/version request, reported by clap.
    #[error(transparent)]
    Parse(#[from] clap::Error),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
