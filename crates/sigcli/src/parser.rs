//! clap adapter: renders a schema as a `clap::Command` and reads matches back as raw tokens.

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches};

use crate::dispatch::RawValues;
use crate::error::{DispatchError, SchemaError};
use crate::schema::{ArgKind, Arity, ArgumentSpec, CliSchema};

/// Check that clap can tokenize the schema's positionals unambiguously.
///
/// Only the last positional may take a variable number of values, and only the
/// last two may take more than one.
pub fn check_positionals(schema: &CliSchema) -> Result<(), SchemaError> {
    let positionals: Vec<_> = schema.positionals().collect();
    let count = positionals.len();

    for (i, spec) in positionals.iter().enumerate() {
        let from_end = count - i;
        let reason = match spec.arity {
            Arity::Variadic if from_end > 1 => {
                "takes a variable number of values but is not the last positional"
            }
            Arity::Fixed(n) if n > 1 && from_end > 2 => {
                "takes several values but is followed by more than one positional"
            }
            _ => continue,
        };
        return Err(SchemaError::unsupported_signature(&spec.name, reason));
    }
    Ok(())
}

/// Build the clap command for `schema`. Defaults are not registered with clap;
/// the dispatcher fills them in so absent options stay distinguishable.
///
/// A repeated option keeps its last occurrence.
pub fn build_command(name: &str, version: Option<&str>, schema: &CliSchema) -> clap::Command {
    let mut cmd = clap::Command::new(name.to_string()).args_override_self(true);

    if let Some(summary) = schema.summary() {
        cmd = cmd.about(summary.to_string());
        if let Some(description) = schema.description() {
            cmd = cmd.long_about(format!("{summary}\n\n{description}"));
        }
    }

    match version {
        Some(v) if schema.get("version").is_none() => cmd = cmd.version(v.to_string()),
        _ => cmd = cmd.disable_version_flag(true),
    }

    for spec in schema.args() {
        cmd = cmd.arg(build_arg(spec));
    }
    cmd
}

fn build_arg(spec: &ArgumentSpec) -> Arg {
    let mut arg = Arg::new(spec.dest.clone());
    if let Some(help) = help_text(spec) {
        arg = arg.help(help);
    }

    if spec.kind == ArgKind::Flag {
        return arg.long(spec.dest.clone()).action(ArgAction::SetTrue);
    }

    arg = arg
        .value_parser(clap::value_parser!(String))
        .action(ArgAction::Set)
        .allow_negative_numbers(true);
    arg = match spec.arity {
        Arity::Zero => arg.num_args(0),
        Arity::One => arg.num_args(1),
        Arity::Fixed(n) => arg.num_args(n),
        Arity::Variadic => arg.num_args(1..),
    };

    if spec.required {
        arg.required(true).value_name(spec.dest.clone())
    } else {
        arg.long(spec.dest.clone())
            .value_name(spec.dest.to_uppercase().replace('-', "_"))
    }
}

fn help_text(spec: &ArgumentSpec) -> Option<String> {
    let choices = spec.type_rule.choices().map(|ty| ty.choices_label());
    match (&spec.help, choices) {
        (Some(help), Some(choices)) => Some(format!("{help} {choices}")),
        (Some(help), None) => Some(help.clone()),
        (None, Some(choices)) => Some(choices),
        (None, None) => None,
    }
}

/// Collect the raw tokens clap matched for each argument of `schema`.
pub fn raw_values(schema: &CliSchema, matches: &ArgMatches) -> RawValues {
    let mut raw = RawValues::new();
    for spec in schema.args() {
        match spec.kind {
            ArgKind::Flag => {
                if matches.get_flag(&spec.dest) {
                    raw.set_flag(spec.dest.clone());
                }
            }
            ArgKind::Value => {
                if let Some(values) = matches.get_many::<String>(&spec.dest) {
                    raw.insert(spec.dest.clone(), values.cloned());
                }
            }
        }
    }
    raw
}

/// Render a dispatch failure as a clap usage error so it prints like any other.
pub fn usage_error(cmd: &mut clap::Command, err: &DispatchError) -> clap::Error {
    let kind = match err {
        DispatchError::ArgumentConversion { .. } => ErrorKind::ValueValidation,
        DispatchError::InvalidChoice { .. } => ErrorKind::InvalidValue,
        DispatchError::MissingArgument { .. } => ErrorKind::MissingRequiredArgument,
        DispatchError::WrongTokenCount { .. } => ErrorKind::WrongNumberOfValues,
    };
    cmd.error(kind, err)
}
