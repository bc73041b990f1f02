//! sigcli: compile a function signature into a command-line interface.
//!
//! A [`Signature`] (built in Rust or loaded from a TOML [`Declaration`]) is
//! inspected, each parameter's type is resolved, and the result becomes a
//! [`CliSchema`]. A [`Command`] pairs that schema with a closure, parses argv with
//! clap, coerces tokens into typed [`Value`]s and invokes the closure.
//!
//! ```no_run
//! use sigcli::{Command, Param, Signature, TypeExpr};
//!
//! let sig = Signature::new()
//!     .param(Param::new("name"))
//!     .param(Param::new("times").annotated(TypeExpr::Int).default(1));
//! let cmd = Command::new("greet", &sig, |args| {
//!     for _ in 0..args.get::<i64>("times")? {
//!         println!("hello {}", args.get::<String>("name")?);
//!     }
//!     Ok::<_, sigcli::ValueError>(())
//! })?;
//! cmd.run()?;
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```
//!
//! The crate also ships the `sigcli` tool, whose entry point is [`run`].

pub mod cli;
pub mod command;
pub mod decl;
pub mod dispatch;
pub mod docstring;
pub mod error;
pub mod help;
pub mod logging;
pub mod parser;
pub mod schema;
pub mod signature;
pub mod types;
pub mod value;

pub use command::Command;
pub use decl::Declaration;
pub use dispatch::{BoundArgs, RawValues, coerce, dispatch};
pub use docstring::DocText;
pub use error::{CliError, DispatchError, SchemaError, ValueError};
pub use schema::{ArgKind, ArgumentSpec, Arity, CliSchema};
pub use signature::{Param, ParamKind, ParameterDescriptor, Signature, inspect};
pub use types::{Kind, TypeExpr, TypeRule, TypeSyntaxError, resolve};
pub use value::{CliEnum, EnumType, EnumValue, FromValue, Value};

use anyhow::{Context, Result};
use console::style;
use std::io::Write;
use std::path::Path;

use cli::Cli;

/// Run the `sigcli` tool with parsed arguments.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        cli::Command::Run { decl, args } => run_decl(&decl, args, cli.quiet),
        cli::Command::Schema { decl, json } => show_schema(&decl, json),
        cli::Command::Completions { decl, shell } => {
            let cmd = compile(&decl)?;
            let mut out = std::io::stdout().lock();
            cmd.write_completions(shell, &mut out);
            out.flush().context("failed to write completions")
        }
    }
}

/// Load and compile a declaration whose closure hands back its bound arguments.
fn compile(path: &Path) -> Result<Command<BoundArgs>> {
    let decl = Declaration::load(path)?;
    decl.command(|args| args)
        .with_context(|| format!("failed to compile {}", path.display()))
}

/// Parse `args` against the declaration and print the bound values.
///
/// Usage errors print clap's message and exit 2, like any generated command.
fn run_decl(path: &Path, args: Vec<String>, quiet: bool) -> Result<()> {
    let cmd = compile(path)?;
    let argv = std::iter::once(cmd.name().to_string()).chain(args);
    let bound = match cmd.try_run_from(argv) {
        Ok(bound) => bound,
        Err(e) => cmd.usage_error(e).exit(),
    };

    if !quiet {
        println!("{}", serde_json::to_string_pretty(&bound)?);
    }
    Ok(())
}

fn show_schema(path: &Path, json: bool) -> Result<()> {
    let cmd = compile(path)?;
    let schema = cmd.schema();

    if json {
        println!("{}", serde_json::to_string_pretty(&schema_json(cmd.name(), schema))?);
        return Ok(());
    }

    use tabled::settings::{Modify, Style, object::Rows};

    let mut rows: Vec<[String; 6]> = Vec::with_capacity(schema.args().len() + 1);
    rows.push(
        ["ARGUMENT", "KIND", "ARITY", "TYPE", "DEFAULT", "HELP"].map(str::to_string),
    );
    for spec in schema.args() {
        rows.push([
            argument_label(spec),
            kind_label(spec).to_string(),
            spec.arity.to_string(),
            spec.type_rule.to_string(),
            spec.default.as_ref().map(Value::to_string).unwrap_or_default(),
            spec.help
                .as_deref()
                .and_then(|h| h.lines().next())
                .unwrap_or_default()
                .to_string(),
        ]);
    }

    if let Some(summary) = schema.summary() {
        println!("{}: {summary}", style(cmd.name()).bold());
    } else {
        println!("{}", style(cmd.name()).bold());
    }
    println!();

    if schema.args().is_empty() {
        println!("No arguments.");
        return Ok(());
    }

    let table = tabled::Table::from_iter(rows)
        .with(Style::blank())
        .with(
            Modify::new(Rows::first()).with(tabled::settings::Format::content(|s| {
                style(s).bold().to_string()
            })),
        )
        .to_string();
    println!("{table}");

    Ok(())
}

fn argument_label(spec: &ArgumentSpec) -> String {
    if spec.is_positional() {
        format!("<{}>", spec.dest)
    } else {
        format!("--{}", spec.dest)
    }
}

fn kind_label(spec: &ArgumentSpec) -> &'static str {
    match (spec.is_positional(), spec.kind) {
        (true, _) => "positional",
        (false, ArgKind::Flag) => "flag",
        (false, ArgKind::Value) => "option",
    }
}

fn schema_json(name: &str, schema: &CliSchema) -> serde_json::Value {
    let args: Vec<_> = schema
        .args()
        .iter()
        .map(|spec| {
            serde_json::json!({
                "dest": spec.dest,
                "name": spec.name,
                "kind": kind_label(spec),
                "required": spec.required,
                "arity": spec.arity.to_string(),
                "type": spec.type_rule.to_string(),
                "choices": spec.type_rule.choices().map(|ty| ty.variants().to_vec()),
                "default": spec.default,
                "help": spec.help,
            })
        })
        .collect();

    serde_json::json!({
        "name": name,
        "summary": schema.summary(),
        "description": schema.description(),
        "args": args,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> CliSchema {
        let sig = Signature::new()
            .param(Param::new("src"))
            .param(Param::new("dry_run").default(false))
            .param(Param::new("level").default(2));
        help::link(
            CliSchema::from_signature(&sig).unwrap(),
            &DocText::new().with_param("src", "Input file"),
        )
    }

    #[test]
    fn labels() {
        let s = schema();
        let labels: Vec<_> = s.args().iter().map(|a| (argument_label(a), kind_label(a))).collect();
        assert_eq!(
            labels,
            [
                ("<src>".to_string(), "positional"),
                ("--dry-run".to_string(), "flag"),
                ("--level".to_string(), "option"),
            ]
        );
    }

    #[test]
    fn schema_json_shape() {
        let json = schema_json("copy", &schema());
        assert_eq!(json["name"], "copy");
        assert!(json["summary"].is_null());
        assert_eq!(json["args"][0]["help"], "Input file");
        assert_eq!(json["args"][1]["arity"], "0");
        assert_eq!(json["args"][2]["default"], 2);
        assert_eq!(json["args"][2]["type"], "int");
        assert!(json["args"][2]["choices"].is_null());
    }
}
