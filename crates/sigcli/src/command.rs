//! `Command<T>`: a signature, its docs and a closure, runnable as a process entry point.

use std::ffi::OsString;
use std::io::Write;

use clap_complete::Shell;

use crate::dispatch::{self, BoundArgs, RawValues};
use crate::docstring::DocText;
use crate::error::{CliError, DispatchError, SchemaError};
use crate::help;
use crate::parser;
use crate::schema::CliSchema;
use crate::signature::Signature;

/// A compiled command-line interface for one callable.
///
/// The schema is fixed at construction; every invocation reads from it without
/// mutating anything.
pub struct Command<T> {
    name: String,
    version: Option<String>,
    schema: CliSchema,
    callable: Box<dyn Fn(BoundArgs) -> T>,
}

impl<T> std::fmt::Debug for Command<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl<T> Command<T> {
    /// Compile `signature` into a schema. All author mistakes surface here.
    pub fn new<F>(name: impl Into<String>, signature: &Signature, callable: F) -> Result<Self, SchemaError>
    where
        F: Fn(BoundArgs) -> T + 'static,
    {
        let schema = CliSchema::from_signature(signature)?;
        parser::check_positionals(&schema)?;
        Ok(Self {
            name: name.into(),
            version: None,
            schema,
            callable: Box::new(callable),
        })
    }

    pub fn with_docs(mut self, docs: &DocText) -> Self {
        self.schema = help::link(self.schema, docs);
        self
    }

    /// Parse a raw reST or Google-style doc comment and attach it.
    pub fn with_doc_comment(self, raw: &str) -> Self {
        self.with_docs(&DocText::parse(raw))
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &CliSchema {
        &self.schema
    }

    pub fn clap_command(&self) -> clap::Command {
        parser::build_command(&self.name, self.version.as_deref(), &self.schema)
    }

    /// Coerce already-parsed tokens and invoke the callable.
    pub fn call(&self, raw: &RawValues) -> Result<T, DispatchError> {
        dispatch::dispatch(&self.schema, raw, |args| (self.callable)(args))
    }

    /// Parse `argv` (program name first) and invoke the callable.
    pub fn try_run_from<I, S>(&self, argv: I) -> Result<T, CliError>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString> + Clone,
    {
        let matches = self.clap_command().try_get_matches_from(argv)?;
        let raw = parser::raw_values(&self.schema, &matches);
        Ok(self.call(&raw)?)
    }

    /// Like [`try_run_from`](Self::try_run_from), but prints usage errors and exits.
    ///
    /// Help and version requests exit 0; bad input exits 2.
    pub fn run_from<I, S>(&self, argv: I) -> T
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString> + Clone,
    {
        match self.try_run_from(argv) {
            Ok(value) => value,
            Err(e) => self.usage_error(e).exit(),
        }
    }

    /// Run against the process arguments.
    pub fn run(&self) -> T {
        self.run_from(std::env::args_os())
    }

    /// Render any invocation failure as a clap error carrying this command's usage.
    pub fn usage_error(&self, err: CliError) -> clap::Error {
        match err {
            CliError::Parse(e) => e,
            CliError::Dispatch(e) => parser::usage_error(&mut self.clap_command(), &e),
        }
    }

    pub fn write_completions(&self, shell: Shell, out: &mut dyn Write) {
        let mut cmd = self.clap_command();
        clap_complete::generate(shell, &mut cmd, self.name.clone(), out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::Param;
    use crate::types::TypeExpr;
    use crate::value::Value;
    use clap::error::ErrorKind;

    fn echo() -> Command<Vec<(String, Value)>> {
        Command::new(
            "echo",
            &Signature::new()
                .param(Param::new("name"))
                .param(Param::new("count").default(1))
                .param(Param::new("loud").default(false)),
            BoundArgs::into_vec,
        )
        .unwrap()
    }

    #[test]
    fn runs_callable_with_bound_args() {
        let out = echo()
            .try_run_from(["echo", "ada", "--count", "3", "--loud"])
            .unwrap();
        assert_eq!(
            out,
            vec![
                ("name".to_string(), Value::from("ada")),
                ("count".to_string(), Value::Int(3)),
                ("loud".to_string(), Value::Bool(true)),
            ]
        );
    }

    #[test]
    fn conversion_failure_is_a_dispatch_error() {
        let err = echo()
            .try_run_from(["echo", "ada", "--count", "three"])
            .unwrap_err();
        let CliError::Dispatch(inner) = &err else {
            panic!("expected dispatch error, got {err:?}");
        };
        assert_eq!(inner.dest(), "count");

        let usage = echo().usage_error(err);
        assert_eq!(usage.kind(), ErrorKind::ValueValidation);
        assert_eq!(usage.exit_code(), 2);
    }

    #[test]
    fn help_is_a_parse_outcome() {
        let err = echo().try_run_from(["echo", "--help"]).unwrap_err();
        let CliError::Parse(e) = err else {
            panic!("expected clap error");
        };
        assert_eq!(e.kind(), ErrorKind::DisplayHelp);
        assert_eq!(e.exit_code(), 0);
    }

    #[test]
    fn build_errors_surface_at_construction() {
        let err = Command::new(
            "bad",
            &Signature::new().param(Param::var_positional("args")),
            |_| (),
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedSignature { .. }));

        let err = Command::new(
            "bad",
            &Signature::new()
                .param(Param::new("rest").annotated(TypeExpr::List(None)))
                .param(Param::new("last")),
            |_| (),
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedSignature { .. }));
    }

    #[test]
    fn doc_comment_feeds_help() {
        let cmd = echo().with_doc_comment(
            "Print a greeting.

            :param name: Who to greet
            :param count: How many times",
        );
        let help = cmd.clap_command().render_help().to_string();
        assert!(help.contains("Print a greeting."), "{help}");
        assert!(help.contains("Who to greet"), "{help}");
        assert!(help.contains("How many times"), "{help}");
    }

    #[test]
    fn call_accepts_raw_values_directly() {
        let out = echo().call(&RawValues::new().with("name", ["x"])).unwrap();
        assert_eq!(out[1].1, Value::Int(1));
        assert_eq!(out[2].1, Value::Bool(false));
    }

    #[test]
    fn leading_underscore_names_stay_valid_options() {
        let cmd = Command::new(
            "p",
            &Signature::new().param(Param::new("_private").default(1)),
            BoundArgs::into_vec,
        )
        .unwrap();
        assert_eq!(cmd.try_run_from(["p"]).unwrap()[0].1, Value::Int(1));
        assert_eq!(cmd.try_run_from(["p", "--_private", "3"]).unwrap()[0].1, Value::Int(3));
    }

    #[test]
    fn completions_mention_options() {
        let mut buf = Vec::new();
        echo().write_completions(Shell::Bash, &mut buf);
        let script = String::from_utf8(buf).unwrap();
        assert!(script.contains("--count"), "{script}");
    }
}
