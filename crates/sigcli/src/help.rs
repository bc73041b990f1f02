//! Attaches documentation to a built schema.

use crate::docstring::DocText;
use crate::schema::CliSchema;

/// Attach per-parameter help and the command summary.
///
/// Docs naming a parameter the signature doesn't have are dropped; parameters
/// without docs keep `help` unset.
pub fn link(mut schema: CliSchema, docs: &DocText) -> CliSchema {
    for (name, text) in &docs.params {
        match schema.args_mut().iter_mut().find(|a| &a.name == name) {
            Some(spec) => spec.help = Some(text.clone()),
            None => tracing::debug!(param = %name, "ignoring docs for unknown parameter"),
        }
    }

    if docs.summary.is_some() {
        schema.summary = docs.summary.clone();
    }
    if docs.description.is_some() {
        schema.description = docs.description.clone();
    }
    schema
}
