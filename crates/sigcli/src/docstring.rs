//! Documentation comments → summary, description and per-parameter help.
//!
//! Understands reST fields (`:param name: text`) and Google-style `Args:` sections.

use std::collections::BTreeMap;

/// Pre-extracted documentation for one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocText {
    pub summary: Option<String>,
    pub description: Option<String>,
    /// Parameter name → help text
    pub params: BTreeMap<String, String>,
}

const REST_PARAM_FIELDS: &[&str] = &["param", "parameter", "arg", "argument", "key", "keyword"];

const GOOGLE_ARG_SECTIONS: &[&str] = &[
    "Args",
    "Arguments",
    "Parameters",
    "Params",
    "Keyword Args",
    "Keyword Arguments",
    "Other Parameters",
];

const GOOGLE_OTHER_SECTIONS: &[&str] = &[
    "Returns",
    "Return",
    "Yields",
    "Yield",
    "Raises",
    "Exceptions",
    "Example",
    "Examples",
    "Note",
    "Notes",
    "Warning",
    "Warnings",
    "See Also",
    "Todo",
    "References",
    "Attributes",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Description,
    /// Inside a reST field list
    Fields,
    /// Inside a Google argument section; holds the entry indent once seen
    GoogleArgs(Option<usize>),
    GoogleOther,
}

impl DocText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, help: impl Into<String>) -> Self {
        self.params.insert(name.into(), help.into());
        self
    }

    /// Parse a raw documentation comment. Never fails; unknown structure is treated as prose.
    pub fn parse(raw: &str) -> Self {
        let lines = clean_lines(raw);
        let mut description: Vec<&str> = Vec::new();
        let mut params: Vec<(String, Vec<String>)> = Vec::new();
        // index into `params` of the entry continuation lines attach to
        let mut current: Option<usize> = None;
        let mut section = Section::Description;

        for (indent, line) in &lines {
            let (indent, line) = (*indent, line.as_str());

            if indent == 0 && line.starts_with(':') {
                section = Section::Fields;
                current = parse_rest_field(line).map(|(name, text)| {
                    params.push((name, vec![text]));
                    params.len() - 1
                });
                continue;
            }

            if indent == 0
                && let Some(header) = line.strip_suffix(':')
            {
                if GOOGLE_ARG_SECTIONS.contains(&header) {
                    section = Section::GoogleArgs(None);
                    current = None;
                    continue;
                }
                if GOOGLE_OTHER_SECTIONS.contains(&header) {
                    section = Section::GoogleOther;
                    current = None;
                    continue;
                }
            }

            match section {
                Section::Description => description.push(line),
                Section::Fields | Section::GoogleOther => {
                    if let Some(i) = current
                        && indent > 0
                        && !line.is_empty()
                    {
                        params[i].1.push(line.to_string());
                    }
                }
                Section::GoogleArgs(entry_indent) => {
                    if line.is_empty() || indent == 0 {
                        continue;
                    }
                    let entry_indent = entry_indent.unwrap_or(indent);
                    section = Section::GoogleArgs(Some(entry_indent));
                    if indent <= entry_indent {
                        current = parse_google_entry(line).map(|(name, text)| {
                            params.push((name, vec![text]));
                            params.len() - 1
                        });
                    } else if let Some(i) = current {
                        params[i].1.push(line.to_string());
                    }
                }
            }
        }

        let mut paras = paragraphs(&description).into_iter();
        let summary = paras.next().map(|p| p.join(" "));
        let rest: Vec<String> = paras.map(|p| p.join("\n")).collect();
        let description = (!rest.is_empty()).then(|| rest.join("\n\n"));

        Self {
            summary,
            description,
            params: params
                .into_iter()
                .map(|(name, parts)| {
                    let text = parts
                        .into_iter()
                        .filter(|p| !p.is_empty())
                        .collect::<Vec<_>>()
                        .join("\n");
                    (name, text)
                })
                .collect(),
        }
    }
}

/// Dedent the way doc tools do: the first line is stripped on its own, the rest
/// lose their common indentation. Leading and trailing blank lines are dropped.
fn clean_lines(raw: &str) -> Vec<(usize, String)> {
    let mut raw_lines = raw.lines();
    let first = raw_lines.next().map(str::trim).unwrap_or_default();
    let rest: Vec<&str> = raw_lines.collect();

    let common = rest
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent_of(l))
        .min()
        .unwrap_or(0);

    let mut lines: Vec<(usize, String)> = std::iter::once((0, first.to_string()))
        .chain(rest.iter().map(|l| {
            if l.trim().is_empty() {
                (0, String::new())
            } else {
                (indent_of(l) - common, l.trim().to_string())
            }
        }))
        .collect();

    while lines.first().is_some_and(|(_, l)| l.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|(_, l)| l.is_empty()) {
        lines.pop();
    }
    lines
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn paragraphs<'a>(lines: &[&'a str]) -> Vec<Vec<&'a str>> {
    lines
        .split(|l| l.is_empty())
        .filter(|p| !p.is_empty())
        .map(|p| p.to_vec())
        .collect()
}

/// `:param name: text` / `:param int name: text` → `(name, text)`.
fn parse_rest_field(line: &str) -> Option<(String, String)> {
    let (field, text) = line.strip_prefix(':')?.split_once(':')?;
    let mut words = field.split_whitespace();
    let keyword = words.next()?;
    let name = words.last()?;
    REST_PARAM_FIELDS
        .contains(&keyword)
        .then(|| (name.to_string(), text.trim().to_string()))
}

/// `name (type): text` / `name: text` → `(name, text)`.
fn parse_google_entry(line: &str) -> Option<(String, String)> {
    let (head, text) = line.split_once(':')?;
    let name = head.split('(').next()?.trim().trim_start_matches('*');
    (!name.is_empty() && !name.contains(char::is_whitespace))
        .then(|| (name.to_string(), text.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const REST: &str = "
        A small function to test that help is generated correctly

        :param required: A required parameter
        :param required_str: A required str parameter
        :param optional: An optional parameter
        :return:
        ";

    const GOOGLE: &str = "
        A small function to test that help is generated correctly

        Args:
            required (str): A required parameter
            optional (str): An optional parameter
        ";

    #[test]
    fn parses_rest_params() {
        let doc = DocText::parse(REST);
        assert_eq!(
            doc.summary.as_deref(),
            Some("A small function to test that help is generated correctly")
        );
        assert!(doc.description.is_none());
        assert_eq!(doc.params.len(), 3);
        assert_eq!(doc.params["required_str"], "A required str parameter");
    }

    #[test]
    fn parses_google_args() {
        let doc = DocText::parse(GOOGLE);
        assert_eq!(
            doc.summary.as_deref(),
            Some("A small function to test that help is generated correctly")
        );
        assert_eq!(doc.params["required"], "A required parameter");
        assert_eq!(doc.params["optional"], "An optional parameter");
    }

    #[test]
    fn both_styles_agree() {
        let rest = DocText::parse(REST);
        let google = DocText::parse(GOOGLE);
        assert_eq!(rest.summary, google.summary);
        assert_eq!(rest.params["optional"], google.params["optional"]);
    }

    #[test]
    fn summary_is_first_paragraph_rest_is_description() {
        let doc = DocText::parse(
            "Copy files
            between directories.

            Existing files are kept
            unless forced.

            Second paragraph.",
        );
        assert_eq!(doc.summary.as_deref(), Some("Copy files between directories."));
        assert_eq!(
            doc.description.as_deref(),
            Some("Existing files are kept\nunless forced.\n\nSecond paragraph.")
        );
    }

    #[test]
    fn continuation_lines_are_kept() {
        let doc = DocText::parse(
            "
            Summary.

            Args:
                depth: How deep to go,
                    counted from the root.
                name: Label.

            Returns:
                nothing: not a parameter
            ",
        );
        assert_eq!(doc.params["depth"], "How deep to go,\ncounted from the root.");
        assert_eq!(doc.params["name"], "Label.");
        assert!(!doc.params.contains_key("nothing"));
    }

    #[test]
    fn rest_typed_fields_and_non_param_fields() {
        let doc = DocText::parse(
            ":param int count: How many
                times to repeat
            :type count: int
            :raises ValueError: never",
        );
        assert_eq!(doc.params.len(), 1);
        assert_eq!(doc.params["count"], "How many\ntimes to repeat");
        assert!(doc.summary.is_none());
    }

    #[test]
    fn empty_doc() {
        assert_eq!(DocText::parse(""), DocText::default());
        assert_eq!(DocText::parse("   \n\n  "), DocText::default());
    }
}
