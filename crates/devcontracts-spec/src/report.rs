use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::tree::Shape;

/// One step in a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Location of a value inside a document, e.g. `contracts["my-service"].ref`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath(Vec<Segment>);

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Key(key.into()));
        Self(segments)
    }

    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Index(index));
        Self(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for FieldPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(|s| Segment::Key(s.into())).collect())
    }
}

fn is_plain_key(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        for (pos, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(key) if is_plain_key(key) => {
                    if pos > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                Segment::Key(key) => write!(f, "[{key:?}]")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn quote_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("'{item}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn quote_options(items: &[&str]) -> String {
    items
        .iter()
        .map(|item| format!("'{item}'"))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// What went wrong at a given field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind")]
pub enum IssueKind {
    #[error("unrecognized key(s) in object: {}", quote_list(.keys))]
    UnrecognizedKey { keys: Vec<String> },
    #[error("invalid value {value}, expected {}", quote_options(.expected))]
    InvalidEnumValue {
        value: String,
        expected: &'static [&'static str],
    },
    #[error(
        "invalid reference {value:?}: expected an absolute URL, or a path starting with '/', './', '../' or a drive letter such as 'C:\\'"
    )]
    InvalidReference { value: String },
    #[error("schema_ref '{schema}' does not name an entry in [schemas]")]
    UnresolvedSchemaRef { schema: String },
    #[error("schema_ref '{schema}' is overridden by the direct schema on the same entry")]
    ShadowedSchemaRef { schema: String },
    #[error("token value must be a string, number, boolean or null, received {received}")]
    InvalidTokenType { received: Shape },
    #[error("required")]
    MissingRequiredField,
    #[error("unsupported version {received}, expected 1")]
    UnsupportedVersion { received: String },
    #[error("expected {expected}, received {received}")]
    InvalidType {
        expected: &'static str,
        received: Shape,
    },
    #[error("'{target}' is not a key in [structure]")]
    DanglingDependency { target: String },
    #[error("resolved token path {path:?} does not point into the contract")]
    UnresolvedTokenPath { path: String },
    #[error("token '{token}' has no resolved entry in the lockfile")]
    MissingResolvedToken { token: String },
}

/// Individual validation issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: FieldPath,
    #[serde(flatten)]
    pub kind: IssueKind,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: FieldPath, kind: IssueKind) -> Self {
        let message = kind.to_string();
        Self {
            field,
            kind,
            message,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every defect found in one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationIssue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push_error(&mut self, field: FieldPath, kind: IssueKind) {
        self.errors.push(ValidationIssue::new(field, kind));
    }

    pub fn push_warning(&mut self, field: FieldPath, kind: IssueKind) {
        self.warnings.push(ValidationIssue::new(field, kind));
    }

    /// True when an error of the given kind was reported at `field`.
    pub fn has_error(&self, field: &FieldPath, pred: impl Fn(&IssueKind) -> bool) -> bool {
        self.errors
            .iter()
            .any(|issue| &issue.field == field && pred(&issue.kind))
    }

    pub(crate) fn escalate_warnings(&mut self) {
        self.errors.append(&mut self.warnings);
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.errors.len())?;
        for issue in &self.errors {
            write!(f, "\n  - {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

/// A value that passed validation, together with the warnings it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Checked<T> {
    pub value: T,
    pub warnings: Vec<ValidationIssue>,
}

impl<T> Checked<T> {
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Runs a checker against the document root and folds its report into a result.
/// A document either validates completely or yields no value at all.
pub(crate) fn finish<T>(
    check: impl FnOnce(&FieldPath, &mut ValidationReport) -> Option<T>,
    warnings_as_errors: bool,
) -> Result<Checked<T>, ValidationReport> {
    let mut report = ValidationReport::default();
    let value = check(&FieldPath::root(), &mut report);
    if warnings_as_errors {
        report.escalate_warnings();
    }
    match value {
        Some(value) if report.is_success() => Ok(Checked {
            value,
            warnings: report.warnings,
        }),
        _ => Err(report),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_path_quotes_non_identifier_keys() {
        let path = FieldPath::root()
            .key("structure")
            .key("src/index.ts")
            .key("depends_on")
            .index(2);
        assert_eq!(path.to_string(), r#"structure["src/index.ts"].depends_on[2]"#);
    }

    #[test]
    fn root_path_has_a_readable_name() {
        assert_eq!(FieldPath::root().to_string(), "(root)");
    }

    #[test]
    fn unrecognized_key_lists_every_key() {
        let kind = IssueKind::UnrecognizedKey {
            keys: vec!["a".into(), "b".into()],
        };
        assert_eq!(kind.to_string(), "unrecognized key(s) in object: 'a', 'b'");
    }

    #[test]
    fn finish_escalates_warnings_when_asked() {
        let result = finish(
            |field, report| {
                report.push_warning(
                    field.key("x"),
                    IssueKind::DanglingDependency {
                        target: "y".into(),
                    },
                );
                Some(())
            },
            true,
        );
        let report = result.unwrap_err();
        assert_eq!(report.errors.len(), 1);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn issues_serialize_with_kind_tag() {
        let issue = ValidationIssue::new(
            FieldPath::root().key("version"),
            IssueKind::UnsupportedVersion {
                received: "2".into(),
            },
        );
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["kind"], "UnsupportedVersion");
        assert_eq!(json["field"], "version");
        assert_eq!(json["received"], "2");
    }
}
