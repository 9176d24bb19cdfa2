//! Resolved token values as recorded in lockfiles.

use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;

use crate::check::{expect_object, expect_string, optional, reject_unknown_keys, required};
use crate::primitive::TokenPrimitive;
use crate::report::{finish, FieldPath, ValidationReport};
use crate::tree::Node;

/// Token that has been resolved: where it came from plus its value.
#[derive(Debug, Clone, PartialEq, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct ResolvedToken {
    /// JSONPath-like source expression, e.g. `$.tokens.license`.
    pub path: String,
    pub value: Option<TokenPrimitive>,
}

impl ResolvedToken {
    pub fn parse(node: &Node) -> Result<Self, ValidationReport> {
        finish(|field, report| Self::check(node, field, report), false).map(|c| c.value)
    }

    pub(crate) fn check(
        node: &Node,
        field: &FieldPath,
        report: &mut ValidationReport,
    ) -> Option<Self> {
        let members = expect_object(node, field, report)?;
        reject_unknown_keys(members, &["path", "value"], field, report);
        let path = required(members, "path", field, report)
            .and_then(|value| expect_string(value, &field.key("path"), report));
        let value = match optional(members, "value") {
            None => Some(None),
            Some(value) => TokenPrimitive::check(value, &field.key("value"), report).map(Some),
        };
        Some(Self {
            path: path?,
            value: value?,
        })
    }

    pub fn to_node(&self) -> Node {
        let mut map = BTreeMap::new();
        map.insert("path".to_string(), Node::from(self.path.as_str()));
        if let Some(value) = &self.value {
            map.insert("value".to_string(), value.to_node());
        }
        Node::Object(map)
    }
}

tree_serde!(ResolvedToken);

/// What a collection knows about one token path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenState<'a> {
    /// No entry for the path.
    Absent,
    /// Entry present without a value.
    Unset,
    Value(&'a TokenPrimitive),
}

/// Token path to its resolved value.
///
/// Keeps three states apart per key: missing, present but unset (`None`, stored as
/// [`Node::Undefined`] in the tree), and an explicit null (`Some(TokenPrimitive::Null)`).
/// Keys are not interpreted here; the empty string is a valid key.
#[derive(Debug, Clone, Default, PartialEq, JsonSchema)]
#[schemars(transparent)]
pub struct ResolvedTokenCollection(BTreeMap<String, Option<TokenPrimitive>>);

impl ResolvedTokenCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(node: &Node) -> Result<Self, ValidationReport> {
        finish(|field, report| Self::check(node, field, report), false).map(|c| c.value)
    }

    pub(crate) fn check(
        node: &Node,
        field: &FieldPath,
        report: &mut ValidationReport,
    ) -> Option<Self> {
        let members = expect_object(node, field, report)?;
        let mut out = BTreeMap::new();
        let mut ok = true;
        for (key, value) in members {
            if value.is_undefined() {
                out.insert(key.clone(), None);
                continue;
            }
            match TokenPrimitive::check(value, &field.key(key.as_str()), report) {
                Some(primitive) => {
                    out.insert(key.clone(), Some(primitive));
                }
                None => ok = false,
            }
        }
        ok.then_some(Self(out))
    }

    pub fn insert(&mut self, path: impl Into<String>, value: Option<TokenPrimitive>) {
        self.0.insert(path.into(), value);
    }

    pub fn lookup(&self, path: &str) -> TokenState<'_> {
        match self.0.get(path) {
            None => TokenState::Absent,
            Some(None) => TokenState::Unset,
            Some(Some(value)) => TokenState::Value(value),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&TokenPrimitive>)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_node(&self) -> Node {
        Node::Object(
            self.0
                .iter()
                .map(|(key, value)| {
                    let node = value.as_ref().map(TokenPrimitive::to_node).unwrap_or_default();
                    (key.clone(), node)
                })
                .collect(),
        )
    }
}

impl FromIterator<(String, Option<TokenPrimitive>)> for ResolvedTokenCollection {
    fn from_iter<I: IntoIterator<Item = (String, Option<TokenPrimitive>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

tree_serde!(ResolvedTokenCollection);

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenPathError {
    #[error("token path must start with '$'")]
    MissingRoot,
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedChar { offset: usize, found: char },
    #[error("empty member name at offset {offset}")]
    EmptyName { offset: usize },
    #[error("unterminated bracket at offset {offset}")]
    Unterminated { offset: usize },
    #[error("invalid array index {raw:?}")]
    InvalidIndex { raw: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Member(String),
    Index(usize),
}

/// Parsed `$.a.b["c d"][0]` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPath {
    steps: Vec<PathStep>,
}

impl TokenPath {
    pub fn parse(raw: &str) -> Result<Self, TokenPathError> {
        let rest = raw.strip_prefix('$').ok_or(TokenPathError::MissingRoot)?;
        let chars: Vec<(usize, char)> = rest.char_indices().map(|(i, c)| (i + 1, c)).collect();
        let mut steps = Vec::new();
        let mut pos = 0;
        while pos < chars.len() {
            let (offset, c) = chars[pos];
            match c {
                '.' => {
                    let start = pos + 1;
                    let mut end = start;
                    while end < chars.len() && chars[end].1 != '.' && chars[end].1 != '[' {
                        end += 1;
                    }
                    if end == start {
                        return Err(TokenPathError::EmptyName { offset });
                    }
                    let name = chars[start..end].iter().map(|(_, c)| c).collect();
                    steps.push(PathStep::Member(name));
                    pos = end;
                }
                '[' => {
                    let (step, next) = parse_bracket(&chars, pos)?;
                    steps.push(step);
                    pos = next;
                }
                found => return Err(TokenPathError::UnexpectedChar { offset, found }),
            }
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Follows the path through `root`. Undefined members do not resolve.
    pub fn resolve<'a>(&self, root: &'a Node) -> Option<&'a Node> {
        let mut current = root;
        for step in &self.steps {
            current = match (step, current) {
                (PathStep::Member(name), Node::Object(map)) => map.get(name)?,
                (PathStep::Index(index), Node::Array(items)) => items.get(*index)?,
                _ => return None,
            };
        }
        (!current.is_undefined()).then_some(current)
    }

    /// `$.tokens.<name>` for a declared contract token.
    pub fn for_token(name: &str) -> Self {
        Self {
            steps: vec![
                PathStep::Member("tokens".into()),
                PathStep::Member(name.to_string()),
            ],
        }
    }
}

fn parse_bracket(
    chars: &[(usize, char)],
    open: usize,
) -> Result<(PathStep, usize), TokenPathError> {
    let offset = chars[open].0;
    let inner = open + 1;
    match chars.get(inner).map(|(_, c)| *c) {
        Some(quote @ ('"' | '\'')) => {
            let mut name = String::new();
            let mut pos = inner + 1;
            loop {
                match chars.get(pos).map(|(_, c)| *c) {
                    None => return Err(TokenPathError::Unterminated { offset }),
                    Some('\\') => {
                        let escaped = chars
                            .get(pos + 1)
                            .ok_or(TokenPathError::Unterminated { offset })?;
                        name.push(escaped.1);
                        pos += 2;
                    }
                    Some(c) if c == quote => break,
                    Some(c) => {
                        name.push(c);
                        pos += 1;
                    }
                }
            }
            match chars.get(pos + 1) {
                Some((_, ']')) => Ok((PathStep::Member(name), pos + 2)),
                Some(&(offset, found)) => Err(TokenPathError::UnexpectedChar { offset, found }),
                None => Err(TokenPathError::Unterminated { offset }),
            }
        }
        _ => {
            let close = chars[inner..]
                .iter()
                .position(|(_, c)| *c == ']')
                .map(|p| inner + p)
                .ok_or(TokenPathError::Unterminated { offset })?;
            let raw: String = chars[inner..close].iter().map(|(_, c)| c).collect();
            let index = raw
                .parse::<usize>()
                .map_err(|_| TokenPathError::InvalidIndex { raw: raw.clone() })?;
            Ok((PathStep::Index(index), close + 1))
        }
    }
}

impl fmt::Display for TokenPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for step in &self.steps {
            match step {
                PathStep::Member(name)
                    if !name.is_empty()
                        && name
                            .chars()
                            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') =>
                {
                    write!(f, ".{name}")?
                }
                PathStep::Member(name) => write!(f, "[{name:?}]")?,
                PathStep::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for TokenPath {
    type Err = TokenPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::IssueKind;
    use serde_json::json;

    #[test]
    fn resolved_token_value_is_optional() {
        let token = ResolvedToken::parse(&Node::from(json!({"path": "$.tokens.license"}))).unwrap();
        assert_eq!(token.value, None);
        let token =
            ResolvedToken::parse(&Node::from(json!({"path": "$.a", "value": null}))).unwrap();
        assert_eq!(token.value, Some(TokenPrimitive::Null));
    }

    #[test]
    fn resolved_token_rejects_bad_path_and_extras() {
        let report = ResolvedToken::parse(&Node::from(json!({"path": 5, "other": 1}))).unwrap_err();
        assert_eq!(report.errors.len(), 2);
        assert!(report.has_error(&FieldPath::root().key("path"), |kind| {
            matches!(kind, IssueKind::InvalidType { expected: "string", .. })
        }));
        let report = ResolvedToken::parse(&Node::from(json!({"value": "x"}))).unwrap_err();
        assert_eq!(report.errors[0].kind, IssueKind::MissingRequiredField);
    }

    #[test]
    fn collection_keeps_three_states_apart() {
        let node = Node::object([
            ("$.tokens.license", Node::from("MIT")),
            ("$.tokens.owner", Node::Null),
            ("$.tokens.pending", Node::Undefined),
        ]);
        let tokens = ResolvedTokenCollection::parse(&node).unwrap();
        assert_eq!(
            tokens.lookup("$.tokens.license"),
            TokenState::Value(&TokenPrimitive::from("MIT"))
        );
        assert_eq!(
            tokens.lookup("$.tokens.owner"),
            TokenState::Value(&TokenPrimitive::Null)
        );
        assert_eq!(tokens.lookup("$.tokens.pending"), TokenState::Unset);
        assert_eq!(tokens.lookup("$.tokens.missing"), TokenState::Absent);
        assert_eq!(tokens.to_node(), node);
    }

    #[test]
    fn collection_accepts_empty_key() {
        let tokens = ResolvedTokenCollection::parse(&Node::from(json!({"": 1}))).unwrap();
        assert!(tokens.contains(""));
    }

    #[test]
    fn collection_rejects_nested_values() {
        let report =
            ResolvedTokenCollection::parse(&Node::from(json!({"$.a": {"b": 1}, "$.c": [1]})))
                .unwrap_err();
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn token_paths_parse_and_resolve() {
        let doc = Node::from(json!({
            "tokens": {"license": "MIT", "odd key": true},
            "list": [{"name": "first"}]
        }));
        let path = TokenPath::parse("$.tokens.license").unwrap();
        assert_eq!(path.resolve(&doc), Some(&Node::from("MIT")));
        let path = TokenPath::parse(r#"$.tokens["odd key"]"#).unwrap();
        assert_eq!(path.resolve(&doc), Some(&Node::Bool(true)));
        let path = TokenPath::parse("$.list[0].name").unwrap();
        assert_eq!(path.resolve(&doc), Some(&Node::from("first")));
        assert_eq!(TokenPath::parse("$.list[3]").unwrap().resolve(&doc), None);
        assert_eq!(TokenPath::parse("$").unwrap().resolve(&doc), Some(&doc));
    }

    #[test]
    fn malformed_token_paths_are_rejected() {
        assert_eq!(TokenPath::parse("tokens.a"), Err(TokenPathError::MissingRoot));
        assert_eq!(
            TokenPath::parse("$..a"),
            Err(TokenPathError::EmptyName { offset: 1 })
        );
        assert!(matches!(
            TokenPath::parse("$[\"a"),
            Err(TokenPathError::Unterminated { .. })
        ));
        assert!(matches!(
            TokenPath::parse("$[x]"),
            Err(TokenPathError::InvalidIndex { .. })
        ));
        assert!(matches!(
            TokenPath::parse("$a"),
            Err(TokenPathError::UnexpectedChar { found: 'a', .. })
        ));
    }

    #[test]
    fn token_path_display_round_trips() {
        for raw in ["$.tokens.license", r#"$.tokens["odd key"]"#, "$.list[0].name"] {
            assert_eq!(TokenPath::parse(raw).unwrap().to_string(), raw);
        }
        assert_eq!(TokenPath::for_token("x y").to_string(), r#"$.tokens["x y"]"#);
    }
}
