//! Structural filter expressions over nested records.
//!
//! A filter is a single exact-match predicate over a dotted field path:
//!
//! ```text
//! filter  := "(" path ":" value ")"
//! path    := segment ("." segment)*
//! ```
//!
//! Matching is case-insensitive on the value. When a path step lands on a
//! list, every element is searched and any hit matches the whole record,
//! which is what lets `(Tags.Team:infra)` find one tag among many.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::value::{Record, Value};

/// Reasons a filter expression is rejected. Checked in declaration order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid format of filter, must be surrounded by '()'")]
    MissingParentheses,

    #[error("invalid format of filter, only one ':' allowed")]
    ColonCount,

    #[error("invalid format of filter, must not start or end with '.' or ':'")]
    DanglingSeparator,

    #[error("invalid format of filter, must not have '.' adjacent to ':'")]
    DotAdjacentToColon,

    #[error("invalid format of filter, path segments must not be empty")]
    EmptySegment,

    #[error("invalid format of filter, value must not contain ')'")]
    ParenthesisInValue,
}

/// A parsed `(path:value)` filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    path: Vec<String>,
    value: String,
    /// Lowercased `value`, computed once at parse time.
    needle: String,
}

impl Filter {
    pub fn parse(expr: &str) -> Result<Self, FilterError> {
        let body = expr
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .ok_or(FilterError::MissingParentheses)?;

        if body.matches(':').count() != 1 {
            return Err(FilterError::ColonCount);
        }
        if body.starts_with(['.', ':']) || body.ends_with(['.', ':']) {
            return Err(FilterError::DanglingSeparator);
        }
        if body.contains(".:") || body.contains(":.") {
            return Err(FilterError::DotAdjacentToColon);
        }

        let (path, value) = body
            .split_once(':')
            .ok_or(FilterError::ColonCount)?;

        let path: Vec<String> = path.split('.').map(str::to_string).collect();
        if path.iter().any(String::is_empty) {
            return Err(FilterError::EmptySegment);
        }
        if value.contains(')') {
            return Err(FilterError::ParenthesisInValue);
        }

        Ok(Self {
            path,
            needle: value.to_lowercase(),
            value: value.to_string(),
        })
    }

    /// Field path segments, outermost first.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The value to match, exactly as written in the expression.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn matches(&self, record: &Record) -> bool {
        deep_search(record, &self.path, &self.needle)
    }
}

impl FromStr for Filter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Filter::parse(s)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{})", self.path.join("."), self.value)
    }
}

/// Walk `path` through `record` and compare the final field to `needle`.
///
/// `needle` must already be lowercased. Only string leaves can match;
/// any other shape along the way is simply a miss.
fn deep_search(record: &Record, path: &[String], needle: &str) -> bool {
    match path {
        [] => false,
        [field] => match record.get(field) {
            Some(Value::String(s)) => s.to_lowercase() == needle,
            _ => false,
        },
        [head, tail @ ..] => match record.get(head) {
            Some(Value::Map(inner)) => deep_search(inner, tail, needle),
            Some(Value::List(items)) => items.iter().any(|item| match item {
                Value::Map(inner) => deep_search(inner, tail, needle),
                _ => false,
            }),
            _ => false,
        },
    }
}

/// Parse `expr` once and keep the records that match, in their original order.
pub fn apply_filter<'a>(
    expr: &str,
    records: impl IntoIterator<Item = &'a Record>,
) -> Result<Vec<&'a Record>, FilterError> {
    let filter = Filter::parse(expr)?;
    Ok(records.into_iter().filter(|r| filter.matches(r)).collect())
}
