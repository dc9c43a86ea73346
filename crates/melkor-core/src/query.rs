use serde::Serialize;

use crate::error::AppError;
use crate::filter::Filter;
use crate::snapshot::Snapshot;
use crate::value::Record;

/// Result of a listing: bare identifiers, or full records when expanded.
///
/// Serializes as a plain JSON array; an empty result is `[]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Projection<'a> {
    Identifiers(Vec<&'a str>),
    Expanded(Vec<&'a Record>),
}

impl Projection<'_> {
    pub fn len(&self) -> usize {
        match self {
            Projection::Identifiers(ids) => ids.len(),
            Projection::Expanded(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Project records to identifiers (`expand == false`) or keep them whole.
///
/// Records without a string identifier have nothing to show in the
/// identifier projection and are left out of it.
pub fn project<'a>(
    records: Vec<&'a Record>,
    expand: bool,
    identifier_field: &str,
) -> Projection<'a> {
    if expand {
        return Projection::Expanded(records);
    }
    Projection::Identifiers(
        records
            .into_iter()
            .filter_map(|r| r.get(identifier_field).and_then(|v| v.as_str()))
            .collect(),
    )
}

/// Keep the first `n` items; `0` means unlimited.
pub fn limit<T>(mut items: Vec<T>, n: usize) -> Vec<T> {
    if n > 0 {
        items.truncate(n);
    }
    items
}

/// Parse a `_limit` parameter. Absent or empty means unlimited.
pub fn parse_limit(raw: Option<&str>) -> Result<usize, AppError> {
    match raw {
        None | Some("") => Ok(0),
        Some(s) => s
            .trim()
            .parse()
            .map_err(|_| AppError::LimitParse(s.to_string())),
    }
}

/// A parsed listing request: optional filter, projection mode, limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: Option<Filter>,
    pub expand: bool,
    pub limit: usize,
}

impl ListQuery {
    /// Build a query from raw `_limit`, `_expand` and `_filter` parameters.
    ///
    /// Only the exact string `"true"` turns expansion on.
    pub fn from_params(
        limit: Option<&str>,
        expand: Option<&str>,
        filter: Option<&str>,
    ) -> Result<Self, AppError> {
        let limit = parse_limit(limit)?;
        let filter = match filter {
            None | Some("") => None,
            Some(expr) => Some(Filter::parse(expr)?),
        };
        Ok(Self {
            filter,
            expand: expand == Some("true"),
            limit,
        })
    }

    /// Filter, then limit, then project.
    pub fn run<'a>(&self, snapshot: &'a Snapshot) -> Projection<'a> {
        let matched: Vec<&Record> = match &self.filter {
            Some(filter) => snapshot
                .records()
                .iter()
                .filter(|r| filter.matches(r))
                .collect(),
            None => snapshot.records().iter().collect(),
        };
        let matched = limit(matched, self.limit);
        project(matched, self.expand, snapshot.identifier_field())
    }
}
