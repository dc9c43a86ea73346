use std::collections::HashMap;

use crate::error::AppError;
use crate::traits::SharedCrawler;

/// Canonical spelling of a resource kind: first letter upper, rest lower.
///
/// `"instances"`, `"Instances"` and `"INSTANCES"` all become `"Instances"`.
pub fn canonical_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Case-insensitive lookup from resource kind to [`Crawler`](crate::Crawler).
///
/// Populated once at startup, then shared read-only with the scheduler and
/// the serving layer. Iteration follows registration order.
#[derive(Default)]
pub struct CrawlerRegistry {
    crawlers: Vec<SharedCrawler>,
    index: HashMap<String, usize>,
}

impl CrawlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, crawler: SharedCrawler) -> Result<(), AppError> {
        let name = canonical_name(crawler.resource());
        if self.index.contains_key(&name) {
            return Err(AppError::DuplicateResource(name));
        }
        tracing::debug!(resource = %name, "Registered crawler");
        self.index.insert(name, self.crawlers.len());
        self.crawlers.push(crawler);
        Ok(())
    }

    /// Look up a crawler by resource kind, ignoring case.
    pub fn get(&self, name: &str) -> Option<&SharedCrawler> {
        self.index
            .get(&canonical_name(name))
            .map(|&i| &self.crawlers[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &SharedCrawler> {
        self.crawlers.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.crawlers
            .iter()
            .map(|c| canonical_name(c.resource()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.crawlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crawlers.is_empty()
    }
}
