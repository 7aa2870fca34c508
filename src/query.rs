use std::collections::HashSet;
use std::str::FromStr;

use crate::domain::{AssemblyStatus, OrganismName};
use crate::error::GfetchError;
use crate::manifest::{Manifest, TabularRecord};

pub const DEFAULT_STATUS: &str = "complete gapless_chromosome chromosome";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFilter {
    accepted: Vec<String>,
}

impl StatusFilter {
    pub fn matches(&self, status: &str) -> bool {
        let status = status.to_lowercase();
        self.accepted.iter().any(|accepted| *accepted == status)
    }

    pub fn accepted(&self) -> &[String] {
        &self.accepted
    }
}

impl Default for StatusFilter {
    fn default() -> Self {
        Self {
            accepted: AssemblyStatus::ALL[..3]
                .iter()
                .map(|status| status.as_str().to_string())
                .collect(),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = GfetchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut accepted: Vec<String> = Vec::new();
        for token in value.split_whitespace() {
            let normalized = token.replace('_', " ").to_lowercase();
            if AssemblyStatus::from_field(&normalized).is_none() {
                tracing::warn!(token, "status is not part of the assembly vocabulary");
            }
            if !accepted.contains(&normalized) {
                accepted.push(normalized);
            }
        }
        if accepted.is_empty() {
            return Err(GfetchError::InvalidStatus(
                "at least one status token is required".to_string(),
            ));
        }
        Ok(Self { accepted })
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    pub name: Option<OrganismName>,
    pub status: StatusFilter,
}

impl QueryFilter {
    pub fn new(name: Option<OrganismName>, status: StatusFilter) -> Self {
        Self { name, status }
    }

    pub fn apply<'m>(&self, manifest: &'m Manifest) -> QueryResult<'m> {
        let filtered = manifest
            .records()
            .iter()
            .filter(|record| self.name_matches(record))
            .filter(|record| self.status.matches(&record.status))
            .filter(|record| record.has_data());
        let records = dedup_by_taxonomy(filtered);
        tracing::debug!(
            manifest = manifest.len(),
            matched = records.len(),
            "applied query filter"
        );
        QueryResult { records }
    }

    fn name_matches(&self, record: &TabularRecord) -> bool {
        self.name
            .as_ref()
            .map(|name| name.matches(&record.name))
            .unwrap_or(true)
    }
}

pub fn dedup_by_taxonomy<'m, I>(records: I) -> Vec<&'m TabularRecord>
where
    I: IntoIterator<Item = &'m TabularRecord>,
{
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.taxonomy_id.clone()))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct QueryResult<'m> {
    records: Vec<&'m TabularRecord>,
}

impl<'m> QueryResult<'m> {
    pub fn records(&self) -> &[&'m TabularRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'m TabularRecord> + '_ {
        self.records.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
