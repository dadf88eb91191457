//! Item catalog: base prices and owning job per item kind.

use guildhall_shared::JobClass;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{JobError, JobResult};

/// One sellable item kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Item kind key.
    pub item: String,
    /// Base unit price.
    pub base_price: i64,
    /// Job whose pricing and experience apply, if any.
    #[serde(default)]
    pub job: Option<JobClass>,
}

/// Item kinds by key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    items: HashMap<String, CatalogEntry>,
}

impl Catalog {
    /// Empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and indexes entries.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::InvalidConfig`] for empty keys, non-positive base
    /// prices or duplicate keys.
    pub fn from_entries(entries: &[CatalogEntry]) -> JobResult<Self> {
        let mut items = HashMap::with_capacity(entries.len());
        for entry in entries {
            if entry.item.trim().is_empty() {
                return Err(JobError::InvalidConfig("catalog item with empty key".to_string()));
            }
            if entry.base_price <= 0 {
                return Err(JobError::InvalidConfig(format!(
                    "catalog item {} has non-positive base price {}",
                    entry.item, entry.base_price
                )));
            }
            if items.insert(entry.item.clone(), entry.clone()).is_some() {
                return Err(JobError::InvalidConfig(format!(
                    "catalog item {} listed twice",
                    entry.item
                )));
            }
        }
        Ok(Self { items })
    }

    /// Looks up an item kind.
    #[must_use]
    pub fn get(&self, item: &str) -> Option<&CatalogEntry> {
        self.items.get(item)
    }

    /// Items owned by `job`, sorted by key.
    #[must_use]
    pub fn items_for(&self, job: JobClass) -> Vec<&CatalogEntry> {
        let mut items: Vec<&CatalogEntry> = self
            .items
            .values()
            .filter(|entry| entry.job == Some(job))
            .collect();
        items.sort_by(|a, b| a.item.cmp(&b.item));
        items
    }

    /// Number of item kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
