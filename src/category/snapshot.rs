//! Category snapshot (`data.json`) and membership list (`repositories.json`)

use crate::core::path::StagedFile;
use crate::core::DataResult;
use crate::repository::record::RepositoryRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

/// Repository id (string encoded) → record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorySnapshot {
    records: BTreeMap<String, RepositoryRecord>,
}

impl CategorySnapshot {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Insert or fully replace the record stored under `id`
    ///
    /// Any other record carrying the same full name is dropped, so a
    /// repository that was deleted and recreated under a new id appears once.
    pub fn upsert(&mut self, id: impl Into<String>, record: RepositoryRecord) {
        let id = id.into();
        let key = record.key();
        self.records
            .retain(|other_id, other| *other_id == id || other.key() != key);
        self.records.insert(id, record);
    }

    /// Keep only records for which `keep(id, lowercased full name)` holds;
    /// returns the full names that were dropped
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<String>
    where
        F: FnMut(&str, &str) -> bool,
    {
        let mut dropped = Vec::new();
        self.records.retain(|id, record| {
            let kept = keep(id, record.key().as_str());
            if !kept {
                dropped.push(record.full_name.clone());
            }
            kept
        });
        dropped
    }

    /// Drop every record whose full name is in `removed` (lowercased)
    pub fn purge(&mut self, removed: &HashSet<String>) -> Vec<String> {
        self.retain(|_, key| !removed.contains(key))
    }

    /// Membership list derived from the records
    pub fn membership(&self) -> MembershipList {
        MembershipList::from_names(self.records.values().map(|r| r.full_name.clone()))
    }

    /// Write the snapshot as pretty JSON next to `path`, without replacing it
    pub fn stage(&self, path: &Path) -> DataResult<StagedFile> {
        StagedFile::write(path, &serde_json::to_vec_pretty(self)?)
    }
}

/// Sorted, duplicate-free set of repository full names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MembershipList {
    names: BTreeSet<String>,
}

impl MembershipList {
    pub fn from_names<I: IntoIterator<Item = String>>(names: I) -> Self {
        Self {
            names: names.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Write the list as a pretty JSON array next to `path`, without replacing it
    pub fn stage(&self, path: &Path) -> DataResult<StagedFile> {
        StagedFile::write(path, &serde_json::to_vec_pretty(self)?)
    }
}
