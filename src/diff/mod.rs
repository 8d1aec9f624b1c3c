//! This module compares two element tables and classifies every element ID
//! as added, removed, modified, or unchanged.

mod view;

pub use view::{DiffFilter, Highlight};

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bpmn::{ElementDescriptor, ElementTable};

/// One property that differs between the two versions of an element.
/// `None` means the property does not exist in that version, which is not the same as an empty value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyChange {
    pub property: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

/// An element present in both documents with at least one differing property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModificationDetail {
    pub id: String,
    /// The original name, or the revised one if the original has none
    pub name: String,
    /// The element type in the original document
    #[serde(rename = "type")]
    pub element_type: String,
    pub changes: Vec<PropertyChange>,
}

/// The structural difference between two documents.
/// `added_details` and `removed_details` run parallel to `added` and `removed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub modified: Vec<ModificationDetail>,
    pub added_details: Vec<ElementDescriptor>,
    pub removed_details: Vec<ElementDescriptor>,
}

impl DiffResult {
    /// True if the documents have no structural difference
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    /// Number of elements that are added, removed, or modified
    pub fn total_changes(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }
}

/// Settings for the comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOptions {
    /// Property keys starting with any of these prefixes are never compared
    pub ignored_prefixes: Vec<String>,
}

/// Namespace declarations and diagram interchange (layout) keys carry no process semantics
impl Default for DiffOptions {
    fn default() -> Self {
        DiffOptions {
            ignored_prefixes: vec!["xmlns".to_string(), "bpmndi".to_string()],
        }
    }
}

impl DiffOptions {
    /// Also ignore property keys starting with `prefix`
    pub fn ignore_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ignored_prefixes.push(prefix.into());
        self
    }

    pub fn is_ignored(&self, key: &str) -> bool {
        self.ignored_prefixes.iter().any(|prefix| key.starts_with(prefix.as_str()))
    }
}

/// Compare two tables with the default options
pub fn compare(original: &ElementTable, revised: &ElementTable) -> DiffResult {
    compare_with(original, revised, &DiffOptions::default())
}

/// Compare two tables.
///
/// IDs are visited in the order of the original table, followed by the IDs that only
/// exist in the revised table, so `added` and `removed` follow document order.
pub fn compare_with(original: &ElementTable, revised: &ElementTable, options: &DiffOptions) -> DiffResult {
    let mut result = DiffResult::default();

    let all_ids = original
        .ids()
        .chain(revised.ids().filter(|id| !original.contains(id)));

    for id in all_ids {
        match (original.get(id), revised.get(id)) {
            (Some(before), None) => {
                result.removed.push(id.to_string());
                result.removed_details.push(before.clone());
            }
            (None, Some(after)) => {
                result.added.push(id.to_string());
                result.added_details.push(after.clone());
            }
            (Some(before), Some(after)) => {
                if let Some(detail) = reconcile(before, after, options) {
                    result.modified.push(detail);
                }
            }
            (None, None) => {} // Every ID comes from one of the tables
        }
    }

    info!(
        added = result.added.len(),
        removed = result.removed.len(),
        modified = result.modified.len(),
        "compared process elements"
    );
    result
}

/// Compare the property bags of two versions of the same element
fn reconcile(before: &ElementDescriptor, after: &ElementDescriptor, options: &DiffOptions) -> Option<ModificationDetail> {
    let keys = before
        .properties
        .keys()
        .chain(after.properties.keys())
        .collect::<BTreeSet<_>>();

    let changes = keys
        .into_iter()
        .filter(|key| !options.is_ignored(key))
        .filter_map(|key| {
            let old_value = before.properties.get(key);
            let new_value = after.properties.get(key);
            (old_value != new_value).then(|| PropertyChange {
                property: key.clone(),
                old_value: old_value.cloned(),
                new_value: new_value.cloned(),
            })
        })
        .collect::<Vec<_>>();

    if changes.is_empty() {
        return None;
    }

    let name = if before.name.is_empty() { &after.name } else { &before.name };
    Some(ModificationDetail {
        id: before.id.clone(),
        name: name.clone(),
        element_type: before.element_type.clone(),
        changes,
    })
}
