//! Read-only views over a [`DiffResult`] for the diagram panes and the summary panel.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::DiffResult;
use crate::error::Side;

/// How an element is highlighted in a diagram pane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Highlight {
    Added,
    Removed,
    Modified,
}

impl Highlight {
    /// The marker class handed to the diagram renderer
    pub fn marker(&self) -> &'static str {
        match self {
            Highlight::Added => "highlight-added",
            Highlight::Removed => "highlight-removed",
            Highlight::Modified => "highlight-modified",
        }
    }
}

/// Search text and element type selected in the summary panel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffFilter {
    /// Case-insensitive substring of the ID, name, or type; empty matches everything
    pub search: String,
    /// Exact element type, or `None` for all types
    pub element_type: Option<String>,
}

impl DiffFilter {
    fn matches(&self, id: &str, name: &str, element_type: &str) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = needle.is_empty()
            || [id, name, element_type]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
        let matches_type = self.element_type.as_deref().map_or(true, |t| t == element_type);
        matches_search && matches_type
    }
}

impl DiffResult {
    /// The category of an element, or `None` if it is unchanged or unknown
    pub fn highlight_of(&self, id: &str) -> Option<Highlight> {
        if self.added.iter().any(|added| added == id) {
            Some(Highlight::Added)
        } else if self.removed.iter().any(|removed| removed == id) {
            Some(Highlight::Removed)
        } else if self.modified.iter().any(|detail| detail.id == id) {
            Some(Highlight::Modified)
        } else {
            None
        }
    }

    /// Elements to highlight in the pane showing one side.
    /// Removed elements only exist in the original, added ones only in the revised document.
    pub fn highlights(&self, side: Side) -> Vec<(&str, Highlight)> {
        let (ids, highlight) = match side {
            Side::Original => (&self.removed, Highlight::Removed),
            Side::Revised => (&self.added, Highlight::Added),
        };
        ids.iter()
            .map(|id| (id.as_str(), highlight))
            .chain(self.modified.iter().map(|detail| (detail.id.as_str(), Highlight::Modified)))
            .collect()
    }

    /// Sorted, unique element types of everything that changed
    pub fn element_types(&self) -> Vec<&str> {
        self.added_details
            .iter()
            .chain(&self.removed_details)
            .map(|element| element.element_type.as_str())
            .chain(self.modified.iter().map(|detail| detail.element_type.as_str()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// A copy holding only the entries that match the filter
    pub fn filtered(&self, filter: &DiffFilter) -> DiffResult {
        let added_details = self
            .added_details
            .iter()
            .filter(|e| filter.matches(&e.id, &e.name, &e.element_type))
            .cloned()
            .collect::<Vec<_>>();
        let removed_details = self
            .removed_details
            .iter()
            .filter(|e| filter.matches(&e.id, &e.name, &e.element_type))
            .cloned()
            .collect::<Vec<_>>();
        let modified = self
            .modified
            .iter()
            .filter(|d| filter.matches(&d.id, &d.name, &d.element_type))
            .cloned()
            .collect();

        DiffResult {
            added: added_details.iter().map(|e| e.id.clone()).collect(),
            removed: removed_details.iter().map(|e| e.id.clone()).collect(),
            modified,
            added_details,
            removed_details,
        }
    }
}
