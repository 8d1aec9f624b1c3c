//! This module defines the data structures for the elements of a BPMN 2.0 process
//! and provides the extractor that flattens a parsed document into an identity-keyed table.

mod extract;
mod parse;

pub use extract::extract;
pub use parse::{Descendants, Document, XmlElement, XmlNode};

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// The namespace of the BPMN 2.0 semantic model
pub const BPMN_NAMESPACE: &str = "http://www.omg.org/spec/BPMN/20100524/MODEL";

/// Attribute names mapped to attribute values, sorted by name
pub type Properties = BTreeMap<String, String>;

/// A single element of a process, as seen by the differ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDescriptor {
    /// The document-assigned ID, used to match elements across versions
    pub id: String,
    /// The local tag name, e.g. `userTask` or `sequenceFlow`
    #[serde(rename = "type")]
    pub element_type: String,
    /// The `name` attribute, or empty
    pub name: String,
    /// Literal attributes plus the synthesized extension and flow reference keys
    pub properties: Properties,
}

/// All identifiable elements of one document, keyed by ID.
/// Elements keep the position at which their ID was first seen.
#[derive(Debug, Clone, Default)]
pub struct ElementTable {
    elements: Vec<ElementDescriptor>,
    index: HashMap<String, usize, ahash::RandomState>,
}

impl ElementTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an element, replacing any element with the same ID.
    /// Returns the replaced element, if there was one.
    pub fn insert(&mut self, element: ElementDescriptor) -> Option<ElementDescriptor> {
        match self.index.get(&element.id) {
            Some(&position) => Some(std::mem::replace(&mut self.elements[position], element)),
            None => {
                self.index.insert(element.id.clone(), self.elements.len());
                self.elements.push(element);
                None
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&ElementDescriptor> {
        self.index.get(id).map(|&position| &self.elements[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// IDs in table order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|element| element.id.as_str())
    }

    /// Elements in table order
    pub fn iter(&self) -> impl Iterator<Item = &ElementDescriptor> {
        self.elements.iter()
    }
}

/// Two tables are equal if they hold the same elements, regardless of order
impl PartialEq for ElementTable {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|element| other.get(&element.id) == Some(element))
    }
}

impl Eq for ElementTable {}

impl FromIterator<ElementDescriptor> for ElementTable {
    fn from_iter<I: IntoIterator<Item = ElementDescriptor>>(iter: I) -> Self {
        let mut table = ElementTable::new();
        for element in iter {
            table.insert(element);
        }
        table
    }
}
