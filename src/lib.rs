pub mod error;
pub mod bpmn;
pub mod diff;
pub mod history;
pub mod logging;

pub use error::*;
pub use crate::bpmn::{extract, Document, ElementDescriptor, ElementTable};
pub use crate::diff::{compare, compare_with, DiffFilter, DiffOptions, DiffResult, Highlight, ModificationDetail, PropertyChange};
pub use crate::history::{ComparisonHistory, FileRef, HistoryEntry};

/// Compare two BPMN documents given as XML text, using the default options
pub fn compare_bpmn(original: &str, revised: &str) -> Result<DiffResult> {
    compare_bpmn_with(original, revised, &DiffOptions::default())
}

/// Compare two BPMN documents given as XML text.
///
/// Both documents are parsed before anything is extracted, so a malformed document
/// never produces a partial result.
pub fn compare_bpmn_with(original: &str, revised: &str, options: &DiffOptions) -> Result<DiffResult> {
    let original = Document::parse(original).map_err(|source| Error::InvalidXml { side: Side::Original, source })?;
    let revised = Document::parse(revised).map_err(|source| Error::InvalidXml { side: Side::Revised, source })?;
    Ok(compare_with(&extract(&original), &extract(&revised), options))
}
