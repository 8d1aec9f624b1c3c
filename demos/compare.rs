use std::fs;

use bpmn_diff::logging::{self, Profile};
use bpmn_diff::{compare_bpmn, ComparisonHistory, Error, FileRef};

const HISTORY_FILE: &str = ".bpmn-diff-history.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init(Profile::Development);

    // Read the two input files from the command line arguments
    let mut args = std::env::args().skip(1);
    let (Some(original), Some(revised)) = (args.next(), args.next()) else {
        eprintln!("Usage: compare <original.bpmn> <revised.bpmn>");
        std::process::exit(2);
    };

    let original_xml = fs::read_to_string(&original).map_err(Error::Io)?;
    let revised_xml = fs::read_to_string(&revised).map_err(Error::Io)?;

    // Compare the documents and print the result as JSON
    let diff = compare_bpmn(&original_xml, &revised_xml)?;
    println!("{}", serde_json::to_string_pretty(&diff)?);

    // Remember the pair for next time
    let mut history = ComparisonHistory::load(HISTORY_FILE)?;
    history.record(FileRef::new(original), FileRef::new(revised));
    history.save(HISTORY_FILE)?;

    Ok(())
}
