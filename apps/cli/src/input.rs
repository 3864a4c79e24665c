use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use anyhow::{Context, Result};
use console::style;
use sysevent_core::EventRecord;

/// Reads one flat-JSON event per line from `path`, or stdin when absent.
///
/// Blank lines and `#` comments are skipped; malformed lines are reported and skipped.
pub fn read_events(path: Option<&Path>) -> Result<Vec<EventRecord>> {
    let reader: Box<dyn BufRead> = match path {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match EventRecord::from_json(line) {
            Ok(record) => events.push(record),
            Err(e) => eprintln!(
                "{} line {}: {}",
                style("Skipped:").yellow().bold(),
                index + 1,
                e
            ),
        }
    }
    Ok(events)
}
