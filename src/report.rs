//! Report output and history-list maintenance.

use std::fs;
use std::path::Path;

use log::info;
use serde::Serialize;

use crate::{Error, Result};

/// Write a report as JSON to `path`.
pub fn write_report<T: Serialize>(report: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string(report)?;
    fs::write(path, json)?;
    Ok(())
}

/// Record a newly written report file in a history list.
///
/// The list file holds a JSON array of report file names, newest first.
/// The report's file name is inserted if absent and the list is re-sorted
/// descending, so lexicographically ordered names (e.g. timestamped ones)
/// rotate naturally. Returns the updated list.
pub fn update_history(list_file: &Path, report_file: &Path) -> Result<Vec<String>> {
    let name = report_file
        .file_name()
        .ok_or_else(|| Error::invalid_input("report path has no file name"))?
        .to_string_lossy()
        .to_string();

    let mut names: Vec<String> = if list_file.exists() {
        serde_json::from_str(&fs::read_to_string(list_file)?)?
    } else {
        Vec::new()
    };
    if !names.contains(&name) {
        names.push(name);
    }
    names.sort();
    names.reverse();

    info!("writing {}...", list_file.display());
    fs::write(list_file, serde_json::to_string(&names)?)?;
    Ok(names)
}
