//! Loading of physical source files for line-by-line analysis.

use std::path::Path;

/// Abstraction over reading a source file into lines. The report phase hands
/// an implementation to [`crate::file::CodeFile::analyze`]; tests substitute
/// in-memory readers.
///
/// Failures are reported as plain strings: an unreadable file degrades to a
/// per-file error, never an abort of the whole report.
pub trait FileReader {
    fn load_file(&self, path: &str) -> Result<Vec<String>, String>;
}

/// Reads files from the local file system.
#[derive(Debug, Default)]
pub struct LocalFileReader;

impl FileReader for LocalFileReader {
    fn load_file(&self, path: &str) -> Result<Vec<String>, String> {
        if !Path::new(path).is_file() {
            return Err(format!("File '{path}' does not exist"));
        }

        match std::fs::read_to_string(path) {
            Ok(content) => Ok(content.lines().map(str::to_owned).collect()),
            Err(e) => Err(format!("File '{path}' could not be read: {e}")),
        }
    }
}
