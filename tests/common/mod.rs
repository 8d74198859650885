// Not every test binary uses every helper.
#![allow(dead_code)]

use std::collections::BTreeMap;

use covmerge::file::CodeFile;
use covmerge::model::{Branch, LineVisitStatus};

/// Build a code file whose statuses are classified straight from the visit
/// counts (index 0 is the unused 1-based sentinel slot).
pub fn code_file(path: &str, coverage: &[i32]) -> CodeFile {
    CodeFile::new(path, coverage.to_vec(), statuses(coverage)).unwrap()
}

/// Same as [`code_file`] but with per-line branch data.
pub fn code_file_with_branches(
    path: &str,
    coverage: &[i32],
    branches: Vec<(usize, Vec<Branch>)>,
) -> CodeFile {
    let branches: BTreeMap<usize, Vec<Branch>> = branches.into_iter().collect();
    CodeFile::with_branches(path, coverage.to_vec(), statuses(coverage), Some(branches)).unwrap()
}

pub fn statuses(coverage: &[i32]) -> Vec<LineVisitStatus> {
    coverage
        .iter()
        .map(|&v| LineVisitStatus::classify(v))
        .collect()
}
