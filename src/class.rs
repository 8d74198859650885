//! A logical class: the set of source files that define it (a class can span
//! several physical files), aggregated counts, and its historic snapshots.

use parking_lot::Mutex;

use crate::file::CodeFile;
use crate::history::HistoricCoverage;
use crate::model::{percentage, sum_optional};

/// Render a generic-arity name like `` Foo`2 `` as `Foo<T1, T2>`.
/// Names without a trailing backtick-and-digits suffix pass through.
fn display_name(name: &str) -> String {
    let Some(backtick) = name.rfind('`') else {
        return name.to_owned();
    };

    let (prefix, suffix) = (&name[..backtick], &name[backtick + 1..]);
    let Ok(arity) = suffix.parse::<usize>() else {
        return name.to_owned();
    };

    if arity == 1 {
        format!("{prefix}<T>")
    } else {
        let parameters: Vec<String> = (1..=arity).map(|i| format!("T{i}")).collect();
        format!("{prefix}<{}>", parameters.join(", "))
    }
}

/// A class within an assembly.
///
/// Identity is `(raw_name, assembly_name)`. The assembly name is a non-owning
/// back-reference used for display and equality; it is reassigned when the
/// class is absorbed into another assembly during merge.
#[derive(Debug)]
pub struct Class {
    name: String,
    raw_name: String,
    display_name: String,
    assembly_name: String,
    files: Vec<CodeFile>,
    /// Guarded separately: historic-coverage recording can race with class
    /// merge and creation.
    historic_coverages: Mutex<Vec<HistoricCoverage>>,
}

impl Class {
    #[must_use]
    pub fn new(name: impl Into<String>, assembly_name: impl Into<String>) -> Self {
        let name = name.into();
        Self::with_raw_name(name.clone(), name, assembly_name)
    }

    /// Construct a class whose raw (pre-transform) name differs from the
    /// interpreted name, e.g. for nested or compiler-generated classes.
    #[must_use]
    pub fn with_raw_name(
        name: impl Into<String>,
        raw_name: impl Into<String>,
        assembly_name: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            display_name: display_name(&name),
            name,
            raw_name: raw_name.into(),
            assembly_name: assembly_name.into(),
            files: Vec::new(),
            historic_coverages: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Name of the owning assembly.
    #[must_use]
    pub fn assembly_name(&self) -> &str {
        &self.assembly_name
    }

    pub(crate) fn set_assembly_name(&mut self, assembly_name: impl Into<String>) {
        self.assembly_name = assembly_name.into();
    }

    /// The files defining this class, sorted by path.
    #[must_use]
    pub fn files(&self) -> Vec<&CodeFile> {
        let mut files: Vec<&CodeFile> = self.files.iter().collect();
        files.sort_by(|a, b| a.path().cmp(b.path()));
        files
    }

    /// Mutable access to the files, used by the report phase to run
    /// [`CodeFile::analyze`] after all merging is done.
    pub fn files_mut(&mut self) -> &mut [CodeFile] {
        &mut self.files
    }

    /// Snapshot of the recorded historic coverages.
    #[must_use]
    pub fn historic_coverages(&self) -> Vec<HistoricCoverage> {
        self.historic_coverages.lock().clone()
    }

    pub fn add_file(&mut self, file: CodeFile) {
        self.files.push(file);
    }

    /// Append a historic snapshot. Append-only; merge never touches these.
    pub fn add_historic_coverage(&self, historic_coverage: HistoricCoverage) {
        self.historic_coverages.lock().push(historic_coverage);
    }

    #[must_use]
    pub fn covered_lines(&self) -> usize {
        self.files.iter().map(CodeFile::covered_lines).sum()
    }

    #[must_use]
    pub fn coverable_lines(&self) -> usize {
        self.files.iter().map(CodeFile::coverable_lines).sum()
    }

    #[must_use]
    pub fn total_lines(&self) -> Option<usize> {
        sum_optional(self.files.iter().map(CodeFile::total_lines))
    }

    #[must_use]
    pub fn covered_branches(&self) -> Option<usize> {
        sum_optional(self.files.iter().map(CodeFile::covered_branches))
    }

    #[must_use]
    pub fn total_branches(&self) -> Option<usize> {
        sum_optional(self.files.iter().map(CodeFile::total_branches))
    }

    #[must_use]
    pub fn covered_code_elements(&self) -> usize {
        self.files.iter().map(CodeFile::covered_code_elements).sum()
    }

    #[must_use]
    pub fn full_covered_code_elements(&self) -> usize {
        self.files
            .iter()
            .map(CodeFile::full_covered_code_elements)
            .sum()
    }

    #[must_use]
    pub fn total_code_elements(&self) -> usize {
        self.files.iter().map(CodeFile::total_code_elements).sum()
    }

    #[must_use]
    pub fn coverage_quota(&self) -> Option<f64> {
        percentage(self.covered_lines(), self.coverable_lines())
    }

    #[must_use]
    pub fn branch_coverage_quota(&self) -> Option<f64> {
        percentage(
            self.covered_branches().unwrap_or(0),
            self.total_branches().unwrap_or(0),
        )
    }

    #[must_use]
    pub fn code_element_coverage_quota(&self) -> Option<f64> {
        percentage(self.covered_code_elements(), self.total_code_elements())
    }

    #[must_use]
    pub fn full_code_element_coverage_quota(&self) -> Option<f64> {
        percentage(self.full_covered_code_elements(), self.total_code_elements())
    }

    /// True when `other` is the same class: matching raw name in an equally
    /// named assembly.
    #[must_use]
    pub fn same_class(&self, other: &Class) -> bool {
        self.raw_name == other.raw_name && self.assembly_name == other.assembly_name
    }

    /// Merge another report's view of this class. Files match by
    /// [`CodeFile::same_file`] identity and merge recursively; unknown files
    /// are adopted. Historic snapshots are not merged — they come from a
    /// separate recording path.
    pub fn merge(&mut self, other: Class) {
        for file in other.files {
            match self.files.iter().position(|f| f.same_file(&file)) {
                Some(index) => self.files[index].merge(file),
                None => self.files.push(file),
            }
        }
    }
}

impl std::fmt::Display for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
