//! A single physical source file with its raw coverage vectors. This is the
//! mutable, mergeable unit of the model: the line-level merge algorithm and
//! the line-by-line read projection (`analyze`) live here.

use std::collections::{BTreeMap, HashMap};

use crate::error::{CovmergeError, Result};
use crate::filereader::FileReader;
use crate::metric::MethodMetric;
use crate::model::{percentage, Branch, CodeElement, LineVisitStatus, ShortLineAnalysis, TestMethod};

/// Per-test-method coverage vectors, parallel to the file's own vectors.
#[derive(Debug, Clone)]
pub struct CoverageByTestMethod {
    coverage: Vec<i32>,
    line_visit_status: Vec<LineVisitStatus>,
}

impl CoverageByTestMethod {
    pub fn new(coverage: Vec<i32>, line_visit_status: Vec<LineVisitStatus>) -> Result<Self> {
        if coverage.len() != line_visit_status.len() {
            return Err(CovmergeError::CoverageLengthMismatch {
                line_coverage: coverage.len(),
                line_visit_status: line_visit_status.len(),
            });
        }

        Ok(Self {
            coverage,
            line_visit_status,
        })
    }

    #[must_use]
    pub fn coverage(&self) -> &[i32] {
        &self.coverage
    }

    #[must_use]
    pub fn line_visit_status(&self) -> &[LineVisitStatus] {
        &self.line_visit_status
    }
}

/// Analysis of one physical source line, produced by [`CodeFile::analyze`].
#[derive(Debug, Clone)]
pub struct LineAnalysis {
    pub line_visits: i32,
    pub line_visit_status: LineVisitStatus,
    pub line_number: usize,
    pub line_content: String,
    pub coverage_by_test_method: HashMap<TestMethod, ShortLineAnalysis>,
    pub covered_branches: Option<usize>,
    pub total_branches: Option<usize>,
}

/// The result of analyzing one source file: either a list of per-line
/// analyses, or (on read failure) an error string plus empty line contents.
#[derive(Debug)]
pub struct FileAnalysis {
    path: String,
    error: Option<String>,
    lines: Vec<LineAnalysis>,
}

impl FileAnalysis {
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn lines(&self) -> &[LineAnalysis] {
        &self.lines
    }
}

/// Extract the base filename, recognising both `/` and `\` separators so
/// reports produced on different platforms still match up.
fn file_name(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(index) => &path[index + 1..],
        None => path,
    }
}

/// Coverage data of one source file.
///
/// `line_coverage` is indexed by 1-based line number (index 0 is unused);
/// each value is `-1` (not coverable), `0` (not visited) or a visit count.
/// `line_visit_status` is a parallel array of equal length, an invariant
/// that holds through construction and every merge.
#[derive(Debug, Clone)]
pub struct CodeFile {
    path: String,
    line_coverage: Vec<i32>,
    line_visit_status: Vec<LineVisitStatus>,
    /// `None` when the source format carries no branch data at all, which is
    /// distinct from "zero branches".
    branches: Option<BTreeMap<usize, Vec<Branch>>>,
    coverage_by_test_method: HashMap<TestMethod, CoverageByTestMethod>,
    method_metrics: Vec<MethodMetric>,
    code_elements: Vec<CodeElement>,
    total_lines: Option<usize>,
}

impl CodeFile {
    pub fn new(
        path: impl Into<String>,
        line_coverage: Vec<i32>,
        line_visit_status: Vec<LineVisitStatus>,
    ) -> Result<Self> {
        Self::with_branches(path, line_coverage, line_visit_status, None)
    }

    pub fn with_branches(
        path: impl Into<String>,
        line_coverage: Vec<i32>,
        line_visit_status: Vec<LineVisitStatus>,
        branches: Option<BTreeMap<usize, Vec<Branch>>>,
    ) -> Result<Self> {
        if line_coverage.len() != line_visit_status.len() {
            return Err(CovmergeError::CoverageLengthMismatch {
                line_coverage: line_coverage.len(),
                line_visit_status: line_visit_status.len(),
            });
        }

        Ok(Self {
            path: path.into(),
            line_coverage,
            line_visit_status,
            branches,
            coverage_by_test_method: HashMap::new(),
            method_metrics: Vec::new(),
            code_elements: Vec::new(),
            total_lines: None,
        })
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn line_coverage(&self) -> &[i32] {
        &self.line_coverage
    }

    #[must_use]
    pub fn line_visit_status(&self) -> &[LineVisitStatus] {
        &self.line_visit_status
    }

    #[must_use]
    pub fn branches_by_line(&self) -> Option<&BTreeMap<usize, Vec<Branch>>> {
        self.branches.as_ref()
    }

    pub fn test_methods(&self) -> impl Iterator<Item = &TestMethod> {
        self.coverage_by_test_method.keys()
    }

    #[must_use]
    pub fn coverage_by_test_method(&self) -> &HashMap<TestMethod, CoverageByTestMethod> {
        &self.coverage_by_test_method
    }

    #[must_use]
    pub fn method_metrics(&self) -> &[MethodMetric] {
        &self.method_metrics
    }

    #[must_use]
    pub fn code_elements(&self) -> &[CodeElement] {
        &self.code_elements
    }

    /// Number of physical lines, known only after a successful `analyze`.
    #[must_use]
    pub fn total_lines(&self) -> Option<usize> {
        self.total_lines
    }

    #[must_use]
    pub fn covered_lines(&self) -> usize {
        self.line_coverage.iter().filter(|&&v| v > 0).count()
    }

    #[must_use]
    pub fn coverable_lines(&self) -> usize {
        self.line_coverage.iter().filter(|&&v| v >= 0).count()
    }

    #[must_use]
    pub fn covered_branches(&self) -> Option<usize> {
        self.branches.as_ref().map(|branches| {
            branches
                .values()
                .map(|line| line.iter().filter(|b| b.visits > 0).count())
                .sum()
        })
    }

    #[must_use]
    pub fn total_branches(&self) -> Option<usize> {
        self.branches
            .as_ref()
            .map(|branches| branches.values().map(Vec::len).sum())
    }

    /// Code elements with at least one visited line in their range.
    #[must_use]
    pub fn covered_code_elements(&self) -> usize {
        self.code_elements
            .iter()
            .filter(|e| self.element_lines(e).any(|&v| v > 0))
            .count()
    }

    /// Code elements where every line in their range was visited.
    #[must_use]
    pub fn full_covered_code_elements(&self) -> usize {
        self.code_elements
            .iter()
            .filter(|e| self.element_lines(e).all(|&v| v > 0))
            .count()
    }

    #[must_use]
    pub fn total_code_elements(&self) -> usize {
        self.code_elements.len()
    }

    #[must_use]
    pub fn coverage_quota(&self) -> Option<f64> {
        percentage(self.covered_lines(), self.coverable_lines())
    }

    fn element_lines<'a>(&'a self, element: &CodeElement) -> impl Iterator<Item = &'a i32> + 'a {
        let span = element
            .last_line()
            .checked_sub(element.first_line())
            .map_or(0, |d| d + 1);
        self.line_coverage
            .iter()
            .skip(element.first_line())
            .take(span)
    }

    /// Coverage quota restricted to the lines `first_line..=last_line`, or
    /// `None` when the range is invalid or contains nothing coverable.
    #[must_use]
    pub fn coverage_quota_in_range(&self, first_line: usize, last_line: usize) -> Option<f64> {
        if first_line >= self.line_visit_status.len()
            || last_line >= self.line_visit_status.len()
            || first_line > last_line
        {
            return None;
        }

        let mut coverable = 0;
        let mut covered = 0;

        for status in &self.line_visit_status[first_line..=last_line] {
            if *status != LineVisitStatus::NotCoverable {
                coverable += 1;
            }

            if *status > LineVisitStatus::NotCovered {
                covered += 1;
            }
        }

        percentage(covered, coverable)
    }

    /// True when `other` refers to the same source file. Comparison is by
    /// case-insensitive base filename, so the same file reported under
    /// different directory prefixes (or path separators) still merges.
    #[must_use]
    pub fn same_file(&self, other: &CodeFile) -> bool {
        file_name(&self.path).eq_ignore_ascii_case(file_name(&other.path))
    }

    /// Record per-test-method coverage, merging with any existing vectors for
    /// a test method of the same name.
    pub fn add_coverage_by_test_method(
        &mut self,
        test_method: TestMethod,
        coverage: CoverageByTestMethod,
    ) {
        use std::collections::hash_map::Entry;

        match self.coverage_by_test_method.entry(test_method) {
            Entry::Occupied(mut existing) => {
                merge_coverage_by_test_method(existing.get_mut(), coverage);
            }
            Entry::Vacant(slot) => {
                slot.insert(coverage);
            }
        }
    }

    /// Add a method metric. A metric for the same method (full name + line)
    /// is silently dropped; merging of values happens via [`CodeFile::merge`].
    pub fn add_method_metric(&mut self, metric: MethodMetric) {
        if !self.method_metrics.iter().any(|m| m.same_method(&metric)) {
            self.method_metrics.push(metric);
        }
    }

    /// Add a code element, dropping duplicates by (name, first line) identity.
    pub fn add_code_element(&mut self, element: CodeElement) {
        if !self.code_elements.contains(&element) {
            self.code_elements.push(element);
        }
    }

    /// Merge another report's data for the same source file into this one.
    ///
    /// Arrays grow to the longer report and never shrink. Per line, a `-1`
    /// (not coverable) slot adopts the other report's value, while positive
    /// visit counts accumulate additively; a line only stays "not coverable"
    /// if every merged source says so. Statuses take the per-line `max`.
    /// Branch visits accumulate by branch identifier.
    pub fn merge(&mut self, other: CodeFile) {
        grow(&mut self.line_coverage, other.line_coverage.len(), -1);
        grow(
            &mut self.line_visit_status,
            other.line_visit_status.len(),
            LineVisitStatus::NotCoverable,
        );

        if let Some(other_branches) = other.branches {
            let branches = self.branches.get_or_insert_with(BTreeMap::new);

            for (line, incoming) in other_branches {
                let existing = branches.entry(line).or_default();
                if existing.is_empty() {
                    *existing = incoming;
                    continue;
                }

                for branch in incoming {
                    match existing.iter().position(|b| *b == branch) {
                        Some(index) => existing[index].visits += branch.visits,
                        None => existing.push(branch),
                    }
                }
            }
        }

        for (i, &visits) in other.line_coverage.iter().enumerate() {
            if self.line_coverage[i] < 0 {
                self.line_coverage[i] = visits;
            } else if visits > 0 {
                self.line_coverage[i] += visits;
            }
        }

        for (i, &status) in other.line_visit_status.iter().enumerate() {
            self.line_visit_status[i] = self.line_visit_status[i].max(status);

            // A line partially covered in both reports may have all of its
            // branches visited once the branch visits are combined.
            if self.line_visit_status[i] == LineVisitStatus::PartiallyCovered {
                if let Some(branches) = self.branches.as_ref().and_then(|b| b.get(&i)) {
                    if branches.iter().all(|b| b.visits > 0) {
                        self.line_visit_status[i] = LineVisitStatus::Covered;
                    }
                }
            }
        }

        for (test_method, coverage) in other.coverage_by_test_method {
            self.add_coverage_by_test_method(test_method, coverage);
        }

        for metric in other.method_metrics {
            match self.method_metrics.iter().position(|m| m.same_method(&metric)) {
                Some(index) => self.method_metrics[index].merge(&metric),
                None => self.method_metrics.push(metric),
            }
        }

        for element in other.code_elements {
            self.add_code_element(element);
        }

        for i in 0..self.code_elements.len() {
            let quota = self.coverage_quota_in_range(
                self.code_elements[i].first_line(),
                self.code_elements[i].last_line(),
            );
            self.code_elements[i].apply_maximum_coverage_quota(quota);
        }

        if self.total_lines.is_none() {
            self.total_lines = other.total_lines;
        }
    }

    /// Read the physical source file and project coverage onto its lines.
    ///
    /// Lines beyond the coverage arrays are treated as not coverable. A
    /// missing or unreadable file yields a [`FileAnalysis`] carrying the
    /// error string and one empty-content line per coverage slot; report
    /// generation continues for all other files.
    pub fn analyze(&mut self, reader: &dyn FileReader) -> FileAnalysis {
        let (lines, error) = match reader.load_file(&self.path) {
            Ok(lines) => (lines, None),
            Err(error) => {
                tracing::error!("{error}");
                (vec![String::new(); self.line_coverage.len()], Some(error))
            }
        };

        self.total_lines = Some(lines.len());

        let mut result = FileAnalysis {
            path: self.path.clone(),
            error,
            lines: Vec::with_capacity(lines.len()),
        };

        for (index, line) in lines.iter().enumerate() {
            let line_number = index + 1;

            let visits = self
                .line_coverage
                .get(line_number)
                .copied()
                .unwrap_or(-1);
            let status = self
                .line_visit_status
                .get(line_number)
                .copied()
                .unwrap_or(LineVisitStatus::NotCoverable);

            let coverage_by_test_method = self
                .coverage_by_test_method
                .iter()
                .map(|(test_method, coverage)| {
                    let analysis = match coverage.coverage.get(line_number) {
                        Some(&visits) => ShortLineAnalysis::new(
                            visits,
                            coverage.line_visit_status[line_number],
                        ),
                        None => ShortLineAnalysis::new(-1, LineVisitStatus::NotCoverable),
                    };
                    (test_method.clone(), analysis)
                })
                .collect();

            let branches_of_line = self.branches.as_ref().and_then(|b| b.get(&line_number));

            result.lines.push(LineAnalysis {
                line_visits: visits,
                line_visit_status: status,
                line_number,
                line_content: line.trim_end().to_owned(),
                coverage_by_test_method,
                covered_branches: branches_of_line
                    .map(|branches| branches.iter().filter(|b| b.visits > 0).count()),
                total_branches: branches_of_line.map(Vec::len),
            });
        }

        result
    }
}

impl std::fmt::Display for CodeFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}

fn grow<T: Copy>(vec: &mut Vec<T>, len: usize, fill: T) {
    if len > vec.len() {
        vec.resize(len, fill);
    }
}

/// Apply the array-growth and count/status combination rules of
/// [`CodeFile::merge`] to a pair of per-test-method vectors.
fn merge_coverage_by_test_method(
    existing: &mut CoverageByTestMethod,
    incoming: CoverageByTestMethod,
) {
    grow(&mut existing.coverage, incoming.coverage.len(), -1);
    grow(
        &mut existing.line_visit_status,
        incoming.line_visit_status.len(),
        LineVisitStatus::NotCoverable,
    );

    for (i, &visits) in incoming.coverage.iter().enumerate() {
        if existing.coverage[i] < 0 {
            existing.coverage[i] = visits;
        } else if visits > 0 {
            existing.coverage[i] += visits;
        }
    }

    for (i, &status) in incoming.line_visit_status.iter().enumerate() {
        existing.line_visit_status[i] = existing.line_visit_status[i].max(status);
    }
}
