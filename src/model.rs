//! Small value entities shared across the coverage model: line visit
//! classification, branches, code elements and test method identities.
//! Parsers construct these and attach them to [`crate::file::CodeFile`]s.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Compute a coverage percentage truncated (not rounded) to one decimal
/// place, returning `None` when the denominator is zero.
///
/// Truncation matters: 2 of 3 lines is reported as `66.6`, never `66.7`.
#[must_use]
pub fn percentage(covered: usize, total: usize) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some((1000.0 * covered as f64 / total as f64).trunc() / 10.0)
    }
}

/// Sum optional counts across a child collection.
///
/// `None` children contribute nothing, but the sum itself is `None` only when
/// *every* child lacks the metric — "no branch data available" must stay
/// distinguishable from "zero branches".
pub(crate) fn sum_optional<I>(iter: I) -> Option<usize>
where
    I: IntoIterator<Item = Option<usize>>,
{
    let mut sum = None;
    for item in iter {
        if let Some(value) = item {
            sum = Some(sum.unwrap_or(0) + value);
        }
    }
    sum
}

/// Visit status of a single source line.
///
/// The variants form an ordered scale: merging two reports takes the `max`
/// per line, so a status only ever improves.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum LineVisitStatus {
    #[default]
    NotCoverable,
    NotCovered,
    PartiallyCovered,
    Covered,
}

impl LineVisitStatus {
    /// Classify a raw visit count (`-1` = not coverable, `0` = not visited,
    /// `>0` = visited).
    ///
    /// `PartiallyCovered` cannot be derived from the count alone — it comes
    /// from branch information the parser supplies, which is why the status
    /// is stored alongside the count rather than recomputed after merges.
    #[must_use]
    pub fn classify(visits: i32) -> Self {
        if visits < 0 {
            LineVisitStatus::NotCoverable
        } else if visits == 0 {
            LineVisitStatus::NotCovered
        } else {
            LineVisitStatus::Covered
        }
    }
}

/// Per-line coverage snapshot: the raw visit count plus its classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortLineAnalysis {
    /// `-1` = not coverable, `0` = not visited, `>0` = number of visits.
    pub line_visits: i32,
    pub line_visit_status: LineVisitStatus,
}

impl ShortLineAnalysis {
    #[must_use]
    pub fn new(line_visits: i32, line_visit_status: LineVisitStatus) -> Self {
        Self {
            line_visits,
            line_visit_status,
        }
    }
}

impl std::fmt::Display for ShortLineAnalysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.line_visit_status, self.line_visits)
    }
}

/// One outcome of a conditional decision point.
///
/// Identity is the identifier string; the parser must keep identifiers stable
/// across merged runs, since merging adds visit counts per identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    identifier: String,
    pub visits: u32,
}

impl Branch {
    #[must_use]
    pub fn new(identifier: impl Into<String>, visits: u32) -> Self {
        Self {
            identifier: identifier.into(),
            visits,
        }
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl PartialEq for Branch {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}

impl Eq for Branch {}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.identifier)
    }
}

/// Kind of a code element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodeElementType {
    Property,
    Method,
}

/// A method or property definition, used for method-level coverage.
///
/// Identity is `(full_name, first_line)`; duplicates are silently dropped
/// when added to a file.
#[derive(Debug, Clone)]
pub struct CodeElement {
    full_name: String,
    name: String,
    element_type: CodeElementType,
    first_line: usize,
    last_line: usize,
    coverage_quota: Option<f64>,
}

impl CodeElement {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        element_type: CodeElementType,
        first_line: usize,
        last_line: usize,
        coverage_quota: Option<f64>,
    ) -> Self {
        let name = name.into();
        Self::with_full_name(name.clone(), name, element_type, first_line, last_line, coverage_quota)
    }

    #[must_use]
    pub fn with_full_name(
        full_name: impl Into<String>,
        name: impl Into<String>,
        element_type: CodeElementType,
        first_line: usize,
        last_line: usize,
        coverage_quota: Option<f64>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            name: name.into(),
            element_type,
            first_line,
            last_line,
            coverage_quota: coverage_quota.map(|q| q.clamp(0.0, 100.0)),
        }
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn element_type(&self) -> CodeElementType {
        self.element_type
    }

    #[must_use]
    pub fn first_line(&self) -> usize {
        self.first_line
    }

    #[must_use]
    pub fn last_line(&self) -> usize {
        self.last_line
    }

    #[must_use]
    pub fn coverage_quota(&self) -> Option<f64> {
        self.coverage_quota
    }

    /// Raise the stored quota to `quota` if that is higher (or if no quota
    /// was known yet). A `None` argument leaves the element untouched.
    pub fn apply_maximum_coverage_quota(&mut self, quota: Option<f64>) {
        if let Some(quota) = quota {
            self.coverage_quota = Some(match self.coverage_quota {
                Some(existing) => existing.max(quota),
                None => quota,
            });
        }
    }
}

impl PartialEq for CodeElement {
    fn eq(&self, other: &Self) -> bool {
        self.full_name == other.full_name && self.first_line == other.first_line
    }
}

impl Eq for CodeElement {}

impl std::fmt::Display for CodeElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Identity of one named test, carrying a process-unique id.
///
/// Equality and hashing use the name only: two reports mentioning the same
/// test name merge into one entry even though their ids differ.
#[derive(Debug, Clone)]
pub struct TestMethod {
    name: String,
    short_name: String,
    id: u64,
}

impl TestMethod {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl PartialEq for TestMethod {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TestMethod {}

impl std::hash::Hash for TestMethod {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl std::fmt::Display for TestMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Factory for [`TestMethod`] ids, owned by the ingestion context and handed
/// to parsers as a dependency. Ids increase monotonically and are never
/// reused within one factory.
#[derive(Debug, Default)]
pub struct TestMethodIds {
    counter: AtomicU64,
}

impl TestMethodIds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn create(&self, name: impl Into<String>, short_name: impl Into<String>) -> TestMethod {
        TestMethod {
            name: name.into(),
            short_name: short_name.into(),
            id: self.counter.fetch_add(1, Ordering::Relaxed) + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_truncates() {
        assert_eq!(percentage(2, 3), Some(66.6));
        assert_eq!(percentage(1, 3), Some(33.3));
        assert_eq!(percentage(3, 3), Some(100.0));
        assert_eq!(percentage(0, 0), None);
    }

    #[test]
    fn test_sum_optional_all_absent() {
        assert_eq!(sum_optional([None, None]), None);
    }

    #[test]
    fn test_sum_optional_mixed() {
        assert_eq!(sum_optional([None, Some(0), Some(4)]), Some(4));
    }

    #[test]
    fn test_status_ordering() {
        assert!(LineVisitStatus::NotCoverable < LineVisitStatus::NotCovered);
        assert!(LineVisitStatus::NotCovered < LineVisitStatus::PartiallyCovered);
        assert!(LineVisitStatus::PartiallyCovered < LineVisitStatus::Covered);
    }

    #[test]
    fn test_classify() {
        assert_eq!(LineVisitStatus::classify(-1), LineVisitStatus::NotCoverable);
        assert_eq!(LineVisitStatus::classify(0), LineVisitStatus::NotCovered);
        assert_eq!(LineVisitStatus::classify(7), LineVisitStatus::Covered);
    }

    #[test]
    fn test_branch_identity() {
        assert_eq!(Branch::new("0", 1), Branch::new("0", 99));
        assert_ne!(Branch::new("0", 1), Branch::new("1", 1));
    }

    #[test]
    fn test_code_element_quota_clamped() {
        let element = CodeElement::new("M", CodeElementType::Method, 1, 2, Some(150.0));
        assert_eq!(element.coverage_quota(), Some(100.0));
    }

    #[test]
    fn test_code_element_quota_only_raised() {
        let mut element = CodeElement::new("M", CodeElementType::Method, 1, 2, Some(50.0));
        element.apply_maximum_coverage_quota(Some(25.0));
        assert_eq!(element.coverage_quota(), Some(50.0));
        element.apply_maximum_coverage_quota(Some(75.0));
        assert_eq!(element.coverage_quota(), Some(75.0));
        element.apply_maximum_coverage_quota(None);
        assert_eq!(element.coverage_quota(), Some(75.0));
    }

    #[test]
    fn test_test_method_ids_monotonic() {
        let ids = TestMethodIds::new();
        let a = ids.create("Tests.A", "A");
        let b = ids.create("Tests.B", "B");
        assert!(b.id() > a.id());
    }

    #[test]
    fn test_test_method_equality_ignores_id() {
        let ids = TestMethodIds::new();
        let a = ids.create("Tests.A", "A");
        let b = ids.create("Tests.A", "A");
        assert_ne!(a.id(), b.id());
        assert_eq!(a, b);
    }
}
