//! The top-level read-only aggregation over all assemblies of one parsed
//! (and merged) report run.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::assembly::Assembly;
use crate::metric::{Metric, MetricType};
use crate::model::{percentage, sum_optional};

/// Non-owning view over the assemblies of a report run. Every numeric
/// property is summed over the assemblies on demand — nothing is stored.
#[derive(Debug)]
pub struct SummaryResult<'a> {
    assemblies: &'a [Assembly],
    used_parser: String,
    supports_branch_coverage: bool,
    source_directories: Vec<String>,
    minimum_time_stamp: Option<DateTime<Utc>>,
    maximum_time_stamp: Option<DateTime<Utc>>,
}

impl<'a> SummaryResult<'a> {
    #[must_use]
    pub fn new(
        assemblies: &'a [Assembly],
        used_parser: impl Into<String>,
        supports_branch_coverage: bool,
        source_directories: Vec<String>,
    ) -> Self {
        Self {
            assemblies,
            used_parser: used_parser.into(),
            supports_branch_coverage,
            source_directories,
            minimum_time_stamp: None,
            maximum_time_stamp: None,
        }
    }

    /// Attach the coverage-date range of the underlying report files.
    #[must_use]
    pub fn with_time_stamps(
        mut self,
        minimum: Option<DateTime<Utc>>,
        maximum: Option<DateTime<Utc>>,
    ) -> Self {
        self.minimum_time_stamp = minimum;
        self.maximum_time_stamp = maximum;
        self
    }

    #[must_use]
    pub fn assemblies(&self) -> &[Assembly] {
        self.assemblies
    }

    #[must_use]
    pub fn used_parser(&self) -> &str {
        &self.used_parser
    }

    #[must_use]
    pub fn supports_branch_coverage(&self) -> bool {
        self.supports_branch_coverage
    }

    #[must_use]
    pub fn source_directories(&self) -> &[String] {
        &self.source_directories
    }

    #[must_use]
    pub fn minimum_time_stamp(&self) -> Option<DateTime<Utc>> {
        self.minimum_time_stamp
    }

    #[must_use]
    pub fn maximum_time_stamp(&self) -> Option<DateTime<Utc>> {
        self.maximum_time_stamp
    }

    #[must_use]
    pub fn covered_lines(&self) -> usize {
        self.assemblies.iter().map(Assembly::covered_lines).sum()
    }

    #[must_use]
    pub fn coverable_lines(&self) -> usize {
        self.assemblies.iter().map(Assembly::coverable_lines).sum()
    }

    /// Physical line count across all analyzed files. Files shared between
    /// classes (partial classes) count once per distinct path.
    #[must_use]
    pub fn total_lines(&self) -> Option<usize> {
        let mut processed_files = HashSet::new();
        let mut result = None;

        for assembly in self.assemblies {
            for class in assembly.classes().iter() {
                for file in class.files() {
                    if let Some(total_lines) = file.total_lines() {
                        if processed_files.insert(file.path().to_owned()) {
                            result = Some(result.unwrap_or(0) + total_lines);
                        }
                    }
                }
            }
        }

        result
    }

    #[must_use]
    pub fn coverage_quota(&self) -> Option<f64> {
        percentage(self.covered_lines(), self.coverable_lines())
    }

    #[must_use]
    pub fn covered_branches(&self) -> Option<usize> {
        sum_optional(self.assemblies.iter().map(Assembly::covered_branches))
    }

    #[must_use]
    pub fn total_branches(&self) -> Option<usize> {
        sum_optional(self.assemblies.iter().map(Assembly::total_branches))
    }

    #[must_use]
    pub fn branch_coverage_quota(&self) -> Option<f64> {
        percentage(
            self.covered_branches().unwrap_or(0),
            self.total_branches().unwrap_or(0),
        )
    }

    #[must_use]
    pub fn covered_code_elements(&self) -> usize {
        self.assemblies
            .iter()
            .map(Assembly::covered_code_elements)
            .sum()
    }

    #[must_use]
    pub fn full_covered_code_elements(&self) -> usize {
        self.assemblies
            .iter()
            .map(Assembly::full_covered_code_elements)
            .sum()
    }

    #[must_use]
    pub fn total_code_elements(&self) -> usize {
        self.assemblies
            .iter()
            .map(Assembly::total_code_elements)
            .sum()
    }

    #[must_use]
    pub fn code_element_coverage_quota(&self) -> Option<f64> {
        percentage(self.covered_code_elements(), self.total_code_elements())
    }

    #[must_use]
    pub fn full_code_element_coverage_quota(&self) -> Option<f64> {
        percentage(self.full_covered_code_elements(), self.total_code_elements())
    }

    /// Absolute-valued method metrics summed by metric name across all files,
    /// in first-seen order. Percentage and quality metrics are not sumable
    /// and are skipped; a metric whose instances all lack a value keeps
    /// `None` rather than becoming zero.
    #[must_use]
    pub fn sumable_metrics(&self) -> Vec<Metric> {
        let mut merged: Vec<Metric> = Vec::new();

        for assembly in self.assemblies {
            for class in assembly.classes().iter() {
                for file in class.files() {
                    for method_metric in file.method_metrics() {
                        for metric in method_metric.metrics() {
                            if metric.metric_type() != MetricType::CoverageAbsolute {
                                continue;
                            }

                            match merged.iter_mut().find(|m| m.name() == metric.name()) {
                                Some(existing) => {
                                    if let Some(value) = metric.value {
                                        existing.value =
                                            Some(existing.value.unwrap_or(0.0) + value);
                                    }
                                }
                                None => merged.push(metric.clone()),
                            }
                        }
                    }
                }
            }
        }

        merged
    }
}
