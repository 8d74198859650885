//! Point-in-time coverage snapshots and their aggregation into an overall
//! per-execution-time series for trend charts.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::class::Class;
use crate::model::percentage;

/// A timestamped snapshot of a class's (or, aggregated, the whole project's)
/// coverage counters. External collaborators own the on-disk persistence of
/// these snapshots; only the counters matter here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricCoverage {
    pub execution_time: DateTime<Utc>,
    pub tag: Option<String>,
    pub covered_lines: usize,
    pub coverable_lines: usize,
    pub total_lines: usize,
    pub covered_branches: usize,
    pub total_branches: usize,
    pub covered_code_elements: usize,
    pub full_covered_code_elements: usize,
    pub total_code_elements: usize,
}

impl HistoricCoverage {
    /// An empty snapshot, used as the accumulator during aggregation.
    #[must_use]
    pub fn new(execution_time: DateTime<Utc>, tag: Option<String>) -> Self {
        Self {
            execution_time,
            tag,
            covered_lines: 0,
            coverable_lines: 0,
            total_lines: 0,
            covered_branches: 0,
            total_branches: 0,
            covered_code_elements: 0,
            full_covered_code_elements: 0,
            total_code_elements: 0,
        }
    }

    /// Snapshot the current counters of a class.
    #[must_use]
    pub fn of_class(class: &Class, execution_time: DateTime<Utc>, tag: Option<String>) -> Self {
        Self {
            execution_time,
            tag,
            covered_lines: class.covered_lines(),
            coverable_lines: class.coverable_lines(),
            total_lines: class.total_lines().unwrap_or(0),
            covered_branches: class.covered_branches().unwrap_or(0),
            total_branches: class.total_branches().unwrap_or(0),
            covered_code_elements: class.covered_code_elements(),
            full_covered_code_elements: class.full_covered_code_elements(),
            total_code_elements: class.total_code_elements(),
        }
    }

    #[must_use]
    pub fn coverage_quota(&self) -> Option<f64> {
        percentage(self.covered_lines, self.coverable_lines)
    }

    #[must_use]
    pub fn branch_coverage_quota(&self) -> Option<f64> {
        percentage(self.covered_branches, self.total_branches)
    }

    #[must_use]
    pub fn code_element_coverage_quota(&self) -> Option<f64> {
        percentage(self.covered_code_elements, self.total_code_elements)
    }

    #[must_use]
    pub fn full_code_element_coverage_quota(&self) -> Option<f64> {
        percentage(self.full_covered_code_elements, self.total_code_elements)
    }
}

/// Re-aggregate per-class snapshots into one project-wide snapshot per
/// distinct execution time, ordered ascending by time.
///
/// Grouping is by exact timestamp equality, not time-window bucketing; the
/// tag of the first snapshot in a group is assumed representative for the
/// whole group.
#[must_use]
pub fn overall_historic_coverages(snapshots: &[HistoricCoverage]) -> Vec<HistoricCoverage> {
    let mut by_time: BTreeMap<DateTime<Utc>, HistoricCoverage> = BTreeMap::new();

    for snapshot in snapshots {
        let overall = by_time
            .entry(snapshot.execution_time)
            .or_insert_with(|| HistoricCoverage::new(snapshot.execution_time, snapshot.tag.clone()));

        overall.covered_lines += snapshot.covered_lines;
        overall.coverable_lines += snapshot.coverable_lines;
        overall.total_lines += snapshot.total_lines;
        overall.covered_branches += snapshot.covered_branches;
        overall.total_branches += snapshot.total_branches;
        overall.covered_code_elements += snapshot.covered_code_elements;
        overall.full_covered_code_elements += snapshot.full_covered_code_elements;
        overall.total_code_elements += snapshot.total_code_elements;
    }

    by_time.into_values().collect()
}
