//! Quality metrics attached to methods (cyclomatic complexity, sequence
//! coverage, crap score, ...) and their order-independent merge.

use serde::{Deserialize, Serialize};

/// How a metric value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricType {
    CoveragePercentual,
    CoverageAbsolute,
    CodeQuality,
}

/// Which of two values wins when the same metric appears in several reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricMergeOrder {
    HigherIsBetter,
    LowerIsBetter,
}

/// A single quality measurement. Identity is the name; the value is the only
/// mutable part and is overwritten during merge.
#[derive(Debug, Clone)]
pub struct Metric {
    name: String,
    abbreviation: Option<String>,
    explanation_url: Option<String>,
    metric_type: MetricType,
    merge_order: MetricMergeOrder,
    pub value: Option<f64>,
}

impl Metric {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        abbreviation: Option<String>,
        explanation_url: Option<String>,
        metric_type: MetricType,
        merge_order: MetricMergeOrder,
        value: Option<f64>,
    ) -> Self {
        Self {
            name: name.into(),
            abbreviation,
            explanation_url,
            metric_type,
            merge_order,
            value,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn abbreviation(&self) -> Option<&str> {
        self.abbreviation.as_deref()
    }

    #[must_use]
    pub fn explanation_url(&self) -> Option<&str> {
        self.explanation_url.as_deref()
    }

    #[must_use]
    pub fn metric_type(&self) -> MetricType {
        self.metric_type
    }

    #[must_use]
    pub fn merge_order(&self) -> MetricMergeOrder {
        self.merge_order
    }
}

/// The metrics of one method, keyed by the method's full name and optional
/// line number.
#[derive(Debug, Clone)]
pub struct MethodMetric {
    full_name: String,
    short_name: String,
    line: Option<usize>,
    metrics: Vec<Metric>,
}

impl MethodMetric {
    #[must_use]
    pub fn new(
        full_name: impl Into<String>,
        short_name: impl Into<String>,
        metrics: Vec<Metric>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            short_name: short_name.into(),
            line: None,
            metrics,
        }
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[must_use]
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    #[must_use]
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    pub fn set_line(&mut self, line: Option<usize>) {
        self.line = line;
    }

    #[must_use]
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn add_metric(&mut self, metric: Metric) {
        self.metrics.push(metric);
    }

    /// True when `other` refers to the same method (full name + line).
    #[must_use]
    pub fn same_method(&self, other: &MethodMetric) -> bool {
        self.full_name == other.full_name && self.line == other.line
    }

    /// Merge the metrics of `other` into this instance.
    ///
    /// Values combine according to each metric's merge order (`max` for
    /// `HigherIsBetter`, `min` for `LowerIsBetter`), which makes the merge
    /// order-independent and re-merging identical data a no-op.
    pub fn merge(&mut self, other: &MethodMetric) {
        for metric in &other.metrics {
            match self.metrics.iter_mut().find(|m| m.name() == metric.name()) {
                Some(existing) => match (existing.value, metric.value) {
                    (Some(a), Some(b)) => {
                        existing.value = Some(match metric.merge_order() {
                            MetricMergeOrder::HigherIsBetter => a.max(b),
                            MetricMergeOrder::LowerIsBetter => a.min(b),
                        });
                    }
                    (None, _) => existing.value = metric.value,
                    (Some(_), None) => {}
                },
                None => self.metrics.push(metric.clone()),
            }
        }
    }
}

impl std::fmt::Display for MethodMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.short_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complexity(value: Option<f64>) -> Metric {
        Metric::new(
            "Cyclomatic complexity",
            Some("cc".into()),
            None,
            MetricType::CodeQuality,
            MetricMergeOrder::LowerIsBetter,
            value,
        )
    }

    fn sequence_coverage(value: Option<f64>) -> Metric {
        Metric::new(
            "Sequence coverage",
            Some("seq".into()),
            None,
            MetricType::CoveragePercentual,
            MetricMergeOrder::HigherIsBetter,
            value,
        )
    }

    #[test]
    fn test_merge_higher_is_better_takes_max() {
        let mut sut = MethodMetric::new("Test()", "Test", vec![sequence_coverage(Some(40.0))]);
        sut.merge(&MethodMetric::new(
            "Test()",
            "Test",
            vec![sequence_coverage(Some(60.0))],
        ));
        assert_eq!(sut.metrics()[0].value, Some(60.0));
    }

    #[test]
    fn test_merge_lower_is_better_takes_min() {
        let mut sut = MethodMetric::new("Test()", "Test", vec![complexity(Some(4.0))]);
        sut.merge(&MethodMetric::new(
            "Test()",
            "Test",
            vec![complexity(Some(7.0))],
        ));
        assert_eq!(sut.metrics()[0].value, Some(4.0));
    }

    #[test]
    fn test_merge_adopts_value_when_missing() {
        let mut sut = MethodMetric::new("Test()", "Test", vec![complexity(None)]);
        sut.merge(&MethodMetric::new(
            "Test()",
            "Test",
            vec![complexity(Some(3.0))],
        ));
        assert_eq!(sut.metrics()[0].value, Some(3.0));
    }

    #[test]
    fn test_merge_keeps_value_when_incoming_missing() {
        let mut sut = MethodMetric::new("Test()", "Test", vec![complexity(Some(3.0))]);
        sut.merge(&MethodMetric::new("Test()", "Test", vec![complexity(None)]));
        assert_eq!(sut.metrics()[0].value, Some(3.0));
    }

    #[test]
    fn test_merge_appends_unknown_metric() {
        let mut sut = MethodMetric::new("Test()", "Test", vec![complexity(Some(3.0))]);
        sut.merge(&MethodMetric::new(
            "Test()",
            "Test",
            vec![sequence_coverage(Some(80.0))],
        ));
        assert_eq!(sut.metrics().len(), 2);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut sut = MethodMetric::new("Test()", "Test", vec![complexity(Some(3.0))]);
        let copy = sut.clone();
        sut.merge(&copy);
        sut.merge(&copy);
        assert_eq!(sut.metrics().len(), 1);
        assert_eq!(sut.metrics()[0].value, Some(3.0));
    }

    #[test]
    fn test_same_method_requires_matching_line() {
        let mut a = MethodMetric::new("Test()", "Test", vec![]);
        let b = MethodMetric::new("Test()", "Test", vec![]);
        assert!(a.same_method(&b));
        a.set_line(Some(10));
        assert!(!a.same_method(&b));
    }
}
