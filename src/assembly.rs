//! An assembly: a named, concurrently fillable collection of classes with
//! aggregated counts.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::class::Class;
use crate::model::{percentage, sum_optional};

/// One assembly of the analyzed project.
///
/// Classes are appended concurrently while parser threads ingest different
/// input files; duplicates are resolved later by [`Assembly::merge`], not
/// prevented at insert time. The collection is kept sorted by class name so
/// readers always observe a stable order.
#[derive(Debug)]
pub struct Assembly {
    name: String,
    classes: RwLock<Vec<Class>>,
}

impl Assembly {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classes: RwLock::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last path segment of the assembly name (`/` and `\` both separate).
    #[must_use]
    pub fn short_name(&self) -> &str {
        match self.name.rfind(['/', '\\']) {
            Some(index) => &self.name[index + 1..],
            None => &self.name,
        }
    }

    /// Read access to the classes, sorted by name.
    #[must_use]
    pub fn classes(&self) -> RwLockReadGuard<'_, Vec<Class>> {
        self.classes.read()
    }

    /// Write access to the classes, used by the report phase to run file
    /// analysis after all merging is done.
    #[must_use]
    pub fn classes_mut(&self) -> RwLockWriteGuard<'_, Vec<Class>> {
        self.classes.write()
    }

    /// Add a class. Safe to call from multiple parser threads.
    pub fn add_class(&self, class: Class) {
        let mut classes = self.classes.write();
        let index = classes.partition_point(|c| c.name() <= class.name());
        classes.insert(index, class);
    }

    #[must_use]
    pub fn covered_lines(&self) -> usize {
        self.classes.read().iter().map(Class::covered_lines).sum()
    }

    #[must_use]
    pub fn coverable_lines(&self) -> usize {
        self.classes.read().iter().map(Class::coverable_lines).sum()
    }

    #[must_use]
    pub fn total_lines(&self) -> Option<usize> {
        sum_optional(self.classes.read().iter().map(Class::total_lines))
    }

    #[must_use]
    pub fn covered_branches(&self) -> Option<usize> {
        sum_optional(self.classes.read().iter().map(Class::covered_branches))
    }

    #[must_use]
    pub fn total_branches(&self) -> Option<usize> {
        sum_optional(self.classes.read().iter().map(Class::total_branches))
    }

    #[must_use]
    pub fn covered_code_elements(&self) -> usize {
        self.classes
            .read()
            .iter()
            .map(Class::covered_code_elements)
            .sum()
    }

    #[must_use]
    pub fn full_covered_code_elements(&self) -> usize {
        self.classes
            .read()
            .iter()
            .map(Class::full_covered_code_elements)
            .sum()
    }

    #[must_use]
    pub fn total_code_elements(&self) -> usize {
        self.classes
            .read()
            .iter()
            .map(Class::total_code_elements)
            .sum()
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

    /// Merge another parsed report's assembly into this one.
    ///
    /// Classes match by (raw name, assembly name) and merge recursively;
    /// unknown classes are adopted and re-pointed at this assembly. Callers
    /// serialize merges — one per input report — while `add_class` alone may
    /// run concurrently.
    pub fn merge(&self, other: Assembly) {
        let other_classes = other.classes.into_inner();
        let mut classes = self.classes.write();

        for mut class in other_classes {
            match classes.iter().position(|c| c.same_class(&class)) {
                Some(index) => classes[index].merge(class),
                None => {
                    class.set_assembly_name(&self.name);
                    let index = classes.partition_point(|c| c.name() <= class.name());
                    classes.insert(index, class);
                }
            }
        }
    }
}

impl PartialEq for Assembly {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Assembly {}

impl std::fmt::Display for Assembly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
