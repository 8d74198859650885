mod common;

use chrono::{TimeZone, Utc};
use covmerge::class::Class;
use covmerge::history::{overall_historic_coverages, HistoricCoverage};

use common::code_file;

#[test]
fn overall_series_has_one_entry_per_execution_time() {
    let t1 = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();
    let t2 = Utc.with_ymd_and_hms(2024, 3, 11, 8, 0, 0).unwrap();

    let mut class_a = Class::new("A", "Lib.dll");
    class_a.add_file(code_file("/src/a.rs", &[-1, 1, 0]));
    let mut class_b = Class::new("B", "Lib.dll");
    class_b.add_file(code_file("/src/b.rs", &[-1, 1, 1]));

    // Two classes at t1, one at t2.
    let snapshots = vec![
        HistoricCoverage::of_class(&class_a, t1, Some("build-41".into())),
        HistoricCoverage::of_class(&class_b, t1, Some("build-41".into())),
        HistoricCoverage::of_class(&class_b, t2, Some("build-42".into())),
    ];

    let overall = overall_historic_coverages(&snapshots);

    assert_eq!(overall.len(), 2);
    assert_eq!(overall[0].execution_time, t1);
    assert_eq!(overall[0].covered_lines, 3); // 1 (A) + 2 (B)
    assert_eq!(overall[0].coverable_lines, 4);
    assert_eq!(overall[0].tag.as_deref(), Some("build-41"));
    assert_eq!(overall[1].execution_time, t2);
    assert_eq!(overall[1].covered_lines, 2);
}

#[test]
fn class_snapshots_are_append_only_and_survive_merge() {
    let t1 = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();

    let mut class = Class::new("A", "Lib.dll");
    class.add_file(code_file("/src/a.rs", &[-1, 1]));
    let snapshot = HistoricCoverage::of_class(&class, t1, None);
    class.add_historic_coverage(snapshot.clone());

    let mut other = Class::new("A", "Lib.dll");
    other.add_file(code_file("/src/a.rs", &[-1, 1]));
    other.add_historic_coverage(HistoricCoverage::of_class(&other, t1, None));

    class.merge(other);

    // Merging live runs never touches the snapshot list.
    assert_eq!(class.historic_coverages(), vec![snapshot]);
}

#[test]
fn snapshot_captures_class_counters() {
    let t1 = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();

    let mut class = Class::new("A", "Lib.dll");
    class.add_file(code_file("/src/a.rs", &[-1, 2, 0, 1]));

    let snapshot = HistoricCoverage::of_class(&class, t1, Some("nightly".into()));

    assert_eq!(snapshot.covered_lines, 2);
    assert_eq!(snapshot.coverable_lines, 3);
    assert_eq!(snapshot.coverage_quota(), Some(66.6));
    // No branch data on the class → counters default to zero in a snapshot.
    assert_eq!(snapshot.total_branches, 0);
    assert_eq!(snapshot.branch_coverage_quota(), None);
}
