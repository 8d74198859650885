mod common;

use std::io::Write;

use covmerge::file::CoverageByTestMethod;
use covmerge::filereader::{FileReader, LocalFileReader};
use covmerge::model::{LineVisitStatus, TestMethodIds};

use common::{code_file, statuses};

#[test]
fn analyze_projects_coverage_onto_source_lines() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("lib.rs");
    let mut source = std::fs::File::create(&path)?;
    writeln!(source, "fn main() {{")?;
    writeln!(source, "    println!(\"hi\");   ")?;
    writeln!(source, "}}")?;

    let path = path.to_str().unwrap();
    let mut file = code_file(path, &[-1, 1, 1, -1]);

    let analysis = file.analyze(&LocalFileReader);

    assert!(analysis.error().is_none());
    assert_eq!(file.total_lines(), Some(3));
    assert_eq!(analysis.lines().len(), 3);

    assert_eq!(analysis.lines()[0].line_number, 1);
    assert_eq!(analysis.lines()[0].line_visits, 1);
    assert_eq!(
        analysis.lines()[0].line_visit_status,
        LineVisitStatus::Covered
    );
    // Trailing whitespace is trimmed from the content.
    assert_eq!(analysis.lines()[1].line_content, "    println!(\"hi\");");
    assert_eq!(
        analysis.lines()[2].line_visit_status,
        LineVisitStatus::NotCoverable
    );
    Ok(())
}

#[test]
fn analyze_lines_beyond_coverage_are_not_coverable() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("long.rs");
    std::fs::write(&path, "a\nb\nc\nd\n")?;

    let mut file = code_file(path.to_str().unwrap(), &[-1, 1]);
    let analysis = file.analyze(&LocalFileReader);

    assert_eq!(analysis.lines().len(), 4);
    assert_eq!(analysis.lines()[2].line_visits, -1);
    assert_eq!(
        analysis.lines()[3].line_visit_status,
        LineVisitStatus::NotCoverable
    );
    Ok(())
}

#[test]
fn analyze_missing_file_degrades_to_error_string() {
    let mut file = code_file("/does/not/exist.rs", &[-1, 1, 0]);

    let analysis = file.analyze(&LocalFileReader);

    assert!(analysis.error().unwrap().contains("/does/not/exist.rs"));
    // One empty-content line per coverage slot so report layout survives.
    assert_eq!(analysis.lines().len(), 3);
    assert_eq!(analysis.lines()[0].line_content, "");
    assert_eq!(file.total_lines(), Some(3));
}

#[test]
fn analyze_attaches_per_test_method_coverage() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("tracked.rs");
    std::fs::write(&path, "line one\nline two\n")?;

    let ids = TestMethodIds::new();
    let test_method = ids.create("Tests.Tracked", "Tracked");

    let mut file = code_file(path.to_str().unwrap(), &[-1, 0, 1]);
    file.add_coverage_by_test_method(
        test_method.clone(),
        CoverageByTestMethod::new(vec![-1, 0], statuses(&[-1, 0]))?,
    );

    let analysis = file.analyze(&LocalFileReader);

    let first = &analysis.lines()[0];
    assert_eq!(first.coverage_by_test_method[&test_method].line_visits, 0);

    // The tracked vector is shorter than the file: beyond it, not coverable.
    let second = &analysis.lines()[1];
    assert_eq!(second.coverage_by_test_method[&test_method].line_visits, -1);
    Ok(())
}

#[test]
fn analysis_runs_through_the_model_after_merge() -> anyhow::Result<()> {
    use covmerge::assembly::Assembly;
    use covmerge::class::Class;
    use covmerge::summary::SummaryResult;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("calc.rs");
    std::fs::write(&path, "one\ntwo\nthree\n")?;

    let assembly = Assembly::new("Lib.dll");
    let mut class = Class::new("Calc", "Lib.dll");
    class.add_file(code_file(path.to_str().unwrap(), &[-1, 1, 0]));
    assembly.add_class(class);

    for class in assembly.classes_mut().iter_mut() {
        for file in class.files_mut() {
            let analysis = file.analyze(&LocalFileReader);
            assert!(analysis.error().is_none());
        }
    }

    let assemblies = [assembly];
    let summary = SummaryResult::new(&assemblies, "Report", false, vec![]);
    assert_eq!(summary.total_lines(), Some(3));
    Ok(())
}

#[test]
fn local_file_reader_reports_missing_files() {
    let result = LocalFileReader.load_file("/nope/nothing.rs");
    assert!(result.is_err());
}
