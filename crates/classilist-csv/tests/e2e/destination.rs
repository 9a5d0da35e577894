//! Writing tables to files.

use std::fs;

use crate::{iris_row, iris_spec, iris_table, lf, RecordingMonitor};
use classilist_core::{
    CancellationToken, ColumnSpec, Error, IterRowSource, Row, Table, TableSpec,
};
use classilist_csv::{CsvError, DestinationSettings, FormatSettings, OverwritePolicy};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const HEADER: &str = "F-Sepal.Length,A-Class,Predicted,P-setosa\n";
const ROW: &str = "5.1,\"setosa\",\"setosa\",0.98\n";

fn settings(dir: &TempDir, policy: OverwritePolicy) -> DestinationSettings {
    DestinationSettings::new(dir.path().join("out.csv"))
        .with_policy(policy)
        .with_format(lf(FormatSettings::default()))
}

#[test]
fn test_write_new_file() {
    let dir = TempDir::new().unwrap();
    let settings = settings(&dir, OverwritePolicy::Abort);
    assert_eq!(settings.check_destination().unwrap(), None);

    let outcome = settings
        .write_table(iris_table(2).rows(), CancellationToken::new())
        .unwrap();
    assert_eq!(outcome.rows_written, 2);

    let text = fs::read_to_string(dir.path().join("out.csv")).unwrap();
    assert_eq!(text, format!("{HEADER}{ROW}{ROW}"));
}

#[test]
fn test_overwrite_replaces_content() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");
    fs::write(&path, "old content\nmore\nlines\n").unwrap();

    let settings = settings(&dir, OverwritePolicy::Overwrite);
    let warning = settings.check_destination().unwrap().unwrap();
    assert!(warning.contains("will be overwritten"));

    settings
        .write_table(iris_table(1).rows(), CancellationToken::new())
        .unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), format!("{HEADER}{ROW}"));
}

#[test]
fn test_abort_leaves_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");
    fs::write(&path, "keep me\n").unwrap();

    let settings = settings(&dir, OverwritePolicy::Abort);
    assert!(settings.check_destination().is_err());
    let err = settings
        .write_table(iris_table(1).rows(), CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, CsvError::InvalidSettings(_)));
    assert_eq!(fs::read_to_string(&path).unwrap(), "keep me\n");
}

#[test]
fn test_append_skips_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");

    let settings = settings(&dir, OverwritePolicy::Append);
    settings
        .write_table(iris_table(1).rows(), CancellationToken::new())
        .unwrap();
    settings
        .write_table(iris_table(2).rows(), CancellationToken::new())
        .unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        format!("{HEADER}{ROW}{ROW}{ROW}")
    );
}

#[test]
fn test_append_to_empty_file_writes_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");
    fs::write(&path, "").unwrap();

    settings(&dir, OverwritePolicy::Append)
        .write_table(iris_table(1).rows(), CancellationToken::new())
        .unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), format!("{HEADER}{ROW}"));
}

#[test]
fn test_cancel_deletes_created_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");

    let mut monitor = RecordingMonitor::cancelling_on(2);
    let err = settings(&dir, OverwritePolicy::Overwrite)
        .write_table(iris_table(5).rows(), &mut monitor)
        .unwrap_err();
    assert!(err.is_cancelled());
    assert!(!path.exists());
}

#[test]
fn test_cancel_truncates_appended_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");
    let existing = format!("{HEADER}{ROW}");
    fs::write(&path, &existing).unwrap();

    let mut monitor = RecordingMonitor::cancelling_on(3);
    let err = settings(&dir, OverwritePolicy::Append)
        .write_table(iris_table(5).rows(), &mut monitor)
        .unwrap_err();
    assert!(matches!(err, CsvError::Cancelled { rows_written: 2 }));
    assert_eq!(fs::read_to_string(&path).unwrap(), existing);
}

#[test]
fn test_header_error_creates_no_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");
    let table = Table::new(TableSpec::new(
        "t",
        vec![ColumnSpec::text("Class"), ColumnSpec::numeric("x")],
    ));

    let err = settings(&dir, OverwritePolicy::Overwrite)
        .write_table(table.rows(), CancellationToken::new())
        .unwrap_err();
    assert!(err.is_header_error());
    assert!(!path.exists());
}

#[test]
fn test_missing_directory_is_rejected() {
    let dir = TempDir::new().unwrap();
    let settings = DestinationSettings::new(dir.path().join("nope").join("out.csv"));
    let err = settings.check_destination().unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn test_directory_is_rejected() {
    let dir = TempDir::new().unwrap();
    let settings = DestinationSettings::new(dir.path());
    let err = settings.check_destination().unwrap_err();
    assert!(err.to_string().contains("is a directory"));
}

/// Rows that fail after `good` rows were produced
fn failing_source(
    good: usize,
) -> IterRowSource<impl Iterator<Item = classilist_core::Result<Row>>> {
    let rows = (0..good)
        .map(|i| Ok(iris_row(format!("Row{i}"))))
        .chain(std::iter::once(Err(Error::row_source("connection lost"))));
    IterRowSource::new(iris_spec(), rows)
}

#[test]
fn test_failure_deletes_created_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");

    let err = settings(&dir, OverwritePolicy::Overwrite)
        .write_table(failing_source(2), CancellationToken::new())
        .unwrap_err();
    assert!(!err.is_cancelled());
    assert!(matches!(err, CsvError::Core(Error::Source(_))), "{err}");
    assert!(!path.exists());
}

#[test]
fn test_failure_truncates_appended_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");
    let existing = format!("{HEADER}{ROW}");
    fs::write(&path, &existing).unwrap();

    let err = settings(&dir, OverwritePolicy::Append)
        .write_table(failing_source(3), CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, CsvError::Core(_)));
    assert_eq!(fs::read_to_string(&path).unwrap(), existing);
}

#[test]
fn test_bad_encoding_keeps_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");
    fs::write(&path, "precious\n").unwrap();

    for label in ["bogus", "utf-16le"] {
        let mut settings = settings(&dir, OverwritePolicy::Overwrite);
        settings.format.encoding = Some(label.to_string());
        let err = settings
            .write_table(iris_table(1).rows(), CancellationToken::new())
            .unwrap_err();
        assert!(
            matches!(
                err,
                CsvError::UnknownEncoding(_) | CsvError::UnsupportedEncoding(_)
            ),
            "{label}: {err}"
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "precious\n");
    }
}
