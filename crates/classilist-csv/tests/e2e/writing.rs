//! Writing tables to in-memory sinks.

use crate::{iris_spec, iris_table, lf, write_to_string, FailingSink, RecordingMonitor};
use classilist_core::{
    CancellationToken, Cell, ColumnSpec, IterRowSource, Row, Table, TableSpec,
};
use classilist_csv::{CsvError, FormatConfig, FormatSettings, QuoteMode, TableWriter};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn test_iris_strings_only() {
    let (text, outcome) = write_to_string(
        &iris_table(1),
        FormatSettings::default(),
        CancellationToken::new(),
    );
    assert_eq!(
        text,
        "F-Sepal.Length,A-Class,Predicted,P-setosa\n5.1,\"setosa\",\"setosa\",0.98\n"
    );
    assert_eq!(outcome.rows_written, 1);
    assert_eq!(outcome.warning, None);
}

#[test]
fn test_missing_pattern_is_never_quoted() {
    let mut table = Table::new(iris_spec());
    table
        .push_row(
            "Row0",
            vec![
                Cell::Missing,
                Cell::text("NA"),
                Cell::text("setosa"),
                Cell::Number(0.5),
            ],
        )
        .unwrap();

    let settings = FormatSettings {
        quote_mode: QuoteMode::IfNeeded,
        missing_pattern: Some("NA".to_string()),
        ..FormatSettings::default()
    };
    let (text, _) = write_to_string(&table, settings, CancellationToken::new());
    let rows: Vec<&str> = text.lines().collect();
    assert_eq!(rows[1], "NA,\"NA\",setosa,0.5");
}

#[test]
fn test_cancellation_keeps_completed_rows() {
    let table = iris_table(10);
    let mut monitor = RecordingMonitor::cancelling_on(4);
    let mut writer = TableWriter::new(
        Vec::new(),
        FormatConfig::new(&lf(FormatSettings::default())),
    );

    let err = writer.write(table.rows(), &mut monitor).unwrap_err();
    assert!(err.is_cancelled());
    assert!(matches!(err, CsvError::Cancelled { rows_written: 3 }));

    let text = String::from_utf8(writer.into_inner()).unwrap();
    assert_eq!(text.lines().count(), 4);
    assert!(text.ends_with("0.98\n"));
}

#[test]
fn test_sink_failure_stops_the_write() {
    let header = "F-Sepal.Length,A-Class,Predicted,P-setosa\n";
    let row = "5.1,\"setosa\",\"setosa\",0.98\n";
    let table = iris_table(5);
    let mut monitor = RecordingMonitor::default();
    let mut writer = TableWriter::new(
        FailingSink::new(header.len() + 2 * row.len()),
        FormatConfig::new(&lf(FormatSettings::default())),
    );

    let err = writer.write(table.rows(), &mut monitor).unwrap_err();
    assert!(matches!(err, CsvError::Io(_)), "{err}");
    assert!(!err.is_cancelled());

    // The third row failed; no row after it was pulled.
    assert_eq!(monitor.updates.len(), 3);
    let sink = writer.into_inner();
    assert_eq!(
        String::from_utf8(sink.written).unwrap(),
        format!("{header}{row}{row}")
    );
}

#[test]
fn test_header_error_writes_nothing() {
    let spec = TableSpec::new(
        "t",
        vec![
            ColumnSpec::numeric("x"),
            ColumnSpec::text("Class"),
            ColumnSpec::numeric("P (Class=a)"),
        ],
    );
    let mut table = Table::new(spec);
    table
        .push_row(
            "Row0",
            vec![Cell::Number(1.0), Cell::text("a"), Cell::Number(1.0)],
        )
        .unwrap();

    let mut writer = TableWriter::new(Vec::new(), FormatConfig::default());
    let err = writer
        .write(table.rows(), CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, CsvError::PredictedColumnMissing));
    assert!(writer.get_ref().is_empty());
}

#[test]
fn test_header_error_without_header_writes_nothing() {
    let spec = TableSpec::new(
        "t",
        vec![ColumnSpec::text("Class"), ColumnSpec::text("Prediction (Class)")],
    );
    let table = Table::new(spec);
    let mut writer = TableWriter::new(Vec::new(), FormatConfig::default()).with_header(false);
    let err = writer
        .write(table.rows(), CancellationToken::new())
        .unwrap_err();
    assert!(err.is_header_error());
    assert!(writer.get_ref().is_empty());
}

#[test]
fn test_decimal_separator_rewrite() {
    let settings = FormatSettings {
        separator: Some(";".to_string()),
        decimal_separator: ',',
        ..FormatSettings::default()
    };
    let (text, outcome) = write_to_string(&iris_table(1), settings, CancellationToken::new());
    assert_eq!(
        text,
        "F-Sepal.Length;A-Class;Predicted;P-setosa\n5,1;\"setosa\";\"setosa\";0,98\n"
    );
    assert_eq!(outcome.warning, None);
}

#[test]
fn test_decimal_separator_collision_warns_once() {
    let mut table = Table::new(iris_spec());
    for (key, value) in [("Row0", "1,5"), ("Row1", "2,5"), ("Row2", "3.5")] {
        table
            .push_row(
                key,
                vec![
                    Cell::text(value),
                    Cell::text("setosa"),
                    Cell::text("setosa"),
                    Cell::text("0,1"),
                ],
            )
            .unwrap();
    }

    let settings = FormatSettings {
        separator: Some(";".to_string()),
        decimal_separator: ',',
        ..FormatSettings::default()
    };
    let (text, outcome) = write_to_string(&table, settings, CancellationToken::new());
    let rows: Vec<&str> = text.lines().skip(1).collect();
    assert_eq!(
        rows,
        vec![
            "1,5;\"setosa\";\"setosa\";0,1",
            "2,5;\"setosa\";\"setosa\";0,1",
            "3,5;\"setosa\";\"setosa\";0,1",
        ]
    );

    let warning = outcome.warning.unwrap();
    assert!(warning.contains("row #0 column #0"), "{warning}");
}

#[test]
fn test_decimal_separator_leaves_text_columns_alone() {
    let mut table = Table::new(iris_spec());
    table
        .push_row(
            "Row0",
            vec![
                Cell::Number(4.0),
                Cell::text("v1.2"),
                Cell::text("setosa"),
                Cell::Integer(1),
            ],
        )
        .unwrap();
    let settings = FormatSettings {
        separator: Some("\t".to_string()),
        decimal_separator: ',',
        quote_mode: QuoteMode::Replace,
        ..FormatSettings::default()
    };
    let (text, outcome) = write_to_string(&table, settings, CancellationToken::new());
    assert_eq!(text.lines().nth(1), Some("4,0\tv1.2\tsetosa\t1"));
    assert_eq!(outcome.warning, None);
}

#[test]
fn test_progress_reports() {
    let table = iris_table(4);
    let mut monitor = RecordingMonitor::default();
    let (_, outcome) = write_to_string(&table, FormatSettings::default(), &mut monitor);
    assert_eq!(outcome.rows_written, 4);

    let fractions: Vec<Option<f64>> = monitor.updates.iter().map(|(f, _)| *f).collect();
    assert_eq!(fractions, vec![Some(0.0), Some(0.25), Some(0.5), Some(0.75)]);
    assert_eq!(monitor.updates[1].1, "Writing row 2 (\"Row1\") of 4");
}

#[test]
fn test_progress_with_unknown_row_count() {
    let rows = (0..2).map(|i| {
        Ok(Row::new(
            format!("Row{i}"),
            vec![
                Cell::Number(5.0),
                Cell::text("setosa"),
                Cell::text("setosa"),
                Cell::Number(1.0),
            ],
        ))
    });
    let source = IterRowSource::new(iris_spec(), rows);
    let mut monitor = RecordingMonitor::default();
    let mut writer = TableWriter::new(Vec::new(), FormatConfig::default());
    writer.write(source, &mut monitor).unwrap();

    assert!(monitor.updates.iter().all(|(f, _)| f.is_none()));
    assert_eq!(monitor.updates[0].1, "Writing row 1 (\"Row0\")");
}

#[test]
fn test_no_trailing_separator_and_final_line_terminated() {
    let settings = FormatSettings {
        line_ending: classilist_csv::LineEnding::CrLf,
        quote_mode: QuoteMode::Replace,
        ..FormatSettings::default()
    };
    let table = iris_table(2);
    let mut writer = TableWriter::new(Vec::new(), FormatConfig::new(&settings));
    writer.write(table.rows(), CancellationToken::new()).unwrap();
    let text = String::from_utf8(writer.into_inner()).unwrap();
    assert_eq!(
        text,
        "F-Sepal.Length,A-Class,Predicted,P-setosa\r\n\
         5.1,setosa,setosa,0.98\r\n\
         5.1,setosa,setosa,0.98\r\n"
    );
}

fn strip_quotes(token: &str) -> &str {
    token
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(token)
}

proptest! {
    #[test]
    fn prop_always_quoting_round_trips(value in "[^\"\t\r\n]{0,16}") {
        let mut table = Table::new(iris_spec());
        table
            .push_row(
                "Row0",
                vec![
                    Cell::Number(1.0),
                    Cell::text(value.clone()),
                    Cell::text("setosa"),
                    Cell::Number(1.0),
                ],
            )
            .unwrap();
        let settings = FormatSettings {
            quote_mode: QuoteMode::Always,
            separator: Some("\t".to_string()),
            ..FormatSettings::default()
        };
        let (text, _) = write_to_string(&table, settings, CancellationToken::new());
        let row = text.lines().nth(1).unwrap();
        let token = row.split('\t').nth(1).unwrap();
        prop_assert_eq!(strip_quotes(token), value.as_str());
    }
}
