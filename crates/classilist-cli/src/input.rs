//! Reading classification results from CSV files

use std::fs::File;
use std::io::Read;
use std::path::Path;

use classilist_core::{Cell, ColumnSpec, ColumnType, Error, Result, Row, RowSource, TableSpec};
use csv::StringRecord;

/// Streams the records of a CSV file as table rows.
///
/// Column types are taken from `numeric` when a column is listed there,
/// otherwise inferred from the first data record: a field that parses as a
/// number makes the column numeric. Empty fields are missing cells and rows
/// are keyed `Row0`, `Row1`, ...
pub struct CsvRowSource<R: Read> {
    reader: csv::Reader<R>,
    spec: TableSpec,
    first: Option<StringRecord>,
    record: StringRecord,
    next: u64,
    row_count: Option<u64>,
}

impl CsvRowSource<File> {
    /// Open a CSV file; the records are counted up front for progress
    /// reporting
    pub fn open<P: AsRef<Path>>(path: P, numeric: &[String]) -> Result<Self> {
        let path = path.as_ref();
        let count = count_records(open_file(path)?)?;
        let source = Self::from_reader(open_file(path)?, numeric)?;
        Ok(source.with_row_count(count))
    }
}

impl<R: Read> CsvRowSource<R> {
    /// Read the header and first record from `reader`
    pub fn from_reader(reader: R, numeric: &[String]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers = reader.headers().map_err(csv_error)?.clone();
        let mut first = StringRecord::new();
        let has_first = reader.read_record(&mut first).map_err(csv_error)?;

        let columns = headers
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let listed = numeric.iter().any(|n| n == name);
                let inferred = has_first && first.get(i).is_some_and(looks_numeric);
                let column_type = if listed || inferred {
                    ColumnType::Numeric
                } else {
                    ColumnType::Text
                };
                ColumnSpec::new(name, column_type)
            })
            .collect();

        tracing::debug!(columns = headers.len(), "read CSV header");

        Ok(Self {
            reader,
            spec: TableSpec::new("input", columns),
            first: has_first.then_some(first),
            record: StringRecord::new(),
            next: 0,
            row_count: None,
        })
    }

    /// Declare the number of data records
    pub fn with_row_count(mut self, count: u64) -> Self {
        self.row_count = Some(count);
        self
    }

    fn to_row(&self, record: &StringRecord) -> Row {
        let cells = self
            .spec
            .columns()
            .iter()
            .enumerate()
            .map(|(i, column)| parse_field(record.get(i).unwrap_or_default(), column.column_type))
            .collect();
        Row::new(format!("Row{}", self.next), cells)
    }
}

impl<R: Read> RowSource for CsvRowSource<R> {
    fn spec(&self) -> &TableSpec {
        &self.spec
    }

    fn row_count(&self) -> Option<u64> {
        self.row_count
    }

    fn poll(&mut self) -> Result<Option<Row>> {
        let row = match self.first.take() {
            Some(record) => self.to_row(&record),
            None => {
                let mut record = std::mem::take(&mut self.record);
                let more = self.reader.read_record(&mut record).map_err(csv_error)?;
                let row = more.then(|| self.to_row(&record));
                self.record = record;
                match row {
                    Some(row) => row,
                    None => return Ok(None),
                }
            }
        };
        self.next += 1;
        Ok(Some(row))
    }
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| Error::row_source(format!("{}: {e}", path.display())))
}

fn count_records(file: File) -> Result<u64> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);
    let mut record = StringRecord::new();
    let mut count = 0;
    while reader.read_record(&mut record).map_err(csv_error)? {
        count += 1;
    }
    Ok(count)
}

fn csv_error(e: csv::Error) -> Error {
    Error::row_source(e.to_string())
}

fn looks_numeric(field: &str) -> bool {
    let field = field.trim();
    !field.is_empty() && field.parse::<f64>().is_ok()
}

fn parse_field(field: &str, column_type: ColumnType) -> Cell {
    if field.is_empty() {
        return Cell::Missing;
    }
    if column_type.is_numeric() {
        let trimmed = field.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return Cell::Integer(n);
        }
        if let Ok(n) = trimmed.parse::<f64>() {
            return Cell::Number(n);
        }
    }
    Cell::text(field)
}
