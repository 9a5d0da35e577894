//! Streaming table writer

use std::borrow::Cow;
use std::io::Write;

use classilist_core::{ExecutionMonitor, Row, RowSource};
use encoding_rs::{Encoding, UTF_8};

use crate::error::{CsvError, CsvResult};
use crate::header::{derive_roles, ROW_ID_HEADER};
use crate::options::FormatConfig;
use crate::quote::{replace_decimal_separator, Quoter};

/// Result of a completed write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Number of data rows written (header excluded)
    pub rows_written: u64,
    /// First data-quality warning raised during the write, if any
    pub warning: Option<String>,
}

/// Writes classification-result tables as delimited text.
///
/// Each call to [`write`](TableWriter::write) is one linear pass: derive the
/// column roles, emit the rewritten header, emit the rows one at a time, then
/// flush. Nothing is kept between calls and the table is never held in
/// memory as a whole.
pub struct TableWriter<W: Write> {
    sink: W,
    config: FormatConfig,
    write_header: bool,
}

/// State of one `write` call
struct WriteSession {
    rows_written: u64,
    total: Option<u64>,
    warning: Option<String>,
}

impl WriteSession {
    fn warn_once(&mut self, message: impl FnOnce() -> String) {
        if self.warning.is_none() {
            let message = message();
            tracing::warn!("{message}");
            self.warning = Some(message);
        }
    }
}

impl<W: Write> TableWriter<W> {
    /// Create a writer emitting to `sink`
    pub fn new(sink: W, config: FormatConfig) -> Self {
        let write_header = config.write_column_header();
        Self {
            sink,
            config,
            write_header,
        }
    }

    /// Choose whether the column header is written (on by default).
    ///
    /// Callers appending to existing output turn it off.
    pub fn with_header(mut self, write_header: bool) -> Self {
        self.write_header = write_header;
        self
    }

    /// The configuration this writer uses
    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    /// Get a reference to the sink
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Consume the writer, returning the sink
    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Write all rows of `source`.
    ///
    /// Column roles are validated before the sink is touched, so a table that
    /// is not a classification result produces no output at all. The monitor
    /// receives a progress update for every row and is polled for
    /// cancellation before each row; on cancellation the rows written so far
    /// stay in the sink and [`CsvError::Cancelled`] is returned. Removing
    /// partial output is up to the caller.
    pub fn write<S, M>(&mut self, mut source: S, mut monitor: M) -> CsvResult<WriteOutcome>
    where
        S: RowSource,
        M: ExecutionMonitor,
    {
        let encoding = resolve_encoding(self.config.encoding())?;
        let layout = derive_roles(source.spec())?;
        let header = layout.header_names(source.spec());
        let numeric: Vec<bool> = source
            .spec()
            .columns()
            .iter()
            .map(|c| c.column_type.is_numeric())
            .collect();

        let mut session = WriteSession {
            rows_written: 0,
            total: source.row_count(),
            warning: None,
        };

        let quoter = Quoter::new(&self.config);
        let mut line = String::new();

        if self.write_header {
            let mut tokens = Vec::with_capacity(header.len() + 1);
            if self.config.write_row_id() {
                tokens.push(quoter.quote_header(ROW_ID_HEADER));
            }
            tokens.extend(header.iter().map(|name| quoter.quote_header(name)));
            line.push_str(&tokens.join(self.config.separator()));
            line.push_str(self.config.line_ending());
            emit(&mut self.sink, encoding, &line)?;
        }

        while let Some(row) = source.poll()? {
            let index = session.rows_written;
            let message = match session.total {
                Some(total) if total > 0 => {
                    format!("Writing row {} (\"{}\") of {}", index + 1, row.key, total)
                }
                _ => format!("Writing row {} (\"{}\")", index + 1, row.key),
            };
            let fraction = session
                .total
                .filter(|&total| total > 0)
                .map(|total| index as f64 / total as f64);
            monitor.set_progress(fraction, &message);

            if monitor.check_cancelled().is_err() {
                tracing::info!(rows_written = index, "table writer cancelled");
                return Err(CsvError::Cancelled {
                    rows_written: index,
                });
            }

            let expected = numeric.len();
            if row.cells.len() != expected {
                return Err(classilist_core::Error::CellCountMismatch {
                    actual: row.cells.len(),
                    key: row.key,
                    expected,
                }
                .into());
            }

            line.clear();
            self.format_row(&row, &numeric, &quoter, &mut session, &mut line);
            emit(&mut self.sink, encoding, &line)?;
            session.rows_written += 1;
        }

        self.sink.flush()?;
        tracing::debug!(rows = session.rows_written, "table written");

        Ok(WriteOutcome {
            rows_written: session.rows_written,
            warning: session.warning,
        })
    }

    fn format_row(
        &self,
        row: &Row,
        numeric: &[bool],
        quoter: &Quoter<'_>,
        session: &mut WriteSession,
        line: &mut String,
    ) {
        let config = &self.config;
        let decimal_separator = config.decimal_separator();
        let mut first = true;

        if config.write_row_id() {
            line.push_str(&quoter.quote(&row.key, false));
            first = false;
        }

        for (col, &is_numeric) in numeric.iter().enumerate() {
            if !first {
                line.push_str(config.separator());
            }
            first = false;

            let cell = row.cell(col);
            if cell.is_missing() {
                // Missing patterns are never quoted.
                line.push_str(config.missing_pattern());
                continue;
            }

            let rendered = cell.render();
            let value: Cow<'_, str> = if is_numeric && decimal_separator != '.' {
                if rendered.contains(decimal_separator) {
                    let row_index = session.rows_written;
                    session.warn_once(|| {
                        format!(
                            "Specified decimal separator ('{decimal_separator}') is contained \
                             in the numerical value. Not replacing decimal separator \
                             (e.g. in row #{row_index} column #{col})."
                        )
                    });
                    rendered.as_str().into()
                } else {
                    replace_decimal_separator(&rendered, decimal_separator)
                }
            } else {
                rendered.as_str().into()
            };

            line.push_str(&quoter.quote(&value, is_numeric));
        }

        line.push_str(config.line_ending());
    }
}

/// Resolve an encoding label; `None` selects UTF-8.
///
/// Encodings that `encoding_rs` can only decode (UTF-16 and the replacement
/// encoding, whose output encoding is UTF-8) are rejected.
pub(crate) fn resolve_encoding(label: Option<&str>) -> CsvResult<&'static Encoding> {
    let Some(label) = label else {
        return Ok(UTF_8);
    };
    let encoding = Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| CsvError::UnknownEncoding(label.to_string()))?;
    if encoding.output_encoding() != encoding {
        return Err(CsvError::UnsupportedEncoding(encoding.name().to_string()));
    }
    Ok(encoding)
}

fn emit<W: Write>(sink: &mut W, encoding: &'static Encoding, text: &str) -> CsvResult<()> {
    if encoding == UTF_8 {
        sink.write_all(text.as_bytes())?;
        return Ok(());
    }
    let (bytes, _, unmappable) = encoding.encode(text);
    if unmappable {
        tracing::debug!(
            encoding = encoding.name(),
            "unmappable characters written as numeric character references"
        );
    }
    sink.write_all(&bytes)?;
    Ok(())
}
