//! Writing tables to files: overwrite policy, header suppression on append,
//! and cleanup of partial output

use std::fs::{self, File, OpenOptions};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use classilist_core::{ExecutionMonitor, RowSource, TableSpec};
use serde::{Deserialize, Serialize};

use crate::error::{CsvError, CsvResult};
use crate::header::derive_roles;
use crate::options::{FormatConfig, FormatSettings};
use crate::writer::{resolve_encoding, TableWriter, WriteOutcome};

/// What to do when the output file already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OverwritePolicy {
    /// Fail
    Abort,
    /// Replace the existing file
    #[default]
    Overwrite,
    /// Append rows to the existing file
    Append,
}

/// Output file plus the format to write it in
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DestinationSettings {
    /// Output file
    #[serde(rename = "filename")]
    pub file_name: Option<PathBuf>,
    /// Behaviour when the output file exists
    #[serde(rename = "fileOverwritePolicy", default)]
    pub overwrite_policy: OverwritePolicy,
    /// Format options
    #[serde(flatten)]
    pub format: FormatSettings,
}

impl DestinationSettings {
    /// Create settings for the given file with default format options
    pub fn new<P: Into<PathBuf>>(file_name: P) -> Self {
        Self {
            file_name: Some(file_name.into()),
            ..Self::default()
        }
    }

    /// Set the overwrite policy
    pub fn with_policy(mut self, policy: OverwritePolicy) -> Self {
        self.overwrite_policy = policy;
        self
    }

    /// Set the format options
    pub fn with_format(mut self, format: FormatSettings) -> Self {
        self.format = format;
        self
    }

    /// Check the settings for consistency, including that the output
    /// encoding can be written
    pub fn validate(&self) -> CsvResult<()> {
        self.path()?;
        resolve_encoding(self.format.encoding.as_deref())?;

        let separator = self.format.separator.as_deref().unwrap_or_default();
        let missing = self.format.missing_pattern.as_deref().unwrap_or_default();
        if !separator.is_empty() && !missing.is_empty() && missing.contains(separator) {
            return Err(CsvError::InvalidSettings(format!(
                "The pattern for missing values ('{missing}') must not contain the data \
                 separator ('{separator}')."
            )));
        }
        Ok(())
    }

    /// Check that the output file may be written.
    ///
    /// Returns a warning if an existing file is going to be overwritten or
    /// appended to.
    pub fn check_destination(&self) -> CsvResult<Option<String>> {
        let path = self.path()?;

        if path.is_dir() {
            return Err(CsvError::InvalidSettings(format!(
                "Output location '{}' is a directory",
                path.display()
            )));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(CsvError::InvalidSettings(format!(
                    "Directory of output file '{}' does not exist",
                    path.display()
                )));
            }
        }
        if !path.exists() {
            return Ok(None);
        }

        match self.overwrite_policy {
            OverwritePolicy::Abort => Err(CsvError::InvalidSettings(format!(
                "Output file '{}' exists and must not be overwritten due to user settings",
                path.display()
            ))),
            OverwritePolicy::Overwrite => Ok(Some(format!(
                "Output file '{}' exists and will be overwritten",
                path.display()
            ))),
            OverwritePolicy::Append => Ok(Some(format!(
                "Output file '{}' exists and will be appended",
                path.display()
            ))),
        }
    }

    /// Warnings about settings that produce output which is hard to read
    /// back for a table with the given columns
    pub fn configure_warnings(&self, spec: &TableSpec) -> Vec<String> {
        let mut warnings = Vec::new();
        let config = FormatConfig::new(&self.format);

        if config.separator().is_empty()
            && config.missing_pattern().is_empty()
            && (config.quote_begin().is_empty() || config.quote_end().is_empty())
        {
            warnings.push(
                "No separator and no quotes and no missing value pattern set. \
                 Written data will be hard to read!"
                    .to_string(),
            );
        }

        if spec.has_numeric_columns() && config.separator().contains(config.decimal_separator())
        {
            warnings.push(
                "The data separator contains (or is equal to) the decimal separator. \
                 Written data will be hard to read!"
                    .to_string(),
            );
        }

        warnings
    }

    /// Write all rows of `source` to the output file.
    ///
    /// Settings, output encoding and column roles are validated before the
    /// file is opened. The header is
    /// skipped when appending to an existing, non-empty file. If the write is
    /// cancelled or fails, a file created or overwritten by this call is
    /// deleted, and an appended file is truncated back to its prior length.
    pub fn write_table<S, M>(&self, source: S, monitor: M) -> CsvResult<WriteOutcome>
    where
        S: RowSource,
        M: ExecutionMonitor,
    {
        self.validate()?;
        derive_roles(source.spec())?;

        let path = self.path()?;
        let existing_len = match fs::metadata(path) {
            Ok(meta) => Some(meta.len()),
            Err(_) => None,
        };

        let append = match (existing_len, self.overwrite_policy) {
            (Some(_), OverwritePolicy::Abort) => {
                return Err(CsvError::InvalidSettings(format!(
                    "Output file '{}' exists and must not be overwritten due to user settings",
                    path.display()
                )))
            }
            (Some(_), OverwritePolicy::Append) => true,
            _ => false,
        };
        let write_header = !(append && existing_len.unwrap_or(0) > 0);

        let file = if append {
            OpenOptions::new().append(true).open(path)?
        } else {
            File::create(path)?
        };

        // The writer works on its own copy of the format settings.
        let config = FormatConfig::new(&self.format);
        let mut writer = TableWriter::new(BufWriter::new(file), config).with_header(write_header);
        let result = writer.write(source, monitor);
        drop(writer);

        match result {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                if err.is_cancelled() {
                    tracing::info!("Table writer canceled.");
                } else {
                    tracing::warn!(error = %err, "Table writer failed");
                }
                if append {
                    discard_appended(path, existing_len.unwrap_or(0));
                } else {
                    discard_file(path);
                }
                Err(err)
            }
        }
    }

    fn path(&self) -> CsvResult<&Path> {
        match self.file_name.as_deref() {
            Some(path) if !path.as_os_str().is_empty() => Ok(path),
            _ => Err(CsvError::InvalidSettings(
                "Missing output file name.".to_string(),
            )),
        }
    }
}

fn discard_file(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::debug!("File '{}' deleted after write was aborted.", path.display()),
        Err(e) => tracing::warn!(
            "Unable to delete file '{}' after write was aborted: {e}",
            path.display()
        ),
    }
}

fn discard_appended(path: &Path, original_len: u64) {
    let truncated = OpenOptions::new()
        .write(true)
        .open(path)
        .and_then(|file| file.set_len(original_len));
    match truncated {
        Ok(()) => tracing::debug!(
            "File '{}' truncated to {original_len} bytes after write was aborted.",
            path.display()
        ),
        Err(e) => tracing::warn!(
            "Unable to truncate file '{}' after write was aborted: {e}",
            path.display()
        ),
    }
}
