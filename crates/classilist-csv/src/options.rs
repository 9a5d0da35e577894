//! Format options

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CsvError, CsvResult};

/// Mode specifying how to quote the data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QuoteMode {
    /// Always put quotes around the data
    Always,
    /// Use quotes only if needed
    IfNeeded,
    /// Don't use quotes, replace the separator in the data
    Replace,
    /// Quote non-numerical data only
    #[default]
    StringsOnly,
}

impl QuoteMode {
    /// Name used in persisted settings
    pub fn name(self) -> &'static str {
        match self {
            QuoteMode::Always => "ALWAYS",
            QuoteMode::IfNeeded => "IF_NEEDED",
            QuoteMode::Replace => "REPLACE",
            QuoteMode::StringsOnly => "STRINGS",
        }
    }

    /// Parse a persisted name
    pub fn from_name(name: &str) -> CsvResult<Self> {
        match name {
            "ALWAYS" => Ok(QuoteMode::Always),
            "IF_NEEDED" => Ok(QuoteMode::IfNeeded),
            "REPLACE" => Ok(QuoteMode::Replace),
            "STRINGS" => Ok(QuoteMode::StringsOnly),
            other => Err(CsvError::InvalidSettings(format!(
                "Specified quotation mode ('{other}') is unknown."
            ))),
        }
    }
}

/// Mode specifying how to end a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineEnding {
    /// Platform default
    #[default]
    PlatformDefault,
    /// Unix-style (LF)
    Lf,
    /// Windows-style (CRLF)
    CrLf,
    /// Mac classic (CR)
    Cr,
}

impl LineEnding {
    /// The mode specific terminator; `None` for the platform default
    pub fn terminator(self) -> Option<&'static str> {
        match self {
            LineEnding::PlatformDefault => None,
            LineEnding::Lf => Some("\n"),
            LineEnding::CrLf => Some("\r\n"),
            LineEnding::Cr => Some("\r"),
        }
    }

    /// The terminator actually written, resolving the platform default
    pub fn resolve(self) -> &'static str {
        self.terminator().unwrap_or(if cfg!(windows) { "\r\n" } else { "\n" })
    }

    /// Name used in persisted settings
    pub fn name(self) -> &'static str {
        match self {
            LineEnding::PlatformDefault => "SYST",
            LineEnding::Lf => "LF",
            LineEnding::CrLf => "CRLF",
            LineEnding::Cr => "CR",
        }
    }

    /// Parse a persisted name
    pub fn from_name(name: &str) -> CsvResult<Self> {
        match name {
            "SYST" => Ok(LineEnding::PlatformDefault),
            "LF" => Ok(LineEnding::Lf),
            "CRLF" => Ok(LineEnding::CrLf),
            "CR" => Ok(LineEnding::Cr),
            other => Err(CsvError::InvalidSettings(format!(
                "Specified line ending mode ('{other}') is unknown."
            ))),
        }
    }
}

/// Editable, persistable format settings.
///
/// String options are `Option`s: an absent value is legal here and is
/// normalized to the empty string when a [`FormatConfig`] is built from it.
/// A writer never reads these settings directly; it works on the
/// [`FormatConfig`] copy taken when the write starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PersistedSettings", into = "PersistedSettings")]
pub struct FormatSettings {
    /// String written between data items
    pub separator: Option<String>,
    /// String written for missing cells
    pub missing_pattern: Option<String>,
    /// Opening quotation mark
    pub quote_begin: Option<String>,
    /// Closing quotation mark
    pub quote_end: Option<String>,
    /// Replacement for closing quotation marks inside quoted data
    pub quote_replacement: Option<String>,
    /// When to quote
    pub quote_mode: QuoteMode,
    /// Replacement for the separator inside data
    pub separator_replacement: Option<String>,
    /// Replace the separator in non-numerical data even if it gets quoted
    pub replace_separator_in_strings: bool,
    /// Write the row key as first column
    pub write_row_id: bool,
    /// Decimal separator for numeric columns
    pub decimal_separator: char,
    /// Line ending mode
    pub line_ending: LineEnding,
    /// Output character encoding label; `None` selects UTF-8
    pub encoding: Option<String>,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            separator: Some(",".to_string()),
            missing_pattern: Some(String::new()),
            quote_begin: Some("\"".to_string()),
            quote_end: Some("\"".to_string()),
            quote_replacement: Some(String::new()),
            quote_mode: QuoteMode::StringsOnly,
            separator_replacement: Some(String::new()),
            replace_separator_in_strings: false,
            write_row_id: false,
            decimal_separator: '.',
            line_ending: LineEnding::PlatformDefault,
            encoding: None,
        }
    }
}

impl FormatSettings {
    /// Whether a column header gets written. Always `true`: whether a header
    /// is needed is decided per write by the caller, see
    /// [`TableWriter::with_header`](crate::TableWriter::with_header).
    pub fn write_column_header(&self) -> bool {
        true
    }

    /// Accepted for compatibility; the stored flag stays `true`.
    pub fn set_write_column_header(&mut self, _write_column_header: bool) {}

    /// Parse settings from JSON
    pub fn from_json_str(json: &str) -> CsvResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize settings to pretty-printed JSON
    pub fn to_json_string(&self) -> CsvResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> CsvResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Save settings to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> CsvResult<()> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }
}

/// On-disk layout of [`FormatSettings`].
/// Keys other than `missing`, `writeColHeader` and `writeRowHeader`
/// were added later and fall back to their defaults when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedSettings {
    #[serde(rename = "colSeparator", default = "default_separator")]
    col_separator: Option<String>,
    #[serde(rename = "missing")]
    missing: Option<String>,
    #[serde(rename = "quoteBegin", default = "default_quote")]
    quote_begin: Option<String>,
    #[serde(rename = "quoteEnd", default = "default_quote")]
    quote_end: Option<String>,
    #[serde(rename = "quoteReplacement", default = "default_empty")]
    quote_replacement: Option<String>,
    #[serde(rename = "quoteMode", default = "default_quote_mode")]
    quote_mode: String,
    #[serde(rename = "sepReplacePattern", default = "default_empty")]
    separator_replacement: Option<String>,
    #[serde(rename = "ReplSepInStrings", default)]
    replace_separator_in_strings: bool,
    #[serde(rename = "writeColHeader")]
    write_column_header: bool,
    #[serde(rename = "writeRowHeader")]
    write_row_id: bool,
    #[serde(rename = "decimalSeparator", default = "default_decimal_separator")]
    decimal_separator: char,
    #[serde(rename = "lineEndingMode", default = "default_line_ending")]
    line_ending: String,
    #[serde(rename = "charSet", default)]
    encoding: Option<String>,
}

fn default_separator() -> Option<String> {
    Some(",".to_string())
}

fn default_quote() -> Option<String> {
    Some("\"".to_string())
}

fn default_empty() -> Option<String> {
    Some(String::new())
}

fn default_quote_mode() -> String {
    QuoteMode::StringsOnly.name().to_string()
}

fn default_decimal_separator() -> char {
    '.'
}

fn default_line_ending() -> String {
    LineEnding::PlatformDefault.name().to_string()
}

impl TryFrom<PersistedSettings> for FormatSettings {
    type Error = CsvError;

    fn try_from(raw: PersistedSettings) -> CsvResult<Self> {
        Ok(Self {
            separator: raw.col_separator,
            missing_pattern: raw.missing,
            quote_begin: raw.quote_begin,
            quote_end: raw.quote_end,
            quote_replacement: raw.quote_replacement,
            quote_mode: QuoteMode::from_name(&raw.quote_mode)?,
            separator_replacement: raw.separator_replacement,
            replace_separator_in_strings: raw.replace_separator_in_strings,
            write_row_id: raw.write_row_id,
            decimal_separator: raw.decimal_separator,
            line_ending: LineEnding::from_name(&raw.line_ending)?,
            encoding: raw.encoding,
        })
    }
}

impl From<FormatSettings> for PersistedSettings {
    fn from(settings: FormatSettings) -> Self {
        Self {
            col_separator: settings.separator,
            missing: settings.missing_pattern,
            quote_begin: settings.quote_begin,
            quote_end: settings.quote_end,
            quote_replacement: settings.quote_replacement,
            quote_mode: settings.quote_mode.name().to_string(),
            separator_replacement: settings.separator_replacement,
            replace_separator_in_strings: settings.replace_separator_in_strings,
            write_column_header: true,
            write_row_id: settings.write_row_id,
            decimal_separator: settings.decimal_separator,
            line_ending: settings.line_ending.name().to_string(),
            encoding: settings.encoding,
        }
    }
}

/// Immutable format configuration driving a single write.
///
/// Built from [`FormatSettings`]; every absent string becomes `""` and the
/// line ending is resolved to the concrete terminator. Inconsistent
/// combinations (an empty separator with [`QuoteMode::Replace`], say) are
/// accepted and produce degenerate but well-defined output.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatConfig {
    separator: String,
    missing_pattern: String,
    quote_begin: String,
    quote_end: String,
    quote_replacement: String,
    quote_mode: QuoteMode,
    separator_replacement: String,
    replace_separator_in_strings: bool,
    write_row_id: bool,
    decimal_separator: char,
    line_ending_mode: LineEnding,
    line_ending: String,
    encoding: Option<String>,
}

impl FormatConfig {
    /// Build a configuration from settings
    pub fn new(settings: &FormatSettings) -> Self {
        let text = |s: &Option<String>| s.clone().unwrap_or_default();
        Self {
            separator: text(&settings.separator),
            missing_pattern: text(&settings.missing_pattern),
            quote_begin: text(&settings.quote_begin),
            quote_end: text(&settings.quote_end),
            quote_replacement: text(&settings.quote_replacement),
            quote_mode: settings.quote_mode,
            separator_replacement: text(&settings.separator_replacement),
            replace_separator_in_strings: settings.replace_separator_in_strings,
            write_row_id: settings.write_row_id,
            decimal_separator: settings.decimal_separator,
            line_ending_mode: settings.line_ending,
            line_ending: settings.line_ending.resolve().to_string(),
            encoding: settings.encoding.clone(),
        }
    }

    /// Data separator placed between tokens
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Text written for missing cells, never quoted
    pub fn missing_pattern(&self) -> &str {
        &self.missing_pattern
    }

    /// Opening quote marker
    pub fn quote_begin(&self) -> &str {
        &self.quote_begin
    }

    /// Closing quote marker; empty means only the opening one is written
    pub fn quote_end(&self) -> &str {
        &self.quote_end
    }

    /// Replacement for closing quote markers inside quoted values
    pub fn quote_replacement(&self) -> &str {
        &self.quote_replacement
    }

    /// Active quote mode
    pub fn quote_mode(&self) -> QuoteMode {
        self.quote_mode
    }

    /// Replacement for the separator inside values
    pub fn separator_replacement(&self) -> &str {
        &self.separator_replacement
    }

    /// Whether non-numeric values get the separator replaced before quoting
    pub fn replace_separator_in_strings(&self) -> bool {
        self.replace_separator_in_strings
    }

    /// Always `true`, see [`FormatSettings::write_column_header`]
    pub fn write_column_header(&self) -> bool {
        true
    }

    /// Whether the row key is written as first token
    pub fn write_row_id(&self) -> bool {
        self.write_row_id
    }

    /// Decimal separator for numeric columns
    pub fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    /// Line ending mode the terminator was resolved from
    pub fn line_ending_mode(&self) -> LineEnding {
        self.line_ending_mode
    }

    /// The concrete line terminator
    pub fn line_ending(&self) -> &str {
        &self.line_ending
    }

    /// Output encoding label, `None` for UTF-8
    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self::new(&FormatSettings::default())
    }
}

impl From<&FormatSettings> for FormatConfig {
    fn from(settings: &FormatSettings) -> Self {
        Self::new(settings)
    }
}

impl From<FormatSettings> for FormatConfig {
    fn from(settings: FormatSettings) -> Self {
        Self::new(&settings)
    }
}

/// Replace `\t`, `\n` and `\\` escape sequences with the characters they
/// stand for. Any other backslash sequence is kept as is.
pub fn unescape_string(s: &str) -> String {
    if !s.contains('\\') {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('\\') => result.push('\\'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

/// Replace tabs, newlines and backslashes with `\t`, `\n` and `\\`
pub fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\t' => result.push_str("\\t"),
            '\n' => result.push_str("\\n"),
            '\\' => result.push_str("\\\\"),
            _ => result.push(c),
        }
    }
    result
}
