//! Quoting and escaping of emitted tokens

use std::borrow::Cow;

use crate::options::{FormatConfig, QuoteMode};

/// Applies the configured quote mode to header and data tokens
#[derive(Debug, Clone, Copy)]
pub struct Quoter<'a> {
    config: &'a FormatConfig,
}

impl<'a> Quoter<'a> {
    /// Create a quoter for the given configuration
    pub fn new(config: &'a FormatConfig) -> Self {
        Self { config }
    }

    /// Quote `data` according to the quote mode.
    ///
    /// `is_numeric` marks values of numeric columns: they are never quoted in
    /// [`QuoteMode::StringsOnly`] and never get the separator replaced by the
    /// "replace separator in strings" option.
    pub fn quote<'d>(&self, data: &'d str, is_numeric: bool) -> Cow<'d, str> {
        let config = self.config;
        let replace_in_strings = config.replace_separator_in_strings() && !is_numeric;

        match config.quote_mode() {
            QuoteMode::Always => {
                let data = if replace_in_strings {
                    self.replace_separator(data)
                } else {
                    Cow::Borrowed(data)
                };
                Cow::Owned(self.replace_and_quote(&data))
            }
            QuoteMode::IfNeeded => self.quote_if_needed(data, replace_in_strings),
            QuoteMode::Replace => self.replace_separator(data),
            QuoteMode::StringsOnly => {
                if is_numeric {
                    return Cow::Borrowed(data);
                }
                let data = if config.replace_separator_in_strings() {
                    self.replace_separator(data)
                } else {
                    Cow::Borrowed(data)
                };
                Cow::Owned(self.replace_and_quote(&data))
            }
        }
    }

    /// Quote a column header token.
    ///
    /// Header names are text and follow [`quote`](Quoter::quote), except in
    /// [`QuoteMode::StringsOnly`] where they are only quoted when needed to
    /// keep the header line unambiguous.
    pub fn quote_header<'d>(&self, name: &'d str) -> Cow<'d, str> {
        match self.config.quote_mode() {
            QuoteMode::StringsOnly => {
                self.quote_if_needed(name, self.config.replace_separator_in_strings())
            }
            _ => self.quote(name, false),
        }
    }

    fn quote_if_needed<'d>(&self, data: &'d str, replace_in_strings: bool) -> Cow<'d, str> {
        let separator = self.config.separator();
        let needs_quotes = separator.is_empty()
            || data.contains(separator)
            || data == self.config.missing_pattern();

        let data = if replace_in_strings {
            self.replace_separator(data)
        } else {
            Cow::Borrowed(data)
        };
        if needs_quotes {
            Cow::Owned(self.replace_and_quote(&data))
        } else {
            data
        }
    }

    /// Put quotes around `data`, replacing every closing quote inside it.
    ///
    /// With an empty closing quote only the opening quote is prepended.
    pub fn replace_and_quote(&self, data: &str) -> String {
        let begin = self.config.quote_begin();
        let end = self.config.quote_end();

        if end.is_empty() {
            let mut result = String::with_capacity(begin.len() + data.len());
            result.push_str(begin);
            result.push_str(data);
            return result;
        }

        // str::replace scans left to right, consumes each match and never
        // rescans the replacement text.
        let body = data.replace(end, self.config.quote_replacement());
        let mut result = String::with_capacity(begin.len() + body.len() + end.len());
        result.push_str(begin);
        result.push_str(&body);
        result.push_str(end);
        result
    }

    /// Replace every occurrence of the separator with the separator
    /// replacement. An empty separator leaves the data untouched.
    pub fn replace_separator<'d>(&self, data: &'d str) -> Cow<'d, str> {
        let separator = self.config.separator();
        if separator.is_empty() || !data.contains(separator) {
            return Cow::Borrowed(data);
        }
        Cow::Owned(data.replace(separator, self.config.separator_replacement()))
    }
}

/// Replace the decimal point of `value` with `separator` if the value
/// contains exactly one `.`; otherwise it is not a plain decimal number and
/// is returned unchanged.
pub(crate) fn replace_decimal_separator(value: &str, separator: char) -> Cow<'_, str> {
    let mut dots = value.match_indices('.');
    match (dots.next(), dots.next()) {
        (Some((idx, _)), None) => {
            let mut result = String::with_capacity(value.len() + separator.len_utf8());
            result.push_str(&value[..idx]);
            result.push(separator);
            result.push_str(&value[idx + 1..]);
            Cow::Owned(result)
        }
        _ => Cow::Borrowed(value),
    }
}
