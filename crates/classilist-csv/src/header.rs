//! Column roles of classification-result tables and the rewritten header

use std::fmt;

use classilist_core::TableSpec;
use lazy_regex::regex;
use regex::Regex;

use crate::error::{CsvError, CsvResult};

/// Header token written in front of the row keys
pub const ROW_ID_HEADER: &str = "row ID";

/// Role of a column in a classification-result table
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    /// The true class; named exactly like the class column
    ActualClass,
    /// The predicted class; named `Prediction (<class column>)`
    PredictedClass,
    /// Probability of one class; named `P (<class column>=<class>)`
    ClassProbability(String),
    /// Any other column
    Feature,
}

impl ColumnRole {
    /// The header name written for a column with this role
    pub fn header_name(&self, class_column: &str, original_name: &str) -> String {
        match self {
            ColumnRole::ActualClass => format!("A-{class_column}"),
            ColumnRole::PredictedClass => "Predicted".to_string(),
            ColumnRole::ClassProbability(class) => format!("P-{class}"),
            ColumnRole::Feature => format!("F-{original_name}"),
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRole::ActualClass => write!(f, "actual class"),
            ColumnRole::PredictedClass => write!(f, "predicted class"),
            ColumnRole::ClassProbability(class) => write!(f, "probability of '{class}'"),
            ColumnRole::Feature => write!(f, "feature"),
        }
    }
}

/// Roles of all columns of one table, derived once per write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLayout {
    class_column: String,
    predicted_index: usize,
    roles: Vec<ColumnRole>,
}

impl HeaderLayout {
    /// Name of the class column, taken from the `Prediction (...)` column
    pub fn class_column(&self) -> &str {
        &self.class_column
    }

    /// Index of the predicted-class column
    pub fn predicted_index(&self) -> usize {
        self.predicted_index
    }

    /// Roles in column order
    pub fn roles(&self) -> &[ColumnRole] {
        &self.roles
    }

    /// Rewritten header names in column order
    pub fn header_names(&self, spec: &TableSpec) -> Vec<String> {
        self.roles
            .iter()
            .zip(spec.columns())
            .map(|(role, column)| role.header_name(&self.class_column, &column.name))
            .collect()
    }
}

/// Derive the role of every column.
///
/// The class column name comes from the last column whose name matches
/// `Prediction (<class column>)`. Fails before anything is written if that
/// column is absent, if no column carries the class column name, if no
/// feature column is left, or if there is no probability column.
pub fn derive_roles(spec: &TableSpec) -> CsvResult<HeaderLayout> {
    let prediction = regex!(r"Prediction \(([^)]*)\)");

    let (predicted_index, class_column) = spec
        .columns()
        .iter()
        .enumerate()
        .rev()
        .find_map(|(i, column)| {
            prediction
                .captures(&column.name)
                .map(|caps| (i, caps[1].to_string()))
        })
        .ok_or(CsvError::PredictedColumnMissing)?;

    let probability = Regex::new(&format!(r"P \({}=([^)]*)\)", regex::escape(&class_column)))
        .map_err(|e| CsvError::InvalidSettings(e.to_string()))?;

    let roles: Vec<ColumnRole> = spec
        .columns()
        .iter()
        .enumerate()
        .map(|(i, column)| {
            if column.name == class_column {
                ColumnRole::ActualClass
            } else if i == predicted_index {
                ColumnRole::PredictedClass
            } else if let Some(caps) = probability.captures(&column.name) {
                ColumnRole::ClassProbability(caps[1].to_string())
            } else {
                ColumnRole::Feature
            }
        })
        .collect();

    if !roles.contains(&ColumnRole::ActualClass) {
        return Err(CsvError::ActualClassMissing { class_column });
    }
    if !roles.contains(&ColumnRole::Feature) {
        return Err(CsvError::NoFeatureColumns);
    }
    if !roles
        .iter()
        .any(|role| matches!(role, ColumnRole::ClassProbability(_)))
    {
        return Err(CsvError::NoProbabilityColumns { class_column });
    }

    tracing::debug!(
        class_column = %class_column,
        predicted_index,
        columns = roles.len(),
        "derived column roles"
    );

    Ok(HeaderLayout {
        class_column,
        predicted_index,
        roles,
    })
}
