//! Error taxonomy for policy loading, assumption lookups and projection runs
//!
//! Every failure is fatal for the policy being projected: there are no retries
//! and no partial results.

use thiserror::Error;

use crate::projection::SeriesId;

/// Errors raised while loading inputs or evaluating a projection
#[derive(Error, Debug)]
pub enum ProjectionError {
    /// Escalation code outside the supported set (none, fixed, inflation-linked)
    #[error("Unsupported escalation_type: {value}")]
    UnsupportedEscalation { value: String },

    /// Named policy field does not exist
    #[error("Policy field not found: {field}")]
    MissingPolicyField { field: String },

    /// Key absent from an assumption table
    #[error("Assumption '{table}' has no entry for key '{key}'")]
    MissingAssumption { table: &'static str, key: String },

    /// Input value outside its numeric domain
    #[error("Invalid value for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// A cell was requested while it was still being computed
    #[error("Cyclic dependency detected evaluating {series} at t={t}")]
    CyclicDependency { series: SeriesId, t: usize },

    /// Time index beyond the projection horizon
    #[error("{series} requested at t={t}, beyond projection horizon {horizon}")]
    TimeOutOfRange {
        series: SeriesId,
        t: usize,
        horizon: usize,
    },

    /// Unknown series name in a by-name lookup
    #[error("Unknown series name: {0}")]
    UnknownSeries(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Field present but could not be parsed
    #[error("Could not parse {field} from '{value}'")]
    Parse { field: String, value: String },
}

impl ProjectionError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ProjectionError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(table: &'static str, key: impl ToString) -> Self {
        ProjectionError::MissingAssumption {
            table,
            key: key.to_string(),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ProjectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_escalation_names_value() {
        let err = ProjectionError::UnsupportedEscalation {
            value: "7".to_string(),
        };
        assert!(err.to_string().contains('7'));
    }

    #[test]
    fn test_missing_assumption_message() {
        let err = ProjectionError::missing("inflation_forward", 480);
        let msg = err.to_string();
        assert!(msg.contains("inflation_forward"));
        assert!(msg.contains("480"));
    }
}
