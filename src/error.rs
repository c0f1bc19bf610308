use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to read spreadsheet: {0}")]
    FileRead(String),

    #[error("Failed to write spreadsheet: {0}")]
    FileWrite(String),

    #[error("Normalized column '{column}' not found. Available columns: {}", .available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("Could not auto-detect a text column. Available columns: {}", .available.join(", "))]
    ColumnNotFound { available: Vec<String> },

    #[error("Sheet '{0}' has no header row")]
    EmptySheet(String),

    #[error("DataFrame error: {0}")]
    DataFrame(String),

    #[error("Sentiment scorer error: {0}")]
    Scorer(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Normalized column names carried by the column lookup errors.
    pub fn available_columns(&self) -> Option<&[String]> {
        match self {
            AppError::MissingColumn { available, .. } => Some(available),
            AppError::ColumnNotFound { available } => Some(available),
            _ => None,
        }
    }
}

impl From<polars::error::PolarsError> for AppError {
    fn from(err: polars::error::PolarsError) -> Self {
        AppError::DataFrame(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_errors_list_available_columns() {
        let err = AppError::MissingColumn {
            column: "feedbackdescription".to_string(),
            available: vec!["id".to_string(), "comment".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Normalized column 'feedbackdescription' not found. Available columns: id, comment"
        );
        assert_eq!(err.available_columns().map(|c| c.len()), Some(2));

        let err = AppError::ColumnNotFound { available: vec!["id".to_string()] };
        assert!(err.to_string().ends_with("Available columns: id"));
    }

    #[test]
    fn other_errors_carry_no_columns() {
        assert!(AppError::Scorer("boom".into()).available_columns().is_none());
    }
}
