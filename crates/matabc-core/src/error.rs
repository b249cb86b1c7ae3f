use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum MatAbcError {
    #[error("failed to read table: {0}")]
    TableRead(String),

    #[error("unsupported input format '{0}'. Expected .csv or .xlsx")]
    UnsupportedFormat(String),

    #[error("sheet '{sheet}' not found. Available: {available}")]
    SheetNotFound { sheet: String, available: String },

    #[error("column '{column}' not found in table headers ({headers})")]
    MissingColumn { column: String, headers: String },

    #[error("failed to load rule set from {path}: {reason}")]
    RulesetLoad { path: PathBuf, reason: String },

    #[error("failed to write output: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Failure to evaluate rules against a single record.
///
/// Never escapes the classifier: the record is labelled
/// [`Category::Error`](crate::model::Category::Error) and the batch continues.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    #[error("row {row}: {field} cell holds spreadsheet error '{code}'")]
    CellError {
        row: usize,
        field: &'static str,
        code: String,
    },
}
