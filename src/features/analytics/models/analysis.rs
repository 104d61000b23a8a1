use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::features::files::models::FileType;

/// Errors local to one analysis run. The orchestrator converts these into
/// a `failed` record status; they never cross a request boundary directly.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(FileType),

    /// Underlying decode error text, surfaced verbatim to the record
    #[error("{0}")]
    Parse(String),
}

/// Closed set of column data types reported in analysis metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    Text,
    Datetime,
}

impl ColumnType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }
}

/// Table-level metadata produced by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisMetadata {
    /// Column names in table order
    pub columns: Vec<String>,
    pub row_count: u64,
    pub column_count: u64,
    pub dtypes: BTreeMap<String, ColumnType>,
    /// Best-effort in-memory footprint of the loaded table in bytes
    pub estimated_size_bytes: u64,
}

/// Summary statistics over the non-null values of a numeric column.
/// Every field is None when the column holds no non-null values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NumericSummary {
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// Sample (n-1) standard deviation
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub q25: Option<f64>,
    pub q75: Option<f64>,
}

/// Per-column results. `summary` is `None` for non-numeric columns: a typed
/// "not applicable", not a missing key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ColumnSummary {
    pub dtype: ColumnType,
    /// Count of null/NaN/empty entries
    pub missing_count: u64,
    /// Count of distinct non-null values
    pub unique_count: u64,
    pub summary: Option<NumericSummary>,
}

/// Full engine output for one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Analysis {
    pub metadata: AnalysisMetadata,
    /// Keyed by column name; ordering lives in `metadata.columns`
    pub results: BTreeMap<String, ColumnSummary>,
}
