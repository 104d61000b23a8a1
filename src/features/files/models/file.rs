use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// File processing status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "file_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Uploaded,
    Processing,
    Completed,
    Failed,
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileStatus::Uploaded => write!(f, "uploaded"),
            FileStatus::Processing => write!(f, "processing"),
            FileStatus::Completed => write!(f, "completed"),
            FileStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Declared file type, derived from the upload's extension.
/// Closed set: parsing strategies dispatch on this tag exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "file_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    Csv,
    Xlsx,
    Xls,
    Json,
    Txt,
}

impl FileType {
    /// Map a lowercase extension to a declared type
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "csv" => Some(FileType::Csv),
            "xlsx" => Some(FileType::Xlsx),
            "xls" => Some(FileType::Xls),
            "json" => Some(FileType::Json),
            "txt" => Some(FileType::Txt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Csv => "csv",
            FileType::Xlsx => "xlsx",
            FileType::Xls => "xls",
            FileType::Json => "json",
            FileType::Txt => "txt",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database model for uploaded files
#[derive(Debug, Clone, FromRow)]
pub struct File {
    pub id: Uuid,
    /// Generated unique name of the blob on disk
    pub storage_name: String,
    pub original_filename: String,
    /// Path of the blob inside the upload directory
    pub file_path: String,
    pub file_size: i64,
    pub file_type: FileType,
    pub mime_type: Option<String>,

    pub status: FileStatus,
    pub processing_started_at: Option<DateTime<Utc>>,
    pub processing_completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,

    pub analysis_metadata: Option<serde_json::Value>,
    pub analysis_results: Option<serde_json::Value>,
    pub column_count: Option<i32>,
    pub row_count: Option<i64>,

    pub is_public: bool,
    pub is_deleted: bool,

    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub accessed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_from_extension() {
        assert_eq!(FileType::from_extension("csv"), Some(FileType::Csv));
        assert_eq!(FileType::from_extension("xlsx"), Some(FileType::Xlsx));
        assert_eq!(FileType::from_extension("xls"), Some(FileType::Xls));
        assert_eq!(FileType::from_extension("json"), Some(FileType::Json));
        assert_eq!(FileType::from_extension("txt"), Some(FileType::Txt));
        assert_eq!(FileType::from_extension("parquet"), None);
        assert_eq!(FileType::from_extension(""), None);
    }

    #[test]
    fn test_status_display_matches_wire_format() {
        assert_eq!(FileStatus::Uploaded.to_string(), "uploaded");
        assert_eq!(FileStatus::Processing.to_string(), "processing");
        assert_eq!(FileStatus::Completed.to_string(), "completed");
        assert_eq!(FileStatus::Failed.to_string(), "failed");
    }
}
