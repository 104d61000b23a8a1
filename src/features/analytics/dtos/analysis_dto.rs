use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::files::models::{File, FileStatus};

/// Response for a successfully scheduled analysis
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalyzeAcceptedDto {
    pub message: String,
    pub file_id: Uuid,
    pub status: FileStatus,
}

/// Status-shaped analysis results response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResultsDto {
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
}

/// Map a record's current status to the client-facing response shape.
///
/// A record that was never analyzed answers 400, not 404: the file exists,
/// the client just has to trigger analysis first.
pub fn shape_results(file: &File) -> Result<AnalysisResultsDto> {
    match file.status {
        FileStatus::Uploaded => Err(AppError::BadRequest(
            "File has not been analyzed yet. Please trigger analysis first.".to_string(),
        )),
        FileStatus::Processing => Ok(AnalysisResultsDto {
            status: FileStatus::Processing,
            message: Some("Analysis is still in progress".to_string()),
            error: None,
            file_id: None,
            filename: None,
            metadata: None,
            results: None,
            processed_at: None,
        }),
        FileStatus::Failed => Ok(AnalysisResultsDto {
            status: FileStatus::Failed,
            message: None,
            error: file.error_message.clone(),
            file_id: None,
            filename: None,
            metadata: None,
            results: None,
            processed_at: None,
        }),
        FileStatus::Completed => Ok(AnalysisResultsDto {
            status: FileStatus::Completed,
            message: None,
            error: None,
            file_id: Some(file.id),
            filename: Some(file.original_filename.clone()),
            metadata: file.analysis_metadata.clone(),
            results: file.analysis_results.clone(),
            processed_at: file.processing_completed_at,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::files::models::FileType;

    fn record(status: FileStatus) -> File {
        File {
            id: Uuid::new_v4(),
            storage_name: "abc.csv".to_string(),
            original_filename: "data.csv".to_string(),
            file_path: "uploads/abc.csv".to_string(),
            file_size: 42,
            file_type: FileType::Csv,
            mime_type: Some("text/csv".to_string()),
            status,
            processing_started_at: None,
            processing_completed_at: None,
            error_message: None,
            analysis_metadata: None,
            analysis_results: None,
            column_count: None,
            row_count: None,
            is_public: false,
            is_deleted: false,
            owner_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            accessed_at: None,
        }
    }

    #[test]
    fn test_uploaded_is_not_yet_analyzed() {
        let err = shape_results(&record(FileStatus::Uploaded)).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_processing_shape_carries_no_results() {
        let dto = shape_results(&record(FileStatus::Processing)).unwrap();
        assert_eq!(dto.status, FileStatus::Processing);
        assert!(dto.results.is_none());
        assert!(dto.error.is_none());
    }

    #[test]
    fn test_failed_shape_carries_error_text() {
        let mut file = record(FileStatus::Failed);
        file.error_message = Some("could not parse CSV".to_string());

        let dto = shape_results(&file).unwrap();
        assert_eq!(dto.status, FileStatus::Failed);
        assert_eq!(dto.error.as_deref(), Some("could not parse CSV"));
        assert!(dto.results.is_none());
    }

    #[test]
    fn test_completed_shape_carries_documents() {
        let mut file = record(FileStatus::Completed);
        file.analysis_metadata = Some(serde_json::json!({"row_count": 4}));
        file.analysis_results = Some(serde_json::json!({"a": {"missing_count": 0}}));
        file.processing_completed_at = Some(Utc::now());

        let dto = shape_results(&file).unwrap();
        assert_eq!(dto.status, FileStatus::Completed);
        assert_eq!(dto.file_id, Some(file.id));
        assert_eq!(dto.filename.as_deref(), Some("data.csv"));
        assert!(dto.metadata.is_some());
        assert!(dto.results.is_some());
        assert!(dto.processed_at.is_some());
    }
}
