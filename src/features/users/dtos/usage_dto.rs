use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Quota and usage counters for the current user
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UsageResponseDto {
    pub storage_used_bytes: i64,
    pub storage_quota_bytes: i64,
    pub storage_remaining_bytes: i64,
    pub file_count: i64,
    pub analysis_count: i64,
}
