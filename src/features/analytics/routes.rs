use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::analytics::handlers::{analyze_file, get_analysis_results};
use crate::features::analytics::services::AnalysisService;
use crate::features::analytics::workers::AnalysisRunner;
use crate::features::files::services::FileService;

/// Shared state for analytics handlers
#[derive(Clone)]
pub struct AnalyticsState {
    pub analysis_service: Arc<AnalysisService>,
    pub file_service: Arc<FileService>,
    pub runner: Arc<AnalysisRunner>,
}

/// Create routes for the analytics feature
pub fn routes(
    analysis_service: Arc<AnalysisService>,
    file_service: Arc<FileService>,
    runner: Arc<AnalysisRunner>,
) -> Router {
    Router::new()
        .route("/api/analytics/analyze/{file_id}", post(analyze_file))
        .route("/api/analytics/results/{file_id}", get(get_analysis_results))
        .with_state(AnalyticsState {
            analysis_service,
            file_service,
            runner,
        })
}
