mod analysis_service;
pub mod engine;

pub use analysis_service::AnalysisService;
