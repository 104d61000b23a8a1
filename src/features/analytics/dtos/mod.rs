mod analysis_dto;

pub use analysis_dto::{shape_results, AnalysisResultsDto, AnalyzeAcceptedDto};
