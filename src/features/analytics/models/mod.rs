mod analysis;

pub use analysis::{
    Analysis, AnalysisMetadata, ColumnSummary, ColumnType, EngineError, NumericSummary,
};
