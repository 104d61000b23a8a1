use std::path::PathBuf;
use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::Result;
use crate::features::analytics::models::Analysis;
use crate::features::analytics::services::{engine, AnalysisService};
use crate::features::files::models::File;
use crate::features::users::services::UserService;

/// Fire-and-forget orchestrator for analysis runs.
///
/// The triggering endpoint claims the record and hands it here; one
/// background task then carries the run to a terminal status. The engine
/// call is synchronous table parsing, so it runs on the blocking pool.
pub struct AnalysisRunner {
    analysis_service: Arc<AnalysisService>,
    user_service: Arc<UserService>,
}

/// Terminal outcome of one run, pending persistence
enum Terminal<'a> {
    Completed(&'a Analysis),
    Failed(&'a str),
}

impl AnalysisRunner {
    pub fn new(analysis_service: Arc<AnalysisService>, user_service: Arc<UserService>) -> Self {
        Self {
            analysis_service,
            user_service,
        }
    }

    /// Spawn the background task for a claimed record and return immediately
    pub fn spawn(self: &Arc<Self>, file: File) {
        let runner = Arc::clone(self);
        tokio::spawn(async move {
            runner.run(file).await;
        });
    }

    async fn run(&self, file: File) {
        let file_id = file.id;
        let owner_id = file.owner_id;
        let declared_type = file.file_type;
        let path = PathBuf::from(&file.file_path);

        tracing::info!(
            "Analysis started: file={}, type={}, path={}",
            file_id,
            declared_type,
            file.file_path
        );

        let outcome =
            tokio::task::spawn_blocking(move || engine::analyze(&path, declared_type)).await;

        match outcome {
            Ok(Ok(analysis)) => {
                if self.persist(file_id, Terminal::Completed(&analysis)).await {
                    // Counter bump is best-effort; a miss skews bookkeeping,
                    // not the record itself.
                    if let Err(e) = self.user_service.increment_analysis_count(owner_id).await {
                        tracing::error!(
                            "Failed to bump analysis counter for user {}: {:?}",
                            owner_id,
                            e
                        );
                    }
                }
            }
            Ok(Err(engine_error)) => {
                let message = engine_error.to_string();
                self.persist(file_id, Terminal::Failed(&message)).await;
            }
            Err(join_error) => {
                let message = format!("analysis task aborted: {}", join_error);
                self.persist(file_id, Terminal::Failed(&message)).await;
            }
        }
    }

    /// Write the terminal status, retrying once. If the store stays
    /// unreachable the record is left in processing and the failure logged.
    async fn persist(&self, file_id: Uuid, outcome: Terminal<'_>) -> bool {
        match self.write(file_id, &outcome).await {
            Ok(()) => true,
            Err(first) => {
                tracing::error!("Analysis persistence failed, retrying once: {:?}", first);
                match self.write(file_id, &outcome).await {
                    Ok(()) => true,
                    Err(second) => {
                        tracing::error!(
                            "Analysis persistence failed twice, record left in processing: {:?}",
                            second
                        );
                        false
                    }
                }
            }
        }
    }

    async fn write(&self, file_id: Uuid, outcome: &Terminal<'_>) -> Result<()> {
        match outcome {
            Terminal::Completed(analysis) => {
                self.analysis_service.mark_completed(file_id, analysis).await
            }
            Terminal::Failed(message) => self.analysis_service.mark_failed(file_id, message).await,
        }
    }
}
