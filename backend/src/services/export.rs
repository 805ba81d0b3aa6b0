//! Plan exports: PDF document and read-aloud text

use crate::error::ApiError;
use crate::services::PlanService;
use crate::state::AppState;
use fitness_coach_shared::pdf::export_pdf;
use fitness_coach_shared::render::{narration, Tab};
use fitness_coach_shared::types::NarrationResponse;
use tracing::debug;
use uuid::Uuid;

pub struct ExportService;

impl ExportService {
    /// PDF bytes of the current plan
    pub async fn pdf(state: &AppState, account_id: Uuid) -> Result<Vec<u8>, ApiError> {
        let stored = PlanService::current(state, account_id).await?;
        // Layout is pure CPU work proportional to plan size
        let bytes = tokio::task::spawn_blocking(move || export_pdf(&stored.plan))
            .await
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("PDF export task failed: {}", e)))?;
        debug!(account_id = %account_id, bytes = bytes.len(), "Exported plan PDF");
        Ok(bytes)
    }

    pub async fn narration(
        state: &AppState,
        account_id: Uuid,
        view: Tab,
    ) -> Result<NarrationResponse, ApiError> {
        let stored = PlanService::current(state, account_id).await?;
        Ok(NarrationResponse {
            view,
            text: narration(&stored.plan, view),
        })
    }
}
