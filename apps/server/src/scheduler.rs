//! Background revaluation of the resident working set.

use std::sync::Arc;
use tokio::time::Duration;
use tracing::info;

use crate::main_lib::AppState;

/// Starts periodic revaluation at the configured period.
pub fn start_revaluation_scheduler(state: &Arc<AppState>, period: Duration) {
    info!(
        "Revaluation scheduler started ({}s interval)",
        period.as_secs()
    );
    state.coordinator.start_revaluation(period);
}

/// Stops the revaluation task and waits for it to finish.
pub async fn stop_revaluation_scheduler(state: &Arc<AppState>) {
    state.coordinator.stop_revaluation().await;
    info!("Revaluation scheduler stopped");
}
