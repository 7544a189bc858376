use std::time::Duration;

use tokio::time as tokio_time;

use onair_service::RecommendService;

pub struct WorkerState {
	pub service: RecommendService,
	pub poll_interval_ms: u64,
}

/// Fills in missing corner embeddings on a timer. Each pass is idempotent;
/// corners that already carry a vector are skipped, so a crash mid-pass just
/// means the next tick picks up the remainder.
pub async fn run_worker(state: WorkerState) -> color_eyre::Result<()> {
	loop {
		match state.service.refresh_missing_embeddings().await {
			Ok(report) if report.total > 0 => {
				tracing::info!(
					total = report.total,
					updated = report.updated,
					failed = report.failed,
					"Embedding refresh pass finished.",
				);
			},
			Ok(_) => {},
			Err(err) => {
				tracing::error!(error = %err, "Embedding refresh pass failed.");
			},
		}

		tokio_time::sleep(Duration::from_millis(state.poll_interval_ms)).await;
	}
}
