pub mod worker;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use onair_service::RecommendService;
use onair_storage::db::Db;

#[derive(Debug, Parser)]
#[command(
	version = onair_cli::VERSION,
	rename_all = "kebab",
	styles = onair_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: std::path::PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = onair_config::load(&args.config)?;
	let filter = EnvFilter::new(config.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema(config.providers.embedding.dimensions).await?;

	let poll_interval_ms = config.worker.poll_interval_ms;
	let service = RecommendService::new(config, db);
	let state = worker::WorkerState { service, poll_interval_ms };

	worker::run_worker(state).await
}
