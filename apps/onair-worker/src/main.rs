use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = onair_worker::Args::parse();
	onair_worker::run(args).await
}
