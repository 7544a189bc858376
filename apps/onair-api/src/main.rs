use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = onair_api::Args::parse();
	onair_api::run(args).await
}
