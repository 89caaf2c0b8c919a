use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = batas_api::Args::parse();
	batas_api::run(args).await
}
