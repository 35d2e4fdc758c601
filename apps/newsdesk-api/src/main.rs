use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = newsdesk_api::Args::parse();

	newsdesk_api::run(args).await
}
