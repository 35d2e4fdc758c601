use clap::Parser;

fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = newsdesk_reproject::Args::parse();
	newsdesk_reproject::run(args)
}
