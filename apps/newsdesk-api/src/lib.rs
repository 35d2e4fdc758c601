pub mod routes;
pub mod state;

use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use color_eyre::eyre::WrapErr;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(
	version = newsdesk_cli::VERSION,
	rename_all = "kebab",
	styles = newsdesk_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Dotenv file with search-service credentials. Defaults to `.env` in the working directory.
	#[arg(long, value_name = "FILE")]
	pub env_file: Option<PathBuf>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	load_env(args.env_file.as_deref())?;

	let config = newsdesk_config::load(&args.config)?;

	init_tracing(&config)?;

	let http_addr: SocketAddr = config.service.http_bind.parse()?;
	let state = AppState::new(config)?;
	let app = routes::router(state);
	let http_listener = TcpListener::bind(http_addr).await?;

	tracing::info!(%http_addr, "HTTP server listening.");

	axum::serve(http_listener, app).with_graceful_shutdown(shutdown_signal()).await?;

	Ok(())
}

fn load_env(path: Option<&std::path::Path>) -> color_eyre::Result<()> {
	match path {
		Some(path) => {
			dotenvy::from_path(path)
				.wrap_err_with(|| format!("Failed to load dotenv file at {}.", path.display()))?;
		},
		None => {
			dotenvy::dotenv().ok();
		},
	}

	Ok(())
}

fn init_tracing(config: &newsdesk_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();

	Ok(())
}

async fn shutdown_signal() {
	if let Err(err) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %err, "Failed to listen for shutdown signal.");
	}

	tracing::info!("Shutting down.");
}
