//! Cuts a raw news-feed CSV export down to the columns the search index ingests.

use std::{
	fs::File,
	io::{Read, Write},
	path::PathBuf,
};

use clap::Parser;
use color_eyre::eyre::{self, WrapErr};
use tracing_subscriber::EnvFilter;

/// Output columns, in order.
pub const COLUMNS: [&str; 5] = ["pubDate", "title", "guid", "link", "description"];

#[derive(Debug, Parser)]
#[command(
	version = newsdesk_cli::VERSION,
	rename_all = "kebab",
	styles = newsdesk_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'i', value_name = "FILE")]
	pub input: PathBuf,
	#[arg(long, short = 'o', value_name = "FILE")]
	pub output: PathBuf,
	#[arg(long, value_name = "FILTER", default_value = "info")]
	pub log_level: String,
}

pub fn run(args: Args) -> color_eyre::Result<()> {
	let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let input = File::open(&args.input)
		.wrap_err_with(|| format!("Failed to open {}.", args.input.display()))?;
	let output = File::create(&args.output)
		.wrap_err_with(|| format!("Failed to create {}.", args.output.display()))?;
	let rows = reproject(input, output)?;

	tracing::info!(output = %args.output.display(), rows, "Wrote reprojected CSV.");

	Ok(())
}

/// Copies [`COLUMNS`] from `reader` to `writer`, dropping every other column. Returns the number
/// of data rows written. Rows shorter than the header yield empty values; surplus fields are
/// ignored.
pub fn reproject<R, W>(reader: R, writer: W) -> color_eyre::Result<u64>
where
	R: Read,
	W: Write,
{
	let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
	let headers = reader.headers()?.clone();
	let positions = COLUMNS
		.iter()
		.map(|column| {
			headers
				.iter()
				.position(|header| header == *column)
				.ok_or_else(|| eyre::eyre!("Input CSV is missing the '{column}' column."))
		})
		.collect::<color_eyre::Result<Vec<_>>>()?;
	let mut writer = csv::Writer::from_writer(writer);

	writer.write_record(COLUMNS)?;

	let mut rows = 0;

	for record in reader.records() {
		let record = record?;

		writer.write_record(positions.iter().map(|&position| record.get(position).unwrap_or("")))?;

		rows += 1;
	}

	writer.flush()?;

	Ok(rows)
}
