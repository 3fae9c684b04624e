//! Orchestration glue between the parsed CLI and the engine: builds
//! `RunOptions`, runs the pyramid, and logs a written/skipped/failed
//! summary.

use anyhow::{Context, Result};
use mbtilegen_core::progress::{NullProgress, ProgressSink};

use crate::cli::Cli;

pub fn run(cli: Cli) -> Result<()> {
	let options = cli.into_run_options().context("invalid command-line options")?;

	log::info!("opening {} with profile {:?}", options.input_path.display(), options.profile);

	let progress = NullProgress;
	let outcome = mbtilegen_engine::build_pyramid(&options, &progress as &dyn ProgressSink)
		.with_context(|| format!("failed to build pyramid for {}", options.input_path.display()))?;

	log::info!(
		"wrote {} tiles ({} skipped, {} failed) to {}",
		outcome.total_written(),
		outcome.base.skipped + outcome.overview.skipped,
		outcome.total_failed(),
		options.output_path.display()
	);

	if outcome.total_failed() > 0 {
		log::warn!("{} tiles failed; the archive is usable but incomplete", outcome.total_failed());
	}

	Ok(())
}
