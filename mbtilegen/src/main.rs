mod cli;
mod run;

use anyhow::Result;
use clap::Parser;

use cli::Cli;

fn main() -> Result<()> {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(cli.log_level_filter())
		.format_timestamp(None)
		.init();

	run::run(cli)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn help_mentions_the_positional_arguments() {
		let err = Cli::try_parse_from(["mbtilegen", "--help"]).unwrap_err().to_string();
		assert!(err.contains("input_file"));
		assert!(err.contains("output_archive"));
	}

	#[test]
	fn rejects_a_run_with_no_arguments() {
		assert!(Cli::try_parse_from(["mbtilegen"]).is_err());
	}
}
