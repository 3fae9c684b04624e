//! The command-line surface, a `clap::Parser` derive mirroring
//! the external interface table flag for flag. `Cli::into_run_options`
//! does every bit of flag-level validation before any I/O happens,
//! handing the engine a `RunOptions` it never has to re-check.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};

use mbtilegen_core::{OutputConvention, Profile, ResamplingAlgorithm, RunOptions, Srs, TileFormat, ZoomRange};

/// Converts a georeferenced raster into a tile pyramid stored in a single
/// MBTiles-compatible SQLite archive.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
	/// source raster to tile
	input_file: PathBuf,

	/// MBTiles archive to write
	output_archive: PathBuf,

	/// tiling profile
	#[arg(short, long, value_name = "PROFILE", default_value = "mercator", display_order = 1)]
	profile: String,

	/// resampling kernel used by the base phase and, for `antialias`, by the overview phase
	#[arg(short, long, value_name = "ALGORITHM", default_value = "average", display_order = 1)]
	resampling: String,

	/// override the source SRS (EPSG code or WKT) for rasters with missing or wrong georeferencing
	#[arg(short = 's', long = "s_srs", value_name = "SRS", display_order = 2)]
	s_srs: Option<String>,

	/// explicit zoom range, e.g. "2-14" or a single zoom "9"
	#[arg(short, long, value_name = "MIN[-MAX]", display_order = 2)]
	zoom: Option<String>,

	/// skip tiles already present in the output archive
	#[arg(short = 'e', long, display_order = 3)]
	resume: bool,

	/// override NODATA, one value per band or a single value broadcast to every band
	#[arg(short = 'a', long = "srcnodata", value_name = "V[,V…]", display_order = 2)]
	srcnodata: Option<String>,

	/// number of worker threads, default is the number of logical CPUs
	#[arg(long, value_name = "N", display_order = 3)]
	processes: Option<usize>,

	/// output tile encoding
	#[arg(short, long, value_name = "PNG|JPEG", default_value = "PNG", display_order = 1)]
	format: String,

	/// tile_row indexing convention written to the archive
	#[arg(short, long, value_name = "tms|xyz", default_value = "xyz", display_order = 1)]
	output: String,

	/// skip fully-transparent tiles instead of writing them to the archive
	#[arg(long, display_order = 3)]
	exclude_transparent: bool,

	/// JPEG quality, 0-100 (ignored for PNG output)
	#[arg(long, value_name = "0-100", default_value_t = 85, display_order = 3)]
	jpeg_quality: u8,

	#[command(flatten)]
	verbose: Verbosity<WarnLevel>,
}

impl Cli {
	pub fn log_level_filter(&self) -> log::LevelFilter {
		self.verbose.log_level_filter()
	}

	/// Validates every flag and turns this `Cli` into the engine's
	/// `RunOptions`, failing fast on anything the CLI layer can catch
	/// without touching the filesystem.
	pub fn into_run_options(self) -> Result<RunOptions> {
		let profile = parse_profile(&self.profile)?;
		let resampling = ResamplingAlgorithm::parse(&self.resampling).context("invalid --resampling")?;
		let tile_format = TileFormat::parse(&self.format).context("invalid --format")?;
		let output_convention = OutputConvention::parse(&self.output).context("invalid --output")?;
		let zoom = self.zoom.as_deref().map(ZoomRange::parse).transpose().context("invalid --zoom")?;
		let source_srs_override = self.s_srs.as_deref().map(|raw| Srs::from_canonical_wkt(raw.to_string()));
		let source_nodata_override = self.srcnodata.as_deref().map(parse_nodata).transpose()?;
		let worker_count = mbtilegen_core::concurrency::resolve_worker_count(self.processes);

		let options = RunOptions {
			input_path: self.input_file,
			output_path: self.output_archive,
			profile,
			zoom,
			resampling,
			tile_format,
			output_convention,
			worker_count,
			jpeg_quality: self.jpeg_quality,
			exclude_transparent: self.exclude_transparent,
			resume: self.resume,
			source_srs_override,
			source_nodata_override,
		};
		options.validate()?;
		Ok(options)
	}
}

/// `Profile::Raster`'s `native_zoom` field can't be known until the source
/// raster is opened, so the CLI constructs a zero placeholder here; the
/// engine recomputes it from the opened raster's dimensions before
/// planning the pyramid.
fn parse_profile(raw: &str) -> Result<Profile> {
	match raw.to_ascii_lowercase().as_str() {
		"mercator" => Ok(Profile::Mercator),
		"geodetic" => Ok(Profile::Geodetic),
		"raster" => Ok(Profile::Raster { native_zoom: 0 }),
		other => anyhow::bail!("unsupported profile: {other}"),
	}
}

fn parse_nodata(raw: &str) -> Result<Vec<f64>> {
	raw.split(',')
		.map(|part| part.trim().parse::<f64>().with_context(|| format!("invalid --srcnodata value: {part}")))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_minimal_invocation() {
		let cli = Cli::try_parse_from(["mbtilegen", "in.tif", "out.mbtiles"]).unwrap();
		assert_eq!(cli.input_file, PathBuf::from("in.tif"));
		assert_eq!(cli.output_archive, PathBuf::from("out.mbtiles"));
		assert_eq!(cli.profile, "mercator");
		assert_eq!(cli.output, "xyz");
	}

	#[test]
	fn parse_nodata_broadcasts_a_single_value() {
		assert_eq!(parse_nodata("0").unwrap(), vec![0.0]);
		assert_eq!(parse_nodata("0,255,255").unwrap(), vec![0.0, 255.0, 255.0]);
		assert!(parse_nodata("abc").is_err());
	}

	#[test]
	fn rejects_unknown_profile() {
		assert!(parse_profile("webmercator").is_err());
	}
}
