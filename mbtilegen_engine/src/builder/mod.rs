//! The two-phase pyramid builder: the base phase reads every tile
//! at the base zoom straight from the source raster; each zoom below it is
//! then derived purely from the tile store, one level at a time, by the
//! overview phase. `build_pyramid` is the single entry point the CLI calls.

mod base_phase;
mod overview_phase;
pub mod worker;

use std::path::Path;

use mbtilegen_core::progress::ProgressSink;
use mbtilegen_core::{RunOptions, TileError, TileResult};

use crate::metadata::write_archive_metadata;
use crate::planner::{self, PyramidPlan};
use crate::raster::{GdalRasterAdapter, RasterAdapter};
use crate::store::TileStore;
use worker::Tally;

use base_phase::{run as run_base_phase, BasePhaseConfig};
use overview_phase::{run as run_overview_phase, OverviewPhaseConfig};

/// The outcome of one full run: the base phase's tally, the combined tally
/// of every overview level, and the plan that was built against.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
	pub plan: PyramidPlan,
	pub base: Tally,
	pub overview: Tally,
}

impl BuildOutcome {
	pub fn total_written(&self) -> u64 {
		self.base.written + self.overview.written
	}

	pub fn total_failed(&self) -> u64 {
		self.base.failed + self.overview.failed
	}
}

/// Builds a complete MBTiles pyramid from `options.input_path` into
/// `options.output_path`: opens the source raster, plans
/// the zoom pyramid, runs the base phase at the native/requested max zoom,
/// then derives every coarser level from the tile store, and finally
/// writes the archive's metadata row.
pub fn build_pyramid(options: &RunOptions, progress: &dyn ProgressSink) -> TileResult<BuildOutcome> {
	options.validate()?;

	let raster = GdalRasterAdapter::open_with_overrides(
		&options.input_path,
		options.source_srs_override.as_ref(),
		options.source_nodata_override.as_deref(),
	)?;

	// `Profile::Raster`'s `native_zoom` can only be known once the source
	// raster's dimensions are in hand, so it's always recomputed here
	// rather than trusted from whatever the CLI/caller constructed.
	let profile = match options.profile {
		mbtilegen_core::Profile::Raster {.. } => {
			let info = raster.info();
			mbtilegen_core::Profile::Raster { native_zoom: mbtilegen_core::profile::raster::native_zoom_for_dimensions(info.width, info.height) }
		}
		other => other,
	};

	let target_srs = profile.target_srs();
	let extent = match target_srs.as_ref() {
		Some(srs) => Some(raster.projected_extent(Some(srs))?),
		None => None,
	};

	let plan = planner::plan(raster.info(), profile, options.zoom, extent)?;
	let base_zoom = plan.base_zoom().ok_or_else(|| TileError::InvalidInput("pyramid plan has no zoom levels".into()))?;
	let base_level = plan
		.level(base_zoom)
		.ok_or_else(|| TileError::InvalidInput(format!("plan is missing its own base zoom {base_zoom}")))?;

	let store = TileStore::open(&options.output_path, options.resume)?;

	let base_config = BasePhaseConfig {
		profile,
		base_zoom,
		resampling: options.resampling,
		tile_format: options.tile_format,
		output_convention: options.output_convention,
		jpeg_quality: options.jpeg_quality,
		worker_count: options.worker_count,
		extent,
		exclude_transparent: options.exclude_transparent,
	};
	let base_tally = run_base_phase(&raster, &base_level.tile_range, &base_config, &store, progress);

	// Tiles at the base zoom were built through `raster.read_window`, which
	// for Mercator/Geodetic warps through a synthesized alpha band whenever
	// the source has neither a native alpha band nor a band count the warp
	// leaves alone (see `ProjectedRasterInfo::warped_output_bands`); the
	// overview phase decodes those same encoded tiles back, so its canvas
	// must be built with the band count/alpha index the base phase actually
	// wrote, not the source raster's own.
	let (overview_band_count, overview_alpha_band) =
		if target_srs.is_some() { raster.info().warped_output_bands() } else { (raster.info().band_count, raster.info().alpha_band) };

	let mut overview_tally = Tally::default();
	for level in plan.levels.iter().rev().skip(1) {
		let overview_config = OverviewPhaseConfig {
			z: level.z,
			resampling: options.resampling,
			tile_format: options.tile_format,
			output_convention: options.output_convention,
			jpeg_quality: options.jpeg_quality,
			worker_count: options.worker_count,
			alpha_band: overview_alpha_band,
			band_count: overview_band_count,
			exclude_transparent: options.exclude_transparent,
		};
		let tally = run_overview_phase(&level.tile_range, &overview_config, &store, progress);
		overview_tally.written += tally.written;
		overview_tally.skipped += tally.skipped;
		overview_tally.failed += tally.failed;
	}

	// The unique index on `tiles` is built once here, after every worker
	// thread from both phases has joined, rather than up front — see
	// `TileStore::finalize`.
	store.finalize()?;

	let name = archive_name(&options.input_path);
	write_archive_metadata(&store, &name, profile, &plan, options.tile_format, extent)?;

	Ok(BuildOutcome { plan, base: base_tally, overview: overview_tally })
}

fn archive_name(input_path: &Path) -> String {
	input_path.file_stem().and_then(|s| s.to_str()).unwrap_or("tiles").to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn archive_name_uses_the_input_files_stem() {
		assert_eq!(archive_name(Path::new("/data/world.tif")), "world");
		assert_eq!(archive_name(Path::new("relative.tiff")), "relative");
	}

	#[test]
	fn total_written_sums_both_phases() {
		let outcome = BuildOutcome {
			plan: PyramidPlan { levels: vec![] },
			base: Tally { written: 5, skipped: 1, failed: 0 },
			overview: Tally { written: 2, skipped: 0, failed: 1 },
		};
		assert_eq!(outcome.total_written(), 7);
		assert_eq!(outcome.total_failed(), 1);
	}
}
