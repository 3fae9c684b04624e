//! The overview phase: every zoom below the base zoom is built by
//! downsampling the up-to-four children already written one level finer,
//! never by re-reading the source raster. Each child is pasted into its
//! quadrant of a double-size canvas at full resolution, then the whole
//! canvas is downsampled once — resampling each child separately first
//! would feed the kernel a pre-blurred input at every quadrant seam,
//! rather than one continuous source image. The bottom two children
//! (lower TMS `y`) land in the canvas's bottom half, since TMS numbers
//! rows south-to-north while pixel rows run top-to-bottom.

use mbtilegen_core::profile::TILE_SIZE;
use mbtilegen_core::{OutputConvention, ResamplingAlgorithm, TileCoord, TileFormat, TileRange};

use crate::builder::worker::{run_parallel, Disposition, Tally};
use crate::encode;
use crate::resample::{kernels, TileImage};
use crate::store::TileStore;

use mbtilegen_core::progress::ProgressSink;

pub struct OverviewPhaseConfig {
	pub z: u8,
	pub resampling: ResamplingAlgorithm,
	pub tile_format: TileFormat,
	pub output_convention: OutputConvention,
	pub jpeg_quality: u8,
	pub worker_count: usize,
	pub alpha_band: Option<u8>,
	pub band_count: u8,
	pub exclude_transparent: bool,
}

/// Child quadrant offsets into the double-size canvas, indexed to match
/// `TileCoord::children()`'s `[(2x,2y), (2x+1,2y), (2x,2y+1), (2x+1,2y+1)]`
/// order.
const QUADRANT_OFFSETS: [(u32, u32); 4] = [(0, TILE_SIZE), (TILE_SIZE, TILE_SIZE), (0, 0), (TILE_SIZE, 0)];

pub fn run(tile_range: &TileRange, config: &OverviewPhaseConfig, store: &TileStore, progress: &dyn ProgressSink) -> Tally {
	let tiles: Vec<(u32, u32)> = tile_range.iter_canonical().collect();
	run_parallel(&tiles, config.worker_count, progress, |&(tx, ty)| build_one_overview_tile(tx, ty, config, store))
}

fn build_one_overview_tile(tx: u32, ty: u32, config: &OverviewPhaseConfig, store: &TileStore) -> Disposition {
	let parent = TileCoord::new(config.z, tx, ty);
	let children = parent.children();

	let mut double_canvas = TileImage::new_filled(TILE_SIZE * 2, TILE_SIZE * 2, config.band_count, 0);
	let mut any_child = false;

	for (child, &(x_off, y_off)) in children.iter().zip(QUADRANT_OFFSETS.iter()) {
		let row = child.stored_row(config.output_convention.as_row_convention());
		let bytes = match store.get_tile(child.z, child.x, row) {
			Ok(Some(bytes)) => bytes,
			Ok(None) => continue,
			Err(_) => return Disposition::Failed,
		};
		let decoded = match encode::decode(&bytes) {
			Ok(image) => image,
			Err(_) => return Disposition::Failed,
		};
		double_canvas.paste(&decoded, x_off, y_off);
		any_child = true;
	}

	if !any_child {
		return Disposition::Skipped;
	}

	let canvas = kernels::downsample_half(&double_canvas, config.resampling);

	if config.exclude_transparent {
		if let Some(alpha_band) = config.alpha_band {
			if canvas.is_fully_transparent(alpha_band) {
				return Disposition::Skipped;
			}
		}
	}

	let bytes = match encode::encode(&canvas, config.tile_format, config.jpeg_quality) {
		Ok(bytes) => bytes,
		Err(_) => return Disposition::Failed,
	};

	let row = parent.stored_row(config.output_convention.as_row_convention());
	match store.insert_tiles(&[(config.z, tx, row, bytes)]) {
		Ok(()) => Disposition::Written,
		Err(_) => Disposition::Failed,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn quadrant_offsets_tile_the_double_canvas_without_overlap() {
		let expected: std::collections::HashSet<(u32, u32)> =
			[(0, TILE_SIZE), (TILE_SIZE, TILE_SIZE), (0, 0), (TILE_SIZE, 0)].into_iter().collect();
		let actual: std::collections::HashSet<(u32, u32)> = QUADRANT_OFFSETS.into_iter().collect();
		assert_eq!(actual, expected);
	}
}
