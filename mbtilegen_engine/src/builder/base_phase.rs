//! The base phase: for each tile at the base zoom, warp (or window-
//! read, for the Raster profile) the source raster directly into a 256px
//! tile and write it to the archive. Every tile at this zoom is built
//! straight from the source data; the overview phase handles every zoom
//! below it by compositing children instead.

use mbtilegen_core::profile::TILE_SIZE;
use mbtilegen_core::{GeoTransform, Profile, TileCoord, TileRange};

use crate::builder::worker::{run_parallel, Disposition, Tally};
use crate::encode;
use crate::query;
use crate::raster::RasterAdapter;
use crate::resample::TileImage;
use crate::store::TileStore;

use mbtilegen_core::progress::ProgressSink;
use mbtilegen_core::{OutputConvention, ResamplingAlgorithm, TileFormat};

pub struct BasePhaseConfig {
	pub profile: Profile,
	pub base_zoom: u8,
	pub resampling: ResamplingAlgorithm,
	pub tile_format: TileFormat,
	pub output_convention: OutputConvention,
	pub jpeg_quality: u8,
	pub worker_count: usize,
	pub extent: Option<(f64, f64, f64, f64)>,
	pub exclude_transparent: bool,
}

pub fn run(raster: &dyn RasterAdapter, tile_range: &TileRange, config: &BasePhaseConfig, store: &TileStore, progress: &dyn ProgressSink) -> Tally {
	let tiles: Vec<(u32, u32)> = tile_range.iter_canonical().collect();
	let target_srs = config.profile.target_srs();

	run_parallel(&tiles, config.worker_count, progress, |&(tx, ty)| {
		build_one_tile(raster, tx, ty, config, target_srs.as_ref(), store)
	})
}

fn build_one_tile(
	raster: &dyn RasterAdapter,
	tx: u32,
	ty: u32,
	config: &BasePhaseConfig,
	target_srs: Option<&mbtilegen_core::Srs>,
	store: &TileStore,
) -> Disposition {
	let bounds = config.profile.tile_bounds(config.base_zoom, tx, ty);

	let image = match config.profile {
		Profile::Raster {.. } => read_raster_profile_tile(raster, bounds, config),
		_ => match (config.extent, target_srs) {
			(Some(extent), Some(srs)) => read_projected_tile(raster, bounds, extent, srs, config),
			_ => {
				let (minx, miny, maxx, maxy) = bounds;
				raster.read_window(minx, maxy, maxx, miny, TILE_SIZE, TILE_SIZE, target_srs, config.resampling)
			}
		},
	};

	let window = match image {
		Ok(window) => window,
		Err(_) => return Disposition::Failed,
	};

	let alpha_band = window.alpha_band;
	let tile_image: TileImage = window.into();
	if config.exclude_transparent {
		if let Some(alpha_band) = alpha_band {
			if tile_image.is_fully_transparent(alpha_band) {
				return Disposition::Skipped;
			}
		}
	}

	let bytes = match encode::encode(&tile_image, config.tile_format, config.jpeg_quality) {
		Ok(bytes) => bytes,
		Err(_) => return Disposition::Failed,
	};

	let coord = TileCoord::new(config.base_zoom, tx, ty);
	let row = coord.stored_row(config.output_convention.as_row_convention());
	match store.insert_tiles(&[(config.base_zoom, tx, row, bytes)]) {
		Ok(()) => Disposition::Written,
		Err(_) => Disposition::Failed,
	}
}

/// Maps the tile's pixel-space rectangle onto the raster via
/// `query::geo_query`, reading only the part that actually overlaps the
/// raster and placing it at the matching offset in a full `TILE_SIZE`
/// canvas. `geo_query` expects a north-up, y-increases-upward rectangle,
/// so the row-down tile bounds are flipped into that convention through a
/// synthetic identity geotransform before the call; the result's
/// `read_x`/`read_y` come back already in row-down pixel space, so no
/// un-flipping is needed on the way out.
fn read_raster_profile_tile(
	raster: &dyn RasterAdapter,
	bounds: (f64, f64, f64, f64),
	config: &BasePhaseConfig,
) -> Result<crate::raster::RasterWindow, mbtilegen_core::TileError> {
	let (left, top, right, bottom) = bounds;
	let info = raster.info();
	let height = info.height as f64;

	let identity = GeoTransform::new(0.0, 1.0, 0.0, height, 0.0, -1.0)?;
	let synthetic = mbtilegen_core::ProjectedRasterInfo { geotransform: identity,..info.clone() };

	let query = query::geo_query(&synthetic, left, height - top, right, height - bottom, TILE_SIZE).ok_or_else(|| {
		mbtilegen_core::TileError::ResamplingFailed { z: config.base_zoom, x: 0, y: 0, reason: "tile rectangle does not overlap the raster".into() }
	})?;

	let window = raster.read_window(
		query.read_x as f64,
		query.read_y as f64,
		(query.read_x + query.read_width) as f64,
		(query.read_y + query.read_height) as f64,
		query.write_width,
		query.write_height,
		None,
		config.resampling,
	)?;

	pad_into_tile(window, &query)
}

/// Same clip-then-pad shape as `read_raster_profile_tile`, but for the
/// Mercator/Geodetic profiles: `geo_query` runs against a synthetic raster
/// whose "pixel grid" is just the source's own projected extent at 1
/// target-SRS-unit resolution, since what's needed here is the same
/// overlap/clip arithmetic, not the source's real pixel alignment. The
/// clipped sub-rectangle is converted back into projected coordinates for
/// the actual warp, so GDAL only ever warps the part of the tile that can
/// land on real source pixels.
fn read_projected_tile(
	raster: &dyn RasterAdapter,
	bounds: (f64, f64, f64, f64),
	extent: (f64, f64, f64, f64),
	target_srs: &mbtilegen_core::Srs,
	config: &BasePhaseConfig,
) -> Result<crate::raster::RasterWindow, mbtilegen_core::TileError> {
	let (left, top, right, bottom) = bounds;
	let (ominx, ominy, omaxx, omaxy) = extent;

	let extent_width = (omaxx - ominx).max(1.0);
	let extent_height = (omaxy - ominy).max(1.0);
	let identity = GeoTransform::new(ominx, 1.0, 0.0, omaxy, 0.0, -1.0)?;
	let synthetic = mbtilegen_core::ProjectedRasterInfo {
		width: extent_width.ceil() as u32,
		height: extent_height.ceil() as u32,
		band_count: raster.info().band_count,
		alpha_band: None,
		geotransform: identity,
		srs: target_srs.clone(),
		nodata_values: vec![],
	};

	let query = query::geo_query(&synthetic, left, top, right, bottom, TILE_SIZE).ok_or_else(|| {
		mbtilegen_core::TileError::ResamplingFailed { z: config.base_zoom, x: 0, y: 0, reason: "tile rectangle does not overlap the raster".into() }
	})?;

	let read_ulx = ominx + query.read_x as f64;
	let read_uly = omaxy - query.read_y as f64;
	let read_lrx = read_ulx + query.read_width as f64;
	let read_lry = read_uly - query.read_height as f64;

	let window = raster.read_window(
		read_ulx,
		read_uly,
		read_lrx,
		read_lry,
		query.write_width,
		query.write_height,
		Some(target_srs),
		config.resampling,
	)?;

	pad_into_tile(window, &query)
}

/// Places `window` (already sized to `query.write_width`x`query.write_height`)
/// at `(query.write_x, query.write_y)` inside a full `TILE_SIZE` canvas,
/// leaving the rest at zero. Returns `window` unchanged when it already
/// covers the whole tile, the common case.
fn pad_into_tile(window: crate::raster::RasterWindow, query: &query::GeoQuery) -> Result<crate::raster::RasterWindow, mbtilegen_core::TileError> {
	if query.write_x == 0 && query.write_y == 0 && query.write_width == TILE_SIZE && query.write_height == TILE_SIZE {
		return Ok(window);
	}

	let mut padded = crate::raster::RasterWindow {
		width: TILE_SIZE,
		height: TILE_SIZE,
		band_count: window.band_count,
		alpha_band: window.alpha_band,
		samples: vec![0; (TILE_SIZE * TILE_SIZE) as usize * window.band_count as usize],
	};
	for y in 0..window.height.min(TILE_SIZE - query.write_y) {
		for x in 0..window.width.min(TILE_SIZE - query.write_x) {
			let pixel = window.pixel(x, y).to_vec();
			let dst_x = query.write_x + x;
			let dst_y = query.write_y + y;
			let idx = (dst_y as usize * TILE_SIZE as usize + dst_x as usize) * window.band_count as usize;
			padded.samples[idx..idx + window.band_count as usize].copy_from_slice(&pixel);
		}
	}
	Ok(padded)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::raster::RasterWindow;
	use mbtilegen_core::progress::NullProgress;
	use mbtilegen_core::{GeoTransform, ProjectedRasterInfo, Srs, TileRange};

	/// A raster fixture that fills every read with a flat value equal to its
	/// own width, letting tests tell a clipped read apart from a full one.
	struct FlatRaster {
		info: ProjectedRasterInfo,
	}

	impl FlatRaster {
		fn new(width: u32, height: u32) -> Self {
			let info = ProjectedRasterInfo {
				width,
				height,
				band_count: 4,
				alpha_band: Some(4),
				geotransform: GeoTransform::new(0.0, 1.0, 0.0, height as f64, 0.0, -1.0).unwrap(),
				srs: Srs::web_mercator(),
				nodata_values: vec![],
			};
			FlatRaster { info }
		}
	}

	impl RasterAdapter for FlatRaster {
		fn info(&self) -> &ProjectedRasterInfo {
			&self.info
		}

		fn projected_extent(&self, _target_srs: Option<&Srs>) -> mbtilegen_core::TileResult<(f64, f64, f64, f64)> {
			Ok(self.info.extent())
		}

		fn read_window(
			&self,
			_ulx: f64,
			_uly: f64,
			_lrx: f64,
			_lry: f64,
			out_width: u32,
			out_height: u32,
			_target_srs: Option<&Srs>,
			_resampling: ResamplingAlgorithm,
		) -> mbtilegen_core::TileResult<RasterWindow> {
			Ok(RasterWindow {
				width: out_width,
				height: out_height,
				band_count: self.info.band_count,
				alpha_band: self.info.alpha_band,
				samples: vec![200; (out_width * out_height) as usize * self.info.band_count as usize],
			})
		}
	}

	fn config(profile: Profile) -> BasePhaseConfig {
		BasePhaseConfig {
			profile,
			base_zoom: 0,
			resampling: ResamplingAlgorithm::Average,
			tile_format: TileFormat::Png,
			output_convention: OutputConvention::Tms,
			jpeg_quality: 85,
			worker_count: 1,
			extent: None,
			exclude_transparent: false,
		}
	}

	#[test]
	fn raster_profile_tile_fully_inside_raster_needs_no_padding() {
		let raster = FlatRaster::new(256, 256);
		let config = config(Profile::Raster { native_zoom: 0 });
		let window = read_raster_profile_tile(&raster, (0.0, 0.0, 256.0, 256.0), &config).unwrap();
		assert_eq!(window.width, TILE_SIZE);
		assert_eq!(window.height, TILE_SIZE);
		assert_eq!(window.pixel(0, 0)[0], 200);
	}

	#[test]
	fn raster_profile_tile_clipped_at_bottom_right_is_padded_with_zero() {
		// a 300x300 raster at native zoom 1 has tsize(0) = 512, so the single
		// zoom-0 tile's bounds (0,0,512,512) overflow the raster on both axes.
		let raster = FlatRaster::new(300, 300);
		let config = config(Profile::Raster { native_zoom: 1 });
		let window = read_raster_profile_tile(&raster, (0.0, 0.0, 512.0, 512.0), &config).unwrap();
		assert_eq!(window.width, TILE_SIZE);
		assert_eq!(window.height, TILE_SIZE);
		// the read only covered a fraction of the tile; anything beyond that
		// fraction was never written by read_window and stays at the fill value.
		let far_corner = window.pixel(TILE_SIZE as u32 - 1, TILE_SIZE as u32 - 1);
		assert_eq!(far_corner[0], 0);
	}

	#[test]
	fn projected_tile_overlapping_extent_needs_no_padding() {
		let raster = FlatRaster::new(256, 256);
		let config = config(Profile::Mercator);
		let extent = (0.0, 0.0, 256.0, 256.0);
		let window = read_projected_tile(&raster, (0.0, 256.0, 256.0, 0.0), extent, &Srs::web_mercator(), &config).unwrap();
		assert_eq!(window.width, TILE_SIZE);
		assert_eq!(window.height, TILE_SIZE);
		assert_eq!(window.pixel(0, 0)[0], 200);
	}

	#[test]
	fn projected_tile_outside_extent_is_an_error() {
		let raster = FlatRaster::new(256, 256);
		let config = config(Profile::Mercator);
		let extent = (0.0, 0.0, 256.0, 256.0);
		assert!(read_projected_tile(&raster, (1000.0, 1256.0, 1256.0, 1000.0), extent, &Srs::web_mercator(), &config).is_err());
	}

	#[test]
	fn run_writes_one_tile_per_entry_in_the_range() {
		let dir = tempfile::tempdir().unwrap();
		let store = TileStore::open(&dir.path().join("t.mbtiles"), false).unwrap();
		let raster = FlatRaster::new(256, 256);
		let config = config(Profile::Raster { native_zoom: 0 });
		let range = TileRange::new(0, 0, 0, 0);
		let progress = NullProgress;
		let tally = run(&raster, &range, &config, &store, &progress);
		assert_eq!(tally.written, 1);
		assert!(store.has_tile(0, 0, 0).unwrap());
	}
}
