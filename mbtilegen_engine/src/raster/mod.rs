//! The source-raster abstraction. `RasterAdapter` is the one seam between
//! GDAL and the rest of the engine — the planner and builder only ever see
//! `ProjectedRasterInfo` plus `read_window`, never a `gdal::Dataset` directly.

mod gdal_adapter;

pub use gdal_adapter::GdalRasterAdapter;

use mbtilegen_core::{ProjectedRasterInfo, TileError, TileResult};

/// One band's worth of decoded pixels read (and, for Mercator/Geodetic,
/// already warped) into an 8-bit buffer, row-major, top-down.
#[derive(Debug, Clone)]
pub struct RasterWindow {
	pub width: u32,
	pub height: u32,
	pub band_count: u8,
	/// The band holding alpha, if any — the source's own alpha band for a
	/// direct read, or a warp-synthesized coverage band for a warped read
	/// of a source with no native alpha. `None` means every band in
	/// `samples` is color/data, no transparency information at all.
	pub alpha_band: Option<u8>,
	/// Interleaved per-pixel samples: `band_count` bytes per pixel.
	pub samples: Vec<u8>,
}

impl RasterWindow {
	pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
		let idx = (y as usize * self.width as usize + x as usize) * self.band_count as usize;
		&self.samples[idx..idx + self.band_count as usize]
	}
}

impl From<RasterWindow> for crate::resample::TileImage {
	fn from(window: RasterWindow) -> Self {
		crate::resample::TileImage { width: window.width, height: window.height, band_count: window.band_count, samples: window.samples }
	}
}

/// The engine's only dependency on a concrete raster library. Implemented
/// against GDAL in production (`GdalRasterAdapter`) and against an
/// in-memory fixture in tests, so the builder's tile logic never has to
/// open a real dataset to be exercised.
pub trait RasterAdapter: Send + Sync {
	/// Metadata about the opened source raster, probed once at open time.
	fn info(&self) -> &ProjectedRasterInfo;

	/// The raster's bounding rectangle `(ominx, ominy, omaxx, omaxy)`,
	/// transformed into `target_srs` when given, or left in the raster's
	/// own pixel space (for the Raster profile) when `None`. Used by the
	/// planner to intersect each zoom's world tile range down to the tiles
	/// the raster actually covers.
	fn projected_extent(&self, target_srs: Option<&mbtilegen_core::Srs>) -> TileResult<(f64, f64, f64, f64)>;

	/// Reads (and, when `target_srs` is `Some`, warps) the rectangle
	/// `(ulx, uly, lrx, lry)` of the source's own projected space into an
	/// `out_width x out_height` buffer in `target_srs`, using
	/// `resampling` as the GDAL warp kernel. For the Raster profile,
	/// `target_srs` is `None` and the rectangle is already pixel-space.
	fn read_window(
		&self,
		ulx: f64,
		uly: f64,
		lrx: f64,
		lry: f64,
		out_width: u32,
		out_height: u32,
		target_srs: Option<&mbtilegen_core::Srs>,
		resampling: mbtilegen_core::ResamplingAlgorithm,
	) -> TileResult<RasterWindow>;
}

pub(crate) fn invalid_input(reason: impl Into<String>) -> TileError {
	TileError::InvalidInput(reason.into())
}
