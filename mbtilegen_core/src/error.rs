//! The typed error taxonomy shared by every other crate.
//!
//! The builder needs to dispatch on error *kind* (fatal vs. skip-this-tile),
//! which a single `anyhow::Error` doesn't give us cheaply, so `thiserror`
//! carries that distinction down here and `anyhow::Result` takes over once
//! control reaches the CLI boundary.

use std::path::PathBuf;

use thiserror::Error;

/// The five error kinds a tiling run can fail with.
#[derive(Error, Debug)]
pub enum TileError {
	/// Missing file, zero bands, paletted input, unknown SRS, skewed
	/// geotransform, or a profile/raster conflict. User-visible, terminates
	/// the run.
	#[error("invalid input: {0}")]
	InvalidInput(String),

	/// A non-PNG/JPEG format, a non-TMS/XYZ output convention, or a bad
	/// `--zoom` range. Terminates at CLI-parse time.
	#[error("unsupported option: {0}")]
	UnsupportedOption(String),

	/// The raster library rejected a reprojection/resampling call. Logged
	/// per tile; the tile is skipped, the run continues.
	#[error("resampling failed for tile {z}/{x}/{y}: {reason}")]
	ResamplingFailed { z: u8, x: u32, y: u32, reason: String },

	/// SQLite open/schema/insert failure. Fatal to the run.
	#[error("archive error at {path}: {reason}")]
	ArchiveError { path: PathBuf, reason: String },

	/// Source raster read failure. Logged per tile; the tile is skipped.
	#[error("raster read failed for tile {z}/{x}/{y}: {reason}")]
	RasterReadError { z: u8, x: u32, y: u32, reason: String },
}

impl TileError {
	/// Whether this error kind is fatal to the whole run, as opposed to
	/// skip-this-tile-and-continue.
	pub fn is_fatal(&self) -> bool {
		matches!(
			self,
			TileError::InvalidInput(_) | TileError::UnsupportedOption(_) | TileError::ArchiveError {.. }
		)
	}
}

pub type TileResult<T> = Result<T, TileError>;
