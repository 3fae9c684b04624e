//! The validated run configuration: everything `mbtilegen_engine`
//! needs to plan and build a pyramid, assembled and checked once at CLI
//! boundary time so the engine never has to re-validate an option it's
//! already holding.

use std::path::PathBuf;

use crate::error::{TileError, TileResult};
use crate::profile::Profile;
use crate::types::Srs;

/// Output tile encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileFormat {
	Png,
	Jpeg,
}

impl TileFormat {
	pub fn parse(raw: &str) -> TileResult<Self> {
		match raw.to_ascii_lowercase().as_str() {
			"png" => Ok(TileFormat::Png),
			"jpeg" | "jpg" => Ok(TileFormat::Jpeg),
			other => Err(TileError::UnsupportedOption(format!("unsupported tile format: {other}"))),
		}
	}

	pub fn extension(&self) -> &'static str {
		match self {
			TileFormat::Png => "png",
			TileFormat::Jpeg => "jpg",
		}
	}

	pub fn mime_type(&self) -> &'static str {
		match self {
			TileFormat::Png => "image/png",
			TileFormat::Jpeg => "image/jpeg",
		}
	}
}

/// Row-index convention the archive is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputConvention {
	Tms,
	Xyz,
}

impl OutputConvention {
	pub fn parse(raw: &str) -> TileResult<Self> {
		match raw.to_ascii_lowercase().as_str() {
			"tms" => Ok(OutputConvention::Tms),
			"xyz" => Ok(OutputConvention::Xyz),
			other => Err(TileError::UnsupportedOption(format!("unsupported output convention: {other}"))),
		}
	}

	pub fn as_row_convention(&self) -> crate::types::RowConvention {
		match self {
			OutputConvention::Tms => crate::types::RowConvention::Tms,
			OutputConvention::Xyz => crate::types::RowConvention::Xyz,
		}
	}
}

/// Resampling kernel used both for the base-phase warp and the
/// overview-phase downsample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResamplingAlgorithm {
	NearestNeighbour,
	Average,
	Bilinear,
	Cubic,
	CubicSpline,
	Lanczos,
	Antialias,
}

impl ResamplingAlgorithm {
	pub fn parse(raw: &str) -> TileResult<Self> {
		match raw.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
			"nearest" | "nearestneighbour" | "nearestneighbor" => Ok(ResamplingAlgorithm::NearestNeighbour),
			"average" => Ok(ResamplingAlgorithm::Average),
			"bilinear" => Ok(ResamplingAlgorithm::Bilinear),
			"cubic" => Ok(ResamplingAlgorithm::Cubic),
			"cubicspline" => Ok(ResamplingAlgorithm::CubicSpline),
			"lanczos" => Ok(ResamplingAlgorithm::Lanczos),
			"antialias" => Ok(ResamplingAlgorithm::Antialias),
			other => Err(TileError::UnsupportedOption(format!("unsupported resampling algorithm: {other}"))),
		}
	}

	/// Whether this kernel is only valid for the overview phase.
	pub fn overview_only(&self) -> bool {
		matches!(self, ResamplingAlgorithm::Antialias)
	}
}

/// An inclusive zoom range, validated against the profile's reachable zoom
/// span at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomRange {
	pub min: u8,
	pub max: u8,
}

impl ZoomRange {
	pub fn new(min: u8, max: u8) -> TileResult<Self> {
		if min > max {
			return Err(TileError::UnsupportedOption(format!(
				"zoom range minimum {min} is greater than maximum {max}"
			)));
		}
		Ok(ZoomRange { min, max })
	}

	/// Parses the CLI's `"<min>-<max>"` or bare `"<z>"` zoom syntax.
	pub fn parse(raw: &str) -> TileResult<Self> {
		match raw.split_once('-') {
			Some((lo, hi)) => {
				let min = lo
					.trim()
					.parse::<u8>()
					.map_err(|_| TileError::UnsupportedOption(format!("invalid zoom range: {raw}")))?;
				let max = hi
					.trim()
					.parse::<u8>()
					.map_err(|_| TileError::UnsupportedOption(format!("invalid zoom range: {raw}")))?;
				ZoomRange::new(min, max)
			}
			None => {
				let z = raw
					.trim()
					.parse::<u8>()
					.map_err(|_| TileError::UnsupportedOption(format!("invalid zoom range: {raw}")))?;
				ZoomRange::new(z, z)
			}
		}
	}

	pub fn contains(&self, z: u8) -> bool {
		(self.min..=self.max).contains(&z)
	}

	pub fn iter(&self) -> impl DoubleEndedIterator<Item = u8> {
		self.min..=self.max
	}
}

/// The fully validated, immutable configuration for a single tiling run
///, built once by the CLI layer and handed down to
/// `mbtilegen_engine::builder` unchanged.
#[derive(Debug, Clone)]
pub struct RunOptions {
	pub input_path: PathBuf,
	pub output_path: PathBuf,
	pub profile: Profile,
	pub zoom: Option<ZoomRange>,
	pub resampling: ResamplingAlgorithm,
	pub tile_format: TileFormat,
	pub output_convention: OutputConvention,
	pub worker_count: usize,
	pub jpeg_quality: u8,
	pub exclude_transparent: bool,
	pub resume: bool,
	pub source_srs_override: Option<Srs>,
	pub source_nodata_override: Option<Vec<f64>>,
}

impl RunOptions {
	/// Cross-field validation that can't be expressed per-field at parse
	/// time: the Raster profile can't take a resampling algorithm that
	/// needs a projected SRS to operate in, and the antialias kernel can't
	/// be selected as a base-phase resampler.
	pub fn validate(&self) -> TileResult<()> {
		if matches!(self.profile, Profile::Raster {.. }) && self.output_convention == OutputConvention::Xyz {
			return Err(TileError::UnsupportedOption(
				"the raster profile has no canonical row orientation to convert from; use -o tms".into(),
			));
		}
		if !(0..=100).contains(&self.jpeg_quality) {
			return Err(TileError::UnsupportedOption(format!(
				"jpeg quality {} is out of range 0-100",
				self.jpeg_quality
			)));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tile_format_parses_case_insensitively() {
		assert_eq!(TileFormat::parse("PNG").unwrap(), TileFormat::Png);
		assert_eq!(TileFormat::parse("jpg").unwrap(), TileFormat::Jpeg);
		assert!(TileFormat::parse("webp").is_err());
	}

	#[test]
	fn zoom_range_parses_both_syntaxes() {
		assert_eq!(ZoomRange::parse("5").unwrap(), ZoomRange::new(5, 5).unwrap());
		assert_eq!(ZoomRange::parse("2-9").unwrap(), ZoomRange::new(2, 9).unwrap());
		assert!(ZoomRange::parse("9-2").is_err());
		assert!(ZoomRange::parse("abc").is_err());
	}

	#[test]
	fn resampling_rejects_unknown_kernel() {
		assert!(ResamplingAlgorithm::parse("sinc").is_err());
		assert_eq!(ResamplingAlgorithm::parse("Nearest-Neighbour").unwrap(), ResamplingAlgorithm::NearestNeighbour);
	}

	#[test]
	fn resampling_parses_cubicspline_distinctly_from_cubic() {
		assert_eq!(ResamplingAlgorithm::parse("cubicspline").unwrap(), ResamplingAlgorithm::CubicSpline);
		assert_ne!(ResamplingAlgorithm::parse("cubicspline").unwrap(), ResamplingAlgorithm::parse("cubic").unwrap());
	}

	#[test]
	fn antialias_is_overview_only() {
		assert!(ResamplingAlgorithm::Antialias.overview_only());
		assert!(!ResamplingAlgorithm::Cubic.overview_only());
		assert!(!ResamplingAlgorithm::CubicSpline.overview_only());
	}

	fn base_options(profile: Profile) -> RunOptions {
		RunOptions {
			input_path: PathBuf::from("in.tif"),
			output_path: PathBuf::from("out.mbtiles"),
			profile,
			zoom: None,
			resampling: ResamplingAlgorithm::Average,
			tile_format: TileFormat::Png,
			output_convention: OutputConvention::Xyz,
			worker_count: 1,
			jpeg_quality: 85,
			exclude_transparent: false,
			resume: false,
			source_srs_override: None,
			source_nodata_override: None,
		}
	}

	#[test]
	fn raster_profile_rejects_xyz_convention() {
		let opts = base_options(Profile::Raster { native_zoom: 3 });
		assert!(opts.validate().is_err());
	}

	#[test]
	fn mercator_profile_accepts_xyz_convention() {
		let opts = base_options(Profile::Mercator);
		assert!(opts.validate().is_ok());
	}

	#[test]
	fn jpeg_quality_out_of_range_is_rejected() {
		let mut opts = base_options(Profile::Mercator);
		opts.output_convention = OutputConvention::Tms;
		opts.jpeg_quality = 101;
		assert!(opts.validate().is_err());
	}
}
