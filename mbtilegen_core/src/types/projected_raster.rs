use super::{GeoTransform, Srs};

/// The metadata half of a `ProjectedRaster`: everything the planner
/// and query mapper need to know about a warped source raster. The actual
/// pixel data lives behind `mbtilegen_engine::raster::RasterAdapter` — this
/// struct is the pure-data slice of it that can be reasoned about (and
/// tested) without a GDAL handle in hand.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedRasterInfo {
	pub width: u32,
	pub height: u32,
	pub band_count: u8,
	pub alpha_band: Option<u8>,
	pub geotransform: GeoTransform,
	pub srs: Srs,
	pub nodata_values: Vec<f64>,
}

impl ProjectedRasterInfo {
	/// The projected bounding box `(ominx, ominy, omaxx, omaxy)` derived
	/// from the geotransform and pixel dimensions.
	pub fn extent(&self) -> (f64, f64, f64, f64) {
		let (x0, y0) = self.geotransform.pixel_to_projected(0.0, self.height as f64);
		let (x1, y1) = self.geotransform.pixel_to_projected(self.width as f64, 0.0);
		(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
	}

	/// Horizontal resolution in projected units per pixel, used by the
	/// pyramid planner to derive default zoom levels.
	pub fn pixel_size_x(&self) -> f64 {
		self.geotransform.px.abs()
	}

	pub fn has_alpha(&self) -> bool {
		self.alpha_band.is_some()
	}

	/// The `(band_count, alpha_band)` a warped read of this raster actually
	/// produces: unchanged when the source already carries an alpha band or
	/// has a band count other than 1/3, otherwise grown by one band so the
	/// warp can synthesize per-pixel coverage alpha for the area outside the
	/// source's own footprint.
	pub fn warped_output_bands(&self) -> (u8, Option<u8>) {
		if self.alpha_band.is_none() && matches!(self.band_count, 1 | 3) {
			let alpha = self.band_count + 1;
			(alpha, Some(alpha))
		} else {
			(self.band_count, self.alpha_band)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> ProjectedRasterInfo {
		ProjectedRasterInfo {
			width: 512,
			height: 256,
			band_count: 4,
			alpha_band: Some(4),
			geotransform: GeoTransform::new(-100.0, 1.0, 0.0, 50.0, 0.0, -1.0).unwrap(),
			srs: Srs::web_mercator(),
			nodata_values: vec![],
		}
	}

	#[test]
	fn extent_matches_corners() {
		let raster = sample();
		let (ominx, ominy, omaxx, omaxy) = raster.extent();
		assert_eq!(ominx, -100.0);
		assert_eq!(omaxx, 412.0);
		assert_eq!(ominy, -206.0);
		assert_eq!(omaxy, 50.0);
	}

	#[test]
	fn has_alpha_reflects_band() {
		assert!(sample().has_alpha());
		let mut no_alpha = sample();
		no_alpha.alpha_band = None;
		assert!(!no_alpha.has_alpha());
	}

	#[test]
	fn warped_output_grows_band_count_for_alpha_less_1_or_3_band_sources() {
		let mut rgb = sample();
		rgb.band_count = 3;
		rgb.alpha_band = None;
		assert_eq!(rgb.warped_output_bands(), (4, Some(4)));

		let mut gray = sample();
		gray.band_count = 1;
		gray.alpha_band = None;
		assert_eq!(gray.warped_output_bands(), (2, Some(2)));
	}

	#[test]
	fn warped_output_is_unchanged_when_alpha_already_present() {
		assert_eq!(sample().warped_output_bands(), (4, Some(4)));
	}

	#[test]
	fn warped_output_is_unchanged_for_two_band_sources() {
		let mut two_band = sample();
		two_band.band_count = 2;
		two_band.alpha_band = None;
		assert_eq!(two_band.warped_output_bands(), (2, None));
	}
}
