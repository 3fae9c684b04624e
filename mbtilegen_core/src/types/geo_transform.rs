use crate::error::TileError;

/// The affine mapping from pixel `(c, r)` to projected `(x, y)`:
/// `x = ox + c*px + r*rx`, `y = oy + c*ry + r*py`.
///
/// Rotation terms `rx`/`ry` must be zero — rotated rasters are rejected at
/// construction — and `py` must be negative (north-up).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
	pub ox: f64,
	pub px: f64,
	pub rx: f64,
	pub oy: f64,
	pub ry: f64,
	pub py: f64,
}

impl GeoTransform {
	/// Builds a `GeoTransform`, rejecting rotation/skew and non-north-up
	/// rasters as `TileError::InvalidInput`.
	pub fn new(ox: f64, px: f64, rx: f64, oy: f64, ry: f64, py: f64) -> Result<Self, TileError> {
		if rx != 0.0 || ry != 0.0 {
			return Err(TileError::InvalidInput(format!(
				"rotated/skewed rasters are not supported (rx={rx}, ry={ry})"
			)));
		}
		if py >= 0.0 {
			return Err(TileError::InvalidInput(format!(
				"raster must be north-up (expected py < 0, got py={py})"
			)));
		}
		Ok(GeoTransform { ox, px, rx, oy, ry, py })
	}

	/// Maps a pixel coordinate to projected `(x, y)`.
	pub fn pixel_to_projected(&self, c: f64, r: f64) -> (f64, f64) {
		(self.ox + c * self.px, self.oy + r * self.py)
	}

	/// Maps a projected `(x, y)` back to a pixel coordinate.
	pub fn projected_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
		((x - self.ox) / self.px, (y - self.oy) / self.py)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_rotation() {
		assert!(GeoTransform::new(0.0, 1.0, 0.1, 0.0, 0.0, -1.0).is_err());
		assert!(GeoTransform::new(0.0, 1.0, 0.0, 0.0, 0.1, -1.0).is_err());
	}

	#[test]
	fn rejects_south_up() {
		assert!(GeoTransform::new(0.0, 1.0, 0.0, 0.0, 0.0, 1.0).is_err());
	}

	#[test]
	fn round_trips_pixel_and_projected() {
		let gt = GeoTransform::new(100.0, 2.0, 0.0, 500.0, 0.0, -2.0).unwrap();
		let (x, y) = gt.pixel_to_projected(10.0, 5.0);
		let (c, r) = gt.projected_to_pixel(x, y);
		assert!((c - 10.0).abs() < 1e-9);
		assert!((r - 5.0).abs() < 1e-9);
	}
}
