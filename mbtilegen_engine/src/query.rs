//! The geo-to-pixel query mapper: translates a tile's projected
//! bounding rectangle into the source raster's pixel window, clipping to
//! the raster's actual extent and computing where the clipped read lands
//! inside the (possibly larger) output buffer. Pure function, no I/O.

use mbtilegen_core::ProjectedRasterInfo;

/// The result of mapping a projected rectangle onto a raster: where to read
/// from the source, and where the result lands inside a `query_size` square
/// output buffer. `None` fields in a reader/writer pair mean the rectangle
/// doesn't intersect the raster at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoQuery {
	pub read_x: u32,
	pub read_y: u32,
	pub read_width: u32,
	pub read_height: u32,
	pub write_x: u32,
	pub write_y: u32,
	pub write_width: u32,
	pub write_height: u32,
}

/// Maps the projected rectangle `(ulx, uly, lrx, lry)` onto `raster`,
/// assuming the caller wants a `query_size x query_size` output buffer
/// covering that rectangle. Returns `None` if the rectangle and the
/// raster's extent don't overlap at all.
pub fn geo_query(
	raster: &ProjectedRasterInfo,
	ulx: f64,
	uly: f64,
	lrx: f64,
	lry: f64,
	query_size: u32,
) -> Option<GeoQuery> {
	let gt = &raster.geotransform;
	let (rx0, ry0) = gt.projected_to_pixel(ulx, uly);
	let (rx1, ry1) = gt.projected_to_pixel(lrx, lry);

	let (rx_min, rx_max) = (rx0.min(rx1), rx0.max(rx1));
	let (ry_min, ry_max) = (ry0.min(ry1), ry0.max(ry1));

	let rsize_x = round_epsilon(rx_max - rx_min).max(1.0);
	let rsize_y = round_epsilon(ry_max - ry_min).max(1.0);

	let wsize = query_size as f64;
	let scale_x = wsize / rsize_x;
	let scale_y = wsize / rsize_y;

	let raster_w = raster.width as f64;
	let raster_h = raster.height as f64;

	if rx_max <= 0.0 || ry_max <= 0.0 || rx_min >= raster_w || ry_min >= raster_h {
		return None;
	}

	let clipped_rx_min = rx_min.max(0.0);
	let clipped_ry_min = ry_min.max(0.0);
	let clipped_rx_max = rx_max.min(raster_w);
	let clipped_ry_max = ry_max.min(raster_h);

	let read_x = round_epsilon(clipped_rx_min) as u32;
	let read_y = round_epsilon(clipped_ry_min) as u32;
	let read_width = round_epsilon(clipped_rx_max - clipped_rx_min).max(0.0) as u32;
	let read_height = round_epsilon(clipped_ry_max - clipped_ry_min).max(0.0) as u32;
	if read_width == 0 || read_height == 0 {
		return None;
	}

	let write_x = round_epsilon((clipped_rx_min - rx_min) * scale_x) as u32;
	let write_y = round_epsilon((clipped_ry_min - ry_min) * scale_y) as u32;
	let write_width = round_epsilon((clipped_rx_max - clipped_rx_min) * scale_x).max(1.0) as u32;
	let write_height = round_epsilon((clipped_ry_max - clipped_ry_min) * scale_y).max(1.0) as u32;

	Some(GeoQuery { read_x, read_y, read_width, read_height, write_x, write_y, write_width, write_height })
}

/// gdal2tiles' own rounding convention for these pixel-window computations:
/// floor with a small positive epsilon rather than round-half-to-even, so a
/// value that's only off from an integer by floating-point noise (e.g.
/// `255.99999997`) lands on the integer instead of the one below it.
fn round_epsilon(x: f64) -> f64 {
	(x + 0.001).floor()
}

#[cfg(test)]
mod tests {
	use super::*;
	use mbtilegen_core::{GeoTransform, Srs};

	fn raster(width: u32, height: u32) -> ProjectedRasterInfo {
		ProjectedRasterInfo {
			width,
			height,
			band_count: 3,
			alpha_band: None,
			geotransform: GeoTransform::new(0.0, 1.0, 0.0, 0.0, 0.0, -1.0).unwrap(),
			srs: Srs::web_mercator(),
			nodata_values: vec![],
		}
	}

	#[test]
	fn fully_contained_rectangle_needs_no_clipping() {
		let raster = raster(100, 100);
		let query = geo_query(&raster, 10.0, -10.0, 20.0, -20.0, 256).unwrap();
		assert_eq!(query.read_x, 10);
		assert_eq!(query.read_y, 10);
		assert_eq!(query.read_width, 10);
		assert_eq!(query.read_height, 10);
		assert_eq!(query.write_x, 0);
		assert_eq!(query.write_y, 0);
	}

	#[test]
	fn rectangle_outside_raster_returns_none() {
		let raster = raster(100, 100);
		assert!(geo_query(&raster, 200.0, -200.0, 300.0, -300.0, 256).is_none());
	}

	#[test]
	fn partially_overlapping_rectangle_clips_and_offsets_write_window() {
		let raster = raster(100, 100);
		// requested window straddles the raster's right edge
		let query = geo_query(&raster, 90.0, -10.0, 110.0, -30.0, 256).unwrap();
		assert_eq!(query.read_x, 90);
		assert_eq!(query.read_width, 10);
		assert_eq!(query.write_x, 0);
		assert!(query.write_width < 256);
	}
}
