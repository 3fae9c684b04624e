//! Spherical Mercator (EPSG:3857) tile math. Every function here is pure
//! and side-effect-free; round-trip laws between lat/lon, meters, pixels
//! and tile indices are tested directly against these functions.

use std::f64::consts::PI;

use crate::types::TileRange;

use super::TILE_SIZE;

/// Earth's equatorial radius in meters, as used by Web Mercator.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Half the circumference of the Mercator world square, in meters.
pub const ORIGIN_SHIFT: f64 = PI * EARTH_RADIUS;

/// Meters-per-pixel at zoom 0.
pub const INITIAL_RESOLUTION: f64 = 2.0 * ORIGIN_SHIFT / TILE_SIZE as f64;

/// Latitudes beyond this are outside the Mercator projection's domain; the
/// planner clips to this bound rather than let `latlon_to_meters` diverge.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

const MAX_ZOOM: u8 = 31;

pub fn resolution(z: u8) -> f64 {
	INITIAL_RESOLUTION / 2f64.powi(z as i32)
}

/// `lat`/`lon` in degrees to Mercator meters.
pub fn latlon_to_meters(lat: f64, lon: f64) -> (f64, f64) {
	let mx = lon * ORIGIN_SHIFT / 180.0;
	let my = ((90.0 + lat) * PI / 360.0).tan().ln() * ORIGIN_SHIFT / PI;
	(mx, my)
}

/// Inverse of [`latlon_to_meters`].
pub fn meters_to_latlon(mx: f64, my: f64) -> (f64, f64) {
	let lon = mx / ORIGIN_SHIFT * 180.0;
	let lat = (my * PI / ORIGIN_SHIFT).exp().atan() * 360.0 / PI - 90.0;
	(lat, lon)
}

/// Mercator meters to pixel coordinates at zoom `z`.
pub fn meters_to_pixels(mx: f64, my: f64, z: u8) -> (f64, f64) {
	let res = resolution(z);
	let px = (mx + ORIGIN_SHIFT) / res;
	let py = (my + ORIGIN_SHIFT) / res;
	(px, py)
}

/// Inverse of [`meters_to_pixels`].
pub fn pixels_to_meters(px: f64, py: f64, z: u8) -> (f64, f64) {
	let res = resolution(z);
	(px * res - ORIGIN_SHIFT, py * res - ORIGIN_SHIFT)
}

/// `tx = ceil(px/256) - 1`; same for `ty`.
pub fn pixels_to_tile(px: f64, py: f64) -> (i64, i64) {
	let tx = (px / TILE_SIZE as f64).ceil() as i64 - 1;
	let ty = (py / TILE_SIZE as f64).ceil() as i64 - 1;
	(tx, ty)
}

/// The projected rectangle `(minx, miny, maxx, maxy)` covered by tile
/// `(tx, ty)` at zoom `z`.
pub fn tile_bounds(z: u8, tx: u32, ty: u32) -> (f64, f64, f64, f64) {
	let (minx, miny) = pixels_to_meters((tx * TILE_SIZE) as f64, (ty * TILE_SIZE) as f64, z);
	let (maxx, maxy) = pixels_to_meters(((tx + 1) * TILE_SIZE) as f64, ((ty + 1) * TILE_SIZE) as f64, z);
	(minx, miny, maxx, maxy)
}

/// The full world tile index range at zoom `z`: `0 <= x, y < 2^z`.
pub fn world_tile_range(z: u8) -> TileRange {
	let max = (1u32 << z) - 1;
	TileRange::new(0, 0, max, max)
}

/// The tile index range covering the projected extent
/// `(ominx, ominy, omaxx, omaxy)` at zoom `z`, clamped to the world range
///.
pub fn tile_range_for_extent(z: u8, ominx: f64, ominy: f64, omaxx: f64, omaxy: f64) -> TileRange {
	let world = world_tile_range(z);
	let (px0, py0) = meters_to_pixels(ominx, ominy, z);
	let (px1, py1) = meters_to_pixels(omaxx, omaxy, z);
	let (tx0, ty0) = pixels_to_tile(px0.min(px1), py0.min(py1));
	let (tx1, ty1) = pixels_to_tile(px0.max(px1) - 1e-9, py0.max(py1) - 1e-9);
	let tminx = tx0.clamp(world.tminx as i64, world.tmaxx as i64) as u32;
	let tminy = ty0.clamp(world.tminy as i64, world.tmaxy as i64) as u32;
	let tmaxx = tx1.clamp(world.tminx as i64, world.tmaxx as i64) as u32;
	let tmaxy = ty1.clamp(world.tminy as i64, world.tmaxy as i64) as u32;
	TileRange::new(tminx.min(tmaxx), tminy.min(tmaxy), tminx.max(tmaxx), tminy.max(tmaxy))
}

/// Largest `z` with `resolution(z) >= pixel_size`, clamped to `0..=31`.
pub fn zoom_for_pixel_size(pixel_size: f64) -> u8 {
	for z in 0..MAX_ZOOM {
		if resolution(z) < pixel_size {
			return z.saturating_sub(1);
		}
	}
	MAX_ZOOM
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn latlon_meters_round_trip() {
		let samples = [
			(0.0, 0.0),
			(45.0, 90.0),
			(-45.0, -90.0),
			(84.9, 179.999),
			(-84.9, -179.999),
			(51.5074, -0.1278),
		];
		for (lat, lon) in samples {
			let (mx, my) = latlon_to_meters(lat, lon);
			let (lat2, lon2) = meters_to_latlon(mx, my);
			assert!((lat - lat2).abs() < 1e-9, "lat round-trip {lat} vs {lat2}");
			assert!((lon - lon2).abs() < 1e-9, "lon round-trip {lon} vs {lon2}");
		}
	}

	#[test]
	fn pixel_tile_round_trip_for_every_in_range_tile() {
		for z in 0..6u8 {
			let range = world_tile_range(z);
			for (tx, ty) in range.iter_canonical() {
				let (minx, miny, _, _) = tile_bounds(z, tx, ty);
				let (px, py) = meters_to_pixels(minx, miny, z);
				let (tx2, ty2) = pixels_to_tile(px, py);
				assert_eq!(tx2, tx as i64, "tx mismatch at z={z}");
				assert_eq!(ty2, ty as i64, "ty mismatch at z={z}");
			}
		}
	}

	#[test]
	fn resolution_decreases_monotonically() {
		for z in 0..20u8 {
			assert!(resolution(z) > resolution(z + 1));
		}
	}

	#[test]
	fn zoom_for_pixel_size_matches_resolution_bracket() {
		for z in 1..20u8 {
			let p = resolution(z);
			let chosen = zoom_for_pixel_size(p);
			assert!(resolution(chosen) >= p - 1e-9);
			assert!(resolution(chosen + 1) < p + 1e-9);
		}
	}

	#[test]
	fn zoom_for_pixel_size_clamps_to_zero_for_huge_pixels() {
		assert_eq!(zoom_for_pixel_size(resolution(0) * 10.0), 0);
	}

	#[test]
	fn tile_range_for_extent_matches_world_at_full_coverage() {
		let z = 2;
		let range = tile_range_for_extent(z, -ORIGIN_SHIFT, -ORIGIN_SHIFT, ORIGIN_SHIFT, ORIGIN_SHIFT);
		assert_eq!(range, world_tile_range(z));
	}

	#[test]
	fn tile_range_for_extent_clamps_to_world() {
		let range = tile_range_for_extent(1, -ORIGIN_SHIFT * 10.0, -ORIGIN_SHIFT * 10.0, ORIGIN_SHIFT * 10.0, ORIGIN_SHIFT * 10.0);
		assert_eq!(range, world_tile_range(1));
	}

	#[test]
	fn world_tile_range_matches_2_pow_z() {
		let range = world_tile_range(3);
		assert_eq!(range.tminx, 0);
		assert_eq!(range.tminy, 0);
		assert_eq!(range.tmaxx, 7);
		assert_eq!(range.tmaxy, 7);
	}
}
