//! The coordinate kernel and the tagged-enum profile dispatch: `Profile`
//! is a closed three-variant enum matched per call, not a trait object,
//! since the variant set never grows and these functions sit on the
//! tile-builder hot path.

pub mod geodetic;
pub mod mercator;
pub mod raster;

use crate::types::{Srs, TileRange};

pub const TILE_SIZE: u32 = 256;

/// The three supported projection profiles, each carrying just the
/// state it needs: the Raster profile's tile math depends on the source
/// raster's native resolution, computed once at planning time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Profile {
	Mercator,
	Geodetic,
	Raster { native_zoom: u8 },
}

impl Profile {
	/// The projected bounding rectangle `(ulx, uly, lrx, lry)` of tile
	/// `(tx, ty)` at zoom `z`.
	pub fn tile_bounds(&self, z: u8, tx: u32, ty: u32) -> (f64, f64, f64, f64) {
		match self {
			Profile::Mercator => mercator::tile_bounds(z, tx, ty),
			Profile::Geodetic => geodetic::tile_bounds(z, tx, ty),
			Profile::Raster { native_zoom } => raster::tile_bounds(*native_zoom, z, tx, ty),
		}
	}

	/// The full tile index range `(xmin, ymin, xmax, ymax)` covering the
	/// entire world at zoom `z` (before any raster-extent intersection).
	pub fn world_tile_range(&self, z: u8) -> TileRange {
		match self {
			Profile::Mercator => mercator::world_tile_range(z),
			Profile::Geodetic => geodetic::world_tile_range(z),
			Profile::Raster { native_zoom } => raster::world_tile_range(*native_zoom, z),
		}
	}

	/// Resolution (projected units per pixel) at zoom `z`.
	pub fn resolution(&self, z: u8) -> f64 {
		match self {
			Profile::Mercator => mercator::resolution(z),
			Profile::Geodetic => geodetic::resolution(z),
			Profile::Raster { native_zoom } => raster::resolution(*native_zoom, z),
		}
	}

	/// The largest zoom `z` such that `resolution(z) >= pixel_size`,
	/// clamped to 0. Shared across Mercator and Geodetic; the Raster
	/// profile derives its own native zoom directly instead.
	pub fn zoom_for_pixel_size(&self, pixel_size: f64) -> u8 {
		match self {
			Profile::Mercator => mercator::zoom_for_pixel_size(pixel_size),
			Profile::Geodetic => geodetic::zoom_for_pixel_size(pixel_size),
			Profile::Raster { native_zoom } => *native_zoom,
		}
	}

	/// The tile index range covering the projected extent
	/// `(ominx, ominy, omaxx, omaxy)` at zoom `z`. Only meaningful
	/// for the Mercator and Geodetic profiles, which tile a projected
	/// plane; the Raster profile tiles native pixel space instead, see
	/// [`Profile::tile_range_for_dimensions`].
	pub fn tile_range_for_extent(&self, z: u8, extent: (f64, f64, f64, f64)) -> TileRange {
		match self {
			Profile::Mercator => mercator::tile_range_for_extent(z, extent.0, extent.1, extent.2, extent.3),
			Profile::Geodetic => geodetic::tile_range_for_extent(z, extent.0, extent.1, extent.2, extent.3),
			Profile::Raster {.. } => {
				unreachable!("raster profile has no projected extent; use tile_range_for_dimensions")
			}
		}
	}

	/// The tile index range covering a `width x height` raster at zoom `z`
	///. Only meaningful for the Raster profile.
	pub fn tile_range_for_dimensions(&self, z: u8, width: u32, height: u32) -> TileRange {
		match self {
			Profile::Raster { native_zoom } => raster::tile_range_for_dimensions(*native_zoom, z, width, height),
			_ => unreachable!("Mercator/Geodetic profiles tile a projected extent; use tile_range_for_extent"),
		}
	}

	/// The SRS tiles of this profile are expressed in: EPSG:3857 for
	/// Mercator, EPSG:4326 for Geodetic. The Raster profile has no
	/// canonical target SRS — it tiles directly in the source's own pixel
	/// space, so callers must not warp for it.
	pub fn target_srs(&self) -> Option<Srs> {
		match self {
			Profile::Mercator => Some(Srs::web_mercator()),
			Profile::Geodetic => Some(Srs::wgs84()),
			Profile::Raster {.. } => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn raster_profile_has_no_target_srs() {
		assert_eq!(Profile::Raster { native_zoom: 3 }.target_srs(), None);
	}

	#[test]
	fn mercator_and_geodetic_have_distinct_target_srs() {
		assert_ne!(Profile::Mercator.target_srs(), Profile::Geodetic.target_srs());
	}
}
