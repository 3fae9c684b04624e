//! Archive metadata: `name`, `description`, `format`, `type`, `version`,
//! `attribution`, `bounds`, `minzoom`, `maxzoom`, `scale`, `profile`,
//! written once before any tile rows.

use mbtilegen_core::profile::mercator;
use mbtilegen_core::{Profile, TileFormat, TileResult};

use crate::planner::PyramidPlan;
use crate::store::TileStore;

/// Writes the standard MBTiles metadata rows for this run. `bounds` is
/// always expressed in WGS84 degrees, matching the MBTiles spec regardless
/// of the tiling profile — for Mercator, `extent` (already in meters) is
/// converted; for Geodetic it's used as-is; the Raster profile has no
/// geographic bounds at all and is skipped.
pub fn write_archive_metadata(
	store: &TileStore,
	name: &str,
	profile: Profile,
	plan: &PyramidPlan,
	tile_format: TileFormat,
	extent: Option<(f64, f64, f64, f64)>,
) -> TileResult<()> {
	store.set_metadata("name", name)?;
	store.set_metadata("description", name)?;
	store.set_metadata("format", tile_format.extension())?;
	store.set_metadata("type", "overlay")?;
	store.set_metadata("version", "1.0.0")?;
	store.set_metadata("attribution", "")?;
	store.set_metadata("scale", "1")?;
	store.set_metadata(
		"profile",
		match profile {
			Profile::Mercator => "mercator",
			Profile::Geodetic => "geodetic",
			Profile::Raster { .. } => "raster",
		},
	)?;

	if let Some(min_zoom) = plan.min_zoom() {
		store.set_metadata("minzoom", &min_zoom.to_string())?;
	}
	if let Some(max_zoom) = plan.base_zoom() {
		store.set_metadata("maxzoom", &max_zoom.to_string())?;
	}

	if let (Profile::Mercator | Profile::Geodetic, Some((ominx, ominy, omaxx, omaxy))) = (profile, extent) {
		let (minlon, minlat, maxlon, maxlat) = match profile {
			Profile::Mercator => {
				let (minlat, minlon) = mercator::meters_to_latlon(ominx, ominy);
				let (maxlat, maxlon) = mercator::meters_to_latlon(omaxx, omaxy);
				(minlon, minlat, maxlon, maxlat)
			}
			_ => (ominx, ominy, omaxx, omaxy),
		};
		store.set_metadata("bounds", &format!("{minlon},{minlat},{maxlon},{maxlat}"))?;
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::planner::ZoomLevelPlan;
	use mbtilegen_core::TileRange;

	#[test]
	fn writes_the_expected_metadata_keys() {
		let dir = tempfile::tempdir().unwrap();
		let store = TileStore::open(&dir.path().join("t.mbtiles"), false).unwrap();
		let plan = PyramidPlan {
			levels: vec![
				ZoomLevelPlan { z: 0, tile_range: TileRange::new(0, 0, 0, 0) },
				ZoomLevelPlan { z: 3, tile_range: TileRange::new(0, 0, 7, 7) },
			],
		};
		write_archive_metadata(&store, "test-layer", Profile::Mercator, &plan, TileFormat::Png, Some((-100.0, -50.0, 100.0, 50.0))).unwrap();

		assert_eq!(store.get_metadata("name").unwrap(), Some("test-layer".to_string()));
		assert_eq!(store.get_metadata("description").unwrap(), Some("test-layer".to_string()));
		assert_eq!(store.get_metadata("version").unwrap(), Some("1.0.0".to_string()));
		assert_eq!(store.get_metadata("attribution").unwrap(), Some(String::new()));
		assert_eq!(store.get_metadata("type").unwrap(), Some("overlay".to_string()));
		assert_eq!(store.get_metadata("format").unwrap(), Some("png".to_string()));
		assert_eq!(store.get_metadata("minzoom").unwrap(), Some("0".to_string()));
		assert_eq!(store.get_metadata("maxzoom").unwrap(), Some("3".to_string()));
		assert!(store.get_metadata("bounds").unwrap().is_some());
		assert_eq!(store.get_metadata("scale").unwrap(), Some("1".to_string()));
		assert_eq!(store.get_metadata("profile").unwrap(), Some("mercator".to_string()));
	}
}
