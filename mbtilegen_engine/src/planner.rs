//! The pyramid planner: turns a `RunOptions` plus a probed raster
//! into a concrete, per-zoom list of tile ranges the builder will iterate.

use mbtilegen_core::{Profile, ProjectedRasterInfo, TileError, TileRange, TileResult, ZoomRange};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoomLevelPlan {
	pub z: u8,
	pub tile_range: TileRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PyramidPlan {
	pub levels: Vec<ZoomLevelPlan>,
}

impl PyramidPlan {
	pub fn base_zoom(&self) -> Option<u8> {
		self.levels.last().map(|l| l.z)
	}

	pub fn min_zoom(&self) -> Option<u8> {
		self.levels.first().map(|l| l.z)
	}

	pub fn level(&self, z: u8) -> Option<&ZoomLevelPlan> {
		self.levels.iter().find(|l| l.z == z)
	}
}

/// Builds the plan: the base zoom is either the caller's explicit
/// `zoom.max` or the profile's natural resolution-matching zoom; the
/// min zoom defaults to 0 unless the caller narrowed it. Levels are stored
/// ascending by zoom, matching the overview phase's build order (coarser
/// levels are derived from the next-finer level already in the archive).
pub fn plan(raster: &ProjectedRasterInfo, profile: Profile, zoom: Option<ZoomRange>, target_extent: Option<(f64, f64, f64, f64)>) -> TileResult<PyramidPlan> {
	let natural_base = match profile {
		Profile::Raster { native_zoom } => native_zoom,
		_ => profile.zoom_for_pixel_size(raster.pixel_size_x()),
	};

	let range = match zoom {
		Some(z) => z,
		None => ZoomRange::new(0, natural_base)?,
	};

	if range.max > natural_base {
		return Err(TileError::InvalidInput(format!(
			"requested max zoom {} exceeds the raster's native resolution (zoom {})",
			range.max, natural_base
		)));
	}

	let mut levels = Vec::with_capacity(range.max as usize - range.min as usize + 1);
	for z in range.iter() {
		let tile_range = match profile {
			Profile::Raster {.. } => profile.tile_range_for_dimensions(z, raster.width, raster.height),
			_ => {
				let extent = target_extent
					.ok_or_else(|| TileError::InvalidInput("projected extent required for this profile".into()))?;
				profile.tile_range_for_extent(z, extent)
			}
		};
		levels.push(ZoomLevelPlan { z, tile_range });
	}

	Ok(PyramidPlan { levels })
}
