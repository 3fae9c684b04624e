//! Shared value types: the data model every other module speaks in
//! terms of. Plain data, no I/O.

mod geo_transform;
mod projected_raster;
mod srs;
mod tile_coord;
mod tile_range;

pub use geo_transform::GeoTransform;
pub use projected_raster::ProjectedRasterInfo;
pub use srs::Srs;
pub use tile_coord::{RowConvention, TileCoord};
pub use tile_range::TileRange;
