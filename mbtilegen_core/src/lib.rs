//! Pure coordinate math, shared value types, the error taxonomy, and the
//! validated run configuration for `mbtilegen`.
//!
//! Nothing in this crate touches a filesystem, a raster library, or a
//! database connection — those live in `mbtilegen_engine`. Keeping this
//! split keeps the leaves as free functions over plain data, so they are
//! cheap to property-test.

pub mod concurrency;
pub mod error;
pub mod options;
pub mod profile;
pub mod progress;
pub mod types;

pub use error::{TileError, TileResult};
pub use options::{OutputConvention, ResamplingAlgorithm, RunOptions, TileFormat, ZoomRange};
pub use profile::Profile;
pub use types::{GeoTransform, ProjectedRasterInfo, Srs, TileCoord, TileRange};
