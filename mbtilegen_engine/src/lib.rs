//! Raster I/O, resampling, tile storage and the parallel pyramid builder.
//!
//! This crate is the `mbtilegen_core` types wired up to actual GDAL
//! datasets, actual SQLite files and actual OS threads; `mbtilegen_core`
//! itself stays free of all three so its coordinate math is cheap to test.

pub mod builder;
pub mod encode;
pub mod metadata;
pub mod planner;
pub mod query;
pub mod raster;
pub mod resample;
pub mod store;

pub use builder::{build_pyramid, BuildOutcome};
pub use planner::{PyramidPlan, ZoomLevelPlan};
pub use raster::RasterAdapter;
pub use store::TileStore;
