//! The MBTiles schema: `metadata`, `tiles`, and the UTFGrid `grids`/
//! `grid_data` tables. `tiles`' unique index is deliberately left out of
//! the initial schema — every worker thread inserts into `tiles`
//! concurrently during the build, and building the index only once after
//! they've all joined (see `TileStore::finalize`) keeps those inserts from
//! contending on it.

pub const CREATE_SCHEMA_SQL: &str = "\
	CREATE TABLE metadata (name TEXT, value TEXT, UNIQUE (name));
	CREATE TABLE tiles (zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, tile_data BLOB);
	CREATE TABLE grids (zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, grid BLOB);
	CREATE TABLE grid_data (zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, key_name TEXT, key_json TEXT);
";

pub const FINALIZE_SCHEMA_SQL: &str = "\
	CREATE UNIQUE INDEX tile_index on tiles (zoom_level, tile_column, tile_row);
";
