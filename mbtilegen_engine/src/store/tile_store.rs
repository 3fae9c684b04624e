//! The tile archive: an `r2d2`-pooled SQLite connection and the MBTiles
//! schema in `schema.rs`.
//!
//! `build_pyramid` hands a clone of this store to every worker thread — the
//! pool (rather than a single connection) is what makes that safe.
//! `synchronous = OFF` and `journal_mode = OFF` forgo crash safety entirely
//! — a torn write on an OS or process crash can corrupt the archive — but a
//! tile archive is wholly regenerable from its source raster and `--resume`
//! is the documented recovery path, not the rollback journal. `page_size`
//! is raised to 65536 and `cache_size` to roughly 2000 pages (`-2000` is
//! `PRAGMA cache_size`'s kibibyte-denominated form) since tile blobs are
//! large and sequential; `foreign_keys = 1` is on even though nothing in
//! this schema declares a foreign key, for forward compatibility with a
//! schema that later adds one.

use std::fs::remove_file;
use std::path::{Path, PathBuf};

use mbtilegen_core::TileError;
use r2d2::Pool;
use r2d2_sqlite::{rusqlite::params, SqliteConnectionManager};

use super::schema::{CREATE_SCHEMA_SQL, FINALIZE_SCHEMA_SQL};

pub type TileStoreResult<T> = Result<T, TileError>;

#[derive(Clone)]
pub struct TileStore {
	pool: Pool<SqliteConnectionManager>,
	path: PathBuf,
}

impl TileStore {
	/// Opens (or creates) the archive at `path`. When `resume` is false, an
	/// existing file is removed first so the run starts from a clean
	/// schema; when `resume` is true, an existing file's schema is assumed
	/// compatible and left in place so already-written tiles are preserved.
	pub fn open(path: &Path, resume: bool) -> TileStoreResult<Self> {
		let fresh = !resume || !path.exists();
		if fresh && path.exists() {
			remove_file(path).map_err(|e| Self::archive_error(path, format!("cannot remove existing archive: {e}")))?;
		}

		let manager = SqliteConnectionManager::file(path);
		let pool = Pool::builder()
			.max_size(16)
			.build(manager)
			.map_err(|e| Self::archive_error(path, format!("cannot open connection pool: {e}")))?;

		let conn = pool.get().map_err(|e| Self::archive_error(path, format!("cannot get connection: {e}")))?;
		conn.execute_batch(
			"PRAGMA synchronous = OFF; PRAGMA journal_mode = OFF; PRAGMA cache_size = -2000; PRAGMA page_size = 65536; PRAGMA foreign_keys = 1;",
		)
		.map_err(|e| Self::archive_error(path, format!("cannot set pragmas: {e}")))?;
		if fresh {
			conn.execute_batch(CREATE_SCHEMA_SQL).map_err(|e| Self::archive_error(path, format!("cannot create schema: {e}")))?;
		}

		Ok(TileStore { pool, path: path.to_path_buf() })
	}

	/// Builds the `tiles` unique index. Must be called exactly once, after
	/// every worker thread writing tiles has joined — building it earlier
	/// would force every concurrent `INSERT OR IGNORE` to contend on it.
	pub fn finalize(&self) -> TileStoreResult<()> {
		let conn = self.pool.get().map_err(|e| self.error(format!("cannot get connection: {e}")))?;
		conn.execute_batch(FINALIZE_SCHEMA_SQL).map_err(|e| self.error(format!("cannot build tile index: {e}")))?;
		Ok(())
	}

	pub fn set_metadata(&self, name: &str, value: &str) -> TileStoreResult<()> {
		let conn = self.pool.get().map_err(|e| self.error(format!("cannot get connection: {e}")))?;
		conn.execute("INSERT OR REPLACE INTO metadata (name, value) VALUES (?1, ?2)", params![name, value])
			.map_err(|e| self.error(format!("cannot set metadata {name}: {e}")))?;
		Ok(())
	}

	/// Inserts a batch of tiles within a single transaction, mirroring the
	/// teacher's `add_tiles`. Duplicate `(z, col, row)` within a resumed run
	/// are silently ignored rather than erroring — `INSERT OR IGNORE` keeps
	/// a resumed run idempotent without a pre-check per tile.
	pub fn insert_tiles(&self, tiles: &[(u8, u32, u32, Vec<u8>)]) -> TileStoreResult<()> {
		let mut conn = self.pool.get().map_err(|e| self.error(format!("cannot get connection: {e}")))?;
		let transaction = conn.transaction().map_err(|e| self.error(format!("cannot start transaction: {e}")))?;
		for (z, col, row, data) in tiles {
			transaction
				.execute(
					"INSERT OR IGNORE INTO tiles (zoom_level, tile_column, tile_row, tile_data) VALUES (?1, ?2, ?3, ?4)",
					params![z, col, row, data],
				)
				.map_err(|e| self.error(format!("cannot insert tile {z}/{col}/{row}: {e}")))?;
		}
		transaction.commit().map_err(|e| self.error(format!("cannot commit transaction: {e}")))?;
		Ok(())
	}

	pub fn get_metadata(&self, name: &str) -> TileStoreResult<Option<String>> {
		let conn = self.pool.get().map_err(|e| self.error(format!("cannot get connection: {e}")))?;
		conn.query_row("SELECT value FROM metadata WHERE name = ?1", params![name], |row| row.get::<_, String>(0))
			.map(Some)
			.or_else(|e| if matches!(e, rusqlite::Error::QueryReturnedNoRows) { Ok(None) } else { Err(self.error(format!("cannot read metadata {name}: {e}"))) })
	}

	/// Reads a single tile's raw encoded bytes back, used by the overview
	/// phase to fetch already-built children.
	pub fn get_tile(&self, z: u8, col: u32, row: u32) -> TileStoreResult<Option<Vec<u8>>> {
		let conn = self.pool.get().map_err(|e| self.error(format!("cannot get connection: {e}")))?;
		conn.query_row(
			"SELECT tile_data FROM tiles WHERE zoom_level = ?1 AND tile_column = ?2 AND tile_row = ?3",
			params![z, col, row],
			|row| row.get::<_, Vec<u8>>(0),
		)
		.map(Some)
		.or_else(|e| if matches!(e, rusqlite::Error::QueryReturnedNoRows) { Ok(None) } else { Err(self.error(format!("cannot read tile {z}/{col}/{row}: {e}"))) })
	}

	pub fn has_tile(&self, z: u8, col: u32, row: u32) -> TileStoreResult<bool> {
		Ok(self.get_tile(z, col, row)?.is_some())
	}

	pub fn tile_count(&self) -> TileStoreResult<u64> {
		let conn = self.pool.get().map_err(|e| self.error(format!("cannot get connection: {e}")))?;
		conn.query_row("SELECT COUNT(*) FROM tiles", [], |row| row.get::<_, i64>(0))
			.map(|count| count as u64)
			.map_err(|e| self.error(format!("cannot count tiles: {e}")))
	}

	fn error(&self, reason: String) -> TileError {
		Self::archive_error(&self.path, reason)
	}

	fn archive_error(path: &Path, reason: String) -> TileError {
		TileError::ArchiveError { path: path.to_path_buf(), reason }
	}
}
