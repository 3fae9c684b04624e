/// An opaque spatial reference system handle, convertible to/from a
/// canonical textual form. Equality is defined by that textual form, not
/// by whatever representation was used to construct it — two `Srs` built
/// from "EPSG:3857" and from its equivalent WKT compare equal once both
/// have been canonicalized by the raster adapter (`mbtilegen_engine`,
/// which owns the actual GDAL `SpatialRef` conversion).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Srs {
	wkt: String,
}

impl Srs {
	/// Constructs an `Srs` from an already-canonicalized WKT string. Callers
	/// in `mbtilegen_engine` are expected to run the string through
	/// `gdal::spatial_ref::SpatialRef::to_wkt()` first.
	pub fn from_canonical_wkt(wkt: impl Into<String>) -> Self {
		Srs { wkt: wkt.into() }
	}

	pub fn as_wkt(&self) -> &str {
		&self.wkt
	}

	/// The well-known EPSG:3857 (Spherical Mercator) SRS used by the
	/// Mercator profile, expressed in its short EPSG form; the engine
	/// resolves this into full WKT when it actually talks to GDAL.
	pub fn web_mercator() -> Self {
		Srs::from_canonical_wkt("EPSG:3857")
	}

	/// The well-known EPSG:4326 (WGS84 plate carrée) SRS used by the
	/// Geodetic profile.
	pub fn wgs84() -> Self {
		Srs::from_canonical_wkt("EPSG:4326")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn equality_is_by_canonical_text() {
		let a = Srs::from_canonical_wkt("EPSG:3857");
		let b = Srs::from_canonical_wkt("EPSG:3857");
		let c = Srs::from_canonical_wkt("EPSG:4326");
		assert_eq!(a, b);
		assert_ne!(a, c);
		assert_eq!(a, Srs::web_mercator());
		assert_eq!(c, Srs::wgs84());
	}
}
