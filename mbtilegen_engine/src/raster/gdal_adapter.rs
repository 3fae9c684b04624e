//! The GDAL-backed `RasterAdapter`: probe metadata once at open time,
//! then either warp (Mercator/Geodetic) or directly resample (Raster) on
//! every read. Each worker thread opens its own adapter against the same
//! path instead of sharing one behind a pool — `gdal::Dataset` isn't safe
//! to call concurrently from multiple threads, and re-opening is cheap
//! next to the warp itself.

use std::ffi::CString;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use gdal::raster::ResampleAlg;
use gdal::{config::set_config_option, Dataset, DriverManager};
use mbtilegen_core::{GeoTransform, ProjectedRasterInfo, ResamplingAlgorithm, Srs, TileError, TileResult};

use super::{invalid_input, RasterAdapter, RasterWindow};

pub struct GdalRasterAdapter {
	dataset: Mutex<Dataset>,
	info: ProjectedRasterInfo,
	path: PathBuf,
}

unsafe impl Send for GdalRasterAdapter {}
unsafe impl Sync for GdalRasterAdapter {}

impl GdalRasterAdapter {
	/// Opens `path` with no source SRS or NODATA override. See
	/// `open_with_overrides` for the `-s`/`-a` CLI flags.
	pub fn open(path: &Path) -> TileResult<Self> {
		Self::open_with_overrides(path, None, None)
	}

	/// Opens `path`, validating the raster has a non-rotated geotransform,
	/// a known SRS, and at least one band.
	///
	/// `source_srs_override` (`-s, --s_srs`) replaces whatever SRS the
	/// dataset itself reports, for rasters with missing or wrong
	/// georeferencing metadata. `nodata_override` (`-a, --srcnodata`)
	/// replaces each band's NODATA value; a single value is broadcast to
	/// every band, matching the CLI's `V[,V…]` flag syntax.
	pub fn open_with_overrides(path: &Path, source_srs_override: Option<&Srs>, nodata_override: Option<&[f64]>) -> TileResult<Self> {
		set_config_option("GDAL_NUM_THREADS", "ALL_CPUS").ok();

		let mut dataset = Dataset::open(path).map_err(|e| invalid_input(format!("cannot open {}: {e}", path.display())))?;

		let (width, height) = dataset.raster_size();
		let band_count = dataset.raster_count();
		if band_count == 0 {
			return Err(invalid_input(format!("{} has zero raster bands", path.display())));
		}

		let gt = dataset
			.geo_transform()
			.map_err(|e| invalid_input(format!("{} has no geotransform: {e}", path.display())))?;
		let geotransform = GeoTransform::new(gt[0], gt[1], gt[2], gt[3], gt[4], gt[5])?;

		let srs = match source_srs_override {
			Some(srs) => {
				let spatial_ref = gdal::spatial_ref::SpatialRef::from_definition(srs.as_wkt())
					.map_err(|e| invalid_input(format!("invalid source SRS override: {e}")))?;
				dataset
					.set_spatial_ref(&spatial_ref)
					.map_err(|e| invalid_input(format!("cannot apply source SRS override: {e}")))?;
				srs.clone()
			}
			None => {
				let spatial_ref = dataset
					.spatial_ref()
					.map_err(|e| invalid_input(format!("{} has no spatial reference: {e}", path.display())))?;
				Srs::from_canonical_wkt(
					spatial_ref
						.to_wkt()
						.map_err(|e| invalid_input(format!("cannot export SRS to WKT: {e}")))?,
				)
			}
		};

		let mut alpha_band = None;
		for i in 1..=band_count {
			let band = dataset
				.rasterband(i)
				.map_err(|e| invalid_input(format!("cannot open band {i}: {e}")))?;
			if band.color_interpretation() == gdal::raster::ColorInterpretation::AlphaBand {
				alpha_band = Some(i as u8);
			}
			if let Some(values) = nodata_override {
				let broadcast = values.get((i - 1) as usize).or_else(|| values.last()).copied();
				if let Some(value) = broadcast {
					band.set_no_data_value(value)
						.map_err(|e| invalid_input(format!("cannot set NODATA override on band {i}: {e}")))?;
				}
			}
		}

		let nodata_values = (1..=band_count)
			.map(|i| dataset.rasterband(i).ok().and_then(|b| b.no_data_value()).unwrap_or(f64::NAN))
			.collect();

		let info = ProjectedRasterInfo {
			width: width as u32,
			height: height as u32,
			band_count: band_count as u8,
			alpha_band,
			geotransform,
			srs,
			nodata_values,
		};

		Ok(GdalRasterAdapter { dataset: Mutex::new(dataset), info, path: path.to_path_buf() })
	}

	fn warp_and_read(
		&self,
		ulx: f64,
		uly: f64,
		lrx: f64,
		lry: f64,
		out_width: u32,
		out_height: u32,
		target_srs: &Srs,
		resampling: ResamplingAlgorithm,
	) -> TileResult<RasterWindow> {
		let dataset = self.dataset.lock().unwrap();
		let src_band_count = self.info.band_count as usize;
		let (dst_band_count, alpha_band) = self.info.warped_output_bands();
		let dst_band_count = dst_band_count as usize;
		let synthesized_alpha = alpha_band.is_some() && self.info.alpha_band.is_none();

		let driver = DriverManager::get_driver_by_name("MEM")
			.map_err(|e| self.archive_like_error(format!("MEM driver unavailable: {e}")))?;
		let mut dst = driver
			.create_with_band_type::<u8, _>("", out_width as usize, out_height as usize, dst_band_count)
			.map_err(|e| self.archive_like_error(format!("failed to create in-memory warp target: {e}")))?;

		let dst_srs = gdal::spatial_ref::SpatialRef::from_definition(target_srs.as_wkt())
			.map_err(|e| invalid_input(format!("invalid target SRS: {e}")))?;
		dst.set_spatial_ref(&dst_srs)
			.map_err(|e| self.archive_like_error(format!("failed to set target SRS: {e}")))?;

		let pixel_width = (lrx - ulx) / out_width as f64;
		let pixel_height = (lry - uly) / out_height as f64;
		dst.set_geo_transform(&[ulx, pixel_width, 0.0, uly, 0.0, pixel_height])
			.map_err(|e| self.archive_like_error(format!("failed to set target geotransform: {e}")))?;

		// Destination NODATA init: a tile that only partly overlaps the
		// source must keep the uncovered area at NODATA rather than fall
		// back to a warped-in zero, so downstream consumers can still tell
		// "no data" apart from "valid black" on a format without alpha.
		let nodata: Vec<f64> = (0..src_band_count).map(|i| self.info.nodata_values.get(i).copied().unwrap_or(f64::NAN)).collect();
		let has_nodata = nodata.iter().any(|v| !v.is_nan());
		if has_nodata {
			for i in 1..=src_band_count {
				let value = nodata[i - 1];
				if value.is_nan() {
					continue;
				}
				let band = dst
					.rasterband(i as isize)
					.map_err(|e| self.archive_like_error(format!("cannot open destination band {i}: {e}")))?;
				band
					.set_no_data_value(value)
					.map_err(|e| self.archive_like_error(format!("cannot set destination NODATA on band {i}: {e}")))?;
			}
		}

		let h_src_ds = dataset.c_dataset();
		let h_dst_ds = dst.c_dataset();

		// SAFETY: both handles come from datasets held alive for the
		// duration of this call; GDAL's warp API is the only way to
		// reproject with a resampling kernel chosen per call, same as the
		// teacher's `reproject_to_dataset`.
		let warp_result = unsafe {
			use gdal_sys::{
				CPLErr, CSLDestroy, CSLSetNameValue, GDALChunkAndWarpMulti, GDALCreateGenImgProjTransformer2,
				GDALCreateWarpOperation, GDALCreateWarpOptions, GDALDestroyGenImgProjTransformer, GDALDestroyWarpOperation,
				GDALGenImgProjTransform,
			};

			let mut options = *GDALCreateWarpOptions();
			options.hSrcDS = h_src_ds;
			options.hDstDS = h_dst_ds;
			options.nBandCount = src_band_count as i32;
			options.eResampleAlg = to_gdal_sys_resample_alg(resampling);
			options.dfWarpMemoryLimit = 512.0 * 1024.0 * 1024.0;
			options.pTransformerArg = GDALCreateGenImgProjTransformer2(h_src_ds, h_dst_ds, core::ptr::null_mut());
			options.pfnTransformer = Some(GDALGenImgProjTransform);

			if has_nodata {
				options.padfDstNoDataReal = nodata.as_ptr() as *mut f64;
				let key = CString::new("INIT_DEST").unwrap();
				let value = CString::new("NO_DATA").unwrap();
				options.papszWarpOptions = CSLSetNameValue(core::ptr::null_mut(), key.as_ptr(), value.as_ptr());
			}
			if synthesized_alpha {
				options.nDstAlphaBand = dst_band_count as i32;
			}

			let operation = GDALCreateWarpOperation(&options);
			let rv = GDALChunkAndWarpMulti(operation, 0, 0, out_width as i32, out_height as i32);
			GDALDestroyWarpOperation(operation);
			GDALDestroyGenImgProjTransformer(options.pTransformerArg);
			if !options.papszWarpOptions.is_null() {
				CSLDestroy(options.papszWarpOptions);
			}
			rv
		};
		if warp_result != gdal_sys::CPLErr::CE_None {
			return Err(TileError::RasterReadError {
				z: 0,
				x: 0,
				y: 0,
				reason: "GDAL warp operation failed".into(),
			});
		}

		self.read_interleaved(&dst, out_width, out_height, dst_band_count, alpha_band)
	}

	fn direct_read(
		&self,
		ulx: f64,
		uly: f64,
		lrx: f64,
		lry: f64,
		out_width: u32,
		out_height: u32,
		resampling: ResamplingAlgorithm,
	) -> TileResult<RasterWindow> {
		let dataset = self.dataset.lock().unwrap();
		let band_count = self.info.band_count as usize;
		let window = (ulx as isize, uly as isize);
		let window_size = ((lrx - ulx).max(1.0) as usize, (lry - uly).max(1.0) as usize);
		let alg = to_gdal_resample_alg(resampling);

		let mut samples = vec![0u8; out_width as usize * out_height as usize * band_count];
		for i in 1..=band_count {
			let band = dataset
				.rasterband(i as isize)
				.map_err(|e| self.read_error(format!("band {i} unavailable: {e}")))?;
			let buffer = band
				.read_as::<u8>(window, window_size, (out_width as usize, out_height as usize), Some(alg))
				.map_err(|e| self.read_error(format!("band {i} read failed: {e}")))?;
			for (pixel_index, value) in buffer.data().iter().enumerate() {
				samples[pixel_index * band_count + (i - 1)] = *value;
			}
		}

		Ok(RasterWindow { width: out_width, height: out_height, band_count: band_count as u8, alpha_band: self.info.alpha_band, samples })
	}

	fn read_interleaved(
		&self,
		dataset: &Dataset,
		out_width: u32,
		out_height: u32,
		band_count: usize,
		alpha_band: Option<u8>,
	) -> TileResult<RasterWindow> {
		let mut samples = vec![0u8; out_width as usize * out_height as usize * band_count];
		for i in 1..=band_count {
			let band = dataset
				.rasterband(i as isize)
				.map_err(|e| self.read_error(format!("warped band {i} unavailable: {e}")))?;
			let buffer = band
				.read_band_as::<u8>()
				.map_err(|e| self.read_error(format!("warped band {i} read failed: {e}")))?;
			for (pixel_index, value) in buffer.data().iter().enumerate() {
				samples[pixel_index * band_count + (i - 1)] = *value;
			}
		}
		Ok(RasterWindow { width: out_width, height: out_height, band_count: band_count as u8, alpha_band, samples })
	}

	fn read_error(&self, reason: String) -> TileError {
		TileError::RasterReadError { z: 0, x: 0, y: 0, reason }
	}

	fn archive_like_error(&self, reason: String) -> TileError {
		TileError::RasterReadError { z: 0, x: 0, y: 0, reason: format!("{}: {reason}", self.path.display()) }
	}
}

fn to_gdal_resample_alg(resampling: ResamplingAlgorithm) -> ResampleAlg {
	match resampling {
		ResamplingAlgorithm::NearestNeighbour => ResampleAlg::NearestNeighbour,
		ResamplingAlgorithm::Average | ResamplingAlgorithm::Antialias => ResampleAlg::Average,
		ResamplingAlgorithm::Bilinear => ResampleAlg::Bilinear,
		ResamplingAlgorithm::Cubic => ResampleAlg::Cubic,
		ResamplingAlgorithm::CubicSpline => ResampleAlg::CubicSpline,
		ResamplingAlgorithm::Lanczos => ResampleAlg::Lanczos,
	}
}

fn to_gdal_sys_resample_alg(resampling: ResamplingAlgorithm) -> gdal_sys::GDALResampleAlg::Type {
	use gdal_sys::GDALResampleAlg::*;
	match resampling {
		ResamplingAlgorithm::NearestNeighbour => GRA_NearestNeighbour,
		ResamplingAlgorithm::Average | ResamplingAlgorithm::Antialias => GRA_Average,
		ResamplingAlgorithm::Bilinear => GRA_Bilinear,
		ResamplingAlgorithm::Cubic => GRA_Cubic,
		ResamplingAlgorithm::CubicSpline => GRA_CubicSpline,
		ResamplingAlgorithm::Lanczos => GRA_Lanczos,
	}
}

impl RasterAdapter for GdalRasterAdapter {
	fn info(&self) -> &ProjectedRasterInfo {
		&self.info
	}

	fn projected_extent(&self, target_srs: Option<&Srs>) -> TileResult<(f64, f64, f64, f64)> {
		let (ominx, ominy, omaxx, omaxy) = self.info.extent();
		let Some(target_srs) = target_srs else {
			return Ok((ominx, ominy, omaxx, omaxy));
		};

		let dataset = self.dataset.lock().unwrap();
		let src_srs = dataset
			.spatial_ref()
			.map_err(|e| self.read_error(format!("missing source SRS: {e}")))?;
		let dst_srs = gdal::spatial_ref::SpatialRef::from_definition(target_srs.as_wkt())
			.map_err(|e| invalid_input(format!("invalid target SRS: {e}")))?;
		let transform = gdal::spatial_ref::CoordTransform::new(&src_srs, &dst_srs)
			.map_err(|e| self.read_error(format!("cannot build coordinate transform: {e}")))?;

		let mut xs = [ominx, omaxx, ominx, omaxx];
		let mut ys = [ominy, ominy, omaxy, omaxy];
		let mut zs = [0.0; 4];
		transform
			.transform_coords(&mut xs, &mut ys, &mut zs)
			.map_err(|e| self.read_error(format!("cannot transform extent: {e}")))?;

		let min_x = xs.iter().cloned().fold(f64::INFINITY, f64::min);
		let max_x = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
		let min_y = ys.iter().cloned().fold(f64::INFINITY, f64::min);
		let max_y = ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
		Ok((min_x, min_y, max_x, max_y))
	}

	fn read_window(
		&self,
		ulx: f64,
		uly: f64,
		lrx: f64,
		lry: f64,
		out_width: u32,
		out_height: u32,
		target_srs: Option<&Srs>,
		resampling: ResamplingAlgorithm,
	) -> TileResult<RasterWindow> {
		match target_srs {
			Some(srs) => self.warp_and_read(ulx, uly, lrx, lry, out_width, out_height, srs, resampling),
			None => self.direct_read(ulx, uly, lrx, lry, out_width, out_height, resampling),
		}
	}
}
