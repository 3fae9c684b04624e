//! Tile encoding, via the `image` crate: decode/compose stays in a plain
//! pixel buffer and only the final step hands off to a dedicated encoder
//! rather than special-casing each format inline.

use std::io::Cursor;

use image::{ColorType, ImageEncoder};
use mbtilegen_core::{TileError, TileFormat};

use crate::resample::TileImage;

pub fn encode(image: &TileImage, format: TileFormat, jpeg_quality: u8) -> Result<Vec<u8>, TileError> {
	let mut buffer = Vec::new();
	let mut cursor = Cursor::new(&mut buffer);

	let color = match image.band_count {
		1 => ColorType::L8,
		2 => ColorType::La8,
		3 => ColorType::Rgb8,
		4 => ColorType::Rgba8,
		other => return Err(TileError::InvalidInput(format!("unsupported band count for encoding: {other}"))),
	};

	match format {
		TileFormat::Png => {
			let encoder = image::codecs::png::PngEncoder::new(&mut cursor);
			encoder
				.write_image(&image.samples, image.width, image.height, color)
				.map_err(|e| TileError::InvalidInput(format!("PNG encode failed: {e}")))?;
		}
		TileFormat::Jpeg => {
			let rgb = to_rgb(image);
			let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, jpeg_quality);
			encoder
				.encode(&rgb.samples, rgb.width, rgb.height, ColorType::Rgb8)
				.map_err(|e| TileError::InvalidInput(format!("JPEG encode failed: {e}")))?;
		}
	}

	Ok(buffer)
}

/// Decodes back into the same band layout it was encoded with — a
/// grayscale or grayscale+alpha PNG stays 1/2 bands, an RGB JPEG stays 3 —
/// so a decode/re-encode round trip through the overview phase never
/// invents an alpha channel the original tile didn't have.
pub fn decode(bytes: &[u8]) -> Result<TileImage, TileError> {
	let decoded =
		image::load_from_memory(bytes).map_err(|e| TileError::InvalidInput(format!("tile decode failed: {e}")))?;
	let (width, height) = (decoded.width(), decoded.height());
	let (band_count, samples) = match decoded.color() {
		ColorType::L8 => (1, decoded.to_luma8().into_raw()),
		ColorType::La8 => (2, decoded.to_luma_alpha8().into_raw()),
		ColorType::Rgb8 => (3, decoded.to_rgb8().into_raw()),
		_ => (4, decoded.to_rgba8().into_raw()),
	};
	Ok(TileImage { width, height, band_count, samples })
}

/// JPEG has no alpha channel; dropping a present alpha band or replicating
/// a single luma band into RGB are the only conversions needed here since
/// `encode` only ever hands this 1/2/3/4-band images.
fn to_rgb(image: &TileImage) -> TileImage {
	if image.band_count == 3 {
		return image.clone();
	}
	let band_count = image.band_count as usize;
	let mut samples = Vec::with_capacity(image.width as usize * image.height as usize * 3);
	for pixel in image.samples.chunks(band_count) {
		let luma = pixel[0];
		match band_count {
			1 | 2 => samples.extend([luma, luma, luma]),
			_ => samples.extend_from_slice(&pixel[..3]),
		}
	}
	TileImage { width: image.width, height: image.height, band_count: 3, samples }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn png_round_trips_rgba() {
		let mut image = TileImage::new_filled(4, 4, 4, 0);
		image.set_pixel(1, 1, &[10, 20, 30, 255]);
		let bytes = encode(&image, TileFormat::Png, 85).unwrap();
		let decoded = decode(&bytes).unwrap();
		assert_eq!(decoded.pixel(1, 1), &[10, 20, 30, 255]);
	}

	#[test]
	fn jpeg_encodes_without_error() {
		let image = TileImage::new_filled(8, 8, 3, 128);
		let bytes = encode(&image, TileFormat::Jpeg, 90).unwrap();
		assert!(!bytes.is_empty());
	}

	#[test]
	fn rgba_flattens_to_rgb_for_jpeg() {
		let image = TileImage::new_filled(2, 2, 4, 200);
		let bytes = encode(&image, TileFormat::Jpeg, 90).unwrap();
		assert!(!bytes.is_empty());
	}

	#[test]
	fn grayscale_plus_alpha_round_trips_without_gaining_color_bands() {
		let mut image = TileImage::new_filled(4, 4, 2, 0);
		image.set_pixel(1, 1, &[42, 255]);
		let bytes = encode(&image, TileFormat::Png, 85).unwrap();
		let decoded = decode(&bytes).unwrap();
		assert_eq!(decoded.band_count, 2);
		assert_eq!(decoded.pixel(1, 1), &[42, 255]);
	}

	#[test]
	fn grayscale_round_trips_as_a_single_band() {
		let mut image = TileImage::new_filled(4, 4, 1, 0);
		image.set_pixel(0, 0, &[77]);
		let bytes = encode(&image, TileFormat::Png, 85).unwrap();
		let decoded = decode(&bytes).unwrap();
		assert_eq!(decoded.band_count, 1);
		assert_eq!(decoded.pixel(0, 0), &[77]);
	}
}
