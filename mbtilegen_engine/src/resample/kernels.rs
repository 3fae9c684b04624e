//! Half-scale downsampling kernels for the overview phase: each
//! overview tile is built from up to four already-rendered child tiles,
//! each scaled down by exactly 2x before being pasted into a quadrant.

use mbtilegen_core::ResamplingAlgorithm;

use super::{antialias, bspline, TileImage};

/// Scales `src` down to half its width and height using `algorithm`.
pub fn downsample_half(src: &TileImage, algorithm: ResamplingAlgorithm) -> TileImage {
	let out_width = (src.width / 2).max(1);
	let out_height = (src.height / 2).max(1);
	match algorithm {
		ResamplingAlgorithm::NearestNeighbour => nearest_half(src, out_width, out_height),
		ResamplingAlgorithm::Average => average_half(src, out_width, out_height),
		ResamplingAlgorithm::CubicSpline => bspline::resize(src, out_width, out_height),
		ResamplingAlgorithm::Bilinear | ResamplingAlgorithm::Cubic | ResamplingAlgorithm::Lanczos | ResamplingAlgorithm::Antialias => {
			antialias::resize(src, out_width, out_height)
		}
	}
}

fn nearest_half(src: &TileImage, out_width: u32, out_height: u32) -> TileImage {
	let mut dst = TileImage::new_filled(out_width, out_height, src.band_count, 0);
	for y in 0..out_height {
		for x in 0..out_width {
			let value = src.pixel(x * 2, y * 2).to_vec();
			dst.set_pixel(x, y, &value);
		}
	}
	dst
}

fn average_half(src: &TileImage, out_width: u32, out_height: u32) -> TileImage {
	let mut dst = TileImage::new_filled(out_width, out_height, src.band_count, 0);
	for y in 0..out_height {
		for x in 0..out_width {
			let mut accum = vec![0u32; src.band_count as usize];
			let mut count = 0u32;
			for dy in 0..2 {
				for dx in 0..2 {
					let sx = x * 2 + dx;
					let sy = y * 2 + dy;
					if sx < src.width && sy < src.height {
						for (band, &sample) in src.pixel(sx, sy).iter().enumerate() {
							accum[band] += sample as u32;
						}
						count += 1;
					}
				}
			}
			let value: Vec<u8> = accum.iter().map(|&v| (v / count.max(1)) as u8).collect();
			dst.set_pixel(x, y, &value);
		}
	}
	dst
}

#[cfg(test)]
mod tests {
	use super::*;

	fn checkerboard() -> TileImage {
		let mut image = TileImage::new_filled(4, 4, 1, 0);
		for y in 0..4 {
			for x in 0..4 {
				let value = if (x + y) % 2 == 0 { 255 } else { 0 };
				image.set_pixel(x, y, &[value]);
			}
		}
		image
	}

	#[test]
	fn nearest_picks_top_left_of_each_block() {
		let src = checkerboard();
		let dst = downsample_half(&src, ResamplingAlgorithm::NearestNeighbour);
		assert_eq!(dst.width, 2);
		assert_eq!(dst.pixel(0, 0), src.pixel(0, 0));
	}

	#[test]
	fn average_of_checkerboard_is_mid_gray() {
		let src = checkerboard();
		let dst = downsample_half(&src, ResamplingAlgorithm::Average);
		for pixel in dst.samples.chunks(1) {
			assert_eq!(pixel[0], 127);
		}
	}

	#[test]
	fn output_dimensions_are_halved() {
		let src = TileImage::new_filled(256, 256, 4, 50);
		for algorithm in [
			ResamplingAlgorithm::NearestNeighbour,
			ResamplingAlgorithm::Average,
			ResamplingAlgorithm::Lanczos,
			ResamplingAlgorithm::CubicSpline,
		] {
			let dst = downsample_half(&src, algorithm);
			assert_eq!(dst.width, 128);
			assert_eq!(dst.height, 128);
		}
	}
}
