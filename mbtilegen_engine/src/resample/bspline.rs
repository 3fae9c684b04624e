//! A separable cubic B-spline resize, used by the overview phase for the
//! `cubicspline` kernel. Distinct from the Lanczos windowed-sinc filter in
//! `antialias.rs`: the cardinal cubic B-spline is a strictly local,
//! non-negative kernel with support radius 2, matching GDAL's
//! `GRA_CubicSpline` behavior for the base-phase warp more closely than a
//! sinc-based filter would.

use super::TileImage;

const RADIUS: f64 = 2.0;

/// The cardinal cubic B-spline basis function, support `[-2, 2]`.
fn bspline_weight(x: f64) -> f64 {
	let x = x.abs();
	if x < 1.0 {
		(4.0 - 6.0 * x * x + 3.0 * x * x * x) / 6.0
	} else if x < 2.0 {
		let t = 2.0 - x;
		(t * t * t) / 6.0
	} else {
		0.0
	}
}

/// Resizes `src` to `(out_width, out_height)` using a separable cubic
/// B-spline filter. Used for downsampling only, matching the overview
/// phase's only use case.
pub fn resize(src: &TileImage, out_width: u32, out_height: u32) -> TileImage {
	let horizontal = resize_axis(src, out_width, Axis::Horizontal);
	resize_axis(&horizontal, out_height, Axis::Vertical)
}

enum Axis {
	Horizontal,
	Vertical,
}

fn resize_axis(src: &TileImage, out_len: u32, axis: Axis) -> TileImage {
	let (in_len, fixed_len) = match axis {
		Axis::Horizontal => (src.width, src.height),
		Axis::Vertical => (src.height, src.width),
	};
	let (out_width, out_height) = match axis {
		Axis::Horizontal => (out_len, fixed_len),
		Axis::Vertical => (fixed_len, out_len),
	};

	let scale = in_len as f64 / out_len.max(1) as f64;
	let filter_scale = scale.max(1.0);
	let radius = (RADIUS * filter_scale).ceil() as i64;

	let mut dst = TileImage::new_filled(out_width, out_height, src.band_count, 0);

	for out_index in 0..out_len {
		let center = (out_index as f64 + 0.5) * scale - 0.5;
		let first = (center - radius as f64).floor() as i64;
		let last = (center + radius as f64).ceil() as i64;

		let mut weights = Vec::with_capacity((last - first + 1).max(0) as usize);
		let mut weight_sum = 0.0;
		for i in first..=last {
			let w = bspline_weight((i as f64 - center) / filter_scale);
			weights.push((i, w));
			weight_sum += w;
		}
		if weight_sum.abs() < 1e-12 {
			weight_sum = 1.0;
		}

		for fixed in 0..fixed_len {
			let mut accum = vec![0.0f64; src.band_count as usize];
			for &(i, w) in &weights {
				let clamped = i.clamp(0, in_len as i64 - 1) as u32;
				let pixel = match axis {
					Axis::Horizontal => src.pixel(clamped, fixed),
					Axis::Vertical => src.pixel(fixed, clamped),
				};
				for (band, &sample) in pixel.iter().enumerate() {
					accum[band] += sample as f64 * w;
				}
			}
			let value: Vec<u8> = accum.iter().map(|&v| (v / weight_sum).round().clamp(0.0, 255.0) as u8).collect();
			match axis {
				Axis::Horizontal => dst.set_pixel(out_index, fixed, &value),
				Axis::Vertical => dst.set_pixel(fixed, out_index, &value),
			}
		}
	}

	dst
}
