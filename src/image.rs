//! Dense f64 pixel grid shared by the detector maps and ring images.
//!
//! Rows are stored contiguously with `stride == w`, so `data` is also a
//! flat slice over the whole panel. Values here are physical quantities
//! or normalized intensities; quantization to 8-bit grayscale is
//! confined to the PNG export.

use crate::error::PatternError;
use image::{GrayImage, Luma};
use std::path::Path;

#[derive(Clone, Debug)]
pub struct ImageF64 {
    /// Panel width in pixels
    pub w: usize,
    /// Panel height in pixels
    pub h: usize,
    /// Elements per row (always `w`)
    pub stride: usize,
    /// Row-major pixel values, `h * stride` long
    pub data: Vec<f64>,
}

impl ImageF64 {
    /// Zero-filled grid of `w x h` pixels.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            stride: w,
            data: vec![0.0; w * h],
        }
    }

    /// Grid filled by evaluating `f(x, y)` at every pixel.
    pub fn from_fn(w: usize, h: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut out = Self::new(w, h);
        for y in 0..h {
            for x in 0..w {
                out.set(x, y, f(x, y));
            }
        }
        out
    }

    #[inline]
    /// Flat offset of pixel (x, y) in `data`.
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.stride + x
    }

    #[inline]
    /// Value at pixel (x, y).
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[self.idx(x, y)]
    }

    #[inline]
    /// Overwrite pixel (x, y).
    pub fn set(&mut self, x: usize, y: usize, v: f64) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    /// Maximum pixel value, skipping NaNs. `None` when every pixel is NaN
    /// or the image is empty.
    pub fn nanmax(&self) -> Option<f64> {
        self.data
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }

    /// Copy with `top` rows removed from both vertical edges and `left`
    /// columns removed from both horizontal edges.
    pub fn crop_borders(&self, top: usize, left: usize) -> ImageF64 {
        assert!(2 * top < self.h && 2 * left < self.w, "crop exceeds image");
        let (nw, nh) = (self.w - 2 * left, self.h - 2 * top);
        let mut out = ImageF64::new(nw, nh);
        for y in 0..nh {
            let src = self.idx(left, y + top);
            out.data[y * nw..(y + 1) * nw].copy_from_slice(&self.data[src..src + nw]);
        }
        out
    }

    /// Write the buffer to an 8-bit grayscale PNG, clamping values to
    /// [0, 1]. NaNs map to black.
    pub fn save_grayscale_png(&self, path: &Path) -> Result<(), PatternError> {
        let mut img = GrayImage::new(self.w as u32, self.h as u32);
        for y in 0..self.h {
            for x in 0..self.w {
                let v = self.get(x, y);
                let v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
                img.put_pixel(x as u32, y as u32, Luma([(v * 255.0).round() as u8]));
            }
        }
        img.save(path).map_err(|e| PatternError::Render(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_keeps_center() {
        let img = ImageF64::from_fn(6, 4, |x, y| (y * 6 + x) as f64);
        let c = img.crop_borders(1, 2);
        assert_eq!((c.w, c.h), (2, 2));
        assert_eq!(c.get(0, 0), img.get(2, 1));
        assert_eq!(c.get(1, 1), img.get(3, 2));
    }

    #[test]
    fn nanmax_skips_nan() {
        let mut img = ImageF64::new(2, 2);
        img.set(0, 0, f64::NAN);
        img.set(1, 1, 3.5);
        assert_eq!(img.nanmax(), Some(3.5));
    }
}
