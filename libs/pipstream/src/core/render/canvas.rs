// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! BGRA 2D drawing context over a locked pixel buffer.
//!
//! Callers draw in logical points; the canvas applies the device scale factor.

use super::glyphs;
use crate::core::sources::ContentSize;
use crate::core::{Result, StreamError};

const BYTES_PER_PIXEL: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[inline]
    fn to_bgra(self) -> [u8; 4] {
        [self.b, self.g, self.r, self.a]
    }

    #[inline]
    fn from_bgra(px: &[u8]) -> Self {
        Self {
            b: px[0],
            g: px[1],
            r: px[2],
            a: px[3],
        }
    }
}

/// Axis-aligned rectangle in points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

pub struct Canvas<'a> {
    pixels: &'a mut [u8],
    width: u32,
    height: u32,
    bytes_per_row: usize,
    scale: f64,
}

impl<'a> Canvas<'a> {
    /// Wrap locked buffer memory.
    ///
    /// Fails with [`StreamError::RenderFailed`] when the memory cannot hold a
    /// `width` x `height` BGRA image at `bytes_per_row`.
    pub fn new(
        pixels: &'a mut [u8],
        width: u32,
        height: u32,
        bytes_per_row: usize,
        scale: f64,
    ) -> Result<Self> {
        if bytes_per_row < width as usize * BYTES_PER_PIXEL {
            return Err(StreamError::RenderFailed(format!(
                "stride {} too small for width {}",
                bytes_per_row, width
            )));
        }
        if pixels.len() < bytes_per_row * height as usize {
            return Err(StreamError::RenderFailed(format!(
                "buffer holds {} bytes, need {}",
                pixels.len(),
                bytes_per_row * height as usize
            )));
        }
        if !(scale.is_finite() && scale > 0.0) {
            return Err(StreamError::RenderFailed(format!("invalid scale {}", scale)));
        }
        Ok(Self {
            pixels,
            width,
            height,
            bytes_per_row,
            scale,
        })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn pixel_width(&self) -> u32 {
        self.width
    }

    pub fn pixel_height(&self) -> u32 {
        self.height
    }

    /// Drawable area in points.
    pub fn size(&self) -> ContentSize {
        ContentSize::new(
            self.width as f64 / self.scale,
            self.height as f64 / self.scale,
        )
    }

    pub fn clear(&mut self, color: Color) {
        let px = color.to_bgra();
        let row_bytes = self.width as usize * BYTES_PER_PIXEL;
        for row in self.pixels.chunks_exact_mut(self.bytes_per_row).take(self.height as usize) {
            for dst in row[..row_bytes].chunks_exact_mut(BYTES_PER_PIXEL) {
                dst.copy_from_slice(&px);
            }
        }
    }

    /// Fill `rect` (points), clipped to the canvas.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let x0 = self.to_pixel(rect.x, self.width);
        let x1 = self.to_pixel(rect.x + rect.width, self.width);
        let y0 = self.to_pixel(rect.y, self.height);
        let y1 = self.to_pixel(rect.y + rect.height, self.height);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let px = color.to_bgra();
        for y in y0..y1 {
            let row = y * self.bytes_per_row;
            let span = &mut self.pixels[row + x0 * BYTES_PER_PIXEL..row + x1 * BYTES_PER_PIXEL];
            for dst in span.chunks_exact_mut(BYTES_PER_PIXEL) {
                dst.copy_from_slice(&px);
            }
        }
    }

    /// Width in points `text` occupies at glyph height `height`.
    pub fn text_width(text: &str, height: f64) -> f64 {
        let mut width = 0.0;
        for (i, c) in text.chars().enumerate() {
            if i > 0 {
                width += glyphs::SPACING * height;
            }
            width += glyphs::advance(c, height);
        }
        width
    }

    /// Draw a segment-style readout with its top-left corner at `(x, y)`.
    ///
    /// Supports digits, `:`, `.`, `-` and space. Returns the drawn width.
    pub fn draw_text(&mut self, text: &str, x: f64, y: f64, height: f64, color: Color) -> f64 {
        let mut rects = [Rect::default(); 7];
        let mut pen = x;
        for (i, c) in text.chars().enumerate() {
            if i > 0 {
                pen += glyphs::SPACING * height;
            }
            let count = glyphs::segments(c, pen, y, height, &mut rects);
            for rect in &rects[..count] {
                self.fill_rect(*rect, color);
            }
            pen += glyphs::advance(c, height);
        }
        pen - x
    }

    /// Draw `text` centered in the canvas, sized to fit `fill` of the width.
    pub fn draw_text_centered(&mut self, text: &str, fill: f64, color: Color) {
        let size = self.size();
        let unit_width = Self::text_width(text, 1.0);
        if unit_width <= 0.0 {
            return;
        }
        let height = (size.width * fill / unit_width).min(size.height * fill);
        let width = Self::text_width(text, height);
        let x = (size.width - width) / 2.0;
        let y = (size.height - height) / 2.0;
        self.draw_text(text, x, y, height, color);
    }

    /// Read back one pixel (pixel coordinates).
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = y as usize * self.bytes_per_row + x as usize * BYTES_PER_PIXEL;
        Some(Color::from_bgra(&self.pixels[offset..offset + BYTES_PER_PIXEL]))
    }

    #[inline]
    fn to_pixel(&self, points: f64, limit: u32) -> usize {
        (points * self.scale).round().clamp(0.0, limit as f64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(width: u32, height: u32) -> (Vec<u8>, usize) {
        let stride = width as usize * 4 + 16;
        (vec![0u8; stride * height as usize], stride)
    }

    #[test]
    fn test_clear_and_fill_in_points() {
        let (mut bytes, stride) = storage(20, 10);
        let mut canvas = Canvas::new(&mut bytes, 20, 10, stride, 2.0).unwrap();
        assert_eq!(canvas.size(), ContentSize::new(10.0, 5.0));

        canvas.clear(Color::BLACK);
        canvas.fill_rect(Rect::new(1.0, 1.0, 2.0, 2.0), Color::WHITE);

        assert_eq!(canvas.pixel(0, 0), Some(Color::BLACK));
        assert_eq!(canvas.pixel(2, 2), Some(Color::WHITE));
        assert_eq!(canvas.pixel(5, 5), Some(Color::WHITE));
        assert_eq!(canvas.pixel(6, 6), Some(Color::BLACK));
        assert_eq!(canvas.pixel(20, 0), None);
    }

    #[test]
    fn test_fill_is_clipped() {
        let (mut bytes, stride) = storage(4, 4);
        let mut canvas = Canvas::new(&mut bytes, 4, 4, stride, 1.0).unwrap();
        canvas.fill_rect(Rect::new(-10.0, -10.0, 100.0, 100.0), Color::WHITE);
        assert_eq!(canvas.pixel(3, 3), Some(Color::WHITE));
    }

    #[test]
    fn test_stride_padding_untouched() {
        let (mut bytes, stride) = storage(2, 1);
        {
            let mut canvas = Canvas::new(&mut bytes, 2, 1, stride, 1.0).unwrap();
            canvas.clear(Color::WHITE);
        }
        assert!(bytes[8..stride].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_rejects_undersized_memory() {
        let mut bytes = vec![0u8; 10];
        assert!(Canvas::new(&mut bytes, 4, 4, 16, 1.0).is_err());
        let mut bytes = vec![0u8; 64];
        assert!(Canvas::new(&mut bytes, 4, 4, 8, 1.0).is_err());
        assert!(Canvas::new(&mut bytes, 4, 4, 16, 0.0).is_err());
    }

    #[test]
    fn test_draw_text_marks_pixels() {
        let (mut bytes, stride) = storage(100, 40);
        let mut canvas = Canvas::new(&mut bytes, 100, 40, stride, 1.0).unwrap();
        canvas.clear(Color::BLACK);
        let width = canvas.draw_text("8", 0.0, 0.0, 40.0, Color::WHITE);

        assert!((width - 24.0).abs() < 1e-9);
        // Top bar of the 8.
        assert_eq!(canvas.pixel(10, 1), Some(Color::WHITE));
        // Hole in the upper half.
        assert_eq!(canvas.pixel(12, 10), Some(Color::BLACK));
    }

    #[test]
    fn test_text_width() {
        assert_eq!(Canvas::text_width("", 10.0), 0.0);
        let two = Canvas::text_width("00", 10.0);
        assert!((two - (6.0 + 2.0 + 6.0)).abs() < 1e-9);
    }
}
