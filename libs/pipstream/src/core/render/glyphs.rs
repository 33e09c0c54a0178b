// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Segment glyphs for clock and timer readouts.
//!
//! Geometry is expressed in glyph-height units so it scales with the canvas.

use super::Rect;

const SEG_A: u8 = 1 << 0;
const SEG_B: u8 = 1 << 1;
const SEG_C: u8 = 1 << 2;
const SEG_D: u8 = 1 << 3;
const SEG_E: u8 = 1 << 4;
const SEG_F: u8 = 1 << 5;
const SEG_G: u8 = 1 << 6;

const DIGIT_WIDTH: f64 = 0.6;
const THICKNESS: f64 = 0.12;
const NARROW_WIDTH: f64 = 0.3;
pub(crate) const SPACING: f64 = 0.2;

fn digit_mask(digit: u32) -> u8 {
    match digit {
        0 => SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F,
        1 => SEG_B | SEG_C,
        2 => SEG_A | SEG_B | SEG_G | SEG_E | SEG_D,
        3 => SEG_A | SEG_B | SEG_G | SEG_C | SEG_D,
        4 => SEG_F | SEG_G | SEG_B | SEG_C,
        5 => SEG_A | SEG_F | SEG_G | SEG_C | SEG_D,
        6 => SEG_A | SEG_F | SEG_G | SEG_E | SEG_C | SEG_D,
        7 => SEG_A | SEG_B | SEG_C,
        8 => SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F | SEG_G,
        _ => SEG_A | SEG_B | SEG_C | SEG_D | SEG_F | SEG_G,
    }
}

/// Advance width of `c` for a glyph `height` points tall, spacing excluded.
pub(crate) fn advance(c: char, height: f64) -> f64 {
    match c {
        ':' | '.' => NARROW_WIDTH * height,
        _ => DIGIT_WIDTH * height,
    }
}

/// Rectangles (in points) that make up `c` drawn at `(x, y)`.
///
/// Unsupported characters render as blank cells. Returns the number of
/// rectangles written into `out`.
pub(crate) fn segments(c: char, x: f64, y: f64, height: f64, out: &mut [Rect; 7]) -> usize {
    let w = DIGIT_WIDTH * height;
    let t = THICKNESS * height;
    let h = height;

    if let Some(digit) = c.to_digit(10) {
        let mask = digit_mask(digit);
        let all = [
            (SEG_A, Rect::new(x, y, w, t)),
            (SEG_B, Rect::new(x + w - t, y, t, h / 2.0)),
            (SEG_C, Rect::new(x + w - t, y + h / 2.0, t, h / 2.0)),
            (SEG_D, Rect::new(x, y + h - t, w, t)),
            (SEG_E, Rect::new(x, y + h / 2.0, t, h / 2.0)),
            (SEG_F, Rect::new(x, y, t, h / 2.0)),
            (SEG_G, Rect::new(x, y + (h - t) / 2.0, w, t)),
        ];
        let mut count = 0;
        for (bit, rect) in all {
            if mask & bit != 0 {
                out[count] = rect;
                count += 1;
            }
        }
        return count;
    }

    let dot_x = x + (NARROW_WIDTH * height - t) / 2.0;
    match c {
        ':' => {
            out[0] = Rect::new(dot_x, y + h * 0.3, t, t);
            out[1] = Rect::new(dot_x, y + h * 0.7 - t, t, t);
            2
        }
        '.' => {
            out[0] = Rect::new(dot_x, y + h - t, t, t);
            1
        }
        '-' => {
            out[0] = Rect::new(x, y + (h - t) / 2.0, w, t);
            1
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eight_lights_every_segment() {
        let mut out = [Rect::default(); 7];
        assert_eq!(segments('8', 0.0, 0.0, 10.0, &mut out), 7);
        assert_eq!(segments('1', 0.0, 0.0, 10.0, &mut out), 2);
    }

    #[test]
    fn test_punctuation_and_blank() {
        let mut out = [Rect::default(); 7];
        assert_eq!(segments(':', 0.0, 0.0, 10.0, &mut out), 2);
        assert_eq!(segments('.', 0.0, 0.0, 10.0, &mut out), 1);
        assert_eq!(segments(' ', 0.0, 0.0, 10.0, &mut out), 0);
        assert!(advance(':', 10.0) < advance('0', 10.0));
    }
}
