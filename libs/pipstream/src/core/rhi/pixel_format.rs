// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Pixel format for frame buffers.
//!
//! Enum values are the FourCC codes platform buffer APIs use, so conversion to
//! a native pixel format type is a plain cast.

/// Pixel format of a [`HardwareBuffer`](super::HardwareBuffer).
///
/// The pipeline itself only ever produces [`PixelFormat::Bgra32`]; the other
/// variants exist so buffers delivered by decode layers can be described and
/// rejected explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum PixelFormat {
    /// 32-bit BGRA (8 bits/channel). 'BGRA'
    #[default]
    Bgra32 = 0x42475241,
    /// 32-bit RGBA (8 bits/channel). 'RGBA'
    Rgba32 = 0x52474241,
    /// NV12 YUV 4:2:0 bi-planar, video range. '420v'
    Nv12VideoRange = 0x34323076,
    /// Unknown or unsupported format.
    Unknown = 0x00000000,
}

impl PixelFormat {
    /// Raw FourCC value.
    #[inline]
    pub const fn as_fourcc(&self) -> u32 {
        *self as u32
    }

    pub fn from_fourcc(code: u32) -> Self {
        match code {
            0x42475241 => Self::Bgra32,
            0x52474241 => Self::Rgba32,
            0x34323076 => Self::Nv12VideoRange,
            _ => Self::Unknown,
        }
    }

    /// Bits per pixel for this format.
    pub const fn bits_per_pixel(&self) -> u32 {
        match self {
            Self::Bgra32 | Self::Rgba32 => 32,
            Self::Nv12VideoRange => 12, // Average for 4:2:0
            Self::Unknown => 0,
        }
    }

    /// Bytes per pixel for packed single-plane formats, 0 otherwise.
    pub const fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Bgra32 | Self::Rgba32 => 4,
            Self::Nv12VideoRange | Self::Unknown => 0,
        }
    }

    /// FourCC string representation for debugging.
    pub fn fourcc_string(&self) -> String {
        let code = *self as u32;
        if code < 256 {
            return format!("{}", code);
        }
        code.to_be_bytes()
            .iter()
            .map(|&b| if b.is_ascii_graphic() { b as char } else { '?' })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_bgra() {
        assert_eq!(PixelFormat::default(), PixelFormat::Bgra32);
        assert_eq!(PixelFormat::Bgra32.bytes_per_pixel(), 4);
        assert_eq!(PixelFormat::Bgra32.bits_per_pixel(), 32);
    }

    #[test]
    fn test_fourcc() {
        assert_eq!(PixelFormat::Bgra32.fourcc_string(), "BGRA");
        assert_eq!(PixelFormat::Nv12VideoRange.fourcc_string(), "420v");
        assert_eq!(PixelFormat::from_fourcc(0x42475241), PixelFormat::Bgra32);
        assert_eq!(PixelFormat::from_fourcc(0xdeadbeef), PixelFormat::Unknown);
        assert_eq!(PixelFormat::Unknown.fourcc_string(), "0");
    }
}
