// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The shared raster handle. Decode/encode to concrete image formats lives
//! in `towerscan_imaging::raster_io`; this type only owns the pixel bytes
//! and the shape tag describing them.

use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::error::{Error, Result};

/// Pixel layout of a [`RasterBuffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// One 8-bit channel (grayscale).
    Gray8,
    /// Three 8-bit channels, RGB order.
    Rgb8,
    /// Four 8-bit channels, RGBA order.
    Rgba8,
}

impl PixelFormat {
    /// Bytes per pixel for this format.
    #[must_use]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Gray8 => 1,
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

/// A shape-tagged, reference-counted byte buffer: "copy is by sharing with
/// reference counting" realized literally via `Arc`.
///
/// Cloning a `RasterBuffer` is `O(1)` and shares the underlying bytes;
/// [`RasterBuffer::make_mut`] gives copy-on-write access, cloning the
/// backing storage only if another handle is still holding it.
#[derive(Clone, Debug)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Arc<Vec<u8>>,
}

impl RasterBuffer {
    /// Builds a raster from pixel bytes. Returns `Error::DataEmpty` if
    /// `width` or `height` is zero, or `Error::InvalidArgument` if
    /// `data.len()` does not match `width * height *
    /// format.bytes_per_pixel()`.
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::DataEmpty(alloc::format!(
                "raster has zero extent: {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if data.len() != expected {
            return Err(Error::InvalidArgument(alloc::format!(
                "expected {expected} bytes for a {width}x{height} {format:?} raster, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            format,
            data: Arc::new(data),
        })
    }

    /// A raster of `format`'s zero value (black/transparent), `width` x
    /// `height`.
    #[must_use]
    pub fn zeros(width: u32, height: u32, format: PixelFormat) -> Self {
        let len = width as usize * height as usize * format.bytes_per_pixel();
        Self {
            width,
            height,
            format,
            data: Arc::new(alloc::vec![0u8; len]),
        }
    }

    /// Raster width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Raster height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Pixel format.
    #[must_use]
    pub const fn format(&self) -> PixelFormat {
        self.format
    }

    /// Read-only view of the pixel bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// True iff `other` shares the same underlying allocation as `self`
    /// (i.e. no write to either has forced a copy yet).
    #[must_use]
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Mutable, copy-on-write access to the pixel bytes: if this is the
    /// only handle to the backing storage, mutates in place; otherwise
    /// clones the storage first so sibling handles are unaffected.
    pub fn make_mut(&mut self) -> &mut Vec<u8> {
        Arc::make_mut(&mut self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_byte_length() {
        assert!(RasterBuffer::new(2, 2, PixelFormat::Gray8, alloc::vec![0u8; 3]).is_err());
    }

    #[test]
    fn rejects_zero_extent_raster() {
        assert!(matches!(
            RasterBuffer::new(0, 0, PixelFormat::Gray8, alloc::vec![]),
            Err(Error::DataEmpty(_))
        ));
        assert!(matches!(
            RasterBuffer::new(0, 4, PixelFormat::Gray8, alloc::vec![]),
            Err(Error::DataEmpty(_))
        ));
    }

    #[test]
    fn zeros_has_expected_length() {
        let r = RasterBuffer::zeros(4, 3, PixelFormat::Rgb8);
        assert_eq!(r.as_bytes().len(), 4 * 3 * 3);
    }

    #[test]
    fn clone_shares_storage_until_mutated() {
        let a = RasterBuffer::zeros(2, 2, PixelFormat::Gray8);
        let mut b = a.clone();
        assert!(a.shares_storage_with(&b));
        b.make_mut()[0] = 255;
        assert!(!a.shares_storage_with(&b));
        assert_eq!(a.as_bytes()[0], 0);
        assert_eq!(b.as_bytes()[0], 255);
    }
}
