// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decoding/encoding between [`towerscan_core::RasterBuffer`] and real
//! image files (PNG/JPEG/TIFF/BMP), built on the `image` crate.

use std::path::Path;

use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use towerscan_core::{PixelFormat, RasterBuffer};

use crate::error::Result;

/// Decodes an image file into a [`RasterBuffer`]. Color images are kept in
/// their native channel count (RGB or RGBA); callers that need grayscale
/// should run the pipeline's own conversion explicitly, matching the
/// contract that `ImageProcess` ops never silently reinterpret channel
/// count.
pub fn read_raster(path: impl AsRef<Path>) -> Result<RasterBuffer> {
    let dynamic = image::open(path)?;
    Ok(from_dynamic_image(&dynamic))
}

/// Encodes a [`RasterBuffer`] to an image file, format inferred from the
/// path's extension (as `image::save_buffer` does).
pub fn write_raster(path: impl AsRef<Path>, raster: &RasterBuffer) -> Result<()> {
    let color = match raster.format() {
        PixelFormat::Gray8 => image::ColorType::L8,
        PixelFormat::Rgb8 => image::ColorType::Rgb8,
        PixelFormat::Rgba8 => image::ColorType::Rgba8,
    };
    image::save_buffer(path, raster.as_bytes(), raster.width(), raster.height(), color)?;
    Ok(())
}

/// Converts a decoded `image::DynamicImage` into a [`RasterBuffer`],
/// preserving grayscale/RGB/RGBA as the closest matching [`PixelFormat`].
#[must_use]
pub fn from_dynamic_image(dynamic: &DynamicImage) -> RasterBuffer {
    match dynamic {
        DynamicImage::ImageLuma8(gray) => {
            RasterBuffer::new(gray.width(), gray.height(), PixelFormat::Gray8, gray.clone().into_raw())
                .expect("image crate buffer length matches its own reported dimensions")
        }
        DynamicImage::ImageRgba8(rgba) => {
            RasterBuffer::new(rgba.width(), rgba.height(), PixelFormat::Rgba8, rgba.clone().into_raw())
                .expect("image crate buffer length matches its own reported dimensions")
        }
        other => {
            let rgb = other.to_rgb8();
            RasterBuffer::new(rgb.width(), rgb.height(), PixelFormat::Rgb8, rgb.into_raw())
                .expect("image crate buffer length matches its own reported dimensions")
        }
    }
}

/// Converts a [`RasterBuffer`] into an `image::DynamicImage` for callers
/// that want to hand off to the rest of the `image`/`imageproc` ecosystem.
#[must_use]
pub fn to_dynamic_image(raster: &RasterBuffer) -> DynamicImage {
    match raster.format() {
        PixelFormat::Gray8 => {
            let img = GrayImage::from_raw(raster.width(), raster.height(), raster.as_bytes().to_vec())
                .expect("RasterBuffer invariant guarantees matching byte length");
            DynamicImage::ImageLuma8(img)
        }
        PixelFormat::Rgb8 => {
            let img = RgbImage::from_raw(raster.width(), raster.height(), raster.as_bytes().to_vec())
                .expect("RasterBuffer invariant guarantees matching byte length");
            DynamicImage::ImageRgb8(img)
        }
        PixelFormat::Rgba8 => {
            let img = RgbaImage::from_raw(raster.width(), raster.height(), raster.as_bytes().to_vec())
                .expect("RasterBuffer invariant guarantees matching byte length");
            DynamicImage::ImageRgba8(img)
        }
    }
}

/// Converts any raster to single-channel grayscale, the input format most
/// of the pipeline's ops expect.
#[must_use]
pub fn to_grayscale(raster: &RasterBuffer) -> RasterBuffer {
    if raster.format() == PixelFormat::Gray8 {
        return raster.clone();
    }
    let gray = to_dynamic_image(raster).to_luma8();
    RasterBuffer::new(gray.width(), gray.height(), PixelFormat::Gray8, gray.into_raw())
        .expect("image crate buffer length matches its own reported dimensions")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grayscale_round_trip_preserves_shape() {
        let gray = GrayImage::from_raw(4, 3, vec![128u8; 12]).unwrap();
        let dynamic = DynamicImage::ImageLuma8(gray);
        let raster = from_dynamic_image(&dynamic);
        assert_eq!(raster.width(), 4);
        assert_eq!(raster.height(), 3);
        assert_eq!(raster.format(), PixelFormat::Gray8);
        let back = to_dynamic_image(&raster);
        assert_eq!(back.to_luma8().as_raw(), &vec![128u8; 12]);
    }

    #[test]
    fn to_grayscale_is_identity_on_gray_input() {
        let raster = RasterBuffer::zeros(2, 2, PixelFormat::Gray8);
        let converted = to_grayscale(&raster);
        assert_eq!(converted.format(), PixelFormat::Gray8);
        assert_eq!(converted.as_bytes(), raster.as_bytes());
    }
}
