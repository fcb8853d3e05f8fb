// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use image::{DynamicImage, GenericImageView};
use ndarray::{Array3, ArrayView1, ArrayView3, ArrayViewMut3, Axis, Zip};
use std::fmt::{Display, Formatter};

use crate::error::{VisionError, VisionResult};
use crate::hsv::rgb_to_hsv;

/// Byte order of the color channels of a captured frame
///
/// Screen grabbers usually deliver BGRA, image decoders RGB(A).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    Rgb,
    Rgba,
    Bgr,
    Bgra,
}

impl ChannelLayout {
    pub fn channel_count(&self) -> usize {
        match self {
            ChannelLayout::Rgb | ChannelLayout::Bgr => 3,
            ChannelLayout::Rgba | ChannelLayout::Bgra => 4,
        }
    }

    /// Extract `[r, g, b]` from one pixel lane, dropping alpha
    #[inline]
    pub fn rgb_of(&self, pixel: ArrayView1<u8>) -> [u8; 3] {
        match self {
            ChannelLayout::Rgb | ChannelLayout::Rgba => [pixel[0], pixel[1], pixel[2]],
            ChannelLayout::Bgr | ChannelLayout::Bgra => [pixel[2], pixel[1], pixel[0]],
        }
    }
}

impl Display for ChannelLayout {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelLayout::Rgb => write!(f, "ChannelLayout(RGB)"),
            ChannelLayout::Rgba => write!(f, "ChannelLayout(RGBA)"),
            ChannelLayout::Bgr => write!(f, "ChannelLayout(BGR)"),
            ChannelLayout::Bgra => write!(f, "ChannelLayout(BGRA)"),
        }
    }
}

/// A captured region of the screen
///
/// Stores pixel data as a 3D array with height, width, and channel dimensions.
/// (0,0) is the top left corner and y grows downwards, like screen coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageFrame {
    pixels: Array3<u8>, // heights, widths, channels
    channel_layout: ChannelLayout,
}

impl ImageFrame {
    //region Constructors

    /// Creates a new zero-filled (black) frame
    pub fn new(channel_layout: ChannelLayout, width: usize, height: usize) -> ImageFrame {
        ImageFrame {
            pixels: Array3::<u8>::zeros((height, width, channel_layout.channel_count())),
            channel_layout,
        }
    }

    /// Wraps an existing height x width x channels array
    pub fn from_array(pixels: Array3<u8>, channel_layout: ChannelLayout) -> VisionResult<ImageFrame> {
        let channels = pixels.shape()[2];
        if channels != channel_layout.channel_count() {
            return Err(VisionError::UnsupportedChannels(channels));
        }
        Ok(ImageFrame {
            pixels,
            channel_layout,
        })
    }

    /// Wraps a tightly packed, row-major byte buffer (what screen grabbers return)
    pub fn from_raw(
        width: usize,
        height: usize,
        channel_layout: ChannelLayout,
        bytes: Vec<u8>,
    ) -> VisionResult<ImageFrame> {
        let channels = channel_layout.channel_count();
        let actual = bytes.len();
        let pixels = Array3::from_shape_vec((height, width, channels), bytes).map_err(|_| {
            VisionError::BufferSizeMismatch {
                width,
                height,
                channels,
                actual,
            }
        })?;
        Ok(ImageFrame {
            pixels,
            channel_layout,
        })
    }

    pub fn from_dynamic_image(img: DynamicImage) -> VisionResult<ImageFrame> {
        let (width, height) = img.dimensions();
        let (width, height) = (width as usize, height as usize);
        match img {
            DynamicImage::ImageRgba8(buffer) => {
                Self::from_raw(width, height, ChannelLayout::Rgba, buffer.into_raw())
            }
            DynamicImage::ImageRgb8(buffer) => {
                Self::from_raw(width, height, ChannelLayout::Rgb, buffer.into_raw())
            }
            // Grayscale, 16-bit and float images all expand to 8-bit RGB
            other => Self::from_raw(width, height, ChannelLayout::Rgb, other.to_rgb8().into_raw()),
        }
    }

    //endregion

    //region Properties

    pub fn get_channel_layout(&self) -> ChannelLayout {
        self.channel_layout
    }

    pub fn get_width(&self) -> usize {
        self.pixels.shape()[1]
    }

    pub fn get_height(&self) -> usize {
        self.pixels.shape()[0]
    }

    pub fn get_pixel_count(&self) -> usize {
        self.get_width() * self.get_height()
    }

    /// True for a zero-area frame, which carries no signal
    pub fn is_empty(&self) -> bool {
        self.get_pixel_count() == 0
    }

    pub fn get_pixels_view(&self) -> ArrayView3<'_, u8> {
        self.pixels.view()
    }

    pub fn get_pixels_view_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        self.pixels.view_mut()
    }

    //endregion

    //region Pixel access

    pub fn get_rgb(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.get_width() || y >= self.get_height() {
            return None;
        }
        let lane = self.pixels.slice(ndarray::s![y, x, ..]);
        Some(self.channel_layout.rgb_of(lane))
    }

    /// Writes an opaque RGB color; out of range coordinates are ignored
    pub fn set_rgb(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        if x >= self.get_width() || y >= self.get_height() {
            return;
        }
        let layout = self.channel_layout;
        let mut lane = self.pixels.slice_mut(ndarray::s![y, x, ..]);
        match layout {
            ChannelLayout::Rgb | ChannelLayout::Rgba => {
                lane[0] = rgb[0];
                lane[1] = rgb[1];
                lane[2] = rgb[2];
            }
            ChannelLayout::Bgr | ChannelLayout::Bgra => {
                lane[0] = rgb[2];
                lane[1] = rgb[1];
                lane[2] = rgb[0];
            }
        }
        if layout.channel_count() == 4 {
            lane[3] = u8::MAX;
        }
    }

    //endregion

    //region Color conversion

    /// HSV copy of the frame (OpenCV 8-bit convention), height x width x 3
    pub fn to_hsv(&self) -> Array3<u8> {
        let layout = self.channel_layout;
        let mut hsv = Array3::<u8>::zeros((self.get_height(), self.get_width(), 3));
        Zip::from(hsv.lanes_mut(Axis(2)))
            .and(self.pixels.lanes(Axis(2)))
            .par_for_each(|mut out, pixel| {
                let converted = rgb_to_hsv(layout.rgb_of(pixel));
                out[0] = converted[0];
                out[1] = converted[1];
                out[2] = converted[2];
            });
        hsv
    }

    //endregion
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, LumaA, Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn test_new_frame_is_black() {
        let frame = ImageFrame::new(ChannelLayout::Bgra, 4, 2);
        assert_eq!(frame.get_width(), 4);
        assert_eq!(frame.get_height(), 2);
        assert_eq!(frame.get_rgb(3, 1), Some([0, 0, 0]));
        assert_eq!(frame.get_rgb(4, 0), None);
    }

    #[test]
    fn test_bgra_channel_order() {
        // One BGRA pixel: blue=10, green=20, red=30
        let frame = ImageFrame::from_raw(1, 1, ChannelLayout::Bgra, vec![10, 20, 30, 255]).unwrap();
        assert_eq!(frame.get_rgb(0, 0), Some([30, 20, 10]));
    }

    #[test]
    fn test_set_rgb_respects_layout() {
        let mut frame = ImageFrame::new(ChannelLayout::Bgra, 2, 2);
        frame.set_rgb(1, 0, [200, 100, 50]);
        let raw = frame.get_pixels_view();
        assert_eq!(raw[[0, 1, 0]], 50);
        assert_eq!(raw[[0, 1, 2]], 200);
        assert_eq!(raw[[0, 1, 3]], 255);
        assert_eq!(frame.get_rgb(1, 0), Some([200, 100, 50]));
    }

    #[test]
    fn test_raw_size_mismatch() {
        let result = ImageFrame::from_raw(2, 2, ChannelLayout::Rgb, vec![0; 11]);
        assert!(matches!(result, Err(VisionError::BufferSizeMismatch { actual: 11, .. })));
    }

    #[test]
    fn test_from_array_checks_channels() {
        let pixels = Array3::<u8>::zeros((2, 2, 4));
        assert!(ImageFrame::from_array(pixels.clone(), ChannelLayout::Rgba).is_ok());
        assert_eq!(
            ImageFrame::from_array(pixels, ChannelLayout::Rgb),
            Err(VisionError::UnsupportedChannels(4))
        );
    }

    #[test]
    fn test_from_dynamic_image() {
        let mut rgb = RgbImage::new(3, 2);
        rgb.put_pixel(2, 1, Rgb([1, 2, 3]));
        let frame = ImageFrame::from_dynamic_image(DynamicImage::ImageRgb8(rgb)).unwrap();
        assert_eq!(frame.get_channel_layout(), ChannelLayout::Rgb);
        assert_eq!(frame.get_rgb(2, 1), Some([1, 2, 3]));

        let mut rgba = RgbaImage::new(1, 1);
        rgba.put_pixel(0, 0, Rgba([9, 8, 7, 0]));
        let frame = ImageFrame::from_dynamic_image(DynamicImage::ImageRgba8(rgba)).unwrap();
        assert_eq!(frame.get_rgb(0, 0), Some([9, 8, 7]));
    }

    #[test]
    fn test_grayscale_images_expand_to_rgb() {
        let luma8 = ImageBuffer::from_pixel(2, 1, Luma([200u8]));
        let frame = ImageFrame::from_dynamic_image(DynamicImage::ImageLuma8(luma8)).unwrap();
        assert_eq!(frame.get_channel_layout(), ChannelLayout::Rgb);
        assert_eq!(frame.get_rgb(1, 0), Some([200, 200, 200]));

        let luma_alpha = ImageBuffer::from_pixel(1, 1, LumaA([40u8, 0]));
        let frame = ImageFrame::from_dynamic_image(DynamicImage::ImageLumaA8(luma_alpha)).unwrap();
        assert_eq!(frame.get_rgb(0, 0), Some([40, 40, 40]));

        let luma16 = ImageBuffer::from_pixel(1, 1, Luma([u16::MAX]));
        let frame = ImageFrame::from_dynamic_image(DynamicImage::ImageLuma16(luma16)).unwrap();
        assert_eq!(frame.get_rgb(0, 0), Some([255, 255, 255]));
    }

    #[test]
    fn test_to_hsv_shape_and_values() {
        let mut frame = ImageFrame::new(ChannelLayout::Bgra, 3, 1);
        frame.set_rgb(0, 0, [255, 0, 0]);
        frame.set_rgb(1, 0, [0, 255, 0]);
        frame.set_rgb(2, 0, [0, 0, 255]);
        let hsv = frame.to_hsv();
        assert_eq!(hsv.shape(), &[1, 3, 3]);
        assert_eq!([hsv[[0, 0, 0]], hsv[[0, 0, 1]], hsv[[0, 0, 2]]], [0, 255, 255]);
        assert_eq!(hsv[[0, 1, 0]], 60);
        assert_eq!(hsv[[0, 2, 0]], 120);
    }
}
