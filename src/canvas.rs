//! Two colour bitmap that holds one complete label.
//!
//! `x` runs along the tape (feed direction), `y` across it. A canvas's
//! height therefore is the span that must fit on the tape.

use std::{
    fs,
    io::{self, Read},
    path::Path,
};

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use log::debug;

use crate::error::Error;

pub const WHITE: [u8; 3] = [255, 255, 255];
pub const BLACK: [u8; 3] = [0, 0, 0];

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: u32,
    height: u32,
    palette: [[u8; 3]; 2],
    /// One palette index (0 or 1) per pixel, row major.
    pixels: Vec<u8>,
}

impl Canvas {
    /// Blank canvas with a white background and black ink.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_palette(width, height, [WHITE, BLACK])
    }

    pub fn with_palette(width: u32, height: u32, palette: [[u8; 3]; 2]) -> Self {
        Canvas {
            width,
            height,
            palette,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn palette(&self) -> [[u8; 3]; 2] {
        self.palette
    }

    /// Palette index of the darker colour, the one that is printed.
    pub fn ink(&self) -> u8 {
        let sum = |c: [u8; 3]| c.iter().map(|&v| v as u32).sum::<u32>();
        if sum(self.palette[1]) < sum(self.palette[0]) {
            1
        } else {
            0
        }
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.pixels[self.index(x, y)]
    }

    /// Set a pixel to a palette index. Out of range writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, color: u8) {
        if x < self.width && y < self.height {
            let i = self.index(x, y);
            self.pixels[i] = color & 1;
        }
    }

    pub fn is_ink(&self, x: u32, y: u32) -> bool {
        self.get(x, y) == self.ink()
    }

    /// Paint ink at a pixel, whatever the palette order is.
    pub fn set_ink(&mut self, x: u32, y: u32) {
        let ink = self.ink();
        self.set(x, y, ink);
    }

    /// Copy `src` onto this canvas with its left edge at `x`, top aligned.
    ///
    /// Colours are mapped by role, so ink stays ink even when the two
    /// palettes are ordered differently.
    pub fn blit(&mut self, src: &Canvas, x: u32) {
        let ink = self.ink();
        let paper = 1 - ink;
        for sy in 0..src.height.min(self.height) {
            for sx in 0..src.width {
                let color = if src.is_ink(sx, sy) { ink } else { paper };
                self.set(x + sx, sy, color);
            }
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Convert a decoded image.
    ///
    /// An image using at most two colours keeps them as its palette. Anything
    /// else is thresholded to black and white. Transparent pixels count as
    /// white.
    pub fn from_image(img: &DynamicImage) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let colors: Vec<[u8; 3]> = rgba
            .pixels()
            .map(|p| {
                if p[3] < 128 {
                    WHITE
                } else {
                    [p[0], p[1], p[2]]
                }
            })
            .collect();

        let mut seen: Vec<[u8; 3]> = Vec::with_capacity(3);
        for c in &colors {
            if !seen.contains(c) {
                seen.push(*c);
                if seen.len() > 2 {
                    break;
                }
            }
        }

        let palette = match seen.as_slice() {
            [] => [WHITE, BLACK],
            [only] if *only == WHITE => [WHITE, BLACK],
            [only] => [*only, WHITE],
            [a, b] => [*a, *b],
            _ => {
                debug!("image has more than 2 colours, thresholding");
                let pixels = colors.iter().map(|&c| (luma(c) < 128) as u8).collect();
                return Canvas {
                    width,
                    height,
                    palette: [WHITE, BLACK],
                    pixels,
                };
            }
        };
        let pixels = colors.iter().map(|c| (*c == palette[1]) as u8).collect();
        Canvas {
            width,
            height,
            palette,
            pixels,
        }
    }

    /// Load a PNG file, `-` reads from stdin.
    pub fn load_png<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let fail = |reason: String| Error::ImageLoadFailed {
            path: path.to_path_buf(),
            reason,
        };

        let bytes = if path == Path::new("-") {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .map_err(|e| fail(e.to_string()))?;
            buf
        } else {
            fs::read(path).map_err(|e| fail(e.to_string()))?
        };

        if !bytes.starts_with(&PNG_SIGNATURE) {
            return Err(fail("not a PNG file".to_string()));
        }
        let img = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
            .map_err(|e| fail(e.to_string()))?;
        debug!("loaded {:?}: {}x{}", path, img.width(), img.height());
        Ok(Self::from_image(&img))
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            Rgb(self.palette[self.get(x, y) as usize])
        })
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        self.to_rgb_image()
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| Error::FileWriteFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }
}

fn luma(c: [u8; 3]) -> u32 {
    (c[0] as u32 * 299 + c[1] as u32 * 587 + c[2] as u32 * 114) / 1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn ink_is_the_darker_colour() {
        assert_eq!(Canvas::new(1, 1).ink(), 1);
        assert_eq!(Canvas::with_palette(1, 1, [BLACK, WHITE]).ink(), 0);
        assert_eq!(Canvas::with_palette(1, 1, [[200, 0, 0], [10, 10, 10]]).ink(), 1);
    }

    #[test]
    fn blit_maps_colours_by_role() {
        let mut src = Canvas::with_palette(2, 2, [BLACK, WHITE]);
        src.set(0, 0, 1); // paper
        let mut dst = Canvas::new(4, 3);
        dst.blit(&src, 2);
        assert!(!dst.is_ink(2, 0));
        assert!(dst.is_ink(3, 0));
        assert!(dst.is_ink(2, 1));
        assert!(!dst.is_ink(0, 0));
        // narrower source leaves the bottom row blank
        assert!(!dst.is_ink(3, 2));
    }

    #[test]
    fn from_two_colour_image_keeps_palette() {
        let mut img = RgbaImage::from_pixel(3, 1, Rgba([0, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([255, 255, 255, 255]));
        let canvas = Canvas::from_image(&DynamicImage::ImageRgba8(img));
        assert_eq!(canvas.palette(), [BLACK, WHITE]);
        assert!(canvas.is_ink(0, 0));
        assert!(!canvas.is_ink(1, 0));
    }

    #[test]
    fn from_many_colour_image_thresholds() {
        let mut img = RgbaImage::from_pixel(3, 1, Rgba([250, 250, 250, 255]));
        img.put_pixel(1, 0, Rgba([20, 20, 20, 255]));
        img.put_pixel(2, 0, Rgba([100, 120, 90, 255]));
        let canvas = Canvas::from_image(&DynamicImage::ImageRgba8(img));
        assert_eq!(canvas.palette(), [WHITE, BLACK]);
        assert!(!canvas.is_ink(0, 0));
        assert!(canvas.is_ink(1, 0));
        assert!(canvas.is_ink(2, 0));
    }

    #[test]
    fn transparent_pixels_are_paper() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        let canvas = Canvas::from_image(&DynamicImage::ImageRgba8(img));
        assert!(!canvas.is_ink(1, 1));
    }

    #[test]
    fn load_rejects_non_png() {
        let path = std::env::temp_dir().join("ptouch-not-a-png.txt");
        fs::write(&path, b"hello").unwrap();
        assert!(matches!(
            Canvas::load_png(&path),
            Err(Error::ImageLoadFailed { .. })
        ));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn png_round_trip() {
        let mut canvas = Canvas::new(5, 4);
        canvas.set_ink(1, 2);
        canvas.set_ink(4, 0);
        let path = std::env::temp_dir().join("ptouch-canvas-round-trip.png");
        canvas.save_png(&path).unwrap();
        let loaded = Canvas::load_png(&path).unwrap();
        let _ = fs::remove_file(path);
        assert_eq!(loaded.width(), 5);
        assert_eq!(loaded.height(), 4);
        for y in 0..4 {
            for x in 0..5 {
                assert_eq!(loaded.is_ink(x, y), canvas.is_ink(x, y), "{},{}", x, y);
            }
        }
    }

    #[test]
    fn save_to_missing_directory_fails() {
        let canvas = Canvas::new(2, 2);
        assert!(matches!(
            canvas.save_png("/nonexistent-dir/out.png"),
            Err(Error::FileWriteFailed { .. })
        ));
    }
}
