//! Bitmap to raster line conversion.
//!
//! One raster line is one column of the canvas (one step of tape feed),
//! packed 8 pixels per byte across the full printhead width. The image is
//! centred on the printhead, the last byte of a line holds the pixels
//! nearest to the printhead's zero edge.

use crate::{
    canvas::Canvas,
    model::{Quirk, QuirkProfile},
};

/// Longest literal or repeat run of one PackBits segment.
pub const PACKBITS_MAX_RUN: usize = 128;

#[derive(Debug, Clone, Copy)]
pub struct RasterEncoder {
    max_px: u32,
    packbits: bool,
}

impl RasterEncoder {
    pub fn new(max_px: u32, packbits: bool) -> Self {
        RasterEncoder { max_px, packbits }
    }

    pub fn for_profile(profile: &QuirkProfile) -> Self {
        Self::new(profile.max_px, profile.has(Quirk::PackBits))
    }

    pub fn line_bytes(&self) -> usize {
        (self.max_px / 8) as usize
    }

    pub fn is_packbits(&self) -> bool {
        self.packbits
    }

    /// First printhead pixel used by an image `span` pixels across.
    pub fn centering_offset(&self, span: u32) -> i64 {
        (self.max_px as i64 - span as i64).div_euclid(2)
    }

    /// Bit packed raster line for canvas column `x`.
    pub fn encode_line(&self, canvas: &Canvas, x: u32) -> Vec<u8> {
        let mut line = vec![0u8; self.line_bytes()];
        let offset = self.centering_offset(canvas.height());
        let ink = canvas.ink();
        let bottom = canvas.height() as i64 - 1;

        for y in 0..canvas.height() {
            if canvas.get(x, y) == ink {
                set_pixel(&mut line, offset + bottom - y as i64);
            }
        }
        line
    }

    /// Raster lines for every column, in feed order.
    pub fn lines<'a>(&'a self, canvas: &'a Canvas) -> impl Iterator<Item = Vec<u8>> + 'a {
        (0..canvas.width()).map(move |x| self.encode_line(canvas, x))
    }

    /// Bytes to transmit for one raster line, PackBits encoded when the
    /// printer requires it.
    pub fn frame(&self, line: &[u8]) -> Vec<u8> {
        if self.packbits {
            pack_bits(line)
        } else {
            line.to_vec()
        }
    }
}

/// Set one printhead pixel in a raster line.
///
/// Pixels outside the line are dropped.
pub fn set_pixel(line: &mut [u8], pixel: i64) {
    let size = line.len() as i64;
    if pixel < 0 || pixel >= size * 8 {
        return;
    }
    let byte = (size - 1 - pixel / 8) as usize;
    line[byte] |= 0x80u8 >> (pixel % 8);
}

/// PackBits (TIFF) run length encoding.
///
/// Runs of two or more equal bytes become `1 - n, byte`, everything else
/// is copied as literal segments `n - 1, bytes...`.
pub fn pack_bits(data: &[u8]) -> Vec<u8> {
    let mut packed = Vec::with_capacity(data.len() + data.len() / PACKBITS_MAX_RUN + 1);
    let mut i = 0;

    while i < data.len() {
        let mut run_length = 1;
        while i + run_length < data.len()
            && run_length < PACKBITS_MAX_RUN
            && data[i + run_length] == data[i]
        {
            run_length += 1;
        }

        if run_length > 1 {
            packed.push((1 - run_length as i16) as i8 as u8);
            packed.push(data[i]);
            i += run_length;
        } else {
            let start = i;
            while i < data.len() && i - start < PACKBITS_MAX_RUN {
                if i + 1 < data.len() && data[i] == data[i + 1] {
                    break;
                }
                i += 1;
            }
            packed.push((i - start - 1) as u8);
            packed.extend_from_slice(&data[start..i]);
        }
    }

    packed
}

/// Decode PackBits data. `None` if the input is truncated.
pub fn unpack_bits(data: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    let mut i = 0;

    while i < data.len() {
        let n = data[i] as i8;
        i += 1;
        match n {
            -128 => {}
            0..=127 => {
                let count = n as usize + 1;
                out.extend_from_slice(data.get(i..i + count)?);
                i += count;
            }
            _ => {
                let count = (1 - n as i16) as usize;
                let byte = *data.get(i)?;
                out.extend(std::iter::repeat(byte).take(count));
                i += 1;
            }
        }
    }

    Some(out)
}
