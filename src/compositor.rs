//! Label assembly.
//!
//! Blocks are concatenated along the tape in the order they are added. The
//! tallest block decides the height of the label, shorter ones are top
//! aligned.

use log::{debug, warn};
use std::path::Path;

use crate::{
    canvas::Canvas,
    config::{RenderConfig, MAX_PADDING},
    error::Error,
    text::{self, GlyphRenderer},
};

/// Length of the cut mark block along the tape.
pub const CUTMARK_LENGTH: u32 = 9;

/// Column of the dashed line inside the cut mark block.
const CUTMARK_X: u32 = 5;

/// Dash period, the second half of every period is inked.
const DASH_PERIOD: u32 = 6;

/// Concatenate `block` after `label`.
///
/// Returns `None` if the result would be empty.
pub fn append(label: Option<Canvas>, block: &Canvas) -> Option<Canvas> {
    let (length, height) = match &label {
        Some(l) => (l.width() + block.width(), l.height().max(block.height())),
        None => (block.width(), block.height()),
    };
    if length == 0 || height == 0 {
        return label;
    }

    let mut out = Canvas::new(length, height);
    let mut x = 0;
    if let Some(l) = &label {
        out.blit(l, 0);
        x = l.width();
    }
    out.blit(block, x);
    Some(out)
}

/// A dashed line across the tape, marking where to cut.
pub fn cutmark(tape_width: u32) -> Canvas {
    let mut out = Canvas::new(CUTMARK_LENGTH, tape_width);
    for y in 0..tape_width {
        if y % DASH_PERIOD >= DASH_PERIOD / 2 {
            out.set_ink(CUTMARK_X, y);
        }
    }
    out
}

/// Blank tape. Lengths outside `1..=MAX_PADDING` fall back to 1.
pub fn padding(tape_width: u32, length: u32) -> Canvas {
    let length = if (1..=MAX_PADDING).contains(&length) {
        length
    } else {
        warn!("padding of {}px out of range, using 1px", length);
        1
    };
    Canvas::new(length, tape_width)
}

/// Builds one label from images, text, cut marks and padding.
pub struct Compositor<'a> {
    tape_width: u32,
    config: &'a RenderConfig,
    label: Option<Canvas>,
}

impl<'a> Compositor<'a> {
    pub fn new(tape_width: u32, config: &'a RenderConfig) -> Self {
        Compositor {
            tape_width,
            config,
            label: None,
        }
    }

    pub fn tape_width(&self) -> u32 {
        self.tape_width
    }

    /// Length of the label so far.
    pub fn length(&self) -> u32 {
        self.label.as_ref().map_or(0, Canvas::width)
    }

    pub fn append(&mut self, block: &Canvas) -> &mut Self {
        debug!("append {}x{} block", block.width(), block.height());
        self.label = append(self.label.take(), block);
        self
    }

    /// Append a PNG image, `-` reads it from stdin.
    pub fn image<P: AsRef<Path>>(&mut self, path: P) -> Result<&mut Self, Error> {
        let block = Canvas::load_png(path)?;
        Ok(self.append(&block))
    }

    /// Append a block of text lines, fitted to the tape unless the config
    /// fixes the font size.
    pub fn text<R: GlyphRenderer + ?Sized>(
        &mut self,
        lines: &[String],
        renderer: &R,
    ) -> Result<&mut Self, Error> {
        let block = text::render_text(
            renderer,
            lines,
            self.tape_width,
            self.config.fixed_font_size(),
        )?;
        Ok(self.append(&block))
    }

    pub fn cutmark(&mut self) -> &mut Self {
        let block = cutmark(self.tape_width);
        self.append(&block)
    }

    pub fn padding(&mut self, length: u32) -> &mut Self {
        let block = padding(self.tape_width, length);
        self.append(&block)
    }

    /// The finished label, `None` if nothing was added.
    pub fn finish(self) -> Option<Canvas> {
        self.label
    }
}
