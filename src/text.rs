//! Text blocks: font size fitting and line placement.
//!
//! Glyph rendering itself sits behind [`GlyphRenderer`]; [`FontRenderer`]
//! implements it with `ab_glyph` for TrueType/OpenType fonts.

use std::{
    fs,
    path::{Path, PathBuf},
};

use ab_glyph::{point, Font, FontVec, Glyph, PxScale, ScaleFont};
use log::{debug, info};

use crate::{canvas::Canvas, error::Error};

/// Smallest font size probed when fitting text.
pub const MIN_FONT_SIZE: u32 = 4;

/// Probing gives up here even if the text still fits.
pub const MAX_FONT_SIZE: u32 = 512;

/// Pixel box covered by rendered text.
///
/// Relative to the pen origin on the baseline, `y` grows downwards, so
/// `top` is negative for anything drawn above the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextBounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl TextBounds {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// Something that can measure and draw a string at a font size.
pub trait GlyphRenderer {
    /// Bounds of `text` at `size`. An error means the size is not usable.
    fn measure(&self, text: &str, size: u32) -> Result<TextBounds, Error>;

    /// Draw `text` in ink with the pen origin at (`x`, `baseline`).
    fn draw(
        &self,
        canvas: &mut Canvas,
        text: &str,
        size: u32,
        x: i32,
        baseline: i32,
    ) -> Result<(), Error>;
}

/// Largest font size at which `text` is at most `want_px` high.
///
/// Sizes are probed upwards from [`MIN_FONT_SIZE`]; the first size that
/// overflows or that the renderer refuses ends the search.
pub fn find_font_size<R: GlyphRenderer + ?Sized>(
    renderer: &R,
    text: &str,
    want_px: u32,
) -> Result<u32, Error> {
    let mut save = None;
    for size in MIN_FONT_SIZE..=MAX_FONT_SIZE {
        match renderer.measure(text, size) {
            Ok(bounds) if bounds.height() <= want_px as i32 => save = Some(size),
            _ => break,
        }
    }
    save.ok_or_else(|| Error::NoFeasibleFontSize(text.to_string()))
}

/// One font size shared by all lines, each line gets `tape_width / n` pixels.
pub fn fit_font_size<R: GlyphRenderer + ?Sized>(
    renderer: &R,
    lines: &[String],
    tape_width: u32,
) -> Result<u32, Error> {
    let want_px = tape_width / lines.len().max(1) as u32;
    lines.iter().try_fold(MAX_FONT_SIZE, |size, line| {
        Ok(size.min(find_font_size(renderer, line, want_px)?))
    })
}

/// Vertical distance between the bottom of `text` and the bottom of an "o".
///
/// "o" sits on the baseline, so this is how far the text descends below it.
pub fn baseline_offset<R: GlyphRenderer + ?Sized>(
    renderer: &R,
    text: &str,
    size: u32,
) -> Result<i32, Error> {
    let o = renderer.measure("o", size)?;
    let t = renderer.measure(text, size)?;
    debug!("baseline offset of {:?}: o {} text {}", text, o.bottom, t.bottom);
    Ok(t.bottom - o.bottom)
}

/// Render up to a handful of lines into a block as tall as the tape.
///
/// With `font_size` unset the size is fitted so every line fits its share
/// of the tape. Lines are placed on their baselines and the unused height
/// is spread evenly between them.
pub fn render_text<R: GlyphRenderer + ?Sized>(
    renderer: &R,
    lines: &[String],
    tape_width: u32,
    font_size: Option<u32>,
) -> Result<Canvas, Error> {
    if lines.is_empty() {
        return Err(Error::InvalidConfig("no text to render".to_string()));
    }
    let n = lines.len() as u32;

    let size = match font_size {
        Some(size) => {
            info!("setting font size={}", size);
            size
        }
        None => {
            let size = fit_font_size(renderer, lines, tape_width)?;
            info!("choosing font size={}", size);
            size
        }
    };

    let bounds = lines
        .iter()
        .map(|line| renderer.measure(line, size))
        .collect::<Result<Vec<_>, _>>()?;

    let width = bounds.iter().map(|b| b.width()).max().unwrap_or(0).max(1) as u32;
    let max_height = bounds.iter().map(|b| b.height()).max().unwrap_or(0).max(0) as u32;
    debug!("needed (max) height is {}px", max_height);

    if max_height * n > tape_width {
        return Err(Error::TextTooTall {
            font_size: size,
            needed: max_height * n,
            tape_width,
        });
    }
    let unused_px = tape_width - max_height * n;

    let mut canvas = Canvas::new(width, tape_width);
    for (i, (line, b)) in lines.iter().zip(&bounds).enumerate() {
        let ofs = baseline_offset(renderer, line, size)?;
        let pos = (i as u32 * (tape_width / n) + max_height + (unused_px / n) / 2) as i32 - ofs;
        debug!("line {} pos={} ofs={}", i + 1, pos, ofs);
        renderer.draw(&mut canvas, line, size, -b.left, pos)?;
    }
    Ok(canvas)
}

/// Font sizes are points at 96 dpi.
fn size_to_px(size: u32) -> f32 {
    size as f32 * 96.0 / 72.0
}

/// `GlyphRenderer` backed by a TrueType/OpenType font file.
pub struct FontRenderer {
    font: FontVec,
    path: PathBuf,
}

impl FontRenderer {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|e| Error::Font(format!("{:?}: {}", path, e)))?;
        let font =
            FontVec::try_from_vec(data).map_err(|e| Error::Font(format!("{:?}: {}", path, e)))?;
        Ok(FontRenderer {
            font,
            path: path.to_path_buf(),
        })
    }

    /// Load a font by file path, or by name from the system font directories.
    pub fn find(name: &str) -> Result<Self, Error> {
        let path = Path::new(name);
        if path.is_file() {
            return Self::from_file(path);
        }
        let found = font_dirs()
            .iter()
            .find_map(|dir| search_font(dir, name, 4))
            .ok_or_else(|| Error::Font(format!("font {:?} not found", name)))?;
        debug!("font {:?} resolved to {:?}", name, found);
        Self::from_file(found)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn layout(&self, text: &str, size: u32) -> (Vec<Glyph>, f32) {
        let scale = PxScale::from(size_to_px(size));
        let scaled = self.font.as_scaled(scale);
        let mut glyphs = Vec::with_capacity(text.len());
        let mut caret = 0.0f32;
        let mut last = None;

        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = last {
                caret += scaled.kern(prev, id);
            }
            glyphs.push(id.with_scale_and_position(scale, point(caret, 0.0)));
            caret += scaled.h_advance(id);
            last = Some(id);
        }
        (glyphs, caret)
    }
}

impl GlyphRenderer for FontRenderer {
    fn measure(&self, text: &str, size: u32) -> Result<TextBounds, Error> {
        if size == 0 {
            return Err(Error::Font("font size must be positive".to_string()));
        }
        let (glyphs, advance) = self.layout(text, size);

        let mut bounds: Option<TextBounds> = None;
        for glyph in glyphs {
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let r = outlined.px_bounds();
                let b = TextBounds {
                    left: r.min.x.floor() as i32,
                    top: r.min.y.floor() as i32,
                    right: r.max.x.ceil() as i32,
                    bottom: r.max.y.ceil() as i32,
                };
                bounds = Some(match bounds {
                    None => b,
                    Some(a) => TextBounds {
                        left: a.left.min(b.left),
                        top: a.top.min(b.top),
                        right: a.right.max(b.right),
                        bottom: a.bottom.max(b.bottom),
                    },
                });
            }
        }

        // blank text still takes up its advance width
        Ok(bounds.unwrap_or(TextBounds {
            right: advance.ceil() as i32,
            ..TextBounds::default()
        }))
    }

    fn draw(
        &self,
        canvas: &mut Canvas,
        text: &str,
        size: u32,
        x: i32,
        baseline: i32,
    ) -> Result<(), Error> {
        if size == 0 {
            return Err(Error::Font("font size must be positive".to_string()));
        }
        let (glyphs, _) = self.layout(text, size);
        for mut glyph in glyphs {
            glyph.position = point(glyph.position.x + x as f32, glyph.position.y + baseline as f32);
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let r = outlined.px_bounds();
                outlined.draw(|px, py, coverage| {
                    let cx = px as i32 + r.min.x as i32;
                    let cy = py as i32 + r.min.y as i32;
                    if coverage >= 0.5 && cx >= 0 && cy >= 0 {
                        canvas.set_ink(cx as u32, cy as u32);
                    }
                });
            }
        }
        Ok(())
    }
}

fn font_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    if let Some(home) = std::env::var_os("HOME") {
        dirs.push(Path::new(&home).join(".local/share/fonts"));
        dirs.push(Path::new(&home).join(".fonts"));
    }
    dirs.extend(
        [
            "/usr/share/fonts",
            "/usr/local/share/fonts",
            "/Library/Fonts",
            "/System/Library/Fonts",
            "C:\\Windows\\Fonts",
        ]
        .iter()
        .map(PathBuf::from),
    );
    dirs
}

/// Look for `<name>.ttf` / `<name>.otf` below `dir`, case insensitive.
fn search_font(dir: &Path, name: &str, depth: u32) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    let mut subdirs = Vec::new();

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
            continue;
        }
        let stem_matches = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map_or(false, |s| s.eq_ignore_ascii_case(name));
        let ext_matches = path
            .extension()
            .and_then(|s| s.to_str())
            .map_or(false, |e| {
                e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf")
            });
        if stem_matches && ext_matches {
            return Some(path);
        }
    }

    if depth == 0 {
        return None;
    }
    subdirs
        .iter()
        .find_map(|sub| search_font(sub, name, depth - 1))
}
