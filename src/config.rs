/// Font used for text blocks when none is given.
pub const DEFAULT_FONT: &str = "DejaVuSans";

/// Largest blank padding block, in pixels along the tape.
pub const MAX_PADDING: u32 = 256;

/// Settings for turning text into bitmaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    font: String,
    font_size: Option<u32>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            font: DEFAULT_FONT.to_string(),
            font_size: None,
        }
    }
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Font name or path to a font file
    pub fn font<S: Into<String>>(mut self, font: S) -> Self {
        self.font = font.into();
        self
    }

    /// Fixed font size, disables fitting text to the tape
    pub fn font_size(mut self, size: u32) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn font_name(&self) -> &str {
        &self.font
    }

    pub fn fixed_font_size(&self) -> Option<u32> {
        self.font_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder() {
        let config = RenderConfig::new();
        assert_eq!(config.font_name(), DEFAULT_FONT);
        assert_eq!(config.fixed_font_size(), None);

        let config = config.font("/tmp/font.ttf").font_size(24);
        assert_eq!(config.font_name(), "/tmp/font.ttf");
        assert_eq!(config.fixed_font_size(), Some(24));
    }
}
