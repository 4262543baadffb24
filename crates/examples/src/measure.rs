use std::borrow::Cow;

use arbor::{
    DisplayNode, Expanse, NodeKind, Result,
    measure::Measurer,
    node::{InputContent, TextContent},
};
use textwrap::Options;
use unicode_width::UnicodeWidthStr;

/// Measures text with a fixed advance per terminal column.
///
/// A glyph is `char_ratio * font_size` pixels wide per display column and a
/// line is `line_ratio * font_size` pixels tall. Wide characters take two
/// columns. Images report `image_size`; every other kind is zero.
#[derive(Debug, Clone)]
pub struct TextMeasurer {
    /// Column advance as a fraction of the font size.
    pub char_ratio: f32,
    /// Line height as a fraction of the font size.
    pub line_ratio: f32,
    /// Natural size of any image.
    pub image_size: Expanse,
    /// Number of invalidations received.
    pub invalidations: usize,
}

impl Default for TextMeasurer {
    fn default() -> Self {
        Self {
            char_ratio: 0.5,
            line_ratio: 1.25,
            image_size: Expanse::new(64, 64),
            invalidations: 0,
        }
    }
}

impl TextMeasurer {
    /// Pixel width of one column at `font_size`.
    fn column(&self, font_size: u32) -> f32 {
        (self.char_ratio * font_size as f32).max(1.0)
    }

    /// Pixel height of one line at `font_size`.
    fn line(&self, font_size: u32) -> u32 {
        (self.line_ratio * font_size as f32).ceil() as u32
    }

    /// Lines of `t` as laid out in `available_width` pixels.
    pub fn lines<'a>(&self, t: &'a TextContent, available_width: u32) -> Vec<Cow<'a, str>> {
        if !t.wrap {
            return t.text.lines().map(Into::into).collect();
        }
        let cols = (available_width as f32 / self.column(t.font_size)).floor() as usize;
        textwrap::wrap(&t.text, Options::new(cols.max(1)))
    }

    /// Size of a text run.
    fn text(&self, t: &TextContent, available_width: u32) -> Expanse {
        let lines = self.lines(t, available_width);
        let cols = lines.iter().map(|l| l.width()).max().unwrap_or(0);
        Expanse::new(
            (cols as f32 * self.column(t.font_size)).ceil() as u32,
            lines.len() as u32 * self.line(t.font_size),
        )
    }

    /// Size of an input field: the longer of value and placeholder, plus a
    /// column for the cursor.
    fn input(&self, i: &InputContent) -> Expanse {
        let cols = i.text.width().max(i.placeholder.width()) + 1;
        Expanse::new(
            (cols as f32 * self.column(i.font_size)).ceil() as u32,
            self.line(i.font_size),
        )
    }
}

impl Measurer for TextMeasurer {
    fn measure(&mut self, node: &DisplayNode, available_width: u32, _: u32) -> Result<Expanse> {
        Ok(match &node.kind {
            NodeKind::Text(t) => self.text(t, available_width),
            NodeKind::Input(i) => self.input(i),
            NodeKind::Image(_) => self.image_size,
            _ => Expanse::default(),
        })
    }

    fn invalidate(&mut self) {
        self.invalidations += 1;
    }
}
