use super::{FontHandle, FontProvider};
use crate::style::{HorizontalAlign, VerticalAlign};

/// One laid-out line. Coordinates are relative to the element's content origin.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    start: usize,
    end: usize,
    first_char: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    /// Caret offsets from `x`, one per character boundary.
    carets: Vec<f32>,
}

impl TextLine {
    pub fn char_count(&self) -> usize {
        self.carets.len().saturating_sub(1)
    }

    pub fn first_char(&self) -> usize {
        self.first_char
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLayoutBounds {
    /// Lines break at this width when set.
    pub wrap_width: Option<f32>,
    pub container_width: f32,
    pub container_height: f32,
    pub horizontal_align: HorizontalAlign,
    pub vertical_align: VerticalAlign,
}

/// Line-broken, aligned text for a single element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextLayout {
    text: String,
    font: Option<FontHandle>,
    line_height: f32,
    lines: Vec<TextLine>,
    width: f32,
    height: f32,
}

impl TextLayout {
    pub fn build(
        provider: Option<&mut dyn FontProvider>,
        font: Option<FontHandle>,
        text: &str,
        bounds: &TextLayoutBounds,
    ) -> Self {
        let mut measurer = Measurer { provider, font };
        let line_height = measurer.line_height();

        let mut lines = Vec::new();
        let mut byte_base = 0;
        let mut char_base = 0;
        for paragraph in text.split('\n') {
            wrap_paragraph(
                &mut measurer,
                paragraph,
                byte_base,
                char_base,
                bounds.wrap_width,
                &mut lines,
            );
            byte_base += paragraph.len() + 1;
            char_base += paragraph.chars().count() + 1;
        }

        let width = lines.iter().map(|line| line.width).fold(0.0, f32::max);
        let height = if text.is_empty() {
            0.0
        } else {
            lines.len() as f32 * line_height
        };

        let block_y = match bounds.vertical_align {
            VerticalAlign::Top => 0.0,
            VerticalAlign::Center => (bounds.container_height - height) * 0.5,
            VerticalAlign::Bottom => bounds.container_height - height,
        };
        for (index, line) in lines.iter_mut().enumerate() {
            line.x = match bounds.horizontal_align {
                HorizontalAlign::Left => 0.0,
                HorizontalAlign::Center => (bounds.container_width - line.width) * 0.5,
                HorizontalAlign::Right => bounds.container_width - line.width,
            };
            line.y = block_y + index as f32 * line_height;
        }

        Self {
            text: text.to_string(),
            font,
            line_height,
            lines,
            width: if text.is_empty() { 0.0 } else { width },
            height,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn font(&self) -> Option<FontHandle> {
        self.font
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Measured size of the text block, zero for empty text.
    pub fn extent(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn lines(&self) -> &[TextLine] {
        &self.lines
    }

    pub fn line_text(&self, line: &TextLine) -> &str {
        &self.text[line.start..line.end]
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn line_index_of_char(&self, char_index: usize) -> usize {
        self.lines
            .iter()
            .rposition(|line| line.first_char <= char_index)
            .unwrap_or(0)
    }

    /// Top of the caret placed before `char_index`, in content-local coordinates.
    pub fn cursor_position(&self, char_index: usize) -> (f32, f32) {
        let Some(line) = self.lines.get(self.line_index_of_char(char_index)) else {
            return (0.0, 0.0);
        };
        let local = char_index
            .saturating_sub(line.first_char)
            .min(line.char_count());
        (line.x + line.carets[local], line.y)
    }

    /// Character boundary closest to a content-local point.
    pub fn char_index_at(&self, x: f32, y: f32) -> usize {
        if self.lines.is_empty() {
            return 0;
        }
        let block_y = self.lines[0].y;
        let line_index = if self.line_height > 0.0 {
            ((y - block_y) / self.line_height).floor().max(0.0) as usize
        } else {
            0
        }
        .min(self.lines.len() - 1);
        let line = &self.lines[line_index];
        let local_x = x - line.x;
        let mut best = 0;
        let mut best_distance = f32::MAX;
        for (index, caret) in line.carets.iter().enumerate() {
            let distance = (caret - local_x).abs();
            if distance < best_distance {
                best = index;
                best_distance = distance;
            }
        }
        line.first_char + best
    }

    /// First character of the line holding `char_index`.
    pub fn line_start(&self, char_index: usize) -> usize {
        self.lines
            .get(self.line_index_of_char(char_index))
            .map(|line| line.first_char)
            .unwrap_or(0)
    }

    /// Boundary after the last character of the line holding `char_index`.
    pub fn line_end(&self, char_index: usize) -> usize {
        self.lines
            .get(self.line_index_of_char(char_index))
            .map(|line| line.first_char + line.char_count())
            .unwrap_or(0)
    }

    /// Byte offset of a character index, clamped to the end of the text.
    pub fn byte_offset(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(offset, _)| offset)
            .unwrap_or(self.text.len())
    }
}

struct Measurer<'a> {
    provider: Option<&'a mut dyn FontProvider>,
    font: Option<FontHandle>,
}

impl Measurer<'_> {
    fn line_height(&self) -> f32 {
        match (&self.provider, self.font) {
            (Some(provider), Some(font)) => provider.line_height(font),
            _ => 0.0,
        }
    }

    fn advance(&mut self, ch: char) -> f32 {
        let mut buf = [0u8; 4];
        match (self.provider.as_mut(), self.font) {
            (Some(provider), Some(font)) => provider.measure_string(font, ch.encode_utf8(&mut buf)),
            _ => 0.0,
        }
    }
}

fn wrap_paragraph(
    measurer: &mut Measurer<'_>,
    paragraph: &str,
    byte_base: usize,
    char_base: usize,
    wrap_width: Option<f32>,
    out: &mut Vec<TextLine>,
) {
    let chars: Vec<(usize, char)> = paragraph.char_indices().collect();
    let advances: Vec<f32> = chars.iter().map(|(_, ch)| measurer.advance(*ch)).collect();

    let make_line = |from: usize, to: usize| {
        let start = chars.get(from).map(|(b, _)| *b).unwrap_or(paragraph.len());
        let end = chars.get(to).map(|(b, _)| *b).unwrap_or(paragraph.len());
        let mut carets = Vec::with_capacity(to - from + 1);
        let mut x = 0.0f32;
        carets.push(0.0);
        for advance in &advances[from..to] {
            x += *advance;
            carets.push(x);
        }
        TextLine {
            start: byte_base + start,
            end: byte_base + end,
            first_char: char_base + from,
            x: 0.0,
            y: 0.0,
            width: x,
            carets,
        }
    };

    let mut line_start = 0;
    let mut x = 0.0f32;
    let mut last_break: Option<usize> = None;
    for i in 0..chars.len() {
        let advance = advances[i];
        if let Some(wrap) = wrap_width {
            if x + advance > wrap && i > line_start {
                let brk = match last_break {
                    Some(b) if b > line_start => b,
                    _ => i,
                };
                out.push(make_line(line_start, brk));
                line_start = brk;
                x = advances[brk..i].iter().sum();
                last_break = None;
            }
        }
        x += advance;
        if chars[i].1 == ' ' {
            last_break = Some(i + 1);
        }
    }
    out.push(make_line(line_start, chars.len()));
}
