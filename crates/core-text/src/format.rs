//! Character formatting carried by shadow blocks.
//!
//! A `CharFormat` is a sparse set of properties: every field is optional and
//! `merge` overlays only the fields the incoming format sets. Resolution for
//! a character folds, in order, the base format, the host-provided
//! additional ranges, then highlight overrides.

use core_config::Color;
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CharFormat {
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub font_size_px: Option<f32>,
}

impl CharFormat {
    pub fn foreground(color: Color) -> Self {
        Self {
            foreground: Some(color),
            ..Self::default()
        }
    }

    /// Overlay the fields set in `other`.
    pub fn merge(&mut self, other: &CharFormat) {
        if let Some(c) = other.foreground {
            self.foreground = Some(c);
        }
        if let Some(c) = other.background {
            self.background = Some(c);
        }
        if let Some(s) = other.font_size_px {
            self.font_size_px = Some(s);
        }
    }

    pub fn merged(mut self, other: &CharFormat) -> Self {
        self.merge(other);
        self
    }
}

/// Block-local range `[start, start + length)` in chars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormatRange {
    pub start: usize,
    pub length: usize,
    pub format: CharFormat,
}

impl FormatRange {
    pub fn new(start: usize, length: usize, format: CharFormat) -> Self {
        Self {
            start,
            length,
            format,
        }
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.length)
    }
}

pub type FormatRanges = SmallVec<[FormatRange; 4]>;

/// Fold `layers` over a per-char vector seeded with `base`. Ranges extending
/// past `char_len` are clipped.
pub fn resolve<'a>(
    char_len: usize,
    base: &CharFormat,
    layers: impl IntoIterator<Item = &'a FormatRange>,
) -> Vec<CharFormat> {
    let mut out = vec![*base; char_len];
    for range in layers {
        let end = range.end().min(char_len);
        for fmt in out.iter_mut().take(end).skip(range.start) {
            fmt.merge(&range.format);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_only_overrides_set_fields() {
        let mut f = CharFormat::foreground(Color::BLACK);
        f.merge(&CharFormat {
            background: Some(Color::WHITE),
            ..CharFormat::default()
        });
        assert_eq!(f.foreground, Some(Color::BLACK));
        assert_eq!(f.background, Some(Color::WHITE));
        assert_eq!(f.font_size_px, None);
    }

    #[test]
    fn resolve_clips_and_layers_in_order() {
        let red = Color::rgb(255, 0, 0);
        let blue = Color::rgb(0, 0, 255);
        let ranges = [
            FormatRange::new(1, 10, CharFormat::foreground(red)),
            FormatRange::new(2, 1, CharFormat::foreground(blue)),
        ];
        let out = resolve(4, &CharFormat::foreground(Color::BLACK), ranges.iter());
        let fg: Vec<_> = out.iter().map(|f| f.foreground.unwrap()).collect();
        assert_eq!(fg, vec![Color::BLACK, red, blue, red]);
    }
}
