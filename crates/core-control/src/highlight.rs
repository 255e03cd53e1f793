//! Highlight-all-occurrences over the shadow document.
//!
//! Matches are exact, case-sensitive and block-local. Applying merges the
//! highlight format onto every match; clearing re-scans the same target and
//! merges the neutral format back. Neither operation reports "not found";
//! zero matches is a normal outcome.

use core_config::{Color, Settings};
use core_text::{CharFormat, ShadowDocument};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct HighlightEngine {
    target: String,
    highlight: CharFormat,
    neutral: CharFormat,
}

impl HighlightEngine {
    pub fn new(settings: &Settings) -> Self {
        let base = settings.font.size_px;
        Self {
            target: String::new(),
            highlight: CharFormat {
                foreground: None,
                background: Some(settings.selection_highlight_color),
                font_size_px: Some(base * 2.0),
            },
            neutral: CharFormat {
                foreground: None,
                background: Some(Color::WHITE),
                font_size_px: Some(base),
            },
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn highlight_format(&self) -> &CharFormat {
        &self.highlight
    }

    pub fn neutral_format(&self) -> &CharFormat {
        &self.neutral
    }

    /// Store `text` as the target and highlight every occurrence. Returns the
    /// number of matches.
    pub fn set_target(&mut self, doc: &mut ShadowDocument, text: impl Into<String>) -> usize {
        self.target = text.into();
        let matches = apply(doc, &self.target, &self.highlight);
        if matches > 0 {
            debug!(target: "control", matches, len = self.target.chars().count(), "highlight_applied");
        }
        matches
    }

    /// Reset every occurrence of the stored target to the neutral format.
    /// The target itself is kept.
    pub fn clear(&self, doc: &mut ShadowDocument) -> usize {
        let matches = apply(doc, &self.target, &self.neutral);
        if matches > 0 {
            debug!(target: "control", matches, "highlight_cleared");
        }
        matches
    }

    /// Clear the current target, then highlight `text`.
    pub fn retarget(&mut self, doc: &mut ShadowDocument, text: impl Into<String>) -> usize {
        self.clear(doc);
        self.set_target(doc, text)
    }
}

fn apply(doc: &mut ShadowDocument, needle: &str, format: &CharFormat) -> usize {
    if needle.is_empty() {
        return 0;
    }
    let matches = doc.find_all(needle);
    for range in &matches {
        doc.merge_format(*range, format);
    }
    matches.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_config::TextLayoutOption;
    use pretty_assertions::assert_eq;

    fn doc(text: &str) -> ShadowDocument {
        let mut d = ShadowDocument::new(TextLayoutOption::default());
        d.set_plain_text(text);
        d
    }

    #[test]
    fn formats_follow_settings() {
        let settings = Settings::default();
        let engine = HighlightEngine::new(&settings);
        assert_eq!(
            engine.highlight_format().background,
            Some(settings.selection_highlight_color)
        );
        assert_eq!(
            engine.highlight_format().font_size_px,
            Some(settings.font.size_px * 2.0)
        );
        assert_eq!(engine.neutral_format().background, Some(Color::WHITE));
    }

    #[test]
    fn set_target_marks_every_match() {
        let settings = Settings::default();
        let mut engine = HighlightEngine::new(&settings);
        let mut d = doc("foo bar foo\nbarfoo\nFOO");
        assert_eq!(engine.set_target(&mut d, "foo"), 3);
        let base = CharFormat::default();
        let first = d.block(0).unwrap().resolved_formats(&base);
        assert_eq!(first[0].background, Some(settings.selection_highlight_color));
        assert_eq!(first[4].background, None);
        let last = d.block(2).unwrap().resolved_formats(&base);
        assert!(last.iter().all(|f| f.background.is_none()));
    }

    #[test]
    fn retarget_clears_previous_word() {
        let settings = Settings::default();
        let mut engine = HighlightEngine::new(&settings);
        let mut d = doc("alpha beta");
        engine.set_target(&mut d, "alpha");
        engine.retarget(&mut d, "beta");
        let f = d.block(0).unwrap().resolved_formats(&CharFormat::default());
        assert_eq!(f[0].background, Some(Color::WHITE));
        assert_eq!(f[6].background, Some(settings.selection_highlight_color));
        assert_eq!(engine.target(), "beta");
    }
}
