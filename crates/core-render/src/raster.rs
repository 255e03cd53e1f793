//! Preview rasterizer.
//!
//! Pipeline for one frame:
//! 1. Size a logical canvas so that scaling it by `(x_scale, y_scale ×
//!    auto_shrink)` yields exactly the control size, filled with the
//!    background color.
//! 2. Lay out every shadow block at `y = lines_before × line_height` (an
//!    integer line counter, so rounding never drifts down the document).
//!    Each cluster resolves its format: background runs are painted first,
//!    then ink through the active `GlyphPainter`.
//! 3. Bilinearly resample the canvas to the control size.
//!
//! Content height (what the geometry engine calls document height) is
//! `line_count × line_height × effective_y`, independent of the canvas size.

use crate::error::RenderError;
use crate::glyph::{BlockGlyphs, FontGlyphs, GlyphPainter, GlyphRun};
use crate::metrics::RenderMetrics;
use crate::pixel::PixelBuffer;
use crate::timing::record_last_render_ns;
use core_config::Settings;
use core_model::{RectF, ScaleState, Size};
use core_text::{CharFormat, ShadowDocument, layout};
use std::time::Instant;
use tracing::{debug, info};

/// A rasterized preview sized to the control.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewImage {
    pub image: PixelBuffer,
    /// Canvas size before resampling.
    pub logical: Size,
    /// Scaled height of the whole document in control pixels.
    pub content_height_px: f64,
}

impl PreviewImage {
    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }
}

pub struct Rasterizer {
    painter: Box<dyn GlyphPainter>,
    metrics: RenderMetrics,
}

impl std::fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rasterizer")
            .field("metrics", &self.metrics.snapshot())
            .finish_non_exhaustive()
    }
}

impl Rasterizer {
    /// Outline glyphs when the settings name a font file, ink bars otherwise.
    pub fn from_settings(settings: &Settings) -> Result<Self, RenderError> {
        let painter: Box<dyn GlyphPainter> = match &settings.font.path {
            Some(path) => {
                let glyphs = FontGlyphs::load(path)?;
                info!(target: "render.preview", path = %path.display(), "font_loaded");
                Box::new(glyphs)
            }
            None => Box::new(BlockGlyphs::default()),
        };
        Ok(Self::with_painter(painter))
    }

    pub fn with_painter(painter: Box<dyn GlyphPainter>) -> Self {
        Self {
            painter,
            metrics: RenderMetrics::default(),
        }
    }

    pub fn metrics(&self) -> &RenderMetrics {
        &self.metrics
    }

    /// Logical canvas size for `control` under `scale`; at least 1×1.
    pub fn logical_size(control: Size, scale: &ScaleState) -> Size {
        let dim = |px: u32, factor: f64| {
            if factor > 0.0 {
                (f64::from(px) / factor).ceil().clamp(1.0, f64::from(u32::MAX)) as u32
            } else {
                px.max(1)
            }
        };
        Size::new(
            dim(control.width, scale.x_scale),
            dim(control.height, scale.effective_y_scale()),
        )
    }

    pub fn render(
        &mut self,
        doc: &ShadowDocument,
        settings: &Settings,
        scale: &ScaleState,
        control: Size,
    ) -> PreviewImage {
        let line_height = settings.line_height_px() as f32;
        let content_height_px =
            doc.line_count() as f64 * f64::from(line_height) * scale.effective_y_scale();
        if control.is_empty() {
            RenderMetrics::add(&self.metrics.empty_frames, 1);
            return PreviewImage {
                image: PixelBuffer::new(control.width, control.height, settings.background_color),
                logical: Size::default(),
                content_height_px,
            };
        }

        let start = Instant::now();
        let logical = Self::logical_size(control, scale);
        let mut canvas = PixelBuffer::new(logical.width, logical.height, settings.background_color);
        self.draw_document(&mut canvas, doc, settings, line_height);
        let image = canvas.resample_bilinear(control);

        let elapsed = start.elapsed().as_nanos() as u64;
        record_last_render_ns(elapsed);
        RenderMetrics::add(&self.metrics.frames, 1);
        debug!(
            target: "render.preview",
            blocks = doc.block_count(),
            lines = doc.line_count(),
            logical_w = logical.width,
            logical_h = logical.height,
            control_w = control.width,
            control_h = control.height,
            elapsed_ns = elapsed,
            "preview_rendered"
        );
        PreviewImage {
            image,
            logical,
            content_height_px,
        }
    }

    fn draw_document(
        &mut self,
        canvas: &mut PixelBuffer,
        doc: &ShadowDocument,
        settings: &Settings,
        line_height: f32,
    ) {
        let base_size = settings.font.size_px;
        let base = CharFormat {
            foreground: Some(settings.text_color),
            background: None,
            font_size_px: Some(base_size),
        };
        let option = doc.layout_option();
        let canvas_height = canvas.height() as f32;
        let mut lines_before = 0usize;
        let mut blocks = 0u64;
        let mut glyphs = 0u64;
        let mut backgrounds = 0u64;

        for block in doc.blocks() {
            let block_top = lines_before as f32 * line_height;
            if block_top >= canvas_height {
                break;
            }
            blocks += 1;
            let formats = block.resolved_formats(&base);
            let line_starts: Vec<usize> = layout::line_ranges(block.text(), option, doc.wrap_columns())
                .into_iter()
                .map(|r| r.start)
                .collect();
            let mut line = 0usize;
            let mut x = 0f32;
            for cluster in layout::clusters(block.text(), option.tab_width) {
                while line + 1 < line_starts.len() && cluster.char_index >= line_starts[line + 1] {
                    line += 1;
                    x = 0.0;
                }
                let format = formats.get(cluster.char_index).copied().unwrap_or(base);
                let size_px = format.font_size_px.unwrap_or(base_size);
                let width = self.painter.advance(size_px) * cluster.width as f32;
                let top = block_top + line as f32 * line_height;
                if let Some(background) = format.background {
                    canvas.fill_rect(
                        RectF::new(
                            f64::from(x),
                            f64::from(top),
                            f64::from(width),
                            f64::from(line_height),
                        ),
                        background,
                    );
                    backgrounds += 1;
                }
                if !cluster.is_whitespace {
                    let color = format.foreground.unwrap_or(settings.text_color);
                    self.painter.paint(
                        canvas,
                        &GlyphRun {
                            cluster: cluster.text,
                            x,
                            top,
                            columns: cluster.width.max(1),
                            size_px,
                            line_height,
                            color,
                        },
                    );
                    glyphs += 1;
                }
                x += width;
            }
            lines_before += block.line_count();
        }

        RenderMetrics::add(&self.metrics.blocks_drawn, blocks);
        RenderMetrics::add(&self.metrics.glyphs_drawn, glyphs);
        RenderMetrics::add(&self.metrics.background_runs, backgrounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_config::{Color, TextLayoutOption};
    use core_text::TextRange;

    fn settings() -> Settings {
        Settings {
            text_color: Color::BLACK,
            background_color: Color::WHITE,
            x_scale: 1.0,
            y_scale: 1.0,
            ..Settings::default()
        }
    }

    fn doc(text: &str) -> ShadowDocument {
        let mut d = ShadowDocument::new(TextLayoutOption::default());
        d.set_plain_text(text);
        d
    }

    #[test]
    fn output_matches_control_size() {
        let mut r = Rasterizer::with_painter(Box::new(BlockGlyphs::default()));
        let s = settings();
        let preview = r.render(&doc("abc\ndef"), &s, &ScaleState::new(0.6, 0.3), Size::new(37, 91));
        assert_eq!(preview.image.size(), Size::new(37, 91));
        assert_eq!(r.metrics().snapshot().frames, 1);
    }

    #[test]
    fn zero_height_control_yields_empty_image() {
        let mut r = Rasterizer::with_painter(Box::new(BlockGlyphs::default()));
        let preview = r.render(&doc("abc"), &settings(), &ScaleState::new(1.0, 1.0), Size::new(40, 0));
        assert!(preview.is_empty());
        assert_eq!(r.metrics().snapshot().empty_frames, 1);
    }

    #[test]
    fn ink_lands_on_text_rows_only() {
        let mut r = Rasterizer::with_painter(Box::new(BlockGlyphs::default()));
        let s = settings();
        let lh = s.line_height_px();
        let preview = r.render(&doc("xxxx\n\nxxxx"), &s, &ScaleState::new(1.0, 1.0), Size::new(40, lh * 3));
        let mid = lh / 2;
        assert_eq!(preview.image.get(2, mid), Some(Color::BLACK));
        assert_eq!(preview.image.get(2, lh + mid), Some(Color::WHITE));
        assert_eq!(preview.image.get(2, 2 * lh + mid), Some(Color::BLACK));
    }

    #[test]
    fn highlight_background_is_painted_under_text() {
        let mut r = Rasterizer::with_painter(Box::new(BlockGlyphs::default()));
        let s = settings();
        let yellow = Color::rgb(0xff, 0xd7, 0x00);
        let mut d = doc("  ab");
        d.merge_format(
            TextRange { block: 0, start: 0, len: 2 },
            &CharFormat {
                background: Some(yellow),
                ..CharFormat::default()
            },
        );
        let lh = s.line_height_px();
        let preview = r.render(&d, &s, &ScaleState::new(1.0, 1.0), Size::new(60, lh));
        assert_eq!(preview.image.get(1, lh / 2), Some(yellow));
        assert_eq!(r.metrics().snapshot().background_runs, 2);
    }

    #[test]
    fn content_height_tracks_effective_scale() {
        let mut r = Rasterizer::with_painter(Box::new(BlockGlyphs::default()));
        let s = settings();
        let mut scale = ScaleState::new(1.0, 1.0);
        scale.auto_shrink = 0.5;
        let preview = r.render(&doc("a\nb\nc\nd"), &s, &scale, Size::new(10, 10));
        let expected = 4.0 * f64::from(s.line_height_px()) * 0.5;
        assert_eq!(preview.content_height_px, expected);
    }
}
