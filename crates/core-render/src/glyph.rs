//! Glyph painters.
//!
//! The rasterizer positions clusters on a monospace grid and delegates ink
//! to a `GlyphPainter`. `BlockGlyphs` draws one solid bar per cluster (the
//! classic code-minimap look, needs no font). `FontGlyphs` rasterizes real
//! outlines through `fontdue` and caches coverage bitmaps per
//! `(char, size)`.

use crate::error::RenderError;
use crate::pixel::PixelBuffer;
use ahash::AHashMap;
use core_config::Color;
use core_model::RectF;
use fontdue::{Font, FontSettings, Metrics};
use std::path::Path;

/// One cluster to paint. Coordinates are logical canvas pixels; `top` is the
/// top edge of the laid-out line.
#[derive(Debug, Clone, Copy)]
pub struct GlyphRun<'a> {
    pub cluster: &'a str,
    pub x: f32,
    pub top: f32,
    /// Columns the cluster occupies on the grid.
    pub columns: usize,
    pub size_px: f32,
    pub line_height: f32,
    pub color: Color,
}

pub trait GlyphPainter: Send {
    /// Horizontal advance of one grid column at `size_px`.
    fn advance(&mut self, size_px: f32) -> f32;
    fn paint(&mut self, canvas: &mut PixelBuffer, run: &GlyphRun<'_>);
}

/// Solid ink bars.
#[derive(Debug, Clone, Copy)]
pub struct BlockGlyphs {
    /// Advance as a fraction of the font size.
    pub advance_ratio: f32,
}

impl Default for BlockGlyphs {
    fn default() -> Self {
        Self { advance_ratio: 0.6 }
    }
}

impl GlyphPainter for BlockGlyphs {
    fn advance(&mut self, size_px: f32) -> f32 {
        size_px * self.advance_ratio
    }

    fn paint(&mut self, canvas: &mut PixelBuffer, run: &GlyphRun<'_>) {
        let width = self.advance(run.size_px) * run.columns as f32;
        // Ink covers the x-height band, leaving a gap between lines.
        let height = run.size_px * 0.7;
        let top = run.top + (run.line_height - height).max(0.0) / 2.0;
        canvas.fill_rect(
            RectF::new(
                f64::from(run.x),
                f64::from(top),
                f64::from((width - 1.0).max(1.0)),
                f64::from(height),
            ),
            run.color,
        );
    }
}

type GlyphKey = (char, u32);

pub struct FontGlyphs {
    font: Font,
    cache: AHashMap<GlyphKey, (Metrics, Vec<u8>)>,
    hits: u64,
    misses: u64,
}

impl std::fmt::Debug for FontGlyphs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontGlyphs")
            .field("cached", &self.cache.len())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}

impl FontGlyphs {
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let bytes = std::fs::read(path).map_err(|source| RenderError::FontRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes).map_err(|reason| RenderError::FontParse {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(str::to_string)?;
        Ok(Self {
            font,
            cache: AHashMap::new(),
            hits: 0,
            misses: 0,
        })
    }

    fn glyph(&mut self, ch: char, size_px: f32) -> &(Metrics, Vec<u8>) {
        let key = (ch, size_px.to_bits());
        if self.cache.contains_key(&key) {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        let font = &self.font;
        self.cache
            .entry(key)
            .or_insert_with(|| font.rasterize(ch, size_px))
    }
}

impl GlyphPainter for FontGlyphs {
    fn advance(&mut self, size_px: f32) -> f32 {
        self.glyph('M', size_px).0.advance_width
    }

    fn paint(&mut self, canvas: &mut PixelBuffer, run: &GlyphRun<'_>) {
        let Some(ch) = run.cluster.chars().next() else {
            return;
        };
        let ascent = self
            .font
            .horizontal_line_metrics(run.size_px)
            .map_or(run.size_px * 0.8, |m| m.ascent);
        let baseline = run.top + ascent;
        let (metrics, bitmap) = self.glyph(ch, run.size_px);
        let left = (run.x + metrics.xmin as f32).round() as i64;
        let top = (baseline - (metrics.height as f32 + metrics.ymin as f32)).round() as i64;
        for gy in 0..metrics.height {
            for gx in 0..metrics.width {
                let coverage = bitmap[gy * metrics.width + gx];
                if coverage > 0 {
                    canvas.blend(left + gx as i64, top + gy as i64, run.color, coverage);
                }
            }
        }
    }
}
