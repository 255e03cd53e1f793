//! Rasterizer counters.
//!
//! Execution counters for the preview pipeline, one set per rasterizer. The
//! duration of the last render lives in `timing`.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct RenderMetrics {
    /// Previews rasterized (non-empty control).
    pub frames: AtomicU64,
    /// Render requests skipped because the control had no area.
    pub empty_frames: AtomicU64,
    /// Shadow blocks laid out across all frames.
    pub blocks_drawn: AtomicU64,
    /// Non-whitespace clusters handed to the glyph painter.
    pub glyphs_drawn: AtomicU64,
    /// Clusters whose format carried a background fill.
    pub background_runs: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderMetricsSnapshot {
    pub frames: u64,
    pub empty_frames: u64,
    pub blocks_drawn: u64,
    pub glyphs_drawn: u64,
    pub background_runs: u64,
}

impl RenderMetrics {
    pub fn snapshot(&self) -> RenderMetricsSnapshot {
        RenderMetricsSnapshot {
            frames: self.frames.load(Ordering::Relaxed),
            empty_frames: self.empty_frames.load(Ordering::Relaxed),
            blocks_drawn: self.blocks_drawn.load(Ordering::Relaxed),
            glyphs_drawn: self.glyphs_drawn.load(Ordering::Relaxed),
            background_runs: self.background_runs.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }
}
