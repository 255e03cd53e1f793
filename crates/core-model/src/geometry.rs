//! Scale and geometry engine.
//!
//! Pure derivations, but order dependent within one refresh cycle: the
//! auto-shrink factor must be recomputed (after a resync or resize) before
//! the preview is rasterized and before any pointer mapping reads it.
//!
//! Notation: `L` = font line height in px, `N` = shadow document line count,
//! `eff_y` = configured y scale × auto-shrink, `V` = lines visible in the host
//! viewport, `[min, max]` = host scroll range.
//!
//! * Document height: `N × L × eff_y`.
//! * Viewport indicator: `top = value × L × eff_y`, `height = V × L × eff_y`.
//! * Pointer mapping: `raw = y × (max + V) / doc_h`, centred by subtracting
//!   `V / 2`, rounded, clamped to `[min, max]`.
//!
//! Degenerate documents (`doc_h == 0`) map every pointer to `min` and draw a
//! full-extent indicator.

use crate::layout::{RectF, Size};
use crate::HostView;
use core_config::ViewportLineStrategy;
use core_text::HostDocument;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleState {
    pub x_scale: f64,
    pub y_scale: f64,
    /// Always in `(0, 1]`.
    pub auto_shrink: f64,
}

impl ScaleState {
    pub fn new(x_scale: f64, y_scale: f64) -> Self {
        Self {
            x_scale,
            y_scale,
            auto_shrink: 1.0,
        }
    }

    pub fn effective_y_scale(&self) -> f64 {
        self.y_scale * self.auto_shrink
    }

    /// Recompute the auto-shrink factor; returns the new value.
    pub fn recompute(&mut self, line_height: f64, total_lines: usize, control_height: f64) -> f64 {
        self.auto_shrink = auto_shrink(line_height, total_lines, self.y_scale, control_height);
        self.auto_shrink
    }
}

/// Extra vertical factor applied when the scaled document is taller than
/// the control. `1.0` when it fits or when the control has no height.
pub fn auto_shrink(line_height: f64, total_lines: usize, y_scale: f64, control_height: f64) -> f64 {
    if control_height <= 0.0 {
        return 1.0;
    }
    let document_height = line_height * total_lines as f64 * y_scale;
    if document_height > control_height {
        control_height / document_height
    } else {
        1.0
    }
}

/// Lines of all visible blocks except the last one.
pub fn unfolded_line_count<H: HostDocument + ?Sized>(host: &H) -> usize {
    let last = host.block_count().saturating_sub(1);
    (0..last)
        .filter(|&i| host.block_is_visible(i))
        .map(|i| host.block_line_count(i))
        .sum()
}

/// `2 × line_count − unfolded − scroll_max`, never negative.
pub fn legacy_visible_line_count<H: HostView + ?Sized>(host: &H) -> i32 {
    let lines = host.line_count() as i64;
    let unfolded = unfolded_line_count(host) as i64;
    let max = i64::from(host.scroll().maximum);
    (2 * lines - unfolded - max).clamp(0, i64::from(i32::MAX)) as i32
}

/// Lines of the host-reported visible block range that fall inside the
/// scroll window.
///
/// Hosts scroll in laid-out lines, so the window starts at the scroll value
/// and spans `line_count − maximum` lines. A wrapped block straddling either
/// edge only contributes the lines inside the window.
pub fn direct_visible_line_count<H: HostView + ?Sized>(host: &H) -> Option<i32> {
    let range = host.visible_block_range()?;
    let end = range.end.min(host.block_count());
    let start = range.start.min(end);
    let scroll = host.scroll();
    let total = host.line_count();
    let first = scroll.value.max(0) as usize;
    let page = total.saturating_sub(scroll.maximum.max(0) as usize);
    let window = first..first.saturating_add(page);

    let mut line: usize = (0..start).map(|i| host.block_line_count(i)).sum();
    let mut lines = 0usize;
    for block in start..end {
        let next = line + host.block_line_count(block);
        lines += next.min(window.end).saturating_sub(line.max(window.start));
        line = next;
    }
    Some(lines.min(i32::MAX as usize) as i32)
}

pub fn visible_line_count<H: HostView + ?Sized>(host: &H, strategy: ViewportLineStrategy) -> i32 {
    match strategy {
        ViewportLineStrategy::Legacy => legacy_visible_line_count(host),
        ViewportLineStrategy::Direct => {
            direct_visible_line_count(host).unwrap_or_else(|| legacy_visible_line_count(host))
        }
    }
}

/// Host scrollbar state in lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScrollRange {
    pub minimum: i32,
    pub maximum: i32,
    pub value: i32,
}

impl ScrollRange {
    pub fn new(minimum: i32, maximum: i32, value: i32) -> Self {
        Self {
            minimum,
            maximum,
            value,
        }
    }

    pub fn clamp(&self, value: i32) -> i32 {
        if self.maximum < self.minimum {
            return self.minimum;
        }
        value.clamp(self.minimum, self.maximum)
    }
}

/// Snapshot of everything needed to map between scroll values and pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub line_height: f64,
    pub scale: ScaleState,
    pub document_lines: usize,
    pub scroll_bar_width: u32,
    pub control: Size,
}

impl Geometry {
    pub fn document_height_px(&self) -> f64 {
        self.document_lines as f64 * self.line_height * self.scale.effective_y_scale()
    }

    fn line_px(&self) -> f64 {
        self.line_height * self.scale.effective_y_scale()
    }

    pub fn viewport_rect(&self, scroll_value: i32, visible_lines: i32) -> RectF {
        let width = f64::from(self.scroll_bar_width);
        if self.document_height_px() <= 0.0 {
            return RectF::new(0.0, 0.0, width, f64::from(self.control.height));
        }
        let line_px = self.line_px();
        RectF::new(
            0.0,
            f64::from(scroll_value) * line_px,
            width,
            f64::from(visible_lines.max(0)) * line_px,
        )
    }

    /// Scroll value that centres the viewport on pixel row `y`.
    pub fn pointer_to_scroll_value(&self, y: f64, range: ScrollRange, visible_lines: i32) -> i32 {
        let document_height = self.document_height_px();
        if document_height <= 0.0 || range.maximum < range.minimum {
            return range.minimum;
        }
        let visible = f64::from(visible_lines.max(0));
        let raw = y * (f64::from(range.maximum) + visible) / document_height;
        let value = (raw - visible / 2.0).round();
        if value.is_nan() {
            return range.minimum;
        }
        value.clamp(f64::from(range.minimum), f64::from(range.maximum)) as i32
    }
}
