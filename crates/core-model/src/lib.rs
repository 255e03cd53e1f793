//! Host view contract and the scale / geometry engine.
//!
//! The minimap needs more from its host than the document: it reads the
//! vertical scroll range, drives the scroll value, reads the current
//! selection and (when the host can report it) the range of blocks visible
//! in the viewport. `HostView` captures that on top of `HostDocument`.
//!
//! `TextHost` is a self-contained host (rope buffer, per-block formats,
//! folding, wrapping, a line-indexed scroll model) used by the command line
//! front end and by tests. Real editor integrations implement `HostView`
//! directly.
//!
//! Scroll model of `TextHost`:
//! * The scroll value is the index of the first visible laid-out line.
//! * `maximum = visible_lines_total − viewport_rows` (never negative), so
//!   `maximum + viewport_rows` equals the document line count whenever the
//!   document is taller than the viewport.

use std::ops::Range;

pub mod geometry;
pub mod host;
pub mod layout;

pub use core_text::HostDocument;
pub use geometry::{
    Geometry, ScaleState, ScrollRange, auto_shrink, direct_visible_line_count,
    legacy_visible_line_count, unfolded_line_count, visible_line_count,
};
pub use host::TextHost;
pub use layout::{RectF, Size};

/// Host editor surface the minimap is attached to.
pub trait HostView: HostDocument {
    fn scroll(&self) -> ScrollRange;
    /// Request a new scroll value; hosts clamp to their range.
    fn set_scroll_value(&mut self, value: i32);
    /// Plain text of the current selection (empty when nothing is selected).
    fn selected_text(&self) -> String;
    /// Blocks intersecting the viewport, when the host can report them.
    fn visible_block_range(&self) -> Option<Range<usize>> {
        None
    }
}
