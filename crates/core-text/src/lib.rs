//! Text model for the minimap: host document contract, shadow mirror,
//! block layout and formatting.
//!
//! The host editor owns the authoritative document. This crate defines the
//! read-only view the minimap needs of it (`HostDocument`) and the private
//! `ShadowDocument` the minimap renders from.
//!
//! Block model:
//! * A block is one `'\n'`-separated paragraph. Hosts and the shadow derive
//!   blocks from the same plain text with the same rule, so block counts
//!   match by construction.
//! * Each block reports a line count. For the host this is visibility aware
//!   (folded blocks report 0); the shadow always lays out every block.
//! * Formatting ranges are block-local char ranges.

pub mod buffer;
pub mod format;
pub mod layout;
pub mod shadow;

pub use buffer::Buffer;
pub use format::{CharFormat, FormatRange, FormatRanges};
pub use shadow::{Block, DocPosition, ResyncReport, ShadowDocument, TextRange};

/// Read-only view of the host editor's document.
pub trait HostDocument {
    fn plain_text(&self) -> String;
    fn block_count(&self) -> usize;
    /// Laid-out lines of block `index`; 0 when the block is folded away.
    fn block_line_count(&self, index: usize) -> usize;
    fn block_is_visible(&self, index: usize) -> bool;
    /// Additional formatting ranges the host computed for block `index`.
    fn block_formats(&self, index: usize) -> &[FormatRange];
    /// Column width the host wraps blocks at; `None` when it does not wrap.
    fn wrap_columns(&self) -> Option<usize> {
        None
    }

    /// Total laid-out lines of the document.
    fn line_count(&self) -> usize {
        (0..self.block_count())
            .map(|i| self.block_line_count(i))
            .sum()
    }
}
