//! Shadow document mirror.
//!
//! The minimap never renders the host document directly. It keeps a private
//! copy of the host's plain text plus the per-block formatting ranges the
//! host computed (syntax colors, diagnostics, ...), so preview rendering and
//! highlight merges never touch host-owned state.
//!
//! Lifecycle:
//! 1. `ShadowDocument::snapshot(host, option)` takes a value copy at
//!    construction; no reference to the host is retained.
//! 2. Every host "content changed" notification calls `resync(host)`: the
//!    text is replaced in one operation (dropping all formatting), then the
//!    host and shadow blocks are walked in lockstep copying formatting.
//! 3. Highlight changes merge formats onto matched ranges via
//!    `merge_format`; these live in `Block::overrides` until the next resync.
//!
//! Invariants:
//! * `blocks` is never empty (empty text is one empty block).
//! * `plain_text()` reproduces the text passed to the last `set_plain_text`.
//! * Block line counts are always derived from the shadow's own layout
//!   option and wrap width, never copied from the host.
//!
//! Mismatch policy: when the host reports a different block count than the
//! shadow produced, formatting is copied up to the shorter sequence and the
//! tail keeps no additional formats. `ResyncReport::truncated` exposes this.

use crate::format::{self, CharFormat, FormatRange, FormatRanges};
use crate::layout;
use crate::HostDocument;
use core_config::TextLayoutOption;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    text: String,
    char_len: usize,
    line_count: usize,
    additional: FormatRanges,
    overrides: FormatRanges,
}

impl Block {
    fn new(text: &str, option: &TextLayoutOption, wrap_columns: Option<usize>) -> Self {
        Self {
            text: text.to_string(),
            char_len: text.chars().count(),
            line_count: layout::line_count(text, option, wrap_columns),
            additional: FormatRanges::new(),
            overrides: FormatRanges::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
    pub fn char_len(&self) -> usize {
        self.char_len
    }
    pub fn line_count(&self) -> usize {
        self.line_count
    }
    /// Formatting ranges mirrored from the host block.
    pub fn additional_formats(&self) -> &[FormatRange] {
        &self.additional
    }
    /// Formatting merged by highlight operations.
    pub fn overrides(&self) -> &[FormatRange] {
        &self.overrides
    }

    /// Effective per-char format: `base`, then additional ranges, then overrides.
    pub fn resolved_formats(&self, base: &CharFormat) -> Vec<CharFormat> {
        format::resolve(
            self.char_len,
            base,
            self.additional.iter().chain(self.overrides.iter()),
        )
    }
}

/// Block-local char range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextRange {
    pub block: usize,
    pub start: usize,
    pub len: usize,
}

impl TextRange {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Char position inside the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DocPosition {
    pub block: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResyncReport {
    pub host_blocks: usize,
    pub shadow_blocks: usize,
    /// Blocks whose formatting was copied.
    pub copied: usize,
}

impl ResyncReport {
    pub fn truncated(&self) -> bool {
        self.host_blocks != self.shadow_blocks
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShadowDocument {
    blocks: Vec<Block>,
    option: TextLayoutOption,
    wrap_columns: Option<usize>,
}

impl ShadowDocument {
    /// Empty document (a single empty block).
    pub fn new(option: TextLayoutOption) -> Self {
        Self::with_wrap_columns(option, None)
    }

    pub fn with_wrap_columns(option: TextLayoutOption, wrap_columns: Option<usize>) -> Self {
        Self {
            blocks: vec![Block::new("", &option, wrap_columns)],
            option,
            wrap_columns,
        }
    }

    /// Value copy of the host's text and formatting.
    pub fn snapshot<H: HostDocument + ?Sized>(host: &H, option: TextLayoutOption) -> Self {
        let mut doc = Self::new(option);
        doc.resync(host);
        doc
    }

    /// Replace the whole text, discarding all formatting.
    pub fn set_plain_text(&mut self, text: &str) {
        let option = self.option;
        let cols = self.wrap_columns;
        self.blocks = text
            .split('\n')
            .map(|line| Block::new(line, &option, cols))
            .collect();
    }

    /// Re-mirror the host: text first, then formatting block-for-block.
    /// Blocks are laid out at the host's wrap width.
    pub fn resync<H: HostDocument + ?Sized>(&mut self, host: &H) -> ResyncReport {
        self.wrap_columns = host.wrap_columns();
        self.set_plain_text(&host.plain_text());
        let host_blocks = host.block_count();
        let shadow_blocks = self.blocks.len();
        let mut copied = 0usize;
        for (index, block) in self.blocks.iter_mut().enumerate().take(host_blocks) {
            block.additional = host.block_formats(index).iter().copied().collect();
            copied += 1;
        }
        let report = ResyncReport {
            host_blocks,
            shadow_blocks,
            copied,
        };
        if report.truncated() {
            warn!(
                target: "text.mirror",
                host_blocks,
                shadow_blocks,
                copied,
                "block_count_mismatch"
            );
        } else {
            debug!(target: "text.mirror", blocks = shadow_blocks, lines = self.line_count(), "shadow_resynced");
        }
        report
    }

    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for (i, b) in self.blocks.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&b.text);
        }
        out
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Total laid-out lines across all blocks.
    pub fn line_count(&self) -> usize {
        self.blocks.iter().map(Block::line_count).sum()
    }

    pub fn layout_option(&self) -> &TextLayoutOption {
        &self.option
    }

    pub fn wrap_columns(&self) -> Option<usize> {
        self.wrap_columns
    }

    /// Next exact, case-sensitive occurrence of `needle` at or after `from`.
    /// Matches never span blocks; an empty needle or one containing a
    /// newline matches nothing.
    pub fn find(&self, needle: &str, from: DocPosition) -> Option<TextRange> {
        if needle.is_empty() || needle.contains('\n') {
            return None;
        }
        let needle_chars = needle.chars().count();
        for (index, block) in self.blocks.iter().enumerate().skip(from.block) {
            let start_char = if index == from.block { from.offset } else { 0 };
            if start_char >= block.char_len {
                continue;
            }
            let start_byte = char_to_byte(&block.text, start_char);
            if let Some(found) = block.text[start_byte..].find(needle) {
                let match_byte = start_byte + found;
                let offset = block.text[..match_byte].chars().count();
                return Some(TextRange {
                    block: index,
                    start: offset,
                    len: needle_chars,
                });
            }
        }
        None
    }

    /// All non-overlapping occurrences scanning forward from the start.
    pub fn find_all(&self, needle: &str) -> Vec<TextRange> {
        let mut out = Vec::new();
        let mut pos = DocPosition::default();
        while let Some(m) = self.find(needle, pos) {
            pos = DocPosition {
                block: m.block,
                offset: m.end(),
            };
            out.push(m);
        }
        out
    }

    /// Merge `format` onto a block-local range. Merging onto a span that
    /// already carries an override updates it in place.
    pub fn merge_format(&mut self, range: TextRange, format: &CharFormat) {
        let Some(block) = self.blocks.get_mut(range.block) else {
            return;
        };
        let end = range.end().min(block.char_len);
        if range.start >= end {
            return;
        }
        let len = end - range.start;
        match block
            .overrides
            .iter_mut()
            .find(|r| r.start == range.start && r.length == len)
        {
            Some(existing) => existing.format.merge(format),
            None => block
                .overrides
                .push(FormatRange::new(range.start, len, *format)),
        }
    }
}

fn char_to_byte(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map_or(s.len(), |(byte, _)| byte)
}
