//! Rope-backed reference host.

use crate::{HostView, ScrollRange};
use core_config::TextLayoutOption;
use core_text::{Buffer, FormatRange, HostDocument, layout};
use std::ops::Range;
use tracing::trace;

#[derive(Debug, Clone)]
pub struct TextHost {
    buffer: Buffer,
    formats: Vec<Vec<FormatRange>>,
    folded: Vec<bool>,
    /// Laid-out lines per block ignoring folding.
    layout_lines: Vec<usize>,
    option: TextLayoutOption,
    wrap_columns: Option<usize>,
    viewport_rows: usize,
    scroll_value: i32,
    selection: Option<Range<usize>>,
}

impl TextHost {
    pub fn new(text: &str, option: TextLayoutOption, viewport_rows: usize) -> Self {
        let mut host = Self {
            buffer: Buffer::from_str("host", text),
            formats: Vec::new(),
            folded: Vec::new(),
            layout_lines: Vec::new(),
            option,
            wrap_columns: None,
            viewport_rows,
            scroll_value: 0,
            selection: None,
        };
        host.reset_block_state();
        host
    }

    pub fn with_wrap_columns(mut self, columns: Option<usize>) -> Self {
        self.wrap_columns = columns;
        self.relayout();
        self
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn viewport_rows(&self) -> usize {
        self.viewport_rows
    }

    pub fn selection(&self) -> Option<Range<usize>> {
        self.selection.clone()
    }

    /// Replace the whole document. Formats, folding and selection reset.
    pub fn set_text(&mut self, text: &str) {
        self.buffer = Buffer::from_str(self.buffer.name.clone(), text);
        self.reset_block_state();
    }

    /// Insert `text` at char index `at`. Blocks created by embedded newlines
    /// start unformatted and unfolded.
    pub fn insert(&mut self, at: usize, text: &str) {
        let at = at.min(self.buffer.len_chars());
        let block = self.buffer.char_to_line(at);
        self.buffer.insert(at, text);
        let added = text.matches('\n').count();
        for _ in 0..added {
            self.formats.insert(block + 1, Vec::new());
            self.folded.insert(block + 1, false);
        }
        self.selection = None;
        self.relayout();
    }

    pub fn set_block_formats(&mut self, block: usize, formats: Vec<FormatRange>) {
        if let Some(slot) = self.formats.get_mut(block) {
            *slot = formats;
        }
    }

    pub fn set_folded(&mut self, block: usize, folded: bool) {
        if let Some(slot) = self.folded.get_mut(block) {
            *slot = folded;
            self.clamp_scroll();
        }
    }

    /// Select the char range `range` (clamped to the document).
    pub fn select(&mut self, range: Range<usize>) {
        let total = self.buffer.len_chars();
        let start = range.start.min(total);
        let end = range.end.min(total);
        self.selection = (start < end).then_some(start..end);
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Select the word (alphanumerics and `_`) around char index `at`, the way
    /// an editor does on double-click. Returns the selected text.
    pub fn select_word_at(&mut self, at: usize) -> String {
        let block = self.buffer.char_to_line(at);
        let line_start = self.buffer.line_to_char(block);
        let chars: Vec<char> = self.buffer.line(block).unwrap_or_default().chars().collect();
        let is_word = |c: &char| c.is_alphanumeric() || *c == '_';
        let offset = at.saturating_sub(line_start).min(chars.len());
        if !chars.get(offset).is_some_and(is_word) {
            self.selection = None;
            return String::new();
        }
        let start = chars[..offset]
            .iter()
            .rposition(|c| !is_word(c))
            .map_or(0, |p| p + 1);
        let end = chars[offset..]
            .iter()
            .position(|c| !is_word(c))
            .map_or(chars.len(), |p| offset + p);
        self.select(line_start + start..line_start + end);
        self.selected_text()
    }

    pub fn set_viewport_rows(&mut self, rows: usize) {
        self.viewport_rows = rows;
        self.clamp_scroll();
    }

    fn reset_block_state(&mut self) {
        let blocks = self.buffer.line_count();
        self.formats = vec![Vec::new(); blocks];
        self.folded = vec![false; blocks];
        self.selection = None;
        self.relayout();
    }

    fn relayout(&mut self) {
        self.layout_lines = (0..self.buffer.line_count())
            .map(|i| {
                let text = self.buffer.line(i).unwrap_or_default();
                layout::line_count(&text, &self.option, self.wrap_columns)
            })
            .collect();
        self.clamp_scroll();
    }

    fn scroll_maximum(&self) -> i32 {
        let total = self.line_count();
        total.saturating_sub(self.viewport_rows).min(i32::MAX as usize) as i32
    }

    fn clamp_scroll(&mut self) {
        self.scroll_value = self.scroll_value.clamp(0, self.scroll_maximum());
    }
}

impl HostDocument for TextHost {
    fn plain_text(&self) -> String {
        self.buffer.to_string()
    }

    fn block_count(&self) -> usize {
        self.buffer.line_count()
    }

    fn block_line_count(&self, index: usize) -> usize {
        if !self.block_is_visible(index) {
            return 0;
        }
        self.layout_lines.get(index).copied().unwrap_or(0)
    }

    fn block_is_visible(&self, index: usize) -> bool {
        index < self.folded.len() && !self.folded[index]
    }

    fn block_formats(&self, index: usize) -> &[FormatRange] {
        self.formats.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    fn wrap_columns(&self) -> Option<usize> {
        self.wrap_columns
    }
}

impl HostView for TextHost {
    fn scroll(&self) -> ScrollRange {
        ScrollRange::new(0, self.scroll_maximum(), self.scroll_value)
    }

    fn set_scroll_value(&mut self, value: i32) {
        self.scroll_value = value.clamp(0, self.scroll_maximum());
        trace!(target: "host", value = self.scroll_value, "scroll_value_set");
    }

    fn selected_text(&self) -> String {
        self.selection
            .clone()
            .map(|r| self.buffer.slice(r))
            .unwrap_or_default()
    }

    fn visible_block_range(&self) -> Option<Range<usize>> {
        let first = self.scroll_value.max(0) as usize;
        let last = first + self.viewport_rows;
        let mut line = 0usize;
        let mut start = None;
        let mut end = 0usize;
        for block in 0..self.block_count() {
            let lines = self.block_line_count(block);
            if lines == 0 {
                continue;
            }
            let next = line + lines;
            if next > first && line < last {
                start.get_or_insert(block);
                end = block + 1;
            }
            if line >= last {
                break;
            }
            line = next;
        }
        Some(start.map_or(0..0, |s| s..end))
    }
}
