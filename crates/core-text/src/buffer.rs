//! Rope-backed text storage used by hosts that keep their own document.
//!
//! Lines are separated by `'\n'` only (the workspace builds ropey without CR
//! or Unicode line breaks), so `line_count()` always equals the number of
//! shadow blocks produced from `to_string()`.

use ropey::Rope;
use std::ops::Range;

/// A text buffer backed by a `ropey::Rope`.
#[derive(Clone, Debug)]
pub struct Buffer {
    rope: Rope,
    pub name: String,
}

impl Buffer {
    /// Construct a buffer from an in-memory string slice.
    pub fn from_str(name: impl Into<String>, content: &str) -> Self {
        Self {
            rope: Rope::from_str(content),
            name: name.into(),
        }
    }

    /// Total number of lines (blocks) in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Line content without its trailing newline.
    pub fn line(&self, idx: usize) -> Option<String> {
        if idx >= self.rope.len_lines() {
            return None;
        }
        let mut s = self.rope.line(idx).to_string();
        if s.ends_with('\n') {
            s.pop();
        }
        Some(s)
    }

    /// Char index of the first char of line `idx` (clamped to the end).
    pub fn line_to_char(&self, idx: usize) -> usize {
        if idx >= self.rope.len_lines() {
            return self.rope.len_chars();
        }
        self.rope.line_to_char(idx)
    }

    /// Line containing char index `char_idx` (clamped).
    pub fn char_to_line(&self, char_idx: usize) -> usize {
        self.rope.char_to_line(char_idx.min(self.rope.len_chars()))
    }

    /// Insert `text` at char index `char_idx` (clamped to the end).
    pub fn insert(&mut self, char_idx: usize, text: &str) {
        let at = char_idx.min(self.rope.len_chars());
        self.rope.insert(at, text);
    }

    /// Text in char range `range` (clamped).
    pub fn slice(&self, range: Range<usize>) -> String {
        let total = self.rope.len_chars();
        let start = range.start.min(total);
        let end = range.end.min(total);
        if start >= end {
            return String::new();
        }
        self.rope.slice(start..end).to_string()
    }
}

impl std::fmt::Display for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for chunk in self.rope.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}
