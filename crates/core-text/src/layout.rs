//! Block layout: grapheme clusters, display columns and line wrapping.
//!
//! Columns are display cells (`unicode-width`), tabs expand to the next tab
//! stop measured from the block start. Wrapping never splits a grapheme
//! cluster. Whitespace may hang past the wrap column; it never forces a
//! break on its own.
//!
//! Invariants:
//! * `line_ranges` always returns at least one range (empty text -> `[0..0]`).
//! * Ranges are contiguous, ascending and cover `0..char_count` exactly.

use core_config::{TextLayoutOption, WrapMode};
use std::ops::Range;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cluster<'a> {
    pub text: &'a str,
    /// Char offset of the cluster within the block.
    pub char_index: usize,
    /// Display column of the cluster start within the block.
    pub column: usize,
    pub width: usize,
    pub is_whitespace: bool,
}

pub fn clusters(text: &str, tab_width: u8) -> Vec<Cluster<'_>> {
    let tab = usize::from(tab_width.max(1));
    let mut out = Vec::new();
    let mut column = 0usize;
    let mut char_index = 0usize;
    for g in text.graphemes(true) {
        let width = if g == "\t" {
            tab - column % tab
        } else {
            g.width()
        };
        out.push(Cluster {
            text: g,
            char_index,
            column,
            width,
            is_whitespace: g.chars().all(char::is_whitespace),
        });
        column += width;
        char_index += g.chars().count();
    }
    out
}

/// Char ranges of the visual lines of `text` wrapped at `columns`.
/// `None` (or `WrapMode::NoWrap`) lays the block out on a single line.
pub fn line_ranges(
    text: &str,
    option: &TextLayoutOption,
    columns: Option<usize>,
) -> Vec<Range<usize>> {
    let total_chars = text.chars().count();
    let columns = match (option.wrap, columns) {
        (WrapMode::NoWrap, _) | (_, None) => return vec![0..total_chars],
        (_, Some(c)) => c.max(1),
    };

    let cl = clusters(text, option.tab_width);
    let mut lines = Vec::new();
    let mut line_start = 0usize; // cluster index
    let mut line_start_col = 0usize;
    let mut last_break: Option<usize> = None; // cluster index a word-wrapped line may start at
    let mut i = 0usize;
    while i < cl.len() {
        let c = &cl[i];
        let end_col = c.column + c.width - line_start_col;
        if end_col > columns && i > line_start && !c.is_whitespace {
            let brk = match (option.wrap, last_break) {
                (WrapMode::WordWrap, Some(b)) if b > line_start => b,
                _ => i,
            };
            lines.push(cl[line_start].char_index..cl[brk].char_index);
            line_start = brk;
            line_start_col = cl[brk].column;
            last_break = None;
            i = brk;
            continue;
        }
        if c.is_whitespace {
            last_break = Some(i + 1);
        }
        i += 1;
    }
    let tail_start = cl.get(line_start).map_or(total_chars, |c| c.char_index);
    lines.push(tail_start..total_chars);
    lines
}

pub fn line_count(text: &str, option: &TextLayoutOption, columns: Option<usize>) -> usize {
    line_ranges(text, option, columns).len()
}
