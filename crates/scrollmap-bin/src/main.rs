//! Command line front end: renders the minimap of a text file to a PPM image.
//!
//! The file is loaded into a `TextHost`, a `ScrollMap` is attached to it and
//! the requested interactions (scroll, click, highlight) are replayed before
//! the painted control is written out. The resulting scroll value and
//! viewport rectangle are printed on stdout.

use anyhow::{Context, Result};
use clap::Parser;
use core_config::{WrapMode, load_from};
use core_control::ScrollMap;
use core_events::{MouseButton, ViewportEvent};
use core_model::{HostView, Size, TextHost};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

const LOG_FILE: &str = "scrollmap.log";

#[derive(Parser, Debug)]
#[command(name = "scrollmap", version, about = "Render a code minimap scrollbar")]
struct Args {
    /// Text file to preview (UTF-8).
    pub file: PathBuf,
    /// Configuration file (overrides discovery of `scrollmap.toml`).
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Control width in pixels (defaults to the configured scrollbar width).
    #[arg(long)]
    pub width: Option<u32>,
    /// Control height in pixels.
    #[arg(long, default_value_t = 600)]
    pub height: u32,
    /// Lines visible in the simulated editor viewport.
    #[arg(long, default_value_t = 40)]
    pub rows: usize,
    /// Wrap the simulated editor at this many columns (word wrap unless the
    /// configuration picks another wrap mode).
    #[arg(long)]
    pub wrap_columns: Option<usize>,
    /// Initial scroll value (first visible line).
    #[arg(long)]
    pub scroll: Option<i32>,
    /// Left-click the control at this y coordinate.
    #[arg(long)]
    pub click: Option<f32>,
    /// Double-click the first occurrence of this word in the editor.
    #[arg(long)]
    pub highlight: Option<String>,
    /// Output image path.
    #[arg(long, default_value = "scrollmap.ppm")]
    pub out: PathBuf,
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join(LOG_FILE);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }
    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()
        .map(|_| guard)
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

/// Normalize CRLF and lone CR to LF so host blocks split on `'\n'` only.
fn normalize_line_endings(input: &str) -> String {
    if !input.contains('\r') {
        return input.to_string();
    }
    input.replace("\r\n", "\n").replace('\r', "\n")
}

/// Char range of the first occurrence of `word` in `text`.
fn first_occurrence(text: &str, word: &str) -> Option<std::ops::Range<usize>> {
    if word.is_empty() {
        return None;
    }
    let byte = text.find(word)?;
    let start = text[..byte].chars().count();
    Some(start..start + word.chars().count())
}

fn run(args: &Args) -> Result<()> {
    let config = load_from(args.config.clone())?;
    let mut settings = config.settings;
    if let Some(width) = args.width {
        settings.scroll_bar_width = width.max(1);
    }
    if args.wrap_columns.is_some() && settings.text_option.wrap == WrapMode::NoWrap {
        settings.text_option.wrap = WrapMode::WordWrap;
    }

    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let text = normalize_line_endings(&raw);
    info!(
        target: "io",
        file = %args.file.display(),
        size_bytes = raw.len(),
        "file_read_ok"
    );

    let mut host =
        TextHost::new(&text, settings.text_option, args.rows).with_wrap_columns(args.wrap_columns);
    let width = settings.scroll_bar_width;
    let mut map = ScrollMap::new(&host, Arc::new(settings)).context("creating scrollmap")?;
    map.resize(Size::new(width, args.height));

    if let Some(value) = args.scroll {
        host.set_scroll_value(value);
    }
    if let Some(y) = args.click {
        map.mouse_press(&mut host, MouseButton::Left, y);
        map.mouse_release(MouseButton::Left);
    }
    if let Some(word) = args.highlight.as_deref() {
        match first_occurrence(&text, word) {
            Some(range) => {
                map.on_host_viewport_event(ViewportEvent::DoubleClick);
                host.select(range);
                map.on_host_selection_changed(&host);
            }
            None => warn!(target: "runtime", word, "highlight_word_not_found"),
        }
    }

    let frame = map.paint(&host);
    let file = File::create(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;
    frame
        .write_ppm(BufWriter::new(file))
        .with_context(|| format!("writing {}", args.out.display()))?;

    let scroll = host.scroll();
    let rect = map.viewport_rect(&host);
    info!(
        target: "runtime",
        value = scroll.value,
        maximum = scroll.maximum,
        auto_shrink = map.scale().auto_shrink,
        out = %args.out.display(),
        "preview_written"
    );
    println!(
        "value={} max={} viewport=({:.1},{:.1},{:.1},{:.1}) auto_shrink={:.4} out={}",
        scroll.value,
        scroll.maximum,
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        map.scale().auto_shrink,
        args.out.display()
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", file = %args.file.display(), "startup");
    run(&args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_endings_become_lf() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\nc\n");
        assert_eq!(normalize_line_endings("plain"), "plain");
    }

    #[test]
    fn occurrence_is_reported_in_chars() {
        assert_eq!(first_occurrence("é foo", "foo"), Some(2..5));
        assert_eq!(first_occurrence("abc", "x"), None);
        assert_eq!(first_occurrence("abc", ""), None);
    }

    #[test]
    fn args_parse_with_defaults() {
        let args = Args::try_parse_from(["scrollmap", "main.rs", "--click", "12.5"]).unwrap();
        assert_eq!(args.height, 600);
        assert_eq!(args.rows, 40);
        assert_eq!(args.click, Some(12.5));
        assert_eq!(args.out, PathBuf::from("scrollmap.ppm"));
    }
}
