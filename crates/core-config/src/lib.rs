//! Configuration loading and parsing for the minimap scrollbar.
//!
//! Parses `scrollmap.toml` (or an override path provided by the binary) into
//! a `ConfigFile` and derives the immutable `Settings` bundle the control
//! consumes. The control never writes settings back; one `Settings` value is
//! shared by `Arc` for the lifetime of a control instance.
//!
//! Recognized sections (all optional, unknown fields ignored):
//!
//! ```toml
//! [scrollbar]
//! width = 120
//! disable_context_menu = true
//!
//! [scale]
//! x = 0.6
//! y = 0.3
//!
//! [font]
//! family = "monospace"
//! size_px = 11.0
//! line_height = 14        # optional, derived from size_px when absent
//! path = "/usr/share/fonts/TTF/DejaVuSansMono.ttf"   # optional
//!
//! [layout]
//! wrap = "no-wrap"        # no-wrap | wrap-anywhere | word-wrap
//! tab_width = 4
//!
//! [colors]
//! viewport = "#0000ff30"
//! selection_highlight = "#ffd700"
//! text = "#303030"
//! background = "#ffffff"
//!
//! [viewport]
//! line_count = "direct"   # direct | legacy
//! ```
//!
//! Invariants of a `Settings` produced here:
//! * `scroll_bar_width > 0`
//! * `x_scale > 0`, `y_scale > 0` (finite)
//! * `font.size_px > 0`, `text_option.tab_width >= 1`
//!
//! Values violating these are replaced by defaults and reported under the
//! `config` tracing target. A file that fails to parse falls back to
//! defaults entirely.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

mod color;
pub use color::Color;

pub const CONFIG_FILE_NAME: &str = "scrollmap.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WrapMode {
    #[default]
    NoWrap,
    WrapAnywhere,
    WordWrap,
}

/// Paragraph layout options applied to the shadow document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TextLayoutOption {
    #[serde(default)]
    pub wrap: WrapMode,
    #[serde(default = "TextLayoutOption::default_tab_width")]
    pub tab_width: u8,
}

impl Default for TextLayoutOption {
    fn default() -> Self {
        Self {
            wrap: WrapMode::default(),
            tab_width: Self::default_tab_width(),
        }
    }
}

impl TextLayoutOption {
    const fn default_tab_width() -> u8 {
        4
    }
}

/// How the number of lines shown by the host viewport is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportLineStrategy {
    /// Sum the line counts of the host-reported visible block range, falling
    /// back to `Legacy` when the host cannot report one.
    #[default]
    Direct,
    /// `2 * line_count - unfolded_lines - scroll_max`, reconstructed from the
    /// host scrollbar geometry.
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FontSpec {
    #[serde(default = "FontSpec::default_family")]
    pub family: String,
    #[serde(default = "FontSpec::default_size_px")]
    pub size_px: f32,
    /// Explicit line height in pixels; derived from `size_px` when absent.
    #[serde(default)]
    pub line_height: Option<u32>,
    /// TrueType/OpenType file used to draw real glyphs into the preview.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: Self::default_family(),
            size_px: Self::default_size_px(),
            line_height: None,
            path: None,
        }
    }
}

impl FontSpec {
    fn default_family() -> String {
        "monospace".to_string()
    }
    const fn default_size_px() -> f32 {
        11.0
    }

    /// Pixel distance between consecutive baselines.
    pub fn line_height_px(&self) -> u32 {
        match self.line_height {
            Some(h) => h,
            None => (self.size_px * 1.2).ceil().max(1.0) as u32,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ScrollbarSection {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub disable_context_menu: Option<bool>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ScaleSection {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ColorSection {
    #[serde(default)]
    pub viewport: Option<Color>,
    #[serde(default)]
    pub selection_highlight: Option<Color>,
    #[serde(default)]
    pub text: Option<Color>,
    #[serde(default)]
    pub background: Option<Color>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ViewportSection {
    #[serde(default)]
    pub line_count: ViewportLineStrategy,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub scrollbar: ScrollbarSection,
    #[serde(default)]
    pub scale: ScaleSection,
    #[serde(default)]
    pub font: FontSpec,
    #[serde(default)]
    pub layout: TextLayoutOption,
    #[serde(default)]
    pub colors: ColorSection,
    #[serde(default)]
    pub viewport: ViewportSection,
}

/// Immutable-per-control configuration bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub scroll_bar_width: u32,
    pub font: FontSpec,
    pub text_option: TextLayoutOption,
    pub viewport_color: Color,
    pub selection_highlight_color: Color,
    pub text_color: Color,
    pub background_color: Color,
    pub x_scale: f64,
    pub y_scale: f64,
    pub disable_context_menu: bool,
    pub viewport_lines: ViewportLineStrategy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scroll_bar_width: 120,
            font: FontSpec::default(),
            text_option: TextLayoutOption::default(),
            viewport_color: Color::rgba(0x00, 0x00, 0xff, 0x30),
            selection_highlight_color: Color::rgb(0xff, 0xd7, 0x00),
            text_color: Color::rgb(0x30, 0x30, 0x30),
            background_color: Color::WHITE,
            x_scale: 0.6,
            y_scale: 0.3,
            disable_context_menu: true,
            viewport_lines: ViewportLineStrategy::default(),
        }
    }
}

impl Settings {
    /// Line height of the configured font in pixels.
    pub fn line_height_px(&self) -> u32 {
        self.font.line_height_px()
    }

    /// Derive settings from a parsed file, replacing out-of-contract values
    /// with defaults.
    pub fn from_file(file: &ConfigFile) -> Self {
        let defaults = Settings::default();

        let scroll_bar_width = match file.scrollbar.width {
            Some(0) => {
                warn!(target: "config", field = "scrollbar.width", "invalid_value_replaced");
                defaults.scroll_bar_width
            }
            Some(w) => w,
            None => defaults.scroll_bar_width,
        };
        let x_scale = positive_scale("scale.x", file.scale.x, defaults.x_scale);
        let y_scale = positive_scale("scale.y", file.scale.y, defaults.y_scale);

        let mut font = file.font.clone();
        if !(font.size_px.is_finite() && font.size_px > 0.0) {
            warn!(target: "config", field = "font.size_px", value = font.size_px, "invalid_value_replaced");
            font.size_px = FontSpec::default_size_px();
        }
        if font.line_height == Some(0) {
            warn!(target: "config", field = "font.line_height", "invalid_value_replaced");
            font.line_height = None;
        }

        let mut text_option = file.layout;
        if text_option.tab_width == 0 {
            text_option.tab_width = 1;
        }

        Settings {
            scroll_bar_width,
            font,
            text_option,
            viewport_color: file.colors.viewport.unwrap_or(defaults.viewport_color),
            selection_highlight_color: file
                .colors
                .selection_highlight
                .unwrap_or(defaults.selection_highlight_color),
            text_color: file.colors.text.unwrap_or(defaults.text_color),
            background_color: file.colors.background.unwrap_or(defaults.background_color),
            x_scale,
            y_scale,
            disable_context_menu: file
                .scrollbar
                .disable_context_menu
                .unwrap_or(defaults.disable_context_menu),
            viewport_lines: file.viewport.line_count,
        }
    }
}

fn positive_scale(field: &'static str, value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        Some(v) => {
            warn!(target: "config", field, value = v, "invalid_value_replaced");
            default
        }
        None => default,
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
    pub settings: Settings,  // validated view of `file`
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("scrollmap").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            let settings = Settings::from_file(&file);
            info!(
                target: "config",
                path = %path.display(),
                width = settings.scroll_bar_width,
                x_scale = settings.x_scale,
                y_scale = settings.y_scale,
                "config_loaded"
            );
            Ok(Config {
                raw: Some(content),
                file,
                settings,
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    fn captured<F: FnOnce()>(f: F) -> String {
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();
        with_default(subscriber, f);
        let out = buffer.lock().unwrap().clone();
        String::from_utf8(out).unwrap()
    }

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), body).unwrap();
        tmp
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert!(cfg.raw.is_none());
        assert_eq!(cfg.settings, Settings::default());
    }

    #[test]
    fn parses_all_sections() {
        let tmp = write_config(
            "[scrollbar]\nwidth = 90\ndisable_context_menu = false\n\
             [scale]\nx = 0.5\ny = 1.0\n\
             [font]\nfamily = \"Mono\"\nsize_px = 10.0\nline_height = 14\n\
             [layout]\nwrap = \"word-wrap\"\ntab_width = 8\n\
             [colors]\nviewport = \"#0000ff40\"\nselection_highlight = \"#ff0000\"\n\
             [viewport]\nline_count = \"legacy\"\n",
        );
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        let s = &cfg.settings;
        assert_eq!(s.scroll_bar_width, 90);
        assert!(!s.disable_context_menu);
        assert_eq!(s.x_scale, 0.5);
        assert_eq!(s.y_scale, 1.0);
        assert_eq!(s.font.family, "Mono");
        assert_eq!(s.line_height_px(), 14);
        assert_eq!(s.text_option.wrap, WrapMode::WordWrap);
        assert_eq!(s.text_option.tab_width, 8);
        assert_eq!(s.viewport_color, Color::rgba(0, 0, 255, 0x40));
        assert_eq!(s.selection_highlight_color, Color::rgb(255, 0, 0));
        assert_eq!(s.background_color, Color::WHITE);
        assert_eq!(s.viewport_lines, ViewportLineStrategy::Legacy);
    }

    #[test]
    fn line_height_derived_from_size() {
        let font = FontSpec {
            size_px: 11.0,
            ..FontSpec::default()
        };
        assert_eq!(font.line_height_px(), 14);
        let font = FontSpec {
            size_px: 20.0,
            line_height: Some(22),
            ..FontSpec::default()
        };
        assert_eq!(font.line_height_px(), 22);
    }

    #[test]
    fn unparsable_file_falls_back_to_defaults() {
        let tmp = write_config("[colors]\nviewport = \"blue\"\n");
        let mut cfg = None;
        let log = captured(|| {
            cfg = Some(load_from(Some(tmp.path().to_path_buf())).unwrap());
        });
        assert_eq!(cfg.unwrap().settings, Settings::default());
        assert!(log.contains("WARN config:"));
        assert!(log.contains("config_parse_failed"));
    }

    #[test]
    fn non_positive_scale_replaced_with_warning() {
        let tmp = write_config("[scale]\nx = 0.0\ny = -2.0\n[scrollbar]\nwidth = 0\n");
        let mut cfg = None;
        let log = captured(|| {
            cfg = Some(load_from(Some(tmp.path().to_path_buf())).unwrap());
        });
        let s = cfg.unwrap().settings;
        let d = Settings::default();
        assert_eq!(s.x_scale, d.x_scale);
        assert_eq!(s.y_scale, d.y_scale);
        assert_eq!(s.scroll_bar_width, d.scroll_bar_width);
        assert_eq!(log.matches("invalid_value_replaced").count(), 3);
    }

    #[test]
    fn zero_tab_width_clamped_to_one() {
        let tmp = write_config("[layout]\ntab_width = 0\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.settings.text_option.tab_width, 1);
    }
}
