//! Preview rasterization for the minimap.
//!
//! Turns a `ShadowDocument` into a pixel image sized exactly to the control:
//! a logical canvas laid out at font scale, then bilinearly resampled by the
//! configured x scale and the effective (auto-shrunk) y scale.
//!
//! Exposed components:
//! - `pixel`: ARGB surface with alpha blending, rectangle fills, bilinear
//!   resampling and PPM output.
//! - `glyph`: `GlyphPainter` seam with the font-free `BlockGlyphs` and the
//!   `fontdue` backed `FontGlyphs`.
//! - `raster`: the `Rasterizer` pipeline producing `PreviewImage`s.
//! - `metrics` / `timing`: per-rasterizer counters and the process-wide last
//!   render duration.

pub mod error;
pub mod glyph;
pub mod metrics;
pub mod pixel;
pub mod raster;
pub mod timing;

pub use error::RenderError;
pub use glyph::{BlockGlyphs, FontGlyphs, GlyphPainter, GlyphRun};
pub use metrics::{RenderMetrics, RenderMetricsSnapshot};
pub use pixel::PixelBuffer;
pub use raster::{PreviewImage, Rasterizer};
