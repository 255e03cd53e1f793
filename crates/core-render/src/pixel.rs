//! Software pixel surface.
//!
//! Pixels are packed `0xAARRGGBB` in row-major order. All drawing is
//! source-over alpha blending; coordinates outside the surface are clipped
//! silently.

use core_config::Color;
use core_model::{RectF, Size};
use std::io::{self, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u32>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        Self {
            width,
            height,
            data: vec![fill.to_argb(); width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn pixels(&self) -> &[u32] {
        &self.data
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(Color::from_argb(self.data[self.index(x, y)]))
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn fill(&mut self, color: Color) {
        self.data.fill(color.to_argb());
    }

    /// Blend `color` at `(x, y)` with its alpha scaled by `coverage / 255`.
    pub fn blend(&mut self, x: i64, y: i64, color: Color, coverage: u8) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let idx = self.index(x as u32, y as u32);
        let alpha = u32::from(color.a) * u32::from(coverage) / 255;
        if alpha == 0 {
            return;
        }
        if alpha == 255 {
            self.data[idx] = color.to_argb();
            return;
        }
        let dst = Color::from_argb(self.data[idx]);
        self.data[idx] = blend_over(dst, color, alpha).to_argb();
    }

    /// Blend `color` over every pixel whose centre lies inside `rect`.
    pub fn fill_rect(&mut self, rect: RectF, color: Color) {
        let Some(r) = rect.clip_to(self.size()) else {
            return;
        };
        let x0 = r.x.round() as i64;
        let x1 = r.right().round() as i64;
        let y0 = r.y.round() as i64;
        let y1 = r.bottom().round() as i64;
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, color, 255);
            }
        }
    }

    /// Bilinear resample to `target`. An empty target yields an empty buffer.
    pub fn resample_bilinear(&self, target: Size) -> PixelBuffer {
        if target.is_empty() {
            return PixelBuffer {
                width: target.width,
                height: target.height,
                data: Vec::new(),
            };
        }
        if self.is_empty() {
            return PixelBuffer::new(target.width, target.height, Color::TRANSPARENT);
        }
        if target == self.size() {
            return self.clone();
        }
        let sx = f64::from(self.width) / f64::from(target.width);
        let sy = f64::from(self.height) / f64::from(target.height);
        let max_x = f64::from(self.width - 1);
        let max_y = f64::from(self.height - 1);
        let mut out = Vec::with_capacity(target.area());
        for ty in 0..target.height {
            let fy = ((f64::from(ty) + 0.5) * sy - 0.5).clamp(0.0, max_y);
            let y0 = fy.floor() as u32;
            let y1 = (y0 + 1).min(self.height - 1);
            let wy = fy - f64::from(y0);
            for tx in 0..target.width {
                let fx = ((f64::from(tx) + 0.5) * sx - 0.5).clamp(0.0, max_x);
                let x0 = fx.floor() as u32;
                let x1 = (x0 + 1).min(self.width - 1);
                let wx = fx - f64::from(x0);
                let top = lerp(self.px(x0, y0), self.px(x1, y0), wx);
                let bottom = lerp(self.px(x0, y1), self.px(x1, y1), wx);
                out.push(pack(lerp(top, bottom, wy)));
            }
        }
        PixelBuffer {
            width: target.width,
            height: target.height,
            data: out,
        }
    }

    fn px(&self, x: u32, y: u32) -> [f64; 4] {
        let c = Color::from_argb(self.data[self.index(x, y)]);
        [
            f64::from(c.a),
            f64::from(c.r),
            f64::from(c.g),
            f64::from(c.b),
        ]
    }

    /// Binary PPM (P6), composited over white.
    pub fn write_ppm<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
        let mut row = Vec::with_capacity(self.width as usize * 3);
        for line in self.data.chunks(self.width.max(1) as usize) {
            row.clear();
            for &px in line {
                let src = Color::from_argb(px);
                let c = blend_over(Color::WHITE, src.with_alpha(255), u32::from(src.a));
                row.extend_from_slice(&[c.r, c.g, c.b]);
            }
            out.write_all(&row)?;
        }
        out.flush()
    }
}

fn blend_over(dst: Color, src: Color, alpha: u32) -> Color {
    let inv = 255 - alpha;
    let mix = |s: u8, d: u8| ((u32::from(s) * alpha + u32::from(d) * inv + 127) / 255) as u8;
    let a = (alpha + u32::from(dst.a) * inv / 255).min(255) as u8;
    Color::rgba(mix(src.r, dst.r), mix(src.g, dst.g), mix(src.b, dst.b), a)
}

fn lerp(a: [f64; 4], b: [f64; 4], t: f64) -> [f64; 4] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

fn pack(c: [f64; 4]) -> u32 {
    let ch = |v: f64| v.round().clamp(0.0, 255.0) as u8;
    Color::rgba(ch(c[1]), ch(c[2]), ch(c[3]), ch(c[0])).to_argb()
}
