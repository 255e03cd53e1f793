//! Pixel geometry primitives shared by the model, rasterizer and control.
//!
//! `Size` is an integer pixel extent (control and image dimensions). `RectF`
//! is a real-valued rectangle used for the viewport indicator, whose edges
//! fall on fractional pixels once the auto-shrink factor applies.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub const fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RectF {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RectF {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Intersection with `[0, size)`; `None` when nothing remains.
    pub fn clip_to(&self, size: Size) -> Option<RectF> {
        let x0 = self.x.max(0.0);
        let y0 = self.y.max(0.0);
        let x1 = self.right().min(f64::from(size.width));
        let y1 = self.bottom().min(f64::from(size.height));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(RectF::new(x0, y0, x1 - x0, y1 - y0))
    }
}
