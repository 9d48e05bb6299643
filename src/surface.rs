//! Drawing surface seam between effects and the host canvas.
//!
//! Effects only ever see `&mut dyn Surface` for the duration of a `draw`
//! call; the controller owns the concrete surface and lends it out.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Canvas dimensions in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when `p` lies within the viewport grown by `margin` on every side.
    pub fn contains_with_margin(self, p: Point, margin: f64) -> bool {
        p.x.is_finite()
            && p.y.is_finite()
            && p.x >= -margin
            && p.x <= self.width + margin
            && p.y >= -margin
            && p.y <= self.height + margin
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Same colour with a different alpha.
    pub const fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// One stop of a radial gradient, `offset` in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f64,
    pub color: Rgba,
}

impl ColorStop {
    pub const fn new(offset: f64, color: Rgba) -> Self {
        Self { offset, color }
    }
}

pub trait Surface {
    fn viewport(&self) -> Viewport;

    /// Resize the backing canvas. Clears its contents as a side effect.
    fn resize(&mut self, viewport: Viewport);

    fn clear(&mut self);

    /// Paint a translucent rectangle over the whole canvas.
    fn veil(&mut self, color: Rgba);

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba);

    /// Fill a circle of `radius` with a radial gradient centred on `center`.
    fn fill_glow(&mut self, center: Point, radius: f64, stops: &[ColorStop]);

    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Rgba);

    fn fill_glyph(&mut self, glyph: char, at: Point, font_px: f64, color: Rgba);

    /// Animate the canvas element's opacity towards `opacity`.
    fn fade_to(&mut self, opacity: f64, duration_ms: u32);

    /// Drop any fade transition style left on the canvas element.
    fn settle(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_check_rejects_nan() {
        let vp = Viewport::new(100.0, 50.0);
        assert!(vp.contains_with_margin(Point::new(-5.0, 55.0), 10.0));
        assert!(!vp.contains_with_margin(Point::new(-11.0, 0.0), 10.0));
        assert!(!vp.contains_with_margin(Point::new(f64::NAN, 0.0), 10.0));
    }

    #[test]
    fn rgba_formats_as_css() {
        assert_eq!(Rgba::new(255, 215, 0, 0.5).to_string(), "rgba(255, 215, 0, 0.5)");
    }
}
