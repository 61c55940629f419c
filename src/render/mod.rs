//! Drawing surface abstraction
//!
//! The engine draws through [`Canvas`]; the terminal backend lives in
//! [`braille`], and tests use a recording canvas.

pub mod braille;
#[cfg(test)]
pub mod recording;

use crate::geo::PixelPoint;

/// Straight RGB plus alpha in [0, 1]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Rgba {
    Rgba { r, g, b, a }
}

impl Rgba {
    pub const fn with_alpha(self, a: f64) -> Rgba {
        Rgba { a, ..self }
    }

    /// Composite over black
    pub fn premultiplied(&self) -> (u8, u8, u8) {
        let a = self.a.clamp(0.0, 1.0);
        let scale = |c: u8| (c as f64 * a).round() as u8;
        (scale(self.r), scale(self.g), scale(self.b))
    }
}

/// One stop of a radial gradient; `offset` runs from the centre (0) to the rim (1)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    pub offset: f64,
    pub color: Rgba,
}

pub const fn stop(offset: f64, color: Rgba) -> ColorStop {
    ColorStop { offset, color }
}

/// Colour of a gradient at `t` (0 = centre), linear between stops
pub fn gradient_at(stops: &[ColorStop], t: f64) -> Option<Rgba> {
    let first = stops.first()?;
    if t <= first.offset {
        return Some(first.color);
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            let f = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
            let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * f).round() as u8;
            return Some(Rgba {
                r: mix(a.color.r, b.color.r),
                g: mix(a.color.g, b.color.g),
                b: mix(a.color.b, b.color.b),
                a: a.color.a + (b.color.a - a.color.a) * f,
            });
        }
    }
    stops.last().map(|s| s.color)
}

/// A 2D drawing surface in logical pixels
pub trait Canvas {
    fn clear(&mut self);

    /// Fill the union of `rings` (even-odd) and stroke their outlines
    fn fill_rings(&mut self, rings: &[Vec<PixelPoint>], fill: Rgba, stroke: Rgba, line_width: f64);

    fn stroke_line(&mut self, from: PixelPoint, to: PixelPoint, color: Rgba, line_width: f64);

    fn fill_radial(&mut self, center: PixelPoint, radius: f64, stops: &[ColorStop]);

    fn fill_circle(&mut self, center: PixelPoint, radius: f64, color: Rgba);

    fn stroke_circle(&mut self, center: PixelPoint, radius: f64, color: Rgba, line_width: f64);
}

/// Relay map colours
pub mod palette {
    use super::{rgba, Rgba};

    pub const LAND_FILL: Rgba = rgba(60, 60, 60, 0.3);
    pub const LAND_STROKE: Rgba = rgba(100, 100, 100, 0.5);

    pub const CONNECTION: Rgba = rgba(144, 99, 215, 1.0);
    pub const NODE: Rgba = rgba(56, 161, 150, 1.0);
    pub const HIGHLIGHT: Rgba = rgba(255, 255, 255, 1.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premultiplied_against_black() {
        assert_eq!(rgba(200, 100, 50, 0.5).premultiplied(), (100, 50, 25));
        assert_eq!(rgba(200, 100, 50, 2.0).premultiplied(), (200, 100, 50));
    }

    #[test]
    fn gradient_interpolates_alpha() {
        let stops = [
            stop(0.0, palette::NODE.with_alpha(0.8)),
            stop(0.5, palette::NODE.with_alpha(0.4)),
            stop(1.0, palette::NODE.with_alpha(0.0)),
        ];
        assert!((gradient_at(&stops, 0.0).unwrap().a - 0.8).abs() < 1e-9);
        assert!((gradient_at(&stops, 0.25).unwrap().a - 0.6).abs() < 1e-9);
        assert!((gradient_at(&stops, 0.75).unwrap().a - 0.2).abs() < 1e-9);
        assert!((gradient_at(&stops, 1.5).unwrap().a).abs() < 1e-9);
        assert!(gradient_at(&[], 0.5).is_none());
    }
}
