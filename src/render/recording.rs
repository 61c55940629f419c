//! Canvas that records draw calls instead of drawing

use super::{Canvas, ColorStop, Rgba};
use crate::geo::PixelPoint;

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Clear,
    Rings { count: usize },
    Line { from: PixelPoint, to: PixelPoint, color: Rgba },
    Radial { center: PixelPoint, radius: f64 },
    FillCircle { center: PixelPoint, radius: f64, color: Rgba },
    StrokeCircle { center: PixelPoint, radius: f64 },
}

#[derive(Default)]
pub struct RecordingCanvas {
    pub ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&DrawOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn fill_rings(&mut self, rings: &[Vec<PixelPoint>], _fill: Rgba, _stroke: Rgba, _line_width: f64) {
        self.ops.push(DrawOp::Rings { count: rings.len() });
    }

    fn stroke_line(&mut self, from: PixelPoint, to: PixelPoint, color: Rgba, _line_width: f64) {
        self.ops.push(DrawOp::Line { from, to, color });
    }

    fn fill_radial(&mut self, center: PixelPoint, radius: f64, _stops: &[ColorStop]) {
        self.ops.push(DrawOp::Radial { center, radius });
    }

    fn fill_circle(&mut self, center: PixelPoint, radius: f64, color: Rgba) {
        self.ops.push(DrawOp::FillCircle { center, radius, color });
    }

    fn stroke_circle(&mut self, center: PixelPoint, radius: f64, _color: Rgba, _line_width: f64) {
        self.ops.push(DrawOp::StrokeCircle { center, radius });
    }
}
