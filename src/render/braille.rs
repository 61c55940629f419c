//! Braille canvas: each terminal cell is a 2x4 grid of dots
//!
//! Logical pixels are mapped onto dots at `dot_size` pixels per dot. Alpha is
//! approximated with ordered dithering, and each cell takes the colour of the
//! last dot painted into it.

use super::{gradient_at, Canvas, ColorStop, Rgba};
use crate::geo::PixelPoint;
use crate::terminal::{rgb, Terminal};

/// Braille dot bit for (row, column) within a cell
const DOT_BITS: [[u8; 2]; 4] = [[0x01, 0x08], [0x02, 0x10], [0x04, 0x20], [0x40, 0x80]];

/// 4x4 Bayer matrix for ordered dithering
const BAYER: [[u8; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

/// Dots fainter than this never light up, keeping low-alpha glows from
/// flooding the screen
const MIN_VISIBLE_ALPHA: f64 = 0.08;

pub struct BrailleCanvas {
    cols: usize,
    rows: usize,
    dot_size: f64,
    dots: Vec<u8>,
    colors: Vec<Option<(u8, u8, u8)>>,
}

impl BrailleCanvas {
    pub fn new(cols: u16, rows: u16, dot_size: f64) -> Self {
        let cols = cols as usize;
        let rows = rows as usize;
        Self {
            cols,
            rows,
            dot_size: if dot_size > 0.0 { dot_size } else { 1.0 },
            dots: vec![0; cols * rows],
            colors: vec![None; cols * rows],
        }
    }

    /// Logical pixel size of a terminal of `cols` x `rows` cells
    pub fn logical_size(cols: u16, rows: u16, dot_size: f64) -> (f64, f64) {
        (cols as f64 * 2.0 * dot_size, rows as f64 * 4.0 * dot_size)
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        *self = Self::new(cols, rows, self.dot_size);
    }

    fn dot_width(&self) -> i64 {
        self.cols as i64 * 2
    }

    fn dot_height(&self) -> i64 {
        self.rows as i64 * 4
    }

    /// Braille character and colour of a cell, `None` when blank
    pub fn cell(&self, col: usize, row: usize) -> Option<(char, (u8, u8, u8))> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        let idx = row * self.cols + col;
        let bits = self.dots[idx];
        if bits == 0 {
            return None;
        }
        let ch = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
        Some((ch, self.colors[idx].unwrap_or((255, 255, 255))))
    }

    /// Copy the canvas into the terminal back buffer
    pub fn blit(&self, term: &mut Terminal) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                if let Some((ch, (r, g, b))) = self.cell(col, row) {
                    term.set(col as i32, row as i32, ch, Some(rgb(r, g, b)), false);
                }
            }
        }
    }

    fn to_dot(&self, p: PixelPoint) -> (f64, f64) {
        (p.x / self.dot_size, p.y / self.dot_size)
    }

    fn plot(&mut self, dx: i64, dy: i64, color: Rgba) {
        if dx < 0 || dy < 0 || dx >= self.dot_width() || dy >= self.dot_height() {
            return;
        }
        if color.a < MIN_VISIBLE_ALPHA {
            return;
        }
        let threshold = (BAYER[(dy % 4) as usize][(dx % 4) as usize] as f64 + 0.5) / 16.0;
        if color.a < threshold {
            return;
        }

        let (col, row) = ((dx / 2) as usize, (dy / 4) as usize);
        let idx = row * self.cols + col;
        self.dots[idx] |= DOT_BITS[(dy % 4) as usize][(dx % 2) as usize];
        self.colors[idx] = Some(shade(color));
    }

    /// Visit every dot whose centre lies within `radius` logical pixels of
    /// `center`, passing the distance in logical pixels
    fn for_each_dot_in_circle(&mut self, center: PixelPoint, radius: f64, mut f: impl FnMut(&mut Self, i64, i64, f64)) {
        let (cx, cy) = self.to_dot(center);
        let r = radius / self.dot_size;
        if !(cx.is_finite() && cy.is_finite() && r.is_finite()) {
            return;
        }

        let (x0, x1) = ((cx - r).floor() as i64, (cx + r).ceil() as i64);
        let (y0, y1) = ((cy - r).floor() as i64, (cy + r).ceil() as i64);
        let mut hit = false;
        for dy in y0.max(0)..=y1.min(self.dot_height() - 1) {
            for dx in x0.max(0)..=x1.min(self.dot_width() - 1) {
                let dist = ((dx as f64 + 0.5 - cx).powi(2) + (dy as f64 + 0.5 - cy).powi(2)).sqrt();
                if dist <= r {
                    hit = true;
                    f(self, dx, dy, dist * self.dot_size);
                }
            }
        }

        // Shapes smaller than a dot still mark their centre
        if !hit {
            f(self, cx.floor() as i64, cy.floor() as i64, 0.0);
        }
    }

    fn line_dots(&mut self, from: (f64, f64), to: (f64, f64), color: Rgba) {
        let (mut x0, mut y0) = (from.0.floor() as i64, from.1.floor() as i64);
        let (x1, y1) = (to.0.floor() as i64, to.1.floor() as i64);

        // Skip lines that are wildly off-canvas
        let limit = (self.dot_width() + self.dot_height()) * 4;
        if x0.abs().max(y0.abs()).max(x1.abs()).max(y1.abs()) > limit {
            return;
        }

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.plot(x0, y0, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }
}

/// Terminal colour for a dot: alpha dims the colour but never to black
fn shade(color: Rgba) -> (u8, u8, u8) {
    color.with_alpha(0.35 + 0.65 * color.a.clamp(0.0, 1.0)).premultiplied()
}

impl Canvas for BrailleCanvas {
    fn clear(&mut self) {
        self.dots.fill(0);
        self.colors.fill(None);
    }

    fn fill_rings(&mut self, rings: &[Vec<PixelPoint>], fill: Rgba, stroke: Rgba, _line_width: f64) {
        let edges: Vec<((f64, f64), (f64, f64))> = rings
            .iter()
            .flat_map(|ring| ring.windows(2).map(|w| (w[0], w[1])))
            .map(|(a, b)| (self.to_dot(a), self.to_dot(b)))
            .filter(|(a, b)| a.1 != b.1)
            .collect();

        // Even-odd scanline fill through dot centres
        let mut crossings: Vec<f64> = Vec::new();
        for dy in 0..self.dot_height() {
            let y = dy as f64 + 0.5;
            crossings.clear();
            for &(a, b) in &edges {
                if (a.1 > y) != (b.1 > y) {
                    crossings.push(a.0 + (y - a.1) / (b.1 - a.1) * (b.0 - a.0));
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));
            for span in crossings.chunks_exact(2) {
                let start = (span[0] - 0.5).ceil().max(0.0) as i64;
                let end = (span[1] - 0.5).floor().min((self.dot_width() - 1) as f64) as i64;
                for dx in start..=end {
                    self.plot(dx, dy, fill);
                }
            }
        }

        for (a, b) in edges {
            self.line_dots(a, b, stroke);
        }
    }

    fn stroke_line(&mut self, from: PixelPoint, to: PixelPoint, color: Rgba, _line_width: f64) {
        let (a, b) = (self.to_dot(from), self.to_dot(to));
        self.line_dots(a, b, color);
    }

    fn fill_radial(&mut self, center: PixelPoint, radius: f64, stops: &[ColorStop]) {
        if radius <= 0.0 {
            return;
        }
        self.for_each_dot_in_circle(center, radius, |canvas, dx, dy, dist| {
            if let Some(color) = gradient_at(stops, dist / radius) {
                canvas.plot(dx, dy, color);
            }
        });
    }

    fn fill_circle(&mut self, center: PixelPoint, radius: f64, color: Rgba) {
        self.for_each_dot_in_circle(center, radius, |canvas, dx, dy, _| canvas.plot(dx, dy, color));
    }

    fn stroke_circle(&mut self, center: PixelPoint, radius: f64, color: Rgba, line_width: f64) {
        let half = (line_width / 2.0).max(self.dot_size / 2.0);
        let inner = (radius - half).max(0.0);
        self.for_each_dot_in_circle(center, radius + half, |canvas, dx, dy, dist| {
            if dist >= inner {
                canvas.plot(dx, dy, color);
            }
        });
    }
}
