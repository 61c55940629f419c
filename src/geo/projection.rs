//! Equirectangular (plate carrée) projection between degrees and canvas pixels

use super::{GeoPoint, PixelPoint};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Projection state derived from the canvas size.
///
/// The whole world is `2π · scale` pixels wide, so the scale is chosen to make
/// it span exactly the canvas width. The map is centred on the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    scale: f64,
    translate: (f64, f64),
}

impl Default for Projection {
    fn default() -> Self {
        Self { scale: 0.0, translate: (0.0, 0.0) }
    }
}

impl Projection {
    pub fn new(width: f64, height: f64) -> Self {
        let mut projection = Self::default();
        projection.configure(width, height);
        projection
    }

    /// Recompute scale and translation for a canvas size, replacing prior state
    pub fn configure(&mut self, width: f64, height: f64) {
        self.scale = width / TAU;
        self.translate = (width / 2.0, height / 2.0);
    }

    #[cfg(test)]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[cfg(test)]
    pub fn translate(&self) -> (f64, f64) {
        self.translate
    }

    pub fn forward(&self, point: GeoPoint) -> PixelPoint {
        let lambda = point.lon.to_radians();
        let phi = point.lat.to_radians();
        PixelPoint {
            x: self.translate.0 + self.scale * lambda,
            y: self.translate.1 - self.scale * phi,
        }
    }

    /// Map a pixel back to geographic coordinates.
    ///
    /// Returns `None` for pixels beyond the poles or the antimeridian, and for
    /// a degenerate (zero-width) canvas.
    pub fn inverse(&self, pixel: PixelPoint) -> Option<GeoPoint> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return None;
        }

        let lambda = (pixel.x - self.translate.0) / self.scale;
        let phi = (self.translate.1 - pixel.y) / self.scale;

        if !lambda.is_finite() || !phi.is_finite() {
            return None;
        }
        if lambda.abs() > PI || phi.abs() > FRAC_PI_2 {
            return None;
        }

        Some(GeoPoint { lon: lambda.to_degrees(), lat: phi.to_degrees() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn configure_derives_scale_and_centre() {
        let projection = Projection::new(628.0, 300.0);
        assert!(close(projection.scale(), 628.0 / TAU));
        assert_eq!(projection.translate(), (314.0, 150.0));
    }

    #[test]
    fn configure_replaces_previous_state() {
        let mut projection = Projection::new(100.0, 100.0);
        projection.configure(800.0, 400.0);
        assert_eq!(projection, Projection::new(800.0, 400.0));
        projection.configure(800.0, 400.0);
        assert_eq!(projection, Projection::new(800.0, 400.0));
    }

    #[test]
    fn origin_maps_to_canvas_centre() {
        let projection = Projection::new(800.0, 400.0);
        let p = projection.forward(GeoPoint { lon: 0.0, lat: 0.0 });
        assert!(close(p.x, 400.0) && close(p.y, 200.0));

        let edge = projection.forward(GeoPoint { lon: 180.0, lat: 0.0 });
        assert!(close(edge.x, 800.0));

        let north = projection.forward(GeoPoint { lon: 0.0, lat: 90.0 });
        assert!(close(north.y, 0.0));
    }

    #[test]
    fn inverse_undoes_forward() {
        let projection = Projection::new(1024.0, 512.0);
        let london = GeoPoint { lon: -0.1, lat: 51.5 };
        let back = projection.inverse(projection.forward(london)).unwrap();
        assert!(close(back.lon, london.lon));
        assert!(close(back.lat, london.lat));
    }

    #[test]
    fn inverse_rejects_points_beyond_poles() {
        // A tall canvas leaves rows above the north pole
        let projection = Projection::new(400.0, 400.0);
        assert!(projection.inverse(PixelPoint { x: 200.0, y: 0.0 }).is_none());
        assert!(projection.inverse(PixelPoint { x: 200.0, y: 200.0 }).is_some());
    }

    #[test]
    fn inverse_rejects_degenerate_canvas() {
        let projection = Projection::new(0.0, 0.0);
        assert!(projection.inverse(PixelPoint { x: 0.0, y: 0.0 }).is_none());
    }
}
