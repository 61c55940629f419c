//! Geography: projection, landmass data and the land queries used by placement
//!
//! Placement and rendering only see the [`GeometryService`] trait, so tests can
//! swap in a stub instead of a real dataset.

pub mod error;
pub mod land;
pub mod projection;
pub mod provider;
pub mod topojson;

pub use error::GeographyLoadError;
pub use land::LandDataset;
pub use projection::Projection;
pub use provider::{DataSource, GeographyProvider};

/// Geographic coordinate in degrees
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

/// Canvas coordinate in logical pixels, origin top-left
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &PixelPoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Point `t` of the way from `self` to `to`
    pub fn lerp(&self, to: &PixelPoint, t: f64) -> PixelPoint {
        PixelPoint {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }
}

/// Projection plus land containment, as consumed by placement and drawing
pub trait GeometryService {
    /// Reconfigure for a new canvas size
    fn configure(&mut self, width: f64, height: f64);

    /// Whether a canvas pixel lies on land. Pixels with no geographic
    /// counterpart are not on land.
    fn is_on_land(&self, pixel: PixelPoint) -> bool;

    /// Landmass outline rings in canvas pixels, `None` without a dataset
    fn silhouette(&self) -> Option<&[Vec<PixelPoint>]>;

    fn has_land(&self) -> bool {
        self.silhouette().is_some()
    }
}

/// [`GeometryService`] backed by the equirectangular projection and an
/// optional landmass dataset.
///
/// Without a dataset every pixel counts as land and no silhouette is drawn.
#[derive(Debug, Default)]
pub struct WorldGeometry {
    projection: Projection,
    land: Option<LandDataset>,
    outline: Vec<Vec<PixelPoint>>,
}

impl WorldGeometry {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            projection: Projection::new(width, height),
            land: None,
            outline: Vec::new(),
        }
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn set_land(&mut self, land: Option<LandDataset>) {
        self.land = land;
        self.reproject();
    }

    fn reproject(&mut self) {
        self.outline = match &self.land {
            Some(land) => land
                .polygons()
                .iter()
                .flat_map(|poly| poly.rings())
                .map(|ring| ring.iter().map(|&p| self.projection.forward(p)).collect())
                .collect(),
            None => Vec::new(),
        };
    }
}

impl GeometryService for WorldGeometry {
    fn configure(&mut self, width: f64, height: f64) {
        self.projection.configure(width, height);
        self.reproject();
    }

    fn is_on_land(&self, pixel: PixelPoint) -> bool {
        let Some(land) = &self.land else { return true };
        match self.projection.inverse(pixel) {
            Some(geo) => land.contains(geo),
            None => false,
        }
    }

    fn silhouette(&self) -> Option<&[Vec<PixelPoint>]> {
        self.land.as_ref().map(|_| self.outline.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::land::Polygon;
    use super::*;

    fn box_land(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> LandDataset {
        LandDataset::new(vec![Polygon::new(
            vec![
                GeoPoint { lon: min_lon, lat: min_lat },
                GeoPoint { lon: max_lon, lat: min_lat },
                GeoPoint { lon: max_lon, lat: max_lat },
                GeoPoint { lon: min_lon, lat: max_lat },
                GeoPoint { lon: min_lon, lat: min_lat },
            ],
            vec![],
        )])
    }

    #[test]
    fn without_land_everything_is_land() {
        let geometry = WorldGeometry::new(720.0, 360.0);
        assert!(geometry.is_on_land(PixelPoint::new(10.0, 10.0)));
        assert!(geometry.is_on_land(PixelPoint::new(-50.0, 9000.0)));
        assert!(geometry.silhouette().is_none());
        assert!(!geometry.has_land());
    }

    #[test]
    fn land_queries_go_through_inverse_projection() {
        let mut geometry = WorldGeometry::new(720.0, 360.0);
        geometry.set_land(Some(box_land(0.0, 0.0, 40.0, 40.0)));

        let inside = geometry.projection().forward(GeoPoint { lon: 20.0, lat: 20.0 });
        let outside = geometry.projection().forward(GeoPoint { lon: -20.0, lat: 20.0 });
        assert!(geometry.is_on_land(inside));
        assert!(!geometry.is_on_land(outside));
        // Beyond the antimeridian: no coordinate, so not land
        assert!(!geometry.is_on_land(PixelPoint::new(-10.0, 180.0)));
    }

    #[test]
    fn silhouette_follows_configure() {
        let mut geometry = WorldGeometry::new(720.0, 360.0);
        geometry.set_land(Some(box_land(0.0, 0.0, 90.0, 45.0)));
        let before = geometry.silhouette().unwrap()[0][1];

        geometry.configure(1440.0, 720.0);
        let after = geometry.silhouette().unwrap()[0][1];
        assert!((after.x - before.x * 2.0).abs() < 1e-9);
        assert!((after.y - before.y * 2.0).abs() < 1e-9);
    }

    #[test]
    fn lerp_and_distance() {
        let a = PixelPoint::new(0.0, 0.0);
        let b = PixelPoint::new(3.0, 4.0);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(a.lerp(&b, 0.5), PixelPoint::new(1.5, 2.0));
    }
}
