//! Landmass dataset and point containment

use super::GeoPoint;

/// A closed ring of positions, first point repeated at the end
pub type Ring = Vec<GeoPoint>;

/// A polygon: one exterior ring followed by any number of holes
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub exterior: Ring,
    pub holes: Vec<Ring>,
}

impl Polygon {
    pub fn new(exterior: Ring, holes: Vec<Ring>) -> Self {
        Self { exterior, holes }
    }

    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.exterior).chain(self.holes.iter())
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        ring_contains(&self.exterior, point) && !self.holes.iter().any(|h| ring_contains(h, point))
    }
}

/// Longitude/latitude bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    fn empty() -> Self {
        Self {
            min_lon: f64::INFINITY,
            min_lat: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
            max_lat: f64::NEG_INFINITY,
        }
    }

    fn extend(&mut self, p: GeoPoint) {
        self.min_lon = self.min_lon.min(p.lon);
        self.min_lat = self.min_lat.min(p.lat);
        self.max_lon = self.max_lon.max(p.lon);
        self.max_lat = self.max_lat.max(p.lat);
    }

    pub fn contains(&self, p: GeoPoint) -> bool {
        p.lon >= self.min_lon && p.lon <= self.max_lon && p.lat >= self.min_lat && p.lat <= self.max_lat
    }
}

/// Immutable collection of landmass polygons, loaded once
#[derive(Clone, Debug)]
pub struct LandDataset {
    polygons: Vec<Polygon>,
    bounds: Vec<BoundingBox>,
}

impl LandDataset {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        let bounds = polygons
            .iter()
            .map(|poly| {
                let mut bb = BoundingBox::empty();
                for &p in &poly.exterior {
                    bb.extend(p);
                }
                bb
            })
            .collect();
        Self { polygons, bounds }
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn point_count(&self) -> usize {
        self.polygons.iter().flat_map(|p| p.rings()).map(|r| r.len()).sum()
    }

    /// True iff the point lies within any polygon
    pub fn contains(&self, point: GeoPoint) -> bool {
        self.polygons
            .iter()
            .zip(&self.bounds)
            .any(|(poly, bb)| bb.contains(point) && poly.contains(point))
    }
}

/// Even-odd ray casting on the lon/lat plane
fn ring_contains(ring: &[GeoPoint], point: GeoPoint) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = ring[i];
        let b = ring[j];
        if (a.lat > point.lat) != (b.lat > point.lat) {
            let cross_lon = a.lon + (point.lat - a.lat) / (b.lat - a.lat) * (b.lon - a.lon);
            if point.lon < cross_lon {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f64, max: f64) -> Ring {
        vec![
            GeoPoint { lon: min, lat: min },
            GeoPoint { lon: max, lat: min },
            GeoPoint { lon: max, lat: max },
            GeoPoint { lon: min, lat: max },
            GeoPoint { lon: min, lat: min },
        ]
    }

    #[test]
    fn point_inside_exterior_is_contained() {
        let land = LandDataset::new(vec![Polygon::new(square(0.0, 10.0), vec![])]);
        assert!(land.contains(GeoPoint { lon: 5.0, lat: 5.0 }));
        assert!(!land.contains(GeoPoint { lon: 15.0, lat: 5.0 }));
        assert!(!land.contains(GeoPoint { lon: -1.0, lat: -1.0 }));
    }

    #[test]
    fn holes_are_excluded() {
        let land = LandDataset::new(vec![Polygon::new(square(0.0, 10.0), vec![square(4.0, 6.0)])]);
        assert!(!land.contains(GeoPoint { lon: 5.0, lat: 5.0 }));
        assert!(land.contains(GeoPoint { lon: 2.0, lat: 2.0 }));
    }

    #[test]
    fn any_polygon_counts() {
        let land = LandDataset::new(vec![
            Polygon::new(square(0.0, 10.0), vec![]),
            Polygon::new(square(20.0, 30.0), vec![]),
        ]);
        assert!(land.contains(GeoPoint { lon: 25.0, lat: 25.0 }));
        assert!(!land.contains(GeoPoint { lon: 15.0, lat: 15.0 }));
        assert_eq!(land.point_count(), 10);
    }

    #[test]
    fn concave_ring() {
        // U shape opening to the north
        let ring = vec![
            GeoPoint { lon: 0.0, lat: 0.0 },
            GeoPoint { lon: 30.0, lat: 0.0 },
            GeoPoint { lon: 30.0, lat: 30.0 },
            GeoPoint { lon: 20.0, lat: 30.0 },
            GeoPoint { lon: 20.0, lat: 10.0 },
            GeoPoint { lon: 10.0, lat: 10.0 },
            GeoPoint { lon: 10.0, lat: 30.0 },
            GeoPoint { lon: 0.0, lat: 30.0 },
            GeoPoint { lon: 0.0, lat: 0.0 },
        ];
        let land = LandDataset::new(vec![Polygon::new(ring, vec![])]);
        assert!(land.contains(GeoPoint { lon: 5.0, lat: 20.0 }));
        assert!(!land.contains(GeoPoint { lon: 15.0, lat: 20.0 }));
        assert!(land.contains(GeoPoint { lon: 15.0, lat: 5.0 }));
    }

    #[test]
    fn degenerate_ring_contains_nothing() {
        let land = LandDataset::new(vec![Polygon::new(square(0.0, 10.0)[..2].to_vec(), vec![])]);
        assert!(!land.contains(GeoPoint { lon: 0.5, lat: 0.0 }));
    }
}
