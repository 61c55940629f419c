//! Scatter relay nodes over land

use super::Node;
use crate::geo::{GeometryService, PixelPoint};
use rand::Rng;
use std::f64::consts::TAU;

// Placement constants
pub const DEFAULT_NODE_COUNT: usize = 40;
const MAX_ATTEMPTS: usize = 1000;
const LAND_BAND: (f64, f64) = (0.15, 0.75);      // keep nodes in habitable latitudes
const FALLBACK_BAND: (f64, f64) = (0.2, 0.7);
const MIN_RADIUS: f64 = 3.0;
const MAX_RADIUS: f64 = 5.0;

/// Place exactly `count` nodes on a `width` x `height` canvas.
///
/// Candidates are sampled across the full width and a mid-latitude band and
/// kept when they land on land. After `MAX_ATTEMPTS` samples any shortfall is
/// filled without the land constraint from a slightly narrower band.
pub fn place_nodes<G, R>(count: usize, width: f64, height: f64, geometry: &G, rng: &mut R) -> Vec<Node>
where
    G: GeometryService + ?Sized,
    R: Rng + ?Sized,
{
    let mut nodes = Vec::with_capacity(count);
    let mut attempts = 0;

    while nodes.len() < count && attempts < MAX_ATTEMPTS {
        attempts += 1;
        let position = sample(width, height, LAND_BAND, rng);
        if geometry.is_on_land(position) {
            nodes.push(new_node(position, rng));
        }
    }

    let on_land = nodes.len();
    while nodes.len() < count {
        let position = sample(width, height, FALLBACK_BAND, rng);
        nodes.push(new_node(position, rng));
    }

    if on_land < count {
        log::debug!(
            "placed {} of {} nodes on land after {} attempts; filled {} unconstrained",
            on_land,
            count,
            attempts,
            count - on_land
        );
    }

    nodes
}

fn sample<R: Rng + ?Sized>(width: f64, height: f64, band: (f64, f64), rng: &mut R) -> PixelPoint {
    let x: f64 = rng.gen();
    let y = band.0 + rng.gen::<f64>() * (band.1 - band.0);
    PixelPoint::new(x * width, y * height)
}

fn new_node<R: Rng + ?Sized>(position: PixelPoint, rng: &mut R) -> Node {
    Node {
        position,
        radius: rng.gen_range(MIN_RADIUS..MAX_RADIUS),
        pulse: rng.gen_range(0.0..TAU),
    }
}
