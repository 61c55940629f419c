//! Relay nodes and the connections between them

pub mod graph;
pub mod placer;

use crate::geo::PixelPoint;

pub use graph::build_connections;
pub use placer::place_nodes;

/// A decorative relay drawn as a pulsing glow
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub position: PixelPoint,
    pub radius: f64,
    pub pulse: f64, // accumulating phase, only sin() of it is used
}

/// Directed edge between two nodes with a travelling packet.
///
/// `from` and `to` index into the node list the connection was built from.
#[derive(Clone, Debug, PartialEq)]
pub struct Connection {
    pub from: usize,
    pub to: usize,
    pub progress: f64,
    pub speed: f64,
}

impl Connection {
    /// Move the packet forward one frame, wrapping back into [0, 1)
    pub fn advance(&mut self) {
        self.progress += self.speed;
        if self.progress >= 1.0 {
            self.progress -= 1.0;
        }
        // Guard against a speed >= 1 overshooting the single subtraction
        if !(0.0..1.0).contains(&self.progress) {
            self.progress = self.progress.rem_euclid(1.0);
        }
    }
}
