//! Nearest-neighbour connections between relay nodes

use super::{Connection, Node};
use rand::Rng;

// Graph generation constants
const NEAREST: usize = 5;
const MIN_LINKS: usize = 2;
const MAX_LINKS: usize = 4;
const MIN_SPEED: f64 = 0.002;
const MAX_SPEED: f64 = 0.005;

/// Connect every node to some of its nearest neighbours.
///
/// Each node picks between 2 and 4 of its 5 closest peers (closest first) and
/// gets one outbound connection per pick. Connections can cross oceans and
/// are not deduplicated, so A→B and B→A may both exist.
pub fn build_connections<R: Rng + ?Sized>(nodes: &[Node], rng: &mut R) -> Vec<Connection> {
    let mut connections = Vec::new();

    for (i, node) in nodes.iter().enumerate() {
        let mut others: Vec<(usize, f64)> = nodes
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(j, other)| (j, node.position.distance(&other.position)))
            .collect();
        // Stable: equidistant peers keep their input order
        others.sort_by(|a, b| a.1.total_cmp(&b.1));
        others.truncate(NEAREST);

        let links = rng.gen_range(MIN_LINKS..=MAX_LINKS);
        for &(j, _) in others.iter().take(links) {
            connections.push(Connection {
                from: i,
                to: j,
                progress: rng.gen(),
                speed: rng.gen_range(MIN_SPEED..MAX_SPEED),
            });
        }
    }

    connections
}
