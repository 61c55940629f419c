//! Decoding landmass polygons from TopoJSON topologies or plain GeoJSON
//!
//! Only polygonal geometry is kept; properties and non-area geometry
//! (points, lines) are ignored.

use super::error::GeographyLoadError;
use super::land::{Polygon, Ring};
use super::GeoPoint;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

type Position = Vec<f64>;

#[derive(Debug, Deserialize)]
struct Topology {
    #[serde(default)]
    transform: Option<Transform>,
    #[serde(default)]
    arcs: Vec<Vec<Position>>,
    #[serde(default)]
    objects: BTreeMap<String, TopoGeometry>,
}

#[derive(Debug, Deserialize)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum TopoGeometry {
    GeometryCollection {
        #[serde(default)]
        geometries: Vec<TopoGeometry>,
    },
    Polygon {
        arcs: Vec<Vec<i64>>,
    },
    MultiPolygon {
        arcs: Vec<Vec<Vec<i64>>>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum GeoJson {
    FeatureCollection {
        features: Vec<GeoJson>,
    },
    Feature {
        #[serde(default)]
        geometry: Option<Box<GeoJson>>,
    },
    GeometryCollection {
        #[serde(default)]
        geometries: Vec<GeoJson>,
    },
    Polygon {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
    },
    #[serde(other)]
    Other,
}

/// Decode a TopoJSON topology or a GeoJSON object into polygons.
///
/// For topologies, `object` names the member of `objects` to use; when it is
/// missing every object is merged.
pub fn decode(bytes: &[u8], object: &str) -> Result<Vec<Polygon>, GeographyLoadError> {
    let value: Value = serde_json::from_slice(bytes)?;

    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| GeographyLoadError::format("missing \"type\" member"))?;

    if kind == "Topology" {
        let topology: Topology = serde_json::from_value(value)
            .map_err(|e| GeographyLoadError::format(format!("invalid topology: {}", e)))?;
        decode_topology(&topology, object)
    } else {
        let geojson: GeoJson = serde_json::from_value(value)
            .map_err(|e| GeographyLoadError::format(format!("invalid GeoJSON: {}", e)))?;
        let mut polygons = Vec::new();
        collect_geojson(&geojson, &mut polygons)?;
        Ok(polygons)
    }
}

// ============================================================================
// TopoJSON
// ============================================================================

fn decode_topology(topology: &Topology, object: &str) -> Result<Vec<Polygon>, GeographyLoadError> {
    let arcs = decode_arcs(topology)?;
    let mut polygons = Vec::new();

    match topology.objects.get(object) {
        Some(geometry) => collect_topo(geometry, &arcs, &mut polygons)?,
        None => {
            log::debug!("topology has no object {:?}; merging {} objects", object, topology.objects.len());
            for geometry in topology.objects.values() {
                collect_topo(geometry, &arcs, &mut polygons)?;
            }
        }
    }

    Ok(polygons)
}

/// Resolve every arc to absolute coordinates, undoing delta quantisation
fn decode_arcs(topology: &Topology) -> Result<Vec<Vec<GeoPoint>>, GeographyLoadError> {
    topology
        .arcs
        .iter()
        .map(|arc| {
            let (mut x, mut y) = (0.0, 0.0);
            arc.iter()
                .map(|pos| {
                    if pos.len() < 2 {
                        return Err(GeographyLoadError::format("arc position with fewer than 2 values"));
                    }
                    Ok(match &topology.transform {
                        Some(t) => {
                            x += pos[0];
                            y += pos[1];
                            GeoPoint {
                                lon: x * t.scale[0] + t.translate[0],
                                lat: y * t.scale[1] + t.translate[1],
                            }
                        }
                        None => GeoPoint { lon: pos[0], lat: pos[1] },
                    })
                })
                .collect()
        })
        .collect()
}

fn collect_topo(
    geometry: &TopoGeometry,
    arcs: &[Vec<GeoPoint>],
    out: &mut Vec<Polygon>,
) -> Result<(), GeographyLoadError> {
    match geometry {
        TopoGeometry::GeometryCollection { geometries } => {
            for g in geometries {
                collect_topo(g, arcs, out)?;
            }
        }
        TopoGeometry::Polygon { arcs: rings } => {
            if let Some(poly) = topo_polygon(rings, arcs)? {
                out.push(poly);
            }
        }
        TopoGeometry::MultiPolygon { arcs: polys } => {
            for rings in polys {
                if let Some(poly) = topo_polygon(rings, arcs)? {
                    out.push(poly);
                }
            }
        }
        TopoGeometry::Other => {}
    }
    Ok(())
}

fn topo_polygon(rings: &[Vec<i64>], arcs: &[Vec<GeoPoint>]) -> Result<Option<Polygon>, GeographyLoadError> {
    let mut decoded = rings
        .iter()
        .map(|r| stitch_ring(r, arcs))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter(|r| !r.is_empty());

    Ok(decoded.next().map(|exterior| Polygon::new(exterior, decoded.collect())))
}

/// Join the referenced arcs into one ring.
///
/// Consecutive arcs share their junction point, so the last point collected
/// so far is dropped before each arc is appended. A negative index `i`
/// refers to arc `!i` traversed backwards.
fn stitch_ring(indices: &[i64], arcs: &[Vec<GeoPoint>]) -> Result<Ring, GeographyLoadError> {
    let mut points: Ring = Vec::new();

    for &index in indices {
        let (arc_idx, reversed) = if index < 0 { (!index, true) } else { (index, false) };
        let arc = usize::try_from(arc_idx)
            .ok()
            .and_then(|i| arcs.get(i))
            .ok_or_else(|| GeographyLoadError::format(format!("arc index {} out of range", index)))?;

        points.pop();
        let start = points.len();
        points.extend_from_slice(arc);
        if reversed {
            points[start..].reverse();
        }
    }

    if let Some(&first) = points.first() {
        while points.len() < 4 {
            points.push(first);
        }
    }

    Ok(points)
}

// ============================================================================
// GeoJSON
// ============================================================================

fn collect_geojson(geojson: &GeoJson, out: &mut Vec<Polygon>) -> Result<(), GeographyLoadError> {
    match geojson {
        GeoJson::FeatureCollection { features } => {
            for f in features {
                collect_geojson(f, out)?;
            }
        }
        GeoJson::Feature { geometry } => {
            if let Some(g) = geometry {
                collect_geojson(g, out)?;
            }
        }
        GeoJson::GeometryCollection { geometries } => {
            for g in geometries {
                collect_geojson(g, out)?;
            }
        }
        GeoJson::Polygon { coordinates } => {
            if let Some(poly) = geojson_polygon(coordinates)? {
                out.push(poly);
            }
        }
        GeoJson::MultiPolygon { coordinates } => {
            for rings in coordinates {
                if let Some(poly) = geojson_polygon(rings)? {
                    out.push(poly);
                }
            }
        }
        GeoJson::Other => {}
    }
    Ok(())
}

fn geojson_polygon(rings: &[Vec<Position>]) -> Result<Option<Polygon>, GeographyLoadError> {
    let mut decoded = rings
        .iter()
        .map(|ring| {
            ring.iter()
                .map(|pos| match pos.as_slice() {
                    [lon, lat, ..] => Ok(GeoPoint { lon: *lon, lat: *lat }),
                    _ => Err(GeographyLoadError::format("position with fewer than 2 values")),
                })
                .collect::<Result<Ring, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter(|r| !r.is_empty());

    Ok(decoded.next().map(|exterior| Polygon::new(exterior, decoded.collect())))
}
