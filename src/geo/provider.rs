//! One-shot landmass loader (HTTP or local file)

use super::error::GeographyLoadError;
use super::land::LandDataset;
use super::topojson;
use std::io::Read;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Natural Earth 110m land, pre-merged into a single TopoJSON object
pub const DEFAULT_DATA_URL: &str = "https://cdn.jsdelivr.net/npm/world-atlas@2/land-110m.json";

/// Object inside the topology that holds the landmasses
pub const DEFAULT_OBJECT: &str = "land";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum size for a downloaded dataset (16MB)
const MAX_DATA_SIZE: u64 = 16 * 1024 * 1024;

/// Where the dataset comes from
#[derive(Clone, Debug, PartialEq)]
pub enum DataSource {
    Url(String),
    File(PathBuf),
}

impl DataSource {
    /// Interpret a location string: `http(s)://` is fetched, `file://` and
    /// anything else is read from disk
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            DataSource::Url(location.to_string())
        } else if let Some(path) = location.strip_prefix("file://") {
            let decoded = urlencoding::decode(path)
                .map(|p| p.into_owned())
                .unwrap_or_else(|_| path.to_string());
            DataSource::File(PathBuf::from(decoded))
        } else {
            DataSource::File(PathBuf::from(location))
        }
    }
}

#[derive(Clone, Debug)]
pub struct GeographyProvider {
    source: DataSource,
    object: String,
    timeout: Duration,
}

impl GeographyProvider {
    pub fn new(source: DataSource, object: impl Into<String>, timeout: Duration) -> Self {
        Self { source, object: object.into(), timeout }
    }

    /// Load and decode the dataset. Single attempt, no retry. Gives up with
    /// `Cancelled` once `cancel` is raised between stages.
    pub fn load(&self, cancel: &AtomicBool) -> Result<LandDataset, GeographyLoadError> {
        if cancel.load(Ordering::Relaxed) {
            return Err(GeographyLoadError::Cancelled);
        }

        let bytes = match &self.source {
            DataSource::Url(url) => self.fetch(url)?,
            DataSource::File(path) => {
                let len = std::fs::metadata(path)?.len();
                if len > MAX_DATA_SIZE {
                    return Err(GeographyLoadError::TooLarge(MAX_DATA_SIZE));
                }
                std::fs::read(path)?
            }
        };

        if cancel.load(Ordering::Relaxed) {
            return Err(GeographyLoadError::Cancelled);
        }

        let polygons = topojson::decode(&bytes, &self.object)?;
        if polygons.is_empty() {
            return Err(GeographyLoadError::Empty);
        }

        let land = LandDataset::new(polygons);
        log::info!(
            "loaded {} land polygons ({} points) from {:?}",
            land.polygons().len(),
            land.point_count(),
            self.source
        );
        Ok(land)
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>, GeographyLoadError> {
        let response = ureq::get(url)
            .timeout(self.timeout)
            .call()
            .map_err(|e| GeographyLoadError::Network { url: url.to_string(), source: Box::new(e) })?;

        if let Some(len) = response
            .header("Content-Length")
            .and_then(|s| s.parse::<u64>().ok())
        {
            if len > MAX_DATA_SIZE {
                return Err(GeographyLoadError::TooLarge(MAX_DATA_SIZE));
            }
        }

        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_DATA_SIZE + 1)
            .read_to_end(&mut bytes)?;

        if bytes.len() as u64 > MAX_DATA_SIZE {
            return Err(GeographyLoadError::TooLarge(MAX_DATA_SIZE));
        }
        Ok(bytes)
    }
}

impl Default for GeographyProvider {
    fn default() -> Self {
        Self::new(DataSource::parse(DEFAULT_DATA_URL), DEFAULT_OBJECT, DEFAULT_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;
    use std::fs;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("relaymap-{}-{}", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn parse_source_kinds() {
        assert_eq!(
            DataSource::parse("https://example.com/land.json"),
            DataSource::Url("https://example.com/land.json".into())
        );
        assert_eq!(
            DataSource::parse("file:///tmp/my%20land.json"),
            DataSource::File(PathBuf::from("/tmp/my land.json"))
        );
        assert_eq!(DataSource::parse("land.json"), DataSource::File(PathBuf::from("land.json")));
    }

    #[test]
    fn loads_topology_from_file() {
        let path = temp_file(
            "topo.json",
            r#"{"type":"Topology","objects":{"land":{"type":"Polygon","arcs":[[0]]}},
                "arcs":[[[0,0],[10,0],[10,10],[0,10],[0,0]]]}"#,
        );
        let provider = GeographyProvider::new(DataSource::File(path.clone()), "land", DEFAULT_TIMEOUT);
        let land = provider.load(&AtomicBool::new(false)).unwrap();
        fs::remove_file(path).ok();

        assert!(land.contains(GeoPoint { lon: 5.0, lat: 5.0 }));
        assert!(!land.contains(GeoPoint { lon: 50.0, lat: 5.0 }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let provider = GeographyProvider::new(
            DataSource::File(PathBuf::from("/nonexistent/relaymap/land.json")),
            "land",
            DEFAULT_TIMEOUT,
        );
        assert!(matches!(provider.load(&AtomicBool::new(false)), Err(GeographyLoadError::Io(_))));
    }

    #[test]
    fn dataset_without_polygons_is_empty_error() {
        let path = temp_file("empty.json", r#"{"type":"FeatureCollection","features":[]}"#);
        let provider = GeographyProvider::new(DataSource::File(path.clone()), "land", DEFAULT_TIMEOUT);
        let result = provider.load(&AtomicBool::new(false));
        fs::remove_file(path).ok();
        assert!(matches!(result, Err(GeographyLoadError::Empty)));
    }

    #[test]
    fn raised_cancel_flag_short_circuits() {
        let provider = GeographyProvider::default();
        let cancel = AtomicBool::new(true);
        assert!(matches!(provider.load(&cancel), Err(GeographyLoadError::Cancelled)));
    }
}
