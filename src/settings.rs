use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub map: MapSettings,
}

#[derive(Debug, Default, Deserialize)]
pub struct MapSettings {
    pub data_url: Option<String>,     // URL or path of a TopoJSON/GeoJSON landmass file
    pub object: Option<String>,       // Topology object holding the landmasses
    pub timeout_secs: Option<f64>,
    pub nodes: Option<usize>,
    pub time_step: Option<f32>,
    pub dot_size: Option<f64>,
}

impl Settings {
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                log::warn!("ignoring {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                log::warn!("cannot read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("relaymap")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let settings = Settings::parse("").unwrap();
        assert!(settings.map.data_url.is_none());
        assert!(settings.map.nodes.is_none());
    }

    #[test]
    fn map_table_is_read() {
        let settings = Settings::parse(
            r#"
            [map]
            data_url = "/srv/land-110m.json"
            nodes = 60
            timeout_secs = 3
            "#,
        )
        .unwrap();
        assert_eq!(settings.map.data_url.as_deref(), Some("/srv/land-110m.json"));
        assert_eq!(settings.map.nodes, Some(60));
        assert_eq!(settings.map.timeout_secs, Some(3.0));
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(Settings::parse("[map]\nnodes = \"many\"").is_err());
    }

    #[test]
    fn config_path_is_namespaced() {
        assert!(Settings::config_path().ends_with("relaymap/config.toml"));
    }
}
