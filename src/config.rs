use crate::geo::provider::{DEFAULT_DATA_URL, DEFAULT_OBJECT, DEFAULT_TIMEOUT};
use crate::geo::{DataSource, GeographyProvider};
use crate::relay::placer::DEFAULT_NODE_COUNT;
use crate::settings::MapSettings;
use std::time::Duration;

/// Logical pixels per braille dot; keeps node and glow sizes readable
pub const DEFAULT_DOT_SIZE: f64 = 4.0;

/// Seconds per frame
pub const DEFAULT_TIME_STEP: f32 = 0.03;

/// Longest the world map download may take
pub const MAX_TIMEOUT: Duration = Duration::from_secs(300);

/// Timeout from user-supplied seconds, capped at [`MAX_TIMEOUT`]. `None` for
/// negative or non-finite values.
pub fn timeout_from_secs(secs: f64) -> Option<Duration> {
    if !secs.is_finite() {
        log::warn!("ignoring timeout of {} seconds", secs);
        return None;
    }
    match Duration::try_from_secs_f64(secs.min(MAX_TIMEOUT.as_secs_f64())) {
        Ok(timeout) => Some(timeout),
        Err(e) => {
            log::warn!("ignoring timeout of {} seconds: {}", secs, e);
            None
        }
    }
}

/// Configuration for the relay map
#[derive(Clone, Debug, PartialEq)]
pub struct MapConfig {
    pub nodes: usize,
    pub seed: Option<u64>,
    pub time_step: f32,
    pub dot_size: f64,
    pub data: Option<String>, // None = offline, no landmass
    pub object: String,
    pub timeout: Duration,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            nodes: DEFAULT_NODE_COUNT,
            seed: None,
            time_step: DEFAULT_TIME_STEP,
            dot_size: DEFAULT_DOT_SIZE,
            data: Some(DEFAULT_DATA_URL.to_string()),
            object: DEFAULT_OBJECT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl MapConfig {
    /// Defaults overridden by whatever the settings file provides
    pub fn from_settings(settings: &MapSettings) -> Self {
        let defaults = Self::default();
        Self {
            nodes: settings.nodes.unwrap_or(defaults.nodes),
            seed: None,
            time_step: settings.time_step.unwrap_or(defaults.time_step),
            dot_size: settings.dot_size.unwrap_or(defaults.dot_size),
            data: settings.data_url.clone().or(defaults.data),
            object: settings.object.clone().unwrap_or(defaults.object),
            timeout: settings.timeout_secs.and_then(timeout_from_secs).unwrap_or(defaults.timeout),
        }
    }

    /// Clamp values that would make the map unusable
    pub fn sanitized(mut self) -> Self {
        self.nodes = self.nodes.min(500);
        self.time_step = if self.time_step.is_nan() {
            DEFAULT_TIME_STEP
        } else {
            self.time_step.clamp(0.005, 1.0)
        };
        self.timeout = self.timeout.min(MAX_TIMEOUT);
        if !(self.dot_size.is_finite() && self.dot_size >= 0.5) {
            self.dot_size = DEFAULT_DOT_SIZE;
        }
        self
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::try_from_secs_f32(self.time_step)
            .unwrap_or_else(|_| Duration::from_secs_f32(DEFAULT_TIME_STEP))
    }

    pub fn provider(&self) -> Option<GeographyProvider> {
        self.data
            .as_deref()
            .map(|location| GeographyProvider::new(DataSource::parse(location), self.object.clone(), self.timeout))
    }

    /// Explicit seed, or the current time
    pub fn seed_or_now(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_override_defaults() {
        let settings = MapSettings {
            data_url: Some("land.json".into()),
            nodes: Some(12),
            timeout_secs: Some(2.5),
            ..Default::default()
        };
        let config = MapConfig::from_settings(&settings);
        assert_eq!(config.nodes, 12);
        assert_eq!(config.data.as_deref(), Some("land.json"));
        assert_eq!(config.timeout, Duration::from_millis(2500));
        assert_eq!(config.object, DEFAULT_OBJECT);
        assert_eq!(config.dot_size, DEFAULT_DOT_SIZE);
    }

    #[test]
    fn sanitized_clamps_extremes() {
        let config = MapConfig { nodes: 10_000, time_step: 0.0, dot_size: f64::NAN, ..Default::default() }.sanitized();
        assert_eq!(config.nodes, 500);
        assert_eq!(config.time_step, 0.005);
        assert_eq!(config.dot_size, DEFAULT_DOT_SIZE);
    }

    #[test]
    fn bad_settings_timeouts_keep_the_default() {
        for secs in [-1.0, f64::NAN, f64::INFINITY] {
            let settings = MapSettings { timeout_secs: Some(secs), ..Default::default() };
            assert_eq!(MapConfig::from_settings(&settings).timeout, DEFAULT_TIMEOUT);
        }
    }

    #[test]
    fn huge_timeouts_are_capped() {
        assert_eq!(timeout_from_secs(1e30), Some(MAX_TIMEOUT));
        let settings = MapSettings { timeout_secs: Some(1e30), ..Default::default() };
        assert_eq!(MapConfig::from_settings(&settings).timeout, MAX_TIMEOUT);
        let config = MapConfig { timeout: Duration::MAX, ..Default::default() }.sanitized();
        assert_eq!(config.timeout, MAX_TIMEOUT);
    }

    #[test]
    fn nan_time_step_falls_back_to_default() {
        let config = MapConfig { time_step: f32::NAN, ..Default::default() }.sanitized();
        assert_eq!(config.time_step, DEFAULT_TIME_STEP);
        assert_eq!(config.frame_interval(), Duration::from_secs_f32(DEFAULT_TIME_STEP));
        assert_eq!(
            MapConfig { time_step: f32::INFINITY, ..Default::default() }.frame_interval(),
            Duration::from_secs_f32(DEFAULT_TIME_STEP)
        );
    }

    #[test]
    fn offline_has_no_provider() {
        let config = MapConfig { data: None, ..Default::default() };
        assert!(config.provider().is_none());
        assert!(MapConfig::default().provider().is_some());
    }

    #[test]
    fn explicit_seed_wins() {
        let config = MapConfig { seed: Some(5), ..Default::default() };
        assert_eq!(config.seed_or_now(), 5);
    }
}
