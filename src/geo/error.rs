use std::io;

/// Why the landmass dataset could not be loaded.
///
/// None of these are fatal: the map falls back to land-agnostic placement
/// and skips the silhouette.
#[derive(thiserror::Error, Debug)]
pub enum GeographyLoadError {
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("format error: {0}")]
    Format(String),

    #[error("dataset has no polygons")]
    Empty,

    #[error("dataset exceeds {0} bytes")]
    TooLarge(u64),

    #[error("load cancelled")]
    Cancelled,
}

impl GeographyLoadError {
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }
}
