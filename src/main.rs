mod background;
mod config;
mod engine;
mod geo;
mod help;
mod relay;
mod render;
mod scheduler;
mod settings;
mod terminal;

use clap::{Args, Parser, Subcommand};
use config::{timeout_from_secs, MapConfig};
use settings::Settings;
use std::io;

#[derive(Parser)]
#[command(name = "relaymap")]
#[command(author = "Terminal Art Generator")]
#[command(version = "0.1.0")]
#[command(about = "Animated relay network drawn over a world map in the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Animate the relay map full screen
    Run {
        #[command(flatten)]
        map: MapArgs,
    },

    /// Render a few frames and print the result to stdout
    Snapshot {
        #[command(flatten)]
        map: MapArgs,

        /// Frames to advance before printing
        #[arg(short, long, default_value = "60")]
        frames: usize,

        /// Width in columns (default: terminal width or 80)
        #[arg(short = 'W', long)]
        width: Option<u16>,

        /// Height in rows (default: terminal height or 24)
        #[arg(short = 'H', long)]
        height: Option<u16>,
    },
}

#[derive(Args)]
struct MapArgs {
    /// Number of relay nodes
    #[arg(short, long)]
    nodes: Option<usize>,

    /// Random seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Animation speed (seconds per frame)
    #[arg(short, long)]
    time: Option<f32>,

    /// World map URL or file (TopoJSON or GeoJSON)
    #[arg(short, long)]
    data: Option<String>,

    /// Topology object holding the landmasses
    #[arg(short, long)]
    object: Option<String>,

    /// Seconds to wait for the world map
    #[arg(long)]
    timeout: Option<f64>,

    /// Logical pixels per braille dot (larger = coarser map)
    #[arg(long)]
    dot_size: Option<f64>,

    /// Skip the world map and place nodes anywhere
    #[arg(long)]
    offline: bool,
}

impl MapArgs {
    /// CLI flags over settings file over defaults
    fn into_config(self, settings: &Settings) -> MapConfig {
        let mut config = MapConfig::from_settings(&settings.map);
        config.seed = self.seed;
        if let Some(nodes) = self.nodes {
            config.nodes = nodes;
        }
        if let Some(time) = self.time {
            config.time_step = time;
        }
        if let Some(data) = self.data {
            config.data = Some(data);
        }
        if let Some(object) = self.object {
            config.object = object;
        }
        if let Some(timeout) = self.timeout.and_then(timeout_from_secs) {
            config.timeout = timeout;
        }
        if let Some(dot_size) = self.dot_size {
            config.dot_size = dot_size;
        }
        if self.offline {
            config.data = None;
        }
        config.sanitized()
    }
}

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let settings = Settings::load();

    match cli.command {
        Commands::Run { map } => {
            let config = map.into_config(&settings);
            background::run(&config)?;
        }
        Commands::Snapshot { map, frames, width, height } => {
            let config = map.into_config(&settings);
            let (term_w, term_h) = crossterm::terminal::size().unwrap_or((80, 24));
            let cols = width.unwrap_or(term_w).max(1);
            let rows = height.unwrap_or(term_h).max(1);
            background::snapshot(&config, frames, cols, rows)?;
        }
    }

    Ok(())
}
