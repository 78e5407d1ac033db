use std::fs;
use std::path::PathBuf;

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

// Default values for configuration
// These serve as fallback values and can be used for "reset to defaults" functionality
pub const DEFAULT_SNAP_VELOCITY_THRESHOLD: f32 = 300.0; // px/s
pub const DEFAULT_LONG_PRESS_DELAY_MS: u64 = 500;
pub const DEFAULT_TAP_DISTANCE_THRESHOLD_PX: f32 = 10.0;
pub const DEFAULT_VELOCITY_WINDOW_MS: u64 = 250;
pub const DEFAULT_COVER_CACHE_CAPACITY: usize = 8;
pub const DEFAULT_MAX_PENDING_GENERATIONS: usize = 8;

/// Environment constants for gesture handling, animation and caching.
/// These are the platform lookups the original viewer took from its
/// toolkit, externalized so hosts (and tests) can tune them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Velocity (px/s) above which a release counts as a fling/swipe
    /// instead of settling on the nearest tile.
    #[serde(default = "default_snap_velocity_threshold")]
    pub snap_velocity_threshold: f32,

    /// How long a press must stay put before it fires the long-press action.
    #[serde(default = "default_long_press_delay_ms")]
    pub long_press_delay_ms: u64,

    /// Manhattan distance (px) under which a release still counts as a tap.
    #[serde(default = "default_tap_distance_threshold_px")]
    pub tap_distance_threshold_px: f32,

    /// Trailing window over which release velocity is measured.
    #[serde(default = "default_velocity_window_ms")]
    pub velocity_window_ms: u64,

    /// Number of generated covers kept around for back-and-forth navigation.
    #[serde(default = "default_cover_cache_capacity")]
    pub cover_cache_capacity: usize,

    /// Bound of the generation request queue.
    #[serde(default = "default_max_pending_generations")]
    pub max_pending_generations: usize,
}

fn default_snap_velocity_threshold() -> f32 {
    DEFAULT_SNAP_VELOCITY_THRESHOLD
}

fn default_long_press_delay_ms() -> u64 {
    DEFAULT_LONG_PRESS_DELAY_MS
}

fn default_tap_distance_threshold_px() -> f32 {
    DEFAULT_TAP_DISTANCE_THRESHOLD_PX
}

fn default_velocity_window_ms() -> u64 {
    DEFAULT_VELOCITY_WINDOW_MS
}

fn default_cover_cache_capacity() -> usize {
    DEFAULT_COVER_CACHE_CAPACITY
}

fn default_max_pending_generations() -> usize {
    DEFAULT_MAX_PENDING_GENERATIONS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snap_velocity_threshold: DEFAULT_SNAP_VELOCITY_THRESHOLD,
            long_press_delay_ms: DEFAULT_LONG_PRESS_DELAY_MS,
            tap_distance_threshold_px: DEFAULT_TAP_DISTANCE_THRESHOLD_PX,
            velocity_window_ms: DEFAULT_VELOCITY_WINDOW_MS,
            cover_cache_capacity: DEFAULT_COVER_CACHE_CAPACITY,
            max_pending_generations: DEFAULT_MAX_PENDING_GENERATIONS,
        }
    }
}

impl Config {
    /// Path of the user override file:
    /// `<config_dir>/coverflick/config.yaml`.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("coverflick").join("config.yaml")
    }

    /// Load the configuration from the YAML override file, falling back to
    /// defaults for missing fields or on any error. If `custom_path` is
    /// provided it is used instead of the default location.
    pub fn load(custom_path: Option<&str>) -> Self {
        let path = match custom_path {
            Some(p) => {
                info!("Using custom config path: {}", p);
                PathBuf::from(p)
            }
            None => Self::config_path(),
        };

        if !path.exists() {
            info!("Config file not found at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match serde_yaml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!("Loaded config from {:?}", path);
                    debug!(
                        "Config: snap_velocity={}, long_press={}ms, tap_distance={}px, window={}ms",
                        config.snap_velocity_threshold,
                        config.long_press_delay_ms,
                        config.tap_distance_threshold_px,
                        config.velocity_window_ms
                    );
                    config
                }
                Err(e) => {
                    error!("Failed to parse config file at {:?}: {}", path, e);
                    warn!("Using default config");
                    Self::default()
                }
            },
            Err(e) => {
                error!("Failed to read config file at {:?}: {}", path, e);
                warn!("Using default config");
                Self::default()
            }
        }
    }
}
