//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/sortvis/sortvis.toml`
//! 3. Explicit config file passed with `--config`
//! 4. Environment variables: `SORTVIS_*` prefix, `__` between section and key
//!    (e.g. `SORTVIS_TIMING__BUBBLE_DELAY_MS=50`)

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::DatasetShape;

/// Animation pacing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    /// Block growth, comparison pause and swap duration
    pub bubble_delay_ms: u64,
    /// Interval of the tree step driver
    pub tree_delay_ms: u64,
    /// Tree node/link transition length
    pub transition_ms: u64,
    /// Multiplier for every duration; 0 runs without pauses
    pub time_scale: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            bubble_delay_ms: 200,
            tree_delay_ms: 500,
            transition_ms: 400,
            time_scale: 1.0,
        }
    }
}

impl TimingConfig {
    pub fn bubble_delay(&self) -> Duration {
        Duration::from_millis(self.bubble_delay_ms)
    }

    pub fn tree_delay(&self) -> Duration {
        Duration::from_millis(self.tree_delay_ms)
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }
}

/// Bubble sort block geometry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BubbleConfig {
    /// Width of the block container
    pub container_width: f64,
    /// Gap between neighbouring blocks
    pub block_offset: f64,
    /// Block height per unit of value
    pub block_multiplier: f64,
}

impl Default for BubbleConfig {
    fn default() -> Self {
        Self {
            container_width: 960.0,
            block_offset: 5.0,
            block_multiplier: 3.0,
        }
    }
}

/// Tree drawing area.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TreeConfig {
    pub width: f64,
    pub height: f64,
    pub node_radius: f64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            width: 920.0,
            height: 440.0,
            node_radius: 15.0,
        }
    }
}

/// Bounds for generated datasets (inclusive).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatasetConfig {
    pub min_count: usize,
    pub max_count: usize,
    pub min_value: i32,
    pub max_value: i32,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            min_count: 15,
            max_count: 30,
            min_value: 0,
            max_value: 100,
        }
    }
}

impl DatasetConfig {
    pub fn shape(&self) -> Result<DatasetShape, ApplicationError> {
        Ok(DatasetShape::new(
            self.min_count..=self.max_count,
            self.min_value..=self.max_value,
        )?)
    }
}

/// Raw layers for intermediate parsing (`None` → not specified, inherit from base).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTimingConfig {
    pub bubble_delay_ms: Option<u64>,
    pub tree_delay_ms: Option<u64>,
    pub transition_ms: Option<u64>,
    pub time_scale: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawBubbleConfig {
    pub container_width: Option<f64>,
    pub block_offset: Option<f64>,
    pub block_multiplier: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTreeConfig {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub node_radius: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDatasetConfig {
    pub min_count: Option<usize>,
    pub max_count: Option<usize>,
    pub min_value: Option<i32>,
    pub max_value: Option<i32>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub timing: RawTimingConfig,
    pub bubble: RawBubbleConfig,
    pub tree: RawTreeConfig,
    pub dataset: RawDatasetConfig,
}

/// Unified configuration for sortvis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    pub timing: TimingConfig,
    pub bubble: BubbleConfig,
    pub tree: TreeConfig,
    pub dataset: DatasetConfig,
}

/// Get the XDG config directory for sortvis.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "sortvis").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("sortvis.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `explicit` - Optional config file; unlike the global file it must exist
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Explicit config file
        if let Some(path) = explicit {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.validate()?;
        Ok(current)
    }

    /// Parse settings from TOML text on top of the defaults.
    pub fn from_toml(content: &str) -> Result<Self, ApplicationError> {
        let raw: RawSettings = toml::from_str(content).map_err(|e| ApplicationError::Config {
            message: format!("parse: {e}"),
        })?;
        let settings = Self::default().merge_with(&raw);
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize: {e}"),
        })
    }

    /// Scalar options: overlay wins if Some, otherwise keep base.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let (t, b, tr, d) = (&overlay.timing, &overlay.bubble, &overlay.tree, &overlay.dataset);
        Self {
            timing: TimingConfig {
                bubble_delay_ms: t.bubble_delay_ms.unwrap_or(self.timing.bubble_delay_ms),
                tree_delay_ms: t.tree_delay_ms.unwrap_or(self.timing.tree_delay_ms),
                transition_ms: t.transition_ms.unwrap_or(self.timing.transition_ms),
                time_scale: t.time_scale.unwrap_or(self.timing.time_scale),
            },
            bubble: BubbleConfig {
                container_width: b.container_width.unwrap_or(self.bubble.container_width),
                block_offset: b.block_offset.unwrap_or(self.bubble.block_offset),
                block_multiplier: b.block_multiplier.unwrap_or(self.bubble.block_multiplier),
            },
            tree: TreeConfig {
                width: tr.width.unwrap_or(self.tree.width),
                height: tr.height.unwrap_or(self.tree.height),
                node_radius: tr.node_radius.unwrap_or(self.tree.node_radius),
            },
            dataset: DatasetConfig {
                min_count: d.min_count.unwrap_or(self.dataset.min_count),
                max_count: d.max_count.unwrap_or(self.dataset.max_count),
                min_value: d.min_value.unwrap_or(self.dataset.min_value),
                max_value: d.max_value.unwrap_or(self.dataset.max_value),
            },
        }
    }

    /// Apply SORTVIS_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("SORTVIS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        let raw: RawSettings = config.try_deserialize().map_err(config_err)?;
        Ok(settings.merge_with(&raw))
    }

    /// Reject values the animators cannot work with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let invalid = |message: String| Err(ApplicationError::Config { message });

        if !self.timing.time_scale.is_finite() || self.timing.time_scale < 0.0 {
            return invalid(format!(
                "timing.time_scale must be a non-negative number, got {}",
                self.timing.time_scale
            ));
        }
        for (key, value) in [
            ("bubble.container_width", self.bubble.container_width),
            ("bubble.block_multiplier", self.bubble.block_multiplier),
            ("tree.width", self.tree.width),
            ("tree.height", self.tree.height),
            ("tree.node_radius", self.tree.node_radius),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return invalid(format!("{key} must be positive, got {value}"));
            }
        }
        if !self.bubble.block_offset.is_finite() || self.bubble.block_offset < 0.0 {
            return invalid(format!(
                "bubble.block_offset must not be negative, got {}",
                self.bubble.block_offset
            ));
        }
        self.dataset.shape()?;
        Ok(())
    }
}
