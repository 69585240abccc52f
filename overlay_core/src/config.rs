//! Configuration file support for the overlay tools.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/overlay/config.toml`.
//! Every field has a default, so a partial file only overrides what it names.

use crate::{Error, Result, SubstanceCategory};
use chrono::Duration;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Longest lookback window accepted by validation (30 days).
const MAX_WINDOW_HOURS: i64 = 24 * 30;

static DEFAULT_ENGINE_CONFIG: Lazy<EngineConfig> = Lazy::new(EngineConfig::default);

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub engine: EngineConfig,
}

/// Where the activity log lives
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            log_path: default_log_path(),
        }
    }
}

/// Tunables injected into the engine
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub windows: WindowConfig,

    #[serde(default)]
    pub thresholds: ThresholdConfig,

    #[serde(default)]
    pub notes: NotesConfig,
}

/// Lookback window per stacked category, in hours
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WindowConfig {
    #[serde(default = "default_stimulant_hours")]
    pub stimulant: i64,

    #[serde(default = "default_opioid_hours")]
    pub opioid: i64,

    #[serde(default = "default_gabaergic_hours")]
    pub gabaergic: i64,

    #[serde(default = "default_cannabis_hours")]
    pub cannabis: i64,

    #[serde(default = "default_nicotine_hours")]
    pub nicotine: i64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            stimulant: default_stimulant_hours(),
            opioid: default_opioid_hours(),
            gabaergic: default_gabaergic_hours(),
            cannabis: default_cannabis_hours(),
            nicotine: default_nicotine_hours(),
        }
    }
}

impl WindowConfig {
    /// Window length in hours, or `None` for categories that are not stacked.
    pub fn hours_for(&self, category: SubstanceCategory) -> Option<i64> {
        match category {
            SubstanceCategory::Stimulant => Some(self.stimulant),
            SubstanceCategory::Opioid => Some(self.opioid),
            SubstanceCategory::Gabaergic => Some(self.gabaergic),
            SubstanceCategory::Cannabis => Some(self.cannabis),
            SubstanceCategory::Nicotine => Some(self.nicotine),
            SubstanceCategory::Psychedelic
            | SubstanceCategory::Dissociative
            | SubstanceCategory::Unknown => None,
        }
    }

    /// Window as a duration. Out-of-range values collapse to an empty window.
    pub fn window_for(&self, category: SubstanceCategory) -> Option<Duration> {
        self.hours_for(category)
            .map(|hours| Duration::try_hours(hours).unwrap_or_else(Duration::zero))
    }

    /// The widest configured window, used for the shared-activity check.
    pub fn broadest(&self) -> Duration {
        SubstanceCategory::STACKED
            .iter()
            .filter_map(|c| self.window_for(*c))
            .max()
            .unwrap_or_else(Duration::zero)
    }
}

/// Step-function thresholds for one category
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct StackThresholds {
    pub moderate_at: f64,
    pub high_at: f64,
    pub critical_at: f64,
}

impl StackThresholds {
    pub const fn new(moderate_at: f64, high_at: f64, critical_at: f64) -> Self {
        Self {
            moderate_at,
            high_at,
            critical_at,
        }
    }
}

/// Stack thresholds per stacked category
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ThresholdConfig {
    #[serde(default = "default_stimulant_thresholds")]
    pub stimulant: StackThresholds,

    #[serde(default = "default_opioid_thresholds")]
    pub opioid: StackThresholds,

    #[serde(default = "default_gabaergic_thresholds")]
    pub gabaergic: StackThresholds,

    #[serde(default = "default_cannabis_thresholds")]
    pub cannabis: StackThresholds,

    #[serde(default = "default_nicotine_thresholds")]
    pub nicotine: StackThresholds,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            stimulant: default_stimulant_thresholds(),
            opioid: default_opioid_thresholds(),
            gabaergic: default_gabaergic_thresholds(),
            cannabis: default_cannabis_thresholds(),
            nicotine: default_nicotine_thresholds(),
        }
    }
}

impl ThresholdConfig {
    pub fn for_category(&self, category: SubstanceCategory) -> Option<&StackThresholds> {
        match category {
            SubstanceCategory::Stimulant => Some(&self.stimulant),
            SubstanceCategory::Opioid => Some(&self.opioid),
            SubstanceCategory::Gabaergic => Some(&self.gabaergic),
            SubstanceCategory::Cannabis => Some(&self.cannabis),
            SubstanceCategory::Nicotine => Some(&self.nicotine),
            SubstanceCategory::Psychedelic
            | SubstanceCategory::Dissociative
            | SubstanceCategory::Unknown => None,
        }
    }
}

/// Static note text appended to every result
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotesConfig {
    #[serde(default = "default_disclaimers")]
    pub disclaimers: Vec<String>,

    #[serde(default = "default_do_not_redose")]
    pub do_not_redose: String,

    #[serde(default = "default_emergency")]
    pub emergency: String,

    #[serde(default = "default_hydration")]
    pub hydration: String,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            disclaimers: default_disclaimers(),
            do_not_redose: default_do_not_redose(),
            emergency: default_emergency(),
            hydration: default_hydration(),
        }
    }
}

// Default value functions
fn default_log_path() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("overlay").join("log.jsonl")
}

fn default_stimulant_hours() -> i64 {
    12
}

fn default_opioid_hours() -> i64 {
    12
}

// Long-tail agents (phenibut, GHB) justify the wider window.
fn default_gabaergic_hours() -> i64 {
    24
}

fn default_cannabis_hours() -> i64 {
    12
}

fn default_nicotine_hours() -> i64 {
    6
}

fn default_stimulant_thresholds() -> StackThresholds {
    StackThresholds::new(1.0, 2.0, 4.0)
}

fn default_opioid_thresholds() -> StackThresholds {
    StackThresholds::new(1.0, 2.0, 3.0)
}

fn default_gabaergic_thresholds() -> StackThresholds {
    StackThresholds::new(1.0, 2.0, 3.0)
}

fn default_cannabis_thresholds() -> StackThresholds {
    StackThresholds::new(1.0, 3.0, 5.0)
}

fn default_nicotine_thresholds() -> StackThresholds {
    StackThresholds::new(3.0, 8.0, 15.0)
}

fn default_disclaimers() -> Vec<String> {
    vec![
        "This overview is educational harm-reduction information, not medical advice.".into(),
        "Effects and risks vary widely between individuals; these estimates are heuristic and conservative.".into(),
    ]
}

fn default_do_not_redose() -> String {
    "Do not redose or add other substances right now; give your body time.".into()
}

fn default_emergency() -> String {
    "Call emergency services if anyone shows chest pain, severe breathing difficulty, unconsciousness, or blue lips or skin (cyanosis).".into()
}

fn default_hydration() -> String {
    "Stimulants in the mix: sip water steadily, take breaks to cool down, and rest when you can.".into()
}

impl EngineConfig {
    /// Shared default configuration, built once per process
    pub fn shared_default() -> &'static EngineConfig {
        &DEFAULT_ENGINE_CONFIG
    }

    /// Check that windows and thresholds are usable
    pub fn validate(&self) -> Result<()> {
        for category in SubstanceCategory::STACKED {
            if let Some(hours) = self.windows.hours_for(category) {
                if !(0..=MAX_WINDOW_HOURS).contains(&hours) {
                    return Err(Error::Config(format!(
                        "window for {} must be between 0 and {} hours, got {}",
                        category, MAX_WINDOW_HOURS, hours
                    )));
                }
            }

            if let Some(t) = self.thresholds.for_category(category) {
                let values = [t.moderate_at, t.high_at, t.critical_at];
                if values.iter().any(|v| !v.is_finite() || *v <= 0.0) {
                    return Err(Error::Config(format!(
                        "thresholds for {} must be positive numbers",
                        category
                    )));
                }
                if !(t.moderate_at <= t.high_at && t.high_at <= t.critical_at) {
                    return Err(Error::Config(format!(
                        "thresholds for {} must satisfy moderate_at <= high_at <= critical_at",
                        category
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        Self::load_or_default(&Self::default_config_path())
    }

    /// Load configuration from `path`, falling back to defaults when absent
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.engine.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("overlay").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
