use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub pairing: PairingSettings,
    #[serde(default)]
    pub synth: SynthSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PairingSettings {
    /// Seed for the tie-breaking generator; fixed seed = reproducible run
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Demo group sizes
    #[serde(default = "default_proposers")]
    pub proposers: usize,
    #[serde(default = "default_acceptors")]
    pub acceptors: usize,
}

impl Default for PairingSettings {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            proposers: default_proposers(),
            acceptors: default_acceptors(),
        }
    }
}

fn default_seed() -> u64 { 1234 }
fn default_proposers() -> usize { 6 }
fn default_acceptors() -> usize { 8 }

#[derive(Debug, Clone, Deserialize)]
pub struct SynthSettings {
    /// Scores strictly below this count as "highly ranked" when
    /// synthesizing reciprocal preferences
    #[serde(default = "default_rank_cut")]
    pub rank_cut: f64,
}

impl Default for SynthSettings {
    fn default() -> Self {
        Self { rank_cut: default_rank_cut() }
    }
}

fn default_rank_cut() -> f64 { 5.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with PAIR_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with PAIR_)
            // e.g., PAIR_PAIRING__SEED -> pairing.seed
            .add_source(
                Environment::with_prefix("PAIR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("PAIR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
