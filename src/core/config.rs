// src/core/config.rs

use crate::core::common::KnnError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default leaf bucket size of the KD-tree.
pub const DEFAULT_BUCKET_SIZE: usize = 16;
/// Default threshold above which a vector is taken to add a new dimension to a subspace.
pub const DEFAULT_DELTA: f64 = 0.25;
/// Default neighbourhood size of the local PCA preprocessor.
pub const DEFAULT_PCA_K: usize = 20;
/// Default share of variance the strong eigenvectors must explain.
pub const DEFAULT_ALPHA: f64 = 0.85;

/// How the KD-tree picks the split axis of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitStrategy {
    /// Cycle through the axes by tree depth.
    #[default]
    Cycle,
    /// Split the axis with the widest extent of the node's points.
    MaxSpread,
}

/// KD-tree construction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub bucket_size: usize,
    pub split_strategy: SplitStrategy,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { bucket_size: DEFAULT_BUCKET_SIZE, split_strategy: SplitStrategy::Cycle }
    }
}

/// Settings of the subspace correlation distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    pub delta: f64,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self { delta: DEFAULT_DELTA }
    }
}

/// Settings of the kNN-based local PCA preprocessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PcaConfig {
    pub k: usize,
    pub alpha: f64,
}

impl Default for PcaConfig {
    fn default() -> Self {
        Self { k: DEFAULT_PCA_K, alpha: DEFAULT_ALPHA }
    }
}

/// Top-level configuration, one section per component.
///
/// ```toml
/// [index]
/// bucket_size = 8
/// split_strategy = "max_spread"
///
/// [correlation]
/// delta = 0.1
///
/// [pca]
/// k = 15
/// alpha = 0.9
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub index: IndexConfig,
    pub correlation: CorrelationConfig,
    pub pca: PcaConfig,
}

/// Builder for [`Config`]; unset values fall back to the defaults.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    bucket_size: Option<usize>,
    split_strategy: Option<SplitStrategy>,
    delta: Option<f64>,
    pca_k: Option<usize>,
    alpha: Option<f64>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of points stored in a KD-tree leaf
    pub fn bucket_size(mut self, size: usize) -> Self {
        self.bucket_size = Some(size);
        self
    }

    pub fn split_strategy(mut self, strategy: SplitStrategy) -> Self {
        self.split_strategy = Some(strategy);
        self
    }

    /// Sets the correlation distance threshold
    pub fn delta(mut self, delta: f64) -> Self {
        self.delta = Some(delta);
        self
    }

    /// Sets the neighbourhood size for local PCA
    pub fn pca_k(mut self, k: usize) -> Self {
        self.pca_k = Some(k);
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    /// Builds the Config instance with validation
    pub fn build(self) -> Result<Config, KnnError> {
        let config = Config {
            index: IndexConfig {
                bucket_size: self.bucket_size.unwrap_or(DEFAULT_BUCKET_SIZE),
                split_strategy: self.split_strategy.unwrap_or_default(),
            },
            correlation: CorrelationConfig { delta: self.delta.unwrap_or(DEFAULT_DELTA) },
            pca: PcaConfig {
                k: self.pca_k.unwrap_or(DEFAULT_PCA_K),
                alpha: self.alpha.unwrap_or(DEFAULT_ALPHA),
            },
        };
        config.validate()?;
        Ok(config)
    }
}

impl IndexConfig {
    pub fn validate(&self) -> Result<(), KnnError> {
        if self.bucket_size == 0 {
            return Err(KnnError::Configuration("index.bucket_size must be greater than 0".to_string()));
        }
        Ok(())
    }
}

impl CorrelationConfig {
    pub fn validate(&self) -> Result<(), KnnError> {
        if !self.delta.is_finite() || self.delta < 0.0 {
            return Err(KnnError::Configuration(format!(
                "correlation.delta must be a finite non-negative number, got {}",
                self.delta
            )));
        }
        Ok(())
    }
}

impl PcaConfig {
    pub fn validate(&self) -> Result<(), KnnError> {
        if self.k == 0 {
            return Err(KnnError::Configuration("pca.k must be greater than 0".to_string()));
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(KnnError::Configuration(format!(
                "pca.alpha must lie in (0, 1], got {}",
                self.alpha
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Creates a new ConfigBuilder for fluent configuration
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), KnnError> {
        self.index.validate()?;
        self.correlation.validate()?;
        self.pca.validate()
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `KnnError::Configuration` if parsing or validation fails and
    /// `KnnError::Io` if the file exists but cannot be read.
    pub fn load_from_file(path: &Path) -> Result<Self, KnnError> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let config: Self = toml::from_str(&contents).map_err(|e| {
                    KnnError::Configuration(format!(
                        "Failed to parse config file '{}': {}",
                        path.display(),
                        e
                    ))
                })?;
                config.validate()?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(KnnError::Io(e)),
        }
    }

    /// Loads configuration from an optional TOML file path.
    ///
    /// `None` returns the default configuration.
    pub fn load_or_default(optional_path: Option<&Path>) -> Result<Self, KnnError> {
        match optional_path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }
}
