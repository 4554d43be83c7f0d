use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::distributions::DEFAULT_SIZE_BIAS_ORDER;
use crate::error::DistFitError;
use crate::models::Distribution;
use crate::sampling::DEFAULT_BAF;

/// A stratum selected for processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaPlot {
    pub species_group: String,
    pub cover_type: String,
    /// Families to fit; falls back to [`Config::distributions`].
    #[serde(default)]
    pub distributions: Option<Vec<String>>,
}

/// Options consumed by rendering collaborators only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Styling {
    pub palette: String,
    pub dpi: u32,
}

impl Default for Styling {
    fn default() -> Self {
        Self {
            palette: "muted".to_string(),
            dpi: 300,
        }
    }
}

/// Run configuration, loaded from TOML.
///
/// ```toml
/// dataset = "data/processed/binned_meta_plots.csv"
/// output_dir = "tables"
/// baf = 2.0
///
/// [[meta_plots]]
/// species_group = "SW"
/// cover_type = "closed"
/// distributions = ["weibull", "gamma"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dataset: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// Basal-area factor of the sampling gauge
    pub baf: f64,
    /// Moment order of the size bias used by control fits
    pub size_bias_order: f64,
    /// Families fitted when a meta-plot does not list its own
    pub distributions: Vec<String>,
    /// Strata to process; empty means every stratum in the dataset
    pub meta_plots: Vec<MetaPlot>,
    pub styling: Styling,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset: None,
            output_dir: PathBuf::from("tables"),
            baf: DEFAULT_BAF,
            size_bias_order: DEFAULT_SIZE_BIAS_ORDER,
            distributions: vec!["weibull".to_string(), "gamma".to_string()],
            meta_plots: Vec::new(),
            styling: Styling::default(),
        }
    }
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, DistFitError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DistFitError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), DistFitError> {
        if !self.baf.is_finite() || self.baf <= 0.0 {
            return Err(DistFitError::Domain(format!(
                "baf must be positive, got {}",
                self.baf
            )));
        }
        if !self.size_bias_order.is_finite() || self.size_bias_order < 0.0 {
            return Err(DistFitError::Domain(format!(
                "size_bias_order must be non-negative, got {}",
                self.size_bias_order
            )));
        }
        if self.styling.dpi == 0 {
            return Err(DistFitError::Domain("styling.dpi must be positive".to_string()));
        }
        let names = self.distributions.iter().chain(
            self.meta_plots
                .iter()
                .filter_map(|m| m.distributions.as_ref())
                .flatten(),
        );
        for name in names {
            name.parse::<Distribution>()?;
        }
        Ok(())
    }

    /// Distribution names to fit for `meta`.
    pub fn distributions_for<'a>(&'a self, meta: &'a MetaPlot) -> &'a [String] {
        meta.distributions
            .as_deref()
            .unwrap_or(self.distributions.as_slice())
    }
}
