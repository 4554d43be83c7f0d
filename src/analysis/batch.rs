use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{Config, MetaPlot};
use crate::error::DistFitError;
use crate::models::Dataset;

use super::comparison::{compare_methods, ComparisonRecord, MethodComparison};

/// A (stratum, distribution) pair that could not be fitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailure {
    pub species_group: String,
    pub cover_type: String,
    pub distribution: Option<String>,
    pub reason: String,
}

/// Everything produced by one configured run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub comparisons: Vec<MethodComparison>,
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn records(&self) -> Vec<ComparisonRecord> {
        self.comparisons.iter().map(|c| c.record.clone()).collect()
    }
}

/// Meta-plots to process: the configured list, or every stratum with the
/// default distributions when none are configured.
pub fn planned_meta_plots(dataset: &Dataset, config: &Config) -> Vec<MetaPlot> {
    if !config.meta_plots.is_empty() {
        return config.meta_plots.clone();
    }
    dataset
        .strata()
        .into_iter()
        .map(|(species_group, cover_type)| MetaPlot {
            species_group,
            cover_type,
            distributions: None,
        })
        .collect()
}

/// Run both fitting methods for every planned stratum and distribution.
///
/// With `fail_fast` the first error aborts the run; otherwise failures are
/// recorded and skipped. A run that produces no comparisons is an error.
pub fn run_batch(
    dataset: &Dataset,
    config: &Config,
    fail_fast: bool,
) -> Result<BatchOutcome, DistFitError> {
    let mut outcome = BatchOutcome::default();

    for meta in planned_meta_plots(dataset, config) {
        let stratum = match dataset.stratum(&meta.species_group, &meta.cover_type) {
            Ok(s) => s,
            Err(e) if !fail_fast => {
                warn!(
                    species_group = %meta.species_group,
                    cover_type = %meta.cover_type,
                    "skipping stratum: {e}"
                );
                outcome.failures.push(BatchFailure {
                    species_group: meta.species_group.clone(),
                    cover_type: meta.cover_type.clone(),
                    distribution: None,
                    reason: e.to_string(),
                });
                continue;
            }
            Err(e) => return Err(e),
        };

        info!(
            species_group = %stratum.species_group,
            cover_type = %stratum.cover_type,
            rows = stratum.observations.len(),
            "fitting stratum"
        );

        for name in config.distributions_for(&meta) {
            match compare_methods(&stratum, name, config.baf, config.size_bias_order) {
                Ok(cmp) => outcome.comparisons.push(cmp),
                Err(e) if !fail_fast => {
                    warn!(
                        species_group = %stratum.species_group,
                        cover_type = %stratum.cover_type,
                        distribution = %name,
                        "skipping fit: {e}"
                    );
                    outcome.failures.push(BatchFailure {
                        species_group: stratum.species_group.clone(),
                        cover_type: stratum.cover_type.clone(),
                        distribution: Some(name.clone()),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }

    if outcome.comparisons.is_empty() {
        return Err(DistFitError::DataAvailability(
            "No records generated; ensure the dataset is populated".to_string(),
        ));
    }

    Ok(outcome)
}
