use serde::{Deserialize, Serialize};

use crate::error::DistFitError;
use crate::sampling::{expansion_factors, stand_table};

/// One binned tally record: a diameter class within a species/cover stratum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub species_group: String,
    pub cover_type: String,
    /// Diameter class midpoint in centimetres
    pub dbh_cm: f64,
    /// Trees tallied in this class across the meta-plot
    pub tally: f64,
    /// Precomputed stems per hectare represented by one tally
    #[serde(default)]
    pub expansion_factor: Option<f64>,
}

impl Observation {
    /// Validate measurements. `row` is only used in the error message.
    pub fn validate(&self, row: usize) -> Result<(), DistFitError> {
        if !self.dbh_cm.is_finite() || self.dbh_cm <= 0.0 {
            return Err(DistFitError::Domain(format!(
                "Row {row} ({}/{}): dbh_cm must be positive, got {}",
                self.species_group, self.cover_type, self.dbh_cm
            )));
        }
        if !self.tally.is_finite() || self.tally < 0.0 {
            return Err(DistFitError::Domain(format!(
                "Row {row} ({}/{}): tally must be non-negative, got {}",
                self.species_group, self.cover_type, self.tally
            )));
        }
        if let Some(ef) = self.expansion_factor {
            if !ef.is_finite() || ef <= 0.0 {
                return Err(DistFitError::Domain(format!(
                    "Row {row} ({}/{}): expansion_factor must be positive, got {ef}",
                    self.species_group, self.cover_type
                )));
            }
        }
        Ok(())
    }
}

/// The full binned meta-plot table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub observations: Vec<Observation>,
}

impl Dataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            observations: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Validate every observation, failing on the first bad row.
    pub fn validate(&self) -> Result<(), DistFitError> {
        if self.is_empty() {
            return Err(DistFitError::DataAvailability(format!(
                "dataset '{}' has no observations",
                self.name
            )));
        }
        for (row, obs) in self.observations.iter().enumerate() {
            obs.validate(row)?;
        }
        Ok(())
    }

    /// Distinct (species_group, cover_type) pairs in first-seen order.
    pub fn strata(&self) -> Vec<(String, String)> {
        let mut seen: Vec<(String, String)> = Vec::new();
        for obs in &self.observations {
            if !seen
                .iter()
                .any(|(s, c)| *s == obs.species_group && *c == obs.cover_type)
            {
                seen.push((obs.species_group.clone(), obs.cover_type.clone()));
            }
        }
        seen
    }

    /// Select one stratum. An empty selection is a [`DistFitError::DataAvailability`].
    pub fn stratum(&self, species_group: &str, cover_type: &str) -> Result<Stratum, DistFitError> {
        let observations: Vec<Observation> = self
            .observations
            .iter()
            .filter(|o| o.species_group == species_group && o.cover_type == cover_type)
            .cloned()
            .collect();

        if observations.is_empty() {
            return Err(DistFitError::DataAvailability(format!(
                "No data for species_group={species_group}, cover_type={cover_type}"
            )));
        }

        Ok(Stratum {
            species_group: species_group.to_string(),
            cover_type: cover_type.to_string(),
            observations,
        })
    }
}

/// Observations of a single species group and cover type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stratum {
    pub species_group: String,
    pub cover_type: String,
    pub observations: Vec<Observation>,
}

/// Aligned per-diameter series derived from a stratum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StratumSeries {
    pub dbh: Vec<f64>,
    pub tally: Vec<f64>,
    pub expansion: Vec<f64>,
    pub compression: Vec<f64>,
    /// tally × expansion
    pub stand_table: Vec<f64>,
}

impl Stratum {
    pub fn dbh(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.dbh_cm).collect()
    }

    pub fn tally(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.tally).collect()
    }

    /// Total trees tallied, truncated to a whole count.
    pub fn sample_size(&self) -> u64 {
        let total: f64 = self.observations.iter().map(|o| o.tally).sum();
        total.trunc().max(0.0) as u64
    }

    /// True when every row carries a precomputed expansion factor.
    pub fn has_precomputed_expansion(&self) -> bool {
        self.observations
            .iter()
            .all(|o| o.expansion_factor.is_some())
    }

    /// Expansion factors: the precomputed column when complete, otherwise
    /// derived from `baf`.
    pub fn expansion_factors(&self, baf: f64) -> Result<Vec<f64>, DistFitError> {
        let precomputed: Option<Vec<f64>> = self
            .observations
            .iter()
            .map(|o| o.expansion_factor)
            .collect();
        match precomputed {
            Some(ef) => Ok(ef),
            None => expansion_factors(&self.dbh(), baf),
        }
    }

    /// Build the aligned series used by both fitting methods.
    pub fn series(&self, baf: f64) -> Result<StratumSeries, DistFitError> {
        for (row, obs) in self.observations.iter().enumerate() {
            obs.validate(row)?;
        }
        let dbh = self.dbh();
        let tally = self.tally();
        let expansion = self.expansion_factors(baf)?;
        let compression = expansion.iter().map(|e| 1.0 / e).collect();
        let stand_table = stand_table(&tally, &expansion)?;
        Ok(StratumSeries {
            dbh,
            tally,
            expansion,
            compression,
            stand_table,
        })
    }
}
