use std::f64::consts::PI;

use crate::error::DistFitError;

/// Basal-area factor used when neither the caller nor the config supplies one.
pub const DEFAULT_BAF: f64 = 2.0;

fn check_baf(baf: f64) -> Result<(), DistFitError> {
    if !baf.is_finite() || baf <= 0.0 {
        return Err(DistFitError::Domain(format!(
            "basal-area factor must be positive and finite, got {baf}"
        )));
    }
    Ok(())
}

fn check_dbh(dbh_cm: f64) -> Result<(), DistFitError> {
    if !dbh_cm.is_finite() || dbh_cm <= 0.0 {
        return Err(DistFitError::Domain(format!(
            "dbh_cm must be positive and finite, got {dbh_cm}"
        )));
    }
    Ok(())
}

/// Stems per hectare represented by one tally at `dbh_cm` under `baf`.
///
/// A tree tallied with a BAF gauge stands for `baf` m²/ha of basal area, so
/// one tally represents `baf / basal_area(dbh_cm)` stems per hectare.
///
/// Strictly decreasing in `dbh_cm`. Diameters at or below zero are a caller
/// error and yield [`DistFitError::Domain`].
pub fn expansion_factor(dbh_cm: f64, baf: f64) -> Result<f64, DistFitError> {
    check_dbh(dbh_cm)?;
    check_baf(baf)?;
    Ok(baf / (PI * (dbh_cm * 0.01 * 0.5).powi(2)))
}

/// Reciprocal of [`expansion_factor`].
pub fn compression_factor(dbh_cm: f64, baf: f64) -> Result<f64, DistFitError> {
    Ok(1.0 / expansion_factor(dbh_cm, baf)?)
}

/// Expansion factors for every diameter in `dbh_cm`.
pub fn expansion_factors(dbh_cm: &[f64], baf: f64) -> Result<Vec<f64>, DistFitError> {
    dbh_cm.iter().map(|&d| expansion_factor(d, baf)).collect()
}

/// Compression factors for every diameter in `dbh_cm`.
pub fn compression_factors(dbh_cm: &[f64], baf: f64) -> Result<Vec<f64>, DistFitError> {
    dbh_cm.iter().map(|&d| compression_factor(d, baf)).collect()
}

/// Stand table series: tally expanded to stems per hectare.
pub fn stand_table(tally: &[f64], expansion: &[f64]) -> Result<Vec<f64>, DistFitError> {
    if tally.len() != expansion.len() {
        return Err(DistFitError::Domain(format!(
            "tally has {} values but expansion has {}",
            tally.len(),
            expansion.len()
        )));
    }
    Ok(tally.iter().zip(expansion).map(|(t, e)| t * e).collect())
}
