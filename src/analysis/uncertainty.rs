use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::DistFitError;
use crate::models::FitResult;

/// Confidence interval for one fitted parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterEstimate {
    pub name: String,
    pub value: f64,
    pub std_error: f64,
    pub lower: f64,
    pub upper: f64,
    pub confidence_level: f64,
    pub degrees_of_freedom: usize,
}

/// Student-t intervals for every parameter of `fit` (e.g. `confidence = 0.95`).
///
/// Degrees of freedom are `n - k`. Parameters whose covariance could not be
/// estimated get infinite standard errors and unbounded intervals.
pub fn parameter_estimates(
    fit: &FitResult,
    confidence: f64,
) -> Result<Vec<ParameterEstimate>, DistFitError> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(DistFitError::Domain(format!(
            "confidence must be in (0, 1), got {confidence}"
        )));
    }

    let df = fit.degrees_of_freedom();
    if df == 0 {
        return Err(DistFitError::InsufficientData(format!(
            "{} observations leave no residual degrees of freedom for {} parameters",
            fit.num_observations(),
            fit.params.len()
        )));
    }

    let alpha = 1.0 - confidence;
    let t_dist = StudentsT::new(0.0, 1.0, df as f64)
        .map_err(|e| DistFitError::Domain(e.to_string()))?;
    let t_value = t_dist.inverse_cdf(1.0 - alpha / 2.0);

    let names = fit.distribution.parameter_names();
    let std_errors = fit.std_errors();

    Ok(fit
        .params
        .iter()
        .zip(std_errors)
        .enumerate()
        .map(|(i, (&value, std_error))| {
            let margin = t_value * std_error;
            ParameterEstimate {
                name: names.get(i).copied().unwrap_or("param").to_string(),
                value,
                std_error,
                lower: value - margin,
                upper: value + margin,
                confidence_level: confidence,
                degrees_of_freedom: df,
            }
        })
        .collect())
}
