use serde::{Deserialize, Serialize};

use super::Distribution;
use crate::distributions::Diameters;
use crate::error::DistFitError;

/// Which correction strategy produced a fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FitMethod {
    /// Size-biased density fitted to the raw tally, unweighted.
    Control { size_bias_order: f64 },
    /// Unbiased density fitted to the stand table, weighted by compression.
    Test,
}

/// Space in which residuals of a fit are measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidualSpace {
    /// Tallies per point.
    Tally,
    /// Stems per hectare.
    StandTable,
}

impl FitMethod {
    pub fn residual_space(&self) -> ResidualSpace {
        match self {
            FitMethod::Control { .. } => ResidualSpace::Tally,
            FitMethod::Test => ResidualSpace::StandTable,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FitMethod::Control { .. } => "control",
            FitMethod::Test => "test",
        }
    }
}

/// Outcome of one (stratum, distribution, method) fit.
///
/// `rss` is measured in [`FitMethod::residual_space`], so control and test
/// values are not directly comparable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResult {
    pub distribution: Distribution,
    pub method: FitMethod,
    /// Fitted parameters, ordered as `Distribution::parameter_names`.
    pub params: Vec<f64>,
    /// Parameter covariance from the pseudo-inverse of `JᵀWJ`; all entries
    /// are infinite when `n == k` or the estimate is not finite.
    pub covariance: Vec<Vec<f64>>,
    /// Residual sum of squares in the fit's own residual space.
    pub rss: f64,
    /// Model evaluated at the diameters used for fitting.
    pub fitted: Vec<f64>,
    /// Model evaluations spent by the solver.
    pub evaluations: usize,
    /// Levenberg-Marquardt iterations.
    pub iterations: usize,
}

impl FitResult {
    /// Evaluate the fitted model at arbitrary diameters, e.g. a plotting grid.
    pub fn evaluate<X: Diameters>(&self, x: X) -> Result<X::Output, DistFitError> {
        let params = Distribution::param_triple(&self.params)?;
        Ok(match self.method {
            FitMethod::Control { size_bias_order } => {
                self.distribution
                    .size_biased_density(x, params, size_bias_order)
            }
            FitMethod::Test => self.distribution.density(x, params),
        })
    }

    /// Look up a parameter by name.
    pub fn param(&self, name: &str) -> Option<f64> {
        self.distribution
            .parameter_names()
            .iter()
            .position(|n| *n == name)
            .and_then(|i| self.params.get(i).copied())
    }

    /// Square roots of the covariance diagonal.
    pub fn std_errors(&self) -> Vec<f64> {
        self.covariance
            .iter()
            .enumerate()
            .map(|(i, row)| row.get(i).copied().unwrap_or(f64::INFINITY).sqrt())
            .collect()
    }

    pub fn residual_space(&self) -> ResidualSpace {
        self.method.residual_space()
    }

    /// Number of observations in the fit.
    pub fn num_observations(&self) -> usize {
        self.fitted.len()
    }

    /// Residual degrees of freedom (`n - k`).
    pub fn degrees_of_freedom(&self) -> usize {
        self.num_observations().saturating_sub(self.params.len())
    }
}
