use crate::error::DistFitError;
use crate::models::{Distribution, FitResult};

use super::engine::{
    fit_control_gamma, fit_control_weibull, fit_test_gamma, fit_test_gamma_with_expansion,
    fit_test_weibull, fit_test_weibull_with_expansion,
};

/// `control(dbh, tally, size_bias_order)`
pub type ControlFit = fn(&[f64], &[f64], f64) -> Result<FitResult, DistFitError>;
/// `test(dbh, tally, baf)`
pub type TestFit = fn(&[f64], &[f64], f64) -> Result<FitResult, DistFitError>;
/// `test(dbh, tally, expansion_factors)`
pub type TestFitWithExpansion = fn(&[f64], &[f64], &[f64]) -> Result<FitResult, DistFitError>;

/// Paired control/test fitting functions for one distribution family.
#[derive(Debug, Clone, Copy)]
pub struct MethodPair {
    pub distribution: Distribution,
    pub control: ControlFit,
    pub test: TestFit,
    pub test_with_expansion: TestFitWithExpansion,
}

impl MethodPair {
    pub fn for_distribution(distribution: Distribution) -> Self {
        match distribution {
            Distribution::Weibull => MethodPair {
                distribution,
                control: fit_control_weibull,
                test: fit_test_weibull,
                test_with_expansion: fit_test_weibull_with_expansion,
            },
            Distribution::Gamma => MethodPair {
                distribution,
                control: fit_control_gamma,
                test: fit_test_gamma,
                test_with_expansion: fit_test_gamma_with_expansion,
            },
        }
    }
}

/// Resolve a distribution name (case-insensitive prefix) to its method pair.
pub fn resolve(name: &str) -> Result<MethodPair, DistFitError> {
    let distribution: Distribution = name.parse()?;
    Ok(MethodPair::for_distribution(distribution))
}
