use crate::error::DistFitError;
use crate::models::{Distribution, FitMethod, FitResult};
use crate::sampling::{expansion_factors, stand_table};

use super::solver::{curve_fit_within, SolverOptions};

fn check_inputs(dbh: &[f64], tally: &[f64]) -> Result<(), DistFitError> {
    if dbh.len() != tally.len() {
        return Err(DistFitError::Domain(format!(
            "dbh has {} values but tally has {}",
            dbh.len(),
            tally.len()
        )));
    }
    if let Some(d) = dbh.iter().find(|d| !d.is_finite() || **d <= 0.0) {
        return Err(DistFitError::Domain(format!(
            "dbh_cm must be positive and finite, got {d}"
        )));
    }
    if let Some(t) = tally.iter().find(|t| !t.is_finite() || **t < 0.0) {
        return Err(DistFitError::Domain(format!(
            "tally must be non-negative and finite, got {t}"
        )));
    }
    if dbh.len() < Distribution::NUM_PARAMS {
        return Err(DistFitError::InsufficientData(format!(
            "{} observations for {} free parameters",
            dbh.len(),
            Distribution::NUM_PARAMS
        )));
    }
    Ok(())
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Keeps the solver inside the family's parameter domain.
fn admissible(distribution: Distribution) -> impl Fn(&[f64]) -> bool {
    move |p: &[f64]| Distribution::param_triple(p).is_ok_and(|p| distribution.admits(p))
}

fn rss(observed: &[f64], fitted: &[f64]) -> f64 {
    observed
        .iter()
        .zip(fitted)
        .map(|(o, f)| (o - f).powi(2))
        .sum()
}

/// Fit the size-biased density of moment `order` to the raw tally.
///
/// Unweighted; `rss` is in tally space. `order` must be finite and
/// non-negative.
pub fn fit_control(
    distribution: Distribution,
    dbh: &[f64],
    tally: &[f64],
    order: f64,
    options: &SolverOptions,
) -> Result<FitResult, DistFitError> {
    check_inputs(dbh, tally)?;
    if !order.is_finite() || order < 0.0 {
        return Err(DistFitError::Domain(format!(
            "size-bias order must be finite and non-negative, got {order}"
        )));
    }

    let model = |x: &[f64], p: &[f64]| match Distribution::param_triple(p) {
        Ok(p) => distribution.size_biased_density(x, p, order),
        Err(_) => vec![f64::NAN; x.len()],
    };
    let p0 = distribution.initial_guess(max_of(tally));
    let solution = curve_fit_within(
        &model,
        admissible(distribution),
        dbh,
        tally,
        &p0,
        None,
        options,
    )?;

    let fitted = model(dbh, solution.params.as_slice());
    Ok(FitResult {
        distribution,
        method: FitMethod::Control {
            size_bias_order: order,
        },
        rss: rss(tally, &fitted),
        params: solution.params,
        covariance: solution.covariance,
        fitted,
        evaluations: solution.evaluations,
        iterations: solution.iterations,
    })
}

/// Fit the unbiased density to the stand table built from `expansion`.
///
/// Each point's sigma is its compression factor (`1 / expansion`); `rss` is
/// in stand-table space.
pub fn fit_test_with_expansion(
    distribution: Distribution,
    dbh: &[f64],
    tally: &[f64],
    expansion: &[f64],
    options: &SolverOptions,
) -> Result<FitResult, DistFitError> {
    check_inputs(dbh, tally)?;
    if let Some(e) = expansion.iter().find(|e| !e.is_finite() || **e <= 0.0) {
        return Err(DistFitError::Domain(format!(
            "expansion factor must be positive and finite, got {e}"
        )));
    }

    let stand = stand_table(tally, expansion)?;
    let sigma: Vec<f64> = expansion.iter().map(|e| 1.0 / e).collect();

    let model = |x: &[f64], p: &[f64]| match Distribution::param_triple(p) {
        Ok(p) => distribution.density(x, p),
        Err(_) => vec![f64::NAN; x.len()],
    };
    let p0 = distribution.initial_guess(max_of(&stand));
    let solution = curve_fit_within(
        &model,
        admissible(distribution),
        dbh,
        &stand,
        &p0,
        Some(sigma.as_slice()),
        options,
    )?;

    let fitted = model(dbh, solution.params.as_slice());
    Ok(FitResult {
        distribution,
        method: FitMethod::Test,
        rss: rss(&stand, &fitted),
        params: solution.params,
        covariance: solution.covariance,
        fitted,
        evaluations: solution.evaluations,
        iterations: solution.iterations,
    })
}

/// Test fit with expansion factors computed from the basal-area factor.
pub fn fit_test(
    distribution: Distribution,
    dbh: &[f64],
    tally: &[f64],
    baf: f64,
    options: &SolverOptions,
) -> Result<FitResult, DistFitError> {
    check_inputs(dbh, tally)?;
    let expansion = expansion_factors(dbh, baf)?;
    fit_test_with_expansion(distribution, dbh, tally, &expansion, options)
}

/// Size-biased Weibull fitted to raw tally.
pub fn fit_control_weibull(dbh: &[f64], tally: &[f64], order: f64) -> Result<FitResult, DistFitError> {
    fit_control(Distribution::Weibull, dbh, tally, order, &SolverOptions::default())
}

/// Size-biased Gamma fitted to raw tally.
pub fn fit_control_gamma(dbh: &[f64], tally: &[f64], order: f64) -> Result<FitResult, DistFitError> {
    fit_control(Distribution::Gamma, dbh, tally, order, &SolverOptions::default())
}

/// Weighted Weibull fitted to the stand table.
pub fn fit_test_weibull(dbh: &[f64], tally: &[f64], baf: f64) -> Result<FitResult, DistFitError> {
    fit_test(Distribution::Weibull, dbh, tally, baf, &SolverOptions::default())
}

/// Weighted Gamma fitted to the stand table.
pub fn fit_test_gamma(dbh: &[f64], tally: &[f64], baf: f64) -> Result<FitResult, DistFitError> {
    fit_test(Distribution::Gamma, dbh, tally, baf, &SolverOptions::default())
}

pub fn fit_test_weibull_with_expansion(
    dbh: &[f64],
    tally: &[f64],
    expansion: &[f64],
) -> Result<FitResult, DistFitError> {
    fit_test_with_expansion(
        Distribution::Weibull,
        dbh,
        tally,
        expansion,
        &SolverOptions::default(),
    )
}

pub fn fit_test_gamma_with_expansion(
    dbh: &[f64],
    tally: &[f64],
    expansion: &[f64],
) -> Result<FitResult, DistFitError> {
    fit_test_with_expansion(
        Distribution::Gamma,
        dbh,
        tally,
        expansion,
        &SolverOptions::default(),
    )
}
