use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::error::DistFitError;

/// Model evaluation budget before a fit is declared non-convergent.
pub const DEFAULT_MAX_EVALUATIONS: usize = 200_000;

/// Tolerances and budget for [`curve_fit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions {
    /// Maximum number of model evaluations, Jacobian columns included.
    pub max_evaluations: usize,
    /// Relative reduction of the sum of squares considered negligible.
    pub ftol: f64,
    /// Relative parameter step considered negligible.
    pub xtol: f64,
    /// Scaled gradient norm considered zero.
    pub gtol: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
            ftol: 1.49012e-8,
            xtol: 1.49012e-8,
            gtol: 0.0,
        }
    }
}

/// Raw output of a converged solve.
#[derive(Debug, Clone)]
pub struct CurveFit {
    pub params: Vec<f64>,
    /// `k x k` covariance from the pseudo-inverse of `JᵀWJ`. Every entry is
    /// infinite when `n == k` or the estimate is not finite.
    pub covariance: Vec<Vec<f64>>,
    /// Sum of squared weighted residuals at the optimum.
    pub weighted_rss: f64,
    pub evaluations: usize,
    pub iterations: usize,
}

const LAMBDA_INITIAL: f64 = 1e-3;
const LAMBDA_MIN: f64 = 1e-12;
const LAMBDA_MAX: f64 = 1e16;

/// Fit `model(x, params)` to `y` by Levenberg-Marquardt least squares.
///
/// `sigma`, when given, holds one relative uncertainty per observation and
/// residuals are `(model(x) - y) / sigma`. The covariance is rescaled by the
/// reduced chi-square of the weighted residuals, i.e.
/// `(JᵀWJ)⁺ · RSS_w / (n - k)` with `W = diag(1 / sigma²)`.
pub fn curve_fit<M>(
    model: M,
    x: &[f64],
    y: &[f64],
    p0: &[f64],
    sigma: Option<&[f64]>,
    options: &SolverOptions,
) -> Result<CurveFit, DistFitError>
where
    M: Fn(&[f64], &[f64]) -> Vec<f64>,
{
    curve_fit_within(model, |_: &[f64]| true, x, y, p0, sigma, options)
}

/// [`curve_fit`] restricted to parameters accepted by `admissible`.
///
/// A trial step landing outside the admissible region is rejected like a
/// step that increases the sum of squares. `p0` must be admissible.
pub fn curve_fit_within<M, A>(
    model: M,
    admissible: A,
    x: &[f64],
    y: &[f64],
    p0: &[f64],
    sigma: Option<&[f64]>,
    options: &SolverOptions,
) -> Result<CurveFit, DistFitError>
where
    M: Fn(&[f64], &[f64]) -> Vec<f64>,
    A: Fn(&[f64]) -> bool,
{
    let n = x.len();
    let k = p0.len();

    if y.len() != n {
        return Err(DistFitError::Domain(format!(
            "x has {n} values but y has {}",
            y.len()
        )));
    }
    if n < k {
        return Err(DistFitError::InsufficientData(format!(
            "{n} observations for {k} free parameters"
        )));
    }
    if p0.iter().any(|v| !v.is_finite()) || !admissible(p0) {
        return Err(DistFitError::Domain(format!(
            "initial guess must be finite and admissible, got {p0:?}"
        )));
    }

    let inv_sigma: Vec<f64> = match sigma {
        Some(s) => {
            if s.len() != n {
                return Err(DistFitError::Domain(format!(
                    "sigma has {} values for {n} observations",
                    s.len()
                )));
            }
            if let Some(bad) = s.iter().find(|v| !v.is_finite() || **v <= 0.0) {
                return Err(DistFitError::Domain(format!(
                    "sigma must be positive and finite, got {bad}"
                )));
            }
            s.iter().map(|v| 1.0 / v).collect()
        }
        None => vec![1.0; n],
    };

    let residuals = |params: &[f64]| -> DVector<f64> {
        let predicted = model(x, params);
        DVector::from_iterator(
            n,
            predicted
                .iter()
                .zip(y)
                .zip(&inv_sigma)
                .map(|((f, yi), w)| (f - yi) * w),
        )
    };

    let mut params = DVector::from_column_slice(p0);
    let mut r = residuals(params.as_slice());
    let mut evaluations = 1usize;
    let mut cost = r.norm_squared();
    if !cost.is_finite() {
        return Err(DistFitError::Domain(
            "residuals are not finite at the initial guess".to_string(),
        ));
    }

    let mut lambda = LAMBDA_INITIAL;
    let mut iterations = 0usize;

    'outer: loop {
        if cost == 0.0 {
            break;
        }
        if evaluations + k > options.max_evaluations {
            return Err(exhausted(options.max_evaluations, iterations));
        }

        let jac = jacobian(&residuals, &params, &r);
        evaluations += k;
        let jtj = jac.tr_mul(&jac);
        let grad = jac.tr_mul(&r);
        let neg_grad = -grad.clone();

        let residual_norm = cost.sqrt();
        let scaled_gradient = (0..k)
            .map(|j| {
                let col_norm = jac.column(j).norm();
                if col_norm > 0.0 {
                    grad[j].abs() / (col_norm * residual_norm)
                } else {
                    0.0
                }
            })
            .fold(0.0, f64::max);
        if scaled_gradient <= options.gtol {
            break;
        }

        iterations += 1;

        loop {
            if evaluations >= options.max_evaluations {
                return Err(exhausted(options.max_evaluations, iterations));
            }

            let mut damped = jtj.clone();
            for j in 0..k {
                let d = jtj[(j, j)].max(f64::EPSILON);
                damped[(j, j)] += lambda * d;
            }

            let step = match damped.cholesky() {
                Some(chol) => chol.solve(&neg_grad),
                None => {
                    lambda *= 10.0;
                    if lambda > LAMBDA_MAX {
                        return Err(stalled(iterations));
                    }
                    continue;
                }
            };

            let step_norm = step.norm();
            let small_step = step_norm <= options.xtol * (params.norm() + options.xtol);

            let trial = &params + &step;
            let (r_trial, cost_trial) = if admissible(trial.as_slice()) {
                let r_trial = residuals(trial.as_slice());
                evaluations += 1;
                let cost_trial = r_trial.norm_squared();
                (r_trial, cost_trial)
            } else {
                (r.clone(), f64::INFINITY)
            };

            if cost_trial.is_finite() && cost_trial < cost {
                let linearized = (&r + &jac * &step).norm_squared();
                let actual = (cost - cost_trial) / cost;
                let predicted = ((cost - linearized) / cost).abs();

                params = trial;
                r = r_trial;
                cost = cost_trial;
                lambda = (lambda * 0.1).max(LAMBDA_MIN);

                if (actual <= options.ftol && predicted <= options.ftol) || small_step {
                    break 'outer;
                }
                break;
            }

            if small_step {
                break 'outer;
            }

            lambda *= 10.0;
            if lambda > LAMBDA_MAX {
                return Err(stalled(iterations));
            }
        }
    }

    let dof = n - k;
    let covariance = if dof > 0 {
        let jac = jacobian(&residuals, &params, &r);
        covariance_from_jacobian(&jac, cost / dof as f64)
    } else {
        vec![vec![f64::INFINITY; k]; k]
    };

    debug!(
        evaluations,
        iterations,
        weighted_rss = cost,
        params = ?params.as_slice(),
        "curve fit converged"
    );

    Ok(CurveFit {
        params: params.iter().copied().collect(),
        covariance,
        weighted_rss: cost,
        evaluations,
        iterations,
    })
}

fn exhausted(budget: usize, iterations: usize) -> DistFitError {
    DistFitError::Convergence(format!(
        "no convergence within {budget} model evaluations ({iterations} iterations)"
    ))
}

fn stalled(iterations: usize) -> DistFitError {
    DistFitError::Convergence(format!(
        "sum of squares cannot be reduced further after {iterations} iterations"
    ))
}

/// Forward-difference Jacobian of the residual vector.
fn jacobian<R>(residuals: &R, params: &DVector<f64>, r0: &DVector<f64>) -> DMatrix<f64>
where
    R: Fn(&[f64]) -> DVector<f64>,
{
    let eps = f64::EPSILON.sqrt();
    let mut jac = DMatrix::zeros(r0.len(), params.len());
    let mut shifted = params.clone();
    for j in 0..params.len() {
        let mut h = eps * params[j].abs();
        if h == 0.0 {
            h = eps;
        }
        shifted[j] = params[j] + h;
        let r1 = residuals(shifted.as_slice());
        jac.set_column(j, &((r1 - r0) / h));
        shifted[j] = params[j];
    }
    jac
}

/// `(JᵀJ)⁺ · variance` via the SVD of `J`, discarding negligible singular values.
fn covariance_from_jacobian(jac: &DMatrix<f64>, variance: f64) -> Vec<Vec<f64>> {
    let k = jac.ncols();
    let unavailable = || vec![vec![f64::INFINITY; k]; k];

    let svd = jac.clone().svd(false, true);
    let Some(v_t) = svd.v_t else {
        return unavailable();
    };
    let s_max = svd.singular_values.iter().copied().fold(0.0, f64::max);
    let threshold = f64::EPSILON * jac.nrows().max(k) as f64 * s_max;

    let mut cov = DMatrix::<f64>::zeros(k, k);
    for (i, &s) in svd.singular_values.iter().enumerate() {
        if s > threshold {
            let v = v_t.row(i).transpose();
            cov += (&v * v.transpose()) / (s * s);
        }
    }
    cov *= variance;

    if cov.iter().any(|v| !v.is_finite()) {
        return unavailable();
    }
    (0..k)
        .map(|i| (0..k).map(|j| cov[(i, j)]).collect())
        .collect()
}
