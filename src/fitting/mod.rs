mod engine;
mod registry;
mod solver;

pub use engine::{
    fit_control, fit_control_gamma, fit_control_weibull, fit_test, fit_test_gamma,
    fit_test_gamma_with_expansion, fit_test_weibull, fit_test_weibull_with_expansion,
    fit_test_with_expansion,
};
pub use registry::{resolve, ControlFit, MethodPair, TestFit, TestFitWithExpansion};
pub use solver::{curve_fit, curve_fit_within, CurveFit, SolverOptions, DEFAULT_MAX_EVALUATIONS};
