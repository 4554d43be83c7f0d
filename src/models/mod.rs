mod dataset;
mod distribution;
mod fit_result;

pub use dataset::{Dataset, Observation, Stratum, StratumSeries};
pub use distribution::Distribution;
pub use fit_result::{FitMethod, FitResult, ResidualSpace};
