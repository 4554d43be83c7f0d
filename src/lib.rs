pub mod analysis;
pub mod config;
pub mod distributions;
pub mod error;
pub mod fitting;
pub mod io;
pub mod models;
pub mod sampling;
pub mod visualization;

pub use analysis::{compare_methods, run_batch, ComparisonRecord, MethodComparison};
pub use config::Config;
pub use error::DistFitError;
pub use fitting::{resolve, MethodPair};
pub use io::{DatasetReader, ReportWriter};
pub use models::{Dataset, Distribution, FitMethod, FitResult, Observation, Stratum};
