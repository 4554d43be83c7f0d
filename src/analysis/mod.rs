mod batch;
mod comparison;
mod uncertainty;

pub use batch::{planned_meta_plots, run_batch, BatchFailure, BatchOutcome};
pub use comparison::{chi_square, compare_methods, ComparisonRecord, MethodComparison, PanelSeries};
pub use uncertainty::{parameter_estimates, ParameterEstimate};
