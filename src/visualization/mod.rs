mod charts;
mod tables;

pub use charts::{format_comparison_chart, format_panel, print_comparison_chart};
pub use tables::{
    format_comparison_table, format_factors_table, format_fit_table, format_strata_table,
    print_comparison_table, print_factors_table, print_fit_table, print_strata_table,
};
