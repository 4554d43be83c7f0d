use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, ContentArrangement, Table};

use crate::analysis::{ComparisonRecord, ParameterEstimate};
use crate::models::{Dataset, FitResult, ResidualSpace};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn fmt_value(v: f64) -> String {
    if !v.is_finite() {
        "inf".to_string()
    } else if v != 0.0 && (v.abs() >= 1e5 || v.abs() < 1e-3) {
        format!("{v:.3e}")
    } else {
        format!("{v:.4}")
    }
}

/// Format the parameters of a single fit as a string.
pub fn format_fit_table(fit: &FitResult, estimates: &[ParameterEstimate]) -> String {
    let mut output = String::new();
    let title = format!(
        "{} fit ({}, {})",
        fit.distribution,
        fit.method.label(),
        match fit.residual_space() {
            ResidualSpace::Tally => "tally space",
            ResidualSpace::StandTable => "stand-table space",
        }
    );
    output.push_str(&format!("\n{}\n", title.bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    let confidence = estimates
        .first()
        .map(|e| format!("{:.0}%", e.confidence_level * 100.0))
        .unwrap_or_else(|| "CI".to_string());
    let lower = format!("Lower {confidence}");
    let upper = format!("Upper {confidence}");
    let mut table = new_table(vec!["Parameter", "Estimate", "Std Error", lower.as_str(), upper.as_str()]);

    for est in estimates {
        table.add_row(vec![
            Cell::new(&est.name),
            Cell::new(fmt_value(est.value)),
            Cell::new(fmt_value(est.std_error)),
            Cell::new(fmt_value(est.lower)),
            Cell::new(fmt_value(est.upper)),
        ]);
    }

    output.push_str(&format!("{table}\n"));
    output.push_str(&format!(
        "  RSS: {}   n: {}   evaluations: {}   iterations: {}\n",
        fmt_value(fit.rss),
        fit.num_observations(),
        fit.evaluations,
        fit.iterations
    ));
    output
}

/// Print the parameters of a single fit.
pub fn print_fit_table(fit: &FitResult, estimates: &[ParameterEstimate]) {
    print!("{}", format_fit_table(fit, estimates));
}

/// Format method comparison records as a string.
pub fn format_comparison_table(records: &[ComparisonRecord]) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Method Comparison".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    let mut table = new_table(vec![
        "Species",
        "Cover",
        "Distribution",
        "n",
        "RSS control",
        "RSS test",
        "RSS diff",
        "χ² control",
        "χ² test",
    ]);

    for r in records {
        table.add_row(vec![
            Cell::new(&r.species_group),
            Cell::new(&r.cover_type),
            Cell::new(&r.distribution),
            Cell::new(r.sample_size),
            Cell::new(fmt_value(r.rss_control)),
            Cell::new(fmt_value(r.rss_test)),
            Cell::new(fmt_value(r.rss_diff)),
            Cell::new(fmt_value(r.chisq_control)),
            Cell::new(fmt_value(r.chisq_test)),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print method comparison records.
pub fn print_comparison_table(records: &[ComparisonRecord]) {
    print!("{}", format_comparison_table(records));
}

/// Format a per-stratum overview of a dataset as a string.
pub fn format_strata_table(dataset: &Dataset) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", format!("Strata in {}", dataset.name).bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    let mut table = new_table(vec![
        "Species",
        "Cover",
        "Classes",
        "Trees",
        "DBH min (cm)",
        "DBH max (cm)",
        "Precomputed EF",
    ]);

    for (species, cover) in dataset.strata() {
        let Ok(stratum) = dataset.stratum(&species, &cover) else {
            continue;
        };
        let dbh = stratum.dbh();
        let min = dbh.iter().copied().fold(f64::INFINITY, f64::min);
        let max = dbh.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        table.add_row(vec![
            Cell::new(&species),
            Cell::new(&cover),
            Cell::new(stratum.observations.len()),
            Cell::new(stratum.sample_size()),
            Cell::new(format!("{min:.1}")),
            Cell::new(format!("{max:.1}")),
            Cell::new(if stratum.has_precomputed_expansion() { "yes" } else { "no" }),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print a per-stratum overview of a dataset.
pub fn print_strata_table(dataset: &Dataset) {
    print!("{}", format_strata_table(dataset));
}

/// Format expansion and compression factors per diameter as a string.
pub fn format_factors_table(dbh: &[f64], expansion: &[f64], baf: f64) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "\n{}\n",
        format!("Point Sampling Factors (BAF {baf})").bold().green()
    ));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    let mut table = new_table(vec!["DBH (cm)", "Expansion (stems/ha)", "Compression"]);
    for (d, e) in dbh.iter().zip(expansion) {
        table.add_row(vec![
            Cell::new(format!("{d:.1}")),
            Cell::new(format!("{e:.3}")),
            Cell::new(format!("{:.6}", 1.0 / e)),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print expansion and compression factors per diameter.
pub fn print_factors_table(dbh: &[f64], expansion: &[f64], baf: f64) {
    print!("{}", format_factors_table(dbh, expansion, baf));
}
