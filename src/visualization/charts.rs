use colored::Colorize;

use crate::analysis::{MethodComparison, PanelSeries};

const BAR_WIDTH: usize = 40;

fn scale(value: f64, max: f64) -> usize {
    if max > 0.0 && value.is_finite() && value > 0.0 {
        ((value / max) * BAR_WIDTH as f64).round().min(BAR_WIDTH as f64) as usize
    } else {
        0
    }
}

/// Format one panel: the observed series as a bar, with `C` marking the
/// control fit and `T` the test fit on the same scale.
pub fn format_panel(title: &str, unit: &str, panel: &PanelSeries) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", title.bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    if panel.dbh.is_empty() {
        output.push_str("  No data available.\n");
        return output;
    }

    let max = panel
        .observed
        .iter()
        .chain(&panel.control)
        .chain(&panel.test)
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0f64, f64::max);

    output.push_str(&format!(
        "  {:>8}  {:>10}  {:>10}  {:>10}  {}\n",
        "DBH (cm)", unit, "Control", "Test", "Observed █  Control C  Test T"
    ));
    output.push_str(&format!("  {}\n", "-".repeat(90)));

    for i in 0..panel.dbh.len() {
        let observed = panel.observed.get(i).copied().unwrap_or(0.0);
        let control = panel.control.get(i).copied().unwrap_or(f64::NAN);
        let test = panel.test.get(i).copied().unwrap_or(f64::NAN);

        let mut track: Vec<char> = vec![' '; BAR_WIDTH + 1];
        for cell in track.iter_mut().take(scale(observed, max)) {
            *cell = '\u{2588}';
        }
        if control.is_finite() {
            track[scale(control, max)] = 'C';
        }
        if test.is_finite() {
            let pos = scale(test, max);
            track[pos] = if track[pos] == 'C' { '*' } else { 'T' };
        }
        let track: String = track.into_iter().collect();

        output.push_str(&format!(
            "  {:>8.1}  {:>10.3}  {:>10.3}  {:>10.3}  {}\n",
            panel.dbh[i],
            observed,
            control,
            test,
            track.trim_end().cyan()
        ));
    }

    output
}

/// Format the tally-space and stand-table-space panels of a comparison.
pub fn format_comparison_chart(comparison: &MethodComparison) -> String {
    let record = &comparison.record;
    let heading = format!(
        "{} / {} ({})",
        record.species_group, record.cover_type, record.distribution
    );
    let mut output = format_panel(&format!("{heading}: HPS tally"), "Tally", &comparison.hps);
    output.push_str(&format_panel(
        &format!("{heading}: stand table"),
        "Stems/ha",
        &comparison.stand_table,
    ));
    output.push('\n');
    output
}

/// Print both panels of a comparison.
pub fn print_comparison_chart(comparison: &MethodComparison) {
    print!("{}", format_comparison_chart(comparison));
}
