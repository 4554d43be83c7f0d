use std::path::Path;

use rust_xlsxwriter::Workbook;

use crate::analysis::ComparisonRecord;
use crate::error::DistFitError;

/// Column order of the method comparison report.
pub const REPORT_COLUMNS: [&str; 9] = [
    "species_group",
    "cover_type",
    "distribution",
    "sample_size",
    "rss_control",
    "rss_test",
    "rss_diff",
    "chisq_control",
    "chisq_test",
];

/// Write report rows as CSV with a header line.
pub fn write_report_csv(
    records: &[ComparisonRecord],
    path: impl AsRef<Path>,
) -> Result<(), DistFitError> {
    let mut wtr = csv::Writer::from_path(path.as_ref())?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Scientific notation with a signed two-digit exponent, e.g. `1.234e+05`.
pub fn format_scientific(value: f64) -> String {
    if !value.is_finite() {
        return if value.is_nan() {
            "NaN".to_string()
        } else if value > 0.0 {
            "inf".to_string()
        } else {
            "-inf".to_string()
        };
    }
    let raw = format!("{value:.3e}");
    match raw.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        None => raw,
    }
}

fn escape_latex(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '_' | '&' | '%' | '#' | '$' | '{' | '}' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Render report rows as a booktabs LaTeX tabular.
pub fn format_report_latex(records: &[ComparisonRecord]) -> String {
    let mut out = String::new();
    out.push_str("\\begin{tabular}{lllrrrrrr}\n\\toprule\n");
    let header: Vec<String> = REPORT_COLUMNS.iter().map(|c| escape_latex(c)).collect();
    out.push_str(&header.join(" & "));
    out.push_str(" \\\\\n\\midrule\n");

    for r in records {
        let cells = [
            escape_latex(&r.species_group),
            escape_latex(&r.cover_type),
            escape_latex(&r.distribution),
            r.sample_size.to_string(),
            format_scientific(r.rss_control),
            format_scientific(r.rss_test),
            format_scientific(r.rss_diff),
            format_scientific(r.chisq_control),
            format_scientific(r.chisq_test),
        ];
        out.push_str(&cells.join(" & "));
        out.push_str(" \\\\\n");
    }

    out.push_str("\\bottomrule\n\\end{tabular}\n");
    out
}

pub fn write_report_latex(
    records: &[ComparisonRecord],
    path: impl AsRef<Path>,
) -> Result<(), DistFitError> {
    std::fs::write(path.as_ref(), format_report_latex(records))?;
    Ok(())
}

/// Write report rows to a single-sheet `.xlsx` workbook.
pub fn write_report_excel(
    records: &[ComparisonRecord],
    path: impl AsRef<Path>,
) -> Result<(), DistFitError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("method_comparison")?;

    for (col, header) in REPORT_COLUMNS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }

    for (i, r) in records.iter().enumerate() {
        let row = i as u32 + 1;
        worksheet.write_string(row, 0, &r.species_group)?;
        worksheet.write_string(row, 1, &r.cover_type)?;
        worksheet.write_string(row, 2, &r.distribution)?;
        worksheet.write_number(row, 3, r.sample_size as f64)?;
        let numbers = [
            r.rss_control,
            r.rss_test,
            r.rss_diff,
            r.chisq_control,
            r.chisq_test,
        ];
        for (offset, value) in numbers.iter().enumerate() {
            if value.is_finite() {
                worksheet.write_number(row, 4 + offset as u16, *value)?;
            }
        }
    }

    workbook.save(path.as_ref())?;
    Ok(())
}
