use std::path::Path;

use calamine::{open_workbook, Data, DataType, Reader, Xlsx};
use rust_xlsxwriter::Workbook;

use crate::error::DistFitError;
use crate::models::{Dataset, Observation};

const HEADERS: [&str; 5] = [
    "species_group",
    "cover_type",
    "dbh_cm",
    "tally",
    "expansion_factor",
];

fn column(header: &[Data], name: &str) -> Option<usize> {
    header
        .iter()
        .position(|c| c.to_string().trim().eq_ignore_ascii_case(name))
}

fn required_column(header: &[Data], name: &str) -> Result<usize, DistFitError> {
    column(header, name)
        .ok_or_else(|| DistFitError::Excel(format!("Missing required column '{name}'")))
}

/// Read a binned observation table from the first sheet of an `.xlsx` file.
///
/// Columns are located by header name, so their order does not matter.
pub fn read_excel(path: impl AsRef<Path>) -> Result<Dataset, DistFitError> {
    let path = path.as_ref();
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| DistFitError::Excel("No sheets found in workbook".to_string()))?;

    let range = workbook.worksheet_range(&sheet_name)?;
    let mut rows = range.rows();

    let header = rows
        .next()
        .ok_or_else(|| DistFitError::Excel(format!("Sheet '{sheet_name}' is empty")))?;
    let species_col = required_column(header, "species_group")?;
    let cover_col = required_column(header, "cover_type")?;
    let dbh_col = required_column(header, "dbh_cm")?;
    let tally_col = required_column(header, "tally")?;
    let ef_col = column(header, "expansion_factor");

    let mut observations = Vec::new();
    for (index, row) in rows.enumerate() {
        // Sheet row number, counting the header as row 1.
        let sheet_row = index + 2;
        if row.iter().all(|c| c.is_empty()) {
            continue;
        }

        let get_f64 = |idx: usize, field: &str| -> Result<f64, DistFitError> {
            row.get(idx).and_then(|c| c.as_f64()).ok_or_else(|| {
                DistFitError::ParseError(format!(
                    "Row {sheet_row}: '{field}' is not a number"
                ))
            })
        };
        let get_string = |idx: usize| -> String {
            row.get(idx)
                .map(|c| c.to_string().trim().to_string())
                .unwrap_or_default()
        };

        let obs = Observation {
            species_group: get_string(species_col),
            cover_type: get_string(cover_col),
            dbh_cm: get_f64(dbh_col, "dbh_cm")?,
            tally: get_f64(tally_col, "tally")?,
            expansion_factor: ef_col.and_then(|i| row.get(i)).and_then(|c| c.as_f64()),
        };
        obs.validate(sheet_row)?;
        observations.push(obs);
    }

    Ok(Dataset {
        name: path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Unknown".to_string()),
        observations,
    })
}

/// Write the observation table to an `.xlsx` file.
pub fn write_excel(dataset: &Dataset, path: impl AsRef<Path>) -> Result<(), DistFitError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }

    for (i, obs) in dataset.observations.iter().enumerate() {
        let row = i as u32 + 1;
        worksheet.write_string(row, 0, &obs.species_group)?;
        worksheet.write_string(row, 1, &obs.cover_type)?;
        worksheet.write_number(row, 2, obs.dbh_cm)?;
        worksheet.write_number(row, 3, obs.tally)?;
        if let Some(ef) = obs.expansion_factor {
            worksheet.write_number(row, 4, ef)?;
        }
    }

    workbook.save(path.as_ref())?;
    Ok(())
}
