mod csv_io;
mod excel_io;
mod json_io;
mod report;

use std::path::Path;

use crate::analysis::ComparisonRecord;
use crate::error::DistFitError;
use crate::models::Dataset;

pub use csv_io::{read_csv, read_csv_from_bytes, write_csv};
pub use excel_io::{read_excel, write_excel};
pub use json_io::{read_json, read_json_from_bytes, write_json};
pub use report::{
    format_report_latex, format_scientific, write_report_csv, write_report_excel,
    write_report_latex, REPORT_COLUMNS,
};

/// Trait for reading a binned observation table from a file.
pub trait DatasetReader {
    fn read(&self, path: &Path) -> Result<Dataset, DistFitError>;
}

/// Trait for writing method comparison reports to a file.
pub trait ReportWriter {
    fn write(&self, records: &[ComparisonRecord], path: &Path) -> Result<(), DistFitError>;
}

/// CSV format reader/writer.
pub struct CsvFormat;

impl DatasetReader for CsvFormat {
    fn read(&self, path: &Path) -> Result<Dataset, DistFitError> {
        read_csv(path)
    }
}

impl ReportWriter for CsvFormat {
    fn write(&self, records: &[ComparisonRecord], path: &Path) -> Result<(), DistFitError> {
        write_report_csv(records, path)
    }
}

/// JSON format reader/writer.
#[derive(Default)]
pub struct JsonFormat {
    pub pretty: bool,
}

impl DatasetReader for JsonFormat {
    fn read(&self, path: &Path) -> Result<Dataset, DistFitError> {
        read_json(path)
    }
}

impl ReportWriter for JsonFormat {
    fn write(&self, records: &[ComparisonRecord], path: &Path) -> Result<(), DistFitError> {
        write_json(records, path, self.pretty)
    }
}

/// Excel (.xlsx) format reader/writer.
pub struct ExcelFormat;

impl DatasetReader for ExcelFormat {
    fn read(&self, path: &Path) -> Result<Dataset, DistFitError> {
        read_excel(path)
    }
}

impl ReportWriter for ExcelFormat {
    fn write(&self, records: &[ComparisonRecord], path: &Path) -> Result<(), DistFitError> {
        write_report_excel(records, path)
    }
}

/// LaTeX tabular writer.
pub struct LatexFormat;

impl ReportWriter for LatexFormat {
    fn write(&self, records: &[ComparisonRecord], path: &Path) -> Result<(), DistFitError> {
        write_report_latex(records, path)
    }
}

/// Pick a reader from the file extension.
pub fn reader_for(path: &Path) -> Result<Box<dyn DatasetReader>, DistFitError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => Ok(Box::new(CsvFormat)),
        "json" => Ok(Box::new(JsonFormat::default())),
        "xlsx" | "xls" => Ok(Box::new(ExcelFormat)),
        _ => Err(DistFitError::ParseError(format!(
            "Unsupported input format '{}': expected .csv, .json or .xlsx",
            path.display()
        ))),
    }
}

/// Read and validate a dataset, choosing the format from the extension.
pub fn read_dataset(path: impl AsRef<Path>) -> Result<Dataset, DistFitError> {
    let path = path.as_ref();
    let dataset = reader_for(path)?.read(path)?;
    dataset.validate()?;
    Ok(dataset)
}
