use std::io::Read;
use std::path::Path;

use crate::error::DistFitError;
use crate::models::{Dataset, Observation};

fn parse_csv_records<R: Read>(rdr: &mut csv::Reader<R>) -> Result<Vec<Observation>, DistFitError> {
    let mut observations = Vec::new();
    for (row, result) in rdr.deserialize().enumerate() {
        let obs: Observation = result?;
        obs.validate(row)?;
        observations.push(obs);
    }
    Ok(observations)
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).flexible(true).trim(csv::Trim::All);
    builder
}

/// Read a binned observation table from a CSV file.
///
/// Required columns: `species_group, cover_type, dbh_cm, tally`; an
/// `expansion_factor` column is optional.
pub fn read_csv(path: impl AsRef<Path>) -> Result<Dataset, DistFitError> {
    let path = path.as_ref();
    let mut rdr = reader_builder().from_path(path)?;
    let observations = parse_csv_records(&mut rdr)?;

    Ok(Dataset {
        name: path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Unknown".to_string()),
        observations,
    })
}

/// Read a binned observation table from CSV bytes.
pub fn read_csv_from_bytes(data: &[u8], name: &str) -> Result<Dataset, DistFitError> {
    let mut rdr = reader_builder().from_reader(data);
    let observations = parse_csv_records(&mut rdr)?;
    Ok(Dataset {
        name: name.to_string(),
        observations,
    })
}

/// Write the observation table to a CSV file.
pub fn write_csv(dataset: &Dataset, path: impl AsRef<Path>) -> Result<(), DistFitError> {
    let mut wtr = csv::Writer::from_path(path.as_ref())?;
    for obs in &dataset.observations {
        wtr.serialize(obs)?;
    }
    wtr.flush()?;
    Ok(())
}
