use std::path::Path;

use crate::error::DistFitError;
use crate::models::Dataset;

/// Read an observation table from JSON (`{"name": ..., "observations": [...]}`).
pub fn read_json(path: impl AsRef<Path>) -> Result<Dataset, DistFitError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let dataset: Dataset = serde_json::from_str(&content)?;
    for (row, obs) in dataset.observations.iter().enumerate() {
        obs.validate(row)?;
    }
    Ok(dataset)
}

/// Read an observation table from JSON bytes.
pub fn read_json_from_bytes(data: &[u8], name: &str) -> Result<Dataset, DistFitError> {
    let content = std::str::from_utf8(data)
        .map_err(|e| DistFitError::ParseError(format!("Invalid UTF-8: {e}")))?;
    let mut dataset: Dataset = serde_json::from_str(content)?;
    for (row, obs) in dataset.observations.iter().enumerate() {
        obs.validate(row)?;
    }
    dataset.name = name.to_string();
    Ok(dataset)
}

/// Write any serializable value as JSON.
pub fn write_json<T: serde::Serialize + ?Sized>(
    value: &T,
    path: impl AsRef<Path>,
    pretty: bool,
) -> Result<(), DistFitError> {
    let content = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    std::fs::write(path.as_ref(), content)?;
    Ok(())
}
