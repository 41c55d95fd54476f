use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{Error, Result};
use crate::geo::haversine_km;

const FIELDS: [&str; 4] = ["lat1", "lon1", "lat2", "lon2"];

/// Reads a headed CSV of `lat1,lon1,lat2,lon2` rows and returns one distance
/// per row, in kilometers. Values are not range checked, so out-of-range input
/// flows through to [`haversine_km`] as-is.
pub fn read_pair_distances<R: Read>(reader: R) -> Result<Vec<f64>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true) // important: skip header line
        .flexible(true)
        .from_reader(reader);

    let mut distances = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let line = i + 1;
        if record.len() < FIELDS.len() {
            return Err(Error::ShortRow {
                line,
                expected: FIELDS.len(),
                got: record.len(),
            });
        }
        let mut values = [0.0_f64; 4];
        for ((slot, field), raw) in values.iter_mut().zip(FIELDS).zip(record.iter()) {
            let raw = raw.trim();
            *slot = raw.parse().map_err(|_| Error::InvalidField {
                line,
                field,
                value: raw.to_string(),
            })?;
        }
        distances.push(haversine_km(values[0], values[1], values[2], values[3]));
    }
    Ok(distances)
}

pub fn read_pair_distances_path<P: AsRef<Path>>(path: P) -> Result<Vec<f64>> {
    read_pair_distances(File::open(path)?)
}
