use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("OSM pbf error: {0}")]
    Osm(#[from] osmpbfreader::Error),

    #[error("creating CSV {path}: {source}")]
    CreateOutput {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("line {line}: expected {expected} columns, got {got}")]
    ShortRow {
        line: usize,
        expected: usize,
        got: usize,
    },

    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("line {line}: invalid `{field}` value {value:?}")]
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("coordinate ({lat}, {lon}) is out of range")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("duplicate stop id `{0}`")]
    DuplicateStop(String),
}

pub type Result<T> = std::result::Result<T, Error>;
