use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed row in table: {0}")]
    Csv(#[from] csv::Error),
}

/// Deserializes every row of a headered CSV table. Surrounding whitespace in
/// fields is ignored and lines starting with `#` are comments.
pub fn read_table<T: DeserializeOwned>(reader: impl Read) -> Result<Vec<T>, TableError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);
    csv_reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(TableError::from)
}

/// Reads a table file; a missing file is an empty table.
pub fn read_table_from_path<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<Vec<T>, TableError> {
    match File::open(path) {
        Ok(file) => read_table(file),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}
