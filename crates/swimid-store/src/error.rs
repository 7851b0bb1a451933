use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error reading {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
    #[error("{file}: missing required column {column:?}")]
    MissingColumn { file: String, column: String },
    #[error("{file} row {row}: invalid date {value:?} (registry dates must be YYYY-MM-DD)")]
    InvalidDate {
        file: String,
        row: usize,
        value: String,
    },
    #[error("{file} row {row}: invalid id {value:?}")]
    InvalidId {
        file: String,
        row: usize,
        value: String,
    },
    #[error("{file} row {row}: invalid nation code {value:?}")]
    InvalidNation {
        file: String,
        row: usize,
        value: String,
    },
    #[error("{file} row {row}: unknown target table {value:?} (expected \"athlete\" or \"foreign\")")]
    UnknownTargetTable {
        file: String,
        row: usize,
        value: String,
    },
    #[error("duplicate athlete id {0}")]
    DuplicateAthleteId(u32),
    #[error("duplicate foreign athlete id {0}")]
    DuplicateForeignId(u32),
}

pub type Result<T> = std::result::Result<T, StoreError>;
