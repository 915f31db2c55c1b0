use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("failed to read zip table {path}: {source}")]
    ZipTable {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("zip table {0} has no rows")]
    EmptyZipTable(String),

    #[error("cannot generate orders: no {0} available")]
    EmptyPool(&'static str),
}
