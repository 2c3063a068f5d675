use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Couldn't read the payload template at {path:?}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Payload template has an unexpected shape: {0}")]
    Structure(String),

    #[error("The API reported a failure: {0}")]
    Remote(String),
    #[error("The API response is missing data: {0}")]
    MalformedResponse(String),
    #[error(
        "Pagination stalled for position {position}: page {page} was empty with {fetched}/{total} rows fetched"
    )]
    StalledPagination {
        position: String,
        page: u64,
        fetched: u64,
        total: u64,
    },

    #[error("Tokio Join Error, couldn't await a task! {0}")]
    RuntimeJoin(#[from] tokio::task::JoinError),
    #[error("The worker pool was closed before a fetch could start.")]
    PoolClosed,

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl From<tokio::sync::AcquireError> for Error {
    fn from(_value: tokio::sync::AcquireError) -> Self {
        Error::PoolClosed
    }
}
