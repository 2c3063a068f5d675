//! Fetches customs-declaration records from the open-data portal of the
//! Paraguayan customs (DNA) for a set of tariff positions and one year.
//!
//! Every position is fetched page by page on its own task, at most `WORKERS`
//! at a time, and the rows are flattened in the order the positions were given.

mod error;
mod macros;

pub mod config;
pub mod payload;
pub mod process;
pub mod request;

pub use error::{Error, Result};

/// A single customs-declaration row, passed through untouched.
pub type Record = serde_json::Value;

/// Rows requested per page.
pub const PER_PAGE: u64 = 1000;
pub const REQUEST_TIMEOUT_SECS: u64 = 90;
/// Number of positions fetched concurrently.
pub const WORKERS: usize = 5;
pub const DEFAULT_TEMPLATE_PATH: &str = "assets/aduana_py_payload.json";

pub const YEAR: &str = "2023";
pub const POSITIONS: [&str; 5] = [
    "3101.00.00",
    "3102.00.00",
    "3103.00.00",
    "3104.00.00",
    "3105.00.00",
];
