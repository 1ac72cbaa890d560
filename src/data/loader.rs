//! Remote CSV Loader Module
//! Downloads the case/death time-series tables and parses them with Polars.

use polars::prelude::*;
use std::io::Cursor;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to download {url}: {source}")]
    Download {
        url: String,
        source: reqwest::Error,
    },
    #[error("Failed to parse CSV: {0}")]
    CsvError(#[from] PolarsError),
}

/// Download a CSV dataset and load it into a DataFrame.
///
/// The source tables are wide (one column per calendar date), so schema
/// inference gets a generous sample size.
pub fn fetch_csv(url: &str) -> Result<DataFrame, LoaderError> {
    info!(url, "downloading CSV dataset");
    let body = download(url)?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(10000))
        .into_reader_with_file_handle(Cursor::new(body))
        .finish()?;

    debug!(rows = df.height(), columns = df.width(), "CSV loaded");
    Ok(df)
}

/// Download a URL into memory, following redirects.
pub fn download(url: &str) -> Result<Vec<u8>, LoaderError> {
    let response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|source| LoaderError::Download {
            url: url.to_string(),
            source,
        })?;
    let bytes = response.bytes().map_err(|source| LoaderError::Download {
        url: url.to_string(),
        source,
    })?;
    Ok(bytes.to_vec())
}
