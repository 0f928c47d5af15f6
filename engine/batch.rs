//! Batch pricing of applicant tables.
//!
//! Reads a CSV with one applicant per row, prices every row in parallel and writes a
//! tab-separated report. The header row names [`PredictionInput`] fields; columns left
//! out take the same defaults as the HTTP API.

use crate::features::PredictionInput;
use crate::service::{PredictionError, PredictionService, Quote};
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

pub const OUTPUT_HEADER: &str =
    "sample_id\tsegment\tnormalized_risk_score\tpredicted_premium\tpremium_tier";

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Failed to open input table '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Row {row} of the input table could not be read: {source}")]
    Record {
        row: usize,
        #[source]
        source: csv::Error,
    },
    #[error("Row {row} could not be priced: {source}")]
    Prediction {
        row: usize,
        #[source]
        source: PredictionError,
    },
    #[error("Failed to write predictions: {0}")]
    Io(#[from] io::Error),
}

/// Prices every row of the CSV at `input` and writes the report to `output`.
///
/// Returns the number of rows written. The first row that fails to parse or price
/// aborts the batch and nothing further is written.
pub fn infer_csv(
    service: &PredictionService,
    input: &Path,
    output: &Path,
) -> Result<usize, BatchError> {
    let reader = csv::Reader::from_path(input).map_err(|source| BatchError::Open {
        path: input.to_path_buf(),
        source,
    })?;
    let applicants = read_applicants(reader)?;
    log::info!(
        "Loaded {} applicants from {}",
        applicants.len(),
        input.display()
    );

    let started = Instant::now();
    let quotes = quote_all(service, &applicants)?;
    log::info!(
        "Priced {} applicants in {:.2?}",
        quotes.len(),
        started.elapsed()
    );

    let file = File::create(output)?;
    write_report(BufWriter::new(file), &quotes)?;
    Ok(quotes.len())
}

/// Deserializes every record. Row numbers are 1-based and exclude the header.
pub fn read_applicants<R: Read>(
    mut reader: csv::Reader<R>,
) -> Result<Vec<PredictionInput>, BatchError> {
    reader
        .deserialize()
        .enumerate()
        .map(|(i, record)| record.map_err(|source| BatchError::Record { row: i + 1, source }))
        .collect()
}

/// Prices all applicants on the rayon pool, keeping input order.
pub fn quote_all(
    service: &PredictionService,
    applicants: &[PredictionInput],
) -> Result<Vec<Quote>, BatchError> {
    let results: Vec<Result<Quote, PredictionError>> = applicants
        .par_iter()
        .map(|applicant| service.quote(applicant))
        .collect();

    results
        .into_iter()
        .enumerate()
        .map(|(i, result)| result.map_err(|source| BatchError::Prediction { row: i + 1, source }))
        .collect()
}

pub fn write_report<W: Write>(mut out: W, quotes: &[Quote]) -> io::Result<()> {
    writeln!(out, "{OUTPUT_HEADER}")?;
    for (i, quote) in quotes.iter().enumerate() {
        writeln!(
            out,
            "{}\t{}\t{}\t{:.2}\t{}",
            i + 1,
            quote.segment,
            quote.normalized_risk_score,
            quote.predicted_premium,
            quote.premium_tier
        )?;
    }
    out.flush()
}
