//! CSV ingestion into table frames.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use sws_model::TableFrame;

use crate::error::{Result, TableError};

/// Read CSV with a header row into a frame.
///
/// Records shorter than the header are padded with empty cells and longer
/// ones are cut to the header width, so the frame is always rectangular.
pub fn read_csv_frame<R: Read>(reader: R) -> Result<TableFrame> {
    read_frame(reader, None)
}

/// Read a CSV file into a frame.
pub fn read_csv_file(path: &Path) -> Result<TableFrame> {
    let file = File::open(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let frame = read_frame(file, Some(path))?;
    tracing::info!(
        path = %path.display(),
        rows = frame.row_count(),
        columns = frame.columns.len(),
        "CSV loaded"
    );
    Ok(frame)
}

fn read_frame<R: Read>(reader: R, path: Option<&Path>) -> Result<TableFrame> {
    let csv_error = |source| TableError::Csv {
        path: path.map(Path::to_path_buf),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim_matches('\u{feff}').trim().to_string())
        .collect();
    let width = columns.len();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(csv_error)?;
        if record.len() != width {
            tracing::debug!(row = index, cells = record.len(), width, "reshaping ragged CSV record");
        }
        let mut row: Vec<String> = record.iter().take(width).map(str::to_string).collect();
        row.resize(width, String::new());
        rows.push(row);
    }
    Ok(TableFrame::new(columns, rows))
}
