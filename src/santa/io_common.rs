// Helpers shared by the CSV readers.

use std::io::Read;

use csv::{StringRecord, StringRecordsIntoIter};

use crate::santa::*;

/// Opens the records of an upload and returns its header row along with the
/// remaining records.
pub fn get_records<R: Read>(
    input: R,
    upload: Upload,
) -> SantaResult<(StringRecord, StringRecordsIntoIter<R>)> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(input);
    let headers = rdr
        .headers()
        .context(CsvParseSnafu { upload, lineno: 1u64 })?
        .clone();
    debug!("get_records: {} headers: {:?}", upload, headers);
    Ok((headers, rdr.into_records()))
}

/// Position of a named column in the header row.
pub fn find_column(headers: &StringRecord, name: &str, upload: Upload) -> SantaResult<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .context(MissingColumnSnafu {
            upload,
            column: name,
        })
}

pub fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).map(|s| s.trim()).unwrap_or("")
}

pub fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|s| s.trim().is_empty())
}

/// Line of a record in the original text, starting at 1 for the header.
pub fn line_of(record: &StringRecord, fallback: u64) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(fallback)
}

/// Line at which the reader failed, when the error carries it.
pub fn error_line(err: &csv::Error, fallback: u64) -> u64 {
    err.position().map(|p| p.line()).unwrap_or(fallback)
}
