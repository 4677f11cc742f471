//! Headerless tab-separated input shared by the edge and prize loaders.

use std::io::Read;

use pcsf_common::ForestError;

pub(crate) fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(input)
}

/// 1-based line of a record, 0 when the reader could not tell.
pub(crate) fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

pub(crate) fn read_error(label: &str, err: csv::Error) -> ForestError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    ForestError::malformed(label, line, err.to_string())
}

pub(crate) fn parse_number(label: &str, line: u64, column: &str, raw: &str) -> Result<f64, ForestError> {
    let value: f64 = raw.parse().map_err(|_| {
        ForestError::malformed(label, line, format!("{column} '{raw}' is not a number"))
    })?;
    if !value.is_finite() {
        return Err(ForestError::malformed(
            label,
            line,
            format!("{column} '{raw}' must be finite"),
        ));
    }
    Ok(value)
}
