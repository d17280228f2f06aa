//! Run summary loader.
use std::path::Path;
use std::str::FromStr;

use crate::config::ReadType;
use crate::dataset::ReadSet;
use crate::errors::Error;
use crate::parser::open_decompressed;

use super::ensure_reads;

const READ_ID: &str = "read_id";
const CHANNEL: &str = "channel";

fn column_index(headers: &csv::StringRecord, column: &str, path: &Path) -> Result<usize, Error> {
    headers
        .iter()
        .position(|header| header == column)
        .ok_or_else(|| Error::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        })
}

fn field<T: FromStr>(
    record: &csv::StringRecord,
    index: usize,
    column: &str,
    path: &Path,
) -> Result<T, Error> {
    let value = record.get(index).unwrap_or_default();
    value.trim().parse().map_err(|_| Error::InvalidField {
        path: path.to_path_buf(),
        line: record.position().map_or(0, |pos| pos.line()),
        column: column.to_string(),
        value: value.to_string(),
    })
}

/// Loads read ids, lengths, mean qualities and channels for `read_type` from a tab separated
/// run summary. Rows with a length of zero are dropped.
pub fn load(path: &Path, read_type: ReadType) -> Result<ReadSet, Error> {
    let summary_error = |source| Error::Summary {
        path: path.to_path_buf(),
        source,
    };
    let input = open_decompressed(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_reader(input);

    let headers = reader.headers().map_err(summary_error)?.clone();
    let length_column = read_type.length_column();
    let quality_column = read_type.quality_column();
    let read_id = column_index(&headers, READ_ID, path)?;
    let channel = column_index(&headers, CHANNEL, path)?;
    let length = column_index(&headers, length_column, path)?;
    let quality = column_index(&headers, quality_column, path)?;
    log::info!("reading {read_type} reads from columns {length_column} and {quality_column}");

    let mut read_ids = Vec::new();
    let mut lengths = Vec::new();
    let mut qualities = Vec::new();
    let mut channels = Vec::new();
    let mut zero_length = 0usize;
    for record in reader.records() {
        let record = record.map_err(summary_error)?;
        let read_length: u64 = field(&record, length, length_column, path)?;
        if read_length == 0 {
            zero_length += 1;
            continue;
        }
        lengths.push(read_length);
        qualities.push(field(&record, quality, quality_column, path)?);
        channels.push(field(&record, channel, CHANNEL, path)?);
        read_ids.push(record.get(read_id).unwrap_or_default().to_string());
    }
    if zero_length > 0 {
        log::info!("dropped {zero_length} rows without {read_type} sequence");
    }

    ensure_reads(
        ReadSet::new(lengths)
            .with_qualities(qualities)
            .with_read_ids(read_ids)
            .with_channels(channels),
        path,
    )
}
