//! FASTQ loader: read length and mean quality per read.
use std::path::Path;

use rayon::prelude::*;

use crate::dataset::ReadSet;
use crate::errors::{Error, ErrorPosition, ParseError};
use crate::parser::parse_fastq_file;
use crate::quality::{average_quality, decode_phred};

use super::ensure_reads;

// Records are parsed sequentially and their qualities decoded in parallel, this many at a time
const BATCH_SIZE: usize = 4096;

struct PendingRead {
    line: u64,
    qual: Vec<u8>,
}

impl PendingRead {
    /// Length and mean quality, `None` for an empty read
    fn metrics(&self) -> Result<Option<(u64, f64)>, ParseError> {
        let scores = decode_phred(&self.qual).map_err(|err| {
            ParseError::new_invalid_quality(
                err,
                ErrorPosition {
                    line: self.line + 3,
                    id: None,
                },
            )
        })?;
        Ok(average_quality(&scores).map(|q| (scores.len() as u64, q)))
    }
}

#[derive(Default)]
struct Columns {
    lengths: Vec<u64>,
    qualities: Vec<f64>,
}

impl Columns {
    fn absorb(
        &mut self,
        pool: &rayon::ThreadPool,
        batch: &mut Vec<PendingRead>,
    ) -> Result<(), ParseError> {
        let metrics = pool.install(|| {
            batch
                .par_iter()
                .map(PendingRead::metrics)
                .collect::<Result<Vec<_>, _>>()
        })?;
        for (length, quality) in metrics.into_iter().flatten() {
            self.lengths.push(length);
            self.qualities.push(quality);
        }
        batch.clear();
        Ok(())
    }
}

/// Loads a plain or compressed FASTQ file. Empty reads are skipped.
pub fn load(path: &Path, threads: usize) -> Result<ReadSet, Error> {
    let parse_error = |source| Error::Parse {
        path: path.to_path_buf(),
        source,
    };
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()?;
    let mut reader = parse_fastq_file(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut columns = Columns::default();
    let mut batch = Vec::with_capacity(BATCH_SIZE);
    let mut records = 0usize;
    while let Some(record) = reader.next() {
        let record = record.map_err(parse_error)?;
        records += 1;
        batch.push(PendingRead {
            line: record.start_line_number(),
            qual: record.qual().to_vec(),
        });
        if batch.len() == BATCH_SIZE {
            columns.absorb(&pool, &mut batch).map_err(parse_error)?;
        }
    }
    columns.absorb(&pool, &mut batch).map_err(parse_error)?;

    let skipped = records - columns.lengths.len();
    if skipped > 0 {
        log::warn!("skipped {skipped} empty reads");
    }
    ensure_reads(
        ReadSet::new(columns.lengths).with_qualities(columns.qualities),
        path,
    )
}
