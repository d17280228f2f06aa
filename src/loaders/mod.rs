//! Production loaders for the three data sources.
use std::path::Path;

use crate::config::ReadType;
use crate::dataset::ReadSet;
use crate::dispatch::Loader;
use crate::errors::Error;

pub mod bam;
pub mod fastq;
pub mod summary;

/// Reads inputs from disk with the parsers in this crate and htslib.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeLoader;

impl Loader for NativeLoader {
    fn load_fastq(&self, path: &Path, threads: usize) -> Result<ReadSet, Error> {
        fastq::load(path, threads)
    }

    fn load_bam(&self, path: &Path, threads: usize) -> Result<ReadSet, Error> {
        bam::load(path, threads)
    }

    fn load_summary(&self, path: &Path, read_type: ReadType) -> Result<ReadSet, Error> {
        summary::load(path, read_type)
    }
}

fn ensure_reads(reads: ReadSet, path: &Path) -> Result<ReadSet, Error> {
    if reads.is_empty() {
        return Err(Error::EmptyDataset(path.to_path_buf()));
    }
    log::info!("collected metrics for {} reads", reads.len());
    Ok(reads)
}
