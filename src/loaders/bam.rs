//! Alignment loader. BAM is the expected input, SAM works through the same htslib reader.
use std::path::Path;

use rust_htslib::bam::record::{Aux, Cigar};
use rust_htslib::bam::{self, Read};

use crate::dataset::ReadSet;
use crate::errors::Error;
use crate::quality::average_quality;

use super::ensure_reads;

/// Whether the `@HD` header line declares `SO:coordinate`
pub fn is_coordinate_sorted(header: &[u8]) -> bool {
    header
        .split(|b| *b == b'\n')
        .find(|line| line.starts_with(b"@HD"))
        .map_or(false, |line| {
            line.split(|b| *b == b'\t')
                .any(|field| field == b"SO:coordinate")
        })
}

/// Mismatched and deleted reference bases recorded in an `MD` tag
pub fn md_edits(md: &str) -> u64 {
    md.bytes().filter(u8::is_ascii_alphabetic).count() as u64
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CigarSummary {
    /// query bases in M, I, = and X operations
    aligned: u64,
    inserted: u64,
    hard_clipped: u64,
}

fn summarize_cigar<'a>(ops: impl IntoIterator<Item = &'a Cigar>) -> CigarSummary {
    let mut summary = CigarSummary::default();
    for op in ops {
        match *op {
            Cigar::Match(len) | Cigar::Equal(len) | Cigar::Diff(len) => {
                summary.aligned += u64::from(len)
            }
            Cigar::Ins(len) => {
                summary.aligned += u64::from(len);
                summary.inserted += u64::from(len);
            }
            Cigar::HardClip(len) => summary.hard_clipped += u64::from(len),
            _ => {}
        }
    }
    summary
}

fn integer_aux(record: &bam::Record, tag: &[u8]) -> Option<u64> {
    match record.aux(tag).ok()? {
        Aux::U8(v) => Some(u64::from(v)),
        Aux::U16(v) => Some(u64::from(v)),
        Aux::U32(v) => Some(u64::from(v)),
        Aux::I8(v) => u64::try_from(v).ok(),
        Aux::I16(v) => u64::try_from(v).ok(),
        Aux::I32(v) => u64::try_from(v).ok(),
        _ => None,
    }
}

/// `100 * (1 - edits / aligned query bases)`, edits taken from `NM`, or from `MD` plus inserted
/// bases when `NM` is absent.
fn percent_identity(record: &bam::Record, cigar: &CigarSummary) -> Option<f64> {
    if cigar.aligned == 0 {
        return None;
    }
    let edits = match integer_aux(record, b"NM") {
        Some(nm) => nm,
        None => match record.aux(b"MD") {
            Ok(Aux::String(md)) => md_edits(md) + cigar.inserted,
            _ => return None,
        },
    };
    Some(100.0 * (1.0 - edits as f64 / cigar.aligned as f64))
}

// htslib fills missing qualities with 0xff
fn read_quality(qual: &[u8]) -> Option<f64> {
    match qual.first() {
        Some(0xff) | None => None,
        Some(_) => average_quality(qual),
    }
}

#[derive(Default)]
struct Columns {
    read_ids: Vec<String>,
    lengths: Vec<u64>,
    aligned_lengths: Vec<u64>,
    qualities: Vec<Option<f64>>,
    identities: Vec<Option<f64>>,
}

impl Columns {
    fn push(&mut self, record: &bam::Record) {
        let cigar = summarize_cigar(record.cigar().iter());
        self.read_ids
            .push(String::from_utf8_lossy(record.qname()).into_owned());
        self.lengths.push(record.seq_len() as u64 + cigar.hard_clipped);
        self.aligned_lengths.push(cigar.aligned);
        self.qualities.push(read_quality(record.qual()));
        self.identities.push(percent_identity(record, &cigar));
    }

    /// Optional columns are only kept when every alignment has a value
    fn into_read_set(self) -> ReadSet {
        let mut reads = ReadSet::new(self.lengths)
            .with_read_ids(self.read_ids)
            .with_aligned_lengths(self.aligned_lengths);
        match self.qualities.into_iter().collect::<Option<Vec<_>>>() {
            Some(qualities) => reads = reads.with_qualities(qualities),
            None => log::warn!("alignments without base qualities, skipping quality metrics"),
        }
        match self.identities.into_iter().collect::<Option<Vec<_>>>() {
            Some(identities) => reads = reads.with_percent_identity(identities),
            None => log::warn!("alignments without NM or MD tags, skipping percent identity"),
        }
        reads
    }
}

/// Loads primary and supplementary alignments from a coordinate sorted BAM file.
/// `threads` is handed to htslib for BGZF decompression.
pub fn load(path: &Path, threads: usize) -> Result<ReadSet, Error> {
    let htslib_error = |source| Error::Alignment {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = bam::Reader::from_path(path).map_err(htslib_error)?;
    if threads > 1 {
        reader.set_threads(threads).map_err(htslib_error)?;
    }
    if !is_coordinate_sorted(reader.header().as_bytes()) {
        return Err(Error::UnsortedAlignment(path.to_path_buf()));
    }

    let mut columns = Columns::default();
    let mut unmapped = 0u64;
    let mut secondary = 0u64;
    for record in reader.records() {
        let record = record.map_err(htslib_error)?;
        if record.is_unmapped() {
            unmapped += 1;
            continue;
        }
        if record.is_secondary() {
            secondary += 1;
            continue;
        }
        columns.push(&record);
    }
    log::info!("skipped {unmapped} unmapped and {secondary} secondary alignments");

    ensure_reads(columns.into_read_set(), path)
}
