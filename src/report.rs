//! Summary statistics over a [`ReadSet`] and the report they are rendered into.
//!
//! The human readable report looks like
//!
//! ```text
//! General summary:
//! Number of reads:         3,524
//! Total bases:        21,632,167
//! ...
//! Number, percentage and megabases of reads above quality cutoffs
//! >Q5:	3,524 (100.0%) 21.6Mb
//! ...
//! ```
//!
//! The report is rendered in memory and written to a staging file next to its destination, which
//! is then renamed over it, so a failed write never leaves half a report behind.
use std::collections::HashSet;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::dataset::ReadSet;
use crate::errors::Error;
use crate::output::OutputDestination;
use crate::quality::average_of_qualities;

/// Reads with a mean quality strictly above each of these are counted
pub const QUALITY_CUTOFFS: [u8; 5] = [5, 7, 10, 12, 15];
const TOP_N: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Tsv,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopRead {
    pub length: u64,
    pub quality: f64,
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CutoffCount {
    pub cutoff: u8,
    pub reads: usize,
    pub percentage: f64,
    pub megabases: f64,
}

/// Metrics that need per-read qualities
#[derive(Debug, Clone, PartialEq)]
pub struct QualityStats {
    /// Mean computed on error probabilities
    pub mean: f64,
    pub median: f64,
    pub longest: Vec<TopRead>,
    pub highest_quality: Vec<TopRead>,
    pub cutoffs: Vec<CutoffCount>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub number_of_reads: usize,
    pub total_bases: u64,
    pub mean_length: f64,
    pub median_length: f64,
    pub stdev_length: f64,
    pub n50: u64,
    pub quality: Option<QualityStats>,
    pub bases_aligned: Option<u64>,
    pub fraction_aligned: Option<f64>,
    pub mean_identity: Option<f64>,
    pub median_identity: Option<f64>,
    pub active_channels: Option<usize>,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    match sorted.len() {
        0 => 0.0,
        n if n % 2 == 0 => (sorted[mid - 1] + sorted[mid]) / 2.0,
        _ => sorted[mid],
    }
}

fn stdev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / values.len() as f64).sqrt()
}

/// Smallest length such that reads at least that long hold half of `total` bases
fn n50(lengths: &[u64], total: u64) -> u64 {
    let mut sorted = lengths.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    let mut covered = 0;
    for length in sorted {
        covered += length;
        if covered * 2 >= total {
            return length;
        }
    }
    0
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

impl QualityStats {
    fn new(reads: &ReadSet, qualities: &[f64]) -> Self {
        let lengths = &reads.lengths;
        let top_read = |i: usize| TopRead {
            length: lengths[i],
            quality: qualities[i],
            id: reads.read_ids.as_ref().map(|ids| ids[i].clone()),
        };

        // stable sorts, ties stay in input order
        let mut order: Vec<usize> = (0..lengths.len()).collect();
        order.sort_by(|&a, &b| lengths[b].cmp(&lengths[a]));
        let longest = order.iter().take(TOP_N).map(|&i| top_read(i)).collect();

        let mut order: Vec<usize> = (0..lengths.len()).collect();
        order.sort_by(|&a, &b| qualities[b].total_cmp(&qualities[a]));
        let highest_quality = order.iter().take(TOP_N).map(|&i| top_read(i)).collect();

        let cutoffs = QUALITY_CUTOFFS
            .iter()
            .map(|&cutoff| {
                let (count, bases) = qualities
                    .iter()
                    .zip(lengths)
                    .filter(|(q, _)| **q > f64::from(cutoff))
                    .fold((0usize, 0u64), |(n, b), (_, &l)| (n + 1, b + l));
                CutoffCount {
                    cutoff,
                    reads: count,
                    percentage: percentage(count, lengths.len()),
                    megabases: bases as f64 / 1e6,
                }
            })
            .collect();

        QualityStats {
            mean: average_of_qualities(qualities).unwrap_or_default(),
            median: median(qualities),
            longest,
            highest_quality,
            cutoffs,
        }
    }
}

impl Stats {
    pub fn new(reads: &ReadSet) -> Self {
        let lengths: Vec<f64> = reads.lengths.iter().map(|&l| l as f64).collect();
        let total_bases: u64 = reads.lengths.iter().sum();
        let mean_length = mean(&lengths);

        let bases_aligned = reads
            .aligned_lengths
            .as_ref()
            .map(|aligned| aligned.iter().sum::<u64>());
        let fraction_aligned = bases_aligned.map(|aligned| {
            if total_bases == 0 {
                0.0
            } else {
                aligned as f64 / total_bases as f64
            }
        });

        Stats {
            number_of_reads: reads.len(),
            total_bases,
            mean_length,
            median_length: median(&lengths),
            stdev_length: stdev(&lengths, mean_length),
            n50: n50(&reads.lengths, total_bases),
            quality: reads
                .qualities
                .as_deref()
                .map(|qualities| QualityStats::new(reads, qualities)),
            bases_aligned,
            fraction_aligned,
            mean_identity: reads.percent_identity.as_deref().map(mean),
            median_identity: reads.percent_identity.as_deref().map(median),
            active_channels: reads
                .channels
                .as_ref()
                .map(|channels| channels.iter().collect::<HashSet<_>>().len()),
        }
    }

    /// General metrics in report order, optional ones only when present
    fn metrics(&self) -> Vec<Metric> {
        let mut metrics = vec![
            Metric::new(
                "number_of_reads",
                "Number of reads",
                Value::Count(self.number_of_reads as u64),
            ),
            Metric::new(
                "number_of_bases",
                "Total bases",
                Value::Count(self.total_bases),
            ),
            Metric::new(
                "mean_read_length",
                "Mean read length",
                Value::Decimal(self.mean_length),
            ),
            Metric::new(
                "median_read_length",
                "Median read length",
                Value::Decimal(self.median_length),
            ),
            Metric::new(
                "read_length_stdev",
                "STDEV read length",
                Value::Decimal(self.stdev_length),
            ),
            Metric::new("n50", "Read length N50", Value::Count(self.n50)),
        ];
        if let Some(quality) = &self.quality {
            metrics.push(Metric::new(
                "mean_qual",
                "Mean read quality",
                Value::Decimal(quality.mean),
            ));
            metrics.push(Metric::new(
                "median_qual",
                "Median read quality",
                Value::Decimal(quality.median),
            ));
        }
        if let (Some(bases), Some(fraction)) = (self.bases_aligned, self.fraction_aligned) {
            metrics.push(Metric::new(
                "bases_aligned",
                "Total bases aligned",
                Value::Count(bases),
            ));
            metrics.push(Metric::new(
                "percent_bases_aligned",
                "Percentage of bases aligned",
                Value::Percent(100.0 * fraction),
            ));
        }
        if let (Some(mean), Some(median)) = (self.mean_identity, self.median_identity) {
            metrics.push(Metric::new(
                "average_identity",
                "Average percent identity",
                Value::Decimal(mean),
            ));
            metrics.push(Metric::new(
                "median_identity",
                "Median percent identity",
                Value::Decimal(median),
            ));
        }
        if let Some(channels) = self.active_channels {
            metrics.push(Metric::new(
                "active_channels",
                "Active channels",
                Value::Count(channels as u64),
            ));
        }
        metrics
    }

    pub fn render(&self, format: ReportFormat) -> String {
        match format {
            ReportFormat::Text => TextReport(self).to_string(),
            ReportFormat::Tsv => TsvReport(self).to_string(),
        }
    }
}

enum Value {
    Count(u64),
    Decimal(f64),
    Percent(f64),
}

impl Value {
    fn human(&self) -> String {
        match self {
            Value::Count(n) => format_count(*n),
            Value::Decimal(x) => format_decimal(*x),
            Value::Percent(x) => format!("{x:.1}%"),
        }
    }

    fn raw(&self) -> String {
        match self {
            Value::Count(n) => n.to_string(),
            Value::Decimal(x) | Value::Percent(x) => format!("{x:.1}"),
        }
    }
}

struct Metric {
    key: &'static str,
    label: &'static str,
    value: Value,
}

impl Metric {
    fn new(key: &'static str, label: &'static str, value: Value) -> Self {
        Metric { key, label, value }
    }
}

fn group_digits(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut grouped = String::with_capacity(sign.len() + digits.len() + digits.len() / 3);
    grouped.push_str(sign);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// `1234567` as `1,234,567`
pub fn format_count(n: u64) -> String {
    group_digits(&n.to_string())
}

/// One decimal with thousands separators, `12345.67` as `12,345.7`
pub fn format_decimal(x: f64) -> String {
    let fixed = format!("{x:.1}");
    match fixed.split_once('.') {
        Some((int, frac)) => format!("{}.{frac}", group_digits(int)),
        None => fixed,
    }
}

fn write_top_read(
    f: &mut fmt::Formatter,
    rank: usize,
    first: &str,
    second: &str,
    id: Option<&str>,
) -> fmt::Result {
    write!(f, "{rank}:\t{first} ({second})")?;
    if let Some(id) = id {
        write!(f, "; {id}")?;
    }
    writeln!(f)
}

struct TextReport<'a>(&'a Stats);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let metrics = self.0.metrics();
        let values: Vec<String> = metrics.iter().map(|m| m.value.human()).collect();
        let label_width = metrics.iter().map(|m| m.label.len() + 1).max().unwrap_or(0);
        let value_width = values.iter().map(String::len).max().unwrap_or(0);

        writeln!(f, "General summary:")?;
        for (metric, value) in metrics.iter().zip(&values) {
            let label = format!("{}:", metric.label);
            writeln!(f, "{label:<label_width$} {value:>value_width$}")?;
        }

        let Some(quality) = &self.0.quality else {
            return Ok(());
        };
        writeln!(
            f,
            "Number, percentage and megabases of reads above quality cutoffs"
        )?;
        for cutoff in &quality.cutoffs {
            writeln!(
                f,
                ">Q{}:\t{} ({:.1}%) {}Mb",
                cutoff.cutoff,
                format_count(cutoff.reads as u64),
                cutoff.percentage,
                format_decimal(cutoff.megabases)
            )?;
        }
        writeln!(
            f,
            "Top {TOP_N} highest mean basecall quality scores and their read lengths"
        )?;
        for (i, read) in quality.highest_quality.iter().enumerate() {
            let quality = format_decimal(read.quality);
            let length = format_count(read.length);
            write_top_read(f, i + 1, &quality, &length, read.id.as_deref())?;
        }
        writeln!(
            f,
            "Top {TOP_N} longest reads and their mean basecall quality score"
        )?;
        for (i, read) in quality.longest.iter().enumerate() {
            let length = format_count(read.length);
            let quality = format_decimal(read.quality);
            write_top_read(f, i + 1, &length, &quality, read.id.as_deref())?;
        }
        Ok(())
    }
}

struct TsvReport<'a>(&'a Stats);

impl fmt::Display for TsvReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Metrics\tdataset")?;
        for metric in self.0.metrics() {
            writeln!(f, "{}\t{}", metric.key, metric.value.raw())?;
        }
        let Some(quality) = &self.0.quality else {
            return Ok(());
        };
        for cutoff in &quality.cutoffs {
            let q = cutoff.cutoff;
            writeln!(f, "reads_above_Q{q}\t{}", cutoff.reads)?;
            writeln!(f, "percentage_above_Q{q}\t{:.1}", cutoff.percentage)?;
            writeln!(f, "megabases_above_Q{q}\t{:.1}", cutoff.megabases)?;
        }
        for (i, read) in quality.highest_quality.iter().enumerate() {
            let rank = i + 1;
            writeln!(
                f,
                "highest_Q_read_{rank}\t{:.1} ({})",
                read.quality, read.length
            )?;
        }
        for (i, read) in quality.longest.iter().enumerate() {
            let rank = i + 1;
            writeln!(
                f,
                "longest_read_{rank}\t{} ({:.1})",
                read.length, read.quality
            )?;
        }
        Ok(())
    }
}

/// Hidden sibling of `path` the report is written to before being renamed into place
fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".partial");
    path.with_file_name(name)
}

fn write_file(path: &Path, report: &str) -> Result<(), Error> {
    let staging = staging_path(path);
    fs::write(&staging, report)
        .and_then(|_| fs::rename(&staging, path))
        .map_err(|source| {
            let _ = fs::remove_file(&staging);
            Error::Filesystem {
                path: path.to_path_buf(),
                source,
            }
        })
}

// A closed pipe (`nanostat ... -n stdout | head`) is not an error
fn write_stdout<W: Write>(mut out: W, report: &str) -> Result<(), Error> {
    match out.write_all(report.as_bytes()).and_then(|_| out.flush()) {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        result => result.map_err(Error::Stdout),
    }
}

/// Computes the statistics of `reads` and writes them to `destination` in one go.
pub fn write_report(
    reads: &ReadSet,
    destination: &OutputDestination,
    format: ReportFormat,
) -> Result<(), Error> {
    let report = Stats::new(reads).render(format);
    match destination {
        OutputDestination::Stdout => write_stdout(io::stdout().lock(), &report),
        OutputDestination::File(path) => {
            log::info!("writing report to {}", path.display());
            write_file(path, &report)
        }
    }
}
