//! Per-read metrics produced by the loaders.

/// Column store of per-read metrics, one entry per read in every present column.
///
/// Only `lengths` is mandatory. The other columns exist when the data source provides them:
/// FASTQ gives qualities, alignments add read ids, aligned lengths and percent identity, run
/// summaries add read ids and channels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadSet {
    pub lengths: Vec<u64>,
    pub qualities: Option<Vec<f64>>,
    pub read_ids: Option<Vec<String>>,
    pub aligned_lengths: Option<Vec<u64>>,
    pub percent_identity: Option<Vec<f64>>,
    pub channels: Option<Vec<u32>>,
}

impl ReadSet {
    pub fn new(lengths: Vec<u64>) -> Self {
        Self {
            lengths,
            ..Default::default()
        }
    }

    pub fn with_qualities(mut self, qualities: Vec<f64>) -> Self {
        debug_assert_eq!(qualities.len(), self.lengths.len());
        self.qualities = Some(qualities);
        self
    }

    pub fn with_read_ids(mut self, read_ids: Vec<String>) -> Self {
        debug_assert_eq!(read_ids.len(), self.lengths.len());
        self.read_ids = Some(read_ids);
        self
    }

    pub fn with_aligned_lengths(mut self, aligned_lengths: Vec<u64>) -> Self {
        debug_assert_eq!(aligned_lengths.len(), self.lengths.len());
        self.aligned_lengths = Some(aligned_lengths);
        self
    }

    pub fn with_percent_identity(mut self, percent_identity: Vec<f64>) -> Self {
        debug_assert_eq!(percent_identity.len(), self.lengths.len());
        self.percent_identity = Some(percent_identity);
        self
    }

    pub fn with_channels(mut self, channels: Vec<u32>) -> Self {
        debug_assert_eq!(channels.len(), self.lengths.len());
        self.channels = Some(channels);
        self
    }

    /// Number of reads
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }
}
