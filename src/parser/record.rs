use crate::parser::fastq::RecordSpan;

/// A FASTQ record borrowed from the reader's buffer.
///
/// It is only valid until the next call to [`FastqReader::next`](crate::parser::FastqReader::next).
#[derive(Debug, Clone)]
pub struct FastqRecord<'a> {
    id: &'a [u8],
    seq: &'a [u8],
    qual: &'a [u8],
    line: u64,
}

impl<'a> FastqRecord<'a> {
    pub(crate) fn new(buffer: &'a [u8], span: &RecordSpan, line: u64) -> Self {
        Self {
            id: span.id(buffer),
            seq: span.seq(buffer),
            qual: span.qual(buffer),
            line,
        }
    }

    /// Returns the header line without the leading `@`
    #[inline]
    pub fn id(&self) -> &'a [u8] {
        self.id
    }

    #[inline]
    pub fn seq(&self) -> &'a [u8] {
        self.seq
    }

    /// Raw Phred+33 quality string
    #[inline]
    pub fn qual(&self) -> &'a [u8] {
        self.qual
    }

    #[inline]
    pub fn num_bases(&self) -> usize {
        self.seq.len()
    }

    /// Line number of the header line (starting with 1)
    #[inline]
    pub fn start_line_number(&self) -> u64 {
        self.line
    }
}
