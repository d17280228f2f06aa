//! Streaming FASTQ reader.
//!
//! The buffer handling follows https://github.com/markschl/seq_io/blob/master/src/fastq.rs:
//! records are located inside a growable buffer and handed out as borrowed slices, so reading
//! does not allocate per record.

use std::io::{self, BufRead};

use memchr::memchr;

use crate::errors::{ErrorPosition, ParseError};
use crate::parser::record::FastqRecord;
use crate::parser::utils::{fill_buf, grow_to, trim_cr, BUFSIZE};

/// Offsets of the current record within the buffer.
/// `seq`, `sep` and `qual` are the first byte of their line, `end` is the newline closing the
/// quality line (or the buffer length for a last record without trailing newline).
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordSpan {
    start: usize,
    seq: usize,
    sep: usize,
    qual: usize,
    end: usize,
}

impl RecordSpan {
    #[inline]
    fn is_new(&self) -> bool {
        self.end == 0
    }

    #[inline]
    pub(crate) fn id<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        trim_cr(&buffer[self.start + 1..self.seq - 1])
    }

    #[inline]
    pub(crate) fn seq<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        trim_cr(&buffer[self.seq..self.sep - 1])
    }

    #[inline]
    pub(crate) fn qual<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        trim_cr(&buffer[self.qual..self.end])
    }
}

/// The next line start we still have to find for the current record
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
enum Pending {
    Sequence,
    Separator,
    Quality,
    End,
}

/// Parser for FASTQ files.
/// It does not handle decompression, use [`parse_fastq_file`](super::parse_fastq_file) for
/// files that may be compressed.
pub struct Reader<R: io::Read> {
    buf_reader: buffer_redux::BufReader<R>,
    span: RecordSpan,
    pending: Pending,
    line: u64,
    finished: bool,
}

impl<R> Reader<R>
where
    R: io::Read,
{
    /// Creates a new reader with the default buffer size of 64 KiB
    ///
    /// # Example:
    ///
    /// ```
    /// use nanostat::parser::FastqReader;
    /// let fastq = b"@id\nACGT\n+\nIIII";
    ///
    /// let mut reader = FastqReader::new(&fastq[..]);
    /// let record = reader.next().unwrap().unwrap();
    /// assert_eq!(record.id(), b"id")
    /// ```
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, BUFSIZE)
    }

    /// Creates a new reader with a given buffer capacity. The minimum allowed
    /// capacity is 3.
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        assert!(capacity >= 3);
        Self {
            buf_reader: buffer_redux::BufReader::with_capacity(capacity, reader),
            span: RecordSpan::default(),
            pending: Pending::Sequence,
            line: 1,
            finished: false,
        }
    }
}

impl<R> Reader<R>
where
    R: io::Read,
{
    #[inline]
    fn buffer(&self) -> &[u8] {
        self.buf_reader.buffer()
    }

    #[inline]
    fn next_line(&self, from: usize) -> Option<usize> {
        memchr(b'\n', &self.buffer()[from..]).map(|pos| from + pos + 1)
    }

    /// Finds the remaining lines of the current record, resuming at `self.pending`.
    /// Returns false if the buffer ends before the record does.
    fn locate(&mut self) -> Result<bool, ParseError> {
        if self.pending == Pending::Sequence {
            match self.next_line(self.span.start) {
                Some(p) => self.span.seq = p,
                None => return Ok(false),
            }
            self.pending = Pending::Separator;
        }

        if self.pending == Pending::Separator {
            match self.next_line(self.span.seq) {
                Some(p) => self.span.sep = p,
                None => return Ok(false),
            }
            self.pending = Pending::Quality;
        }

        if self.pending == Pending::Quality {
            match self.next_line(self.span.sep) {
                Some(p) => self.span.qual = p,
                None => return Ok(false),
            }
            self.pending = Pending::End;
        }

        match self.next_line(self.span.qual) {
            Some(p) => self.span.end = p - 1,
            None => return Ok(false),
        }
        self.pending = Pending::Sequence;

        self.validate()?;
        Ok(true)
    }

    /// Verify that the record is valid:
    /// - starts with @
    /// - separator line starts with +
    /// - quality and sequence have the same length
    fn validate(&mut self) -> Result<(), ParseError> {
        let buf = self.buffer();
        let start_byte = buf[self.span.start];
        if start_byte != b'@' {
            let position = self.error_position(0, false);
            self.finished = true;
            return Err(ParseError::new_invalid_start(start_byte, position));
        }

        let sep_byte = buf[self.span.sep];
        if sep_byte != b'+' {
            let position = self.error_position(2, true);
            self.finished = true;
            return Err(ParseError::new_invalid_separator(sep_byte, position));
        }

        // Quality characters themselves are checked when they get decoded
        let seq_len = self.span.seq(buf).len();
        let qual_len = self.span.qual(buf).len();
        if seq_len != qual_len {
            let position = self.error_position(0, true);
            self.finished = true;
            return Err(ParseError::new_unequal_length(seq_len, qual_len, position));
        }
        Ok(())
    }

    fn error_position(&self, line_offset: u64, parse_id: bool) -> ErrorPosition {
        let id = if parse_id && self.span.seq > self.span.start + 1 {
            let header = self.span.id(self.buffer());
            let name = header.split(|b| *b == b' ').next().unwrap_or(header);
            Some(String::from_utf8_lossy(name).into_owned())
        } else {
            None
        };
        ErrorPosition {
            line: self.line + line_offset,
            id,
        }
    }

    /// Called when the buffer ends in the middle of a record.
    /// Grows or compacts the buffer and reads more until the record is complete or EOF.
    fn refill(&mut self) -> Result<bool, ParseError> {
        loop {
            if self.buffer().len() < self.buf_reader.capacity() {
                return self.finish();
            }

            if self.span.start == 0 {
                // a single record does not fit
                self.grow();
            } else {
                self.make_room();
            }

            fill_buf(&mut self.buf_reader)?;

            if self.locate()? {
                return Ok(true);
            }
        }
    }

    /// EOF reached. Returns whether one last record (without trailing newline) is available.
    fn finish(&mut self) -> Result<bool, ParseError> {
        self.finished = true;
        if self.pending == Pending::End {
            self.span.end = self.buffer().len();
            self.validate()?;
            return Ok(true);
        }

        // blank lines at the end of the file are fine
        let rest = &self.buffer()[self.span.start..];
        if rest.split(|c| *c == b'\n').all(|l| trim_cr(l).is_empty()) {
            return Ok(false);
        }

        Err(ParseError::new_unexpected_end(self.error_position(
            self.pending as u64,
            self.pending > Pending::Sequence,
        )))
    }

    fn grow(&mut self) {
        let cap = self.buf_reader.capacity();
        self.buf_reader.reserve(grow_to(cap) - cap);
    }

    // Drop the records already returned and move the partial one to the front
    fn make_room(&mut self) {
        let consumed = self.span.start;
        self.buf_reader.consume(consumed);
        self.buf_reader.make_room();

        self.span.start = 0;
        if self.pending > Pending::Sequence {
            self.span.seq -= consumed;
        }
        if self.pending > Pending::Separator {
            self.span.sep -= consumed;
        }
        if self.pending > Pending::Quality {
            self.span.qual -= consumed;
        }
    }

    /// Gets the next record in the stream, `None` once EOF is reached.
    /// Records borrow the reader so this cannot be an `Iterator`.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<Result<FastqRecord<'_>, ParseError>> {
        if self.finished {
            return None;
        }

        if self.buffer().is_empty() {
            match fill_buf(&mut self.buf_reader) {
                Ok(0) => {
                    self.finished = true;
                    return None;
                }
                Ok(_) => {}
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
            }
        }

        if !self.span.is_new() {
            self.line += 4;
            self.span.start = self.span.end + 1;
        }

        let complete = match self.locate() {
            Ok(c) => c,
            Err(e) => return Some(Err(e)),
        };

        if !complete {
            match self.refill() {
                Ok(true) => {}
                Ok(false) => return None,
                Err(e) => return Some(Err(e)),
            }
        }

        Some(Ok(FastqRecord::new(self.buffer(), &self.span, self.line)))
    }
}
