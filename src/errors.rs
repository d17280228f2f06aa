//! The errors nanostat can return.
//!
//! [`ParseError`] is specific to FASTQ parsing and carries the position of the offending record.
//! [`Error`] is the crate-wide error that every loader, the output resolver and the report
//! writer return.

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Represents where we were in a file when an error occurred.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorPosition {
    /// Line number where the error occurred (starting with 1)
    pub line: u64,
    /// ID of record if available
    pub id: Option<String>,
}

impl fmt::Display for ErrorPosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(id) = self.id.as_ref() {
            write!(f, "record '{id}' at ")?;
        }
        write!(f, "line {}", self.line)
    }
}

/// The type of error that occured during FASTQ parsing
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// An error happened during file/stream input/output
    Io,
    /// Invalid start byte of record encountered (expected `@`)
    InvalidStart,
    /// The separator line is not valid (no `+`)
    InvalidSeparator,
    /// Sequence and quality lengths are not equal
    UnequalLengths,
    /// A quality character below the Phred+33 offset
    InvalidQuality,
    /// Truncated record found
    UnexpectedEnd,
}

/// Error raised while reading a FASTQ stream
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    /// A description of what went wrong
    pub msg: String,
    /// The type of error that occurred
    pub kind: ParseErrorKind,
    /// Position within file
    pub position: ErrorPosition,
}

impl ParseError {
    pub fn new_invalid_start(byte_found: u8, position: ErrorPosition) -> Self {
        let msg = format!(
            "Expected '@' but found '{}'",
            (byte_found as char).escape_default()
        );
        Self {
            kind: ParseErrorKind::InvalidStart,
            msg,
            position,
        }
    }

    pub fn new_invalid_separator(byte_found: u8, position: ErrorPosition) -> Self {
        let msg = format!(
            "Expected '+' separator but found '{}'",
            (byte_found as char).escape_default()
        );
        Self {
            kind: ParseErrorKind::InvalidSeparator,
            msg,
            position,
        }
    }

    pub fn new_unequal_length(seq_len: usize, qual_len: usize, position: ErrorPosition) -> Self {
        let msg = format!(
            "Sequence length is {} but quality length is {}",
            seq_len, qual_len
        );
        Self {
            kind: ParseErrorKind::UnequalLengths,
            msg,
            position,
        }
    }

    pub fn new_invalid_quality(err: PhredOffsetError, position: ErrorPosition) -> Self {
        Self {
            msg: err.to_string(),
            kind: ParseErrorKind::InvalidQuality,
            position,
        }
    }

    pub fn new_unexpected_end(position: ErrorPosition) -> Self {
        Self {
            msg: String::new(),
            kind: ParseErrorKind::UnexpectedEnd,
            position,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ParseErrorKind::Io => write!(f, "I/O error: {}", self.msg),
            ParseErrorKind::UnequalLengths
            | ParseErrorKind::InvalidStart
            | ParseErrorKind::InvalidSeparator
            | ParseErrorKind::InvalidQuality => write!(f, "{} ({})", self.msg, self.position),
            ParseErrorKind::UnexpectedEnd => {
                write!(f, "Unexpected end of input ({}).", self.position)
            }
        }
    }
}

impl From<io::Error> for ParseError {
    fn from(err: io::Error) -> Self {
        Self {
            msg: err.to_string(),
            kind: ParseErrorKind::Io,
            position: ErrorPosition::default(),
        }
    }
}

impl StdError for ParseError {}

/// A quality character that falls below the Phred offset
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhredOffsetError {
    pub q: u8,
    pub offset: u8,
}

impl fmt::Display for PhredOffsetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Quality character '{}' is below the Phred offset '{}'",
            (self.q as char).escape_default(),
            self.offset as char
        )
    }
}

impl StdError for PhredOffsetError {}

/// Everything that can go wrong between parsing the command line and writing the report.
///
/// `Configuration` covers invalid invocations, `Filesystem` and `Stdout` cover the output side and
/// all the other variants are data loading failures. None of them are recovered from.
#[derive(Debug)]
pub enum Error {
    /// Missing, conflicting or invalid options
    Configuration(String),
    /// The output directory or report file could not be created
    Filesystem { path: PathBuf, source: io::Error },
    /// The report could not be written to standard output
    Stdout(io::Error),
    /// An input file could not be opened or read
    Io { path: PathBuf, source: io::Error },
    /// Malformed FASTQ input
    Parse { path: PathBuf, source: ParseError },
    /// htslib failed to open or decode an alignment file
    Alignment {
        path: PathBuf,
        source: rust_htslib::errors::Error,
    },
    /// The alignment header does not declare coordinate sorting
    UnsortedAlignment(PathBuf),
    /// Malformed run summary table
    Summary { path: PathBuf, source: csv::Error },
    /// A run summary lacks a column required for the requested read type
    MissingColumn { path: PathBuf, column: String },
    /// A run summary cell could not be parsed
    InvalidField {
        path: PathBuf,
        line: u64,
        column: String,
        value: String,
    },
    /// The worker pool for per-read metrics could not be started
    ThreadPool(rayon::ThreadPoolBuildError),
    /// No reads left to summarize
    EmptyDataset(PathBuf),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Configuration(msg) => write!(f, "invalid configuration: {msg}"),
            Error::Filesystem { path, source } => {
                write!(f, "cannot create '{}': {source}", path.display())
            }
            Error::Stdout(err) => write!(f, "cannot write report to stdout: {err}"),
            Error::Io { path, source } => write!(f, "cannot read '{}': {source}", path.display()),
            Error::Parse { path, source } => {
                write!(f, "invalid FASTQ file '{}': {source}", path.display())
            }
            Error::Alignment { path, source } => {
                write!(f, "invalid alignment file '{}': {source}", path.display())
            }
            Error::UnsortedAlignment(path) => write!(
                f,
                "alignment file '{}' is not sorted by coordinate, please sort it first",
                path.display()
            ),
            Error::Summary { path, source } => {
                write!(f, "invalid summary file '{}': {source}", path.display())
            }
            Error::MissingColumn { path, column } => write!(
                f,
                "expected column '{column}' not found in summary file '{}'",
                path.display()
            ),
            Error::InvalidField {
                path,
                line,
                column,
                value,
            } => write!(
                f,
                "cannot parse '{value}' in column '{column}' of '{}' (line {line})",
                path.display()
            ),
            Error::ThreadPool(err) => write!(f, "cannot start worker threads: {err}"),
            Error::EmptyDataset(path) => write!(f, "no reads found in '{}'", path.display()),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Filesystem { source, .. } | Error::Io { source, .. } => Some(source),
            Error::Stdout(err) => Some(err),
            Error::Parse { source, .. } => Some(source),
            Error::Alignment { source, .. } => Some(source),
            Error::Summary { source, .. } => Some(source),
            Error::ThreadPool(err) => Some(err),
            Error::Configuration(_)
            | Error::UnsortedAlignment(_)
            | Error::MissingColumn { .. }
            | Error::InvalidField { .. }
            | Error::EmptyDataset(_) => None,
        }
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Error::ThreadPool(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_position_display() {
        let pos = ErrorPosition {
            line: 5,
            id: Some("read1".to_string()),
        };
        assert_eq!(pos.to_string(), "record 'read1' at line 5");
        assert_eq!(ErrorPosition::default().to_string(), "line 0");
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new_invalid_separator(b'-', ErrorPosition { line: 3, id: None });
        assert_eq!(
            err.to_string(),
            "Expected '+' separator but found '-' (line 3)"
        );

        let err = ParseError::new_unexpected_end(ErrorPosition {
            line: 8,
            id: Some("r2".to_string()),
        });
        assert_eq!(
            err.to_string(),
            "Unexpected end of input (record 'r2' at line 8)."
        );
    }

    #[test]
    fn test_error_source_chain() {
        let err = Error::Parse {
            path: PathBuf::from("reads.fastq"),
            source: ParseError::new_unequal_length(4, 3, ErrorPosition::default()),
        };
        assert!(err.source().is_some());
        let message = err.to_string();
        assert!(message.starts_with("invalid FASTQ file 'reads.fastq'"));

        let err = Error::MissingColumn {
            path: PathBuf::from("summary.txt"),
            column: "mean_qscore_2d".to_string(),
        };
        assert!(err.source().is_none());
        assert_eq!(
            err.to_string(),
            "expected column 'mean_qscore_2d' not found in summary file 'summary.txt'"
        );
    }
}
