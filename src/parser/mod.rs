//! FASTQ parsing and transparent decompression of input files
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

#[cfg(feature = "compression")]
use bzip2::read::BzDecoder;
#[cfg(feature = "compression")]
use flate2::read::MultiGzDecoder;
#[cfg(feature = "compression")]
use xz2::read::XzDecoder;

pub use crate::parser::fastq::Reader as FastqReader;
pub use crate::parser::record::FastqRecord;

mod fastq;
mod record;
mod utils;

// Magic bytes for each compression format. bgzip output is a series of gzip members.
const GZ_MAGIC: [u8; 2] = [0x1F, 0x8B];
const BZ_MAGIC: [u8; 2] = [0x42, 0x5A];
const XZ_MAGIC: [u8; 2] = [0xFD, 0x37];

/// Compression detected from the first bytes of a file
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Compression {
    Plain,
    Gzip,
    Bzip2,
    Xz,
}

impl Compression {
    pub fn from_magic(bytes: &[u8]) -> Self {
        match bytes {
            [a, b, ..] if [*a, *b] == GZ_MAGIC => Self::Gzip,
            [a, b, ..] if [*a, *b] == BZ_MAGIC => Self::Bzip2,
            [a, b, ..] if [*a, *b] == XZ_MAGIC => Self::Xz,
            _ => Self::Plain,
        }
    }
}

/// Opens `path` and wraps it in the right decoder, sniffing the magic bytes rather than trusting
/// the extension. Used for FASTQ and run summary inputs alike.
pub fn open_decompressed<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn Read + Send>> {
    let mut reader = BufReader::new(File::open(path)?);
    // peek without consuming, the decoders need the magic bytes too
    let compression = Compression::from_magic(reader.fill_buf()?);

    match compression {
        Compression::Plain => Ok(Box::new(reader)),
        #[cfg(feature = "compression")]
        Compression::Gzip => Ok(Box::new(MultiGzDecoder::new(reader))),
        #[cfg(feature = "compression")]
        Compression::Bzip2 => Ok(Box::new(BzDecoder::new(reader))),
        #[cfg(feature = "compression")]
        Compression::Xz => Ok(Box::new(XzDecoder::new(reader))),
        #[cfg(not(feature = "compression"))]
        other => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{other:?} compressed input needs the `compression` feature"),
        )),
    }
}

/// Parses the FASTQ file at `path`, compressed or not, and returns a streaming reader.
/// gzip (including bgzip), bzip2 and xz are supported when the `compression` feature is
/// enabled.
pub fn parse_fastq_file<P: AsRef<Path>>(path: P) -> io::Result<FastqReader<Box<dyn Read + Send>>> {
    open_decompressed(path).map(FastqReader::new)
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_compression_from_magic() {
        assert_eq!(
            Compression::from_magic(&[0x1F, 0x8B, 0x08]),
            Compression::Gzip
        );
        assert_eq!(Compression::from_magic(b"BZh91AY"), Compression::Bzip2);
        assert_eq!(
            Compression::from_magic(&[0xFD, 0x37, 0x7A]),
            Compression::Xz
        );
        assert_eq!(Compression::from_magic(b"@read1\n"), Compression::Plain);
        assert_eq!(Compression::from_magic(b"@"), Compression::Plain);
        assert_eq!(Compression::from_magic(b""), Compression::Plain);
    }

    #[test]
    fn test_parse_missing_file() {
        match parse_fastq_file("does/not/exist.fastq") {
            Err(err) => assert_eq!(err.kind(), io::ErrorKind::NotFound),
            Ok(_) => panic!("opened a missing file"),
        }
    }

    #[test]
    fn test_parse_plain_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"@r1\nACGT\n+\nIIII\n").unwrap();
        file.flush().unwrap();

        let mut reader = parse_fastq_file(file.path()).unwrap();
        let record = reader.next().unwrap().unwrap();
        assert_eq!(record.id(), b"r1");
        assert_eq!(record.seq(), b"ACGT");
        assert!(reader.next().is_none());
    }
}
