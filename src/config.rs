//! The invocation configuration: what to read and where to write the report.
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::ValueEnum;

use crate::errors::Error;
use crate::report::ReportFormat;

/// Version printed by `--version`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DEFAULT_THREADS: usize = 4;
pub const DEFAULT_OUTDIR: &str = ".";
/// Report file name, appended to the prefix
pub const REPORT_FILE_NAME: &str = "NanoStats.txt";
/// Value of `--name` that sends the report to standard output
pub const STDOUT_SENTINEL: &str = "stdout";

/// Which reads to extract from a run summary
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, ValueEnum)]
pub enum ReadType {
    #[default]
    #[value(name = "1D")]
    OneD,
    #[value(name = "2D")]
    TwoD,
    #[value(name = "1D2")]
    OneD2,
}

impl ReadType {
    /// Summary column holding the read length for this read type
    pub fn length_column(&self) -> &'static str {
        match self {
            Self::OneD => "sequence_length_template",
            Self::TwoD | Self::OneD2 => "sequence_length_2d",
        }
    }

    /// Summary column holding the mean quality for this read type
    pub fn quality_column(&self) -> &'static str {
        match self {
            Self::OneD => "mean_qscore_template",
            Self::TwoD | Self::OneD2 => "mean_qscore_2d",
        }
    }
}

impl fmt::Display for ReadType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::OneD => write!(f, "1D"),
            Self::TwoD => write!(f, "2D"),
            Self::OneD2 => write!(f, "1D2"),
        }
    }
}

impl FromStr for ReadType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1D" => Ok(Self::OneD),
            "2D" => Ok(Self::TwoD),
            "1D2" => Ok(Self::OneD2),
            other => Err(Error::Configuration(format!(
                "invalid read type '{other}', expected one of 1D, 2D, 1D2"
            ))),
        }
    }
}

/// The single data source of an invocation, with the parameters its loader takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Fastq { path: PathBuf, threads: usize },
    Bam { path: PathBuf, threads: usize },
    Summary { path: PathBuf, read_type: ReadType },
}

impl DataSource {
    /// Builds the data source from the three optional selectors.
    /// Exactly one of them must be set.
    pub fn from_selectors(
        fastq: Option<PathBuf>,
        bam: Option<PathBuf>,
        summary: Option<PathBuf>,
        threads: usize,
        read_type: ReadType,
    ) -> Result<Self, Error> {
        if threads == 0 {
            return Err(Error::Configuration(
                "the number of threads must be at least 1".to_string(),
            ));
        }
        match (fastq, bam, summary) {
            (Some(path), None, None) => Ok(Self::Fastq { path, threads }),
            (None, Some(path), None) => Ok(Self::Bam { path, threads }),
            (None, None, Some(path)) => Ok(Self::Summary { path, read_type }),
            (None, None, None) => Err(Error::Configuration(
                "one of --fastq, --bam or --summary is required".to_string(),
            )),
            _ => Err(Error::Configuration(
                "--fastq, --bam and --summary are mutually exclusive".to_string(),
            )),
        }
    }

    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Fastq { path, .. } | Self::Bam { path, .. } | Self::Summary { path, .. } => path,
        }
    }
}

/// Parsed command line, never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub source: DataSource,
    pub outdir: PathBuf,
    /// Explicit report path, or [`STDOUT_SENTINEL`]
    pub name: Option<String>,
    pub prefix: String,
    pub format: ReportFormat,
}

impl Config {
    pub fn new(source: DataSource) -> Self {
        Self {
            source,
            outdir: PathBuf::from(DEFAULT_OUTDIR),
            name: None,
            prefix: String::new(),
            format: ReportFormat::Text,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_read_type_roundtrip_names() {
        for (name, read_type) in [
            ("1D", ReadType::OneD),
            ("2D", ReadType::TwoD),
            ("1D2", ReadType::OneD2),
        ] {
            assert_eq!(name.parse::<ReadType>().unwrap(), read_type);
            assert_eq!(read_type.to_string(), name);
        }
        assert!(matches!(
            "3D".parse::<ReadType>(),
            Err(Error::Configuration(_))
        ));
        assert!("1d".parse::<ReadType>().is_err());
        assert_eq!(ReadType::default(), ReadType::OneD);
    }

    #[test]
    fn test_read_type_columns() {
        assert_eq!(ReadType::OneD.length_column(), "sequence_length_template");
        assert_eq!(ReadType::OneD.quality_column(), "mean_qscore_template");
        assert_eq!(ReadType::TwoD.length_column(), "sequence_length_2d");
        assert_eq!(ReadType::OneD2.quality_column(), "mean_qscore_2d");
    }

    #[test]
    fn test_exactly_one_selector() {
        let source = DataSource::from_selectors(
            None,
            None,
            Some(PathBuf::from("summary.txt")),
            4,
            ReadType::TwoD,
        )
        .unwrap();
        assert_eq!(
            source,
            DataSource::Summary {
                path: PathBuf::from("summary.txt"),
                read_type: ReadType::TwoD
            }
        );

        let fastq = Some(PathBuf::from("a.fq"));
        let source = DataSource::from_selectors(fastq, None, None, 8, ReadType::OneD);
        assert_eq!(
            source.unwrap(),
            DataSource::Fastq {
                path: "a.fq".into(),
                threads: 8
            }
        );

        assert!(matches!(
            DataSource::from_selectors(None, None, None, 4, ReadType::OneD),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            DataSource::from_selectors(
                Some("a.fq".into()),
                Some("a.bam".into()),
                None,
                4,
                ReadType::OneD
            ),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            DataSource::from_selectors(
                Some("a.fq".into()),
                Some("a.bam".into()),
                Some("s.txt".into()),
                4,
                ReadType::OneD
            ),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_zero_threads_rejected() {
        assert!(matches!(
            DataSource::from_selectors(None, Some("a.bam".into()), None, 0, ReadType::OneD),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::new(DataSource::Bam {
            path: "a.bam".into(),
            threads: DEFAULT_THREADS,
        });
        assert_eq!(config.outdir, PathBuf::from("."));
        assert_eq!(config.name, None);
        assert_eq!(config.prefix, "");
        assert_eq!(config.format, ReportFormat::Text);
        assert_eq!(config.source.path(), &PathBuf::from("a.bam"));
    }
}
