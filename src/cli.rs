//! Command line interface
use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Parser};

use crate::config::{Config, DataSource, ReadType, DEFAULT_OUTDIR, DEFAULT_THREADS, VERSION};
use crate::errors::Error;
use crate::report::ReportFormat;

fn parse_threads(s: &str) -> Result<usize, String> {
    let threads: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number of threads"))?;
    if threads == 0 {
        return Err("the number of threads must be at least 1".to_string());
    }
    Ok(threads)
}

#[derive(Parser, Debug)]
#[command(
    name = "NanoStat",
    version = VERSION,
    about = "Get statistics of Oxford Nanopore read dataset.",
    disable_version_flag = true
)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .multiple(false)
        .args(["fastq", "summary", "bam"])
))]
pub struct Cli {
    /// Print version and exit.
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: (),

    /// Specify directory in which output has to be created.
    #[arg(short = 'o', long, default_value = DEFAULT_OUTDIR)]
    pub outdir: PathBuf,

    /// Specify an optional prefix to be used for the output file.
    #[arg(short = 'p', long)]
    pub prefix: Option<String>,

    /// Specify a custom filename/path for the output, "stdout" for printing to stdout.
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Set the allowed number of threads to be used by the script.
    /// This only applies to bam and fastq format as data source.
    #[arg(
        short = 't',
        long,
        default_value_t = DEFAULT_THREADS,
        value_parser = parse_threads
    )]
    pub threads: usize,

    /// Which read type to extract information about from summary.
    #[arg(long, value_enum, default_value_t = ReadType::OneD)]
    pub readtype: ReadType,

    /// Write the statistics as a tab separated table.
    #[arg(long)]
    pub tsv: bool,

    /// Log progress to stderr.
    #[arg(long)]
    pub verbose: bool,

    /// Data is in fastq format.
    #[arg(long, value_name = "FASTQ")]
    pub fastq: Option<PathBuf>,

    /// Data is a summary file generated by albacore.
    #[arg(long, value_name = "SUMMARY")]
    pub summary: Option<PathBuf>,

    /// Data as a sorted bam file.
    #[arg(long, value_name = "BAM")]
    pub bam: Option<PathBuf>,
}

impl TryFrom<Cli> for Config {
    type Error = Error;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let source =
            DataSource::from_selectors(cli.fastq, cli.bam, cli.summary, cli.threads, cli.readtype)?;
        Ok(Config {
            source,
            outdir: cli.outdir,
            name: cli.name.filter(|name| !name.is_empty()),
            prefix: cli.prefix.unwrap_or_default(),
            format: if cli.tsv {
                ReportFormat::Tsv
            } else {
                ReportFormat::Text
            },
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("NanoStat").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["--fastq", "reads.fastq.gz"]).unwrap();
        assert_eq!(cli.threads, 4);
        assert_eq!(cli.readtype, ReadType::OneD);
        assert_eq!(cli.outdir, PathBuf::from("."));
        assert!(!cli.tsv);

        let config = Config::try_from(cli).unwrap();
        assert_eq!(
            config.source,
            DataSource::Fastq {
                path: PathBuf::from("reads.fastq.gz"),
                threads: 4
            }
        );
        assert_eq!(config.name, None);
        assert_eq!(config.prefix, "");
        assert_eq!(config.format, ReportFormat::Text);
    }

    #[test]
    fn test_all_options() {
        let cli = parse(&[
            "--summary",
            "sequencing_summary.txt",
            "--readtype",
            "1D2",
            "-o",
            "out",
            "-n",
            "stdout",
            "-p",
            "run1_",
            "-t",
            "12",
            "--tsv",
        ])
        .unwrap();
        let config = Config::try_from(cli).unwrap();
        assert_eq!(
            config.source,
            DataSource::Summary {
                path: PathBuf::from("sequencing_summary.txt"),
                read_type: ReadType::OneD2
            }
        );
        assert_eq!(config.outdir, PathBuf::from("out"));
        assert_eq!(config.name.as_deref(), Some("stdout"));
        assert_eq!(config.prefix, "run1_");
        assert_eq!(config.format, ReportFormat::Tsv);
    }

    #[test]
    fn test_threads_forwarded_to_bam() {
        let cli = parse(&["--bam", "aln.bam", "--threads", "2"]).unwrap();
        let config = Config::try_from(cli).unwrap();
        assert_eq!(
            config.source,
            DataSource::Bam {
                path: PathBuf::from("aln.bam"),
                threads: 2
            }
        );
    }

    #[test]
    fn test_empty_name_means_derive() {
        let cli = parse(&["--bam", "aln.bam", "--name", ""]).unwrap();
        assert_eq!(Config::try_from(cli).unwrap().name, None);
    }

    #[test]
    fn test_source_is_required() {
        let err = parse(&["-t", "2"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_sources_are_exclusive() {
        let err = parse(&["--fastq", "a.fq", "--bam", "a.bam"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_invalid_readtype() {
        let err = parse(&["--summary", "s.txt", "--readtype", "3D"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_invalid_threads() {
        let err = parse(&["--fastq", "a.fq", "-t", "four"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        let err = parse(&["--fastq", "a.fq", "-t", "0"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_version_and_help_short_circuit() {
        let err = parse(&["-v"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
        let err = parse(&["--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }
}
