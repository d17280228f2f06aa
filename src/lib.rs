#![crate_name = "nanostat"]
//! Summary statistics for Oxford Nanopore read sets.
//!
//! A dataset comes from one of three sources (FASTQ, a coordinate sorted BAM file or a
//! basecaller run summary), is reduced to per-read metrics in a [`ReadSet`] and rendered as a
//! report:
//!
//! ```no_run
//! use nanostat::{
//!     load_dataset, write_report, DataSource, NativeLoader, OutputDestination, ReportFormat,
//! };
//!
//! let source = DataSource::Fastq { path: "reads.fastq.gz".into(), threads: 4 };
//! let reads = load_dataset(&source, &NativeLoader).unwrap();
//! write_report(&reads, &OutputDestination::Stdout, ReportFormat::Text).unwrap();
//! ```
pub mod cli;
pub mod config;
pub mod dataset;
pub mod dispatch;
pub mod errors;
pub mod loaders;
pub mod output;
pub mod parser;
pub mod quality;
pub mod report;

pub use config::{Config, DataSource, ReadType};
pub use dataset::ReadSet;
pub use dispatch::{load_dataset, Loader};
pub use errors::{Error, ParseError, ParseErrorKind};
pub use loaders::NativeLoader;
pub use output::{resolve_output, OutputDestination};
pub use report::{write_report, ReportFormat, Stats};
