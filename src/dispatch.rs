//! Routes the configured data source to the matching loader.
use std::path::Path;

use crate::config::{DataSource, ReadType};
use crate::dataset::ReadSet;
use crate::errors::Error;

/// Something that can turn each kind of input into a [`ReadSet`].
///
/// [`NativeLoader`](crate::loaders::NativeLoader) is the real implementation, tests substitute
/// fakes.
pub trait Loader {
    fn load_fastq(&self, path: &Path, threads: usize) -> Result<ReadSet, Error>;
    fn load_bam(&self, path: &Path, threads: usize) -> Result<ReadSet, Error>;
    fn load_summary(&self, path: &Path, read_type: ReadType) -> Result<ReadSet, Error>;
}

/// Loads the dataset with exactly one loader call. Loader errors are returned untouched.
pub fn load_dataset<L: Loader + ?Sized>(source: &DataSource, loader: &L) -> Result<ReadSet, Error> {
    log::info!("loading {}", source.path().display());
    match source {
        DataSource::Fastq { path, threads } => loader.load_fastq(path, *threads),
        DataSource::Bam { path, threads } => loader.load_bam(path, *threads),
        DataSource::Summary { path, read_type } => loader.load_summary(path, *read_type),
    }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::path::PathBuf;

    use super::*;

    #[derive(Debug, PartialEq)]
    enum Call {
        Fastq(PathBuf, usize),
        Bam(PathBuf, usize),
        Summary(PathBuf, ReadType),
    }

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<Call>>,
    }

    impl Loader for Recorder {
        fn load_fastq(&self, path: &Path, threads: usize) -> Result<ReadSet, Error> {
            self.calls
                .borrow_mut()
                .push(Call::Fastq(path.to_path_buf(), threads));
            Ok(ReadSet::new(vec![1]))
        }

        fn load_bam(&self, path: &Path, threads: usize) -> Result<ReadSet, Error> {
            self.calls
                .borrow_mut()
                .push(Call::Bam(path.to_path_buf(), threads));
            Ok(ReadSet::new(vec![2]))
        }

        fn load_summary(&self, path: &Path, read_type: ReadType) -> Result<ReadSet, Error> {
            self.calls
                .borrow_mut()
                .push(Call::Summary(path.to_path_buf(), read_type));
            Ok(ReadSet::new(vec![3]))
        }
    }

    struct Failing;

    impl Loader for Failing {
        fn load_fastq(&self, path: &Path, _: usize) -> Result<ReadSet, Error> {
            Err(Error::EmptyDataset(path.to_path_buf()))
        }

        fn load_bam(&self, path: &Path, _: usize) -> Result<ReadSet, Error> {
            Err(Error::UnsortedAlignment(path.to_path_buf()))
        }

        fn load_summary(&self, path: &Path, _: ReadType) -> Result<ReadSet, Error> {
            Err(Error::MissingColumn {
                path: path.to_path_buf(),
                column: "read_id".to_string(),
            })
        }
    }

    #[test]
    fn test_fastq_gets_threads() {
        let loader = Recorder::default();
        let source = DataSource::Fastq {
            path: "reads.fq.gz".into(),
            threads: 6,
        };
        let reads = load_dataset(&source, &loader).unwrap();
        assert_eq!(reads.lengths, vec![1]);
        assert_eq!(
            *loader.calls.borrow(),
            vec![Call::Fastq("reads.fq.gz".into(), 6)]
        );
    }

    #[test]
    fn test_bam_gets_threads() {
        let loader = Recorder::default();
        let source = DataSource::Bam {
            path: "aln.bam".into(),
            threads: 3,
        };
        assert_eq!(load_dataset(&source, &loader).unwrap().lengths, vec![2]);
        assert_eq!(*loader.calls.borrow(), vec![Call::Bam("aln.bam".into(), 3)]);
    }

    #[test]
    fn test_summary_gets_read_type_only() {
        let loader = Recorder::default();
        let source = DataSource::Summary {
            path: "summary.txt".into(),
            read_type: ReadType::TwoD,
        };
        assert_eq!(load_dataset(&source, &loader).unwrap().lengths, vec![3]);
        assert_eq!(
            *loader.calls.borrow(),
            vec![Call::Summary("summary.txt".into(), ReadType::TwoD)]
        );
    }

    #[test]
    fn test_errors_propagate_unchanged() {
        let source = DataSource::Bam {
            path: "aln.bam".into(),
            threads: 1,
        };
        match load_dataset(&source, &Failing) {
            Err(Error::UnsortedAlignment(path)) => assert_eq!(path, PathBuf::from("aln.bam")),
            other => panic!("unexpected result: {other:?}"),
        }

        let source = DataSource::Summary {
            path: "s.txt".into(),
            read_type: ReadType::OneD,
        };
        assert!(matches!(
            load_dataset(&source, &Failing),
            Err(Error::MissingColumn { .. })
        ));
    }
}
