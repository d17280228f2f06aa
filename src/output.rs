//! Where the report goes.
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{Config, REPORT_FILE_NAME, STDOUT_SENTINEL};
use crate::errors::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    Stdout,
    File(PathBuf),
}

/// Computes the report destination without touching the filesystem.
///
/// An explicit `name` wins over `outdir` + `prefix`. The prefix is glued to the file name as is,
/// so `run1_` gives `run1_NanoStats.txt`.
pub fn destination(outdir: &Path, name: Option<&str>, prefix: &str) -> OutputDestination {
    match name {
        Some(STDOUT_SENTINEL) => OutputDestination::Stdout,
        Some(name) if !name.is_empty() => OutputDestination::File(PathBuf::from(name)),
        _ => OutputDestination::File(outdir.join(format!("{prefix}{REPORT_FILE_NAME}"))),
    }
}

/// Creates `outdir` (and its parents) if needed and returns the report destination.
///
/// Only `outdir` is created. The parent directory of an explicit `--name` path is left alone.
pub fn resolve_output(config: &Config) -> Result<OutputDestination, Error> {
    if !config.outdir.exists() {
        log::info!("creating output directory {}", config.outdir.display());
        fs::create_dir_all(&config.outdir).map_err(|source| Error::Filesystem {
            path: config.outdir.clone(),
            source,
        })?;
    }
    Ok(destination(
        &config.outdir,
        config.name.as_deref(),
        &config.prefix,
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::DataSource;

    fn config(outdir: &Path) -> Config {
        let mut config = Config::new(DataSource::Fastq {
            path: "reads.fastq".into(),
            threads: 4,
        });
        config.outdir = outdir.to_path_buf();
        config
    }

    #[test]
    fn test_prefix_is_concatenated() {
        assert_eq!(
            destination(Path::new("."), None, "run1_"),
            OutputDestination::File(PathBuf::from("./run1_NanoStats.txt"))
        );
        assert_eq!(
            destination(Path::new("out"), None, "run1"),
            OutputDestination::File(PathBuf::from("out/run1NanoStats.txt"))
        );
    }

    #[test]
    fn test_default_destination() {
        assert_eq!(
            destination(Path::new("."), None, ""),
            OutputDestination::File(PathBuf::from("./NanoStats.txt"))
        );
    }

    #[test]
    fn test_name_takes_precedence() {
        assert_eq!(
            destination(Path::new("out"), Some("custom/report.txt"), "run1_"),
            OutputDestination::File(PathBuf::from("custom/report.txt"))
        );
        assert_eq!(
            destination(Path::new("out"), Some("stdout"), "run1_"),
            OutputDestination::Stdout
        );
        assert_eq!(
            destination(Path::new("out"), Some(""), ""),
            OutputDestination::File(PathBuf::from("out/NanoStats.txt"))
        );
    }

    #[test]
    fn test_outdir_is_created_and_reused() {
        let tmp = tempfile::tempdir().unwrap();
        let outdir = tmp.path().join("a").join("b");
        let config = config(&outdir);

        let dest = resolve_output(&config).unwrap();
        assert!(outdir.is_dir());
        assert_eq!(dest, OutputDestination::File(outdir.join("NanoStats.txt")));

        // second run with an existing directory
        assert_eq!(resolve_output(&config).unwrap(), dest);
    }

    #[test]
    fn test_name_directory_is_not_created() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = config(tmp.path());
        let custom = tmp.path().join("missing").join("report.txt");
        config.name = Some(custom.to_string_lossy().into_owned());

        assert_eq!(
            resolve_output(&config).unwrap(),
            OutputDestination::File(custom.clone())
        );
        assert!(!custom.parent().unwrap().exists());
    }

    #[test]
    fn test_stdout_creates_no_file() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = config(tmp.path());
        config.name = Some("stdout".to_string());
        assert_eq!(resolve_output(&config).unwrap(), OutputDestination::Stdout);
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_outdir_blocked_by_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let config = config(&tmp.path().join("sub"));
        assert!(matches!(
            resolve_output(&config),
            Err(Error::Filesystem { .. })
        ));
    }
}
