//! One end-to-end run: clear staging, parse every export, stage, report.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::Utc;
use log::{info, warn};

use crate::{
    builder::{FileFormat, ParserBuilder},
    config::RunConfig,
    errors::{ParseError, RunError, RunResult},
    report::ReportGenerator,
    staging::{SqliteStagingStore, StagingStore},
};

/// What happened during a run.
#[derive(Debug)]
pub struct RunSummary {
    /// Files whose records were staged (possibly with some rejected)
    pub files_processed: Vec<PathBuf>,
    /// Files skipped entirely, with the error that stopped each one
    pub files_skipped: Vec<(PathBuf, ParseError)>,
    pub records_staged: usize,
    /// Individual transactions rejected inside otherwise usable files
    pub records_rejected: Vec<ParseError>,
    pub report_path: PathBuf,
    pub report_rows: usize,
}

impl RunSummary {
    pub fn log_summary(&self) {
        info!(
            "files processed: {}, files skipped due to error: {}",
            self.files_processed.len(),
            self.files_skipped.len()
        );
        for (path, error) in &self.files_skipped {
            warn!("skipped {}: {}", path.display(), error);
        }
        if !self.records_rejected.is_empty() {
            warn!("{} transaction(s) rejected", self.records_rejected.len());
            for error in &self.records_rejected {
                warn!("  {}", error);
            }
        }
        info!(
            "records staged: {}, report rows: {} -> {}",
            self.records_staged,
            self.report_rows,
            self.report_path.display()
        );
    }
}

/// Eligible export files in `dir`, sorted by file name.
pub fn discover_files(dir: &Path) -> RunResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| RunError::Configuration {
        path: dir.to_path_buf(),
        reason: format!("cannot list directory: {}", e),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| RunError::Configuration {
                path: dir.to_path_buf(),
                reason: format!("cannot list directory: {}", e),
            })?
            .path();

        if path.is_file() && FileFormat::from_path(&path).is_some() {
            info!("found Quicken file: {}", path.display());
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

pub struct Coordinator<S: StagingStore> {
    config: RunConfig,
    store: S,
}

impl<S: StagingStore> Coordinator<S> {
    pub fn new(config: RunConfig, store: S) -> Self {
        Self { config, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Runs the pipeline once.
    ///
    /// Configuration is validated before the store is touched. Staging and
    /// report failures abort the run; a file that fails to parse is skipped.
    pub fn run(&mut self) -> RunResult<RunSummary> {
        self.config.validate()?;

        self.store.clear()?;

        let files = discover_files(&self.config.input_dir)?;
        info!("{} export file(s) in {}", files.len(), self.config.input_dir.display());

        let mut files_processed = Vec::new();
        let mut files_skipped = Vec::new();
        let mut records_rejected = Vec::new();
        let mut records_staged = 0;

        for path in files {
            let parsed = match ParserBuilder::new()
                .filename(&path)
                .staged_at(Utc::now())
                .parse()
            {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("skipping {}: {}", path.display(), e);
                    files_skipped.push((path, e));
                    continue;
                }
            };

            for rejected in &parsed.rejected {
                warn!("{}", rejected);
            }

            self.store.append(&parsed.records)?;
            info!(
                "staged {} record(s) from {}",
                parsed.records.len(),
                parsed.source_file
            );

            records_staged += parsed.records.len();
            records_rejected.extend(parsed.rejected);
            files_processed.push(path);
        }

        let staged = self.store.read_all()?;
        let generator = ReportGenerator::new(self.config.report_path());
        let report_rows = generator.write(&staged)?;

        Ok(RunSummary {
            files_processed,
            files_skipped,
            records_staged,
            records_rejected,
            report_path: generator.path().to_path_buf(),
            report_rows,
        })
    }
}

/// Validates `config`, opens the SQLite staging store in the output
/// directory and runs the pipeline.
pub fn run(config: &RunConfig) -> RunResult<RunSummary> {
    config.validate()?;
    let store = SqliteStagingStore::open(&config.staging_path())?;
    Coordinator::new(config.clone(), store).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{staging::MemoryStagingStore, types::Record};
    use tempfile::TempDir;

    const ONE_TXN: &str = "OFXHEADER:100
DATA:OFXSGML

<OFX>
<BANKMSGSRSV1>
<STMTTRNRS>
<STMTRS>
<BANKACCTFROM>
<ACCTID>1111
</BANKACCTFROM>
<BANKTRANLIST>
<STMTTRN>
<TRNTYPE>DEBIT
<DTPOSTED>20251226
<TRNAMT>-50.00
<NAME>Coffee Shop
</STMTTRN>
</BANKTRANLIST>
</STMTRS>
</STMTTRNRS>
</BANKMSGSRSV1>
</OFX>
";

    /// Counts calls and can be told to fail appends.
    #[derive(Default)]
    struct RecordingStore {
        inner: MemoryStagingStore,
        clears: usize,
        fail_append: bool,
    }

    impl StagingStore for RecordingStore {
        fn clear(&mut self) -> RunResult<()> {
            self.clears += 1;
            self.inner.clear()
        }

        fn append(&mut self, records: &[Record]) -> RunResult<()> {
            if self.fail_append {
                return Err(RunError::StagingUnavailable("disk full".to_string()));
            }
            self.inner.append(records)
        }

        fn read_all(&self) -> RunResult<Vec<Record>> {
            self.inner.read_all()
        }
    }

    fn dirs() -> (TempDir, TempDir) {
        (TempDir::new().unwrap(), TempDir::new().unwrap())
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        for name in ["b.QFX", "a.qfx", "c.ofx", "notes.txt", "d.csv"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("nested.qfx")).unwrap();

        let files = discover_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.qfx", "b.QFX", "c.ofx"]);
    }

    #[test]
    fn test_configuration_error_before_any_staging() {
        let output = TempDir::new().unwrap();
        let not_a_dir = output.path().join("export.QFX");
        fs::write(&not_a_dir, ONE_TXN).unwrap();

        let mut coordinator = Coordinator::new(
            RunConfig::new(&not_a_dir, output.path()),
            RecordingStore::default(),
        );
        let result = coordinator.run();

        assert!(matches!(result, Err(RunError::Configuration { .. })));
        assert_eq!(coordinator.store().clears, 0);
        assert!(!output.path().join("money_mapper_output.csv").exists());
    }

    #[test]
    fn test_run_clears_previous_contents() {
        let (input, output) = dirs();
        fs::write(input.path().join("a.qfx"), ONE_TXN).unwrap();
        let config = RunConfig::new(input.path(), output.path());

        let mut coordinator = Coordinator::new(config, MemoryStagingStore::new());
        coordinator.run().unwrap();
        let summary = coordinator.run().unwrap();

        assert_eq!(summary.records_staged, 1);
        assert_eq!(summary.report_rows, 1);
        assert_eq!(coordinator.into_store().len(), 1);
    }

    #[test]
    fn test_malformed_file_is_skipped() {
        let (input, output) = dirs();
        fs::write(input.path().join("a.qfx"), ONE_TXN).unwrap();
        fs::write(input.path().join("b.qfx"), "this is not an export").unwrap();

        let mut coordinator = Coordinator::new(
            RunConfig::new(input.path(), output.path()),
            MemoryStagingStore::new(),
        );
        let summary = coordinator.run().unwrap();

        assert_eq!(summary.files_processed.len(), 1);
        assert_eq!(summary.files_skipped.len(), 1);
        assert!(summary.files_skipped[0].0.ends_with("b.qfx"));
        assert!(matches!(summary.files_skipped[0].1, ParseError::MalformedFile { .. }));
        assert_eq!(summary.report_rows, 1);
    }

    #[test]
    fn test_staging_failure_aborts_without_report() {
        let (input, output) = dirs();
        fs::write(input.path().join("a.qfx"), ONE_TXN).unwrap();
        let report = output.path().join("money_mapper_output.csv");
        fs::write(&report, "previous report\n").unwrap();

        let store = RecordingStore {
            fail_append: true,
            ..Default::default()
        };
        let mut coordinator = Coordinator::new(RunConfig::new(input.path(), output.path()), store);
        let result = coordinator.run();

        assert!(matches!(result, Err(RunError::StagingUnavailable(_))));
        assert_eq!(fs::read_to_string(&report).unwrap(), "previous report\n");
    }

    #[test]
    fn test_run_with_sqlite_store() {
        let (input, output) = dirs();
        fs::write(input.path().join("a.qfx"), ONE_TXN).unwrap();
        let config = RunConfig::new(input.path(), output.path());

        let summary = run(&config).unwrap();

        assert_eq!(summary.report_rows, 1);
        assert!(config.staging_path().exists());
        assert_eq!(summary.report_path, config.report_path());
    }
}
