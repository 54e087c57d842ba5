//! Consolidated CSV report.
//!
//! Columns are fixed: `date,account,payee,amount,source_file`. Rows are
//! sorted by date, account, source file and position so that identical
//! staged contents always produce an identical file.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use csv::WriterBuilder;
use log::debug;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::{
    errors::{RunError, RunResult},
    types::Record,
};

pub const REPORT_FILE_NAME: &str = "money_mapper_output.csv";

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    date: String,
    account: &'a str,
    payee: &'a str,
    amount: String,
    source_file: &'a str,
}

impl<'a> From<&'a Record> for ReportRow<'a> {
    fn from(record: &'a Record) -> Self {
        ReportRow {
            date: record.date.format("%Y-%m-%d").to_string(),
            account: &record.account,
            payee: &record.payee,
            amount: record.amount.to_string(),
            source_file: &record.source_file,
        }
    }
}

pub struct ReportGenerator {
    path: PathBuf,
}

impl ReportGenerator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes every record and returns the number of rows.
    ///
    /// The file is built next to its destination and renamed over it, so a
    /// reader sees either the previous report or the complete new one.
    pub fn write(&self, records: &[Record]) -> RunResult<usize> {
        let mut sorted: Vec<&Record> = records.iter().collect();
        sorted.sort_by(|a, b| a.report_key().cmp(&b.report_key()));

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.write_error(e))?;

        write_rows(tmp.as_file_mut(), &sorted).map_err(|e| self.write_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.write_error(e))?;

        tmp.persist(&self.path).map_err(|e| self.write_error(e.error))?;
        debug!("wrote {} rows to {}", sorted.len(), self.path.display());

        Ok(sorted.len())
    }

    fn write_error(&self, source: std::io::Error) -> RunError {
        RunError::ReportWrite {
            path: self.path.clone(),
            source,
        }
    }
}

fn write_rows<W: Write>(out: W, records: &[&Record]) -> std::io::Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(out);

    writer.write_record(["date", "account", "payee", "amount", "source_file"])?;
    for record in records {
        writer.serialize(ReportRow::from(*record))?;
    }
    writer.flush()?;

    Ok(())
}
