use std::{path::Path, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

use super::StagingStore;
use crate::{
    errors::{RunError, RunResult},
    types::Record,
};

/// Staging table backed by an SQLite database file.
///
/// Amounts, dates and timestamps are stored as TEXT so nothing passes
/// through a floating point column.
pub struct SqliteStagingStore {
    conn: Connection,
}

impl SqliteStagingStore {
    pub fn open(path: &Path) -> RunResult<Self> {
        let conn = Connection::open(path).map_err(|e| {
            RunError::StagingUnavailable(format!("cannot open {}: {}", path.display(), e))
        })?;
        // WAL so readers of the file are not blocked while a batch is written
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> RunResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> RunResult<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS money_mapper (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source_file TEXT NOT NULL,
                position INTEGER NOT NULL,
                txn_date TEXT NOT NULL,
                account TEXT NOT NULL,
                payee TEXT NOT NULL,
                amount TEXT NOT NULL,
                transaction_type TEXT NOT NULL,
                fitid TEXT,
                memo TEXT,
                staged_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self { conn })
    }

    pub fn count(&self) -> RunResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM money_mapper", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl StagingStore for SqliteStagingStore {
    fn clear(&mut self) -> RunResult<()> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute("DELETE FROM money_mapper", [])?;
        tx.commit()?;
        debug!("cleared {} staged records", removed);
        Ok(())
    }

    fn append(&mut self, records: &[Record]) -> RunResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO money_mapper (
                    source_file, position, txn_date, account, payee, amount,
                    transaction_type, fitid, memo, staged_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;

            for record in records {
                stmt.execute(params![
                    record.source_file,
                    record.position as i64,
                    record.date.format("%Y-%m-%d").to_string(),
                    record.account,
                    record.payee,
                    record.amount.to_string(),
                    record.transaction_type,
                    record.fitid,
                    record.memo,
                    record.staged_at.to_rfc3339(),
                ])?;
            }
        }
        // Dropping an uncommitted transaction rolls it back
        tx.commit()?;
        Ok(())
    }

    fn read_all(&self) -> RunResult<Vec<Record>> {
        let mut stmt = self.conn.prepare(
            "SELECT source_file, position, txn_date, account, payee, amount,
                    transaction_type, fitid, memo, staged_at
             FROM money_mapper",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(StagedRow {
                    source_file: row.get(0)?,
                    position: row.get(1)?,
                    date: row.get(2)?,
                    account: row.get(3)?,
                    payee: row.get(4)?,
                    amount: row.get(5)?,
                    transaction_type: row.get(6)?,
                    fitid: row.get(7)?,
                    memo: row.get(8)?,
                    staged_at: row.get(9)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(StagedRow::into_record).collect()
    }
}

struct StagedRow {
    source_file: String,
    position: i64,
    date: String,
    account: String,
    payee: String,
    amount: String,
    transaction_type: String,
    fitid: Option<String>,
    memo: Option<String>,
    staged_at: String,
}

impl StagedRow {
    fn into_record(self) -> RunResult<Record> {
        let corrupt = |column: &str, value: &str| {
            RunError::StagingUnavailable(format!(
                "corrupt staged row for {}: {} = '{}'",
                self.source_file, column, value
            ))
        };

        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|_| corrupt("txn_date", &self.date))?;
        let amount = Decimal::from_str(&self.amount).map_err(|_| corrupt("amount", &self.amount))?;
        let staged_at = DateTime::parse_from_rfc3339(&self.staged_at)
            .map_err(|_| corrupt("staged_at", &self.staged_at))?
            .with_timezone(&Utc);
        let position =
            usize::try_from(self.position).map_err(|_| corrupt("position", &self.position.to_string()))?;

        Ok(Record {
            source_file: self.source_file,
            position,
            date,
            account: self.account,
            payee: self.payee,
            amount,
            transaction_type: self.transaction_type,
            fitid: self.fitid,
            memo: self.memo,
            staged_at,
        })
    }
}
