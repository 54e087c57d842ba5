use crate::{
    errors::{ParseError, RecordFault},
    parsers::prelude::*,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One normalized transaction, as staged and reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// File name of the export the transaction came from
    pub source_file: String,
    /// 1-based position of the transaction within its file
    pub position: usize,
    pub date: NaiveDate,
    pub account: String,
    pub payee: String,
    pub amount: Decimal,
    pub transaction_type: String,
    pub fitid: Option<String>,
    pub memo: Option<String>,
    /// When the record's file was staged
    pub staged_at: DateTime<Utc>,
}

impl Record {
    /// Normalizes one statement line. Failures name the file and position.
    pub fn from_qfx(
        source_file: &str,
        position: usize,
        staged_at: DateTime<Utc>,
        stmt: QfxTransaction,
    ) -> Result<Self, ParseError> {
        Self::normalize(source_file, position, staged_at, stmt)
            .map_err(|fault| fault.at(source_file, position))
    }

    fn normalize(
        source_file: &str,
        position: usize,
        staged_at: DateTime<Utc>,
        stmt: QfxTransaction,
    ) -> Result<Self, RecordFault> {
        let date: NaiveDate = stmt
            .dt_posted
            .ok_or(RecordFault::MissingField("DTPOSTED"))?
            .try_into()?;
        let amount: Decimal = stmt
            .amount
            .ok_or(RecordFault::MissingField("TRNAMT"))?
            .try_into()?;

        let payee = stmt
            .name
            .clone()
            .or_else(|| stmt.memo.clone())
            .unwrap_or_default();

        Ok(Record {
            source_file: source_file.to_string(),
            position,
            date,
            account: stmt.account_id.unwrap_or_default(),
            payee,
            amount,
            transaction_type: stmt.trn_type.unwrap_or_else(|| "OTHER".to_string()),
            fitid: stmt.fitid,
            memo: stmt.memo,
            staged_at,
        })
    }

    /// Ordering used by the report: date, account, file, then position in file.
    pub fn report_key(&self) -> (NaiveDate, &str, &str, usize) {
        (self.date, &self.account, &self.source_file, self.position)
    }
}
