use super::StagingStore;
use crate::{errors::RunResult, types::Record};

/// In-process staging store. Not durable; a fresh one is always empty.
#[derive(Debug, Default)]
pub struct MemoryStagingStore {
    records: Vec<Record>,
}

impl MemoryStagingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl StagingStore for MemoryStagingStore {
    fn clear(&mut self) -> RunResult<()> {
        self.records.clear();
        Ok(())
    }

    fn append(&mut self, records: &[Record]) -> RunResult<()> {
        self.records.extend_from_slice(records);
        Ok(())
    }

    fn read_all(&self) -> RunResult<Vec<Record>> {
        Ok(self.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    fn record(position: usize) -> Record {
        Record {
            source_file: "a.qfx".to_string(),
            position,
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            account: String::new(),
            payee: String::new(),
            amount: Decimal::new(-5000, 2),
            transaction_type: "DEBIT".to_string(),
            fitid: None,
            memo: None,
            staged_at: Utc::now(),
        }
    }

    #[test]
    fn test_clear_append_read() {
        let mut store = MemoryStagingStore::new();
        store.clear().unwrap();
        assert!(store.is_empty());

        store.append(&[record(1), record(2)]).unwrap();
        store.append(&[]).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.read_all().unwrap().len(), 2);

        store.clear().unwrap();
        assert!(store.read_all().unwrap().is_empty());
    }
}
