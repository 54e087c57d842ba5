use crate::errors::RecordFault;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// `DTPOSTED`-style timestamp exactly as it appears in the file.
#[derive(Debug, Clone, Serialize)]
pub struct QfxDate(String);

impl<'de> Deserialize<'de> for QfxDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(QfxDate)
    }
}

impl From<String> for QfxDate {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for QfxDate {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl QfxDate {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<QfxDate> for NaiveDate {
    type Error = RecordFault;

    /// Accepts `YYYYMMDD[HH[MM[SS]]][.XXX][[offset:TZ]]`.
    fn try_from(date_str: QfxDate) -> Result<Self, Self::Error> {
        let invalid = || RecordFault::InvalidDate(date_str.0.clone());

        let clean = date_str
            .0
            .split(&['[', '.'][..])
            .next()
            .ok_or_else(invalid)?
            .trim();

        if clean.len() < 8 || !clean.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        // HH, HHMM or HHMMSS
        let time = &clean[8..];
        if !matches!(time.len(), 0 | 2 | 4 | 6) {
            return Err(invalid());
        }

        let year = clean[0..4].parse().map_err(|_| invalid())?;
        let month = clean[4..6].parse().map_err(|_| invalid())?;
        let day = clean[6..8].parse().map_err(|_| invalid())?;

        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
    }
}

/// `TRNAMT` text, kept verbatim until it is converted exactly.
#[derive(Debug, Clone, Serialize)]
pub struct QfxAmount(String);

impl<'de> Deserialize<'de> for QfxAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(QfxAmount)
    }
}

impl From<&str> for QfxAmount {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl QfxAmount {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<QfxAmount> for Decimal {
    type Error = RecordFault;

    fn try_from(amount: QfxAmount) -> Result<Self, Self::Error> {
        let trimmed = amount.0.trim();

        // Some institutions write a comma as the decimal separator.
        let normalized = if !trimmed.contains('.') && trimmed.matches(',').count() == 1 {
            trimmed.replace(',', ".")
        } else {
            trimmed.to_string()
        };

        if !is_decimal_literal(&normalized) {
            return Err(RecordFault::InvalidAmount(amount.0.clone()));
        }

        // Well-formed but too many digits or too large for 96 bits. A negative
        // zero comes back as plain zero with its scale kept.
        Decimal::from_str_exact(&normalized)
            .map_err(|_| RecordFault::PrecisionLoss(amount.0.clone()))
    }
}

/// Optional sign, ASCII digits and at most one `.`. No digit grouping
/// (`_`, `,`) and no exponent.
fn is_decimal_literal(value: &str) -> bool {
    let unsigned = value.strip_prefix(['-', '+']).unwrap_or(value);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());

    !(whole.is_empty() && fraction.is_empty()) && all_digits(whole) && all_digits(fraction)
}
