use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single expense entry.
///
/// Records are immutable once stored; an edit replaces the whole record at
/// its original index. The serialized form is a JSON object with `category`
/// (string), `amount` (number) and `date` (`YYYY-MM-DD`), and must round-trip
/// losslessly for all three fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub category: String,
    pub amount: Decimal,
    pub date: NaiveDate,
}

/// Raw record input as collected at the presentation boundary, before any
/// field has been parsed or checked.
#[derive(Debug, Clone, Default)]
pub struct RecordDraft {
    pub category: String,
    pub amount: String,
    pub date: String,
}

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("category must not be empty")]
    EmptyCategory,
    #[error("'{0}' is not a valid amount")]
    InvalidAmount(String),
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    #[error("'{0}' is not a valid calendar date")]
    InvalidDate(String),
}

impl RecordDraft {
    pub fn new<S: Into<String>>(category: S, amount: S, date: S) -> Self {
        RecordDraft {
            category: category.into(),
            amount: amount.into(),
            date: date.into(),
        }
    }

    /// Validate every field and produce a typed record.
    ///
    /// Fields are checked in declaration order and the first failure wins, so
    /// the caller always learns which field to surface to the user. Amounts
    /// must parse as a decimal number and be strictly positive; dates must be
    /// `YYYY-MM-DD` calendar dates.
    pub fn validate(&self) -> Result<ExpenseRecord, ValidationError> {
        let category = self.category.trim();
        if category.is_empty() {
            return Err(ValidationError::EmptyCategory);
        }

        let amount: Decimal = self
            .amount
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidAmount(self.amount.clone()))?;
        if amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount);
        }

        let date: NaiveDate = self
            .date
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidDate(self.date.clone()))?;

        Ok(ExpenseRecord {
            category: category.to_string(),
            amount,
            date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn valid_draft_produces_record() {
        let record = RecordDraft::new("Food", "120.50", "2024-01-05")
            .validate()
            .unwrap();
        assert_eq!(record.category, "Food");
        assert_eq!(record.amount, dec!(120.50));
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }

    #[test]
    fn whitespace_is_trimmed() {
        let record = RecordDraft::new("  Travel ", " 50 ", " 2024-01-05 ")
            .validate()
            .unwrap();
        assert_eq!(record.category, "Travel");
        assert_eq!(record.amount, dec!(50));
    }

    #[test]
    fn empty_category_rejected() {
        let result = RecordDraft::new("  ", "10", "2024-01-05").validate();
        assert_eq!(result.err(), Some(ValidationError::EmptyCategory));
    }

    #[test]
    fn unparseable_amount_rejected() {
        let result = RecordDraft::new("Food", "ten", "2024-01-05").validate();
        assert_eq!(
            result.err(),
            Some(ValidationError::InvalidAmount("ten".into()))
        );
    }

    #[test]
    fn zero_and_negative_amounts_rejected() {
        for amount in &["0", "0.00", "-3.50"] {
            let result = RecordDraft::new("Food", amount, "2024-01-05").validate();
            assert_eq!(result.err(), Some(ValidationError::NonPositiveAmount));
        }
    }

    #[test]
    fn malformed_date_rejected() {
        let result = RecordDraft::new("Food", "10", "05/01/2024").validate();
        assert_eq!(
            result.err(),
            Some(ValidationError::InvalidDate("05/01/2024".into()))
        );
    }

    #[test]
    fn record_json_round_trip() {
        let record = RecordDraft::new("Food", "120.50", "2024-01-05")
            .validate()
            .unwrap();
        let json = serde_json::to_string(&record).unwrap();
        let back: ExpenseRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn amount_serializes_as_number() {
        let record = RecordDraft::new("Food", "30", "2024-01-06")
            .validate()
            .unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["amount"].is_number());
        assert_eq!(json["date"], "2024-01-06");
    }
}
