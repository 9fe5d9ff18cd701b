//! Pure read models over a record list. Nothing here mutates input or keeps
//! state; the presentation layer feeds these straight into tables and charts.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::record::ExpenseRecord;

/// One point of the amount-versus-date projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub amount: Decimal,
    pub date: NaiveDate,
}

/// Sum amounts per category, in first-seen category order.
///
/// Categories group by exact string equality. The order only exists to keep
/// output reproducible; it carries no meaning.
pub fn totals_by_category(records: &[ExpenseRecord]) -> Vec<(String, Decimal)> {
    let mut totals: Vec<(String, Decimal)> = Vec::new();
    for record in records {
        match totals.iter_mut().find(|(cat, _)| *cat == record.category) {
            Some((_, total)) => *total += record.amount,
            None => totals.push((record.category.clone(), record.amount)),
        }
    }
    totals
}

/// Sum amounts per date, keys ascending.
pub fn totals_by_date(records: &[ExpenseRecord]) -> BTreeMap<NaiveDate, Decimal> {
    let mut totals = BTreeMap::new();
    for record in records {
        *totals.entry(record.date).or_insert(Decimal::ZERO) += record.amount;
    }
    totals
}

/// Project every record to an `{amount, date}` point, in input order.
pub fn scatter_series(records: &[ExpenseRecord]) -> Vec<ScatterPoint> {
    records
        .iter()
        .map(|record| ScatterPoint {
            amount: record.amount,
            date: record.date,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordDraft;
    use rust_decimal_macros::dec;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn sample() -> Vec<ExpenseRecord> {
        vec![
            RecordDraft::new("Food", "120.50", "2024-01-05").validate().unwrap(),
            RecordDraft::new("Food", "30", "2024-01-06").validate().unwrap(),
            RecordDraft::new("Travel", "50", "2024-01-05").validate().unwrap(),
        ]
    }

    #[test]
    fn category_totals_group_and_sum() {
        let totals = totals_by_category(&sample());
        assert_eq!(
            totals,
            vec![
                ("Food".to_string(), dec!(150.50)),
                ("Travel".to_string(), dec!(50)),
            ]
        );
    }

    #[test]
    fn category_totals_invariant_under_reordering() {
        let mut records = sample();
        records.reverse();
        let mut reordered = totals_by_category(&records);
        let mut original = totals_by_category(&sample());
        reordered.sort();
        original.sort();
        assert_eq!(reordered, original);
    }

    #[test]
    fn date_totals_ascend_and_preserve_sum() {
        let records = sample();
        let totals = totals_by_date(&records);

        let dates: Vec<&NaiveDate> = totals.keys().collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);

        assert_eq!(totals.get(&day("2024-01-05")), Some(&dec!(170.50)));
        assert_eq!(totals.get(&day("2024-01-06")), Some(&dec!(30)));

        let input_sum: Decimal = records.iter().map(|r| r.amount).sum();
        let output_sum: Decimal = totals.values().copied().sum();
        assert_eq!(input_sum, output_sum);
    }

    #[test]
    fn scatter_projects_in_input_order() {
        let records = sample();
        let series = scatter_series(&records);
        assert_eq!(series.len(), records.len());
        for (point, record) in series.iter().zip(&records) {
            assert_eq!(point.amount, record.amount);
            assert_eq!(point.date, record.date);
        }
    }

    #[test]
    fn empty_input_yields_empty_results() {
        assert!(totals_by_category(&[]).is_empty());
        assert!(totals_by_date(&[]).is_empty());
        assert!(scatter_series(&[]).is_empty());
    }
}
