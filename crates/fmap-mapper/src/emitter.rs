//! Ledger emitter: double-entry rendering of typed records.
//!
//! Each record becomes a transaction block:
//!
//! ```text
//! 02/01    Payee
//!     ;Supermarket
//!     misc    €45.30
//!     current
//! ```
//!
//! Blocks are ordered by operation date. The sort is stable, so records
//! sharing a date keep their input order.

use crate::record::Record;
use crate::schema::{Column, Schema};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

/// One rendered double-entry transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Input line the transaction came from.
    pub line: u64,
    /// Operation date.
    pub date: NaiveDate,
    /// Payee.
    pub payee: String,
    /// Description, written as a comment.
    pub description: String,
    /// Account on the first posting line, carrying the amount.
    pub credit_account: String,
    /// Account on the second posting line.
    pub debit_account: String,
    /// Signed amount as read from the input.
    pub amount: Decimal,
    /// Symbol prefixed to the amount.
    pub currency_symbol: String,
}

impl LedgerEntry {
    /// The absolute amount with its currency symbol and two decimals.
    pub fn formatted_amount(&self) -> String {
        let mut rounded = self
            .amount
            .abs()
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(2);
        format!("{}{}", self.currency_symbol, rounded)
    }
}

impl fmt::Display for LedgerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\n\t;{}\n\t{}\t{}\n\t{}",
            self.date.format("%m/%d"),
            self.payee,
            self.description,
            self.credit_account,
            self.formatted_amount(),
            self.debit_account
        )
    }
}

/// Why a record was left out of the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The operation date was empty.
    MissingDate,
    /// The record has no typed amount.
    MissingAmount,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDate => f.write_str("no operation date"),
            Self::MissingAmount => f.write_str("no amount"),
        }
    }
}

/// A record dropped at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Input line of the record.
    pub line: u64,
    /// Why it was dropped.
    pub reason: SkipReason,
}

/// Output of [`LedgerEmitter::render`].
#[derive(Debug, Clone, Default)]
pub struct Rendered {
    /// Transactions in output order.
    pub entries: Vec<LedgerEntry>,
    /// Records that were dropped.
    pub skipped: Vec<SkippedRecord>,
}

impl Rendered {
    /// Text blocks, one per transaction, in output order.
    pub fn blocks(&self) -> impl Iterator<Item = String> + '_ {
        self.entries.iter().map(ToString::to_string)
    }

    /// The whole ledger: every block followed by a blank line.
    pub fn to_ledger_string(&self) -> String {
        let mut out = String::new();
        for block in self.blocks() {
            out.push_str(&block);
            out.push_str("\n\n");
        }
        out
    }
}

/// Renders records of one schema as ledger transactions.
#[derive(Debug, Clone, Copy)]
pub struct LedgerEmitter<'a> {
    schema: &'a Schema,
}

impl<'a> LedgerEmitter<'a> {
    /// Create an emitter using the defaults of `schema`.
    pub const fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Order `records` by operation date and render each one.
    ///
    /// Records without an operation date or amount are logged and skipped.
    pub fn render(&self, records: &[Record]) -> Rendered {
        let mut ordered: Vec<&Record> = records.iter().collect();
        ordered.sort_by_key(|r| r.date(Column::DateOperation));

        let mut rendered = Rendered::default();
        for record in ordered {
            match self.entry(record) {
                Ok(entry) => rendered.entries.push(entry),
                Err(reason) => {
                    tracing::warn!(
                        format = %self.schema.name,
                        line = record.line,
                        %reason,
                        "skipping record"
                    );
                    rendered.skipped.push(SkippedRecord {
                        line: record.line,
                        reason,
                    });
                }
            }
        }
        rendered
    }

    /// Derive the transaction for a single record.
    ///
    /// An outflow credits the schema's credit account and debits its debit
    /// account; an inflow (including zero) swaps them.
    pub fn entry(&self, record: &Record) -> Result<LedgerEntry, SkipReason> {
        let date = record
            .date(Column::DateOperation)
            .ok_or(SkipReason::MissingDate)?;
        let amount = record
            .amount(Column::Amount)
            .ok_or(SkipReason::MissingAmount)?;

        let schema = self.schema;
        let (credit_account, debit_account) = if amount < Decimal::ZERO {
            (&schema.credit_account, &schema.debit_account)
        } else {
            (&schema.debit_account, &schema.credit_account)
        };

        Ok(LedgerEntry {
            line: record.line,
            date,
            payee: schema.payee.clone(),
            description: record
                .text(Column::Description)
                .unwrap_or_default()
                .to_string(),
            credit_account: credit_account.clone(),
            debit_account: debit_account.clone(),
            amount,
            currency_symbol: schema.currency_symbol.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Value;
    use rust_decimal_macros::dec;

    fn schema() -> Schema {
        Schema::builder("test")
            .columns([Column::DateOperation, Column::Description, Column::Amount])
            .debit_account("A")
            .credit_account("B")
            .build()
    }

    fn record(line: u64, date: Option<(i32, u32, u32)>, desc: &str, amount: Decimal) -> Record {
        let mut r = Record::template(&[Column::DateOperation, Column::Description, Column::Amount]);
        r.line = line;
        assert!(r.set(
            Column::DateOperation,
            Value::Date(date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))),
        ));
        assert!(r.set(Column::Description, Value::Text(desc.to_string())));
        assert!(r.set(Column::Amount, Value::Amount(amount)));
        r
    }

    #[test]
    fn test_outflow_accounts() {
        let schema = schema();
        let emitter = LedgerEmitter::new(&schema);
        let entry = emitter
            .entry(&record(2, Some((2024, 3, 5)), "Coffee", dec!(-12.50)))
            .unwrap();
        assert_eq!(entry.credit_account, "B");
        assert_eq!(entry.debit_account, "A");
        assert_eq!(entry.formatted_amount(), "€12.50");
    }

    #[test]
    fn test_inflow_accounts() {
        let schema = schema();
        let emitter = LedgerEmitter::new(&schema);
        let entry = emitter
            .entry(&record(2, Some((2024, 3, 5)), "Salary", dec!(12.50)))
            .unwrap();
        assert_eq!(entry.credit_account, "A");
        assert_eq!(entry.debit_account, "B");

        let zero = emitter
            .entry(&record(3, Some((2024, 3, 5)), "Zero", dec!(0)))
            .unwrap();
        assert_eq!(zero.credit_account, "A");
        assert_eq!(zero.formatted_amount(), "€0.00");
    }

    #[test]
    fn test_block_layout() {
        let schema = schema();
        let emitter = LedgerEmitter::new(&schema);
        let entry = emitter
            .entry(&record(2, Some((2024, 2, 1)), "Supermarket", dec!(-45.3)))
            .unwrap();
        assert_eq!(
            entry.to_string(),
            "02/01\tPayee\n\t;Supermarket\n\tB\t€45.30\n\tA"
        );
    }

    #[test]
    fn test_amount_rounding() {
        let schema = schema();
        let emitter = LedgerEmitter::new(&schema);
        let entry = emitter
            .entry(&record(2, Some((2024, 2, 1)), "x", dec!(-1.005)))
            .unwrap();
        assert_eq!(entry.formatted_amount(), "€1.01");
        let entry = emitter
            .entry(&record(2, Some((2024, 2, 1)), "x", dec!(1234)))
            .unwrap();
        assert_eq!(entry.formatted_amount(), "€1234.00");
    }

    #[test]
    fn test_render_sorted_and_stable() {
        let schema = schema();
        let records = vec![
            record(2, Some((2024, 1, 10)), "late", dec!(1)),
            record(3, Some((2024, 1, 5)), "first-of-day", dec!(2)),
            record(4, Some((2024, 1, 5)), "second-of-day", dec!(3)),
            record(5, Some((2024, 1, 1)), "early", dec!(4)),
        ];
        let rendered = LedgerEmitter::new(&schema).render(&records);
        let order: Vec<_> = rendered
            .entries
            .iter()
            .map(|e| e.description.as_str())
            .collect();
        assert_eq!(order, vec!["early", "first-of-day", "second-of-day", "late"]);
        assert!(rendered.skipped.is_empty());
    }

    #[test]
    fn test_render_skips_missing_date() {
        let schema = schema();
        let records = vec![record(2, None, "undated", dec!(-1))];
        let rendered = LedgerEmitter::new(&schema).render(&records);
        assert!(rendered.entries.is_empty());
        assert_eq!(
            rendered.skipped,
            vec![SkippedRecord {
                line: 2,
                reason: SkipReason::MissingDate
            }]
        );
        assert_eq!(rendered.to_ledger_string(), "");
    }

    #[test]
    fn test_render_skips_untyped_amount() {
        let schema = schema();
        let mut r = record(2, Some((2024, 1, 1)), "raw", dec!(0));
        assert!(r.set(Column::Amount, Value::Text("1".to_string())));
        let rendered = LedgerEmitter::new(&schema).render(&[r]);
        assert_eq!(rendered.skipped[0].reason, SkipReason::MissingAmount);
    }

    #[test]
    fn test_render_does_not_mutate_input() {
        let schema = schema();
        let records = vec![
            record(2, Some((2024, 1, 10)), "b", dec!(1)),
            record(3, Some((2024, 1, 1)), "a", dec!(1)),
        ];
        let before = records.clone();
        let _ = LedgerEmitter::new(&schema).render(&records);
        assert_eq!(records, before);
    }

    #[test]
    fn test_ledger_string_separates_blocks() {
        let schema = schema();
        let records = vec![
            record(2, Some((2024, 1, 1)), "a", dec!(-1)),
            record(3, Some((2024, 1, 2)), "b", dec!(2)),
        ];
        let text = LedgerEmitter::new(&schema).render(&records).to_ledger_string();
        assert_eq!(
            text,
            "01/01\tPayee\n\t;a\n\tB\t€1.00\n\tA\n\n01/02\tPayee\n\t;b\n\tA\t€2.00\n\tB\n\n"
        );
    }
}
