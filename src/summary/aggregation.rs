//! Pure aggregation over a user's transactions.
//!
//! Everything here is deterministic arithmetic over already-fetched records:
//! no queries, no clock, no side effects. The caller scopes the records to
//! one user and hands over an inclusive date range; [summarize] does the
//! rest with explicit in-memory folds.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::Serialize;
use time::Date;

use crate::{category::CategoryKind, transaction::TransactionRecord};

/// How many transactions the summary lists as "recent".
const RECENT_TRANSACTION_LIMIT: usize = 10;

/// A full financial summary for one user over one date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// The sum of all income amounts in range. Zero when there are none.
    pub total_income: Decimal,
    /// The sum of all expense amounts in range. Zero when there are none.
    pub total_expenses: Decimal,
    /// `total_income - total_expenses`. Negative when more was spent than
    /// earned.
    pub net_balance: Decimal,
    /// Income grouped per category, largest first. Empty when there is no
    /// income in range.
    pub income_by_category: Vec<CategoryBreakdown>,
    /// Expenses grouped per category, largest first. Empty when there are no
    /// expenses in range.
    pub expenses_by_category: Vec<CategoryBreakdown>,
    /// Per-month income, expenses and net, oldest first. Only months with at
    /// least one transaction appear.
    pub monthly_trend: Vec<MonthlyBucket>,
    /// The ten most recent transactions in range, newest first.
    pub recent_transactions: Vec<TransactionRecord>,
}

/// One category's share of the income or expenses in a summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    /// The name of the category.
    pub name: String,
    /// The summed transaction amounts for the category.
    pub amount: Decimal,
    /// The display colour of the category.
    pub color: String,
    /// The category's share of the type total, as a percentage rounded to
    /// one decimal place.
    pub percentage: f64,
}

/// The income, expenses and net of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBucket {
    /// The month, formatted `YYYY-MM`.
    pub month: String,
    /// The sum of the month's income amounts. Zero when there are none.
    pub income: Decimal,
    /// The sum of the month's expense amounts. Zero when there are none.
    pub expenses: Decimal,
    /// `income - expenses` for the month.
    pub net: Decimal,
}

/// Summarize `records` over the inclusive date range `[start, end]`.
///
/// The caller is expected to have scoped `records` to a single user already;
/// records outside the date range are ignored. An empty input produces a
/// summary of zeros and empty lists.
pub fn summarize(records: &[TransactionRecord], start: Date, end: Date) -> Summary {
    let in_range: Vec<&TransactionRecord> = records
        .iter()
        .filter(|record| start <= record.date && record.date <= end)
        .collect();

    let total_income = sum_amounts(&in_range, CategoryKind::Income);
    let total_expenses = sum_amounts(&in_range, CategoryKind::Expense);

    Summary {
        total_income,
        total_expenses,
        net_balance: total_income - total_expenses,
        income_by_category: breakdown_by_category(&in_range, CategoryKind::Income, total_income),
        expenses_by_category: breakdown_by_category(
            &in_range,
            CategoryKind::Expense,
            total_expenses,
        ),
        monthly_trend: bucket_by_month(&in_range),
        recent_transactions: most_recent(&in_range),
    }
}

fn sum_amounts(records: &[&TransactionRecord], kind: CategoryKind) -> Decimal {
    records
        .iter()
        .filter(|record| record.kind == kind)
        .map(|record| record.amount)
        .sum()
}

/// Group the records of one kind by category and work out each group's share
/// of `kind_total`.
///
/// Groups are keyed on (name, colour) pairs and sorted by amount descending,
/// name ascending on ties. A zero `kind_total` means there is nothing to
/// break down (and nothing to divide by), so the result is an empty list.
fn breakdown_by_category(
    records: &[&TransactionRecord],
    kind: CategoryKind,
    kind_total: Decimal,
) -> Vec<CategoryBreakdown> {
    if kind_total.is_zero() {
        return Vec::new();
    }

    let mut totals: HashMap<(&str, &str), Decimal> = HashMap::new();

    for record in records.iter().filter(|record| record.kind == kind) {
        let key = (
            record.category_name.as_str(),
            record.category_color.as_str(),
        );
        *totals.entry(key).or_insert(Decimal::ZERO) += record.amount;
    }

    let mut breakdown: Vec<CategoryBreakdown> = totals
        .into_iter()
        .map(|((name, color), amount)| CategoryBreakdown {
            name: name.to_owned(),
            amount,
            color: color.to_owned(),
            percentage: (amount / kind_total * Decimal::ONE_HUNDRED)
                .round_dp(1)
                .to_f64()
                .unwrap_or(0.0),
        })
        .collect();

    breakdown.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.name.cmp(&b.name)));

    breakdown
}

/// Bucket the records by calendar month, oldest month first.
///
/// Only months that appear in the records are emitted; the trend is sparse
/// rather than zero-filled.
fn bucket_by_month(records: &[&TransactionRecord]) -> Vec<MonthlyBucket> {
    let mut totals: BTreeMap<Date, (Decimal, Decimal)> = BTreeMap::new();

    for record in records {
        let month = record.date.replace_day(1).unwrap();
        let (income, expenses) = totals.entry(month).or_insert((Decimal::ZERO, Decimal::ZERO));

        match record.kind {
            CategoryKind::Income => *income += record.amount,
            CategoryKind::Expense => *expenses += record.amount,
        }
    }

    totals
        .into_iter()
        .map(|(month, (income, expenses))| MonthlyBucket {
            month: format!("{:04}-{:02}", month.year(), u8::from(month.month())),
            income,
            expenses,
            net: income - expenses,
        })
        .collect()
}

/// The ten most recent records: date descending, creation time descending,
/// then ID descending so the order is total.
fn most_recent(records: &[&TransactionRecord]) -> Vec<TransactionRecord> {
    let mut sorted: Vec<&TransactionRecord> = records.to_vec();

    sorted.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| b.id.cmp(&a.id))
    });

    sorted
        .into_iter()
        .take(RECENT_TRANSACTION_LIMIT)
        .cloned()
        .collect()
}
