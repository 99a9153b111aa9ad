use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::extraction::{category, extract_amount};
use crate::models::{ExpenseRecord, ExpenseStatus};

/// Aggregate rollup over a collection of expense records, consumed by the
/// dashboard charts. Computed in one pass; the result never depends on the
/// order of the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseStatistics {
    pub total: u64,
    pub pending_count: u64,
    pub approved_count: u64,
    pub rejected_count: u64,
    pub total_approved_amount: Decimal,
    pub pending_amount: Decimal,
    pub approval_rate: f64,
    pub average_approved_expense: Decimal,
    pub monthly_totals: Vec<MonthlyTotal>,
    pub category_breakdown: BTreeMap<String, u64>,
}

/// One point of the approved-spend time series; `month` is "YYYY-MM".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    pub month: String,
    pub amount: Decimal,
}

pub fn summarize<'a, I>(records: I) -> ExpenseStatistics
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    let mut total = 0u64;
    let mut pending_count = 0u64;
    let mut approved_count = 0u64;
    let mut rejected_count = 0u64;
    let mut total_approved_amount = Decimal::ZERO;
    let mut pending_amount = Decimal::ZERO;
    let mut monthly: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut category_breakdown: BTreeMap<String, u64> = BTreeMap::new();

    for record in records {
        total += 1;
        match record.status {
            ExpenseStatus::Pending => {
                pending_count += 1;
                pending_amount += extract_amount(&record.extracted_fields);
            }
            ExpenseStatus::Approved => {
                approved_count += 1;
                let amount = extract_amount(&record.extracted_fields);
                total_approved_amount += amount;

                let month = record.created_at.format("%Y-%m").to_string();
                *monthly.entry(month).or_insert(Decimal::ZERO) += amount;
                *category_breakdown
                    .entry(category(&record.extracted_fields))
                    .or_insert(0) += 1;
            }
            ExpenseStatus::Rejected => rejected_count += 1,
        }
    }

    let approval_rate = if total == 0 {
        0.0
    } else {
        approved_count as f64 / total as f64
    };
    let average_approved_expense = if approved_count == 0 {
        Decimal::ZERO
    } else {
        total_approved_amount / Decimal::from(approved_count)
    };

    // BTreeMap iteration gives the series in chronological order: "YYYY-MM"
    // keys sort lexicographically.
    let monthly_totals = monthly
        .into_iter()
        .map(|(month, amount)| MonthlyTotal { month, amount })
        .collect();

    ExpenseStatistics {
        total,
        pending_count,
        approved_count,
        rejected_count,
        total_approved_amount,
        pending_amount,
        approval_rate,
        average_approved_expense,
        monthly_totals,
        category_breakdown,
    }
}
