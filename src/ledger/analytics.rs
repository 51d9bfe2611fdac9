use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use time::Date;

/// Trends are bounded to the most recent grouped buckets within the
/// filtered range.
pub const DAILY_TREND_DAYS: usize = 30;
pub const MONTHLY_TREND_MONTHS: usize = 12;

/// One matched ledger row, as projected by `ListQuery::entries_query`:
/// the record date, its grouping label (category or type) and the amount.
#[derive(Debug, Clone, FromRow)]
pub struct Entry {
    pub date: Date,
    pub label: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownSlice {
    pub label: String,
    pub total: Decimal,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: Date,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthPoint {
    pub month: String,
    pub total: Decimal,
}

pub fn round2(value: Decimal) -> Decimal {
    value.round_dp(2)
}

/// Unrounded sum over the matched rows. Callers round once they are done
/// combining totals (e.g. after computing a balance).
pub fn total(entries: &[Entry]) -> Decimal {
    entries.iter().map(|e| e.amount).sum()
}

fn daily_sums(entries: &[Entry]) -> BTreeMap<Date, Decimal> {
    let mut sums = BTreeMap::new();
    for e in entries {
        *sums.entry(e.date).or_insert(Decimal::ZERO) += e.amount;
    }
    sums
}

/// Mean of per-calendar-day sums; only days with at least one matched
/// record contribute to the denominator.
pub fn average_per_day(entries: &[Entry]) -> Decimal {
    let sums = daily_sums(entries);
    if sums.is_empty() {
        return Decimal::ZERO;
    }
    let total: Decimal = sums.values().copied().sum();
    round2(total / Decimal::from(sums.len() as u64))
}

/// Sum and count per label, descending by total. The sort is stable, so
/// equal totals keep their first-seen (storage) order.
pub fn breakdown(entries: &[Entry]) -> Vec<BreakdownSlice> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut slices: Vec<BreakdownSlice> = Vec::new();
    for e in entries {
        match index.get(e.label.as_str()) {
            Some(&i) => {
                slices[i].total += e.amount;
                slices[i].count += 1;
            }
            None => {
                index.insert(e.label.as_str(), slices.len());
                slices.push(BreakdownSlice {
                    label: e.label.clone(),
                    total: e.amount,
                    count: 1,
                });
            }
        }
    }
    slices.sort_by(|a, b| b.total.cmp(&a.total));
    for slice in &mut slices {
        slice.total = round2(slice.total);
    }
    slices
}

/// Per-day sums over the matched range: the 30 newest grouped days,
/// re-sorted ascending for display.
pub fn daily_trend(entries: &[Entry]) -> Vec<TrendPoint> {
    let sums = daily_sums(entries);
    let mut points: Vec<TrendPoint> = sums
        .into_iter()
        .rev()
        .take(DAILY_TREND_DAYS)
        .map(|(date, total)| TrendPoint { date, total: round2(total) })
        .collect();
    points.reverse();
    points
}

fn month_key(date: Date) -> String {
    format!("{:04}-{:02}", date.year(), u8::from(date.month()))
}

/// Per-calendar-month (`YYYY-MM`) sums: the 12 newest months, ascending.
pub fn monthly_trend(entries: &[Entry]) -> Vec<MonthPoint> {
    let mut sums: BTreeMap<String, Decimal> = BTreeMap::new();
    for e in entries {
        *sums.entry(month_key(e.date)).or_insert(Decimal::ZERO) += e.amount;
    }
    let mut points: Vec<MonthPoint> = sums
        .into_iter()
        .rev()
        .take(MONTHLY_TREND_MONTHS)
        .map(|(month, total)| MonthPoint { month, total: round2(total) })
        .collect();
    points.reverse();
    points
}
