//! Dashboard aggregations over the record collections.
//!
//! Pure functions; the time-dependent entry points delegate to `_at`
//! internals that take an explicit "now". Monetary sums stay unrounded
//! f64 all the way through, rounding happens only when formatting.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::models::{Estimate, Order, OrderStatus};

/// Polish short month names, January first
const MONTH_LABELS: [&str; 12] = [
    "Sty", "Lut", "Mar", "Kwi", "Maj", "Cze", "Lip", "Sie", "Wrz", "Paź", "Lis", "Gru",
];

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthBucket {
    pub month_label: String,
    pub amount: f64,
}

/// Bucket estimate totals by calendar month of `createdAt` into a window of
/// `window_months` buckets ending at the current month, oldest first.
/// Months without estimates report 0; estimates with a missing creation
/// timestamp or a non-finite total contribute nothing.
pub fn monthly_revenue(estimates: &[Estimate], window_months: usize) -> Vec<MonthBucket> {
    monthly_revenue_at(estimates, window_months, Utc::now())
}

fn monthly_revenue_at(
    estimates: &[Estimate],
    window_months: usize,
    now: DateTime<Utc>,
) -> Vec<MonthBucket> {
    // (year, zero-based month) per bucket, oldest first
    let months: Vec<(i32, u32)> = (0..window_months)
        .rev()
        .map(|back| shift_month(now.year(), now.month0(), back as i32))
        .collect();

    let mut buckets: Vec<MonthBucket> = months
        .iter()
        .map(|&(_, month0)| MonthBucket {
            month_label: MONTH_LABELS[month0 as usize].to_string(),
            amount: 0.0,
        })
        .collect();

    for estimate in estimates {
        let Some(created_at) = estimate.created_at else {
            continue;
        };
        if !estimate.total.is_finite() {
            continue;
        }
        let key = (created_at.year(), created_at.month0());
        if let Some(pos) = months.iter().position(|&m| m == key) {
            buckets[pos].amount += estimate.total;
        }
    }

    buckets
}

/// Sum of totals for estimates created in the current calendar month,
/// formatted as a Polish currency string ("12 450 PLN"). Empty input
/// yields "0 PLN".
pub fn current_month_revenue(estimates: &[Estimate]) -> String {
    format_pln(current_month_revenue_at(estimates, Utc::now()))
}

fn current_month_revenue_at(estimates: &[Estimate], now: DateTime<Utc>) -> f64 {
    estimates
        .iter()
        .filter_map(|e| e.created_at.map(|ts| (ts, e.total)))
        .filter(|(ts, total)| {
            ts.year() == now.year() && ts.month() == now.month() && total.is_finite()
        })
        .map(|(_, total)| total)
        .sum()
}

/// Count of orders per status. Empty input yields an empty map; a missing
/// status field already defaulted to `new` at deserialization.
pub fn order_status_counts(orders: &[Order]) -> BTreeMap<OrderStatus, usize> {
    let mut counts = BTreeMap::new();
    for order in orders {
        *counts.entry(order.status).or_insert(0) += 1;
    }
    counts
}

/// Whole-złoty presentation with space-grouped thousands.
pub fn format_pln(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.abs().to_string();

    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    let sign = if rounded < 0 { "-" } else { "" };
    format!("{sign}{grouped} PLN")
}

fn shift_month(year: i32, month0: u32, back: i32) -> (i32, u32) {
    let index = year * 12 + month0 as i32 - back;
    (index.div_euclid(12), index.rem_euclid(12) as u32)
}
