//! Owner dashboards: revenue series and menu trends.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{DaySummary, MenuTrend, Money, Order, SalesPoint};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SalesRange {
    Weekly,
    Monthly,
    Yearly,
}

fn points(rows: &[(&str, Money, Money)]) -> Vec<SalesPoint> {
    rows.iter()
        .map(|(label, revenue, previous)| SalesPoint {
            label: label.to_string(),
            revenue: *revenue,
            previous_revenue: Some(*previous),
        })
        .collect()
}

/// Demonstration revenue with the previous period alongside.
pub fn sales_series(range: SalesRange) -> Vec<SalesPoint> {
    match range {
        SalesRange::Weekly => points(&[
            ("Senin", 2_500_000, 2_200_000),
            ("Selasa", 2_800_000, 2_500_000),
            ("Rabu", 3_200_000, 2_900_000),
            ("Kamis", 2_900_000, 3_100_000),
            ("Jumat", 3_500_000, 3_300_000),
            ("Sabtu", 4_200_000, 3_800_000),
            ("Minggu", 3_800_000, 3_500_000),
        ]),
        SalesRange::Monthly => points(&[
            ("Jan", 45_000_000, 42_000_000),
            ("Feb", 48_000_000, 45_000_000),
            ("Mar", 52_000_000, 48_000_000),
            ("Apr", 49_000_000, 52_000_000),
            ("Mei", 55_000_000, 49_000_000),
            ("Jun", 58_000_000, 55_000_000),
            ("Jul", 62_000_000, 58_000_000),
            ("Agu", 59_000_000, 62_000_000),
            ("Sep", 65_000_000, 59_000_000),
            ("Okt", 68_000_000, 65_000_000),
            ("Nov", 72_000_000, 68_000_000),
            ("Des", 78_000_000, 72_000_000),
        ]),
        SalesRange::Yearly => points(&[
            ("2020", 450_000_000, 380_000_000),
            ("2021", 520_000_000, 450_000_000),
            ("2022", 680_000_000, 520_000_000),
            ("2023", 750_000_000, 680_000_000),
            ("2024", 820_000_000, 750_000_000),
        ]),
    }
}

/// Revenue and order count for orders created on `date` (local time).
pub fn day_summary(orders: &[Order], date: NaiveDate) -> DaySummary {
    let todays: Vec<&Order> = orders.iter().filter(|o| o.created_at.date_naive() == date).collect();
    DaySummary {
        date: date.format("%Y-%m-%d").to_string(),
        total_revenue: todays.iter().map(|o| o.total).sum(),
        total_orders: todays.len() as u32,
    }
}

#[derive(Default)]
struct Tally {
    name: String,
    sold: u32,
    revenue: Money,
    previous_sold: u32,
}

fn percent_change(current: u32, previous: u32) -> f64 {
    if previous == 0 {
        return if current > 0 { 100.0 } else { 0.0 };
    }
    let change = (f64::from(current) - f64::from(previous)) / f64::from(previous) * 100.0;
    (change * 10.0).round() / 10.0
}

/// Units and revenue per menu item for `[start, start + period)`, with the
/// trend against the period just before. Sorted best seller first.
pub fn menu_trends(orders: &[Order], start: DateTime<Local>, period: Duration) -> Vec<MenuTrend> {
    let end = start + period;
    let previous_start = start - period;
    let mut tallies: BTreeMap<i64, Tally> = BTreeMap::new();

    for order in orders {
        let at = order.created_at;
        let current = at >= start && at < end;
        let previous = at >= previous_start && at < start;
        if !current && !previous {
            continue;
        }

        for line in &order.items {
            let tally = tallies.entry(line.item.id).or_default();
            tally.name.clone_from(&line.item.name);
            if current {
                tally.sold += line.quantity;
                tally.revenue += line.line_total();
            } else {
                tally.previous_sold += line.quantity;
            }
        }
    }

    let mut trends: Vec<MenuTrend> = tallies
        .into_iter()
        .map(|(id, tally)| MenuTrend {
            menu_item_id: id,
            trend: percent_change(tally.sold, tally.previous_sold),
            name: tally.name,
            sold: tally.sold,
            revenue: tally.revenue,
        })
        .collect();

    trends.sort_by(|a, b| b.sold.cmp(&a.sold).then(b.revenue.cmp(&a.revenue)));
    trends
}

pub fn best_sellers(trends: &[MenuTrend], limit: usize) -> Vec<MenuTrend> {
    trends.iter().take(limit).cloned().collect()
}

/// Lowest sellers first.
pub fn least_sellers(trends: &[MenuTrend], limit: usize) -> Vec<MenuTrend> {
    trends.iter().rev().take(limit).cloned().collect()
}
