use chrono::{Duration, Local, NaiveDate};
use serde::Serialize;
use tauri::State;

use crate::models::{DaySummary, MenuTrend, SalesPoint};
use crate::reports::{self, SalesRange};
use crate::repository::OrderRepository;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MenuTrendsView {
    pub best_sellers: Vec<MenuTrend>,
    pub least_sellers: Vec<MenuTrend>,
}

#[tauri::command]
pub fn get_sales_series(range: SalesRange) -> Vec<SalesPoint> {
    reports::sales_series(range)
}

/// Trends over the last `days` days (default 7) against the days before.
#[tauri::command]
pub fn get_menu_trends(state: State<'_, AppState>, days: Option<i64>, limit: Option<usize>) -> Result<MenuTrendsView, String> {
    let orders = state.db.list().map_err(|e| e.to_string())?;
    let period = Duration::days(days.unwrap_or(7).max(1));
    let trends = reports::menu_trends(&orders, Local::now() - period, period);
    let limit = limit.unwrap_or(3);

    Ok(MenuTrendsView {
        best_sellers: reports::best_sellers(&trends, limit),
        least_sellers: reports::least_sellers(&trends, limit),
    })
}

#[tauri::command]
pub fn get_day_summary(state: State<'_, AppState>, date: Option<String>) -> Result<DaySummary, String> {
    let date = match date {
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| e.to_string())?,
        None => Local::now().date_naive(),
    };
    let orders = state.db.list().map_err(|e| e.to_string())?;
    Ok(reports::day_summary(&orders, date))
}
