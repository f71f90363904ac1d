//! Low-stock warnings on the cashier screen and the kitchen stock view.

use std::collections::HashSet;

use serde::Serialize;

use crate::kitchen::{paginate, Page};
use crate::models::{Category, CookingStatus, KitchenOrder, MenuItem, Stock, StockItem, StockOrderRef, StockStatus};
use crate::notice::Notice;

pub const STOCK_PER_PAGE: usize = 10;

/// Limited stock, a threshold configured, and `0 < stock <= threshold`.
pub fn is_low_stock(item: &MenuItem) -> bool {
    match (item.stock, item.low_stock_threshold) {
        (Stock::Count(n), Some(threshold)) => n > 0 && n <= threshold,
        _ => false,
    }
}

/// Cashier banner state. Dismissals live only as long as this value.
#[derive(Debug, Default, Clone)]
pub struct LowStockAlerts {
    dismissed: HashSet<i64>,
}

impl LowStockAlerts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self, menu: &[MenuItem]) -> Vec<MenuItem> {
        menu.iter()
            .filter(|item| is_low_stock(item) && !self.dismissed.contains(&item.id))
            .cloned()
            .collect()
    }

    pub fn dismiss(&mut self, item_id: i64) {
        self.dismissed.insert(item_id);
    }

    pub fn is_dismissed(&self, item_id: i64) -> bool {
        self.dismissed.contains(&item_id)
    }
}

pub fn stock_code(menu_item_id: i64) -> String {
    format!("M{:03}", menu_item_id)
}

/// Stock per menu item with the unfinished kitchen lines consuming it.
/// Items without their own threshold use `default_threshold`.
pub fn stock_items(
    menu: &[MenuItem],
    categories: &[Category],
    kitchen_orders: &[KitchenOrder],
    default_threshold: u32,
) -> Vec<StockItem> {
    menu.iter()
        .map(|item| {
            let orders: Vec<StockOrderRef> = kitchen_orders
                .iter()
                .flat_map(|order| {
                    order
                        .items
                        .iter()
                        .filter(|line| line.menu_item_id == item.id && line.cooking_status != CookingStatus::Done)
                        .map(move |line| StockOrderRef {
                            order_code: order.order_code.clone(),
                            order_time: order.order_time.clone(),
                            quantity: line.quantity,
                            order_type: order.order_type,
                        })
                })
                .collect();

            let threshold = item.low_stock_threshold.unwrap_or(default_threshold);
            let status = match item.stock {
                Stock::Count(n) if n <= threshold => StockStatus::Low,
                _ => StockStatus::Sufficient,
            };

            let category = categories
                .iter()
                .find(|c| c.id == item.category_id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| item.category_id.clone());

            StockItem {
                menu_item_id: item.id,
                code: stock_code(item.id),
                name: item.name.clone(),
                category,
                stock: item.stock,
                in_queue: orders.iter().map(|o| o.quantity).sum(),
                status,
                orders,
            }
        })
        .collect()
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct StockStats {
    pub total_menu: usize,
    pub total_queue: u32,
    pub low: usize,
    pub sufficient: usize,
}

impl StockStats {
    pub fn of(items: &[StockItem]) -> Self {
        StockStats {
            total_menu: items.len(),
            total_queue: items.iter().map(|i| i.in_queue).sum(),
            low: items.iter().filter(|i| i.status == StockStatus::Low).count(),
            sufficient: items.iter().filter(|i| i.status == StockStatus::Sufficient).count(),
        }
    }
}

/// Case-insensitive match on name or stock code.
pub fn search(items: &[StockItem], query: &str) -> Vec<StockItem> {
    let query = query.trim().to_lowercase();
    items
        .iter()
        .filter(|item| {
            query.is_empty() || item.name.to_lowercase().contains(&query) || item.code.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

pub fn page(items: &[StockItem], query: &str, page: usize) -> Page<StockItem> {
    paginate(&search(items, query), page, STOCK_PER_PAGE)
}

/// Kitchen-side "notify cashier" button. Only produces the toast.
pub fn notify_cashier(item: &StockItem) -> Notice {
    let remaining = match item.stock {
        Stock::Unlimited => "unlimited".to_string(),
        Stock::Count(n) => n.to_string(),
    };
    let status = match item.status {
        StockStatus::Low => "Low",
        StockStatus::Sufficient => "Sufficient",
    };
    Notice::success(format!("Low stock notice for {} sent to cashier", item.name))
        .with_description(format!("Remaining stock: {} - Status: {}", remaining, status))
}
