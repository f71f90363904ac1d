//! Kitchen order board over the shared order store.

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::models::{CookingStatus, KitchenOrder};
use crate::notice::Notice;
use crate::repository::OrderRepository;

pub const ORDERS_PER_PAGE: usize = 9;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub total: usize,
    pub waiting: usize,
    pub cooking: usize,
    pub done: usize,
}

impl StatusCounts {
    pub fn of(orders: &[KitchenOrder]) -> Self {
        orders.iter().fold(
            StatusCounts {
                total: orders.len(),
                ..Default::default()
            },
            |mut counts, order| {
                match order.status {
                    CookingStatus::Waiting => counts.waiting += 1,
                    CookingStatus::Cooking => counts.cooking += 1,
                    CookingStatus::Done => counts.done += 1,
                }
                counts
            },
        )
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// 1-based page slice; out-of-range pages are empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let total_pages = items.len().div_ceil(per_page);
    let page = page.max(1);
    let start = (page - 1).saturating_mul(per_page).min(items.len());
    let end = (start + per_page).min(items.len());
    Page {
        items: items[start..end].to_vec(),
        page,
        total_pages,
        total_items: items.len(),
    }
}

pub struct KitchenBoard<'a, R: OrderRepository + ?Sized> {
    repo: &'a R,
}

impl<'a, R: OrderRepository + ?Sized> KitchenBoard<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        KitchenBoard { repo }
    }

    pub fn orders(&self) -> Result<Vec<KitchenOrder>> {
        self.repo.kitchen_orders()
    }

    pub fn order(&self, order_id: &str) -> Result<KitchenOrder> {
        self.repo.kitchen_order(order_id)
    }

    pub fn counts(&self) -> Result<StatusCounts> {
        Ok(StatusCounts::of(&self.orders()?))
    }

    /// Case-insensitive match on order code or customer name.
    pub fn search(&self, query: &str) -> Result<Vec<KitchenOrder>> {
        let query = query.trim().to_lowercase();
        let orders = self.orders()?;
        if query.is_empty() {
            return Ok(orders);
        }
        Ok(orders
            .into_iter()
            .filter(|order| {
                order.order_code.to_lowercase().contains(&query)
                    || order
                        .customer_name
                        .as_deref()
                        .is_some_and(|name| name.to_lowercase().contains(&query))
            })
            .collect())
    }

    pub fn page(&self, query: &str, page: usize) -> Result<Page<KitchenOrder>> {
        Ok(paginate(&self.search(query)?, page, ORDERS_PER_PAGE))
    }

    pub fn set_item_status(&self, order_id: &str, item_id: i64, status: CookingStatus) -> Result<KitchenOrder> {
        let order = self.repo.update_item_status(order_id, item_id, status)?;
        debug!(order_id, item_id, status = status.as_str(), aggregate = order.status.as_str(), "item status changed");
        Ok(order)
    }

    pub fn complete_order(&self, order_id: &str) -> Result<(KitchenOrder, Notice)> {
        let order = self.repo.complete(order_id)?;
        let notice = Notice::success(format!("Order {} completed", order.order_code));
        Ok((order, notice))
    }
}
