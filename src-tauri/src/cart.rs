//! The in-progress transaction on the cashier screen.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{PosError, Result};
use crate::models::{CartItem, MenuItem, Money};
use crate::notice::Notice;

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = 99_999;

/// Ordered cart lines keyed by menu item id.
///
/// A line's quantity never exceeds its item's stock unless the stock is
/// unlimited, and an item id appears at most once.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|line| line.quantity).sum()
    }

    pub fn get(&self, item_id: i64) -> Option<&CartItem> {
        self.items.iter().find(|line| line.item.id == item_id)
    }

    pub fn line_total(&self, item_id: i64) -> Option<Money> {
        self.get(item_id).map(CartItem::line_total)
    }

    pub fn add(&mut self, item: &MenuItem, quantity: u32) -> Result<Notice> {
        if quantity == 0 {
            return Err(PosError::Invalid("quantity must be at least 1".to_string()));
        }
        if item.stock.is_sold_out() {
            warn!(item_id = item.id, "add rejected: sold out");
            return Err(PosError::OutOfStock(item.name.clone()));
        }

        let current = self.get(item.id).map(|line| line.quantity).unwrap_or(0);
        let wanted = current.saturating_add(quantity);
        check_line_quantity(wanted)?;
        if !item.stock.allows(wanted) {
            warn!(item_id = item.id, wanted, "add rejected: over stock");
            return Err(PosError::InsufficientStock {
                name: item.name.clone(),
                available: item.stock.count().unwrap_or(0),
            });
        }

        match self.items.iter_mut().find(|line| line.item.id == item.id) {
            Some(line) => {
                line.item = item.clone();
                line.quantity = wanted;
            }
            None => self.items.push(CartItem {
                item: item.clone(),
                quantity,
            }),
        }

        debug!(item_id = item.id, quantity = wanted, "cart line updated");
        Ok(Notice::success(format!("{} added to order", item.name)))
    }

    /// Replaces a line's quantity. Zero or less removes the line.
    pub fn update_quantity(&mut self, item_id: i64, quantity: i64) -> Result<Notice> {
        if quantity <= 0 {
            return Ok(self.remove(item_id));
        }

        let line = self
            .items
            .iter_mut()
            .find(|line| line.item.id == item_id)
            .ok_or_else(|| PosError::NotFound(format!("Cart item {}", item_id)))?;

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        check_line_quantity(quantity)?;
        if !line.item.stock.allows(quantity) {
            warn!(item_id, quantity, "quantity change rejected: over stock");
            return Err(PosError::InsufficientStock {
                name: line.item.name.clone(),
                available: line.item.stock.count().unwrap_or(0),
            });
        }

        line.quantity = quantity;
        debug!(item_id, quantity, "cart quantity replaced");
        Ok(Notice::success(format!("{} quantity set to {}", line.item.name, quantity)))
    }

    pub fn remove(&mut self, item_id: i64) -> Notice {
        self.items.retain(|line| line.item.id != item_id);
        debug!(item_id, "cart line removed");
        Notice::info("Item removed from order")
    }

    /// Replaces a line's menu snapshot with the current catalog entry so
    /// later stock checks see the latest count.
    pub fn refresh(&mut self, item: &MenuItem) {
        if let Some(line) = self.items.iter_mut().find(|line| line.item.id == item.id) {
            line.item = item.clone();
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

fn check_line_quantity(quantity: u32) -> Result<()> {
    if quantity > MAX_LINE_QUANTITY {
        return Err(PosError::Invalid(format!("quantity above {}", MAX_LINE_QUANTITY)));
    }
    Ok(())
}
