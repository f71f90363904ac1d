use serde::Serialize;
use tauri::State;

use crate::catalog;
use crate::kitchen::{KitchenBoard, Page, StatusCounts};
use crate::models::{CookingStatus, KitchenOrder, StockItem};
use crate::notice::Notice;
use crate::repository::OrderRepository;
use crate::stock::{self, StockStats};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct KitchenOrdersView {
    pub page: Page<KitchenOrder>,
    pub counts: StatusCounts,
}

#[derive(Debug, Serialize)]
pub struct KitchenOrderView {
    pub order: KitchenOrder,
    pub can_complete: bool,
    pub notice: Option<Notice>,
}

#[derive(Debug, Serialize)]
pub struct StockView {
    pub page: Page<StockItem>,
    pub stats: StockStats,
}

fn order_view(order: KitchenOrder, notice: Option<Notice>) -> KitchenOrderView {
    KitchenOrderView {
        can_complete: order.can_complete(),
        order,
        notice,
    }
}

#[tauri::command]
pub fn get_kitchen_orders(state: State<'_, AppState>, query: Option<String>, page: Option<usize>) -> Result<KitchenOrdersView, String> {
    let board = KitchenBoard::new(&state.db);
    Ok(KitchenOrdersView {
        page: board
            .page(query.as_deref().unwrap_or(""), page.unwrap_or(1))
            .map_err(|e| e.to_string())?,
        counts: board.counts().map_err(|e| e.to_string())?,
    })
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn get_kitchen_order(state: State<'_, AppState>, orderId: String) -> Result<KitchenOrderView, String> {
    let order = KitchenBoard::new(&state.db).order(&orderId).map_err(|e| e.to_string())?;
    Ok(order_view(order, None))
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn set_item_status(state: State<'_, AppState>, orderId: String, itemId: i64, status: CookingStatus) -> Result<KitchenOrderView, String> {
    let order = KitchenBoard::new(&state.db)
        .set_item_status(&orderId, itemId, status)
        .map_err(|e| e.to_string())?;
    Ok(order_view(order, None))
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn complete_order(state: State<'_, AppState>, orderId: String) -> Result<KitchenOrderView, String> {
    let (order, notice) = KitchenBoard::new(&state.db)
        .complete_order(&orderId)
        .map_err(|e| e.to_string())?;
    Ok(order_view(order, Some(notice)))
}

fn load_stock(state: &AppState) -> crate::Result<Vec<StockItem>> {
    let menu = catalog::list_menu(&state.db)?;
    let categories = catalog::list_categories(&state.db)?;
    let orders = state.db.kitchen_orders()?;
    Ok(stock::stock_items(&menu, &categories, &orders, state.config.stock_threshold))
}

#[tauri::command]
pub fn get_stock(state: State<'_, AppState>, query: Option<String>, page: Option<usize>) -> Result<StockView, String> {
    let items = load_stock(&state).map_err(|e| e.to_string())?;
    Ok(StockView {
        stats: StockStats::of(&items),
        page: stock::page(&items, query.as_deref().unwrap_or(""), page.unwrap_or(1)),
    })
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn notify_cashier(state: State<'_, AppState>, menuItemId: i64) -> Result<Notice, String> {
    let items = load_stock(&state).map_err(|e| e.to_string())?;
    let item = items
        .iter()
        .find(|item| item.menu_item_id == menuItemId)
        .ok_or_else(|| format!("Stock item {} not found", menuItemId))?;
    Ok(stock::notify_cashier(item))
}
