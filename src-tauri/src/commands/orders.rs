use chrono::Local;
use serde::Serialize;
use tauri::State;

use crate::catalog;
use crate::checkout::{CheckoutState, Payment, Register};
use crate::models::{CartItem, MenuItem, OrderType, TaxSettings};
use crate::notice::Notice;
use crate::pricing::Totals;
use crate::AppState;

/// Everything the cashier screen renders after an action.
#[derive(Debug, Serialize)]
pub struct RegisterView {
    pub cart: Vec<CartItem>,
    pub item_count: u32,
    pub order_type: OrderType,
    pub totals: Totals,
    pub checkout: CheckoutState,
    pub notice: Option<Notice>,
}

impl RegisterView {
    fn of(register: &Register, rates: TaxSettings, notice: Option<Notice>) -> Self {
        RegisterView {
            cart: register.cart().items().to_vec(),
            item_count: register.cart().item_count(),
            order_type: register.order_type(),
            totals: register.totals(rates),
            checkout: register.checkout_state().clone(),
            notice,
        }
    }
}

#[tauri::command]
pub fn get_register(state: State<'_, AppState>) -> Result<RegisterView, String> {
    let rates = state.tax_settings().map_err(|e| e.to_string())?;
    let register = state.register.lock().map_err(|e| e.to_string())?;
    Ok(RegisterView::of(&register, rates, None))
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn add_to_cart(state: State<'_, AppState>, itemId: i64, quantity: Option<u32>) -> Result<RegisterView, String> {
    let rates = state.tax_settings().map_err(|e| e.to_string())?;
    let item = catalog::get_menu_item(&state.db, itemId).map_err(|e| e.to_string())?;

    let mut register = state.register.lock().map_err(|e| e.to_string())?;
    let notice = register
        .add_item(&item, quantity.unwrap_or(1))
        .map_err(|e| e.to_string())?;

    Ok(RegisterView::of(&register, rates, Some(notice)))
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn update_cart_quantity(state: State<'_, AppState>, itemId: i64, quantity: i64) -> Result<RegisterView, String> {
    let rates = state.tax_settings().map_err(|e| e.to_string())?;
    // Removing a line must work even if the item left the catalog
    let current = if quantity > 0 {
        Some(catalog::get_menu_item(&state.db, itemId).map_err(|e| e.to_string())?)
    } else {
        None
    };

    let mut register = state.register.lock().map_err(|e| e.to_string())?;
    let notice = register
        .update_quantity(itemId, quantity, current.as_ref())
        .map_err(|e| e.to_string())?;

    Ok(RegisterView::of(&register, rates, Some(notice)))
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn remove_from_cart(state: State<'_, AppState>, itemId: i64) -> Result<RegisterView, String> {
    let rates = state.tax_settings().map_err(|e| e.to_string())?;
    let mut register = state.register.lock().map_err(|e| e.to_string())?;
    let notice = register.remove_item(itemId).map_err(|e| e.to_string())?;

    Ok(RegisterView::of(&register, rates, Some(notice)))
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn set_order_type(state: State<'_, AppState>, orderType: OrderType) -> Result<RegisterView, String> {
    let rates = state.tax_settings().map_err(|e| e.to_string())?;
    let mut register = state.register.lock().map_err(|e| e.to_string())?;
    register.set_order_type(orderType).map_err(|e| e.to_string())?;

    Ok(RegisterView::of(&register, rates, None))
}

#[tauri::command]
pub fn begin_checkout(state: State<'_, AppState>) -> Result<RegisterView, String> {
    let rates = state.tax_settings().map_err(|e| e.to_string())?;
    let mut register = state.register.lock().map_err(|e| e.to_string())?;
    register.begin_checkout().map_err(|e| e.to_string())?;

    Ok(RegisterView::of(&register, rates, None))
}

#[tauri::command]
pub fn cancel_checkout(state: State<'_, AppState>) -> Result<RegisterView, String> {
    let rates = state.tax_settings().map_err(|e| e.to_string())?;
    let mut register = state.register.lock().map_err(|e| e.to_string())?;
    register.cancel_checkout().map_err(|e| e.to_string())?;

    Ok(RegisterView::of(&register, rates, None))
}

#[tauri::command]
pub fn confirm_payment(state: State<'_, AppState>, payment: Payment) -> Result<RegisterView, String> {
    let rates = state.tax_settings().map_err(|e| e.to_string())?;
    let mut register = state.register.lock().map_err(|e| e.to_string())?;
    let notice = register
        .confirm_payment(&state.db, rates, payment, Local::now())
        .map_err(|e| e.to_string())?;

    Ok(RegisterView::of(&register, rates, notice))
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn answer_waiting_time(state: State<'_, AppState>, customerWaits: bool) -> Result<RegisterView, String> {
    let rates = state.tax_settings().map_err(|e| e.to_string())?;
    let mut register = state.register.lock().map_err(|e| e.to_string())?;
    let notice = register
        .answer_wait(&state.db, customerWaits)
        .map_err(|e| e.to_string())?;

    Ok(RegisterView::of(&register, rates, notice))
}

/// Table number for dine-in or customer name for take-away.
#[tauri::command]
pub fn submit_waiting_details(state: State<'_, AppState>, input: String) -> Result<RegisterView, String> {
    let rates = state.tax_settings().map_err(|e| e.to_string())?;
    let mut register = state.register.lock().map_err(|e| e.to_string())?;
    let notice = register
        .submit_wait_details(&state.db, &input)
        .map_err(|e| e.to_string())?;

    Ok(RegisterView::of(&register, rates, notice))
}

#[tauri::command]
pub fn close_receipt(state: State<'_, AppState>) -> Result<RegisterView, String> {
    let rates = state.tax_settings().map_err(|e| e.to_string())?;
    let mut register = state.register.lock().map_err(|e| e.to_string())?;
    register.close_receipt();

    Ok(RegisterView::of(&register, rates, None))
}

#[tauri::command]
pub fn get_low_stock(state: State<'_, AppState>) -> Result<Vec<MenuItem>, String> {
    let menu = catalog::list_menu(&state.db).map_err(|e| e.to_string())?;
    let alerts = state.low_stock.lock().map_err(|e| e.to_string())?;
    Ok(alerts.active(&menu))
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn dismiss_low_stock(state: State<'_, AppState>, itemId: i64) -> Result<Vec<MenuItem>, String> {
    let menu = catalog::list_menu(&state.db).map_err(|e| e.to_string())?;
    let mut alerts = state.low_stock.lock().map_err(|e| e.to_string())?;
    alerts.dismiss(itemId);
    Ok(alerts.active(&menu))
}
