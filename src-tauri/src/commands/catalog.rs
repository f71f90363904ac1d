use crate::catalog;
use crate::models::{Category, CreateMenuItem, MenuItem, Predikat, TaxSettings, UpdateMenuItem};
use crate::AppState;
use tauri::State;

#[tauri::command]
pub fn get_menu(state: State<'_, AppState>) -> Result<Vec<MenuItem>, String> {
    catalog::list_menu(&state.db).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn filter_menu(state: State<'_, AppState>, category: String, query: String) -> Result<Vec<MenuItem>, String> {
    let menu = catalog::list_menu(&state.db).map_err(|e| e.to_string())?;
    Ok(catalog::filter_menu(&menu, &category, &query))
}

#[tauri::command]
pub fn create_menu_item(state: State<'_, AppState>, item: CreateMenuItem) -> Result<MenuItem, String> {
    catalog::create_menu_item(&state.db, item).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn update_menu_item(state: State<'_, AppState>, item: UpdateMenuItem) -> Result<MenuItem, String> {
    catalog::update_menu_item(&state.db, item).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn delete_menu_item(state: State<'_, AppState>, id: i64) -> Result<(), String> {
    catalog::delete_menu_item(&state.db, id).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_categories(state: State<'_, AppState>) -> Result<Vec<Category>, String> {
    catalog::list_categories(&state.db).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn create_category(state: State<'_, AppState>, name: String, icon: String) -> Result<Category, String> {
    catalog::create_category(&state.db, &name, &icon).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn update_category(state: State<'_, AppState>, category: Category) -> Result<Category, String> {
    catalog::update_category(&state.db, category).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn delete_category(state: State<'_, AppState>, id: String) -> Result<(), String> {
    catalog::delete_category(&state.db, &id).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_predikats(state: State<'_, AppState>) -> Result<Vec<Predikat>, String> {
    catalog::list_predikats(&state.db).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn create_predikat(state: State<'_, AppState>, name: String, color: String) -> Result<Predikat, String> {
    catalog::create_predikat(&state.db, &name, &color).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn update_predikat(state: State<'_, AppState>, predikat: Predikat) -> Result<Predikat, String> {
    catalog::update_predikat(&state.db, predikat).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn delete_predikat(state: State<'_, AppState>, id: i64) -> Result<(), String> {
    catalog::delete_predikat(&state.db, id).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_tax_settings(state: State<'_, AppState>) -> Result<TaxSettings, String> {
    state.tax_settings().map_err(|e| e.to_string())
}

#[tauri::command]
pub fn update_tax_settings(state: State<'_, AppState>, settings: TaxSettings) -> Result<TaxSettings, String> {
    catalog::update_tax_settings(&state.db, settings).map_err(|e| e.to_string())
}
