pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod db;
pub mod error;
pub mod kitchen;
pub mod logging;
pub mod models;
pub mod notice;
pub mod pricing;
pub mod reports;
pub mod repository;
pub mod routes;
pub mod seed;
pub mod session;
pub mod state;
pub mod stock;

#[cfg(feature = "desktop")]
mod commands;

#[cfg(test)]
mod tests;

pub use error::{PosError, Result};
pub use state::AppState;

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use commands::{auth, catalog, kitchen, orders, reports};
    use config::AppConfig;
    use session::{FileStore, KeyValueStore, MemoryStore};
    use tauri::Manager;

    let config = AppConfig::from_env().expect("Invalid POS_* configuration");
    logging::init(&config);

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .setup(move |app| {
            let session_file = match &config.session_file {
                Some(path) => Some(path.clone()),
                None => app.path().app_data_dir().ok().map(|dir| dir.join("session.json")),
            };
            let store: Box<dyn KeyValueStore> = match session_file {
                Some(path) => {
                    tracing::info!(path = %path.display(), "session store");
                    Box::new(FileStore::new(path))
                }
                None => Box::new(MemoryStore::new()),
            };

            let state = AppState::new(config, store)?;
            app.manage(state);
            tracing::info!("Resto POS started");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Auth & routing
            auth::login,
            auth::logout,
            auth::current_user,
            auth::resolve_route,
            // Catalog (owner)
            catalog::get_menu,
            catalog::filter_menu,
            catalog::create_menu_item,
            catalog::update_menu_item,
            catalog::delete_menu_item,
            catalog::get_categories,
            catalog::create_category,
            catalog::update_category,
            catalog::delete_category,
            catalog::get_predikats,
            catalog::create_predikat,
            catalog::update_predikat,
            catalog::delete_predikat,
            catalog::get_tax_settings,
            catalog::update_tax_settings,
            // Cashier
            orders::get_register,
            orders::add_to_cart,
            orders::update_cart_quantity,
            orders::remove_from_cart,
            orders::set_order_type,
            orders::begin_checkout,
            orders::cancel_checkout,
            orders::confirm_payment,
            orders::answer_waiting_time,
            orders::submit_waiting_details,
            orders::close_receipt,
            orders::get_low_stock,
            orders::dismiss_low_stock,
            // Kitchen
            kitchen::get_kitchen_orders,
            kitchen::get_kitchen_order,
            kitchen::set_item_status,
            kitchen::complete_order,
            kitchen::get_stock,
            kitchen::notify_cashier,
            // Reports
            reports::get_sales_series,
            reports::get_menu_trends,
            reports::get_day_summary,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
