use std::sync::Mutex;

use crate::auth::AuthContext;
use crate::catalog;
use crate::checkout::Register;
use crate::config::AppConfig;
use crate::db::Database;
use crate::error::Result;
use crate::models::TaxSettings;
use crate::seed;
use crate::session::KeyValueStore;
use crate::stock::LowStockAlerts;

/// Everything one running terminal owns for the session.
pub struct AppState {
    pub config: AppConfig,
    pub db: Database,
    pub auth: Mutex<AuthContext>,
    pub register: Mutex<Register>,
    pub low_stock: Mutex<LowStockAlerts>,
}

impl AppState {
    /// Fresh in-memory store with the demo data; the session record is
    /// restored from `store`.
    pub fn new(config: AppConfig, store: Box<dyn KeyValueStore>) -> Result<Self> {
        let db = Database::open_in_memory()?;
        db.initialize()?;
        seed::seed_demo(&db, config.tax_settings())?;

        let auth = AuthContext::init(store, config.login_delay);

        Ok(AppState {
            config,
            db,
            auth: Mutex::new(auth),
            register: Mutex::new(Register::new()),
            low_stock: Mutex::new(LowStockAlerts::new()),
        })
    }

    /// Rates the owner saved, or the configured defaults.
    pub fn tax_settings(&self) -> Result<TaxSettings> {
        catalog::tax_settings(&self.db, self.config.tax_settings())
    }
}
