use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};

use crate::error::Result;

pub struct Database {
    pub conn: Mutex<Connection>,
}

impl Database {
    /// Session-scoped store; everything is gone when the process exits.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        Ok(self.conn.lock()?)
    }

    pub fn initialize(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;

            -- Menu categories, keyed by slug (e.g. 'makanan')
            CREATE TABLE IF NOT EXISTS categories (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                icon TEXT NOT NULL DEFAULT ''
            );

            -- Merchandising labels
            CREATE TABLE IF NOT EXISTS predikats (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                color TEXT NOT NULL
            );

            -- Menu items; stock -1 means unlimited
            CREATE TABLE IF NOT EXISTS menu_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                price INTEGER NOT NULL,
                image TEXT NOT NULL DEFAULT '/placeholder.svg',
                category_id TEXT NOT NULL,
                needs_waiting_time INTEGER NOT NULL DEFAULT 0,
                stock INTEGER NOT NULL DEFAULT -1,
                low_stock_threshold INTEGER,
                predikat_id INTEGER,
                FOREIGN KEY (category_id) REFERENCES categories(id),
                FOREIGN KEY (predikat_id) REFERENCES predikats(id)
            );

            -- Finalized orders; kitchen_status is NULL when not routed to the kitchen
            CREATE TABLE IF NOT EXISTS orders (
                id TEXT PRIMARY KEY,
                order_code TEXT NOT NULL,
                order_type TEXT NOT NULL,
                table_number INTEGER,
                customer_name TEXT,
                subtotal INTEGER NOT NULL,
                tax INTEGER NOT NULL,
                service_fee INTEGER NOT NULL,
                total INTEGER NOT NULL,
                payment_method TEXT NOT NULL,
                amount_paid INTEGER NOT NULL,
                change_due INTEGER NOT NULL,
                kitchen_status TEXT,
                order_time TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            -- Order lines with the menu item snapshot taken at checkout
            CREATE TABLE IF NOT EXISTS order_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                order_id TEXT NOT NULL,
                menu_item_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                price INTEGER NOT NULL,
                quantity INTEGER NOT NULL,
                needs_waiting_time INTEGER NOT NULL,
                cooking_status TEXT NOT NULL DEFAULT 'menunggu',
                notes TEXT,
                snapshot TEXT NOT NULL,
                FOREIGN KEY (order_id) REFERENCES orders(id)
            );

            -- Owner settings (tax and service fee rates)
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;

        Ok(())
    }
}
