//! Menu, category, predikat and tax settings managed from the owner pages.

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use crate::db::Database;
use crate::error::{PosError, Result};
use crate::models::{Category, CreateMenuItem, MenuItem, Money, Predikat, TaxSettings, UpdateMenuItem};

const MENU_COLUMNS: &str = "id, name, description, price, image, category_id, needs_waiting_time, stock, \
     low_stock_threshold, predikat_id";

const DEFAULT_IMAGE: &str = "/placeholder.svg";

/// Highest menu price accepted, Rp 1.000.000.000. With the cart's line
/// quantity cap, order totals stay within `Money`.
pub const MAX_PRICE: Money = 1_000_000_000;

/// Category filter value that matches every item.
pub const ALL_CATEGORIES: &str = "all";

fn menu_item_from_row(row: &Row<'_>) -> rusqlite::Result<MenuItem> {
    Ok(MenuItem {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        image: row.get(4)?,
        category_id: row.get(5)?,
        needs_waiting_time: row.get(6)?,
        stock: row.get(7)?,
        low_stock_threshold: row.get(8)?,
        predikat_id: row.get(9)?,
    })
}

fn load_menu_item(conn: &Connection, id: i64) -> Result<MenuItem> {
    conn.query_row(
        &format!("SELECT {} FROM menu_items WHERE id = ?1", MENU_COLUMNS),
        [id],
        menu_item_from_row,
    )
    .optional()?
    .ok_or_else(|| PosError::NotFound(format!("Menu item {}", id)))
}

fn validate_menu(name: &str, price: i64) -> Result<()> {
    if name.trim().is_empty() {
        return Err(PosError::Invalid("menu name is required".to_string()));
    }
    if price < 0 {
        return Err(PosError::Invalid("price cannot be negative".to_string()));
    }
    if price > MAX_PRICE {
        return Err(PosError::Invalid(format!("price above {}", MAX_PRICE)));
    }
    Ok(())
}

// ===== MENU =====

pub fn list_menu(db: &Database) -> Result<Vec<MenuItem>> {
    let conn = db.lock()?;
    let mut stmt = conn.prepare(&format!("SELECT {} FROM menu_items ORDER BY id", MENU_COLUMNS))?;
    let items = stmt
        .query_map([], menu_item_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(items)
}

pub fn get_menu_item(db: &Database, id: i64) -> Result<MenuItem> {
    let conn = db.lock()?;
    load_menu_item(&conn, id)
}

/// Cashier menu grid: category id (or `all`) and a case-insensitive search
/// over name and description.
pub fn filter_menu(items: &[MenuItem], category: &str, query: &str) -> Vec<MenuItem> {
    let query = query.trim().to_lowercase();
    items
        .iter()
        .filter(|item| category == ALL_CATEGORIES || item.category_id == category)
        .filter(|item| {
            query.is_empty()
                || item.name.to_lowercase().contains(&query)
                || item.description.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

pub fn create_menu_item(db: &Database, item: CreateMenuItem) -> Result<MenuItem> {
    validate_menu(&item.name, item.price)?;
    let conn = db.lock()?;

    conn.execute(
        "INSERT INTO menu_items (name, description, price, image, category_id, needs_waiting_time, stock, low_stock_threshold, predikat_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            item.name.trim(),
            item.description,
            item.price,
            item.image.as_deref().unwrap_or(DEFAULT_IMAGE),
            item.category_id,
            item.needs_waiting_time,
            item.stock,
            item.low_stock_threshold,
            item.predikat_id,
        ],
    )?;

    let id = conn.last_insert_rowid();
    info!(menu_item_id = id, "menu item created");
    load_menu_item(&conn, id)
}

pub fn update_menu_item(db: &Database, item: UpdateMenuItem) -> Result<MenuItem> {
    validate_menu(&item.name, item.price)?;
    let conn = db.lock()?;

    let changed = conn.execute(
        "UPDATE menu_items
         SET name = ?1, description = ?2, price = ?3, image = ?4, category_id = ?5, needs_waiting_time = ?6,
             stock = ?7, low_stock_threshold = ?8, predikat_id = ?9
         WHERE id = ?10",
        params![
            item.name.trim(),
            item.description,
            item.price,
            item.image,
            item.category_id,
            item.needs_waiting_time,
            item.stock,
            item.low_stock_threshold,
            item.predikat_id,
            item.id,
        ],
    )?;
    if changed == 0 {
        return Err(PosError::NotFound(format!("Menu item {}", item.id)));
    }

    load_menu_item(&conn, item.id)
}

pub fn delete_menu_item(db: &Database, id: i64) -> Result<()> {
    let conn = db.lock()?;
    let changed = conn.execute("DELETE FROM menu_items WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(PosError::NotFound(format!("Menu item {}", id)));
    }
    Ok(())
}

// ===== CATEGORIES =====

/// `"Es Krim"` -> `"es-krim"`.
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

pub fn list_categories(db: &Database) -> Result<Vec<Category>> {
    let conn = db.lock()?;
    let mut stmt = conn.prepare("SELECT id, name, icon FROM categories ORDER BY rowid")?;
    let categories = stmt
        .query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
                icon: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(categories)
}

pub fn create_category(db: &Database, name: &str, icon: &str) -> Result<Category> {
    let name = name.trim();
    let id = slugify(name);
    if id.is_empty() || id == ALL_CATEGORIES {
        return Err(PosError::Invalid(format!("category name '{}'", name)));
    }

    let conn = db.lock()?;
    conn.execute(
        "INSERT INTO categories (id, name, icon) VALUES (?1, ?2, ?3)",
        params![id, name, icon],
    )?;

    Ok(Category {
        id,
        name: name.to_string(),
        icon: icon.to_string(),
    })
}

pub fn update_category(db: &Database, category: Category) -> Result<Category> {
    let conn = db.lock()?;
    let changed = conn.execute(
        "UPDATE categories SET name = ?1, icon = ?2 WHERE id = ?3",
        params![category.name.trim(), category.icon, category.id],
    )?;
    if changed == 0 {
        return Err(PosError::NotFound(format!("Category {}", category.id)));
    }
    Ok(category)
}

pub fn delete_category(db: &Database, id: &str) -> Result<()> {
    let conn = db.lock()?;

    // Menu items must keep a category
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM menu_items WHERE category_id = ?1",
        [id],
        |row| row.get(0),
    )?;
    if count > 0 {
        return Err(PosError::Invalid(format!("category '{}' still has {} menu items", id, count)));
    }

    conn.execute("DELETE FROM categories WHERE id = ?1", [id])?;
    Ok(())
}

// ===== PREDIKAT =====

pub fn list_predikats(db: &Database) -> Result<Vec<Predikat>> {
    let conn = db.lock()?;
    let mut stmt = conn.prepare("SELECT id, name, color FROM predikats ORDER BY id")?;
    let predikats = stmt
        .query_map([], |row| {
            Ok(Predikat {
                id: row.get(0)?,
                name: row.get(1)?,
                color: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(predikats)
}

pub fn create_predikat(db: &Database, name: &str, color: &str) -> Result<Predikat> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PosError::Invalid("predikat name is required".to_string()));
    }

    let conn = db.lock()?;
    conn.execute(
        "INSERT INTO predikats (name, color) VALUES (?1, ?2)",
        params![name, color],
    )?;

    Ok(Predikat {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        color: color.to_string(),
    })
}

pub fn update_predikat(db: &Database, predikat: Predikat) -> Result<Predikat> {
    let conn = db.lock()?;
    let changed = conn.execute(
        "UPDATE predikats SET name = ?1, color = ?2 WHERE id = ?3",
        params![predikat.name.trim(), predikat.color, predikat.id],
    )?;
    if changed == 0 {
        return Err(PosError::NotFound(format!("Predikat {}", predikat.id)));
    }
    Ok(predikat)
}

pub fn delete_predikat(db: &Database, id: i64) -> Result<()> {
    let conn = db.lock()?;

    // Unlabel menu items using this predikat
    conn.execute("UPDATE menu_items SET predikat_id = NULL WHERE predikat_id = ?1", [id])?;
    conn.execute("DELETE FROM predikats WHERE id = ?1", [id])?;
    Ok(())
}

// ===== TAX SETTINGS =====

const TAX_RATE_KEY: &str = "tax_rate_bps";
const SERVICE_FEE_KEY: &str = "service_fee_rate_bps";

fn read_setting(conn: &Connection, key: &str) -> Result<Option<u32>> {
    let value: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| row.get(0))
        .optional()?;
    value
        .map(|v| v.parse::<u32>().map_err(|_| PosError::Invalid(format!("setting {} = '{}'", key, v))))
        .transpose()
}

/// Stored rates, falling back to `defaults` for anything not yet saved.
pub fn tax_settings(db: &Database, defaults: TaxSettings) -> Result<TaxSettings> {
    let conn = db.lock()?;
    Ok(TaxSettings {
        tax_rate_bps: read_setting(&conn, TAX_RATE_KEY)?.unwrap_or(defaults.tax_rate_bps),
        service_fee_rate_bps: read_setting(&conn, SERVICE_FEE_KEY)?.unwrap_or(defaults.service_fee_rate_bps),
    })
}

pub fn update_tax_settings(db: &Database, settings: TaxSettings) -> Result<TaxSettings> {
    for (label, bps) in [
        ("tax rate", settings.tax_rate_bps),
        ("service fee rate", settings.service_fee_rate_bps),
    ] {
        if bps > 10_000 {
            return Err(PosError::Invalid(format!("{} above 100%", label)));
        }
    }

    let conn = db.lock()?;
    for (key, bps) in [
        (TAX_RATE_KEY, settings.tax_rate_bps),
        (SERVICE_FEE_KEY, settings.service_fee_rate_bps),
    ] {
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, bps.to_string()],
        )?;
    }

    info!(
        tax_rate_bps = settings.tax_rate_bps,
        service_fee_rate_bps = settings.service_fee_rate_bps,
        "tax settings saved"
    );
    Ok(settings)
}
