//! Demonstration catalog and kitchen orders loaded into a fresh session.

use chrono::{DateTime, Local};
use rusqlite::params;
use tracing::info;
use uuid::Uuid;

use crate::catalog;
use crate::db::Database;
use crate::error::Result;
use crate::models::{CartItem, CookingStatus, Order, OrderType, PaymentMethod, Stock, TaxSettings};
use crate::pricing;
use crate::repository::{self, OrderRepository};

const CATEGORIES: &[(&str, &str, &str)] = &[
    ("makanan", "Makanan", "🍛"),
    ("minuman", "Minuman", "🥤"),
    ("snack", "Snack", "🍟"),
    ("dessert", "Dessert", "🍰"),
];

const PREDIKATS: &[(&str, &str)] = &[
    ("Best Seller", "#6B7280"),
    ("New", "#3B82F6"),
    ("Promo", "#EF4444"),
    ("Recommended", "#10B981"),
];

struct SeedItem {
    name: &'static str,
    description: &'static str,
    price: i64,
    category: &'static str,
    waits: bool,
    stock: i64,
    threshold: Option<u32>,
    predikat: Option<i64>,
}

const MENU: &[SeedItem] = &[
    SeedItem { name: "Ayam Krispy", description: "Ayam goreng krispy", price: 32_000, category: "makanan", waits: true, stock: 50, threshold: Some(10), predikat: Some(1) },
    SeedItem { name: "Ayam Spicy", description: "Ayam goreng pedas", price: 35_000, category: "makanan", waits: true, stock: 30, threshold: Some(10), predikat: None },
    SeedItem { name: "Panas Wings Korean Soy Garlic", description: "Sayap ayam dengan saus korea", price: 42_000, category: "makanan", waits: true, stock: 25, threshold: Some(5), predikat: Some(2) },
    SeedItem { name: "PaNas Spesial", description: "Paket nasi spesial", price: 48_000, category: "makanan", waits: true, stock: 40, threshold: Some(10), predikat: None },
    SeedItem { name: "PaMer 7", description: "Paket Hemat 7", price: 55_000, category: "makanan", waits: true, stock: 60, threshold: Some(10), predikat: Some(3) },
    SeedItem { name: "Chicken Snack Wrap", description: "Wrap ayam snack", price: 25_000, category: "snack", waits: true, stock: 8, threshold: Some(10), predikat: None },
    SeedItem { name: "MfSpicy", description: "Menu fried spicy", price: 38_000, category: "makanan", waits: true, stock: 35, threshold: Some(5), predikat: None },
    SeedItem { name: "Mineral Water", description: "Air mineral", price: 5_000, category: "minuman", waits: false, stock: -1, threshold: None, predikat: None },
    SeedItem { name: "Fruit Tea Lemon", description: "Teh buah rasa lemon", price: 18_000, category: "minuman", waits: true, stock: 80, threshold: Some(10), predikat: Some(4) },
    SeedItem { name: "Hot Tea", description: "Teh panas", price: 8_000, category: "minuman", waits: false, stock: -1, threshold: None, predikat: None },
    SeedItem { name: "Es Kopi Gula Aren", description: "Kopi dengan gula aren", price: 22_000, category: "minuman", waits: true, stock: 5, threshold: Some(5), predikat: Some(1) },
    SeedItem { name: "Chicken Burger Deluxe", description: "Burger ayam dengan keju", price: 45_000, category: "makanan", waits: true, stock: 50, threshold: Some(10), predikat: Some(1) },
    SeedItem { name: "French Fries", description: "Kentang goreng", price: 15_000, category: "snack", waits: false, stock: 4, threshold: Some(5), predikat: None },
    SeedItem { name: "Es Krim Vanilla", description: "Es krim rasa vanilla", price: 10_000, category: "dessert", waits: false, stock: 0, threshold: Some(5), predikat: None },
];

/// Categories, predikat labels, menu items and tax settings.
pub fn seed_catalog(db: &Database, rates: TaxSettings) -> Result<()> {
    {
        let conn = db.lock()?;

        for (id, name, icon) in CATEGORIES {
            conn.execute(
                "INSERT OR IGNORE INTO categories (id, name, icon) VALUES (?1, ?2, ?3)",
                params![id, name, icon],
            )?;
        }

        for (name, color) in PREDIKATS {
            conn.execute(
                "INSERT OR IGNORE INTO predikats (name, color) VALUES (?1, ?2)",
                params![name, color],
            )?;
        }

        for item in MENU {
            conn.execute(
                "INSERT INTO menu_items (name, description, price, category_id, needs_waiting_time, stock, low_stock_threshold, predikat_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    item.name,
                    item.description,
                    item.price,
                    item.category,
                    item.waits,
                    Stock::from(item.stock),
                    item.threshold,
                    item.predikat,
                ],
            )?;
        }
    }

    catalog::update_tax_settings(db, rates)?;
    info!(items = MENU.len(), "catalog seeded");
    Ok(())
}

struct SeedLine {
    menu_item_id: i64,
    quantity: u32,
    status: CookingStatus,
    notes: Option<&'static str>,
}

struct SeedOrder {
    code: &'static str,
    order_type: OrderType,
    table: Option<u32>,
    customer: &'static str,
    time: (u32, u32),
    lines: &'static [SeedLine],
}

const fn line(menu_item_id: i64, quantity: u32, status: CookingStatus, notes: Option<&'static str>) -> SeedLine {
    SeedLine {
        menu_item_id,
        quantity,
        status,
        notes,
    }
}

const KITCHEN_ORDERS: &[SeedOrder] = &[
    SeedOrder {
        code: "PSN-001",
        order_type: OrderType::DineIn,
        table: Some(5),
        customer: "Sahroni",
        time: (15, 30),
        lines: &[
            line(12, 3, CookingStatus::Waiting, Some("tanpa sayur")),
            line(8, 2, CookingStatus::Done, None),
            line(9, 3, CookingStatus::Cooking, Some("less sugar")),
        ],
    },
    SeedOrder {
        code: "PSN-002",
        order_type: OrderType::DineIn,
        table: Some(11),
        customer: "Djarot",
        time: (11, 30),
        lines: &[
            line(6, 2, CookingStatus::Done, Some("extra saos")),
            line(8, 2, CookingStatus::Done, None),
        ],
    },
    SeedOrder {
        code: "PSN-003",
        order_type: OrderType::DineIn,
        table: Some(9),
        customer: "Jagoan",
        time: (16, 0),
        lines: &[
            line(2, 2, CookingStatus::Cooking, Some("level 3")),
            line(10, 2, CookingStatus::Cooking, None),
        ],
    },
    SeedOrder {
        code: "PSN-004",
        order_type: OrderType::TakeAway,
        table: None,
        customer: "Zambek",
        time: (15, 30),
        lines: &[
            line(3, 1, CookingStatus::Waiting, None),
            line(11, 1, CookingStatus::Waiting, Some("less sugar")),
        ],
    },
    SeedOrder {
        code: "PSN-005",
        order_type: OrderType::TakeAway,
        table: None,
        customer: "Takbir",
        time: (15, 30),
        lines: &[
            line(1, 2, CookingStatus::Cooking, None),
            line(4, 3, CookingStatus::Cooking, None),
        ],
    },
];

fn today_at(hour: u32, minute: u32) -> DateTime<Local> {
    Local::now()
        .date_naive()
        .and_hms_opt(hour, minute, 0)
        .and_then(|naive| naive.and_local_timezone(Local).earliest())
        .unwrap_or_else(Local::now)
}

/// Orders already on the kitchen board when the session starts. They go
/// through the shared store like any checkout, so stock is taken too.
pub fn seed_kitchen_orders(db: &Database, rates: TaxSettings) -> Result<()> {
    for seed in KITCHEN_ORDERS {
        let items = seed
            .lines
            .iter()
            .map(|l| {
                Ok(CartItem {
                    item: catalog::get_menu_item(db, l.menu_item_id)?,
                    quantity: l.quantity,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let totals = pricing::compute(&items, rates);
        let order = Order {
            id: Uuid::new_v4().to_string(),
            order_code: seed.code.to_string(),
            items,
            order_type: seed.order_type,
            table_number: seed.table,
            customer_name: Some(seed.customer.to_string()),
            subtotal: totals.subtotal,
            tax: totals.tax,
            service_fee: totals.service_fee,
            total: totals.total,
            payment_method: PaymentMethod::Cash,
            amount_paid: totals.total,
            change: 0,
            created_at: today_at(seed.time.0, seed.time.1),
        };
        db.create(&order)?;

        let stored = db.kitchen_order(&order.id)?;
        for (kitchen_line, seed_line) in stored.items.iter().zip(seed.lines) {
            if seed_line.status != CookingStatus::Waiting {
                db.update_item_status(&order.id, kitchen_line.id, seed_line.status)?;
            }
            if let Some(notes) = seed_line.notes {
                let conn = db.lock()?;
                repository::set_item_note(&conn, kitchen_line.id, notes)?;
            }
        }
    }

    info!(orders = KITCHEN_ORDERS.len(), "kitchen orders seeded");
    Ok(())
}

/// Full demonstration session.
pub fn seed_demo(db: &Database, rates: TaxSettings) -> Result<()> {
    seed_catalog(db, rates)?;
    seed_kitchen_orders(db, rates)
}
