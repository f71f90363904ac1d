//! Shared order store read by the cashier, kitchen, stock and report views.

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use crate::db::Database;
use crate::error::{PosError, Result};
use crate::models::{
    CartItem, CookingStatus, KitchenOrder, KitchenOrderItem, MenuItem, Order, OrderType, PaymentMethod, Stock,
};

pub trait OrderRepository {
    /// Stores a finalized order and takes its quantities out of stock,
    /// all or nothing.
    fn create(&self, order: &Order) -> Result<()>;

    fn get(&self, id: &str) -> Result<Option<Order>>;

    fn list(&self) -> Result<Vec<Order>>;

    /// Orders routed to the kitchen, oldest first.
    fn kitchen_orders(&self) -> Result<Vec<KitchenOrder>>;

    fn kitchen_order(&self, id: &str) -> Result<KitchenOrder>;

    /// Sets one line's cooking status and recomputes the order status.
    fn update_item_status(&self, order_id: &str, item_id: i64, status: CookingStatus) -> Result<KitchenOrder>;

    /// Marks every line and the order itself done.
    fn complete(&self, order_id: &str) -> Result<KitchenOrder>;
}

const ORDER_COLUMNS: &str = "id, order_code, order_type, table_number, customer_name, subtotal, tax, service_fee, \
     total, payment_method, amount_paid, change_due, created_at";

impl OrderRepository for Database {
    fn create(&self, order: &Order) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        for line in &order.items {
            let current: Option<(String, Stock)> = tx
                .query_row(
                    "SELECT name, stock FROM menu_items WHERE id = ?1",
                    [line.item.id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            // Items removed from the catalog mid-session keep their snapshot only.
            if let Some((name, stock)) = current {
                if !stock.allows(line.quantity) {
                    return Err(PosError::InsufficientStock {
                        name,
                        available: stock.count().unwrap_or(0),
                    });
                }
                if !stock.is_unlimited() {
                    tx.execute(
                        "UPDATE menu_items SET stock = stock - ?1 WHERE id = ?2",
                        params![line.quantity, line.item.id],
                    )?;
                }
            }
        }

        let kitchen_status = order.needs_kitchen().then_some(CookingStatus::Waiting);
        tx.execute(
            "INSERT INTO orders (id, order_code, order_type, table_number, customer_name, subtotal, tax, service_fee,
                                 total, payment_method, amount_paid, change_due, kitchen_status, order_time, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                order.id,
                order.order_code,
                order.order_type,
                order.table_number,
                order.customer_name,
                order.subtotal,
                order.tax,
                order.service_fee,
                order.total,
                order.payment_method,
                order.amount_paid,
                order.change,
                kitchen_status,
                order.created_at.format("%H.%M").to_string(),
                order.created_at.to_rfc3339(),
            ],
        )?;

        for line in &order.items {
            let snapshot = serde_json::to_string(&line.item)?;
            tx.execute(
                "INSERT INTO order_items (order_id, menu_item_id, name, price, quantity, needs_waiting_time, cooking_status, snapshot)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    order.id,
                    line.item.id,
                    line.item.name,
                    line.item.price,
                    line.quantity,
                    line.item.needs_waiting_time,
                    CookingStatus::Waiting,
                    snapshot,
                ],
            )?;
        }

        tx.commit()?;
        info!(order_id = %order.id, order_code = %order.order_code, "order stored");
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Order>> {
        let conn = self.lock()?;
        let order = conn
            .query_row(
                &format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLUMNS),
                [id],
                order_from_row,
            )
            .optional()?;

        match order {
            Some(mut order) => {
                order.items = load_order_lines(&conn, &order.id)?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    fn list(&self) -> Result<Vec<Order>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM orders ORDER BY rowid", ORDER_COLUMNS))?;
        let mut orders = stmt
            .query_map([], order_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for order in &mut orders {
            order.items = load_order_lines(&conn, &order.id)?;
        }

        Ok(orders)
    }

    fn kitchen_orders(&self) -> Result<Vec<KitchenOrder>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, order_code, order_type, table_number, customer_name, order_time, kitchen_status
             FROM orders
             WHERE kitchen_status IS NOT NULL
             ORDER BY rowid",
        )?;
        let mut orders = stmt
            .query_map([], kitchen_order_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for order in &mut orders {
            order.items = load_kitchen_lines(&conn, &order.id)?;
        }

        Ok(orders)
    }

    fn kitchen_order(&self, id: &str) -> Result<KitchenOrder> {
        let conn = self.lock()?;
        load_kitchen_order(&conn, id)
    }

    fn update_item_status(&self, order_id: &str, item_id: i64, status: CookingStatus) -> Result<KitchenOrder> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        // Fails with NotFound for orders that never went to the kitchen.
        load_kitchen_order(&tx, order_id)?;

        let changed = tx.execute(
            "UPDATE order_items SET cooking_status = ?1 WHERE id = ?2 AND order_id = ?3",
            params![status, item_id, order_id],
        )?;
        if changed == 0 {
            return Err(PosError::NotFound(format!("Order item {}", item_id)));
        }

        let statuses: Vec<CookingStatus> = tx
            .prepare("SELECT cooking_status FROM order_items WHERE order_id = ?1")?
            .query_map([order_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let aggregate = CookingStatus::aggregate(statuses);

        tx.execute(
            "UPDATE orders SET kitchen_status = ?1 WHERE id = ?2",
            params![aggregate, order_id],
        )?;

        let order = load_kitchen_order(&tx, order_id)?;
        tx.commit()?;
        Ok(order)
    }

    fn complete(&self, order_id: &str) -> Result<KitchenOrder> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        load_kitchen_order(&tx, order_id)?;

        tx.execute(
            "UPDATE order_items SET cooking_status = ?1 WHERE order_id = ?2",
            params![CookingStatus::Done, order_id],
        )?;
        tx.execute(
            "UPDATE orders SET kitchen_status = ?1 WHERE id = ?2",
            params![CookingStatus::Done, order_id],
        )?;

        let order = load_kitchen_order(&tx, order_id)?;
        tx.commit()?;
        info!(order_id, order_code = %order.order_code, "kitchen order completed");
        Ok(order)
    }
}

/// Writes a demo note on a kitchen line; used when seeding.
pub(crate) fn set_item_note(conn: &Connection, item_id: i64, notes: &str) -> Result<()> {
    conn.execute("UPDATE order_items SET notes = ?1 WHERE id = ?2", params![notes, item_id])?;
    Ok(())
}

fn order_from_row(row: &Row<'_>) -> rusqlite::Result<Order> {
    let created_at: String = row.get(12)?;
    let created_at = chrono::DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(12, rusqlite::types::Type::Text, Box::new(e)))?
        .with_timezone(&chrono::Local);

    Ok(Order {
        id: row.get(0)?,
        order_code: row.get(1)?,
        items: Vec::new(),
        order_type: row.get::<_, OrderType>(2)?,
        table_number: row.get(3)?,
        customer_name: row.get(4)?,
        subtotal: row.get(5)?,
        tax: row.get(6)?,
        service_fee: row.get(7)?,
        total: row.get(8)?,
        payment_method: row.get::<_, PaymentMethod>(9)?,
        amount_paid: row.get(10)?,
        change: row.get(11)?,
        created_at,
    })
}

fn load_order_lines(conn: &Connection, order_id: &str) -> Result<Vec<CartItem>> {
    let mut stmt = conn.prepare("SELECT snapshot, quantity FROM order_items WHERE order_id = ?1 ORDER BY id")?;
    let rows = stmt
        .query_map([order_id], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(snapshot, quantity)| {
            let item: MenuItem = serde_json::from_str(&snapshot)?;
            Ok(CartItem { item, quantity })
        })
        .collect()
}

fn kitchen_order_from_row(row: &Row<'_>) -> rusqlite::Result<KitchenOrder> {
    Ok(KitchenOrder {
        id: row.get(0)?,
        order_code: row.get(1)?,
        order_type: row.get(2)?,
        table_number: row.get(3)?,
        customer_name: row.get(4)?,
        items: Vec::new(),
        order_time: row.get(5)?,
        status: row.get(6)?,
    })
}

fn load_kitchen_lines(conn: &Connection, order_id: &str) -> Result<Vec<KitchenOrderItem>> {
    let mut stmt = conn.prepare(
        "SELECT id, menu_item_id, name, price, quantity, needs_waiting_time, cooking_status, notes
         FROM order_items
         WHERE order_id = ?1
         ORDER BY id",
    )?;
    let items = stmt
        .query_map([order_id], |row| {
            Ok(KitchenOrderItem {
                id: row.get(0)?,
                menu_item_id: row.get(1)?,
                name: row.get(2)?,
                price: row.get(3)?,
                quantity: row.get(4)?,
                needs_waiting_time: row.get(5)?,
                cooking_status: row.get(6)?,
                notes: row.get(7)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(items)
}

fn load_kitchen_order(conn: &Connection, id: &str) -> Result<KitchenOrder> {
    let mut order = conn
        .query_row(
            "SELECT id, order_code, order_type, table_number, customer_name, order_time, kitchen_status
             FROM orders
             WHERE id = ?1 AND kitchen_status IS NOT NULL",
            [id],
            kitchen_order_from_row,
        )
        .optional()?
        .ok_or_else(|| PosError::NotFound(format!("Kitchen order {}", id)))?;

    order.items = load_kitchen_lines(conn, id)?;
    Ok(order)
}
