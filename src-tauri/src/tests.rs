//! Integration tests for the cashier, kitchen and owner flows
//! These tests use an in-memory SQLite database seeded with the demo catalog

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use chrono::{DateTime, Local, TimeZone};

    use crate::auth::{self, AuthContext, SESSION_KEY};
    use crate::cart::{Cart, MAX_LINE_QUANTITY};
    use crate::catalog;
    use crate::checkout::{order_code, CheckoutState, Payment, Register};
    use crate::config::AppConfig;
    use crate::db::Database;
    use crate::error::PosError;
    use crate::kitchen::{paginate, KitchenBoard, StatusCounts};
    use crate::models::{
        CartItem, Category, CookingStatus, CreateMenuItem, MenuItem, Order, OrderType, PaymentMethod, Role, Stock,
        StockStatus, TaxSettings, User,
    };
    use crate::notice::{format_rupiah, Notice, NoticeLevel};
    use crate::pricing;
    use crate::reports::{self, SalesRange};
    use crate::repository::OrderRepository;
    use crate::routes::{guard, Navigation, Route};
    use crate::seed;
    use crate::session::{FileStore, KeyValueStore, MemoryStore};
    use crate::state::AppState;
    use crate::stock::{self, LowStockAlerts, StockStats};

    // Seeded menu ids
    const AYAM_KRISPY: i64 = 1;
    const CHICKEN_WRAP: i64 = 6;
    const MINERAL_WATER: i64 = 8;
    const FRUIT_TEA: i64 = 9;
    const HOT_TEA: i64 = 10;
    const ES_KOPI: i64 = 11;
    const BURGER: i64 = 12;
    const FRENCH_FRIES: i64 = 13;
    const ES_KRIM: i64 = 14;

    fn rates() -> TaxSettings {
        AppConfig::default().tax_settings()
    }

    /// Create an empty test database with schema
    fn setup_test_db() -> Database {
        let db = Database::open_in_memory().expect("Failed to create in-memory database");
        db.initialize().expect("Failed to create schema");
        db
    }

    /// Catalog only, no orders
    fn seeded_db() -> Database {
        let db = setup_test_db();
        seed::seed_catalog(&db, rates()).unwrap();
        db
    }

    /// Catalog plus the five demo kitchen orders
    fn demo_db() -> Database {
        let db = setup_test_db();
        seed::seed_demo(&db, rates()).unwrap();
        db
    }

    fn menu_item(db: &Database, id: i64) -> MenuItem {
        catalog::get_menu_item(db, id).unwrap()
    }

    fn stock_of(db: &Database, id: i64) -> Stock {
        menu_item(db, id).stock
    }

    fn kitchen_order_by_code(db: &Database, code: &str) -> crate::models::KitchenOrder {
        db.kitchen_orders()
            .unwrap()
            .into_iter()
            .find(|o| o.order_code == code)
            .unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, 0, 0).single().unwrap()
    }

    fn order_at(lines: Vec<CartItem>, created_at: DateTime<Local>) -> Order {
        let totals = pricing::compute(&lines, rates());
        Order {
            id: uuid::Uuid::new_v4().to_string(),
            order_code: order_code(OrderType::DineIn, created_at),
            items: lines,
            order_type: OrderType::DineIn,
            table_number: None,
            customer_name: None,
            subtotal: totals.subtotal,
            tax: totals.tax,
            service_fee: totals.service_fee,
            total: totals.total,
            payment_method: PaymentMethod::Cash,
            amount_paid: totals.total,
            change: 0,
            created_at,
        }
    }

    fn cashier() -> User {
        auth::authenticate("kasir", "123456").unwrap()
    }

    // ===== CART TESTS =====

    #[test]
    fn test_add_item_merges_lines() {
        let db = seeded_db();
        let mut cart = Cart::new();

        let notice = cart.add(&menu_item(&db, AYAM_KRISPY), 1).unwrap();
        assert_eq!(notice.level, NoticeLevel::Success);
        assert_eq!(notice.message, "Ayam Krispy added to order");

        cart.add(&menu_item(&db, AYAM_KRISPY), 2).unwrap();
        cart.add(&menu_item(&db, HOT_TEA), 1).unwrap();

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.get(AYAM_KRISPY).unwrap().quantity, 3);
        assert_eq!(cart.item_count(), 4);
        assert_eq!(cart.line_total(AYAM_KRISPY), Some(96_000));
    }

    #[test]
    fn test_add_sold_out_item_rejected() {
        let db = seeded_db();
        let mut cart = Cart::new();

        let result = cart.add(&menu_item(&db, ES_KRIM), 1);
        assert!(matches!(result, Err(PosError::OutOfStock(ref name)) if name == "Es Krim Vanilla"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_beyond_stock_rejected() {
        let db = seeded_db();
        let mut cart = Cart::new();
        let kopi = menu_item(&db, ES_KOPI);

        cart.add(&kopi, 5).unwrap();
        let result = cart.add(&kopi, 1);

        assert!(matches!(result, Err(PosError::InsufficientStock { available: 5, .. })));
        assert_eq!(cart.get(ES_KOPI).unwrap().quantity, 5);
    }

    #[test]
    fn test_unlimited_stock_never_caps() {
        let db = seeded_db();
        let mut cart = Cart::new();

        cart.add(&menu_item(&db, MINERAL_WATER), 1_000).unwrap();
        cart.update_quantity(MINERAL_WATER, 50_000).unwrap();

        assert_eq!(cart.get(MINERAL_WATER).unwrap().quantity, 50_000);
    }

    #[test]
    fn test_update_quantity() {
        let db = seeded_db();
        let mut cart = Cart::new();
        cart.add(&menu_item(&db, ES_KOPI), 2).unwrap();

        // Over stock leaves the line unchanged
        assert!(cart.update_quantity(ES_KOPI, 6).is_err());
        assert_eq!(cart.get(ES_KOPI).unwrap().quantity, 2);

        cart.update_quantity(ES_KOPI, 4).unwrap();
        assert_eq!(cart.get(ES_KOPI).unwrap().quantity, 4);

        // Zero removes the line
        let notice = cart.update_quantity(ES_KOPI, 0).unwrap();
        assert_eq!(notice.level, NoticeLevel::Info);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_unknown_item() {
        let mut cart = Cart::new();
        assert!(matches!(cart.update_quantity(42, 3), Err(PosError::NotFound(_))));
    }

    #[test]
    fn test_add_zero_quantity_rejected() {
        let db = seeded_db();
        let mut cart = Cart::new();

        assert!(matches!(cart.add(&menu_item(&db, HOT_TEA), 0), Err(PosError::Invalid(_))));
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_line_quantity_capped() {
        let db = seeded_db();
        let mut cart = Cart::new();
        let water = menu_item(&db, MINERAL_WATER);

        cart.add(&water, MAX_LINE_QUANTITY).unwrap();
        assert!(matches!(cart.add(&water, 1), Err(PosError::Invalid(_))));
        assert!(matches!(
            cart.update_quantity(MINERAL_WATER, MAX_LINE_QUANTITY as i64 + 1),
            Err(PosError::Invalid(_))
        ));
        assert_eq!(cart.get(MINERAL_WATER).unwrap().quantity, MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_cart_invariants_hold_across_operations() {
        let db = seeded_db();
        let menu = catalog::list_menu(&db).unwrap();
        let mut cart = Cart::new();

        // Fixed LCG so the run is reproducible
        let mut rng: u64 = 0x2545_f491;
        let mut next = |bound: u64| {
            rng = rng.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            (rng >> 33) % bound
        };

        for _ in 0..2_000 {
            let item = &menu[next(menu.len() as u64) as usize];
            match next(3) {
                0 => {
                    let _ = cart.add(item, next(8) as u32 + 1);
                }
                1 => {
                    let _ = cart.update_quantity(item.id, next(12) as i64 - 2);
                }
                _ => {
                    cart.remove(item.id);
                }
            }

            let mut seen = std::collections::HashSet::new();
            for line in cart.items() {
                assert!(seen.insert(line.item.id), "duplicate line for {}", line.item.id);
                assert!(line.quantity > 0);
                assert!(line.item.stock.allows(line.quantity), "{} over stock", line.item.name);
            }

            let totals = pricing::compute(cart.items(), rates());
            let lines: i64 = cart.items().iter().map(CartItem::line_total).sum();
            assert_eq!(totals.subtotal, lines);
            assert_eq!(totals.total, totals.subtotal + totals.tax + totals.service_fee);
        }
    }

    #[test]
    fn test_remove_item() {
        let db = seeded_db();
        let mut cart = Cart::new();
        cart.add(&menu_item(&db, HOT_TEA), 1).unwrap();
        cart.add(&menu_item(&db, BURGER), 1).unwrap();

        let notice = cart.remove(HOT_TEA);
        assert_eq!(notice.message, "Item removed from order");
        assert!(cart.get(HOT_TEA).is_none());
        assert_eq!(cart.items().len(), 1);
    }

    // ===== PRICING TESTS =====

    #[test]
    fn test_order_total_calculation() {
        let db = seeded_db();
        let mut cart = Cart::new();
        cart.add(&menu_item(&db, BURGER), 2).unwrap();

        let totals = pricing::compute(cart.items(), rates());
        assert_eq!(totals.subtotal, 90_000);
        assert_eq!(totals.tax, 9_000);
        assert_eq!(totals.service_fee, 4_500);
        assert_eq!(totals.total, 103_500);
    }

    #[test]
    fn test_empty_cart_totals_are_zero() {
        let totals = pricing::compute(&[], rates());
        assert_eq!(totals, pricing::Totals::default());
    }

    #[test]
    fn test_format_rupiah() {
        assert_eq!(format_rupiah(103_500), "Rp 103.500");
        assert_eq!(format_rupiah(1_000_000), "Rp 1.000.000");
        assert_eq!(format_rupiah(500), "Rp 500");
        assert_eq!(format_rupiah(-46_500), "-Rp 46.500");
    }

    // ===== CHECKOUT TESTS =====

    #[test]
    fn test_order_code_format() {
        let now = Local.timestamp_millis_opt(1_700_000_123_456).unwrap();
        assert_eq!(order_code(OrderType::DineIn, now), "DI-123456");
        assert_eq!(order_code(OrderType::TakeAway, now), "TA-123456");
    }

    #[test]
    fn test_begin_checkout_requires_items() {
        let mut register = Register::new();
        assert!(matches!(register.begin_checkout(), Err(PosError::EmptyCart)));
        assert_eq!(register.checkout_state(), &CheckoutState::Idle);
    }

    #[test]
    fn test_cancel_checkout_keeps_cart() {
        let db = seeded_db();
        let mut register = Register::new();
        register.add_item(&menu_item(&db, HOT_TEA), 2).unwrap();

        // Nothing to cancel yet
        assert!(matches!(
            register.cancel_checkout(),
            Err(PosError::InvalidTransition { .. })
        ));

        register.begin_checkout().unwrap();
        register.cancel_checkout().unwrap();

        assert_eq!(register.checkout_state(), &CheckoutState::Idle);
        assert_eq!(register.cart().item_count(), 2);
    }

    #[test]
    fn test_confirm_payment_requires_open_checkout() {
        let db = seeded_db();
        let mut register = Register::new();
        register.add_item(&menu_item(&db, HOT_TEA), 1).unwrap();

        let result = register.confirm_payment(&db, rates(), Payment::Qr, Local::now());
        assert!(matches!(result, Err(PosError::InvalidTransition { .. })));
        assert!(db.list().unwrap().is_empty());
    }

    #[test]
    fn test_insufficient_cash_rejected() {
        let db = seeded_db();
        let mut register = Register::new();
        register.add_item(&menu_item(&db, BURGER), 2).unwrap();
        register.begin_checkout().unwrap();

        let result = register.confirm_payment(&db, rates(), Payment::Cash { amount_paid: 100_000 }, Local::now());

        assert!(matches!(
            result,
            Err(PosError::InsufficientPayment {
                paid: 100_000,
                total: 103_500
            })
        ));
        assert_eq!(register.checkout_state(), &CheckoutState::AwaitingPayment);
        assert_eq!(register.cart().item_count(), 2);
        assert!(db.list().unwrap().is_empty());
        assert_eq!(stock_of(&db, BURGER), Stock::Count(50));
    }

    #[test]
    fn test_fast_order_completes_immediately() {
        let db = seeded_db();
        let mut register = Register::new();
        register.add_item(&menu_item(&db, MINERAL_WATER), 2).unwrap();
        register.add_item(&menu_item(&db, FRENCH_FRIES), 1).unwrap();
        register.begin_checkout().unwrap();

        let notice = register
            .confirm_payment(&db, rates(), Payment::Card, Local::now())
            .unwrap()
            .unwrap();

        assert_eq!(notice.message, "Transaction successful!");
        let order = register.current_order().unwrap().clone();
        assert_eq!(order.payment_method, PaymentMethod::Card);
        assert_eq!(order.amount_paid, order.total);
        assert_eq!(order.change, 0);
        assert!(register.cart().is_empty());

        // Stored for reports, not routed to the kitchen
        assert_eq!(db.get(&order.id).unwrap().unwrap().total, order.total);
        assert!(db.kitchen_orders().unwrap().is_empty());
        assert_eq!(stock_of(&db, FRENCH_FRIES), Stock::Count(3));
        assert_eq!(stock_of(&db, MINERAL_WATER), Stock::Unlimited);
    }

    #[test]
    fn test_dine_in_waiting_flow() {
        let db = seeded_db();
        let mut register = Register::new();
        register.add_item(&menu_item(&db, BURGER), 2).unwrap();
        register.begin_checkout().unwrap();

        // Slow item: the waiting-time question comes first
        let notice = register
            .confirm_payment(&db, rates(), Payment::Cash { amount_paid: 150_000 }, Local::now())
            .unwrap();
        assert!(notice.is_none());
        assert!(matches!(
            register.checkout_state(),
            CheckoutState::AwaitingWaitDecision(_)
        ));
        assert!(db.list().unwrap().is_empty());

        let draft = register.checkout_state().draft().unwrap();
        assert_eq!(draft.total, 103_500);
        assert_eq!(draft.change, 46_500);

        assert!(register.answer_wait(&db, true).unwrap().is_none());
        assert!(matches!(
            register.checkout_state(),
            CheckoutState::AwaitingWaitDetails(_)
        ));

        // Blank or non-numeric table keeps the dialog open
        assert!(matches!(
            register.submit_wait_details(&db, "   "),
            Err(PosError::MissingTableNumber)
        ));
        assert!(matches!(
            register.submit_wait_details(&db, "meja"),
            Err(PosError::MissingTableNumber)
        ));
        assert!(matches!(
            register.checkout_state(),
            CheckoutState::AwaitingWaitDetails(_)
        ));

        let notice = register.submit_wait_details(&db, " 7 ").unwrap().unwrap();
        assert_eq!(notice.message, "Order sent to kitchen - Table 7");

        let order = register.current_order().unwrap().clone();
        assert_eq!(order.total, 103_500);
        assert_eq!(order.change, 46_500);
        assert_eq!(order.table_number, Some(7));
        assert!(order.order_code.starts_with("DI-"));
        assert_eq!(order.order_code.len(), 9);
        assert!(order.order_code[3..].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(
            notice.description.as_deref(),
            Some(format!("{} · Rp 103.500", order.order_code).as_str())
        );
        assert!(register.cart().is_empty());

        let kitchen = db.kitchen_orders().unwrap();
        assert_eq!(kitchen.len(), 1);
        assert_eq!(kitchen[0].table_number, Some(7));
        assert_eq!(kitchen[0].status, CookingStatus::Waiting);
        assert!(kitchen[0]
            .items
            .iter()
            .all(|line| line.cooking_status == CookingStatus::Waiting));
        assert_eq!(stock_of(&db, BURGER), Stock::Count(48));

        register.close_receipt();
        assert_eq!(register.checkout_state(), &CheckoutState::Idle);
    }

    #[test]
    fn test_take_away_requires_customer_name() {
        let db = seeded_db();
        let mut register = Register::new();
        register.set_order_type(OrderType::TakeAway).unwrap();
        register.add_item(&menu_item(&db, AYAM_KRISPY), 1).unwrap();
        register.begin_checkout().unwrap();

        register.confirm_payment(&db, rates(), Payment::Qr, Local::now()).unwrap();
        register.answer_wait(&db, true).unwrap();

        assert!(matches!(
            register.submit_wait_details(&db, ""),
            Err(PosError::MissingCustomerName)
        ));

        let notice = register.submit_wait_details(&db, "Budi").unwrap().unwrap();
        assert_eq!(notice.message, "Order sent to kitchen - Budi");

        let order = register.current_order().unwrap();
        assert!(order.order_code.starts_with("TA-"));
        assert_eq!(order.customer_name.as_deref(), Some("Budi"));
        assert_eq!(db.kitchen_orders().unwrap()[0].customer_name.as_deref(), Some("Budi"));
    }

    #[test]
    fn test_declining_wait_finalizes_without_details() {
        let db = seeded_db();
        let mut register = Register::new();
        register.add_item(&menu_item(&db, FRUIT_TEA), 1).unwrap();
        register.begin_checkout().unwrap();
        register.confirm_payment(&db, rates(), Payment::Qr, Local::now()).unwrap();

        let notice = register.answer_wait(&db, false).unwrap().unwrap();
        assert_eq!(notice.message, "Transaction successful!");

        let order = register.current_order().unwrap();
        assert_eq!(order.table_number, None);
        assert_eq!(order.customer_name, None);
        // Still cooked by the kitchen
        assert_eq!(db.kitchen_orders().unwrap().len(), 1);
    }

    #[test]
    fn test_stale_cart_rejected_at_checkout() {
        let db = seeded_db();
        let fries = menu_item(&db, FRENCH_FRIES);

        let mut first = Register::new();
        let mut second = Register::new();
        first.add_item(&fries, 4).unwrap();
        second.add_item(&fries, 4).unwrap();

        first.begin_checkout().unwrap();
        first.confirm_payment(&db, rates(), Payment::Qr, Local::now()).unwrap();
        assert_eq!(stock_of(&db, FRENCH_FRIES), Stock::Count(0));

        second.begin_checkout().unwrap();
        let result = second.confirm_payment(&db, rates(), Payment::Qr, Local::now());
        assert!(matches!(result, Err(PosError::InsufficientStock { available: 0, .. })));
        assert_eq!(second.checkout_state(), &CheckoutState::AwaitingPayment);
        assert_eq!(second.cart().item_count(), 4);
        assert_eq!(db.list().unwrap().len(), 1);

        // A fresh read shows the item sold out
        let mut cart = Cart::new();
        assert!(matches!(
            cart.add(&menu_item(&db, FRENCH_FRIES), 1),
            Err(PosError::OutOfStock(_))
        ));
    }

    #[test]
    fn test_cart_locked_until_order_stored() {
        let db = seeded_db();
        let water = menu_item(&db, MINERAL_WATER);
        let mut register = Register::new();
        register.add_item(&menu_item(&db, AYAM_KRISPY), 1).unwrap();
        register.begin_checkout().unwrap();

        let assert_locked = |register: &mut Register, state: &'static str| {
            assert!(matches!(
                register.add_item(&water, 1),
                Err(PosError::InvalidTransition { state: s, .. }) if s == state
            ));
            assert!(matches!(
                register.update_quantity(AYAM_KRISPY, 3, None),
                Err(PosError::InvalidTransition { .. })
            ));
            assert!(matches!(register.remove_item(AYAM_KRISPY), Err(PosError::InvalidTransition { .. })));
            assert!(matches!(
                register.set_order_type(OrderType::TakeAway),
                Err(PosError::InvalidTransition { .. })
            ));
            assert_eq!(register.cart().item_count(), 1);
        };

        assert_locked(&mut register, "awaiting payment");

        register.confirm_payment(&db, rates(), Payment::Card, Local::now()).unwrap();
        assert_locked(&mut register, "awaiting wait decision");

        let stored = register.answer_wait(&db, false).unwrap();
        assert!(stored.is_some());
        let order = register.current_order().unwrap().clone();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].item.id, AYAM_KRISPY);
        assert_eq!(order.order_type, OrderType::DineIn);
        assert_eq!(db.get(&order.id).unwrap().unwrap().items.len(), 1);

        // The next customer can start while the receipt is still open
        register.add_item(&water, 2).unwrap();
        assert_eq!(register.cart().item_count(), 2);
        assert!(register.current_order().is_some());
    }

    #[test]
    fn test_cart_locked_while_collecting_wait_details() {
        let db = seeded_db();
        let mut register = Register::new();
        register.add_item(&menu_item(&db, BURGER), 1).unwrap();
        register.begin_checkout().unwrap();
        register.confirm_payment(&db, rates(), Payment::Qr, Local::now()).unwrap();
        register.answer_wait(&db, true).unwrap();

        assert!(matches!(
            register.add_item(&menu_item(&db, HOT_TEA), 1),
            Err(PosError::InvalidTransition { state: "awaiting wait details", .. })
        ));
        assert!(matches!(
            register.update_quantity(BURGER, 0, None),
            Err(PosError::InvalidTransition { .. })
        ));

        register.submit_wait_details(&db, "3").unwrap();
        let order = register.current_order().unwrap();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 1);
        assert_eq!(order.table_number, Some(3));
    }

    #[test]
    fn test_update_quantity_uses_current_stock() {
        let db = seeded_db();
        let kopi = menu_item(&db, ES_KOPI);
        let mut register = Register::new();
        register.add_item(&kopi, 2).unwrap();

        catalog::update_menu_item(
            &db,
            crate::models::UpdateMenuItem {
                id: kopi.id,
                name: kopi.name.clone(),
                description: kopi.description.clone(),
                price: kopi.price,
                image: kopi.image.clone(),
                category_id: kopi.category_id.clone(),
                needs_waiting_time: kopi.needs_waiting_time,
                stock: Stock::Count(3),
                low_stock_threshold: kopi.low_stock_threshold,
                predikat_id: kopi.predikat_id,
            },
        )
        .unwrap();
        let fresh = menu_item(&db, ES_KOPI);

        let result = register.update_quantity(ES_KOPI, 4, Some(&fresh));
        assert!(matches!(result, Err(PosError::InsufficientStock { available: 3, .. })));
        assert_eq!(register.cart().get(ES_KOPI).unwrap().quantity, 2);
        assert_eq!(register.cart().get(ES_KOPI).unwrap().item.stock, Stock::Count(3));

        register.update_quantity(ES_KOPI, 3, Some(&fresh)).unwrap();
        assert_eq!(register.cart().item_count(), 3);
    }

    #[test]
    fn test_payment_from_json() {
        let cash: Payment = serde_json::from_str(r#"{"method":"cash","amount_paid":150000}"#).unwrap();
        assert_eq!(cash, Payment::Cash { amount_paid: 150_000 });

        let qr: Payment = serde_json::from_str(r#"{"method":"qr"}"#).unwrap();
        assert_eq!(qr.method(), PaymentMethod::Qr);
    }

    // ===== REPOSITORY TESTS =====

    #[test]
    fn test_create_order_is_atomic() {
        let db = seeded_db();
        let lines = vec![
            CartItem {
                item: menu_item(&db, BURGER),
                quantity: 2,
            },
            CartItem {
                item: menu_item(&db, ES_KOPI),
                quantity: 10,
            },
        ];

        let result = db.create(&order_at(lines, Local::now()));

        assert!(matches!(
            result,
            Err(PosError::InsufficientStock { ref name, available: 5 }) if name == "Es Kopi Gula Aren"
        ));
        // Burger decrement rolled back
        assert_eq!(stock_of(&db, BURGER), Stock::Count(50));
        assert!(db.list().unwrap().is_empty());
    }

    #[test]
    fn test_order_lines_keep_checkout_snapshot() {
        let db = seeded_db();
        let order = order_at(
            vec![CartItem {
                item: menu_item(&db, BURGER),
                quantity: 1,
            }],
            Local::now(),
        );
        db.create(&order).unwrap();

        let mut changed = menu_item(&db, BURGER);
        changed.price = 99_000;
        catalog::update_menu_item(
            &db,
            crate::models::UpdateMenuItem {
                id: changed.id,
                name: changed.name,
                description: changed.description,
                price: changed.price,
                image: changed.image,
                category_id: changed.category_id,
                needs_waiting_time: changed.needs_waiting_time,
                stock: changed.stock,
                low_stock_threshold: changed.low_stock_threshold,
                predikat_id: changed.predikat_id,
            },
        )
        .unwrap();

        let stored = db.get(&order.id).unwrap().unwrap();
        assert_eq!(stored.items[0].item.price, 45_000);
        assert_eq!(stored.order_code, order.order_code);
        assert!(db.get("missing").unwrap().is_none());
    }

    // ===== KITCHEN TESTS =====

    #[test]
    fn test_cooking_status_aggregate() {
        use CookingStatus::*;
        assert_eq!(CookingStatus::aggregate([Done, Cooking, Waiting]), Cooking);
        assert_eq!(CookingStatus::aggregate([Done, Waiting]), Cooking);
        assert_eq!(CookingStatus::aggregate([Waiting, Waiting]), Waiting);
        assert_eq!(CookingStatus::aggregate([Done, Done]), Done);
    }

    #[test]
    fn test_seeded_kitchen_counts() {
        let db = demo_db();
        let counts = KitchenBoard::new(&db).counts().unwrap();
        assert_eq!(
            counts,
            StatusCounts {
                total: 5,
                waiting: 1,
                cooking: 3,
                done: 1,
            }
        );

        let first = kitchen_order_by_code(&db, "PSN-001");
        assert_eq!(first.status, CookingStatus::Cooking);
        assert_eq!(first.order_time, "15.30");
        assert_eq!(first.items[0].notes.as_deref(), Some("tanpa sayur"));
        assert!(!first.can_complete());
    }

    #[test]
    fn test_item_status_updates_order_status() {
        let db = demo_db();
        let board = KitchenBoard::new(&db);
        let order = kitchen_order_by_code(&db, "PSN-001");
        let burger_line = order.items[0].id;
        let tea_line = order.items[2].id;

        let order = board.set_item_status(&order.id, burger_line, CookingStatus::Done).unwrap();
        assert_eq!(order.status, CookingStatus::Cooking);
        assert!(!order.can_complete());

        let order = board.set_item_status(&order.id, tea_line, CookingStatus::Done).unwrap();
        assert_eq!(order.status, CookingStatus::Done);
        assert!(order.can_complete());
        assert!(order.is_complete());
    }

    #[test]
    fn test_complete_order() {
        let db = demo_db();
        let board = KitchenBoard::new(&db);
        let order = kitchen_order_by_code(&db, "PSN-004");
        assert_eq!(order.status, CookingStatus::Waiting);

        let (order, notice) = board.complete_order(&order.id).unwrap();
        assert_eq!(notice.message, "Order PSN-004 completed");
        assert!(order.is_complete());
        assert!(order.items.iter().all(|line| line.cooking_status == CookingStatus::Done));
        assert_eq!(board.counts().unwrap().done, 2);
    }

    #[test]
    fn test_kitchen_rejects_unknown_order_and_item() {
        let db = demo_db();
        let board = KitchenBoard::new(&db);
        assert!(matches!(board.order("missing"), Err(PosError::NotFound(_))));

        let order = kitchen_order_by_code(&db, "PSN-002");
        assert!(matches!(
            board.set_item_status(&order.id, 9_999, CookingStatus::Done),
            Err(PosError::NotFound(_))
        ));
    }

    #[test]
    fn test_fast_order_not_on_kitchen_board() {
        let db = seeded_db();
        let order = order_at(
            vec![CartItem {
                item: menu_item(&db, HOT_TEA),
                quantity: 1,
            }],
            Local::now(),
        );
        db.create(&order).unwrap();

        assert!(matches!(db.kitchen_order(&order.id), Err(PosError::NotFound(_))));
        assert!(matches!(db.complete(&order.id), Err(PosError::NotFound(_))));
    }

    #[test]
    fn test_kitchen_search_and_pages() {
        let db = demo_db();
        let board = KitchenBoard::new(&db);

        let found = board.search("zam").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].order_code, "PSN-004");
        assert_eq!(board.search("psn-00").unwrap().len(), 5);

        let page = board.page("", 1).unwrap();
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.items.len(), 5);
        assert!(board.page("", 2).unwrap().items.is_empty());
    }

    #[test]
    fn test_paginate() {
        let items: Vec<u32> = (1..=20).collect();
        let page = paginate(&items, 3, 9);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items, vec![19, 20]);

        // Page zero is treated as the first page
        assert_eq!(paginate(&items, 0, 9).items.len(), 9);
    }

    // ===== STOCK TESTS =====

    #[test]
    fn test_low_stock_alerts() {
        let db = demo_db();
        let menu = catalog::list_menu(&db).unwrap();
        let mut alerts = LowStockAlerts::new();

        let ids: Vec<i64> = alerts.active(&menu).iter().map(|item| item.id).collect();
        // Sold-out ice cream is not "low"
        assert_eq!(ids, vec![CHICKEN_WRAP, ES_KOPI, FRENCH_FRIES]);

        alerts.dismiss(ES_KOPI);
        assert!(alerts.is_dismissed(ES_KOPI));
        let ids: Vec<i64> = alerts.active(&menu).iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![CHICKEN_WRAP, FRENCH_FRIES]);

        // Dismissals do not outlive the session
        assert_eq!(LowStockAlerts::new().active(&menu).len(), 3);
    }

    #[test]
    fn test_stock_items_with_kitchen_queue() {
        let db = demo_db();
        let menu = catalog::list_menu(&db).unwrap();
        let categories = catalog::list_categories(&db).unwrap();
        let orders = db.kitchen_orders().unwrap();

        let items = stock::stock_items(&menu, &categories, &orders, 10);
        let by_id = |id: i64| items.iter().find(|i| i.menu_item_id == id).unwrap();

        let burger = by_id(BURGER);
        assert_eq!(burger.code, "M012");
        assert_eq!(burger.category, "Makanan");
        assert_eq!(burger.stock, Stock::Count(47));
        assert_eq!(burger.in_queue, 3);
        assert_eq!(burger.orders[0].order_code, "PSN-001");
        assert_eq!(burger.status, StockStatus::Sufficient);

        // Finished lines no longer count as queued
        assert_eq!(by_id(MINERAL_WATER).in_queue, 0);
        assert_eq!(by_id(HOT_TEA).in_queue, 2);
        assert_eq!(by_id(ES_KOPI).status, StockStatus::Low);
        assert_eq!(by_id(ES_KRIM).status, StockStatus::Low);

        let stats = StockStats::of(&items);
        assert_eq!(stats.total_menu, 14);
        assert_eq!(stats.total_queue, 17);
        assert_eq!(stats.low, 4);
        assert_eq!(stats.sufficient, 10);

        assert_eq!(stock::page(&items, "m01", 1).items.len(), 5);
        assert_eq!(stock::search(&items, "kopi").len(), 1);
    }

    #[test]
    fn test_notify_cashier_notice() {
        let db = demo_db();
        let menu = catalog::list_menu(&db).unwrap();
        let categories = catalog::list_categories(&db).unwrap();
        let items = stock::stock_items(&menu, &categories, &db.kitchen_orders().unwrap(), 10);
        let kopi = items.iter().find(|i| i.menu_item_id == ES_KOPI).unwrap();

        let notice = stock::notify_cashier(kopi);
        assert_eq!(notice.message, "Low stock notice for Es Kopi Gula Aren sent to cashier");
        assert_eq!(notice.description.as_deref(), Some("Remaining stock: 4 - Status: Low"));
    }

    // ===== CATALOG TESTS =====

    #[test]
    fn test_filter_menu() {
        let db = seeded_db();
        let menu = catalog::list_menu(&db).unwrap();

        assert_eq!(catalog::filter_menu(&menu, catalog::ALL_CATEGORIES, "").len(), 14);
        assert_eq!(catalog::filter_menu(&menu, "minuman", "").len(), 4);

        let teas = catalog::filter_menu(&menu, "minuman", "TEH");
        let names: Vec<&str> = teas.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Fruit Tea Lemon", "Hot Tea"]);
    }

    #[test]
    fn test_create_menu_item() {
        let db = seeded_db();
        let item = catalog::create_menu_item(
            &db,
            CreateMenuItem {
                name: "  Nasi Goreng ".to_string(),
                description: "Nasi goreng spesial".to_string(),
                price: 28_000,
                image: None,
                category_id: "makanan".to_string(),
                needs_waiting_time: true,
                stock: Stock::Count(20),
                low_stock_threshold: Some(5),
                predikat_id: None,
            },
        )
        .unwrap();

        assert_eq!(item.id, 15);
        assert_eq!(item.name, "Nasi Goreng");
        assert_eq!(item.image, "/placeholder.svg");

        catalog::delete_menu_item(&db, item.id).unwrap();
        assert!(matches!(catalog::delete_menu_item(&db, item.id), Err(PosError::NotFound(_))));
    }

    #[test]
    fn test_menu_item_validation() {
        let db = seeded_db();
        let result = catalog::create_menu_item(
            &db,
            CreateMenuItem {
                name: "Gratis".to_string(),
                description: String::new(),
                price: -1,
                image: None,
                category_id: "snack".to_string(),
                needs_waiting_time: false,
                stock: Stock::Unlimited,
                low_stock_threshold: None,
                predikat_id: None,
            },
        );
        assert!(matches!(result, Err(PosError::Invalid(_))));
    }

    #[test]
    fn test_menu_price_capped() {
        let db = seeded_db();
        let item = |price| CreateMenuItem {
            name: "Paket Katering".to_string(),
            description: String::new(),
            price,
            image: None,
            category_id: "makanan".to_string(),
            needs_waiting_time: false,
            stock: Stock::Unlimited,
            low_stock_threshold: None,
            predikat_id: None,
        };

        assert!(matches!(
            catalog::create_menu_item(&db, item(catalog::MAX_PRICE + 1)),
            Err(PosError::Invalid(_))
        ));
        let created = catalog::create_menu_item(&db, item(catalog::MAX_PRICE)).unwrap();

        // The largest possible line still prices without overflow
        let mut cart = Cart::new();
        cart.add(&created, MAX_LINE_QUANTITY).unwrap();
        let totals = pricing::compute(cart.items(), rates());
        assert_eq!(totals.subtotal, catalog::MAX_PRICE * MAX_LINE_QUANTITY as i64);
        assert!(totals.total > totals.subtotal);
    }

    #[test]
    fn test_category_lifecycle() {
        let db = seeded_db();

        let category = catalog::create_category(&db, "Es Krim", "🍨").unwrap();
        assert_eq!(category.id, "es-krim");
        assert!(catalog::create_category(&db, "All", "").is_err());
        assert!(catalog::create_category(&db, "Es Krim", "🍨").is_err(), "duplicate category");

        let renamed = catalog::update_category(
            &db,
            Category {
                id: "es-krim".to_string(),
                name: "Gelato".to_string(),
                icon: "🍨".to_string(),
            },
        )
        .unwrap();
        assert_eq!(renamed.name, "Gelato");

        // Categories in use cannot be removed
        assert!(matches!(catalog::delete_category(&db, "makanan"), Err(PosError::Invalid(_))));
        catalog::delete_category(&db, "es-krim").unwrap();
        assert_eq!(catalog::list_categories(&db).unwrap().len(), 4);
    }

    #[test]
    fn test_delete_predikat_unlabels_menu() {
        let db = seeded_db();
        let created = catalog::create_predikat(&db, "Pedas", "#F97316").unwrap();
        assert_eq!(catalog::list_predikats(&db).unwrap().len(), 5);
        assert!(catalog::create_predikat(&db, " ", "#000000").is_err());

        catalog::delete_predikat(&db, 1).unwrap();
        assert_eq!(menu_item(&db, AYAM_KRISPY).predikat_id, None);
        assert_eq!(menu_item(&db, BURGER).predikat_id, None);

        let names: Vec<String> = catalog::list_predikats(&db)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert!(!names.contains(&"Best Seller".to_string()));
        assert!(names.contains(&created.name));
    }

    #[test]
    fn test_tax_settings_roundtrip() {
        let db = setup_test_db();
        assert_eq!(catalog::tax_settings(&db, rates()).unwrap(), rates());

        let updated = TaxSettings {
            tax_rate_bps: 1_100,
            service_fee_rate_bps: 0,
        };
        catalog::update_tax_settings(&db, updated).unwrap();
        assert_eq!(catalog::tax_settings(&db, rates()).unwrap(), updated);

        let too_high = TaxSettings {
            tax_rate_bps: 10_001,
            service_fee_rate_bps: 0,
        };
        assert!(matches!(catalog::update_tax_settings(&db, too_high), Err(PosError::Invalid(_))));
    }

    // ===== AUTH TESTS =====

    #[test]
    fn test_demo_credentials() {
        assert_eq!(cashier().role, Role::Cashier);
        assert_eq!(auth::authenticate("owner", "123456").unwrap().role, Role::Owner);
        assert_eq!(auth::authenticate("dapur", "123456").unwrap().role, Role::Kitchen);
        assert!(matches!(auth::authenticate("kasir", "654321"), Err(PosError::InvalidCredentials)));
        assert!(matches!(auth::authenticate("tamu", "123456"), Err(PosError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_persists_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut ctx = AuthContext::init(Box::new(FileStore::new(&path)), Duration::ZERO);
        assert!(ctx.current_user().is_none());
        assert!(matches!(
            auth::verify_login("kasir", "wrong", ctx.login_delay()).await,
            Err(PosError::InvalidCredentials)
        ));
        assert!(ctx.current_user().is_none());

        let user = auth::verify_login("kasir", "123456", ctx.login_delay()).await.unwrap();
        ctx.establish(user.clone()).unwrap();
        assert_eq!(ctx.current_user(), Some(&user));

        // Next launch restores the session
        let restored = AuthContext::init(Box::new(FileStore::new(&path)), Duration::ZERO);
        assert_eq!(restored.current_user(), Some(&user));

        ctx.logout().unwrap();
        assert!(ctx.current_user().is_none());
        let after_logout = AuthContext::init(Box::new(FileStore::new(&path)), Duration::ZERO);
        assert!(after_logout.current_user().is_none());
    }

    #[test]
    fn test_malformed_session_is_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut store = FileStore::new(&path);
        store.set(SESSION_KEY, "{not a user").unwrap();

        let ctx = AuthContext::init(Box::new(FileStore::new(&path)), Duration::ZERO);
        assert!(ctx.current_user().is_none());
        assert_eq!(store.get(SESSION_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_tolerates_missing_and_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let mut store = FileStore::new(&path);

        assert_eq!(store.get("any").unwrap(), None);
        store.set("any", "value").unwrap();
        assert_eq!(store.get("any").unwrap().as_deref(), Some("value"));

        std::fs::write(&path, "garbage").unwrap();
        assert_eq!(store.get("any").unwrap(), None);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        store.set(SESSION_KEY, "x").unwrap();
        assert_eq!(store.get(SESSION_KEY).unwrap().as_deref(), Some("x"));
        store.remove(SESSION_KEY).unwrap();
        assert_eq!(store.get(SESSION_KEY).unwrap(), None);
    }

    // ===== ROUTE TESTS =====

    #[test]
    fn test_route_guards() {
        let owner = auth::authenticate("owner", "123456").unwrap();
        let kitchen = auth::authenticate("dapur", "123456").unwrap();

        assert_eq!(guard("/", None), Navigation::Render(Route::Login));
        assert_eq!(guard("/pos", None), Navigation::Redirect(Route::Login));
        assert_eq!(guard("/pos", Some(&cashier())), Navigation::Render(Route::Pos));
        assert_eq!(guard("/owner/menu", Some(&cashier())), Navigation::Redirect(Route::Pos));
        assert_eq!(guard("/pos", Some(&owner)), Navigation::Redirect(Route::OwnerMenu));
        assert_eq!(guard("/owner/pajak", Some(&kitchen)), Navigation::Redirect(Route::KitchenOrders));
        assert_eq!(guard("/kitchen/stok/", Some(&kitchen)), Navigation::Render(Route::KitchenStock));
        assert_eq!(guard("/unknown", None), Navigation::Render(Route::NotFound));
    }

    #[test]
    fn test_route_paths_roundtrip() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), route);
        }
    }

    // ===== CONFIG TESTS =====

    #[test]
    fn test_config_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("POS_TAX_RATE_BPS", "1100"),
            ("POS_LOGIN_DELAY_MS", "0"),
            ("POS_SESSION_FILE", "/tmp/pos/session.json"),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.tax_rate_bps, 1_100);
        assert_eq!(config.service_fee_rate_bps, 500);
        assert_eq!(config.login_delay, Duration::ZERO);
        assert_eq!(config.session_file.as_deref(), Some(std::path::Path::new("/tmp/pos/session.json")));

        assert_eq!(AppConfig::from_lookup(|_| None).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_config_rejects_invalid_values() {
        let result = AppConfig::from_lookup(|key| (key == "POS_STOCK_THRESHOLD").then(|| "lots".to_string()));
        assert!(matches!(result, Err(PosError::Config(_))));
    }

    // ===== REPORT TESTS =====

    #[test]
    fn test_menu_trends() {
        let db = seeded_db();
        let burger = menu_item(&db, BURGER);
        let tea = menu_item(&db, HOT_TEA);
        let line = |item: &MenuItem, quantity| CartItem {
            item: item.clone(),
            quantity,
        };

        let orders = vec![
            order_at(vec![line(&burger, 2)], at(2024, 5, 3, 12)),
            order_at(vec![line(&burger, 3)], at(2024, 5, 9, 12)),
            order_at(vec![line(&tea, 1)], at(2024, 5, 10, 12)),
            // Outside both windows
            order_at(vec![line(&tea, 9)], at(2024, 4, 1, 12)),
        ];

        let trends = reports::menu_trends(&orders, at(2024, 5, 8, 0), chrono::Duration::days(7));
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].name, "Chicken Burger Deluxe");
        assert_eq!(trends[0].sold, 3);
        assert_eq!(trends[0].revenue, 135_000);
        assert_eq!(trends[0].trend, 50.0);
        assert_eq!(trends[1].sold, 1);
        assert_eq!(trends[1].trend, 100.0);

        assert_eq!(reports::best_sellers(&trends, 1)[0].menu_item_id, BURGER);
        assert_eq!(reports::least_sellers(&trends, 1)[0].menu_item_id, HOT_TEA);
    }

    #[test]
    fn test_day_summary() {
        let db = seeded_db();
        let tea = CartItem {
            item: menu_item(&db, HOT_TEA),
            quantity: 2,
        };
        let orders = vec![
            order_at(vec![tea.clone()], at(2024, 5, 9, 9)),
            order_at(vec![tea.clone()], at(2024, 5, 9, 20)),
            order_at(vec![tea], at(2024, 5, 10, 9)),
        ];

        let summary = reports::day_summary(&orders, at(2024, 5, 9, 12).date_naive());
        assert_eq!(summary.date, "2024-05-09");
        assert_eq!(summary.total_orders, 2);
        // 16.000 + 1.600 tax + 800 fee, twice
        assert_eq!(summary.total_revenue, 36_800);
    }

    #[test]
    fn test_sales_series_lengths() {
        assert_eq!(reports::sales_series(SalesRange::Weekly).len(), 7);
        assert_eq!(reports::sales_series(SalesRange::Monthly).len(), 12);
        assert_eq!(reports::sales_series(SalesRange::Yearly)[0].label, "2020");
    }

    // ===== ERROR & NOTICE TESTS =====

    #[test]
    fn test_error_notice() {
        let err = PosError::InsufficientPayment {
            paid: 100_000,
            total: 103_500,
        };
        assert!(err.is_validation());
        assert!(!PosError::InvalidCredentials.is_validation());

        let notice = Notice::from(&PosError::EmptyCart);
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Cart is empty");
    }

    #[test]
    fn test_stock_serializes_unlimited_as_sentinel() {
        assert_eq!(serde_json::to_value(Stock::Unlimited).unwrap(), serde_json::json!(-1));
        assert_eq!(serde_json::from_str::<Stock>("12").unwrap(), Stock::Count(12));
    }

    // ===== APP STATE TESTS =====

    #[test]
    fn test_app_state_starts_with_demo_session() {
        let state = AppState::new(AppConfig::default(), Box::new(MemoryStore::new())).unwrap();

        assert_eq!(state.tax_settings().unwrap(), rates());
        assert_eq!(catalog::list_menu(&state.db).unwrap().len(), 14);
        assert_eq!(state.db.kitchen_orders().unwrap().len(), 5);
        assert!(state.auth.lock().unwrap().current_user().is_none());
        assert!(state.register.lock().unwrap().cart().is_empty());
    }
}
