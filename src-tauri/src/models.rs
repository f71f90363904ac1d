use chrono::{DateTime, Local};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Amount in rupiah, the smallest currency unit.
pub type Money = i64;

/// Stores simple string enums as TEXT columns.
macro_rules! sql_text_enum {
    ($ty:ty) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let text = value.as_str()?;
                <$ty>::parse(text).ok_or_else(|| FromSqlError::Other(format!("unknown value '{}'", text).into()))
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Stock {
    Unlimited,
    Count(u32),
}

impl Stock {
    /// Integer used on the wire and in the database for unlimited stock.
    pub const UNLIMITED: i64 = -1;

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Stock::Unlimited)
    }

    pub fn is_sold_out(&self) -> bool {
        matches!(self, Stock::Count(0))
    }

    pub fn count(&self) -> Option<u32> {
        match self {
            Stock::Unlimited => None,
            Stock::Count(n) => Some(*n),
        }
    }

    /// Whether `quantity` units can be taken from this stock.
    pub fn allows(&self, quantity: u32) -> bool {
        match self {
            Stock::Unlimited => true,
            Stock::Count(n) => quantity <= *n,
        }
    }
}

impl From<i64> for Stock {
    fn from(value: i64) -> Self {
        if value < 0 {
            Stock::Unlimited
        } else {
            Stock::Count(u32::try_from(value).unwrap_or(u32::MAX))
        }
    }
}

impl From<Stock> for i64 {
    fn from(stock: Stock) -> Self {
        match stock {
            Stock::Unlimited => Stock::UNLIMITED,
            Stock::Count(n) => i64::from(n),
        }
    }
}

impl ToSql for Stock {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(i64::from(*self)))
    }
}

impl FromSql for Stock {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_i64().map(Stock::from)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
}

/// Merchandising label shown on a menu card, e.g. "Best Seller".
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Predikat {
    pub id: i64,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub image: String,
    pub category_id: String,
    pub needs_waiting_time: bool,
    pub stock: Stock,
    pub low_stock_threshold: Option<u32>,
    pub predikat_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateMenuItem {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub image: Option<String>,
    pub category_id: String,
    pub needs_waiting_time: bool,
    pub stock: Stock,
    pub low_stock_threshold: Option<u32>,
    pub predikat_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateMenuItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub image: String,
    pub category_id: String,
    pub needs_waiting_time: bool,
    pub stock: Stock,
    pub low_stock_threshold: Option<u32>,
    pub predikat_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CartItem {
    #[serde(flatten)]
    pub item: MenuItem,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> Money {
        self.item.price * Money::from(self.quantity)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OrderType {
    DineIn,
    TakeAway,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::DineIn => "dine-in",
            OrderType::TakeAway => "take-away",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dine-in" => Some(OrderType::DineIn),
            "take-away" => Some(OrderType::TakeAway),
            _ => None,
        }
    }

    /// Two-letter prefix of the human-readable order code.
    pub fn code_prefix(&self) -> &'static str {
        match self {
            OrderType::DineIn => "DI",
            OrderType::TakeAway => "TA",
        }
    }
}

sql_text_enum!(OrderType);

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Qr,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Qr => "qr",
            PaymentMethod::Card => "card",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cash" => Some(PaymentMethod::Cash),
            "qr" => Some(PaymentMethod::Qr),
            "card" => Some(PaymentMethod::Card),
            _ => None,
        }
    }
}

sql_text_enum!(PaymentMethod);

/// A finalized, immutable sale.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Order {
    pub id: String,
    pub order_code: String,
    pub items: Vec<CartItem>,
    pub order_type: OrderType,
    pub table_number: Option<u32>,
    pub customer_name: Option<String>,
    pub subtotal: Money,
    pub tax: Money,
    pub service_fee: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub amount_paid: Money,
    pub change: Money,
    pub created_at: DateTime<Local>,
}

impl Order {
    pub fn needs_kitchen(&self) -> bool {
        self.items.iter().any(|line| line.item.needs_waiting_time)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CookingStatus {
    #[serde(rename = "menunggu")]
    Waiting,
    #[serde(rename = "dimasak")]
    Cooking,
    #[serde(rename = "selesai")]
    Done,
}

impl CookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CookingStatus::Waiting => "menunggu",
            CookingStatus::Cooking => "dimasak",
            CookingStatus::Done => "selesai",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "menunggu" => Some(CookingStatus::Waiting),
            "dimasak" => Some(CookingStatus::Cooking),
            "selesai" => Some(CookingStatus::Done),
            _ => None,
        }
    }

    /// Order-level status from its line statuses: all done is done,
    /// any progress is cooking, otherwise waiting.
    pub fn aggregate<I>(statuses: I) -> CookingStatus
    where
        I: IntoIterator<Item = CookingStatus>,
    {
        let mut any_line = false;
        let mut all_done = true;
        let mut any_progress = false;

        for status in statuses {
            any_line = true;
            match status {
                CookingStatus::Done => any_progress = true,
                CookingStatus::Cooking => {
                    any_progress = true;
                    all_done = false;
                }
                CookingStatus::Waiting => all_done = false,
            }
        }

        if any_line && all_done {
            CookingStatus::Done
        } else if any_progress {
            CookingStatus::Cooking
        } else {
            CookingStatus::Waiting
        }
    }
}

sql_text_enum!(CookingStatus);

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct KitchenOrderItem {
    pub id: i64,
    pub menu_item_id: i64,
    pub name: String,
    pub price: Money,
    pub quantity: u32,
    pub needs_waiting_time: bool,
    pub cooking_status: CookingStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct KitchenOrder {
    pub id: String,
    pub order_code: String,
    pub order_type: OrderType,
    pub table_number: Option<u32>,
    pub customer_name: Option<String>,
    pub items: Vec<KitchenOrderItem>,
    pub order_time: String,
    pub status: CookingStatus,
}

impl KitchenOrder {
    pub fn is_complete(&self) -> bool {
        self.status == CookingStatus::Done
    }

    /// The board offers "complete order" once every line is done.
    pub fn can_complete(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|item| item.cooking_status == CookingStatus::Done)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    #[serde(rename = "Rendah")]
    Low,
    #[serde(rename = "Cukup")]
    Sufficient,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StockOrderRef {
    pub order_code: String,
    pub order_time: String,
    pub quantity: u32,
    pub order_type: OrderType,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StockItem {
    pub menu_item_id: i64,
    pub code: String,
    pub name: String,
    pub category: String,
    pub stock: Stock,
    pub in_queue: u32,
    pub status: StockStatus,
    pub orders: Vec<StockOrderRef>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "owner")]
    Owner,
    #[serde(rename = "kasir")]
    Cashier,
    #[serde(rename = "dapur")]
    Kitchen,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub name: String,
    pub role: Role,
}

/// Rates in basis points of the subtotal (1000 = 10%).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct TaxSettings {
    pub tax_rate_bps: u32,
    pub service_fee_rate_bps: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SalesPoint {
    pub label: String,
    pub revenue: Money,
    pub previous_revenue: Option<Money>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MenuTrend {
    pub menu_item_id: i64,
    pub name: String,
    pub sold: u32,
    pub revenue: Money,
    /// Percentage change of units sold against the previous period.
    pub trend: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DaySummary {
    pub date: String,
    pub total_revenue: Money,
    pub total_orders: u32,
}
