use thiserror::Error;

use crate::models::Money;

pub type Result<T> = std::result::Result<T, PosError>;

#[derive(Debug, Error)]
pub enum PosError {
    #[error("Out of stock: {0}")]
    OutOfStock(String),

    #[error("Only {available} left in stock for {name}")]
    InsufficientStock { name: String, available: u32 },

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Amount paid {paid} is less than total {total}")]
    InsufficientPayment { paid: Money, total: Money },

    #[error("Table number is required")]
    MissingTableNumber,

    #[error("Customer name is required")]
    MissingCustomerName,

    #[error("Cannot {action} while checkout is {state}")]
    InvalidTransition { action: &'static str, state: &'static str },

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid value: {0}")]
    Invalid(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Lock poisoned")]
    Poisoned,
}

impl PosError {
    /// Validation failures are recoverable by re-entering input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PosError::OutOfStock(_)
                | PosError::InsufficientStock { .. }
                | PosError::EmptyCart
                | PosError::InsufficientPayment { .. }
                | PosError::MissingTableNumber
                | PosError::MissingCustomerName
        )
    }
}

impl<T> From<std::sync::PoisonError<T>> for PosError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        PosError::Poisoned
    }
}
