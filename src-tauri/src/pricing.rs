//! Subtotal, tax, service fee and total for a cart.
//!
//! All amounts are integer rupiah. Each percentage component is rounded
//! half-up to the rupiah before the total is summed, so the total shown on
//! screen is exactly the total charged and recorded.

use serde::{Deserialize, Serialize};

use crate::models::{CartItem, Money, TaxSettings};

const BPS_DENOMINATOR: i128 = 10_000;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub subtotal: Money,
    pub tax: Money,
    pub service_fee: Money,
    pub total: Money,
}

/// `amount * bps / 10000`, rounded half away from zero.
pub fn apply_rate(amount: Money, bps: u32) -> Money {
    let scaled = i128::from(amount) * i128::from(bps);
    let half = BPS_DENOMINATOR / 2;
    let rounded = if scaled >= 0 {
        (scaled + half) / BPS_DENOMINATOR
    } else {
        (scaled - half) / BPS_DENOMINATOR
    };
    rounded as Money
}

pub fn subtotal(items: &[CartItem]) -> Money {
    items.iter().map(CartItem::line_total).sum()
}

pub fn compute(items: &[CartItem], rates: TaxSettings) -> Totals {
    let subtotal = subtotal(items);
    from_subtotal(subtotal, rates)
}

pub fn from_subtotal(subtotal: Money, rates: TaxSettings) -> Totals {
    let tax = apply_rate(subtotal, rates.tax_rate_bps);
    let service_fee = apply_rate(subtotal, rates.service_fee_rate_bps);
    Totals {
        subtotal,
        tax,
        service_fee,
        total: subtotal + tax + service_fee,
    }
}
