//! Cashier checkout flow as an explicit state machine.
//!
//! ```text
//! Idle -> AwaitingPayment -> (AwaitingWaitDecision -> [AwaitingWaitDetails] ->) Completed
//! ```
//!
//! Payment confirmation and the waiting-time questions only build the order;
//! it becomes `Completed` once the caller has stored it with [`Checkout::complete`].
//! [`Register`] wires the cart, the machine and an [`OrderRepository`] together.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::cart::Cart;
use crate::error::{PosError, Result};
use crate::models::{MenuItem, Money, Order, OrderType, PaymentMethod, TaxSettings};
use crate::notice::{format_rupiah, Notice};
use crate::pricing::{self, Totals};
use crate::repository::OrderRepository;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "order", rename_all = "snake_case")]
pub enum CheckoutState {
    Idle,
    AwaitingPayment,
    AwaitingWaitDecision(Box<Order>),
    AwaitingWaitDetails(Box<Order>),
    Completed(Box<Order>),
}

impl CheckoutState {
    pub fn name(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "idle",
            CheckoutState::AwaitingPayment => "awaiting payment",
            CheckoutState::AwaitingWaitDecision(_) => "awaiting wait decision",
            CheckoutState::AwaitingWaitDetails(_) => "awaiting wait details",
            CheckoutState::Completed(_) => "completed",
        }
    }

    /// Draft order held by the waiting-time steps.
    pub fn draft(&self) -> Option<&Order> {
        match self {
            CheckoutState::AwaitingWaitDecision(order) | CheckoutState::AwaitingWaitDetails(order) => Some(order),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum Payment {
    Cash { amount_paid: Money },
    Qr,
    Card,
}

impl Payment {
    pub fn method(&self) -> PaymentMethod {
        match self {
            Payment::Cash { .. } => PaymentMethod::Cash,
            Payment::Qr => PaymentMethod::Qr,
            Payment::Card => PaymentMethod::Card,
        }
    }

    /// Amount collected. Card and QR are pre-authorized for the exact total.
    fn amount_paid(&self, total: Money) -> Result<Money> {
        match *self {
            Payment::Cash { amount_paid } if amount_paid < total => Err(PosError::InsufficientPayment {
                paid: amount_paid,
                total,
            }),
            Payment::Cash { amount_paid } => Ok(amount_paid),
            Payment::Qr | Payment::Card => Ok(total),
        }
    }
}

/// Result of a step that may finish the order.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The order is built and must be stored, then passed to [`Checkout::complete`].
    Ready(Box<Order>),
    AwaitingWaitDecision,
    AwaitingWaitDetails,
}

/// `DI-######` / `TA-######` from the last six digits of the millisecond timestamp.
pub fn order_code(order_type: OrderType, now: DateTime<Local>) -> String {
    format!(
        "{}-{:06}",
        order_type.code_prefix(),
        now.timestamp_millis().rem_euclid(1_000_000)
    )
}

#[derive(Debug, Clone)]
pub struct Checkout {
    state: CheckoutState,
}

impl Default for Checkout {
    fn default() -> Self {
        Checkout {
            state: CheckoutState::Idle,
        }
    }
}

impl Checkout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    fn invalid(&self, action: &'static str) -> PosError {
        PosError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }

    /// Opens payment for a non-empty cart. A finished receipt is dismissed.
    pub fn begin(&mut self, cart: &Cart) -> Result<()> {
        match self.state {
            CheckoutState::Idle | CheckoutState::Completed(_) => {}
            _ => return Err(self.invalid("start checkout")),
        }
        if cart.is_empty() {
            return Err(PosError::EmptyCart);
        }
        self.state = CheckoutState::AwaitingPayment;
        Ok(())
    }

    /// Closing the payment dialog discards the attempt.
    pub fn cancel(&mut self) -> Result<()> {
        match self.state {
            CheckoutState::AwaitingPayment => {
                self.state = CheckoutState::Idle;
                Ok(())
            }
            _ => Err(self.invalid("cancel payment")),
        }
    }

    pub fn confirm_payment(
        &mut self,
        cart: &Cart,
        order_type: OrderType,
        rates: TaxSettings,
        payment: Payment,
        now: DateTime<Local>,
    ) -> Result<Step> {
        if self.state != CheckoutState::AwaitingPayment {
            return Err(self.invalid("confirm payment"));
        }
        if cart.is_empty() {
            return Err(PosError::EmptyCart);
        }

        let totals: Totals = pricing::compute(cart.items(), rates);
        let amount_paid = payment.amount_paid(totals.total)?;

        let order = Order {
            id: Uuid::new_v4().to_string(),
            order_code: order_code(order_type, now),
            items: cart.items().to_vec(),
            order_type,
            table_number: None,
            customer_name: None,
            subtotal: totals.subtotal,
            tax: totals.tax,
            service_fee: totals.service_fee,
            total: totals.total,
            payment_method: payment.method(),
            amount_paid,
            change: amount_paid - totals.total,
            created_at: now,
        };

        if order.needs_kitchen() {
            self.state = CheckoutState::AwaitingWaitDecision(Box::new(order));
            Ok(Step::AwaitingWaitDecision)
        } else {
            Ok(Step::Ready(Box::new(order)))
        }
    }

    /// `false` takes the order directly; `true` asks for a table number or name.
    pub fn answer_wait(&mut self, customer_waits: bool) -> Result<Step> {
        let draft = match &self.state {
            CheckoutState::AwaitingWaitDecision(draft) => draft.clone(),
            _ => return Err(self.invalid("answer waiting time")),
        };

        if customer_waits {
            self.state = CheckoutState::AwaitingWaitDetails(draft);
            Ok(Step::AwaitingWaitDetails)
        } else {
            Ok(Step::Ready(draft))
        }
    }

    /// Table number for dine-in, customer name for take-away. Blank input
    /// leaves the step pending.
    pub fn submit_wait_details(&mut self, input: &str) -> Result<Step> {
        let mut order = match &self.state {
            CheckoutState::AwaitingWaitDetails(draft) => draft.clone(),
            _ => return Err(self.invalid("submit waiting details")),
        };

        let input = input.trim();
        match order.order_type {
            OrderType::DineIn => {
                let table = input
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or(PosError::MissingTableNumber)?;
                order.table_number = Some(table);
            }
            OrderType::TakeAway => {
                if input.is_empty() {
                    return Err(PosError::MissingCustomerName);
                }
                order.customer_name = Some(input.to_string());
            }
        }

        Ok(Step::Ready(order))
    }

    /// Records the stored order for the receipt.
    pub fn complete(&mut self, order: Order) -> Result<()> {
        match self.state {
            CheckoutState::AwaitingPayment
            | CheckoutState::AwaitingWaitDecision(_)
            | CheckoutState::AwaitingWaitDetails(_) => {}
            _ => return Err(self.invalid("complete order")),
        }
        self.state = CheckoutState::Completed(Box::new(order));
        Ok(())
    }

    /// Closes the receipt.
    pub fn acknowledge(&mut self) {
        if let CheckoutState::Completed(_) = self.state {
            self.state = CheckoutState::Idle;
        }
    }
}

/// One cashier's terminal: cart, order type and checkout.
#[derive(Debug, Clone)]
pub struct Register {
    cart: Cart,
    order_type: OrderType,
    checkout: Checkout,
}

impl Default for Register {
    fn default() -> Self {
        Register {
            cart: Cart::new(),
            order_type: OrderType::DineIn,
            checkout: Checkout::new(),
        }
    }
}

impl Register {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub fn set_order_type(&mut self, order_type: OrderType) -> Result<()> {
        self.ensure_editable("change order type")?;
        self.order_type = order_type;
        Ok(())
    }

    pub fn checkout_state(&self) -> &CheckoutState {
        self.checkout.state()
    }

    /// Last completed order, shown on the receipt.
    pub fn current_order(&self) -> Option<&Order> {
        match self.checkout.state() {
            CheckoutState::Completed(order) => Some(order),
            _ => None,
        }
    }

    pub fn totals(&self, rates: TaxSettings) -> Totals {
        pricing::compute(self.cart.items(), rates)
    }

    /// The cart is locked from payment until the order is stored; the
    /// draft order already holds its lines.
    fn ensure_editable(&self, action: &'static str) -> Result<()> {
        match self.checkout.state() {
            CheckoutState::Idle | CheckoutState::Completed(_) => Ok(()),
            state => Err(PosError::InvalidTransition {
                action,
                state: state.name(),
            }),
        }
    }

    pub fn add_item(&mut self, item: &MenuItem, quantity: u32) -> Result<Notice> {
        self.ensure_editable("change the cart")?;
        self.cart.add(item, quantity)
    }

    /// `current` is the catalog entry as it is now; when given, the line is
    /// checked against its stock instead of the copy taken when it was added.
    pub fn update_quantity(&mut self, item_id: i64, quantity: i64, current: Option<&MenuItem>) -> Result<Notice> {
        self.ensure_editable("change the cart")?;
        if let Some(item) = current {
            self.cart.refresh(item);
        }
        self.cart.update_quantity(item_id, quantity)
    }

    pub fn remove_item(&mut self, item_id: i64) -> Result<Notice> {
        self.ensure_editable("change the cart")?;
        Ok(self.cart.remove(item_id))
    }

    pub fn begin_checkout(&mut self) -> Result<()> {
        self.checkout.begin(&self.cart)
    }

    pub fn cancel_checkout(&mut self) -> Result<()> {
        self.checkout.cancel()
    }

    pub fn close_receipt(&mut self) {
        self.checkout.acknowledge();
    }

    /// Returns a notice once the order is finalized, `None` while the
    /// waiting-time dialog is pending.
    pub fn confirm_payment<R>(
        &mut self,
        repo: &R,
        rates: TaxSettings,
        payment: Payment,
        now: DateTime<Local>,
    ) -> Result<Option<Notice>>
    where
        R: OrderRepository + ?Sized,
    {
        let step = self
            .checkout
            .confirm_payment(&self.cart, self.order_type, rates, payment, now)
            .inspect_err(|e| warn!(error = %e, "payment rejected"))?;
        self.advance(repo, step)
    }

    pub fn answer_wait<R>(&mut self, repo: &R, customer_waits: bool) -> Result<Option<Notice>>
    where
        R: OrderRepository + ?Sized,
    {
        let step = self.checkout.answer_wait(customer_waits)?;
        self.advance(repo, step)
    }

    pub fn submit_wait_details<R>(&mut self, repo: &R, input: &str) -> Result<Option<Notice>>
    where
        R: OrderRepository + ?Sized,
    {
        let step = self
            .checkout
            .submit_wait_details(input)
            .inspect_err(|e| warn!(error = %e, "waiting details rejected"))?;
        self.advance(repo, step)
    }

    fn advance<R>(&mut self, repo: &R, step: Step) -> Result<Option<Notice>>
    where
        R: OrderRepository + ?Sized,
    {
        let order = match step {
            Step::Ready(order) => *order,
            Step::AwaitingWaitDecision | Step::AwaitingWaitDetails => return Ok(None),
        };

        repo.create(&order)?;
        let notice = finalize_notice(&order);
        info!(
            order_code = %order.order_code,
            total = order.total,
            kitchen = order.needs_kitchen(),
            "order finalized"
        );
        self.checkout.complete(order)?;
        self.cart.clear();
        Ok(Some(notice))
    }
}

fn finalize_notice(order: &Order) -> Notice {
    let notice = match (order.table_number, order.customer_name.as_deref()) {
        (Some(table), _) => Notice::success(format!("Order sent to kitchen - Table {}", table)),
        (None, Some(name)) => Notice::success(format!("Order sent to kitchen - {}", name)),
        (None, None) => Notice::success("Transaction successful!"),
    };
    notice.with_description(format!("{} · {}", order.order_code, format_rupiah(order.total)))
}
