//! Inventory-backed order ledger with compensating cancellation.
//!
//! Stock levels and orders live in one table behind a single mutex. Every
//! mutation (reserve on create, restore on cancel) checks and applies its
//! change inside that critical section, so concurrent orders can never
//! reserve more units than a SKU holds.

mod order;

pub use order::{Order, OrderStatus};

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tokio::sync::Mutex;

use crate::config::LedgerConfig;
use crate::tools::ToolError;

/// Errors from ledger operations. None of them leave a partial mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("quantity must be positive, got {0}")]
    InvalidQuantity(i64),

    #[error("order '{0}' already exists")]
    DuplicateOrder(String),

    #[error("not enough inventory for '{sku}': requested {requested}, available {available}")]
    InsufficientStock {
        sku: String,
        requested: u64,
        available: u64,
    },

    #[error("order '{0}' not found")]
    OrderNotFound(String),
}

impl From<LedgerError> for ToolError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidQuantity(_) | LedgerError::DuplicateOrder(_) => {
                ToolError::InvalidArgument(err.to_string())
            }
            LedgerError::InsufficientStock {
                sku,
                requested,
                available,
            } => ToolError::InsufficientStock {
                sku,
                requested,
                available,
            },
            LedgerError::OrderNotFound(_) => ToolError::NotFound(err.to_string()),
        }
    }
}

/// Stock level of one SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub sku: String,
    pub available: u64,
}

#[derive(Debug, Default)]
struct LedgerState {
    inventory: HashMap<String, u64>,
    orders: HashMap<String, Order>,
}

/// Owner of inventory levels and the orders drawn against them.
pub struct LifecycleLedger {
    state: Mutex<LedgerState>,
}

impl LifecycleLedger {
    pub fn new(config: &LedgerConfig) -> Self {
        Self::with_inventory(config.inventory.clone())
    }

    pub fn with_inventory(inventory: BTreeMap<String, u64>) -> Self {
        Self {
            state: Mutex::new(LedgerState {
                inventory: inventory.into_iter().collect(),
                orders: HashMap::new(),
            }),
        }
    }

    /// Units currently available; unknown SKUs report zero.
    pub async fn check_availability(&self, sku: &str) -> Availability {
        let state = self.state.lock().await;
        Availability {
            sku: sku.to_string(),
            available: state.inventory.get(sku).copied().unwrap_or(0),
        }
    }

    /// Reserve `quantity` units of `sku` and record the order.
    pub async fn create_order(
        &self,
        order_id: &str,
        sku: &str,
        quantity: i64,
    ) -> Result<Order, LedgerError> {
        if quantity <= 0 {
            return Err(LedgerError::InvalidQuantity(quantity));
        }
        let quantity = quantity as u64;

        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        if state.orders.contains_key(order_id) {
            return Err(LedgerError::DuplicateOrder(order_id.to_string()));
        }

        let available = state.inventory.get(sku).copied().unwrap_or(0);
        if available < quantity {
            tracing::info!(
                order_id = %order_id,
                sku = %sku,
                requested = quantity,
                available,
                "Order rejected: insufficient stock"
            );
            return Err(LedgerError::InsufficientStock {
                sku: sku.to_string(),
                requested: quantity,
                available,
            });
        }

        state.inventory.insert(sku.to_string(), available - quantity);
        let order = Order::new(order_id, sku, quantity);
        state.orders.insert(order_id.to_string(), order.clone());

        tracing::info!(
            order_id = %order_id,
            sku = %sku,
            quantity,
            remaining = available - quantity,
            "Order created"
        );
        Ok(order)
    }

    /// Cancel an order and return its units to stock.
    ///
    /// Cancelling an already-cancelled order returns it unchanged.
    pub async fn cancel_order(&self, order_id: &str) -> Result<Order, LedgerError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let order = state
            .orders
            .get_mut(order_id)
            .ok_or_else(|| LedgerError::OrderNotFound(order_id.to_string()))?;

        if !order.is_reserving() {
            return Ok(order.clone());
        }

        *state.inventory.entry(order.sku.clone()).or_insert(0) += order.quantity;
        order.status = OrderStatus::Cancelled;

        tracing::info!(
            order_id = %order_id,
            sku = %order.sku,
            restored = order.quantity,
            "Order cancelled"
        );
        Ok(order.clone())
    }

    /// Snapshot of a single order.
    pub async fn get_order(&self, order_id: &str) -> Result<Order, LedgerError> {
        self.state
            .lock()
            .await
            .orders
            .get(order_id)
            .cloned()
            .ok_or_else(|| LedgerError::OrderNotFound(order_id.to_string()))
    }
}
