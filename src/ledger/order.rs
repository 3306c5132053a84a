//! Order records and their lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an order. `Cancelled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Created,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// An order holding a claim on `quantity` units of `sku` while `Created`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    pub sku: String,
    pub quantity: u64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub(crate) fn new(order_id: impl Into<String>, sku: impl Into<String>, quantity: u64) -> Self {
        Self {
            order_id: order_id.into(),
            sku: sku.into(),
            quantity,
            status: OrderStatus::Created,
            created_at: Utc::now(),
        }
    }

    /// Whether the order still holds its reservation.
    pub fn is_reserving(&self) -> bool {
        self.status == OrderStatus::Created
    }
}
