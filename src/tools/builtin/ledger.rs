//! Ledger tools: stock checks and the order lifecycle.

use std::sync::Arc;

use async_trait::async_trait;

use crate::ledger::LifecycleLedger;
use crate::tools::tool::{CallContext, Tool, ToolError, ToolOutput, require_i64, require_str};

fn order_id_schema(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "orderId": {
                "type": "string",
                "description": description
            }
        },
        "required": ["orderId"]
    })
}

/// Read the available quantity for a SKU.
pub struct CheckAvailabilityTool {
    ledger: Arc<LifecycleLedger>,
}

impl CheckAvailabilityTool {
    pub fn new(ledger: Arc<LifecycleLedger>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl Tool for CheckAvailabilityTool {
    fn name(&self) -> &str {
        "ledger.checkAvailability"
    }

    fn description(&self) -> &str {
        "Get the number of units available for a SKU. Unknown SKUs report 0."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "sku": {
                    "type": "string",
                    "description": "Stock keeping unit, e.g. A-100"
                }
            },
            "required": ["sku"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = std::time::Instant::now();
        let sku = require_str(&params, "sku")?;
        let availability = self.ledger.check_availability(sku).await;
        ToolOutput::json(&availability, start.elapsed())
    }
}

/// Reserve stock and create an order.
pub struct CreateOrderTool {
    ledger: Arc<LifecycleLedger>,
}

impl CreateOrderTool {
    pub fn new(ledger: Arc<LifecycleLedger>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl Tool for CreateOrderTool {
    fn name(&self) -> &str {
        "ledger.createOrder"
    }

    fn description(&self) -> &str {
        "Create an order, reserving quantity units of the SKU. Fails with insufficient_stock \
         (and changes nothing) when not enough units are available."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "orderId": {
                    "type": "string",
                    "description": "Caller-chosen unique order id"
                },
                "sku": {
                    "type": "string",
                    "description": "SKU to reserve from"
                },
                "quantity": {
                    "type": "integer",
                    "description": "Units to reserve, must be positive"
                }
            },
            "required": ["orderId", "sku", "quantity"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = std::time::Instant::now();
        let order_id = require_str(&params, "orderId")?;
        let sku = require_str(&params, "sku")?;
        let quantity = require_i64(&params, "quantity")?;

        let order = self.ledger.create_order(order_id, sku, quantity).await?;
        ToolOutput::json(&order, start.elapsed())
    }
}

/// Cancel an order and restore its units.
pub struct CancelOrderTool {
    ledger: Arc<LifecycleLedger>,
}

impl CancelOrderTool {
    pub fn new(ledger: Arc<LifecycleLedger>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl Tool for CancelOrderTool {
    fn name(&self) -> &str {
        "ledger.cancelOrder"
    }

    fn description(&self) -> &str {
        "Cancel an order and return its units to stock. Cancelling an already cancelled \
         order returns it unchanged."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        order_id_schema("Order to cancel")
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = std::time::Instant::now();
        let order_id = require_str(&params, "orderId")?;
        let order = self.ledger.cancel_order(order_id).await?;
        ToolOutput::json(&order, start.elapsed())
    }
}

/// Read an order.
pub struct GetOrderTool {
    ledger: Arc<LifecycleLedger>,
}

impl GetOrderTool {
    pub fn new(ledger: Arc<LifecycleLedger>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl Tool for GetOrderTool {
    fn name(&self) -> &str {
        "ledger.getOrder"
    }

    fn description(&self) -> &str {
        "Get an order by id."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        order_id_schema("Order to look up")
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = std::time::Instant::now();
        let order_id = require_str(&params, "orderId")?;
        let order = self.ledger.get_order(order_id).await?;
        ToolOutput::json(&order, start.elapsed())
    }
}
