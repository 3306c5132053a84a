use std::collections::BTreeMap;

use crate::config::helpers::optional_env;
use crate::error::ConfigError;

/// Seed stock used when `LEDGER_INVENTORY` is not set.
const DEFAULT_INVENTORY: &str = "A-100=5,B-200=0,C-300=12";

/// Order ledger configuration.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Starting quantity per SKU.
    pub inventory: BTreeMap<String, u64>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            // The built-in seed is a valid inventory string.
            inventory: parse_inventory(DEFAULT_INVENTORY).unwrap_or_default(),
        }
    }
}

impl LedgerConfig {
    pub fn new(inventory: impl IntoIterator<Item = (impl Into<String>, u64)>) -> Self {
        Self {
            inventory: inventory
                .into_iter()
                .map(|(sku, qty)| (sku.into(), qty))
                .collect(),
        }
    }

    pub(crate) fn resolve() -> Result<Self, ConfigError> {
        match optional_env("LEDGER_INVENTORY")? {
            Some(raw) => Ok(Self {
                inventory: parse_inventory(&raw).map_err(|message| {
                    ConfigError::InvalidValue {
                        key: "LEDGER_INVENTORY".to_string(),
                        message,
                    }
                })?,
            }),
            None => Ok(Self::default()),
        }
    }
}

/// Parse `SKU=QTY,SKU=QTY` into a stock table.
///
/// Whitespace around entries is ignored; a repeated SKU is an error.
pub fn parse_inventory(raw: &str) -> Result<BTreeMap<String, u64>, String> {
    let mut inventory = BTreeMap::new();

    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (sku, qty) = entry
            .split_once('=')
            .ok_or_else(|| format!("entry '{entry}' is not of the form SKU=QTY"))?;
        let sku = sku.trim();
        if sku.is_empty() {
            return Err(format!("entry '{entry}' has an empty SKU"));
        }
        let qty: u64 = qty
            .trim()
            .parse()
            .map_err(|e| format!("quantity for '{sku}' is not a non-negative integer: {e}"))?;
        if inventory.insert(sku.to_string(), qty).is_some() {
            return Err(format!("SKU '{sku}' listed more than once"));
        }
    }

    Ok(inventory)
}
