//! Minimum-order policy.
//!
//! This is a caller-side rule, not a pricing rule: the engine prices any
//! non-negative quantity (including zero, for live display), and intake
//! decides whether the order is large enough to accept.

use serde::{Deserialize, Serialize};

use badgekit_core::{DomainError, DomainResult};

/// Minimum units required before an order is accepted. Quotes are exempt.
///
/// Configurable because the deployed product has shipped with both 75 and 80.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPolicy {
    pub min_quantity: u32,
}

pub const DEFAULT_MIN_ORDER_QUANTITY: u32 = 75;

impl Default for OrderPolicy {
    fn default() -> Self {
        Self {
            min_quantity: DEFAULT_MIN_ORDER_QUANTITY,
        }
    }
}

impl OrderPolicy {
    pub fn new(min_quantity: u32) -> Self {
        Self { min_quantity }
    }

    pub fn check_order_quantity(&self, total_quantity: u32) -> DomainResult<()> {
        if total_quantity < self.min_quantity {
            return Err(DomainError::validation(format!(
                "minimum order is {} badges, got {}",
                self.min_quantity, total_quantity
            )));
        }
        Ok(())
    }
}
