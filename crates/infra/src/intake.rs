//! Order intake: the one path by which quotes and orders enter the system.
//!
//! The service recomputes the authoritative price from the submitted badge
//! options; any figures the client displayed are ignored.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use badgekit_core::DomainError;
use badgekit_orders::{CustomerDetails, OrderPolicy, OrderRecord, RecordKind};
use badgekit_pricing::{Calculator, OrderOptions};

use crate::notify::{receipt_email, Mailer};
use crate::store::{OrderStore, StoreError};

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A validated-at-the-edge submission, options already resolved.
#[derive(Debug, Clone)]
pub struct OrderSubmission {
    pub kind: RecordKind,
    pub customer: CustomerDetails,
    pub options: OrderOptions,
}

/// Composes engine, policy, store and mailer into the intake flow.
///
/// Email failure after a successful insert is logged and swallowed: the
/// record is the source of truth, the confirmation is best-effort.
pub struct OrderIntakeService<S> {
    calculator: Arc<Calculator>,
    policy: OrderPolicy,
    store: S,
    mailer: Arc<dyn Mailer>,
}

impl<S: OrderStore> OrderIntakeService<S> {
    pub fn new(
        calculator: Arc<Calculator>,
        policy: OrderPolicy,
        store: S,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            calculator,
            policy,
            store,
            mailer,
        }
    }

    /// Validate, price, persist and acknowledge a submission.
    ///
    /// Quotes are exempt from the minimum-order policy; orders are not.
    pub async fn submit(&self, submission: OrderSubmission) -> Result<OrderRecord, IntakeError> {
        let OrderSubmission {
            kind,
            customer,
            options,
        } = submission;

        customer.validate()?;
        if kind == RecordKind::Order {
            self.policy.check_order_quantity(options.total_quantity())?;
        }

        let summary = self.calculator.summarize(&options);
        let record = OrderRecord::new(kind, customer, options, &summary, Utc::now());
        self.store.insert(&record).await?;
        info!(id = %record.id, kind = ?record.kind, total = %record.total_cost, "record saved");

        let breakdown = self.calculator.breakdown(&options);
        if let Err(error) = self.mailer.send(receipt_email(&record, &breakdown)).await {
            warn!(id = %record.id, %error, "record saved but confirmation email failed");
        }

        Ok(record)
    }
}
