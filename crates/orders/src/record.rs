use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use badgekit_core::{DomainError, DomainResult, OrderId};
use badgekit_pricing::{OrderOptions, OrderSummary};

/// Whether a record is a saved quote or a submitted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Quote,
    Order,
}

/// Order payment lifecycle.
///
/// Quotes never leave `Submitted`; orders move
/// `Submitted -> PaymentPending -> Paid | PaymentFailed`, with failed
/// payments allowed to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Submitted,
    PaymentPending,
    Paid,
    PaymentFailed,
}

/// Contact details captured by the widget form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub event_name: Option<String>,
}

impl CustomerDetails {
    /// Syntax-level validation. Deliverability is the mailer's problem.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("customer name must not be empty"));
        }

        let email = self.email.trim();
        let valid = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
            }
            None => false,
        };
        if !valid {
            return Err(DomainError::validation(format!(
                "invalid email address: {email}"
            )));
        }

        Ok(())
    }
}

/// A persisted quote or order.
///
/// The pricing fields are the engine's authoritative output computed at
/// submission time; client-supplied figures are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub kind: RecordKind,
    pub customer: CustomerDetails,
    pub options: OrderOptions,
    pub total_quantity: u32,
    pub total_cost: Decimal,
    pub gst_amount: Decimal,
    pub co2_savings_kg: Decimal,
    pub status: OrderStatus,
    pub payment_intent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRecord {
    pub fn new(
        kind: RecordKind,
        customer: CustomerDetails,
        options: OrderOptions,
        summary: &OrderSummary,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OrderId::new(),
            kind,
            customer,
            options,
            total_quantity: summary.total_quantity,
            total_cost: summary.total_price,
            gst_amount: summary.gst_amount,
            co2_savings_kg: summary.co2_savings_kg,
            status: OrderStatus::Submitted,
            payment_intent_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_quote(&self) -> bool {
        matches!(self.kind, RecordKind::Quote)
    }

    pub fn is_payable(&self) -> bool {
        self.kind == RecordKind::Order
            && matches!(
                self.status,
                OrderStatus::Submitted | OrderStatus::PaymentFailed | OrderStatus::PaymentPending
            )
    }

    /// Attach a payment intent and move to `PaymentPending`.
    pub fn begin_payment(
        &mut self,
        payment_intent_id: String,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if self.is_quote() {
            return Err(DomainError::invariant("quotes cannot take payment"));
        }
        if !self.is_payable() {
            return Err(DomainError::invariant(format!(
                "cannot begin payment from status {:?}",
                self.status
            )));
        }

        self.payment_intent_id = Some(payment_intent_id);
        self.status = OrderStatus::PaymentPending;
        self.updated_at = now;
        Ok(())
    }

    pub fn mark_paid(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != OrderStatus::PaymentPending {
            return Err(DomainError::invariant(format!(
                "cannot mark paid from status {:?}",
                self.status
            )));
        }
        self.status = OrderStatus::Paid;
        self.updated_at = now;
        Ok(())
    }

    pub fn mark_payment_failed(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != OrderStatus::PaymentPending {
            return Err(DomainError::invariant(format!(
                "cannot mark payment failed from status {:?}",
                self.status
            )));
        }
        self.status = OrderStatus::PaymentFailed;
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use badgekit_pricing::{
        BadgeSize, Calculator, InkCoverage, Lanyards, PrintedSides, ShippingMethod,
    };
    use rust_decimal_macros::dec;

    fn test_customer() -> CustomerDetails {
        CustomerDetails {
            name: "Dana Smith".to_string(),
            email: "dana@example.com".to_string(),
            company: None,
            phone: None,
            event_name: Some("Annual Conference".to_string()),
        }
    }

    fn test_options() -> OrderOptions {
        OrderOptions {
            with_guest_names: 50,
            without_guest_names: 25,
            size: BadgeSize::A7,
            printed_sides: PrintedSides::Double,
            ink_coverage: InkCoverage::Over40,
            lanyards: Lanyards::Included,
            shipping: ShippingMethod::Standard,
        }
    }

    fn test_record(kind: RecordKind) -> OrderRecord {
        let options = test_options();
        let summary = Calculator::new().summarize(&options);
        OrderRecord::new(kind, test_customer(), options, &summary, Utc::now())
    }

    #[test]
    fn new_record_carries_engine_output() {
        let record = test_record(RecordKind::Order);
        assert_eq!(record.status, OrderStatus::Submitted);
        assert_eq!(record.total_quantity, 75);
        assert_eq!(record.total_cost, dec!(581.72));
        assert_eq!(record.gst_amount, dec!(52.88));
        assert_eq!(record.co2_savings_kg, dec!(8.25));
        assert!(record.payment_intent_id.is_none());
    }

    #[test]
    fn order_payment_lifecycle() {
        let mut record = test_record(RecordKind::Order);

        record
            .begin_payment("pi_123".to_string(), Utc::now())
            .unwrap();
        assert_eq!(record.status, OrderStatus::PaymentPending);
        assert_eq!(record.payment_intent_id.as_deref(), Some("pi_123"));

        record.mark_paid(Utc::now()).unwrap();
        assert_eq!(record.status, OrderStatus::Paid);
    }

    #[test]
    fn failed_payment_can_retry() {
        let mut record = test_record(RecordKind::Order);

        record.begin_payment("pi_1".to_string(), Utc::now()).unwrap();
        record.mark_payment_failed(Utc::now()).unwrap();
        assert_eq!(record.status, OrderStatus::PaymentFailed);

        record.begin_payment("pi_2".to_string(), Utc::now()).unwrap();
        assert_eq!(record.status, OrderStatus::PaymentPending);
        assert_eq!(record.payment_intent_id.as_deref(), Some("pi_2"));
    }

    #[test]
    fn paid_order_cannot_restart_payment() {
        let mut record = test_record(RecordKind::Order);
        record.begin_payment("pi_1".to_string(), Utc::now()).unwrap();
        record.mark_paid(Utc::now()).unwrap();

        let err = record
            .begin_payment("pi_2".to_string(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn quotes_never_take_payment() {
        let mut record = test_record(RecordKind::Quote);
        let err = record
            .begin_payment("pi_1".to_string(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));

        let err = record.mark_paid(Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn customer_validation() {
        assert!(test_customer().validate().is_ok());

        let mut blank_name = test_customer();
        blank_name.name = "   ".to_string();
        assert!(blank_name.validate().is_err());

        for bad in ["", "not-an-email", "@example.com", "dana@", "dana@nodot"] {
            let mut c = test_customer();
            c.email = bad.to_string();
            assert!(c.validate().is_err(), "{bad:?} should be rejected");
        }
    }
}
