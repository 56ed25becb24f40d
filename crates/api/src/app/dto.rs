//! Request/response DTOs.
//!
//! The wire shapes are what the embed widget posts (camelCase JSON); domain
//! types never leak their constructors here.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use badgekit_orders::{CustomerDetails, OrderRecord, OrderStatus, RecordKind};
use badgekit_pricing::{OrderOptions, OrderSummary, PriceBreakdown, RawOrderOptions};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
}

impl From<CustomerDto> for CustomerDetails {
    fn from(dto: CustomerDto) -> Self {
        Self {
            name: dto.name,
            email: dto.email,
            company: dto.company,
            phone: dto.phone,
            event_name: dto.event_name,
        }
    }
}

impl From<&CustomerDetails> for CustomerDto {
    fn from(customer: &CustomerDetails) -> Self {
        Self {
            name: customer.name.clone(),
            email: customer.email.clone(),
            company: customer.company.clone(),
            phone: customer.phone.clone(),
            event_name: customer.event_name.clone(),
        }
    }
}

/// Body of `POST /quotes` and `POST /orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    pub customer: CustomerDto,
    pub options: RawOrderOptions,
}

/// Body of the live-display pricing response.
#[derive(Debug, Clone, Serialize)]
pub struct PricingSummaryResponse {
    pub summary: OrderSummary,
    pub breakdown: PriceBreakdown,
}

/// A stored quote/order as the API presents it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse {
    pub id: String,
    pub kind: RecordKind,
    pub status: OrderStatus,
    pub customer: CustomerDto,
    pub options: OrderOptions,
    pub total_quantity: u32,
    pub total_cost: Decimal,
    pub gst_amount: Decimal,
    pub co2_savings_kg: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&OrderRecord> for RecordResponse {
    fn from(record: &OrderRecord) -> Self {
        Self {
            id: record.id.to_string(),
            kind: record.kind,
            status: record.status,
            customer: CustomerDto::from(&record.customer),
            options: record.options,
            total_quantity: record.total_quantity,
            total_cost: record.total_cost,
            gst_amount: record.gst_amount,
            co2_savings_kg: record.co2_savings_kg,
            payment_intent_id: record.payment_intent_id.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Response of `POST /orders/:id/payment-intent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub payment_intent_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    pub status: String,
    pub amount_minor: i64,
}
