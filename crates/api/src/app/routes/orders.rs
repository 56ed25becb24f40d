use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use badgekit_core::OrderId;
use badgekit_infra::{receipt_email, OrderSubmission};
use badgekit_orders::{OrderRecord, RecordKind};

use crate::app::dto::{PaymentIntentResponse, RecordResponse, SubmitRequest};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_order))
        .route("/:id", get(get_order))
        .route("/:id/payment-intent", post(create_payment_intent))
        .route("/:id/payment-confirmed", post(confirm_payment))
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<SubmitRequest>,
) -> axum::response::Response {
    let options = match body.options.resolve() {
        Ok(v) => v,
        Err(e) => return errors::pricing_error_to_response(e),
    };

    let record = match services
        .intake
        .submit(OrderSubmission {
            kind: RecordKind::Order,
            customer: body.customer.into(),
            options,
        })
        .await
    {
        Ok(r) => r,
        Err(e) => return errors::intake_error_to_response(e),
    };

    (StatusCode::CREATED, Json(RecordResponse::from(&record))).into_response()
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let record = match load_order(&services, &id).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    Json(RecordResponse::from(&record)).into_response()
}

/// Create a payment intent for the stored authoritative total.
///
/// The charge amount is recomputed from the stored options; nothing the
/// client posts can change it.
pub async fn create_payment_intent(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let mut record = match load_order(&services, &id).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    // Refuse before touching the gateway; a paid order must not mint intents.
    if !record.is_payable() {
        return errors::json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "invariant_violation",
            format!("cannot take payment from status {:?}", record.status),
        );
    }

    let summary = services.calculator.summarize(&record.options);
    let intent = match services
        .gateway
        .create_intent(summary.amount_minor_units(), &services.currency, record.id)
        .await
    {
        Ok(i) => i,
        Err(e) => return errors::gateway_error_to_response(e),
    };

    if let Err(e) = record.begin_payment(intent.id.clone(), Utc::now()) {
        return errors::domain_error_to_response(e);
    }
    if let Err(e) = services
        .store
        .set_payment_intent(record.id, &intent.id, record.status, record.updated_at)
        .await
    {
        return errors::store_error_to_response(e);
    }

    Json(PaymentIntentResponse {
        payment_intent_id: intent.id,
        client_secret: intent.client_secret,
        status: intent.status,
        amount_minor: summary.amount_minor_units(),
    })
    .into_response()
}

/// Settle an order once the gateway reports the intent as succeeded.
pub async fn confirm_payment(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let mut record = match load_order(&services, &id).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    let Some(intent_id) = record.payment_intent_id.clone() else {
        return errors::json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "invariant_violation",
            "order has no payment intent",
        );
    };

    let intent = match services.gateway.retrieve_intent(&intent_id).await {
        Ok(i) => i,
        Err(e) => return errors::gateway_error_to_response(e),
    };
    if intent.status != "succeeded" {
        return errors::json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "payment_not_settled",
            format!("payment intent status is '{}'", intent.status),
        );
    }

    if let Err(e) = record.mark_paid(Utc::now()) {
        return errors::domain_error_to_response(e);
    }
    if let Err(e) = services
        .store
        .update_status(record.id, record.status, record.updated_at)
        .await
    {
        return errors::store_error_to_response(e);
    }

    // Receipt is best-effort, same as at intake.
    let breakdown = services.calculator.breakdown(&record.options);
    if let Err(error) = services.mailer.send(receipt_email(&record, &breakdown)).await {
        tracing::warn!(id = %record.id, %error, "order paid but receipt email failed");
    }

    Json(RecordResponse::from(&record)).into_response()
}

async fn load_order(
    services: &AppServices,
    raw_id: &str,
) -> Result<OrderRecord, axum::response::Response> {
    let id: OrderId = raw_id
        .parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id"))?;

    match services.store.get(id).await {
        Ok(record) if !record.is_quote() => Ok(record),
        Ok(_) => Err(errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            "not found",
        )),
        Err(e) => Err(errors::store_error_to_response(e)),
    }
}
