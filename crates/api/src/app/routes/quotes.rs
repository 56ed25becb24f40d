use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use badgekit_core::OrderId;
use badgekit_infra::OrderSubmission;
use badgekit_orders::RecordKind;

use crate::app::dto::{RecordResponse, SubmitRequest};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_quote))
        .route("/:id", get(get_quote))
}

pub async fn create_quote(
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
            kind: RecordKind::Quote,
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

pub async fn get_quote(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid quote id"),
    };

    match services.store.get(id).await {
        Ok(record) if record.is_quote() => Json(RecordResponse::from(&record)).into_response(),
        // An order id on the quotes surface reads as absent, not as a leak.
        Ok(_) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
