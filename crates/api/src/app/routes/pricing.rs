use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, routing::post, Json, Router};

use badgekit_pricing::RawOrderOptions;

use crate::app::dto::PricingSummaryResponse;
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/summary", post(summary))
}

/// Live display path. Blank or mid-edit quantities price as zero; only an
/// out-of-vocabulary enum value is an error.
pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RawOrderOptions>,
) -> axum::response::Response {
    let options = match body.resolve() {
        Ok(v) => v,
        Err(e) => return errors::pricing_error_to_response(e),
    };

    let summary = services.calculator.summarize(&options);
    let breakdown = services.calculator.breakdown(&options);
    Json(PricingSummaryResponse { summary, breakdown }).into_response()
}
