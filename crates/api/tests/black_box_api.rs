use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;

use badgekit_api::app::{self, services::AppServices};
use badgekit_infra::{InMemoryOrderStore, MockPaymentGateway, RecordingMailer};
use badgekit_orders::OrderPolicy;

struct TestServer {
    base_url: String,
    gateway: Arc<MockPaymentGateway>,
    mailer: Arc<RecordingMailer>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, wired to local doubles, bound to an ephemeral port.
        let gateway = Arc::new(MockPaymentGateway::new());
        let mailer = Arc::new(RecordingMailer::new());
        let services = Arc::new(AppServices::new(
            Arc::new(InMemoryOrderStore::new()),
            gateway.clone(),
            mailer.clone(),
            OrderPolicy::default(),
            "aud",
        ));
        let app = app::build_app(services);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            gateway,
            mailer,
            handle,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn options_body(with_names: &str, without_names: &str) -> serde_json::Value {
    json!({
        "quantityWithGuestNames": with_names,
        "quantityWithoutGuestNames": without_names,
        "size": "a7",
        "printedSides": "double",
        "inkCoverage": "over40",
        "lanyardsIncluded": "yes",
        "shippingMethod": "standard"
    })
}

fn customer_body() -> serde_json::Value {
    json!({
        "name": "Dana Smith",
        "email": "dana@example.com",
        "company": "Acme Events",
        "eventName": "Annual Conference"
    })
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn pricing_summary_matches_the_rate_table() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/pricing/summary", srv.base_url))
        .json(&options_body("50", "25"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["summary"]["total_quantity"], 75);
    assert_eq!(body["summary"]["total_price"], "581.72");
    assert_eq!(body["summary"]["gst_amount"], "52.88");
    assert_eq!(body["summary"]["co2_savings_kg"], "8.25");
    assert_eq!(body["breakdown"]["shipping"], "20");
}

#[tokio::test]
async fn blank_quantities_price_as_zero_instead_of_failing() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Mid-edit state: both quantity fields absent.
    let res = client
        .post(format!("{}/pricing/summary", srv.base_url))
        .json(&json!({
            "size": "a7",
            "printedSides": "single",
            "inkCoverage": "upTo40",
            "lanyardsIncluded": "yes",
            "shippingMethod": "standard"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["summary"]["total_quantity"], 0);
    assert_eq!(body["summary"]["total_price"], "22.37");
}

#[tokio::test]
async fn unknown_option_values_are_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut body = options_body("50", "25");
    body["size"] = json!("a5");
    let res = client
        .post(format!("{}/pricing/summary", srv.base_url))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_option");
    assert!(body["message"].as_str().unwrap().contains("a5"));
}

#[tokio::test]
async fn quote_lifecycle_create_and_fetch() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Quotes are exempt from the order minimum.
    let res = client
        .post(format!("{}/quotes", srv.base_url))
        .json(&json!({ "customer": customer_body(), "options": options_body("10", "0") }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let created: serde_json::Value = res.json().await.unwrap();
    assert_eq!(created["kind"], "quote");
    assert_eq!(created["status"], "submitted");
    let id = created["id"].as_str().unwrap().to_string();

    let res = client
        .get(format!("{}/quotes/{}", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: serde_json::Value = res.json().await.unwrap();
    assert_eq!(fetched["totalQuantity"], 10);
    assert_eq!(fetched["customer"]["email"], "dana@example.com");

    // A quote id is not visible on the orders surface.
    let res = client
        .get(format!("{}/orders/{}", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let sent = srv.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].subject.contains("quote"));
}

#[tokio::test]
async fn order_below_minimum_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/orders", srv.base_url))
        .json(&json!({ "customer": customer_body(), "options": options_body("50", "0") }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
    assert!(body["message"].as_str().unwrap().contains("minimum order"));
}

#[tokio::test]
async fn order_payment_lifecycle() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/orders", srv.base_url))
        .json(&json!({ "customer": customer_body(), "options": options_body("100", "0") }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["totalCost"], "805.46");

    // Create the payment intent from the stored total.
    let res = client
        .post(format!("{}/orders/{}/payment-intent", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let intent: serde_json::Value = res.json().await.unwrap();
    let intent_id = intent["paymentIntentId"].as_str().unwrap().to_string();
    assert!(intent["clientSecret"].as_str().is_some());
    assert_eq!(intent["amountMinor"], 80546);

    let res = client
        .get(format!("{}/orders/{}", srv.base_url, id))
        .send()
        .await
        .unwrap();
    let fetched: serde_json::Value = res.json().await.unwrap();
    assert_eq!(fetched["status"], "payment_pending");

    // Confirming before the gateway settles is refused.
    let res = client
        .post(format!("{}/orders/{}/payment-confirmed", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "payment_not_settled");

    srv.gateway.settle_intent(&intent_id);
    let res = client
        .post(format!("{}/orders/{}/payment-confirmed", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let paid: serde_json::Value = res.json().await.unwrap();
    assert_eq!(paid["status"], "paid");

    // A paid order cannot mint another intent.
    let res = client
        .post(format!("{}/orders/{}/payment-intent", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Intake confirmation + paid receipt.
    assert_eq!(srv.mailer.sent().len(), 2);
}

#[tokio::test]
async fn confirm_without_intent_is_refused() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/orders", srv.base_url))
        .json(&json!({ "customer": customer_body(), "options": options_body("100", "0") }))
        .send()
        .await
        .unwrap();
    let created: serde_json::Value = res.json().await.unwrap();
    let id = created["id"].as_str().unwrap();

    let res = client
        .post(format!("{}/orders/{}/payment-confirmed", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_and_malformed_ids() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/orders/{}", srv.base_url, uuid::Uuid::now_v7()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(format!("{}/orders/not-a-uuid", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");
}
