//! Service wiring: which store/gateway/mailer the app runs against.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::warn;

use badgekit_infra::{
    InMemoryOrderStore, Mailer, MockPaymentGateway, OrderIntakeService, OrderStore, PaymentGateway,
    PostgresOrderStore, RecordingMailer, Smtp2goMailer, StripeGateway,
};
use badgekit_orders::OrderPolicy;
use badgekit_pricing::Calculator;

use crate::config::AppConfig;

/// Everything the handlers need, injected via `Extension<Arc<AppServices>>`.
pub struct AppServices {
    pub calculator: Arc<Calculator>,
    pub store: Arc<dyn OrderStore>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub mailer: Arc<dyn Mailer>,
    pub intake: OrderIntakeService<Arc<dyn OrderStore>>,
    pub currency: String,
}

impl AppServices {
    pub fn new(
        store: Arc<dyn OrderStore>,
        gateway: Arc<dyn PaymentGateway>,
        mailer: Arc<dyn Mailer>,
        policy: OrderPolicy,
        currency: impl Into<String>,
    ) -> Self {
        let calculator = Arc::new(Calculator::new());
        let intake =
            OrderIntakeService::new(calculator.clone(), policy, store.clone(), mailer.clone());
        Self {
            calculator,
            store,
            gateway,
            mailer,
            intake,
            currency: currency.into(),
        }
    }
}

/// Build production services from config, falling back to local doubles for
/// whatever is not configured.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store: Arc<dyn OrderStore> = match &config.database_url {
        Some(url) => {
            let pool = PgPool::connect(url).await?;
            let store = PostgresOrderStore::new(pool);
            store.ensure_schema().await?;
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set; records will not survive restarts");
            Arc::new(InMemoryOrderStore::new())
        }
    };

    let gateway: Arc<dyn PaymentGateway> = match &config.stripe_secret_key {
        Some(key) => Arc::new(StripeGateway::new(key.clone())),
        None => {
            warn!("STRIPE_SECRET_KEY not set; using mock payment gateway");
            Arc::new(MockPaymentGateway::new())
        }
    };

    let mailer: Arc<dyn Mailer> = match &config.smtp2go_api_key {
        Some(key) => Arc::new(Smtp2goMailer::new(key.clone(), config.email_sender.clone())),
        None => {
            warn!("SMTP2GO_API_KEY not set; emails will not be delivered");
            Arc::new(RecordingMailer::new())
        }
    };

    Ok(AppServices::new(
        store,
        gateway,
        mailer,
        OrderPolicy::new(config.min_order_quantity),
        config.currency.clone(),
    ))
}
