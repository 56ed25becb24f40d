//! Infrastructure layer: persistence, payment gateway, outbound email.

pub mod intake;
pub mod notify;
pub mod payment;
pub mod store;

pub use intake::{IntakeError, OrderIntakeService, OrderSubmission};
pub use notify::{receipt_email, EmailMessage, MailError, Mailer, RecordingMailer, Smtp2goMailer};
pub use payment::{GatewayError, MockPaymentGateway, PaymentGateway, PaymentIntent, StripeGateway};
pub use store::{InMemoryOrderStore, OrderStore, PostgresOrderStore, StoreError};
