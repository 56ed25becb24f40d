//! Outbound email via the SMTP2GO REST API.
//!
//! Receipts are rendered from the engine's line-item breakdown, so the email
//! always matches what the customer was charged.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use badgekit_orders::{OrderRecord, RecordKind};
use badgekit_pricing::PriceBreakdown;

const SMTP2GO_SEND_URL: &str = "https://api.smtp2go.com/v3/email/send";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail request failed: {0}")]
    Request(String),

    #[error("mail service rejected the message: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError>;
}

#[async_trait]
impl<M> Mailer for Arc<M>
where
    M: Mailer + ?Sized,
{
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        (**self).send(message).await
    }
}

#[derive(Serialize)]
struct Smtp2goRequest<'a> {
    api_key: &'a str,
    sender: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text_body: &'a str,
    html_body: &'a str,
}

/// SMTP2GO-backed mailer (JSON POST to the `/email/send` endpoint).
#[derive(Debug, Clone)]
pub struct Smtp2goMailer {
    http: reqwest::Client,
    api_key: String,
    sender: String,
    endpoint: String,
}

impl Smtp2goMailer {
    pub fn new(api_key: impl Into<String>, sender: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            sender: sender.into(),
            endpoint: SMTP2GO_SEND_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl Mailer for Smtp2goMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        let request = Smtp2goRequest {
            api_key: &self.api_key,
            sender: &self.sender,
            to: [&message.to],
            subject: &message.subject,
            text_body: &message.text_body,
            html_body: &message.html_body,
        };

        let resp: serde_json::Value = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| MailError::Request(e.to_string()))?
            .json()
            .await
            .map_err(|e| MailError::Request(e.to_string()))?;

        let succeeded = resp["data"]["succeeded"].as_u64().unwrap_or(0);
        if succeeded == 0 {
            return Err(MailError::Rejected(resp.to_string()));
        }
        Ok(())
    }
}

/// Mailer double that captures messages for assertions.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every send fails, for exercising the
    /// "record saved but email failed" path.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Request("recording mailer set to fail".to_string()));
        }
        self.sent
            .lock()
            .map_err(|_| MailError::Request("lock poisoned".to_string()))?
            .push(message);
        Ok(())
    }
}

/// Build the confirmation email for a freshly saved quote or order.
pub fn receipt_email(record: &OrderRecord, breakdown: &PriceBreakdown) -> EmailMessage {
    let subject = match record.kind {
        RecordKind::Quote => format!("Your badge quote ({})", record.id),
        RecordKind::Order => format!("Your badge order ({})", record.id),
    };
    let text_body = render_receipt_text(record, breakdown);
    let html_body = render_receipt_html(record, breakdown);
    EmailMessage {
        to: record.customer.email.clone(),
        subject,
        text_body,
        html_body,
    }
}

fn receipt_lines(record: &OrderRecord, breakdown: &PriceBreakdown) -> Vec<(String, Decimal)> {
    let mut lines = vec![(
        format!("{} badges", record.total_quantity),
        breakdown.base,
    )];
    if !breakdown.bulk_discount.is_zero() {
        lines.push(("Bulk discount".to_string(), -breakdown.bulk_discount));
    }
    if !breakdown.size_surcharge.is_zero() {
        lines.push(("A6 size".to_string(), breakdown.size_surcharge));
    }
    if !breakdown.double_sided_surcharge.is_zero() {
        lines.push((
            "Double-sided printing".to_string(),
            breakdown.double_sided_surcharge,
        ));
    }
    if !breakdown.ink_surcharge.is_zero() {
        lines.push(("High ink coverage".to_string(), breakdown.ink_surcharge));
    }
    if !breakdown.lanyard_discount.is_zero() {
        lines.push(("No lanyards".to_string(), -breakdown.lanyard_discount));
    }
    lines.push(("Shipping".to_string(), breakdown.shipping));
    lines
}

fn fmt_money(amount: Decimal) -> String {
    if amount.is_sign_negative() {
        format!("-${}", -amount)
    } else {
        format!("${amount}")
    }
}

fn render_receipt_text(record: &OrderRecord, breakdown: &PriceBreakdown) -> String {
    let mut out = String::new();
    out.push_str(&format!("Hi {},\n\n", record.customer.name));
    match record.kind {
        RecordKind::Quote => out.push_str("Here is your badge quote.\n\n"),
        RecordKind::Order => out.push_str("Thanks for your badge order.\n\n"),
    }
    for (label, amount) in receipt_lines(record, breakdown) {
        out.push_str(&format!("{label}: {}\n", fmt_money(amount)));
    }
    out.push_str(&format!("\nTotal (inc. GST): ${}\n", record.total_cost));
    out.push_str(&format!("GST included: ${}\n", record.gst_amount));
    out.push_str(&format!(
        "Estimated CO2 saved: {} kg\n",
        record.co2_savings_kg
    ));
    out.push_str(&format!("\nReference: {}\n", record.id));
    out
}

fn render_receipt_html(record: &OrderRecord, breakdown: &PriceBreakdown) -> String {
    let mut rows = String::new();
    for (label, amount) in receipt_lines(record, breakdown) {
        rows.push_str(&format!(
            "<tr><td>{label}</td><td align=\"right\">{}</td></tr>",
            fmt_money(amount)
        ));
    }
    format!(
        "<p>Hi {name},</p>\
         <table>{rows}\
         <tr><td><strong>Total (inc. GST)</strong></td>\
         <td align=\"right\"><strong>${total}</strong></td></tr>\
         <tr><td>GST included</td><td align=\"right\">${gst}</td></tr></table>\
         <p>Estimated CO2 saved: {co2} kg</p>\
         <p>Reference: {id}</p>",
        name = record.customer.name,
        rows = rows,
        total = record.total_cost,
        gst = record.gst_amount,
        co2 = record.co2_savings_kg,
        id = record.id,
    )
}
