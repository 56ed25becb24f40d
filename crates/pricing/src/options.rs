//! Order options: the input value object for every pricing operation.
//!
//! Enum fields are strict sum types validated when raw widget input is
//! resolved; quantity fields are lenient (the widget feeds raw text-field
//! values mid-edit, and the live display path must never fail on them).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pricing-boundary error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// An enum option carried a value outside its known set. Rejected
    /// explicitly: an unknown size or shipping method silently falling
    /// through a modifier table would corrupt a real money amount.
    #[error("invalid value `{value}` for option `{field}`")]
    InvalidOptionValue { field: &'static str, value: String },
}

impl PricingError {
    fn invalid(field: &'static str, value: &str) -> Self {
        Self::InvalidOptionValue {
            field,
            value: value.to_string(),
        }
    }
}

/// Physical badge size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BadgeSize {
    #[serde(rename = "a7")]
    A7,
    #[serde(rename = "a6")]
    A6,
}

impl BadgeSize {
    pub fn parse(s: &str) -> Result<Self, PricingError> {
        match s.trim().to_lowercase().as_str() {
            "a7" => Ok(Self::A7),
            "a6" => Ok(Self::A6),
            _ => Err(PricingError::invalid("size", s)),
        }
    }
}

/// Single- or double-sided printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintedSides {
    Single,
    Double,
}

impl PrintedSides {
    pub fn parse(s: &str) -> Result<Self, PricingError> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "double" => Ok(Self::Double),
            _ => Err(PricingError::invalid("printed_sides", s)),
        }
    }
}

/// Ink coverage band; heavy coverage carries a per-unit surcharge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InkCoverage {
    UpTo40,
    Over40,
}

impl InkCoverage {
    pub fn parse(s: &str) -> Result<Self, PricingError> {
        match s.trim() {
            s if s.eq_ignore_ascii_case("upTo40") => Ok(Self::UpTo40),
            s if s.eq_ignore_ascii_case("over40") => Ok(Self::Over40),
            _ => Err(PricingError::invalid("ink_coverage", s)),
        }
    }
}

/// Whether lanyards ship with the badges. Leaving them out earns a
/// per-unit discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lanyards {
    #[serde(rename = "yes")]
    Included,
    #[serde(rename = "no")]
    None,
}

impl Lanyards {
    pub fn parse(s: &str) -> Result<Self, PricingError> {
        match s.trim().to_lowercase().as_str() {
            "yes" => Ok(Self::Included),
            "no" => Ok(Self::None),
            _ => Err(PricingError::invalid("lanyards_included", s)),
        }
    }
}

/// Shipping service level. Express doubles the standard tier cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingMethod {
    Standard,
    Express,
}

impl ShippingMethod {
    pub fn parse(s: &str) -> Result<Self, PricingError> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "express" => Ok(Self::Express),
            _ => Err(PricingError::invalid("shipping_method", s)),
        }
    }
}

/// Fully validated pricing input.
///
/// Structural equality and hashing make this the memoization key directly;
/// no serialized-string keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderOptions {
    /// Badges printed with individual guest names.
    pub with_guest_names: u32,
    /// Badges printed without guest names.
    pub without_guest_names: u32,
    pub size: BadgeSize,
    pub printed_sides: PrintedSides,
    pub ink_coverage: InkCoverage,
    pub lanyards: Lanyards,
    pub shipping: ShippingMethod,
}

impl OrderOptions {
    /// Total badge count across both quantity fields.
    ///
    /// Saturating: each field is independently clamped to `u32::MAX` at the
    /// raw boundary, so the sum must not be allowed to wrap.
    pub fn total_quantity(&self) -> u32 {
        self.with_guest_names.saturating_add(self.without_guest_names)
    }
}

/// Raw widget input, exactly as posted from the embed form.
///
/// Quantities arrive as free text (possibly blank mid-edit) and coerce to 0;
/// enum fields are validated strictly via [`RawOrderOptions::resolve`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrderOptions {
    #[serde(default)]
    pub quantity_with_guest_names: Option<String>,
    #[serde(default)]
    pub quantity_without_guest_names: Option<String>,
    pub size: String,
    pub printed_sides: String,
    pub ink_coverage: String,
    pub lanyards_included: String,
    pub shipping_method: String,
}

impl RawOrderOptions {
    /// Validate enum fields and coerce quantity fields.
    pub fn resolve(&self) -> Result<OrderOptions, PricingError> {
        Ok(OrderOptions {
            with_guest_names: coerce_quantity(self.quantity_with_guest_names.as_deref()),
            without_guest_names: coerce_quantity(self.quantity_without_guest_names.as_deref()),
            size: BadgeSize::parse(&self.size)?,
            printed_sides: PrintedSides::parse(&self.printed_sides)?,
            ink_coverage: InkCoverage::parse(&self.ink_coverage)?,
            lanyards: Lanyards::parse(&self.lanyards_included)?,
            shipping: ShippingMethod::parse(&self.shipping_method)?,
        })
    }
}

/// Coerce a raw text-field quantity to a count.
///
/// Missing, blank, and non-numeric input all become 0; negatives clamp to 0.
fn coerce_quantity(raw: Option<&str>) -> u32 {
    let Some(raw) = raw else { return 0 };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0;
    }

    if let Ok(n) = trimmed.parse::<i64>() {
        return n.clamp(0, u32::MAX as i64) as u32;
    }

    // Fractional input gets truncated rather than rejected.
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() && f > 0.0 => f.trunc().min(u32::MAX as f64) as u32,
        _ => 0,
    }
}
