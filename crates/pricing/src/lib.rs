//! `badgekit-pricing` — the pricing engine for printed name badges.
//!
//! Pure computation: order options in, quantity/price/GST/CO2 out. No I/O,
//! no persistence; the only state is a bounded memoization cache that never
//! changes observable results.

pub mod calculator;
pub mod options;

pub use calculator::{Calculator, OrderSummary, PriceBreakdown};
pub use options::{
    BadgeSize, InkCoverage, Lanyards, OrderOptions, PricingError, PrintedSides, RawOrderOptions,
    ShippingMethod,
};
