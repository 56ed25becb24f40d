//! The pricing calculator: rate table, modifiers, and derived totals.
//!
//! Every operation is deterministic for a given [`OrderOptions`]; the memo
//! cache is a bounded performance shortcut and never changes results.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::options::{
    BadgeSize, InkCoverage, Lanyards, OrderOptions, PrintedSides, ShippingMethod,
};

/// Per-unit rate for badges printed with guest names.
const RATE_WITH_GUEST_NAMES: Decimal = dec!(6.00);
/// Per-unit rate for badges printed without guest names.
const RATE_WITHOUT_GUEST_NAMES: Decimal = dec!(5.00);

/// Orders strictly above this quantity earn the bulk discount.
const BULK_DISCOUNT_THRESHOLD: u32 = 300;
const BULK_DISCOUNT_PER_UNIT: Decimal = dec!(0.50);

/// A6 badges carry a flat per-unit surcharge over the A7 base rates.
const A6_SIZE_SURCHARGE_PER_UNIT: Decimal = dec!(3.00);

/// Per-unit surcharge for double-sided printing and for heavy ink coverage.
/// Both scale with badge size.
const A7_FEATURE_SURCHARGE_PER_UNIT: Decimal = dec!(0.50);
const A6_FEATURE_SURCHARGE_PER_UNIT: Decimal = dec!(1.00);

/// Per-unit discount when lanyards are left out.
const NO_LANYARD_DISCOUNT_PER_UNIT: Decimal = dec!(0.50);

/// Sequential multiplicative markups applied to the pre-markup subtotal.
const SERVICE_MARKUP: Decimal = dec!(1.10);
const SECONDARY_MARKUP: Decimal = dec!(1.017);

/// GST is extracted from the tax-inclusive total: `total / 11` (10% rate).
const GST_DIVISOR: Decimal = dec!(11);

/// Estimated CO2 saved per badge, in kilograms. Marketing metric only.
const CO2_SAVINGS_PER_UNIT_KG: Decimal = dec!(0.11);

/// Memo cache bound. Keys derive from arbitrary user input, so the cache
/// must not grow without limit.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Standard shipping cost by size and quantity tier. Express is twice this.
fn shipping_base(size: BadgeSize, total_quantity: u32) -> Decimal {
    match (size, total_quantity) {
        (BadgeSize::A7, q) if q < 200 => dec!(20),
        (BadgeSize::A7, q) if q <= 500 => dec!(30),
        (BadgeSize::A7, _) => dec!(50),
        (BadgeSize::A6, q) if q < 200 => dec!(30),
        (BadgeSize::A6, q) if q <= 500 => dec!(45),
        (BadgeSize::A6, _) => dec!(75),
    }
}

/// The public pricing result for an options set.
///
/// `subtotal` is the GST-exclusive remainder: `total_price - gst_amount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub total_quantity: u32,
    pub total_price: Decimal,
    pub gst_amount: Decimal,
    pub co2_savings_kg: Decimal,
    pub subtotal: Decimal,
}

impl OrderSummary {
    /// Final price in minor currency units, the amount a payment intent is
    /// created for. Computed here so callers never re-derive it from floats.
    pub fn amount_minor_units(&self) -> i64 {
        (self.total_price * dec!(100))
            .round()
            .try_into()
            .unwrap_or(i64::MAX)
    }
}

/// Itemised price components, exposed for receipt rendering.
///
/// Discount fields hold the (non-negative) amounts subtracted. Only `total`
/// is rounded; the components are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceBreakdown {
    pub base: Decimal,
    pub bulk_discount: Decimal,
    pub size_surcharge: Decimal,
    pub double_sided_surcharge: Decimal,
    pub ink_surcharge: Decimal,
    pub lanyard_discount: Decimal,
    pub shipping: Decimal,
    pub subtotal_before_markup: Decimal,
    pub total: Decimal,
}

/// Deterministic pricing engine with a bounded memo cache.
///
/// Safe to share behind an `Arc`: the cache lock only guards the map, and a
/// missed lookup simply recomputes.
pub struct Calculator {
    cache: Mutex<LruCache<OrderOptions, OrderSummary>>,
}

impl Calculator {
    pub fn new() -> Self {
        Self::with_cache_capacity(DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_cache_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Total badge count for the options set.
    pub fn total_quantity(&self, options: &OrderOptions) -> u32 {
        options.total_quantity()
    }

    /// Final tax-inclusive price, rounded to 2 decimal places.
    pub fn total_price(&self, options: &OrderOptions) -> Decimal {
        self.summarize(options).total_price
    }

    /// GST embedded in a tax-inclusive total: `total / 11`, rounded to 2 dp.
    /// Extraction, not addition.
    pub fn gst_amount(total_price: Decimal) -> Decimal {
        (total_price / GST_DIVISOR).round_dp(2)
    }

    /// Estimated CO2 savings in kg: `quantity * 0.11`, rounded to 2 dp.
    pub fn co2_savings_kg(total_quantity: u32) -> Decimal {
        (Decimal::from(total_quantity) * CO2_SAVINGS_PER_UNIT_KG).round_dp(2)
    }

    /// Quantity, price, GST, CO2, and GST-exclusive subtotal in one result.
    ///
    /// Composing the individual operations yields the same values; there is
    /// no extra rounding hidden in the composition.
    pub fn summarize(&self, options: &OrderOptions) -> OrderSummary {
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(summary) = cache.get(options) {
                return *summary;
            }
        }

        let summary = compute_summary(options);

        if let Ok(mut cache) = self.cache.lock() {
            cache.put(*options, summary);
        }

        summary
    }

    /// Itemised components for receipts. Not cached; the breakdown path is
    /// cold compared to the live display path.
    pub fn breakdown(&self, options: &OrderOptions) -> PriceBreakdown {
        compute_breakdown(options)
    }
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

fn compute_summary(options: &OrderOptions) -> OrderSummary {
    let total_quantity = options.total_quantity();
    let total_price = compute_breakdown(options).total;
    let gst_amount = Calculator::gst_amount(total_price);

    OrderSummary {
        total_quantity,
        total_price,
        gst_amount,
        co2_savings_kg: Calculator::co2_savings_kg(total_quantity),
        subtotal: total_price - gst_amount,
    }
}

fn compute_breakdown(options: &OrderOptions) -> PriceBreakdown {
    let quantity = Decimal::from(options.total_quantity());

    let base = Decimal::from(options.with_guest_names) * RATE_WITH_GUEST_NAMES
        + Decimal::from(options.without_guest_names) * RATE_WITHOUT_GUEST_NAMES;

    // Strictly above the threshold; an order of exactly 300 pays full rate.
    let bulk_discount = if options.total_quantity() > BULK_DISCOUNT_THRESHOLD {
        BULK_DISCOUNT_PER_UNIT * quantity
    } else {
        Decimal::ZERO
    };

    let size_surcharge = match options.size {
        BadgeSize::A7 => Decimal::ZERO,
        BadgeSize::A6 => A6_SIZE_SURCHARGE_PER_UNIT * quantity,
    };

    let feature_rate = match options.size {
        BadgeSize::A7 => A7_FEATURE_SURCHARGE_PER_UNIT,
        BadgeSize::A6 => A6_FEATURE_SURCHARGE_PER_UNIT,
    };

    let double_sided_surcharge = match options.printed_sides {
        PrintedSides::Single => Decimal::ZERO,
        PrintedSides::Double => feature_rate * quantity,
    };

    let ink_surcharge = match options.ink_coverage {
        InkCoverage::UpTo40 => Decimal::ZERO,
        InkCoverage::Over40 => feature_rate * quantity,
    };

    let lanyard_discount = match options.lanyards {
        Lanyards::Included => Decimal::ZERO,
        Lanyards::None => NO_LANYARD_DISCOUNT_PER_UNIT * quantity,
    };

    let shipping = {
        let standard = shipping_base(options.size, options.total_quantity());
        match options.shipping {
            ShippingMethod::Standard => standard,
            ShippingMethod::Express => standard * dec!(2),
        }
    };

    let subtotal_before_markup = base - bulk_discount + size_surcharge + double_sided_surcharge
        + ink_surcharge
        - lanyard_discount
        + shipping;

    // Rounding happens here and nowhere earlier.
    let total = (subtotal_before_markup * SERVICE_MARKUP * SECONDARY_MARKUP).round_dp(2);

    PriceBreakdown {
        base,
        bulk_discount,
        size_surcharge,
        double_sided_surcharge,
        ink_surcharge,
        lanyard_discount,
        shipping,
        subtotal_before_markup,
        total,
    }
}
