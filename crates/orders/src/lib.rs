//! `badgekit-orders` — quote/order records and intake policy.

pub mod policy;
pub mod record;

pub use policy::OrderPolicy;
pub use record::{CustomerDetails, OrderRecord, OrderStatus, RecordKind};
