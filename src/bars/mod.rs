//! Live Bar Aggregation
//!
//! Turns the gateway's stream of cumulative trendbar deltas into closed OHLC
//! bars, emitted exactly once per (instrument, bar) when the bar boundary is
//! crossed.
//!
//! # Architecture
//!
//! - [`BarClock`] detects bucket rollover once, globally, per boundary.
//! - [`InstrumentAggregator`] holds one instrument's open-bar OHLC snapshot.
//! - [`BarDispatcher`] feeds each update to the clock first, then to every
//!   aggregator in subscription order.
//!
//! Processing is strictly sequential; no aggregator state is shared or
//! mutated outside the dispatch call.

pub mod aggregator;
pub mod clock;
pub mod dispatch;

pub use aggregator::{InstrumentAggregator, PRICE_SCALE};
pub use clock::{BarClock, Rollover};
pub use dispatch::BarDispatcher;
