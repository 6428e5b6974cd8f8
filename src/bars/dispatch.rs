//! Single-threaded dispatch of decoded updates to every aggregator.
//!
//! Each update runs to completion before the next: the clock is consulted
//! once (the bucket is global, not per instrument), and its verdict is
//! handed to every aggregator in subscription order so all of them observe
//! the same rollover for the same boundary.

use serde_json::Value;
use tracing::{debug, warn};

use crate::model::bar::ClosedBar;
use crate::model::period::Period;
use crate::model::update::RawUpdate;

use super::aggregator::InstrumentAggregator;
use super::clock::{BarClock, Rollover};

pub struct BarDispatcher {
    clock: BarClock,
    // Insertion order = subscription order; emission order follows it.
    instruments: Vec<InstrumentAggregator>,
}

impl BarDispatcher {
    pub fn new(period: Period) -> Self {
        Self {
            clock: BarClock::new(period),
            instruments: Vec::new(),
        }
    }

    pub fn add_instrument(&mut self, symbol_id: i64, symbol_name: impl Into<String>) {
        self.instruments
            .push(InstrumentAggregator::new(symbol_id, symbol_name));
    }

    pub fn period(&self) -> Period {
        self.clock.period()
    }

    pub fn instruments(&self) -> &[InstrumentAggregator] {
        &self.instruments
    }

    /// Process one decoded update; returns the bars it closed, in
    /// subscription order (empty for mid-bar updates).
    pub fn process(&mut self, update: &RawUpdate) -> Vec<ClosedBar> {
        let rollover = self.clock.observe(update.timestamp_ms);

        if rollover == Rollover::Stale {
            debug!(
                symbol_id = update.symbol_id,
                timestamp_ms = update.timestamp_ms,
                "discarding update for an already-closed bucket"
            );
            return Vec::new();
        }

        let mut closed = Vec::new();
        for instrument in &mut self.instruments {
            if let Some(bar) = instrument.apply(update, rollover) {
                closed.push(bar);
            }
        }
        closed
    }

    /// Decode-and-process a raw spot-event payload.
    ///
    /// A malformed update is fatal to itself only: it is logged and dropped,
    /// and no aggregator state is touched.
    pub fn process_payload(&mut self, payload: &Value) -> Vec<ClosedBar> {
        match RawUpdate::decode(payload) {
            Ok(update) => self.process(&update),
            Err(e) => {
                warn!("Dropping undecodable spot event: {}", e);
                Vec::new()
            }
        }
    }
}
