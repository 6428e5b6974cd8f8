//! Per-instrument OHLC state for the currently open bar.

use crate::model::bar::ClosedBar;
use crate::model::update::RawUpdate;

use super::clock::Rollover;

/// Raw venue units per price unit (prices arrive as 1/100000 pips).
pub const PRICE_SCALE: f64 = 100_000.0;

// Running OHLC for the open bar, in real price units. Only exists once a
// trendbar update has landed, so a bar with no updates can never leak out.
#[derive(Debug, Clone, Copy, PartialEq)]
struct OpenBar {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

/// Tracks the latest OHLC snapshot for a single instrument and turns it into
/// a `ClosedBar` when the shared clock signals a rollover.
#[derive(Debug)]
pub struct InstrumentAggregator {
    symbol_id: i64,
    symbol_name: String,
    bar: Option<OpenBar>,
}

impl InstrumentAggregator {
    pub fn new(symbol_id: i64, symbol_name: impl Into<String>) -> Self {
        Self {
            symbol_id,
            symbol_name: symbol_name.into(),
            bar: None,
        }
    }

    pub fn symbol_id(&self) -> i64 {
        self.symbol_id
    }

    pub fn symbol_name(&self) -> &str {
        &self.symbol_name
    }

    /// True once the currently open bar has absorbed at least one update.
    pub fn is_dirty(&self) -> bool {
        self.bar.is_some()
    }

    /// Apply one decoded update under the clock's verdict for it.
    ///
    /// On rollover the just-closed bar is emitted (if any update touched it)
    /// and the running state resets; the rollover-carrying message itself is
    /// not treated as a price update. Otherwise the update is merged if it
    /// is a trendbar event for this instrument.
    pub fn apply(&mut self, update: &RawUpdate, rollover: Rollover) -> Option<ClosedBar> {
        match rollover {
            Rollover::Closed {
                close_timestamp, ..
            } => {
                let finished = self.bar.take()?;
                Some(ClosedBar {
                    symbol: self.symbol_name.clone(),
                    close_timestamp,
                    open: finished.open,
                    high: finished.high,
                    low: finished.low,
                    close: finished.close,
                })
            }
            Rollover::Stale => None,
            Rollover::None => {
                if update.symbol_id != self.symbol_id || update.session_close {
                    return None;
                }
                // Pure spot ticks carry no bar progress in this model.
                let frag = update.trendbar?;
                let bid = update.bid?;

                // Deltas are cumulative from the bar's start, so each update
                // replaces the whole snapshot; no running max/min needed.
                self.bar = Some(OpenBar {
                    low: frag.low as f64 / PRICE_SCALE,
                    open: (frag.low + frag.delta_open) as f64 / PRICE_SCALE,
                    high: (frag.low + frag.delta_high) as f64 / PRICE_SCALE,
                    close: bid as f64 / PRICE_SCALE,
                });
                None
            }
        }
    }
}
