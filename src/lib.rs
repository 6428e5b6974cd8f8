pub mod bars;
pub mod client;
pub mod config;
mod error;
pub mod model;
pub mod network;

pub use bars::{BarClock, BarDispatcher, InstrumentAggregator, Rollover};
pub use client::OpenApiClient;
pub use config::{Credentials, FeedConfig};
pub use error::FeedError;
pub use model::bar::ClosedBar;
pub use model::message::{payload_type, Envelope};
pub use model::period::Period;
pub use model::update::{RawUpdate, TrendbarFragment};
