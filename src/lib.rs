pub mod book;
pub mod client;
pub mod config;
pub mod matching;
pub mod models;
pub mod request;
pub mod units;

pub mod metrics;

pub use book::{BookEntry, Market, OrderBookSnapshot, SnapshotError, Token};
pub use client::{ClientError, Connector, PlacedOrder};
pub use matching::{match_order, FillResult, FillSink, NullSink, PriceLimit, RecordingSink};
pub use models::{OrderRequest, OrderStyle, Side, ZERO_ADDRESS};
pub use units::{BaseUnits, Precision};
