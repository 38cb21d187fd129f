//! Domain types: assets, windows, signal states, price series, strategy.

pub mod asset;
pub mod price;
pub mod signal;
pub mod strategy;

pub use asset::Asset;
pub use price::PriceSeries;
pub use signal::{SignalState, Window};
pub use strategy::Strategy;
