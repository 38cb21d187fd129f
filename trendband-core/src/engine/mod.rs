//! Signal engine: hysteresis replay and the end-to-end evaluation pipeline.

pub mod hysteresis;
pub mod pipeline;

pub use hysteresis::{
    transition, DayInput, DayStates, Diagnostic, DiagnosticKind, HysteresisEngine, SignalHistory,
    SignalMode,
};
pub use pipeline::{evaluate, prepare_series, replay, replay_with_snapshots, snapshots};
