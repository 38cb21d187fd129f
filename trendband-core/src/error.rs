//! Structured error types for the signal core.
//!
//! Every failure is a value. The core never retries and never aborts; the
//! caller decides whether to refetch data, notify, or exit.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// The series is shorter than the longest moving-average window.
    #[error("insufficient history: need at least {required} trading days, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    /// Missing asset column, ragged columns, or non-monotonic/duplicate dates.
    #[error("misaligned price data: {0}")]
    MisalignedData(String),

    /// Invalid weights, windows, band width, or score outside the scalar table.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl CoreError {
    pub fn misaligned(msg: impl Into<String>) -> Self {
        Self::MisalignedData(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}
