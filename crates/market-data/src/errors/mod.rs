//! Error types and failure classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The error enum returned by every fetch
//! - [`FailureKind`]: Coarse classification reported alongside a `FAIL` status

mod kind;

pub use kind::FailureKind;

use thiserror::Error;

/// Errors that can occur while fetching a series or the spot price.
///
/// Variants follow the order in which a response is validated: a request
/// that never produced a response, a non-success status, a body that is
/// markup instead of JSON, a body that is not valid JSON, and finally a
/// valid document without the expected field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// No response was received (connection refused, DNS, timeout, ...).
    #[error("Transport error: {provider} - {message}")]
    Transport {
        /// The provider that was being called
        provider: String,
        /// Underlying client error message
        message: String,
    },

    /// The upstream answered with a non-success status code.
    #[error("HTTP {status}: {provider}")]
    Http {
        /// The provider that answered
        provider: String,
        /// The HTTP status code
        status: u16,
    },

    /// The body is an HTML/markup page rather than a structured payload.
    /// Intermediaries commonly serve an error page this way.
    #[error("Unexpected format: {provider} returned markup")]
    UnexpectedFormat {
        /// The provider that answered
        provider: String,
    },

    /// The body could not be parsed as the expected structured format.
    #[error("Parse error: {provider} - {message}")]
    Parse {
        /// The provider that answered
        provider: String,
        /// Parser error message
        message: String,
    },

    /// The payload parsed but does not carry the expected field.
    #[error("Missing field '{field}' in {provider} response")]
    MissingField {
        /// The provider that answered
        provider: String,
        /// Dotted path of the missing field
        field: &'static str,
    },
}

impl MarketDataError {
    /// Returns the failure classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use tidewatch_market_data::errors::{FailureKind, MarketDataError};
    ///
    /// let error = MarketDataError::Http { provider: "FRED".to_string(), status: 502 };
    /// assert_eq!(error.kind(), FailureKind::Http);
    ///
    /// let error = MarketDataError::UnexpectedFormat { provider: "FRED".to_string() };
    /// assert_eq!(error.kind(), FailureKind::Format);
    /// ```
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport { .. } => FailureKind::Transport,
            Self::Http { .. } => FailureKind::Http,
            Self::UnexpectedFormat { .. } | Self::Parse { .. } => FailureKind::Format,
            Self::MissingField { .. } => FailureKind::MissingField,
        }
    }
}
