//! Shared request/response validation.
//!
//! Validation runs in a fixed order: transport, status code, markup
//! detection, JSON parsing. Field extraction is left to each provider.

use log::debug;
use reqwest::RequestBuilder;
use serde_json::Value;

use crate::errors::MarketDataError;

/// Send a request and return the raw body of a successful response.
pub(crate) async fn send(
    provider: &str,
    request: RequestBuilder,
) -> Result<String, MarketDataError> {
    let response = request.send().await.map_err(|e| MarketDataError::Transport {
        provider: provider.to_string(),
        message: e.to_string(),
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(MarketDataError::Http {
            provider: provider.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|e| MarketDataError::Transport {
        provider: provider.to_string(),
        message: format!("Failed to read response: {}", e),
    })?;

    debug!("{} responded with {} bytes", provider, body.len());
    Ok(body)
}

/// Validate the body of a successful response as a JSON document.
///
/// Markup is rejected before parsing so an intermediary's error page is
/// reported as [`MarketDataError::UnexpectedFormat`] rather than a parse error.
pub(crate) fn parse_body(provider: &str, body: &str) -> Result<Value, MarketDataError> {
    if looks_like_markup(body) {
        return Err(MarketDataError::UnexpectedFormat {
            provider: provider.to_string(),
        });
    }

    serde_json::from_str(body).map_err(|e| MarketDataError::Parse {
        provider: provider.to_string(),
        message: e.to_string(),
    })
}

/// Whether a body is recognizably HTML/XML rather than JSON.
pub fn looks_like_markup(body: &str) -> bool {
    let mut chars = body.trim_start_matches('\u{feff}').trim_start().chars();
    let opens_tag = |c: char| c.is_ascii_alphabetic() || matches!(c, '!' | '?' | '/');
    chars.next() == Some('<') && chars.next().is_some_and(opens_tag)
}
