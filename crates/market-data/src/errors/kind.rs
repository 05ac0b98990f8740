use serde::{Deserialize, Serialize};

/// Classification of a failed fetch.
///
/// Every kind is handled the same way by the acquisition layer (cache
/// fallback, then a bounded retry); the kind is kept for reporting.
///
/// | Kind | Raised when |
/// |------|-------------|
/// | `Transport` | No response was received |
/// | `Http` | Non-success status code |
/// | `Format` | Markup body, or body that does not parse |
/// | `MissingField` | Parsed, but the expected field is absent |
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// Connection failure or timeout.
    Transport,

    /// The upstream answered with a non-success status.
    Http,

    /// Markup instead of structured data, or malformed structured data.
    Format,

    /// Structurally valid payload without the expected value.
    MissingField,
}

impl FailureKind {
    /// Returns the string representation of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transport => "TRANSPORT",
            FailureKind::Http => "HTTP",
            FailureKind::Format => "FORMAT",
            FailureKind::MissingField => "MISSING_FIELD",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
