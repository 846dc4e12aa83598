//! Coarse classification of HTTP status codes.

use std::fmt;

/// The semantic category of an HTTP status code, keyed by its hundred-range.
///
/// Every variant carries the original code so the category alone is enough
/// to render an error message.
///
/// `Display` uses the variant name as written here, so error messages read
/// `ServerError(500)`.
///
/// # Examples
///
/// ```
/// use api_manager::StatusCategory;
///
/// assert_eq!(StatusCategory::classify(404), StatusCategory::ClientError(404));
/// assert_eq!(StatusCategory::classify(42), StatusCategory::Unknown(42));
/// assert_eq!(StatusCategory::classify(503).to_string(), "ServerError(503)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCategory {
    /// 1xx
    Informational(u16),
    /// 2xx
    Success(u16),
    /// 3xx
    Redirection(u16),
    /// 4xx
    ClientError(u16),
    /// 5xx
    ServerError(u16),
    /// Anything outside `100..600`.
    Unknown(u16),
}

impl StatusCategory {
    /// Classifies a numeric status code. Never fails.
    pub fn classify(code: u16) -> Self {
        match code {
            100..=199 => StatusCategory::Informational(code),
            200..=299 => StatusCategory::Success(code),
            300..=399 => StatusCategory::Redirection(code),
            400..=499 => StatusCategory::ClientError(code),
            500..=599 => StatusCategory::ServerError(code),
            _ => StatusCategory::Unknown(code),
        }
    }

    /// Returns the status code this category was derived from.
    pub fn code(&self) -> u16 {
        match *self {
            StatusCategory::Informational(code)
            | StatusCategory::Success(code)
            | StatusCategory::Redirection(code)
            | StatusCategory::ClientError(code)
            | StatusCategory::ServerError(code)
            | StatusCategory::Unknown(code) => code,
        }
    }

    /// Returns `true` for any 2xx code.
    ///
    /// Note that the client only accepts an exact `200`; a `Success(201)`
    /// still fails a request.
    pub fn is_success(&self) -> bool {
        matches!(self, StatusCategory::Success(_))
    }
}

impl From<http::StatusCode> for StatusCategory {
    fn from(status: http::StatusCode) -> Self {
        StatusCategory::classify(status.as_u16())
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusCategory::Informational(_) => "Informational",
            StatusCategory::Success(_) => "Success",
            StatusCategory::Redirection(_) => "Redirection",
            StatusCategory::ClientError(_) => "ClientError",
            StatusCategory::ServerError(_) => "ServerError",
            StatusCategory::Unknown(_) => "Unknown",
        };
        write!(f, "{}({})", name, self.code())
    }
}
