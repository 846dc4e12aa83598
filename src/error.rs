//! Error types for API calls.
//!
//! Every failure of a client call is reported through [`Error`]. Variants carry
//! enough structure to branch on programmatically (status code and category,
//! raw response bodies, serde messages), and their `Display` output is a
//! one-line message suitable for logs or UI.

use crate::status::StatusCategory;

/// The main error type for API calls.
///
/// # Examples
///
/// ```no_run
/// use api_manager::{ApiClient, Error, StatusCategory};
///
/// # async fn example() -> Result<(), Error> {
/// let client = ApiClient::new("https://api.example.com", "MyService")?;
///
/// match client.get::<serde_json::Value>("/v1/employees").await {
///     Ok(value) => println!("Success: {:?}", value),
///     Err(Error::InvalidStatusCode { category: StatusCategory::ClientError(code), .. }) => {
///         eprintln!("Rejected with {}", code);
///     }
///     Err(Error::DecodeFailure { raw_response, serde_error }) => {
///         eprintln!("Could not decode {}: {}", raw_response, serde_error);
///     }
///     Err(e) => eprintln!("{}", e.describe()),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The base URL and path did not form a valid absolute URL.
    #[error("Invalid URL.")]
    InvalidUrl(#[from] url::ParseError),

    /// The transport did not produce a well-formed HTTP response.
    ///
    /// Connection failures, timeouts and unparseable status lines all end up
    /// here. The underlying transport error is logged, not carried.
    #[error("Invalid response.")]
    InvalidResponse,

    /// The server answered with a status other than exactly `200`.
    #[error("Invalid response code {code}: {category}.")]
    InvalidStatusCode {
        /// The numeric status code
        code: u16,
        /// The classification of `code`
        category: StatusCategory,
        /// The raw response body, lossily decoded as UTF-8
        raw_response: String,
    },

    /// The `200` response body could not be decoded into the expected type.
    #[error("{serde_error}")]
    DecodeFailure {
        /// The raw response body that failed to decode
        raw_response: String,
        /// The serde error message
        serde_error: String,
    },

    /// The request body could not be encoded to JSON.
    #[error("{0}")]
    EncodeFailure(String),

    /// The credential store failed.
    ///
    /// Only store implementations return this; the client logs it and falls
    /// back to an absent token.
    #[error("{0}")]
    CredentialStore(String),

    /// The client or a request was misconfigured.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Renders the one-line human message for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use api_manager::{Error, StatusCategory};
    ///
    /// let err = Error::InvalidStatusCode {
    ///     code: 500,
    ///     category: StatusCategory::classify(500),
    ///     raw_response: String::new(),
    /// };
    /// assert_eq!(err.describe(), "Invalid response code 500: ServerError(500).");
    /// assert_eq!(Error::InvalidResponse.describe(), "Invalid response.");
    /// ```
    pub fn describe(&self) -> String {
        self.to_string()
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::InvalidStatusCode { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns the status category for `InvalidStatusCode` errors.
    pub fn category(&self) -> Option<StatusCategory> {
        match self {
            Error::InvalidStatusCode { category, .. } => Some(*category),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::InvalidStatusCode { raw_response, .. } => Some(raw_response),
            Error::DecodeFailure { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }
}

/// A specialized `Result` type for API calls.
pub type Result<T> = std::result::Result<T, Error>;
