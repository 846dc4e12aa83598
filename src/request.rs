//! Outgoing request descriptors and the builder that produces them.

use crate::multipart::{generate_boundary, MultipartPayload};
use crate::{codec, Error, Result};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method};
use serde::Serialize;
use url::Url;

/// The `Content-Type` of JSON and body-less requests.
pub const APPLICATION_JSON: &str = "application/json";

/// A fully built HTTP request, ready to hand to a [`Transport`](crate::Transport).
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method.
    pub method: Method,
    /// The absolute request URL.
    pub url: Url,
    /// The request headers.
    pub headers: HeaderMap,
    /// The encoded body, if any.
    pub body: Option<Vec<u8>>,
}

impl Request {
    /// Returns a header value as a string, if present and valid ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

/// The content type a request is sent with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentType {
    /// `application/json`
    Json,
    /// `multipart/form-data` delimited by `boundary`.
    MultipartFormData {
        /// The part delimiter, unique per request.
        boundary: String,
    },
}

impl ContentType {
    /// The `Content-Type` header value.
    pub fn header_value(&self) -> String {
        match self {
            ContentType::Json => APPLICATION_JSON.to_string(),
            ContentType::MultipartFormData { boundary } => {
                format!("multipart/form-data; boundary={boundary}")
            }
        }
    }
}

/// Builds a [`Request`] from a base URL, a path, an optional bearer token and
/// an optional body.
///
/// # Examples
///
/// ```
/// use api_manager::RequestBuilder;
/// use http::Method;
///
/// let request = RequestBuilder::new(Method::GET, "https://api.example.com", "/v1/employees")
///     .bearer_token("")
///     .build()
///     .unwrap();
///
/// assert_eq!(request.url.as_str(), "https://api.example.com/v1/employees");
/// assert_eq!(request.header("content-type"), Some("application/json"));
/// assert_eq!(request.header("authorization"), None);
/// ```
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    base_url: String,
    path: String,
    token: String,
    content_type: ContentType,
    body: Option<Vec<u8>>,
}

impl RequestBuilder {
    /// Starts a body-less JSON request.
    pub fn new(method: Method, base_url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method,
            base_url: base_url.into(),
            path: path.into(),
            token: String::new(),
            content_type: ContentType::Json,
            body: None,
        }
    }

    /// Sets the bearer token. An empty token sends no `Authorization` header.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Sets a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EncodeFailure`] if `body` cannot be encoded.
    pub fn json<T>(mut self, body: &T) -> Result<Self>
    where
        T: Serialize + ?Sized,
    {
        self.body = Some(codec::encode(body)?);
        self.content_type = ContentType::Json;
        Ok(self)
    }

    /// Sets a single-part multipart body with a freshly generated boundary.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the payload's names or mime type
    /// contain line breaks.
    pub fn multipart(mut self, payload: &MultipartPayload) -> Result<Self> {
        let boundary = generate_boundary();
        self.body = Some(payload.encode(&boundary)?);
        self.content_type = ContentType::MultipartFormData { boundary };
        Ok(self)
    }

    /// Builds the request.
    ///
    /// The URL is the plain concatenation of base URL and path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the concatenation is not a valid
    /// absolute URL, or [`Error::Configuration`] if the token cannot be sent
    /// as a header value.
    pub fn build(self) -> Result<Request> {
        let url = Url::parse(&format!("{}{}", self.base_url, self.path))?;

        let mut headers = HeaderMap::new();
        let content_type = HeaderValue::try_from(self.content_type.header_value())
            .map_err(|e| Error::Configuration(format!("Invalid header value: {}", e)))?;
        headers.insert(CONTENT_TYPE, content_type);

        if !self.token.is_empty() {
            let mut authorization = HeaderValue::try_from(format!("Bearer {}", self.token))
                .map_err(|e| Error::Configuration(format!("Invalid bearer token: {}", e)))?;
            authorization.set_sensitive(true);
            headers.insert(AUTHORIZATION, authorization);
        }

        Ok(Request {
            method: self.method,
            url,
            headers,
            body: self.body,
        })
    }
}
