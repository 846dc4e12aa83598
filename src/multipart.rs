//! Single-part `multipart/form-data` bodies for file uploads.

use crate::{Error, Result};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

/// The form field name used when the caller does not pick one.
pub const DEFAULT_FIELD_NAME: &str = "file";

static BOUNDARY_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A file to upload as the only part of a multipart body.
///
/// # Examples
///
/// ```
/// use api_manager::MultipartPayload;
///
/// let payload = MultipartPayload::new(b"hello".to_vec(), "hello.txt", "text/plain");
/// assert_eq!(payload.field_name, "file");
///
/// let payload = payload.with_field_name("attachment");
/// assert_eq!(payload.field_name, "attachment");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartPayload {
    /// The form field name (`name=` in `Content-Disposition`).
    pub field_name: String,
    /// The file name (`filename=` in `Content-Disposition`).
    pub file_name: String,
    /// The part's `Content-Type`.
    pub mime_type: String,
    /// The raw file bytes.
    pub content: Vec<u8>,
}

impl MultipartPayload {
    /// Creates a payload using the default `"file"` field name.
    pub fn new(
        content: impl Into<Vec<u8>>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            field_name: DEFAULT_FIELD_NAME.to_string(),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            content: content.into(),
        }
    }

    /// Overrides the form field name.
    pub fn with_field_name(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = field_name.into();
        self
    }

    /// Encodes the payload as a complete multipart body delimited by `boundary`.
    ///
    /// Double quotes in the field and file names are sent as `%22`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the field name, file name or mime
    /// type contains a CR or LF.
    pub fn encode(&self, boundary: &str) -> Result<Vec<u8>> {
        let field_name = header_param("field name", &self.field_name)?;
        let file_name = header_param("file name", &self.file_name)?;
        reject_line_breaks("mime type", &self.mime_type)?;

        let head = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{file_name}\"\r\n\
             Content-Type: {}\r\n\
             \r\n",
            self.mime_type
        );
        let tail = format!("\r\n--{boundary}--\r\n");

        let mut body = Vec::with_capacity(head.len() + self.content.len() + tail.len());
        body.extend_from_slice(head.as_bytes());
        body.extend_from_slice(&self.content);
        body.extend_from_slice(tail.as_bytes());
        Ok(body)
    }
}

/// Escapes a quoted `Content-Disposition` parameter value.
fn header_param(what: &str, value: &str) -> Result<String> {
    reject_line_breaks(what, value)?;
    Ok(value.replace('"', "%22"))
}

fn reject_line_breaks(what: &str, value: &str) -> Result<()> {
    if value.contains(['\r', '\n']) {
        return Err(Error::Configuration(format!(
            "Invalid multipart {}: line breaks are not allowed",
            what
        )));
    }
    Ok(())
}

/// Generates a boundary no other call in this process has used.
///
/// The counter guarantees uniqueness within the process; the random suffix
/// keeps boundaries unpredictable across processes.
pub fn generate_boundary() -> String {
    let sequence = BOUNDARY_COUNTER.fetch_add(1, Ordering::Relaxed);
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect();
    format!("Boundary-{sequence:08x}{suffix}")
}
