//! # api-manager - a thin JSON API client
//!
//! `api-manager` issues JSON requests against a single backend, attaches a
//! bearer token when one is set, uploads files as `multipart/form-data`, and
//! reads the token from a secure credential store at start-up.
//!
//! ## Quick Start
//!
//! ```no_run
//! use api_manager::ApiClient;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize)]
//! struct CreateEmployee {
//!     name: String,
//!     salary: String,
//!     age: String,
//! }
//!
//! #[derive(Deserialize)]
//! struct Employees {
//!     data: Vec<Employee>,
//! }
//!
//! #[derive(Deserialize)]
//! struct Employee {
//!     id: u64,
//!     employee_name: String,
//! }
//!
//! #[derive(Deserialize)]
//! struct Created {
//!     status: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), api_manager::Error> {
//!     let client = ApiClient::new("https://dummy.restapiexample.com", "MyService")?;
//!
//!     // The stored token is read in the background; wait for it before
//!     // making authenticated calls.
//!     client.ready().await;
//!
//!     let employees: Employees = client.get("/api/v1/employees").await?;
//!     for employee in &employees.data {
//!         println!("{}: {}", employee.id, employee.employee_name);
//!     }
//!
//!     let body = CreateEmployee {
//!         name: "test".to_string(),
//!         salary: "123".to_string(),
//!         age: "23".to_string(),
//!     };
//!     let created: Created = client.post("/api/v1/create", &body).await?;
//!     println!("{}", created.status);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Success criterion
//!
//! Only an exact `200 OK` counts as success. Every other status, including
//! `201 Created` and `204 No Content`, is reported as
//! [`Error::InvalidStatusCode`] together with its [`StatusCategory`].
//!
//! ## Known hazard: token hydration
//!
//! [`ApiClient::new`] returns before the stored token has been read. Requests
//! made in that window go out unauthenticated. When the read finishes it
//! replaces the in-memory token with the stored value, or with `""` if the
//! store holds none, so an earlier [`ApiClient::set_token`] is discarded.
//! Await [`ApiClient::ready`] before relying on either.
//!
//! ## Dates
//!
//! Backend dates look like `2024-03-22T10:15:30.123+0000`. Annotate fields
//! with `#[serde(with = "api_manager::date::backend_date")]`.

mod client;
pub mod codec;
pub mod credential;
pub mod date;
mod error;
pub mod multipart;
mod request;
mod response;
mod status;
pub mod transport;

pub use client::{ApiClient, ClientBuilder, TOKEN_KEY};
pub use credential::{CredentialStore, MemoryCredentialStore, SecureStorage};
pub use error::{Error, Result};
pub use multipart::MultipartPayload;
pub use request::{ContentType, Request, RequestBuilder, APPLICATION_JSON};
pub use response::RawResponse;
pub use status::StatusCategory;
pub use transport::{ReqwestTransport, Transport, TransportError};
