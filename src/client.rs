//! The API client facade.
//!
//! [`ApiClient`] owns a base URL and an in-memory bearer token and exposes one
//! `async fn` per HTTP verb. Use [`ClientBuilder`] to configure and create
//! clients.
//!
//! # Token hydration
//!
//! Construction starts a background read of the `"token"` key from the
//! credential store and returns immediately. Requests issued before that read
//! completes are sent **without** a token. Await [`ApiClient::ready`] first if
//! an early request must be authenticated.
//!
//! The read always overwrites the in-memory token when it finishes, with the
//! stored value or with `""` if nothing is stored. A [`ApiClient::set_token`]
//! issued before that point is lost; call it after `ready()`.

use crate::credential::{CredentialStore, MemoryCredentialStore, SecureStorage};
use crate::multipart::MultipartPayload;
use crate::request::RequestBuilder;
use crate::transport::{ReqwestTransport, Transport, DEFAULT_TIMEOUT};
use crate::{Error, RawResponse, Request, Result};
use http::Method;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::watch;

/// The credential store key the bearer token is read from.
pub const TOKEN_KEY: &str = "token";

/// A JSON API client with bearer-token authentication.
///
/// The client is cheap to clone; clones share the token and transport.
///
/// # Examples
///
/// ```no_run
/// use api_manager::ApiClient;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize)]
/// struct CreateEmployee {
///     name: String,
///     salary: String,
///     age: String,
/// }
///
/// #[derive(Deserialize)]
/// struct Created {
///     status: String,
/// }
///
/// # async fn example() -> Result<(), api_manager::Error> {
/// let client = ApiClient::new("https://dummy.restapiexample.com", "MyService")?;
/// client.ready().await;
///
/// let employees: serde_json::Value = client.get("/api/v1/employees").await?;
/// println!("{}", employees);
///
/// let body = CreateEmployee {
///     name: "test".to_string(),
///     salary: "123".to_string(),
///     age: "23".to_string(),
/// };
/// let created: Created = client.post("/api/v1/create", &body).await?;
/// println!("{}", created.status);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    base_url: String,
    token: RwLock<String>,
    storage: SecureStorage,
    transport: Arc<dyn Transport>,
    hydrated: watch::Receiver<bool>,
}

impl ApiClient {
    /// Creates a client with the default transport and an in-memory
    /// credential store.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] outside a tokio runtime or if the
    /// HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, service_name: impl Into<String>) -> Result<Self> {
        Self::builder()
            .base_url(base_url)
            .service_name(service_name)
            .build()
    }

    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The base URL every path is appended to.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Returns the current bearer token; empty if none.
    pub fn token(&self) -> String {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the in-memory bearer token.
    ///
    /// Until [`ApiClient::ready`] resolves, hydration may still overwrite the
    /// value set here.
    ///
    /// This does not write to the credential store; use
    /// [`ApiClient::storage`] to persist it.
    pub fn set_token(&self, token: impl Into<String>) {
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token.into();
    }

    /// The credential storage the token was hydrated from.
    pub fn storage(&self) -> &SecureStorage {
        &self.inner.storage
    }

    /// Returns `true` once the background token read has finished.
    pub fn is_hydrated(&self) -> bool {
        *self.inner.hydrated.borrow()
    }

    /// Waits for the background token read to finish.
    ///
    /// Returns immediately if it already has.
    pub async fn ready(&self) {
        let mut hydrated = self.inner.hydrated.clone();
        // Err only if the hydration task was dropped; there is nothing left to wait for.
        let _ = hydrated.wait_for(|done| *done).await;
    }

    /// Makes a GET request and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// See [`Error`]; only a `200` response is a success.
    pub async fn get<Res>(&self, path: &str) -> Result<Res>
    where
        Res: DeserializeOwned,
    {
        let request = self.request(Method::GET, path).build()?;
        self.send(request).await?.into_json()
    }

    /// Makes a POST request without a body and decodes the JSON response.
    pub async fn post_empty<Res>(&self, path: &str) -> Result<Res>
    where
        Res: DeserializeOwned,
    {
        let request = self.request(Method::POST, path).build()?;
        self.send(request).await?.into_json()
    }

    /// Makes a POST request with a JSON body and decodes the JSON response.
    pub async fn post<Req, Res>(&self, path: &str, body: &Req) -> Result<Res>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        self.call_with_body(Method::POST, path, body).await
    }

    /// Makes a PUT request with a JSON body and decodes the JSON response.
    pub async fn put<Req, Res>(&self, path: &str, body: &Req) -> Result<Res>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        self.call_with_body(Method::PUT, path, body).await
    }

    /// Makes a PATCH request with a JSON body and decodes the JSON response.
    pub async fn patch<Req, Res>(&self, path: &str, body: &Req) -> Result<Res>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        self.call_with_body(Method::PATCH, path, body).await
    }

    /// Makes a DELETE request and decodes the JSON response.
    pub async fn delete<Res>(&self, path: &str) -> Result<Res>
    where
        Res: DeserializeOwned,
    {
        let request = self.request(Method::DELETE, path).build()?;
        self.send(request).await?.into_json()
    }

    /// Uploads a file as a single-part `multipart/form-data` POST.
    ///
    /// `parameter_name` defaults to `"file"`. On `200` the raw response body
    /// is returned undecoded.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example(client: api_manager::ApiClient) -> Result<(), api_manager::Error> {
    /// let png = std::fs::read("avatar.png").unwrap_or_default();
    /// let body = client
    ///     .upload("/v1/avatar", png, "avatar.png", "image/png", None)
    ///     .await?;
    /// println!("server replied with {} bytes", body.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn upload(
        &self,
        path: &str,
        file: impl Into<Vec<u8>>,
        file_name: &str,
        mime_type: &str,
        parameter_name: Option<&str>,
    ) -> Result<Vec<u8>> {
        let mut payload = MultipartPayload::new(file, file_name, mime_type);
        if let Some(name) = parameter_name {
            payload = payload.with_field_name(name);
        }
        self.upload_payload(path, &payload).await
    }

    /// Uploads a prepared [`MultipartPayload`].
    pub async fn upload_payload(&self, path: &str, payload: &MultipartPayload) -> Result<Vec<u8>> {
        let request = self.request(Method::POST, path).multipart(payload)?.build()?;
        self.send(request).await?.into_bytes()
    }

    async fn call_with_body<Req, Res>(&self, method: Method, path: &str, body: &Req) -> Result<Res>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let request = self.request(method, path).json(body)?.build()?;
        self.send(request).await?.into_json()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        RequestBuilder::new(method, self.inner.base_url.as_str(), path).bearer_token(self.token())
    }

    /// Sends a request, mapping transport failures to `InvalidResponse`.
    async fn send(&self, request: Request) -> Result<RawResponse> {
        let method = request.method.clone();
        let url = request.url.clone();

        tracing::debug!(
            method = %method,
            url = %url,
            authenticated = request.headers.contains_key(http::header::AUTHORIZATION),
            "Executing HTTP request"
        );

        match self.inner.transport.send(request).await {
            Ok(response) => {
                tracing::info!(
                    method = %method,
                    url = %url,
                    status = response.status,
                    "Received HTTP response"
                );
                Ok(response)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    method = %method,
                    url = %url,
                    "Request failed without a response"
                );
                Err(Error::InvalidResponse)
            }
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("service", &self.inner.storage.service())
            .field("hydrated", &self.is_hydrated())
            .finish_non_exhaustive()
    }
}

/// Builder for configuring and creating an [`ApiClient`].
///
/// # Examples
///
/// ```no_run
/// use api_manager::{ApiClient, MemoryCredentialStore};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), api_manager::Error> {
/// let client = ApiClient::builder()
///     .base_url("https://api.example.com")
///     .service_name("MyService")
///     .credential_store(Arc::new(MemoryCredentialStore::new()))
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    base_url: Option<String>,
    service_name: String,
    credential_store: Option<Arc<dyn CredentialStore>>,
    transport: Option<Arc<dyn Transport>>,
    timeout: Duration,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            base_url: None,
            service_name: String::new(),
            credential_store: None,
            transport: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the base URL. Paths are appended to it verbatim; it is validated
    /// per request, not here.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the credential store service name the token is read under.
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Sets the credential store. Defaults to an empty [`MemoryCredentialStore`].
    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credential_store = Some(store);
        self
    }

    /// Sets a custom transport. The timeout setting is then ignored.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the request timeout of the default transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the client and starts hydrating the token in the background.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if no base URL was provided, if called
    /// outside a tokio runtime, or if the default transport cannot be built.
    pub fn build(self) -> Result<ApiClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Configuration("Base URL is required".to_string()))?;

        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            Error::Configuration(format!("ApiClient must be built inside a tokio runtime: {}", e))
        })?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(self.timeout)?),
        };

        let store = self
            .credential_store
            .unwrap_or_else(|| Arc::new(MemoryCredentialStore::new()));
        let storage = SecureStorage::new(self.service_name, store);

        let (hydrated_tx, hydrated_rx) = watch::channel(false);
        let inner = Arc::new(ClientInner {
            base_url,
            token: RwLock::new(String::new()),
            storage,
            transport,
            hydrated: hydrated_rx,
        });

        let hydrating = inner.clone();
        runtime.spawn(async move {
            let token = hydrating
                .storage
                .get_string(TOKEN_KEY)
                .await
                .unwrap_or_default();
            tracing::debug!(
                service = %hydrating.storage.service(),
                found = !token.is_empty(),
                "Hydrated bearer token"
            );
            *hydrating
                .token
                .write()
                .unwrap_or_else(PoisonError::into_inner) = token;
            hydrated_tx.send_replace(true);
        });

        Ok(ApiClient { inner })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
