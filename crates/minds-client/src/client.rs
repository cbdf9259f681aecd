//! Main client implementation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use url::Url;

use crate::api::{CompletionsApi, DatasourcesApi, MindsApi};
use crate::error::{error_message, Error, Result};

/// Default service endpoint.
pub const DEFAULT_BASE_URL: &str = "https://mdb.ai";

/// Default project that minds live in.
pub const DEFAULT_PROJECT: &str = "mindsdb";

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for streaming requests.
const DEFAULT_STREAM_TIMEOUT: Duration = Duration::from_secs(300);

/// Minds API client.
///
/// Provides typed access to the datasource, mind and completion endpoints.
///
/// # Example
///
/// ```no_run
/// use minds_client::MindsClient;
///
/// # async fn example() -> minds_client::Result<()> {
/// let client = MindsClient::builder()
///     .api_key("secret")
///     .build()?;
///
/// let minds = client.minds().list().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MindsClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
struct ClientInner {
    /// HTTP client.
    http: reqwest::Client,
    /// Base URL for API requests.
    base_url: Url,
    /// Project that minds are scoped to.
    project: String,
    /// Request timeout.
    timeout: Duration,
    /// Streaming timeout.
    stream_timeout: Duration,
}

impl fmt::Debug for MindsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MindsClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("project", &self.inner.project)
            .finish_non_exhaustive()
    }
}

impl MindsClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client for the default service with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder().api_key(api_key).build()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Get the project minds are scoped to.
    pub fn project(&self) -> &str {
        &self.inner.project
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the datasources collection.
    pub fn datasources(&self) -> DatasourcesApi {
        DatasourcesApi::new(self.clone())
    }

    /// Access the minds collection.
    pub fn minds(&self) -> MindsApi {
        MindsApi::new(self.clone())
    }

    /// Access the chat completion endpoint.
    pub fn completions(&self) -> CompletionsApi {
        CompletionsApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL from path segments below `<base>/api/`.
    ///
    /// Each segment is percent-encoded on its own, so resource names may
    /// contain characters that are special in a path.
    pub(crate) fn url<S: AsRef<str>>(&self, segments: &[S]) -> Result<Url> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("cannot build paths on {}", self.inner.base_url)))?
            .pop_if_empty()
            .push("api")
            .extend(segments.iter().map(AsRef::as_ref));
        Ok(url)
    }

    /// Make a GET request.
    pub(crate) async fn get<T, S>(&self, segments: &[S]) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        S: AsRef<str>,
    {
        let url = self.url(segments)?;
        tracing::debug!(method = "GET", %url, "sending request");
        let response = self
            .send(self.inner.http.get(url), self.inner.timeout)
            .await?;
        Self::decode(response).await
    }

    /// Make a POST request.
    pub(crate) async fn post<T, B, S>(&self, segments: &[S], body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
        S: AsRef<str>,
    {
        let url = self.url(segments)?;
        tracing::debug!(method = "POST", %url, "sending request");
        let response = self
            .send(self.inner.http.post(url).json(body), self.inner.timeout)
            .await?;
        Self::decode(response).await
    }

    /// Make a POST request, discarding the response body.
    pub(crate) async fn post_unit<B, S>(&self, segments: &[S], body: &B) -> Result<()>
    where
        B: serde::Serialize + ?Sized,
        S: AsRef<str>,
    {
        let url = self.url(segments)?;
        tracing::debug!(method = "POST", %url, "sending request");
        self.send(self.inner.http.post(url).json(body), self.inner.timeout)
            .await?;
        Ok(())
    }

    /// Make a PATCH request, discarding the response body.
    pub(crate) async fn patch_unit<B, S>(&self, segments: &[S], body: &B) -> Result<()>
    where
        B: serde::Serialize + ?Sized,
        S: AsRef<str>,
    {
        let url = self.url(segments)?;
        tracing::debug!(method = "PATCH", %url, "sending request");
        self.send(self.inner.http.patch(url).json(body), self.inner.timeout)
            .await?;
        Ok(())
    }

    /// Make a DELETE request.
    pub(crate) async fn delete<S: AsRef<str>>(&self, segments: &[S]) -> Result<()> {
        let url = self.url(segments)?;
        tracing::debug!(method = "DELETE", %url, "sending request");
        self.send(self.inner.http.delete(url), self.inner.timeout)
            .await?;
        Ok(())
    }

    /// Make a POST request for streaming (returns the response directly).
    ///
    /// The caller owns the open connection through the returned response.
    pub(crate) async fn post_stream<B, S>(&self, segments: &[S], body: &B) -> Result<reqwest::Response>
    where
        B: serde::Serialize + ?Sized,
        S: AsRef<str>,
    {
        let url = self.url(segments)?;
        tracing::debug!(method = "POST", %url, "opening stream");
        let request = self
            .inner
            .http
            .post(url)
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
            .json(body);
        self.send(request, self.inner.stream_timeout).await
    }

    /// Send a request and turn non-success statuses into errors.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        timeout: Duration,
    ) -> Result<reqwest::Response> {
        let response = request.timeout(timeout).send().await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::extract_error(response).await)
        }
    }

    /// Decode a JSON response body.
    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Extract an error from a failed response.
    async fn extract_error(response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        tracing::debug!(status, %message, "request failed");
        Error::from_status(status, message)
    }
}

/// Builder for creating a MindsClient.
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    project: Option<String>,
    timeout: Duration,
    stream_timeout: Duration,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            project: None,
            timeout: DEFAULT_TIMEOUT,
            stream_timeout: DEFAULT_STREAM_TIMEOUT,
            user_agent: None,
        }
    }

    /// Set the base URL for the service (defaults to [`DEFAULT_BASE_URL`]).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the API key sent as a bearer token.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the project minds are scoped to (defaults to [`DEFAULT_PROJECT`]).
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the streaming request timeout.
    pub fn stream_timeout(mut self, timeout: Duration) -> Self {
        self.stream_timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<MindsClient> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = normalize_base_url(&base_url)?;

        // Build default headers
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(key) = &self.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|_| Error::Config("Invalid API key".to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("minds-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()?;

        let project = self
            .project
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_PROJECT.to_string());

        Ok(MindsClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                project,
                timeout: self.timeout,
                stream_timeout: self.stream_timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a base URL, dropping trailing slashes and a trailing `/api` segment.
fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(Error::Config(format!("{} cannot be used as a base URL", raw)));
    }

    let path = url.path().trim_end_matches('/');
    let path = path.strip_suffix("/api").unwrap_or(path);
    let path = format!("{}/", path);
    url.set_path(&path);
    Ok(url)
}
