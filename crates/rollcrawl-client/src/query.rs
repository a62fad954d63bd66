use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use rollcrawl_core::error::CrawlError;
use rollcrawl_core::models::QueryKind;
use rollcrawl_core::traits::RollQuery;
use url::Url;
use url::form_urlencoded;

/// Host serving the dice log.
pub const DEFAULT_HOST: &str = "cydel.net";

/// Remote query client using reqwest.
///
/// Posts the lookup forms to `http://<host>/idlook.php` and
/// `http://<host>/dicelook.php`. Responses are gzip/deflate-negotiated and
/// decoded transparently. The HTTP status is logged but not interpreted: the
/// site reports missing rolls in the page body.
#[derive(Clone)]
pub struct ReqwestQuery {
    client: Client,
    base_url: Url,
    timeout_secs: u64,
}

impl ReqwestQuery {
    pub fn new(host: &str) -> Result<Self, CrawlError> {
        Self::with_timeout(host, Duration::from_secs(30))
    }

    /// `host` is either a bare host (`cydel.net`) or a base URL
    /// (`http://127.0.0.1:8080/`).
    pub fn with_timeout(host: &str, timeout: Duration) -> Result<Self, CrawlError> {
        let base_url = base_url(host)?;
        let client = Client::builder()
            .user_agent(concat!("rollcrawl/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| CrawlError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            timeout_secs: timeout.as_secs(),
        })
    }

    /// Full URL of the endpoint serving `kind`.
    pub fn endpoint(&self, kind: QueryKind) -> Result<Url, CrawlError> {
        self.base_url
            .join(kind.endpoint())
            .map_err(|e| CrawlError::ConfigError(format!("Invalid endpoint URL: {e}")))
    }
}

impl RollQuery for ReqwestQuery {
    async fn query(&self, kind: QueryKind, key: &str) -> Result<String, CrawlError> {
        let url = self.endpoint(kind)?;
        let body = encode_form(kind, key);

        let response = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CrawlError::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    CrawlError::NetworkError(format!("Connection failed: {e}"))
                } else {
                    CrawlError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), %url, %kind, "Non-success status, reading body anyway");
        }

        response
            .text()
            .await
            .map_err(|e| CrawlError::NetworkError(format!("Failed to read response body: {e}")))
    }
}

/// `application/x-www-form-urlencoded` body of a lookup form.
pub fn encode_form(kind: QueryKind, key: &str) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(kind.form_fields(key))
        .finish()
}

fn base_url(host: &str) -> Result<Url, CrawlError> {
    let raw = if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{host}")
    };
    let mut url =
        Url::parse(&raw).map_err(|e| CrawlError::ConfigError(format!("Invalid host '{host}': {e}")))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(CrawlError::ConfigError(format!(
                "URL scheme '{scheme}' is not allowed (only http/https)"
            )));
        }
    }

    // Url::join replaces the last segment unless the path ends with a slash.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
