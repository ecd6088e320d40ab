//! HttpApiClient - reqwest による ApiClient 実装
//!
//! # 学習ポイント
//! - `Url::path_segments_mut` によるセグメント単位のパーセントエンコード
//! - `{ "data": ... }` エンベロープのジェネリックなデコード
//! - サーバのエラーメッセージ（status text）の取り出し

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::domain::{ApiError, GcJobStatus, NamespaceEntry, TaskStatus, Upid};
use crate::ports::{ApiClient, ApiPath};

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Server root, e.g. `https://pbs.example.com:8007`.
    pub base_url: String,
    /// API token in `user@realm!name:secret` form.
    pub api_token: Option<String>,
    pub timeout: Duration,
    pub verify_tls: bool,
    /// Node name used for task status lookups.
    pub node: String,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://localhost:8007".to_string(),
            api_token: None,
            timeout: Duration::from_secs(30),
            verify_tls: true,
            node: "localhost".to_string(),
            user_agent: concat!("gcwatch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: Url,
    config: HttpClientConfig,
}

impl HttpApiClient {
    pub fn new(config: HttpClientConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(config.base_url.clone()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Absolute URL of `path` below the configured server root.
    pub fn url_for(&self, path: &ApiPath) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .extend(path.segments());
        Ok(url)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: ApiPath,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let url = self.url_for(&path)?;
        debug!(%method, %path, "api request");

        let mut request = self.client.request(method, url);
        if let Some(token) = &self.config.api_token {
            request = request.header("Authorization", format!("PBSAPIToken={token}"));
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let envelope: DataEnvelope<T> = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(envelope.data)
    }
}

async fn status_error(response: Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    ApiError::Status {
        code: status.as_u16(),
        status_text: status_text(status, &body),
    }
}

/// Server message for a failed call: a JSON `message` field, else the plain
/// body, else the canonical reason phrase.
pub(crate) fn status_text(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            let message = message.trim();
            if !message.is_empty() {
                return message.to_string();
            }
        }
    } else if !body.is_empty() {
        return body.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn list_gc_jobs(&self) -> Result<Vec<GcJobStatus>, ApiError> {
        self.request(Method::GET, ApiPath::gc_status(), None).await
    }

    async fn start_gc(&self, store: &str) -> Result<Upid, ApiError> {
        self.request(Method::POST, ApiPath::start_gc(store), None)
            .await
    }

    async fn list_namespaces(&self, store: &str) -> Result<Vec<NamespaceEntry>, ApiError> {
        self.request(Method::GET, ApiPath::namespaces(store), None)
            .await
    }

    async fn update_gc_schedule(
        &self,
        store: &str,
        schedule: Option<&str>,
    ) -> Result<(), ApiError> {
        let body = match schedule {
            Some(schedule) => serde_json::json!({ "gc-schedule": schedule }),
            None => serde_json::json!({ "delete": ["gc-schedule"] }),
        };
        let _: IgnoredAny = self
            .request(Method::PUT, ApiPath::datastore_config(store), Some(body))
            .await?;
        Ok(())
    }

    async fn task_status(&self, upid: &Upid) -> Result<TaskStatus, ApiError> {
        self.request(
            Method::GET,
            ApiPath::task_status(&self.config.node, upid),
            None,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn client(base: &str) -> HttpApiClient {
        HttpApiClient::new(HttpClientConfig {
            base_url: base.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[rstest]
    #[case::bare_host("https://pbs.example.com:8007")]
    #[case::trailing_slash("https://pbs.example.com:8007/")]
    fn builds_urls_below_root(#[case] base: &str) {
        let url = client(base).url_for(&ApiPath::gc_status()).unwrap();
        assert_eq!(url.as_str(), "https://pbs.example.com:8007/api2/json/admin/gc");
    }

    #[test]
    fn keeps_reverse_proxy_prefix() {
        let url = client("https://proxy.example.com/pbs")
            .url_for(&ApiPath::start_gc("store1"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://proxy.example.com/pbs/api2/json/admin/datastore/store1/gc"
        );
    }

    #[test]
    fn percent_encodes_segments() {
        let url = client("https://pbs.example.com:8007")
            .url_for(&ApiPath::namespaces("my store/x"))
            .unwrap();
        assert_eq!(
            url.path(),
            "/api2/json/admin/datastore/my%20store%2Fx/namespace"
        );
    }

    #[test]
    fn rejects_unparsable_base_url() {
        let result = HttpApiClient::new(HttpClientConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
    }

    #[rstest]
    #[case::json_message(r#"{"data":null,"message":"datastore is busy\n"}"#, "datastore is busy")]
    #[case::plain_body("permission check failed", "permission check failed")]
    #[case::empty_body("", "Bad Request")]
    #[case::json_without_message(r#"{"data":null}"#, "Bad Request")]
    fn extracts_status_text(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(status_text(StatusCode::BAD_REQUEST, body), expected);
    }
}
