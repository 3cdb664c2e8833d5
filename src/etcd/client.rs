// etcd-dump/src/etcd/client.rs
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{WriteRequest, keys_url};
use crate::config::EtcdConfig;
use crate::errors::{AppError, Result};

/// Error body returned by the v2 API, e.g.
/// `{"errorCode":100,"message":"Key not found","cause":"/a","index":7}`.
#[derive(Debug, Deserialize)]
struct EtcdErrorBody {
    #[serde(rename = "errorCode")]
    error_code: u64,
    message: String,
    #[serde(default)]
    cause: Option<String>,
}

/// HTTP client bound to one etcd endpoint.
#[derive(Debug, Clone)]
pub struct EtcdClient {
    http: Client,
    base: Url,
}

impl EtcdClient {
    /// Certificate verification follows `config.verify_tls`, which is off
    /// unless asked for so that self-signed internal endpoints work.
    pub fn new(config: &EtcdConfig) -> Result<Self> {
        let mut builder = Client::builder().danger_accept_invalid_certs(!config.verify_tls);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base: config.url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Fetches the whole key tree with `GET /v2/keys/?recursive=true`.
    pub async fn fetch_tree(&self) -> Result<serde_json::Value> {
        let mut url = keys_url(&self.base, "/")?;
        url.set_query(Some("recursive=true"));
        debug!(%url, "fetching key tree");

        let response = self.http.get(url).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Sends one write and returns the raw response body.
    pub async fn put(&self, request: WriteRequest) -> Result<String> {
        debug!(key = %request.key, url = %request.url, "writing key");
        let response = self
            .http
            .put(request.url)
            .form(&request.form.pairs())
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.text().await?)
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(match serde_json::from_str::<EtcdErrorBody>(&body) {
        Ok(error) => AppError::Etcd {
            status,
            code: Some(error.error_code),
            message: error.message,
            cause: error.cause,
        },
        Err(_) => AppError::Etcd {
            status,
            code: None,
            message: if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body.trim().to_string()
            },
            cause: None,
        },
    })
}
