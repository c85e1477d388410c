use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::WalletApi;
use super::model::{
    AddKeyRequest, AddKeyResponse, CategoryId, EditKeyRequest, EmptyBody, KeyId, KeyResponse,
    SuccessResponse, UpdateCategoryRequest, WalletListing,
};
use crate::config::ServerConfig;

/// A request to the wallet server that did not produce a readable JSON body.
///
/// Timeouts, connection failures and non-JSON bodies are all the same kind
/// of failure for the client; the variants only keep the cause for logging.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {path} failed: {source}")]
    Request {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("response from {path} is not valid JSON: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

fn key_path(route: &str, id: KeyId) -> String {
    format!("/{route}/{id}")
}

/// [`WalletApi`] over HTTP.
#[derive(Clone, Debug)]
pub struct HttpWalletClient {
    client: Client,
    base_url: String,
}

impl HttpWalletClient {
    pub fn new(config: &ServerConfig) -> color_eyre::Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.session_cookie {
            let mut value = HeaderValue::from_str(cookie)?;
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post<B, R>(&self, path: String, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        debug!(%path, "POST");
        let response = self.client.post(self.url(&path)).json(body).send().await;
        Self::decode(path, response).await
    }

    async fn get<R: DeserializeOwned>(&self, path: String) -> Result<R, ApiError> {
        debug!(%path, "GET");
        let response = self.client.get(self.url(&path)).send().await;
        Self::decode(path, response).await
    }

    /// Reads the body as JSON whatever the status code; error payloads are
    /// interpreted by the caller's response type.
    async fn decode<R: DeserializeOwned>(
        path: String,
        response: reqwest::Result<reqwest::Response>,
    ) -> Result<R, ApiError> {
        let body = match response {
            Ok(response) => response.text().await,
            Err(source) => Err(source),
        };
        let body = match body {
            Ok(body) => body,
            Err(source) => return Err(ApiError::Request { path, source }),
        };
        serde_json::from_str(&body).map_err(|source| ApiError::Decode { path, source })
    }
}

#[async_trait]
impl WalletApi for HttpWalletClient {
    async fn list_keys(&self) -> Result<WalletListing, ApiError> {
        self.get("/get_categories_and_keys".to_string()).await
    }

    async fn add_key(
        &self,
        key_name: &str,
        api_key: &str,
        category: CategoryId,
    ) -> Result<AddKeyResponse, ApiError> {
        let body = AddKeyRequest {
            key_name,
            api_key,
            category,
        };
        self.post("/add_key".to_string(), &body).await
    }

    async fn get_key(&self, id: KeyId) -> Result<KeyResponse, ApiError> {
        self.post(key_path("get_key", id), &EmptyBody {}).await
    }

    async fn copy_key(&self, id: KeyId) -> Result<KeyResponse, ApiError> {
        self.post(key_path("copy_key", id), &EmptyBody {}).await
    }

    async fn edit_key(&self, id: KeyId, key_name: &str) -> Result<SuccessResponse, ApiError> {
        self.post(key_path("edit_key", id), &EditKeyRequest { key_name })
            .await
    }

    async fn delete_key(&self, id: KeyId) -> Result<SuccessResponse, ApiError> {
        self.post(key_path("delete_key", id), &EmptyBody {}).await
    }

    async fn update_key_category(
        &self,
        id: KeyId,
        category_id: CategoryId,
    ) -> Result<SuccessResponse, ApiError> {
        self.post(
            key_path("update_key_category", id),
            &UpdateCategoryRequest { category_id },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_routes_embed_the_id() {
        assert_eq!(key_path("get_key", KeyId(42)), "/get_key/42");
        assert_eq!(
            key_path("update_key_category", KeyId(7)),
            "/update_key_category/7"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_ignored() {
        let client = HttpWalletClient::new(&ServerConfig {
            base_url: "http://localhost:5000/".to_string(),
            ..ServerConfig::default()
        })
        .unwrap();
        assert_eq!(client.url("/get_key/1"), "http://localhost:5000/get_key/1");
    }

    #[test]
    fn invalid_cookie_is_rejected_at_construction() {
        let config = ServerConfig {
            session_cookie: Some("session=\nabc".to_string()),
            ..ServerConfig::default()
        };
        assert!(HttpWalletClient::new(&config).is_err());
    }
}
