//! Row API Client
//!
//! HTTP client for the hosted entry table.

use reqwest::{Client, RequestBuilder, Response};

use super::error::BackendError;
use super::rest_query::{auth_headers, error_message, list_url, rows_url, PREFER_RETURN_MINIMAL};
use super::BackendConfig;
use crate::entries::{Category, Entry, EntryDraft};

/// Client for the entry table
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    config: BackendConfig,
}

impl RestClient {
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        auth_headers(&self.config.api_key)
            .into_iter()
            .fold(request, |req, (name, value)| req.header(name, value))
    }

    /// All entries of one category, newest first
    pub async fn fetch_entries(&self, category: Category) -> Result<Vec<Entry>, BackendError> {
        let url = list_url(&self.config.url, &self.config.table, category)?;

        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(BackendError::from_request)?;

        let response = check_status(response).await?;
        let entries: Vec<Entry> = response.json().await.map_err(BackendError::Request)?;

        tracing::debug!(category = %category, count = entries.len(), "Fetched entries");
        Ok(entries)
    }

    /// Insert one draft. The backend assigns id and creation time; the new
    /// row is not returned.
    pub async fn insert_entry(&self, draft: &EntryDraft) -> Result<(), BackendError> {
        let url = rows_url(&self.config.url, &self.config.table)?;

        let response = self
            .authorized(self.client.post(url))
            .header("Prefer", PREFER_RETURN_MINIMAL)
            .json(&[draft])
            .send()
            .await
            .map_err(BackendError::from_request)?;

        check_status(response).await?;

        tracing::debug!(category = %draft.category, "Inserted entry");
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    Err(BackendError::Api {
        status: status.as_u16(),
        message: error_message(status.as_u16(), &text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client_keeps_config() {
        let config = BackendConfig {
            url: "https://abc.example.co".to_string(),
            api_key: "anon".to_string(),
            ..BackendConfig::default()
        };
        let client = RestClient::new(config).unwrap();
        assert_eq!(client.config().table, "form_entries");
        assert_eq!(client.config().schema, "public");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_an_error() {
        let config = BackendConfig {
            url: "http://127.0.0.1:9".to_string(),
            api_key: "anon".to_string(),
            request_timeout_secs: 2,
            ..BackendConfig::default()
        };
        let client = RestClient::new(config).unwrap();

        let result = client.fetch_entries(Category::Vishnu).await;
        assert!(result.is_err());
    }
}
