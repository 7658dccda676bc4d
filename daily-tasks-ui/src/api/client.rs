//! Row API Client
//!
//! Fetch and insert calls against the hosted row API, plus the connection
//! settings kept in local storage.

use daily_tasks::backend::rest_query::{
    auth_headers, error_message, list_url, rows_url, PREFER_RETURN_MINIMAL,
};
use daily_tasks::{Category, Entry, EntryDraft};
use gloo_net::http::{Request, RequestBuilder, Response};

/// Default backend URL
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:54321";

/// Default public API key; local development stacks accept an empty key
pub const DEFAULT_API_KEY: &str = "";

const URL_KEY: &str = "daily_tasks_backend_url";
const KEY_KEY: &str = "daily_tasks_anon_key";

const SCHEMA: &str = "public";
const TABLE: &str = "form_entries";

/// Where the entries live
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub url: String,
    pub api_key: String,
    pub schema: String,
    pub table: String,
}

fn stored(key: &str) -> Option<String> {
    let storage = web_sys::window()?.local_storage().ok()??;
    storage.get_item(key).ok().flatten()
}

/// Current settings: local storage first, then the defaults
pub fn settings() -> Settings {
    let url = stored(URL_KEY).unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
    Settings {
        // Normalize: remove trailing slash
        url: url.trim_end_matches('/').to_string(),
        api_key: stored(KEY_KEY).unwrap_or_else(|| DEFAULT_API_KEY.to_string()),
        schema: SCHEMA.to_string(),
        table: TABLE.to_string(),
    }
}

fn authorized(mut request: RequestBuilder, settings: &Settings) -> RequestBuilder {
    for (name, value) in auth_headers(&settings.api_key) {
        request = request.header(name, &value);
    }
    request
}

async fn check(response: Response) -> Result<Response, String> {
    if response.ok() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(error_message(status, &body))
}

/// Entries of one category, newest first
pub async fn fetch_entries(settings: &Settings, category: Category) -> Result<Vec<Entry>, String> {
    let url = list_url(&settings.url, &settings.table, category).map_err(|e| e.to_string())?;

    let response = authorized(Request::get(url.as_str()), settings)
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    check(response)
        .await?
        .json()
        .await
        .map_err(|e| format!("Parse error: {}", e))
}

/// Insert one entry; the new row comes back through the change feed
pub async fn insert_entry(settings: &Settings, draft: &EntryDraft) -> Result<(), String> {
    let url = rows_url(&settings.url, &settings.table).map_err(|e| e.to_string())?;

    let response = authorized(Request::post(url.as_str()), settings)
        .header("Prefer", PREFER_RETURN_MINIMAL)
        .json(&[draft])
        .map_err(|e| format!("Request build error: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    check(response).await.map(|_| ())
}
