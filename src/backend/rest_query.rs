//! Row API request shapes
//!
//! URL and header construction for the hosted row API (PostgREST dialect).
//! Shared by the native HTTP client and the browser front-end.

use serde::Deserialize;
use url::Url;

use crate::entries::Category;

/// Path prefix of the row API
pub const REST_PREFIX: &str = "rest/v1";

/// `Prefer` header value asking the backend not to echo inserted rows
pub const PREFER_RETURN_MINIMAL: &str = "return=minimal";

/// Column the list is ordered by
pub const ORDER_COLUMN: &str = "created_at";

/// Endpoint of the entry table: `{base}/rest/v1/{table}`
pub fn rows_url(base_url: &str, table: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        REST_PREFIX,
        table
    ))
}

/// All rows of one category, newest first
pub fn list_url(base_url: &str, table: &str, category: Category) -> Result<Url, url::ParseError> {
    let mut url = rows_url(base_url, table)?;
    url.query_pairs_mut()
        .append_pair("select", "*")
        .append_pair("category", &format!("eq.{}", category.tag()))
        .append_pair("order", &format!("{}.desc", ORDER_COLUMN));
    Ok(url)
}

/// Headers every row API call carries
pub fn auth_headers(api_key: &str) -> [(&'static str, String); 2] {
    [
        ("apikey", api_key.to_string()),
        ("Authorization", format!("Bearer {}", api_key)),
    ]
}

/// Error body returned by the row API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

/// Best human-readable message for a failed call
pub fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody {
            message: Some(message),
            ..
        }) => message,
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => format!("Request failed with status {}", status),
    }
}
