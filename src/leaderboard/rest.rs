use reqwest::{
    blocking::{Client, Response},
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, trace};

use super::{LeaderboardEntry, ScoreStore};
use crate::config::StoreConfig;
use crate::error::StoreError;

// Standard User-Agent: name/version
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A hosted PostgREST-style backend, reached over blocking HTTP.
///
/// Tables are addressed as `{url}/rest/v1/{table}`; every request carries the
/// project API key both as `apikey` and as a bearer token.
#[derive(Debug, Clone)]
pub struct RestScoreStore {
    client: Client,
    base_url: String,
    scores_table: String,
    participants_table: String,
}

#[derive(Serialize)]
struct NewScore<'a> {
    username: &'a str,
    score: u32,
}

impl RestScoreStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| StoreError::Unavailable("API key is not a valid header value".to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| StoreError::Unavailable("API key is not a valid header value".to_string()))?;
        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            scores_table: config.scores_table.clone(),
            participants_table: config.participants_table.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        table_url(&self.base_url, table)
    }

    fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
        let status = response.status();
        let body = response.text()?;
        trace!(%status, body_length = body.len(), "Store response");
        decode_body(status, &body)
    }
}

fn table_url(base_url: &str, table: &str) -> String {
    format!("{base_url}/rest/v1/{table}")
}

/// A case-insensitive exact-match filter. `_` and `%` are LIKE wildcards, so they are escaped.
fn username_filter(username: &str) -> String {
    let mut pattern = String::with_capacity(username.len() + 6);
    pattern.push_str("ilike.");
    for c in username.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern
}

/// Turns a store response into `T`, keeping non-success statuses and their bodies as errors.
fn decode_body<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, StoreError> {
    if !status.is_success() {
        return Err(StoreError::Status {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }
    Ok(serde_json::from_str(body)?)
}

impl ScoreStore for RestScoreStore {
    fn save_score(&self, username: &str, score: u32) -> Result<LeaderboardEntry, StoreError> {
        debug!(username, score, "Submitting score");
        let response = self
            .client
            .post(self.table_url(&self.scores_table))
            .header("Prefer", "return=representation")
            .json(&NewScore { username, score })
            .send()?;

        let mut rows: Vec<LeaderboardEntry> = Self::read_json(response)?;
        rows.pop()
            .ok_or_else(|| StoreError::Unavailable("store returned no row for the saved score".to_string()))
    }

    fn top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let response = self
            .client
            .get(self.table_url(&self.scores_table))
            .query(&[
                ("select", "username,score,created_at".to_string()),
                ("order", "score.desc,created_at.asc".to_string()),
                ("limit", limit.to_string()),
            ])
            .send()?;

        Self::read_json(response)
    }

    fn username_exists(&self, username: &str) -> Result<bool, StoreError> {
        let response = self
            .client
            .get(self.table_url(&self.participants_table))
            .query(&[
                ("select", "username".to_string()),
                ("username", username_filter(username)),
                ("limit", "1".to_string()),
            ])
            .send()?;

        let matches: Vec<serde_json::Value> = Self::read_json(response)?;
        Ok(!matches.is_empty())
    }
}
