//! HTTP client for the topper-api JSON API

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use topper_common::{Item, Locale, RatingValue};
use tracing::debug;
use uuid::Uuid;

const USER_AGENT: &str = concat!("topper-cli/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Largest page the server hands out
pub const MAX_PAGE: usize = 100;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limited, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("API error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
}

/// Error payload sent by the server
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    retry_after_seconds: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ItemList {
    items: Vec<Item>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RatingBody<'a> {
    item_id: &'a str,
    value: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RatedItem {
    pub id: String,
    pub score: i64,
}

/// Successful rating reply
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingReply {
    pub item: RatedItem,
    #[serde(default)]
    pub next_item: Option<Item>,
}

pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Newest items for `lang`, one full page
    pub async fn items(&self, lang: Locale) -> Result<Vec<Item>, ClientError> {
        let response = self
            .http
            .get(self.url("/api/items"))
            .query(&[("limit", MAX_PAGE.to_string()), ("lang", lang.to_string())])
            .send()
            .await?;
        let list: ItemList = check(response).await?.json().await?;
        debug!(count = list.items.len(), "Fetched items");
        Ok(list.items)
    }

    pub async fn leaderboard(&self, lang: Locale, limit: usize) -> Result<Vec<Item>, ClientError> {
        let response = self
            .http
            .get(self.url("/api/leaderboard"))
            .query(&[("limit", limit.to_string()), ("lang", lang.to_string())])
            .send()
            .await?;
        let list: ItemList = check(response).await?.json().await?;
        Ok(list.items)
    }

    pub async fn rate(
        &self,
        item_id: &str,
        value: RatingValue,
        user_id: Option<Uuid>,
        lang: Locale,
    ) -> Result<RatingReply, ClientError> {
        let body = RatingBody {
            item_id,
            value: value.as_i64(),
            user_id,
        };
        let response = self
            .http
            .post(self.url("/api/ratings"))
            .query(&[("lang", lang.to_string())])
            .json(&body)
            .send()
            .await?;
        let reply: RatingReply = check(response).await?.json().await?;
        debug!(item_id, score = reply.item.score, "Rating accepted");
        Ok(reply)
    }
}

/// Turn non-2xx responses into [`ClientError`]
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    Err(error_from_body(status, &text))
}

fn error_from_body(status: StatusCode, text: &str) -> ClientError {
    let body: ErrorBody = serde_json::from_str(text).unwrap_or_default();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return ClientError::RateLimited {
            retry_after_secs: body.retry_after_seconds.unwrap_or(60),
        };
    }

    ClientError::Api {
        status: status.as_u16(),
        code: body.error,
        message: if body.message.is_empty() {
            text.to_string()
        } else {
            body.message
        },
    }
}
