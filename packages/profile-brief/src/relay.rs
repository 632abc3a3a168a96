//! HTTP client for the summarization relay.
//!
//! The relay is a stateless forwarder in front of the language-model
//! provider. It exposes three endpoints:
//!
//! - `POST /summarize` and `POST /web-summarize` take the profile payload
//!   and answer `{ "summary": .. }` or `{ "error": .. }`
//! - `POST /chat` takes `{ profile, question, useWebSearch }` and answers
//!   `{ "answer": .. }` or `{ "error": .. }`

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::{BriefingError, Result, ServiceError, ServiceResult};
use crate::traits::summarizer::Summarizer;
use crate::types::{
    chat::QuestionRequest,
    profile::{Profile, ProfilePayload},
};

/// Default relay address.
pub const DEFAULT_RELAY_URL: &str = "http://localhost:3001";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Summarization backend reached over HTTP.
#[derive(Clone)]
pub struct RelayClient {
    http_client: Client,
    base_url: Url,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatBody<'a> {
    profile: ProfilePayload<'a>,
    question: &'a str,
    use_web_search: bool,
}

/// Body shape shared by every relay response.
#[derive(Debug, Default, Deserialize)]
struct RelayReply {
    summary: Option<String>,
    answer: Option<String>,
    error: Option<String>,
}

impl RelayClient {
    /// Create a client for the relay at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a client with a custom per-request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| BriefingError::Config(format!("invalid relay url {base_url}: {e}")))?;

        // Endpoints are joined relative to the base path.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BriefingError::Config(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> ServiceResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ServiceError::Malformed(format!("bad endpoint {path}: {e}")))
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ServiceResult<RelayReply> {
        let url = self.endpoint(path)?;
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(path, error = %e, "Relay request failed");
                ServiceError::Unreachable(e.to_string())
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ServiceError::Unreachable(e.to_string()))?;

        debug!(
            path,
            status = %status,
            duration_ms = start.elapsed().as_millis(),
            "Relay response"
        );

        parse_reply(status, &text)
    }
}

/// Interpret a relay response body.
fn parse_reply(status: StatusCode, text: &str) -> ServiceResult<RelayReply> {
    let reply = serde_json::from_str::<RelayReply>(text);

    match reply {
        Ok(RelayReply {
            error: Some(message),
            ..
        }) => Err(ServiceError::Rejected {
            status: status.as_u16(),
            message,
        }),
        Ok(reply) if status.is_success() => Ok(reply),
        Ok(_) => Err(ServiceError::Rejected {
            status: status.as_u16(),
            message: status.to_string(),
        }),
        Err(_) if !status.is_success() => Err(ServiceError::Rejected {
            status: status.as_u16(),
            message: text.trim().to_string(),
        }),
        Err(e) => Err(ServiceError::Malformed(e.to_string())),
    }
}

#[async_trait]
impl Summarizer for RelayClient {
    async fn summarize(&self, profile: &Profile) -> ServiceResult<String> {
        self.post("summarize", &ProfilePayload::from(profile))
            .await?
            .summary
            .ok_or_else(|| ServiceError::Malformed("missing summary".into()))
    }

    async fn web_summarize(&self, profile: &Profile) -> ServiceResult<String> {
        self.post("web-summarize", &ProfilePayload::from(profile))
            .await?
            .summary
            .ok_or_else(|| ServiceError::Malformed("missing summary".into()))
    }

    async fn chat(&self, request: &QuestionRequest) -> ServiceResult<String> {
        let body = ChatBody {
            profile: ProfilePayload::from(&request.profile),
            question: &request.question,
            use_web_search: request.use_web_search,
        };

        self.post("chat", &body)
            .await?
            .answer
            .ok_or_else(|| ServiceError::Malformed("missing answer".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_is_rejection() {
        let err = parse_reply(StatusCode::OK, r#"{"error":"Bad profile payload."}"#).unwrap_err();
        assert_eq!(
            err,
            ServiceError::Rejected {
                status: 200,
                message: "Bad profile payload.".into()
            }
        );
    }

    #[test]
    fn test_non_json_failure_keeps_body() {
        let err = parse_reply(StatusCode::BAD_GATEWAY, "upstream down\n").unwrap_err();
        assert_eq!(
            err,
            ServiceError::Rejected {
                status: 502,
                message: "upstream down".into()
            }
        );
    }

    #[test]
    fn test_non_json_success_is_malformed() {
        let err = parse_reply(StatusCode::OK, "<html>").unwrap_err();
        assert!(matches!(err, ServiceError::Malformed(_)));
    }

    #[test]
    fn test_endpoint_joins_base() {
        let client = RelayClient::new(DEFAULT_RELAY_URL).unwrap();
        assert_eq!(
            client.endpoint("web-summarize").unwrap().as_str(),
            "http://localhost:3001/web-summarize"
        );
    }

    #[test]
    fn test_base_path_is_kept() {
        let client = RelayClient::new("http://relay.local/api").unwrap();
        assert_eq!(
            client.endpoint("chat").unwrap().as_str(),
            "http://relay.local/api/chat"
        );
    }

    #[test]
    fn test_invalid_base_is_config_error() {
        assert!(matches!(
            RelayClient::new("not a url"),
            Err(BriefingError::Config(_))
        ));
    }
}
