use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::traits::CatalogClient;
use crate::config::LookupOptions;
use crate::error::{Error, Result};
use crate::record::{ItemId, RawItem};

/// JSON-over-HTTP catalog client.
///
/// Sends one POST per lookup to a catalog gateway. Credentials are forwarded
/// as-is; the gateway is responsible for signing upstream requests.
pub struct HttpCatalogClient {
    client: Client,
    /// Lookup endpoint (e.g., "http://localhost:8080/items/lookup")
    pub endpoint: String,
}

#[derive(Debug, Serialize)]
struct LookupRequest<'a> {
    item_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    associate_tag: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret_key: Option<&'a str>,
    response_group: &'a str,
    country: &'a str,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    items: Vec<RawItem>,
}

impl HttpCatalogClient {
    pub fn new(endpoint: String, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::ConfigInvalid {
                field: "catalog".to_string(),
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self { client, endpoint })
    }
}

/// Map a non-success status to the upstream error class.
fn classify_status(status: StatusCode, body: &str) -> Error {
    let message = format!("HTTP {status}: {body}");
    match status {
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::TOO_MANY_REQUESTS => {
            Error::UpstreamTransient(message)
        }
        _ => Error::UpstreamPermanent(message),
    }
}

fn classify_transport(e: &reqwest::Error) -> Error {
    if e.is_timeout() || e.is_connect() {
        Error::UpstreamTransient(e.to_string())
    } else {
        Error::UpstreamPermanent(e.to_string())
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn item_lookup(&self, id: &ItemId, options: &LookupOptions) -> Result<Vec<RawItem>> {
        let request = LookupRequest {
            item_id: id.as_str(),
            associate_tag: options.associate_tag.as_deref(),
            access_key: options.access_key.as_deref(),
            secret_key: options.secret_key.as_deref(),
            response_group: &options.response_group,
            country: &options.country,
        };

        debug!("Catalog lookup for {} at {}", id, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Request failed: {}", e);
                classify_transport(&e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Catalog error for {}: {} - {}", id, status, body);
            return Err(classify_status(status, &body));
        }

        let parsed = response
            .json::<LookupResponse>()
            .await
            .map_err(|e| Error::UpstreamPermanent(format!("undecodable catalog response: {e}")))?;

        Ok(parsed.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_and_rate_limited_are_transient() {
        assert!(classify_status(StatusCode::SERVICE_UNAVAILABLE, "").is_transient());
        assert!(classify_status(StatusCode::TOO_MANY_REQUESTS, "").is_transient());
    }

    #[test]
    fn test_client_errors_are_permanent() {
        for status in [
            StatusCode::FORBIDDEN,
            StatusCode::BAD_REQUEST,
            StatusCode::INTERNAL_SERVER_ERROR,
        ] {
            assert!(matches!(
                classify_status(status, "nope"),
                Error::UpstreamPermanent(_)
            ));
        }
    }

    #[test]
    fn test_request_omits_missing_credentials() {
        let options = LookupOptions::default();
        let request = LookupRequest {
            item_id: "B000ABC123",
            associate_tag: options.associate_tag.as_deref(),
            access_key: None,
            secret_key: None,
            response_group: &options.response_group,
            country: &options.country,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["item_id"], "B000ABC123");
        assert_eq!(json["country"], "en");
        assert!(json.get("secret_key").is_none());
    }

    #[test]
    fn test_response_without_items_is_empty() {
        let parsed: LookupResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.items.is_empty());
    }

    /// Endpoint on a port that was just released, so nothing is listening.
    fn closed_endpoint() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{port}/items/lookup")
    }

    #[tokio::test]
    async fn test_refused_connection_is_transient() {
        let client = HttpCatalogClient::new(closed_endpoint(), 5).unwrap();
        let id = ItemId::parse("B000ABC123").unwrap();
        let err = client
            .item_lookup(&id, &LookupOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_transient(), "unexpected error: {err}");
    }
}
