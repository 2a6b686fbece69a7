//! Typed HTTP transport for the remote API.

mod auth;

pub use auth::{AuthResponse, NewAccount, RefreshResponse};

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::session::Session;
use crate::util::{compact_text, is_http_url, normalize_text_option};

/// List response envelope used by an endpoint.
///
/// The API serves bare arrays on some endpoints and `{data, pagination}`
/// envelopes on others, so unwrapping is configured per binding instead of
/// assumed globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListShape {
    /// `[DTO, ...]`
    Bare,
    /// `{data: [DTO, ...], pagination: {...}}`
    Paginated,
}

#[derive(Debug, Deserialize)]
pub struct ListEnvelope<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Pagination block of an envelope response. Decoded for diagnostics only;
/// the client does not walk pages.
#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub total: i64,
    #[serde(default, alias = "totalPages")]
    pub total_pages: i64,
}

/// Typed client for the remote API.
///
/// Owns the base URL and attaches bearer authorization from the session
/// context on every authenticated call.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    session: Session,
}

impl ApiClient {
    /// Build a client for the given base URL.
    ///
    /// The URL must carry an http/https scheme; a trailing slash is trimmed
    /// so paths can always start with `/`.
    pub fn new(base_url: impl Into<String>, session: Session) -> Result<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        Ok(Self {
            base_url,
            http: reqwest::Client::builder().build()?,
            session,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.request(Method::GET, path, None, true).await?;
        decode(&body)
    }

    /// GET a list endpoint, unwrapping the envelope the binding declares.
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        shape: ListShape,
    ) -> Result<Vec<T>> {
        let body = self.request(Method::GET, path, None, true).await?;
        match shape {
            ListShape::Bare => decode(&body),
            ListShape::Paginated => {
                let envelope: ListEnvelope<T> = decode(&body)?;
                if let Some(pagination) = &envelope.pagination {
                    if pagination.total_pages > 1 {
                        tracing::debug!(
                            total = pagination.total,
                            pages = pagination.total_pages,
                            "server reports more pages than fetched"
                        );
                    }
                }
                Ok(envelope.data)
            }
        }
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let body = self.request(Method::POST, path, Some(body), true).await?;
        decode(&body)
    }

    /// PUT where the response body is irrelevant; update endpoints answer
    /// with the stored record or with nothing.
    pub async fn put(&self, path: &str, body: &serde_json::Value) -> Result<()> {
        self.request(Method::PUT, path, Some(body), true).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.request(Method::DELETE, path, None, true).await?;
        Ok(())
    }

    /// POST without bearer authorization, for login/register/refresh.
    pub(crate) async fn post_unauthenticated<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let body = self.request(Method::POST, path, Some(body), false).await?;
        decode(&body)
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        authenticated: bool,
    ) -> Result<String> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self
            .http
            .request(method, &url)
            .header("Accept", "application/json");
        if authenticated {
            if let Some(token) = self.session.token() {
                request = request.bearer_auth(token);
            }
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response.text().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Error::Api {
                status: status.as_u16(),
                message: parse_api_error(status, &body),
            })
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body)
        .map_err(|error| Error::Decoding(format!("{error}; body: {}", compact_text(body))))
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    // both observed error shapes carry a top-level message
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message {
            let message = message.trim();
            if !message.is_empty() {
                return message.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("server returned status {}", status.as_u16())
    } else {
        compact_text(trimmed)
    }
}

fn normalize_base_url(raw: String) -> Result<String> {
    let url = normalize_text_option(Some(raw))
        .ok_or_else(|| Error::InvalidUrl("base URL must not be empty".to_string()))?;
    if is_http_url(&url) {
        Ok(url.trim_end_matches('/').to_string())
    } else {
        Err(Error::InvalidUrl(
            "base URL must include http:// or https://".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{ActiveSession, MemoryVault, UserProfile};
    use crate::models::RemoteId;
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn signed_out_session() -> Session {
        Session::new(Arc::new(MemoryVault::new()))
    }

    fn signed_in_session(token: &str) -> Session {
        let session = signed_out_session();
        session
            .activate(ActiveSession {
                token: token.to_string(),
                refresh_token: None,
                profile: UserProfile {
                    remote_id: RemoteId::new(1),
                    email: "t@example.com".to_string(),
                    display_name: None,
                },
            })
            .unwrap();
        session
    }

    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct Item {
        id: i64,
        name: String,
    }

    #[test]
    fn normalize_base_url_rejects_invalid_values() {
        assert!(normalize_base_url(String::new()).is_err());
        assert!(normalize_base_url("api.example.com".to_string()).is_err());
        assert_eq!(
            normalize_base_url("https://api.example.com/".to_string()).unwrap(),
            "https://api.example.com"
        );
    }

    #[test]
    fn parse_api_error_reads_both_body_shapes() {
        let nested = r#"{"message":"name taken","error":{"statusCode":409,"isOperational":true,"status":"fail"}}"#;
        assert_eq!(
            parse_api_error(StatusCode::CONFLICT, nested),
            "name taken"
        );

        let flat = r#"{"status":"error","message":"bad token"}"#;
        assert_eq!(parse_api_error(StatusCode::UNAUTHORIZED, flat), "bad token");
    }

    #[test]
    fn parse_api_error_falls_back_to_status() {
        assert_eq!(
            parse_api_error(StatusCode::BAD_GATEWAY, ""),
            "server returned status 502"
        );
        assert_eq!(
            parse_api_error(StatusCode::INTERNAL_SERVER_ERROR, "<html>boom</html>"),
            "<html>boom</html>"
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn get_list_decodes_bare_array() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/teams");
                then.status(200)
                    .json_body(json!([{"id": 1, "name": "La Dolfina"}]));
            })
            .await;

        let client = ApiClient::new(server.base_url(), signed_out_session()).unwrap();
        let items: Vec<Item> = client.get_list("/api/teams", ListShape::Bare).await.unwrap();
        mock.assert_async().await;
        assert_eq!(
            items,
            vec![Item {
                id: 1,
                name: "La Dolfina".to_string()
            }]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn get_decodes_single_record() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/tournaments/7");
                then.status(200)
                    .json_body(json!({"id": 7, "name": "Spring Cup"}));
            })
            .await;

        let client = ApiClient::new(server.base_url(), signed_out_session()).unwrap();
        let item: Item = client.get("/api/tournaments/7").await.unwrap();
        mock.assert_async().await;
        assert_eq!(item.id, 7);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn get_list_unwraps_paginated_envelope() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/tournaments");
                then.status(200).json_body(json!({
                    "data": [{"id": 7, "name": "Spring Cup"}],
                    "pagination": {"page": 1, "limit": 50, "total": 1, "totalPages": 1}
                }));
            })
            .await;

        let client = ApiClient::new(server.base_url(), signed_out_session()).unwrap();
        let items: Vec<Item> = client
            .get_list("/api/tournaments", ListShape::Paginated)
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 7);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn authenticated_calls_attach_bearer_token() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/players")
                    .header("authorization", "Bearer tok-9");
                then.status(200).json_body(json!([]));
            })
            .await;

        let client = ApiClient::new(server.base_url(), signed_in_session("tok-9")).unwrap();
        let items: Vec<Item> = client
            .get_list("/api/players", ListShape::Bare)
            .await
            .unwrap();
        mock.assert_async().await;
        assert!(items.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn non_success_status_becomes_api_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/horses");
                then.status(404)
                    .json_body(json!({"message": "no such horse"}));
            })
            .await;

        let client = ApiClient::new(server.base_url(), signed_out_session()).unwrap();
        let result: Result<Vec<Item>> = client.get_list("/api/horses", ListShape::Bare).await;
        match result {
            Err(Error::Api { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "no such horse");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn mismatched_body_becomes_decoding_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/breeders");
                then.status(200).json_body(json!({"surprise": true}));
            })
            .await;

        let client = ApiClient::new(server.base_url(), signed_out_session()).unwrap();
        let result: Result<Vec<Item>> = client.get_list("/api/breeders", ListShape::Bare).await;
        assert!(matches!(result, Err(Error::Decoding(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_accepts_empty_no_content_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/teams/4");
                then.status(204);
            })
            .await;

        let client = ApiClient::new(server.base_url(), signed_out_session()).unwrap();
        client.delete("/api/teams/4").await.unwrap();
    }
}
