//! HTTP transport for catalog requests.
//!
//! The catalog service talks to the network only through the [`Transport`]
//! trait, so it can be driven by a mock in tests. [`HttpClient`] is the
//! `reqwest` implementation used in production.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::error::{Error, Result};

/// User agent sent with every request.
pub const USER_AGENT: &str = "RSIBrowser";

/// Future type for raw byte fetches.
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>>;

/// Future type for JSON fetches.
pub type JsonFuture<'a> = Pin<Box<dyn Future<Output = Result<Value>> + Send + 'a>>;

/// A name/value pair used for query parameters and headers.
pub type Pair<'a> = (&'a str, &'a str);

/// Something that can perform HTTP requests.
///
/// Implementations return the response body for 2xx responses and an error
/// for anything else. No retries are performed.
pub trait Transport: Send + Sync {
    /// Perform a GET request. `query` pairs are percent-encoded and appended
    /// to `url`.
    fn get<'a>(&'a self, url: &'a str, query: &'a [Pair<'a>], headers: &'a [Pair<'a>]) -> FetchFuture<'a>;

    /// Perform a POST request with the given body.
    fn post<'a>(&'a self, url: &'a str, headers: &'a [Pair<'a>], body: Vec<u8>) -> FetchFuture<'a>;

    /// Perform a GET request and parse the body as JSON.
    fn get_json<'a>(&'a self, url: &'a str, query: &'a [Pair<'a>], headers: &'a [Pair<'a>]) -> JsonFuture<'a> {
        let fetch = self.get(url, query, headers);
        Box::pin(async move { parse_json(url, &fetch.await?) })
    }

    /// Perform a POST request and parse the body as JSON.
    fn post_json<'a>(&'a self, url: &'a str, headers: &'a [Pair<'a>], body: Vec<u8>) -> JsonFuture<'a> {
        let fetch = self.post(url, headers, body);
        Box::pin(async move { parse_json(url, &fetch.await?) })
    }
}

fn parse_json(url: &str, body: &[u8]) -> Result<Value> {
    serde_json::from_slice(body).map_err(|e| Error::fetch(url, "invalid JSON", e))
}

/// Append percent-encoded query pairs to a URL.
#[must_use]
pub fn with_query(url: &str, query: &[Pair<'_>]) -> String {
    if query.is_empty() {
        return url.to_string();
    }

    let encoded = query
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{encoded}")
}

/// `reqwest`-backed transport.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
}

impl HttpClient {
    /// Create a client that identifies itself as [`USER_AGENT`].
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::fetch("<client>", "failed to create client", e))?;
        Ok(Self { http })
    }

    /// Wrap an existing `reqwest` client.
    ///
    /// The caller is responsible for configuring its user agent.
    #[must_use]
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn send(&self, url: &str, request: reqwest::RequestBuilder) -> Result<Vec<u8>> {
        let response = request.send().await.map_err(|e| Error::fetch(url, "request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let data = response.bytes().await.map_err(|e| Error::fetch(url, "failed to read body", e))?;
        Ok(data.to_vec())
    }
}

impl Transport for HttpClient {
    fn get<'a>(&'a self, url: &'a str, query: &'a [Pair<'a>], headers: &'a [Pair<'a>]) -> FetchFuture<'a> {
        Box::pin(async move {
            let full = with_query(url, query);
            tracing::debug!(url = %full, "GET");

            let mut request = self.http.get(&full);
            for (name, value) in headers {
                request = request.header(*name, *value);
            }
            self.send(&full, request).await
        })
    }

    fn post<'a>(&'a self, url: &'a str, headers: &'a [Pair<'a>], body: Vec<u8>) -> FetchFuture<'a> {
        Box::pin(async move {
            tracing::debug!(url, len = body.len(), "POST");

            let mut request = self.http.post(url).body(body);
            for (name, value) in headers {
                request = request.header(*name, *value);
            }
            self.send(url, request).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_query_encodes_pairs() {
        assert_eq!(
            with_query("https://example.com/api/index", &[("id", "116")]),
            "https://example.com/api/index?id=116"
        );
        assert_eq!(
            with_query("https://example.com/s?x=1", &[("q", "star runner"), ("k", "a&b")]),
            "https://example.com/s?x=1&q=star%20runner&k=a%26b"
        );
        assert_eq!(with_query("https://example.com", &[]), "https://example.com");
    }

    #[test]
    fn test_parse_json_error_is_fetch() {
        let err = parse_json("https://example.com/a", b"<html>").unwrap_err();
        assert!(matches!(
            err,
            Error::Fetch { ref url, context: "invalid JSON", .. } if url == "https://example.com/a"
        ));
        assert_eq!(parse_json("u", b"[1]").unwrap(), serde_json::json!([1]));
    }

    #[test]
    fn test_client_builds() {
        assert!(HttpClient::new().is_ok());
    }
}
