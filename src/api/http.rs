//! Implements the `Api` trait with `reqwest` against a live backend.

use crate::api::{Api, DateRange, PageBody, PageResponse, DATE_RANGE_PATH};
use crate::Result;
use anyhow::{bail, Context};
use reqwest::StatusCode;
use tracing::{debug, trace};
use url::Url;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Requests pages from `GET {base}/api/transaction/date-range`.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpApi {
    /// Creates an `HttpApi` for the backend rooted at `base`, e.g. `https://money.example.com/`.
    pub fn new(base: Url) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .context("Failed to create the HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint(base)?,
        })
    }

    fn page_url(&self, range: DateRange, page: u32, size: u32) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("startDate", &range.start().format(DATE_FORMAT).to_string())
            .append_pair("endDate", &range.end().format(DATE_FORMAT).to_string())
            .append_pair("page", &page.to_string())
            .append_pair("size", &size.to_string());
        url
    }
}

/// Joins the date-range path onto `base`. A base without a trailing slash is treated as a
/// directory so that `https://host/backend` becomes `https://host/backend/api/...`.
fn endpoint(mut base: Url) -> Result<Url> {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(DATE_RANGE_PATH)
        .with_context(|| format!("Unable to build the date-range URL from {base}"))
}

#[async_trait::async_trait]
impl Api for HttpApi {
    async fn get_page(&mut self, range: DateRange, page: u32, size: u32) -> Result<PageResponse> {
        let url = self.page_url(range, page, size);
        trace!("GET {url}");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to send request to {url}"))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("No transactions found for {range} (page {page})");
            return Ok(PageResponse::NotFound);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            bail!("Fetching transactions failed with status {status}: {body}");
        }

        let body: PageBody = response
            .json()
            .await
            .with_context(|| format!("Failed to parse the transactions returned by {url}"))?;
        Ok(PageResponse::Body(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 10, 31).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_page_url() {
        let api = HttpApi::new(Url::parse("http://localhost:8080").unwrap()).unwrap();
        assert_eq!(
            api.page_url(range(), 2, 50).as_str(),
            "http://localhost:8080/api/transaction/date-range\
             ?startDate=2025-09-01&endDate=2025-10-31&page=2&size=50"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let url = endpoint(Url::parse("https://example.com/backend").unwrap()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/backend/api/transaction/date-range"
        );
        let url = endpoint(Url::parse("https://example.com/backend/").unwrap()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/backend/api/transaction/date-range"
        );
    }

    /// Serves exactly one canned HTTP response on a local port and returns the base URL.
    async fn serve_once(status: &'static str, body: &'static str) -> Url {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await.unwrap();
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        Url::parse(&format!("http://{addr}")).unwrap()
    }

    #[tokio::test]
    async fn test_not_found() {
        let mut api = HttpApi::new(serve_once("404 Not Found", "").await).unwrap();
        let response = api.get_page(range(), 0, 10).await.unwrap();
        assert_eq!(response, PageResponse::NotFound);
    }

    #[tokio::test]
    async fn test_server_error() {
        let base = serve_once("500 Internal Server Error", "boom").await;
        let mut api = HttpApi::new(base).unwrap();
        let err = api.get_page(range(), 0, 10).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("500"), "{message}");
        assert!(message.contains("boom"), "{message}");
    }

    #[tokio::test]
    async fn test_envelope_body() {
        let base = serve_once(
            "200 OK",
            r#"{"content":[{"id":7,"amount":-12.5}],"last":true}"#,
        )
        .await;
        let mut api = HttpApi::new(base).unwrap();
        match api.get_page(range(), 0, 10).await.unwrap() {
            PageResponse::Body(PageBody::Page { content, last }) => {
                assert_eq!(content.len(), 1);
                assert_eq!(last, Some(true));
            }
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_an_error() {
        let mut api = HttpApi::new(serve_once("200 OK", "<html>").await).unwrap();
        let err = api.get_page(range(), 0, 10).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
