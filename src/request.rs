use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use reqwest::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    Client,
};
use serde::Deserialize;
use serde_json::Value;

use crate::{info_time, payload::PayloadSource, Error, Record, Result, REQUEST_TIMEOUT_SECS};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0";
const ORIGIN: &str = "https://datosabiertos.aduana.gov.py";
const REFERER: &str = "https://datosabiertos.aduana.gov.py/ddaa/app/";

/// What the API answers to every page request.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub payload: Option<GridPage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridPage {
    #[serde(rename = "gridData", default)]
    pub grid_data: Vec<Record>,
    #[serde(rename = "totalCount")]
    pub total_count: u64,
}

impl ResponseEnvelope {
    /// Returns the page data, or the server's failure message as an `Error::Remote`.
    pub fn into_page(self) -> Result<GridPage> {
        if !self.success {
            return Err(Error::Remote(self.message.unwrap_or_default()));
        }
        self.payload.ok_or_else(|| {
            Error::MalformedResponse("`success` is set but `payload` is missing".into())
        })
    }
}

/// Sends a single request body to the API and hands back the parsed answer.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, payload: &Value) -> Result<ResponseEnvelope>;
}

/// The real API, reached over HTTP with the headers the portal's web app sends.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .default_headers(browser_headers())
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(HttpTransport {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, payload: &Value) -> Result<ResponseEnvelope> {
        // The status code is ignored, the envelope carries the outcome.
        let res = self.client.post(&self.base_url).json(payload).send().await?;
        let envelope = res.json::<ResponseEnvelope>().await?;
        Ok(envelope)
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("pt-BR,pt;q=0.8,en-US;q=0.5,en;q=0.3"),
    );
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(header::ORIGIN, HeaderValue::from_static(ORIGIN));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(header::REFERER, HeaderValue::from_static(REFERER));
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("empty"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("cors"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("same-origin"),
    );
    headers
}

/// Fetches every page of one (year, position) pair.
pub struct Fetcher<T> {
    transport: T,
    payloads: PayloadSource,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, payloads: PayloadSource) -> Self {
        Fetcher {
            transport,
            payloads,
        }
    }

    /// Requests pages 1, 2, 3, ... one after another until the rows fetched so far
    /// reach the `totalCount` reported by the latest page.
    ///
    /// A failed page ends the fetch: nothing collected so far is returned.
    /// An empty page that leaves the total unmet returns `Error::StalledPagination`,
    /// otherwise the loop would never end.
    pub async fn fetch_all(&self, year: &str, position: &str) -> Result<Vec<Record>> {
        let start_time = Local::now();
        info_time!("Fetching position {position} for year {year}...");

        let mut rows = Vec::new();
        let mut fetched: u64 = 0;
        let mut page: u64 = 1;
        loop {
            let payload = self.payloads.payload(page, year, position).await?;
            let grid = self.transport.post(&payload).await?.into_page()?;

            let page_len = grid.grid_data.len() as u64;
            rows.extend(grid.grid_data);
            fetched += page_len;
            info_time!(
                "Position {position}: page {page} -> {page_len} rows ({fetched}/{})",
                grid.total_count
            );

            if fetched >= grid.total_count {
                break;
            }
            if page_len == 0 {
                return Err(Error::StalledPagination {
                    position: position.to_string(),
                    page,
                    fetched,
                    total: grid.total_count,
                });
            }
            page += 1;
        }

        info_time!(start_time, "Fetched position {position}: {} rows", rows.len());
        Ok(rows)
    }
}
