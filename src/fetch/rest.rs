//! Cloud Monitoring v3 REST client.
//!
//! Pages through `GET {endpoint}/v3/projects/{project}/timeSeries` until the
//! backend stops returning a `nextPageToken`. One HTTP client is built per
//! run and dropped with the `MonitoringClient`.

use std::time::Duration;

use futures::stream::BoxStream;
use serde::Deserialize;

use super::auth::Credentials;
use super::TimeSeriesSource;
use crate::core::{ApiConfig, DumpError, Result, TimeSeries};
use crate::query::ListTimeSeriesRequest;

const USER_AGENT: &str = concat!("gcm-dump/", env!("CARGO_PKG_VERSION"));

/// One page of a `timeSeries.list` response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTimeSeriesPage {
    #[serde(default)]
    pub time_series: Vec<TimeSeries>,
    #[serde(default)]
    pub next_page_token: String,
    /// Partial failures reported alongside the data.
    #[serde(default)]
    pub execution_errors: Vec<ExecutionError>,
}

/// `google.rpc.Status` as carried in `executionErrors`.
#[derive(Debug, Default, Deserialize)]
pub struct ExecutionError {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Monitoring API client for a single run.
#[derive(Debug)]
pub struct MonitoringClient {
    http: reqwest::Client,
    endpoint: String,
    request_timeout: Duration,
    credentials: Credentials,
}

impl MonitoringClient {
    /// Build the HTTP client. Nothing is sent until the first page is requested.
    pub fn new(api: &ApiConfig, credentials: Credentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(api.request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DumpError::connection(format!("failed to build HTTP client: {e}")))?;

        tracing::debug!(
            endpoint = %api.endpoint,
            timeout = ?api.request_timeout,
            "Monitoring client initialized"
        );

        Ok(Self {
            http,
            endpoint: api.endpoint.trim_end_matches('/').to_string(),
            request_timeout: api.request_timeout,
            credentials,
        })
    }

    fn series_url(&self, name: &str) -> String {
        format!("{}/v3/{}/timeSeries", self.endpoint, name)
    }

    /// Fetch a single page.
    pub async fn list_page(
        &self,
        request: &ListTimeSeriesRequest,
        page_token: Option<&str>,
    ) -> Result<ListTimeSeriesPage> {
        let token = self.credentials.bearer_token().await?;

        let mut params = request.query_params();
        if let Some(page_token) = page_token {
            params.push(("pageToken", page_token.to_string()));
        }

        let resp = self
            .http
            .get(self.series_url(&request.name))
            .bearer_auth(token)
            .query(&params)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        let body = resp.bytes().await.map_err(|e| self.map_send_error(e))?;
        serde_json::from_slice(&body).map_err(|e| DumpError::decode(e.to_string()))
    }

    fn map_send_error(&self, err: reqwest::Error) -> DumpError {
        if err.is_timeout() {
            DumpError::Timeout {
                timeout_ms: u64::try_from(self.request_timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            DumpError::Http(err)
        }
    }
}

async fn error_from_response(resp: reqwest::Response) -> DumpError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();

    let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) if !envelope.error.message.is_empty() => {
            if envelope.error.status.is_empty() {
                envelope.error.message
            } else {
                format!("{} ({})", envelope.error.message, envelope.error.status)
            }
        },
        _ if body.trim().is_empty() => {
            status.canonical_reason().unwrap_or("request failed").to_string()
        },
        _ => body,
    };

    DumpError::fetch(Some(status.as_u16()), message)
}

impl TimeSeriesSource for MonitoringClient {
    fn list_time_series<'a>(
        &'a self,
        request: &'a ListTimeSeriesRequest,
    ) -> BoxStream<'a, Result<TimeSeries>> {
        Box::pin(async_stream::try_stream! {
            let mut page_token: Option<String> = None;
            let mut page = 0usize;

            loop {
                let response = self.list_page(request, page_token.as_deref()).await?;
                page += 1;

                tracing::debug!(
                    page,
                    series = response.time_series.len(),
                    more = !response.next_page_token.is_empty(),
                    "Fetched time series page"
                );
                for failure in &response.execution_errors {
                    tracing::warn!(
                        code = failure.code,
                        message = %failure.message,
                        "Partial query failure"
                    );
                }

                for series in response.time_series {
                    yield series;
                }

                if response.next_page_token.is_empty() {
                    break;
                }
                page_token = Some(response.next_page_token);
            }
        })
    }
}
