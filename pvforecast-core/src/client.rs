use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::{
    error::ForecastError,
    model::{DailyForecast, DailyForecastData, HourlyForecast, HourlyForecastData},
    options::{ForecastKind, ForecastRequest, ValidatedQuery},
};

/// Endpoint of the public PVForecast API.
pub const DEFAULT_BASE_URL: &str = "http://www.pvforecast.cz/api/";

/// Anything able to answer hourly and daily irradiance queries.
#[async_trait]
pub trait IrradianceForecaster: Send + Sync + fmt::Debug {
    async fn fetch_hourly(
        &self,
        request: &ForecastRequest,
    ) -> Result<HourlyForecastData, ForecastError>;

    async fn fetch_daily(
        &self,
        request: &ForecastRequest,
    ) -> Result<DailyForecastData, ForecastError>;
}

/// Client for the PVForecast irradiance service.
///
/// Holds nothing but the API key and a connection pool, so a single instance
/// can be shared between tasks.
#[derive(Clone)]
pub struct ForecastClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl fmt::Debug for ForecastClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForecastClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ForecastClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    /// Point the client at another endpoint, e.g. a mirror or a test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Limit how long a single call may take, connect to last byte.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ForecastError> {
        self.http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ForecastError::transport)?;
        Ok(self)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Hourly irradiance (W/m²) for the next 24, 48 or 72 hours.
    #[instrument(
        skip(self, request),
        fields(lat = request.latitude, lon = request.longitude, length = request.length)
    )]
    pub async fn fetch_hourly(
        &self,
        request: &ForecastRequest,
    ) -> Result<HourlyForecastData, ForecastError> {
        let query = request.validate(ForecastKind::Hour)?;
        let rows: Vec<(String, Option<u32>)> = self.fetch_rows(&query).await?;

        let forecasts = rows
            .into_iter()
            .map(|(timestamp, irradiance)| HourlyForecast {
                timestamp,
                irradiance,
            })
            .collect();

        Ok(HourlyForecastData { forecasts })
    }

    /// Daily irradiance totals (Wh/m²) for the next 1, 2 or 3 days.
    #[instrument(
        skip(self, request),
        fields(lat = request.latitude, lon = request.longitude, length = request.length)
    )]
    pub async fn fetch_daily(
        &self,
        request: &ForecastRequest,
    ) -> Result<DailyForecastData, ForecastError> {
        let query = request.validate(ForecastKind::Day)?;
        let rows: Vec<(String, Option<u32>)> = self.fetch_rows(&query).await?;

        let forecasts = rows
            .into_iter()
            .map(|(timestamp, total_irradiance)| DailyForecast {
                timestamp,
                total_irradiance,
            })
            .collect();

        Ok(DailyForecastData { forecasts })
    }

    /// Issue one GET for `query` and decode the body as an array of pairs.
    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        query: &ValidatedQuery,
    ) -> Result<Vec<T>, ForecastError> {
        debug!(kind = %query.kind, number = query.length, "Requesting forecast");

        let res = self
            .http
            .get(&self.base_url)
            .query(&query.query_pairs(&self.api_key))
            .send()
            .await
            .map_err(ForecastError::transport)?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            ForecastError::remote(
                Some(status.as_u16()),
                unreadable_body_reason(status, e.without_url()),
                "",
            )
        })?;

        debug!(status = status.as_u16(), bytes = body.len(), "Received forecast response");

        if !status.is_success() {
            return Err(ForecastError::remote(
                Some(status.as_u16()),
                status_line(status),
                &body,
            ));
        }

        parse_rows(&body).map_err(|e| {
            ForecastError::remote(
                Some(status.as_u16()),
                format!("Malformed {} forecast response: {e}", query.kind),
                &body,
            )
        })
    }
}

/// `HTTP 500 Internal Server Error`
fn status_line(status: StatusCode) -> String {
    format!("HTTP {status}")
}

fn unreadable_body_reason(status: StatusCode, cause: impl fmt::Display) -> String {
    format!("{}, failed to read response body: {cause}", status_line(status))
}

/// The service answers with a bare JSON array of `[timestamp, value]` pairs.
fn parse_rows<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, serde_json::Error> {
    serde_json::from_str(body)
}

#[async_trait]
impl IrradianceForecaster for ForecastClient {
    async fn fetch_hourly(
        &self,
        request: &ForecastRequest,
    ) -> Result<HourlyForecastData, ForecastError> {
        ForecastClient::fetch_hourly(self, request).await
    }

    async fn fetch_daily(
        &self,
        request: &ForecastRequest,
    ) -> Result<DailyForecastData, ForecastError> {
        ForecastClient::fetch_daily(self, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_keeps_key_and_default_url() {
        let client = ForecastClient::new("test_key");
        assert_eq!(client.api_key(), "test_key");
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn debug_output_hides_api_key() {
        let client = ForecastClient::new("super-secret");
        let dbg = format!("{client:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("redacted"));
    }

    #[test]
    fn parse_rows_accepts_pairs_with_nulls() {
        let body = r#"[["2023-10-01T00:00:00Z", 1000], ["2023-10-02T00:00:00Z", null]]"#;
        let rows: Vec<(String, Option<u32>)> = parse_rows(body).unwrap();
        assert_eq!(
            rows,
            vec![
                ("2023-10-01T00:00:00Z".to_string(), Some(1000)),
                ("2023-10-02T00:00:00Z".to_string(), None),
            ]
        );
    }

    #[test]
    fn parse_rows_rejects_wrong_shapes() {
        let bad = [
            "not json",
            r#"{"data": []}"#,
            r#"[["2023-10-01T00:00:00Z"]]"#,
            r#"[["2023-10-01T00:00:00Z", 1, 2]]"#,
            r#"[[1000, "2023-10-01T00:00:00Z"]]"#,
            r#"[["2023-10-01T00:00:00Z", -5]]"#,
        ];
        for body in bad {
            let parsed: Result<Vec<(String, Option<u32>)>, _> = parse_rows(body);
            assert!(parsed.is_err(), "expected {body} to be rejected");
        }
    }

    #[test]
    fn unreadable_body_reason_keeps_status_line() {
        let reason = unreadable_body_reason(StatusCode::BAD_GATEWAY, "connection reset");
        assert!(reason.starts_with("HTTP 502 Bad Gateway"), "{reason}");
        assert!(reason.contains("connection reset"), "{reason}");
    }

    #[tokio::test]
    async fn invalid_options_fail_before_any_request() {
        // Nothing listens here; reaching the network would yield TransportUnreachable.
        let client = ForecastClient::new("test_key").with_base_url("http://127.0.0.1:1/api/");

        let err = client
            .fetch_hourly(&ForecastRequest::hourly(50.0, 14.0).length(12))
            .await
            .unwrap_err();
        assert!(matches!(err, ForecastError::InvalidParameter { field: "length", .. }));

        let err = client
            .fetch_daily(&ForecastRequest::daily(50.0, 14.0).start("invalid"))
            .await
            .unwrap_err();
        assert!(matches!(err, ForecastError::InvalidParameter { field: "start", .. }));
    }
}
