use chrono::NaiveDate;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::SojournConfig;
use crate::core::trip::Coordinate;
use crate::core::weather::{ActivityWeather, ForecastResponse};
use crate::error::WeatherError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Client for the forecast backend. One request per call: no retry, no coalescing.
#[derive(Clone)]
pub struct WeatherClient {
    base_url: String,
    auth_token: Option<String>,
    http: Client,
}

impl WeatherClient {
    pub fn new(base_url: &str, auth_token: Option<String>) -> Result<Self, WeatherError> {
        let http = Client::builder().build().map_err(WeatherError::Http)?;
        Self::with_http(base_url, auth_token, http)
    }

    pub fn from_config(
        config: &SojournConfig,
        auth_token: Option<String>,
    ) -> Result<Self, WeatherError> {
        Self::new(&config.weather_base_url, auth_token)
    }

    /// Use a caller-built HTTP client (proxy, timeout and TLS settings).
    pub fn with_http(
        base_url: &str,
        auth_token: Option<String>,
        http: Client,
    ) -> Result<Self, WeatherError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url)
            .map_err(|e| WeatherError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        Ok(Self {
            base_url,
            auth_token: auth_token.filter(|t| !t.is_empty()),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Daily forecast for a trip's date range.
    pub async fn forecast(
        &self,
        at: Coordinate,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ForecastResponse, WeatherError> {
        let query = [
            ("latitude", at.latitude.to_string()),
            ("longitude", at.longitude.to_string()),
            ("start_date", start.format(DATE_FORMAT).to_string()),
            ("end_date", end.format(DATE_FORMAT).to_string()),
        ];
        self.get_json("/weather/forecast", &query).await
    }

    /// Point forecast for one activity.
    pub async fn activity_weather(
        &self,
        at: Coordinate,
        date: NaiveDate,
    ) -> Result<ActivityWeather, WeatherError> {
        let query = [
            ("latitude", at.latitude.to_string()),
            ("longitude", at.longitude.to_string()),
            ("date", date.format(DATE_FORMAT).to_string()),
        ];
        self.get_json("/weather/activity", &query).await
    }

    /// `forecast`, abandoned as soon as `cancel` fires.
    pub async fn forecast_until_cancelled(
        &self,
        cancel: &CancellationToken,
        at: Coordinate,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ForecastResponse, WeatherError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(WeatherError::Cancelled),
            result = self.forecast(at, start, end) => result,
        }
    }

    /// Fetch in the background and hand the result to `on_result` exactly once.
    /// If `cancel` fires first (the consumer went away) the result is dropped
    /// and `on_result` is never called.
    pub fn spawn_forecast<F>(
        &self,
        cancel: CancellationToken,
        at: Coordinate,
        start: NaiveDate,
        end: NaiveDate,
        on_result: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Result<ForecastResponse, WeatherError>) + Send + 'static,
    {
        let client = self.clone();
        tokio::spawn(async move {
            let result = client
                .forecast_until_cancelled(&cancel, at, start, end)
                .await;
            if matches!(result, Err(WeatherError::Cancelled)) || cancel.is_cancelled() {
                log::debug!("Forecast request cancelled, dropping result");
                return;
            }
            on_result(result);
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .http
            .get(&url)
            .header(CONTENT_TYPE, "application/json")
            .query(query);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await.map_err(|e| {
            let err = WeatherError::classify(e);
            log::warn!("Weather API error for {}: {}", path, err);
            err
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            log::warn!("Weather API {} returned {}", path, status);
            return Err(WeatherError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().await.map_err(WeatherError::classify)?;
        serde_json::from_str(&text).map_err(|e| {
            log::warn!("Failed to decode weather response from {}: {}", path, e);
            WeatherError::Decode(e.to_string())
        })
    }
}
