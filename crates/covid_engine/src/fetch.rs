use std::time::Duration;

use bytes::BytesMut;
use engine_logging::{engine_debug, engine_info};
use futures_util::StreamExt;

use crate::{FailureKind, FetchError, StatewiseEnvelope, StatewiseSnapshot};

pub const DEFAULT_ENDPOINT: &str =
    "https://api.rootnet.in/covid19-in/unofficial/covid19india.org/statewise";

/// HTTP verb used for the statewise request. The upstream service answers
/// both; the dashboard has always sent a body-less `POST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMethod {
    Get,
    #[default]
    Post,
}

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub endpoint: String,
    pub method: RequestMethod,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            method: RequestMethod::Post,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Something that can produce one statewise snapshot.
#[async_trait::async_trait]
pub trait StatsSource: Send + Sync {
    async fn fetch_statewise(&self) -> Result<StatewiseSnapshot, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestStatsSource {
    settings: FetchSettings,
}

impl ReqwestStatsSource {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, FetchError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
    }

    fn endpoint(&self) -> Result<url::Url, FetchError> {
        let parsed = url::Url::parse(&self.settings.endpoint)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            other => Err(FetchError::new(
                FailureKind::InvalidUrl,
                format!("unsupported scheme {other}"),
            )),
        }
    }

    fn too_large(&self, actual: u64) -> FetchError {
        FetchError::new(
            FailureKind::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual: Some(actual),
            },
            "response too large",
        )
    }
}

#[async_trait::async_trait]
impl StatsSource for ReqwestStatsSource {
    async fn fetch_statewise(&self) -> Result<StatewiseSnapshot, FetchError> {
        let endpoint = self.endpoint()?;
        let client = self.build_client()?;

        let request = match self.settings.method {
            RequestMethod::Get => client.get(endpoint.as_str()),
            RequestMethod::Post => client.post(endpoint.as_str()),
        };
        engine_info!(
            "Requesting statewise stats method={:?} url={}",
            self.settings.method,
            endpoint
        );
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(self.too_large(content_len));
            }
        }

        let mut body = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(self.too_large(next_len));
            }
            body.extend_from_slice(&chunk);
        }
        engine_debug!("Statewise response complete bytes={}", body.len());

        decode_statewise(&body)
    }
}

/// Decodes a statewise response body.
pub fn decode_statewise(body: &[u8]) -> Result<StatewiseSnapshot, FetchError> {
    serde_json::from_slice::<StatewiseEnvelope>(body)
        .map(StatewiseSnapshot::from)
        .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
