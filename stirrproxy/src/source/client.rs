use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::error::SourceError;
use crate::models::{ChannelDescriptor, LiveStatus, Program};

use super::ChannelSource;
use super::wire;

const STATION_SELECTION_URL: &str =
    "https://ott-stationselection.sinclairstoryline.com/stationAutoSelection";
const GATEWAY_URL: &str = "https://ott-gateway-stirr.sinclairstoryline.com/api/rest/v3";

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/**
    HTTP client for the STIRR lineup, status, and guide endpoints.
*/
#[derive(Clone)]
pub struct StirrClient {
    http: reqwest::Client,
    timeout: Duration,
    selection_url: Url,
    gateway_url: Url,
}

impl StirrClient {
    /**
        Create a client for the production endpoints, with every
        request bounded by `timeout`.
    */
    pub fn new(timeout: Duration) -> Result<Self, SourceError> {
        Self::with_endpoints(timeout, STATION_SELECTION_URL, GATEWAY_URL)
    }

    /**
        Create a client against a custom station selection URL and
        gateway base URL.
    */
    pub fn with_endpoints(
        timeout: Duration,
        selection_url: &str,
        gateway_url: &str,
    ) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(SourceError::Client)?;

        Ok(Self {
            http,
            timeout,
            selection_url: parse_url(selection_url)?,
            gateway_url: parse_url(gateway_url)?,
        })
    }

    /**
        Build a gateway URL, percent-encoding each segment.
    */
    fn endpoint(&self, segments: &[&str]) -> Result<Url, SourceError> {
        let mut url = self.gateway_url.clone();
        url.path_segments_mut()
            .map_err(|_| SourceError::InvalidUrl(self.gateway_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        mut url: Url,
        station: Option<&str>,
    ) -> Result<T, SourceError> {
        if let Some(station) = station {
            url.query_pairs_mut().append_pair("station", station);
        }

        tracing::trace!(%url, "requesting");

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        serde_json::from_slice(&body).map_err(|source| SourceError::Decode {
            url: url.to_string(),
            source,
        })
    }

    fn transport_error(&self, url: &Url, source: reqwest::Error) -> SourceError {
        if source.is_timeout() {
            SourceError::Timeout(self.timeout)
        } else {
            SourceError::Transport {
                url: url.to_string(),
                source,
            }
        }
    }
}

#[async_trait]
impl ChannelSource for StirrClient {
    async fn detect_station(&self) -> Result<String, SourceError> {
        let url = self.selection_url.clone();
        let detection: wire::StationDetection = self.get_json(url.clone(), None).await?;
        detection.station().ok_or_else(|| SourceError::Missing {
            url: url.to_string(),
            what: "a station id",
        })
    }

    async fn lineup(&self, station: &str) -> Result<Vec<ChannelDescriptor>, SourceError> {
        let url = self.endpoint(&["channels", "stirr"])?;
        let lineup: wire::Lineup = self.get_json(url, Some(station)).await?;
        Ok(lineup.channel.into_iter().map(Into::into).collect())
    }

    async fn status(&self, station: &str, key: &str) -> Result<LiveStatus, SourceError> {
        let url = self.endpoint(&["status", key])?;
        let status: wire::Status = self.get_json(url, Some(station)).await?;
        Ok(status.into())
    }

    async fn programs(&self, station: &str, key: &str) -> Result<Vec<Program>, SourceError> {
        let url = self.endpoint(&["program", "stirr", "ott", key])?;
        let guide: wire::Guide = self.get_json(url, Some(station)).await?;
        Ok(guide.programme.into_iter().map(Into::into).collect())
    }
}

fn parse_url(raw: &str) -> Result<Url, SourceError> {
    Url::parse(raw).map_err(|_| SourceError::InvalidUrl(raw.to_string()))
}
