use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;

/**
    Failure of a single call against the remote lineup service.
*/
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to configure http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected response {status} from {url}")]
    Status { url: String, status: StatusCode },

    #[error("malformed payload from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid request url {0:?}")]
    InvalidUrl(String),

    #[error("payload from {url} is missing {what}")]
    Missing { url: String, what: &'static str },
}

impl SourceError {
    /**
        Whether the remote answered, but with something we could not use.
    */
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::Missing { .. })
    }
}

/**
    Which per-channel lookup failed during a refresh.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStage {
    Status,
    Guide,
}

impl fmt::Display for ChannelStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status => f.write_str("status"),
            Self::Guide => f.write_str("guide"),
        }
    }
}

/**
    A refresh cycle that produced no snapshot.
*/
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("lineup source unavailable: {0}")]
    SourceUnavailable(#[source] SourceError),

    #[error("lineup payload could not be decoded: {0}")]
    DecodeFailure(#[source] SourceError),

    #[error("{stage} fetch for channel {channel:?} failed, discarding refresh: {source}")]
    InconsistentLineup {
        channel: String,
        stage: ChannelStage,
        #[source]
        source: SourceError,
    },
}

impl RefreshError {
    pub fn from_lineup(err: SourceError) -> Self {
        if err.is_decode() {
            Self::DecodeFailure(err)
        } else {
            Self::SourceUnavailable(err)
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("failed to write guide document: {0}")]
pub struct RenderError(pub String);
