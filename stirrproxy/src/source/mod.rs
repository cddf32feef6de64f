use async_trait::async_trait;

use crate::error::SourceError;
use crate::models::{ChannelDescriptor, LiveStatus, Program};

mod client;
#[cfg(test)]
pub mod fake;
mod wire;

pub use client::StirrClient;

/**
    The remote lookups a refresh cycle is built from.

    Implementations return normalized records; provider payload
    shapes never leave the implementation.
*/
#[async_trait]
pub trait ChannelSource: Send + Sync {
    /**
        Ask the provider which station serves the caller's region.
    */
    async fn detect_station(&self) -> Result<String, SourceError>;

    /**
        Channel lineup for a station, in provider order.
    */
    async fn lineup(&self, station: &str) -> Result<Vec<ChannelDescriptor>, SourceError>;

    async fn status(&self, station: &str, key: &str) -> Result<LiveStatus, SourceError>;

    async fn programs(&self, station: &str, key: &str) -> Result<Vec<Program>, SourceError>;
}
