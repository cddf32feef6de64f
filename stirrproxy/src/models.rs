use chrono::{DateTime, Utc};

use crate::guide_time::GuideTime;

/**
    Prefix applied to provider channel ids to form the ids used in
    the playlist and guide.
*/
pub const CHANNEL_ID_PREFIX: &str = "stirr-";

/**
    One entry in the provider lineup for a station.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDescriptor {
    /// Stable provider id, identity of the channel
    pub id: String,
    /// Human readable name, also the key for status and guide lookups
    pub name: String,
    pub icon_url: Option<String>,
}

/**
    Text with an optional language tag, as carried by guide entries.
*/
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedText {
    pub value: String,
    pub lang: Option<String>,
}

impl LocalizedText {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            lang: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/**
    One scheduled guide entry.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub title: LocalizedText,
    pub description: Option<LocalizedText>,
    pub categories: Vec<LocalizedText>,
    pub start: GuideTime,
    pub stop: GuideTime,
    /// Source id of the owning channel
    pub channel: String,
    pub is_live: bool,
}

/**
    Live status reported for a single channel, before it has been
    placed in a lineup.
*/
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveStatus {
    pub title: String,
    /// Playback link handed to clients in the playlist
    pub link: String,
    pub stream_url: Option<String>,
    pub logo_url: Option<String>,
    pub is_live: bool,
    pub state: Option<String>,
}

/**
    A channel as published in a snapshot: lineup position, live
    status, and its guide.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelStatus {
    /// Derived id, `stirr-` followed by the source id
    pub id: String,
    pub source_id: String,
    /// 1-based position in lineup fetch order
    pub number: usize,
    pub status: LiveStatus,
    pub programs: Vec<Program>,
}

impl ChannelStatus {
    pub fn derive_id(source_id: &str) -> String {
        format!("{CHANNEL_ID_PREFIX}{source_id}")
    }

    /**
        Title used in the playlist and guide.
    */
    pub fn title(&self) -> &str {
        &self.status.title
    }

    pub fn icon_url(&self) -> Option<&str> {
        self.status.logo_url.as_deref()
    }

    /**
        Guide entries the provider flags as live broadcasts.
    */
    pub fn live_program_count(&self) -> usize {
        self.programs.iter().filter(|p| p.is_live).count()
    }
}

/**
    One complete, immutable result of a refresh cycle.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub station_id: String,
    pub channels: Vec<ChannelStatus>,
    pub program_count: usize,
    pub last_updated: DateTime<Utc>,
}

impl Snapshot {
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn programs(&self) -> impl Iterator<Item = (&ChannelStatus, &Program)> {
        self.channels
            .iter()
            .flat_map(|channel| channel.programs.iter().map(move |p| (channel, p)))
    }
}

#[cfg(test)]
mod tests {
    use crate::render::testing::sample_snapshot;

    #[test]
    fn test_live_program_count() {
        let snapshot = sample_snapshot(2, 3);
        // The first show of every sample channel is flagged live
        for channel in &snapshot.channels {
            assert_eq!(channel.live_program_count(), 1);
        }

        let empty = sample_snapshot(1, 0);
        assert_eq!(empty.channels[0].live_program_count(), 0);
    }
}
