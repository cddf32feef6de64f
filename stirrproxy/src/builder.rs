use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::error::{ChannelStage, RefreshError, SourceError};
use crate::models::{ChannelDescriptor, ChannelStatus, LiveStatus, Program, Snapshot};
use crate::source::ChannelSource;

/**
    Runs one refresh cycle against a channel source and assembles the
    result into a snapshot.

    A cycle either produces a complete snapshot or an error, never a
    partial lineup: a single failed status or guide lookup discards the
    whole cycle.
*/
#[derive(Clone)]
pub struct SnapshotBuilder {
    source: Arc<dyn ChannelSource>,
    call_timeout: Duration,
}

impl SnapshotBuilder {
    pub fn new(source: Arc<dyn ChannelSource>, call_timeout: Duration) -> Self {
        Self {
            source,
            call_timeout,
        }
    }

    pub async fn build(&self, station: &str) -> Result<Snapshot, RefreshError> {
        tracing::info!(station, "Beginning cache fill");

        let lineup = self
            .bounded(self.source.lineup(station))
            .await
            .map_err(RefreshError::from_lineup)?;

        tracing::info!(
            channels = lineup.len(),
            "Found channels in lineup, fetching channel metadata and guide"
        );

        let mut channels = Vec::with_capacity(lineup.len());
        let mut program_count = 0;

        for (idx, descriptor) in lineup.into_iter().enumerate() {
            let status = self
                .bounded(self.source.status(station, &descriptor.name))
                .await
                .map_err(|source| inconsistent(&descriptor, ChannelStage::Status, source))?;

            let programs = self
                .bounded(self.source.programs(station, &descriptor.name))
                .await
                .map_err(|source| inconsistent(&descriptor, ChannelStage::Guide, source))?;

            let channel = assemble(idx + 1, descriptor, status, programs);
            tracing::debug!(
                channel = %channel.id,
                number = channel.number,
                programs = channel.programs.len(),
                live_programs = channel.live_program_count(),
                live = channel.status.is_live,
                state = channel.status.state.as_deref().unwrap_or("unknown"),
                "Loaded channel"
            );

            program_count += channel.programs.len();
            channels.push(channel);
        }

        // Already in fetch order; stable sort keeps that a hard guarantee.
        channels.sort_by_key(|c| c.number);

        tracing::info!(
            channels = channels.len(),
            programs = program_count,
            "Cache fill complete"
        );

        Ok(Snapshot {
            station_id: station.to_string(),
            channels,
            program_count,
            last_updated: Utc::now(),
        })
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, SourceError>>,
    ) -> Result<T, SourceError> {
        tokio::time::timeout(self.call_timeout, call)
            .await
            .map_err(|_| SourceError::Timeout(self.call_timeout))?
    }
}

fn inconsistent(
    descriptor: &ChannelDescriptor,
    stage: ChannelStage,
    source: SourceError,
) -> RefreshError {
    RefreshError::InconsistentLineup {
        channel: descriptor.name.clone(),
        stage,
        source,
    }
}

/**
    Combine a lineup entry with its status and guide.

    Programs are re-pointed at the owning channel: the guide was looked
    up by this channel's key, whatever the payload claims.
*/
fn assemble(
    number: usize,
    descriptor: ChannelDescriptor,
    mut status: LiveStatus,
    mut programs: Vec<Program>,
) -> ChannelStatus {
    if status.title.is_empty() {
        status.title = descriptor.name.clone();
    }
    if status.logo_url.is_none() {
        status.logo_url = descriptor.icon_url;
    }

    for program in &mut programs {
        if program.channel != descriptor.id {
            if !program.channel.is_empty() {
                tracing::debug!(
                    expected = %descriptor.id,
                    got = %program.channel,
                    "Guide entry names another channel, reassigning"
                );
            }
            program.channel = descriptor.id.clone();
        }
    }

    ChannelStatus {
        id: ChannelStatus::derive_id(&descriptor.id),
        source_id: descriptor.id,
        number,
        status,
        programs,
    }
}
