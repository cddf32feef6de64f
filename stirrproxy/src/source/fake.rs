use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use parking_lot::Mutex;
use reqwest::StatusCode;

use crate::error::SourceError;
use crate::guide_time::GuideTime;
use crate::models::{ChannelDescriptor, LiveStatus, LocalizedText, Program};

use super::ChannelSource;

#[derive(Default)]
struct Script {
    channels: usize,
    programs_per_channel: usize,
    lineup_down: bool,
    lineup_malformed: bool,
    failing_status: HashSet<String>,
    failing_guide: HashSet<String>,
    hanging_status: HashSet<String>,
    /// Bumped on every lineup call, so consecutive snapshots differ
    generation: usize,
}

/**
    In-memory lineup service with scriptable failures.

    Channel `n` (1-based) has id `chN` and lookup key `Channel N`.
*/
#[derive(Default)]
pub struct FakeSource {
    script: Mutex<Script>,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(channels: usize, programs_per_channel: usize) -> Self {
        Self {
            script: Mutex::new(Script {
                channels,
                programs_per_channel,
                ..Default::default()
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn key(n: usize) -> String {
        format!("Channel {n}")
    }

    pub fn set_channels(&self, channels: usize) {
        self.script.lock().channels = channels;
    }

    pub fn fail_lineup(&self) {
        self.script.lock().lineup_down = true;
    }

    pub fn malformed_lineup(&self) {
        self.script.lock().lineup_malformed = true;
    }

    pub fn fail_status(&self, n: usize) {
        self.script.lock().failing_status.insert(Self::key(n));
    }

    pub fn fail_guide(&self, n: usize) {
        self.script.lock().failing_guide.insert(Self::key(n));
    }

    pub fn hang_status(&self, n: usize) {
        self.script.lock().hanging_status.insert(Self::key(n));
    }

    pub fn recover(&self) {
        let mut script = self.script.lock();
        script.lineup_down = false;
        script.lineup_malformed = false;
        script.failing_status.clear();
        script.failing_guide.clear();
        script.hanging_status.clear();
    }

    /**
        Total number of remote calls served so far.
    */
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn unavailable(what: &str) -> SourceError {
        SourceError::Status {
            url: format!("fake://{what}"),
            status: StatusCode::BAD_GATEWAY,
        }
    }
}

#[async_trait]
impl ChannelSource for FakeSource {
    async fn detect_station(&self) -> Result<String, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("wkrc".to_string())
    }

    async fn lineup(&self, _station: &str) -> Result<Vec<ChannelDescriptor>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock();
        if script.lineup_down {
            return Err(Self::unavailable("lineup"));
        }
        if script.lineup_malformed {
            let source = serde_json::from_str::<serde_json::Value>("{\"channel\":")
                .expect_err("truncated json must not parse");
            return Err(SourceError::Decode {
                url: "fake://lineup".to_string(),
                source,
            });
        }
        script.generation += 1;

        Ok((1..=script.channels)
            .map(|n| ChannelDescriptor {
                id: format!("ch{n}"),
                name: Self::key(n),
                icon_url: Some(format!("http://img.example/ch{n}.png")),
            })
            .collect())
    }

    async fn status(&self, _station: &str, key: &str) -> Result<LiveStatus, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (hang, generation) = {
            let script = self.script.lock();
            if script.failing_status.contains(key) {
                return Err(Self::unavailable("status"));
            }
            (script.hanging_status.contains(key), script.generation)
        };
        if hang {
            std::future::pending::<()>().await;
        }

        Ok(LiveStatus {
            title: format!("{key} (v{generation})"),
            link: format!("http://stream.example/{}.m3u8", key.replace(' ', "-")),
            is_live: true,
            ..Default::default()
        })
    }

    async fn programs(&self, _station: &str, key: &str) -> Result<Vec<Program>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let script = self.script.lock();
        if script.failing_guide.contains(key) {
            return Err(Self::unavailable("guide"));
        }

        let channel = key.trim_start_matches("Channel ");
        let base = Utc.with_ymd_and_hms(2021, 4, 22, 3, 0, 0).unwrap();

        Ok((0..script.programs_per_channel)
            .map(|i| {
                let start = base + Duration::hours(i as i64);
                Program {
                    title: LocalizedText::new(format!("Show {i} on {key}")),
                    description: Some(LocalizedText::new("Fake listing")),
                    categories: vec![LocalizedText::new("News")],
                    start: GuideTime::from_utc(start),
                    stop: GuideTime::from_utc(start + Duration::hours(1)),
                    channel: format!("ch{channel}"),
                    is_live: false,
                }
            })
            .collect())
    }
}
