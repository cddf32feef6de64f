/*!
    Payload shapes of the remote lineup service.

    Only the fields the snapshot needs are decoded; everything else in
    the provider documents is ignored. Most fields are optional upstream,
    so missing values fall back to defaults rather than failing decode.
*/

use serde::{Deserialize, Deserializer};

use crate::guide_time::GuideTime;
use crate::models::{ChannelDescriptor, LiveStatus, LocalizedText, Program};

#[derive(Debug, Deserialize)]
pub struct StationDetection {
    #[serde(default)]
    page: Vec<DetectionPage>,
}

#[derive(Debug, Default, Deserialize)]
struct DetectionPage {
    #[serde(default)]
    button: DetectionButton,
}

#[derive(Debug, Default, Deserialize)]
struct DetectionButton {
    #[serde(rename = "media:content", default)]
    media_content: DetectionMedia,
}

#[derive(Debug, Default, Deserialize)]
struct DetectionMedia {
    #[serde(rename = "sinclair:action_config", default)]
    action_config: ActionConfig,
}

#[derive(Debug, Default, Deserialize)]
struct ActionConfig {
    #[serde(default)]
    station: Vec<String>,
}

impl StationDetection {
    /**
        The first station offered by the first page entry.
    */
    pub fn station(self) -> Option<String> {
        self.page
            .into_iter()
            .next()?
            .button
            .media_content
            .action_config
            .station
            .into_iter()
            .find(|s| !s.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct Lineup {
    #[serde(default)]
    pub channel: Vec<LineupChannel>,
}

#[derive(Debug, Deserialize)]
pub struct LineupChannel {
    id: String,
    #[serde(rename = "display-name")]
    display_name: String,
    #[serde(default)]
    icon: Option<Icon>,
}

#[derive(Debug, Default, Deserialize)]
struct Icon {
    #[serde(default)]
    src: String,
}

impl From<LineupChannel> for ChannelDescriptor {
    fn from(channel: LineupChannel) -> Self {
        Self {
            id: channel.id,
            name: channel.display_name,
            icon_url: channel.icon.and_then(|icon| non_empty(icon.src)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Status {
    rss: Rss,
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: RssChannel,
}

#[derive(Debug, Deserialize)]
struct RssChannel {
    #[serde(default)]
    title: String,
    #[serde(default)]
    item: RssItem,
}

#[derive(Debug, Default, Deserialize)]
struct RssItem {
    #[serde(default)]
    link: String,
    #[serde(rename = "media:content", default)]
    media_content: MediaContent,
}

#[derive(Debug, Default, Deserialize)]
struct MediaContent {
    #[serde(default)]
    url: String,
    #[serde(rename = "sinclair:logo", default)]
    logo: Image,
    #[serde(rename = "sinclair:status", default)]
    status: MediaStatus,
    #[serde(rename = "sinclair:isLive", default, deserialize_with = "flag")]
    is_live: bool,
}

#[derive(Debug, Default, Deserialize)]
struct Image {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct MediaStatus {
    #[serde(default)]
    state: String,
}

impl From<Status> for LiveStatus {
    fn from(status: Status) -> Self {
        let channel = status.rss.channel;
        let media = channel.item.media_content;
        Self {
            title: channel.title.trim().to_string(),
            link: channel.item.link,
            stream_url: non_empty(media.url),
            logo_url: non_empty(media.logo.url),
            is_live: media.is_live,
            state: non_empty(media.status.state),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Guide {
    #[serde(default)]
    pub programme: Vec<GuideProgram>,
}

#[derive(Debug, Deserialize)]
pub struct GuideProgram {
    #[serde(default)]
    title: Text,
    #[serde(default)]
    desc: Option<Text>,
    #[serde(default)]
    category: Vec<Text>,
    start: GuideTime,
    stop: GuideTime,
    #[serde(default)]
    channel: String,
    #[serde(rename = "sinclair:isLiveProgram", default, deserialize_with = "flag")]
    is_live: bool,
}

#[derive(Debug, Default, Deserialize)]
struct Text {
    #[serde(default)]
    value: String,
    #[serde(default)]
    lang: Option<String>,
}

impl From<Text> for LocalizedText {
    fn from(text: Text) -> Self {
        Self {
            value: text.value,
            lang: text.lang.and_then(non_empty),
        }
    }
}

impl From<GuideProgram> for Program {
    fn from(program: GuideProgram) -> Self {
        Self {
            title: program.title.into(),
            description: program
                .desc
                .map(LocalizedText::from)
                .filter(|d| !d.is_empty()),
            categories: program
                .category
                .into_iter()
                .map(LocalizedText::from)
                .filter(|c| !c.is_empty())
                .collect(),
            start: program.start,
            stop: program.stop,
            channel: program.channel,
            is_live: program.is_live,
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

/**
    Provider booleans arrive as `"true"` / `"false"` strings, and
    occasionally as real JSON booleans.
*/
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Text(s) => match s.trim() {
            "true" | "TRUE" | "True" | "1" => Ok(true),
            "false" | "FALSE" | "False" | "0" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "invalid boolean flag {other:?}"
            ))),
        },
    }
}
