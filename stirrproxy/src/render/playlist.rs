use std::fmt::Write;

use crate::models::{ChannelStatus, Snapshot};

/**
    Render the M3U playlist, one stanza per channel in display order.

    When `guide_url` is given it is advertised in the header as
    `url-tvg` so players can find the guide on their own.
*/
pub fn render_playlist(snapshot: &Snapshot, guide_url: Option<&str>) -> String {
    let mut playlist = String::from("#EXTM3U");
    if let Some(url) = guide_url {
        let _ = write!(playlist, " url-tvg=\"{}\"", attribute(url));
    }
    playlist.push('\n');

    let stanzas: Vec<String> = snapshot.channels.iter().map(stanza).collect();
    playlist.push_str(&stanzas.join("\n\n"));
    playlist.push('\n');

    playlist
}

fn stanza(channel: &ChannelStatus) -> String {
    let title = single_line(channel.title());
    format!(
        "#EXTINF:0 channel-id=\"{id}\" tvg-logo=\"{logo}\" tvg-name=\"{name}\", {title}\n{link}",
        id = attribute(&channel.id),
        logo = attribute(channel.icon_url().unwrap_or_default()),
        name = attribute(&title),
        title = title,
        link = single_line(playback_link(channel)),
    )
}

/**
    The status link, falling back to the raw stream URL when the
    provider left the link empty.
*/
fn playback_link(channel: &ChannelStatus) -> &str {
    match channel.status.stream_url.as_deref() {
        Some(url) if channel.status.link.trim().is_empty() => url,
        _ => &channel.status.link,
    }
}

fn single_line(s: &str) -> String {
    s.replace(['\r', '\n'], "")
}

fn attribute(s: &str) -> String {
    single_line(s).replace('"', "'")
}
