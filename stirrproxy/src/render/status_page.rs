use crate::models::Snapshot;

const LAST_UPDATED_FORMAT: &str = "%a %b %e %H:%M:%S UTC %Y";

/**
    Render the HTML landing page summarizing the current snapshot.
*/
pub fn render_status_page(snapshot: &Snapshot) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
	<head>
		<meta charset="utf-8">
		<meta name="viewport" content="width=device-width, initial-scale=1">
		<title>stirrproxy</title>
		<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bulma@0.9.1/css/bulma.min.css">
		<style>
			ul {{
				margin-bottom: 10px;
			}}
		</style>
	</head>
	<body>
	<section class="section">
		<div class="container">
			<h1 class="title">stirrproxy</h1>
			<p class="subtitle">
				Station ID: {station}<br>
				Channel count: {channels}<br>
				Program count: {programs}<br>
				Last Updated: {updated}
			</p>
			<ul>
				<li><a href="/playlist.m3u">Playlist</a></li>
				<li><a href="/epg.xml">EPG</a></li>
			</ul>
		</div>
	</section>
	</body>
</html>
"#,
        station = escape_html(&snapshot.station_id),
        channels = snapshot.channel_count(),
        programs = snapshot.program_count,
        updated = snapshot.last_updated.format(LAST_UPDATED_FORMAT),
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
