use std::borrow::Cow;
use std::fmt::Display;
use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::RenderError;
use crate::models::{ChannelStatus, LocalizedText, Program, Snapshot};

const GENERATOR_NAME: &str = "stirrproxy";
const DOCTYPE: &str = r#"tv SYSTEM "xmltv.dtd""#;

// Provider logos are all delivered at this size
const ICON_WIDTH: &str = "340";
const ICON_HEIGHT: &str = "255";

/**
    Render the XMLTV guide document.

    All `channel` elements come first, in display order, followed by
    every `programme` grouped by channel.
*/
pub fn render_guide(snapshot: &Snapshot) -> Result<String, RenderError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::DocType(BytesText::from_escaped(DOCTYPE)))
        .map_err(xml_error)?;

    let tv = BytesStart::new("tv").with_attributes([("generator-info-name", GENERATOR_NAME)]);
    writer.write_event(Event::Start(tv)).map_err(xml_error)?;

    for channel in &snapshot.channels {
        write_channel(&mut writer, channel)?;
    }
    for (channel, program) in snapshot.programs() {
        write_programme(&mut writer, channel, program)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("tv")))
        .map_err(xml_error)?;

    let mut document = writer.into_inner();
    document.push(b'\n');
    String::from_utf8(document).map_err(xml_error)
}

fn write_channel<W: Write>(
    writer: &mut Writer<W>,
    channel: &ChannelStatus,
) -> Result<(), RenderError> {
    let start = BytesStart::new("channel").with_attributes([("id", channel.id.as_str())]);
    writer.write_event(Event::Start(start)).map_err(xml_error)?;

    write_text(writer, "display-name", &LocalizedText::new(channel.title()))?;
    write_text(
        writer,
        "display-name",
        &LocalizedText::new(channel.number.to_string()),
    )?;

    if let Some(icon) = channel.icon_url() {
        let icon = BytesStart::new("icon").with_attributes([
            ("src", icon),
            ("width", ICON_WIDTH),
            ("height", ICON_HEIGHT),
        ]);
        writer.write_event(Event::Empty(icon)).map_err(xml_error)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("channel")))
        .map_err(xml_error)
}

fn write_programme<W: Write>(
    writer: &mut Writer<W>,
    channel: &ChannelStatus,
    program: &Program,
) -> Result<(), RenderError> {
    let start = program.start.to_xmltv();
    let stop = program.stop.to_xmltv();
    let programme = BytesStart::new("programme").with_attributes([
        ("start", start.as_str()),
        ("stop", stop.as_str()),
        ("channel", channel.id.as_str()),
    ]);
    writer.write_event(Event::Start(programme)).map_err(xml_error)?;

    write_text(writer, "title", &program.title)?;
    if let Some(description) = &program.description {
        write_text(writer, "desc", description)?;
    }
    for category in &program.categories {
        write_text(writer, "category", category)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("programme")))
        .map_err(xml_error)
}

fn write_text<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &LocalizedText,
) -> Result<(), RenderError> {
    let mut start = BytesStart::new(name);
    if let Some(lang) = &text.lang {
        start.push_attribute(("lang", lang.as_str()));
    }

    writer.write_event(Event::Start(start)).map_err(xml_error)?;
    writer
        .write_event(Event::Text(BytesText::new(&xml_chars(&text.value))))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_error)
}

/**
    Drop characters XML 1.0 does not allow in a document at all, even
    escaped: C0 controls other than tab, LF and CR, and U+FFFE / U+FFFF.
*/
fn xml_chars(s: &str) -> Cow<'_, str> {
    fn invalid(c: char) -> bool {
        matches!(
            c,
            '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}'
        )
    }

    if s.chars().any(invalid) {
        Cow::Owned(s.chars().filter(|&c| !invalid(c)).collect())
    } else {
        Cow::Borrowed(s)
    }
}

fn xml_error(err: impl Display) -> RenderError {
    RenderError(err.to_string())
}
