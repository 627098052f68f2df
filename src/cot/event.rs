// src/cot/event.rs
//! Cursor on Target event tree and its XML form

/// XML declaration sent ahead of every event
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// CoT schema version
pub const COT_VERSION: &str = "2.0";

/// "how" code for machine generated, GPS derived positions
pub const HOW_GPS: &str = "m-g";

/// Circular/linear error value meaning "unknown"
pub const UNKNOWN_ERROR: &str = "9999999.0";

/// A CoT `<event>` with its point and detail.
///
/// Attribute values are kept as text so that numbers from the GPS report
/// are written exactly as received.
#[derive(Debug, Clone, PartialEq)]
pub struct CotEvent {
    pub version: String,
    pub event_type: String,
    pub uid: String,
    pub how: String,
    pub time: String,
    pub start: String,
    pub stale: String,
    pub point: Point,
    pub detail: Detail,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub lat: String,
    pub lon: String,
    pub hae: String,
    pub le: String,
    pub ce: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Detail {
    pub track: Track,
    pub contact: Contact,
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub course: String,
    /// Meters per second
    pub speed: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub callsign: String,
}

impl CotEvent {
    /// Render the `<event>` element on a single line
    pub fn to_xml(&self) -> String {
        let mut xml = format!(
            r#"<event version="{}" type="{}" uid="{}" how="{}" time="{}" start="{}" stale="{}">"#,
            escape_attr(&self.version),
            escape_attr(&self.event_type),
            escape_attr(&self.uid),
            escape_attr(&self.how),
            escape_attr(&self.time),
            escape_attr(&self.start),
            escape_attr(&self.stale),
        );

        xml.push_str(&self.point.to_xml());
        xml.push_str(&self.detail.to_xml());
        xml.push_str("</event>");
        xml
    }

    /// Wire form: declaration, newline, event, newline
    pub fn to_bytes(&self) -> Vec<u8> {
        format!("{}\n{}\n", XML_DECLARATION, self.to_xml()).into_bytes()
    }
}

impl Point {
    fn to_xml(&self) -> String {
        format!(
            r#"<point lat="{}" lon="{}" hae="{}" le="{}" ce="{}" />"#,
            escape_attr(&self.lat),
            escape_attr(&self.lon),
            escape_attr(&self.hae),
            escape_attr(&self.le),
            escape_attr(&self.ce),
        )
    }
}

impl Detail {
    fn to_xml(&self) -> String {
        let remarks = if self.remarks.is_empty() {
            "<remarks />".to_string()
        } else {
            format!("<remarks>{}</remarks>", escape_text(&self.remarks))
        };

        format!(
            r#"<detail><track course="{}" speed="{}" /><contact callsign="{}" />{}</detail>"#,
            escape_attr(&self.track.course),
            escape_attr(&self.track.speed),
            escape_attr(&self.contact.callsign),
            remarks,
        )
    }
}

/// Escape element text. Output is ASCII; other characters become
/// numeric character references.
fn escape_text(s: &str) -> String {
    ascii_refs(&s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;"))
}

/// Escape an attribute value, including whitespace that attribute
/// normalization would otherwise fold into spaces
fn escape_attr(s: &str) -> String {
    ascii_refs(
        &s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\r', "&#13;")
            .replace('\n', "&#10;")
            .replace('\t', "&#09;"),
    )
}

fn ascii_refs(s: &str) -> String {
    if s.is_ascii() {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            out.push_str(&format!("&#{};", c as u32));
        }
    }
    out
}
