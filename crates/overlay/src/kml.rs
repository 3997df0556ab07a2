//! The GroundOverlay descriptor (`doc.kml`).

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use survey_common::{BoundingBox, SurveyError, SurveyResult};

/// What `doc.kml` declares: titles, the image reference and the four edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayDescriptor {
    pub title: String,
    pub overlay_name: String,
    /// Path of the image relative to the archive root.
    pub href: String,
    pub bounds: BoundingBox,
}

impl OverlayDescriptor {
    /// Render as KML.
    ///
    /// North/south are `max_y`/`min_y` and east/west are `max_x`/`min_x`,
    /// written with the shortest decimal that parses back to the same value.
    pub fn to_kml(&self) -> String {
        let b = &self.bounds;
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<kml xmlns=\"http://www.opengis.net/kml/2.2\">\n");
        xml.push_str("<Document>\n");
        xml.push_str(&format!("  <name>{}</name>\n", escape(self.title.as_str())));
        xml.push_str("  <GroundOverlay>\n");
        xml.push_str(&format!(
            "    <name>{}</name>\n",
            escape(self.overlay_name.as_str())
        ));
        xml.push_str(&format!(
            "    <Icon><href>{}</href></Icon>\n",
            escape(self.href.as_str())
        ));
        xml.push_str("    <LatLonBox>\n");
        xml.push_str(&format!("      <north>{}</north>\n", b.max_y));
        xml.push_str(&format!("      <south>{}</south>\n", b.min_y));
        xml.push_str(&format!("      <east>{}</east>\n", b.max_x));
        xml.push_str(&format!("      <west>{}</west>\n", b.min_x));
        xml.push_str("    </LatLonBox>\n");
        xml.push_str("  </GroundOverlay>\n");
        xml.push_str("</Document>\n");
        xml.push_str("</kml>\n");
        xml
    }

    /// Parse a GroundOverlay descriptor.
    ///
    /// The first GroundOverlay is used. A missing href or edge, or an edge
    /// that is not a number, is a `MalformedArchive` error.
    pub fn parse(kml: &str) -> SurveyResult<Self> {
        let mut reader = Reader::from_str(kml);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut path: Vec<Vec<u8>> = Vec::new();
        let mut fields = Fields::default();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => path.push(e.local_name().as_ref().to_vec()),
                Ok(Event::End(_)) => {
                    if path.last().map(|n| n.as_slice()) == Some(b"GroundOverlay".as_slice()) {
                        fields.overlay_done = true;
                    }
                    path.pop();
                }
                Ok(Event::Text(t)) => {
                    let text = t.unescape().map_err(|e| {
                        malformed(format!(
                            "bad text at position {}: {}",
                            reader.buffer_position(),
                            e
                        ))
                    })?;
                    fields.assign(&path, text.trim());
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(malformed(format!(
                        "XML parsing error at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        fields.finish()
    }
}

#[derive(Default)]
struct Fields {
    title: Option<String>,
    overlay_name: Option<String>,
    href: Option<String>,
    north: Option<String>,
    south: Option<String>,
    east: Option<String>,
    west: Option<String>,
    overlay_done: bool,
}

impl Fields {
    fn assign(&mut self, path: &[Vec<u8>], text: &str) {
        let tail: Vec<&[u8]> = path.iter().rev().take(2).map(|n| n.as_slice()).collect();
        let (leaf, parent) = match tail.as_slice() {
            [leaf, parent, ..] => (*leaf, *parent),
            _ => return,
        };

        let done = self.overlay_done;
        let slot = match (parent, leaf) {
            (b"Document", b"name") => &mut self.title,
            _ if done => return,
            (b"GroundOverlay", b"name") => &mut self.overlay_name,
            (b"Icon", b"href") => &mut self.href,
            (b"LatLonBox", b"north") => &mut self.north,
            (b"LatLonBox", b"south") => &mut self.south,
            (b"LatLonBox", b"east") => &mut self.east,
            (b"LatLonBox", b"west") => &mut self.west,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(text.to_string());
        }
    }

    fn finish(self) -> SurveyResult<OverlayDescriptor> {
        let edge = |value: Option<String>, name: &str| -> SurveyResult<f64> {
            let text = value.ok_or_else(|| malformed(format!("descriptor has no <{}>", name)))?;
            text.parse::<f64>()
                .map_err(|_| malformed(format!("<{}> is not a number: '{}'", name, text)))
        };

        let href = self
            .href
            .filter(|h| !h.is_empty())
            .ok_or_else(|| malformed("descriptor has no <href>"))?;
        let bounds = BoundingBox::new(
            edge(self.west, "west")?,
            edge(self.south, "south")?,
            edge(self.east, "east")?,
            edge(self.north, "north")?,
        );

        Ok(OverlayDescriptor {
            title: self.title.unwrap_or_default(),
            overlay_name: self.overlay_name.unwrap_or_default(),
            href,
            bounds,
        })
    }
}

fn malformed(message: impl Into<String>) -> SurveyError {
    SurveyError::MalformedArchive(message.into())
}
