//! GPX export of a generated route, for checking a run in a map viewer.

use std::fmt::Write;

use crate::generators::format_epoch_ms;
use crate::geodesy::TrackPoint;

const GPX_NAMESPACE: &str = "http://www.topografix.com/GPX/1/1";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const GPX_SCHEMA: &str = "http://www.topografix.com/GPX/1/1/gpx.xsd";

/// Renders route points as a GPX 1.1 document with one running track.
///
/// Points keep the stored six-decimal precision; times are RFC 3339 UTC.
pub fn generate_gpx(points: &[TrackPoint], name: &str) -> String {
    let name = XmlText(name);
    let mut doc = String::with_capacity(256 + points.len() * 96);

    // Writing into a String cannot fail.
    let _ = writeln!(doc, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = writeln!(
        doc,
        r#"<gpx version="1.1" creator="track-gen" xmlns="{GPX_NAMESPACE}" xmlns:xsi="{XSI_NAMESPACE}" xsi:schemaLocation="{GPX_NAMESPACE} {GPX_SCHEMA}">"#
    );

    let _ = writeln!(doc, "  <metadata>");
    let _ = writeln!(doc, "    <name>{name}</name>");
    if let Some(first) = points.first() {
        let _ = writeln!(doc, "    <time>{}</time>", format_epoch_ms(first.locate_time_ms));
    }
    let _ = writeln!(doc, "  </metadata>");

    let _ = writeln!(doc, "  <trk>\n    <name>{name}</name>\n    <type>running</type>\n    <trkseg>");
    for point in points {
        let _ = writeln!(
            doc,
            r#"      <trkpt lat="{:.6}" lon="{:.6}"><time>{}</time></trkpt>"#,
            point.lat_lng.latitude,
            point.lat_lng.longitude,
            format_epoch_ms(point.locate_time_ms)
        );
    }
    let _ = writeln!(doc, "    </trkseg>\n  </trk>\n</gpx>");

    doc
}

/// Text escaped for XML element content and attribute values.
struct XmlText<'a>(&'a str);

impl std::fmt::Display for XmlText<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for c in self.0.chars() {
            match c {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                '\'' => f.write_str("&apos;")?,
                _ => f.write_char(c)?,
            }
        }
        Ok(())
    }
}
