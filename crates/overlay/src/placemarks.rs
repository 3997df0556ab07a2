//! Point placemarks for the raw survey stations.

use quick_xml::escape::escape;

use survey_common::SamplePoint;

/// A KML document with one `Placemark` per sample.
///
/// Coordinates are written as `x,y,0`, so X is read as longitude and Y as
/// latitude by the viewer.
pub fn samples_to_kml(samples: &[SamplePoint], name: &str) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<kml xmlns=\"http://www.opengis.net/kml/2.2\">\n");
    xml.push_str("<Document>\n");
    xml.push_str(&format!("  <name>{}</name>\n", escape(name)));
    xml.push_str("  <description>Survey station locations</description>\n");

    for s in samples {
        xml.push_str("  <Placemark>\n");
        xml.push_str(&format!("    <name>Value: {:.2}</name>\n", s.value));
        xml.push_str(&format!(
            "    <description>X={}, Y={}, Value={}</description>\n",
            s.x, s.y, s.value
        ));
        xml.push_str(&format!(
            "    <Point><coordinates>{},{},0</coordinates></Point>\n",
            s.x, s.y
        ));
        xml.push_str("  </Placemark>\n");
    }

    xml.push_str("</Document>\n");
    xml.push_str("</kml>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_placemark_per_sample() {
        let samples = [
            SamplePoint::new(112.75, -7.25, 12.346),
            SamplePoint::new(112.751, -7.251, -3.0),
        ];
        let kml = samples_to_kml(&samples, "Stations");

        assert_eq!(kml.matches("<Placemark>").count(), 2);
        assert!(kml.contains("<name>Value: 12.35</name>"));
        assert!(kml.contains("<name>Value: -3.00</name>"));
        assert!(kml.contains("<coordinates>112.75,-7.25,0</coordinates>"));
        assert!(kml.contains("<coordinates>112.751,-7.251,0</coordinates>"));
    }

    #[test]
    fn test_name_is_escaped() {
        let kml = samples_to_kml(&[], "A & B");
        assert!(kml.contains("<name>A &amp; B</name>"));
        assert!(!kml.contains("<Placemark>"));
    }
}
