use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::render::error::SerializationError;
use crate::render::GeoSerializer;
use crate::timeline::{format_instant, Interval, Rgba, TimelineDocument};

const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";

struct KmlWriter {
    writer: Writer<Vec<u8>>,
}

impl KmlWriter {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), SerializationError> {
        self.writer
            .write_event(event)
            .map_err(|e| SerializationError::Xml(e.to_string()))
    }

    fn start(&mut self, name: &str) -> Result<(), SerializationError> {
        self.event(Event::Start(BytesStart::new(name)))
    }

    fn start_with(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), SerializationError> {
        let mut elem = BytesStart::new(name);
        for attr in attrs {
            elem.push_attribute(*attr);
        }
        self.event(Event::Start(elem))
    }

    fn end(&mut self, name: &str) -> Result<(), SerializationError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, name: &str, value: &str) -> Result<(), SerializationError> {
        self.start(name)?;
        self.event(Event::Text(BytesText::new(value)))?;
        self.end(name)
    }

    fn line_style(&mut self, id: &str, color: Rgba, width: f64) -> Result<(), SerializationError> {
        self.start_with("Style", &[("id", id)])?;
        self.start("LineStyle")?;
        self.text("color", &color.to_kml_hex())?;
        self.text("width", &width.to_string())?;
        self.end("LineStyle")?;
        self.end("Style")
    }

    fn time_span(&mut self, interval: &Interval) -> Result<(), SerializationError> {
        self.start("TimeSpan")?;
        self.text("begin", &format_instant(interval.start))?;
        self.text("end", &format_instant(interval.end))?;
        self.end("TimeSpan")
    }

    fn line_string(&mut self, coordinates: &str) -> Result<(), SerializationError> {
        self.start("LineString")?;
        self.text("altitudeMode", "absolute")?;
        self.text("coordinates", coordinates)?;
        self.end("LineString")
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

fn coordinate(lon: f64, lat: f64, alt: f64) -> String {
    format!("{},{},{}", lon, lat, alt)
}

/// Static placemark markup (KML 2.2).
pub struct KmlSerializer;

impl GeoSerializer for KmlSerializer {
    fn render(&self, doc: &TimelineDocument) -> Result<Vec<u8>, SerializationError> {
        let mut w = KmlWriter::new();
        w.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        w.start_with("kml", &[("xmlns", KML_NAMESPACE)])?;
        w.start("Document")?;
        w.text("name", &doc.name)?;

        for station in &doc.stations {
            w.start_with("Style", &[("id", &format!("station-{}", station.id))])?;
            w.start("IconStyle")?;
            w.text("color", &station.color.to_kml_hex())?;
            w.end("IconStyle")?;
            w.start("LabelStyle")?;
            w.text("color", &station.color.to_kml_hex())?;
            w.end("LabelStyle")?;
            w.end("Style")?;
        }
        for track in &doc.tracks {
            w.line_style(&format!("track-{}", track.object_id), track.color, 3.0)?;
        }
        for los in &doc.lines_of_sight {
            w.line_style(
                &format!("los-{}-{}", los.station_id, los.object_id),
                los.color,
                2.0,
            )?;
        }

        for station in &doc.stations {
            w.start("Placemark")?;
            w.text("name", &station.name)?;
            w.text("styleUrl", &format!("#station-{}", station.id))?;
            w.start("Point")?;
            w.text(
                "coordinates",
                &coordinate(station.longitude_deg, station.latitude_deg, 0.0),
            )?;
            w.end("Point")?;
            w.end("Placemark")?;
        }

        for track in &doc.tracks {
            let coordinates: Vec<String> = track
                .points
                .iter()
                .map(|p| coordinate(p.longitude_deg, p.latitude_deg, p.altitude_m))
                .collect();

            w.start("Folder")?;
            w.text("name", &track.name)?;

            w.start("Placemark")?;
            w.text("name", &format!("{} Path", track.name))?;
            w.time_span(&track.availability)?;
            w.text("styleUrl", &format!("#track-{}", track.object_id))?;
            w.line_string(&coordinates.join(" "))?;
            w.end("Placemark")?;

            for (point, coords) in track.points.iter().zip(&coordinates) {
                w.start("Placemark")?;
                w.text("name", &format_instant(point.instant))?;
                w.start("TimeStamp")?;
                w.text("when", &format_instant(point.instant))?;
                w.end("TimeStamp")?;
                w.start("Point")?;
                w.text("altitudeMode", "absolute")?;
                w.text("coordinates", coords)?;
                w.end("Point")?;
                w.end("Placemark")?;
            }
            w.end("Folder")?;
        }

        for los in &doc.lines_of_sight {
            w.start("Placemark")?;
            w.text("name", &los.name)?;
            w.time_span(&los.availability)?;
            w.text(
                "styleUrl",
                &format!("#los-{}-{}", los.station_id, los.object_id),
            )?;
            w.start("MultiGeometry")?;
            for (_, segment) in los.segments() {
                let line = format!(
                    "{} {}",
                    coordinate(segment[0], segment[1], segment[2]),
                    coordinate(segment[3], segment[4], segment[5])
                );
                w.line_string(&line)?;
            }
            w.end("MultiGeometry")?;
            w.end("Placemark")?;
        }

        w.end("Document")?;
        w.end("kml")?;
        Ok(w.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{
        Clock, LineOfSightEntry, RenderHints, StationEntry, TrackEntry, TrackPoint,
    };
    use chrono::{Duration, TimeZone, Utc};

    fn document() -> TimelineDocument {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 7, 0, 0, 0).unwrap();
        let points: Vec<TrackPoint> = (0..3)
            .map(|i| TrackPoint {
                instant: t0 + Duration::minutes(5 * i),
                longitude_deg: 10.0 * i as f64,
                latitude_deg: 5.0,
                altitude_m: 420_000.0,
            })
            .collect();
        TimelineDocument {
            name: "ISS & friends".into(),
            clock: Clock {
                interval: Interval::new(t0, t0 + Duration::minutes(15)),
                current_time: t0,
                multiplier: 60.0,
            },
            availability: None,
            stations: vec![StationEntry {
                id: "Asia_Pacific".into(),
                name: "Sydney (Australia)".into(),
                longitude_deg: 151.2093,
                latitude_deg: -33.8688,
                color: Rgba([148, 0, 211, 255]),
            }],
            tracks: vec![TrackEntry {
                object_id: "25544".into(),
                name: "ISS (ZARYA)".into(),
                color: Rgba::RED,
                availability: Interval::new(t0, t0 + Duration::minutes(10)),
                points,
            }],
            lines_of_sight: vec![LineOfSightEntry {
                station_id: "Asia_Pacific".into(),
                object_id: "25544".into(),
                name: "Line of Sight".into(),
                color: Rgba::RED,
                availability: Interval::new(t0, t0 + Duration::minutes(5)),
                instants: vec![t0, t0 + Duration::minutes(5)],
                positions: vec![
                    151.2093, -33.8688, 0.0, 0.0, 5.0, 420000.0,
                    151.2093, -33.8688, 0.0, 10.0, 5.0, 420000.0,
                ],
            }],
            hints: RenderHints::default(),
        }
    }

    #[test]
    fn placemarks_for_every_entity() {
        let bytes = KmlSerializer.render(&document()).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        // station + path + 3 samples + line of sight
        assert_eq!(text.matches("<Placemark>").count(), 6);
        assert!(text.contains("<name>ISS &amp; friends</name>"));
        assert!(text.contains("<coordinates>151.2093,-33.8688,0</coordinates>"));
        assert!(text.contains("<coordinates>0,5,420000 10,5,420000 20,5,420000</coordinates>"));
        assert_eq!(text.matches("<LineString>").count(), 3);
    }

    #[test]
    fn styles_use_kml_color_order() {
        let bytes = KmlSerializer.render(&document()).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.contains("<Style id=\"station-Asia_Pacific\">"));
        assert!(text.contains("<color>ffd30094</color>"));
        assert!(text.contains("<color>ff0000ff</color>"));
        assert!(text.contains("<begin>2024-05-07T00:00:00Z</begin>"));
    }
}
