use serde::Serialize;
use serde_json::Value;

use crate::render::error::SerializationError;
use crate::render::GeoSerializer;
use crate::timeline::{format_instant, Rgba, TimelineDocument};

// 1x1 transparent PNG, tinted by the billboard color
const STATION_IMAGE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNk+A8AAQUBAScY42YAAAAASUVORK5CYII=";

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct Packet {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    clock: Option<ClockPacket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    availability: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    billboard: Option<Billboard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<Label>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<Model>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathGraphics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    polyline: Option<Polyline>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClockPacket {
    interval: String,
    current_time: String,
    multiplier: f64,
    range: &'static str,
    step: &'static str,
}

#[derive(Debug, Serialize)]
struct ColorValue {
    rgba: [u8; 4],
}

impl From<Rgba> for ColorValue {
    fn from(color: Rgba) -> Self {
        Self { rgba: color.0 }
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct Position {
    #[serde(skip_serializing_if = "Option::is_none")]
    interpolation_algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    interpolation_degree: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference_frame: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    epoch: Option<String>,
    cartographic_degrees: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct Billboard {
    image: &'static str,
    scale: f64,
    color: ColorValue,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Label {
    text: String,
    font: String,
    style: &'static str,
    fill_color: ColorValue,
    outline_color: ColorValue,
    outline_width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pixel_offset: Option<PixelOffset>,
}

#[derive(Debug, Serialize)]
struct PixelOffset {
    cartesian2: [f64; 2],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Model {
    gltf: String,
    scale: f64,
    minimum_pixel_size: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PathGraphics {
    material: PolylineOutlineMaterial,
    width: f64,
    lead_time: f64,
    trail_time: f64,
    resolution: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PolylineOutlineMaterial {
    polyline_outline: PolylineOutline,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PolylineOutline {
    color: ColorValue,
    outline_color: ColorValue,
    outline_width: f64,
}

#[derive(Debug, Serialize)]
struct Polyline {
    positions: Position,
    material: GlowMaterial,
    width: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GlowMaterial {
    polyline_glow: PolylineGlow,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PolylineGlow {
    color: ColorValue,
    glow_power: f64,
    taper_power: f64,
}

/// Time-dynamic animation markup (Cesium CZML).
pub struct CzmlSerializer;

impl CzmlSerializer {
    fn packets(doc: &TimelineDocument) -> Vec<Packet> {
        let hints = &doc.hints;
        let label = |text: &str, color: Rgba, offset: Option<[f64; 2]>| Label {
            text: text.to_string(),
            font: hints.label_font.clone(),
            style: "FILL_AND_OUTLINE",
            fill_color: color.into(),
            outline_color: Rgba::BLACK.into(),
            outline_width: 2.0,
            pixel_offset: offset.map(|cartesian2| PixelOffset { cartesian2 }),
        };

        let mut packets = vec![Packet {
            id: "document".into(),
            name: Some(doc.name.clone()),
            version: Some("1.0"),
            clock: Some(ClockPacket {
                interval: doc.clock.interval.to_string(),
                current_time: format_instant(doc.clock.current_time),
                multiplier: doc.clock.multiplier,
                range: "LOOP_STOP",
                step: "SYSTEM_CLOCK_MULTIPLIER",
            }),
            ..Default::default()
        }];

        for station in &doc.stations {
            packets.push(Packet {
                id: format!("GroundStation/{}", station.id),
                name: Some(station.name.clone()),
                position: Some(Position {
                    cartographic_degrees: vec![
                        station.longitude_deg.into(),
                        station.latitude_deg.into(),
                        0.into(),
                    ],
                    ..Default::default()
                }),
                billboard: Some(Billboard {
                    image: STATION_IMAGE,
                    scale: 0.5,
                    color: station.color.into(),
                }),
                label: Some(label(&station.name, station.color, Some([10.0, 0.0]))),
                ..Default::default()
            });
        }

        for track in &doc.tracks {
            let mut points = Vec::with_capacity(track.points.len() * 4);
            for p in &track.points {
                points.push(Value::from(format_instant(p.instant)));
                points.push(p.longitude_deg.into());
                points.push(p.latitude_deg.into());
                points.push(p.altitude_m.into());
            }

            packets.push(Packet {
                id: format!("Satellite/{}", track.object_id),
                name: Some(track.name.clone()),
                availability: Some(track.availability.to_string()),
                label: Some(label(
                    &format!("SAT {}", track.object_id),
                    track.color,
                    Some([0.0, -30.0]),
                )),
                model: hints.model_url.as_ref().map(|url| Model {
                    gltf: url.clone(),
                    scale: hints.model_scale,
                    minimum_pixel_size: hints.model_minimum_pixel_size,
                }),
                path: Some(PathGraphics {
                    material: PolylineOutlineMaterial {
                        polyline_outline: PolylineOutline {
                            color: track.color.into(),
                            outline_color: Rgba::BLACK.into(),
                            outline_width: 2.0,
                        },
                    },
                    width: 2.0,
                    lead_time: hints.lead_time_s,
                    trail_time: hints.trail_time_s,
                    resolution: hints.path_resolution_s,
                }),
                position: Some(Position {
                    interpolation_algorithm: Some(hints.interpolation_algorithm.clone()),
                    interpolation_degree: Some(hints.interpolation_degree),
                    reference_frame: Some(hints.reference_frame.clone()),
                    epoch: Some(format_instant(track.availability.start)),
                    cartographic_degrees: points,
                }),
                ..Default::default()
            });
        }

        for los in &doc.lines_of_sight {
            packets.push(Packet {
                id: format!("LoS/{}/{}", los.station_id, los.object_id),
                name: Some(los.name.clone()),
                availability: Some(los.availability.to_string()),
                polyline: Some(Polyline {
                    positions: Position {
                        cartographic_degrees: los.positions.iter().map(|&v| v.into()).collect(),
                        ..Default::default()
                    },
                    material: GlowMaterial {
                        polyline_glow: PolylineGlow {
                            color: los.color.into(),
                            glow_power: 0.2,
                            taper_power: 0.5,
                        },
                    },
                    width: 2.0,
                }),
                ..Default::default()
            });
        }

        packets
    }
}

impl GeoSerializer for CzmlSerializer {
    fn render(&self, doc: &TimelineDocument) -> Result<Vec<u8>, SerializationError> {
        Ok(serde_json::to_vec_pretty(&Self::packets(doc))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{
        Clock, Interval, LineOfSightEntry, RenderHints, StationEntry, TrackEntry, TrackPoint,
    };
    use chrono::{Duration, TimeZone, Utc};

    fn document() -> TimelineDocument {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 8, 0, 0, 0).unwrap();
        let t1 = t0 + Duration::minutes(5);
        TimelineDocument {
            name: "Satellite and LoS Visualization".into(),
            clock: Clock {
                interval: Interval::new(t0, t0 + Duration::days(1)),
                current_time: t0,
                multiplier: 60.0,
            },
            availability: Some(Interval::new(t0, t1)),
            stations: vec![StationEntry {
                id: "US_West".into(),
                name: "Boardman, Oregon (USA)".into(),
                longitude_deg: -119.7006,
                latitude_deg: 45.8397,
                color: Rgba::RED,
            }],
            tracks: vec![TrackEntry {
                object_id: "42917".into(),
                name: "Satellite 42917".into(),
                color: Rgba::CYAN,
                availability: Interval::new(t0, t1),
                points: vec![
                    TrackPoint {
                        instant: t0,
                        longitude_deg: -120.0,
                        latitude_deg: 0.0,
                        altitude_m: 35_786_000.0,
                    },
                    TrackPoint {
                        instant: t1,
                        longitude_deg: -119.9,
                        latitude_deg: 0.01,
                        altitude_m: 35_786_000.0,
                    },
                ],
            }],
            lines_of_sight: vec![LineOfSightEntry {
                station_id: "US_West".into(),
                object_id: "42917".into(),
                name: "Line of Sight - Boardman, Oregon (USA) to Satellite 42917".into(),
                color: Rgba::RED,
                availability: Interval::new(t1, t1),
                instants: vec![t1],
                positions: vec![-119.7006, 45.8397, 0.0, -119.9, 0.01, 35_786_000.0],
            }],
            hints: RenderHints::default(),
        }
    }

    #[test]
    fn emits_document_station_track_and_los_packets() {
        let bytes = CzmlSerializer.render(&document()).unwrap();
        let packets: Vec<Value> = serde_json::from_slice(&bytes).unwrap();

        let ids: Vec<_> = packets.iter().map(|p| p["id"].as_str().unwrap()).collect();
        assert_eq!(
            ids,
            vec!["document", "GroundStation/US_West", "Satellite/42917", "LoS/US_West/42917"]
        );

        let clock = &packets[0]["clock"];
        assert_eq!(clock["interval"], "2024-05-08T00:00:00Z/2024-05-09T00:00:00Z");
        assert_eq!(clock["currentTime"], "2024-05-08T00:00:00Z");
        assert_eq!(clock["range"], "LOOP_STOP");
    }

    #[test]
    fn track_position_is_timestamped_quadruples() {
        let bytes = CzmlSerializer.render(&document()).unwrap();
        let packets: Vec<Value> = serde_json::from_slice(&bytes).unwrap();
        let sat = &packets[2];

        assert_eq!(sat["availability"], "2024-05-08T00:00:00Z/2024-05-08T00:05:00Z");
        let position = &sat["position"];
        assert_eq!(position["epoch"], "2024-05-08T00:00:00Z");
        assert_eq!(position["interpolationAlgorithm"], "LAGRANGE");
        let coords = position["cartographicDegrees"].as_array().unwrap();
        assert_eq!(coords.len(), 8);
        assert_eq!(coords[4], "2024-05-08T00:05:00Z");
        assert_eq!(coords[7], 35_786_000.0);
        assert!(sat.get("model").is_none());
    }

    #[test]
    fn los_polyline_carries_flattened_pairs() {
        let bytes = CzmlSerializer.render(&document()).unwrap();
        let packets: Vec<Value> = serde_json::from_slice(&bytes).unwrap();
        let los = &packets[3];

        assert_eq!(los["availability"], "2024-05-08T00:05:00Z/2024-05-08T00:05:00Z");
        let coords = los["polyline"]["positions"]["cartographicDegrees"]
            .as_array()
            .unwrap();
        assert_eq!(coords.len(), 6);
        assert_eq!(los["polyline"]["material"]["polylineGlow"]["color"]["rgba"][0], 255);
    }
}
