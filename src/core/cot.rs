//! Cursor-on-Target (CoT) XML rendering for tracks (spec.md §6).
//!
//! Hand-built template rather than a DOM builder: the output shape is fixed
//! and small, and a handful of `format!` substitutions round-trips cleanly
//! through any conformant XML parser (see the `quick-xml` dev-dependency
//! tests below).

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::core::time::format_iso;
use crate::models::track::Track;

const STALE_AFTER_MINUTES: i64 = 5;

fn cot_type_for(platform_type: &str) -> &'static str {
    match platform_type.to_lowercase().as_str() {
        "airplane" => "a-f-A",
        "truck" | "car" => "a-u-G-E-V",
        "boat" => "a-u-S",
        _ => "a-u-G",
    }
}

/// Render a single track as a CoT XML `<event>` document.
pub fn to_cursor_on_target(track: &Track) -> String {
    let now = Utc::now();
    let stale = now + Duration::minutes(STALE_AFTER_MINUTES);
    let label = track.ontology.platform_type.as_str();
    let callsign: String = label.to_uppercase().chars().take(3).collect();

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<event version=\"2.0\" uid=\"{uid}\" type=\"{cot_type}\" time=\"{time}\" start=\"{time}\" stale=\"{stale}\" how=\"m-g\">\n\
  <point lat=\"{lat}\" lon=\"{lon}\" hae=\"0\" ce=\"10\" le=\"10\"/>\n\
  <detail>\n\
    <contact callsign=\"GS-{callsign}\"/>\n\
    <remarks>{remarks}</remarks>\n\
  </detail>\n\
</event>",
        uid = Uuid::new_v4(),
        cot_type = cot_type_for(label),
        time = format_iso(now),
        stale = format_iso(stale),
        lat = track.location.position.latitude_degrees,
        lon = track.location.position.longitude_degrees,
        remarks = format!("Detected {} (conf: {:.2})", label.to_lowercase(), track.confidence),
    )
}

/// Render a batch of tracks as newline-joined CoT documents, the shape
/// served by `GET /tracks/cot` and `/ws/cot`'s snapshot frame.
pub fn to_cursor_on_target_batch(tracks: &[Track]) -> String {
    tracks
        .iter()
        .map(to_cursor_on_target)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::detection::{BBox, Detection};
    use quick_xml::events::Event;
    use quick_xml::reader::Reader;

    fn sample_track() -> Track {
        let d = Detection::new("airplane", 0.91, BBox(0, 0, 1, 1)).with_geo(33.94, -118.40);
        Track::from_detection(&d)
    }

    #[test]
    fn type_map_matches_spec() {
        assert_eq!(cot_type_for("Airplane"), "a-f-A");
        assert_eq!(cot_type_for("Truck"), "a-u-G-E-V");
        assert_eq!(cot_type_for("Car"), "a-u-G-E-V");
        assert_eq!(cot_type_for("Boat"), "a-u-S");
        assert_eq!(cot_type_for("Bus"), "a-u-G");
    }

    #[test]
    fn round_trip_preserves_lat_lon_type_callsign() {
        let track = sample_track();
        let xml = to_cursor_on_target(&track);

        let mut reader = Reader::from_str(&xml);
        reader.config_mut().trim_text(true);

        let mut seen_type = None;
        let mut seen_lat = None;
        let mut seen_lon = None;
        let mut seen_callsign = None;

        loop {
            match reader.read_event().unwrap() {
                Event::Eof => break,
                Event::Empty(e) | Event::Start(e) => {
                    let name = e.name().as_ref().to_vec();
                    for attr in e.attributes().flatten() {
                        let key = attr.key.as_ref().to_vec();
                        let value = attr.unescape_value().unwrap().to_string();
                        if name == b"event" && key == b"type" {
                            seen_type = Some(value.clone());
                        }
                        if name == b"point" && key == b"lat" {
                            seen_lat = Some(value.clone());
                        }
                        if name == b"point" && key == b"lon" {
                            seen_lon = Some(value.clone());
                        }
                        if name == b"contact" && key == b"callsign" {
                            seen_callsign = Some(value.clone());
                        }
                    }
                }
                _ => {}
            }
        }

        assert_eq!(seen_type.as_deref(), Some("a-f-A"));
        assert_eq!(seen_lat.as_deref(), Some("33.94"));
        assert_eq!(seen_lon.as_deref(), Some("-118.4"));
        assert_eq!(seen_callsign.as_deref(), Some("GS-AIR"));
    }

    #[test]
    fn remarks_uses_lowercase_label() {
        let track = sample_track();
        let xml = to_cursor_on_target(&track);
        assert!(xml.contains("Detected airplane (conf: 0.91)"));
        assert!(!xml.contains("Detected Airplane"));
    }

    #[test]
    fn batch_joins_with_newlines() {
        let tracks = vec![sample_track(), sample_track()];
        let batch = to_cursor_on_target_batch(&tracks);
        assert_eq!(batch.matches("<?xml").count(), 2);
    }
}
