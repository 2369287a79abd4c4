//! Value type for a single sensor observation (C1).

use serde::{Deserialize, Serialize};

/// Sensing modality that produced a [`Detection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Optical,
    Sar,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Optical => "optical",
            Source::Sar => "sar",
        }
    }
}

/// Axis-aligned pixel bounding box, `(x1, y1, x2, y2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BBox(pub i32, pub i32, pub i32, pub i32);

/// A single object detection emitted by an (opaque) upstream `Detector`.
///
/// `label` is a lowercase string from a finite tactical vocabulary
/// (`airplane`, `truck`, `car`, `boat`, `bus`) plus whatever SAR contributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub confidence: f64,
    pub bbox: BBox,
    pub geo_location: Option<(f64, f64)>,
    pub source: Option<Source>,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f64, bbox: BBox) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox,
            geo_location: None,
            source: None,
        }
    }

    pub fn with_geo(mut self, lat: f64, lon: f64) -> Self {
        self.geo_location = Some((lat, lon));
        self
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }
}

/// A value the upstream object-detection model can produce a batch of.
/// The detector itself is out of scope (spec.md §1); this trait is the
/// narrow adapter seam implementations plug a real model into.
pub trait Detector {
    fn detect(&self, image_path: &str) -> anyhow::Result<Vec<Detection>>;
}

/// Tactical vocabulary the detector is constrained to (spec.md §3) plus
/// whatever label SAR contributes.
pub const TACTICAL_CLASSES: [&str; 5] = ["airplane", "truck", "car", "boat", "bus"];

/// Stand-in for the real YOLO-backed `ObjectDetector` (spec.md §1: the
/// detection model itself is out of scope). Returns a single canned
/// detection per call so the CLI ingestion path has something to run
/// against without a real model or image.
pub struct MockObjectDetector;

impl Detector for MockObjectDetector {
    fn detect(&self, image_path: &str) -> anyhow::Result<Vec<Detection>> {
        tracing::info!(image_path, "mock detector invoked (no real model configured)");
        Ok(vec![Detection::new("truck", 0.88, BBox(10, 10, 220, 180))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_optional_fields() {
        let d = Detection::new("truck", 0.9, BBox(0, 0, 10, 10))
            .with_geo(33.94, -118.40)
            .with_source(Source::Sar);
        assert_eq!(d.geo_location, Some((33.94, -118.40)));
        assert_eq!(d.source, Some(Source::Sar));
    }
}
