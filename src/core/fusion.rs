//! Multi-sensor detection fusion (C3).
//!
//! SAR is all-weather and always trusted as a lead; optical is gated by a
//! confidence floor to suppress cloud-obscured noise.

use super::detection::Detection;

pub const DEFAULT_OPTICAL_THRESHOLD: f64 = 0.5;

/// Fuse optical and SAR detections under a confidence gate.
///
/// Every optical detection with `confidence >= optical_threshold` is
/// included first (label suffixed ` (Optical)`), followed by every SAR
/// detection unconditionally (label suffixed ` (SAR)`). Input order is
/// preserved within each group. Pure function; no side effects.
pub fn fuse(optical: &[Detection], sar: &[Detection], optical_threshold: f64) -> Vec<Detection> {
    let mut fused = Vec::with_capacity(optical.len() + sar.len());

    for d in optical {
        if d.confidence >= optical_threshold {
            let mut d = d.clone();
            d.label = format!("{} (Optical)", d.label);
            fused.push(d);
        }
    }
    for d in sar {
        let mut d = d.clone();
        d.label = format!("{} (SAR)", d.label);
        fused.push(d);
    }

    fused
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::detection::BBox;

    fn det(label: &str, confidence: f64) -> Detection {
        Detection::new(label, confidence, BBox(0, 0, 1, 1))
    }

    #[test]
    fn fusion_gate_s5() {
        let optical = vec![det("car", 0.5), det("truck", 0.9)];
        let sar = vec![det("boat", 0.7)];

        let fused = fuse(&optical, &sar, 0.8);
        let labels: Vec<&str> = fused.iter().map(|d| d.label.as_str()).collect();

        assert_eq!(labels, vec!["truck (Optical)", "boat (SAR)"]);
    }

    #[test]
    fn default_threshold_admits_half_confidence() {
        let optical = vec![det("car", 0.5)];
        let fused = fuse(&optical, &[], DEFAULT_OPTICAL_THRESHOLD);
        assert_eq!(fused.len(), 1);
    }

    #[test]
    fn sar_always_included_regardless_of_confidence() {
        let sar = vec![det("boat", 0.01)];
        let fused = fuse(&[], &sar, 0.99);
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].label, "boat (SAR)");
    }
}
