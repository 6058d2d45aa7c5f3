//! Segment kinematics: orientation vectors, lengths and joint angles.
//!
//! Segment vectors point from the distal to the proximal landmark. Joint
//! angles are measured between the planar projections of the two segments
//! meeting at a joint, in degrees, with hip flexion, hip abduction, knee
//! flexion and ankle plantarflexion positive.

use crate::trial::{Bilateral, MarkerFrame, Segment, SegmentSet, Side};
use nalgebra::Vector3;

/// Segment orientation vectors at one sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentVectors {
    /// Neck minus hip center
    pub torso: Vector3<f64>,
    /// Limb segments, proximal minus distal landmark
    pub limbs: Bilateral<SegmentSet<Vector3<f64>>>,
}

/// Segment lengths at one sample, in marker units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentLengths {
    /// Torso length
    pub torso: f64,
    /// Limb segment lengths
    pub limbs: Bilateral<SegmentSet<f64>>,
}

/// Joint angles of one leg in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LegAngles {
    /// Hip flexion (+) / extension (-), sagittal (y-z) plane
    pub hip_flexion: f64,
    /// Hip abduction (+) / adduction (-), frontal (x-y) plane
    pub hip_abduction: f64,
    /// Knee flexion (+) / extension (-), sagittal plane
    pub knee_flexion: f64,
    /// Ankle plantarflexion (+) / dorsiflexion (-), sagittal plane
    pub ankle_plantarflexion: f64,
}

/// Joint angles of both legs at one sample
pub type JointAngles = Bilateral<LegAngles>;

/// Compute segment vectors for every sample
#[must_use]
pub fn segment_vectors(markers: &[MarkerFrame]) -> Vec<SegmentVectors> {
    markers
        .iter()
        .map(|frame| SegmentVectors {
            torso: frame.neck - frame.hip_center(),
            limbs: Bilateral::from_fn(|side| {
                let leg = frame.leg(side);
                SegmentSet::from_fn(|segment: Segment| {
                    let (proximal, distal) = leg.segment_ends(segment);
                    proximal - distal
                })
            }),
        })
        .collect()
}

/// Euclidean length of every segment vector
#[must_use]
pub fn segment_lengths(vectors: &[SegmentVectors]) -> Vec<SegmentLengths> {
    vectors
        .iter()
        .map(|v| SegmentLengths {
            torso: v.torso.norm(),
            limbs: v.limbs.map(|leg| leg.map(|segment| segment.norm())),
        })
        .collect()
}

/// Compute joint angles for every sample
///
/// A segment whose projection onto the measurement plane has zero length
/// yields NaN for that angle.
#[must_use]
pub fn joint_angles(vectors: &[SegmentVectors]) -> Vec<JointAngles> {
    vectors
        .iter()
        .map(|v| Bilateral::from_fn(|side| leg_angles(&v.torso, v.limbs.side(side), side)))
        .collect()
}

fn leg_angles(torso: &Vector3<f64>, leg: &SegmentSet<Vector3<f64>>, side: Side) -> LegAngles {
    let sagittal = |v: &Vector3<f64>| (v.y, v.z);
    let frontal = |v: &Vector3<f64>| (v.y, v.x);

    // Abduction moves the left thigh toward -x and the right toward +x
    let abduction_sign = match side {
        Side::Left => sign(leg.thigh.x),
        Side::Right => -sign(leg.thigh.x),
    };

    LegAngles {
        hip_flexion: planar_angle(sagittal(torso), sagittal(&leg.thigh)) * -sign(leg.thigh.z),
        hip_abduction: planar_angle(frontal(torso), frontal(&leg.thigh)) * abduction_sign,
        knee_flexion: planar_angle(sagittal(&leg.thigh), sagittal(&leg.shank)) * sign(leg.shank.z),
        ankle_plantarflexion: (planar_angle(sagittal(&leg.shank), sagittal(&leg.foot)) - 90.0) * sign(leg.foot.y),
    }
}

/// Unsigned angle between two 2D vectors in degrees
fn planar_angle(a: (f64, f64), b: (f64, f64)) -> f64 {
    let norms = a.0.hypot(a.1) * b.0.hypot(b.1);
    if norms == 0.0 {
        return f64::NAN;
    }

    let cosine = ((a.0 * b.0 + a.1 * b.1) / norms).clamp(-1.0, 1.0);
    cosine.acos().to_degrees()
}

/// Sign with zero mapped to zero
fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trial::LegMarkers;

    fn standing_frame() -> MarkerFrame {
        let leg = |x: f64| LegMarkers {
            hip: Vector3::new(x, 0.9, 0.0),
            knee: Vector3::new(x, 0.5, 0.0),
            ankle: Vector3::new(x, 0.1, 0.0),
            toe: Vector3::new(x, 0.0, 0.15),
        };
        MarkerFrame {
            neck: Vector3::new(0.0, 1.5, 0.0),
            left: leg(-0.1),
            right: leg(0.1),
        }
    }

    #[test]
    fn test_segment_vectors_and_lengths() {
        let vectors = segment_vectors(&[standing_frame()]);
        let v = vectors[0];
        assert!((v.torso - Vector3::new(0.0, 0.6, 0.0)).norm() < 1e-12);
        assert!((v.limbs.left.thigh - Vector3::new(0.0, 0.4, 0.0)).norm() < 1e-12);

        let lengths = segment_lengths(&vectors);
        assert!((lengths[0].torso - 0.6).abs() < 1e-12);
        assert!((lengths[0].limbs.right.shank - 0.4).abs() < 1e-12);
        assert!((lengths[0].limbs.right.foot - (0.1f64.hypot(0.15))).abs() < 1e-12);
    }

    #[test]
    fn test_flexed_knee_angle() {
        let mut frame = standing_frame();
        // Ankle swings 30 degrees behind the knee in the sagittal plane
        let angle = 30f64.to_radians();
        frame.left.ankle = frame.left.knee - Vector3::new(0.0, 0.4 * angle.cos(), 0.4 * angle.sin());

        let angles = joint_angles(&segment_vectors(&[frame]));
        assert!((angles[0].left.knee_flexion - 30.0).abs() < 1e-9);
        assert_eq!(angles[0].right.knee_flexion, 0.0);
    }

    #[test]
    fn test_degenerate_projection_is_nan() {
        assert!(planar_angle((0.0, 0.0), (1.0, 0.0)).is_nan());
        assert!((planar_angle((1.0, 0.0), (0.0, 1.0)) - 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_sign() {
        assert_eq!(sign(2.0), 1.0);
        assert_eq!(sign(-0.5), -1.0);
        assert_eq!(sign(0.0), 0.0);
    }
}
