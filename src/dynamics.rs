//! Newton-Euler inverse dynamics of the lower limbs.
//!
//! Each leg is solved as a chain of rigid segments, foot to shank to thigh.
//! The ground reaction measured under the foot is the load on the distal
//! end of the chain; every segment's free-body balance then yields the
//! force and moment at its proximal joint, and the reaction of that joint
//! load becomes the distal load of the next segment:
//!
//! ```text
//! F_p = -F_d - m g + m a
//! M_p = -M_d - (Q - P) x F_d - (C - P) x m g + (C - P) x m a
//! ```
//!
//! where `P` is the proximal joint center, `Q` the point where the distal
//! load `(F_d, M_d)` acts, `C` the segment center of mass and `a` its
//! acceleration. Segment rotational inertia is neglected. Moments are taken
//! about the proximal joint of each segment.
//!
//! Samples are independent of one another: there is no temporal recursion,
//! only the spatial one along the chain.

use crate::{
    anthropometry::SegmentMasses,
    trial::{Bilateral, ForcePlateFrame, Joint, LegMarkers, MarkerFrame, PlateReading, Segment, SegmentPoints, SegmentSet, Side},
    Error, Result,
};
use log::debug;
use nalgebra::Vector3;

/// Force and moment acting at a joint
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JointLoad {
    /// Joint force in N
    pub force: Vector3<f64>,
    /// Joint moment in N·m
    pub moment: Vector3<f64>,
}

/// Loads at the three joints of one leg
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LegLoads {
    /// Ankle load
    pub ankle: JointLoad,
    /// Knee load
    pub knee: JointLoad,
    /// Hip load
    pub hip: JointLoad,
}

impl LegLoads {
    /// Load at one joint
    #[must_use]
    pub fn joint(&self, joint: Joint) -> &JointLoad {
        match joint {
            Joint::Ankle => &self.ankle,
            Joint::Knee => &self.knee,
            Joint::Hip => &self.hip,
        }
    }

    fn joint_mut(&mut self, joint: Joint) -> &mut JointLoad {
        match joint {
            Joint::Ankle => &mut self.ankle,
            Joint::Knee => &mut self.knee,
            Joint::Hip => &mut self.hip,
        }
    }
}

/// Joint loads of both legs at one sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KineticsSample {
    /// Index of the sample in the input series
    pub sample: usize,
    /// Loads per leg
    pub loads: Bilateral<LegLoads>,
}

/// Joint kinetics over the samples that had a defined acceleration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JointKinetics {
    samples: Vec<KineticsSample>,
}

impl JointKinetics {
    /// Per-sample loads in time order
    #[must_use]
    pub fn samples(&self) -> &[KineticsSample] {
        &self.samples
    }

    /// Number of solved samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no sample was solved
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Load series of one joint of one leg
    pub fn joint_series(&self, side: Side, joint: Joint) -> impl Iterator<Item = (usize, JointLoad)> + '_ {
        self.samples
            .iter()
            .map(move |s| (s.sample, *s.loads.side(side).joint(joint)))
    }

    /// Peak absolute value of one force component over the trial
    #[must_use]
    pub fn peak_force(&self, side: Side, joint: Joint, axis: usize) -> Option<f64> {
        self.joint_series(side, joint)
            .map(|(_, load)| load.force[axis].abs())
            .reduce(f64::max)
    }
}

/// Load applied to the distal end of a segment
#[derive(Debug, Clone, Copy)]
struct DistalLoad {
    force: Vector3<f64>,
    moment: Vector3<f64>,
    point: Vector3<f64>,
}

impl From<&PlateReading> for DistalLoad {
    fn from(plate: &PlateReading) -> Self {
        Self {
            force: plate.force,
            moment: plate.moment,
            point: plate.center_of_pressure,
        }
    }
}

/// Inverse dynamics solver
#[derive(Debug, Clone, Copy)]
pub struct InverseDynamics {
    gravity: Vector3<f64>,
}

impl InverseDynamics {
    /// Create a solver for the given gravity vector in the marker frame
    #[must_use]
    pub fn new(gravity: Vector3<f64>) -> Self {
        Self { gravity }
    }

    /// Gravity vector used by the solver
    #[must_use]
    pub fn gravity(&self) -> Vector3<f64> {
        self.gravity
    }

    /// Solve one leg at one sample
    ///
    /// Folds over [`Segment::CHAIN`], carrying the load on the distal end of
    /// the current segment. The ground reaction seeds the fold.
    #[must_use]
    pub fn solve_leg(
        &self,
        plate: &PlateReading,
        markers: &LegMarkers,
        masses: &SegmentSet<f64>,
        com: &SegmentSet<Vector3<f64>>,
        com_accel: &SegmentSet<Vector3<f64>>,
    ) -> LegLoads {
        let mut loads = LegLoads::default();

        Segment::CHAIN
            .iter()
            .fold(DistalLoad::from(plate), |distal, &segment| {
                let joint = segment.proximal_joint();
                let origin = markers.joint(joint);
                let mass = *masses.segment(segment);
                let weight = self.gravity * mass;
                let inertial = *com_accel.segment(segment) * mass;
                let com_arm = *com.segment(segment) - origin;
                let load_arm = distal.point - origin;

                let force = -distal.force - weight + inertial;
                let moment = -distal.moment - load_arm.cross(&distal.force) - com_arm.cross(&weight)
                    + com_arm.cross(&inertial);
                *loads.joint_mut(joint) = JointLoad { force, moment };

                DistalLoad {
                    force: -force,
                    moment: -moment,
                    point: origin,
                }
            });

        loads
    }

    /// Solve both legs over a whole trial
    ///
    /// `com_accel` comes from [`derivative`](crate::derivative::derivative);
    /// samples without a defined acceleration are dropped, so the result
    /// starts at the first sample with history.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if the marker, center-of-mass or
    /// acceleration series differ in length from the force plate series
    pub fn solve(
        &self,
        force_plates: &[ForcePlateFrame],
        markers: &[MarkerFrame],
        masses: &SegmentMasses,
        com: &[SegmentPoints],
        com_accel: &[Option<SegmentPoints>],
    ) -> Result<JointKinetics> {
        let expected = force_plates.len();
        for (what, actual) in [
            ("marker series", markers.len()),
            ("center of mass series", com.len()),
            ("center of mass acceleration series", com_accel.len()),
        ] {
            if actual != expected {
                return Err(Error::shape_mismatch(what, expected, actual));
            }
        }

        let samples: Vec<KineticsSample> = com_accel
            .iter()
            .enumerate()
            .filter_map(|(sample, accel)| accel.as_ref().map(|accel| (sample, accel)))
            .map(|(sample, accel)| {
                let loads = Bilateral::from_fn(|side| {
                    self.solve_leg(
                        force_plates[sample].side(side),
                        markers[sample].leg(side),
                        masses.side(side),
                        com[sample].side(side),
                        accel.side(side),
                    )
                });
                KineticsSample { sample, loads }
            })
            .collect();

        debug!(
            "Solved joint loads for {} of {} samples",
            samples.len(),
            force_plates.len()
        );

        Ok(JointKinetics { samples })
    }
}

impl Default for InverseDynamics {
    fn default() -> Self {
        Self::new(Vector3::from(crate::constants::DEFAULT_GRAVITY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical_leg() -> LegMarkers {
        LegMarkers {
            hip: Vector3::new(0.0, 0.9, 0.0),
            knee: Vector3::new(0.0, 0.5, 0.0),
            ankle: Vector3::new(0.0, 0.1, 0.0),
            toe: Vector3::new(0.0, 0.0, 0.0),
        }
    }

    fn masses() -> SegmentSet<f64> {
        SegmentSet {
            thigh: 10.0,
            shank: 3.0,
            foot: 1.0,
        }
    }

    fn com_on_axis() -> SegmentSet<Vector3<f64>> {
        SegmentSet {
            thigh: Vector3::new(0.0, 0.7, 0.0),
            shank: Vector3::new(0.0, 0.3, 0.0),
            foot: Vector3::new(0.0, 0.05, 0.0),
        }
    }

    #[test]
    fn test_ankle_force_is_negated_reaction_without_gravity() {
        let solver = InverseDynamics::new(Vector3::zeros());
        let plate = PlateReading {
            force: Vector3::new(12.0, 700.0, -5.0),
            center_of_pressure: Vector3::new(0.0, 0.0, 0.05),
            moment: Vector3::zeros(),
        };

        let loads = solver.solve_leg(&plate, &vertical_leg(), &masses(), &com_on_axis(), &SegmentSet::default());
        assert_eq!(loads.ankle.force, -plate.force);
    }

    #[test]
    fn test_static_chain_accumulates_weight() {
        let solver = InverseDynamics::default();
        let plate = PlateReading {
            force: Vector3::new(0.0, 800.0, 0.0),
            center_of_pressure: Vector3::new(0.0, 0.0, 0.0),
            moment: Vector3::zeros(),
        };

        let loads = solver.solve_leg(&plate, &vertical_leg(), &masses(), &com_on_axis(), &SegmentSet::default());
        assert!((loads.ankle.force.y - (-800.0 + 1.0 * 9.81)).abs() < 1e-9);
        assert!((loads.knee.force.y - (-800.0 + 4.0 * 9.81)).abs() < 1e-9);
        assert!((loads.hip.force.y - (-800.0 + 14.0 * 9.81)).abs() < 1e-9);
        // Everything is collinear with gravity: no moments
        for joint in Joint::ALL {
            assert!(loads.joint(joint).moment.norm() < 1e-9);
        }
    }

    #[test]
    fn test_center_of_pressure_lever_arm() {
        let solver = InverseDynamics::new(Vector3::zeros());
        let plate = PlateReading {
            force: Vector3::new(0.0, 500.0, 0.0),
            center_of_pressure: Vector3::new(0.1, 0.1, 0.0),
            moment: Vector3::zeros(),
        };

        let loads = solver.solve_leg(&plate, &vertical_leg(), &masses(), &com_on_axis(), &SegmentSet::default());
        // -(0.1, 0, 0) x (0, 500, 0) = (0, 0, -50)
        assert!((loads.ankle.moment - Vector3::new(0.0, 0.0, -50.0)).norm() < 1e-9);
        // The ankle force is collinear with the knee, so the moment passes through unchanged
        assert!((loads.knee.moment - Vector3::new(0.0, 0.0, -50.0)).norm() < 1e-9);
    }

    #[test]
    fn test_free_moment_propagates() {
        let solver = InverseDynamics::new(Vector3::zeros());
        let plate = PlateReading {
            force: Vector3::zeros(),
            center_of_pressure: Vector3::zeros(),
            moment: Vector3::new(0.0, 3.0, 0.0),
        };

        let loads = solver.solve_leg(&plate, &vertical_leg(), &masses(), &com_on_axis(), &SegmentSet::default());
        for joint in Joint::ALL {
            assert!((loads.joint(joint).moment - Vector3::new(0.0, -3.0, 0.0)).norm() < 1e-12);
        }
    }

    #[test]
    fn test_segment_acceleration_loads_chain() {
        let solver = InverseDynamics::new(Vector3::zeros());
        let plate = PlateReading {
            force: Vector3::new(0.0, 500.0, 0.0),
            center_of_pressure: Vector3::zeros(),
            moment: Vector3::zeros(),
        };
        // Foot CoM sits 0.1 m ahead of the ankle so its inertia has a lever arm
        let mut com = com_on_axis();
        com.foot = Vector3::new(0.0, 0.05, 0.1);
        let accel = SegmentSet {
            thigh: Vector3::zeros(),
            shank: Vector3::new(0.0, 0.0, 3.0),
            foot: Vector3::new(0.0, 2.0, 0.0),
        };

        let loads = solver.solve_leg(&plate, &vertical_leg(), &masses(), &com, &accel);

        // F = -GRF + m a
        assert!((loads.ankle.force - Vector3::new(0.0, -498.0, 0.0)).norm() < 1e-9);
        assert!((loads.knee.force - Vector3::new(0.0, -498.0, 9.0)).norm() < 1e-9);
        assert!((loads.hip.force - Vector3::new(0.0, -498.0, 9.0)).norm() < 1e-9);

        // (0, -0.05, 0.1) x (0, 2, 0) = (-0.2, 0, 0)
        assert!((loads.ankle.moment - Vector3::new(-0.2, 0.0, 0.0)).norm() < 1e-9);
        // Ankle moment plus (0, -0.2, 0) x (0, 0, 9)
        assert!((loads.knee.moment - Vector3::new(-2.0, 0.0, 0.0)).norm() < 1e-9);
        // Knee moment plus the 9 N shear acting 0.4 m below the hip
        assert!((loads.hip.moment - Vector3::new(-5.6, 0.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn test_solve_drops_undefined_acceleration() {
        let solver = InverseDynamics::default();
        let frame = MarkerFrame {
            neck: Vector3::new(0.0, 1.5, 0.0),
            left: vertical_leg(),
            right: vertical_leg(),
        };
        let com = Bilateral::new(com_on_axis(), com_on_axis());
        let masses = Bilateral::new(masses(), masses());
        let accel = vec![None, None, Some(SegmentPoints::default()), Some(SegmentPoints::default())];

        let kinetics = solver
            .solve(&[ForcePlateFrame::default(); 4], &[frame; 4], &masses, &[com; 4], &accel)
            .unwrap();
        assert_eq!(kinetics.len(), 2);
        assert_eq!(kinetics.samples()[0].sample, 2);
        let knee: Vec<usize> = kinetics.joint_series(Side::Right, Joint::Knee).map(|(s, _)| s).collect();
        assert_eq!(knee, vec![2, 3]);
    }

    #[test]
    fn test_solve_shape_mismatch() {
        let solver = InverseDynamics::default();
        let frame = MarkerFrame {
            neck: Vector3::zeros(),
            left: vertical_leg(),
            right: vertical_leg(),
        };
        let com = SegmentPoints::default();
        let masses = Bilateral::new(masses(), masses());

        let result = solver.solve(&[ForcePlateFrame::default(); 4], &[frame; 3], &masses, &[com; 4], &[None; 4]);
        assert!(matches!(result, Err(Error::ShapeMismatch { expected: 4, actual: 3, .. })));
    }
}
