//! Single-trial analysis pipeline.
//!
//! Wires the components together for one trial:
//!
//! 1. Segment masses and centers of mass from the anthropometric model
//! 2. Center-of-mass acceleration by finite differences
//! 3. Joint forces and moments by inverse dynamics
//! 4. Gait events from the vertical force channels
//! 5. Cadence and stance ratios from the events
//! 6. Segment lengths and joint angles
//!
//! Any failing stage aborts the analysis with its error.

use crate::{
    anthropometry::{segment_center_of_mass, segment_masses, SegmentMasses},
    config::Config,
    derivative::derivative,
    dynamics::{InverseDynamics, JointKinetics},
    events::{EventDetector, GaitEvents},
    kinematics::{joint_angles, segment_lengths, segment_vectors, JointAngles, SegmentLengths},
    metrics::{cadence, stance_statistics, Statistics},
    table::Table,
    trial::{Bilateral, Trial},
    Result,
};
use log::{debug, info};
use std::path::Path;

/// Results of one analyzed trial
#[derive(Debug, Clone)]
pub struct TrialReport {
    /// Segment masses used by the dynamics
    pub masses: SegmentMasses,
    /// Detected gait events
    pub events: GaitEvents,
    /// Cadence in steps per minute
    pub cadence: f64,
    /// Per-leg stance ratio summary over all complete cycles
    pub stance: Bilateral<Statistics>,
    /// Joint forces and moments
    pub kinetics: JointKinetics,
    /// Segment lengths per sample
    pub lengths: Vec<SegmentLengths>,
    /// Joint angles per sample
    pub angles: Vec<JointAngles>,
}

impl TrialReport {
    /// Mean stance ratio per leg
    #[must_use]
    pub fn stance_ratio(&self) -> (f64, f64) {
        (self.stance.left.mean, self.stance.right.mean)
    }

    /// Mean swing ratio per leg
    #[must_use]
    pub fn swing_ratio(&self) -> (f64, f64) {
        (1.0 - self.stance.left.mean, 1.0 - self.stance.right.mean)
    }
}

/// Gait analysis driver
#[derive(Debug, Clone)]
pub struct GaitAnalysis {
    config: Config,
}

impl GaitAnalysis {
    /// Create an analysis from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load a trial from marker and force plate tables, using the
    /// configured sample interval
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read, lacks required columns,
    /// or the two tables differ in length
    pub fn load_trial<P: AsRef<Path>, Q: AsRef<Path>>(&self, markers: P, force_plates: Q) -> Result<Trial> {
        info!("Loading marker data from: {}", markers.as_ref().display());
        let markers = Table::from_path(markers)?.to_markers()?;
        info!("Loading force plate data from: {}", force_plates.as_ref().display());
        let force_plates = Table::from_path(force_plates)?.to_force_plates()?;

        Trial::new(markers, force_plates, self.config.trial.sample_interval)
    }

    /// Run every stage on a trial
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any stage
    pub fn analyze(&self, trial: &Trial) -> Result<TrialReport> {
        let trial_config = &self.config.trial;
        info!(
            "Analyzing trial: {} samples, {:.2} s, body mass {} kg, {}",
            trial.len(),
            trial.duration(),
            trial_config.body_mass,
            trial_config.sex
        );

        let masses = segment_masses(trial_config.body_mass, trial_config.sex)?;
        debug!("Segment masses total {:.2} kg", masses.total());

        let com = segment_center_of_mass(trial.markers(), trial_config.sex);
        let com_accel = derivative(&com, trial.sample_interval(), self.config.dynamics.order()?)?;

        let solver = InverseDynamics::new(self.config.dynamics.gravity_vector());
        let kinetics = solver.solve(trial.force_plates(), trial.markers(), &masses, &com, &com_accel)?;
        info!("Inverse dynamics solved for {} samples", kinetics.len());

        let detector = EventDetector::new(trial_config.body_mass, self.config.events.threshold_fraction)?;
        let events = detector.detect_trial(trial.force_plates())?;
        info!(
            "Detected {} + {} heel strikes (left + right)",
            events.left.heel_strikes.len(),
            events.right.heel_strikes.len()
        );

        let cadence = cadence(&events, trial.sample_interval())?;
        let stance = Bilateral::new(stance_statistics(&events.left)?, stance_statistics(&events.right)?);

        let vectors = segment_vectors(trial.markers());
        let lengths = segment_lengths(&vectors);
        let angles = joint_angles(&vectors);

        Ok(TrialReport {
            masses,
            events,
            cadence,
            stance,
            kinetics,
            lengths,
            angles,
        })
    }
}
