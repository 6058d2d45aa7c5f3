//! Gait event detection from vertical ground reaction force.
//!
//! Each leg runs an independent two-state automaton over its own force
//! channel. A leg is in stance while its vertical force is at or above
//! `threshold_fraction * body_mass * g`, and in swing below it. The
//! stance to swing transition is a toe-off, swing to stance a heel strike.
//!
//! The initial phase is taken from the first sample. A trial that starts
//! mid-swing is therefore treated as swing from sample 0 and one that
//! starts mid-stance as stance; neither emits an event at sample 0. An
//! unfinished stance or swing at the end of the recording emits nothing.

use crate::{
    constants::STANDARD_GRAVITY,
    trial::{Bilateral, ForcePlateFrame, Side},
    Error, Result,
};
use log::debug;

/// Ground contact phase of one leg
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaitPhase {
    /// Foot loaded at or above the threshold
    Stance,
    /// Foot unloaded below the threshold
    Swing,
}

/// Kind of gait event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Swing to stance transition
    HeelStrike,
    /// Stance to swing transition
    ToeOff,
}

/// A gait event at a sample index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GaitEvent {
    /// Transition type
    pub kind: EventKind,
    /// Sample at which the new phase starts
    pub sample: usize,
}

/// Event sequences of one leg, each strictly increasing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegEvents {
    /// Heel strike sample indices
    pub heel_strikes: Vec<usize>,
    /// Toe-off sample indices
    pub toe_offs: Vec<usize>,
}

impl LegEvents {
    /// Whether no transition was detected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heel_strikes.is_empty() && self.toe_offs.is_empty()
    }

    /// Both sequences merged in time order
    #[must_use]
    pub fn events(&self) -> Vec<GaitEvent> {
        let mut events: Vec<GaitEvent> = self
            .heel_strikes
            .iter()
            .map(|&sample| GaitEvent {
                kind: EventKind::HeelStrike,
                sample,
            })
            .chain(self.toe_offs.iter().map(|&sample| GaitEvent {
                kind: EventKind::ToeOff,
                sample,
            }))
            .collect();
        events.sort_by_key(|event| event.sample);
        events
    }

    fn record(&mut self, event: GaitEvent) {
        match event.kind {
            EventKind::HeelStrike => self.heel_strikes.push(event.sample),
            EventKind::ToeOff => self.toe_offs.push(event.sample),
        }
    }
}

/// Event sequences of both legs; lengths may differ between legs
pub type GaitEvents = Bilateral<LegEvents>;

/// Incremental phase tracker for one force channel
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    threshold: f64,
    phase: Option<GaitPhase>,
    sample: usize,
}

impl PhaseTracker {
    /// Create a tracker with no samples seen yet
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            phase: None,
            sample: 0,
        }
    }

    /// Feed the next force sample, returning the event it triggers, if any
    ///
    /// NaN force compares below any threshold and reads as swing.
    pub fn update(&mut self, force: f64) -> Option<GaitEvent> {
        let sample = self.sample;
        self.sample += 1;

        let next = if force >= self.threshold {
            GaitPhase::Stance
        } else {
            GaitPhase::Swing
        };
        let previous = self.phase.replace(next);

        match (previous, next) {
            (Some(GaitPhase::Stance), GaitPhase::Swing) => Some(GaitEvent {
                kind: EventKind::ToeOff,
                sample,
            }),
            (Some(GaitPhase::Swing), GaitPhase::Stance) => Some(GaitEvent {
                kind: EventKind::HeelStrike,
                sample,
            }),
            _ => None,
        }
    }

    /// Current phase, `None` before the first sample
    #[must_use]
    pub fn phase(&self) -> Option<GaitPhase> {
        self.phase
    }

    /// Forget all samples seen so far
    pub fn reset(&mut self) {
        self.phase = None;
        self.sample = 0;
    }
}

/// Threshold-crossing gait event detector
#[derive(Debug, Clone, Copy)]
pub struct EventDetector {
    threshold: f64,
}

impl EventDetector {
    /// Create a detector with threshold `threshold_fraction * body_mass * 9.81`
    ///
    /// # Errors
    ///
    /// Returns an error if the body mass or fraction is not a positive finite number
    pub fn new(body_mass: f64, threshold_fraction: f64) -> Result<Self> {
        if !(body_mass.is_finite() && body_mass > 0.0) {
            return Err(Error::InvalidInput(format!("Body mass must be positive, got {body_mass}")));
        }
        if !(threshold_fraction.is_finite() && threshold_fraction > 0.0) {
            return Err(Error::InvalidInput(format!(
                "Threshold fraction must be positive, got {threshold_fraction}"
            )));
        }

        Ok(Self::with_threshold(threshold_fraction * body_mass * STANDARD_GRAVITY))
    }

    /// Create a detector with an absolute force threshold in N
    #[must_use]
    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Force threshold in N
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Detect events on one vertical force channel
    ///
    /// # Errors
    ///
    /// Returns an error if the channel holds fewer than 2 samples
    pub fn detect(&self, vertical_force: &[f64]) -> Result<LegEvents> {
        if vertical_force.len() < 2 {
            return Err(Error::InsufficientData(format!(
                "Event detection needs at least 2 samples, got {}",
                vertical_force.len()
            )));
        }

        let mut tracker = PhaseTracker::new(self.threshold);
        let mut events = LegEvents::default();
        for &force in vertical_force {
            if let Some(event) = tracker.update(force) {
                events.record(event);
            }
        }

        Ok(events)
    }

    /// Detect events for both legs from the force plate series
    ///
    /// # Errors
    ///
    /// Returns an error if the series holds fewer than 2 samples
    pub fn detect_trial(&self, force_plates: &[ForcePlateFrame]) -> Result<GaitEvents> {
        let detect_side = |side: Side| -> Result<LegEvents> {
            let channel: Vec<f64> = force_plates.iter().map(|frame| frame.vertical_force(side)).collect();
            let events = self.detect(&channel)?;
            debug!(
                "{side} leg: {} heel strikes, {} toe-offs (threshold {:.2} N)",
                events.heel_strikes.len(),
                events.toe_offs.len(),
                self.threshold
            );
            Ok(events)
        };

        Ok(Bilateral::new(detect_side(Side::Left)?, detect_side(Side::Right)?))
    }
}
