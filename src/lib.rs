//! Gait kinetics library for lower-limb inverse dynamics.
//!
//! This library turns a motion-capture trial into joint loads and gait
//! measures:
//! - Marker trajectories of the neck and both legs
//! - Ground reaction force, center of pressure and free moment per foot
//! - A sex-specific anthropometric model of segment masses
//!
//! The analysis pipeline consists of:
//! 1. Segment masses and centers of mass from the anthropometric model
//! 2. Center-of-mass acceleration by backward finite differences
//! 3. Joint forces and moments at ankle, knee and hip (Newton-Euler)
//! 4. Heel strike and toe off detection from the vertical force
//! 5. Cadence, stance ratio and joint angles
//!
//! # Examples
//!
//! ## Complete Pipeline
//!
//! ```no_run
//! use gait_kinetics::{config::Config, pipeline::GaitAnalysis};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = Config::default();
//! config.trial.body_mass = 72.0;
//!
//! let analysis = GaitAnalysis::new(config)?;
//! let trial = analysis.load_trial("markers.tsv", "force_plates.tsv")?;
//! let report = analysis.analyze(&trial)?;
//!
//! let (left, right) = report.stance_ratio();
//! println!("Cadence: {:.1} steps/min", report.cadence);
//! println!("Stance ratio: {left:.2} (left), {right:.2} (right)");
//! # Ok(())
//! # }
//! ```
//!
//! ## Event Detection
//!
//! ```no_run
//! use gait_kinetics::events::EventDetector;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Threshold at 5% of body weight
//! let detector = EventDetector::new(68.0, 0.05)?;
//!
//! let vertical_force = vec![0.0, 0.0, 400.0, 650.0, 500.0, 0.0, 0.0];
//! let events = detector.detect(&vertical_force)?;
//! println!("Heel strikes: {:?}", events.heel_strikes);
//! println!("Toe offs: {:?}", events.toe_offs);
//! # Ok(())
//! # }
//! ```

/// Anthropometric segment masses and centers of mass
pub mod anthropometry;

/// Configuration management
pub mod config;

/// Constants used throughout the library
pub mod constants;

/// Backward finite differences of sampled series
pub mod derivative;

/// Newton-Euler inverse dynamics over the leg chain
pub mod dynamics;

/// Error types and result handling
pub mod error;

/// Heel strike and toe off detection
pub mod events;

/// Segment vectors, lengths and joint angles
pub mod kinematics;

/// Cadence, stance ratio and summary statistics
pub mod metrics;

/// Single-trial analysis pipeline
pub mod pipeline;

/// Delimited table input and output
pub mod table;

/// Trial data model
pub mod trial;

pub use error::{Error, Result};
