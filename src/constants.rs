//! Constants used throughout the library

/// Standard gravitational acceleration in m/s²
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Gravity vector in the marker frame (y is vertical)
pub const DEFAULT_GRAVITY: [f64; 3] = [0.0, -STANDARD_GRAVITY, 0.0];

/// Fraction of body weight used as the gait event force threshold
pub const DEFAULT_THRESHOLD_FRACTION: f64 = 0.05;

/// Default sample interval in seconds (100 Hz capture)
pub const DEFAULT_SAMPLE_INTERVAL: f64 = 0.01;

/// Default order of the center-of-mass derivative fed to the dynamics solver
pub const DEFAULT_DERIVATIVE_ORDER: u8 = 2;

/// Seconds per minute, for cadence
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// Segment mass as percent of body mass, male: thigh, shank, foot
pub const MALE_MASS_PERCENT: [f64; 3] = [14.16, 4.33, 1.37];

/// Segment mass as percent of body mass, female: thigh, shank, foot
pub const FEMALE_MASS_PERCENT: [f64; 3] = [14.78, 4.81, 1.29];

/// CoM location as percent of segment length from the proximal landmark, male
pub const MALE_COM_PERCENT: [f64; 3] = [40.95, 44.59, 44.15];

/// CoM location as percent of segment length from the proximal landmark, female
pub const FEMALE_COM_PERCENT: [f64; 3] = [36.9, 27.1, 29.9];

/// Percent to fraction
pub const PERCENT: f64 = 0.01;
