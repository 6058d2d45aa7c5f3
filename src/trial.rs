//! Per-trial data model: marker frames, force-plate frames and the
//! left/right and segment/joint containers shared by every component.
//!
//! Every series in a trial is co-indexed by sample: row `i` of the marker
//! series and row `i` of the force-plate series were captured at the same
//! instant, `i * sample_interval` seconds after the start of the recording.

use crate::{Error, Result};
use nalgebra::Vector3;
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Body side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Left leg / left force plate
    Left,
    /// Right leg / right force plate
    Right,
}

impl Side {
    /// Both sides, left first
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// Column suffix used by the tabular data contract (`l` / `r`)
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Side::Left => "l",
            Side::Right => "r",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Limb segments of one leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Ankle to toe
    Foot,
    /// Knee to ankle
    Shank,
    /// Hip to knee
    Thigh,
}

impl Segment {
    /// Kinematic chain of one leg, distal to proximal
    pub const CHAIN: [Segment; 3] = [Segment::Foot, Segment::Shank, Segment::Thigh];

    /// Joint at the proximal end of the segment
    #[must_use]
    pub fn proximal_joint(self) -> Joint {
        match self {
            Segment::Foot => Joint::Ankle,
            Segment::Shank => Joint::Knee,
            Segment::Thigh => Joint::Hip,
        }
    }

    /// Lowercase segment name as used in column names
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Segment::Foot => "foot",
            Segment::Shank => "shank",
            Segment::Thigh => "thigh",
        }
    }
}

/// Lower-limb joints of one leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Joint {
    /// Ankle
    Ankle,
    /// Knee
    Knee,
    /// Hip
    Hip,
}

impl Joint {
    /// Joints distal to proximal
    pub const ALL: [Joint; 3] = [Joint::Ankle, Joint::Knee, Joint::Hip];

    /// Lowercase joint name as used in column names
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Joint::Ankle => "ankle",
            Joint::Knee => "knee",
            Joint::Hip => "hip",
        }
    }
}

/// A value per body side
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bilateral<T> {
    /// Left side value
    pub left: T,
    /// Right side value
    pub right: T,
}

impl<T> Bilateral<T> {
    /// Create from left and right values
    pub fn new(left: T, right: T) -> Self {
        Self { left, right }
    }

    /// Build both sides from a per-side constructor
    pub fn from_fn(mut f: impl FnMut(Side) -> T) -> Self {
        Self {
            left: f(Side::Left),
            right: f(Side::Right),
        }
    }

    /// Value for one side
    pub fn side(&self, side: Side) -> &T {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Apply `f` to both sides
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Bilateral<U> {
        Bilateral {
            left: f(&self.left),
            right: f(&self.right),
        }
    }
}

impl<T: Copy + Add<Output = T>> Add for Bilateral<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.left + rhs.left, self.right + rhs.right)
    }
}

impl<T: Copy + Sub<Output = T>> Sub for Bilateral<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.left - rhs.left, self.right - rhs.right)
    }
}

impl<T: Copy + Mul<f64, Output = T>> Mul<f64> for Bilateral<T> {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.left * rhs, self.right * rhs)
    }
}

/// A value per limb segment of one leg
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SegmentSet<T> {
    /// Thigh value
    pub thigh: T,
    /// Shank value
    pub shank: T,
    /// Foot value
    pub foot: T,
}

impl<T> SegmentSet<T> {
    /// Build all segments from a per-segment constructor
    pub fn from_fn(mut f: impl FnMut(Segment) -> T) -> Self {
        Self {
            thigh: f(Segment::Thigh),
            shank: f(Segment::Shank),
            foot: f(Segment::Foot),
        }
    }

    /// Value for one segment
    pub fn segment(&self, segment: Segment) -> &T {
        match segment {
            Segment::Thigh => &self.thigh,
            Segment::Shank => &self.shank,
            Segment::Foot => &self.foot,
        }
    }

    /// Apply `f` to every segment
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> SegmentSet<U> {
        SegmentSet {
            thigh: f(&self.thigh),
            shank: f(&self.shank),
            foot: f(&self.foot),
        }
    }
}

impl<T: Copy + Add<Output = T>> Add for SegmentSet<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            thigh: self.thigh + rhs.thigh,
            shank: self.shank + rhs.shank,
            foot: self.foot + rhs.foot,
        }
    }
}

impl<T: Copy + Sub<Output = T>> Sub for SegmentSet<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            thigh: self.thigh - rhs.thigh,
            shank: self.shank - rhs.shank,
            foot: self.foot - rhs.foot,
        }
    }
}

impl<T: Copy + Mul<f64, Output = T>> Mul<f64> for SegmentSet<T> {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self {
            thigh: self.thigh * rhs,
            shank: self.shank * rhs,
            foot: self.foot * rhs,
        }
    }
}

/// A 3D position of every limb segment of both legs at one sample
pub type SegmentPoints = Bilateral<SegmentSet<Vector3<f64>>>;

/// Landmarks of one leg
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegMarkers {
    /// Hip joint center
    pub hip: Vector3<f64>,
    /// Knee joint center
    pub knee: Vector3<f64>,
    /// Ankle joint center
    pub ankle: Vector3<f64>,
    /// Toe
    pub toe: Vector3<f64>,
}

impl LegMarkers {
    /// Position of a joint center
    #[must_use]
    pub fn joint(&self, joint: Joint) -> Vector3<f64> {
        match joint {
            Joint::Ankle => self.ankle,
            Joint::Knee => self.knee,
            Joint::Hip => self.hip,
        }
    }

    /// Proximal and distal landmarks bounding a segment
    #[must_use]
    pub fn segment_ends(&self, segment: Segment) -> (Vector3<f64>, Vector3<f64>) {
        match segment {
            Segment::Thigh => (self.hip, self.knee),
            Segment::Shank => (self.knee, self.ankle),
            Segment::Foot => (self.ankle, self.toe),
        }
    }
}

/// Marker positions of all 9 landmarks at one sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerFrame {
    /// Neck (C7) marker
    pub neck: Vector3<f64>,
    /// Left leg landmarks
    pub left: LegMarkers,
    /// Right leg landmarks
    pub right: LegMarkers,
}

impl MarkerFrame {
    /// Landmarks of one leg
    #[must_use]
    pub fn leg(&self, side: Side) -> &LegMarkers {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Midpoint of the two hip markers
    #[must_use]
    pub fn hip_center(&self) -> Vector3<f64> {
        (self.left.hip + self.right.hip) * 0.5
    }
}

/// One force plate reading
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlateReading {
    /// Ground reaction force (N)
    pub force: Vector3<f64>,
    /// Center of pressure in the marker frame
    pub center_of_pressure: Vector3<f64>,
    /// Free moment reported by the plate (N·m)
    pub moment: Vector3<f64>,
}

/// Left and right force plate readings at one sample
pub type ForcePlateFrame = Bilateral<PlateReading>;

impl ForcePlateFrame {
    /// Vertical (y) ground reaction force under one leg
    #[must_use]
    pub fn vertical_force(&self, side: Side) -> f64 {
        self.side(side).force.y
    }
}

/// A complete gait trial: co-indexed marker and force-plate series
#[derive(Debug, Clone)]
pub struct Trial {
    markers: Vec<MarkerFrame>,
    force_plates: Vec<ForcePlateFrame>,
    sample_interval: f64,
}

impl Trial {
    /// Create a trial from aligned series
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The sample interval is not a positive finite number
    /// - The marker and force-plate series differ in length
    pub fn new(markers: Vec<MarkerFrame>, force_plates: Vec<ForcePlateFrame>, sample_interval: f64) -> Result<Self> {
        validate_sample_interval(sample_interval)?;
        if markers.len() != force_plates.len() {
            return Err(Error::shape_mismatch("force plate series", markers.len(), force_plates.len()));
        }

        Ok(Self {
            markers,
            force_plates,
            sample_interval,
        })
    }

    /// Marker series
    #[must_use]
    pub fn markers(&self) -> &[MarkerFrame] {
        &self.markers
    }

    /// Force plate series
    #[must_use]
    pub fn force_plates(&self) -> &[ForcePlateFrame] {
        &self.force_plates
    }

    /// Sample interval in seconds
    #[must_use]
    pub fn sample_interval(&self) -> f64 {
        self.sample_interval
    }

    /// Number of samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Whether the trial holds no samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Recording duration in seconds
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Sample counts stay far below 2^52
    pub fn duration(&self) -> f64 {
        self.len() as f64 * self.sample_interval
    }

    /// Vertical ground reaction force channel of one leg
    #[must_use]
    pub fn vertical_force(&self, side: Side) -> Vec<f64> {
        self.force_plates.iter().map(|frame| frame.vertical_force(side)).collect()
    }
}

/// Check that a sample interval is usable for differentiation and timing
///
/// # Errors
///
/// Returns an error if the interval is not a positive finite number
pub fn validate_sample_interval(sample_interval: f64) -> Result<()> {
    if sample_interval.is_finite() && sample_interval > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "Sample interval must be positive, got {sample_interval}"
        )))
    }
}
