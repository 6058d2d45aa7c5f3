//! Anthropometric model: segment masses and center-of-mass placement.
//!
//! Regression constants follow de Leva (1996), "Adjustments to
//! Zatsiorsky-Seluyanov's segment inertia parameters", J Biomech 29(9).
//! Both legs share the same fractions; asymmetric builds are not modeled.

use crate::{
    constants::{FEMALE_COM_PERCENT, FEMALE_MASS_PERCENT, MALE_COM_PERCENT, MALE_MASS_PERCENT, PERCENT},
    trial::{Bilateral, MarkerFrame, SegmentPoints, SegmentSet, Side},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sex category selecting the regression table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    /// Male table
    Male,
    /// Female table
    Female,
}

impl Sex {
    fn mass_percent(self) -> [f64; 3] {
        match self {
            Sex::Male => MALE_MASS_PERCENT,
            Sex::Female => FEMALE_MASS_PERCENT,
        }
    }

    fn com_percent(self) -> [f64; 3] {
        match self {
            Sex::Male => MALE_COM_PERCENT,
            Sex::Female => FEMALE_COM_PERCENT,
        }
    }

    /// Segment mass fractions of total body mass
    #[must_use]
    pub fn mass_fractions(self) -> SegmentSet<f64> {
        let [thigh, shank, foot] = self.mass_percent();
        SegmentSet { thigh, shank, foot } * PERCENT
    }

    /// Center-of-mass location as a fraction of segment length from the
    /// proximal landmark
    #[must_use]
    pub fn com_fractions(self) -> SegmentSet<f64> {
        let [thigh, shank, foot] = self.com_percent();
        SegmentSet { thigh, shank, foot } * PERCENT
    }
}

impl FromStr for Sex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "0" => Ok(Sex::Male),
            "female" | "f" | "1" => Ok(Sex::Female),
            other => Err(Error::InvalidInput(format!("Unrecognized sex: {other:?}"))),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "male"),
            Sex::Female => write!(f, "female"),
        }
    }
}

/// Segment masses in kg for both legs
pub type SegmentMasses = Bilateral<SegmentSet<f64>>;

impl SegmentMasses {
    /// Sum of all six segment masses
    #[must_use]
    pub fn total(&self) -> f64 {
        [&self.left, &self.right]
            .iter()
            .map(|leg| leg.thigh + leg.shank + leg.foot)
            .sum()
    }
}

/// Compute segment masses from total body mass
///
/// # Errors
///
/// Returns an error if the body mass is not a positive finite number
pub fn segment_masses(total_body_mass: f64, sex: Sex) -> Result<SegmentMasses> {
    if !(total_body_mass.is_finite() && total_body_mass > 0.0) {
        return Err(Error::InvalidInput(format!(
            "Body mass must be positive, got {total_body_mass}"
        )));
    }

    let leg = sex.mass_fractions() * total_body_mass;
    Ok(Bilateral::new(leg, leg))
}

/// Place each segment's center of mass along its proximal-distal line
///
/// For every sample, `com = proximal - c * (proximal - distal)` where `c`
/// is the sex-specific fraction. Thigh spans hip to knee, shank knee to
/// ankle, foot ankle to toe.
#[must_use]
pub fn segment_center_of_mass(markers: &[MarkerFrame], sex: Sex) -> Vec<SegmentPoints> {
    let fractions = sex.com_fractions();

    markers
        .iter()
        .map(|frame| {
            Bilateral::from_fn(|side: Side| {
                let leg = frame.leg(side);
                SegmentSet::from_fn(|segment| {
                    let (proximal, distal) = leg.segment_ends(segment);
                    proximal - (proximal - distal) * *fractions.segment(segment)
                })
            })
        })
        .collect()
}
