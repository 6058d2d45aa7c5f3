//! Time-distance gait metrics derived from detected events.

use crate::{
    constants::SECONDS_PER_MINUTE,
    events::{GaitEvents, LegEvents},
    trial::{validate_sample_interval, Bilateral},
    Error, Result,
};

/// Statistical summary of per-cycle values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    /// Mean value
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
    /// Range (max - min)
    pub range: f64,
}

impl Statistics {
    /// Summarize a non-empty set of values
    ///
    /// # Errors
    ///
    /// Returns an error if `values` is empty
    #[allow(clippy::cast_precision_loss)] // Cycle counts stay small
    pub fn from_values(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::InsufficientData("No values to summarize".to_string()));
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Ok(Self {
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
            range: max - min,
        })
    }
}

/// Cadence in steps per minute
///
/// Counts every heel strike of both legs; the number of steps is one less
/// than that count, timed from the earliest to the latest heel strike.
///
/// # Errors
///
/// Returns an error if:
/// - `delta_t` is not a positive finite number
/// - Fewer than 2 heel strikes exist across both legs
/// - All heel strikes fall on the same sample
#[allow(clippy::cast_precision_loss)] // Sample indices stay far below 2^52
pub fn cadence(events: &GaitEvents, delta_t: f64) -> Result<f64> {
    validate_sample_interval(delta_t)?;

    let heel_strikes = || events.left.heel_strikes.iter().chain(&events.right.heel_strikes);
    let count = heel_strikes().count();
    if count < 2 {
        return Err(Error::InsufficientData(format!(
            "Cadence needs at least 2 heel strikes, got {count}"
        )));
    }

    let first = heel_strikes().copied().min().unwrap_or_default();
    let last = heel_strikes().copied().max().unwrap_or_default();
    if last == first {
        return Err(Error::InsufficientData(
            "Heel strikes span no time; cadence is undefined".to_string(),
        ));
    }

    let minutes = (last - first) as f64 * delta_t / SECONDS_PER_MINUTE;
    Ok((count - 1) as f64 / minutes)
}

/// Per-cycle stance ratios of one leg
///
/// Toe-offs before the first heel strike belong to a stance phase that
/// began before the recording and are skipped, so that `TO[k]` closes the
/// stance opened by `HS[k]`. A cycle runs from `HS[k]` to `HS[k + 1]`.
///
/// # Errors
///
/// Returns an error if the leg has fewer than 2 heel strikes, heel strikes
/// that are not strictly increasing, or no cycle with a toe-off
#[allow(clippy::cast_precision_loss)]
pub fn leg_stance_ratios(leg: &LegEvents) -> Result<Vec<f64>> {
    if leg.heel_strikes.len() < 2 {
        return Err(Error::InsufficientData(format!(
            "Stance ratio needs at least 2 heel strikes, got {}",
            leg.heel_strikes.len()
        )));
    }
    if let Some(cycle) = leg.heel_strikes.windows(2).find(|cycle| cycle[1] <= cycle[0]) {
        return Err(Error::InvalidInput(format!(
            "Heel strikes must be strictly increasing, got {} then {}",
            cycle[0], cycle[1]
        )));
    }

    let first_heel_strike = leg.heel_strikes[0];
    let toe_offs = leg.toe_offs.iter().filter(|&&to| to > first_heel_strike);

    let ratios: Vec<f64> = leg
        .heel_strikes
        .windows(2)
        .zip(toe_offs)
        .map(|(cycle, &toe_off)| {
            let stance = toe_off as f64 - cycle[0] as f64;
            let cycle_length = cycle[1] as f64 - cycle[0] as f64;
            stance / cycle_length
        })
        .collect();

    if ratios.is_empty() {
        return Err(Error::InsufficientData("No complete gait cycle with a toe-off".to_string()));
    }

    Ok(ratios)
}

/// Summary of one leg's per-cycle stance ratios
///
/// # Errors
///
/// Propagates the errors of [`leg_stance_ratios`]
pub fn stance_statistics(leg: &LegEvents) -> Result<Statistics> {
    Statistics::from_values(&leg_stance_ratios(leg)?)
}

/// Mean stance-to-cycle ratio of each leg, `(left, right)`
///
/// # Errors
///
/// Returns an error if either leg lacks a complete cycle
pub fn stance_ratio(events: &GaitEvents) -> Result<(f64, f64)> {
    let left = stance_statistics(&events.left)?.mean;
    let right = stance_statistics(&events.right)?.mean;
    Ok((left, right))
}

/// Mean swing-to-cycle ratio of each leg
///
/// # Errors
///
/// Returns an error if either leg lacks a complete cycle
pub fn swing_ratio(events: &GaitEvents) -> Result<Bilateral<f64>> {
    let (left, right) = stance_ratio(events)?;
    Ok(Bilateral::new(1.0 - left, 1.0 - right))
}
