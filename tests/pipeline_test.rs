//! End-to-end tests of the single-trial analysis pipeline


use gait_kinetics::{
    anthropometry::Sex,
    config::Config,
    pipeline::GaitAnalysis,
    trial::{LegMarkers, MarkerFrame, Side, Trial},
    Error,
};
use nalgebra::Vector3;
use test_helpers::{assert_close, standing_frame, vertical_plates, walking_trial, BODY_MASS, DELTA_T};

#[test]
fn test_walking_trial_report() {
    let analysis = GaitAnalysis::new(Config::default()).unwrap();
    let trial = walking_trial().unwrap();

    let report = analysis.analyze(&trial).unwrap();

    assert_close(report.cadence, 120.0, 1e-9);
    let (left, right) = report.stance_ratio();
    assert_close(left, 0.6, 1e-12);
    assert_close(right, 0.6, 1e-12);
    let (left_swing, _) = report.swing_ratio();
    assert_close(left_swing, 0.4, 1e-12);
    assert_close(report.stance.left.std_dev, 0.0, 1e-12);

    assert_eq!(report.events.left.heel_strikes.len(), 3);
    assert_eq!(report.kinetics.len(), trial.len() - 2);
    assert_eq!(report.lengths.len(), trial.len());
    assert_eq!(report.angles.len(), trial.len());
    assert_close(report.masses.total(), 2.0 * BODY_MASS * (14.78 + 4.81 + 1.29) / 100.0, 1e-9);
}

#[test]
fn test_standing_posture_angles() {
    let analysis = GaitAnalysis::new(Config::default()).unwrap();
    let report = analysis.analyze(&walking_trial().unwrap()).unwrap();

    let angles = report.angles[0];
    for side in Side::BOTH {
        let leg = angles.side(side);
        assert_close(leg.knee_flexion, 0.0, 1e-9);
        assert_close(leg.hip_abduction, 0.0, 1e-9);
        // Foot points forward and down from the ankle
        assert!(leg.ankle_plantarflexion.is_finite());
    }
    assert_close(report.lengths[0].torso, 0.6, 1e-12);
    assert_close(report.lengths[0].limbs.left.thigh, 0.4, 1e-12);
}

#[test]
fn test_first_order_derivative_keeps_more_samples() {
    let mut config = Config::default();
    config.dynamics.derivative_order = 1;
    let analysis = GaitAnalysis::new(config).unwrap();
    let trial = walking_trial().unwrap();

    let report = analysis.analyze(&trial).unwrap();
    assert_eq!(report.kinetics.len(), trial.len() - 1);
}

#[test]
fn test_sex_changes_kinetics() {
    let trial = walking_trial().unwrap();
    let analyze = |sex: Sex| {
        let mut config = Config::default();
        config.trial.sex = sex;
        GaitAnalysis::new(config).unwrap().analyze(&trial).unwrap()
    };

    let male = analyze(Sex::Male);
    let female = analyze(Sex::Female);
    assert_ne!(male.masses, female.masses);
    assert_ne!(male.kinetics, female.kinetics);
    assert_eq!(male.events, female.events);
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = Config::default();
    config.trial.body_mass = 0.0;
    assert!(matches!(GaitAnalysis::new(config), Err(Error::ConfigError(_))));

    let mut config = Config::default();
    config.dynamics.derivative_order = 0;
    assert!(matches!(GaitAnalysis::new(config), Err(Error::ConfigError(_))));
}

#[test]
fn test_trial_without_gait_cycles_fails() {
    // Quiet standing on both plates: no transitions, so no cadence
    let len = 100;
    let force = vec![BODY_MASS * 9.81 / 2.0; len];
    let trial = Trial::new(vec![standing_frame(); len], vertical_plates(&force, &force), DELTA_T).unwrap();

    let analysis = GaitAnalysis::new(Config::default()).unwrap();
    assert!(matches!(analysis.analyze(&trial), Err(Error::InsufficientData(_))));
}

#[test]
fn test_accelerating_markers_load_joints() {
    // Whole body rises with y(t) = a t² / 2, so every segment CoM accelerates at a
    let a = 2.0;
    let base = walking_trial().unwrap();
    let markers: Vec<MarkerFrame> = base
        .markers()
        .iter()
        .enumerate()
        .map(|(i, frame)| {
            let t = i as f64 * DELTA_T;
            let lift = Vector3::new(0.0, 0.5 * a * t * t, 0.0);
            let leg = |leg: &LegMarkers| LegMarkers {
                hip: leg.hip + lift,
                knee: leg.knee + lift,
                ankle: leg.ankle + lift,
                toe: leg.toe + lift,
            };
            MarkerFrame {
                neck: frame.neck + lift,
                left: leg(&frame.left),
                right: leg(&frame.right),
            }
        })
        .collect();
    let trial = Trial::new(markers, base.force_plates().to_vec(), DELTA_T).unwrap();

    let analysis = GaitAnalysis::new(Config::default()).unwrap();
    let report = analysis.analyze(&trial).unwrap();
    let leg = report.masses.left;

    for sample in report.kinetics.samples() {
        let grf_y = trial.force_plates()[sample.sample].left.force.y;
        let loads = sample.loads.left;
        // Each segment adds m (9.81 + a) to the vertical joint force
        assert_close(loads.ankle.force.y, -grf_y + leg.foot * (9.81 + a), 1e-6);
        assert_close(loads.knee.force.y, -grf_y + (leg.foot + leg.shank) * (9.81 + a), 1e-6);
        assert_close(
            loads.hip.force.y,
            -grf_y + (leg.foot + leg.shank + leg.thigh) * (9.81 + a),
            1e-6,
        );
    }

    // Same trial held still carries only the weight
    let still = analysis.analyze(&base).unwrap();
    let moving_hip = report.kinetics.samples()[0].loads.left.hip.force.y;
    let still_hip = still.kinetics.samples()[0].loads.left.hip.force.y;
    assert_close(moving_hip - still_hip, (leg.foot + leg.shank + leg.thigh) * a, 1e-6);
}
