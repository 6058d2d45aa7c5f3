//! Gait kinetics command line tool for single-trial analysis.

use anyhow::{Context, Result};
use clap::Parser;
use gait_kinetics::{
    anthropometry::Sex,
    config::Config,
    pipeline::{GaitAnalysis, TrialReport},
    table::{angles_table, events_table, kinetics_tables},
    trial::{Joint, Side},
};
use log::info;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Marker trajectory table
    #[arg(short, long)]
    markers: PathBuf,

    /// Force plate table
    #[arg(short, long)]
    force_plates: PathBuf,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Total body mass in kg
    #[arg(long)]
    mass: Option<f64>,

    /// Sex for the anthropometric table (male, female)
    #[arg(short, long)]
    sex: Option<String>,

    /// Sample interval in seconds
    #[arg(long)]
    delta_t: Option<f64>,

    /// Event threshold as a fraction of body weight
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Directory for the kinetics, events and angles tables
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    /// Command line values take precedence over the configuration file
    fn apply_overrides(&self, config: &mut Config) -> Result<()> {
        if let Some(mass) = self.mass {
            config.trial.body_mass = mass;
        }
        if let Some(sex) = &self.sex {
            config.trial.sex = sex.parse::<Sex>()?;
        }
        if let Some(delta_t) = self.delta_t {
            config.trial.sample_interval = delta_t;
        }
        if let Some(threshold) = self.threshold {
            config.events.threshold_fraction = threshold;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Gait Kinetics");

    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path.display());
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config file {}", config_path.display()))?
    } else {
        Config::default()
    };
    args.apply_overrides(&mut config)?;

    let analysis = GaitAnalysis::new(config)?;
    let trial = analysis.load_trial(&args.markers, &args.force_plates)?;
    let report = analysis.analyze(&trial)?;

    print_summary(&report);

    if let Some(dir) = &args.output {
        write_tables(&report, dir)?;
    }

    Ok(())
}

fn print_summary(report: &TrialReport) {
    println!("Cadence: {:.1} steps/min", report.cadence);

    for side in Side::BOTH {
        let events = report.events.side(side);
        let stance = report.stance.side(side);
        println!(
            "{side}: {} heel strikes, {} toe offs, stance {:.3} ± {:.3}, swing {:.3}",
            events.heel_strikes.len(),
            events.toe_offs.len(),
            stance.mean,
            stance.std_dev,
            1.0 - stance.mean
        );

        for joint in Joint::ALL {
            if let Some(peak) = report.kinetics.peak_force(side, joint, 1) {
                println!("  peak vertical {} force: {peak:.1} N", joint.name());
            }
        }
    }
}

fn write_tables(report: &TrialReport, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let (forces, moments) = kinetics_tables(&report.kinetics)?;
    forces.to_path(dir.join("joint_forces.tsv"))?;
    moments.to_path(dir.join("joint_moments.tsv"))?;
    events_table(&report.events).to_path(dir.join("events.tsv"))?;
    angles_table(&report.angles)?.to_path(dir.join("joint_angles.tsv"))?;

    info!("Tables written to: {}", dir.display());
    Ok(())
}
