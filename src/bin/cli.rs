// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! compgeom CLI

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use compgeom::cli::{Reporter, Runner, SliceMode};
use compgeom::config::{EngineConfig, SliceAxis};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "compgeom")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Component geometry engine - wetted area/volume, mass properties and area-rule slicing", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// Configuration file (defaults to ./compgeom.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output directory for reports
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Run classification on a single thread
    #[arg(long, global = true)]
    serial: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Intersect components and report theoretical/wetted area and volume
    CompGeom {
        /// Model file (JSON)
        model: PathBuf,

        /// Trim the model to its y >= 0 half
        #[arg(long)]
        half: bool,

        /// Also write a CSV table
        #[arg(long)]
        csv: Option<String>,

        /// Also write the drag build-up table
        #[arg(long)]
        drag: Option<String>,

        /// Also write the trimmed exterior surface as STL
        #[arg(long)]
        stl: Option<String>,
    },

    /// Compute mass, centre of gravity and inertia
    MassProp {
        /// Model file (JSON)
        model: PathBuf,

        /// Number of X slices
        #[arg(short, long)]
        slices: Option<usize>,
    },

    /// Cross-section area slicing
    Slice {
        #[command(subcommand)]
        mode: SliceCommand,
    },

    /// Run the repair pass and report degenerate and open meshes
    Check {
        /// Model file (JSON)
        model: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct SliceArgs {
    /// Model file (JSON)
    model: PathBuf,

    /// Number of stations
    #[arg(short, long)]
    slices: Option<usize>,

    /// First station (disables automatic bounds)
    #[arg(long, requires = "end")]
    start: Option<f64>,

    /// Last station (disables automatic bounds)
    #[arg(long, requires = "start")]
    end: Option<f64>,
}

#[derive(Subcommand)]
enum SliceCommand {
    /// Planes normal to an axis
    Planar {
        #[command(flatten)]
        args: SliceArgs,

        /// Slicing axis (x, y, z)
        #[arg(short, long, default_value = "x")]
        axis: SliceAxis,
    },
    /// Aft-opening cones along X
    Conic {
        #[command(flatten)]
        args: SliceArgs,

        /// Cone half-angle in degrees
        #[arg(long)]
        half_angle: Option<f64>,
    },
    /// Mach planes rolled around X (supersonic area rule)
    Awave {
        #[command(flatten)]
        args: SliceArgs,

        /// Mach number
        #[arg(short, long)]
        mach: Option<f64>,

        /// Roll angles per station
        #[arg(long)]
        sections: Option<usize>,
    },
}

fn init_logging(level: &str) -> Result<()> {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn apply_slice_args(config: &mut EngineConfig, args: &SliceArgs) {
    if let Some(n) = args.slices {
        config.slice.num_slices = n;
    }
    if let (Some(start), Some(end)) = (args.start, args.end) {
        config.slice.auto_bounds = false;
        config.slice.start = start;
        config.slice.end = end;
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let mut config = EngineConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(dir) = &cli.output_dir {
        config.output.dir = dir.clone();
    }
    if cli.serial {
        config.parallel = false;
    }

    let result = run(cli.command, config);
    if let Err(e) = &result {
        Reporter::report_error(&format!("{:#}", e));
    }
    result
}

fn run(command: Commands, mut config: EngineConfig) -> Result<()> {
    match command {
        Commands::CompGeom {
            model,
            half,
            csv,
            drag,
            stl,
        } => {
            config.half_model |= half;
            config.output.csv_file = csv.or(config.output.csv_file);
            config.output.drag_build_up_file = drag.or(config.output.drag_build_up_file);
            config.output.stl_file = stl.or(config.output.stl_file);
            config.validate()?;

            let run = Runner::new(config).comp_geom(&model)?;
            Reporter::report_comp_geom(&model.display().to_string(), &run.results, &run.files, run.duration);
        }
        Commands::MassProp { model, slices } => {
            if let Some(n) = slices {
                config.mass.num_slices = n;
            }
            config.validate()?;

            let run = Runner::new(config).mass_prop(&model)?;
            Reporter::report_mass_prop(&model.display().to_string(), &run.results, &run.files, run.duration);
        }
        Commands::Slice { mode } => {
            let (args, mode) = match mode {
                SliceCommand::Planar { args, axis } => {
                    config.slice.axis = axis;
                    (args, SliceMode::Planar)
                }
                SliceCommand::Conic { args, half_angle } => {
                    if let Some(angle) = half_angle {
                        config.slice.cone_half_angle_deg = angle;
                    }
                    (args, SliceMode::Conic)
                }
                SliceCommand::Awave { args, mach, sections } => {
                    if let Some(mach) = mach {
                        config.slice.mach = mach;
                    }
                    if let Some(n) = sections {
                        config.slice.num_sections = n;
                    }
                    (args, SliceMode::Awave)
                }
            };
            apply_slice_args(&mut config, &args);
            config.validate()?;

            let run = Runner::new(config).slice(&args.model, mode)?;
            Reporter::report_slice(&args.model.display().to_string(), &run.results, &run.files, run.duration);
        }
        Commands::Check { model } => {
            let run = Runner::new(config).check(&model)?;
            Reporter::report_check(&model.display().to_string(), &run.results, run.duration);
        }
        Commands::Version => {
            println!("compgeom v{}", env!("CARGO_PKG_VERSION"));
        }
    }
    Ok(())
}
