//! # Spot servo calibration tool
//!
//! Drives one joint's servo to angles typed on stdin, to find the joint's
//! `rest_angle` and check its pulse range.
//!
//! # Usage
//!
//! ```bash
//! # Calibrate the rear left knee on the real boards
//! spot_calibrate --config /etc/spot/spot.toml --driver pca9685 rear_knee_left
//!
//! # Dry run against the simulation rig
//! spot_calibrate --config config/spot.toml -v front_shoulder_right
//! ```
//!
//! Each input line is an angle in degrees. An empty line moves to 90°,
//! `q` or end of input closes the board and exits.

use clap::Parser;
use spot_common::config::{ConfigLoader, SpotConfig};
use spot_common::consts::DEFAULT_CONFIG_PATH;
use spot_common::hal::BoardIndex;
use spot_common::joint::JointId;
use spot_hal::DriverRegistry;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Angle used when the operator just presses enter.
const CENTER_ANGLE_DEG: f32 = 90.0;

/// Spot servo calibration - move one joint to typed angles
#[derive(Parser, Debug)]
#[command(name = "spot_calibrate")]
#[command(version)]
#[command(about = "Move one SpotMicro joint to angles read from stdin")]
#[command(long_about = None)]
struct Args {
    /// Joint to move (e.g. rear_knee_left, arm_lift)
    joint: JointId,

    /// Path to spot.toml
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// PWM driver
    #[arg(short, long, default_value = "simulation")]
    driver: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Error)]
enum CalibrateError {
    #[error("{0} has no servo entry")]
    NoServo(JointId),

    #[error("{joint} is wired to board {board}, which is not configured")]
    BoardNotConfigured { joint: JointId, board: u8 },
}

fn main() {
    if let Err(e) = run() {
        error!("FATAL: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    setup_tracing(&args);

    let config = SpotConfig::load(&args.config)?;
    config.validate()?;

    let joint = args.joint;
    let servo = config
        .motion_controller
        .servo(joint)
        .ok_or(CalibrateError::NoServo(joint))?;
    servo.validate(joint.key())?;
    let (board_index, board_config) = BoardIndex::from_number(servo.board)
        .and_then(|idx| config.motion_controller.boards.get(idx).map(|b| (idx, b)))
        .ok_or(CalibrateError::BoardNotConfigured {
            joint,
            board: servo.board,
        })?;

    let registry = DriverRegistry::with_builtin();
    let driver = registry.create_driver(&args.driver)?;
    let mut board = driver.open(board_index, board_config)?;
    info!(
        %joint,
        board = %board_index,
        channel = servo.channel,
        rest_angle = servo.rest_angle,
        driver = driver.name(),
        "Calibrating"
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let result = (|| -> Result<(), Box<dyn std::error::Error>> {
        for line in stdin.lock().lines() {
            let line = line?;
            let input = line.trim();
            if input == "q" {
                break;
            }
            let angle = if input.is_empty() {
                CENTER_ANGLE_DEG
            } else {
                match input.parse::<f32>() {
                    Ok(angle) => angle,
                    Err(_) => {
                        warn!(input, "not an angle");
                        continue;
                    }
                }
            };
            let Some(pulse) = servo.pulse_for_angle(angle) else {
                warn!(angle, "angle outside [0, 180]");
                continue;
            };
            match board.set_channel_pulse(servo.channel, pulse) {
                Ok(()) => {
                    writeln!(stdout, "{joint} -> {angle}° ({pulse} µs)")?;
                }
                Err(e) => warn!(error = %e, "write rejected"),
            }
        }
        Ok(())
    })();

    // Release the board on every path out of the input loop.
    if let Err(e) = board.close() {
        warn!(error = %e, "close failed");
    }
    result
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
}
