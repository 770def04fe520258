//! # Spot Motion
//!
//! Motion controller process for the SpotMicro quadruped.
//!
//! Loads `spot.toml`, starts the status display and the abort coordinator,
//! probes the PWM boards, then runs the motion loop on the main thread with
//! control events read from stdin as newline-delimited JSON.
//!
//! ```bash
//! gamepad-bridge | spot_motion --config /etc/spot/spot.toml --driver pca9685
//! ```

use clap::Parser;
use spot_common::config::{ConfigError, ConfigLoader, LogLevel, SpotConfig};
use spot_common::consts::{
    ABORT_QUEUE_CAPACITY, DEFAULT_CONFIG_PATH, MOTION_QUEUE_CAPACITY, STATUS_QUEUE_CAPACITY,
};
use spot_common::hal::{HalError, OutputLine};
use spot_common::messages::{Component, StatusMessage};
use spot_hal::{DriverRegistry, SimOutputLine, SimRig};
use spot_motion::input::spawn_stdin_reader;
use spot_motion::lifecycle::{install_shutdown_handler, report_config_failure};
use spot_motion::sideband::{
    spawn_abort_coordinator, spawn_status_display, AbortCoordinator, StatusBoard, StatusDisplay,
};
use spot_motion::{MotionController, MotionTiming, ServoMap};
use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::sync_channel;
use std::sync::Arc;
use tracing::{error, info, info_span, warn};
use tracing_subscriber::EnvFilter;

/// Driver that needs no hardware.
const SIMULATION_DRIVER: &str = "simulation";

/// Spot Motion - SpotMicro motion controller
#[derive(Parser, Debug)]
#[command(name = "spot_motion")]
#[command(version)]
#[command(about = "Drive the SpotMicro servos from remote controller events on stdin")]
struct Args {
    /// Path to spot.toml
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// PWM driver (simulation, pca9685)
    #[arg(short, long, default_value = SIMULATION_DRIVER)]
    driver: String,

    /// Enable verbose logging (DEBUG level)
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    let config = SpotConfig::load(&args.config);
    let level = config
        .as_ref()
        .map_or(LogLevel::default(), |c| c.shared.log_level);
    setup_tracing(&args, level);

    info!("Spot motion v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args, config) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Spot motion shutdown complete");
}

fn run(args: &Args, config: Result<SpotConfig, ConfigError>) -> Result<(), Box<dyn Error>> {
    let (status_tx, status_rx) = sync_channel(STATUS_QUEUE_CAPACITY);
    let display = spawn_status_display(StatusDisplay::new(StatusBoard::new()), status_rx)?;

    let (config, map) = match config.and_then(|c| {
        c.validate()?;
        let map = ServoMap::from_config(&c.motion_controller)?;
        Ok((c, map))
    }) {
        Ok(loaded) => loaded,
        Err(e) => {
            report_config_failure(&status_tx);
            drop(status_tx);
            let _ = display.join();
            return Err(format!("{}: {e}", args.config.display()).into());
        }
    };
    info!(
        service = %config.shared.service_name,
        legs = map.legs_enabled(),
        arm = map.arm_enabled(),
        second_board = map.has_second_board(),
        "Config OK"
    );

    let registry = DriverRegistry::with_builtin();
    let driver = registry.create_driver(&args.driver)?;

    let line = match open_output_line(args, &config) {
        Ok(line) => line,
        Err(e) => {
            let _ = status_tx.try_send(StatusMessage::not_ok(Component::AbortController));
            return Err(e.into());
        }
    };
    let (abort_tx, abort_rx) = sync_channel(ABORT_QUEUE_CAPACITY);
    let abort = spawn_abort_coordinator(AbortCoordinator::new(line, status_tx.clone()), abort_rx)?;

    let (motion_tx, motion_rx) = sync_channel(MOTION_QUEUE_CAPACITY);
    let running = Arc::new(AtomicBool::new(true));
    install_shutdown_handler(motion_tx.clone(), running.clone())?;

    let timing = MotionTiming::from_config(&config.motion_controller);
    let reader_status_tx = status_tx.clone();
    let outcome = (|| -> Result<(), Box<dyn Error>> {
        let mut controller = MotionController::new(map, driver, timing, abort_tx, status_tx)?;
        spawn_stdin_reader(motion_tx, reader_status_tx, running)?;
        info_span!("motion_controller").in_scope(|| controller.run(&motion_rx))?;
        Ok(())
    })();

    // The controller owned the last abort sender, so the coordinator drops
    // the line and exits. The stdin reader may still be blocked in a read
    // and is left to process exit together with the display.
    if abort.join().is_err() {
        warn!("Abort controller thread panicked");
    }
    outcome
}

/// Servo-enable line: a GPIO pin with real boards, simulated otherwise.
fn open_output_line(args: &Args, config: &SpotConfig) -> Result<Box<dyn OutputLine>, HalError> {
    if args.driver != SIMULATION_DRIVER {
        if let Some(port) = config.abort_controller.gpio_port {
            if let Some(line) = gpio_line(port)? {
                info!(port, "Servo-enable line on GPIO");
                return Ok(line);
            }
        }
    }
    warn!(driver = %args.driver, "Servo-enable line is simulated");
    Ok(Box::new(SimOutputLine::new(SimRig::new())))
}

#[cfg(feature = "gpio")]
fn gpio_line(port: u8) -> Result<Option<Box<dyn OutputLine>>, HalError> {
    Ok(Some(Box::new(spot_hal::gpio::SysfsOutputLine::open(port)?)))
}

#[cfg(not(feature = "gpio"))]
fn gpio_line(_port: u8) -> Result<Option<Box<dyn OutputLine>>, HalError> {
    Ok(None)
}

/// Setup tracing subscriber from the CLI flags and the configured level.
fn setup_tracing(args: &Args, level: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        level.as_directive()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}
