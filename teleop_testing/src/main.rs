use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use clap::Parser;
use evdev_driver::EvdevSpaceMouse;
use log::info;
use srb_core::{
    select_sky_light, srb_types::Scenario, AdapterStatus, EnvironmentConfig, SpaceMouse,
    TeleopConfig,
};

#[derive(Debug, Parser)]
#[command(about = "Streams SpaceMouse teleoperation commands")]
struct Args {
    /// JSON teleop config
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the configured scenario
    #[arg(long)]
    scenario: Option<Scenario>,
    /// evdev node, e.g. /dev/input/event7. Scans /dev/input when omitted
    #[arg(long)]
    device: Option<PathBuf>,
    #[arg(long)]
    grab: bool,
    /// Commands printed per second
    #[arg(long, default_value_t = 10.0)]
    print_rate: f64,
    /// Stop after this many seconds
    #[arg(long)]
    duration: Option<f64>,
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match (&args.config, args.scenario) {
        (Some(path), scenario) => {
            let mut config = TeleopConfig::load(path)?;
            if let Some(scenario) = scenario {
                config.environment.scenario = scenario;
            }
            config
        }
        (None, scenario) => TeleopConfig {
            environment: EnvironmentConfig::new(scenario.unwrap_or_default()),
            ..Default::default()
        },
    };

    match select_sky_light(&config.environment, &Default::default()) {
        Some(sky) => {
            info!("Sky light '{}' at {}", sky.prim_path.name(), sky.prim_path);
            println!("{}", serde_json::to_string_pretty(&sky)?);
        }
        None => info!("No sky for scenario {}", config.environment.scenario),
    }

    let driver = match &args.device {
        Some(path) => EvdevSpaceMouse::with_path(path),
        None => EvdevSpaceMouse::new(),
    }
    .grab(args.grab);

    let mouse = SpaceMouse::new(driver, config.spacemouse.clone());
    mouse.add_callback("left", || info!("Reset"))?;
    mouse.add_callback("right", || info!("Gripper toggled"))?;
    mouse.add_callback("left+right", || info!("Both buttons"))?;
    print!("{mouse}");

    if mouse.status() == AdapterStatus::FailedToConnect {
        return Ok(());
    }

    let period = Duration::from_secs_f64(1. / args.print_rate.max(0.1));
    let deadline = args
        .duration
        .map(|secs| Instant::now() + Duration::from_secs_f64(secs.max(0.)));

    while mouse.status() == AdapterStatus::Polling
        && deadline.map_or(true, |deadline| Instant::now() < deadline)
    {
        let (twist, gripper_closed) = mouse.advance();
        println!(
            "pos [{:+.3} {:+.3} {:+.3}] rot [{:+.3} {:+.3} {:+.3}] gripper {}",
            twist[0],
            twist[1],
            twist[2],
            twist[3],
            twist[4],
            twist[5],
            if gripper_closed { "closed" } else { "open" }
        );
        std::thread::sleep(period);
    }

    Ok(())
}
