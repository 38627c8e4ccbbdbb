use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::Parser;
use tracing::info;

use talos::{
    configuration::AppConfig,
    driver::{sim::SimRig, HeadingSensor},
    gamepad::{run_teleop_loop, ReplayInputSource},
    logging,
    sequencer::Sequencer,
    swerve_drive::SwerveDrive,
    swerve_module::SwerveModule,
    TICK_PERIOD,
};

#[derive(Parser, Debug)]
#[command(version, about = "Talos swerve drivetrain on a simulated chassis")]
struct Args {
    /// path to config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sets the level of verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbosity: u8,

    /// skip the teleop replay and run the autonomous sequence only
    #[arg(long)]
    auto_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::setup_tracing(args.verbosity);

    let app_config = AppConfig::load_config(&args.config)?;

    let mut rig = SimRig::new(app_config.module.clone());
    let imu = rig.imu.clone();
    let drive = Arc::new(Mutex::new(build_drive(&app_config, &rig)));

    // the rig stands in for the physical chassis, integrating commands in
    // the background at the control-loop rate
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(TICK_PERIOD);
        loop {
            tick.tick().await;
            rig.step(TICK_PERIOD.as_secs_f64());
        }
    });

    info!("Calibrating inertial sensor");
    while imu.is_calibrating() {
        tokio::time::sleep(TICK_PERIOD).await;
    }
    info!("Inertial sensor calibrated");

    if !args.auto_only {
        info!("Replaying teleop recording");
        let replay = ReplayInputSource::from_json(include_str!("../config/teleop_replay.json"))?;
        run_teleop_loop(drive.clone(), Box::new(replay)).await?;
    }

    info!("Running autonomous sequence");
    let mut auto1 = Sequencer::new();
    {
        let drive = drive.clone();
        auto1.add(move || drive.lock().unwrap().auto_drive(0.0, 0.5, 12.0));
    }
    {
        let drive = drive.clone();
        auto1.add(move || drive.lock().unwrap().auto_turn(45.0, 0.5));
    }
    {
        let drive = drive.clone();
        auto1.add(move || drive.lock().unwrap().auto_drive(180.0, 0.5, 6.0));
    }
    auto1.run_to_completion().await;
    drive.lock().unwrap().stop();

    info!(heading = imu.heading(), "Autonomous sequence complete");
    Ok(())
}

fn build_drive(config: &AppConfig, rig: &SimRig) -> SwerveDrive {
    let module = |index: usize| {
        SwerveModule::new(
            Box::new(rig.steering[index].clone()),
            Box::new(rig.drive[index].clone()),
            config.module.clone(),
        )
    };
    let mut drive = SwerveDrive::new(
        module(0),
        module(1),
        module(2),
        module(3),
        Box::new(rig.imu.clone()),
    );
    drive.set_drive_pid(config.drive_pid);
    drive.set_turn_pid(config.turn_pid);
    drive
}
