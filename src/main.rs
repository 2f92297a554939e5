// pinhost: claim the pins a plan declares, watch its inputs, keep the
// registry honest until shutdown.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

use pinbroker::config::{self, DriverKind, PinoutPlan};
use pinbroker::driver::{GpioDriver, SimDriver, SysfsDriver};
use pinbroker::system::{self, BoardIdentity};
use pinbroker::{
    BoardProfile, PinEvent, PinHandle, PinIdentifier, PinRegistry, PinWatcher, ProfileError,
};

/// Profile used when simulating without an explicit revision override.
const SIM_REVISION: &str = "a02082";

#[derive(Parser, Debug)]
#[command(
    name = "pinhost",
    about = "GPIO pin management host: numbering, ownership, typed handles."
)]
struct Cli {
    /// Path to a TOML pinout plan
    #[arg(short, long, default_value = "pinout.toml")]
    config: PathBuf,

    /// Use the in-memory simulator driver regardless of the plan
    #[arg(long)]
    simulate: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show board identity and CPU health readings
    Info,
    /// Print the pin table of the active board
    Pins {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Claim the planned pins and watch configured inputs until ctrl-c
    Run,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();

    let plan = if cli.config.exists() {
        config::load_plan(&cli.config)?
    } else {
        tracing::info!("no plan at {}, using defaults", cli.config.display());
        PinoutPlan::default()
    };

    let simulate = cli.simulate || plan.driver.kind == DriverKind::Sim;
    let profile = Arc::new(resolve_profile(&plan, simulate)?);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Info => info(&profile, simulate),
        Commands::Pins { json } => {
            let driver = build_driver(&plan, Arc::clone(&profile), simulate);
            let registry = PinRegistry::new(Arc::clone(&profile), driver);
            pins(&profile, &registry, json);
        }
        Commands::Run => run(&plan, profile, simulate).await?,
    }

    Ok(())
}

fn build_driver(
    plan: &PinoutPlan,
    profile: Arc<BoardProfile>,
    simulate: bool,
) -> Arc<dyn GpioDriver> {
    if simulate {
        Arc::new(SimDriver::new())
    } else {
        match &plan.driver.sysfs_root {
            Some(root) => Arc::new(SysfsDriver::with_root(profile, root)),
            None => Arc::new(SysfsDriver::new(profile)),
        }
    }
}

fn resolve_profile(plan: &PinoutPlan, simulate: bool) -> Result<BoardProfile, ProfileError> {
    if let Some(revision) = plan.board.revision.as_deref() {
        BoardProfile::from_revision(revision)
    } else if simulate {
        BoardProfile::from_revision(SIM_REVISION)
    } else {
        BoardProfile::detect()
    }
}

fn info(profile: &BoardProfile, simulate: bool) {
    println!("model:    {}", profile.model_name());
    println!("revision: {}", profile.revision());
    if simulate {
        println!("driver:   simulated");
        return;
    }
    match BoardIdentity::detect() {
        Ok(identity) => {
            println!("hardware: {}", identity.hardware.as_deref().unwrap_or("unknown"));
            println!("serial:   {}", identity.serial.as_deref().unwrap_or("unknown"));
        }
        Err(err) => tracing::warn!("board identity unavailable: {}", err),
    }
    match system::cpu_temperature() {
        Ok(celsius) => println!("cpu temp: {celsius:.1} C"),
        Err(err) => tracing::warn!("cpu temperature unavailable: {}", err),
    }
    match system::cpu_frequency_khz() {
        Ok(khz) => println!("cpu freq: {} MHz", khz / 1000),
        Err(err) => tracing::warn!("cpu frequency unavailable: {}", err),
    }
    // usage needs two samples a beat apart
    let mut sampler = system::CpuLoadSampler::new();
    let usage = sampler.sample().and_then(|_| {
        std::thread::sleep(Duration::from_millis(250));
        sampler.sample()
    });
    match usage {
        Ok(Some(percent)) => println!("cpu load: {percent:.1}%"),
        Ok(None) => {}
        Err(err) => tracing::warn!("cpu load unavailable: {}", err),
    }
}

fn pins(profile: &BoardProfile, registry: &PinRegistry, json: bool) {
    if json {
        let entries: Vec<_> = profile
            .board_pins()
            .filter_map(|pin| profile.pin_info(PinIdentifier::board(pin)).ok())
            .map(|info| {
                serde_json::json!({
                    "board": info.board_pin,
                    "bcm": info.bcm_pin,
                    "wired": info.wired_pin,
                    "name": info.name,
                    "capabilities": info.capabilities.to_string(),
                    "used": registry.is_pin_used(info.board_pin),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries).expect("pin table serializes"));
        return;
    }

    println!("{:>5} {:>4} {:>5}  {:<10} {:<24} used", "board", "bcm", "wired", "name", "capabilities");
    for pin in profile.board_pins() {
        let Ok(info) = profile.pin_info(PinIdentifier::board(pin)) else {
            continue;
        };
        let bcm = info.bcm_pin.map_or("-".to_string(), |pin| pin.to_string());
        let wired = info.wired_pin.map_or("-".to_string(), |pin| pin.to_string());
        println!(
            "{:>5} {:>4} {:>5}  {:<10} {:<24} {}",
            info.board_pin,
            bcm,
            wired,
            info.name,
            info.capabilities.to_string(),
            if registry.is_pin_used(info.board_pin) { "yes" } else { "no" },
        );
    }
}

async fn run(
    plan: &PinoutPlan,
    profile: Arc<BoardProfile>,
    simulate: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let driver = build_driver(plan, Arc::clone(&profile), simulate);
    let registry = PinRegistry::new(Arc::clone(&profile), driver);

    let claimed = plan.claim_all(&registry)?;
    tracing::info!("claimed {} pins on {}", claimed.len(), profile.model_name());

    let poll = Duration::from_millis(plan.watch.poll_ms);
    let (event_tx, mut event_rx) = mpsc::channel::<PinEvent>(64);
    let (shutdown_tx, _) = broadcast::channel(1);
    let mut held = Vec::new();
    let mut forwarders = Vec::new();

    for planned in claimed {
        match (planned.handle, planned.watch) {
            (PinHandle::Input(input), Some(edge)) => {
                let mut watcher = PinWatcher::spawn(input, edge, poll);
                let events = event_tx.clone();
                let mut shutdown_rx = shutdown_tx.subscribe();
                forwarders.push(tokio::spawn(async move {
                    loop {
                        tokio::select! {
                            _ = shutdown_rx.recv() => break,
                            event = watcher.next_event() => match event {
                                Some(event) => {
                                    let _ = events.send(event).await;
                                }
                                None => break,
                            }
                        }
                    }
                    // the returned handle is discarded with the join
                    // result, releasing the pin
                    watcher.stop().await
                }));
            }
            (handle, _) => held.push(handle),
        }
    }
    drop(event_tx);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown requested");
                break;
            }
            // the branch disables itself once every watcher is gone
            Some(event) = event_rx.recv() => {
                tracing::info!(
                    "pin {}: {} -> {}",
                    event.board_pin, event.previous, event.current
                );
            }
        }
    }

    let _ = shutdown_tx.send(());
    for forwarder in forwarders {
        let _ = forwarder.await;
    }
    for mut handle in held {
        handle.release();
    }
    tracing::info!("all pins released");
    Ok(())
}
