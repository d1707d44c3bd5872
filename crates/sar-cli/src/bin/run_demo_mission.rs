//! Submit a demo search mission with N simulated drones and drive it to
//! completion, streaming telemetry along each drone's transit path.
//!
//! Exit codes follow spec.md §6.1: 0 success, 1 validation error,
//! 2 conflict, 3 timeout, 4 internal error.

use clap::Parser;
use sar_cli::sim::scenarios::{demo_mission_spec, flight_paths_for_mission};
use sar_cli::sim::FlightPath;
use sar_core::MissionPhase;
use sar_sdk::DroneClient;
use std::time::Duration;
use tokio::time;

/// Run a demo search mission end to end.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Coordinator base URL
    #[arg(long, default_value = "http://localhost:3000")]
    url: String,

    /// Admin bearer token for mission submission (falls back to
    /// SAR_ADMIN_TOKEN if unset)
    #[arg(long)]
    admin_token: Option<String>,

    /// Number of simulated drones
    #[arg(long, default_value_t = 2)]
    drones: u32,

    /// Search area center latitude
    #[arg(long, default_value_t = 33.6846)]
    lat: f64,

    /// Search area center longitude
    #[arg(long, default_value_t = -117.8265)]
    lon: f64,

    /// Simulated drone speed in meters per second
    #[arg(long, default_value_t = 10.0)]
    speed: f64,

    /// Update rate in Hz
    #[arg(long, default_value_t = 1.0)]
    rate: f64,

    /// Maximum seconds to wait for the mission to reach a terminal phase
    #[arg(long, default_value_t = 300)]
    timeout_secs: u64,
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let message = err.to_string();
    if message.contains("400") {
        1
    } else if message.contains("409") {
        2
    } else if message.contains("504") {
        3
    } else {
        4
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("run_demo_mission failed: {err}");
        std::process::exit(exit_code_for(&err));
    }
}

async fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    println!("Connecting to coordinator at {}...", args.url);
    let drone_ids: Vec<String> = (1..=args.drones).map(|i| format!("DEMO{i:03}")).collect();

    let mut clients = Vec::new();
    for drone_id in &drone_ids {
        let mut client = DroneClient::new(&args.url);
        client.register(drone_id).await?;
        println!("Registered drone: {drone_id}");
        clients.push(client);
    }

    let spec = demo_mission_spec(drone_ids, args.lat, args.lon);
    let mission_id = spec.mission_id.clone();
    let paths = flight_paths_for_mission(&spec, args.speed);

    let admin_token = args
        .admin_token
        .clone()
        .or_else(|| std::env::var("SAR_ADMIN_TOKEN").ok())
        .unwrap_or_else(|| "change-me-admin".to_string());

    let mut admin_client = DroneClient::new(&args.url);
    admin_client.set_admin_token(Some(admin_token));
    admin_client.submit_mission(&spec).await?;
    println!("Submitted mission {}", mission_id.0);

    let start = time::Instant::now();
    let mut interval = time::interval(Duration::from_secs_f64(1.0 / args.rate));

    loop {
        interval.tick().await;
        let elapsed = start.elapsed().as_secs_f64();

        for (client, (drone_id, path)) in clients.iter().zip(paths.iter()) {
            let (lat, lon, altitude_m) = path.get_position(elapsed);
            let heading_deg = path.get_heading(elapsed);
            if let Err(e) = client
                .send_position(lat, lon, altitude_m, heading_deg, path.get_speed_mps(), 90.0)
                .await
            {
                eprintln!("{drone_id}: telemetry send failed: {e}");
            }
        }

        let state = admin_client.get_mission(&mission_id).await?;
        println!("[{:5.1}s] phase={:?} progress={:.0}%", elapsed, state.phase, state.progress * 100.0);

        match state.phase {
            MissionPhase::Complete => {
                println!("Mission complete.");
                return Ok(());
            }
            MissionPhase::Aborted | MissionPhase::Failed => {
                anyhow::bail!("mission ended in {:?}: {}", state.phase, state.abort_reason.unwrap_or_default());
            }
            _ => {}
        }

        if elapsed > args.timeout_secs as f64 {
            anyhow::bail!("timed out (504) waiting for mission to complete");
        }
    }
}
