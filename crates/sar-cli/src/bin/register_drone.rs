//! Register a simulated drone with the coordinator and stream synthetic
//! telemetry along a circular search pattern until interrupted.

use clap::Parser;
use sar_cli::sim::paths::CircularPath;
use sar_cli::sim::FlightPath;
use sar_sdk::DroneClient;
use std::time::Duration;
use tokio::time;

/// Register a simulated drone and stream circular-path telemetry.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Coordinator base URL
    #[arg(long, default_value = "http://localhost:3000")]
    url: String,

    /// Drone identifier
    #[arg(long, default_value = "DRONE001")]
    drone_id: String,

    /// Center latitude
    #[arg(long, default_value_t = 33.6846)]
    lat: f64,

    /// Center longitude
    #[arg(long, default_value_t = -117.8265)]
    lon: f64,

    /// Circle radius in meters
    #[arg(long, default_value_t = 150.0)]
    radius: f64,

    /// Altitude in meters
    #[arg(long, default_value_t = 60.0)]
    altitude: f64,

    /// Speed in meters per second
    #[arg(long, default_value_t = 8.0)]
    speed: f64,

    /// Starting battery percentage; drains slowly over the run
    #[arg(long, default_value_t = 95.0)]
    battery: f64,

    /// Update rate in Hz
    #[arg(long, default_value_t = 1.0)]
    rate: f64,

    /// Duration in seconds (0 = run until interrupted)
    #[arg(long, default_value_t = 0)]
    duration: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    println!("Connecting to coordinator at {}...", args.url);
    let mut client = DroneClient::new(&args.url);

    client.register(&args.drone_id).await?;
    println!("Registered drone: {}", args.drone_id);

    let path = CircularPath::new(args.lat, args.lon, args.radius, args.altitude, args.speed, 0.0, false);

    println!("Streaming circular-path telemetry for {}", args.drone_id);
    println!("  Center: ({}, {})", args.lat, args.lon);
    println!("  Radius: {}m, Altitude: {}m", args.radius, args.altitude);
    println!();

    let start = time::Instant::now();
    let mut update_count = 0u32;
    let mut battery_pct = args.battery;
    let mut interval = time::interval(Duration::from_secs_f64(1.0 / args.rate));

    loop {
        interval.tick().await;

        let elapsed = start.elapsed().as_secs_f64();
        if args.duration > 0 && elapsed > args.duration as f64 {
            break;
        }

        let (lat, lon, altitude_m) = path.get_position(elapsed);
        let heading_deg = path.get_heading(elapsed);

        match client.send_position(lat, lon, altitude_m, heading_deg, path.get_speed_mps(), battery_pct).await {
            Ok(_) => {
                update_count += 1;
                println!("[{update_count:3}] ({lat:.6}, {lon:.6}) @ {altitude_m:.0}m battery={battery_pct:.1}% -> OK");
            }
            Err(e) => eprintln!("Error sending telemetry: {e}"),
        }

        battery_pct = (battery_pct - 0.01).max(0.0);
    }

    println!("\nSent {update_count} position updates.");
    Ok(())
}
