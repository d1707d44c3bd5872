//! Fire a fleet-wide emergency intent against the coordinator.
//!
//! Exit codes follow spec.md §6.1: 0 success, 1 validation error,
//! 2 conflict, 3 timeout, 4 internal error.

use clap::{Parser, ValueEnum};
use sar_core::EmergencyKind;
use sar_sdk::DroneClient;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Kind {
    StopAll,
    Rtl,
    Kill,
}

impl From<Kind> for EmergencyKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::StopAll => EmergencyKind::Stop,
            Kind::Rtl => EmergencyKind::Rtl,
            Kind::Kill => EmergencyKind::Disarm,
        }
    }
}

/// Trigger a fleet-wide emergency intent.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Coordinator base URL
    #[arg(long, default_value = "http://localhost:3000")]
    url: String,

    /// Admin bearer token (falls back to SAR_ADMIN_TOKEN if unset)
    #[arg(long)]
    admin_token: Option<String>,

    /// Which emergency to trigger
    #[arg(long, value_enum)]
    kind: Kind,

    /// Operator identifier recorded on the intent
    #[arg(long, default_value = "cli-operator")]
    operator_id: String,

    /// Reason recorded on the intent
    #[arg(long, default_value = "manual trigger via sar-cli")]
    reason: String,

    /// Required for `--kind kill`
    #[arg(long, default_value_t = false)]
    confirm: bool,
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
        eprintln!("trigger_emergency failed: {err}");
        std::process::exit(exit_code_for(&err));
    }
}

async fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    if matches!(args.kind, Kind::Kill) && !args.confirm {
        anyhow::bail!("disarm requires --confirm (400)");
    }

    let admin_token = args
        .admin_token
        .clone()
        .or_else(|| std::env::var("SAR_ADMIN_TOKEN").ok())
        .unwrap_or_else(|| "change-me-admin".to_string());

    let mut client = DroneClient::new(&args.url);
    client.set_admin_token(Some(admin_token));

    println!("Triggering {:?} as {}...", args.kind, args.operator_id);
    let outcome = client
        .trigger_emergency(args.kind.into(), args.operator_id.clone(), args.reason.clone(), args.confirm)
        .await?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
