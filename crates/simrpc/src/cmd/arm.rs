use serde::Serialize;
use tracing::info;

use crate::cmd::ArmArgs;
use crate::exit::{client_error, CliResult, FAILURE, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct ArmOutput {
    endpoint: String,
    vehicle: String,
    armed: bool,
    accepted: bool,
}

pub fn run(args: ArmArgs, format: OutputFormat) -> CliResult<i32> {
    let arm = !args.disarm;
    let mut client = args.connect.connect()?.with_vehicle(args.vehicle.clone());

    let accepted = client
        .arm_disarm(arm)
        .map_err(|err| client_error("armDisarm failed", err))?;
    info!(vehicle = %args.vehicle, arm, accepted, "armDisarm completed");

    let out = ArmOutput {
        endpoint: args.connect.endpoint.to_string(),
        vehicle: args.vehicle,
        armed: arm,
        accepted,
    };

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            let verb = if out.armed { "arm" } else { "disarm" };
            let status = if out.accepted { "accepted" } else { "rejected" };
            println!("{verb}: {status}");
        }
        OutputFormat::Raw => {
            println!("{}", out.accepted);
        }
    }

    // The host answered but declined the transition.
    if out.accepted {
        Ok(SUCCESS)
    } else {
        Ok(FAILURE)
    }
}
