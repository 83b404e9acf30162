use serde::Serialize;

use crate::cmd::InfoArgs;
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct InfoOutput {
    endpoint: String,
    vehicle: String,
    server_version: i64,
    min_required_client_version: i64,
    api_control_enabled: bool,
    connected: bool,
}

pub fn run(args: InfoArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = args.connect.connect()?.with_vehicle(args.vehicle.clone());

    let server_version = client
        .server_version()
        .map_err(|err| client_error("getServerVersion failed", err))?;
    let min_required_client_version = client
        .min_required_client_version()
        .map_err(|err| client_error("getMinRequiredClientVersion failed", err))?;
    let api_control_enabled = client
        .is_api_control_enabled()
        .map_err(|err| client_error("isApiControlEnabled failed", err))?;

    let out = InfoOutput {
        endpoint: args.connect.endpoint.to_string(),
        vehicle: args.vehicle,
        server_version,
        min_required_client_version,
        api_control_enabled,
        connected: true,
    };

    print_info(&out, format);
    Ok(SUCCESS)
}

fn print_info(out: &InfoOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("Host Info:");
            println!("  Endpoint:            {}", out.endpoint);
            if out.vehicle.is_empty() {
                println!("  Vehicle:             (default)");
            } else {
                println!("  Vehicle:             {}", out.vehicle);
            }
            println!("  Server version:      {}", out.server_version);
            println!(
                "  Min client version:  {}",
                out.min_required_client_version
            );
            println!("  API control enabled: {}", out.api_control_enabled);
        }
        OutputFormat::Raw => {
            println!("{}", out.server_version);
        }
    }
}
