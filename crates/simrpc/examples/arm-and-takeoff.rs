//! Arm a vehicle, take off, hover briefly, then land.
//!
//! Run with a simulation host listening on the default port:
//!   cargo run --example arm-and-takeoff --features client
//!
//! Point at another host with SIMRPC_ENDPOINT=host:port.

use std::time::Duration;

use simrpc::client::{SessionConfig, VehicleClient};
use simrpc::transport::Endpoint;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let endpoint = match std::env::var("SIMRPC_ENDPOINT") {
        Ok(raw) => raw.parse::<Endpoint>()?,
        Err(_) => Endpoint::default(),
    };

    let config = SessionConfig {
        connect_timeout: Some(Duration::from_secs(5)),
        ..SessionConfig::default()
    };
    let mut client = VehicleClient::connect_with_config(&endpoint, &config)?;
    eprintln!("Connected to {endpoint}");

    let version = client.server_version()?;
    eprintln!("Server version: {version}");

    client.enable_api_control(true)?;
    if !client.arm_disarm(true)? {
        eprintln!("Host refused to arm");
        return Ok(());
    }

    eprintln!("Taking off...");
    client.takeoff(Duration::from_secs(20))?;

    let pose = client.sim_get_vehicle_pose()?;
    eprintln!(
        "Hovering at ({:.1}, {:.1}, {:.1})",
        pose.position.x, pose.position.y, pose.position.z
    );
    client.hover()?;
    std::thread::sleep(Duration::from_secs(3));

    eprintln!("Landing...");
    client.land(Duration::from_secs(30))?;
    client.arm_disarm(false)?;
    client.enable_api_control(false)?;

    Ok(())
}
