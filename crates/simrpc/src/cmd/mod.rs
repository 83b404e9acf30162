use std::time::Duration;

use clap::{Args, Subcommand};
use simrpc_client::{SessionConfig, VehicleClient};
use simrpc_transport::{Endpoint, TcpSession};

use crate::exit::{client_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod arm;
pub mod call;
pub mod info;
pub mod ping;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Invoke an arbitrary remote method.
    Call(CallArgs),
    /// Check host liveness and measure round-trip latency.
    Ping(PingArgs),
    /// Probe a host and print version and vehicle metadata.
    Info(InfoArgs),
    /// Arm or disarm a vehicle.
    Arm(ArmArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Call(args) => call::run(args, format),
        Command::Ping(args) => ping::run(args, format),
        Command::Info(args) => info::run(args, format),
        Command::Arm(args) => arm::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Connection options shared by every host-touching subcommand.
#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Host endpoint as host[:port].
    #[arg(long, short = 'e', default_value_t = Endpoint::default(), env = "SIMRPC_ENDPOINT")]
    pub endpoint: Endpoint,
    /// Per-call response timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

impl ConnectArgs {
    pub fn session_config(&self) -> CliResult<SessionConfig> {
        let timeout = parse_duration(&self.timeout)?;
        Ok(SessionConfig {
            connect_timeout: Some(timeout),
            response_timeout: Some(timeout),
            write_timeout: Some(timeout),
            ..SessionConfig::default()
        })
    }

    pub fn connect(&self) -> CliResult<VehicleClient<TcpSession>> {
        let config = self.session_config()?;
        VehicleClient::connect_with_config(&self.endpoint, &config)
            .map_err(|err| client_error("connect failed", err))
    }
}

#[derive(Args, Debug)]
pub struct CallArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Remote method name, e.g. getServerVersion.
    pub method: String,
    /// Arguments as a JSON array, e.g. '[true, ""]'.
    #[arg(long, default_value = "[]")]
    pub args: String,
    /// Correlation token to stamp on the call envelope.
    #[arg(long, default_value_t = 0)]
    pub call_id: u32,
}

#[derive(Args, Debug)]
pub struct PingArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Number of pings to send.
    #[arg(long, short = 'c', default_value_t = 1)]
    pub count: u32,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Vehicle to query.
    #[arg(long, default_value = "")]
    pub vehicle: String,
}

#[derive(Args, Debug)]
pub struct ArmArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Disarm instead of arming.
    #[arg(long)]
    pub disarm: bool,
    /// Vehicle to address.
    #[arg(long, default_value = "")]
    pub vehicle: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
    }
}
