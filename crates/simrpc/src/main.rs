mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "simrpc", version, about = "Vehicle simulation RPC client")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_call_subcommand() {
        let cli = Cli::try_parse_from([
            "simrpc",
            "call",
            "armDisarm",
            "--args",
            r#"[true, ""]"#,
            "--endpoint",
            "127.0.0.1:41451",
        ])
        .expect("call args should parse");

        assert!(matches!(cli.command, Command::Call(_)));
    }

    #[test]
    fn call_defaults_to_empty_args_and_call_id_zero() {
        let cli = Cli::try_parse_from(["simrpc", "call", "ping"]).expect("call should parse");
        match cli.command {
            Command::Call(args) => {
                assert_eq!(args.args, "[]");
                assert_eq!(args.call_id, 0);
                assert_eq!(args.connect.endpoint.to_string(), "127.0.0.1:41451");
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn parses_arm_with_vehicle() {
        let cli = Cli::try_parse_from(["simrpc", "arm", "--disarm", "--vehicle", "Drone1"])
            .expect("arm args should parse");
        match cli.command {
            Command::Arm(args) => {
                assert!(args.disarm);
                assert_eq!(args.vehicle, "Drone1");
            }
            other => panic!("expected arm, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_endpoint() {
        let err = Cli::try_parse_from(["simrpc", "ping", "--endpoint", "host:notaport"])
            .expect_err("bad endpoint should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
