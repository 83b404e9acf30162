use std::time::Instant;

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use crate::cmd::PingArgs;
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct PingOutput {
    endpoint: String,
    count: u32,
    latency_ms: Vec<f64>,
    avg_latency_ms: f64,
}

pub fn run(args: PingArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = args.connect.connect()?;

    let mut latency_ms = Vec::with_capacity(args.count as usize);
    for _ in 0..args.count.max(1) {
        let start = Instant::now();
        client
            .ping()
            .map_err(|err| client_error("ping failed", err))?;
        latency_ms.push(round_ms(start.elapsed().as_secs_f64() * 1000.0));
    }

    let avg_latency_ms = round_ms(latency_ms.iter().sum::<f64>() / latency_ms.len() as f64);
    let out = PingOutput {
        endpoint: args.connect.endpoint.to_string(),
        count: latency_ms.len() as u32,
        latency_ms,
        avg_latency_ms,
    };

    print_ping(&out, format);
    Ok(SUCCESS)
}

fn round_ms(ms: f64) -> f64 {
    (ms * 100.0).round() / 100.0
}

fn print_ping(out: &PingOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ENDPOINT", "COUNT", "AVG LATENCY"])
                .add_row(vec![
                    out.endpoint.clone(),
                    out.count.to_string(),
                    format!("{:.2}ms", out.avg_latency_ms),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "endpoint={} count={} avg={:.2}ms",
                out.endpoint, out.count, out.avg_latency_ms
            );
        }
        OutputFormat::Raw => {
            println!("{:.2}", out.avg_latency_ms);
        }
    }
}
