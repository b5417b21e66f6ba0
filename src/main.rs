mod bench;
mod cli;
mod dns;
mod domains;
mod error;
mod output;
mod probe;
mod resolver;
mod stats;
mod transport;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::output::ReportRow;
use crate::probe::{Prober, UdpProber};
use crate::transport::{Discipline, LatencyConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
		)
		.with_writer(std::io::stderr)
		.init();

	let cli = Cli::parse();

	// Server from the argument, else the system default resolver
	let server = match &cli.server {
		Some(s) => {
			if !resolver::looks_like_server(s) {
				warn!(server = %s, "argument is not an IP or host:port; treating it as a DNS server hostname");
			}
			s.clone()
		}
		None => resolver::system_default_server()
			.context("no dns-server arg and failed to detect system default resolver")?,
	};

	let domains = match &cli.domains {
		Some(list) => domains::parse_domain_list(list)?,
		None => domains::default_domains()?,
	};

	let config = LatencyConfig {
		timeout: Duration::from_millis(cli.timeout),
		bench_rounds: (cli.bench && cli.bench_rounds > 0).then_some(cli.bench_rounds),
		brute: (cli.brute > 0).then_some(cli.brute),
		compare: cli.compare.as_deref()
			.map(str::trim)
			.filter(|s| !s.is_empty())
			.map(String::from),
	};
	if config.timeout.is_zero() {
		return Err(anyhow!("--timeout must be greater than 0"));
	}
	info!(%server, names = domains.len(), ?config, "starting latency run");

	let prober = Arc::new(UdpProber::new());
	let mut rows = Vec::new();

	for name in &domains {
		match &config.compare {
			None => run_single(&prober, &server, name, &config, &mut rows).await,
			Some(other) => run_compare(&prober, &server, other, name, &config, &mut rows).await,
		}
	}

	// Write CSV if requested
	if let Some(path) = &cli.output {
		output::write_csv(path, &rows)?;
	}

	Ok(())
}

fn serial_label(n: usize) -> String {
	format!("bench (serial x{})", n)
}

fn brute_label(n: usize) -> String {
	format!("brute (concurrent x{})", n)
}

/// Probe one server for one name, then run the enabled benchmarks.
async fn run_single(
	prober: &Arc<UdpProber>,
	server: &str,
	name: &str,
	config: &LatencyConfig,
	rows: &mut Vec<ReportRow>,
) {
	let outcome = prober.probe(server, name, config.timeout).await;
	rows.push(ReportRow::from_probe(server, name, &outcome));
	match &outcome {
		Ok(r) => output::print_result_block(r),
		Err(e) => output::print_error_block(server, name, e),
	}

	if let Some(n) = config.bench_rounds {
		let b = bench::run(Discipline::Serial, Arc::clone(prober), server, name, config.timeout, n).await;
		output::print_benchmark_block(&serial_label(n), &b);
		rows.push(ReportRow::from_benchmark(&Discipline::Serial.to_string(), server, name, &b));
	}

	if let Some(n) = config.brute {
		let b = bench::run(Discipline::Concurrent, Arc::clone(prober), server, name, config.timeout, n).await;
		output::print_benchmark_block(&brute_label(n), &b);
		rows.push(ReportRow::from_benchmark(&Discipline::Concurrent.to_string(), server, name, &b));
	}
}

/// Probe two servers for the same name and print them phase by phase.
async fn run_compare(
	prober: &Arc<UdpProber>,
	server_a: &str,
	server_b: &str,
	name: &str,
	config: &LatencyConfig,
	rows: &mut Vec<ReportRow>,
) {
	let outcome_a = prober.probe(server_a, name, config.timeout).await;
	let outcome_b = prober.probe(server_b, name, config.timeout).await;
	rows.push(ReportRow::from_probe(server_a, name, &outcome_a));
	rows.push(ReportRow::from_probe(server_b, name, &outcome_b));

	output::print_compare_header(name, server_a, server_b);
	match (&outcome_a, &outcome_b) {
		(Ok(a), Ok(b)) => output::print_compare_timings(a, b),
		_ => output::print_compare_errors(outcome_a.as_ref().err(), outcome_b.as_ref().err()),
	}

	let batches = [
		(Discipline::Serial, config.bench_rounds),
		(Discipline::Concurrent, config.brute),
	];
	for (discipline, count) in batches {
		let Some(n) = count else { continue };
		let a = bench::run(discipline, Arc::clone(prober), server_a, name, config.timeout, n).await;
		let b = bench::run(discipline, Arc::clone(prober), server_b, name, config.timeout, n).await;
		let label = match discipline {
			Discipline::Serial => serial_label(n),
			Discipline::Concurrent => brute_label(n),
		};
		output::print_compare_benchmark(&label, &a, &b);
		rows.push(ReportRow::from_benchmark(&discipline.to_string(), server_a, name, &a));
		rows.push(ReportRow::from_benchmark(&discipline.to_string(), server_b, name, &b));
	}
}
