use clap::Parser;

/// DNS latency probe
#[derive(Parser, Debug)]
#[command(name = "dns-latency")]
#[command(about = "Measure detailed DNS request timings (serial) and caching behavior (bench/brute). Optionally compare two resolvers.")]
pub struct Cli {
	/// DNS server (host or host:port); defaults to the system resolver
	#[arg(value_name = "DNS_SERVER")]
	pub server: Option<String>,

	/// Comma-separated domains to test (overrides the default set)
	#[arg(long = "domains")]
	pub domains: Option<String>,

	/// Compare against another DNS server (host or host:port)
	#[arg(long = "compare")]
	pub compare: Option<String>,

	/// Repeat serially after the first request and print averages (caching check)
	#[arg(long = "bench")]
	pub bench: bool,

	/// Number of serial requests used by --bench
	#[arg(long = "bench-rounds", default_value = "10")]
	pub bench_rounds: usize,

	/// Run N requests concurrently per domain and print averages (0 disables; typical N=250)
	#[arg(long = "brute", default_value = "0")]
	pub brute: usize,

	/// Query timeout in milliseconds
	#[arg(short = 't', long = "timeout", default_value = "3000")]
	pub timeout: u64,

	/// Output CSV file path
	#[arg(short = 'o', long = "output")]
	pub output: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let cli = Cli::try_parse_from(["dns-latency"]).unwrap();
		assert!(cli.server.is_none());
		assert!(!cli.bench);
		assert_eq!(cli.bench_rounds, 10);
		assert_eq!(cli.brute, 0);
		assert_eq!(cli.timeout, 3000);
	}

	#[test]
	fn test_compare_and_brute() {
		let cli = Cli::try_parse_from([
			"dns-latency", "1.1.1.1", "--compare", "9.9.9.9", "--brute", "250", "--bench",
		]).unwrap();
		assert_eq!(cli.server.as_deref(), Some("1.1.1.1"));
		assert_eq!(cli.compare.as_deref(), Some("9.9.9.9"));
		assert_eq!(cli.brute, 250);
		assert!(cli.bench);
	}
}
