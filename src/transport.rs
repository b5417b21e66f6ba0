use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

/// Transport used for every probe
pub const NETWORK_UDP: &str = "udp";

/// Header flags copied from a decoded response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
	pub qr: bool,
	pub aa: bool,
	pub tc: bool,
	pub rd: bool,
	pub ra: bool,
	pub ad: bool,
	pub cd: bool,
}

/// One A record from the answer section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
	pub value: String,
	pub ttl: u32,
}

/// Wall-clock duration of each phase of a probe.
///
/// Phases are timed independently, so their sum is not required to equal
/// `total`, but `total` always covers the longest single phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseTimings {
	pub total: Duration,
	pub dial: Duration,
	pub pack: Duration,
	pub write: Duration,
	pub read: Duration,
	pub unpack: Duration,
}

impl PhaseTimings {
	/// Approximate round trip: write + read.
	pub fn rtt_approx(&self) -> Duration {
		self.write + self.read
	}
}

/// Result of a single successful probe
#[derive(Debug, Clone)]
pub struct ProbeResult {
	pub server: String,
	pub network: &'static str,
	pub local_addr: SocketAddr,
	pub remote_addr: SocketAddr,
	pub timeout: Duration,
	pub qname: String,
	pub rcode: String,
	pub msg_id: u16,
	pub flags: Flags,
	pub answer_count: usize,
	pub authority_count: usize,
	pub additional_count: usize,
	pub query_size: usize,
	pub response_size: usize,
	pub answers: Vec<Answer>,
	pub timings: PhaseTimings,
}

/// Reduced outcome of N probes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BenchmarkResult {
	pub attempts: usize,
	pub success: usize,
	pub fail: usize,
	/// Averaged over successful attempts only
	pub avg: PhaseTimings,
}

/// How repeated probes are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discipline {
	/// One probe after another
	Serial,
	/// All probes in flight at once
	Concurrent,
}

impl fmt::Display for Discipline {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Discipline::Serial => write!(f, "serial"),
			Discipline::Concurrent => write!(f, "concurrent"),
		}
	}
}

/// Latency run configuration
#[derive(Debug, Clone)]
pub struct LatencyConfig {
	pub timeout: Duration,
	/// Serial rounds per name, None when disabled
	pub bench_rounds: Option<usize>,
	/// Concurrent probes per name, None when disabled
	pub brute: Option<usize>,
	pub compare: Option<String>,
}
