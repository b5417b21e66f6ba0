use std::time::Duration;

use crate::transport::{BenchmarkResult, PhaseTimings};

/// Divide a duration by a count, truncating to whole nanoseconds.
pub fn div_duration(d: Duration, count: usize) -> Duration {
	if count == 0 {
		return Duration::ZERO;
	}
	let nanos = d.as_nanos() / count as u128;
	// The mean never exceeds the largest sample, which fits in a Duration
	Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

impl PhaseTimings {
	/// Phase-by-phase sum.
	pub fn sum(&self, other: &PhaseTimings) -> PhaseTimings {
		PhaseTimings {
			total: self.total + other.total,
			dial: self.dial + other.dial,
			pack: self.pack + other.pack,
			write: self.write + other.write,
			read: self.read + other.read,
			unpack: self.unpack + other.unpack,
		}
	}

	/// Phase-by-phase mean over `count` samples; all zero when count is 0.
	pub fn average(&self, count: usize) -> PhaseTimings {
		PhaseTimings {
			total: div_duration(self.total, count),
			dial: div_duration(self.dial, count),
			pack: div_duration(self.pack, count),
			write: div_duration(self.write, count),
			read: div_duration(self.read, count),
			unpack: div_duration(self.unpack, count),
		}
	}
}

/// Running sums for one benchmark batch.
///
/// Only successful probes contribute timings; failures are implied by
/// `attempts - success` when the batch is finished.
#[derive(Debug, Default)]
pub struct TimingAccumulator {
	sum: PhaseTimings,
	success: usize,
}

impl TimingAccumulator {
	pub fn record_success(&mut self, timings: &PhaseTimings) {
		self.sum = self.sum.sum(timings);
		self.success += 1;
	}

	/// Reduce the batch into a BenchmarkResult for `attempts` probes.
	pub fn finish(self, attempts: usize) -> BenchmarkResult {
		let success = self.success.min(attempts);
		BenchmarkResult {
			attempts,
			success,
			fail: attempts - success,
			avg: self.sum.average(success),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn timings(total_ms: u64, read_ms: u64) -> PhaseTimings {
		PhaseTimings {
			total: Duration::from_millis(total_ms),
			dial: Duration::from_micros(100),
			pack: Duration::from_micros(5),
			write: Duration::from_micros(20),
			read: Duration::from_millis(read_ms),
			unpack: Duration::from_micros(10),
		}
	}

	#[test]
	fn test_div_duration() {
		assert_eq!(div_duration(Duration::from_millis(30), 3), Duration::from_millis(10));
		assert_eq!(div_duration(Duration::from_nanos(10), 3), Duration::from_nanos(3));
		assert_eq!(div_duration(Duration::from_secs(5), 0), Duration::ZERO);
	}

	#[test]
	fn test_mean_of_successes_only() {
		// Outcomes: ok(10), fail, ok(30), fail, ok(20)
		let outcomes = [Some(10), None, Some(30), None, Some(20)];
		let mut acc = TimingAccumulator::default();
		for outcome in outcomes {
			if let Some(ms) = outcome {
				acc.record_success(&timings(ms, ms - 1));
			}
		}
		let result = acc.finish(outcomes.len());
		assert_eq!(result.attempts, 5);
		assert_eq!(result.success, 3);
		assert_eq!(result.fail, 2);
		assert_eq!(result.avg.total, Duration::from_millis(20));
		assert_eq!(result.avg.read, Duration::from_millis(19));
		assert_eq!(result.avg.dial, Duration::from_micros(100));
		assert_eq!(result.avg.rtt_approx(), result.avg.write + result.avg.read);
	}

	#[test]
	fn test_all_failures_average_zero() {
		let result = TimingAccumulator::default().finish(4);
		assert_eq!(result.success, 0);
		assert_eq!(result.fail, 4);
		assert_eq!(result.avg, PhaseTimings::default());
	}

	#[test]
	fn test_empty_batch() {
		let result = TimingAccumulator::default().finish(0);
		assert_eq!(result, BenchmarkResult::default());
	}
}
