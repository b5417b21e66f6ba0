use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::ProbeError;
use crate::probe::Prober;
use crate::stats::TimingAccumulator;
use crate::transport::{BenchmarkResult, Discipline, PhaseTimings};

/// Run `n` probes one after another and average the successful ones.
///
/// Repeating the same name against the same server this way shows the
/// latency drop once the answer is cached upstream.
pub async fn run_serial<P: Prober>(
	prober: &P,
	server: &str,
	qname: &str,
	timeout: Duration,
	n: usize,
) -> BenchmarkResult {
	let mut acc = TimingAccumulator::default();

	for attempt in 0..n {
		match prober.probe(server, qname, timeout).await {
			Ok(result) => acc.record_success(&result.timings),
			Err(e) => debug!(server, qname, attempt, timeout = e.is_timeout(), error = %e, "serial probe failed"),
		}
	}

	acc.finish(n)
}

/// Launch `n` probes at once, wait for all of them, then reduce.
///
/// Each task owns its socket and sends a single outcome on a channel with
/// room for the whole batch, so no task waits on the collector. Reduction
/// starts only after every task has been joined. The tasks live in a
/// JoinSet, so dropping this future aborts every probe still in flight.
pub async fn run_concurrent<P: Prober + 'static>(
	prober: Arc<P>,
	server: &str,
	qname: &str,
	timeout: Duration,
	n: usize,
) -> BenchmarkResult {
	let (tx, mut rx) = mpsc::channel::<Result<PhaseTimings, ProbeError>>(n.max(1));

	let mut tasks = JoinSet::new();
	for _ in 0..n {
		let prober = Arc::clone(&prober);
		let tx = tx.clone();
		let server = server.to_string();
		let qname = qname.to_string();

		tasks.spawn(async move {
			let outcome = prober.probe(&server, &qname, timeout).await
				.map(|result| result.timings);
			// Capacity covers the batch; only fails if the receiver is gone
			let _ = tx.send(outcome).await;
		});
	}
	drop(tx);

	while let Some(joined) = tasks.join_next().await {
		if let Err(e) = joined {
			// Counted as a failure: the task never reported an outcome
			warn!(server, qname, error = %e, "concurrent probe task failed");
		}
	}

	let mut acc = TimingAccumulator::default();
	while let Some(outcome) = rx.recv().await {
		match outcome {
			Ok(timings) => acc.record_success(&timings),
			Err(e) => debug!(server, qname, network = e.is_network(), error = %e, "concurrent probe failed"),
		}
	}

	acc.finish(n)
}

/// Run a benchmark batch under the given discipline.
pub async fn run<P: Prober + 'static>(
	discipline: Discipline,
	prober: Arc<P>,
	server: &str,
	qname: &str,
	timeout: Duration,
	n: usize,
) -> BenchmarkResult {
	match discipline {
		Discipline::Serial => run_serial(prober.as_ref(), server, qname, timeout, n).await,
		Discipline::Concurrent => run_concurrent(prober, server, qname, timeout, n).await,
	}
}
