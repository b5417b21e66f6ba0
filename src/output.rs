use std::time::Duration;

use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};

use anyhow::Result;

use crate::error::ProbeError;
use crate::transport::{BenchmarkResult, PhaseTimings, ProbeResult};

/// One line of the CSV report: a single probe or a benchmark batch
#[derive(Debug, Clone)]
pub struct ReportRow {
	pub kind: String,
	pub server: String,
	pub qname: String,
	pub attempts: usize,
	pub success: usize,
	pub fail: usize,
	pub timings: PhaseTimings,
}

impl ReportRow {
	pub fn from_probe(server: &str, qname: &str, outcome: &Result<ProbeResult, ProbeError>) -> Self {
		let (success, timings) = match outcome {
			Ok(r) => (1, r.timings),
			Err(_) => (0, PhaseTimings::default()),
		};
		ReportRow {
			kind: "probe".to_string(),
			server: server.to_string(),
			qname: qname.to_string(),
			attempts: 1,
			success,
			fail: 1 - success,
			timings,
		}
	}

	pub fn from_benchmark(kind: &str, server: &str, qname: &str, b: &BenchmarkResult) -> Self {
		ReportRow {
			kind: kind.to_string(),
			server: server.to_string(),
			qname: qname.to_string(),
			attempts: b.attempts,
			success: b.success,
			fail: b.fail,
			timings: b.avg,
		}
	}
}

/// Phase label, accessor and note for each timing row, in display order
const PHASES: [(&str, fn(&PhaseTimings) -> Duration, &str); 7] = [
	("total", |t| t.total, "-"),
	("dial", |t| t.dial, "udp dial to server"),
	("pack", |t| t.pack, "dns message -> wire bytes"),
	("write", |t| t.write, "write query bytes"),
	("read", |t| t.read, "read response bytes"),
	("unpack", |t| t.unpack, "wire bytes -> dns message"),
	("rtt(approx)", |t| t.rtt_approx(), "write+read (useful for caching deltas)"),
];

fn fmt_duration(d: Duration) -> String {
	format!("{:.3?}", d)
}

fn new_table() -> Table {
	let mut table = Table::new();
	table.load_preset(UTF8_FULL);
	table.set_content_arrangement(ContentArrangement::Dynamic);
	table
}

/// Print the error that replaced a single probe's result.
pub fn print_error_block(server: &str, qname: &str, err: &ProbeError) {
	println!("\n=== {} ===", qname);
	println!("server:   {}", server);
	println!("error:    {}", err);
}

/// Print everything a single probe reported, followed by its timings.
pub fn print_result_block(r: &ProbeResult) {
	println!("\n=== {} ===", r.qname);
	println!("server:   {}", r.server);
	println!("network:  {}", r.network);
	println!("local:    {}", r.local_addr);
	println!("remote:   {}", r.remote_addr);
	println!("timeout:  {}", fmt_duration(r.timeout));
	println!("qtype:    A");

	println!("\nresponse:");
	println!("  rcode:   {}", r.rcode);
	println!("  id:      {}", r.msg_id);
	let f = &r.flags;
	println!(
		"  flags:   QR={} AA={} TC={} RD={} RA={} AD={} CD={}",
		f.qr, f.aa, f.tc, f.rd, f.ra, f.ad, f.cd,
	);
	println!(
		"  counts:  answer={} authority={} additional={}",
		r.answer_count, r.authority_count, r.additional_count,
	);
	println!("  sizes:   query={}B response={}B", r.query_size, r.response_size);

	if !r.answers.is_empty() {
		println!("  answers:");
		for a in &r.answers {
			println!("    - {}  TTL={}", a.value, a.ttl);
		}
	}

	let mut table = new_table();
	table.set_header(vec!["phase", "duration", "notes"]);
	for (label, get, notes) in PHASES {
		table.add_row(vec![label.to_string(), fmt_duration(get(&r.timings)), notes.to_string()]);
	}

	println!("\nTimings (wall-clock):");
	println!("{table}");
}

/// Print attempt counts and averaged phases for one benchmark batch.
pub fn print_benchmark_block(label: &str, b: &BenchmarkResult) {
	let mut table = new_table();
	table.set_header(vec!["metric", "value"]);
	table.add_row(vec!["attempts".to_string(), b.attempts.to_string()]);
	table.add_row(vec!["success".to_string(), b.success.to_string()]);
	table.add_row(vec!["fail".to_string(), b.fail.to_string()]);
	for (phase, get, _) in PHASES {
		table.add_row(vec![format!("avg_{}", phase), fmt_duration(get(&b.avg))]);
	}

	println!("\n{}:", label);
	println!("{table}");
}

/// Print the heading of an A/B comparison for one name.
pub fn print_compare_header(qname: &str, server_a: &str, server_b: &str) {
	println!("\n=== {} (compare) ===", qname);
	println!("A:  {}", server_a);
	println!("B:  {}", server_b);
}

/// Print whichever side of a comparison failed.
pub fn print_compare_errors(err_a: Option<&ProbeError>, err_b: Option<&ProbeError>) {
	println!();
	if let Some(e) = err_a {
		println!("A error:  {}", e);
	}
	if let Some(e) = err_b {
		println!("B error:  {}", e);
	}
}

/// Color a pair so the lower duration is green and the higher red.
fn lower_is_better(a: Duration, b: Duration) -> (Cell, Cell) {
	let (color_a, color_b) = match a.cmp(&b) {
		std::cmp::Ordering::Less => (Color::Green, Color::Red),
		std::cmp::Ordering::Greater => (Color::Red, Color::Green),
		std::cmp::Ordering::Equal => (Color::Grey, Color::Grey),
	};
	(
		Cell::new(fmt_duration(a)).fg(color_a),
		Cell::new(fmt_duration(b)).fg(color_b),
	)
}

fn compare_table(a: &PhaseTimings, b: &PhaseTimings, prefix: &str) -> Table {
	let mut table = new_table();
	table.set_header(vec!["phase", "A", "B", "notes"]);
	for (phase, get, notes) in PHASES {
		let (cell_a, cell_b) = lower_is_better(get(a), get(b));
		table.add_row(vec![
			Cell::new(format!("{}{}", prefix, phase)),
			cell_a,
			cell_b,
			Cell::new(notes),
		]);
	}
	table
}

/// Print two single-probe timings side by side.
pub fn print_compare_timings(a: &ProbeResult, b: &ProbeResult) {
	println!("\nTimings compare (lower is better):");
	println!("{}", compare_table(&a.timings, &b.timings, ""));
}

/// Print two benchmark batches side by side.
pub fn print_compare_benchmark(label: &str, a: &BenchmarkResult, b: &BenchmarkResult) {
	println!("\n{} compare (lower is better):", label);
	println!(
		"success:  A={}/{}  B={}/{}",
		a.success, a.attempts, b.success, b.attempts,
	);
	println!("{}", compare_table(&a.avg, &b.avg, "avg_"));
}

fn ms(d: Duration) -> String {
	format!("{:.3}", d.as_secs_f64() * 1000.0)
}

/// Write report rows to a CSV file.
pub fn write_csv(path: &str, rows: &[ReportRow]) -> Result<()> {
	let mut writer = csv::Writer::from_path(path)?;

	writer.write_record([
		"kind", "server", "qname", "attempts", "success", "fail",
		"total_ms", "dial_ms", "pack_ms", "write_ms", "read_ms", "unpack_ms",
		"rtt_approx_ms",
	])?;

	for r in rows {
		let t = &r.timings;
		writer.write_record([
			r.kind.clone(),
			r.server.clone(),
			r.qname.clone(),
			r.attempts.to_string(),
			r.success.to_string(),
			r.fail.to_string(),
			ms(t.total),
			ms(t.dial),
			ms(t.pack),
			ms(t.write),
			ms(t.read),
			ms(t.unpack),
			ms(t.rtt_approx()),
		])?;
	}

	writer.flush()?;
	println!("\nResults written to: {}", path);
	Ok(())
}
