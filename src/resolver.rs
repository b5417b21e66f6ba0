use std::net::{IpAddr, SocketAddr};

use resolv_conf::ScopedIp;

use crate::error::ProbeError;

/// Port appended when a server is given without one
pub const DEFAULT_PORT: u16 = 53;

const RESOLV_CONF_PATH: &str = "/etc/resolv.conf";

/// Normalize a server string to `host:port`.
///
/// Supports formats:
///   "1.1.1.1"              -- becomes "1.1.1.1:53"
///   "1.1.1.1:5353"         -- kept as is
///   "example.org:53"       -- kept as is
///   "2606:4700::1111"      -- becomes "[2606:4700::1111]:53"
///   "[2606:4700::1111]"    -- becomes "[2606:4700::1111]:53"
pub fn normalize_server(input: &str) -> Result<String, ProbeError> {
	let trimmed = input.trim();
	if trimmed.is_empty() {
		return Err(ProbeError::Configuration("empty server address".to_string()));
	}

	if has_port(trimmed) {
		return Ok(trimmed.to_string());
	}

	// Bracketed IPv6 without port
	if let Some(inner) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
		return Ok(join_host_port(inner, DEFAULT_PORT));
	}

	Ok(join_host_port(trimmed, DEFAULT_PORT))
}

/// True when the string splits into a non-empty host and a numeric port.
fn has_port(s: &str) -> bool {
	if s.parse::<SocketAddr>().is_ok() {
		return true;
	}
	match s.rsplit_once(':') {
		// Unbracketed hosts may not contain further colons
		Some((host, port)) => {
			!host.is_empty() && !host.contains(':') && port.parse::<u16>().is_ok()
		}
		None => false,
	}
}

fn join_host_port(host: &str, port: u16) -> String {
	if host.contains(':') {
		format!("[{}]:{}", host, port)
	} else {
		format!("{}:{}", host, port)
	}
}

/// Heuristic used to tell a server argument from a domain name.
pub fn looks_like_server(s: &str) -> bool {
	let trimmed = s.trim();
	if trimmed.is_empty() {
		return false;
	}
	has_port(trimmed) || trimmed.parse::<IpAddr>().is_ok()
}

/// Return the first nameserver from /etc/resolv.conf as `host:53`.
pub fn system_default_server() -> Result<String, ProbeError> {
	if !cfg!(unix) {
		return Err(ProbeError::Configuration(format!(
			"unsupported auto-detection on {}; pass dns-server explicitly (e.g. 1.1.1.1 or 1.1.1.1:53)",
			std::env::consts::OS,
		)));
	}
	let content = std::fs::read(RESOLV_CONF_PATH).map_err(|e| {
		ProbeError::Configuration(format!("failed to read {}: {}", RESOLV_CONF_PATH, e))
	})?;
	first_nameserver(&content)
}

/// Parse resolv.conf content and pick its first usable nameserver.
///
/// Zone-scoped IPv6 entries (`fe80::1%eth0`) are skipped: without the zone
/// the address is unreachable, and `host:port` strings cannot carry one.
pub fn first_nameserver(content: &[u8]) -> Result<String, ProbeError> {
	let config = resolv_conf::Config::parse(content).map_err(|e| {
		ProbeError::Configuration(format!("failed to parse {}: {}", RESOLV_CONF_PATH, e))
	})?;
	if config.nameservers.is_empty() {
		return Err(ProbeError::Configuration(format!(
			"no nameserver entries in {}",
			RESOLV_CONF_PATH
		)));
	}
	let ip: IpAddr = config.nameservers.iter()
		.find_map(|ns| match ns {
			ScopedIp::V4(v4) => Some(IpAddr::V4(*v4)),
			ScopedIp::V6(v6, None) => Some(IpAddr::V6(*v6)),
			ScopedIp::V6(_, Some(_)) => None,
		})
		.ok_or_else(|| ProbeError::Configuration(format!(
			"only zone-scoped nameserver entries in {}; pass dns-server explicitly",
			RESOLV_CONF_PATH
		)))?;
	Ok(SocketAddr::new(ip, DEFAULT_PORT).to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_ipv4_no_port() {
		assert_eq!(normalize_server("1.1.1.1").unwrap(), "1.1.1.1:53");
	}

	#[test]
	fn test_ipv4_with_port() {
		assert_eq!(normalize_server("1.1.1.1:5353").unwrap(), "1.1.1.1:5353");
	}

	#[test]
	fn test_hostname_with_port() {
		assert_eq!(normalize_server("example.org:53").unwrap(), "example.org:53");
	}

	#[test]
	fn test_hostname_no_port() {
		assert_eq!(normalize_server("dns.google").unwrap(), "dns.google:53");
	}

	#[test]
	fn test_ipv6_bare() {
		assert_eq!(normalize_server("2606:4700::1111").unwrap(), "[2606:4700::1111]:53");
	}

	#[test]
	fn test_ipv6_bracketed() {
		assert_eq!(normalize_server("[2606:4700::1111]").unwrap(), "[2606:4700::1111]:53");
		assert_eq!(normalize_server("[2606:4700::1111]:853").unwrap(), "[2606:4700::1111]:853");
	}

	#[test]
	fn test_empty_input() {
		let err = normalize_server("  ").unwrap_err();
		assert!(matches!(err, ProbeError::Configuration(_)));
	}

	#[test]
	fn test_looks_like_server() {
		assert!(looks_like_server("9.9.9.9"));
		assert!(looks_like_server("9.9.9.9:53"));
		assert!(looks_like_server("::1"));
		assert!(looks_like_server("dns.quad9.net:53"));
		assert!(!looks_like_server("google.com"));
		assert!(!looks_like_server(""));
	}

	#[test]
	fn test_first_nameserver() {
		let conf = b"# generated\nsearch lan\nnameserver 192.168.1.1\nnameserver 8.8.8.8\n";
		assert_eq!(first_nameserver(conf).unwrap(), "192.168.1.1:53");
	}

	#[test]
	fn test_first_nameserver_ipv6() {
		let conf = b"nameserver 2001:4860:4860::8888\n";
		assert_eq!(first_nameserver(conf).unwrap(), "[2001:4860:4860::8888]:53");
	}

	#[test]
	fn test_scoped_nameserver_skipped() {
		let conf = b"nameserver fe80::1%eth0\nnameserver 9.9.9.9\n";
		assert_eq!(first_nameserver(conf).unwrap(), "9.9.9.9:53");
	}

	#[test]
	fn test_only_scoped_nameservers() {
		let err = first_nameserver(b"nameserver fe80::1%eth0\n").unwrap_err();
		assert!(err.to_string().contains("zone-scoped"));
	}

	#[test]
	fn test_no_nameserver_entries() {
		let err = first_nameserver(b"search lan\noptions ndots:1\n").unwrap_err();
		assert!(err.to_string().contains("no nameserver entries"));
	}
}
