use rand::rngs::OsRng;
use rand::Rng;

use crate::error::ProbeError;

/// Maximum length of a single DNS label
pub const MAX_LABEL_LEN: usize = 63;

const EDGE_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const MID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789-";

/// Build a random DNS label of `len` characters.
///
/// The first and last characters never are a hyphen. Characters are drawn
/// from the OS random source.
pub fn random_label(len: usize) -> Result<String, ProbeError> {
	if !(1..=MAX_LABEL_LEN).contains(&len) {
		return Err(ProbeError::Configuration(format!(
			"label length must be 1..{}, got {}",
			MAX_LABEL_LEN, len
		)));
	}

	let mut rng = OsRng;
	let label: String = (0..len)
		.map(|i| {
			let charset = if i == 0 || i == len - 1 { EDGE_CHARSET } else { MID_CHARSET };
			charset[rng.gen_range(0..charset.len())] as char
		})
		.collect();
	Ok(label)
}

/// Return a name under .com that no resolver should have cached.
///
/// Shape: `<60 chars>.<63 chars>.com`
pub fn random_cold_domain() -> Result<String, ProbeError> {
	let first = random_label(60)?;
	let second = random_label(MAX_LABEL_LEN)?;
	Ok(format!("{}.{}.com", first, second))
}

/// Names probed when no --domains list is given: a popular name, a
/// less popular one, and a cold-cache control.
pub fn default_domains() -> Result<Vec<String>, ProbeError> {
	Ok(vec![
		"google.com".to_string(),
		"earentir.dev".to_string(),
		random_cold_domain()?,
	])
}

/// Split a comma-separated domain list, dropping blank entries.
pub fn parse_domain_list(csv: &str) -> Result<Vec<String>, ProbeError> {
	let domains: Vec<String> = csv.split(',')
		.map(|d| d.trim().to_string())
		.filter(|d| !d.is_empty())
		.collect();
	if domains.is_empty() {
		return Err(ProbeError::Configuration(
			"--domains provided but no valid domains found after parsing".to_string(),
		));
	}
	Ok(domains)
}
