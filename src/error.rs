use std::io;

use thiserror::Error;

/// Errors a single probe (or a helper it depends on) can fail with.
#[derive(Debug, Error)]
pub enum ProbeError {
	/// Bad input or missing local configuration
	#[error("configuration error: {0}")]
	Configuration(String),

	/// The query could not be packed into wire bytes
	#[error("failed to pack DNS query: {0}")]
	Serialization(String),

	/// Resolve, bind, dial, write or read failed (timeouts included)
	#[error("{op} failed: {source}")]
	Network {
		op: &'static str,
		#[source]
		source: io::Error,
	},

	/// The response bytes did not decode into a usable DNS response
	#[error("failed to unpack DNS response: {0}")]
	Protocol(String),
}

impl ProbeError {
	pub fn network(op: &'static str, source: io::Error) -> Self {
		ProbeError::Network { op, source }
	}

	/// Network error raised when the probe deadline expires during `op`.
	pub fn timed_out(op: &'static str) -> Self {
		ProbeError::Network {
			op,
			source: io::Error::new(io::ErrorKind::TimedOut, "deadline exceeded"),
		}
	}

	/// Phase a network error happened in.
	pub fn op(&self) -> Option<&'static str> {
		match self {
			ProbeError::Network { op, .. } => Some(*op),
			_ => None,
		}
	}

	pub fn is_network(&self) -> bool {
		matches!(self, ProbeError::Network { .. })
	}

	pub fn is_timeout(&self) -> bool {
		match self {
			ProbeError::Network { source, .. } => source.kind() == io::ErrorKind::TimedOut,
			_ => false,
		}
	}
}
