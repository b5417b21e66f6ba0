use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{Name, RData, RecordType};

use crate::error::ProbeError;
use crate::transport::{Answer, Flags};

/// Fields of a decoded response that a probe reports
#[derive(Debug, Clone)]
pub struct DecodedResponse {
	pub rcode: String,
	pub id: u16,
	pub flags: Flags,
	pub answer_count: usize,
	pub authority_count: usize,
	pub additional_count: usize,
	/// A records only; other answer types are counted but not listed
	pub answers: Vec<Answer>,
}

/// Wire codec used by the probe engine.
///
/// The engine only times these two calls, so any DNS library can sit
/// behind it.
pub trait Codec: Send + Sync {
	/// Build and serialize an A query with recursion desired.
	fn encode_query(&self, qname: &str, id: u16) -> Result<Vec<u8>, ProbeError>;

	/// Deserialize a response to the query carrying `expected_id`.
	fn decode_response(&self, bytes: &[u8], expected_id: u16) -> Result<DecodedResponse, ProbeError>;
}

/// Codec backed by hickory-proto
#[derive(Debug, Clone, Copy, Default)]
pub struct HickoryCodec;

/// Append the root label if the name is not already fully qualified.
pub fn fqdn(qname: &str) -> String {
	if qname.ends_with('.') {
		qname.to_string()
	} else {
		format!("{}.", qname)
	}
}

/// Standard mnemonic for a response code (RFC 6895 registry names).
pub fn rcode_mnemonic(rcode: ResponseCode) -> String {
	let code = u16::from(rcode);
	let name = match code {
		0 => "NOERROR",
		1 => "FORMERR",
		2 => "SERVFAIL",
		3 => "NXDOMAIN",
		4 => "NOTIMP",
		5 => "REFUSED",
		6 => "YXDOMAIN",
		7 => "YXRRSET",
		8 => "NXRRSET",
		9 => "NOTAUTH",
		10 => "NOTZONE",
		16 => "BADSIG",
		17 => "BADKEY",
		18 => "BADTIME",
		19 => "BADMODE",
		20 => "BADNAME",
		21 => "BADALG",
		22 => "BADTRUNC",
		23 => "BADCOOKIE",
		_ => return format!("RCODE{}", code),
	};
	name.to_string()
}

impl Codec for HickoryCodec {
	fn encode_query(&self, qname: &str, id: u16) -> Result<Vec<u8>, ProbeError> {
		let fq = fqdn(qname);
		let name = Name::from_ascii(&fq)
			.map_err(|e| ProbeError::Serialization(format!("invalid domain name '{}': {}", qname, e)))?;

		let mut message = Message::new();
		message.set_id(id);
		message.set_message_type(MessageType::Query);
		message.set_op_code(OpCode::Query);
		message.set_recursion_desired(true);
		message.set_checking_disabled(false);
		message.add_query(Query::query(name, RecordType::A));

		message.to_vec()
			.map_err(|e| ProbeError::Serialization(e.to_string()))
	}

	fn decode_response(&self, bytes: &[u8], expected_id: u16) -> Result<DecodedResponse, ProbeError> {
		let message = Message::from_vec(bytes)
			.map_err(|e| ProbeError::Protocol(e.to_string()))?;

		if message.message_type() != MessageType::Response {
			return Err(ProbeError::Protocol("received a query instead of a response".to_string()));
		}
		if message.id() != expected_id {
			return Err(ProbeError::Protocol(format!(
				"id mismatch: expected {}, got {}",
				expected_id, message.id()
			)));
		}

		let header = message.header();
		let flags = Flags {
			qr: header.message_type() == MessageType::Response,
			aa: header.authoritative(),
			tc: header.truncated(),
			rd: header.recursion_desired(),
			ra: header.recursion_available(),
			ad: header.authentic_data(),
			cd: header.checking_disabled(),
		};

		let answers = message.answers().iter()
			.filter_map(|record| match record.data() {
				RData::A(a) => Some(Answer {
					value: a.to_string(),
					ttl: record.ttl(),
				}),
				_ => None,
			})
			.collect();

		Ok(DecodedResponse {
			rcode: rcode_mnemonic(message.response_code()),
			id: message.id(),
			flags,
			answer_count: message.answers().len(),
			authority_count: message.name_servers().len(),
			additional_count: message.additionals().len(),
			answers,
		})
	}
}
