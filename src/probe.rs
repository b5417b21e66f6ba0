use std::future::Future;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::{Duration, Instant};

use tokio::net::{lookup_host, UdpSocket};
use tokio::time::timeout_at;
use tracing::{debug, trace};

use crate::dns::{Codec, HickoryCodec};
use crate::error::ProbeError;
use crate::resolver::normalize_server;
use crate::transport::{PhaseTimings, ProbeResult, NETWORK_UDP};

/// Receive buffer size; large enough for any UDP payload, EDNS included
pub const MAX_RESPONSE_SIZE: usize = 65535;

/// Something that can run one timed query against one server.
pub trait Prober: Send + Sync {
	fn probe(
		&self,
		server: &str,
		qname: &str,
		timeout: Duration,
	) -> impl Future<Output = Result<ProbeResult, ProbeError>> + Send;
}

/// Probe engine that sends one A query over a dedicated UDP socket.
#[derive(Debug, Clone, Default)]
pub struct UdpProber<C = HickoryCodec> {
	codec: C,
}

impl UdpProber<HickoryCodec> {
	pub fn new() -> Self {
		Self::with_codec(HickoryCodec)
	}
}

impl<C: Codec> UdpProber<C> {
	pub fn with_codec(codec: C) -> Self {
		UdpProber { codec }
	}
}

/// Resolve the server, bind a matching ephemeral socket and connect it.
async fn dial(server: &str) -> Result<UdpSocket, ProbeError> {
	let remote = lookup_host(server).await
		.map_err(|e| ProbeError::network("resolve", e))?
		.next()
		.ok_or_else(|| ProbeError::network(
			"resolve",
			io::Error::new(io::ErrorKind::NotFound, format!("no address for {}", server)),
		))?;

	let bind_addr: SocketAddr = if remote.is_ipv4() {
		(Ipv4Addr::UNSPECIFIED, 0).into()
	} else {
		(Ipv6Addr::UNSPECIFIED, 0).into()
	};
	let socket = UdpSocket::bind(bind_addr).await
		.map_err(|e| ProbeError::network("bind", e))?;
	socket.connect(remote).await
		.map_err(|e| ProbeError::network("dial", e))?;
	Ok(socket)
}

impl<C: Codec> Prober for UdpProber<C> {
	/// Run one query and time each phase.
	///
	/// `timeout` bounds the dial, then a fresh deadline of `now + timeout`
	/// bounds write and read together. The socket is dropped on every exit
	/// path; nothing is retried.
	async fn probe(
		&self,
		server: &str,
		qname: &str,
		timeout: Duration,
	) -> Result<ProbeResult, ProbeError> {
		let server = normalize_server(server)?;
		let id: u16 = rand::random();

		let start_total = Instant::now();

		let start_pack = Instant::now();
		let wire = self.codec.encode_query(qname, id)?;
		let pack = start_pack.elapsed();
		trace!(%server, qname, ?pack, bytes = wire.len(), "packed query");

		let start_dial = Instant::now();
		let socket = match tokio::time::timeout(timeout, dial(&server)).await {
			Ok(socket) => socket?,
			Err(_) => return Err(ProbeError::timed_out("dial")),
		};
		let dial = start_dial.elapsed();

		let deadline = tokio::time::Instant::now() + timeout;

		let local_addr = socket.local_addr()
			.map_err(|e| ProbeError::network("dial", e))?;
		let remote_addr = socket.peer_addr()
			.map_err(|e| ProbeError::network("dial", e))?;
		trace!(%server, %local_addr, %remote_addr, ?dial, "dialed");

		let start_write = Instant::now();
		let written = timeout_at(deadline, socket.send(&wire)).await
			.map_err(|_| ProbeError::timed_out("write"))?
			.map_err(|e| ProbeError::network("write", e))?;
		let write = start_write.elapsed();

		let mut buf = vec![0u8; MAX_RESPONSE_SIZE];
		let start_read = Instant::now();
		let read_len = timeout_at(deadline, socket.recv(&mut buf)).await
			.map_err(|_| ProbeError::timed_out("read"))?
			.map_err(|e| ProbeError::network("read", e))?;
		let read = start_read.elapsed();
		trace!(%server, ?write, ?read, written, read_len, "exchanged");

		let start_unpack = Instant::now();
		let decoded = self.codec.decode_response(&buf[..read_len], id)?;
		let unpack = start_unpack.elapsed();

		let total = start_total.elapsed();
		debug!(%server, qname, rcode = %decoded.rcode, ?total, "probe complete");

		Ok(ProbeResult {
			server,
			network: NETWORK_UDP,
			local_addr,
			remote_addr,
			timeout,
			qname: qname.to_string(),
			rcode: decoded.rcode,
			msg_id: decoded.id,
			flags: decoded.flags,
			answer_count: decoded.answer_count,
			authority_count: decoded.authority_count,
			additional_count: decoded.additional_count,
			query_size: written,
			response_size: read_len,
			answers: decoded.answers,
			timings: PhaseTimings {
				total,
				dial,
				pack,
				write,
				read,
				unpack,
			},
		})
	}
}
