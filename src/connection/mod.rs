//! Per-client connection worker.
//!
//! One `Worker` runs per peer address, on its own thread, from the moment
//! the listener sees a new source address until the worker sends its final
//! FIN+ACK. It carries this state machine:
//!
//! ```text
//!   Handshake --(valid first packet, GET=1)--> Sending
//!   Handshake --(file open fails)------------> FinSent
//!   Sending   --(all DAT ACKed)---------------> FinSent
//!   FinSent   --(FIN+ACK received)------------> Closed
//! ```
//!
//! `ConnectionState` names these phases for logging; `enter_state` is the
//! only place that changes it, and logs the transition each time. Control
//! flow itself is a straight call chain (`handshake` -> `transfer` ->
//! `teardown`), not a dispatch loop, since RUSHB's server-only-sends
//! discipline means each state is visited at most once per connection.

mod handshake;
mod teardown;
mod transfer;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Duration;

use crate::packet::Packet;
use crate::socket::RushbSocket;

pub const RETRANSMIT_TIMEOUT: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Handshake,
    Sending,
    FinSent,
    Closed,
}

/// Per-connection worker context: the socket, the peer, the inbox, and the
/// session flags latched from the client's first packet.
pub struct Worker {
    sock: Arc<RushbSocket>,
    peer: SocketAddr,
    inbox: Receiver<Vec<u8>>,
    base_dir: PathBuf,
    seq_out: u16,
    encrypting: bool,
    checking: bool,
    state: ConnectionState,
}

impl Worker {
    pub fn new(
        sock: Arc<RushbSocket>,
        peer: SocketAddr,
        inbox: Receiver<Vec<u8>>,
        base_dir: PathBuf,
    ) -> Self {
        Worker {
            sock,
            peer,
            inbox,
            base_dir,
            seq_out: 1,
            encrypting: false,
            checking: false,
            state: ConnectionState::Handshake,
        }
    }

    /// Runs the full session to completion: handshake, optional data
    /// transfer, then teardown. Consumes `self`, a worker never outlives
    /// its one connection.
    pub fn run(mut self, first_datagram: Vec<u8>) {
        log::debug!("{}: connection started in {:?}", self.peer, self.state);

        let first_packet = self.handshake(first_datagram);

        match first_packet.and_then(|request| {
            self.read_requested_file(&request.payload)
        }) {
            Some(data) => {
                self.enter_state(ConnectionState::Sending);
                self.transfer(data);
            }
            None => log::info!("{}: no data to send, skipping straight to teardown", self.peer),
        }

        self.enter_state(ConnectionState::FinSent);
        self.teardown();

        self.enter_state(ConnectionState::Closed);
    }

    /// Moves to `next` and logs the transition, the only way `state` ever
    /// changes.
    fn enter_state(&mut self, next: ConnectionState) {
        log::debug!("{}: {:?} -> {:?}", self.peer, self.state, next);
        self.state = next;
    }

    fn next_seq(&mut self) -> u16 {
        let seq = self.seq_out;
        self.seq_out += 1;
        seq
    }

    fn send(&self, pkt: &Packet) {
        if let Err(e) = self.sock.send_to(pkt, self.peer) {
            log::warn!("{}: send failed: {e}", self.peer);
        }
    }

    /// Inbound packets are filtered only by flag policy after the
    /// handshake, never rechecksummed.
    fn flag_consistent(&self, pkt: &Packet) -> bool {
        if self.checking && !pkt.flags.chk {
            return false;
        }
        if self.encrypting && !pkt.flags.enc {
            return false;
        }
        true
    }

    /// Reads the requested file's raw bytes. The original server opened
    /// the file in text mode and treated non-ASCII content as unreadable;
    /// file content encoding is out of this crate's scope, so this serves
    /// arbitrary bytes as long as the name itself decodes.
    fn read_requested_file(&self, request_payload: &[u8]) -> Option<Vec<u8>> {
        let filename = decode_ascii_field(request_payload)?;
        match std::fs::read(self.base_dir.join(&filename)) {
            Ok(data) => Some(data),
            Err(e) => {
                log::info!("{}: cannot open {filename:?}: {e}", self.peer);
                None
            }
        }
    }
}

/// Decodes a null-padded ASCII field (file name or similar) from a packet
/// payload: trailing zero bytes stripped, the remainder must be ASCII.
pub(crate) fn decode_ascii_field(payload: &[u8]) -> Option<String> {
    let end = payload.iter().position(|&b| b == 0).unwrap_or(payload.len());
    let bytes = &payload[..end];
    if bytes.iter().all(u8::is_ascii) {
        String::from_utf8(bytes.to_vec()).ok()
    } else {
        None
    }
}
