//! Handshake phase: accept and validate the client's first packet.

use crate::packet::Packet;

use super::Worker;

impl Worker {
    /// Consumes the first datagram (and, if needed, later ones from the
    /// inbox) until an effective first packet is found: decodable, and
    /// checksum-valid if the session turns out to be in checking mode.
    /// Returns `Some(packet)` when that packet has GET=1 (the caller
    /// still has to resolve a file name from its payload), or `None` when
    /// it doesn't, falling straight through to teardown.
    pub(super) fn handshake(&mut self, first_datagram: Vec<u8>) -> Option<Packet> {
        let mut candidate = first_datagram;

        let mut pkt = loop {
            match Packet::decode(&candidate) {
                Ok(p) => break p,
                Err(_) => {
                    log::debug!("{}: first datagram undecodable, waiting for another", self.peer);
                    candidate = match self.inbox.recv() {
                        Ok(raw) => raw,
                        Err(_) => return None,
                    };
                }
            }
        };

        self.encrypting = pkt.flags.enc;
        self.checking = pkt.flags.chk;

        if self.encrypting {
            pkt.payload = Packet::decrypt_payload(&pkt.payload);
        }

        if self.checking {
            while !pkt.is_checksum_valid() {
                log::debug!("{}: first packet failed checksum, discarding", self.peer);
                let raw = match self.inbox.recv() {
                    Ok(raw) => raw,
                    Err(_) => return None,
                };
                pkt = match Packet::decode(&raw) {
                    Ok(p) => p,
                    Err(_) => continue,
                };
                if self.encrypting {
                    pkt.payload = Packet::decrypt_payload(&pkt.payload);
                }
            }
        }

        if !pkt.flags.get {
            return None;
        }

        log::debug!(
            "{}: handshake accepted (encrypting={}, checking={})",
            self.peer,
            self.encrypting,
            self.checking
        );
        Some(pkt)
    }
}
