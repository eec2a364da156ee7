//! FinSent phase: the FIN / FIN+ACK handshake.

use crate::packet::{Flags, Packet, CHECKSUM_SENTINEL, MAX_PAYLOAD_SIZE, RUSHB_VERSION};

use super::Worker;

impl Worker {
    /// Sends a FIN, waits for the peer's FIN+ACK (no timeout, a connection
    /// whose peer never replies loops forever here), then sends the final
    /// FIN+ACK and returns. No further datagrams from this peer are
    /// processed after that.
    pub(super) fn teardown(&mut self) {
        self.send_fin();
        let peer_fin_seq = self.wait_for_peer_fin_ack();
        self.send_final_fin_ack(peer_fin_seq);
    }

    fn send_fin(&mut self) {
        let seq = self.next_seq();
        let pkt = self.build_teardown_packet(seq, false, 0);
        self.send(&pkt);
    }

    fn wait_for_peer_fin_ack(&mut self) -> u16 {
        loop {
            let raw = match self.inbox.recv() {
                Ok(raw) => raw,
                Err(_) => {
                    log::warn!("{}: inbox closed while awaiting peer FIN+ACK", self.peer);
                    return 0;
                }
            };
            let Ok(pkt) = Packet::decode(&raw) else {
                continue;
            };
            if pkt.flags.fin && pkt.flags.ack && self.flag_consistent(&pkt) {
                return pkt.seq;
            }
        }
    }

    fn send_final_fin_ack(&mut self, peer_fin_seq: u16) {
        let seq = self.next_seq();
        let pkt = self.build_teardown_packet(seq, true, peer_fin_seq);
        self.send(&pkt);
    }

    /// Builds a FIN or FIN+ACK packet. Payload is always all zeros; when
    /// encrypting, the cipher is not applied to it (a zero-byte transform
    /// would just yield an empty payload; the FIN frame keeps its full
    /// zero-filled size instead).
    fn build_teardown_packet(&self, seq: u16, is_ack: bool, ack: u16) -> Packet {
        let mut flags = Flags {
            fin: true,
            ack: is_ack,
            version: RUSHB_VERSION,
            ..Default::default()
        };
        let mut checksum = 0;

        if self.checking {
            flags.chk = true;
            checksum = CHECKSUM_SENTINEL;
        }
        if self.encrypting {
            flags.enc = true;
        }

        Packet {
            seq,
            ack,
            checksum,
            flags,
            payload: vec![0u8; MAX_PAYLOAD_SIZE],
        }
    }
}
