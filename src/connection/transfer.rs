//! Sending phase: stop-and-wait data transfer.

use std::sync::mpsc::RecvTimeoutError;
use std::time::Instant;

use crate::packet::{Flags, Packet, MAX_PAYLOAD_SIZE, RUSHB_VERSION};

use super::{Worker, RETRANSMIT_TIMEOUT};

impl Worker {
    /// Sends `data` as a series of ≤1464-byte DAT frames, one at a time,
    /// each awaited with retransmit-on-timeout and NAK fast retransmit
    /// before the next frame is built.
    pub(super) fn transfer(&mut self, data: Vec<u8>) {
        // ceil(len/1464) frames, an empty file yields zero DAT frames.
        for frame in data.chunks(MAX_PAYLOAD_SIZE) {
            let seq = self.next_seq();
            let pkt = self.build_dat_packet(seq, frame);
            self.send_and_await_ack(pkt, seq);
        }
    }

    fn build_dat_packet(&self, seq: u16, frame: &[u8]) -> Packet {
        let mut payload = frame.to_vec();
        Packet::pad_payload(&mut payload);

        let mut flags = Flags {
            dat: true,
            version: RUSHB_VERSION,
            ..Default::default()
        };
        let mut checksum = 0;

        if self.checking {
            flags.chk = true;
            checksum = Packet::compute_checksum(&payload);
        }
        if self.encrypting {
            flags.enc = true;
            payload = Packet::encrypt_payload(&payload);
        }

        Packet {
            seq,
            ack: 0,
            checksum,
            flags,
            payload,
        }
    }

    /// Transmits `pkt` and blocks until `seq` is acknowledged: on a NAK
    /// match, retransmit the identical bytes immediately and keep waiting;
    /// on a 4-second silence, retransmit and keep waiting. The payload of
    /// every retransmission is byte-identical to the first send, since it
    /// is built once, in `build_dat_packet`.
    fn send_and_await_ack(&mut self, pkt: Packet, seq: u16) {
        self.send(&pkt);
        let mut sent_at = Instant::now();

        loop {
            let remaining = RETRANSMIT_TIMEOUT.saturating_sub(sent_at.elapsed());
            match self.inbox.recv_timeout(remaining) {
                Ok(raw) => {
                    let Ok(in_pkt) = Packet::decode(&raw) else {
                        continue;
                    };
                    if !self.flag_consistent(&in_pkt) {
                        continue;
                    }
                    if in_pkt.flags.ack && in_pkt.ack == seq {
                        return;
                    }
                    if in_pkt.flags.nak && in_pkt.ack == seq {
                        log::debug!("{}: NAK for seq {seq}, fast retransmit", self.peer);
                        self.send(&pkt);
                        sent_at = Instant::now();
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    log::debug!("{}: timeout waiting on seq {seq}, retransmitting", self.peer);
                    self.send(&pkt);
                    sent_at = Instant::now();
                }
                Err(RecvTimeoutError::Disconnected) => {
                    log::warn!("{}: inbox closed while awaiting ack for seq {seq}", self.peer);
                    return;
                }
            }
        }
    }
}
