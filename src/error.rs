//! Error types for the RUSHB server.
//!
//! Per-connection faults (bad first-packet checksum, unreadable file,
//! flag-policy violations, lost packets, corrupt inbound packets) are all
//! handled silently by the connection worker, none of them ever become a
//! `RushbError`. This type exists only for the failures that are fallible
//! at a real boundary: decoding a truncated datagram, and the startup-time
//! socket bind.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum RushbError {
    #[error("datagram too short: got {0} bytes, header needs {1}")]
    Truncated(usize, usize),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, RushbError>;
