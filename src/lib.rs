//! # RUSHB, reliable file transfer over unreliable datagrams
//!
//! A tiny stop-and-wait protocol layered over UDP: a client sends a GET
//! request naming a file, the server streams it back in fixed-size DAT
//! frames (optionally checksummed and/or enciphered), then both sides tear
//! the connection down with a FIN / FIN+ACK handshake.
//!
//! This crate implements the server side: the packet codec
//! ([`packet`]), the per-connection reliability engine
//! ([`connection`]), and the listener that demultiplexes inbound
//! datagrams to it ([`listener`]).

pub mod connection;
pub mod error;
pub mod listener;
pub mod packet;
pub mod socket;
