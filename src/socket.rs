//! Thin wrapper around a shared UDP socket.
//!
//! A single `RushbSocket` is shared (via `Arc`) by the listener and every
//! connection worker's send side: a single `sendto` on one socket is atomic
//! per datagram, so no additional send mutex is needed.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use crate::packet::Packet;

pub struct RushbSocket {
    inner: UdpSocket,
}

impl RushbSocket {
    pub fn bind<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        Ok(RushbSocket {
            inner: UdpSocket::bind(addr)?,
        })
    }

    pub fn local_port(&self) -> io::Result<u16> {
        Ok(self.inner.local_addr()?.port())
    }

    pub fn send_to(&self, pkt: &Packet, addr: SocketAddr) -> io::Result<usize> {
        self.inner.send_to(&pkt.encode(), addr)
    }

    pub fn recv_datagram(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        self.inner.recv_from(buf)
    }
}
