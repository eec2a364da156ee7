//! The listener / demultiplexer.
//!
//! Binds a UDP socket, prints the bound port to stdout, then loops
//! forever routing inbound datagrams to a per-peer-address worker thread,
//! spawning one the first time an address is seen. The active-clients
//! table is a single-owner map mutated only here; each worker
//! self-terminates, so the table entry for an address is only retired once
//! a send to its channel fails (the worker has dropped its receiver after
//! its final FIN+ACK).

use std::collections::HashMap;
use std::io::{self, Write};
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;

use crate::connection::Worker;
use crate::error::Result;
use crate::packet::PACKET_SIZE;
use crate::socket::RushbSocket;

pub fn run<A: ToSocketAddrs>(bind_addr: A, base_dir: PathBuf) -> Result<()> {
    let sock = Arc::new(RushbSocket::bind(bind_addr)?);
    let port = sock.local_port()?;

    println!("{port}");
    io::stdout().flush()?;
    log::info!("rushb server listening on port {port}");

    serve(sock, base_dir)
}

/// Runs the receive/demultiplex loop against an already-bound socket.
/// Split out from [`run`] so tests (and embedders) can bind to an
/// ephemeral port, read it back, and start serving without going through
/// stdout.
pub fn serve(sock: Arc<RushbSocket>, base_dir: PathBuf) -> Result<()> {
    let mut clients: HashMap<SocketAddr, Sender<Vec<u8>>> = HashMap::new();
    let mut buf = vec![0u8; PACKET_SIZE];

    loop {
        let (n, src) = match sock.recv_datagram(&mut buf) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("recv_from failed: {e}");
                continue;
            }
        };
        let datagram = buf[..n].to_vec();

        match clients.get(&src) {
            Some(tx) => {
                if let Err(mpsc::SendError(datagram)) = tx.send(datagram) {
                    log::debug!("{src}: prior worker gone, starting a fresh connection");
                    clients.remove(&src);
                    spawn_worker(&mut clients, &sock, src, datagram, &base_dir);
                }
            }
            None => spawn_worker(&mut clients, &sock, src, datagram, &base_dir),
        }
    }
}

fn spawn_worker(
    clients: &mut HashMap<SocketAddr, Sender<Vec<u8>>>,
    sock: &Arc<RushbSocket>,
    src: SocketAddr,
    first_datagram: Vec<u8>,
    base_dir: &Path,
) {
    let (tx, rx) = mpsc::channel();
    clients.insert(src, tx);

    let worker = Worker::new(Arc::clone(sock), src, rx, base_dir.to_path_buf());
    thread::spawn(move || worker.run(first_datagram));
}
