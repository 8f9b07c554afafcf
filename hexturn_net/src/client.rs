// TCP connection to the relay.
//
// The connection is split in two halves so the reconciler can read and the
// session can send without sharing one borrow:
// - `RelayInbox`: a background reader thread calls `read_node()` in a loop
//   and pushes each message into an `mpsc` channel. `try_read` takes one
//   message off the channel and never blocks, which is what
//   `NetworkReader` requires.
// - `RelayOutbox`: owns a `BufWriter<TcpStream>` and writes framed nodes
//   synchronously (messages are small).
//
// When the reader thread stops (EOF, I/O error, malformed frame) it logs
// why and sets the shared `closed` flag; messages already queued can still
// be read.

use std::io::{BufReader, BufWriter};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use hexturn_protocol::framing::{read_node, write_node};
use hexturn_protocol::Node;
use hexturn_turns::NetworkReader;
use tracing::{debug, info, warn};

use crate::error::NetError;

const RELAY_TARGET: &str = "hexturn::relay";

/// Where and how to reach the relay.
#[derive(Clone, Debug)]
pub struct RelayConnectConfig {
    pub addr: String,
    pub connect_timeout: Duration,
}

impl Default for RelayConnectConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:15000".into(),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// Connect to the relay and spawn the reader thread.
pub fn connect(config: &RelayConnectConfig) -> Result<(RelayInbox, RelayOutbox), NetError> {
    let addr = config
        .addr
        .to_socket_addrs()
        .map_err(|source| NetError::Connect {
            addr: config.addr.clone(),
            source,
        })?
        .next()
        .ok_or_else(|| NetError::Resolve(config.addr.clone()))?;
    let stream =
        TcpStream::connect_timeout(&addr, config.connect_timeout).map_err(|source| {
            NetError::Connect {
                addr: config.addr.clone(),
                source,
            }
        })?;
    info!(target: RELAY_TARGET, %addr, "connected to relay");
    split(stream)
}

/// Split an established stream into inbox and outbox halves.
pub fn split(stream: TcpStream) -> Result<(RelayInbox, RelayOutbox), NetError> {
    stream.set_nodelay(true).ok();
    let reader_stream = stream.try_clone()?;
    let (tx, rx) = mpsc::channel();
    let closed = Arc::new(AtomicBool::new(false));
    let closed_reader = closed.clone();
    let reader_thread = thread::spawn(move || {
        reader_loop(BufReader::new(reader_stream), tx, closed_reader);
    });

    Ok((
        RelayInbox {
            inbox: rx,
            closed: closed.clone(),
            _reader_thread: reader_thread,
        },
        RelayOutbox {
            writer: BufWriter::new(stream),
            closed,
        },
    ))
}

/// Receiving half of the relay connection.
pub struct RelayInbox {
    inbox: Receiver<Node>,
    closed: Arc<AtomicBool>,
    _reader_thread: JoinHandle<()>,
}

impl RelayInbox {
    /// True once the reader thread has stopped.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl NetworkReader for RelayInbox {
    fn try_read(&mut self) -> Option<Node> {
        self.inbox.try_recv().ok()
    }
}

/// Sending half of the relay connection.
pub struct RelayOutbox {
    writer: BufWriter<TcpStream>,
    closed: Arc<AtomicBool>,
}

impl RelayOutbox {
    pub fn send(&mut self, node: &Node) -> Result<(), NetError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(NetError::Closed);
        }
        write_node(&mut self.writer, node)?;
        Ok(())
    }

    /// Close both directions. The reader thread sees EOF and exits.
    pub fn shutdown(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
        if let Err(err) = self.writer.get_ref().shutdown(Shutdown::Both) {
            debug!(target: RELAY_TARGET, "shutdown: {err}");
        }
    }
}

/// Reader thread: read framed nodes until the stream ends.
fn reader_loop(mut reader: BufReader<TcpStream>, tx: Sender<Node>, closed: Arc<AtomicBool>) {
    loop {
        match read_node(&mut reader) {
            Ok(node) => {
                if tx.send(node).is_err() {
                    debug!(target: RELAY_TARGET, "inbox dropped, stopping reader");
                    break;
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
                info!(target: RELAY_TARGET, "relay closed the connection");
                break;
            }
            Err(err) => {
                warn!(target: RELAY_TARGET, "relay read failed: {err}");
                break;
            }
        }
    }
    closed.store(true, Ordering::SeqCst);
}
