//! Demo network service over the interval tree.
//!
//! Line-oriented JSON over TCP: each received line is one [`Request`], each
//! reply is one [`Envelope`] line. The tree lives behind a single `Mutex`;
//! every search and every insert holds it for the whole operation, including
//! serialization of borrowed results.
//!
//! Accepted connections are handed to a fixed pool of worker threads over a
//! crossbeam channel. A worker serves one connection at a time, so silent
//! connections are closed after an idle timeout to free it for the next.

use crate::request::{Envelope, Request, RequestError, SearchResults, TreeStats};
use crate::tree::IntervalTree;
use crossbeam_channel::{bounded, Receiver};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pending connections allowed per worker before `accept` blocks.
const QUEUE_PER_WORKER: usize = 4;

/// Longest accepted request line, newline excluded.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// How long a connection may stay silent before its worker drops it.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// A tree shared between connection workers.
pub type SharedTree = Arc<Mutex<IntervalTree>>;

fn lock(tree: &Mutex<IntervalTree>) -> MutexGuard<'_, IntervalTree> {
    // Inserts either complete or never start, so a poisoned tree is intact.
    tree.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Answer one request line with one JSON reply line (no trailing newline).
pub fn handle_line(tree: &Mutex<IntervalTree>, line: &str) -> String {
    match Request::parse(line) {
        Ok(request) => handle_request(tree, request),
        Err(e) => Envelope::error(&e).to_json(),
    }
}

/// Execute a decoded request against the shared tree.
pub fn handle_request(tree: &Mutex<IntervalTree>, request: Request) -> String {
    match request {
        Request::Search(params) => match params.validate() {
            Ok(query) => {
                let tree = lock(tree);
                let genes = tree.overlap_search(query.start, query.end);
                debug!(
                    query_start = query.start,
                    query_end = query.end,
                    hits = genes.len(),
                    "search"
                );
                let message = format!("Found {} overlapping gene(s)", genes.len());
                Envelope::ok(message, SearchResults::new(query, genes)).to_json()
            }
            Err(e) => reject(&e),
        },
        Request::Add(params) => match params.into_record() {
            Ok(record) => {
                let reply = Envelope::ok("Gene added successfully!", &record).to_json();
                info!("Added new gene: {}", record);
                lock(tree).insert_record(record);
                reply
            }
            Err(e) => reject(&e),
        },
        Request::Stats => {
            let tree = lock(tree);
            let stats = TreeStats {
                genes: tree.len(),
                height: tree.height(),
                root_max_end: tree.root().map(|n| n.max_end()),
            };
            Envelope::ok("Interval tree statistics", stats).to_json()
        }
    }
}

fn reject(err: &RequestError) -> String {
    debug!("rejected request: {}", err);
    Envelope::error(err).to_json()
}

/// Outcome of reading one request line.
#[derive(Debug, PartialEq, Eq)]
enum LineRead {
    Eof,
    Line,
    TooLong,
}

/// Read one `\n`-terminated line into `buf`, at most `limit` bytes of content.
///
/// An oversized line is consumed up to and including its newline and
/// reported as `TooLong`, so the next read starts at the following request.
fn read_request_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>, limit: usize) -> io::Result<LineRead> {
    buf.clear();
    let n = reader.by_ref().take(limit as u64 + 1).read_until(b'\n', buf)?;
    if n == 0 {
        return Ok(LineRead::Eof);
    }
    if buf.last() == Some(&b'\n') || buf.len() <= limit {
        return Ok(LineRead::Line);
    }

    loop {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            break;
        }
        match available.iter().position(|&b| b == b'\n') {
            Some(i) => {
                reader.consume(i + 1);
                break;
            }
            None => {
                let len = available.len();
                reader.consume(len);
            }
        }
    }
    Ok(LineRead::TooLong)
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

/// Serve one client until it disconnects or stays silent for `idle_timeout`.
pub fn handle_connection(
    tree: &Mutex<IntervalTree>,
    stream: TcpStream,
    idle_timeout: Option<Duration>,
) -> io::Result<()> {
    let peer = stream.peer_addr().ok();
    debug!(?peer, "connection opened");

    stream.set_read_timeout(idle_timeout.filter(|t| !t.is_zero()))?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;
    let mut buf = Vec::with_capacity(256);

    loop {
        let reply = match read_request_line(&mut reader, &mut buf, MAX_LINE_BYTES) {
            Ok(LineRead::Eof) => break,
            Ok(LineRead::TooLong) => reject(&RequestError::Malformed(format!(
                "line exceeds {} bytes",
                MAX_LINE_BYTES
            ))),
            Ok(LineRead::Line) => {
                let line = String::from_utf8_lossy(&buf);
                if line.trim().is_empty() {
                    continue;
                }
                handle_line(tree, &line)
            }
            Err(e) if is_timeout(&e) => {
                debug!(?peer, "closing idle connection");
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        writer.write_all(reply.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }

    debug!(?peer, "connection closed");
    Ok(())
}

/// A bound, not yet running server.
pub struct Server {
    listener: TcpListener,
    tree: SharedTree,
    idle_timeout: Option<Duration>,
}

impl Server {
    /// Bind to `addr` and take ownership of the tree to serve.
    pub fn bind<A: ToSocketAddrs>(addr: A, tree: IntervalTree) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        Ok(Self {
            listener,
            tree: Arc::new(Mutex::new(tree)),
            idle_timeout: Some(DEFAULT_IDLE_TIMEOUT),
        })
    }

    /// Close connections that send nothing for `timeout`. `None` waits forever,
    /// which lets idle clients hold workers.
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever, dispatching them to `workers` threads.
    pub fn run(self, workers: usize) -> io::Result<()> {
        let workers = workers.max(1);
        let (tx, rx) = bounded::<TcpStream>(workers * QUEUE_PER_WORKER);

        let handles = (0..workers)
            .map(|id| {
                let rx = rx.clone();
                let tree = Arc::clone(&self.tree);
                let idle_timeout = self.idle_timeout;
                thread::Builder::new()
                    .name(format!("generange-worker-{}", id))
                    .spawn(move || worker_loop(&tree, rx, idle_timeout))
            })
            .collect::<io::Result<Vec<_>>>()?;
        drop(rx);

        let addr = self.listener.local_addr()?;
        let genes = lock(&self.tree).len();
        info!(%addr, workers, genes, idle_timeout = ?self.idle_timeout, "Genome range search server started");

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    if tx.send(stream).is_err() {
                        warn!("all workers exited; stopping accept loop");
                        break;
                    }
                }
                Err(e) => warn!("failed to accept connection: {}", e),
            }
        }

        drop(tx);
        for handle in handles {
            if handle.join().is_err() {
                warn!("worker thread panicked");
            }
        }
        Ok(())
    }
}

fn worker_loop(tree: &Mutex<IntervalTree>, rx: Receiver<TcpStream>, idle_timeout: Option<Duration>) {
    for stream in rx {
        if let Err(e) = handle_connection(tree, stream, idle_timeout) {
            warn!("connection error: {}", e);
        }
    }
}
