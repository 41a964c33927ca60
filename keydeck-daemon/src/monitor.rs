//! Status endpoint
//!
//! Answers every HTTP request on the monitoring port with the identity of
//! the attached device as JSON. The request itself is never inspected.

use std::io::{self, Read, Write};
use std::net::{Ipv4Addr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use keydeck_protocol::DeckStatus;
use log::{debug, warn};

/// Accept poll interval while idle
const ACCEPT_INTERVAL: Duration = Duration::from_millis(100);

/// Bound on reading the request and writing the reply
const IO_TIMEOUT: Duration = Duration::from_secs(2);

/// Running status endpoint
pub struct Monitor {
    port: u16,
    stop: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl Monitor {
    /// Bind `port` on all interfaces and start serving `status`
    pub fn spawn(port: u16, status: &DeckStatus) -> io::Result<Self> {
        let body = status
            .to_json()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let response = format!(
            "HTTP/1.1 200 OK\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\
             \r\n\
             {}",
            body.len(),
            body
        );

        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))?;
        listener.set_nonblocking(true)?;
        let port = listener.local_addr()?.port();

        let stop = Arc::new(AtomicBool::new(false));
        let thread = {
            let stop = stop.clone();
            thread::Builder::new()
                .name("monitor".into())
                .spawn(move || serve(listener, response, &stop))?
        };

        Ok(Self { port, stop, thread })
    }

    /// Bound port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Stop serving and wait for the thread to finish
    pub fn stop(self) {
        self.stop.store(true, Ordering::SeqCst);
        if self.thread.join().is_err() {
            warn!("Monitor thread panicked");
        }
    }
}

fn serve(listener: TcpListener, response: String, stop: &AtomicBool) {
    while !stop.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer)) => {
                debug!("Status request from {}", peer);
                if let Err(e) = reply(stream, response.as_bytes()) {
                    debug!("Status reply to {} failed: {}", peer, e);
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => thread::sleep(ACCEPT_INTERVAL),
            Err(e) => {
                warn!("Monitor accept failed: {}", e);
                thread::sleep(ACCEPT_INTERVAL);
            }
        }
    }
    debug!("Monitor stopped");
}

fn reply(mut stream: TcpStream, response: &[u8]) -> io::Result<()> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(IO_TIMEOUT))?;
    stream.set_write_timeout(Some(IO_TIMEOUT))?;

    // Drain whatever part of the request is already there
    let mut request = [0u8; 1024];
    let _ = stream.read(&mut request)?;

    stream.write_all(response)?;
    stream.flush()
}
