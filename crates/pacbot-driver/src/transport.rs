//! Broker transport client
//!
//! Connects to the message broker over TCP, subscribes to the command and
//! light-state topics, and forwards decoded messages as [`InboundEvent`]s into
//! the controller inbox.
//!
//! The reader thread owns its `Sender`. When the broker closes the connection
//! the thread exits and drops the sender, so a controller loop that holds no
//! other sender observes a disconnected inbox and shuts down.

use crate::error::TransportError;
use crossbeam_channel::Sender;
use pacbot_protocol::{FrameDecoder, InboundEvent, Message, MessageType};
use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{JoinHandle, spawn};
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

/// Topics the navigation controller consumes
pub const SUBSCRIPTIONS: [MessageType; 2] = [MessageType::PacmanCommand, MessageType::LightState];

/// Transport timing configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// Socket read timeout, also the period at which the reader polls its running flag
    pub read_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(2000),
            read_timeout: Duration::from_millis(50),
        }
    }
}

/// Subscribed broker connection with a background reader thread
pub struct BrokerClient {
    peer: SocketAddr,
    stream: TcpStream,
    is_running: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
}

impl BrokerClient {
    /// Connect to `addr` (`host:port`), subscribe, and start forwarding events
    ///
    /// # Errors
    /// - `TransportError::Resolve`: the address resolved to nothing
    /// - `TransportError::Connect`: every resolved address refused or timed out
    /// - `TransportError::Io` / `Protocol`: socket setup or subscribe frame failed
    pub fn connect(
        addr: &str,
        config: &TransportConfig,
        inbox: Sender<InboundEvent>,
    ) -> Result<Self, TransportError> {
        let stream = connect_any(addr, config.connect_timeout)?;
        let peer = stream.peer_addr()?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(config.read_timeout))?;

        let subscribe = Message::Subscribe(SUBSCRIPTIONS.to_vec()).to_bytes()?;
        (&stream).write_all(&subscribe)?;
        info!("Subscribed to broker at {}", peer);

        let is_running = Arc::new(AtomicBool::new(true));
        let reader_stream = stream.try_clone()?;
        let reader_running = is_running.clone();
        let reader = spawn(move || reader_loop(reader_stream, inbox, reader_running));

        Ok(Self {
            peer,
            stream,
            is_running,
            reader: Some(reader),
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Whether the reader thread is still forwarding events
    pub fn is_alive(&self) -> bool {
        self.is_running.load(Ordering::Acquire)
    }

    /// Stop the reader thread and close the connection
    pub fn shutdown(mut self) {
        self.stop_reader();
    }

    fn stop_reader(&mut self) {
        self.is_running.store(false, Ordering::Release);
        // Unblocks a reader parked in `read`
        let _ = self.stream.shutdown(Shutdown::Both);
        if let Some(handle) = self.reader.take() {
            if handle.join().is_err() {
                error!("Broker reader thread panicked");
            }
        }
    }
}

impl Drop for BrokerClient {
    fn drop(&mut self) {
        self.stop_reader();
    }
}

fn connect_any(addr: &str, timeout: Duration) -> Result<TcpStream, TransportError> {
    let candidates: Vec<SocketAddr> = addr
        .to_socket_addrs()
        .map_err(|_| TransportError::Resolve(addr.to_string()))?
        .collect();
    if candidates.is_empty() {
        return Err(TransportError::Resolve(addr.to_string()));
    }

    let mut last_err = None;
    for candidate in candidates {
        match TcpStream::connect_timeout(&candidate, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                debug!("Connect to {} failed: {}", candidate, e);
                last_err = Some(e);
            },
        }
    }
    Err(TransportError::Connect {
        addr: addr.to_string(),
        source: last_err
            .unwrap_or_else(|| std::io::Error::new(ErrorKind::NotFound, "no address tried")),
    })
}

fn reader_loop(mut stream: TcpStream, inbox: Sender<InboundEvent>, is_running: Arc<AtomicBool>) {
    let mut decoder = FrameDecoder::new();
    let mut buf = [0u8; 512];

    while is_running.load(Ordering::Acquire) {
        match stream.read(&mut buf) {
            Ok(0) => {
                info!("Broker closed the connection");
                break;
            },
            Ok(n) => {
                decoder.extend(&buf[..n]);
                while let Some(decoded) = decoder.next_message() {
                    match decoded {
                        Ok(msg) => {
                            let Some(event) = msg.into_event() else {
                                trace!("Ignoring non-event broker message");
                                continue;
                            };
                            if inbox.send(event).is_err() {
                                trace!("Inbox closed, reader exiting");
                                is_running.store(false, Ordering::Release);
                                return;
                            }
                        },
                        Err(e) => warn!("Dropping invalid broker frame: {}", e),
                    }
                }
            },
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {},
            Err(e) if e.kind() == ErrorKind::Interrupted => {},
            Err(e) => {
                if is_running.load(Ordering::Acquire) {
                    error!("Broker read error: {}", e);
                }
                break;
            },
        }
    }

    is_running.store(false, Ordering::Release);
    trace!("Broker reader: loop exited");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TransportConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.read_timeout, Duration::from_millis(50));
    }

    #[test]
    fn test_unresolvable_address() {
        let (tx, _rx) = crossbeam_channel::unbounded();
        let result = BrokerClient::connect("not an address", &TransportConfig::default(), tx);
        assert!(matches!(result, Err(TransportError::Resolve(_))));
    }
}
