//! The fan-out listener: the half of the multiplexer that serves decoded
//! frames to connecting clients, mirroring dump1090-family tools' Beast/
//! Raw/SBS output ports (spec §4.1's "accept connections and re-publish
//! every frame it ingests, re-encoded per protocol"). Each connected client
//! gets its own `broadcast::Receiver`, so one slow reader can only ever
//! fall behind and get disconnected, never block the others.
use squitter_core::decode::TimedMessage;
use squitter_core::wire;
use std::fmt;
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

/// One of the wire formats a fan-out port serves frames as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Beast,
    Raw,
    Sbs,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Protocol::Beast => "beast",
            Protocol::Raw => "raw",
            Protocol::Sbs => "sbs",
        };
        write!(f, "{name}")
    }
}

impl Protocol {
    /// Encodes `msg` for this protocol, or `None` if it has nothing to say
    /// about `msg` (SBS only speaks for messages it could decode a
    /// transmission type from).
    fn encode(&self, msg: &TimedMessage) -> Option<Vec<u8>> {
        match self {
            Protocol::Beast => Some(wire::encode_beast(msg, 0xff)),
            Protocol::Raw => Some(wire::encode_raw(msg)),
            Protocol::Sbs => wire::encode_sbs(msg),
        }
    }

    /// The keepalive frame written every `heartbeat_interval_ms` of silence;
    /// Raw and SBS are newline-delimited text protocols with no standard
    /// wire-level no-op, so they get an empty write that still exercises
    /// the socket and clears under `write_all` without corrupting framing.
    fn heartbeat(&self) -> Vec<u8> {
        match self {
            Protocol::Beast => wire::heartbeat_beast(),
            Protocol::Raw | Protocol::Sbs => Vec::new(),
        }
    }
}

/// Binds one listener per configured port for `protocol` and spawns an
/// accept loop for each, every accepted connection subscribing fresh to
/// `bus` and running [`serve_session`]. Bind failures are logged and that
/// port is skipped rather than aborting the others.
pub fn spawn_listeners(
    bind_address: IpAddr,
    ports: &[u16],
    protocol: Protocol,
    bus: broadcast::Sender<Arc<TimedMessage>>,
    heartbeat_interval_ms: u64,
    exit: Arc<AtomicBool>,
) {
    for &port in ports {
        let bus = bus.clone();
        let exit = exit.clone();
        tokio::spawn(async move {
            let addr = (bind_address, port);
            let listener = match TcpListener::bind(addr).await {
                Ok(listener) => listener,
                Err(e) => {
                    warn!("failed to bind {} listener on {:?}: {}", protocol, addr, e);
                    return;
                }
            };
            info!("serving {} on {:?}", protocol, addr);
            loop {
                if exit.load(Ordering::SeqCst) {
                    break;
                }
                match listener.accept().await {
                    Ok((stream, peer)) => {
                        debug!("{} client connected: {}", protocol, peer);
                        let rx = bus.subscribe();
                        let exit = exit.clone();
                        tokio::spawn(async move {
                            serve_session(stream, rx, protocol, heartbeat_interval_ms, exit).await;
                            debug!("{} client disconnected: {}", protocol, peer);
                        });
                    }
                    Err(e) => warn!("{} accept failed: {}", protocol, e),
                }
            }
        });
    }
}

/// Serves one connected client: re-encodes every message broadcast on `rx`
/// for `protocol` and writes it to `stream`, writing a heartbeat whenever
/// `heartbeat_interval_ms` passes with nothing to send. Exits on write
/// error, on `exit` being set or once the broadcast channel falls too far
/// behind for this receiver to catch up (`Lagged`), rather than replaying
/// stale backlog.
async fn serve_session(
    mut stream: TcpStream,
    mut rx: broadcast::Receiver<Arc<TimedMessage>>,
    protocol: Protocol,
    heartbeat_interval_ms: u64,
    exit: Arc<AtomicBool>,
) {
    let mut heartbeat = interval(Duration::from_millis(heartbeat_interval_ms.max(1)));
    heartbeat.tick().await;

    loop {
        tokio::select! {
            biased;
            msg = rx.recv() => {
                match msg {
                    Ok(msg) => {
                        if let Some(body) = protocol.encode(&msg) {
                            if stream.write_all(&body).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("{} client lagged, dropping {} messages", protocol, skipped);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            _ = heartbeat.tick() => {
                let body = protocol.heartbeat();
                if !body.is_empty() && stream.write_all(&body).await.is_err() {
                    break;
                }
            }
        }
        if exit.load(Ordering::SeqCst) {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use squitter_core::decode::TimedMessage;

    fn sample_beast_frame() -> TimedMessage {
        TimedMessage {
            timestamp: 0.0,
            frame: hex::decode("8d406b902015a678d4d220aa4bda").unwrap(),
            message: None,
            metadata: Vec::new(),
            decode_time: None,
        }
    }

    #[test]
    fn beast_and_raw_always_encode_something() {
        let msg = sample_beast_frame();
        assert!(Protocol::Beast.encode(&msg).is_some());
        assert!(Protocol::Raw.encode(&msg).is_some());
    }

    #[test]
    fn sbs_has_nothing_to_say_without_a_decoded_message() {
        let msg = sample_beast_frame();
        assert!(Protocol::Sbs.encode(&msg).is_none());
    }

    #[test]
    fn only_beast_has_a_non_empty_heartbeat() {
        assert!(!Protocol::Beast.heartbeat().is_empty());
        assert!(Protocol::Raw.heartbeat().is_empty());
        assert!(Protocol::Sbs.heartbeat().is_empty());
    }
}
