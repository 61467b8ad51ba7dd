//! The network multiplexer: one task per configured connector, each feeding
//! decoded frames into a shared channel; a dedup stage merges frames seen
//! by more than one receiver within a short window.
pub mod dedup;
pub mod server;

use squitter_core::decode::cpr::Position;
use squitter_core::decode::TimedMessage;
use squitter_core::source::beast::{self, BeastSource};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::mpsc::Sender;
use tokio::time::{sleep, Duration};
use tracing::{error, info};
use url::Url;

/// Where to dial for one connector. `Tcp`/`Udp` carry a `host:port` string,
/// `Websocket` a full `ws://` URL, matching the Beast wire format in all
/// three cases.
#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint {
    Tcp(String),
    Udp(String),
    Websocket(String),
}

fn build_serial(input: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    input.hash(&mut hasher);
    hasher.finish()
}

fn parse_endpoint(s: &str) -> Result<(Endpoint, Option<String>), String> {
    let s = s.replace('@', "?");
    let default_tcp = Url::parse("tcp://").unwrap();
    let url = default_tcp.join(&s).map_err(|e| e.to_string())?;

    let endpoint = match url.scheme() {
        "tcp" => Endpoint::Tcp(format!(
            "{}:{}",
            url.host_str().unwrap_or("0.0.0.0"),
            match url.host() {
                Some(_) => url.port_or_known_default().unwrap_or(30_005),
                None => url
                    .path()
                    .strip_prefix("/:")
                    .ok_or("missing port")?
                    .parse::<u16>()
                    .map_err(|e| e.to_string())?,
            }
        )),
        "udp" => Endpoint::Udp(format!(
            "{}:{}",
            url.host_str().unwrap_or("0.0.0.0"),
            url.port_or_known_default().unwrap_or(30_005)
        )),
        "ws" => Endpoint::Websocket(format!(
            "ws://{}:{}/{}",
            url.host_str().unwrap_or("0.0.0.0"),
            url.port_or_known_default().unwrap_or(80),
            url.path().strip_prefix('/').unwrap_or(""),
        )),
        other => return Err(format!("unsupported scheme: {other}")),
    };

    let query = url.query().map(str::to_string);
    Ok((endpoint, query))
}

/// Alternation bookkeeping for a connector with a `primary`/`secondary`
/// pair: every reconnect attempt flips which address is dialed next.
#[derive(Debug, Default)]
pub struct ConnectorState {
    attempt: AtomicU32,
}

impl ConnectorState {
    fn next_is_secondary(&self) -> bool {
        self.attempt.fetch_add(1, Ordering::SeqCst) % 2 == 1
    }
}

impl Clone for ConnectorState {
    fn clone(&self) -> Self {
        ConnectorState {
            attempt: AtomicU32::new(self.attempt.load(Ordering::SeqCst)),
        }
    }
}

/// One configured receiver: a primary endpoint, an optional fallback dialed
/// on every other reconnect attempt, and a surveyed reference position used
/// to resolve local (one-message) CPR fixes for that sensor's ground traffic.
#[derive(Debug, Clone)]
pub struct Connector {
    pub name: Option<String>,
    pub primary: Endpoint,
    pub secondary: Option<Endpoint>,
    pub reference: Option<Position>,
    state: ConnectorState,
}

impl FromStr for Connector {
    type Err = String;

    /// `[host:]port[,[host:]port][@lat,lon]` or a `tcp://`/`udp://`/`ws://`
    /// URL, mirroring the receiver address grammar used by dump1090-family
    /// tools: a bare `host:port` defaults to the Beast TCP feed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(2, ',');
        let primary_str = parts.next().unwrap();
        let secondary_str = parts.next();

        let (primary, query) = parse_endpoint(primary_str)?;
        let secondary = secondary_str
            .map(|s| parse_endpoint(s).map(|(e, _)| e))
            .transpose()?;

        let reference = query.and_then(|q| Position::from_str(&q).ok());

        Ok(Connector {
            name: None,
            primary,
            secondary,
            reference,
            state: ConnectorState::default(),
        })
    }
}

impl Connector {
    pub fn serial(&self) -> u64 {
        let key = match &self.primary {
            Endpoint::Tcp(s) | Endpoint::Udp(s) | Endpoint::Websocket(s) => s,
        };
        build_serial(key)
    }

    fn dial(&self) -> &Endpoint {
        match (&self.secondary, self.state.next_is_secondary()) {
            (Some(secondary), true) => secondary,
            _ => &self.primary,
        }
    }

    /// Runs forever, reconnecting with a backoff and alternating between
    /// `primary`/`secondary` on each attempt, pushing decoded-ready frames
    /// onto `tx` tagged with this connector's serial.
    pub async fn run(&self, tx: Sender<TimedMessage>, reconnect_delay: Duration) {
        let serial = self.serial();
        loop {
            let endpoint = self.dial().clone();
            let source = match endpoint {
                Endpoint::Tcp(addr) => BeastSource::Tcp(addr),
                Endpoint::Udp(addr) => BeastSource::Udp(addr),
                Endpoint::Websocket(addr) => BeastSource::Websocket(addr),
            };
            info!("Connecting connector {:?} ({:?})", self.name, source_label(&source));
            if let Err(e) =
                beast::receiver(source, tx.clone(), serial, self.name.clone()).await
            {
                error!("Connector {:?} failed: {}", self.name, e);
            }
            if tx.is_closed() {
                break;
            }
            sleep(reconnect_delay).await;
        }
    }
}

fn source_label(source: &BeastSource) -> &str {
    match source {
        BeastSource::Tcp(_) => "tcp",
        BeastSource::Udp(_) => "udp",
        BeastSource::Websocket(_) => "ws",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_port() {
        let c = Connector::from_str(":30005").unwrap();
        assert_eq!(c.primary, Endpoint::Tcp("0.0.0.0:30005".to_string()));
        assert!(c.secondary.is_none());
    }

    #[test]
    fn parses_primary_and_secondary() {
        let c =
            Connector::from_str("radar1.local:30005,radar2.local:30005")
                .unwrap();
        assert_eq!(
            c.primary,
            Endpoint::Tcp("radar1.local:30005".to_string())
        );
        assert_eq!(
            c.secondary,
            Some(Endpoint::Tcp("radar2.local:30005".to_string()))
        );
    }

    #[test]
    fn parses_reference_position() {
        let c = Connector::from_str(":30005@43.628101,1.367263").unwrap();
        let reference = c.reference.unwrap();
        assert_eq!(reference.latitude, 43.628101);
        assert_eq!(reference.longitude, 1.367263);
    }

    #[test]
    fn alternates_primary_and_secondary() {
        let state = ConnectorState::default();
        assert!(!state.next_is_secondary());
        assert!(state.next_is_secondary());
        assert!(!state.next_is_secondary());
    }
}
