#![doc = include_str!("../readme.md")]

mod config;
mod error;
mod net;
mod publish;
mod registry;
mod stats;

use squitter_core::decode::cpr::{decode_position, AircraftState, Position, PositionOutcome};
use squitter_core::decode::{Message, TimedMessage, DF};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::time::{interval, Duration};
use tracing::{info, warn};

use config::Config;
use net::server::Protocol;
use registry::Registry;
use stats::{mstime, Stats};

/// Aircraft tracked beyond this count flips `receiver.json`'s
/// `history_capacity_reached` flag (spec §4.6's third `receiver.json`
/// trigger).
const AIRCRAFT_HISTORY_CAPACITY: usize = 10_000;

/// Process-wide singleton: the one owned value constructed at startup and
/// shared by borrowed reference with every spawned task. Shutdown is a
/// single atomic flip on `exit` that every worker polls on each wake.
struct Core {
    config: Config,
    registry: Mutex<Registry>,
    stats: Mutex<Stats>,
    exit: AtomicBool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let (config, sources) = Config::load()?;

    let core = Arc::new(Core {
        registry: Mutex::new(Registry::new(config.history_depth)),
        stats: Mutex::new(Stats::new(mstime())),
        exit: AtomicBool::new(false),
        config,
    });

    let uuid = publish::receiver::load_or_create_uuid(&core.config.uuid_file).await?;

    let listener_exit = Arc::new(AtomicBool::new(false));
    signal_task(core.clone(), listener_exit.clone());

    let (tx, rx) = tokio::sync::mpsc::channel(1024);
    let (dedup_tx, mut dedup_rx) = tokio::sync::mpsc::channel(1024);

    tokio::spawn(net::dedup::deduplicate_messages(
        rx,
        dedup_tx,
        core.config.dedup_interval_ms as u128,
    ));

    for connector in sources {
        let tx = tx.clone();
        let reconnect_delay = Duration::from_millis(30_000);
        tokio::spawn(async move {
            connector.run(tx, reconnect_delay).await;
        });
    }
    drop(tx);

    // Fan-out bus: every connector's dedup'd, decoded frame is broadcast
    // here once, and every connected Beast/Raw/SBS client subscribes
    // independently so one slow reader can only fall behind, never stall
    // the others (spec §4.1).
    let (bus, _) = broadcast::channel(4096);
    spawn_fanout_listeners(&core.config, bus.clone(), listener_exit);

    publisher_task(core.clone(), uuid);
    expiry_task(core.clone());

    let mut aircraft: BTreeMap<squitter_core::decode::ICAO, AircraftState> = BTreeMap::new();
    let mut reference: Option<Position> = core
        .config
        .lat
        .zip(core.config.lon)
        .map(|(latitude, longitude)| Position { latitude, longitude });

    while let Some(mut tmsg) = dedup_rx.recv().await {
        if core.exit.load(Ordering::SeqCst) {
            break;
        }
        let t0 = std::time::Instant::now();

        let Ok((_, message)) = Message::from_bytes((&tmsg.frame, 0)) else {
            let mut stats = core.stats.lock().await;
            stats.current.bad_crc += 1;
            continue;
        };
        tmsg.message = Some(message);
        tmsg.decode_time = Some(t0.elapsed().as_secs_f64());

        let position_outcome = if let Some(msg) = &mut tmsg.message {
            match &mut msg.df {
                DF::ExtendedSquitterADSB(adsb) => {
                    let icao_hex = adsb.icao24.to_string();
                    let outcome = decode_position(
                        &mut adsb.message,
                        tmsg.timestamp,
                        &adsb.icao24,
                        &mut aircraft,
                        &mut reference,
                        &None,
                    );
                    registry::record_position_outcome(&core.registry, &icao_hex, outcome).await;
                    Some(outcome)
                }
                DF::ExtendedSquitterTisB { cf, .. } => {
                    let icao_hex = cf.aa.to_string();
                    let outcome = decode_position(
                        &mut cf.me,
                        tmsg.timestamp,
                        &cf.aa,
                        &mut aircraft,
                        &mut reference,
                        &None,
                    );
                    registry::record_position_outcome(&core.registry, &icao_hex, outcome).await;
                    Some(outcome)
                }
                _ => None,
            }
        } else {
            None
        };

        {
            let mut stats = core.stats.lock().await;
            stats.current.messages_decoded += 1;
            if matches!(
                position_outcome,
                Some(PositionOutcome::Rejected) | Some(PositionOutcome::ResetAfterRejections)
            ) {
                stats.current.position_rejected += 1;
            }
        }

        let _ = bus.send(Arc::new(tmsg.clone()));

        registry::update(&core.registry, &mut tmsg, core.config.reliability).await;
        registry::store_history(&core.registry, tmsg).await;
    }

    info!("ingest channel closed, shutting down");
    Ok(())
}

/// Binds every configured Beast/Raw/SBS fan-out port (spec §4.1): the
/// listener half of the multiplexer, serving re-encoded frames to
/// connecting clients rather than only dialing out to receivers.
fn spawn_fanout_listeners(
    config: &Config,
    bus: broadcast::Sender<Arc<TimedMessage>>,
    exit: Arc<AtomicBool>,
) {
    net::server::spawn_listeners(
        config.bind_address,
        &config.beast_ports,
        Protocol::Beast,
        bus.clone(),
        config.heartbeat_interval_ms,
        exit.clone(),
    );
    net::server::spawn_listeners(
        config.bind_address,
        &config.raw_ports,
        Protocol::Raw,
        bus.clone(),
        config.heartbeat_interval_ms,
        exit.clone(),
    );
    net::server::spawn_listeners(
        config.bind_address,
        &config.sbs_ports,
        Protocol::Sbs,
        bus,
        config.heartbeat_interval_ms,
        exit,
    );
}

/// Translates SIGTERM/SIGINT into the `exit` flag (spec §9: "translate
/// signal delivery into setting an atomic flag... no work is done in
/// signal context beyond flag+notify").
fn signal_task(core: Arc<Core>, listener_exit: Arc<AtomicBool>) {
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        warn!("shutdown signal received");
        core.exit.store(true, Ordering::SeqCst);
        listener_exit.store(true, Ordering::SeqCst);
    });
}

/// Runs the periodic publisher on a fast poll tick, rolling over the stats
/// windows every 10 s per spec §4.7; [`publish::Publisher`] itself decides,
/// per artifact, whether enough time has passed to actually write.
fn publisher_task(core: Arc<Core>, uuid: uuid::Uuid) {
    tokio::spawn(async move {
        let mut publisher = publish::Publisher::new(&core.config);
        let mut tick = interval(Duration::from_millis(100));
        let mut rollover_tick = interval(Duration::from_secs(10));
        let receiver_path = core.config.json_dir.join("receiver.json");
        let mut history_capacity_reached = false;

        let history_len = core.registry.lock().await.aircraft.len();
        if let Err(e) = publish::receiver::write(
            &receiver_path,
            &core.config,
            &uuid,
            history_len,
            history_len >= AIRCRAFT_HISTORY_CAPACITY,
        )
        .await
        {
            warn!("failed to publish receiver.json: {}", e);
        }

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let now = mstime();
                    let stats_snapshot = core.stats.lock().await.clone();
                    publisher.maybe_tick(&core.config, &core.registry, &stats_snapshot, now).await;

                    let history_len = core.registry.lock().await.aircraft.len();
                    let capacity_reached = history_len >= AIRCRAFT_HISTORY_CAPACITY;
                    if capacity_reached && !history_capacity_reached {
                        history_capacity_reached = true;
                        if let Err(e) = publish::receiver::write(
                            &receiver_path,
                            &core.config,
                            &uuid,
                            history_len,
                            capacity_reached,
                        )
                        .await
                        {
                            warn!("failed to publish receiver.json: {}", e);
                        }
                    }

                    if core.exit.load(Ordering::SeqCst) {
                        break;
                    }
                }
                _ = rollover_tick.tick() => {
                    core.stats.lock().await.rollover(mstime());
                }
            }
        }
    });
}

/// Evicts aircraft once every tracked field has aged past its own expiry
/// (spec §3: per-field expiry replacing a flat whole-aircraft timeout),
/// walking the registry once a minute.
fn expiry_task(core: Arc<Core>) {
    tokio::spawn(async move {
        let mut tick = interval(Duration::from_secs(60));
        loop {
            tick.tick().await;
            if core.exit.load(Ordering::SeqCst) {
                break;
            }
            let now = mstime() / 1000;
            let mut registry = core.registry.lock().await;
            registry
                .aircraft
                .retain(|_, entry| !entry.cur.is_fully_expired(now));
        }
    });
}
