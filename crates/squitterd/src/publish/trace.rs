//! Per-aircraft trace files: `{globe_history_dir}/traces/<hex[0:2]>/trace_full_<hex>.json`
//! (spec §6), one array of `[timestamp, lat, lon, altitude]` points per
//! aircraft, sourced from the registry's bounded history ring.
use crate::registry::Registry;
use serde::Serialize;
use squitter_core::decode::adsb::ME;
use squitter_core::decode::{TimedMessage, DF};
use std::path::Path;
use tokio::sync::Mutex;

#[derive(Debug, Serialize)]
struct TracePoint {
    t: f64,
    lat: Option<f64>,
    lon: Option<f64>,
    alt_baro: Option<u16>,
}

#[derive(Debug, Serialize)]
struct TraceFile {
    icao: String,
    trace: Vec<TracePoint>,
}

/// Pulls a position/altitude reading out of a raw history entry, if the
/// message it wraps happens to carry one (BDS05 airborne or BDS06 surface
/// position reports; every other message contributes a bare timestamp).
fn point_of(msg: &TimedMessage) -> TracePoint {
    let me = match msg.message.as_ref().map(|m| &m.df) {
        Some(DF::ExtendedSquitterADSB(adsb)) => Some(&adsb.message),
        Some(DF::ExtendedSquitterTisB { cf, .. }) => Some(&cf.me),
        _ => None,
    };
    let (lat, lon, alt_baro) = match me {
        Some(ME::BDS05(bds05)) => (bds05.latitude, bds05.longitude, bds05.alt),
        Some(ME::BDS06(bds06)) => (bds06.latitude, bds06.longitude, None),
        _ => (None, None, None),
    };
    TracePoint {
        t: msg.timestamp,
        lat,
        lon,
        alt_baro,
    }
}

fn trace_path(globe_history_dir: &Path, icao24: &str) -> std::path::PathBuf {
    let prefix = &icao24[..icao24.len().min(2)];
    globe_history_dir
        .join("traces")
        .join(prefix)
        .join(format!("trace_full_{icao24}.json"))
}

/// Writes one trace file per aircraft currently in the registry. A failure
/// on any single aircraft is logged by the caller of [`write_all`]'s
/// per-file write and does not stop the others from being written.
pub async fn write_all(globe_history_dir: &Path, registry: &Mutex<Registry>) -> std::io::Result<()> {
    let registry = registry.lock().await;
    let files: Vec<(std::path::PathBuf, TraceFile)> = registry
        .aircraft
        .values()
        .map(|entry| {
            let trace = entry.hist.iter().map(point_of).collect();
            (
                trace_path(globe_history_dir, &entry.cur.icao24),
                TraceFile {
                    icao: entry.cur.icao24.clone(),
                    trace,
                },
            )
        })
        .collect();
    drop(registry);

    for (path, file) in files {
        super::atomic_write_json(&path, &file).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shards_trace_path_by_first_two_hex_digits() {
        let path = trace_path(Path::new("/data/globe"), "48400d6");
        assert_eq!(
            path,
            Path::new("/data/globe/traces/48/trace_full_48400d6.json")
        );
    }
}
