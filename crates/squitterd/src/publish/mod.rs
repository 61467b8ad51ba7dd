//! Periodic publisher (spec §4.6): on every tick, flattens the registry
//! into the VRS/aircraft.json schema, per-aircraft trace files, globe
//! tiles, a heatmap snapshot, `receiver.json` and `stats.json`, each
//! written via the teacher's temp-file-then-rename discipline so a reader
//! never observes a half-written file.
pub mod aircraft;
pub mod globe;
pub mod heatmap;
pub mod receiver;
pub mod trace;

use crate::config::Config;
use crate::registry::Registry;
use crate::stats::Stats;
use std::path::Path;
use tokio::sync::Mutex;
use tracing::warn;

/// Serializes `value` to `path` by writing a sibling `.tmp` file and
/// renaming it into place, so readers either see the old file or the new
/// one, never a partial write (spec §7: "on any write error, leaves the
/// previous file in place").
pub async fn atomic_write_json<T: serde::Serialize>(
    path: &Path,
    value: &T,
) -> std::io::Result<()> {
    let body = serde_json::to_vec(value)?;
    let tmp_path = path.with_extension("tmp");
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&tmp_path, &body).await?;
    tokio::fs::rename(&tmp_path, path).await
}

/// Drives aircraft.json/stats.json/globe tiles, per-aircraft traces and the
/// heatmap snapshot at their own independent cadences (spec §4.6), rather
/// than one hardcoded tick driving all of them together. Globe tiles are
/// published one shard at a time, round-robin, on each `json_interval_ms`
/// tick so a full globe refresh takes `globe::SHARD_COUNT` ticks.
pub struct Publisher {
    json_interval_ms: u64,
    trace_interval_ms: u64,
    heatmap_interval_ms: u64,
    last_json_ms: u64,
    last_trace_ms: u64,
    last_heatmap_ms: u64,
    globe_shard: u32,
}

impl Publisher {
    pub fn new(config: &Config) -> Publisher {
        Publisher {
            json_interval_ms: config.json_interval_ms,
            trace_interval_ms: config.trace_interval_s * 1000,
            heatmap_interval_ms: config.heatmap_interval_s * 1000,
            last_json_ms: 0,
            last_trace_ms: 0,
            last_heatmap_ms: 0,
            globe_shard: 0,
        }
    }

    /// Checks every artifact's cadence against `now_ms` and writes whichever
    /// are due. Failures are logged and leave the previous artifact in
    /// place; they never abort the caller's loop.
    pub async fn maybe_tick(
        &mut self,
        config: &Config,
        registry: &Mutex<Registry>,
        stats: &Stats,
        now_ms: u64,
    ) {
        if now_ms.saturating_sub(self.last_json_ms) >= self.json_interval_ms {
            self.last_json_ms = now_ms;

            let aircraft_path = config.json_dir.join("aircraft.json");
            if let Err(e) = aircraft::write(&aircraft_path, registry, now_ms, config.reliability).await {
                warn!("failed to publish aircraft.json: {}", e);
            }

            let stats_path = config.json_dir.join("stats.json");
            if let Err(e) = atomic_write_json(&stats_path, stats).await {
                warn!("failed to publish stats.json: {}", e);
            }

            if let Err(e) = globe::write_shard(
                &config.globe_history_dir,
                registry,
                self.globe_shard,
                config.reliability,
            )
            .await
            {
                warn!("failed to publish globe shard {}: {}", self.globe_shard, e);
            }
            self.globe_shard = (self.globe_shard + 1) % globe::SHARD_COUNT;
        }

        if now_ms.saturating_sub(self.last_trace_ms) >= self.trace_interval_ms {
            self.last_trace_ms = now_ms;
            if let Err(e) = trace::write_all(&config.globe_history_dir, registry).await {
                warn!("failed to publish traces: {}", e);
            }
        }

        if config.heatmap && now_ms.saturating_sub(self.last_heatmap_ms) >= self.heatmap_interval_ms {
            self.last_heatmap_ms = now_ms;
            let heatmap_path = config.heatmap_dir.join("heatmap.json");
            if let Err(e) = heatmap::write(&heatmap_path, registry, config.reliability).await {
                warn!("failed to publish heatmap: {}", e);
            }
        }
    }
}
