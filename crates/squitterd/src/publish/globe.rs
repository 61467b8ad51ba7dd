//! Globe tiles: the registry is sharded into a small grid of tiles by
//! position so a fan-out client can subscribe to one region instead of the
//! whole world; each tile is published as its own JSON array, mirroring the
//! `internal_state`/`blob_<i>` shard layout named in spec.md §6.
use super::aircraft::to_vrs;
use super::atomic_write_json;
use crate::registry::Registry;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::Mutex;

/// Degrees per globe tile edge; coarser than the heatmap grid since tiles
/// are meant to bound fan-out volume, not visualize density.
const TILE_DEGREES: f64 = 15.0;

/// How many interleaved shards tiles are spread across: each publisher
/// tick writes one shard round-robin rather than the whole globe at once
/// (spec §4.6).
pub const SHARD_COUNT: u32 = 4;

/// Maps a position to its tile id: an index into a flattened
/// `360/TILE_DEGREES` x `180/TILE_DEGREES` grid, stable across runs so
/// `blob_<i>` naming is reproducible.
pub fn tile_id(lat: f64, lon: f64) -> u32 {
    let cols = (360.0 / TILE_DEGREES).ceil() as u32;
    let row = ((lat + 90.0) / TILE_DEGREES).floor().max(0.0) as u32;
    let col = ((lon + 180.0) / TILE_DEGREES).floor().max(0.0) as u32;
    row * cols + col
}

/// Writes `blob_<tile_id>.json` for every non-empty tile whose id falls in
/// `shard` of [`SHARD_COUNT`], under `globe_history_dir/internal_state`.
/// Aircraft below `reliability_threshold` are skipped, same gate as
/// `aircraft.json`.
pub async fn write_shard(
    globe_history_dir: &Path,
    registry: &Mutex<Registry>,
    shard: u32,
    reliability_threshold: i8,
) -> std::io::Result<()> {
    let registry = registry.lock().await;
    let mut tiles: HashMap<u32, Vec<_>> = HashMap::new();
    for entry in registry.aircraft.values() {
        if entry.cur.position_reliability < reliability_threshold {
            continue;
        }
        if let Some(field) = &entry.cur.position {
            let (lat, lon) = field.value;
            let id = tile_id(lat, lon);
            if id % SHARD_COUNT != shard {
                continue;
            }
            tiles.entry(id).or_default().push(to_vrs(&entry.cur, reliability_threshold));
        }
    }
    drop(registry);

    let dir = globe_history_dir.join("internal_state");
    for (id, aircraft) in tiles {
        let path = dir.join(format!("blob_{id}.json"));
        atomic_write_json(&path, &aircraft).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_id_is_stable_for_nearby_positions() {
        assert_eq!(tile_id(43.6, 1.4), tile_id(44.0, 2.0));
        assert_ne!(tile_id(43.6, 1.4), tile_id(-10.0, 1.4));
    }
}
