//! Heatmap snapshot: a coarse grid of position-report counts, published
//! alongside aircraft.json when `config.heatmap` is enabled.
use super::atomic_write_json;
use crate::registry::Registry;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::Mutex;

/// Degrees per heatmap cell; coarse enough to keep the published grid small
/// while still showing regional traffic density.
const CELL_DEGREES: f64 = 0.25;

#[derive(Debug, Serialize)]
struct Cell {
    lat: f64,
    lon: f64,
    count: u32,
}

#[derive(Debug, Serialize)]
struct HeatmapJson {
    cell_degrees: f64,
    cells: Vec<Cell>,
}

fn cell_key(lat: f64, lon: f64) -> (i64, i64) {
    (
        (lat / CELL_DEGREES).floor() as i64,
        (lon / CELL_DEGREES).floor() as i64,
    )
}

pub async fn write(path: &Path, registry: &Mutex<Registry>, reliability_threshold: i8) -> std::io::Result<()> {
    let registry = registry.lock().await;
    let mut counts: HashMap<(i64, i64), u32> = HashMap::new();
    for entry in registry.aircraft.values() {
        if entry.cur.position_reliability < reliability_threshold {
            continue;
        }
        if let Some(field) = &entry.cur.position {
            let (lat, lon) = field.value;
            *counts.entry(cell_key(lat, lon)).or_default() += 1;
        }
    }
    drop(registry);

    let cells = counts
        .into_iter()
        .map(|((y, x), count)| Cell {
            lat: y as f64 * CELL_DEGREES,
            lon: x as f64 * CELL_DEGREES,
            count,
        })
        .collect();

    let document = HeatmapJson {
        cell_degrees: CELL_DEGREES,
        cells,
    };
    atomic_write_json(path, &document).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_nearby_positions_into_the_same_cell() {
        assert_eq!(cell_key(43.60, 1.40), cell_key(43.61, 1.44));
        assert_ne!(cell_key(43.60, 1.40), cell_key(43.90, 1.40));
    }
}
