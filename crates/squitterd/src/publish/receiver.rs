//! `receiver.json`: receiver identity and capacity status, written on
//! startup, on a configured-position change and when history capacity is
//! reached (spec.md §4.6's three triggers, treated as first-class per
//! SPEC_FULL's supplemented-features list).
use super::atomic_write_json;
use crate::config::Config;
use serde::Serialize;
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct ReceiverJson {
    pub version: &'static str,
    pub refresh: u64,
    pub uuid: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub history: usize,
    pub history_capacity_reached: bool,
}

/// Reads the receiver UUID from `uuid_file`, creating and persisting a new
/// random one on first run.
pub async fn load_or_create_uuid(uuid_file: &Path) -> std::io::Result<Uuid> {
    match tokio::fs::read_to_string(uuid_file).await {
        Ok(text) => Ok(Uuid::parse_str(text.trim()).unwrap_or_else(|_| Uuid::new_v4())),
        Err(_) => {
            let uuid = Uuid::new_v4();
            if let Some(parent) = uuid_file.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(uuid_file, uuid.to_string()).await?;
            Ok(uuid)
        }
    }
}

pub async fn write(
    path: &Path,
    config: &Config,
    uuid: &Uuid,
    history_len: usize,
    history_capacity_reached: bool,
) -> std::io::Result<()> {
    let document = ReceiverJson {
        version: env!("CARGO_PKG_VERSION"),
        refresh: config.trace_interval_s,
        uuid: uuid.to_string(),
        lat: config.lat,
        lon: config.lon,
        history: history_len,
        history_capacity_reached,
    };
    atomic_write_json(path, &document).await
}
