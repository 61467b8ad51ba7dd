//! Merges frames seen by more than one connector within a short window into
//! a single message carrying every sensor's metadata, instead of forwarding
//! duplicates downstream.
use squitter_core::decode::{SensorMetadata, TimedMessage};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use tokio::sync::mpsc;
use tracing::info;

pub async fn deduplicate_messages(
    mut rx: mpsc::Receiver<TimedMessage>,
    tx: mpsc::Sender<TimedMessage>,
    deduplication_threshold_ms: u128,
) {
    let mut cache: HashMap<Vec<u8>, Vec<TimedMessage>> = HashMap::new();
    let mut expiration_heap: BinaryHeap<Reverse<(u128, Vec<u8>)>> =
        BinaryHeap::new();

    while let Some(msg) = rx.recv().await {
        let timestamp_ms = (msg.timestamp * 1e3) as u128;
        let frame = msg.frame.clone();

        cache.entry(frame.clone()).or_default().push(msg);

        if cache[&frame].len() == 1 {
            expiration_heap.push(Reverse((
                timestamp_ms + deduplication_threshold_ms,
                frame.clone(),
            )));
        }

        while let Some(Reverse((curtime, frame))) = expiration_heap.pop() {
            if curtime > timestamp_ms {
                expiration_heap.push(Reverse((curtime, frame)));
                break;
            }

            if let Some(entries) = cache.remove(&frame) {
                send_merged(&tx, entries).await;
            }
        }
    }

    // The channel closed with frames still waiting out their dedup window;
    // flush them rather than dropping the last sensor report for each.
    while let Some(Reverse((_, frame))) = expiration_heap.pop() {
        if let Some(entries) = cache.remove(&frame) {
            send_merged(&tx, entries).await;
        }
    }
}

async fn send_merged(tx: &mpsc::Sender<TimedMessage>, mut entries: Vec<TimedMessage>) {
    let merged_metadata: Vec<SensorMetadata> = entries
        .iter()
        .flat_map(|entry| entry.metadata.clone())
        .collect();

    let mut msg = entries.remove(0);
    msg.metadata = merged_metadata;

    if let Err(e) = tx.send(msg).await {
        info!("Failed to send deduplicated entries: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use squitter_core::decode::SensorMetadata;

    fn sensor(serial: u64) -> SensorMetadata {
        SensorMetadata {
            system_timestamp: 0.,
            gnss_timestamp: None,
            nanoseconds: None,
            rssi: None,
            serial,
            name: None,
        }
    }

    #[tokio::test]
    async fn merges_duplicate_frames_from_two_sensors() {
        let (in_tx, in_rx) = mpsc::channel(16);
        let (out_tx, mut out_rx) = mpsc::channel(16);
        tokio::spawn(deduplicate_messages(in_rx, out_tx, 200));

        let frame = hex::decode("8c4841753a9a153237aef0f275be").unwrap();
        for serial in [1u64, 2u64] {
            in_tx
                .send(TimedMessage {
                    timestamp: 0.001,
                    frame: frame.clone(),
                    message: None,
                    metadata: vec![sensor(serial)],
                    decode_time: None,
                })
                .await
                .unwrap();
        }
        drop(in_tx);

        let merged = out_rx.recv().await.unwrap();
        assert_eq!(merged.metadata.len(), 2);
        assert!(out_rx.recv().await.is_none());
    }
}
