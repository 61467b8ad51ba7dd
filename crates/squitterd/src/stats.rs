//! The shared clock and rolling statistics windows (spec §4.7): a single
//! monotonic millisecond reference plus bucketed counters that the demod,
//! registry and network stages all feed into and the publisher later
//! flattens into `stats.json`.
use serde::Serialize;
use squitter_core::demod::DemodStats;
use std::time::{SystemTime, UNIX_EPOCH};

/// Monotonic-enough millisecond epoch: wall-clock time since the Unix
/// epoch. Good enough as the single temporal reference for timestamps,
/// expiries and timers in a process that isn't expected to survive a
/// clock step backwards mid-run.
pub fn mstime() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before 1970")
        .as_millis() as u64
}

/// One rolling window's counters, mirroring [`DemodStats`] plus the network
/// and registry counters the demodulator doesn't see.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Bucket {
    pub start: u64,
    pub end: u64,
    pub samples_processed: u64,
    pub samples_dropped: u64,
    pub preambles_examined: u64,
    pub frames_by_df: [u64; 32],
    pub bad_crc: u64,
    pub corrected_bit_errors: [u64; 3],
    pub messages_decoded: u64,
    /// Positions discarded by the speed-sanity filter (spec §4.3/§8).
    pub position_rejected: u64,
    pub network_sessions: u64,
    pub bytes_by_protocol: BytesByProtocol,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BytesByProtocol {
    pub beast: u64,
    pub raw: u64,
    pub sbs: u64,
    pub vrs_json: u64,
}

impl Bucket {
    fn reset(&mut self, now: u64) {
        *self = Bucket {
            start: now,
            end: now,
            ..Default::default()
        };
    }

    fn absorb(&mut self, other: &Bucket) {
        self.end = other.end;
        self.samples_processed += other.samples_processed;
        self.samples_dropped += other.samples_dropped;
        self.preambles_examined += other.preambles_examined;
        for i in 0..32 {
            self.frames_by_df[i] += other.frames_by_df[i];
        }
        self.bad_crc += other.bad_crc;
        for i in 0..3 {
            self.corrected_bit_errors[i] += other.corrected_bit_errors[i];
        }
        self.messages_decoded += other.messages_decoded;
        self.position_rejected += other.position_rejected;
        self.network_sessions += other.network_sessions;
        self.bytes_by_protocol.beast += other.bytes_by_protocol.beast;
        self.bytes_by_protocol.raw += other.bytes_by_protocol.raw;
        self.bytes_by_protocol.sbs += other.bytes_by_protocol.sbs;
        self.bytes_by_protocol.vrs_json += other.bytes_by_protocol.vrs_json;
    }

    pub fn record_demod(&mut self, demod: &DemodStats) {
        self.samples_processed += demod.samples_processed;
        self.samples_dropped += demod.samples_dropped;
        self.preambles_examined += demod.preambles_examined;
        for i in 0..32 {
            self.frames_by_df[i] += demod.frames_by_df[i];
        }
        self.bad_crc += demod.bad_crc;
        for (i, &n) in demod.corrected_bit_errors.iter().enumerate().take(3) {
            self.corrected_bit_errors[i] += n;
        }
    }
}

/// The rolling-window set described in spec §4.7: a `current` bucket that
/// rolls into each wider window every 10 seconds.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    pub current: Bucket,
    #[serde(rename = "last1min")]
    pub one_min: Bucket,
    #[serde(rename = "last5min")]
    pub five_min: Bucket,
    #[serde(rename = "last15min")]
    pub fifteen_min: Bucket,
    pub periodic: Bucket,
    pub alltime: Bucket,
}

impl Stats {
    pub fn new(now: u64) -> Stats {
        let mut stats = Stats::default();
        stats.current.start = now;
        stats.one_min.start = now;
        stats.five_min.start = now;
        stats.fifteen_min.start = now;
        stats.periodic.start = now;
        stats.alltime.start = now;
        stats
    }

    /// Rolls the `current` bucket into every wider window and resets it.
    /// Called from the main tick every 10 s (spec §4.7).
    pub fn rollover(&mut self, now: u64) {
        self.current.end = now;
        self.one_min.absorb(&self.current);
        self.five_min.absorb(&self.current);
        self.fifteen_min.absorb(&self.current);
        self.periodic.absorb(&self.current);
        self.alltime.absorb(&self.current);
        self.current.reset(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rollover_accumulates_into_every_window_and_resets_current() {
        let mut stats = Stats::new(0);
        stats.current.messages_decoded = 10;
        stats.rollover(10_000);
        assert_eq!(stats.alltime.messages_decoded, 10);
        assert_eq!(stats.fifteen_min.messages_decoded, 10);
        assert_eq!(stats.current.messages_decoded, 0);

        stats.current.messages_decoded = 5;
        stats.rollover(20_000);
        assert_eq!(stats.alltime.messages_decoded, 15);
    }
}
