//! Per-aircraft state: the registry folds every decoded message keyed by
//! ICAO address into a rolling snapshot (current position, identity,
//! vectors) plus a bounded history used for trace publishing.
//!
//! Every quantity is tracked as a [`Field`]: a value stamped with when it
//! was last updated, which source reported it, and an expiry deadline the
//! reaper checks independently per field rather than evicting a whole
//! aircraft on one flat timeout.
pub mod icao_filter;

use squitter_core::decode::bds::bds09::AirborneVelocitySubType::{
    AirspeedSubsonic, GroundSpeedDecoding,
};
use squitter_core::decode::bds::bds09::AirspeedType::{IAS, TAS};
use squitter_core::decode::bds::bds65::{
    ADSBVersionAirborne, ADSBVersionSurface, AircraftOperationStatus,
};
use squitter_core::decode::adsb::{ADSB, ME};
use squitter_core::decode::cpr::PositionOutcome;
use squitter_core::decode::{IdentityCode, Message, TimedMessage, DF};
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Where a field's value came from, in ascending trust order: an
/// equal-timestamp update only wins if its source is at least as trusted
/// as the one already stored (spec §3's update-acceptance invariant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    ModeS,
    CommB,
    Adsb,
}

/// One quantity plus the bookkeeping needed to expire and prioritize it.
#[derive(Debug, Clone, Serialize)]
pub struct Field<T> {
    pub value: T,
    pub last_update: u64,
    pub source: FieldSource,
    pub expiry: u64,
}

impl<T: Clone> Field<T> {
    pub(crate) fn new(value: T, now: u64, source: FieldSource, grace: u64) -> Field<T> {
        Field {
            value,
            last_update: now,
            source,
            expiry: now + grace,
        }
    }

    fn update(&mut self, value: T, now: u64, source: FieldSource, grace: u64) {
        if should_update(self.last_update, self.source, now, source) {
            self.value = value;
            self.last_update = now;
            self.source = source;
            self.expiry = now + grace;
        }
    }

    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expiry
    }
}

/// Spec §3's update-acceptance invariant: a newer timestamp always wins; at
/// an equal timestamp the more trusted source wins.
fn should_update(stored_ts: u64, stored_source: FieldSource, ts: u64, source: FieldSource) -> bool {
    ts > stored_ts || (ts == stored_ts && source >= stored_source)
}

/// Per-field expiry grace, in seconds: "8 times the reliability multiplier"
/// read as 8-minute units scaled by `reliability + 1` so the default
/// reliability (0) still gets a full 8-minute grace window.
pub fn track_grace(reliability: i8) -> u64 {
    60 * 8 * (reliability.max(0) as u64 + 1)
}

fn set_field<T: Clone>(slot: &mut Option<Field<T>>, value: T, now: u64, source: FieldSource, grace: u64) {
    match slot {
        Some(field) => field.update(value, now, source, grace),
        None => *slot = Some(Field::new(value, now, source, grace)),
    }
}

fn set_field_opt<T: Clone>(
    slot: &mut Option<Field<T>>,
    value: Option<T>,
    now: u64,
    source: FieldSource,
    grace: u64,
) {
    if let Some(value) = value {
        set_field(slot, value, now, source, grace);
    }
}

/// Allowed skew between a fresher GNSS altitude and the stored barometric
/// one before GNSS is trusted to override it (spec §3).
const GNSS_SKEW_SECS: u64 = 5;

/// Altitude has two independent sources that don't always agree; GNSS only
/// overrides barometric when it's both present and fresher by more than
/// [`GNSS_SKEW_SECS`]. No message type in this tree currently decodes a
/// GNSS altitude, so `gnss` is always `None` in practice — the priority
/// logic is exercised by tests, not live traffic.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AltitudeField {
    pub barometric: Option<Field<u16>>,
    pub gnss: Option<Field<u16>>,
}

impl AltitudeField {
    fn set_barometric(&mut self, value: u16, now: u64, source: FieldSource, grace: u64) {
        set_field(&mut self.barometric, value, now, source, grace);
    }

    #[cfg(test)]
    fn set_gnss(&mut self, value: u16, now: u64, source: FieldSource, grace: u64) {
        set_field(&mut self.gnss, value, now, source, grace);
    }

    pub fn resolved(&self) -> Option<u16> {
        match (&self.barometric, &self.gnss) {
            (Some(baro), Some(gnss)) if gnss.last_update > baro.last_update + GNSS_SKEW_SECS => {
                Some(gnss.value)
            }
            (Some(baro), _) => Some(baro.value),
            (None, Some(gnss)) => Some(gnss.value),
            (None, None) => None,
        }
    }

    fn is_fully_expired(&self, now: u64) -> bool {
        let baro_expired = self.barometric.as_ref().map_or(true, |f| f.is_expired(now));
        let gnss_expired = self.gnss.as_ref().map_or(true, |f| f.is_expired(now));
        baro_expired && gnss_expired
    }
}

/// A rolling view of one airframe's last-known state, rebuilt in place as
/// new messages arrive.
#[derive(Debug, Clone, Serialize)]
pub struct Aircraft {
    pub icao24: String,
    pub first: u64,
    pub last: u64,
    /// Total messages attributed to this aircraft since it was first seen
    /// (spec §6's `messages` field).
    pub messages: u64,
    /// Incremented on each accepted position, decremented on each rejected
    /// one; gates whether `lat`/`lon` are published (spec §4.3's
    /// `json_reliable`-style threshold).
    pub position_reliability: i8,
    /// Cumulative count of positions this aircraft had discarded by the
    /// speed-sanity filter.
    pub position_rejected: u32,
    pub position: Option<Field<(f64, f64)>>,
    pub altitude: AltitudeField,
    pub selected_altitude: Option<Field<u16>>,
    pub groundspeed: Option<Field<f64>>,
    pub vertical_rate: Option<Field<i16>>,
    pub track: Option<Field<f64>>,
    pub ias: Option<Field<u16>>,
    pub tas: Option<Field<u16>>,
    pub mach: Option<Field<f64>>,
    pub roll: Option<Field<f64>>,
    pub heading: Option<Field<f64>>,
    pub nacp: Option<Field<u8>>,
    pub callsign: Option<Field<String>>,
    pub typecode: Option<Field<String>>,
    pub squawk: Option<Field<IdentityCode>>,
}

impl Aircraft {
    pub(crate) fn new(ts: u64, icao24: String) -> Aircraft {
        Aircraft {
            icao24,
            first: ts,
            last: ts,
            messages: 0,
            position_reliability: 0,
            position_rejected: 0,
            position: None,
            altitude: AltitudeField::default(),
            selected_altitude: None,
            groundspeed: None,
            vertical_rate: None,
            track: None,
            ias: None,
            tas: None,
            mach: None,
            roll: None,
            heading: None,
            nacp: None,
            callsign: None,
            typecode: None,
            squawk: None,
        }
    }

    /// True once every tracked field has aged past its own expiry deadline
    /// (spec §3: per-field expiry replacing a flat whole-aircraft timeout).
    pub fn is_fully_expired(&self, now: u64) -> bool {
        self.position.as_ref().map_or(true, |f| f.is_expired(now))
            && self.altitude.is_fully_expired(now)
            && self.selected_altitude.as_ref().map_or(true, |f| f.is_expired(now))
            && self.groundspeed.as_ref().map_or(true, |f| f.is_expired(now))
            && self.vertical_rate.as_ref().map_or(true, |f| f.is_expired(now))
            && self.track.as_ref().map_or(true, |f| f.is_expired(now))
            && self.ias.as_ref().map_or(true, |f| f.is_expired(now))
            && self.tas.as_ref().map_or(true, |f| f.is_expired(now))
            && self.mach.as_ref().map_or(true, |f| f.is_expired(now))
            && self.roll.as_ref().map_or(true, |f| f.is_expired(now))
            && self.heading.as_ref().map_or(true, |f| f.is_expired(now))
            && self.nacp.as_ref().map_or(true, |f| f.is_expired(now))
            && self.callsign.as_ref().map_or(true, |f| f.is_expired(now))
            && self.typecode.as_ref().map_or(true, |f| f.is_expired(now))
            && self.squawk.as_ref().map_or(true, |f| f.is_expired(now))
    }
}

/// Per-aircraft current state plus a bounded window of recent messages.
#[derive(Debug)]
pub struct Entry {
    pub cur: Aircraft,
    pub hist: Vec<TimedMessage>,
}

/// The full registry: one entry per ICAO address seen since start.
#[derive(Debug, Default)]
pub struct Registry {
    pub aircraft: HashMap<String, Entry>,
    pub history_depth: usize,
}

impl Registry {
    pub fn new(history_depth: usize) -> Registry {
        Registry {
            aircraft: HashMap::new(),
            history_depth,
        }
    }
}

fn icao24(msg: &Message) -> Option<String> {
    match &msg.df {
        DF::ShortAirAirSurveillance { ap, .. } => Some(ap.to_string()),
        DF::SurveillanceAltitudeReply { ap, .. } => Some(ap.to_string()),
        DF::SurveillanceIdentityReply { ap, .. } => Some(ap.to_string()),
        DF::AllCallReply { icao, .. } => Some(icao.to_string()),
        DF::LongAirAirSurveillance { ap, .. } => Some(ap.to_string()),
        DF::ExtendedSquitterADSB(ADSB { icao24, .. }) => {
            Some(icao24.to_string())
        }
        DF::ExtendedSquitterTisB { cf, .. } => Some(cf.aa.to_string()),
        DF::CommBAltitudeReply { ap, .. } => Some(ap.to_string()),
        DF::CommBIdentityReply { ap, .. } => Some(ap.to_string()),
        _ => None,
    }
}

/// Merges one decoded message into the registry, updating the matching
/// aircraft's current state in place (creating the entry on first sight).
/// `reliability` sets the per-field expiry grace via [`track_grace`].
pub async fn update(registry: &Mutex<Registry>, msg: &mut TimedMessage, reliability: i8) {
    let TimedMessage {
        timestamp,
        message: Some(message),
        ..
    } = msg
    else {
        return;
    };

    let Some(icao24) = icao24(message) else {
        return;
    };

    let now = *timestamp as u64;
    let grace = track_grace(reliability);

    let registry = &mut *registry.lock().await;
    let entry = registry
        .aircraft
        .entry(icao24.clone())
        .or_insert_with(|| Entry {
            cur: Aircraft::new(now, icao24),
            hist: Vec::new(),
        });
    entry.cur.last = now;
    entry.cur.messages += 1;

    match &mut message.df {
        DF::SurveillanceIdentityReply { id, .. } => {
            set_field(&mut entry.cur.squawk, *id, now, FieldSource::ModeS, grace);
        }
        DF::SurveillanceAltitudeReply { ac, .. } => {
            entry.cur.altitude.set_barometric(ac.0, now, FieldSource::ModeS, grace);
        }
        DF::ExtendedSquitterADSB(adsb) => apply_me(&mut entry.cur, &adsb.message, now, grace),
        DF::ExtendedSquitterTisB { cf, .. } => {
            set_field(&mut entry.cur.typecode, "GRND".to_string(), now, FieldSource::Adsb, grace);
            apply_me(&mut entry.cur, &cf.me, now, grace);
        }
        DF::CommBAltitudeReply { bds, .. } => {
            if bds.bds50.is_some() && bds.bds60.is_some() {
                bds.bds50 = None;
                bds.bds60 = None;
            }
            apply_commb(
                &mut entry.cur,
                bds.bds20.as_ref(),
                bds.bds40.as_ref(),
                bds.bds50.as_ref(),
                bds.bds60.as_ref(),
                now,
                grace,
            );
        }
        DF::CommBIdentityReply { bds, .. } => {
            if bds.bds50.is_some() && bds.bds60.is_some() {
                bds.bds50 = None;
                bds.bds60 = None;
            }
            apply_commb(
                &mut entry.cur,
                bds.bds20.as_ref(),
                bds.bds40.as_ref(),
                bds.bds50.as_ref(),
                bds.bds60.as_ref(),
                now,
                grace,
            );
        }
        _ => {}
    }
}

/// Applies the outcome of [`squitter_core::decode::cpr::decode_position`]
/// to the registry's own per-aircraft reliability counter (spec §4.3): this
/// runs after CPR decoding in the ingest loop, against the same aircraft
/// [`update`] just touched.
pub async fn record_position_outcome(registry: &Mutex<Registry>, icao_hex: &str, outcome: PositionOutcome) {
    let mut registry = registry.lock().await;
    let Some(entry) = registry.aircraft.get_mut(icao_hex) else {
        return;
    };
    match outcome {
        PositionOutcome::Updated => {
            entry.cur.position_reliability = entry.cur.position_reliability.saturating_add(1);
        }
        PositionOutcome::Rejected => {
            entry.cur.position_rejected += 1;
            entry.cur.position_reliability = entry.cur.position_reliability.saturating_sub(1);
        }
        PositionOutcome::ResetAfterRejections => {
            entry.cur.position_rejected += 1;
            entry.cur.position_reliability = 0;
        }
        PositionOutcome::Unchanged => {}
    }
}

fn apply_me(cur: &mut Aircraft, me: &ME, now: u64, grace: u64) {
    match me {
        ME::BDS05(bds05) => {
            if let (Some(lat), Some(lon)) = (bds05.latitude, bds05.longitude) {
                set_field(&mut cur.position, (lat, lon), now, FieldSource::Adsb, grace);
            }
            if let Some(alt) = bds05.alt {
                cur.altitude.set_barometric(alt, now, FieldSource::Adsb, grace);
            }
        }
        ME::BDS06(bds06) => {
            if let (Some(lat), Some(lon)) = (bds06.latitude, bds06.longitude) {
                set_field(&mut cur.position, (lat, lon), now, FieldSource::Adsb, grace);
            }
            set_field_opt(&mut cur.track, bds06.track, now, FieldSource::Adsb, grace);
            set_field_opt(&mut cur.groundspeed, bds06.groundspeed, now, FieldSource::Adsb, grace);
            // Surface reports carry no altitude of their own; the per-field
            // expiry model lets a barometric reading from an earlier
            // airborne message simply age out rather than being wiped
            // here as the old flat model did.
        }
        ME::BDS08(bds08) => {
            set_field(&mut cur.callsign, bds08.callsign.to_string(), now, FieldSource::Adsb, grace);
        }
        ME::BDS09(bds09) => {
            set_field_opt(&mut cur.vertical_rate, bds09.vertical_rate, now, FieldSource::Adsb, grace);
            match &bds09.velocity {
                GroundSpeedDecoding(spd) => {
                    set_field(&mut cur.groundspeed, spd.groundspeed, now, FieldSource::Adsb, grace);
                    set_field(&mut cur.track, spd.track, now, FieldSource::Adsb, grace);
                }
                AirspeedSubsonic(spd) => {
                    match spd.airspeed_type {
                        IAS => set_field_opt(&mut cur.ias, spd.airspeed, now, FieldSource::Adsb, grace),
                        TAS => set_field_opt(&mut cur.tas, spd.airspeed, now, FieldSource::Adsb, grace),
                    }
                    set_field_opt(&mut cur.heading, spd.heading, now, FieldSource::Adsb, grace);
                }
                _ => {}
            }
        }
        ME::BDS61(bds61) => {
            set_field(&mut cur.squawk, bds61.squawk, now, FieldSource::Adsb, grace);
        }
        ME::BDS62(bds62) => {
            set_field_opt(&mut cur.selected_altitude, bds62.selected_altitude, now, FieldSource::Adsb, grace);
            set_field(&mut cur.nacp, bds62.nac_p, now, FieldSource::Adsb, grace);
        }
        ME::BDS65(bds65) => match bds65 {
            AircraftOperationStatus::Airborne(st) => match &st.version {
                ADSBVersionAirborne::DOC9871AppendixB(v) => {
                    set_field(&mut cur.nacp, v.nac_p, now, FieldSource::Adsb, grace)
                }
                ADSBVersionAirborne::DOC9871AppendixC(v) => {
                    set_field(&mut cur.nacp, v.nac_p, now, FieldSource::Adsb, grace)
                }
                _ => {}
            },
            AircraftOperationStatus::Surface(st) => match &st.version {
                ADSBVersionSurface::DOC9871AppendixB(v) => {
                    set_field(&mut cur.nacp, v.nac_p, now, FieldSource::Adsb, grace)
                }
                ADSBVersionSurface::DOC9871AppendixC(v) => {
                    set_field(&mut cur.nacp, v.nac_p, now, FieldSource::Adsb, grace)
                }
                _ => {}
            },
            _ => {}
        },
        _ => {}
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_commb(
    cur: &mut Aircraft,
    bds20: Option<&squitter_core::decode::bds::bds20::AircraftIdentification>,
    bds40: Option<&squitter_core::decode::bds::bds40::SelectedVerticalIntention>,
    bds50: Option<&squitter_core::decode::bds::bds50::TrackAndTurnReport>,
    bds60: Option<&squitter_core::decode::bds::bds60::HeadingAndSpeedReport>,
    now: u64,
    grace: u64,
) {
    if let Some(bds20) = bds20 {
        set_field(&mut cur.callsign, bds20.callsign.to_string(), now, FieldSource::CommB, grace);
    }
    if let Some(bds40) = bds40 {
        set_field_opt(&mut cur.selected_altitude, bds40.selected_altitude_mcp, now, FieldSource::CommB, grace);
    }
    if let Some(bds50) = bds50 {
        set_field_opt(&mut cur.roll, bds50.roll_angle, now, FieldSource::CommB, grace);
        set_field_opt(&mut cur.track, bds50.track_angle, now, FieldSource::CommB, grace);
        set_field_opt(&mut cur.groundspeed, bds50.groundspeed.map(|x| x as f64), now, FieldSource::CommB, grace);
        set_field_opt(&mut cur.tas, bds50.true_airspeed, now, FieldSource::CommB, grace);
    }
    if let Some(bds60) = bds60 {
        set_field_opt(&mut cur.ias, bds60.indicated_airspeed, now, FieldSource::CommB, grace);
        set_field_opt(&mut cur.mach, bds60.mach_number, now, FieldSource::CommB, grace);
        set_field_opt(&mut cur.heading, bds60.magnetic_heading, now, FieldSource::CommB, grace);
        set_field_opt(&mut cur.vertical_rate, bds60.inertial_vertical_velocity, now, FieldSource::CommB, grace);
    }
}

/// Appends a message to an aircraft's history, trimming it back down to
/// `history_depth` entries.
pub async fn store_history(registry: &Mutex<Registry>, msg: TimedMessage) {
    let TimedMessage {
        timestamp,
        message: Some(message),
        ..
    } = &msg
    else {
        return;
    };

    let Some(icao24) = icao24(message) else {
        return;
    };

    if !matches!(
        message.df,
        DF::ExtendedSquitterADSB(_)
            | DF::ExtendedSquitterTisB { .. }
            | DF::CommBAltitudeReply { .. }
            | DF::CommBIdentityReply { .. }
    ) {
        return;
    }

    let timestamp = *timestamp as u64;
    let registry = &mut *registry.lock().await;
    let depth = registry.history_depth;
    let entry = registry
        .aircraft
        .entry(icao24.clone())
        .or_insert_with(|| Entry {
            cur: Aircraft::new(timestamp, icao24),
            hist: Vec::new(),
        });
    entry.hist.push(msg);
    if entry.hist.len() > depth {
        let overflow = entry.hist.len() - depth;
        entry.hist.drain(0..overflow);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_update_prefers_newer_timestamp_then_higher_priority_source() {
        assert!(should_update(10, FieldSource::ModeS, 11, FieldSource::ModeS));
        assert!(!should_update(10, FieldSource::Adsb, 9, FieldSource::Adsb));
        assert!(should_update(10, FieldSource::ModeS, 10, FieldSource::CommB));
        assert!(!should_update(10, FieldSource::CommB, 10, FieldSource::ModeS));
    }

    #[test]
    fn field_expiry_is_bounded_by_its_own_deadline() {
        let field = Field::new(38000u16, 100, FieldSource::ModeS, 60);
        assert!(!field.is_expired(159));
        assert!(field.is_expired(160));
    }

    #[test]
    fn altitude_field_prefers_gnss_only_when_it_is_meaningfully_fresher() {
        let mut alt = AltitudeField::default();
        alt.set_barometric(38000, 100, FieldSource::ModeS, 600);
        assert_eq!(alt.resolved(), Some(38000));

        alt.set_gnss(38050, 102, FieldSource::Adsb, 600);
        // only 2s fresher than barometric, within GNSS_SKEW_SECS: barometric still wins
        assert_eq!(alt.resolved(), Some(38000));

        alt.set_gnss(38100, 110, FieldSource::Adsb, 600);
        // now 10s fresher: GNSS wins
        assert_eq!(alt.resolved(), Some(38100));
    }

    #[test]
    fn aircraft_is_fully_expired_only_once_every_field_has_aged_out() {
        let mut aircraft = Aircraft::new(0, "48400d6".to_string());
        set_field(&mut aircraft.callsign, "KLM1023".to_string(), 0, FieldSource::Adsb, 10);
        assert!(!aircraft.is_fully_expired(5));
        assert!(aircraft.is_fully_expired(11));
    }

    #[tokio::test]
    async fn record_position_outcome_adjusts_reliability_and_rejected_count() {
        let registry = Mutex::new(Registry::new(10));
        {
            let mut reg = registry.lock().await;
            reg.aircraft.insert(
                "48400d6".to_string(),
                Entry {
                    cur: Aircraft::new(0, "48400d6".to_string()),
                    hist: Vec::new(),
                },
            );
        }

        record_position_outcome(&registry, "48400d6", PositionOutcome::Updated).await;
        record_position_outcome(&registry, "48400d6", PositionOutcome::Updated).await;
        record_position_outcome(&registry, "48400d6", PositionOutcome::Rejected).await;

        let reg = registry.lock().await;
        let entry = &reg.aircraft["48400d6"];
        assert_eq!(entry.cur.position_reliability, 1);
        assert_eq!(entry.cur.position_rejected, 1);
    }
}
