//! `aircraft.json`: the VRS/aircraft.json wire schema (spec §6), built by
//! flattening every live registry entry into one array.
use super::atomic_write_json;
use crate::registry::{Aircraft, Registry};
use serde::Serialize;
use squitter_core::decode::IdentityCode;
use std::path::Path;
use tokio::sync::Mutex;

/// One aircraft's row in the published snapshot, field names matching the
/// wire schema (snake_case, non-exhaustive per spec.md §6) rather than this
/// crate's internal [`Aircraft`] naming.
#[derive(Debug, Serialize)]
pub struct VrsAircraft {
    pub hex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_baro: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tas: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ias: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mach: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mag_heading: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baro_rate: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub squawk: Option<IdentityCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nav_altitude_mcp: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nac_p: Option<u8>,
    pub messages: u64,
    pub seen: u64,
}

/// Flattens a registry aircraft into the wire schema, gating position
/// fields on `reliability_threshold` (spec §4.3's `json_reliable`-style
/// rule): a track whose `position_reliability` hasn't climbed to the
/// threshold publishes with `lat`/`lon` withheld rather than a stale or
/// unvetted fix.
pub fn to_vrs(a: &Aircraft, reliability_threshold: i8) -> VrsAircraft {
    let (lat, lon) = if a.position_reliability >= reliability_threshold {
        match &a.position {
            Some(field) => (Some(field.value.0), Some(field.value.1)),
            None => (None, None),
        }
    } else {
        (None, None)
    };

    VrsAircraft {
        hex: a.icao24.clone(),
        flight: a.callsign.as_ref().map(|f| f.value.clone()),
        t: a.typecode.as_ref().map(|f| f.value.clone()),
        alt_baro: a.altitude.resolved(),
        gs: a.groundspeed.as_ref().map(|f| f.value),
        tas: a.tas.as_ref().map(|f| f.value),
        ias: a.ias.as_ref().map(|f| f.value),
        mach: a.mach.as_ref().map(|f| f.value),
        track: a.track.as_ref().map(|f| f.value),
        roll: a.roll.as_ref().map(|f| f.value),
        mag_heading: a.heading.as_ref().map(|f| f.value),
        baro_rate: a.vertical_rate.as_ref().map(|f| f.value),
        squawk: a.squawk.as_ref().map(|f| f.value),
        nav_altitude_mcp: a.selected_altitude.as_ref().map(|f| f.value),
        lat,
        lon,
        nac_p: a.nacp.as_ref().map(|f| f.value),
        messages: a.messages,
        seen: a.last.saturating_sub(a.first),
    }
}

#[derive(Debug, Serialize)]
struct AircraftJson {
    now: f64,
    messages: usize,
    aircraft: Vec<VrsAircraft>,
}

pub async fn write(
    path: &Path,
    registry: &Mutex<Registry>,
    now_ms: u64,
    reliability_threshold: i8,
) -> std::io::Result<()> {
    let registry = registry.lock().await;
    let aircraft: Vec<VrsAircraft> = registry
        .aircraft
        .values()
        .map(|e| to_vrs(&e.cur, reliability_threshold))
        .collect();
    let document = AircraftJson {
        now: now_ms as f64 / 1e3,
        messages: aircraft.len(),
        aircraft,
    };
    drop(registry);
    atomic_write_json(path, &document).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Field, FieldSource};

    #[test]
    fn maps_internal_aircraft_to_wire_schema() {
        let mut a = Aircraft::new(0, "48400D6".to_string());
        a.last = 10;
        a.messages = 7;
        a.callsign = Some(Field::new("KLM1023".to_string(), 0, FieldSource::Adsb, 600));
        a.altitude.barometric = Some(Field::new(38000, 0, FieldSource::Adsb, 600));

        let vrs = to_vrs(&a, 0);
        assert_eq!(vrs.hex, "48400D6");
        assert_eq!(vrs.flight.as_deref(), Some("KLM1023"));
        assert_eq!(vrs.alt_baro, Some(38000));
        assert_eq!(vrs.messages, 7);
    }

    #[test]
    fn lat_lon_are_withheld_below_the_reliability_threshold() {
        let mut a = Aircraft::new(0, "48400D6".to_string());
        a.position = Some(Field::new((43.6, 1.4), 0, FieldSource::Adsb, 600));
        a.position_reliability = 1;

        assert_eq!(to_vrs(&a, 2).lat, None);

        a.position_reliability = 2;
        let vrs = to_vrs(&a, 2);
        assert_eq!(vrs.lat, Some(43.6));
        assert_eq!(vrs.lon, Some(1.4));
    }
}
