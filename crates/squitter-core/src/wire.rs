//! Output/input wire codecs (spec §9's "per-protocol codec" capability
//! set): `{parse_input, encode, heartbeat}` for each of Beast binary, Raw
//! hex and SBS CSV, kept free of any network I/O so the multiplexer can
//! stay codec-agnostic and these can be unit-tested directly from bytes.
use crate::decode::adsb::ADSB;
use crate::decode::{Message, TimedMessage, DF};

/// Doubles every `0x1A` byte in `frame` (Beast escape framing, spec §6/§8).
fn escape(frame: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(frame.len());
    for &b in frame {
        if b == 0x1A {
            out.push(0x1A);
        }
        out.push(b);
    }
    out
}

/// Reverses [`escape`]: collapses doubled `0x1A` bytes back to one.
fn unescape(frame: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(frame.len());
    let mut i = 0;
    while i < frame.len() {
        out.push(frame[i]);
        if frame[i] == 0x1A && frame.get(i + 1) == Some(&0x1A) {
            i += 1;
        }
        i += 1;
    }
    out
}

/// Encodes one decoded message as a Beast frame: `0x1A`, type byte, 6-byte
/// MLAT timestamp, 1-byte signal level, then the escaped payload.
pub fn encode_beast(msg: &TimedMessage, signal_level: u8) -> Vec<u8> {
    let msg_type: u8 = match msg.frame.len() {
        2 => 0x31,
        7 => 0x32,
        14 => 0x33,
        _ => return Vec::new(),
    };
    let mlat_ticks = (msg.timestamp * 12e6) as u64 & 0xFFFF_FFFF_FFFF;
    let mut out = vec![0x1A, msg_type];
    out.extend(escape(&mlat_ticks.to_be_bytes()[2..8]));
    out.extend(escape(&[signal_level]));
    out.extend(escape(&msg.frame));
    out
}

/// Decodes one Beast frame (without its leading `0x1A`/type byte) back
/// into `(mlat_ticks, signal_level, payload)`.
pub fn decode_beast_body(body: &[u8]) -> Option<(u64, u8, Vec<u8>)> {
    let body = unescape(body);
    if body.len() < 7 {
        return None;
    }
    let mut ticks = [0u8; 8];
    ticks[2..8].copy_from_slice(&body[0..6]);
    let mlat_ticks = u64::from_be_bytes(ticks);
    let signal_level = body[6];
    let payload = body[7..].to_vec();
    Some((mlat_ticks, signal_level, payload))
}

/// Encodes a message as a Raw-hex line: `*<hex>;\n`.
pub fn encode_raw(msg: &TimedMessage) -> Vec<u8> {
    format!("*{};\n", hex::encode(&msg.frame)).into_bytes()
}

/// Parses a Raw-hex line of the form `[@<12-hex-timestamp>]*<hex>;`.
pub fn parse_raw(line: &str) -> Option<(Option<u64>, String)> {
    let line = line.trim();
    let (timestamp, rest) = match line.strip_prefix('@') {
        Some(rest) if rest.len() >= 12 => {
            let (ts, rest) = rest.split_at(12);
            (u64::from_str_radix(ts, 16).ok(), rest)
        }
        _ => (None, line),
    };
    let hex = rest.strip_prefix('*')?.strip_suffix(';')?;
    Some((timestamp, hex.to_string()))
}

/// Emits a minimal Beast-framed keepalive, the wire-level no-op used to
/// hold a session open past `net_heartbeat_interval`.
pub fn heartbeat_beast() -> Vec<u8> {
    vec![0x1A, 0x34, 0, 0, 0, 0, 0, 0, 0]
}

fn icao24(df: &DF) -> Option<String> {
    match df {
        DF::ShortAirAirSurveillance { ap, .. } => Some(ap.to_string()),
        DF::SurveillanceAltitudeReply { ap, .. } => Some(ap.to_string()),
        DF::SurveillanceIdentityReply { ap, .. } => Some(ap.to_string()),
        DF::AllCallReply { icao, .. } => Some(icao.to_string()),
        DF::LongAirAirSurveillance { ap, .. } => Some(ap.to_string()),
        DF::ExtendedSquitterADSB(ADSB { icao24, .. }) => Some(icao24.to_string()),
        DF::ExtendedSquitterTisB { cf, .. } => Some(cf.aa.to_string()),
        DF::CommBAltitudeReply { ap, .. } => Some(ap.to_string()),
        DF::CommBIdentityReply { ap, .. } => Some(ap.to_string()),
        _ => None,
    }
}

/// BaseStation `MSG` transmission type, the field SBS-format clients key
/// their column parsing on.
fn transmission_type(df: &DF) -> u8 {
    use crate::decode::adsb::ME;
    match df {
        DF::ExtendedSquitterADSB(ADSB { message: ME::BDS08(_), .. }) => 1,
        DF::ExtendedSquitterADSB(ADSB { message: ME::BDS06(_), .. }) => 2,
        DF::ExtendedSquitterADSB(ADSB { message: ME::BDS05(_), .. }) => 3,
        DF::ExtendedSquitterADSB(ADSB { message: ME::BDS09(_), .. }) => 4,
        DF::SurveillanceAltitudeReply { .. } | DF::CommBAltitudeReply { .. } => 5,
        DF::SurveillanceIdentityReply { .. } | DF::CommBIdentityReply { .. } => 6,
        _ => 8,
    }
}

/// Encodes a decoded message as one BaseStation/SBS CSV line. Fields the
/// decoded message doesn't itself carry (callsign, altitude, ...) are left
/// blank rather than fabricated; a fuller rendering belongs to a consumer
/// that tracks aircraft state, not this stateless per-message codec.
pub fn encode_sbs(msg: &TimedMessage) -> Option<Vec<u8>> {
    let message = msg.message.as_ref()?;
    let icao = icao24(&message.df)?;
    let kind = transmission_type(&message.df);
    Some(format!("MSG,{kind},1,1,{icao},1,,,,,,,,,,,,,,,,\n").into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_unescape_round_trips_any_byte_sequence() {
        let samples: &[&[u8]] = &[&[], &[0x1A], &[0x1A, 0x1A], &[1, 0x1A, 2, 0x1A, 0x1A, 3]];
        for &sample in samples {
            assert_eq!(unescape(&escape(sample)), sample);
        }
    }

    #[test]
    fn escape_never_leaves_an_undoubled_1a() {
        let escaped = escape(&[1, 0x1A, 2]);
        assert_eq!(escaped, vec![1, 0x1A, 0x1A, 2]);
    }

    #[test]
    fn raw_hex_round_trips_through_encode_and_parse() {
        let msg = TimedMessage {
            timestamp: 0.0,
            frame: hex::decode("8d406b902015a678d4d220aa4bda").unwrap(),
            message: None,
            metadata: Vec::new(),
            decode_time: None,
        };
        let line = encode_raw(&msg);
        let (ts, hex) = parse_raw(std::str::from_utf8(&line).unwrap()).unwrap();
        assert_eq!(ts, None);
        assert_eq!(hex, "8d406b902015a678d4d220aa4bda");
    }

    #[test]
    fn encode_sbs_is_none_without_a_decoded_message() {
        let msg = TimedMessage {
            timestamp: 0.0,
            frame: hex::decode("8d406b902015a678d4d220aa4bda").unwrap(),
            message: None,
            metadata: Vec::new(),
            decode_time: None,
        };
        assert!(encode_sbs(&msg).is_none());
    }

    #[test]
    fn encode_sbs_carries_the_icao_and_transmission_type() {
        let frame = hex::decode("8d406b902015a678d4d220aa4bda").unwrap();
        let message = Message::try_from(frame.as_slice()).unwrap();
        let msg = TimedMessage {
            timestamp: 0.0,
            frame,
            message: Some(message),
            metadata: Vec::new(),
            decode_time: None,
        };
        let line = String::from_utf8(encode_sbs(&msg).unwrap()).unwrap();
        assert!(line.starts_with("MSG,1,"));
        assert!(line.contains("406b90"));
    }

    #[test]
    fn parse_raw_reads_the_optional_timestamp_prefix() {
        let (ts, hex) = parse_raw("@000001F4B3E1*8d406b90;").unwrap();
        assert_eq!(ts, Some(0x0000_01F4_B3E1));
        assert_eq!(hex, "8d406b90");
    }
}
