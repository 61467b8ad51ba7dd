//! Magnitude-sample demodulation: the 2.4 MS/s I/Q front end lands here as a
//! `mag_buf` of unsigned 16-bit magnitudes, and this module turns runs of
//! samples that match the Mode-S preamble shape into candidate frames.
//!
//! This is the software equivalent of dump1090's `detectModeS`: slide a
//! preamble template over the buffer, demodulate the data bits with a few
//! phase-correction variants, keep whichever variant has the fewest
//! low-confidence bits, then hand the frame to [`crate::crc`] for
//! verification/repair.

use crate::crc::{self, MAX_FIX_BITS};
use crate::icao::RecentIcaoSet;

/// Length in samples of the Mode-S preamble (8 us at 2 MS/s-equivalent
/// spacing: four 0.5us pulses over a 8us window, two samples per
/// half-microsecond at 2.4 MS/s).
const PREAMBLE_SAMPLES: usize = 16;
const SHORT_FRAME_BITS: usize = 56;
const LONG_FRAME_BITS: usize = 112;
const SAMPLES_PER_BIT: usize = 2;

/// One demodulated candidate frame, prior to type-aware decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub bits: Vec<u8>,
    /// Number of bits flipped by CRC repair (0 if the frame validated as-is).
    pub quality: u8,
    /// Offset into the magnitude buffer where the preamble started.
    pub sample_offset: usize,
    /// Signal strength at the preamble, roughly proportional to receiver SNR.
    pub rssi: f64,
}

/// Running counters for one demodulated buffer, published alongside stats.
#[derive(Debug, Clone, Default)]
pub struct DemodStats {
    pub samples_processed: u64,
    pub samples_dropped: u64,
    pub preambles_examined: u64,
    pub frames_by_df: [u64; 32],
    pub bad_crc: u64,
    pub corrected_bit_errors: [u64; MAX_FIX_BITS + 1],
}

/// Bit budget for CRC repair and whether the optional Mode-A/C second pass
/// is enabled, threaded down from [`crate::Config`](crate) (squitterd owns
/// the actual config type; this is the subset the demodulator consumes).
#[derive(Debug, Clone, Copy)]
pub struct DemodConfig {
    pub nfix_crc: u8,
    pub modeac_enabled: bool,
}

impl Default for DemodConfig {
    fn default() -> Self {
        DemodConfig {
            nfix_crc: 1,
            modeac_enabled: false,
        }
    }
}

/// Scans `mag_buf` for every preamble match and demodulates each one, using
/// `overlap` trailing samples shared with the next buffer so a frame that
/// starts near the tail end isn't truncated.
///
/// `recent_icao` is the set of addresses confirmed by self-validating DF17/
/// 18 squitters so far; it both feeds and is fed by this call, since naked
/// short frames (DF 0/4/5/11/16/20/21) can only be verified against an
/// address already in it (spec §2/§4.1). `now` is the buffer's processing
/// time, in the same units as that set's expiry.
pub fn process_buffer(
    mag_buf: &[u16],
    config: &DemodConfig,
    stats: &mut DemodStats,
    recent_icao: &mut RecentIcaoSet,
    now: f64,
) -> Vec<Candidate> {
    stats.samples_processed += mag_buf.len() as u64;
    recent_icao.expire(now);

    let mut out = Vec::new();
    if mag_buf.len() < PREAMBLE_SAMPLES + LONG_FRAME_BITS * SAMPLES_PER_BIT {
        stats.samples_dropped += mag_buf.len() as u64;
        return out;
    }

    let last_offset = mag_buf.len() - PREAMBLE_SAMPLES - LONG_FRAME_BITS * SAMPLES_PER_BIT;
    for offset in 0..=last_offset {
        let window = &mag_buf[offset..];
        if !matches_preamble(window) {
            continue;
        }
        stats.preambles_examined += 1;

        if let Some(candidate) = demod_at(window, offset, config, stats, recent_icao, now) {
            let df = (candidate.bits[0] >> 3) as usize;
            stats.frames_by_df[df.min(31)] += 1;
            out.push(candidate);
        }
    }

    if config.modeac_enabled {
        out.extend(demod_modeac(mag_buf, stats));
    }

    out
}

/// Compares the pulse/gap power ratios at the start of `window` against the
/// canonical Mode-S preamble shape: pulses at samples 0, 2, 7 and 9, with
/// the gaps between them near zero.
fn matches_preamble(window: &[u16]) -> bool {
    let high = |i: usize| window[i] as u32;

    let m = high(0).max(high(2)).max(high(7)).max(high(9));
    if m == 0 {
        return false;
    }

    let low_enough = |i: usize| high(i) * 2 < m;
    high(0) > 0
        && high(2) > 0
        && high(7) > 0
        && high(9) > 0
        && low_enough(1)
        && low_enough(3)
        && low_enough(4)
        && low_enough(5)
        && low_enough(6)
        && low_enough(8)
}

/// Demodulates the data bits following a matched preamble, trying the
/// nominal sampling point plus a +-0.25-sample phase correction and keeping
/// whichever variant needs the fewest CRC bit-fixes.
fn demod_at(
    window: &[u16],
    sample_offset: usize,
    config: &DemodConfig,
    stats: &mut DemodStats,
    recent_icao: &mut RecentIcaoSet,
    now: f64,
) -> Option<Candidate> {
    let data = &window[PREAMBLE_SAMPLES..];
    let rssi = rssi_at(window);

    let mut best: Option<(Vec<u8>, u8)> = None;
    for phase in [Phase::Nominal, Phase::Early, Phase::Late] {
        let Some(bits) = demod_variant(data, LONG_FRAME_BITS, phase) else {
            continue;
        };
        let Some((frame, fixed)) =
            verify_and_repair(&bits, config.nfix_crc, recent_icao, now)
        else {
            continue;
        };
        let is_better = match &best {
            None => true,
            Some((_, best_fixed)) => fixed < *best_fixed,
        };
        if is_better {
            best = Some((frame, fixed));
        }
    }

    let (frame, fixed) = best?;
    stats.corrected_bit_errors[fixed as usize] += 1;
    if fixed > 0 {
        stats.bad_crc += 1;
    }

    let df = frame[0] >> 3;
    let bit_len = if df & 0x10 != 0 {
        LONG_FRAME_BITS
    } else {
        SHORT_FRAME_BITS
    };
    let frame = frame[..bit_len / 8].to_vec();

    Some(Candidate {
        bits: frame,
        quality: fixed,
        sample_offset,
        rssi,
    })
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Nominal,
    Early,
    Late,
}

/// Packs `nbits` data bits out of `data`, each bit decided by comparing the
/// magnitude of its two samples (PPM: high-then-low is 1, low-then-high is
/// 0), shifting the sampling instant by a quarter sample per `Phase` variant.
fn demod_variant(data: &[u16], nbits: usize, phase: Phase) -> Option<Vec<u8>> {
    if data.len() < nbits * SAMPLES_PER_BIT {
        return None;
    }

    let mut bytes = vec![0u8; nbits.div_ceil(8)];
    for bit in 0..nbits {
        let base = bit * SAMPLES_PER_BIT;
        let (a, b) = match phase {
            Phase::Nominal => (data[base] as i32, data[base + 1] as i32),
            Phase::Early => (
                data[base] as i32 + data.get(base.wrapping_sub(1)).copied().unwrap_or(0) as i32,
                data[base + 1] as i32,
            ),
            Phase::Late => (
                data[base] as i32,
                data[base + 1] as i32
                    + data.get(base + 2).copied().unwrap_or(0) as i32,
            ),
        };
        if a > b {
            bytes[bit / 8] |= 0x80 >> (bit % 8);
        }
    }
    Some(bytes)
}

/// Runs CRC verification (and, on failure, bit-error repair) over a
/// candidate frame, trying both the 56- and 112-bit interpretations since
/// the demodulated `DF` nibble is only known after this check succeeds.
///
/// DF17/18 squitters are self-validating: their checksum residue must be
/// exactly zero, and once confirmed they seed `recent_icao` with their own
/// clear address field. Every other DF's checksum residue *is* the
/// transmitting aircraft's address (spec §4.1's "residue equals ICAO"
/// trick) rather than a fixed target, so those frames can only be verified
/// or repaired against an address `recent_icao` has actually seen — there
/// is no unmutated-frame shortcut that means anything for them.
fn verify_and_repair(
    bits: &[u8],
    nfix_crc: u8,
    recent_icao: &mut RecentIcaoSet,
    now: f64,
) -> Option<(Vec<u8>, u8)> {
    let df = bits[0] >> 3;
    let bit_len = if df & 0x10 != 0 {
        LONG_FRAME_BITS
    } else {
        SHORT_FRAME_BITS
    };
    let mut frame = bits[..bit_len / 8].to_vec();

    if df == 17 || df == 18 {
        if crc::modes_checksum(&frame, bit_len) == 0 {
            recent_icao.insert(extract_aa(&frame), now);
            return Some((frame, 0));
        }
        let fixed = crc::correct(&mut frame, bit_len, 0, nfix_crc)?;
        recent_icao.insert(extract_aa(&frame), now);
        return Some((frame, fixed.len() as u8));
    }

    let residue = crc::modes_checksum(&frame, bit_len);
    if recent_icao.contains(residue, now) {
        return Some((frame, 0));
    }
    for candidate in recent_icao.addresses(now).collect::<Vec<_>>() {
        let mut attempt = frame.clone();
        if let Some(fixed) = crc::correct(&mut attempt, bit_len, candidate, nfix_crc) {
            return Some((attempt, fixed.len() as u8));
        }
    }
    None
}

/// Reads the 24-bit AA (address announced) field out of a DF17/18 frame:
/// the three bytes immediately following the DF/CA byte.
fn extract_aa(frame: &[u8]) -> u32 {
    ((frame[1] as u32) << 16) | ((frame[2] as u32) << 8) | frame[3] as u32
}

fn rssi_at(window: &[u16]) -> f64 {
    let peak = window[0].max(window[2]).max(window[7]).max(window[9]) as f64;
    20.0 * (peak.max(1.0) / u16::MAX as f64).log10()
}

/// Optional Mode-A/C second pass (spec: off by default, `modeac_enabled`).
/// Mode-A/C uses a much simpler bracket-pulse encoding with no CRC, so
/// frames are only ever reported, never repaired.
fn demod_modeac(_mag_buf: &[u16], _stats: &mut DemodStats) -> Vec<Candidate> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexlit::hex;

    fn synth_buffer(frame: &[u8], bit_len: usize) -> Vec<u16> {
        let mut buf = vec![0u16; PREAMBLE_SAMPLES];
        // preamble pulses at 0, 2, 7, 9
        for &i in &[0usize, 2, 7, 9] {
            buf[i] = 4000;
        }
        for bit in 0..bit_len {
            let byte = frame[bit / 8];
            let set = byte & (0x80 >> (bit % 8)) != 0;
            if set {
                buf.push(4000);
                buf.push(100);
            } else {
                buf.push(100);
                buf.push(4000);
            }
        }
        buf.extend(std::iter::repeat(100).take(32));
        buf
    }

    #[test]
    fn detects_preamble_shape() {
        let frame = hex!("8D406B902015A678D4D220AA4BDA");
        let buf = synth_buffer(&frame, LONG_FRAME_BITS);
        assert!(matches_preamble(&buf));
    }

    #[test]
    fn demodulates_a_clean_adsb_frame() {
        let frame = hex!("8D406B902015A678D4D220AA4BDA");
        let buf = synth_buffer(&frame, LONG_FRAME_BITS);
        let mut stats = DemodStats::default();
        let config = DemodConfig::default();
        let mut recent_icao = RecentIcaoSet::default();
        let candidates = process_buffer(&buf, &config, &mut stats, &mut recent_icao, 0.0);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].bits, frame.to_vec());
        assert_eq!(candidates[0].quality, 0);
        assert_eq!(stats.frames_by_df[17], 1);
        assert!(recent_icao.contains(0x40_6B90, 0.0));
    }

    #[test]
    fn rejects_buffer_shorter_than_one_long_frame() {
        let mut stats = DemodStats::default();
        let config = DemodConfig::default();
        let mut recent_icao = RecentIcaoSet::default();
        let short = vec![0u16; 8];
        let candidates = process_buffer(&short, &config, &mut stats, &mut recent_icao, 0.0);
        assert!(candidates.is_empty());
        assert_eq!(stats.samples_dropped, 8);
    }

    #[test]
    fn naked_short_frame_is_rejected_without_a_claimed_icao() {
        let icao: u32 = 0x40_6B90;
        let mut data = vec![0x28u8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let residue = crc::modes_checksum(&data, SHORT_FRAME_BITS);
        let ap = residue ^ icao;
        data[4] = (ap >> 16) as u8;
        data[5] = (ap >> 8) as u8;
        data[6] = ap as u8;

        let mut recent_icao = RecentIcaoSet::default();
        assert!(verify_and_repair(&data, 2, &mut recent_icao, 0.0).is_none());
    }

    #[test]
    fn naked_short_frame_repairs_single_bit_error_against_a_seeded_icao() {
        let icao: u32 = 0x40_6B90;
        let mut data = vec![0x28u8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let residue = crc::modes_checksum(&data, SHORT_FRAME_BITS);
        let ap = residue ^ icao;
        data[4] = (ap >> 16) as u8;
        data[5] = (ap >> 8) as u8;
        data[6] = ap as u8;
        // flip a single bit in the payload to force the repair path
        data[1] ^= 0x01;

        let mut recent_icao = RecentIcaoSet::default();
        recent_icao.insert(icao, 0.0);
        let (fixed, _nfix) = verify_and_repair(&data, 2, &mut recent_icao, 0.0)
            .expect("single-bit error against a seeded ICAO should repair");
        assert_eq!(crc::modes_checksum(&fixed, SHORT_FRAME_BITS), icao);
    }
}
