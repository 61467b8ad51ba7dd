//! A recently-seen set of 24-bit ICAO addresses with expiry (spec §2/§4.1).
//!
//! Naked short Mode S replies (DF 0/4/5/11/16/20/21) carry no clear address
//! field: only a CRC residue overlaid with the transmitting aircraft's ICAO
//! address. Verifying — or repairing — such a frame therefore requires a
//! *claimed* address to test the residue against. This set holds exactly
//! that: every address confirmed by a self-validating frame (a DF17/18
//! squitter whose own CRC checked out to zero), aged out after
//! `expiry_secs` of silence.

use std::collections::HashMap;

/// Default aging window: long enough to carry a claimed address across a
/// few seconds of naked-frame traffic between squitters from the same
/// aircraft, short enough that a departed aircraft's address stops being
/// usable as a repair target.
pub const DEFAULT_EXPIRY_SECS: f64 = 60.0;

/// Recently-confirmed 24-bit ICAO addresses, each stamped with the time it
/// was last confirmed.
#[derive(Debug, Clone)]
pub struct RecentIcaoSet {
    seen: HashMap<u32, f64>,
    expiry_secs: f64,
}

impl Default for RecentIcaoSet {
    fn default() -> Self {
        RecentIcaoSet::new(DEFAULT_EXPIRY_SECS)
    }
}

impl RecentIcaoSet {
    pub fn new(expiry_secs: f64) -> RecentIcaoSet {
        RecentIcaoSet {
            seen: HashMap::new(),
            expiry_secs,
        }
    }

    /// Records (or refreshes) `icao` as confirmed at `now`.
    pub fn insert(&mut self, icao: u32, now: f64) {
        self.seen.insert(icao, now);
    }

    /// True if `icao` was confirmed within `expiry_secs` of `now`.
    pub fn contains(&self, icao: u32, now: f64) -> bool {
        match self.seen.get(&icao) {
            Some(&last) => now - last <= self.expiry_secs,
            None => false,
        }
    }

    /// Drops every address last confirmed more than `expiry_secs` before
    /// `now`. Cheap enough to call on every buffer processed.
    pub fn expire(&mut self, now: f64) {
        let expiry_secs = self.expiry_secs;
        self.seen.retain(|_, &mut last| now - last <= expiry_secs);
    }

    /// Every address currently eligible, used to brute-force a naked short
    /// frame's claimed address against the handful of aircraft heard
    /// recently.
    pub fn addresses(&self, now: f64) -> impl Iterator<Item = u32> + '_ {
        let expiry_secs = self.expiry_secs;
        self.seen
            .iter()
            .filter(move |&(_, &last)| now - last <= expiry_secs)
            .map(|(&icao, _)| icao)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn an_address_is_usable_only_until_it_expires() {
        let mut set = RecentIcaoSet::new(10.0);
        set.insert(0x48_4175, 100.0);
        assert!(set.contains(0x48_4175, 105.0));
        assert!(!set.contains(0x48_4175, 111.0));
    }

    #[test]
    fn expire_drops_stale_entries_from_iteration() {
        let mut set = RecentIcaoSet::new(10.0);
        set.insert(0x11_1111, 0.0);
        set.insert(0x22_2222, 50.0);
        set.expire(55.0);
        let remaining: Vec<u32> = set.addresses(55.0).collect();
        assert_eq!(remaining, vec![0x22_2222]);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn an_unseen_address_is_never_contained() {
        let set = RecentIcaoSet::new(60.0);
        assert!(!set.contains(0x12_3456, 0.0));
    }
}
