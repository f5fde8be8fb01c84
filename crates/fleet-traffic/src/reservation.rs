//! Time-windowed reservations with an ordered expiry queue.
//!
//! # Expiry
//!
//! Each booking is also pushed onto a `BTreeMap<SimTime, Vec<Resource>>`
//! keyed by its expiry.  `purge_expired(now)` pops only the due keys.
//!
//! Re-booking a resource leaves its old queue entry in place.  When that entry
//! comes due the purge compares it with the live record and skips it if the
//! record was extended.

use std::collections::BTreeMap;

use fleet_core::{AgentId, DenyReason, Grant, Resource, SimTime};

#[cfg(feature = "fx-hash")]
type ResourceMap<V> = rustc_hash::FxHashMap<Resource, V>;
#[cfg(not(feature = "fx-hash"))]
type ResourceMap<V> = std::collections::HashMap<Resource, V>;

/// One agent's booking of one resource until `until` (exclusive).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reservation {
    pub agent: AgentId,
    pub until: SimTime,
}

impl Reservation {
    /// A window is open while `now < until`.
    #[inline]
    pub fn is_active(&self, now: SimTime) -> bool {
        now < self.until
    }
}

/// At most one reservation record per resource.
#[derive(Default)]
pub struct ReservationTable {
    entries: ResourceMap<Reservation>,
    expiry:  BTreeMap<SimTime, Vec<Resource>>,
}

impl ReservationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The record for `res`, open or not yet purged.
    pub fn get(&self, res: Resource) -> Option<Reservation> {
        self.entries.get(&res).copied()
    }

    /// The record for `res` if its window is still open at `now`.
    pub fn active(&self, res: Resource, now: SimTime) -> Option<Reservation> {
        self.get(res).filter(|r| r.is_active(now))
    }

    /// Book `res` for `agent` until `until`.
    ///
    /// Denied while another agent's window is open.  The caller's own booking
    /// is replaced, which may shorten or extend it.
    pub fn book(&mut self, res: Resource, agent: AgentId, until: SimTime, now: SimTime) -> Grant {
        if let Some(held) = self.active(res, now).filter(|h| h.agent != agent) {
            return Grant::Denied(DenyReason::Reserved { resource: res, by: held.agent, until: held.until });
        }
        self.entries.insert(res, Reservation { agent, until });
        self.expiry.entry(until).or_default().push(res);
        Grant::Granted
    }

    /// Drop `agent`'s record for `res`.
    pub fn cancel(&mut self, res: Resource, agent: AgentId) -> Grant {
        match self.entries.get(&res) {
            Some(r) if r.agent == agent => {
                self.entries.remove(&res);
                Grant::Granted
            }
            _ => Grant::Denied(DenyReason::NotOwner(res)),
        }
    }

    /// Remove every record whose window closed at or before `now`.
    /// Returns the number removed.
    pub fn purge_expired(&mut self, now: SimTime) -> usize {
        let mut removed = 0;
        while let Some(entry) = self.expiry.first_entry() {
            if *entry.key() > now {
                break;
            }
            let (due, resources) = entry.remove_entry();
            for res in resources {
                if self.entries.get(&res).is_some_and(|r| r.until == due) {
                    self.entries.remove(&res);
                    removed += 1;
                }
            }
        }
        removed
    }

    /// All live records, in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (Resource, Reservation)> + '_ {
        self.entries.iter().map(|(&res, &r)| (res, r))
    }

    /// Number of distinct expiry instants still queued.
    pub fn pending_expiries(&self) -> usize {
        self.expiry.len()
    }
}
