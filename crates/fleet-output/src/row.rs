//! Plain data rows written by event writers.

use fleet_robot::TransitionEvent;
use fleet_sim::TickSummary;

/// One robot state transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventRow {
    pub tick:      u64,
    pub time_secs: f64,
    pub agent:     u32,
    pub from:      &'static str,
    pub to:        &'static str,
    pub reason:    &'static str,
}

impl From<&TransitionEvent> for EventRow {
    fn from(e: &TransitionEvent) -> Self {
        Self {
            tick:      e.tick.0,
            time_secs: e.time.as_secs_f64(),
            agent:     e.agent.index() as u32,
            from:      e.from.as_str(),
            to:        e.to.as_str(),
            reason:    e.reason.as_str(),
        }
    }
}

/// State counts at the end of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryRow {
    pub tick:      u64,
    pub time_secs: f64,
    pub moving:    u64,
    pub waiting:   u64,
    pub idle:      u64,
    pub complete:  u64,
    pub charging:  u64,
    pub conflicts: u64,
}

impl From<&TickSummary> for SummaryRow {
    fn from(s: &TickSummary) -> Self {
        Self {
            tick:      s.tick.0,
            time_secs: s.time.as_secs_f64(),
            moving:    s.moving as u64,
            waiting:   s.waiting as u64,
            idle:      s.idle as u64,
            complete:  s.complete as u64,
            charging:  s.charging as u64,
            conflicts: s.conflicts as u64,
        }
    }
}
