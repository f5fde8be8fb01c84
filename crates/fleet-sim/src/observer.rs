//! Fleet observer trait for progress reporting and event logging.

use fleet_core::{AgentId, SimClock, SimTime, Tick, VertexId};
use fleet_robot::TransitionEvent;
use fleet_traffic::Conflict;

/// Per-tick state counts handed to [`FleetObserver::on_tick_end`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickSummary {
    pub tick:      Tick,
    pub time:      SimTime,
    pub moving:    usize,
    pub waiting:   usize,
    pub idle:      usize,
    pub complete:  usize,
    pub charging:  usize,
    /// Conflicts found by this tick's audit; 0 on ticks without one.
    pub conflicts: usize,
    /// Transitions emitted during the tick.
    pub events:    usize,
}

impl TickSummary {
    pub fn robots(&self) -> usize {
        self.moving + self.waiting + self.idle + self.complete + self.charging
    }
}

/// Callbacks invoked by the fleet at key points of its tick loop and on
/// operator commands.
///
/// All methods default to no-ops.
///
/// # Example: waiting counter
///
/// ```rust,ignore
/// struct Peak { waiting: usize }
///
/// impl FleetObserver for Peak {
///     fn on_tick_end(&mut self, _tick: Tick, summary: &TickSummary) {
///         self.waiting = self.waiting.max(summary.waiting);
///     }
/// }
/// ```
pub trait FleetObserver {
    /// Called after the clock advanced, before any robot is updated.
    fn on_tick_start(&mut self, _clock: &SimClock) {}

    fn on_spawn(&mut self, _agent: AgentId, _at: VertexId) {}

    /// Called for every state transition, including those caused by
    /// `assign_task`, `pause` and `resume` between ticks.
    fn on_transition(&mut self, _event: &TransitionEvent) {}

    /// Called only on audit ticks that found at least one conflict.
    fn on_conflicts(&mut self, _tick: Tick, _conflicts: &[Conflict]) {}

    fn on_tick_end(&mut self, _tick: Tick, _summary: &TickSummary) {}
}

/// A [`FleetObserver`] that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl FleetObserver for NoopObserver {}

impl<O: FleetObserver + ?Sized> FleetObserver for &mut O {
    fn on_tick_start(&mut self, clock: &SimClock) {
        (**self).on_tick_start(clock);
    }
    fn on_spawn(&mut self, agent: AgentId, at: VertexId) {
        (**self).on_spawn(agent, at);
    }
    fn on_transition(&mut self, event: &TransitionEvent) {
        (**self).on_transition(event);
    }
    fn on_conflicts(&mut self, tick: Tick, conflicts: &[Conflict]) {
        (**self).on_conflicts(tick, conflicts);
    }
    fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
        (**self).on_tick_end(tick, summary);
    }
}

impl<O: FleetObserver + ?Sized> FleetObserver for Box<O> {
    fn on_tick_start(&mut self, clock: &SimClock) {
        (**self).on_tick_start(clock);
    }
    fn on_spawn(&mut self, agent: AgentId, at: VertexId) {
        (**self).on_spawn(agent, at);
    }
    fn on_transition(&mut self, event: &TransitionEvent) {
        (**self).on_transition(event);
    }
    fn on_conflicts(&mut self, tick: Tick, conflicts: &[Conflict]) {
        (**self).on_conflicts(tick, conflicts);
    }
    fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
        (**self).on_tick_end(tick, summary);
    }
}
