//! The traffic coordinator.

use fleet_core::{AgentId, CoreResult, DenyReason, Grant, LaneId, Resource, SimTime, VertexId};
use fleet_graph::{NavGraph, Path};
use tracing::debug;

use crate::{Reservation, ReservationTable, TrafficConfig};

/// Single authority for "may this agent use this resource now".
///
/// Instantaneous occupancy is read from and written to the [`NavGraph`];
/// time windows are kept in the coordinator's own [`ReservationTable`].
#[derive(Default)]
pub struct TrafficCoordinator {
    config: TrafficConfig,
    table:  ReservationTable,
}

impl TrafficCoordinator {
    pub fn new(config: TrafficConfig) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self { config, table: ReservationTable::new() })
    }

    pub fn config(&self) -> &TrafficConfig {
        &self.config
    }

    pub fn reservations(&self) -> &ReservationTable {
        &self.table
    }

    // ── Instantaneous layer ───────────────────────────────────────────────

    /// `true` if `lane` is unoccupied or occupied by `agent`.
    pub fn can_use_lane(&self, graph: &NavGraph, agent: AgentId, lane: LaneId) -> bool {
        graph.lane(lane).is_some() && graph.lane_occupant(lane).is_none_or(|a| a == agent)
    }

    /// `true` if `v` is unoccupied or occupied by `agent`.
    pub fn can_use_vertex(&self, graph: &NavGraph, agent: AgentId, v: VertexId) -> bool {
        graph.is_valid_vertex(v) && graph.vertex_occupant(v).is_none_or(|a| a == agent)
    }

    // ── Time-windowed layer ───────────────────────────────────────────────

    /// Book the lane `from → to` until `expected_arrival` plus the safety
    /// gap.  Denied while another agent's window on it is open.
    pub fn reserve_lane(
        &mut self,
        graph: &NavGraph,
        agent: AgentId,
        from: VertexId,
        to: VertexId,
        now: SimTime,
        expected_arrival: SimTime,
    ) -> Grant {
        let Some(lane) = graph.lane_between(from, to) else {
            return Grant::Denied(DenyReason::UnknownResource(Resource::Vertex(to)));
        };
        let until = expected_arrival + self.config.safety_gap();
        self.table.book(Resource::Lane(lane), agent, until, now)
    }

    /// Book vertex `v` until `until`.
    pub fn reserve_vertex_window(
        &mut self,
        graph: &NavGraph,
        agent: AgentId,
        v: VertexId,
        now: SimTime,
        until: SimTime,
    ) -> Grant {
        if !graph.is_valid_vertex(v) {
            return Grant::Denied(DenyReason::UnknownResource(Resource::Vertex(v)));
        }
        self.table.book(Resource::Vertex(v), agent, until, now)
    }

    pub fn reservation(&self, res: Resource) -> Option<Reservation> {
        self.table.get(res)
    }

    /// Check every lane of `path` against the window table.
    ///
    /// Denies on the first lane whose forward window is held open by another
    /// agent, or whose reverse lane carries any record of another agent.
    pub fn check_path_conflicts(
        &self,
        graph: &NavGraph,
        agent: AgentId,
        path: &Path,
        now: SimTime,
    ) -> Grant {
        for (from, to) in path.pairs() {
            let Some(lane) = graph.lane_between(from, to) else {
                return Grant::Denied(DenyReason::UnknownResource(Resource::Vertex(to)));
            };
            if let Err(reason) = self.window_check(graph, agent, lane, now) {
                return Grant::Denied(reason);
            }
        }
        Grant::Granted
    }

    fn window_check(
        &self,
        graph: &NavGraph,
        agent: AgentId,
        lane: LaneId,
        now: SimTime,
    ) -> Result<(), DenyReason> {
        if let Some(r) = self
            .table
            .active(Resource::Lane(lane), now)
            .filter(|r| r.agent != agent)
        {
            return Err(DenyReason::Reserved { resource: Resource::Lane(lane), by: r.agent, until: r.until });
        }
        if let Some(r) = graph
            .reverse_of(lane)
            .and_then(|rev| self.table.get(Resource::Lane(rev)))
            .filter(|r| r.agent != agent)
        {
            return Err(DenyReason::HeadOn { lane, by: r.agent });
        }
        Ok(())
    }

    // ── Admission ─────────────────────────────────────────────────────────

    /// Admit `agent` onto `lane`.
    ///
    /// Granted only when the lane is not blocked, neither it nor its reverse
    /// nor its destination vertex is occupied by another agent, and (with
    /// time windows on) the window checks pass.  On grant the lane and its
    /// destination vertex are occupied in `graph` and a window is booked
    /// until `expected_arrival` plus the safety gap.
    pub fn request_lane(
        &mut self,
        graph: &mut NavGraph,
        agent: AgentId,
        lane: LaneId,
        now: SimTime,
        expected_arrival: SimTime,
    ) -> Grant {
        let grant = self.admit(graph, agent, lane, now, expected_arrival).into();
        match grant {
            Grant::Granted => debug!(%agent, %lane, "lane granted"),
            Grant::Denied(reason) => debug!(%agent, %lane, %reason, "lane denied"),
        }
        grant
    }

    fn admit(
        &mut self,
        graph: &mut NavGraph,
        agent: AgentId,
        lane: LaneId,
        now: SimTime,
        expected_arrival: SimTime,
    ) -> Result<(), DenyReason> {
        let to = graph
            .lane(lane)
            .map(|l| l.to)
            .ok_or(DenyReason::UnknownResource(Resource::Lane(lane)))?;

        if graph.is_blocked(lane) {
            return Err(DenyReason::Blocked(lane));
        }
        if let Some(by) = graph.lane_occupant(lane).filter(|&a| a != agent) {
            return Err(DenyReason::Occupied { resource: Resource::Lane(lane), by });
        }
        if let Some(by) = graph.vertex_occupant(to).filter(|&a| a != agent) {
            return Err(DenyReason::Occupied { resource: Resource::Vertex(to), by });
        }
        if let Some(by) = graph
            .reverse_of(lane)
            .and_then(|rev| graph.lane_occupant(rev))
            .filter(|&a| a != agent)
        {
            return Err(DenyReason::HeadOn { lane, by });
        }
        if self.config.time_windows {
            self.window_check(graph, agent, lane, now)?;
        }

        graph.reserve_lane_id(lane, agent).into_result()?;
        if let Err(reason) = graph.reserve_vertex(to, agent).into_result() {
            // Unreachable after the occupant check above; undo the lane.
            let _ = graph.release_lane_id(lane, agent);
            return Err(reason);
        }
        if self.config.time_windows {
            let until = expected_arrival + self.config.safety_gap();
            self.table.book(Resource::Lane(lane), agent, until, now).into_result()?;
        }
        Ok(())
    }

    // ── Release & bookkeeping ─────────────────────────────────────────────

    /// Free the lane's instantaneous occupancy.  Its window is left to expire.
    pub fn release_lane(&mut self, graph: &mut NavGraph, agent: AgentId, lane: LaneId) -> Grant {
        graph.release_lane_id(lane, agent)
    }

    /// Free `agent`'s occupancy of `v`.
    pub fn leave_vertex(&mut self, graph: &mut NavGraph, agent: AgentId, v: VertexId) -> Grant {
        graph.release_vertex(v, agent)
    }

    /// End-of-tick bookkeeping: drop windows that closed at or before `now`.
    pub fn end_tick(&mut self, now: SimTime) -> usize {
        let purged = self.table.purge_expired(now);
        if purged > 0 {
            debug!(purged, %now, "reservation windows expired");
        }
        purged
    }
}
