//! Vertex/lane occupancy and destination claims.
//!
//! Every method here follows the same contract: reserving a resource the
//! caller already holds is granted again (idempotent); reserving one held by
//! somebody else is denied; releasing something the caller does not hold is a
//! no-op that reports [`DenyReason::NotOwner`].

use tracing::debug;

use fleet_core::{AgentId, DenyReason, Grant, LaneId, Resource, VertexId};

use crate::{GraphError, GraphResult, NavGraph, Path};

impl NavGraph {
    // ── Vertices ──────────────────────────────────────────────────────────

    /// Claim exclusive occupancy of `v` for `agent`.
    pub fn reserve_vertex(&mut self, v: VertexId, agent: AgentId) -> Grant {
        let Some(slot) = self.vertex_occupant.get_mut(v.index()) else {
            return Grant::Denied(DenyReason::UnknownResource(Resource::Vertex(v)));
        };
        match *slot {
            None => {
                *slot = Some(agent);
                debug!(%agent, vertex = %v, "vertex reserved");
                Grant::Granted
            }
            Some(holder) if holder == agent => Grant::Granted,
            Some(holder) => Grant::Denied(DenyReason::Occupied {
                resource: Resource::Vertex(v),
                by:       holder,
            }),
        }
    }

    /// Free `v` if `agent` holds it.
    pub fn release_vertex(&mut self, v: VertexId, agent: AgentId) -> Grant {
        match self.vertex_occupant.get_mut(v.index()) {
            None => Grant::Denied(DenyReason::UnknownResource(Resource::Vertex(v))),
            Some(slot) if *slot == Some(agent) => {
                *slot = None;
                debug!(%agent, vertex = %v, "vertex released");
                Grant::Granted
            }
            Some(_) => Grant::Denied(DenyReason::NotOwner(Resource::Vertex(v))),
        }
    }

    #[inline]
    pub fn vertex_occupant(&self, v: VertexId) -> Option<AgentId> {
        self.vertex_occupant.get(v.index()).copied().flatten()
    }

    // ── Lanes ─────────────────────────────────────────────────────────────

    /// Claim the directed lane `from → to` for `agent`.
    pub fn reserve_lane(&mut self, from: VertexId, to: VertexId, agent: AgentId) -> Grant {
        match self.lane_between(from, to) {
            Some(lane) => self.reserve_lane_id(lane, agent),
            None => Grant::Denied(DenyReason::UnknownResource(Resource::Vertex(to))),
        }
    }

    /// Free the directed lane `from → to` if `agent` holds it.
    pub fn release_lane(&mut self, from: VertexId, to: VertexId, agent: AgentId) -> Grant {
        match self.lane_between(from, to) {
            Some(lane) => self.release_lane_id(lane, agent),
            None => Grant::Denied(DenyReason::UnknownResource(Resource::Vertex(to))),
        }
    }

    pub fn reserve_lane_id(&mut self, lane: LaneId, agent: AgentId) -> Grant {
        let Some(slot) = self.lane_occupant.get_mut(lane.index()) else {
            return Grant::Denied(DenyReason::UnknownResource(Resource::Lane(lane)));
        };
        match *slot {
            Some(holder) if holder == agent => Grant::Granted,
            Some(holder) => Grant::Denied(DenyReason::Occupied {
                resource: Resource::Lane(lane),
                by:       holder,
            }),
            None if self.lane_blocked[lane.index()] => Grant::Denied(DenyReason::Blocked(lane)),
            None => {
                *slot = Some(agent);
                debug!(%agent, %lane, "lane reserved");
                Grant::Granted
            }
        }
    }

    pub fn release_lane_id(&mut self, lane: LaneId, agent: AgentId) -> Grant {
        match self.lane_occupant.get_mut(lane.index()) {
            None => Grant::Denied(DenyReason::UnknownResource(Resource::Lane(lane))),
            Some(slot) if *slot == Some(agent) => {
                *slot = None;
                debug!(%agent, %lane, "lane released");
                Grant::Granted
            }
            Some(_) => Grant::Denied(DenyReason::NotOwner(Resource::Lane(lane))),
        }
    }

    #[inline]
    pub fn lane_occupant(&self, lane: LaneId) -> Option<AgentId> {
        self.lane_occupant.get(lane.index()).copied().flatten()
    }

    /// All currently occupied lanes with their holders, in lane order.
    pub fn occupied_lanes(&self) -> Vec<(LaneId, AgentId)> {
        self.lane_occupant
            .iter()
            .enumerate()
            .filter_map(|(i, o)| o.map(|a| (LaneId(i as u32), a)))
            .collect()
    }

    /// Mark the lane `from → to` blocked or unblocked.  Blocking does not
    /// evict a current occupant; it only stops new reservations and routing.
    pub fn set_lane_blocked(&mut self, from: VertexId, to: VertexId, blocked: bool) -> GraphResult<()> {
        let lane = self
            .lane_between(from, to)
            .ok_or(GraphError::LaneNotFound { from, to })?;
        self.lane_blocked[lane.index()] = blocked;
        debug!(%lane, blocked, "lane block flag changed");
        Ok(())
    }

    #[inline]
    pub fn is_blocked(&self, lane: LaneId) -> bool {
        self.lane_blocked.get(lane.index()).copied().unwrap_or(false)
    }

    // ── Destination claims ────────────────────────────────────────────────

    /// Bind `v` as `agent`'s destination.
    pub fn claim_destination(&mut self, v: VertexId, agent: AgentId) -> Grant {
        if !self.is_valid_vertex(v) {
            return Grant::Denied(DenyReason::UnknownResource(Resource::Vertex(v)));
        }
        match self.destinations.get(&v) {
            Some(&owner) if owner != agent => {
                Grant::Denied(DenyReason::DestinationClaimed { vertex: v, by: owner })
            }
            _ => {
                self.destinations.insert(v, agent);
                Grant::Granted
            }
        }
    }

    /// Drop the claim on `path`'s goal if `agent` owns it.
    pub fn clear_destination(&mut self, path: &Path, agent: AgentId) -> Grant {
        self.clear_destination_vertex(path.goal(), agent)
    }

    /// Drop the claim on `v` if `agent` owns it.
    pub fn clear_destination_vertex(&mut self, v: VertexId, agent: AgentId) -> Grant {
        match self.destinations.get(&v) {
            Some(&owner) if owner == agent => {
                self.destinations.remove(&v);
                Grant::Granted
            }
            _ => Grant::Denied(DenyReason::NotOwner(Resource::Vertex(v))),
        }
    }

    #[inline]
    pub fn destination_owner(&self, v: VertexId) -> Option<AgentId> {
        self.destinations.get(&v).copied()
    }

    /// All active destination claims, in vertex order.
    pub fn destination_claims(&self) -> impl Iterator<Item = (VertexId, AgentId)> + '_ {
        self.destinations.iter().map(|(&v, &a)| (v, a))
    }

    /// `true` if `v` is neither occupied nor claimed by anyone but `agent`.
    pub fn vertex_available(&self, v: VertexId, agent: AgentId) -> bool {
        if !self.is_valid_vertex(v) {
            return false;
        }
        let free = self.vertex_occupant(v).is_none_or(|a| a == agent);
        let unclaimed = self.destination_owner(v).is_none_or(|a| a == agent);
        free && unclaimed
    }
}
