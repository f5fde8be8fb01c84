//! Read-only occupancy audit.
//!
//! Cross-checks what each agent believes it holds against the occupancy
//! table in the graph.  Findings are reported, never repaired.

use std::fmt;

use fleet_core::{AgentId, LaneId};
use fleet_graph::NavGraph;
use tracing::warn;

use crate::TrafficCoordinator;

/// A disagreement between an agent's declared lane and the occupancy table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Conflict {
    /// `intruder` claims to be on `lane`, which the table gives to `holder`.
    SharedLane { lane: LaneId, holder: AgentId, intruder: AgentId },
    /// `agent` claims to be on `lane`, which the table shows as free.
    Unheld { lane: LaneId, agent: AgentId },
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conflict::SharedLane { lane, holder, intruder } => {
                write!(f, "{intruder} is on {lane} held by {holder}")
            }
            Conflict::Unheld { lane, agent } => write!(f, "{agent} is on unreserved {lane}"),
        }
    }
}

impl TrafficCoordinator {
    /// Audit `agents`, each given as `(id, lane it is currently on)`.
    pub fn detect_conflicts<I>(&self, graph: &NavGraph, agents: I) -> Vec<Conflict>
    where
        I: IntoIterator<Item = (AgentId, Option<LaneId>)>,
    {
        let conflicts: Vec<Conflict> = agents
            .into_iter()
            .filter_map(|(agent, lane)| {
                let lane = lane?;
                match graph.lane_occupant(lane) {
                    Some(holder) if holder == agent => None,
                    Some(holder) => Some(Conflict::SharedLane { lane, holder, intruder: agent }),
                    None => Some(Conflict::Unheld { lane, agent }),
                }
            })
            .collect();

        for c in &conflicts {
            warn!(conflict = %c, "traffic conflict detected");
        }
        conflicts
    }
}
