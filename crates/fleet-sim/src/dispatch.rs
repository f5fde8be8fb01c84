//! Random task dispatch for unattended runs.

use fleet_core::{AgentId, VertexId};
use fleet_graph::Router;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::{Fleet, FleetError, FleetObserver, FleetResult};

/// Seeded source of random spawn points and task targets.
///
/// The same seed against the same graph and fleet history produces the same
/// choices.
#[derive(Debug, Clone)]
pub struct RandomDispatcher {
    rng: SmallRng,
}

impl RandomDispatcher {
    pub fn new(seed: u64) -> Self {
        Self { rng: SmallRng::seed_from_u64(seed) }
    }

    /// Spawn up to `n` robots on distinct random free vertices.  Stops early
    /// when the graph runs out of free vertices.
    pub fn scatter<R: Router, O: FleetObserver>(
        &mut self,
        fleet: &mut Fleet<R, O>,
        n: usize,
    ) -> FleetResult<Vec<AgentId>> {
        let mut free: Vec<VertexId> = fleet
            .graph()
            .vertices()
            .map(|(v, _)| v)
            .filter(|&v| fleet.graph().vertex_occupant(v).is_none())
            .collect();
        free.shuffle(&mut self.rng);

        free.into_iter().take(n).map(|v| fleet.spawn(v)).collect()
    }

    /// Give every robot that accepts a task a random reachable target that
    /// no other robot stands on or has claimed.  Returns the assignments made.
    pub fn dispatch<R: Router, O: FleetObserver>(&mut self, fleet: &mut Fleet<R, O>) -> Vec<(AgentId, VertexId)> {
        let ready: Vec<(AgentId, VertexId)> = fleet
            .robots()
            .filter(|r| r.state().accepts_task())
            .map(|r| (r.id(), r.current_vertex()))
            .collect();

        let mut assigned = Vec::new();
        for (agent, at) in ready {
            let mut candidates: Vec<VertexId> = fleet
                .graph()
                .vertices()
                .map(|(v, _)| v)
                .filter(|&v| v != at && fleet.graph().vertex_available(v, agent))
                .collect();
            candidates.shuffle(&mut self.rng);

            for target in candidates {
                match fleet.assign_task(agent, target) {
                    Ok(()) => {
                        assigned.push((agent, target));
                        break;
                    }
                    Err(FleetError::Task(err)) => {
                        debug!(%agent, %target, %err, "dispatch candidate rejected");
                    }
                    Err(err) => {
                        debug!(%agent, %err, "robot skipped by dispatcher");
                        break;
                    }
                }
            }
        }
        assigned
    }
}
