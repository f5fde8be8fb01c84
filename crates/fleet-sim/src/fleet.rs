//! The fleet and its tick loop.

use std::collections::BTreeMap;
use std::time::Duration;

use fleet_core::{AgentId, LaneId, Point, RobotState, SimClock, VertexId};
use fleet_graph::{NavGraph, Router};
use fleet_robot::{Robot, RobotParams, StepContext, TransitionEvent};
use fleet_traffic::TrafficCoordinator;
use tracing::{debug, info};

use crate::{
    color_for, FleetConfig, FleetError, FleetObserver, FleetResult, IdentityStrategy, NoopObserver,
    TickSummary,
};

/// Snapshot of one robot for status displays.
#[derive(Clone, Debug, PartialEq)]
pub struct RobotStatus {
    pub agent:    AgentId,
    pub state:    RobotState,
    pub vertex:   VertexId,
    pub lane:     Option<LaneId>,
    pub target:   Option<VertexId>,
    pub position: Point,
    /// e.g. `moving`, `waiting (3s)`.
    pub label:    String,
}

/// A fleet of robots sharing one navigation graph.
///
/// Construct with [`FleetBuilder`][crate::FleetBuilder].  The fleet is the
/// only owner of the graph and the coordinator; robots reach them through a
/// [`StepContext`] built fresh for every call.
pub struct Fleet<R: Router, O: FleetObserver = NoopObserver> {
    /// Global tuning, validated at build.
    pub(crate) config:   FleetConfig,
    /// Speed and wait timeout handed to each new robot.
    pub(crate) params:   RobotParams,
    /// Navigation graph; sole owner of occupancy and destination claims.
    pub(crate) graph:    NavGraph,
    /// Admission control and the reservation window table.
    pub(crate) traffic:  TrafficCoordinator,
    /// Path planner used for assignments and replans.
    pub(crate) router:   R,
    /// Every robot, iterated in ascending id order each tick.
    pub(crate) robots:   BTreeMap<AgentId, Robot>,
    /// Picks the id of the next spawned robot.
    pub(crate) identity: Box<dyn IdentityStrategy>,
    /// Tick counter and elapsed simulated time.
    pub(crate) clock:    SimClock,
    /// Notified of every tick, spawn and transition.
    pub(crate) observer: O,
}

impl<R: Router, O: FleetObserver> Fleet<R, O> {
    // ── Commands ──────────────────────────────────────────────────────────

    /// Place a new idle robot on `vertex`.
    ///
    /// # Errors
    ///
    /// - [`FleetError::InvalidReference`] if `vertex` is not in the graph.
    /// - [`FleetError::SpawnOccupied`] if another robot stands there.
    /// - [`FleetError::DuplicateAgent`] if the identity strategy repeats an id.
    pub fn spawn(&mut self, vertex: VertexId) -> FleetResult<AgentId> {
        let position = self
            .graph
            .vertex_position(vertex)
            .ok_or(FleetError::InvalidReference(vertex))?;
        if let Some(by) = self.graph.vertex_occupant(vertex) {
            return Err(FleetError::SpawnOccupied { vertex, by });
        }

        let id = self.identity.next_id();
        if self.robots.contains_key(&id) {
            return Err(FleetError::DuplicateAgent(id));
        }
        if let Err(reason) = self.graph.reserve_vertex(vertex, id).into_result() {
            return Err(FleetError::SpawnOccupied { vertex, by: reason.blocking_agent().unwrap_or(id) });
        }

        let robot = Robot::new(id, color_for(id), vertex, position, self.params);
        self.robots.insert(id, robot);
        info!(agent = %id, %vertex, "robot spawned");
        self.observer.on_spawn(id, vertex);
        Ok(id)
    }

    /// Send `agent` to `target`.
    ///
    /// # Errors
    ///
    /// - [`FleetError::UnknownAgent`] for an id that was never spawned.
    /// - [`FleetError::Busy`] while the robot is moving, waiting or paused.
    /// - [`FleetError::InvalidReference`] for a target outside the graph.
    /// - [`FleetError::Task`] if the target is claimed or unreachable.
    pub fn assign_task(&mut self, agent: AgentId, target: VertexId) -> FleetResult<()> {
        let robot = self.robots.get_mut(&agent).ok_or(FleetError::UnknownAgent(agent))?;
        if robot.state().is_busy() {
            return Err(FleetError::Busy { agent, state: robot.state() });
        }
        let mut ctx = StepContext {
            graph:   &mut self.graph,
            traffic: &mut self.traffic,
            router:  &self.router,
            clock:   self.clock,
        };
        let event = robot.assign_task(target, &mut ctx)?;
        self.observer.on_transition(&event);
        Ok(())
    }

    /// Pause `agent`.  Pausing an already paused robot is a no-op.
    pub fn pause(&mut self, agent: AgentId) -> FleetResult<()> {
        let robot = self.robots.get_mut(&agent).ok_or(FleetError::UnknownAgent(agent))?;
        if let Some(event) = robot.pause(&self.clock) {
            self.observer.on_transition(&event);
        }
        Ok(())
    }

    pub fn resume(&mut self, agent: AgentId) -> FleetResult<()> {
        let robot = self.robots.get_mut(&agent).ok_or(FleetError::UnknownAgent(agent))?;
        let event = robot.resume(&self.clock).map_err(FleetError::from)?;
        self.observer.on_transition(&event);
        Ok(())
    }

    /// Block or unblock the lane `from → to`.  Robots already on it finish
    /// their traversal.
    pub fn set_lane_blocked(&mut self, from: VertexId, to: VertexId, blocked: bool) -> FleetResult<()> {
        Ok(self.graph.set_lane_blocked(from, to, blocked)?)
    }

    // ── Tick loop ─────────────────────────────────────────────────────────

    /// Advance the fleet by one tick of `delta_secs` simulated seconds.
    ///
    /// Negative or non-finite deltas are treated as zero.
    pub fn tick(&mut self, delta_secs: f64) -> TickSummary {
        let delta = Duration::try_from_secs_f64(delta_secs).unwrap_or(Duration::ZERO);
        self.clock.advance(delta);
        self.observer.on_tick_start(&self.clock);

        let mut events = 0;
        let mut ctx = StepContext {
            graph:   &mut self.graph,
            traffic: &mut self.traffic,
            router:  &self.router,
            clock:   self.clock,
        };
        for robot in self.robots.values_mut() {
            for event in robot.update(&mut ctx) {
                self.observer.on_transition(&event);
                log_event(&event);
                events += 1;
            }
        }

        self.traffic.end_tick(self.clock.now);

        let mut conflicts = 0;
        if self.clock.tick.is_every(self.config.traffic.audit_interval_ticks) {
            let found = self.traffic.detect_conflicts(
                &self.graph,
                self.robots.values().map(|r| (r.id(), r.current_lane())),
            );
            if !found.is_empty() {
                self.observer.on_conflicts(self.clock.tick, &found);
            }
            conflicts = found.len();
        }

        let summary = TickSummary { conflicts, events, ..self.summary() };
        self.observer.on_tick_end(self.clock.tick, &summary);
        summary
    }

    /// Run `n` ticks of `delta_secs` each.  Returns the last tick's summary,
    /// or the current counts when `n == 0`.
    pub fn run_ticks(&mut self, n: u64, delta_secs: f64) -> TickSummary {
        let mut last = self.summary();
        for _ in 0..n {
            last = self.tick(delta_secs);
        }
        last
    }

    /// State counts at the current instant.  `conflicts` and `events` are 0.
    pub fn summary(&self) -> TickSummary {
        let mut s = TickSummary { tick: self.clock.tick, time: self.clock.now, ..TickSummary::default() };
        for robot in self.robots.values() {
            match robot.state() {
                RobotState::Moving       => s.moving += 1,
                RobotState::Waiting      => s.waiting += 1,
                RobotState::Idle         => s.idle += 1,
                RobotState::TaskComplete => s.complete += 1,
                RobotState::Charging     => s.charging += 1,
            }
        }
        s
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn status_of(&self, agent: AgentId) -> Option<RobotStatus> {
        self.robots.get(&agent).map(|r| self.status(r))
    }

    /// Every robot's status, in ascending id order.
    pub fn statuses(&self) -> Vec<RobotStatus> {
        self.robots.values().map(|r| self.status(r)).collect()
    }

    fn status(&self, robot: &Robot) -> RobotStatus {
        RobotStatus {
            agent:    robot.id(),
            state:    robot.state(),
            vertex:   robot.current_vertex(),
            lane:     robot.current_lane(),
            target:   robot.target(),
            position: robot.position(),
            label:    robot.status_display(self.clock.now),
        }
    }

    /// The robot closest to `point` within `radius`.  Ties go to the lower id.
    pub fn nearest_agent(&self, point: Point, radius: f32) -> Option<AgentId> {
        self.robots
            .values()
            .map(|r| (r.id(), r.position().distance(point)))
            .filter(|&(_, d)| d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(id, _)| id)
    }

    /// `(agent, target)` for every robot with a task in progress.
    pub fn active_tasks(&self) -> Vec<(AgentId, VertexId)> {
        self.robots
            .values()
            .filter(|r| r.state().is_busy() || (r.state() == RobotState::Charging && r.plan().is_some()))
            .filter_map(|r| r.target().map(|t| (r.id(), t)))
            .collect()
    }

    pub fn robot(&self, agent: AgentId) -> Option<&Robot> {
        self.robots.get(&agent)
    }

    pub fn robots(&self) -> impl Iterator<Item = &Robot> + '_ {
        self.robots.values()
    }

    pub fn len(&self) -> usize {
        self.robots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.robots.is_empty()
    }

    pub fn graph(&self) -> &NavGraph {
        &self.graph
    }

    pub fn traffic(&self) -> &TrafficCoordinator {
        &self.traffic
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn clock(&self) -> SimClock {
        self.clock
    }

    pub fn config(&self) -> &FleetConfig {
        &self.config
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }
}

fn log_event(event: &TransitionEvent) {
    debug!(
        agent = %event.agent,
        from = %event.from,
        to = %event.to,
        reason = %event.reason,
        tick = %event.tick,
        "transition"
    );
}
