//! The robot state machine.
//!
//! # Resource discipline
//!
//! A robot always holds the vertex it stands on.  When a lane is granted the
//! coordinator also gives it the lane's destination vertex, and the robot
//! then leaves its source vertex.  On arrival it releases the lane and keeps
//! the vertex it snapped to.  So at any instant a robot holds either one
//! vertex, or one lane plus the vertex at its far end.
//!
//! # Per-tick behaviour
//!
//! | State          | `update` does                                            |
//! |----------------|----------------------------------------------------------|
//! | `Moving`       | request the next lane if none is held, then advance      |
//! | `Waiting`      | replan after the timeout, otherwise retry the lane       |
//! | everything else| nothing                                                  |

use std::time::Duration;

use tracing::{info, warn};

use fleet_core::{AgentId, LaneId, Point, RobotState, SimClock, SimTime, VertexId};
use fleet_graph::{NavGraph, RouteRequest, Router};
use fleet_traffic::TrafficCoordinator;

use crate::{Plan, TaskError, TaskResult, TransitionEvent, TransitionReason};

/// Progress fraction added per tick when nothing else is configured.
pub const DEFAULT_SPEED: f32 = 0.05;

/// Continuous waiting after which a robot replans.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Absorbs `f32` accumulation error so `n` steps of `1/n` reach the vertex.
const ARRIVAL_EPSILON: f32 = 1e-6;

/// Display colour; carries no meaning for traffic.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Per-robot motion constants.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RobotParams {
    /// Fraction of a lane covered per tick, in `(0, 1]`.
    pub speed:        f32,
    pub wait_timeout: Duration,
}

impl Default for RobotParams {
    fn default() -> Self {
        Self { speed: DEFAULT_SPEED, wait_timeout: DEFAULT_WAIT_TIMEOUT }
    }
}

/// Everything a robot may touch during one call.
pub struct StepContext<'a> {
    pub graph:   &'a mut NavGraph,
    pub traffic: &'a mut TrafficCoordinator,
    pub router:  &'a dyn Router,
    pub clock:   SimClock,
}

impl StepContext<'_> {
    fn event(&self, agent: AgentId, from: RobotState, to: RobotState, reason: TransitionReason) -> TransitionEvent {
        transition(&self.clock, agent, from, to, reason)
    }
}

fn transition(
    clock: &SimClock,
    agent: AgentId,
    from: RobotState,
    to: RobotState,
    reason: TransitionReason,
) -> TransitionEvent {
    TransitionEvent { tick: clock.tick, time: clock.now, agent, from, to, reason }
}

/// One robot.
#[derive(Debug, Clone)]
pub struct Robot {
    id:            AgentId,
    color:         Color,
    params:        RobotParams,
    state:         RobotState,
    current:       VertexId,
    target:        Option<VertexId>,
    plan:          Option<Plan>,
    lane:          Option<LaneId>,
    progress:      f32,
    position:      Point,
    waiting_since: Option<SimTime>,
    paused_from:   Option<RobotState>,
}

impl Robot {
    /// A robot parked at `at`.  The caller is responsible for reserving the
    /// vertex.
    pub fn new(id: AgentId, color: Color, at: VertexId, position: Point, params: RobotParams) -> Self {
        Self {
            id,
            color,
            params,
            state: RobotState::Idle,
            current: at,
            target: None,
            plan: None,
            lane: None,
            progress: 0.0,
            position,
            waiting_since: None,
            paused_from: None,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn id(&self) -> AgentId { self.id }
    pub fn color(&self) -> Color { self.color }
    pub fn state(&self) -> RobotState { self.state }
    pub fn current_vertex(&self) -> VertexId { self.current }
    pub fn target(&self) -> Option<VertexId> { self.target }
    pub fn plan(&self) -> Option<&Plan> { self.plan.as_ref() }
    pub fn current_lane(&self) -> Option<LaneId> { self.lane }
    pub fn progress(&self) -> f32 { self.progress }
    pub fn position(&self) -> Point { self.position }
    pub fn waiting_since(&self) -> Option<SimTime> { self.waiting_since }
    pub fn params(&self) -> RobotParams { self.params }

    /// Short status label, e.g. `moving` or `waiting (3s)`.
    pub fn status_display(&self, now: SimTime) -> String {
        match (self.state, self.waiting_since) {
            (RobotState::Waiting, Some(since)) => {
                format!("{} ({}s)", self.state, now.since(since).as_secs())
            }
            (state, _) => state.to_string(),
        }
    }

    /// Ticks needed to cover the rest of the current lane.
    pub fn remaining_ticks(&self) -> u32 {
        let left = (1.0 - self.progress).max(0.0);
        ((left / self.params.speed) - ARRIVAL_EPSILON).ceil().max(1.0) as u32
    }

    // ── Commands ──────────────────────────────────────────────────────────

    /// Plan a route to `target` and start moving.
    ///
    /// Nothing is committed unless every check passes.
    pub fn assign_task(&mut self, target: VertexId, ctx: &mut StepContext<'_>) -> TaskResult<TransitionEvent> {
        if !self.state.accepts_task() {
            return Err(TaskError::Busy { agent: self.id, state: self.state });
        }
        if !ctx.graph.is_valid_vertex(target) {
            return Err(TaskError::InvalidReference(target));
        }
        if let Some(by) = ctx.graph.destination_owner(target).filter(|&a| a != self.id) {
            return Err(TaskError::DestinationClaimed { vertex: target, by });
        }
        let path = ctx
            .router
            .route(ctx.graph, &RouteRequest::new(self.current, target))
            .map_err(TaskError::NoPath)?;

        if let Some(reason) = ctx.graph.claim_destination(target, self.id).denial() {
            warn!(agent = %self.id, %reason, "destination claim refused after check");
        }
        if let Some(reason) = ctx.graph.reserve_vertex(self.current, self.id).denial() {
            warn!(agent = %self.id, vertex = %self.current, %reason, "robot does not hold its own vertex");
        }

        let from = self.state;
        self.target = Some(target);
        self.plan = Some(Plan::new(path));
        self.lane = None;
        self.progress = 0.0;
        self.waiting_since = None;
        self.state = RobotState::Moving;

        info!(agent = %self.id, from = %self.current, to = %target, "task assigned");
        Ok(ctx.event(self.id, from, self.state, TransitionReason::TaskAssigned))
    }

    /// Hold in place.  Any lane and progress are kept for the resume.
    pub fn pause(&mut self, clock: &SimClock) -> Option<TransitionEvent> {
        if self.state == RobotState::Charging {
            return None;
        }
        let from = self.state;
        self.paused_from = Some(from);
        self.state = RobotState::Charging;
        info!(agent = %self.id, %from, "paused");
        Some(transition(clock, self.id, from, self.state, TransitionReason::Paused))
    }

    /// Leave `Charging`.  A robot with an unfinished plan resumes moving;
    /// otherwise it returns to the state it was paused from.
    pub fn resume(&mut self, clock: &SimClock) -> TaskResult<TransitionEvent> {
        if self.state != RobotState::Charging {
            return Err(TaskError::NotPaused(self.id));
        }
        let before = self.paused_from.take().unwrap_or_default();
        self.state = if self.plan.is_some() { RobotState::Moving } else { before };
        self.waiting_since = None;
        info!(agent = %self.id, to = %self.state, "resumed");
        Ok(transition(clock, self.id, RobotState::Charging, self.state, TransitionReason::Resumed))
    }

    /// Advance one tick.  Returns the transitions that happened, in order.
    pub fn update(&mut self, ctx: &mut StepContext<'_>) -> Vec<TransitionEvent> {
        let mut events = Vec::new();
        match self.state {
            RobotState::Moving => self.step_moving(ctx, &mut events),
            RobotState::Waiting => self.step_waiting(ctx, &mut events),
            RobotState::Idle | RobotState::TaskComplete | RobotState::Charging => {}
        }
        events
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn step_moving(&mut self, ctx: &mut StepContext<'_>, events: &mut Vec<TransitionEvent>) {
        if self.lane.is_none() {
            if self.plan.as_ref().is_none_or(Plan::is_finished) {
                self.complete(ctx, events);
                return;
            }
            match self.request_next_lane(ctx) {
                Some(true) => {}
                Some(false) => {
                    self.start_waiting(ctx, events);
                    return;
                }
                None => {
                    self.drop_task(ctx, events);
                    return;
                }
            }
        }
        self.advance(ctx, events);
    }

    fn step_waiting(&mut self, ctx: &mut StepContext<'_>, events: &mut Vec<TransitionEvent>) {
        let since = *self.waiting_since.get_or_insert(ctx.clock.now);
        if ctx.clock.now.since(since) > self.params.wait_timeout {
            self.replan(ctx, events);
            return;
        }
        match self.request_next_lane(ctx) {
            Some(true) => {
                self.waiting_since = None;
                self.state = RobotState::Moving;
                events.push(ctx.event(self.id, RobotState::Waiting, RobotState::Moving, TransitionReason::LaneGranted));
                self.advance(ctx, events);
            }
            Some(false) => {}
            None => self.drop_task(ctx, events),
        }
    }

    /// `Some(granted)` for a real lane, `None` if the plan's next hop has no
    /// lane.  On grant the robot leaves its source vertex.
    fn request_next_lane(&mut self, ctx: &mut StepContext<'_>) -> Option<bool> {
        let next = self.plan.as_ref()?.next_vertex()?;
        let lane = ctx.graph.lane_between(self.current, next)?;

        let expected_arrival =
            ctx.clock.now + ctx.clock.last_delta.saturating_mul(self.remaining_ticks());
        let grant = ctx.traffic.request_lane(ctx.graph, self.id, lane, ctx.clock.now, expected_arrival);
        if grant.is_denied() {
            return Some(false);
        }
        self.lane = Some(lane);
        if let Some(reason) = ctx.traffic.leave_vertex(ctx.graph, self.id, self.current).denial() {
            warn!(agent = %self.id, vertex = %self.current, %reason, "source vertex was not held");
        }
        Some(true)
    }

    fn advance(&mut self, ctx: &mut StepContext<'_>, events: &mut Vec<TransitionEvent>) {
        let (Some(lane), Some(next)) = (self.lane, self.plan.as_ref().and_then(Plan::next_vertex)) else {
            return;
        };
        self.progress = (self.progress + self.params.speed).min(1.0);
        if self.progress < 1.0 - ARRIVAL_EPSILON {
            let a = ctx.graph.vertex_position(self.current).unwrap_or(self.position);
            let b = ctx.graph.vertex_position(next).unwrap_or(self.position);
            self.position = a.lerp(b, self.progress);
            return;
        }

        // Snap to the next vertex.
        if let Some(reason) = ctx.traffic.release_lane(ctx.graph, self.id, lane).denial() {
            warn!(agent = %self.id, %lane, %reason, "traversed lane was not held");
        }
        self.lane = None;
        self.progress = 0.0;
        self.current = next;
        self.position = ctx.graph.vertex_position(next).unwrap_or(self.position);
        if let Some(plan) = self.plan.as_mut() {
            plan.advance();
        }

        if self.plan.as_ref().is_none_or(Plan::is_finished) {
            self.complete(ctx, events);
            return;
        }

        events.push(ctx.event(self.id, RobotState::Moving, RobotState::Moving, TransitionReason::ReachedVertex));
        match self.request_next_lane(ctx) {
            Some(true) => {}
            Some(false) => self.start_waiting(ctx, events),
            None => self.drop_task(ctx, events),
        }
    }

    fn start_waiting(&mut self, ctx: &StepContext<'_>, events: &mut Vec<TransitionEvent>) {
        self.state = RobotState::Waiting;
        self.waiting_since = Some(ctx.clock.now);
        info!(agent = %self.id, vertex = %self.current, "waiting for lane");
        events.push(ctx.event(self.id, RobotState::Moving, RobotState::Waiting, TransitionReason::LaneDenied));
    }

    fn replan(&mut self, ctx: &mut StepContext<'_>, events: &mut Vec<TransitionEvent>) {
        let Some(target) = self.target else {
            self.drop_task(ctx, events);
            return;
        };
        // Lanes held by others, plus lanes into vertices others stand on.
        let me = self.id;
        let mut avoid: Vec<LaneId> = ctx
            .graph
            .occupied_lanes()
            .into_iter()
            .filter(|&(_, holder)| holder != me)
            .map(|(lane, _)| lane)
            .collect();
        avoid.extend(
            ctx.graph
                .lanes()
                .filter(|(_, l)| l.to != target && ctx.graph.vertex_occupant(l.to).is_some_and(|a| a != me))
                .map(|(id, _)| id),
        );

        let path = ctx
            .router
            .route(ctx.graph, &RouteRequest::avoiding(self.current, target, &avoid))
            .or_else(|_| ctx.router.route(ctx.graph, &RouteRequest::new(self.current, target)));

        match path {
            Ok(path) => {
                warn!(agent = %self.id, vertex = %self.current, %target, hops = path.hops(), "wait timed out, replanned");
                self.plan = Some(Plan::new(path));
                self.waiting_since = None;
                self.state = RobotState::Moving;
                events.push(ctx.event(
                    self.id,
                    RobotState::Waiting,
                    RobotState::Moving,
                    TransitionReason::StarvationReplan,
                ));
            }
            Err(err) => {
                warn!(agent = %self.id, %err, "wait timed out and no path remains; still waiting");
                self.waiting_since = Some(ctx.clock.now);
                events.push(ctx.event(
                    self.id,
                    RobotState::Waiting,
                    RobotState::Waiting,
                    TransitionReason::StarvationTimeout,
                ));
            }
        }
    }

    fn complete(&mut self, ctx: &mut StepContext<'_>, events: &mut Vec<TransitionEvent>) {
        if let Some(target) = self.target.take() {
            if let Some(reason) = ctx.graph.clear_destination_vertex(target, self.id).denial() {
                warn!(agent = %self.id, %target, %reason, "destination claim was not held");
            }
        }
        self.plan = None;
        let from = self.state;
        self.state = RobotState::TaskComplete;
        info!(agent = %self.id, vertex = %self.current, "task complete");
        events.push(ctx.event(self.id, from, self.state, TransitionReason::Arrived));
    }

    fn drop_task(&mut self, ctx: &mut StepContext<'_>, events: &mut Vec<TransitionEvent>) {
        warn!(agent = %self.id, vertex = %self.current, "plan names a hop without a lane; task dropped");
        if let Some(target) = self.target.take() {
            if let Some(reason) = ctx.graph.clear_destination_vertex(target, self.id).denial() {
                warn!(agent = %self.id, %target, %reason, "destination claim was not held");
            }
        }
        self.plan = None;
        self.waiting_since = None;
        let from = self.state;
        self.state = RobotState::Idle;
        events.push(ctx.event(self.id, from, self.state, TransitionReason::LaneMissing));
    }
}
