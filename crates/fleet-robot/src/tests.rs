//! Unit tests for fleet-robot.

use std::time::Duration;

use fleet_core::{AgentId, Point, SimClock, VertexId};
use fleet_graph::{BfsRouter, GraphResult, NavGraph, NavGraphBuilder, Path, RouteRequest, Router};
use fleet_traffic::TrafficCoordinator;

use crate::{Color, Robot, RobotParams, StepContext, TransitionEvent};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Four lanes per traversal at this speed.
const QUARTER: RobotParams = RobotParams { speed: 0.25, wait_timeout: Duration::from_secs(10) };

/// v0 → v1 → v2 → v3, one-way, one unit apart.
fn chain() -> NavGraph {
    let mut b = NavGraphBuilder::new();
    let v: Vec<VertexId> = (0..4)
        .map(|i| b.add_vertex(Point::new(i as f32, 0.0), format!("s{i}"), false))
        .collect();
    for w in v.windows(2) {
        b.add_lane(w[0], w[1], 1.0);
    }
    b.build().unwrap()
}

/// v0 ⇄ v1 ⇄ v2.
fn two_way_line() -> NavGraph {
    let mut b = NavGraphBuilder::new();
    let v: Vec<VertexId> = (0..3)
        .map(|i| b.add_vertex(Point::new(i as f32, 0.0), format!("t{i}"), false))
        .collect();
    b.add_two_way(v[0], v[1], 1.0);
    b.add_two_way(v[1], v[2], 1.0);
    b.build().unwrap()
}

/// Direct v0 → v1 plus a detour v0 → v2 → v1.
fn detour() -> NavGraph {
    let mut b = NavGraphBuilder::new();
    let v0 = b.add_vertex(Point::new(0.0, 0.0), "a", false);
    let v1 = b.add_vertex(Point::new(2.0, 0.0), "b", false);
    let v2 = b.add_vertex(Point::new(1.0, 1.0), "c", false);
    b.add_lane(v0, v1, 1.0);
    b.add_lane(v0, v2, 1.0);
    b.add_lane(v2, v1, 1.0);
    b.build().unwrap()
}

/// Two routes v0 → v1 → v3 and v0 → v2 → v3.
fn diamond() -> NavGraph {
    let mut b = NavGraphBuilder::new();
    let v0 = b.add_vertex(Point::new(0.0, 0.0), "w", false);
    let v1 = b.add_vertex(Point::new(1.0, 1.0), "n", false);
    let v2 = b.add_vertex(Point::new(1.0, -1.0), "s", false);
    let v3 = b.add_vertex(Point::new(2.0, 0.0), "e", false);
    b.add_lane(v0, v1, 1.0);
    b.add_lane(v0, v2, 1.0);
    b.add_lane(v1, v3, 1.0);
    b.add_lane(v2, v3, 1.0);
    b.build().unwrap()
}

/// Plans a single hop straight to the goal whether or not a lane exists.
struct TeleportRouter;

impl Router for TeleportRouter {
    fn route(&self, _graph: &NavGraph, req: &RouteRequest<'_>) -> GraphResult<Path> {
        Ok(Path::new(vec![req.from, req.to]).unwrap())
    }
}

struct World {
    graph:   NavGraph,
    traffic: TrafficCoordinator,
    clock:   SimClock,
    router:  &'static dyn Router,
}

impl World {
    fn new(graph: NavGraph) -> Self {
        Self { graph, traffic: TrafficCoordinator::default(), clock: SimClock::new(), router: &BfsRouter }
    }

    fn ctx(&mut self) -> StepContext<'_> {
        StepContext {
            graph:   &mut self.graph,
            traffic: &mut self.traffic,
            router:  self.router,
            clock:   self.clock,
        }
    }

    fn spawn(&mut self, id: u32, at: u32) -> Robot {
        let (id, at) = (AgentId(id), VertexId(at));
        assert!(self.graph.reserve_vertex(at, id).is_granted());
        let pos = self.graph.vertex_position(at).unwrap();
        Robot::new(id, Color::new(1, 2, 3), at, pos, QUARTER)
    }

    fn assign(&mut self, robot: &mut Robot, target: u32) {
        let mut ctx = self.ctx();
        robot.assign_task(VertexId(target), &mut ctx).unwrap();
    }

    /// One-second tick over `robots` in slice order.
    fn tick(&mut self, robots: &mut [&mut Robot]) -> Vec<TransitionEvent> {
        self.clock.advance(Duration::from_secs(1));
        let mut events = Vec::new();
        let mut ctx = self.ctx();
        for r in robots.iter_mut() {
            events.extend(r.update(&mut ctx));
        }
        self.traffic.end_tick(self.clock.now);
        events
    }
}

// ── Plan ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod plan {
    use super::*;
    use crate::Plan;

    #[test]
    fn cursor_walks_to_goal() {
        let path = Path::new(vec![VertexId(0), VertexId(1), VertexId(2)]).unwrap();
        let mut p = Plan::new(path);
        assert_eq!(p.current(), VertexId(0));
        assert_eq!(p.next_vertex(), Some(VertexId(1)));
        assert_eq!(p.remaining_hops(), 2);
        p.advance();
        p.advance();
        assert!(p.is_finished());
        assert_eq!(p.current(), VertexId(2));
        assert_eq!(p.next_vertex(), None);
        p.advance();
        assert_eq!(p.cursor(), 2);
        assert_eq!(p.target(), VertexId(2));
    }
}

// ── Movement ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod movement {
    use super::*;
    use fleet_core::RobotState;
    use crate::TransitionReason;

    #[test]
    fn three_lane_run_completes_after_three_traversals() {
        let mut w = World::new(chain());
        let mut r = w.spawn(0, 0);
        w.assign(&mut r, 3);
        assert_eq!(r.remaining_ticks(), 4);

        let mut reasons = Vec::new();
        for _ in 0..11 {
            reasons.extend(w.tick(&mut [&mut r]).into_iter().map(|e| e.reason));
        }
        assert_eq!(r.state(), RobotState::Moving);
        reasons.extend(w.tick(&mut [&mut r]).into_iter().map(|e| e.reason));

        assert_eq!(r.state(), RobotState::TaskComplete);
        assert_eq!(r.current_vertex(), VertexId(3));
        assert_eq!(r.position(), Point::new(3.0, 0.0));
        assert_eq!(
            reasons,
            vec![TransitionReason::ReachedVertex, TransitionReason::ReachedVertex, TransitionReason::Arrived]
        );

        // Holds only the vertex it stopped on; the claim is gone.
        assert_eq!(w.graph.vertex_occupant(VertexId(3)), Some(AgentId(0)));
        for v in 0..3 {
            assert_eq!(w.graph.vertex_occupant(VertexId(v)), None);
        }
        assert!(w.graph.occupied_lanes().is_empty());
        assert_eq!(w.graph.destination_owner(VertexId(3)), None);
    }

    #[test]
    fn progress_is_monotone_until_snap() {
        let mut w = World::new(chain());
        let mut r = w.spawn(0, 0);
        w.assign(&mut r, 2);

        let mut last = r.progress();
        let mut last_vertex = r.current_vertex();
        for _ in 0..8 {
            w.tick(&mut [&mut r]);
            if r.current_vertex() == last_vertex {
                assert!(r.progress() >= last, "{} < {}", r.progress(), last);
            } else {
                assert_eq!(r.progress(), 0.0);
                last_vertex = r.current_vertex();
            }
            last = r.progress();
        }
        assert_eq!(r.state(), RobotState::TaskComplete);
    }

    #[test]
    fn position_interpolates_along_lane() {
        let mut w = World::new(chain());
        let mut r = w.spawn(0, 0);
        w.assign(&mut r, 1);
        w.tick(&mut [&mut r]);
        w.tick(&mut [&mut r]);
        assert!((r.position().x - 0.5).abs() < 1e-6);
        assert_eq!(r.current_lane(), w.graph.lane_between(VertexId(0), VertexId(1)));
        // Source vertex is released once the lane is granted.
        assert_eq!(w.graph.vertex_occupant(VertexId(0)), None);
        assert_eq!(w.graph.vertex_occupant(VertexId(1)), Some(AgentId(0)));
    }

    #[test]
    fn trivial_task_completes_on_first_tick() {
        let mut w = World::new(chain());
        let mut r = w.spawn(0, 2);
        w.assign(&mut r, 2);
        let events = w.tick(&mut [&mut r]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].reason, TransitionReason::Arrived);
        assert_eq!(r.state(), RobotState::TaskComplete);
    }

    #[test]
    fn missing_lane_drops_task() {
        let mut w = World::new(chain());
        w.router = &TeleportRouter;
        let mut r = w.spawn(0, 0);
        w.assign(&mut r, 3);
        let events = w.tick(&mut [&mut r]);
        assert_eq!(events[0].reason, TransitionReason::LaneMissing);
        assert_eq!(r.state(), RobotState::Idle);
        assert_eq!(w.graph.destination_owner(VertexId(3)), None);
    }
}

// ── Assignment ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod assignment {
    use super::*;
    use fleet_core::RobotState;
    use fleet_graph::GraphError;
    use crate::TaskError;

    #[test]
    fn rejects_invalid_and_unreachable_targets() {
        let mut w = World::new(chain());
        let mut r = w.spawn(0, 2);
        let mut ctx = w.ctx();
        assert_eq!(
            r.assign_task(VertexId(40), &mut ctx),
            Err(TaskError::InvalidReference(VertexId(40)))
        );
        assert_eq!(
            r.assign_task(VertexId(0), &mut ctx),
            Err(TaskError::NoPath(GraphError::NoPath { from: VertexId(2), to: VertexId(0) }))
        );
        assert_eq!(r.state(), RobotState::Idle);
        assert_eq!(ctx.graph.destination_owner(VertexId(0)), None);
    }

    #[test]
    fn claimed_destination_leaves_state_unchanged() {
        let mut w = World::new(chain());
        let mut a = w.spawn(0, 0);
        let mut b = w.spawn(1, 1);
        w.assign(&mut a, 3);

        let mut ctx = w.ctx();
        assert_eq!(
            b.assign_task(VertexId(3), &mut ctx),
            Err(TaskError::DestinationClaimed { vertex: VertexId(3), by: AgentId(0) })
        );
        assert_eq!(b.state(), RobotState::Idle);
        assert!(b.plan().is_none());
        assert!(b.target().is_none());
    }

    #[test]
    fn busy_robot_rejects_new_task() {
        let mut w = World::new(chain());
        let mut r = w.spawn(0, 0);
        w.assign(&mut r, 3);
        let mut ctx = w.ctx();
        assert!(matches!(r.assign_task(VertexId(2), &mut ctx), Err(TaskError::Busy { .. })));
        assert_eq!(r.target(), Some(VertexId(3)));
    }

    #[test]
    fn completed_robot_accepts_next_task() {
        let mut w = World::new(chain());
        let mut r = w.spawn(0, 0);
        w.assign(&mut r, 1);
        for _ in 0..4 {
            w.tick(&mut [&mut r]);
        }
        assert_eq!(r.state(), RobotState::TaskComplete);
        w.assign(&mut r, 2);
        assert_eq!(r.state(), RobotState::Moving);
        assert_eq!(w.graph.destination_owner(VertexId(2)), Some(AgentId(0)));
    }
}

// ── Contention ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod contention {
    use super::*;
    use fleet_core::RobotState;
    use crate::TransitionReason;

    #[test]
    fn head_on_pair_never_moves_on_opposing_lanes() {
        let mut w = World::new(two_way_line());
        let mut a = w.spawn(0, 0);
        let mut b = w.spawn(1, 2);
        w.assign(&mut a, 2);
        w.assign(&mut b, 0);

        w.tick(&mut [&mut a, &mut b]);
        assert_eq!(a.state(), RobotState::Moving);
        assert!(a.current_lane().is_some());
        assert_eq!(b.state(), RobotState::Waiting);

        for _ in 0..40 {
            w.tick(&mut [&mut a, &mut b]);
            if let (Some(la), Some(lb)) = (a.current_lane(), b.current_lane()) {
                assert_ne!(w.graph.reverse_of(la), Some(lb), "opposing lanes held at once");
                assert_ne!(la, lb);
            }
        }
    }

    #[test]
    fn waiting_robot_proceeds_when_lane_frees() {
        let mut w = World::new(chain());
        let mut r = w.spawn(0, 0);
        w.assign(&mut r, 1);
        let l01 = w.graph.lane_between(VertexId(0), VertexId(1)).unwrap();
        assert!(w.graph.reserve_lane_id(l01, AgentId(9)).is_granted());

        let events = w.tick(&mut [&mut r]);
        assert_eq!(events[0].reason, TransitionReason::LaneDenied);
        assert_eq!(r.status_display(w.clock.now), "waiting (0s)");
        w.tick(&mut [&mut r]);
        w.tick(&mut [&mut r]);
        assert_eq!(r.status_display(w.clock.now), "waiting (2s)");

        assert!(w.graph.release_lane_id(l01, AgentId(9)).is_granted());
        let events = w.tick(&mut [&mut r]);
        assert_eq!(events[0].reason, TransitionReason::LaneGranted);
        assert_eq!(r.state(), RobotState::Moving);
        assert!(r.waiting_since().is_none());
        assert!(r.progress() > 0.0);
    }

    #[test]
    fn starvation_triggers_replan_right_after_timeout() {
        let mut w = World::new(detour());
        let mut r = w.spawn(0, 0);
        w.assign(&mut r, 1);
        let direct = w.graph.lane_between(VertexId(0), VertexId(1)).unwrap();
        assert!(w.graph.reserve_lane_id(direct, AgentId(9)).is_granted());

        // Denied at t=1 s; waits 10 s; replans on the tick that exceeds it.
        let mut replanned_at = None;
        for _ in 0..15 {
            let events = w.tick(&mut [&mut r]);
            if events.iter().any(|e| e.reason == TransitionReason::StarvationReplan) {
                replanned_at = Some(w.clock.tick.0);
                break;
            }
            assert_eq!(r.state(), RobotState::Waiting);
        }
        assert_eq!(replanned_at, Some(12));
        assert_eq!(r.state(), RobotState::Moving);
        let plan = r.plan().unwrap();
        assert_eq!(plan.path().vertices(), &[VertexId(0), VertexId(2), VertexId(1)]);

        for _ in 0..8 {
            w.tick(&mut [&mut r]);
        }
        assert_eq!(r.state(), RobotState::TaskComplete);
        assert_eq!(r.current_vertex(), VertexId(1));
    }

    #[test]
    fn no_route_at_timeout_keeps_waiting_and_restarts_timer() {
        let mut w = World::new(chain());
        let mut r = w.spawn(0, 0);
        w.assign(&mut r, 1);
        w.graph.set_lane_blocked(VertexId(0), VertexId(1), true).unwrap();

        for _ in 0..11 {
            let events = w.tick(&mut [&mut r]);
            assert!(events.iter().all(|e| e.reason != TransitionReason::StarvationReplan));
            assert!(events.iter().all(|e| e.reason != TransitionReason::StarvationTimeout));
        }
        let events = w.tick(&mut [&mut r]);
        assert_eq!(w.clock.tick.0, 12);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].reason, TransitionReason::StarvationTimeout);
        assert_eq!((events[0].from, events[0].to), (RobotState::Waiting, RobotState::Waiting));
        assert_eq!(r.state(), RobotState::Waiting);
        assert_eq!(r.waiting_since(), Some(w.clock.now));
    }

    #[test]
    fn replan_routes_around_parked_robot() {
        let mut w = World::new(diamond());
        let mut r = w.spawn(0, 0);
        let _parked = w.spawn(1, 1);
        w.assign(&mut r, 3);
        assert_eq!(r.plan().unwrap().path().vertices(), &[VertexId(0), VertexId(1), VertexId(3)]);

        let mut replanned = false;
        for _ in 0..40 {
            let events = w.tick(&mut [&mut r]);
            if events.iter().any(|e| e.reason == TransitionReason::StarvationReplan) {
                assert!(!replanned, "replanned twice");
                replanned = true;
                assert_eq!(r.plan().unwrap().path().vertices(), &[VertexId(0), VertexId(2), VertexId(3)]);
            }
            if r.state() == RobotState::TaskComplete {
                break;
            }
        }
        assert!(replanned);
        assert_eq!(r.state(), RobotState::TaskComplete);
        assert_eq!(r.current_vertex(), VertexId(3));
        assert_eq!(w.graph.vertex_occupant(VertexId(1)), Some(AgentId(1)));
    }

    #[test]
    fn lost_bookkeeping_does_not_stop_the_robot() {
        let mut w = World::new(chain());
        let mut r = w.spawn(0, 0);
        w.assign(&mut r, 1);
        w.tick(&mut [&mut r]);
        let l01 = r.current_lane().unwrap();

        // Lane and claim vanish from under the robot mid-traversal.
        assert!(w.graph.release_lane_id(l01, AgentId(0)).is_granted());
        assert!(w.graph.clear_destination_vertex(VertexId(1), AgentId(0)).is_granted());

        for _ in 0..3 {
            w.tick(&mut [&mut r]);
        }
        assert_eq!(r.state(), RobotState::TaskComplete);
        assert_eq!(r.current_vertex(), VertexId(1));
        assert!(w.graph.occupied_lanes().is_empty());
        assert_eq!(w.graph.destination_owner(VertexId(1)), None);
    }
}

// ── Pause / resume ────────────────────────────────────────────────────────────

#[cfg(test)]
mod pause {
    use super::*;
    use fleet_core::RobotState;
    use crate::TaskError;

    #[test]
    fn pause_freezes_and_resume_continues() {
        let mut w = World::new(chain());
        let mut r = w.spawn(0, 0);
        w.assign(&mut r, 1);
        w.tick(&mut [&mut r]);
        let held = r.progress();

        assert!(r.pause(&w.clock).is_some());
        assert!(r.pause(&w.clock).is_none());
        assert_eq!(r.state(), RobotState::Charging);
        w.tick(&mut [&mut r]);
        w.tick(&mut [&mut r]);
        assert_eq!(r.progress(), held);

        r.resume(&w.clock).unwrap();
        assert_eq!(r.state(), RobotState::Moving);
        for _ in 0..3 {
            w.tick(&mut [&mut r]);
        }
        assert_eq!(r.state(), RobotState::TaskComplete);
    }

    #[test]
    fn resume_without_plan_restores_previous_state() {
        let mut w = World::new(chain());
        let mut r = w.spawn(0, 0);
        assert_eq!(r.resume(&w.clock), Err(TaskError::NotPaused(AgentId(0))));
        r.pause(&w.clock);
        assert_eq!(r.resume(&w.clock).unwrap().to, RobotState::Idle);
    }
}
