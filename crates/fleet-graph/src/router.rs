//! Routing trait, plans, and the two built-in search strategies.
//!
//! # Pluggability
//!
//! Robots plan through the [`Router`] trait, so an application can swap in a
//! different search without touching the robot state machine.  Two routers
//! ship with the crate:
//!
//! | Router          | Minimises                         |
//! |-----------------|-----------------------------------|
//! | [`BfsRouter`]   | number of lanes                   |
//! | [`AStarRouter`] | travel time (`length / speed_limit`) |
//!
//! Both skip blocked lanes and any lane listed in the request's avoid set,
//! and both break ties toward the lowest vertex index.
//!
//! # Cost units
//!
//! A* works on integer **milliseconds** of travel time so that heap ordering
//! is total and deterministic.  Lane costs round up, the heuristic rounds
//! down, which keeps the heuristic consistent.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use fleet_core::{LaneId, VertexId};

use crate::{GraphError, GraphResult, NavGraph};

// ── Path ──────────────────────────────────────────────────────────────────────

/// An ordered vertex sequence from start to goal.  Never empty.
///
/// A path is a plan; holding one reserves nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    vertices: Vec<VertexId>,
}

impl Path {
    /// `None` for an empty vertex list.
    pub fn new(vertices: Vec<VertexId>) -> Option<Self> {
        if vertices.is_empty() {
            None
        } else {
            Some(Self { vertices })
        }
    }

    /// The single-vertex path of an agent already at its goal.
    pub fn trivial(v: VertexId) -> Self {
        Self { vertices: vec![v] }
    }

    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    pub fn start(&self) -> VertexId {
        self.vertices[0]
    }

    pub fn goal(&self) -> VertexId {
        self.vertices[self.vertices.len() - 1]
    }

    /// Number of lanes the path traverses.
    pub fn hops(&self) -> usize {
        self.vertices.len() - 1
    }

    pub fn is_trivial(&self) -> bool {
        self.vertices.len() == 1
    }

    pub fn contains(&self, v: VertexId) -> bool {
        self.vertices.contains(&v)
    }

    pub fn get(&self, i: usize) -> Option<VertexId> {
        self.vertices.get(i).copied()
    }

    /// Consecutive `(from, to)` pairs, one per lane.
    pub fn pairs(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        self.vertices.windows(2).map(|w| (w[0], w[1]))
    }
}

// ── Requests ──────────────────────────────────────────────────────────────────

/// A routing query.
#[derive(Debug, Clone, Copy)]
pub struct RouteRequest<'a> {
    pub from:  VertexId,
    pub to:    VertexId,
    /// Lanes to treat as impassable in addition to blocked ones.
    pub avoid: &'a [LaneId],
}

impl<'a> RouteRequest<'a> {
    pub fn new(from: VertexId, to: VertexId) -> Self {
        Self { from, to, avoid: &[] }
    }

    pub fn avoiding(from: VertexId, to: VertexId, avoid: &'a [LaneId]) -> Self {
        Self { from, to, avoid }
    }

    #[inline]
    fn passable(&self, graph: &NavGraph, lane: LaneId) -> bool {
        !graph.is_blocked(lane) && !self.avoid.contains(&lane)
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable path search.
///
/// Implementations must be `Send + Sync` so a fleet holding one stays `Send`.
pub trait Router: Send + Sync {
    /// Find a path for `req`.
    ///
    /// `req.from == req.to` yields the single-vertex path.  Unknown ids yield
    /// [`GraphError::VertexNotFound`]; an unreachable goal yields
    /// [`GraphError::NoPath`].
    fn route(&self, graph: &NavGraph, req: &RouteRequest<'_>) -> GraphResult<Path>;
}

impl<R: Router + ?Sized> Router for &R {
    fn route(&self, graph: &NavGraph, req: &RouteRequest<'_>) -> GraphResult<Path> {
        (**self).route(graph, req)
    }
}

impl<R: Router + ?Sized> Router for Box<R> {
    fn route(&self, graph: &NavGraph, req: &RouteRequest<'_>) -> GraphResult<Path> {
        (**self).route(graph, req)
    }
}

fn check_endpoints(graph: &NavGraph, req: &RouteRequest<'_>) -> GraphResult<Option<Path>> {
    for v in [req.from, req.to] {
        if !graph.is_valid_vertex(v) {
            return Err(GraphError::VertexNotFound(v));
        }
    }
    Ok((req.from == req.to).then(|| Path::trivial(req.from)))
}

fn reconstruct(prev: &[Option<VertexId>], goal: VertexId) -> Path {
    let mut vertices = vec![goal];
    let mut cur = goal;
    while let Some(p) = prev[cur.index()] {
        vertices.push(p);
        cur = p;
    }
    vertices.reverse();
    Path { vertices }
}

// ── BfsRouter ─────────────────────────────────────────────────────────────────

/// Minimum-hop breadth-first search.
#[derive(Debug, Clone, Copy, Default)]
pub struct BfsRouter;

impl Router for BfsRouter {
    fn route(&self, graph: &NavGraph, req: &RouteRequest<'_>) -> GraphResult<Path> {
        if let Some(p) = check_endpoints(graph, req)? {
            return Ok(p);
        }

        let n = graph.vertex_count();
        let mut seen = vec![false; n];
        let mut prev: Vec<Option<VertexId>> = vec![None; n];
        let mut queue = VecDeque::new();

        seen[req.from.index()] = true;
        queue.push_back(req.from);

        while let Some(v) = queue.pop_front() {
            for lane in graph.out_lanes(v) {
                if !req.passable(graph, lane) {
                    continue;
                }
                let next = graph.lanes[lane.index()].to;
                if seen[next.index()] {
                    continue;
                }
                seen[next.index()] = true;
                prev[next.index()] = Some(v);
                if next == req.to {
                    return Ok(reconstruct(&prev, next));
                }
                queue.push_back(next);
            }
        }

        Err(GraphError::NoPath { from: req.from, to: req.to })
    }
}

// ── AStarRouter ───────────────────────────────────────────────────────────────

/// Best-first search on travel time with a straight-line heuristic.
#[derive(Debug, Clone, Copy, Default)]
pub struct AStarRouter;

#[inline]
fn lane_cost_ms(graph: &NavGraph, lane: LaneId) -> u64 {
    (graph.lanes[lane.index()].travel_cost() as f64 * 1000.0).ceil() as u64
}

#[inline]
fn heuristic_ms(graph: &NavGraph, v: VertexId, goal: VertexId) -> u64 {
    let d = graph.vertices[v.index()].pos.distance(graph.vertices[goal.index()].pos);
    (d as f64 / graph.max_speed as f64 * 1000.0).floor() as u64
}

impl Router for AStarRouter {
    fn route(&self, graph: &NavGraph, req: &RouteRequest<'_>) -> GraphResult<Path> {
        if let Some(p) = check_endpoints(graph, req)? {
            return Ok(p);
        }

        let n = graph.vertex_count();
        let mut g = vec![u64::MAX; n];
        let mut closed = vec![false; n];
        let mut prev: Vec<Option<VertexId>> = vec![None; n];

        // Min-heap on (f, vertex); the vertex key breaks ties deterministically.
        let mut heap: BinaryHeap<Reverse<(u64, VertexId)>> = BinaryHeap::new();
        g[req.from.index()] = 0;
        heap.push(Reverse((heuristic_ms(graph, req.from, req.to), req.from)));

        while let Some(Reverse((_, v))) = heap.pop() {
            if v == req.to {
                return Ok(reconstruct(&prev, v));
            }
            if closed[v.index()] {
                continue;
            }
            closed[v.index()] = true;

            for lane in graph.out_lanes(v) {
                if !req.passable(graph, lane) {
                    continue;
                }
                let next = graph.lanes[lane.index()].to;
                if closed[next.index()] {
                    continue;
                }
                let cost = g[v.index()].saturating_add(lane_cost_ms(graph, lane));
                if cost < g[next.index()] {
                    g[next.index()] = cost;
                    prev[next.index()] = Some(v);
                    let f = cost.saturating_add(heuristic_ms(graph, next, req.to));
                    heap.push(Reverse((f, next)));
                }
            }
        }

        Err(GraphError::NoPath { from: req.from, to: req.to })
    }
}

// ── Convenience ───────────────────────────────────────────────────────────────

impl NavGraph {
    /// Minimum-hop path from `start` to `goal` avoiding blocked lanes.
    pub fn shortest_path(&self, start: VertexId, goal: VertexId) -> GraphResult<Path> {
        BfsRouter.route(self, &RouteRequest::new(start, goal))
    }
}
