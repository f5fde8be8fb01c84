//! Navigation graph representation and builder.
//!
//! # Data layout
//!
//! Lanes are stored in **Compressed Sparse Row (CSR)** order.  Given a
//! `VertexId v`, its outgoing lanes occupy
//!
//! ```text
//! lanes[ out_start[v] .. out_start[v+1] ]
//! ```
//!
//! and within that slice they are sorted by destination vertex.  Search
//! loops therefore visit neighbours in ascending index order, which is what
//! makes tie-breaking deterministic, and `lane_between` is a binary search.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps a map coordinate to the nearest vertex.  Used
//! for pick queries from the presentation layer.

use std::collections::BTreeMap;

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use fleet_core::{AgentId, LaneId, Point, VertexId};

use crate::viewport::Bounds;
use crate::LoadError;

/// Speed limit assumed for lanes that do not declare a positive one.
pub const DEFAULT_SPEED_LIMIT: f32 = 1.0;

// ── R-tree vertex entry ───────────────────────────────────────────────────────

#[derive(Clone)]
struct VertexEntry {
    point: [f32; 2],
    id: VertexId,
}

impl RTreeObject for VertexEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for VertexEntry {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── Static definitions ────────────────────────────────────────────────────────

/// A named, positioned location.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub pos: Point,
    pub name: String,
    pub is_charger: bool,
}

/// A directed traversable edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    pub from: VertexId,
    pub to: VertexId,
    /// Always positive; see [`DEFAULT_SPEED_LIMIT`].
    pub speed_limit: f32,
    /// Straight-line distance between the endpoints.
    pub length: f32,
}

impl Lane {
    /// Traversal cost used by weighted routing: time at the speed limit.
    #[inline]
    pub fn travel_cost(&self) -> f32 {
        self.length / self.speed_limit
    }
}

// ── NavGraph ──────────────────────────────────────────────────────────────────

/// Directed lane graph in CSR format, its dynamic occupancy state, and a
/// spatial index over vertices.
///
/// Construct with [`NavGraphBuilder`] or the JSON loader.
pub struct NavGraph {
    pub(crate) vertices:  Vec<Vertex>,
    /// CSR row pointer, length `vertex_count + 1`.
    pub(crate) out_start: Vec<u32>,
    pub(crate) lanes:     Vec<Lane>,
    pub(crate) max_speed: f32,

    // ── Dynamic state (see `occupancy`) ───────────────────────────────────
    pub(crate) vertex_occupant: Vec<Option<AgentId>>,
    pub(crate) lane_occupant:   Vec<Option<AgentId>>,
    pub(crate) lane_blocked:    Vec<bool>,
    pub(crate) destinations:    BTreeMap<VertexId, AgentId>,

    spatial_idx: RTree<VertexEntry>,
}

impl NavGraph {
    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn is_valid_vertex(&self, v: VertexId) -> bool {
        v.index() < self.vertices.len()
    }

    // ── Static lookups ────────────────────────────────────────────────────

    pub fn vertex(&self, v: VertexId) -> Option<&Vertex> {
        self.vertices.get(v.index())
    }

    pub fn lane(&self, l: LaneId) -> Option<&Lane> {
        self.lanes.get(l.index())
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (VertexId(i as u32), v))
    }

    pub fn lanes(&self) -> impl Iterator<Item = (LaneId, &Lane)> + '_ {
        self.lanes
            .iter()
            .enumerate()
            .map(|(i, l)| (LaneId(i as u32), l))
    }

    /// Position of `v`, or `None` for an unknown id.
    #[inline]
    pub fn vertex_position(&self, v: VertexId) -> Option<Point> {
        self.vertices.get(v.index()).map(|vx| vx.pos)
    }

    /// Vertices flagged as chargers, in index order.
    pub fn chargers(&self) -> Vec<VertexId> {
        self.vertices()
            .filter(|(_, v)| v.is_charger)
            .map(|(id, _)| id)
            .collect()
    }

    /// Highest speed limit in the graph; the A* heuristic divides by it.
    #[inline]
    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    // ── Traversal ─────────────────────────────────────────────────────────

    /// Outgoing lanes of `v`, in ascending destination order.  Empty for an
    /// unknown vertex.
    #[inline]
    pub fn out_lanes(&self, v: VertexId) -> impl Iterator<Item = LaneId> + '_ {
        let (start, end) = self.out_range(v);
        (start..end).map(|i| LaneId(i as u32))
    }

    pub fn out_degree(&self, v: VertexId) -> usize {
        let (start, end) = self.out_range(v);
        end - start
    }

    /// The directed lane `from → to`, if it exists.
    pub fn lane_between(&self, from: VertexId, to: VertexId) -> Option<LaneId> {
        let (start, end) = self.out_range(from);
        self.lanes[start..end]
            .binary_search_by_key(&to, |l| l.to)
            .ok()
            .map(|i| LaneId((start + i) as u32))
    }

    /// The lane running opposite to `lane`, if the graph has one.
    #[inline]
    pub fn reverse_of(&self, lane: LaneId) -> Option<LaneId> {
        let l = self.lanes.get(lane.index())?;
        self.lane_between(l.to, l.from)
    }

    fn out_range(&self, v: VertexId) -> (usize, usize) {
        if !self.is_valid_vertex(v) {
            return (0, 0);
        }
        (
            self.out_start[v.index()] as usize,
            self.out_start[v.index() + 1] as usize,
        )
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Nearest vertex to `pos`; `None` only for an empty graph.
    pub fn nearest_vertex(&self, pos: Point) -> Option<VertexId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.x, pos.y])
            .map(|e| e.id)
    }

    /// Nearest vertex within `tolerance` of `pos`.
    pub fn vertex_at(&self, pos: Point, tolerance: f32) -> Option<VertexId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.x, pos.y])
            .filter(|e| e.distance_2(&[pos.x, pos.y]) <= tolerance * tolerance)
            .map(|e| e.id)
    }

    /// Axis-aligned bounds of all vertex coordinates; `None` for an empty
    /// graph.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::enclosing(self.vertices.iter().map(|v| v.pos))
    }
}

// ── NavGraphBuilder ───────────────────────────────────────────────────────────

/// Construct a [`NavGraph`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use fleet_core::Point;
/// use fleet_graph::NavGraphBuilder;
///
/// let mut b = NavGraphBuilder::new();
/// let a = b.add_vertex(Point::new(0.0, 0.0), "dock", false);
/// let c = b.add_vertex(Point::new(4.0, 0.0), "charger", true);
/// b.add_two_way(a, c, 2.0);
/// let graph = b.build().unwrap();
/// assert_eq!(graph.lane_count(), 2);
/// ```
#[derive(Default)]
pub struct NavGraphBuilder {
    vertices:  Vec<Vertex>,
    raw_lanes: Vec<RawLane>,
}

struct RawLane {
    from:        VertexId,
    to:          VertexId,
    speed_limit: f32,
}

impl NavGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, lanes: usize) -> Self {
        Self {
            vertices:  Vec::with_capacity(vertices),
            raw_lanes: Vec::with_capacity(lanes),
        }
    }

    /// Add a vertex and return its id (sequential from 0).
    pub fn add_vertex(&mut self, pos: Point, name: impl Into<String>, is_charger: bool) -> VertexId {
        let id = VertexId(self.vertices.len() as u32);
        self.vertices.push(Vertex { pos, name: name.into(), is_charger });
        id
    }

    /// Add a **directed** lane.  A non-positive or non-finite `speed_limit`
    /// falls back to [`DEFAULT_SPEED_LIMIT`].
    pub fn add_lane(&mut self, from: VertexId, to: VertexId, speed_limit: f32) {
        self.raw_lanes.push(RawLane { from, to, speed_limit });
    }

    /// Add lanes in both directions.
    pub fn add_two_way(&mut self, a: VertexId, b: VertexId, speed_limit: f32) {
        self.add_lane(a, b, speed_limit);
        self.add_lane(b, a, speed_limit);
    }

    pub fn vertex_count(&self) -> usize { self.vertices.len() }
    pub fn lane_count(&self) -> usize { self.raw_lanes.len() }

    /// Validate references, sort lanes into CSR order and bulk-load the
    /// spatial index.
    pub fn build(self) -> Result<NavGraph, LoadError> {
        let vertex_count = self.vertices.len();

        for (i, raw) in self.raw_lanes.iter().enumerate() {
            for v in [raw.from, raw.to] {
                if v.index() >= vertex_count {
                    return Err(LoadError::VertexOutOfRange {
                        lane:   i,
                        vertex: v.0 as u64,
                        count:  vertex_count,
                    });
                }
            }
        }

        let mut raw = self.raw_lanes;
        raw.sort_by_key(|l| (l.from, l.to));
        if let Some(dup) = raw.windows(2).find(|w| w[0].from == w[1].from && w[0].to == w[1].to) {
            return Err(LoadError::DuplicateLane { from: dup[0].from, to: dup[0].to });
        }

        let lanes: Vec<Lane> = raw
            .iter()
            .map(|r| {
                let speed_limit = if r.speed_limit.is_finite() && r.speed_limit > 0.0 {
                    r.speed_limit
                } else {
                    DEFAULT_SPEED_LIMIT
                };
                Lane {
                    from: r.from,
                    to: r.to,
                    speed_limit,
                    length: self.vertices[r.from.index()].pos.distance(self.vertices[r.to.index()].pos),
                }
            })
            .collect();

        let mut out_start = vec![0u32; vertex_count + 1];
        for l in &lanes {
            out_start[l.from.index() + 1] += 1;
        }
        for i in 1..=vertex_count {
            out_start[i] += out_start[i - 1];
        }
        debug_assert_eq!(out_start[vertex_count] as usize, lanes.len());

        let max_speed = lanes
            .iter()
            .map(|l| l.speed_limit)
            .fold(DEFAULT_SPEED_LIMIT, f32::max);

        let entries: Vec<VertexEntry> = self
            .vertices
            .iter()
            .enumerate()
            .map(|(i, v)| VertexEntry { point: [v.pos.x, v.pos.y], id: VertexId(i as u32) })
            .collect();

        let lane_count = lanes.len();
        Ok(NavGraph {
            vertices: self.vertices,
            out_start,
            lanes,
            max_speed,
            vertex_occupant: vec![None; vertex_count],
            lane_occupant:   vec![None; lane_count],
            lane_blocked:    vec![false; lane_count],
            destinations:    BTreeMap::new(),
            spatial_idx:     RTree::bulk_load(entries),
        })
    }
}
