//! JSON graph definition loader.
//!
//! # Format
//!
//! ```json
//! {
//!   "levels": {
//!     "L1": {
//!       "vertices": [[0.0, 0.0, {"name": "dock"}], [4.0, 0.0, {"is_charger": true}]],
//!       "lanes":    [[0, 1, {"speed_limit": 2.0}], [1, 0, {}]]
//!     }
//!   }
//! }
//! ```
//!
//! Levels keep their document order; the plain loaders drive the first one.
//! A vertex without a name is called `v{index}`.  A lane without a positive
//! speed limit gets [`DEFAULT_SPEED_LIMIT`](crate::DEFAULT_SPEED_LIMIT).

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use fleet_core::{Point, VertexId};

use crate::{LoadError, NavGraph, NavGraphBuilder};

// ── Records ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct VertexAttrs {
    name:       Option<String>,
    is_charger: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct LaneAttrs {
    speed_limit: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
struct VertexDef(f32, f32, #[serde(default)] VertexAttrs);

#[derive(Debug, Clone, Deserialize)]
struct LaneDef(u64, u64, #[serde(default)] LaneAttrs);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct LevelDef {
    vertices: Vec<VertexDef>,
    lanes:    Vec<LaneDef>,
}

/// A parsed, not yet validated, graph definition file.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphDefinition {
    levels: serde_json::Map<String, serde_json::Value>,
}

impl GraphDefinition {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn parse(s: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Level names in document order.
    pub fn level_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.levels.keys().map(String::as_str)
    }

    pub fn first_level(&self) -> Option<&str> {
        self.level_names().next()
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load the first level of the definition file at `path`.
pub fn load_graph(path: &Path) -> Result<NavGraph, LoadError> {
    let file = std::fs::File::open(path)?;
    load_graph_reader(std::io::BufReader::new(file))
}

/// Like [`load_graph`] but reads from any `Read` source.
pub fn load_graph_reader<R: Read>(reader: R) -> Result<NavGraph, LoadError> {
    let def = GraphDefinition::from_reader(reader)?;
    let first = def.first_level().ok_or(LoadError::NoLevels)?.to_owned();
    load_level(&def, &first)
}

/// Like [`load_graph`] but parses an in-memory string.
pub fn load_graph_str(s: &str) -> Result<NavGraph, LoadError> {
    let def = GraphDefinition::parse(s)?;
    let first = def.first_level().ok_or(LoadError::NoLevels)?.to_owned();
    load_level(&def, &first)
}

/// Build the graph for the level called `name`.
pub fn load_level(def: &GraphDefinition, name: &str) -> Result<NavGraph, LoadError> {
    if def.levels.is_empty() {
        return Err(LoadError::NoLevels);
    }
    let raw = def
        .levels
        .get(name)
        .ok_or_else(|| LoadError::UnknownLevel(name.to_owned()))?;
    let level = LevelDef::deserialize(raw)?;

    let vertex_count = level.vertices.len();
    let mut b = NavGraphBuilder::with_capacity(vertex_count, level.lanes.len());

    for (i, VertexDef(x, y, attrs)) in level.vertices.into_iter().enumerate() {
        let name = attrs.name.unwrap_or_else(|| format!("v{i}"));
        b.add_vertex(Point::new(x, y), name, attrs.is_charger);
    }

    for (i, LaneDef(from, to, attrs)) in level.lanes.into_iter().enumerate() {
        let from = vertex_ref(i, from, vertex_count)?;
        let to = vertex_ref(i, to, vertex_count)?;
        b.add_lane(from, to, attrs.speed_limit.unwrap_or(0.0));
    }

    let graph = b.build()?;
    info!(
        level = name,
        vertices = graph.vertex_count(),
        lanes = graph.lane_count(),
        "navigation graph loaded"
    );
    Ok(graph)
}

fn vertex_ref(lane: usize, raw: u64, count: usize) -> Result<VertexId, LoadError> {
    if raw as usize >= count || raw > u32::MAX as u64 {
        return Err(LoadError::VertexOutOfRange { lane, vertex: raw, count });
    }
    Ok(VertexId(raw as u32))
}
