//! A path with a cursor.

use fleet_core::VertexId;
use fleet_graph::Path;

/// The robot's current route.  `cursor` indexes the vertex the robot last
/// reached; the lane being driven (or requested) runs to `cursor + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    path:   Path,
    cursor: usize,
}

impl Plan {
    pub fn new(path: Path) -> Self {
        Self { path, cursor: 0 }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn target(&self) -> VertexId {
        self.path.goal()
    }

    /// The vertex last reached.
    pub fn current(&self) -> VertexId {
        self.path.vertices()[self.cursor]
    }

    /// The vertex the next lane leads to, if any remain.
    pub fn next_vertex(&self) -> Option<VertexId> {
        self.path.get(self.cursor + 1)
    }

    /// Move the cursor to the next vertex.  No-op once finished.
    pub fn advance(&mut self) {
        if !self.is_finished() {
            self.cursor += 1;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.cursor + 1 >= self.path.vertices().len()
    }

    /// Lanes left to drive, including the one in progress.
    pub fn remaining_hops(&self) -> usize {
        self.path.hops() - self.cursor
    }
}
