//! Agent id allocation.

use fleet_core::AgentId;

/// Source of ids for newly spawned robots.
pub trait IdentityStrategy: Send {
    fn next_id(&mut self) -> AgentId;
}

/// Monotonic counter.  The default strategy starts at 0.
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: u32,
}

impl SequentialIds {
    pub fn starting_at(first: u32) -> Self {
        Self { next: first }
    }
}

impl IdentityStrategy for SequentialIds {
    fn next_id(&mut self) -> AgentId {
        let id = AgentId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

impl<F> IdentityStrategy for F
where
    F: FnMut() -> AgentId + Send,
{
    fn next_id(&mut self) -> AgentId {
        self()
    }
}
