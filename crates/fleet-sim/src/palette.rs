//! Fixed robot colours.

use fleet_core::AgentId;
use fleet_robot::Color;

pub const PALETTE: [Color; 8] = [
    Color::new(230, 25, 75),
    Color::new(60, 180, 75),
    Color::new(0, 130, 200),
    Color::new(245, 130, 48),
    Color::new(145, 30, 180),
    Color::new(70, 200, 200),
    Color::new(240, 50, 230),
    Color::new(128, 128, 0),
];

/// `PALETTE[id % PALETTE.len()]`.
#[inline]
pub fn color_for(id: AgentId) -> Color {
    PALETTE[id.index() % PALETTE.len()]
}
