//! World ↔ screen transform for a presentation layer.

use fleet_core::Point;

/// World units added to each dimension before fitting, so vertices on the
/// boundary do not touch the margin.
pub const VIEW_PADDING: f32 = 3.0;

/// Axis-aligned bounding box in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Smallest box containing every point; `None` for an empty iterator.
    pub fn enclosing(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        Some(it.fold(Bounds { min: first, max: first }, |b, p| Bounds {
            min: Point::new(b.min.x.min(p.x), b.min.y.min(p.y)),
            max: Point::new(b.max.x.max(p.x), b.max.y.max(p.y)),
        }))
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn contains(&self, p: Point) -> bool {
        (self.min.x..=self.max.x).contains(&p.x) && (self.min.y..=self.max.y).contains(&p.y)
    }
}

/// Uniform scale plus centring offset mapping world bounds onto a screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    origin: Point,
    scale:  f32,
    offset: (f32, f32),
}

impl Viewport {
    /// Fit `bounds` (plus [`VIEW_PADDING`]) into a `width × height` screen
    /// leaving `margin` pixels on every side.  Scale is uniform, so the
    /// shorter fit wins and the other axis is centred.
    pub fn fit(bounds: Bounds, width: u32, height: u32, margin: u32) -> Self {
        let dims = (bounds.width() + VIEW_PADDING, bounds.height() + VIEW_PADDING);
        let usable = (
            (width as f32 - 2.0 * margin as f32).max(1.0),
            (height as f32 - 2.0 * margin as f32).max(1.0),
        );
        let scale = (usable.0 / dims.0).min(usable.1 / dims.1);
        let offset = (
            margin as f32 + (usable.0 - dims.0 * scale) / 2.0,
            margin as f32 + (usable.1 - dims.1 * scale) / 2.0,
        );
        let origin = Point::new(bounds.min.x - VIEW_PADDING / 2.0, bounds.min.y - VIEW_PADDING / 2.0);
        Self { origin, scale, offset }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn to_screen(&self, p: Point) -> (i32, i32) {
        (
            (self.offset.0 + (p.x - self.origin.x) * self.scale).round() as i32,
            (self.offset.1 + (p.y - self.origin.y) * self.scale).round() as i32,
        )
    }

    pub fn to_world(&self, x: i32, y: i32) -> Point {
        Point::new(
            (x as f32 - self.offset.0) / self.scale + self.origin.x,
            (y as f32 - self.offset.1) / self.scale + self.origin.y,
        )
    }
}
