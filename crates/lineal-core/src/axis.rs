// crates/lineal-core/src/axis.rs
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// One of the two layout axes. A linear container calls its own orientation the main axis and the
/// other one the cross axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn cross(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }

    /// Component of `v` along this axis.
    #[inline]
    pub fn of(self, v: Vec2) -> f32 {
        match self {
            Axis::Horizontal => v.x,
            Axis::Vertical => v.y,
        }
    }

    /// Build a vector from a component along this axis and one along the cross axis.
    #[inline]
    pub fn compose(self, main: f32, cross: f32) -> Vec2 {
        match self {
            Axis::Horizontal => Vec2::new(main, cross),
            Axis::Vertical => Vec2::new(cross, main),
        }
    }

    /// Replace the component of `v` along this axis.
    #[inline]
    pub fn with(self, v: Vec2, value: f32) -> Vec2 {
        match self {
            Axis::Horizontal => Vec2::new(value, v.y),
            Axis::Vertical => Vec2::new(v.x, value),
        }
    }

    /// Split an optional per-axis value into `(width, height)` enforcement arguments.
    #[inline]
    pub fn enforce(self, value: f32) -> (Option<f32>, Option<f32>) {
        match self {
            Axis::Horizontal => (Some(value), None),
            Axis::Vertical => (None, Some(value)),
        }
    }
}
