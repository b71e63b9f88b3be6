// crates/lineal-core/src/element_layout.rs
use serde::{Deserialize, Serialize};

use crate::{Axis, Dimension};

/// How an element's width or height is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// The preferred dimension is always respected, no shrinking or stretching.
    Fixed,
    /// Anywhere between min and max. Sits at the min unless it prefers the max.
    #[default]
    MinMax,
    /// Prefers the preferred dimension, but may shrink or stretch between min and max.
    MinMaxAndPreferred,
}

/// The sizing policy of one axis, copied out of an [`ElementLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisLayout {
    pub mode: LayoutMode,
    pub preferred: Option<Dimension>,
    pub min: Option<Dimension>,
    pub max: Option<Dimension>,
    pub prefers_max: bool,
}

impl AxisLayout {
    /// The single dimension this axis asks for.
    ///
    /// MinMax yields the min (0 when unset), or the max (+infinity when unset) when it prefers the max.
    pub fn suggested(&self) -> Option<Dimension> {
        match self.mode {
            LayoutMode::Fixed | LayoutMode::MinMaxAndPreferred => self.preferred,
            LayoutMode::MinMax => {
                if self.prefers_max {
                    match self.max {
                        Some(max) if !max.is_unset() => Some(max),
                        _ => Some(Dimension::infinite()),
                    }
                } else {
                    match self.min {
                        Some(min) if !min.is_unset() => Some(min),
                        _ => Some(Dimension::ZERO),
                    }
                }
            }
        }
    }

    pub fn has_max(&self) -> bool {
        matches!(self.max, Some(max) if !max.is_unset())
    }

    pub fn has_min(&self) -> bool {
        matches!(self.min, Some(min) if !min.is_unset())
    }

    /// True when this axis stretches toward its max (the "fill" contract).
    pub fn is_stretching(&self) -> bool {
        self.mode == LayoutMode::MinMax && self.prefers_max
    }
}

/// Per-element sizing policy with independent width and height modes.
///
/// Fields are only reachable through the setters so that an axis never carries a stale
/// combination (a Fixed width with a leftover min, for example).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementLayout {
    width: AxisFields,
    height: AxisFields,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct AxisFields {
    mode: LayoutMode,
    preferred: Option<Dimension>,
    min: Option<Dimension>,
    max: Option<Dimension>,
    prefers_max: bool,
}

impl AxisFields {
    fn set_fixed(&mut self, value: Dimension) {
        *self = AxisFields {
            mode: LayoutMode::Fixed,
            preferred: Some(value),
            ..AxisFields::default()
        };
    }

    fn set_min_max(&mut self, min: Dimension, max: Dimension, prefers_max: Option<bool>) {
        *self = AxisFields {
            mode: LayoutMode::MinMax,
            preferred: None,
            min: Some(min),
            max: Some(max),
            prefers_max: prefers_max.unwrap_or(self.mode == LayoutMode::MinMax && self.prefers_max),
        };
    }

    fn set_min_max_and_preferred(&mut self, preferred: Dimension, min: Dimension, max: Dimension) {
        *self = AxisFields {
            mode: LayoutMode::MinMaxAndPreferred,
            preferred: Some(preferred),
            min: Some(min),
            max: Some(max),
            prefers_max: false,
        };
    }

    fn set_prefers_max(&mut self, prefers_max: bool) -> bool {
        if self.mode != LayoutMode::MinMax {
            return false;
        }
        self.prefers_max = prefers_max;
        true
    }

    fn view(&self) -> AxisLayout {
        AxisLayout {
            mode: self.mode,
            preferred: self.preferred,
            min: self.min,
            max: self.max,
            prefers_max: self.prefers_max,
        }
    }
}

impl ElementLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Both axes fixed.
    pub fn fixed(width: impl Into<Dimension>, height: impl Into<Dimension>) -> Self {
        let mut layout = Self::new();
        layout.set_fixed_width(width.into()).set_fixed_height(height.into());
        layout
    }

    pub fn set_fixed_width(&mut self, width: Dimension) -> &mut Self {
        self.width.set_fixed(width);
        self
    }

    pub fn set_fixed_height(&mut self, height: Dimension) -> &mut Self {
        self.height.set_fixed(height);
        self
    }

    /// `prefers_max` of `None` keeps the current flag when the axis was already MinMax.
    pub fn set_min_max_width(
        &mut self,
        min: Dimension,
        max: Dimension,
        prefers_max: Option<bool>,
    ) -> &mut Self {
        self.width.set_min_max(min, max, prefers_max);
        self
    }

    pub fn set_min_max_height(
        &mut self,
        min: Dimension,
        max: Dimension,
        prefers_max: Option<bool>,
    ) -> &mut Self {
        self.height.set_min_max(min, max, prefers_max);
        self
    }

    pub fn set_min_max_and_preferred_width(
        &mut self,
        preferred: Dimension,
        min: Dimension,
        max: Dimension,
    ) -> &mut Self {
        self.width.set_min_max_and_preferred(preferred, min, max);
        self
    }

    pub fn set_min_max_and_preferred_height(
        &mut self,
        preferred: Dimension,
        min: Dimension,
        max: Dimension,
    ) -> &mut Self {
        self.height.set_min_max_and_preferred(preferred, min, max);
        self
    }

    /// Only applies when the width mode is MinMax; returns whether it was applied.
    pub fn set_prefers_max_width(&mut self, prefers_max: bool) -> bool {
        self.width.set_prefers_max(prefers_max)
    }

    /// Only applies when the height mode is MinMax; returns whether it was applied.
    pub fn set_prefers_max_height(&mut self, prefers_max: bool) -> bool {
        self.height.set_prefers_max(prefers_max)
    }

    pub fn axis(&self, axis: Axis) -> AxisLayout {
        match axis {
            Axis::Horizontal => self.width.view(),
            Axis::Vertical => self.height.view(),
        }
    }

    pub fn width_mode(&self) -> LayoutMode {
        self.width.mode
    }

    pub fn height_mode(&self) -> LayoutMode {
        self.height.mode
    }

    pub fn preferred_width(&self) -> Option<Dimension> {
        self.width.preferred
    }

    pub fn preferred_height(&self) -> Option<Dimension> {
        self.height.preferred
    }

    pub fn min_width(&self) -> Option<Dimension> {
        self.width.min
    }

    pub fn min_height(&self) -> Option<Dimension> {
        self.height.min
    }

    pub fn max_width(&self) -> Option<Dimension> {
        self.width.max
    }

    pub fn max_height(&self) -> Option<Dimension> {
        self.height.max
    }

    pub fn prefers_max_width(&self) -> bool {
        self.width.prefers_max
    }

    pub fn prefers_max_height(&self) -> bool {
        self.height.prefers_max
    }

    pub fn suggested_width(&self) -> Option<Dimension> {
        self.width.view().suggested()
    }

    pub fn suggested_height(&self) -> Option<Dimension> {
        self.height.view().suggested()
    }

    /// Fixed on both axes: the only layout a container may force a size onto when shrinking.
    pub fn is_fully_fixed(&self) -> bool {
        self.width.mode == LayoutMode::Fixed && self.height.mode == LayoutMode::Fixed
    }
}
