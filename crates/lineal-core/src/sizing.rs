// crates/lineal-core/src/sizing.rs
use serde::{Deserialize, Serialize};

use crate::{Axis, LinealError, Result};

/// Cross-axis placement of a child inside a linear container.
///
/// In a row Start/Center/End mean top/center/bottom, in a column left/center/right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Start,
    Center,
    End,
}

impl Alignment {
    /// Offset of a child of size `child` inside a span of size `container`.
    pub fn offset(self, container: f32, child: f32) -> f32 {
        match self {
            Alignment::Start => 0.0,
            Alignment::Center => (container - child) / 2.0,
            Alignment::End => container - child,
        }
    }
}

/// Growth descriptor a child carries for its parent linear container (a flex-grow analogue).
///
/// A row only reads `RowGrowth`, a column only reads `ColumnGrowth`; a descriptor for the other
/// orientation is ignored. A factor of 0 keeps the alignment override but disables growth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContainerSizing {
    RowGrowth {
        factor: f32,
        #[serde(default)]
        vertical_alignment: Alignment,
    },
    ColumnGrowth {
        factor: f32,
        #[serde(default)]
        horizontal_alignment: Alignment,
    },
}

fn validate_factor(factor: f32) -> Result<f32> {
    if factor.is_finite() && factor >= 0.0 {
        Ok(factor)
    } else {
        Err(LinealError::InvalidGrowthFactor(factor))
    }
}

impl ContainerSizing {
    pub fn row(factor: f32) -> Result<Self> {
        Self::row_aligned(factor, Alignment::Start)
    }

    pub fn row_aligned(factor: f32, vertical_alignment: Alignment) -> Result<Self> {
        Ok(ContainerSizing::RowGrowth {
            factor: validate_factor(factor)?,
            vertical_alignment,
        })
    }

    pub fn column(factor: f32) -> Result<Self> {
        Self::column_aligned(factor, Alignment::Start)
    }

    pub fn column_aligned(factor: f32, horizontal_alignment: Alignment) -> Result<Self> {
        Ok(ContainerSizing::ColumnGrowth {
            factor: validate_factor(factor)?,
            horizontal_alignment,
        })
    }

    /// Re-check a descriptor built by hand or deserialized.
    pub fn validate(self) -> Result<Self> {
        match self {
            ContainerSizing::RowGrowth { factor, .. } | ContainerSizing::ColumnGrowth { factor, .. } => {
                validate_factor(factor)?;
                Ok(self)
            }
        }
    }

    /// The main axis of the container this descriptor is meant for.
    pub fn axis(&self) -> Axis {
        match self {
            ContainerSizing::RowGrowth { .. } => Axis::Horizontal,
            ContainerSizing::ColumnGrowth { .. } => Axis::Vertical,
        }
    }

    pub fn factor(&self) -> f32 {
        match self {
            ContainerSizing::RowGrowth { factor, .. } | ContainerSizing::ColumnGrowth { factor, .. } => *factor,
        }
    }

    pub fn alignment(&self) -> Alignment {
        match self {
            ContainerSizing::RowGrowth { vertical_alignment, .. } => *vertical_alignment,
            ContainerSizing::ColumnGrowth { horizontal_alignment, .. } => *horizontal_alignment,
        }
    }

    /// Growth factor for a container whose main axis is `axis`, if this child grows there.
    pub fn growth_for(&self, axis: Axis) -> Option<f32> {
        let factor = self.factor();
        (self.axis() == axis && factor > 0.0).then_some(factor)
    }

    /// Cross-axis alignment override for a container whose main axis is `axis`.
    pub fn alignment_for(&self, axis: Axis) -> Option<Alignment> {
        (self.axis() == axis).then(|| self.alignment())
    }
}
