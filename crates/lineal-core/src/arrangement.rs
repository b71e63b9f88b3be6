// crates/lineal-core/src/arrangement.rs
use serde::{Deserialize, Serialize};

use crate::Dimension;

/// Main-axis distribution of a linear container's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Justification {
    /// Packed at the start (left in a row, top in a column).
    #[default]
    Start,
    Center,
    End,
    /// `#1##2##3#`: half a gap before the first child and after the last one.
    SpaceAround,
    /// `1##2##3`: no space before the first child or after the last one.
    SpaceBetween,
    /// `#1#2#3#`: equal gaps everywhere.
    SpaceEvenly,
}

impl Justification {
    pub fn is_space_distributing(self) -> bool {
        matches!(
            self,
            Justification::SpaceAround | Justification::SpaceBetween | Justification::SpaceEvenly
        )
    }
}

/// Spacing and justification of a linear container along its main axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Arrangement {
    /// Literal gap between children. Ignored by the Space* justifications, which derive the gap
    /// from leftover space instead.
    pub spacing: Dimension,
    pub justification: Justification,
}

impl Arrangement {
    pub fn new(justification: Justification, spacing: Dimension) -> Self {
        Self {
            spacing,
            justification,
        }
    }

    /// A literal gap. Space* justifications fall back to Start since the gap would be ignored.
    pub fn spaced_by(spacing: Dimension, justification: Justification) -> Self {
        let justification = if justification.is_space_distributing() {
            Justification::Start
        } else {
            justification
        };
        Self::new(justification, spacing)
    }

    pub fn justified(justification: Justification) -> Self {
        Self::new(justification, Dimension::UNSET)
    }

    pub fn is_spacing_relevant(&self) -> bool {
        !self.justification.is_space_distributing()
    }
}
