// crates/lineal-core/src/lib.rs
pub mod axis;
pub mod dimension;
pub mod element_layout;
pub mod sizing;
pub mod arrangement;
pub mod elements;
pub mod scene;

pub use axis::*;
pub use dimension::*;
pub use element_layout::*;
pub use sizing::*;
pub use arrangement::*;
pub use elements::*;
pub use scene::*;

#[derive(Debug, thiserror::Error)]
pub enum LinealError {
    #[error("Invalid dimension literal: {0}")]
    InvalidDimension(String),

    #[error("Invalid growth factor: {0} (must be finite and non-negative)")]
    InvalidGrowthFactor(f32),

    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    #[error("Element {child} already has a parent")]
    AlreadyParented { child: ElementId },

    #[error("Element {0} is not a linear container")]
    NotAContainer(ElementId),

    #[error("Invalid scene: {0}")]
    InvalidScene(String),
}

pub type Result<T> = std::result::Result<T, LinealError>;
