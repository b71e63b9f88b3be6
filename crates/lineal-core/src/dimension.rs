// crates/lineal-core/src/dimension.rs
use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::LinealError;

/// Measurement unit of a [`Dimension`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Device-independent pixels, multiplied by the content scale
    #[default]
    DeviceIndependentPixel,
    /// Physical pixels, used verbatim
    Pixel,
    /// Percentage of the reference size (0 to 100)
    Percent,
    /// Percentage of the viewport width
    ViewportWidth,
    /// Percentage of the viewport height
    ViewportHeight,
    /// Multiple of the root font size
    FontRelative,
}

impl Unit {
    fn suffix(self) -> &'static str {
        match self {
            Unit::DeviceIndependentPixel => "dp",
            Unit::Pixel => "px",
            Unit::Percent => "%",
            Unit::ViewportWidth => "vw",
            Unit::ViewportHeight => "vh",
            Unit::FontRelative => "em",
        }
    }
}

/// Everything a relative [`Dimension`] may need to become pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolveContext {
    pub content_scale: f32,
    pub viewport: Vec2,
    pub root_font_size: f32,
}

impl ResolveContext {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    pub fn with_content_scale(mut self, content_scale: f32) -> Self {
        self.content_scale = content_scale;
        self
    }

    pub fn with_root_font_size(mut self, root_font_size: f32) -> Self {
        self.root_font_size = root_font_size;
        self
    }
}

impl Default for ResolveContext {
    fn default() -> Self {
        Self {
            content_scale: 1.0,
            viewport: Vec2::ZERO,
            root_font_size: 16.0,
        }
    }
}

/// A magnitude paired with a unit. A NaN magnitude is the "unset" dimension.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "DimensionRepr", into = "String")]
pub struct Dimension {
    pub magnitude: f32,
    pub unit: Unit,
}

impl Dimension {
    pub const UNSET: Dimension = Dimension {
        magnitude: f32::NAN,
        unit: Unit::DeviceIndependentPixel,
    };

    pub const ZERO: Dimension = Dimension {
        magnitude: 0.0,
        unit: Unit::DeviceIndependentPixel,
    };

    pub const fn new(magnitude: f32, unit: Unit) -> Self {
        Self { magnitude, unit }
    }

    pub const fn dp(magnitude: f32) -> Self {
        Self::new(magnitude, Unit::DeviceIndependentPixel)
    }

    pub const fn px(magnitude: f32) -> Self {
        Self::new(magnitude, Unit::Pixel)
    }

    pub const fn percent(magnitude: f32) -> Self {
        Self::new(magnitude, Unit::Percent)
    }

    pub const fn vw(magnitude: f32) -> Self {
        Self::new(magnitude, Unit::ViewportWidth)
    }

    pub const fn vh(magnitude: f32) -> Self {
        Self::new(magnitude, Unit::ViewportHeight)
    }

    pub const fn em(magnitude: f32) -> Self {
        Self::new(magnitude, Unit::FontRelative)
    }

    /// Dimension that always resolves to positive infinity.
    pub const fn infinite() -> Self {
        Self::px(f32::INFINITY)
    }

    pub fn is_unset(&self) -> bool {
        self.magnitude.is_nan()
    }

    /// Convert to pixels. `reference` is the size a percentage refers to.
    ///
    /// Unset resolves to 0. Negative magnitudes are passed through; callers clamp where needed.
    pub fn resolve(&self, reference: f32, ctx: &ResolveContext) -> f32 {
        if self.is_unset() || self.magnitude == 0.0 {
            return 0.0;
        }

        match self.unit {
            Unit::DeviceIndependentPixel => self.magnitude * ctx.content_scale,
            Unit::Pixel => self.magnitude,
            Unit::Percent => {
                if reference == 0.0 {
                    0.0
                } else {
                    self.magnitude * reference / 100.0
                }
            }
            Unit::ViewportWidth => self.magnitude * ctx.viewport.x / 100.0,
            Unit::ViewportHeight => self.magnitude * ctx.viewport.y / 100.0,
            Unit::FontRelative => self.magnitude * ctx.root_font_size * ctx.content_scale,
        }
    }

    /// Resolve an optional dimension, treating `None` the same as unset.
    pub fn resolve_opt(dim: Option<Dimension>, reference: f32, ctx: &ResolveContext) -> f32 {
        dim.unwrap_or(Dimension::UNSET).resolve(reference, ctx)
    }

    /// Resolve an upper bound: `None` and unset mean "no constraint" (+infinity).
    pub fn resolve_max(dim: Option<Dimension>, reference: f32, ctx: &ResolveContext) -> f32 {
        match dim {
            Some(d) if !d.is_unset() => d.resolve(reference, ctx),
            _ => f32::INFINITY,
        }
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Dimension::UNSET
    }
}

impl PartialEq for Dimension {
    fn eq(&self, other: &Self) -> bool {
        if self.is_unset() || other.is_unset() {
            return self.is_unset() && other.is_unset();
        }
        self.magnitude == other.magnitude && self.unit == other.unit
    }
}

impl From<f32> for Dimension {
    fn from(value: f32) -> Self {
        Dimension::dp(value)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unset() {
            return write!(f, "unset");
        }
        write!(f, "{}{}", self.magnitude, self.unit.suffix())
    }
}

impl FromStr for Dimension {
    type Err = LinealError;

    /// Parses literals like `"50%"`, `"100px"`, `"12dp"`, `"10vw"`, `"1.5em"` or `"unset"`.
    /// A bare number is taken as device-independent pixels.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();

        if value.eq_ignore_ascii_case("unset") || value.eq_ignore_ascii_case("auto") {
            return Ok(Dimension::UNSET);
        }
        if value.eq_ignore_ascii_case("inf") || value.eq_ignore_ascii_case("infinity") {
            return Ok(Dimension::infinite());
        }

        const SUFFIXES: [(&str, Unit); 6] = [
            ("px", Unit::Pixel),
            ("dp", Unit::DeviceIndependentPixel),
            ("%", Unit::Percent),
            ("vw", Unit::ViewportWidth),
            ("vh", Unit::ViewportHeight),
            ("em", Unit::FontRelative),
        ];

        let (number, unit) = SUFFIXES
            .iter()
            .find_map(|(suffix, unit)| value.strip_suffix(suffix).map(|n| (n, *unit)))
            .unwrap_or((value, Unit::DeviceIndependentPixel));

        let magnitude = number
            .trim()
            .parse::<f32>()
            .map_err(|_| LinealError::InvalidDimension(value.to_string()))?;

        if magnitude.is_nan() {
            return Err(LinealError::InvalidDimension(value.to_string()));
        }

        Ok(Dimension::new(magnitude, unit))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DimensionRepr {
    Number(f32),
    Text(String),
}

impl TryFrom<DimensionRepr> for Dimension {
    type Error = LinealError;

    fn try_from(repr: DimensionRepr) -> Result<Self, Self::Error> {
        match repr {
            DimensionRepr::Number(n) => Ok(Dimension::dp(n)),
            DimensionRepr::Text(s) => s.parse(),
        }
    }
}

impl From<Dimension> for String {
    fn from(dim: Dimension) -> Self {
        dim.to_string()
    }
}

/// A pair of dimensions, generally an offset from the parent's origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimension2 {
    #[serde(default)]
    pub x: Dimension,
    #[serde(default)]
    pub y: Dimension,
}

impl Dimension2 {
    pub const UNSET: Dimension2 = Dimension2 {
        x: Dimension::UNSET,
        y: Dimension::UNSET,
    };

    pub fn new(x: Dimension, y: Dimension) -> Self {
        Self { x, y }
    }

    pub fn is_unset(&self) -> bool {
        self.x.is_unset() && self.y.is_unset()
    }

    /// Convert to a pixel offset relative to a parent of the given size.
    pub fn resolve(&self, parent_size: Vec2, ctx: &ResolveContext) -> Vec2 {
        Vec2::new(
            self.x.resolve(parent_size.x, ctx),
            self.y.resolve(parent_size.y, ctx),
        )
    }
}
