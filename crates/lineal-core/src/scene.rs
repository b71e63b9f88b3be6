// crates/lineal-core/src/scene.rs
//! Declarative scene description, loaded from JSON by the `lineal` binary.

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Alignment, Arrangement, Axis, ContainerSizing, Dimension, Dimension2, Element, ElementId,
    ElementLayout, ElementTree, LinealError, MeasureFn, MeasureInput, ResolveContext, Result,
};

/// Unit-resolution settings shared by the whole scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub content_scale: f32,
    pub root_font_size: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            content_scale: 1.0,
            root_font_size: 16.0,
        }
    }
}

impl LayoutConfig {
    pub fn resolve_context(&self, viewport: Vec2) -> ResolveContext {
        ResolveContext::new(viewport)
            .with_content_scale(self.content_scale)
            .with_root_font_size(self.root_font_size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    #[default]
    Plain,
    Row,
    Column,
    Text,
}

/// Sizing rule for one axis of a [`SceneNode`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AxisRule {
    Fixed {
        value: Dimension,
    },
    MinMax {
        #[serde(default)]
        min: Dimension,
        #[serde(default)]
        max: Dimension,
        #[serde(default)]
        prefers_max: bool,
    },
    MinMaxAndPreferred {
        preferred: Dimension,
        #[serde(default)]
        min: Dimension,
        #[serde(default)]
        max: Dimension,
    },
}

/// Either a bare dimension (shorthand for a fixed axis) or a full [`AxisRule`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisSpec {
    Fixed(Dimension),
    Rule(AxisRule),
}

impl AxisSpec {
    fn apply(&self, layout: &mut ElementLayout, axis: Axis) {
        let rule = match *self {
            AxisSpec::Fixed(value) => AxisRule::Fixed { value },
            AxisSpec::Rule(rule) => rule,
        };

        match (rule, axis) {
            (AxisRule::Fixed { value }, Axis::Horizontal) => {
                layout.set_fixed_width(value);
            }
            (AxisRule::Fixed { value }, Axis::Vertical) => {
                layout.set_fixed_height(value);
            }
            (AxisRule::MinMax { min, max, prefers_max }, Axis::Horizontal) => {
                layout.set_min_max_width(min, max, Some(prefers_max));
            }
            (AxisRule::MinMax { min, max, prefers_max }, Axis::Vertical) => {
                layout.set_min_max_height(min, max, Some(prefers_max));
            }
            (AxisRule::MinMaxAndPreferred { preferred, min, max }, Axis::Horizontal) => {
                layout.set_min_max_and_preferred_width(preferred, min, max);
            }
            (AxisRule::MinMaxAndPreferred { preferred, min, max }, Axis::Vertical) => {
                layout.set_min_max_and_preferred_height(preferred, min, max);
            }
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneNode {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<AxisSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<AxisSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Dimension2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizing: Option<ContainerSizing>,
    #[serde(default)]
    pub arrangement: Arrangement,
    #[serde(default)]
    pub alignment: Alignment,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub clip_children: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Vec4>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Font size in device-independent pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneFile {
    #[serde(default)]
    pub config: LayoutConfig,
    pub root: SceneNode,
}

impl SceneFile {
    /// Build an element tree whose root is the scene's root node.
    pub fn build(&self) -> Result<ElementTree> {
        let mut tree = ElementTree::new();
        let root = self.root.build_into(&mut tree, None, &self.config)?;
        tree.set_root(root)?;
        debug!("Built scene with {} elements", tree.len());
        Ok(tree)
    }
}

impl SceneNode {
    fn to_element(&self, config: &LayoutConfig) -> Result<Element> {
        let mut element = match self.kind {
            NodeKind::Plain => Element::plain(),
            NodeKind::Row => Element::row(self.arrangement).with_alignment(self.alignment),
            NodeKind::Column => Element::column(self.arrangement).with_alignment(self.alignment),
            NodeKind::Text => {
                let text = self.text.clone().ok_or_else(|| {
                    LinealError::InvalidScene(format!("text node '{}' has no text", self.name))
                })?;
                let font_size = self.font_size.unwrap_or(config.root_font_size);
                Element::measured(text_measure(text, font_size * config.content_scale))
            }
        };

        if self.kind == NodeKind::Text && !self.children.is_empty() {
            return Err(LinealError::InvalidScene(format!(
                "text node '{}' cannot have children",
                self.name
            )));
        }

        let mut layout = ElementLayout::new();
        if let Some(width) = &self.width {
            width.apply(&mut layout, Axis::Horizontal);
        }
        if let Some(height) = &self.height {
            height.apply(&mut layout, Axis::Vertical);
        }

        element = element
            .with_name(self.name.clone())
            .with_layout(layout)
            .with_enabled(self.enabled)
            .with_clip(self.clip_children);
        element.visible = self.visible;
        if let Some(position) = self.position {
            element = element.with_position(position);
        }
        if let Some(sizing) = self.sizing {
            element = element.with_sizing(sizing.validate()?);
        }
        if let Some(background) = self.background {
            element = element.with_background(background);
        }
        Ok(element)
    }

    fn build_into(
        &self,
        tree: &mut ElementTree,
        parent: Option<ElementId>,
        config: &LayoutConfig,
    ) -> Result<ElementId> {
        let id = tree.insert(self.to_element(config)?);
        if let Some(parent) = parent {
            tree.append_child(parent, id)?;
        }
        for child in &self.children {
            child.build_into(tree, Some(id), config)?;
        }
        Ok(id)
    }
}

/// Rough single-font text metrics: half an em per glyph, wrapping when the width is enforced.
fn text_measure(text: String, font_size: f32) -> MeasureFn {
    let glyphs = text.chars().count() as f32;
    let line_height = font_size * 1.2;
    MeasureFn::new(move |input: &MeasureInput| {
        let natural_width = glyphs * font_size * 0.5;
        let width = input.enforced_width.unwrap_or(natural_width.min(input.max.x));
        let lines = if width > 0.0 && natural_width > width {
            (natural_width / width).ceil()
        } else {
            1.0
        };
        let height = input.enforced_height.unwrap_or(lines * line_height);
        Vec2::new(width, height)
    })
}
