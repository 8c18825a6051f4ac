//! Node shape categories and the type-to-shape table

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Glyph drawn for a node, chosen from its type tag
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum NodeShape {
    #[default]
    Circle,
    Oval,
    Square,
    /// Rectangle taller than wide
    Tall,
    /// Rectangle wider than tall
    Wide,
    Triangle,
    Pentagon,
    Hexagon,
    Rhombus,
    Trapezoid,
    Parallelogram,
}

/// Maps each shape to the node types drawn with it
///
/// Types not listed anywhere fall back to [`NodeShape::Circle`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeTable {
    shapes: BTreeMap<NodeShape, Vec<String>>,
}

impl ShapeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `node_type` under `shape`, removing it from any other shape
    pub fn assign(&mut self, node_type: impl Into<String>, shape: NodeShape) {
        let node_type = node_type.into();
        for types in self.shapes.values_mut() {
            types.retain(|t| *t != node_type);
        }
        self.shapes.entry(shape).or_default().push(node_type);
    }

    pub fn with(mut self, node_type: impl Into<String>, shape: NodeShape) -> Self {
        self.assign(node_type, shape);
        self
    }

    /// Shape for a node type
    pub fn shape_of(&self, node_type: &str) -> NodeShape {
        self.shapes
            .iter()
            .find(|(_, types)| types.iter().any(|t| t == node_type))
            .map(|(shape, _)| *shape)
            .unwrap_or_default()
    }
}
