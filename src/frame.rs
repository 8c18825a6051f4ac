//! Per-frame snapshot for the rendering collaborator
//!
//! The renderer never reads the model directly; it draws whatever the latest
//! [`Frame`] says.

use serde::Serialize;

use crate::geometry::{LinkLabel, Vec2};
use crate::graph_types::Status;
use crate::model::GraphModel;
use crate::overlays::DisplayOptions;
use crate::shapes::{NodeShape, ShapeTable};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeFrame {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub shape: NodeShape,
    pub status: Status,
    pub highlighted: bool,
    pub focus: bool,
    pub position: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkFrame {
    pub source: String,
    pub target: String,
    pub source_position: Vec2,
    pub target_position: Vec2,
    #[serde(rename = "type")]
    pub link_type: String,
    pub status: Status,
    pub compressed: bool,
    pub label: LinkLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub nodes: Vec<NodeFrame>,
    pub links: Vec<LinkFrame>,
    pub overlays: DisplayOptions,
}

impl Frame {
    /// Capture node positions and link endpoints as they are right now
    pub fn capture(model: &GraphModel, shapes: &ShapeTable, overlays: DisplayOptions) -> Self {
        let nodes = model
            .nodes()
            .iter()
            .map(|node| NodeFrame {
                id: node.id.clone(),
                name: node.name.clone(),
                node_type: node.node_type.clone(),
                shape: shapes.shape_of(&node.node_type),
                status: node.status,
                highlighted: node.highlighted,
                focus: node.is_focus,
                position: node.position,
            })
            .collect();

        let links = model
            .link_views()
            .map(|view| LinkFrame {
                source: view.source.id.clone(),
                target: view.target.id.clone(),
                source_position: view.source.position,
                target_position: view.target.position,
                link_type: view.link.link_type.clone(),
                status: view.link.status,
                compressed: view.link.is_compressed,
                label: LinkLabel::between(view.source.position, view.target.position),
            })
            .collect();

        Self {
            nodes,
            links,
            overlays,
        }
    }

    /// Nodes that should show the highlight overlay
    pub fn highlighted(&self) -> impl Iterator<Item = &NodeFrame> {
        self.nodes
            .iter()
            .filter(|n| self.overlays.highlight_enabled && n.highlighted)
    }

    /// Node that should show the focus indicator
    pub fn focus_indicator(&self) -> Option<&NodeFrame> {
        if !self.overlays.focus_enabled {
            return None;
        }
        self.nodes.iter().find(|n| n.focus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph_types::{LinkData, NodeData};

    fn model() -> GraphModel {
        let mut model = GraphModel::new();
        model
            .load(
                vec![
                    NodeData::new("a", "host").focused(),
                    NodeData::new("b", "volume").with_status("critical"),
                ],
                vec![LinkData::new("a", "b", "attached").compressed()],
            )
            .unwrap();
        model
    }

    #[test]
    fn capture_mirrors_model() {
        let model = model();
        let shapes = ShapeTable::new().with("volume", NodeShape::Tall);
        let frame = Frame::capture(&model, &shapes, DisplayOptions::default());

        assert_eq!(frame.nodes.len(), 2);
        assert_eq!(frame.nodes[1].shape, NodeShape::Tall);
        assert_eq!(frame.nodes[0].shape, NodeShape::Circle);
        assert_eq!(frame.links[0].status, Status::Critical);
        assert!(frame.links[0].compressed);
        assert_eq!(frame.links[0].source, "a");
    }

    #[test]
    fn hidden_focus_overlay_keeps_focus_flag() {
        let model = model();
        let overlays = DisplayOptions {
            focus_enabled: false,
            ..Default::default()
        };
        let frame = Frame::capture(&model, &ShapeTable::new(), overlays);

        assert!(frame.focus_indicator().is_none());
        assert!(frame.nodes[0].focus);
    }

    #[test]
    fn node_frame_json_shape() {
        let mut model = GraphModel::new();
        model
            .load(vec![NodeData::new("n1", "host").with_name("web")], vec![])
            .unwrap();
        let frame = Frame::capture(&model, &ShapeTable::new(), DisplayOptions::default());

        insta::assert_snapshot!(
            serde_json::to_string(&frame.nodes[0]).unwrap(),
            @r#"{"id":"n1","name":"web","type":"host","shape":"circle","status":"normal","highlighted":false,"focus":false,"position":{"x":0.0,"y":0.0}}"#
        );
    }
}
