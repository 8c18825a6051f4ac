//! contextgraph - force-directed layout and interaction engine for context graphs.
//!
//! The crate computes node positions with a force simulation, frames them in a
//! viewport, and tracks selection, focus and compressed-link expansion. Drawing,
//! pointer capture and data transport are left to the host, which talks to the
//! engine through [`GraphEngine`] and reads a [`Frame`] every tick.

pub mod compression;
pub mod config;
pub mod engine;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod graph_types;
pub mod model;
pub mod overlays;
mod quadtree;
pub mod selection;
pub mod shapes;
pub mod simulation;
pub mod viewport;

pub use compression::{ExpandedLinkRequest, ExpansionOutcome, LinkCompressionManager};
pub use config::{EngineConfig, Viewport};
pub use engine::GraphEngine;
pub use error::{GraphError, GraphResult};
pub use frame::{Frame, LinkFrame, NodeFrame};
pub use geometry::{LinkLabel, Vec2};
pub use graph_types::{GraphData, LinkData, NodeData, Status};
pub use model::{GraphModel, Link, LinkIndex, LinkView, Node, NodeIndex, NodeLinks};
pub use overlays::DisplayOptions;
pub use selection::SelectionController;
pub use shapes::{NodeShape, ShapeTable};
pub use simulation::{DragPin, ForceSimulation, SimulationConfig};
pub use viewport::{BoundingBox, ViewTransform, ViewportFitter, compute_fit, compute_initial_fit};
