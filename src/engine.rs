//! Composition root
//!
//! [`GraphEngine`] owns the model, the simulation, the compression manager,
//! the selection controller and the overlay options, and is the only public
//! entry point that mutates them. The host calls [`GraphEngine::tick`] once per
//! frame and hands [`GraphEngine::frame`] to its renderer.

use tracing::{debug, warn};

use crate::compression::{ExpandedLinkRequest, ExpansionOutcome, LinkCompressionManager};
use crate::config::EngineConfig;
use crate::error::GraphResult;
use crate::frame::Frame;
use crate::geometry::Vec2;
use crate::graph_types::GraphData;
use crate::model::{GraphModel, LinkIndex, LinkView, Node, NodeIndex};
use crate::overlays::DisplayOptions;
use crate::selection::SelectionController;
use crate::simulation::{DragPin, ForceSimulation};
use crate::viewport::{ViewTransform, ViewportFitter};

#[derive(Debug)]
pub struct GraphEngine {
    config: EngineConfig,
    model: GraphModel,
    simulation: ForceSimulation,
    fitter: ViewportFitter,
    compression: LinkCompressionManager,
    selection: SelectionController,
    overlays: DisplayOptions,
    drag: Option<DragPin>,
    view: ViewTransform,
}

impl Default for GraphEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl GraphEngine {
    pub fn new(config: EngineConfig) -> Self {
        let fitter = ViewportFitter::new(
            config.viewport.width,
            config.viewport.height,
            config.fit_padding,
        );
        let simulation = ForceSimulation::new(config.simulation.clone(), fitter.center());
        Self {
            config,
            model: GraphModel::new(),
            simulation,
            fitter,
            compression: LinkCompressionManager::new(),
            selection: SelectionController::new(),
            overlays: DisplayOptions::default(),
            drag: None,
            view: ViewTransform::default(),
        }
    }

    // ---- observers ----

    pub fn on_node_select<F>(&mut self, callback: F)
    where
        F: FnMut(Option<&Node>) + 'static,
    {
        self.selection.on_node_select(callback);
    }

    pub fn on_link_select<F>(&mut self, callback: F)
    where
        F: FnMut(Option<LinkView<'_>>) + 'static,
    {
        self.selection.on_link_select(callback);
    }

    pub fn on_focus_change<F>(&mut self, callback: F)
    where
        F: FnMut(Option<&Node>) + 'static,
    {
        self.selection.on_focus_change(callback);
    }

    pub fn on_expand_request<F>(&mut self, callback: F)
    where
        F: FnMut(&[ExpandedLinkRequest]) -> ExpansionOutcome + 'static,
    {
        self.compression.set_collaborator(callback);
    }

    // ---- data ----

    /// Replace the graph
    ///
    /// Clears both selections and the expansion log, applies the input's focus
    /// flag (notifying the focus observer even when there is none), resets the
    /// view to the node-count heuristic and restarts the simulation. On error
    /// nothing changes.
    pub fn load(&mut self, data: GraphData) -> GraphResult<()> {
        let focus = self.model.load(data.nodes, data.links)?;

        self.drag = None;
        self.compression.clear();
        self.selection.select_node(&self.model, None);
        self.selection.select_link(&self.model, None);
        self.selection.set_focus(&mut self.model, focus);

        self.view = self.fitter.initial_fit(self.model.node_count());
        debug!(
            scale = self.view.scale,
            dx = self.view.translate_x,
            dy = self.view.translate_y,
            "initial view"
        );

        self.restart();
        Ok(())
    }

    /// Add nodes and links on top of the current graph
    ///
    /// Re-announces the current node selection and restarts the simulation.
    pub fn merge(&mut self, data: GraphData) -> GraphResult<Vec<NodeIndex>> {
        let inserted = self.model.merge(data.nodes, data.links)?;
        let selected = self.selection.selected_node();
        self.selection.select_node(&self.model, selected);
        self.restart();
        Ok(inserted)
    }

    fn restart(&mut self) {
        let (nodes, _) = self.model.layout_parts();
        self.simulation.reseed(nodes);
        self.simulation.start();
    }

    // ---- simulation ----

    /// Re-engage the tick loop and re-prime cooling; positions are kept
    pub fn start(&mut self) {
        self.simulation.start();
    }

    /// Advance the layout by one step. Returns `false` until started.
    pub fn tick(&mut self) -> bool {
        let (nodes, links) = self.model.layout_parts();
        self.simulation.tick(nodes, links, self.drag)
    }

    /// Advance the layout by `ticks` steps
    pub fn run(&mut self, ticks: usize) {
        for _ in 0..ticks {
            if !self.tick() {
                break;
            }
        }
    }

    /// Grab a node; it stays where it is until `drag_to` moves it
    pub fn drag_start(&mut self, node_id: &str) -> bool {
        let Some(index) = self.model.index_of(node_id) else {
            warn!(node_id, "drag on unknown node");
            return false;
        };
        let position = self.model.nodes()[index.index()].position;
        self.drag = Some(DragPin {
            node: index,
            position,
        });
        // Wake the layout so neighbours react to the drag
        self.simulation.start();
        true
    }

    /// Move the dragged node; applied as a pin on each following tick
    pub fn drag_to(&mut self, x: f32, y: f32) {
        if let Some(pin) = self.drag.as_mut() {
            pin.position = Vec2::new(x, y);
        }
    }

    pub fn drag_end(&mut self) {
        self.drag = None;
    }

    pub fn dragging(&self) -> Option<NodeIndex> {
        self.drag.map(|pin| pin.node)
    }

    // ---- selection ----

    pub fn select_node(&mut self, node: Option<NodeIndex>) {
        self.selection.select_node(&self.model, node);
    }

    /// Select by id; an unknown id clears the selection
    pub fn select_node_by_id(&mut self, node_id: &str) {
        let node = self.model.index_of(node_id);
        self.selection.select_node(&self.model, node);
    }

    pub fn select_link(&mut self, link: Option<LinkIndex>) {
        self.selection.select_link(&self.model, link);
    }

    pub fn selected_node(&self) -> Option<&Node> {
        self.selection
            .selected_node()
            .and_then(|index| self.model.node(index))
    }

    pub fn selected_link(&self) -> Option<LinkView<'_>> {
        self.selection
            .selected_link()
            .and_then(|index| self.model.link_view(index))
    }

    /// Move focus (or clear it) and turn the focus indicator back on
    pub fn set_focus(&mut self, node: Option<NodeIndex>) {
        self.overlays.set_focus_enabled(true);
        self.selection.set_focus(&mut self.model, node);
    }

    /// Focus a node by id. Unknown ids are ignored.
    pub fn set_focus_by_id(&mut self, node_id: &str) -> bool {
        match self.model.index_of(node_id) {
            Some(index) => {
                self.set_focus(Some(index));
                true
            }
            None => {
                warn!(node_id, "focus requested for unknown node");
                false
            }
        }
    }

    pub fn focus_node(&self) -> Option<&Node> {
        self.model.focus_node()
    }

    // ---- overlays ----

    pub fn toggle_highlight(&mut self) -> bool {
        self.overlays.toggle_highlight()
    }

    pub fn toggle_focus(&mut self) -> bool {
        self.overlays.toggle_focus()
    }

    pub fn overlays(&self) -> DisplayOptions {
        self.overlays
    }

    // ---- compression ----

    /// Ask the data collaborator to expand a compressed link
    ///
    /// Links that are not compressed are ignored.
    pub fn expand_link(&mut self, link: LinkIndex) -> Option<ExpansionOutcome> {
        let view = self.model.link_view(link)?;
        if !view.link.is_compressed {
            debug!(
                source = view.source.id.as_str(),
                target = view.target.id.as_str(),
                "ignoring expand on uncompressed link"
            );
            return None;
        }
        let (source, target) = (view.source.id.clone(), view.target.id.clone());
        self.compression.request_expansion(&source, &target)
    }

    /// Log an expansion request by endpoint ids
    pub fn request_expansion(
        &mut self,
        source_id: &str,
        target_id: &str,
    ) -> Option<ExpansionOutcome> {
        self.compression.request_expansion(source_id, target_id)
    }

    pub fn expansion_log(&self) -> &[ExpandedLinkRequest] {
        self.compression.log()
    }

    // ---- viewport ----

    /// Frame the current node positions and remember the result as the view
    pub fn zoom_to_fit(&mut self) -> GraphResult<ViewTransform> {
        let positions: Vec<Vec2> = self.model.nodes().iter().map(|n| n.position).collect();
        self.view = self.fitter.fit(&positions)?;
        Ok(self.view)
    }

    /// Transform the renderer should currently apply
    pub fn view(&self) -> ViewTransform {
        self.view
    }

    // ---- accessors ----

    pub fn frame(&self) -> Frame {
        Frame::capture(&self.model, &self.config.shapes, self.overlays)
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn simulation(&self) -> &ForceSimulation {
        &self.simulation
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::error::GraphError;
    use crate::graph_types::{LinkData, NodeData};

    fn data() -> GraphData {
        GraphData::new(
            vec![
                NodeData::new("a", "circle"),
                NodeData::new("b", "circle").focused(),
                NodeData::new("c", "volume"),
            ],
            vec![
                LinkData::new("a", "b", "calls"),
                LinkData::new("b", "c", "attached").compressed(),
            ],
        )
    }

    fn loaded() -> GraphEngine {
        let mut engine = GraphEngine::default();
        engine.load(data()).unwrap();
        engine
    }

    #[test]
    fn load_notifies_focus_and_starts_layout() {
        let focus = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&focus);
        let mut engine = GraphEngine::default();
        engine.on_focus_change(move |node| sink.borrow_mut().push(node.map(|n| n.id.clone())));

        engine.load(data()).unwrap();

        assert_eq!(*focus.borrow(), vec![Some("b".to_string())]);
        assert!(engine.simulation().is_running());
        assert!(engine.tick());
    }

    #[test]
    fn load_without_focus_still_notifies() {
        let focus = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&focus);
        let mut engine = GraphEngine::default();
        engine.on_focus_change(move |node| sink.borrow_mut().push(node.is_some()));

        engine
            .load(GraphData::new(vec![NodeData::new("x", "host")], vec![]))
            .unwrap();

        assert_eq!(*focus.borrow(), vec![false]);
    }

    #[test]
    fn load_clears_selection_and_expansions() {
        let mut engine = loaded();
        engine.on_expand_request(|_| json!(null));
        engine.select_node_by_id("a");
        engine.request_expansion("b", "c");

        engine.load(data()).unwrap();

        assert!(engine.selected_node().is_none());
        assert!(engine.selected_link().is_none());
        assert!(engine.expansion_log().is_empty());
    }

    #[test]
    fn failed_load_keeps_previous_graph() {
        let mut engine = loaded();
        let bad = GraphData::new(
            vec![NodeData::new("z", "host")],
            vec![LinkData::new("z", "q", "calls")],
        );
        assert!(matches!(engine.load(bad), Err(GraphError::Validation(_))));
        assert_eq!(engine.model().node_count(), 3);
        assert_eq!(engine.focus_node().unwrap().id, "b");
    }

    #[test]
    fn load_sets_initial_view() {
        let engine = loaded();
        let expected = engine.fitter.initial_fit(3);
        assert_eq!(engine.view(), expected);
    }

    #[test]
    fn merge_reannounces_selection() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let mut engine = loaded();
        engine.on_node_select(move |node| sink.borrow_mut().push(node.map(|n| n.id.clone())));
        engine.select_node_by_id("a");

        engine
            .merge(GraphData::new(
                vec![NodeData::new("d", "host")],
                vec![LinkData::new("d", "a", "calls")],
            ))
            .unwrap();

        assert_eq!(
            *events.borrow(),
            vec![Some("a".to_string()), Some("a".to_string())]
        );
        assert!(engine.model().find_by_id("d").unwrap().highlighted);
    }

    #[test]
    fn set_focus_reenables_indicator() {
        let mut engine = loaded();
        assert!(!engine.toggle_focus());
        assert!(engine.focus_node().is_some());

        assert!(engine.set_focus_by_id("c"));
        assert!(engine.overlays().focus_enabled);
        assert_eq!(engine.focus_node().unwrap().id, "c");
        assert!(!engine.set_focus_by_id("nope"));
        assert_eq!(engine.focus_node().unwrap().id, "c");
    }

    #[test]
    fn expand_only_routes_compressed_links() {
        let mut engine = loaded();
        engine.on_expand_request(|log| json!(log.len()));

        let plain = engine.model().links_of("a").outgoing[0];
        let compressed = engine.model().links_of("b").compressed[0];

        assert_eq!(engine.expand_link(plain), None);
        assert_eq!(engine.expand_link(compressed), Some(json!(1)));
        assert_eq!(engine.expand_link(compressed), Some(json!(2)));
        assert_eq!(engine.expansion_log().len(), 2);
        assert_eq!(engine.expansion_log()[0].source_id, "b");
        assert_eq!(engine.model().link_count(), 2);
    }

    #[test]
    fn drag_pins_node_until_released() {
        let mut engine = loaded();
        engine.run(5);

        assert!(engine.drag_start("a"));
        engine.drag_to(1000.0, 1000.0);
        engine.run(10);
        assert_eq!(
            engine.model().find_by_id("a").unwrap().position,
            Vec2::new(1000.0, 1000.0)
        );

        engine.drag_end();
        engine.run(10);
        assert_ne!(
            engine.model().find_by_id("a").unwrap().position,
            Vec2::new(1000.0, 1000.0)
        );
        assert!(!engine.drag_start("ghost"));
    }

    #[test]
    fn zoom_to_fit_frames_live_positions() {
        let mut engine = loaded();
        engine.run(50);
        let fit = engine.zoom_to_fit().unwrap();
        assert_eq!(engine.view(), fit);

        let frame = engine.frame();
        for node in &frame.nodes {
            let mapped = fit.apply(node.position);
            assert!(mapped.x >= 0.0 && mapped.x <= engine.config().viewport.width);
            assert!(mapped.y >= 0.0 && mapped.y <= engine.config().viewport.height);
        }
    }

    #[test]
    fn zoom_to_fit_on_empty_graph_fails() {
        let mut engine = GraphEngine::default();
        assert!(matches!(engine.zoom_to_fit(), Err(GraphError::EmptyGraph)));
    }
}
