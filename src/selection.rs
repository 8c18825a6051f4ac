//! Selected node, selected link and focus node
//!
//! Three independent single slots. Selection slots fire their observer on every
//! assignment, even when the value did not change. Focus also moves the
//! `is_focus` flag on the model so at most one node carries it.

use tracing::debug;

use crate::model::{GraphModel, LinkIndex, LinkView, Node, NodeIndex};

/// Observer for node selection and focus changes
pub type NodeCallback = Box<dyn FnMut(Option<&Node>)>;

/// Observer for link selection
pub type LinkCallback = Box<dyn FnMut(Option<LinkView<'_>>)>;

#[derive(Default)]
pub struct SelectionController {
    selected_node: Option<NodeIndex>,
    selected_link: Option<LinkIndex>,
    focus: Option<NodeIndex>,
    focus_id: Option<String>,
    on_node_select: Option<NodeCallback>,
    on_link_select: Option<LinkCallback>,
    on_focus_change: Option<NodeCallback>,
}

impl std::fmt::Debug for SelectionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionController")
            .field("selected_node", &self.selected_node)
            .field("selected_link", &self.selected_link)
            .field("focus", &self.focus_id)
            .finish_non_exhaustive()
    }
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_node_select<F>(&mut self, callback: F)
    where
        F: FnMut(Option<&Node>) + 'static,
    {
        self.on_node_select = Some(Box::new(callback));
    }

    pub fn on_link_select<F>(&mut self, callback: F)
    where
        F: FnMut(Option<LinkView<'_>>) + 'static,
    {
        self.on_link_select = Some(Box::new(callback));
    }

    pub fn on_focus_change<F>(&mut self, callback: F)
    where
        F: FnMut(Option<&Node>) + 'static,
    {
        self.on_focus_change = Some(Box::new(callback));
    }

    pub fn selected_node(&self) -> Option<NodeIndex> {
        self.selected_node
    }

    pub fn selected_link(&self) -> Option<LinkIndex> {
        self.selected_link
    }

    pub fn focus(&self) -> Option<NodeIndex> {
        self.focus
    }

    /// Id of the current focus node
    pub fn focus_id(&self) -> Option<&str> {
        self.focus_id.as_deref()
    }

    /// Replace the selected node and notify. Handles the model does not know count as `None`.
    pub fn select_node(&mut self, model: &GraphModel, node: Option<NodeIndex>) {
        let node = node.filter(|&index| model.node(index).is_some());
        self.selected_node = node;
        if let Some(callback) = self.on_node_select.as_mut() {
            callback(node.and_then(|index| model.node(index)));
        }
    }

    /// Replace the selected link and notify. Handles the model does not know count as `None`.
    pub fn select_link(&mut self, model: &GraphModel, link: Option<LinkIndex>) {
        let view = link.and_then(|index| model.link_view(index));
        self.selected_link = view.map(|v| v.index);
        if let Some(callback) = self.on_link_select.as_mut() {
            callback(view);
        }
    }

    /// Move focus to `node`, or clear it with `None`, and notify
    pub fn set_focus(&mut self, model: &mut GraphModel, node: Option<NodeIndex>) {
        let node = node.filter(|&index| model.node(index).is_some());
        let previous = model.mark_focus(node);

        self.focus = node;
        self.focus_id = node
            .and_then(|index| model.node(index))
            .map(|n| n.id.clone());
        debug!(
            focus = self.focus_id.as_deref(),
            previous = previous.and_then(|index| model.node(index)).map(|n| n.id.as_str()),
            "focus changed"
        );

        if let Some(callback) = self.on_focus_change.as_mut() {
            callback(node.and_then(|index| model.node(index)));
        }
    }
}
