//! Overlay visibility
//!
//! Controls whether the highlight and focus indicators are drawn. Hiding an
//! overlay never changes which nodes are highlighted or focused.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOptions {
    /// Draw highlight backgrounds and brackets around newly merged nodes
    pub highlight_enabled: bool,
    /// Draw the focus indicator
    pub focus_enabled: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            highlight_enabled: true,
            focus_enabled: true,
        }
    }
}

impl DisplayOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_highlight(&mut self) -> bool {
        self.highlight_enabled = !self.highlight_enabled;
        self.highlight_enabled
    }

    pub fn toggle_focus(&mut self) -> bool {
        self.focus_enabled = !self.focus_enabled;
        self.focus_enabled
    }

    pub fn set_focus_enabled(&mut self, visible: bool) {
        self.focus_enabled = visible;
    }
}
