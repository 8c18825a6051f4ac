//! Expansion requests for compressed links
//!
//! A compressed link stands in for edges the data source elided. Expanding it
//! means asking the data collaborator to resolve them; the manager keeps the
//! full request history and hands it over on every request.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Opaque value returned by the expansion collaborator
pub type ExpansionOutcome = serde_json::Value;

/// Callback that resolves expansion requests, given the whole log
pub type ExpandCallback = Box<dyn FnMut(&[ExpandedLinkRequest]) -> ExpansionOutcome>;

/// One requested expansion, endpoints by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandedLinkRequest {
    #[serde(rename = "start")]
    pub source_id: String,
    #[serde(rename = "end")]
    pub target_id: String,
}

#[derive(Default)]
pub struct LinkCompressionManager {
    log: Vec<ExpandedLinkRequest>,
    on_expand_request: Option<ExpandCallback>,
}

impl std::fmt::Debug for LinkCompressionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkCompressionManager")
            .field("log", &self.log)
            .field("collaborator", &self.on_expand_request.is_some())
            .finish()
    }
}

impl LinkCompressionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the collaborator that resolves expansions, replacing any previous one
    pub fn set_collaborator<F>(&mut self, callback: F)
    where
        F: FnMut(&[ExpandedLinkRequest]) -> ExpansionOutcome + 'static,
    {
        self.on_expand_request = Some(Box::new(callback));
    }

    /// Record a request and pass the whole log to the collaborator
    ///
    /// Repeated pairs are logged again. Without a collaborator nothing is logged
    /// and `None` is returned.
    pub fn request_expansion(
        &mut self,
        source_id: &str,
        target_id: &str,
    ) -> Option<ExpansionOutcome> {
        let Some(callback) = self.on_expand_request.as_mut() else {
            warn!(source_id, target_id, "expansion requested without a collaborator");
            return None;
        };

        self.log.push(ExpandedLinkRequest {
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
        });
        debug!(source_id, target_id, log_len = self.log.len(), "expansion requested");
        Some(callback(&self.log))
    }

    /// Every request made since the last load, oldest first
    pub fn log(&self) -> &[ExpandedLinkRequest] {
        &self.log
    }

    pub fn clear(&mut self) {
        self.log.clear();
    }
}
