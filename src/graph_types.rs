//! Graph data types consumed by load and merge
//!
//! These are the wire shapes handed over by the data collaborator. They carry
//! string ids; the model resolves them to node handles on ingestion.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{GraphError, GraphResult};

/// Health status of a node, copied onto links at creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Normal,
    Warning,
    Critical,
}

impl Status {
    /// Lowercase name as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Normal => "normal",
            Status::Warning => "warning",
            Status::Critical => "critical",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Status::Normal),
            "warning" => Ok(Status::Warning),
            "critical" => Ok(Status::Critical),
            other => Err(GraphError::validation(format!(
                "unknown status '{other}' (expected normal, warning or critical)"
            ))),
        }
    }
}

/// A node as supplied by the data collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeData {
    /// Unique identifier within the graph
    pub id: String,

    /// Type tag, selects the render shape
    #[serde(rename = "type")]
    pub node_type: String,

    /// Display label; defaults to the type tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Raw status string, validated on ingestion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Marks the node as the focus node. Accepts `true` or `"true"`.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub focus: bool,
}

impl NodeData {
    /// Create node data with only the required fields
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            name: None,
            status: None,
            focus: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn focused(mut self) -> Self {
        self.focus = true;
        self
    }

    /// Validated status, `Normal` when absent
    pub fn parsed_status(&self) -> GraphResult<Status> {
        match self.status.as_deref() {
            None => Ok(Status::Normal),
            Some(raw) => raw.parse().map_err(|err| match err {
                GraphError::Validation(msg) => {
                    GraphError::validation(format!("node '{}': {msg}", self.id))
                }
                other => other,
            }),
        }
    }
}

/// A link as supplied by the data collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkData {
    /// Source node id
    pub source: String,

    /// Target node id
    pub target: String,

    /// Type tag, used for spring lookup and render style
    #[serde(rename = "type")]
    pub link_type: String,

    /// Whether the link aggregates elided edges between the same pair
    #[serde(
        default,
        rename = "isCompressed",
        alias = "compressed",
        deserialize_with = "deserialize_flag"
    )]
    pub is_compressed: bool,
}

impl LinkData {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        link_type: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            link_type: link_type.into(),
            is_compressed: false,
        }
    }

    pub fn compressed(mut self) -> Self {
        self.is_compressed = true;
        self
    }
}

/// Complete graph payload for load or merge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<NodeData>,

    #[serde(default)]
    pub links: Vec<LinkData>,
}

impl GraphData {
    pub fn new(nodes: Vec<NodeData>, links: Vec<LinkData>) -> Self {
        Self { nodes, links }
    }

    /// Parse a graph payload from a JSON string
    pub fn from_json(json: &str) -> GraphResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a graph payload from a JSON file
    pub fn from_path(path: &Path) -> GraphResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected boolean flag, got '{other}'"
            ))),
        },
    }
}
