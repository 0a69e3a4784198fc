//! Cascade node categories.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which palette section a cascade node comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeCategory {
    /// Model inference node
    Model,
    /// Image transform node
    Transform,
    /// Export node
    Export,
}

impl NodeCategory {
    /// Tag written into the drag payload.
    pub fn tag(&self) -> &'static str {
        match self {
            NodeCategory::Model => "model",
            NodeCategory::Transform => "transform",
            NodeCategory::Export => "export",
        }
    }

    /// Section title in the sidebar.
    pub fn title(&self) -> &'static str {
        match self {
            NodeCategory::Model => "Models",
            NodeCategory::Transform => "Transform",
            NodeCategory::Export => "Export",
        }
    }

    /// All categories in sidebar order.
    pub fn all() -> &'static [NodeCategory] {
        &[
            NodeCategory::Model,
            NodeCategory::Transform,
            NodeCategory::Export,
        ]
    }

    /// Parse a drag payload tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::all().iter().copied().find(|c| c.tag() == tag)
    }
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip() {
        for category in NodeCategory::all() {
            assert_eq!(NodeCategory::from_tag(category.tag()), Some(*category));
        }
        assert_eq!(NodeCategory::from_tag("input"), None);
    }
}
