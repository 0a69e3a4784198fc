//! Global constants for the cascade labeler

/// Drag-transfer format carrying the node type
pub const NODE_TYPE_FORMAT: &str = "application/reactflow";

/// Drag-transfer format carrying the node category
pub const CATEGORY_FORMAT: &str = "cardCategory";

/// Link text under the model list
pub const MANAGE_MODELS_LABEL: &str = "Manage Models";

/// Default number of undoable edits kept in history
pub const DEFAULT_UNDO_HISTORY: usize = 100;
