//! Drag-start payloads handed to the cascade canvas.
//!
//! The platform drag event is abstracted behind [`DataTransfer`]; hosts
//! implement it for their toolkit's transfer object. [`DragData`] is an
//! in-memory implementation usable by native hosts.

use std::collections::HashMap;

use crate::constants::{CATEGORY_FORMAT, NODE_TYPE_FORMAT};
use crate::model::NodeCategory;

/// Allowed drop operation for a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropEffect {
    Copy,
    Move,
    Link,
}

impl DropEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropEffect::Copy => "copy",
            DropEffect::Move => "move",
            DropEffect::Link => "link",
        }
    }
}

/// The writable side of a platform drag event.
pub trait DataTransfer {
    /// Attach a string payload under `format`.
    fn set_data(&mut self, format: &str, data: &str);

    /// Restrict which drop operations the target may perform.
    fn set_effect_allowed(&mut self, effect: DropEffect);
}

/// A cascade node being dragged out of the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragPayload {
    pub node_type: String,
    pub category: NodeCategory,
}

impl DragPayload {
    pub fn new(node_type: impl Into<String>, category: NodeCategory) -> Self {
        Self {
            node_type: node_type.into(),
            category,
        }
    }

    /// Write this payload to a drag event.
    pub fn write_to(&self, transfer: &mut impl DataTransfer) {
        transfer.set_data(NODE_TYPE_FORMAT, &self.node_type);
        transfer.set_data(CATEGORY_FORMAT, self.category.tag());
        transfer.set_effect_allowed(DropEffect::Move);
    }

    /// Read a payload back from drop data, if both fields are present and the
    /// category tag is known.
    pub fn read_from(data: &DragData) -> Option<Self> {
        let node_type = data.get_data(NODE_TYPE_FORMAT)?;
        let category = NodeCategory::from_tag(data.get_data(CATEGORY_FORMAT)?)?;
        Some(Self::new(node_type, category))
    }
}

/// Forward a drag start from a sidebar entry.
pub fn on_drag_start(transfer: &mut impl DataTransfer, node_type: &str, category: NodeCategory) {
    log::debug!("Drag start: {} ({})", node_type, category);
    DragPayload::new(node_type, category).write_to(transfer);
}

/// Drag start from a transform entry.
pub fn on_drag_transform(transfer: &mut impl DataTransfer, node_type: &str) {
    on_drag_start(transfer, node_type, NodeCategory::Transform);
}

/// Drag start from an export entry.
pub fn on_drag_export(transfer: &mut impl DataTransfer, node_type: &str) {
    on_drag_start(transfer, node_type, NodeCategory::Export);
}

/// Drag start from a model card.
pub fn on_drag_model(transfer: &mut impl DataTransfer, node_type: &str) {
    on_drag_start(transfer, node_type, NodeCategory::Model);
}

/// In-memory drag transfer.
#[derive(Debug, Clone, Default)]
pub struct DragData {
    items: HashMap<String, String>,
    effect_allowed: Option<DropEffect>,
}

impl DragData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_data(&self, format: &str) -> Option<&str> {
        self.items.get(format).map(String::as_str)
    }

    pub fn effect_allowed(&self) -> Option<DropEffect> {
        self.effect_allowed
    }
}

impl DataTransfer for DragData {
    fn set_data(&mut self, format: &str, data: &str) {
        self.items.insert(format.to_string(), data.to_string());
    }

    fn set_effect_allowed(&mut self, effect: DropEffect) {
        self.effect_allowed = Some(effect);
    }
}
