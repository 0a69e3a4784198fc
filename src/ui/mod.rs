//! Sidebar view model and drag-and-drop plumbing.

mod drag;
mod sidebar;

pub use drag::{
    DataTransfer, DragData, DragPayload, DropEffect, on_drag_export, on_drag_model,
    on_drag_start, on_drag_transform,
};
pub use sidebar::{
    Chevron, CollapsibleState, ModelCard, SectionContent, SectionView, SidebarState,
    SidebarView, build_sidebar,
};
