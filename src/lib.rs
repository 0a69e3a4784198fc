//! Cascade Labeler
//!
//! State core for a vision-pipeline editor: a sidebar palette of cascade nodes
//! (models, transforms, exports) and the bounding-box annotation state used on
//! the image labeling page.

pub mod app;
pub mod config;
pub mod constants;
pub mod format;
pub mod message;
pub mod model;
pub mod state;
pub mod ui;
pub mod undo;

pub use app::CascadeLabeler;
pub use message::Message;
