//! Application state containers.

mod annotations;
mod command;
mod project;
mod selectors;

pub use annotations::{AnnotationChanges, AnnotationError, AnnotationStore, CreationOutcome};
pub use command::{AnnotationCommand, Effect, reduce};
pub use project::{LabelingPageState, ProjectState};
pub use selectors::{
    LabelPageAnnoSelector, Memo, PredictionModelSelector, select_all_anno, select_anno_entities,
};
