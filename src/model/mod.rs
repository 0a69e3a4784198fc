//! Data models for the cascade labeler.

mod annotation;
mod node;
mod project;

pub use annotation::{
    Annotation, AnnotationId, AnnotationState, BoxLabel, ImageId, Position2D,
};
pub use node::NodeCategory;
pub use project::TrainingProject;
