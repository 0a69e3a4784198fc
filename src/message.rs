//! Application message types.
//!
//! All UI events and external notifications are represented as messages in
//! the Elm architecture style.

use crate::format::ImagesResponse;
use crate::model::{ImageId, NodeCategory, Position2D, TrainingProject};
use crate::state::AnnotationCommand;

/// Messages that can be sent to update application state.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // Sidebar
    /// Section header clicked
    SectionToggled(NodeCategory),
    /// Training project list refreshed
    TrainingsLoaded(Vec<TrainingProject>),

    // Labeling page
    /// Image chosen for labeling
    ImageSelected(Option<ImageId>),
    /// First corner click on the selected image
    CreateOnSelectedImage(Position2D),
    /// Direct annotation command
    Annotation(AnnotationCommand),
    /// Image fetch finished; `Err` carries the failure reason
    ImagesFetched(Result<ImagesResponse, String>),

    // History
    /// Undo last edit
    Undo,
    /// Redo previously undone edit
    Redo,
}

impl From<AnnotationCommand> for Message {
    fn from(command: AnnotationCommand) -> Self {
        Message::Annotation(command)
    }
}
