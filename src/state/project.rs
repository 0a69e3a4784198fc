//! Training project list and labeling page selection.

use crate::model::{ImageId, TrainingProject};

/// Training projects known to the editor.
#[derive(Debug, Clone, Default)]
pub struct ProjectState {
    trainings: Vec<TrainingProject>,
    revision: u64,
}

impl ProjectState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trainings(&self) -> &[TrainingProject] {
        &self.trainings
    }

    /// Replace the project list.
    pub fn set_trainings(&mut self, trainings: Vec<TrainingProject>) {
        log::debug!("Project list updated: {} projects", trainings.len());
        self.trainings = trainings;
        self.revision += 1;
    }

    /// Monotonic change counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// State of the labeling page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelingPageState {
    /// Image currently shown for labeling.
    pub selected_image_id: Option<ImageId>,
}

impl LabelingPageState {
    pub fn select_image(&mut self, image: Option<ImageId>) {
        if self.selected_image_id != image {
            log::debug!("Selected image: {:?}", image);
            self.selected_image_id = image;
        }
    }
}
