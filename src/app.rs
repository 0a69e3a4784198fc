//! Main application state and message routing.

use crate::config::AppConfig;
use crate::format::ImagesResponse;
use crate::message::Message;
use crate::model::{Annotation, AnnotationId, ImageId, Position2D, TrainingProject};
use crate::state::{
    AnnotationCommand, AnnotationError, AnnotationStore, Effect, LabelPageAnnoSelector,
    LabelingPageState, PredictionModelSelector, ProjectState, reduce, select_all_anno,
};
use crate::ui::{SidebarState, SidebarView, build_sidebar};
use crate::undo::{UndoConfig, UndoStack};

/// The cascade editor and labeling page state.
///
/// Owns every state container; all changes go through [`CascadeLabeler::update`].
#[derive(Debug, Clone, Default)]
pub struct CascadeLabeler {
    annotations: AnnotationStore,
    labeling_page: LabelingPageState,
    project: ProjectState,
    sidebar: SidebarState,
    undo_stack: UndoStack,
    label_page_selector: LabelPageAnnoSelector,
    model_selector: PredictionModelSelector,
}

impl CascadeLabeler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with settings from `config`.
    pub fn with_config(config: &AppConfig) -> Self {
        Self {
            undo_stack: UndoStack::with_config(UndoConfig {
                max_history: config.preferences.undo_history,
            }),
            ..Default::default()
        }
    }

    /// Apply one message.
    ///
    /// Fails only when a corner click arrives with no box being drawn; state is
    /// unchanged in that case.
    pub fn update(&mut self, message: Message) -> Result<(), AnnotationError> {
        match message {
            // Sidebar
            Message::SectionToggled(category) => {
                self.sidebar.toggle(category);
            }
            Message::TrainingsLoaded(trainings) => {
                self.project.set_trainings(trainings);
            }

            // Labeling page
            Message::ImageSelected(image) => {
                self.labeling_page.select_image(image);
            }
            Message::CreateOnSelectedImage(point) => {
                let image_id = self.labeling_page.selected_image_id;
                self.dispatch(AnnotationCommand::CreateAnnotation { point, image_id })?;
            }
            Message::Annotation(command) => {
                self.dispatch(command)?;
            }
            Message::ImagesFetched(Ok(response)) => {
                self.load_labels(response);
            }
            Message::ImagesFetched(Err(reason)) => {
                log::warn!("Image fetch failed, keeping annotations: {}", reason);
            }

            // History
            Message::Undo => self.undo(),
            Message::Redo => {
                if self.undo_stack.redo(&mut self.annotations) {
                    log::info!("Redo performed");
                }
            }
        }
        Ok(())
    }

    /// Run a command through the reducer and record it for undo.
    pub fn dispatch(&mut self, command: AnnotationCommand) -> Result<Effect, AnnotationError> {
        let name = command.name();
        let effect = reduce(&mut self.annotations, command).inspect_err(|e| {
            log::warn!("{} rejected: {}", name, e);
        })?;
        self.undo_stack.record(&effect);
        Ok(effect)
    }

    fn load_labels(&mut self, response: ImagesResponse) {
        self.annotations.set_all(response.labels);
        self.undo_stack.clear();
        log::info!("Loaded {} annotations", self.annotations.len());
    }

    fn undo(&mut self) {
        // A box being drawn is discarded before touching history
        if let Some(id) = self.annotations.creating_id().cloned() {
            self.annotations.remove(&id);
            log::info!("Cancelled annotation {}", id);
            return;
        }
        if self.undo_stack.undo(&mut self.annotations) {
            log::info!("Undo performed");
        }
    }

    // ========================================================================
    // Convenience dispatchers
    // ========================================================================

    /// Start a box at `point` on `image`.
    pub fn create_annotation(
        &mut self,
        point: Position2D,
        image: Option<ImageId>,
    ) -> Result<Effect, AnnotationError> {
        self.dispatch(AnnotationCommand::CreateAnnotation {
            point,
            image_id: image,
        })
    }

    /// Place the second corner of the box being drawn.
    pub fn update_creating_annotation(
        &mut self,
        point: Position2D,
    ) -> Result<Effect, AnnotationError> {
        self.dispatch(AnnotationCommand::UpdateCreatingAnnotation { point })
    }

    pub fn remove_annotation(&mut self, id: AnnotationId) -> Result<Effect, AnnotationError> {
        self.dispatch(AnnotationCommand::RemoveAnnotation { id })
    }

    pub fn reset_annotation(&mut self) -> Result<Effect, AnnotationError> {
        self.dispatch(AnnotationCommand::ResetAnnotation)
    }

    // ========================================================================
    // Selectors
    // ========================================================================

    pub fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }

    /// Every annotation, in creation order.
    pub fn all_annotations(&self) -> Vec<Annotation> {
        select_all_anno(&self.annotations)
    }

    /// Annotations on the selected image.
    pub fn label_page_annotations(&mut self) -> &[Annotation] {
        self.label_page_selector
            .select(self.labeling_page.selected_image_id, &self.annotations)
    }

    pub fn selected_image(&self) -> Option<ImageId> {
        self.labeling_page.selected_image_id
    }

    /// Training projects usable as cascade models.
    pub fn prediction_models(&mut self) -> &[TrainingProject] {
        self.model_selector.select(&self.project)
    }

    pub fn sidebar_state(&self) -> &SidebarState {
        &self.sidebar
    }

    /// Current sidebar, rebuilt from the latest model list.
    pub fn sidebar_view(&mut self) -> SidebarView {
        let models = self.model_selector.select(&self.project);
        build_sidebar(&self.sidebar, models)
    }

    pub fn undo_stack(&self) -> &UndoStack {
        &self.undo_stack
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnnotationState, BoxLabel, NodeCategory};
    use crate::ui::SectionContent;

    fn p(x: f64, y: f64) -> Position2D {
        Position2D::new(x, y)
    }

    fn response(json: &str) -> ImagesResponse {
        ImagesResponse::from_json(json).unwrap()
    }

    #[test]
    fn test_create_uses_selected_image() {
        let mut app = CascadeLabeler::new();
        app.update(Message::ImageSelected(Some(4))).unwrap();
        app.update(Message::CreateOnSelectedImage(p(5.0, 5.0))).unwrap();
        app.update(AnnotationCommand::UpdateCreatingAnnotation { point: p(1.0, 1.0) }.into())
            .unwrap();

        let annos = app.label_page_annotations();
        assert_eq!(annos.len(), 1);
        assert_eq!(annos[0].image, Some(4));
        assert_eq!(annos[0].label, BoxLabel::new(1.0, 1.0, 5.0, 5.0));
        assert_eq!(annos[0].annotation_state, AnnotationState::Finish);
    }

    #[test]
    fn test_update_creating_without_create_fails_fast() {
        let mut app = CascadeLabeler::new();
        let result = app.update(AnnotationCommand::UpdateCreatingAnnotation { point: p(1.0, 1.0) }.into());
        assert_eq!(result, Err(AnnotationError::NoAnnotationInProgress));
        assert!(app.all_annotations().is_empty());
    }

    #[test]
    fn test_degenerate_box_not_recorded() {
        let mut app = CascadeLabeler::new();
        app.create_annotation(p(10.4, 20.6), Some(1)).unwrap();
        app.update_creating_annotation(p(10.4, 20.6)).unwrap();
        assert!(app.all_annotations().is_empty());
        assert!(!app.undo_stack().can_undo());
    }

    #[test]
    fn test_fetch_replaces_collection() {
        let mut app = CascadeLabeler::new();
        app.create_annotation(p(0.0, 0.0), Some(1)).unwrap();
        app.update_creating_annotation(p(3.0, 3.0)).unwrap();

        let loaded = response(
            r#"{"labels": {"s1": {"id": "s1", "image": 9, "label": {"x1": 1, "y1": 2, "x2": 3, "y2": 4}, "annotationState": "Finish"}}}"#,
        );
        app.update(Message::ImagesFetched(Ok(loaded))).unwrap();

        let all = app.all_annotations();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id.as_str(), "s1");
        assert!(!app.undo_stack().can_undo());

        app.update(Message::ImageSelected(Some(9))).unwrap();
        assert_eq!(app.label_page_annotations().len(), 1);
    }

    #[test]
    fn test_failed_fetch_keeps_collection() {
        let mut app = CascadeLabeler::new();
        app.create_annotation(p(0.0, 0.0), Some(1)).unwrap();
        app.update_creating_annotation(p(3.0, 3.0)).unwrap();
        app.update(Message::ImagesFetched(Err("timeout".to_string())))
            .unwrap();
        assert_eq!(app.all_annotations().len(), 1);
    }

    #[test]
    fn test_undo_cancels_in_progress_box_first() {
        let mut app = CascadeLabeler::new();
        app.create_annotation(p(0.0, 0.0), Some(1)).unwrap();
        app.update_creating_annotation(p(3.0, 3.0)).unwrap();
        app.create_annotation(p(10.0, 10.0), Some(1)).unwrap();

        app.update(Message::Undo).unwrap();
        assert_eq!(app.all_annotations().len(), 1);
        assert!(app.annotations().creating().is_none());

        app.update(Message::Undo).unwrap();
        assert!(app.all_annotations().is_empty());

        app.update(Message::Redo).unwrap();
        assert_eq!(app.all_annotations().len(), 1);
    }

    #[test]
    fn test_undo_reset_does_not_revive_half_drawn_box() {
        let mut app = CascadeLabeler::new();
        app.create_annotation(p(0.0, 0.0), Some(1)).unwrap();
        app.update_creating_annotation(p(3.0, 3.0)).unwrap();
        app.create_annotation(p(10.0, 10.0), Some(1)).unwrap();
        app.reset_annotation().unwrap();

        app.update(Message::Undo).unwrap();
        let states: Vec<_> = app
            .all_annotations()
            .iter()
            .map(|a| a.annotation_state)
            .collect();
        assert_eq!(states, [AnnotationState::Finish]);

        // Drawing continues normally afterwards
        app.create_annotation(p(20.0, 20.0), Some(1)).unwrap();
        app.update_creating_annotation(p(25.0, 25.0)).unwrap();
        assert_eq!(app.all_annotations().len(), 2);
    }

    #[test]
    fn test_reset_and_remove() {
        let mut app = CascadeLabeler::new();
        for x in [0.0, 10.0] {
            app.create_annotation(p(x, x), Some(1)).unwrap();
            app.update_creating_annotation(p(x + 2.0, x + 2.0)).unwrap();
        }
        let first = app.all_annotations()[0].id.clone();
        app.remove_annotation(first).unwrap();
        assert_eq!(app.all_annotations().len(), 1);

        app.reset_annotation().unwrap();
        assert!(app.all_annotations().is_empty());
    }

    #[test]
    fn test_sidebar_follows_model_list() {
        let mut app = CascadeLabeler::new();
        app.update(Message::SectionToggled(NodeCategory::Model)).unwrap();
        app.update(Message::TrainingsLoaded(vec![
            TrainingProject::new(1, "Demo", false),
            TrainingProject::new(2, "Detector", true),
        ]))
        .unwrap();

        let view = app.sidebar_view();
        let Some(SectionContent::Models { cards, .. }) =
            &view.section(NodeCategory::Model).unwrap().content
        else {
            panic!("expected model list");
        };
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name, "Detector");

        app.update(Message::TrainingsLoaded(Vec::new())).unwrap();
        assert_ne!(app.sidebar_view(), view);
    }

    #[test]
    fn test_with_config_limits_history() {
        let mut config = AppConfig::default();
        config.preferences.undo_history = 1;
        let mut app = CascadeLabeler::with_config(&config);
        for x in [0.0, 10.0, 20.0] {
            app.create_annotation(p(x, x), None).unwrap();
            app.update_creating_annotation(p(x + 2.0, x + 2.0)).unwrap();
        }
        assert_eq!(app.undo_stack().undo_count(), 1);
    }
}
