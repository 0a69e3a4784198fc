//! Annotation commands and the reducer that applies them.
//!
//! Every change to an [`AnnotationStore`] goes through [`reduce`], which
//! reports what happened as an [`Effect`] so callers (undo history, logging,
//! views) can react without re-inspecting the store.

use serde::{Deserialize, Serialize};

use crate::model::{Annotation, AnnotationId, ImageId, Position2D};
use crate::state::annotations::{
    AnnotationChanges, AnnotationError, AnnotationStore, CreationOutcome,
};

/// One operation on the annotation collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AnnotationCommand {
    /// Start a box with its first corner.
    #[serde(rename_all = "camelCase")]
    CreateAnnotation {
        point: Position2D,
        #[serde(default)]
        image_id: Option<ImageId>,
    },
    /// Place the next corner of the box being drawn.
    UpdateCreatingAnnotation { point: Position2D },
    /// Merge field changes into an existing annotation.
    UpdateAnnotation {
        id: AnnotationId,
        #[serde(default)]
        changes: AnnotationChanges,
    },
    /// Delete one annotation.
    RemoveAnnotation { id: AnnotationId },
    /// Delete every annotation.
    ResetAnnotation,
    /// Replace the collection with a loaded label set.
    LoadAnnotations { annotations: Vec<Annotation> },
}

impl AnnotationCommand {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            AnnotationCommand::CreateAnnotation { .. } => "createAnnotation",
            AnnotationCommand::UpdateCreatingAnnotation { .. } => "updateCreatingAnnotation",
            AnnotationCommand::UpdateAnnotation { .. } => "updateAnnotation",
            AnnotationCommand::RemoveAnnotation { .. } => "removeAnnotation",
            AnnotationCommand::ResetAnnotation => "resetAnnotation",
            AnnotationCommand::LoadAnnotations { .. } => "loadAnnotations",
        }
    }
}

/// What a command did to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// A box was started and is waiting for its second corner.
    Started(Annotation),
    /// A box was completed and stored at `index`.
    Finished { annotation: Annotation, index: usize },
    /// A zero-area box was dropped.
    Discarded(AnnotationId),
    /// The in-progress box changed but is not finished.
    Progressed(Annotation),
    /// An annotation's fields were replaced.
    Updated {
        previous: Annotation,
        current: Annotation,
    },
    /// An annotation was removed from `index`.
    Removed { annotation: Annotation, index: usize },
    /// The collection was emptied.
    Reset(Vec<Annotation>),
    /// The collection was replaced with `count` loaded annotations.
    Loaded { count: usize },
    /// Nothing changed (unknown id).
    Unchanged,
}

/// Apply `command` to `store`.
///
/// Only `UpdateCreatingAnnotation` can fail, when no box is being drawn. A
/// failed command leaves the store untouched.
pub fn reduce(
    store: &mut AnnotationStore,
    command: AnnotationCommand,
) -> Result<Effect, AnnotationError> {
    log::trace!("Reducing {}", command.name());

    let effect = match command {
        AnnotationCommand::CreateAnnotation { point, image_id } => {
            Effect::Started(store.create(point, image_id).clone())
        }
        AnnotationCommand::UpdateCreatingAnnotation { point } => {
            match store.update_creating(point)? {
                CreationOutcome::Finished(annotation) => {
                    let index = store.index_of(&annotation.id).unwrap_or(store.len());
                    Effect::Finished { annotation, index }
                }
                CreationOutcome::Discarded(id) => Effect::Discarded(id),
                CreationOutcome::InProgress(annotation) => Effect::Progressed(annotation),
            }
        }
        AnnotationCommand::UpdateAnnotation { id, changes } => {
            match store.update(&id, &changes) {
                Some(previous) => match store.get(&id) {
                    Some(current) => Effect::Updated {
                        previous,
                        current: current.clone(),
                    },
                    None => Effect::Unchanged,
                },
                None => {
                    log::debug!("updateAnnotation: unknown id {}", id);
                    Effect::Unchanged
                }
            }
        }
        AnnotationCommand::RemoveAnnotation { id } => {
            let index = store.index_of(&id);
            match (store.remove(&id), index) {
                (Some(annotation), Some(index)) => Effect::Removed { annotation, index },
                _ => Effect::Unchanged,
            }
        }
        AnnotationCommand::ResetAnnotation => Effect::Reset(store.clear()),
        AnnotationCommand::LoadAnnotations { annotations } => {
            let count = annotations.len();
            store.set_all(annotations);
            log::info!("Loaded {} annotations", count);
            Effect::Loaded { count }
        }
    };

    Ok(effect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnnotationState, BoxLabel};

    fn create(x: f64, y: f64, image: ImageId) -> AnnotationCommand {
        AnnotationCommand::CreateAnnotation {
            point: Position2D::new(x, y),
            image_id: Some(image),
        }
    }

    fn corner(x: f64, y: f64) -> AnnotationCommand {
        AnnotationCommand::UpdateCreatingAnnotation {
            point: Position2D::new(x, y),
        }
    }

    #[test]
    fn test_two_click_flow() {
        let mut store = AnnotationStore::new();
        let started = reduce(&mut store, create(5.0, 5.0, 1)).unwrap();
        assert!(matches!(started, Effect::Started(ref a) if a.annotation_state == AnnotationState::P1Added));

        let finished = reduce(&mut store, corner(1.0, 1.0)).unwrap();
        let Effect::Finished { annotation, index } = finished else {
            panic!("expected finished box");
        };
        assert_eq!(index, 0);
        assert_eq!(annotation.label, BoxLabel::new(1.0, 1.0, 5.0, 5.0));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_corner_without_create_is_error() {
        let mut store = AnnotationStore::new();
        assert_eq!(
            reduce(&mut store, corner(1.0, 1.0)),
            Err(AnnotationError::NoAnnotationInProgress)
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_reset_always_empties() {
        let mut store = AnnotationStore::new();
        assert_eq!(
            reduce(&mut store, AnnotationCommand::ResetAnnotation).unwrap(),
            Effect::Reset(Vec::new())
        );

        reduce(&mut store, create(0.0, 0.0, 1)).unwrap();
        reduce(&mut store, corner(3.0, 3.0)).unwrap();
        reduce(&mut store, create(5.0, 5.0, 1)).unwrap();
        let Effect::Reset(removed) = reduce(&mut store, AnnotationCommand::ResetAnnotation).unwrap()
        else {
            panic!("expected reset");
        };
        assert_eq!(removed.len(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_reports_index() {
        let mut store = AnnotationStore::new();
        for x in [0.0, 10.0] {
            reduce(&mut store, create(x, x, 1)).unwrap();
            reduce(&mut store, corner(x + 2.0, x + 2.0)).unwrap();
        }
        let id = store.ids()[1].clone();
        let effect = reduce(&mut store, AnnotationCommand::RemoveAnnotation { id }).unwrap();
        assert!(matches!(effect, Effect::Removed { index: 1, .. }));

        let missing = AnnotationCommand::RemoveAnnotation {
            id: AnnotationId::new("missing"),
        };
        assert_eq!(reduce(&mut store, missing).unwrap(), Effect::Unchanged);
    }

    #[test]
    fn test_commands_from_json() {
        let json = r#"{"type":"createAnnotation","point":{"x":1.5,"y":2.0},"imageId":4}"#;
        let cmd: AnnotationCommand = serde_json::from_str(json).unwrap();
        assert_eq!(
            cmd,
            AnnotationCommand::CreateAnnotation {
                point: Position2D::new(1.5, 2.0),
                image_id: Some(4),
            }
        );

        let reset: AnnotationCommand = serde_json::from_str(r#"{"type":"resetAnnotation"}"#).unwrap();
        assert_eq!(reset, AnnotationCommand::ResetAnnotation);

        let update: AnnotationCommand = serde_json::from_str(
            r#"{"type":"updateAnnotation","id":"a1","changes":{"image":null}}"#,
        )
        .unwrap();
        let AnnotationCommand::UpdateAnnotation { changes, .. } = update else {
            panic!("expected update");
        };
        assert_eq!(changes.image, Some(None));
    }
}
