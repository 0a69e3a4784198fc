//! Undo/Redo history for annotation edits.
//!
//! Each reversible change is stored as an [`Edit`] carrying enough data to
//! reverse itself. Edits are derived from reducer [`Effect`]s, so only changes
//! that actually happened are recorded.

use crate::constants::DEFAULT_UNDO_HISTORY;
use crate::model::{Annotation, AnnotationState};
use crate::state::{AnnotationStore, Effect};

// ============================================================================
// Edit Types
// ============================================================================

/// A reversible change to the annotation collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    /// A box was finished
    AddAnnotation {
        /// The finished annotation
        annotation: Annotation,
        /// Position in creation order
        index: usize,
    },
    /// An annotation was deleted
    RemoveAnnotation {
        /// The removed annotation (stored for undo)
        annotation: Annotation,
        /// Position it was removed from
        index: usize,
    },
    /// An annotation's fields were changed
    ModifyAnnotation {
        /// Value before the change
        previous: Annotation,
        /// Value after the change
        current: Annotation,
    },
    /// The whole collection was cleared
    ResetAnnotations {
        /// Everything that was cleared, in order
        annotations: Vec<Annotation>,
    },
}

impl Edit {
    /// Build the edit for a reducer effect, if the effect is undoable.
    ///
    /// Half-drawn boxes are left out: once removed they have no corner click
    /// waiting on them, so restoring one would leave it stuck in `P1Added`.
    pub fn from_effect(effect: &Effect) -> Option<Self> {
        match effect {
            Effect::Finished { annotation, index } => Some(Edit::AddAnnotation {
                annotation: annotation.clone(),
                index: *index,
            }),
            Effect::Removed { annotation, index } if !is_half_drawn(annotation) => {
                Some(Edit::RemoveAnnotation {
                    annotation: annotation.clone(),
                    index: *index,
                })
            }
            Effect::Updated { previous, current } => Some(Edit::ModifyAnnotation {
                previous: previous.clone(),
                current: current.clone(),
            }),
            Effect::Reset(annotations) => {
                let annotations: Vec<Annotation> = annotations
                    .iter()
                    .filter(|a| !is_half_drawn(a))
                    .cloned()
                    .collect();
                (!annotations.is_empty()).then_some(Edit::ResetAnnotations { annotations })
            }
            _ => None,
        }
    }

    /// Get a human-readable description of this edit
    pub fn description(&self) -> String {
        match self {
            Edit::AddAnnotation { .. } => "Add annotation".to_string(),
            Edit::RemoveAnnotation { .. } => "Delete annotation".to_string(),
            Edit::ModifyAnnotation { .. } => "Edit annotation".to_string(),
            Edit::ResetAnnotations { annotations } => {
                format!("Clear {} annotations", annotations.len())
            }
        }
    }

    /// Reverse this edit on `store`.
    pub fn undo(&self, store: &mut AnnotationStore) {
        match self {
            Edit::AddAnnotation { annotation, .. } => {
                store.remove(&annotation.id);
            }
            Edit::RemoveAnnotation { annotation, index } => {
                store.restore(annotation.clone(), *index);
            }
            Edit::ModifyAnnotation { previous, .. } => {
                store.replace(previous.clone());
            }
            Edit::ResetAnnotations { annotations } => {
                for (index, annotation) in annotations.iter().enumerate() {
                    store.restore(annotation.clone(), index);
                }
            }
        }
    }

    /// Re-apply this edit on `store`.
    pub fn redo(&self, store: &mut AnnotationStore) {
        match self {
            Edit::AddAnnotation { annotation, index } => {
                store.restore(annotation.clone(), *index);
            }
            Edit::RemoveAnnotation { annotation, .. } => {
                store.remove(&annotation.id);
            }
            Edit::ModifyAnnotation { current, .. } => {
                store.replace(current.clone());
            }
            Edit::ResetAnnotations { .. } => {
                store.clear();
            }
        }
    }
}

fn is_half_drawn(annotation: &Annotation) -> bool {
    annotation.annotation_state == AnnotationState::P1Added
}

// ============================================================================
// Undo Stack
// ============================================================================

/// Configuration for the undo stack
#[derive(Debug, Clone)]
pub struct UndoConfig {
    /// Maximum number of edits to keep in history
    pub max_history: usize,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_UNDO_HISTORY,
        }
    }
}

/// The undo/redo history stack.
///
/// A new edit is pushed to `undo_stack` and clears `redo_stack`. Undo moves the
/// most recent edit to `redo_stack`; redo moves it back.
#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    undo_stack: Vec<Edit>,
    redo_stack: Vec<Edit>,
    config: UndoConfig,
}

impl UndoStack {
    /// Create a new empty undo stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration
    pub fn with_config(config: UndoConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Record an edit. This clears the redo stack.
    pub fn push(&mut self, edit: Edit) {
        log::debug!("📝 Undo: pushed '{}'", edit.description());
        self.undo_stack.push(edit);
        self.redo_stack.clear();

        if self.undo_stack.len() > self.config.max_history {
            let excess = self.undo_stack.len() - self.config.max_history;
            self.undo_stack.drain(..excess);
        }
    }

    /// Record the edit for a reducer effect, if there is one.
    pub fn record(&mut self, effect: &Effect) {
        if let Some(edit) = Edit::from_effect(effect) {
            self.push(edit);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Undo the most recent edit on `store`. Returns false if there was
    /// nothing to undo.
    pub fn undo(&mut self, store: &mut AnnotationStore) -> bool {
        let Some(edit) = self.undo_stack.pop() else {
            return false;
        };
        log::debug!("⏪ Undo: '{}'", edit.description());
        edit.undo(store);
        self.redo_stack.push(edit);
        true
    }

    /// Redo the most recently undone edit on `store`. Returns false if there
    /// was nothing to redo.
    pub fn redo(&mut self, store: &mut AnnotationStore) -> bool {
        let Some(edit) = self.redo_stack.pop() else {
            return false;
        };
        log::debug!("⏩ Redo: '{}'", edit.description());
        edit.redo(store);
        self.undo_stack.push(edit);
        true
    }

    /// Get the description of the edit that would be undone
    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.last().map(|e| e.description())
    }

    /// Get the description of the edit that would be redone
    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(|e| e.description())
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        log::debug!("🗑️ Undo history cleared");
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
