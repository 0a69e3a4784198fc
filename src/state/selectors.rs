//! Derived, memoized views over application state.

use std::collections::HashMap;

use crate::model::{Annotation, AnnotationId, ImageId, TrainingProject};
use crate::state::annotations::AnnotationStore;
use crate::state::project::ProjectState;

/// Caches the last computed value together with the inputs it came from.
///
/// The value is recomputed only when the key changes.
#[derive(Debug, Clone)]
pub struct Memo<K, V> {
    cached: Option<(K, V)>,
    computations: u64,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self {
            cached: None,
            computations: 0,
        }
    }
}

impl<K: PartialEq, V> Memo<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, computing it first if the key changed.
    pub fn get_or_compute(&mut self, key: K, compute: impl FnOnce() -> V) -> &V {
        if !matches!(&self.cached, Some((cached_key, _)) if *cached_key == key) {
            self.cached = None;
        }
        let computations = &mut self.computations;
        let (_, value) = self.cached.get_or_insert_with(|| {
            *computations += 1;
            (key, compute())
        });
        value
    }

    /// How many times the value has been (re)computed.
    pub fn computations(&self) -> u64 {
        self.computations
    }

    /// Drop the cached value.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}

/// Every annotation, in creation order.
pub fn select_all_anno(store: &AnnotationStore) -> Vec<Annotation> {
    store.iter().cloned().collect()
}

/// The id → annotation map.
pub fn select_anno_entities(store: &AnnotationStore) -> &HashMap<AnnotationId, Annotation> {
    store.entities()
}

/// Annotations on the selected image, recomputed only when the selection or
/// the collection changes.
#[derive(Debug, Clone, Default)]
pub struct LabelPageAnnoSelector {
    memo: Memo<(Option<ImageId>, u64), Vec<Annotation>>,
}

impl LabelPageAnnoSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(
        &mut self,
        selected_image: Option<ImageId>,
        store: &AnnotationStore,
    ) -> &[Annotation] {
        self.memo
            .get_or_compute((selected_image, store.revision()), || {
                store.for_image(selected_image)
            })
    }

    pub fn computations(&self) -> u64 {
        self.memo.computations()
    }
}

/// Training projects usable as cascade models, in project order.
#[derive(Debug, Clone, Default)]
pub struct PredictionModelSelector {
    memo: Memo<u64, Vec<TrainingProject>>,
}

impl PredictionModelSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, project: &ProjectState) -> &[TrainingProject] {
        self.memo.get_or_compute(project.revision(), || {
            project
                .trainings()
                .iter()
                .filter(|t| t.is_prediction_module)
                .cloned()
                .collect()
        })
    }

    pub fn computations(&self) -> u64 {
        self.memo.computations()
    }
}
