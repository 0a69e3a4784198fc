//! Normalized in-memory collection of bounding-box annotations.

use std::collections::HashMap;

use crate::model::{Annotation, AnnotationId, AnnotationState, BoxLabel, ImageId, Position2D};

/// Errors raised by annotation state transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnnotationError {
    /// A corner click arrived with no box being drawn.
    #[error("No annotation is currently being created")]
    NoAnnotationInProgress,
}

/// Result of applying the second corner click.
#[derive(Debug, Clone, PartialEq)]
pub enum CreationOutcome {
    /// The box was completed and stored.
    Finished(Annotation),
    /// The box had zero area and was dropped.
    Discarded(AnnotationId),
    /// The box was updated but is still waiting for a corner.
    InProgress(Annotation),
}

/// Field changes for a direct annotation update.
///
/// `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationChanges {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_or_null"
    )]
    pub image: Option<Option<ImageId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<BoxLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation_state: Option<AnnotationState>,
}

/// Distinguish an explicit `null` from a missing field.
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<ImageId>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

impl AnnotationChanges {
    pub fn label(label: BoxLabel) -> Self {
        Self {
            label: Some(label),
            ..Default::default()
        }
    }

    fn apply_to(&self, annotation: &mut Annotation) {
        if let Some(image) = self.image {
            annotation.image = image;
        }
        if let Some(label) = self.label {
            annotation.label = label;
        }
        if let Some(state) = self.annotation_state {
            annotation.annotation_state = state;
        }
    }
}

/// Annotations keyed by id, plus their creation order.
///
/// `revision` increases on every mutation so derived views can tell when they
/// are stale.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    entities: HashMap<AnnotationId, Annotation>,
    ids: Vec<AnnotationId>,
    /// The box currently being drawn, if any.
    creating: Option<AnnotationId>,
    revision: u64,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic change counter.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    fn touch(&mut self) {
        self.revision += 1;
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, id: &AnnotationId) -> Option<&Annotation> {
        self.entities.get(id)
    }

    pub fn contains(&self, id: &AnnotationId) -> bool {
        self.entities.contains_key(id)
    }

    /// Ids in creation order.
    pub fn ids(&self) -> &[AnnotationId] {
        &self.ids
    }

    /// The id → annotation map.
    pub fn entities(&self) -> &HashMap<AnnotationId, Annotation> {
        &self.entities
    }

    /// Annotations in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.ids.iter().filter_map(|id| self.entities.get(id))
    }

    /// Position of an id in creation order.
    pub fn index_of(&self, id: &AnnotationId) -> Option<usize> {
        self.ids.iter().position(|i| i == id)
    }

    /// Id of the box currently being drawn.
    pub fn creating_id(&self) -> Option<&AnnotationId> {
        self.creating.as_ref()
    }

    /// The box currently being drawn.
    pub fn creating(&self) -> Option<&Annotation> {
        self.creating.as_ref().and_then(|id| self.entities.get(id))
    }

    /// Start a new box at `point` on `image`.
    pub fn create(&mut self, point: Position2D, image: Option<ImageId>) -> &Annotation {
        let annotation = Annotation::with_point(point, image);
        let id = annotation.id.clone();
        log::debug!("Started annotation {} at ({}, {})", id, point.x, point.y);

        self.insert(annotation);
        self.creating = Some(id.clone());
        &self.entities[&id]
    }

    /// Apply the next corner click to the box being drawn.
    pub fn update_creating(
        &mut self,
        point: Position2D,
    ) -> Result<CreationOutcome, AnnotationError> {
        let id = self
            .creating
            .clone()
            .ok_or(AnnotationError::NoAnnotationInProgress)?;
        let current = self
            .entities
            .get(&id)
            .ok_or(AnnotationError::NoAnnotationInProgress)?;

        let next = current.add(point);

        if !next.is_finished() {
            self.entities.insert(id, next.clone());
            self.touch();
            return Ok(CreationOutcome::InProgress(next));
        }

        self.creating = None;

        if next.label.is_degenerate() {
            log::debug!("Discarded zero-area annotation {}", id);
            self.remove(&id);
            return Ok(CreationOutcome::Discarded(id));
        }

        log::debug!(
            "Finished annotation {}: ({}, {}) - ({}, {})",
            id,
            next.label.x1,
            next.label.y1,
            next.label.x2,
            next.label.y2
        );
        self.entities.insert(id, next.clone());
        self.touch();
        Ok(CreationOutcome::Finished(next))
    }

    /// Merge `changes` into the annotation with `id`.
    ///
    /// Returns the previous value, or `None` when the id is unknown.
    pub fn update(&mut self, id: &AnnotationId, changes: &AnnotationChanges) -> Option<Annotation> {
        let annotation = self.entities.get_mut(id)?;
        let previous = annotation.clone();
        changes.apply_to(annotation);
        self.touch();
        Some(previous)
    }

    /// Replace a stored annotation wholesale.
    pub fn replace(&mut self, annotation: Annotation) -> Option<Annotation> {
        if !self.entities.contains_key(&annotation.id) {
            return None;
        }
        let previous = self.entities.insert(annotation.id.clone(), annotation);
        self.touch();
        previous
    }

    /// Remove one annotation.
    pub fn remove(&mut self, id: &AnnotationId) -> Option<Annotation> {
        let removed = self.entities.remove(id)?;
        self.ids.retain(|i| i != id);
        if self.creating.as_ref() == Some(id) {
            self.creating = None;
        }
        self.touch();
        Some(removed)
    }

    /// Remove every annotation. Returns what was removed, in order.
    pub fn clear(&mut self) -> Vec<Annotation> {
        let removed: Vec<Annotation> = self
            .ids
            .drain(..)
            .filter_map(|id| self.entities.remove(&id))
            .collect();
        self.entities.clear();
        self.creating = None;
        self.touch();
        removed
    }

    /// Replace the whole collection.
    pub fn set_all(&mut self, annotations: impl IntoIterator<Item = Annotation>) {
        self.entities.clear();
        self.ids.clear();
        self.creating = None;
        for annotation in annotations {
            self.insert(annotation);
        }
        self.touch();
    }

    /// Insert at the end of the creation order. An existing id is replaced in
    /// place.
    pub fn insert(&mut self, annotation: Annotation) {
        if !self.entities.contains_key(&annotation.id) {
            self.ids.push(annotation.id.clone());
        }
        self.entities.insert(annotation.id.clone(), annotation);
        self.touch();
    }

    /// Put an annotation back at a given position in the creation order.
    pub fn restore(&mut self, annotation: Annotation, index: usize) {
        if self.entities.contains_key(&annotation.id) {
            self.entities.insert(annotation.id.clone(), annotation);
        } else {
            let index = index.min(self.ids.len());
            self.ids.insert(index, annotation.id.clone());
            self.entities.insert(annotation.id.clone(), annotation);
        }
        self.touch();
    }

    /// Annotations belonging to `image`, in creation order.
    pub fn for_image(&self, image: Option<ImageId>) -> Vec<Annotation> {
        self.iter().filter(|a| a.image == image).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Position2D {
        Position2D::new(x, y)
    }

    #[test]
    fn test_create_then_finish() {
        let mut store = AnnotationStore::new();
        store.create(p(5.0, 5.0), Some(1));
        let outcome = store.update_creating(p(1.0, 1.0)).unwrap();

        let CreationOutcome::Finished(anno) = outcome else {
            panic!("expected finished box");
        };
        assert_eq!(anno.label, BoxLabel::new(1.0, 1.0, 5.0, 5.0));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&anno.id), Some(&anno));
        assert!(store.creating().is_none());
    }

    #[test]
    fn test_degenerate_box_removed() {
        let mut store = AnnotationStore::new();
        let first = store.create(p(10.4, 20.6), Some(1)).clone();
        assert_eq!(first.label, BoxLabel::new(10.0, 21.0, 10.0, 21.0));
        assert_eq!(first.annotation_state, AnnotationState::P1Added);

        let outcome = store.update_creating(p(10.4, 20.6)).unwrap();
        assert_eq!(outcome, CreationOutcome::Discarded(first.id));
        assert!(store.is_empty());
        assert!(store.ids().is_empty());
    }

    #[test]
    fn test_points_rounding_to_same_pixel_are_degenerate() {
        let mut store = AnnotationStore::new();
        store.create(p(3.2, 3.4), None);
        store.update_creating(p(2.6, 2.9)).unwrap();
        assert!(store.is_empty());
    }

    /// Nearest integer, exact ties toward positive infinity.
    fn math_round(v: f64) -> f64 {
        let nearest = v.round();
        if (nearest - v).abs() == 0.5 { v.ceil() } else { nearest }
    }

    #[test]
    fn test_boundary_coordinates_round_like_math_round() {
        let values = [
            0.5,
            -0.5,
            0.49999999999999994,
            -0.49999999999999994,
            0.49999997,
            -0.49999997,
            1.5,
            -1.5,
            -2.5000000000000004,
            8388609.0,
            -8388609.0,
            8388608.5,
            4503599627370497.0,
        ];

        for &first in &values {
            for &second in &values {
                let mut store = AnnotationStore::new();
                store.create(p(first, second), None);
                let outcome = store.update_creating(p(second, first)).unwrap();

                let (a, b) = (math_round(first), math_round(second));
                let expected = BoxLabel::new(a.min(b), a.min(b), a.max(b), a.max(b));
                match outcome {
                    CreationOutcome::Finished(anno) => {
                        assert_eq!(anno.label, expected, "points {first} and {second}");
                        assert_eq!(anno.label.normalized(), anno.label);
                    }
                    CreationOutcome::Discarded(_) => {
                        assert!(expected.is_degenerate(), "points {first} and {second}");
                    }
                    CreationOutcome::InProgress(_) => panic!("second click must finish"),
                }
            }
        }
    }

    #[test]
    fn test_thin_box_is_kept() {
        let mut store = AnnotationStore::new();
        store.create(p(3.0, 3.0), None);
        store.update_creating(p(3.0, 9.0)).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_creating_without_create_fails() {
        let mut store = AnnotationStore::new();
        let before = store.revision();
        assert_eq!(
            store.update_creating(p(1.0, 1.0)),
            Err(AnnotationError::NoAnnotationInProgress)
        );
        assert_eq!(store.revision(), before);
    }

    #[test]
    fn test_update_creating_after_finish_fails() {
        let mut store = AnnotationStore::new();
        store.create(p(0.0, 0.0), None);
        store.update_creating(p(5.0, 5.0)).unwrap();
        assert!(store.update_creating(p(8.0, 8.0)).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_in_progress_annotation_survives_new_create() {
        let mut store = AnnotationStore::new();
        let abandoned = store.create(p(0.0, 0.0), None).id.clone();
        let current = store.create(p(10.0, 10.0), None).id.clone();
        assert_eq!(store.creating_id(), Some(&current));

        store.update_creating(p(20.0, 20.0)).unwrap();
        assert_eq!(store.get(&abandoned).unwrap().annotation_state, AnnotationState::P1Added);
        assert!(store.get(&current).unwrap().is_finished());
    }

    #[test]
    fn test_update_merges_fields() {
        let mut store = AnnotationStore::new();
        let id = store.create(p(0.0, 0.0), Some(1)).id.clone();
        store.update_creating(p(4.0, 4.0)).unwrap();

        let prev = store
            .update(&id, &AnnotationChanges::label(BoxLabel::new(8.0, 8.0, 2.0, 2.0)))
            .unwrap();
        assert_eq!(prev.label, BoxLabel::new(0.0, 0.0, 4.0, 4.0));
        let updated = store.get(&id).unwrap();
        // Direct updates are not validated
        assert_eq!(updated.label, BoxLabel::new(8.0, 8.0, 2.0, 2.0));
        assert_eq!(updated.image, Some(1));
        assert_eq!(updated.annotation_state, AnnotationState::Finish);
    }

    #[test]
    fn test_update_unknown_is_noop() {
        let mut store = AnnotationStore::new();
        let before = store.revision();
        assert!(store.update(&AnnotationId::new("nope"), &AnnotationChanges::default()).is_none());
        assert_eq!(store.revision(), before);
    }

    #[test]
    fn test_remove_in_progress_clears_creating() {
        let mut store = AnnotationStore::new();
        let id = store.create(p(1.0, 1.0), None).id.clone();
        assert!(store.remove(&id).is_some());
        assert!(store.creating_id().is_none());
        assert!(store.update_creating(p(2.0, 2.0)).is_err());
    }

    #[test]
    fn test_clear_from_any_state() {
        let mut store = AnnotationStore::new();
        store.create(p(1.0, 1.0), Some(1));
        store.update_creating(p(9.0, 9.0)).unwrap();
        store.create(p(2.0, 2.0), Some(2));
        let removed = store.clear();
        assert_eq!(removed.len(), 2);
        assert!(store.is_empty());
        assert!(store.creating().is_none());
    }

    #[test]
    fn test_set_all_replaces() {
        let mut store = AnnotationStore::new();
        store.create(p(1.0, 1.0), Some(1));

        let a = Annotation {
            id: AnnotationId::new("a"),
            image: Some(3),
            label: BoxLabel::new(0.0, 0.0, 1.0, 1.0),
            annotation_state: AnnotationState::Finish,
        };
        store.set_all(vec![a.clone()]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.iter().next(), Some(&a));
        assert!(store.creating().is_none());
    }

    #[test]
    fn test_restore_keeps_position() {
        let mut store = AnnotationStore::new();
        for x in [0.0, 10.0, 20.0] {
            store.create(p(x, x), None);
            store.update_creating(p(x + 5.0, x + 5.0)).unwrap();
        }
        let middle = store.ids()[1].clone();
        let removed = store.remove(&middle).unwrap();
        store.restore(removed, 1);
        assert_eq!(store.ids()[1], middle);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_for_image_preserves_order() {
        let mut store = AnnotationStore::new();
        let mut expected = Vec::new();
        for (i, image) in [1, 2, 1, 1, 2].into_iter().enumerate() {
            let x = i as f64 * 10.0;
            store.create(p(x, x), Some(image));
            store.update_creating(p(x + 3.0, x + 3.0)).unwrap();
            if image == 1 {
                expected.push(store.ids().last().unwrap().clone());
            }
        }
        let ids: Vec<_> = store.for_image(Some(1)).into_iter().map(|a| a.id).collect();
        assert_eq!(ids, expected);
    }
}
