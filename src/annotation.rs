//! Saved angle annotations and their store.
//!
//! This module provides:
//! - `AngleAnnotation`, a measured three-point angle pinned to a video timestamp
//! - `AnnotationStore`, the ordered collection owned by one video session
//! - JSON import/export of the store

use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, StoreError};
use crate::geometry::{AngleKind, AnglePointTriple, Point};
use crate::hit_test;

/// Unique identifier for an angle annotation.
pub type AnnotationId = u64;

// ============================================================================
// Annotation
// ============================================================================

/// A saved angle measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngleAnnotation {
    /// Unique, stable for the annotation's lifetime.
    pub id: AnnotationId,
    /// Video timestamp in seconds. Never changes after creation.
    pub time: f64,
    /// The three placed points; index 1 is the vertex.
    pub points: AnglePointTriple,
    /// The displayed measurement in degrees.
    pub angle: f64,
    /// Which measurement `angle` holds.
    #[serde(default)]
    pub kind: AngleKind,
}

impl AngleAnnotation {
    /// Create an annotation, measuring the angle of `points`.
    pub fn new(
        id: AnnotationId,
        time: f64,
        points: AnglePointTriple,
        kind: AngleKind,
    ) -> Result<Self, GeometryError> {
        let angle = points.measure()?.value(kind);
        Ok(Self {
            id,
            time,
            points,
            angle,
            kind,
        })
    }

    /// Recompute `angle` from the current points and kind.
    fn remeasure(&mut self) -> Result<f64, StoreError> {
        let measure = self.points.measure().map_err(|source| StoreError::Geometry {
            id: self.id,
            source,
        })?;
        self.angle = measure.value(self.kind);
        Ok(self.angle)
    }
}

// ============================================================================
// Annotation Store
// ============================================================================

/// Storage for the angle annotations of the currently loaded video.
///
/// Annotations are kept in insertion order, which is also the hit-testing
/// priority order. Ids come from a counter and are never reused, so the list
/// is also sorted by id; `insert`, `restore` and `from_json` keep it that way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationStore {
    /// All annotations in insertion order.
    annotations: Vec<AngleAnnotation>,
    /// Counter for generating unique annotation IDs.
    #[serde(default = "first_id")]
    next_id: AnnotationId,
    /// Dirty flag - set when annotations change.
    /// Lets the host skip redrawing the overlay when nothing moved.
    #[serde(skip)]
    dirty: bool,
}

fn first_id() -> AnnotationId {
    1
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self {
            annotations: Vec::new(),
            next_id: first_id(),
            dirty: true, // Start dirty so the first overlay draw happens
        }
    }

    /// Check if the store has been modified since last clear_dirty().
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag. Call after redrawing the overlay.
    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Mark the store as dirty.
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Measure and add a new annotation, returning its ID.
    ///
    /// Degenerate triples are refused so no undefined measurement is stored.
    pub fn add(
        &mut self,
        time: f64,
        points: AnglePointTriple,
        kind: AngleKind,
    ) -> Result<AnnotationId, GeometryError> {
        let annotation = AngleAnnotation::new(self.next_id, time, points, kind)?;
        let id = annotation.id;
        self.next_id = self.next_id.saturating_add(1);
        self.annotations.push(annotation);
        self.mark_dirty();
        log::debug!("Added angle {} at {:.2}s", id, time);
        Ok(id)
    }

    /// Add a pre-built annotation, keeping its ID. It is placed by ID, the
    /// same place it would hold had the counter allocated it.
    pub fn insert(&mut self, annotation: AngleAnnotation) -> Result<(), StoreError> {
        if annotation.id == AnnotationId::MAX {
            return Err(StoreError::IdOutOfRange(annotation.id));
        }
        if self.find_by_id(annotation.id).is_some() {
            return Err(StoreError::DuplicateId(annotation.id));
        }
        self.next_id = self.next_id.max(annotation.id.saturating_add(1));
        let index = self.annotations.partition_point(|a| a.id < annotation.id);
        self.annotations.insert(index, annotation);
        self.mark_dirty();
        Ok(())
    }

    /// Put back a previously removed annotation with its original ID, at the
    /// position its ID held in insertion order. Replaces an existing entry
    /// with the same ID.
    pub fn restore(&mut self, annotation: AngleAnnotation) {
        if let Some(existing) = self.get_mut(annotation.id) {
            *existing = annotation;
        } else {
            let index = self.annotations.partition_point(|a| a.id < annotation.id);
            self.next_id = self.next_id.max(annotation.id.saturating_add(1));
            self.annotations.insert(index, annotation);
        }
        self.mark_dirty();
    }

    /// Remove an annotation by ID.
    pub fn remove(&mut self, id: AnnotationId) -> Option<AngleAnnotation> {
        let index = self.annotations.iter().position(|a| a.id == id)?;
        self.mark_dirty();
        log::debug!("Removed angle {}", id);
        Some(self.annotations.remove(index))
    }

    /// Get an annotation by ID.
    pub fn find_by_id(&self, id: AnnotationId) -> Option<&AngleAnnotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    fn get_mut(&mut self, id: AnnotationId) -> Option<&mut AngleAnnotation> {
        self.annotations.iter_mut().find(|a| a.id == id)
    }

    /// All annotations in insertion order.
    pub fn all(&self) -> &[AngleAnnotation] {
        &self.annotations
    }

    /// Iterate over all annotations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &AngleAnnotation> {
        self.annotations.iter()
    }

    /// Get the number of annotations.
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// Check if there are no annotations.
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Clear all annotations. The ID counter keeps running.
    pub fn clear(&mut self) {
        if !self.annotations.is_empty() {
            self.mark_dirty();
        }
        self.annotations.clear();
    }

    /// Replace an annotation's points without re-measuring.
    ///
    /// Called on every pointer move of a drag; call [`refresh_angle`](Self::refresh_angle)
    /// once when the drag ends.
    pub fn update_points(
        &mut self,
        id: AnnotationId,
        points: AnglePointTriple,
    ) -> Result<(), StoreError> {
        let annotation = self.get_mut(id).ok_or(StoreError::NotFound(id))?;
        annotation.points = points;
        self.mark_dirty();
        Ok(())
    }

    /// Re-measure an annotation from its current points and store the result.
    pub fn refresh_angle(&mut self, id: AnnotationId) -> Result<f64, StoreError> {
        let annotation = self.get_mut(id).ok_or(StoreError::NotFound(id))?;
        let angle = annotation.remeasure()?;
        self.mark_dirty();
        Ok(angle)
    }

    /// Switch the displayed measurement of an annotation and re-measure it.
    pub fn set_kind(&mut self, id: AnnotationId, kind: AngleKind) -> Result<f64, StoreError> {
        let annotation = self.get_mut(id).ok_or(StoreError::NotFound(id))?;
        let previous = annotation.kind;
        annotation.kind = kind;
        match annotation.remeasure() {
            Ok(angle) => {
                self.mark_dirty();
                Ok(angle)
            }
            Err(e) => {
                annotation.kind = previous;
                Err(e)
            }
        }
    }

    /// Annotations visible at `current_time`.
    pub fn visible_at(
        &self,
        current_time: f64,
        window: f64,
    ) -> impl Iterator<Item = &AngleAnnotation> {
        hit_test::visible_at(&self.annotations, current_time, window)
    }

    /// Find the visible annotation with a point near `point`.
    pub fn hit_test(
        &self,
        point: Point,
        current_time: f64,
        window: f64,
        threshold: f64,
    ) -> Option<AnnotationId> {
        hit_test::hit_test_angles(point, &self.annotations, current_time, window, threshold)
    }

    // ========================================================================
    // Import/Export
    // ========================================================================

    /// Export annotations to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Import annotations from JSON string.
    ///
    /// Annotations are reordered by ID. Duplicate IDs and the reserved
    /// `u64::MAX` ID are rejected.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut store: Self = serde_json::from_str(json)?;
        store.annotations.sort_by_key(|a| a.id);

        if let Some(pair) = store.annotations.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(serde::de::Error::custom(format!(
                "duplicate annotation id {}",
                pair[0].id
            )));
        }
        let max_id = store.annotations.last().map_or(0, |a| a.id);
        if max_id == AnnotationId::MAX || store.next_id == AnnotationId::MAX {
            return Err(serde::de::Error::custom(format!(
                "annotation id {} is out of range",
                max_id.max(store.next_id)
            )));
        }

        store.next_id = store.next_id.max(max_id + 1);
        store.dirty = true;
        Ok(store)
    }
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
