//! Angle editing session for one loaded video.
//!
//! [`AngleSession`] owns the annotation store and the editing state machine
//! the host UI drives with pointer events:
//!
//! ```text
//! Idle ──begin_placement──▶ Placing(0..3 points) ──save_angle──▶ Idle
//!  │  ▲                        │  ▲
//!  │  └──click elsewhere──┐    └──pointer_down/up on a pending point (Dragging)
//!  ▼                      │
//! Saved(id) ◀──click on a visible angle
//!  │
//!  └──pointer_down on one of its points──▶ Dragging(id, index) ──pointer_up──▶ Saved(id)
//! ```
//!
//! The session also keeps the per-video checkpoints, measurement results and
//! undo history.

use crate::annotation::{AngleAnnotation, AnnotationId, AnnotationStore};
use crate::checkpoint::{Checkpoint, CheckpointId, CheckpointList};
use crate::config::{AppConfig, InteractionSettings};
use crate::error::{GeometryError, SessionError, StoreError};
use crate::geometry::{
    AngleKind, AngleMeasure, AnglePointTriple, ArcDrawing, Point, arc_drawing,
    compute_angle_from_slice, find_near_point,
};
use crate::hit_test::hit_test_point;
use crate::measurement::VideoResults;
use crate::undo::{Command, UndoConfig, UndoStack, redo_command, undo_command};

#[cfg(test)]
mod tests;

// ============================================================================
// State Machine
// ============================================================================

/// What a drag is moving.
#[derive(Debug, Clone, PartialEq)]
pub enum DragTarget {
    /// A point of the angle still being placed.
    Pending { points: Vec<Point> },
    /// A point of a saved angle; `original` is kept for undo and revert.
    Saved {
        id: AnnotationId,
        original: AnglePointTriple,
    },
}

/// Editing state of the session.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditState {
    /// Nothing selected or in progress.
    #[default]
    Idle,
    /// Collecting up to three points for a new angle.
    Placing { points: Vec<Point> },
    /// A saved angle is selected.
    Saved(AnnotationId),
    /// A point is being dragged.
    Dragging {
        target: DragTarget,
        point_index: usize,
        /// Whether any pointer move happened since the press.
        moved: bool,
    },
}

/// Result of placing a point.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementProgress {
    /// Not placing.
    Ignored,
    /// Point accepted; `count` points placed so far.
    Placed { count: usize },
    /// Three points are pending; `measure` is their angle.
    Complete {
        measure: Result<AngleMeasure, GeometryError>,
    },
}

/// Result of a click on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Click was swallowed (it ended a drag, or a drag is in progress).
    Ignored,
    /// Click placed a point of the pending angle.
    Placed(PlacementProgress),
    /// Click landed on a visible saved angle.
    Selected(AnnotationId),
    /// Click landed on nothing; selection cleared.
    Deselected,
}

/// How a saved angle should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Normal,
    Hovered,
    Selected,
}

// ============================================================================
// Session
// ============================================================================

/// Editing session for the currently loaded video.
#[derive(Debug, Clone)]
pub struct AngleSession {
    store: AnnotationStore,
    state: EditState,
    kind: AngleKind,
    hovered: Option<AnnotationId>,
    /// Set when a press started a drag so the click that follows the release
    /// does not also place or select.
    suppress_click: bool,
    undo: UndoStack,
    checkpoints: CheckpointList,
    results: VideoResults,
    settings: InteractionSettings,
}

impl AngleSession {
    pub fn new(settings: InteractionSettings) -> Self {
        Self {
            store: AnnotationStore::new(),
            state: EditState::Idle,
            kind: AngleKind::default(),
            hovered: None,
            suppress_click: false,
            undo: UndoStack::new(),
            checkpoints: CheckpointList::new(),
            results: VideoResults::new(),
            settings,
        }
    }

    /// Create a session using the interaction settings, default angle kind
    /// and undo depth from `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut session = Self::new(config.interaction);
        session.kind = config.preferences.default_angle_kind;
        session.undo = UndoStack::with_config(UndoConfig {
            max_history: config.preferences.undo_history,
        });
        session
    }

    /// Create a session around previously saved annotations.
    pub fn with_store(store: AnnotationStore, settings: InteractionSettings) -> Self {
        Self {
            store,
            ..Self::new(settings)
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    /// Mutable store access for the host (e.g. clearing the dirty flag).
    pub fn store_mut(&mut self) -> &mut AnnotationStore {
        &mut self.store
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn settings(&self) -> &InteractionSettings {
        &self.settings
    }

    /// The measurement new angles display.
    pub fn angle_kind(&self) -> AngleKind {
        self.kind
    }

    pub fn hovered(&self) -> Option<AnnotationId> {
        self.hovered
    }

    /// The selected saved angle, including one being dragged.
    pub fn selected(&self) -> Option<AnnotationId> {
        match &self.state {
            EditState::Saved(id)
            | EditState::Dragging {
                target: DragTarget::Saved { id, .. },
                ..
            } => Some(*id),
            _ => None,
        }
    }

    /// Points of the angle being placed (empty when not placing).
    pub fn pending_points(&self) -> &[Point] {
        match &self.state {
            EditState::Placing { points }
            | EditState::Dragging {
                target: DragTarget::Pending { points },
                ..
            } => points.as_slice(),
            _ => &[],
        }
    }

    pub fn checkpoints(&self) -> &CheckpointList {
        &self.checkpoints
    }

    pub fn results(&self) -> &VideoResults {
        &self.results
    }

    /// Mutable results access, for attaching participant metadata.
    pub fn results_mut(&mut self) -> &mut VideoResults {
        &mut self.results
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    /// Label for the edit `undo` would revert, e.g. `"Delete angle"`.
    pub fn undo_description(&self) -> Option<String> {
        self.undo.undo_description()
    }

    /// Label for the edit `redo` would re-apply.
    pub fn redo_description(&self) -> Option<String> {
        self.undo.redo_description()
    }

    // ------------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------------

    /// Start collecting points for a new angle, dropping any selection.
    pub fn begin_placement(&mut self) {
        self.state = EditState::Placing { points: Vec::new() };
        self.hovered = None;
        log::debug!("Angle placement started");
    }

    /// Leave placement or selection and return to idle. A drag of a saved
    /// angle is reverted.
    pub fn cancel(&mut self) {
        if let EditState::Dragging {
            target: DragTarget::Saved { id, original },
            moved: true,
            ..
        } = std::mem::take(&mut self.state)
        {
            self.revert_points(id, original);
        }
        self.suppress_click = false;
    }

    /// Add a point to the pending angle. Once three points exist, a new point
    /// drops the oldest so the latest three are kept.
    pub fn place_point(&mut self, point: Point) -> PlacementProgress {
        let EditState::Placing { points } = &mut self.state else {
            return PlacementProgress::Ignored;
        };

        points.push(point);
        if points.len() > 3 {
            points.remove(0);
        }
        if points.len() == 3 {
            PlacementProgress::Complete {
                measure: compute_angle_from_slice(points),
            }
        } else {
            PlacementProgress::Placed {
                count: points.len(),
            }
        }
    }

    /// Measure the pending angle.
    pub fn pending_measure(&self) -> Result<AngleMeasure, GeometryError> {
        compute_angle_from_slice(self.pending_points())
    }

    /// Arc and label layout for the pending angle.
    pub fn pending_arc(&self) -> Result<ArcDrawing, GeometryError> {
        let triple = AnglePointTriple::try_from(self.pending_points())?;
        self.arc_for(&triple, self.kind)
    }

    /// Arc and label layout for a saved angle, showing its stored kind.
    pub fn annotation_arc(&self, annotation: &AngleAnnotation) -> Result<ArcDrawing, GeometryError> {
        self.arc_for(&annotation.points, annotation.kind)
    }

    fn arc_for(
        &self,
        triple: &AnglePointTriple,
        kind: AngleKind,
    ) -> Result<ArcDrawing, GeometryError> {
        arc_drawing(
            triple,
            kind,
            self.settings.arc_radius,
            self.settings.label_distance(),
        )
    }

    /// Switch between showing the inner and outer angle. Returns the new kind.
    pub fn toggle_angle_kind(&mut self) -> AngleKind {
        self.kind = self.kind.toggled();
        log::debug!("Showing {} angle", self.kind.name());
        self.kind
    }

    /// Save the pending angle at `current_time`.
    ///
    /// Records a measurement row (numbered after the existing ones and labeled
    /// with a checkpoint near `current_time`, if any) and an undo step, then
    /// returns to idle.
    ///
    /// # Errors
    /// `Incomplete`/`TooManyPoints` unless exactly three points are pending,
    /// `Degenerate` if a point coincides with the vertex. The pending points
    /// are kept so the user can fix them.
    pub fn save_angle(&mut self, current_time: f64) -> Result<AnnotationId, SessionError> {
        let triple = AnglePointTriple::try_from(self.pending_points())?;
        let id = match self.store.add(current_time, triple, self.kind) {
            Ok(id) => id,
            Err(e) => {
                log::warn!("Refusing to save angle: {}", e);
                return Err(e.into());
            }
        };

        let annotation = self
            .store
            .find_by_id(id)
            .cloned()
            .ok_or(StoreError::NotFound(id))?;

        let checkpoint = self
            .checkpoints
            .find_near(current_time, self.settings.time_window_secs)
            .map(Checkpoint::label);
        let frame_number = self.results.push_measurement(annotation.angle, checkpoint);
        log::info!(
            "Saved angle {}: {:.2}° at {:.2}s (frame {})",
            id,
            annotation.angle,
            current_time,
            frame_number
        );

        self.undo.push(Command::AddAngle {
            annotation,
            measurement: self.results.measurements.last().cloned(),
        });
        self.state = EditState::Idle;
        Ok(id)
    }

    // ------------------------------------------------------------------------
    // Pointer Interaction
    // ------------------------------------------------------------------------

    /// Handle a pointer press. Starts a drag when the press is near a pending
    /// point (while placing) or near a point of a visible saved angle.
    /// Returns true if a drag started.
    pub fn pointer_down(&mut self, point: Point, current_time: f64) -> bool {
        self.suppress_click = false;
        let radius = self.settings.hit_radius;

        let next = match &self.state {
            EditState::Placing { points } => {
                find_near_point(point, points, radius).map(|point_index| EditState::Dragging {
                    target: DragTarget::Pending {
                        points: points.clone(),
                    },
                    point_index,
                    moved: false,
                })
            }
            EditState::Idle | EditState::Saved(_) => hit_test_point(
                point,
                self.store.all(),
                current_time,
                self.settings.time_window_secs,
                radius,
            )
            .and_then(|(id, point_index)| {
                let original = self.store.find_by_id(id)?.points;
                Some(EditState::Dragging {
                    target: DragTarget::Saved { id, original },
                    point_index,
                    moved: false,
                })
            }),
            EditState::Dragging { .. } => None,
        };

        match next {
            Some(state) => {
                self.state = state;
                true
            }
            None => false,
        }
    }

    /// Handle a pointer move. While dragging, moves the dragged point (saved
    /// angles keep their old measurement until release); otherwise updates the
    /// hovered angle. Returns true if the view needs a redraw.
    pub fn pointer_move(&mut self, point: Point, current_time: f64) -> bool {
        match &mut self.state {
            EditState::Dragging {
                target,
                point_index,
                moved,
            } => {
                *moved = true;
                match target {
                    DragTarget::Pending { points } => {
                        if let Some(slot) = points.get_mut(*point_index) {
                            *slot = point;
                        }
                    }
                    DragTarget::Saved { id, .. } => {
                        let id = *id;
                        let updated = self
                            .store
                            .find_by_id(id)
                            .and_then(|ann| ann.points.with_point(*point_index, point));
                        if let Some(points) = updated
                            && let Err(e) = self.store.update_points(id, points)
                        {
                            log::warn!("Drag update failed: {}", e);
                        }
                    }
                }
                true
            }
            EditState::Placing { .. } => false,
            EditState::Idle | EditState::Saved(_) => {
                let hovered = self.store.hit_test(
                    point,
                    current_time,
                    self.settings.time_window_secs,
                    self.settings.hit_radius,
                );
                if hovered != self.hovered {
                    self.hovered = hovered;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Handle a pointer release, ending any drag.
    ///
    /// A moved saved angle is re-measured once here and an undo step is
    /// recorded. Returns the id of the saved angle that was dragged.
    ///
    /// # Errors
    /// If the drag collapsed a point onto the vertex the points are reverted
    /// and `Degenerate` is returned.
    pub fn pointer_up(&mut self) -> Result<Option<AnnotationId>, SessionError> {
        if !matches!(self.state, EditState::Dragging { .. }) {
            return Ok(None);
        }
        let EditState::Dragging { target, moved, .. } = std::mem::take(&mut self.state) else {
            return Ok(None);
        };
        self.suppress_click = true;

        match target {
            DragTarget::Pending { points } => {
                self.state = EditState::Placing { points };
                Ok(None)
            }
            DragTarget::Saved { id, original } => {
                self.state = EditState::Saved(id);
                if !moved {
                    return Ok(Some(id));
                }
                match self.store.refresh_angle(id) {
                    Ok(angle) => {
                        if let Some(new_points) = self.store.find_by_id(id).map(|a| a.points) {
                            self.undo.push(Command::MovePoints {
                                id,
                                old_points: original,
                                new_points,
                            });
                        }
                        log::debug!("Angle {} re-measured after drag: {:.2}°", id, angle);
                        Ok(Some(id))
                    }
                    Err(e) => {
                        log::warn!("Reverting drag of angle {}: {}", id, e);
                        self.revert_points(id, original);
                        Err(e.into())
                    }
                }
            }
        }
    }

    /// Handle a click (press and release without a drag).
    pub fn click(&mut self, point: Point, current_time: f64) -> ClickOutcome {
        if std::mem::take(&mut self.suppress_click) {
            return ClickOutcome::Ignored;
        }

        match self.state {
            EditState::Placing { .. } => ClickOutcome::Placed(self.place_point(point)),
            EditState::Dragging { .. } => ClickOutcome::Ignored,
            EditState::Idle | EditState::Saved(_) => {
                match self.store.hit_test(
                    point,
                    current_time,
                    self.settings.time_window_secs,
                    self.settings.hit_radius,
                ) {
                    Some(id) => {
                        self.state = EditState::Saved(id);
                        ClickOutcome::Selected(id)
                    }
                    None => {
                        self.state = EditState::Idle;
                        ClickOutcome::Deselected
                    }
                }
            }
        }
    }

    /// How a saved angle should be drawn right now.
    pub fn highlight(&self, id: AnnotationId) -> Highlight {
        if self.selected() == Some(id) {
            Highlight::Selected
        } else if self.hovered == Some(id) {
            Highlight::Hovered
        } else {
            Highlight::Normal
        }
    }

    /// Saved angles to draw at `current_time`.
    pub fn visible_annotations(&self, current_time: f64) -> impl Iterator<Item = &AngleAnnotation> {
        self.store
            .visible_at(current_time, self.settings.time_window_secs)
    }

    // ------------------------------------------------------------------------
    // Deletion and History
    // ------------------------------------------------------------------------

    /// Delete a saved angle, recording an undo step.
    pub fn delete(&mut self, id: AnnotationId) -> Option<AngleAnnotation> {
        let removed = self.store.remove(id)?;
        self.forget(id);
        self.undo.push(Command::RemoveAngle {
            annotation: removed.clone(),
        });
        Some(removed)
    }

    /// Delete the selected angle.
    pub fn delete_selected(&mut self) -> Option<AngleAnnotation> {
        let id = self.selected()?;
        self.delete(id)
    }

    /// Delete every saved angle as one undo step. Measurement rows are kept.
    /// Returns the number of angles removed.
    pub fn clear_annotations(&mut self) -> usize {
        if matches!(self.state, EditState::Dragging { .. }) {
            self.cancel();
        }
        let commands: Vec<Command> = self
            .store
            .iter()
            .map(|annotation| Command::RemoveAngle {
                annotation: annotation.clone(),
            })
            .collect();
        let count = commands.len();
        if count == 0 {
            return 0;
        }

        self.store.clear();
        self.prune_stale_ids();
        self.undo.push(Command::Batch {
            description: format!("Clear {} angles", count),
            commands,
        });
        log::info!("Cleared {} angles", count);
        count
    }

    /// Replace the annotations with a loaded set (e.g. another video's file).
    /// Selection, pending points and undo history are reset.
    pub fn load_annotations(&mut self, store: AnnotationStore) {
        log::info!("Loaded {} angles into session", store.len());
        self.store = store;
        self.state = EditState::Idle;
        self.hovered = None;
        self.suppress_click = false;
        self.undo.clear();
    }

    /// Undo the last annotation edit. Not available mid-drag.
    /// Returns the description of the undone edit.
    pub fn undo(&mut self) -> Option<String> {
        if matches!(self.state, EditState::Dragging { .. }) {
            return None;
        }
        let cmd = undo_command(&mut self.undo, &mut self.store, &mut self.results)?;
        self.prune_stale_ids();
        Some(cmd.description())
    }

    /// Redo the last undone edit. Not available mid-drag.
    pub fn redo(&mut self) -> Option<String> {
        if matches!(self.state, EditState::Dragging { .. }) {
            return None;
        }
        let cmd = redo_command(&mut self.undo, &mut self.store, &mut self.results)?;
        self.prune_stale_ids();
        Some(cmd.description())
    }

    // ------------------------------------------------------------------------
    // Checkpoints
    // ------------------------------------------------------------------------

    /// Bookmark the current video time.
    pub fn add_checkpoint(&mut self, current_time: f64) -> CheckpointId {
        self.checkpoints.add(current_time)
    }

    pub fn remove_checkpoint(&mut self, id: CheckpointId) -> Option<Checkpoint> {
        self.checkpoints.remove(id)
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn revert_points(&mut self, id: AnnotationId, original: AnglePointTriple) {
        let reverted = self
            .store
            .update_points(id, original)
            .and_then(|()| self.store.refresh_angle(id));
        if let Err(e) = reverted {
            log::warn!("Could not revert angle {}: {}", id, e);
        }
    }

    /// Drop references to an annotation that no longer exists.
    fn forget(&mut self, id: AnnotationId) {
        if self.selected() == Some(id) {
            self.state = EditState::Idle;
        }
        if self.hovered == Some(id) {
            self.hovered = None;
        }
    }

    fn prune_stale_ids(&mut self) {
        for id in self.selected().into_iter().chain(self.hovered) {
            if self.store.find_by_id(id).is_none() {
                self.forget(id);
            }
        }
    }
}

impl Default for AngleSession {
    fn default() -> Self {
        Self::new(InteractionSettings::default())
    }
}
