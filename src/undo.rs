//! Undo/Redo system for angle annotation edits.
//!
//! Implements the Command pattern: each undoable edit is recorded as a
//! Command holding enough state to reverse and re-apply it against an
//! [`AnnotationStore`] and the measurement rows in [`VideoResults`].

use crate::annotation::{AngleAnnotation, AnnotationId, AnnotationStore};
use crate::constants::DEFAULT_UNDO_HISTORY;
use crate::geometry::AnglePointTriple;
use crate::measurement::{Measurement, VideoResults};

// ============================================================================
// Command Types
// ============================================================================

/// A recorded annotation edit.
#[derive(Debug, Clone)]
pub enum Command {
    /// An angle was saved
    AddAngle {
        /// The annotation that was added
        annotation: AngleAnnotation,
        /// The results row recorded with it
        measurement: Option<Measurement>,
    },
    /// An angle was deleted
    RemoveAngle {
        /// The annotation that was removed (stored for undo)
        annotation: AngleAnnotation,
    },
    /// A saved angle's points were dragged
    MovePoints {
        /// The annotation ID
        id: AnnotationId,
        /// Points before the drag
        old_points: AnglePointTriple,
        /// Points after the drag
        new_points: AnglePointTriple,
    },
    /// Batch command - groups multiple commands into one undo step
    Batch {
        /// Description of the batch operation
        description: String,
        /// The commands in this batch
        commands: Vec<Command>,
    },
}

impl Command {
    /// Get a human-readable description of this command
    pub fn description(&self) -> String {
        match self {
            Command::AddAngle { .. } => "Save angle".to_string(),
            Command::RemoveAngle { .. } => "Delete angle".to_string(),
            Command::MovePoints { .. } => "Move angle point".to_string(),
            Command::Batch { description, .. } => description.clone(),
        }
    }
}

// ============================================================================
// Undo Stack
// ============================================================================

/// Configuration for the undo stack
#[derive(Debug, Clone)]
pub struct UndoConfig {
    /// Maximum number of commands to keep in history
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
/// A new command clears the redo stack. Undo moves the most recent command
/// to the redo stack; redo moves it back.
#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
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

    /// Record a command. This clears the redo stack.
    pub fn push(&mut self, command: Command) {
        log::debug!("Undo: pushed '{}'", command.description());
        self.undo_stack.push(command);
        self.redo_stack.clear();

        if self.undo_stack.len() > self.config.max_history {
            let excess = self.undo_stack.len() - self.config.max_history;
            self.undo_stack.drain(..excess);
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Pop a command for undoing; it moves to the redo stack.
    pub fn pop_undo(&mut self) -> Option<Command> {
        let cmd = self.undo_stack.pop()?;
        log::debug!("Undo: '{}'", cmd.description());
        self.redo_stack.push(cmd.clone());
        Some(cmd)
    }

    /// Pop a command for redoing; it moves back to the undo stack.
    pub fn pop_redo(&mut self) -> Option<Command> {
        let cmd = self.redo_stack.pop()?;
        log::debug!("Redo: '{}'", cmd.description());
        self.undo_stack.push(cmd.clone());
        Some(cmd)
    }

    /// Get the description of the command that would be undone
    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.last().map(|c| c.description())
    }

    /// Get the description of the command that would be redone
    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(|c| c.description())
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        log::debug!("Undo history cleared");
    }
}

// ============================================================================
// Undo/Redo Execution
// ============================================================================

/// Undo the most recent command against `store` and `results`.
/// Returns the undone command, or None if there was nothing to undo.
pub fn undo_command(
    stack: &mut UndoStack,
    store: &mut AnnotationStore,
    results: &mut VideoResults,
) -> Option<Command> {
    let cmd = stack.pop_undo()?;
    apply_undo(&cmd, store, results);
    Some(cmd)
}

/// Redo the most recently undone command against `store` and `results`.
/// Returns the redone command, or None if there was nothing to redo.
pub fn redo_command(
    stack: &mut UndoStack,
    store: &mut AnnotationStore,
    results: &mut VideoResults,
) -> Option<Command> {
    let cmd = stack.pop_redo()?;
    apply_redo(&cmd, store, results);
    Some(cmd)
}

fn apply_undo(cmd: &Command, store: &mut AnnotationStore, results: &mut VideoResults) {
    match cmd {
        Command::AddAngle {
            annotation,
            measurement,
        } => {
            store.remove(annotation.id);
            if let Some(row) = measurement {
                results.remove_measurement(row.frame_number);
            }
        }
        Command::RemoveAngle { annotation } => {
            store.restore(annotation.clone());
        }
        Command::MovePoints { id, old_points, .. } => {
            set_points(store, *id, *old_points);
        }
        Command::Batch { commands, .. } => {
            for cmd in commands.iter().rev() {
                apply_undo(cmd, store, results);
            }
        }
    }
}

fn apply_redo(cmd: &Command, store: &mut AnnotationStore, results: &mut VideoResults) {
    match cmd {
        Command::AddAngle {
            annotation,
            measurement,
        } => {
            store.restore(annotation.clone());
            if let Some(row) = measurement {
                results.restore_measurement(row.clone());
            }
        }
        Command::RemoveAngle { annotation } => {
            store.remove(annotation.id);
        }
        Command::MovePoints { id, new_points, .. } => {
            set_points(store, *id, *new_points);
        }
        Command::Batch { commands, .. } => {
            for cmd in commands {
                apply_redo(cmd, store, results);
            }
        }
    }
}

/// Replace points and re-measure. Both ends of a recorded move were valid
/// angles, so failures only mean the annotation is gone.
fn set_points(store: &mut AnnotationStore, id: AnnotationId, points: AnglePointTriple) {
    if let Err(e) = store
        .update_points(id, points)
        .and_then(|()| store.refresh_angle(id).map(|_| ()))
    {
        log::warn!("Could not re-apply points for angle {}: {}", id, e);
    }
}

// ============================================================================
// Tests
// ============================================================================
