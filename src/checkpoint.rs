//! Checkpoints: timestamp bookmarks on the current video.
//!
//! A checkpoint carries no geometry. Saved measurements pick up the label of a
//! checkpoint near their timestamp.

use serde::{Deserialize, Serialize};

/// Unique identifier for a checkpoint.
pub type CheckpointId = u64;

/// A bookmarked video timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: CheckpointId,
    /// Video timestamp in seconds.
    pub time: f64,
}

impl Checkpoint {
    /// Display label, e.g. `"1:15"`.
    pub fn label(&self) -> String {
        format_timestamp(self.time)
    }
}

/// Format seconds as `m:ss` (whole minutes, zero-padded whole seconds).
pub fn format_timestamp(secs: f64) -> String {
    let secs = secs.max(0.0);
    let minutes = (secs / 60.0).floor() as u64;
    let seconds = (secs % 60.0).floor() as u64;
    format!("{minutes}:{seconds:02}")
}

/// Ordered checkpoints of the current video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointList {
    checkpoints: Vec<Checkpoint>,
    next_id: CheckpointId,
}

impl CheckpointList {
    pub fn new() -> Self {
        Self {
            checkpoints: Vec::new(),
            next_id: 1,
        }
    }

    /// Bookmark `time` and return the new checkpoint's ID.
    pub fn add(&mut self, time: f64) -> CheckpointId {
        let id = self.next_id;
        self.next_id += 1;
        self.checkpoints.push(Checkpoint { id, time });
        log::debug!("Checkpoint {} created at {:.2}s", id, time);
        id
    }

    /// Remove a checkpoint by ID.
    pub fn remove(&mut self, id: CheckpointId) -> Option<Checkpoint> {
        let index = self.checkpoints.iter().position(|c| c.id == id)?;
        Some(self.checkpoints.remove(index))
    }

    /// First checkpoint within `window` seconds of `time`.
    pub fn find_near(&self, time: f64, window: f64) -> Option<&Checkpoint> {
        self.checkpoints
            .iter()
            .find(|c| (c.time - time).abs() < window)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Checkpoint> {
        self.checkpoints.iter()
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }
}

impl Default for CheckpointList {
    fn default() -> Self {
        Self::new()
    }
}
