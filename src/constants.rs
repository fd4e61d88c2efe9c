//! Default interaction constants for the KineLytix angle tool.

/// Pointer distance (canvas pixels) under which a point counts as "near".
/// Used for drag-start detection and for hover/selection of saved angles.
pub const DEFAULT_HIT_RADIUS: f64 = 10.0;

/// Seconds either side of the current video time in which a saved angle is
/// considered pinned to the visible frame.
pub const DEFAULT_TIME_WINDOW_SECS: f64 = 0.2;

/// Radius of the arc drawn at the vertex of an angle.
pub const DEFAULT_ARC_RADIUS: f64 = 40.0;

/// Extra distance beyond the arc at which the degree label is placed.
pub const DEFAULT_LABEL_OFFSET: f64 = 20.0;

/// Maximum number of undoable annotation edits kept in history.
pub const DEFAULT_UNDO_HISTORY: usize = 100;
