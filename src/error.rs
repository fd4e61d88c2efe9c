//! Error types for angle geometry and annotation storage.

use thiserror::Error;

use crate::annotation::AnnotationId;

/// Input-validation failures of the angle geometry functions.
///
/// None of these are retried: the host is expected to show guidance and keep
/// the annotation editable.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    /// One of the arms has zero length, so the angle at the vertex is undefined.
    #[error("Degenerate angle: a point coincides with the vertex")]
    Degenerate,

    /// Fewer than three points were supplied.
    #[error("Incomplete annotation: expected 3 points, found {found}")]
    Incomplete {
        /// Number of points actually supplied
        found: usize,
    },

    /// More than three points were supplied.
    #[error("Invalid annotation: expected 3 points, found {found}")]
    TooManyPoints {
        /// Number of points actually supplied
        found: usize,
    },
}

impl GeometryError {
    /// Build the matching point-count error for a slice of `found` points.
    /// Returns `None` when the count is exactly three.
    pub fn for_point_count(found: usize) -> Option<Self> {
        match found {
            3 => None,
            n if n < 3 => Some(Self::Incomplete { found: n }),
            n => Some(Self::TooManyPoints { found: n }),
        }
    }
}

/// Errors raised by [`AnnotationStore`](crate::annotation::AnnotationStore) mutations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// No annotation with this id exists in the store
    #[error("Annotation not found: {0}")]
    NotFound(AnnotationId),

    /// An annotation with this id is already stored
    #[error("Duplicate annotation id: {0}")]
    DuplicateId(AnnotationId),

    /// The id is reserved and cannot be stored
    #[error("Annotation id out of range: {0}")]
    IdOutOfRange(AnnotationId),

    /// The annotation's points no longer form a measurable angle
    #[error("Annotation {id}: {source}")]
    Geometry {
        /// The annotation being recomputed
        id: AnnotationId,
        /// The underlying geometry failure
        #[source]
        source: GeometryError,
    },
}

/// Errors surfaced to the host by [`AngleSession`](crate::session::AngleSession) actions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// The pending points cannot be measured
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// A store mutation failed
    #[error(transparent)]
    Store(#[from] StoreError),
}
