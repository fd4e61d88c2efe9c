//! KineLytix - Angle annotation core for movement-analysis videos
//!
//! Measures three-point angles placed on paused video frames, lays out their
//! arcs and labels, and hit-tests saved angles against the pointer. The host
//! UI owns rendering and the video element; this crate owns the geometry,
//! the annotation store and the editing session.

pub mod annotation;
pub mod checkpoint;
pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod measurement;
pub mod session;
pub mod undo;

pub use annotation::{AngleAnnotation, AnnotationId, AnnotationStore};
pub use config::AppConfig;
pub use error::{GeometryError, SessionError, StoreError};
pub use geometry::{
    AngleKind, AngleMeasure, AnglePointTriple, ArcDrawing, ArcSpan, Point, choose_arc_direction,
    compute_angle,
};
pub use hit_test::hit_test_angles;
pub use session::AngleSession;
