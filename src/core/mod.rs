//! Core-Domänentypen: Vektoren, Bézier-Kurven, Anker und die Strecke.
//!
//! Dieses Modul kennt keinen Host: es liefert nur Geometrie und Topologie.

pub mod anchor_point;
pub mod bezier_curve;
pub mod bezier_track;
pub mod error;
/// 2D-Vektor-Typ und Hilfsfunktionen
pub mod vector;

pub use anchor_point::{curve_from_anchors, AnchorPoint, HandleSide};
pub use bezier_curve::{ArcLengthLut, BezierCurve, BoundingBox, DEFAULT_SAMPLES};
pub use bezier_track::{AnchorId, BezierTrack};
pub use error::{TrackError, TrackResult};
pub use vector::{Vector2, Vector2Ext, POINT_EPSILON};
