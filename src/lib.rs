//! Race Track Editor Library.
//! Bézier-Strecken, Straßen-Meshes und Editor-Logik als Library für Hosts, Tests und CLI.

pub mod app;
pub mod core;
pub mod shared;
pub mod track_file;

pub use app::{CurveEditor, MemoryScene, ObjectHandle, SceneHost, SceneObjectKind};
pub use core::{
    AnchorId, AnchorPoint, BezierCurve, BezierTrack, HandleSide, TrackError, TrackResult,
    Vector2, Vector2Ext,
};
pub use shared::EditorOptions;
pub use track_file::{load_track_file, parse_track_json, save_track_file, write_track_json};
