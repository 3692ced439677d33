//! Application-Layer: CurveEditor, Geometrie-Erzeugung und Host-Szene.

pub mod caps;
pub mod curve_editor;
pub mod decorations;
pub mod road_mesh;
/// Vertrag zur Host-Szene
///
/// Der Editor kennt keine Engine; er spricht nur über [`scene::SceneHost`].
pub mod scene;

pub use caps::{build_cap, start_brackets, CapKind};
pub use curve_editor::{ControlIndexes, CurveEditor};
pub use decorations::{
    generate_road, place_decorations, weighted_pick, DecorationFamily, DecorationGroup,
    DecorationPlacement, DecorationSlot, RoadPlan, BONUS_GROUPS, OBSTACLE_GROUPS,
    SLOTS_PER_SEGMENT,
};
pub use road_mesh::{build_road_mesh, propagate_texture_phase, RoadMesh, TexturePhase};
pub use scene::{
    upload_strip_mesh, MemoryScene, MeshVertex, ObjectHandle, Placement, SceneHost, SceneObject,
    SceneObjectKind, StripMesh,
};
