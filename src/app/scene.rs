//! Vertrag zur Host-Szene plus eine In-Memory-Implementierung.
//!
//! Der Editor erzeugt nur Geometrie (Vertex-/UV-Streams, Platzierungen) und
//! reicht sie über [`SceneHost`] an die Szene weiter. Welche Engine dahinter
//! steht, bleibt dem Adapter überlassen.

use super::decorations::DecorationFamily;
use crate::core::Vector2;
use glam::Vec2;
use serde::Serialize;
use std::collections::BTreeMap;

/// Undurchsichtiger Verweis auf ein Objekt der Host-Szene
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ObjectHandle(pub u64);

/// Art eines Szenen-Objekts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneObjectKind {
    /// Greifpunkt eines Ankers
    Anchor,
    /// Greifpunkt eines Kontrollpunkts
    Control,
    /// Straßen-Mesh eines Segments
    RoadMesh,
    /// Startlinie
    StartCap,
    /// Ziellinie
    FinishCap,
    /// Startblock (vier Stück)
    StartBracket,
    /// Hindernis oder Bonus auf der Fahrbahn
    Decoration {
        /// Objektfamilie
        family: DecorationFamily,
        /// Animations-/Sprite-Name
        animation: &'static str,
    },
}

/// Ein Mesh-Vertex: Position in normierten Box-Koordinaten plus UV
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MeshVertex {
    pub x: f32,
    pub y: f32,
    pub u: f32,
    pub v: f32,
}

impl MeshVertex {
    /// Vertex aus normierter Position und Texturkoordinaten
    pub fn new(position: Vector2, u: f32, v: f32) -> Self {
        Self {
            x: position.x,
            y: position.y,
            u,
            v,
        }
    }
}

/// Position und Drehung (Grad) eines platzierten Objekts
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Placement {
    pub position: Vector2,
    pub angle_degrees: f32,
}

/// Zweispaltiges Streifen-Mesh (linker/rechter Rand) in einer Box.
///
/// `rows[r] = [links, rechts]`; Zeile 0 liegt am Kurvenende.
#[derive(Debug, Clone, PartialEq)]
pub struct StripMesh {
    /// Mittelpunkt der Box (Weltkoordinaten)
    pub center: Vector2,
    /// Größe der Box
    pub size: Vector2,
    /// Vertex-Zeilen
    pub rows: Vec<[MeshVertex; 2]>,
}

/// Objekt-Fabrik und Setter der Host-Szene.
///
/// Alle Aufrufe sind synchron; ein unbekannter Handle wird vom Host ignoriert.
pub trait SceneHost {
    fn spawn(&mut self, kind: SceneObjectKind, position: Vector2) -> ObjectHandle;
    fn destroy(&mut self, handle: ObjectHandle);
    fn set_position(&mut self, handle: ObjectHandle, position: Vector2);
    fn set_size(&mut self, handle: ObjectHandle, size: Vector2);
    fn set_angle(&mut self, handle: ObjectHandle, degrees: f32);
    fn set_visible(&mut self, handle: ObjectHandle, visible: bool);
    fn set_image_offset_y(&mut self, handle: ObjectHandle, offset: f32);
    fn recreate_mesh(&mut self, handle: ObjectHandle, columns: usize, rows: usize);
    fn set_mesh_vertex(&mut self, handle: ObjectHandle, column: usize, row: usize, vertex: MeshVertex);
}

/// Überträgt ein Streifen-Mesh auf ein Host-Objekt (Box, Gitter, Vertices).
pub fn upload_strip_mesh<H: SceneHost + ?Sized>(host: &mut H, handle: ObjectHandle, mesh: &StripMesh) {
    host.recreate_mesh(handle, 2, mesh.rows.len());
    host.set_position(handle, mesh.center);
    host.set_size(handle, mesh.size);
    for (row, [left, right]) in mesh.rows.iter().enumerate() {
        host.set_mesh_vertex(handle, 0, row, *left);
        host.set_mesh_vertex(handle, 1, row, *right);
    }
}

/// Vertex-Gitter eines Mesh-Objekts (spaltenweise innerhalb einer Zeile)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshGrid {
    pub columns: usize,
    pub rows: usize,
    pub vertices: Vec<MeshVertex>,
}

impl MeshGrid {
    fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            vertices: vec![MeshVertex::default(); columns * rows],
        }
    }

    /// Vertex an (Spalte, Zeile)
    pub fn vertex(&self, column: usize, row: usize) -> Option<&MeshVertex> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.vertices.get(row * self.columns + column)
    }
}

/// Zustand eines Objekts in der [`MemoryScene`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneObject {
    pub kind: SceneObjectKind,
    pub position: Vector2,
    pub size: Vector2,
    pub angle_degrees: f32,
    pub visible: bool,
    pub image_offset_y: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh: Option<MeshGrid>,
}

/// Szene ohne Engine: hält alle Objekte im Speicher (Tests, CLI-Export).
#[derive(Debug, Clone, Default, Serialize)]
pub struct MemoryScene {
    objects: BTreeMap<ObjectHandle, SceneObject>,
    #[serde(skip)]
    next_handle: u64,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Objekt zu einem Handle
    pub fn object(&self, handle: ObjectHandle) -> Option<&SceneObject> {
        self.objects.get(&handle)
    }

    /// Alle lebenden Objekte in Erzeugungsreihenfolge
    pub fn objects(&self) -> impl Iterator<Item = (ObjectHandle, &SceneObject)> + '_ {
        self.objects.iter().map(|(&handle, object)| (handle, object))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Anzahl lebender Objekte einer Art
    pub fn count_of(&self, kind: SceneObjectKind) -> usize {
        self.objects.values().filter(|o| o.kind == kind).count()
    }

    fn object_mut(&mut self, handle: ObjectHandle) -> Option<&mut SceneObject> {
        let object = self.objects.get_mut(&handle);
        if object.is_none() {
            log::warn!("Unbekanntes Szenen-Objekt {:?}", handle);
        }
        object
    }
}

impl SceneHost for MemoryScene {
    fn spawn(&mut self, kind: SceneObjectKind, position: Vector2) -> ObjectHandle {
        let handle = ObjectHandle(self.next_handle);
        self.next_handle += 1;
        self.objects.insert(
            handle,
            SceneObject {
                kind,
                position,
                size: Vec2::ZERO,
                angle_degrees: 0.0,
                visible: true,
                image_offset_y: 0.0,
                mesh: None,
            },
        );
        handle
    }

    fn destroy(&mut self, handle: ObjectHandle) {
        if self.objects.remove(&handle).is_none() {
            log::warn!("Zerstören eines unbekannten Szenen-Objekts {:?}", handle);
        }
    }

    fn set_position(&mut self, handle: ObjectHandle, position: Vector2) {
        if let Some(object) = self.object_mut(handle) {
            object.position = position;
        }
    }

    fn set_size(&mut self, handle: ObjectHandle, size: Vector2) {
        if let Some(object) = self.object_mut(handle) {
            object.size = size;
        }
    }

    fn set_angle(&mut self, handle: ObjectHandle, degrees: f32) {
        if let Some(object) = self.object_mut(handle) {
            object.angle_degrees = degrees;
        }
    }

    fn set_visible(&mut self, handle: ObjectHandle, visible: bool) {
        if let Some(object) = self.object_mut(handle) {
            object.visible = visible;
        }
    }

    fn set_image_offset_y(&mut self, handle: ObjectHandle, offset: f32) {
        if let Some(object) = self.object_mut(handle) {
            object.image_offset_y = offset;
        }
    }

    fn recreate_mesh(&mut self, handle: ObjectHandle, columns: usize, rows: usize) {
        if let Some(object) = self.object_mut(handle) {
            object.mesh = Some(MeshGrid::new(columns, rows));
        }
    }

    fn set_mesh_vertex(&mut self, handle: ObjectHandle, column: usize, row: usize, vertex: MeshVertex) {
        let Some(object) = self.object_mut(handle) else {
            return;
        };
        let Some(grid) = object.mesh.as_mut() else {
            log::warn!("Vertex gesetzt ohne Mesh auf {:?}", handle);
            return;
        };
        if column >= grid.columns || row >= grid.rows {
            log::warn!(
                "Vertex ({}, {}) ausserhalb des {}x{}-Gitters",
                column,
                row,
                grid.columns,
                grid.rows
            );
            return;
        }
        let index = row * grid.columns + column;
        grid.vertices[index] = vertex;
    }
}
