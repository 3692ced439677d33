//! Start- und Ziellinie als gebogene Meshes sowie die vier Startblöcke.
//!
//! Alle Funktionen setzen eine LUT auf der Kurve voraus (`draw_mesh` baut sie).
//! Distanzen vor dem Segmentanfang werden auf den Anfang geklemmt.

use super::scene::{MeshVertex, Placement, StripMesh};
use crate::core::{BezierCurve, BoundingBox, TrackResult, Vector2Ext};
use crate::shared::EditorOptions;
use glam::Vec2;

/// Welche Linie gebaut wird; bestimmt die Zeilenanzahl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapKind {
    /// `floor(gepufferte Höhe / Zeilenabstand)` Zeilen
    Start,
    /// `ceil(Bildhöhe / Zeilenabstand)` Zeilen
    Finish,
}

/// Klemmt `dst` auf `[0, arc]`.
pub(crate) fn clamp_distance(curve: &BezierCurve, dst: f32) -> f32 {
    dst.max(0.0).min(curve.arc())
}

/// Baut das Cap-Mesh am Ende von `curve`.
///
/// Zeile `i` liegt `i · cap_row_step` vor dem Kurvenende; die Box ist um die
/// Mitte des Bildes zentriert und um `cap_buffer` vergrößert.
pub fn build_cap(
    curve: &BezierCurve,
    image_size: Vec2,
    kind: CapKind,
    options: &EditorOptions,
) -> TrackResult<StripMesh> {
    let row_step = options.cap_row_step;
    let buffered = image_size + Vec2::splat(options.cap_buffer);
    let steps = match kind {
        CapKind::Start => (buffered.y / row_step).floor() as usize,
        CapKind::Finish => (image_size.y / row_step).ceil() as usize,
    };

    let length = curve.arc();
    let center = curve.point_by_distance(clamp_distance(curve, length - image_size.y / 2.0))?;
    let bbox = BoundingBox::from_center_size(center, buffered);

    let mut rows = vec![[MeshVertex::default(); 2]; steps + 1];
    for i in 0..=steps {
        let travelled = i as f32 * row_step;
        let d = curve.point_distance(clamp_distance(curve, length - travelled))?;
        let (left, right) = curve.mesh_points(d, image_size.x);
        let v = 1.0 - travelled / image_size.y;
        rows[steps - i] = [
            MeshVertex::new(bbox.normalized_coords(left), 0.0, v),
            MeshVertex::new(bbox.normalized_coords(right), 1.0, v),
        ];
    }

    Ok(StripMesh {
        center,
        size: buffered,
        rows,
    })
}

/// Vier Startblöcke: paarweise links/rechts, Paare im Abstand `bracket_spacing`.
pub fn start_brackets(
    curve: &BezierCurve,
    image_size: Vec2,
    options: &EditorOptions,
) -> TrackResult<[Placement; 4]> {
    let length = curve.arc();
    let mut placements = [Placement::default(); 4];
    for (i, placement) in placements.iter_mut().enumerate() {
        let row = (i / 2) as f32;
        let dst = length - image_size.y / 2.0 - options.bracket_spacing * row;
        let d = curve.point_distance(clamp_distance(curve, dst))?;
        let side = if i % 2 == 0 { -1.0 } else { 1.0 };
        *placement = Placement {
            position: curve.point_offset(d, options.bracket_offset * side),
            angle_degrees: -curve.tangent(d).angle_signed(Vec2::X),
        };
    }
    Ok(placements)
}
