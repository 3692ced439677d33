//! Tessellierung eines Segments zu einem texturierten Straßen-Streifen.
//!
//! Reine Geometrie: die Funktionen hier kennen keinen Host, sie liefern
//! [`StripMesh`]-Daten und die Texturphase für das Folgesegment.

use super::scene::{MeshVertex, StripMesh};
use crate::core::{BezierCurve, BoundingBox, TrackResult};
use crate::shared::EditorOptions;
use glam::Vec2;

/// Texturphase eines Straßen-Meshes.
///
/// `image_offset_y` ist der vertikale Texturversatz dieses Meshes,
/// `next_offset` der Versatz, mit dem das Folgesegment beginnen muss.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TexturePhase {
    /// Höhe der Mesh-Box
    pub height: f32,
    pub image_offset_y: f32,
    pub next_offset: f32,
}

/// Ergebnis von [`build_road_mesh`]
#[derive(Debug, Clone, PartialEq)]
pub struct RoadMesh {
    pub mesh: StripMesh,
    pub phase: TexturePhase,
    /// Anzahl Tessellierungs-Schritte (Zeilen - 1)
    pub steps: usize,
    /// Bogenlänge aus der LUT
    pub length: f32,
}

/// Versatz, mit dem das nächste Mesh die Kachel fortsetzt.
pub fn next_texture_offset(height: f32, image_offset_y: f32, tile_height: f32) -> f32 {
    -((height - image_offset_y) % tile_height)
}

/// Reicht die Texturphase ab `max(1, from)` durch alle Folge-Meshes.
///
/// Gibt die Indizes zurück, deren `image_offset_y` neu gesetzt wurde.
pub fn propagate_texture_phase(
    phases: &mut [TexturePhase],
    from: usize,
    tile_height: f32,
) -> std::ops::Range<usize> {
    let start = from.max(1);
    for i in start..phases.len() {
        let offset = phases[i - 1].next_offset;
        let phase = &mut phases[i];
        phase.image_offset_y = offset;
        phase.next_offset = next_texture_offset(phase.height, offset, tile_height);
    }
    start..phases.len().max(start)
}

/// Zeilenanzahl für ein Segment der groben Länge `length`.
///
/// Grundwert `ceil(length / tessellation_length · resolution)`; liegt die
/// maximale Krümmung über der Schwelle, wird mit `ln(k · scale) / 2` skaliert.
pub fn tessellation_steps(
    curve: &BezierCurve,
    length: f32,
    resolution: f32,
    options: &EditorOptions,
) -> usize {
    let mut steps = ((length / options.tessellation_length * resolution).ceil() as usize).max(1);
    let curvature = curve.max_curvature(steps);
    if curvature > options.curvature_threshold {
        let boost = (curvature * options.curvature_boost_scale).ln() / 2.0;
        steps = (steps as f32 * boost).round() as usize;
    }
    steps.max(1)
}

/// Erzeugt den Straßen-Streifen für `curve` und baut dabei die LUT neu.
///
/// Die Box umschließt die Kontrollpunkte plus Fahrbahnbreite und ist
/// mindestens so hoch wie die grobe Länge. `v` ist die normierte Bogenlänge,
/// `u` des rechten Rands ist `road_width / box_width`.
pub fn build_road_mesh(
    curve: &mut BezierCurve,
    image_offset_y: f32,
    resolution: f32,
    options: &EditorOptions,
) -> TrackResult<RoadMesh> {
    let width = options.road_width;
    let rough_length = curve.arc_length(options.lut_samples);
    let bb = curve.quick_bb();
    let center = bb.center();
    let padded = bb.size() + Vec2::splat(width);
    let size = Vec2::new(padded.x.max(width), padded.y.max(rough_length));
    let next_offset = next_texture_offset(size.y, image_offset_y, options.texture_tile_height);
    let bbox = BoundingBox::from_center_size(center, size);

    let steps = tessellation_steps(curve, rough_length, resolution, options);
    let length = curve.create_lut(steps);

    let right_u = width / size.x;
    let mut rows = vec![[MeshVertex::default(); 2]; steps + 1];
    for i in 0..=steps {
        let d = i as f32 / steps as f32;
        let v = curve.distance_of_point(d)? / length;
        let (left, right) = curve.mesh_points(d, width);
        rows[steps - i] = [
            MeshVertex::new(bbox.normalized_coords(left), 0.0, v),
            MeshVertex::new(bbox.normalized_coords(right), right_u, v),
        ];
    }

    log::debug!(
        "Straßen-Mesh: Länge {:.1}, {} Schritte, Box {:?}",
        length,
        steps,
        size
    );

    Ok(RoadMesh {
        mesh: StripMesh { center, size, rows },
        phase: TexturePhase {
            height: size.y,
            image_offset_y,
            next_offset,
        },
        steps,
        length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn straight(length: f32) -> BezierCurve {
        BezierCurve::new(
            Vec2::ZERO,
            Vec2::new(0.0, length / 3.0),
            Vec2::new(0.0, 2.0 * length / 3.0),
            Vec2::new(0.0, length),
        )
    }

    #[test]
    fn test_texturphase_rest() {
        assert_eq!(next_texture_offset(600.0, 0.0, 256.0), -88.0);
        assert_eq!(next_texture_offset(600.0, -88.0, 256.0), -176.0);
        assert_eq!(next_texture_offset(512.0, 0.0, 256.0), -0.0);
    }

    #[test]
    fn test_propagation_ab_eins() {
        let mut phases = vec![
            TexturePhase {
                height: 600.0,
                image_offset_y: 0.0,
                next_offset: -88.0,
            },
            TexturePhase {
                height: 600.0,
                ..Default::default()
            },
            TexturePhase {
                height: 300.0,
                ..Default::default()
            },
        ];
        let touched = propagate_texture_phase(&mut phases, 0, 256.0);
        assert_eq!(touched, 1..3);
        assert_eq!(phases[1].image_offset_y, -88.0);
        assert_eq!(phases[1].next_offset, -176.0);
        assert_eq!(phases[2].image_offset_y, -176.0);
        assert_eq!(phases[2].next_offset, -(476.0 % 256.0));
    }

    #[test]
    fn test_gerade_tessellierung_ohne_kruemmung() {
        let options = EditorOptions::default();
        let curve = straight(310.0);
        assert_eq!(tessellation_steps(&curve, 310.0, 1.0, &options), 13);
        assert_eq!(tessellation_steps(&curve, 310.0, 2.0, &options), 25);
        assert_eq!(tessellation_steps(&curve, 0.0, 1.0, &options), 1);
    }

    #[test]
    fn test_kurve_wird_feiner_tesselliert() {
        let options = EditorOptions::default();
        let bend = BezierCurve::new(
            Vec2::ZERO,
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 100.0),
        );
        let mut probe = bend.clone();
        let length = probe.arc_length(options.lut_samples);
        let base = ((length / 25.0).ceil() as usize).max(1);
        assert!(tessellation_steps(&bend, length, 1.0, &options) > base);
    }

    #[test]
    fn test_road_mesh_gerade() {
        let options = EditorOptions::default();
        let mut curve = straight(310.0);
        let road = build_road_mesh(&mut curve, 0.0, 1.0, &options).unwrap();

        assert_eq!(road.steps, 13);
        assert_eq!(road.mesh.rows.len(), 14);
        assert!(curve.lut().is_some());
        // Box: Breite 0 + 256, Höhe max(310 + 256, 310)
        assert_eq!(road.mesh.size, Vec2::new(256.0, 566.0));
        assert_eq!(road.mesh.center, Vec2::new(0.0, 155.0));
        assert_eq!(road.phase.next_offset, -54.0);

        // Zeile 0 = Kurvenende (v = 1), letzte Zeile = Start (v = 0)
        let [end_left, end_right] = road.mesh.rows[0];
        let [start_left, start_right] = road.mesh.rows[13];
        assert_abs_diff_eq!(end_left.v, 1.0, epsilon = 1e-6);
        assert_eq!(start_left.v, 0.0);
        assert_eq!(start_left.u, 0.0);
        assert_eq!(end_right.u, 1.0);
        // Fahrbahn füllt die Box horizontal komplett aus
        assert_abs_diff_eq!(start_left.x.min(start_right.x), 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(start_left.x.max(start_right.x), 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(start_left.y, 128.0 / 566.0, epsilon = 1e-5);
    }
}
