//! CurveEditor: hält Anker-, Kontroll- und Mesh-Objekte der Host-Szene
//! index-synchron zur [`BezierTrack`] und erzeugt die Straßen-Geometrie neu.
//!
//! Jede öffentliche Operation führt zuerst die Streckenänderung aus und
//! gleicht danach im selben Aufruf die Host-Objekte ab. Schlägt die
//! Streckenänderung fehl, bleibt auch die Szene unverändert.

use super::caps::{build_cap, start_brackets, CapKind};
use super::decorations::{place_decorations, DecorationSlot};
use super::road_mesh::{build_road_mesh, propagate_texture_phase, TexturePhase};
use super::scene::{upload_strip_mesh, ObjectHandle, SceneHost, SceneObjectKind};
use crate::core::{
    AnchorId, AnchorPoint, BezierCurve, BezierTrack, HandleSide, TrackError, TrackResult, Vector2,
};
use crate::shared::EditorOptions;
use rand::Rng;

/// Positionen der Kontroll-Handles eines Ankers im kompakten `controls`-Array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlIndexes {
    pub left: Option<usize>,
    pub right: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct ControlSlot {
    handle: ObjectHandle,
    anchor: AnchorId,
    side: HandleSide,
}

#[derive(Debug, Clone, Copy)]
struct MeshSlot {
    handle: ObjectHandle,
    phase: TexturePhase,
}

#[derive(Debug, Clone, Copy)]
struct CapObjects {
    start: ObjectHandle,
    finish: ObjectHandle,
    brackets: [ObjectHandle; 4],
}

/// Baut die LUT, falls ein Segment noch nie gezeichnet wurde.
fn ensure_lut(curve: &mut BezierCurve, samples: usize) {
    if curve.lut().is_none() {
        curve.create_lut(samples);
    }
}

/// Editor über einer Strecke und einer Host-Szene.
///
/// `anchors[i]` gehört zu Anker `i`, `meshes[i]` zu Segment `i`. `controls`
/// enthält nur vorhandene Handles in Streckenreihenfolge (links vor rechts).
pub struct CurveEditor<H: SceneHost> {
    track: BezierTrack,
    host: H,
    options: EditorOptions,
    anchors: Vec<ObjectHandle>,
    controls: Vec<ControlSlot>,
    meshes: Vec<MeshSlot>,
    caps: Option<CapObjects>,
    anchors_visible: bool,
    controls_visible: bool,
}

impl<H: SceneHost> CurveEditor<H> {
    /// Leerer Editor; Handles sind anfangs ausgeblendet.
    pub fn new(host: H, options: EditorOptions) -> Self {
        Self {
            track: BezierTrack::new(),
            host,
            options,
            anchors: Vec::new(),
            controls: Vec::new(),
            meshes: Vec::new(),
            caps: None,
            anchors_visible: false,
            controls_visible: false,
        }
    }

    pub fn track(&self) -> &BezierTrack {
        &self.track
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// Gibt die Szene frei (z.B. für den Export).
    pub fn into_host(self) -> H {
        self.host
    }

    /// Anker-Handles in Streckenreihenfolge
    pub fn anchor_handles(&self) -> &[ObjectHandle] {
        &self.anchors
    }

    /// Kontroll-Handles in der kompakten Reihenfolge
    pub fn control_handles(&self) -> impl Iterator<Item = ObjectHandle> + '_ {
        self.controls.iter().map(|slot| slot.handle)
    }

    /// Mesh-Objekte in Segmentreihenfolge
    pub fn mesh_handles(&self) -> impl Iterator<Item = ObjectHandle> + '_ {
        self.meshes.iter().map(|slot| slot.handle)
    }

    /// Texturphase des Meshes an `index`
    pub fn mesh_phase(&self, index: usize) -> Option<TexturePhase> {
        self.meshes.get(index).map(|slot| slot.phase)
    }

    // ── Index-Abbildung ─────────────────────────────────────────────

    /// Bildet einen Ankerindex auf Positionen im `controls`-Array ab.
    ///
    /// Offen fehlt dem ersten Anker der linke Handle, daher verschiebt sich
    /// jeder Index um eins: `anchor · 2 - (geschlossen ? 0 : 1)`.
    pub fn get_control_indexes(&self, anchor_index: usize) -> ControlIndexes {
        let shift = if self.track.is_looped() { 0 } else { 1 };
        let index = anchor_index as isize * 2 - shift;
        let last = self.controls.len() as isize - 1;
        if index < 0 {
            ControlIndexes {
                left: None,
                right: Some(0),
            }
        } else if index == last {
            ControlIndexes {
                left: Some(index as usize),
                right: None,
            }
        } else {
            ControlIndexes {
                left: Some(index as usize),
                right: Some(index as usize + 1),
            }
        }
    }

    /// Anzahl der Kontroll-Handles der ersten `amount` Anker.
    pub fn leave_controls(&self, amount: usize) -> usize {
        self.track
            .points()
            .take(amount)
            .map(AnchorPoint::control_count)
            .sum()
    }

    /// Ankerindex zu einem Anker-Handle
    pub fn anchor_index_of(&self, handle: ObjectHandle) -> Option<usize> {
        self.anchors.iter().position(|&candidate| candidate == handle)
    }

    /// Ankerindex und Seite zu einem Kontroll-Handle
    pub fn control_of(&self, handle: ObjectHandle) -> Option<(usize, HandleSide)> {
        let slot = self.controls.iter().find(|slot| slot.handle == handle)?;
        let index = self.track.index_of(slot.anchor)?;
        Some((index, slot.side))
    }

    /// Segment und Parameter des nächstgelegenen Kurvenpunkts (für `insert_point`).
    pub fn pick_segment(&self, position: Vector2) -> Option<(usize, f32)> {
        self.track
            .closest_segment(position, self.options.lut_samples)
    }

    // ── Mesh-Erzeugung ──────────────────────────────────────────────

    /// Zeichnet das Mesh von Segment `index` mit der konfigurierten Auflösung.
    pub fn draw_mesh(&mut self, index: usize) -> TrackResult<()> {
        self.draw_mesh_with_resolution(index, self.options.mesh_resolution)
    }

    /// Tesselliert Segment `index` neu und überträgt das Mesh an den Host.
    ///
    /// Die Texturphase kommt vom Vorgänger-Mesh und wird an alle Folge-Meshes
    /// weitergereicht. Das erste Segment trägt die Startlinie, das letzte
    /// einer offenen Strecke die Ziellinie.
    pub fn draw_mesh_with_resolution(&mut self, index: usize, resolution: f32) -> TrackResult<()> {
        let slot = *self.meshes.get(index).ok_or(TrackError::SegmentOutOfRange {
            index,
            len: self.meshes.len(),
        })?;
        let image_offset_y = match index.checked_sub(1) {
            Some(previous) => self.meshes[previous].phase.next_offset,
            None => slot.phase.image_offset_y,
        };

        let segments = self.track.num_segments();
        let curve = self
            .track
            .segment_mut(index)
            .ok_or(TrackError::SegmentOutOfRange {
                index,
                len: segments,
            })?;
        let road = build_road_mesh(curve, image_offset_y, resolution, &self.options)?;

        self.host.set_image_offset_y(slot.handle, image_offset_y);
        upload_strip_mesh(&mut self.host, slot.handle, &road.mesh);
        self.meshes[index].phase = road.phase;

        if index + 1 != self.meshes.len() {
            self.propagate_offsets(index);
        }
        if index == 0 {
            self.place_start()?;
        }
        if index == self.track.segments_end() && !self.track.is_looped() {
            self.place_finish()?;
        }
        Ok(())
    }

    /// Reicht die Texturphase ab `max(1, from)` an alle Folge-Meshes weiter.
    pub fn propagate_offsets(&mut self, from: usize) {
        let mut phases: Vec<TexturePhase> = self.meshes.iter().map(|slot| slot.phase).collect();
        let touched =
            propagate_texture_phase(&mut phases, from, self.options.texture_tile_height);
        for i in touched {
            let slot = &mut self.meshes[i];
            slot.phase = phases[i];
            self.host.set_image_offset_y(slot.handle, slot.phase.image_offset_y);
        }
    }

    /// Verwirft alle Objekte ab Anker `from` und erzeugt sie aus der Strecke neu.
    pub fn render_from_track(&mut self, from: usize) -> TrackResult<()> {
        let anchor_cut = from.min(self.anchors.len());
        for handle in self.anchors.drain(anchor_cut..) {
            self.host.destroy(handle);
        }
        let control_cut = self.leave_controls(from).min(self.controls.len());
        for slot in self.controls.drain(control_cut..) {
            self.host.destroy(slot.handle);
        }
        let mesh_cut = from.min(self.meshes.len());
        for slot in self.meshes.drain(mesh_cut..) {
            self.host.destroy(slot.handle);
        }

        for i in from..self.track.num_points() {
            self.spawn_handles(i)?;
            if i < self.track.num_segments() {
                let handle = self.host.spawn(SceneObjectKind::RoadMesh, Vector2::ZERO);
                self.meshes.push(MeshSlot {
                    handle,
                    phase: TexturePhase::default(),
                });
                self.draw_mesh(i)?;
            }
        }
        log::debug!(
            "Strecke ab Anker {} neu aufgebaut: {} Anker, {} Meshes",
            from,
            self.anchors.len(),
            self.meshes.len()
        );
        Ok(())
    }

    fn spawn_handles(&mut self, index: usize) -> TrackResult<()> {
        let len = self.track.num_points();
        let (id, point) = self
            .track
            .anchor_id(index)
            .zip(self.track.point(index))
            .ok_or(TrackError::AnchorOutOfRange { index, len })?;

        let anchor = self.host.spawn(SceneObjectKind::Anchor, point.anchor());
        self.host.set_visible(anchor, self.anchors_visible);
        self.anchors.push(anchor);

        for side in [HandleSide::Left, HandleSide::Right] {
            if let Some(position) = point.control(side) {
                let handle = self.host.spawn(SceneObjectKind::Control, position);
                self.host.set_visible(handle, self.controls_visible);
                self.controls.push(ControlSlot {
                    handle,
                    anchor: id,
                    side,
                });
            }
        }
        Ok(())
    }

    // ── Topologie ───────────────────────────────────────────────────

    /// Hängt ein Segment an (auf leerer Strecke: erstes Segment samt Ankern).
    pub fn push_segment(&mut self, curve: BezierCurve) -> TrackResult<()> {
        let from = self.track.points_end();
        self.track.push_segment(curve)?;
        self.render_from_track(from)
    }

    /// Hängt einen neuen Anker an. Ohne linken Handle werden beide abgeleitet.
    ///
    /// Auf einer offenen Strecke darf der letzte Anker keinen rechten Handle
    /// tragen: `control2` wird dort mit `HandleAlreadyPresent(Right)` abgelehnt
    /// statt verworfen, Strecke und Szene bleiben dann unverändert.
    pub fn new_point(
        &mut self,
        position: Vector2,
        control1: Option<Vector2>,
        control2: Option<Vector2>,
    ) -> TrackResult<()> {
        let from = self.track.points_end();
        if control1.is_some() {
            self.track
                .add_anchor(AnchorPoint::new(position, control1, control2))?;
        } else {
            self.track.add_anchor_at(position)?;
        }
        self.render_from_track(from)
    }

    /// Teilt das Segment hinter Anker `after` an `position`.
    pub fn insert_point(&mut self, after: usize, position: Vector2) -> TrackResult<()> {
        self.track.insert_segment_at(after, position)?;
        self.render_from_track(after)
    }

    /// Entfernt Anker `index` samt seiner Handles und des überzähligen Meshes.
    pub fn remove_point(&mut self, index: usize) -> TrackResult<()> {
        let indexes = self.get_control_indexes(index);
        self.track.remove_anchor(index)?;

        for position in [indexes.right, indexes.left].into_iter().flatten() {
            if position < self.controls.len() {
                let slot = self.controls.remove(position);
                self.host.destroy(slot.handle);
            }
        }
        if index < self.anchors.len() {
            let handle = self.anchors.remove(index);
            self.host.destroy(handle);
        }
        if index < self.meshes.len() {
            let slot = self.meshes.remove(index);
            self.host.destroy(slot.handle);
        }

        let looped = self.track.is_looped();
        if index == self.track.num_points() {
            if looped {
                self.draw_mesh(index - 1)?;
            } else {
                // Neuer letzter Anker verliert seinen rechten Handle samt Segment
                if let Some(slot) = self.meshes.pop() {
                    self.host.destroy(slot.handle);
                }
                if let Some(slot) = self.controls.pop() {
                    self.host.destroy(slot.handle);
                }
            }
        } else if index == 0 {
            if looped {
                self.draw_mesh(self.meshes.len().saturating_sub(1))?;
            } else if !self.controls.is_empty() {
                let slot = self.controls.remove(0);
                self.host.destroy(slot.handle);
            }
        } else {
            self.draw_mesh(index - 1)?;
        }

        if !looped {
            self.place_finish()?;
        }
        self.place_start()
    }

    // ── Positionsänderungen ─────────────────────────────────────────

    /// Verschiebt Anker `index`; seine Handles wandern mit.
    pub fn move_anchor(&mut self, index: usize, position: Vector2) -> TrackResult<()> {
        self.track.anchor_changed(index, Some(position), None, None)?;
        if let Some(&handle) = self.anchors.get(index) {
            self.host.set_position(handle, position);
        }
        self.sync_controls(index);
        self.redraw_adjacent(index)
    }

    /// Verschiebt einen Kontrollpunkt; der Gegen-Handle wird gespiegelt.
    pub fn move_control(
        &mut self,
        index: usize,
        side: HandleSide,
        position: Vector2,
    ) -> TrackResult<()> {
        match side {
            HandleSide::Left => self.track.anchor_changed(index, None, Some(position), None)?,
            HandleSide::Right => self.track.anchor_changed(index, None, None, Some(position))?,
        }
        self.sync_controls(index);
        self.redraw_adjacent(index)
    }

    fn sync_controls(&mut self, index: usize) {
        let Some(point) = self.track.point(index) else {
            return;
        };
        let indexes = self.get_control_indexes(index);
        let pairs = [
            (indexes.left, point.control1()),
            (indexes.right, point.control2()),
        ];
        for (slot, position) in pairs {
            if let (Some(slot), Some(position)) = (slot.and_then(|i| self.controls.get(i)), position) {
                self.host.set_position(slot.handle, position);
            }
        }
    }

    fn redraw_adjacent(&mut self, index: usize) -> TrackResult<()> {
        let looped = self.track.is_looped();
        let last_segment = self.track.segments_end();
        if index == 0 {
            self.draw_mesh(0)?;
            if looped {
                self.draw_mesh(last_segment)?;
            }
        } else if index == self.track.points_end() {
            self.draw_mesh(last_segment)?;
            if looped {
                self.draw_mesh(last_segment - 1)?;
            }
        } else {
            self.draw_mesh(index)?;
            self.draw_mesh(index - 1)?;
        }
        Ok(())
    }

    // ── Gesamte Strecke ─────────────────────────────────────────────

    /// Schließt oder öffnet die Strecke; geschlossen gibt es keine Ziellinie.
    pub fn set_loop(&mut self, value: bool) -> TrackResult<()> {
        self.track.set_loop(value)?;
        self.render_from_track(0)?;
        if value {
            self.hide_finish();
            Ok(())
        } else {
            self.place_finish()
        }
    }

    /// Lädt ein flaches Punkt-Array; `len % 3 == 0` bedeutet geschlossen.
    pub fn load_from_points(&mut self, points: &[Vector2]) -> TrackResult<()> {
        let looped = points.len() % 3 == 0;
        self.track.load_from_array(points, looped)?;
        self.render_from_track(0)?;
        if looped {
            self.hide_finish();
        }
        log::info!(
            "{} Strecke geladen: {} Anker, {} Segmente",
            if looped { "Geschlossene" } else { "Offene" },
            self.track.num_points(),
            self.track.num_segments()
        );
        Ok(())
    }

    /// Flaches Punkt-Array der aktuellen Strecke
    pub fn export_points(&self) -> Vec<Vector2> {
        self.track.save_as_array()
    }

    /// Leere Strecke; alle Host-Objekte werden zerstört.
    pub fn clean_slate(&mut self) {
        self.track = BezierTrack::new();
        for handle in self.anchors.drain(..) {
            self.host.destroy(handle);
        }
        for slot in self.controls.drain(..) {
            self.host.destroy(slot.handle);
        }
        for slot in self.meshes.drain(..) {
            self.host.destroy(slot.handle);
        }
        if let Some(caps) = self.caps.take() {
            self.host.destroy(caps.start);
            self.host.destroy(caps.finish);
            for handle in caps.brackets {
                self.host.destroy(handle);
            }
        }
    }

    // ── Sichtbarkeit ────────────────────────────────────────────────

    pub fn show_controls(&mut self) {
        self.set_controls_visible(true);
    }

    pub fn hide_controls(&mut self) {
        self.set_controls_visible(false);
    }

    pub fn show_anchors(&mut self) {
        self.set_anchors_visible(true);
    }

    pub fn hide_anchors(&mut self) {
        self.set_anchors_visible(false);
    }

    pub fn show_full_editor(&mut self) {
        self.show_controls();
        self.show_anchors();
    }

    pub fn hide_full_editor(&mut self) {
        self.hide_controls();
        self.hide_anchors();
    }

    fn set_controls_visible(&mut self, visible: bool) {
        self.controls_visible = visible;
        for slot in &self.controls {
            self.host.set_visible(slot.handle, visible);
        }
    }

    fn set_anchors_visible(&mut self, visible: bool) {
        self.anchors_visible = visible;
        for &handle in &self.anchors {
            self.host.set_visible(handle, visible);
        }
    }

    // ── Start/Ziel ──────────────────────────────────────────────────

    fn ensure_caps(&mut self) -> CapObjects {
        if let Some(caps) = self.caps {
            return caps;
        }
        let hidden = self.options.hidden_point();
        let caps = CapObjects {
            start: self.host.spawn(SceneObjectKind::StartCap, hidden),
            finish: self.host.spawn(SceneObjectKind::FinishCap, hidden),
            brackets: [0; 4].map(|_| self.host.spawn(SceneObjectKind::StartBracket, hidden)),
        };
        self.host.set_visible(caps.finish, false);
        self.caps = Some(caps);
        caps
    }

    /// Legt die Startlinie und die Startblöcke an das Ende des ersten Segments.
    pub fn place_start(&mut self) -> TrackResult<()> {
        if self.track.num_segments() == 0 {
            return Ok(());
        }
        let caps = self.ensure_caps();
        let image = self.options.start_cap_size();
        let len = self.track.num_segments();
        let curve = self
            .track
            .segment_mut(0)
            .ok_or(TrackError::SegmentOutOfRange { index: 0, len })?;
        ensure_lut(curve, self.options.lut_samples);

        let cap = build_cap(curve, image, CapKind::Start, &self.options)?;
        let brackets = start_brackets(curve, image, &self.options)?;
        upload_strip_mesh(&mut self.host, caps.start, &cap);
        for (&handle, placement) in caps.brackets.iter().zip(brackets) {
            self.host.set_position(handle, placement.position);
            self.host.set_angle(handle, placement.angle_degrees);
        }
        Ok(())
    }

    /// Legt die Ziellinie an das Ende des letzten Segments und blendet sie ein.
    pub fn place_finish(&mut self) -> TrackResult<()> {
        if self.track.num_segments() == 0 {
            return Ok(());
        }
        let caps = self.ensure_caps();
        let image = self.options.finish_cap_size();
        let index = self.track.segments_end();
        let len = self.track.num_segments();
        let curve = self
            .track
            .segment_mut(index)
            .ok_or(TrackError::SegmentOutOfRange { index, len })?;
        ensure_lut(curve, self.options.lut_samples);

        let cap = build_cap(curve, image, CapKind::Finish, &self.options)?;
        upload_strip_mesh(&mut self.host, caps.finish, &cap);
        self.host.set_visible(caps.finish, true);
        Ok(())
    }

    /// Blendet die Ziellinie aus und parkt sie außerhalb der Strecke.
    pub fn hide_finish(&mut self) {
        let caps = self.ensure_caps();
        self.host.set_visible(caps.finish, false);
        self.host
            .set_position(caps.finish, self.options.hidden_point());
    }

    // ── Endlos-Modus ────────────────────────────────────────────────

    /// Setzt die Objekte einer Slot-Planung auf Segment `segment` in die Szene.
    pub fn spawn_decorations<R: Rng + ?Sized>(
        &mut self,
        segment: usize,
        slots: &[DecorationSlot],
        rng: &mut R,
    ) -> TrackResult<Vec<ObjectHandle>> {
        let len = self.track.num_segments();
        let curve = self
            .track
            .segment_mut(segment)
            .ok_or(TrackError::SegmentOutOfRange {
                index: segment,
                len,
            })?;
        ensure_lut(curve, self.options.lut_samples);
        let placements = place_decorations(rng, curve, slots, self.options.road_width)?;

        let handles = placements
            .into_iter()
            .map(|decoration| {
                let kind = SceneObjectKind::Decoration {
                    family: decoration.family,
                    animation: decoration.animation,
                };
                let handle = self.host.spawn(kind, decoration.placement.position);
                self.host
                    .set_angle(handle, decoration.placement.angle_degrees);
                handle
            })
            .collect();
        Ok(handles)
    }
}
