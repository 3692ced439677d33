//! Die Strecke: geordnete Anker in einer Arena plus daraus abgeleitete Segmente.
//!
//! Anker werden unter einer stabilen [`AnchorId`] gespeichert, `order` legt die
//! Reihenfolge fest. Jedes Segment ist eine reine Funktion seiner beiden
//! Endpunkt-IDs und wird nach einer Änderung neu erzeugt, nie geflickt.
//! Unveränderte Segmente (inklusive LUT) bleiben dabei dieselbe Instanz.

use super::anchor_point::{curve_from_anchors, AnchorPoint, HandleSide};
use super::bezier_curve::BezierCurve;
use super::error::{TrackError, TrackResult};
use super::vector::{Vector2, Vector2Ext, POINT_EPSILON};
use std::collections::HashMap;

/// Stabile ID eines Ankers; bleibt über Einfügen und Entfernen hinweg gültig.
pub type AnchorId = u64;

/// Segment zwischen zwei Ankern der Arena
#[derive(Debug, Clone, PartialEq)]
struct TrackSegment {
    start: AnchorId,
    end: AnchorId,
    curve: BezierCurve,
}

/// Herkunft eines Segments beim Neuaufbau
enum SegmentSource {
    Keep(usize),
    Build(BezierCurve),
}

/// Offene oder geschlossene Strecke aus kubischen Bézier-Segmenten.
///
/// Offen: `num_segments == num_points - 1`, der erste Anker hat keinen linken,
/// der letzte keinen rechten Handle. Geschlossen: `num_segments == num_points`,
/// das letzte Segment verbindet den letzten mit dem ersten Anker.
#[derive(Debug, Clone, Default)]
pub struct BezierTrack {
    anchors: HashMap<AnchorId, AnchorPoint>,
    order: Vec<AnchorId>,
    segments: Vec<TrackSegment>,
    looped: bool,
    next_id: AnchorId,
}

impl BezierTrack {
    /// Erstellt eine leere, offene Strecke.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Lesezugriff ─────────────────────────────────────────────────

    pub fn is_looped(&self) -> bool {
        self.looped
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn num_points(&self) -> usize {
        self.order.len()
    }

    /// Index des letzten Ankers (0 bei leerer Strecke)
    pub fn points_end(&self) -> usize {
        self.order.len().saturating_sub(1)
    }

    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    /// Index des letzten Segments (0 bei leerer Strecke)
    pub fn segments_end(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }

    /// Anker an Position `index`
    pub fn point(&self, index: usize) -> Option<&AnchorPoint> {
        self.order.get(index).and_then(|id| self.anchors.get(id))
    }

    /// Alle Anker in Streckenreihenfolge
    pub fn points(&self) -> impl Iterator<Item = &AnchorPoint> + '_ {
        self.order.iter().filter_map(|id| self.anchors.get(id))
    }

    /// Stabile ID des Ankers an Position `index`
    pub fn anchor_id(&self, index: usize) -> Option<AnchorId> {
        self.order.get(index).copied()
    }

    /// Aktuelle Position eines Ankers anhand seiner ID
    pub fn index_of(&self, id: AnchorId) -> Option<usize> {
        self.order.iter().position(|&candidate| candidate == id)
    }

    pub fn anchor_by_id(&self, id: AnchorId) -> Option<&AnchorPoint> {
        self.anchors.get(&id)
    }

    /// Segment an Position `index`
    pub fn segment(&self, index: usize) -> Option<&BezierCurve> {
        self.segments.get(index).map(|segment| &segment.curve)
    }

    /// Veränderlicher Zugriff auf ein Segment (nur Längen-Cache/LUT,
    /// Kontrollpunkte sind nach der Konstruktion unveränderlich).
    pub fn segment_mut(&mut self, index: usize) -> Option<&mut BezierCurve> {
        self.segments.get_mut(index).map(|segment| &mut segment.curve)
    }

    /// Anker-IDs (Start, Ende) eines Segments
    pub fn segment_anchor_ids(&self, index: usize) -> Option<(AnchorId, AnchorId)> {
        self.segments
            .get(index)
            .map(|segment| (segment.start, segment.end))
    }

    /// Alle Segmente in Streckenreihenfolge
    pub fn segments(&self) -> impl Iterator<Item = &BezierCurve> + '_ {
        self.segments.iter().map(|segment| &segment.curve)
    }

    /// Segment und Parameter des Kurvenpunkts, der `position` am nächsten liegt.
    ///
    /// Jede Kurve wird an `samples + 1` gleichverteilten Parametern abgetastet.
    pub fn closest_segment(&self, position: Vector2, samples: usize) -> Option<(usize, f32)> {
        self.segments
            .iter()
            .enumerate()
            .map(|(index, segment)| {
                let d = segment.curve.closest_parameter(position, samples);
                let dist = segment.curve.point(d).distance_squared(position);
                (index, d, dist)
            })
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(index, d, _)| (index, d))
    }

    // ── Aufbau ──────────────────────────────────────────────────────

    /// Entfernt alle Anker und Segmente; vergebene IDs werden nicht wiederverwendet.
    pub fn clear(&mut self) {
        self.anchors.clear();
        self.order.clear();
        self.segments.clear();
        self.looped = false;
    }

    /// Hängt ein Segment an das offene Ende an.
    ///
    /// Der erste Aufruf legt beide Endanker an. Danach muss `curve.p0()` mit
    /// dem letzten Anker übereinstimmen; dessen rechter Handle wird `curve.c0()`.
    pub fn push_segment(&mut self, curve: BezierCurve) -> TrackResult<()> {
        let Some(&last_id) = self.order.last() else {
            let start = self.allocate(AnchorPoint::new(curve.p0(), None, Some(curve.c0())));
            let end = self.allocate(AnchorPoint::new(curve.p1(), Some(curve.c1()), None));
            self.order.extend([start, end]);
            self.segments.push(TrackSegment { start, end, curve });
            return Ok(());
        };

        let last_index = self.points_end();
        let last = self.point_mut(last_index)?;
        if !last.anchor().equals_eps(curve.p0(), POINT_EPSILON) {
            return Err(TrackError::SegmentNotConnected {
                x: curve.p0().x,
                y: curve.p0().y,
            });
        }
        last.add_right_control(curve.c0())?;

        let end = self.allocate(AnchorPoint::new(curve.p1(), Some(curve.c1()), None));
        self.order.push(end);
        self.segments.push(TrackSegment {
            start: last_id,
            end,
            curve,
        });
        Ok(())
    }

    /// Baut die Strecke aus einem flachen Punkt-Array neu auf.
    ///
    /// Layout pro Anker: `[links?, anker, rechts?]`. Offen fehlen der linke
    /// Handle des ersten und der rechte des letzten Ankers (`len % 3 == 1`),
    /// geschlossen ist jedes Tripel vollständig (`len % 3 == 0`).
    pub fn load_from_array(&mut self, points: &[Vector2], looped: bool) -> TrackResult<()> {
        let (layout, valid) = if looped {
            ("geschlossenes", points.len() % 3 == 0 && points.len() >= 6)
        } else {
            ("offenes", points.len() % 3 == 1 && points.len() >= 4)
        };
        if !valid {
            return Err(TrackError::MalformedPointArray {
                len: points.len(),
                layout,
            });
        }

        let anchors: Vec<AnchorPoint> = if looped {
            points
                .chunks_exact(3)
                .map(|triple| AnchorPoint::new(triple[1], Some(triple[0]), Some(triple[2])))
                .collect()
        } else {
            let count = (points.len() + 2) / 3;
            (0..count)
                .map(|k| {
                    let at = k * 3;
                    let left = (k > 0).then(|| points[at - 1]);
                    let right = (k + 1 < count).then(|| points[at + 1]);
                    AnchorPoint::new(points[at], left, right)
                })
                .collect()
        };

        self.clear();
        self.looped = looped;
        for anchor in anchors {
            let id = self.allocate(anchor);
            self.order.push(id);
        }
        self.resync_segments(&[])
    }

    /// Serialisiert die Strecke in das flache Layout von [`Self::load_from_array`].
    pub fn save_as_array(&self) -> Vec<Vector2> {
        let mut out = Vec::with_capacity(self.order.len() * 3);
        for point in self.points() {
            out.extend(point.control1());
            out.push(point.anchor());
            out.extend(point.control2());
        }
        out
    }

    // ── Topologie ───────────────────────────────────────────────────

    /// Fügt `anchor` direkt hinter Position `after` ein.
    ///
    /// Der neue Anker braucht einen linken Handle und, sofern er nicht das neue
    /// offene Ende wird, auch einen rechten. Am offenen Ende bekommt der
    /// bisherige letzte Anker einen rechten Handle als Spiegelung seines linken.
    pub fn insert_anchor(&mut self, after: usize, anchor: AnchorPoint) -> TrackResult<AnchorId> {
        let previous = self.point_checked(after)?;
        if !anchor.has_left_control() {
            return Err(TrackError::CurveHandleMissing {
                side: HandleSide::Left,
                role: "End",
            });
        }

        let at_open_end = after == self.points_end() && !self.looped;
        if at_open_end {
            if anchor.has_right_control() {
                return Err(TrackError::HandleAlreadyPresent(HandleSide::Right));
            }
            if !previous.has_right_control() {
                let left = previous
                    .control1()
                    .ok_or(TrackError::HandleMissing(HandleSide::Left))?;
                let reflected = left.reflect_through(previous.anchor());
                self.point_mut(after)?.add_right_control(reflected)?;
            }
        } else if !anchor.has_right_control() {
            return Err(TrackError::CurveHandleMissing {
                side: HandleSide::Right,
                role: "Start",
            });
        }

        let id = self.allocate(anchor);
        self.order.insert(after + 1, id);
        self.resync_segments(&[])?;
        Ok(id)
    }

    /// Teilt das Segment hinter `after` an `position` (bzw. verlängert das offene Ende).
    ///
    /// Hat der vorherige Anker einen rechten Handle `c`, liegen die neuen
    /// Handles bei `position ± (c - position) / 2`. Sonst (offenes Ende) wird
    /// sein linker Handle gespiegelt und der neue linke Handle liegt mittig
    /// zwischen `position` und dieser Spiegelung.
    pub fn insert_segment_at(&mut self, after: usize, position: Vector2) -> TrackResult<AnchorId> {
        let before = self.point_checked(after)?;
        let anchor = if let Some(right) = before.control2() {
            let half = (right - position) / 2.0;
            AnchorPoint::new(position, Some(position + half), Some(position - half))
        } else if let Some(left) = before.control1() {
            let reflected = left.reflect_through(before.anchor());
            AnchorPoint::new(position, Some((position + reflected) / 2.0), None)
        } else {
            return Err(TrackError::HandleMissing(HandleSide::Left));
        };
        self.insert_anchor(after, anchor)
    }

    /// Entfernt den Anker an `index` und gibt ihn zurück.
    ///
    /// Offen verliert der neue erste Anker seinen linken bzw. der neue letzte
    /// seinen rechten Handle. Geschlossen verbindet das Wraparound-Segment
    /// danach wieder den letzten mit dem ersten Anker.
    pub fn remove_anchor(&mut self, index: usize) -> TrackResult<AnchorPoint> {
        let len = self.order.len();
        self.point_checked(index)?;
        if len <= 2 {
            return Err(TrackError::TooFewAnchors {
                required: 2,
                actual: len - 1,
            });
        }

        let id = self.order[index];
        let removed = self
            .anchors
            .remove(&id)
            .ok_or(TrackError::AnchorOutOfRange { index, len })?;
        self.order.remove(index);

        if !self.looped {
            if index == 0 {
                self.point_mut(0)?.remove_left_control()?;
            } else if index == len - 1 {
                let end = self.points_end();
                self.point_mut(end)?.remove_right_control()?;
            }
        }
        self.resync_segments(&[])?;
        Ok(removed)
    }

    /// Hängt einen Anker an: offen ans Ende, geschlossen vor den Wraparound.
    ///
    /// Der neue Anker braucht einen linken Handle. Auf einer geschlossenen
    /// Strecke wird ein fehlender rechter Handle durch Spiegelung ergänzt.
    pub fn add_anchor(&mut self, mut anchor: AnchorPoint) -> TrackResult<AnchorId> {
        if self.looped && !anchor.has_right_control() {
            let left = anchor.control1().ok_or(TrackError::CurveHandleMissing {
                side: HandleSide::Left,
                role: "End",
            })?;
            anchor.add_right_control(left.reflect_through(anchor.anchor()))?;
        }
        self.insert_anchor(self.points_end(), anchor)
    }

    /// Hängt einen Anker an `position` an; Handles werden abgeleitet.
    pub fn add_anchor_at(&mut self, position: Vector2) -> TrackResult<AnchorId> {
        self.insert_segment_at(self.points_end(), position)
    }

    /// Zentraler Einstieg nach jeder Positionsänderung an Anker `index`.
    ///
    /// Verschiebt zuerst den Anker (Handles wandern mit), dann die Handles
    /// (mit Spiegelung) und erzeugt danach alle angrenzenden Segmente neu.
    /// Schlägt ein Schritt fehl, bleibt die Strecke unverändert.
    pub fn anchor_changed(
        &mut self,
        index: usize,
        anchor: Option<Vector2>,
        control1: Option<Vector2>,
        control2: Option<Vector2>,
    ) -> TrackResult<()> {
        let mut updated = self.point_checked(index)?.clone();
        if let Some(position) = anchor {
            updated.move_anchor(position);
        }
        if control1.is_some() || control2.is_some() {
            updated.move_control(control1, control2)?;
        }

        let id = self.order[index];
        self.anchors.insert(id, updated);
        self.resync_segments(&[id])
    }

    /// Schließt oder öffnet die Strecke.
    ///
    /// Schließen spiegelt an beiden offenen Enden den vorhandenen Handle durch
    /// den Anker und ergänzt das Wraparound-Segment. Öffnen verwirft beide
    /// Handles wieder samt Wraparound. Der aktuelle Wert ist ein No-op mit Warnung.
    pub fn set_loop(&mut self, value: bool) -> TrackResult<()> {
        if value == self.looped {
            log::warn!(
                "Strecke ist bereits {}",
                if value { "geschlossen" } else { "offen" }
            );
            return Ok(());
        }

        let len = self.order.len();
        if len < 2 {
            return Err(TrackError::TooFewAnchors {
                required: 2,
                actual: len,
            });
        }

        let mut first = self.point_checked(0)?.clone();
        let mut last = self.point_checked(len - 1)?.clone();
        if value {
            let first_right = first
                .control2()
                .ok_or(TrackError::HandleMissing(HandleSide::Right))?;
            let last_left = last
                .control1()
                .ok_or(TrackError::HandleMissing(HandleSide::Left))?;
            first.add_left_control(first_right.reflect_through(first.anchor()))?;
            last.add_right_control(last_left.reflect_through(last.anchor()))?;
        } else {
            first.remove_left_control()?;
            last.remove_right_control()?;
        }

        self.anchors.insert(self.order[0], first);
        self.anchors.insert(self.order[len - 1], last);
        self.looped = value;
        self.resync_segments(&[])
    }

    // ── Intern ──────────────────────────────────────────────────────

    fn allocate(&mut self, point: AnchorPoint) -> AnchorId {
        let id = self.next_id;
        self.next_id += 1;
        self.anchors.insert(id, point);
        id
    }

    fn point_checked(&self, index: usize) -> TrackResult<&AnchorPoint> {
        self.point(index).ok_or(TrackError::AnchorOutOfRange {
            index,
            len: self.order.len(),
        })
    }

    fn point_mut(&mut self, index: usize) -> TrackResult<&mut AnchorPoint> {
        let len = self.order.len();
        self.order
            .get(index)
            .and_then(|id| self.anchors.get_mut(id))
            .ok_or(TrackError::AnchorOutOfRange { index, len })
    }

    /// Gleicht die Segmentliste mit der Anker-Reihenfolge ab.
    ///
    /// Segmente mit unverändertem ID-Paar, deren Anker nicht in `dirty` stehen,
    /// werden übernommen; alle anderen werden aus ihren Ankern neu erzeugt.
    /// Die Liste wird erst ersetzt, wenn alle neuen Kurven gültig sind.
    fn resync_segments(&mut self, dirty: &[AnchorId]) -> TrackResult<()> {
        let len = self.order.len();
        let count = match len {
            0 | 1 => 0,
            n if self.looped => n,
            n => n - 1,
        };

        let existing: HashMap<(AnchorId, AnchorId), usize> = self
            .segments
            .iter()
            .enumerate()
            .map(|(i, segment)| ((segment.start, segment.end), i))
            .collect();

        let mut plan = Vec::with_capacity(count);
        for i in 0..count {
            let next = (i + 1) % len;
            let (start, end) = (self.order[i], self.order[next]);
            let clean = !dirty.contains(&start) && !dirty.contains(&end);
            let source = match existing.get(&(start, end)) {
                Some(&old) if clean => SegmentSource::Keep(old),
                _ => SegmentSource::Build(curve_from_anchors(
                    self.point_checked(i)?,
                    self.point_checked(next)?,
                )?),
            };
            plan.push((start, end, source));
        }

        let mut old: Vec<Option<TrackSegment>> = std::mem::take(&mut self.segments)
            .into_iter()
            .map(Some)
            .collect();
        self.segments = plan
            .into_iter()
            .filter_map(|(start, end, source)| match source {
                SegmentSource::Keep(index) => old[index].take(),
                SegmentSource::Build(curve) => Some(TrackSegment { start, end, curve }),
            })
            .collect();
        Ok(())
    }
}
