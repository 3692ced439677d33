//! Ein Gelenk der Strecke: Anker plus optionaler linker/rechter Kontrollpunkt.

use super::bezier_curve::BezierCurve;
use super::error::{TrackError, TrackResult};
use super::vector::{Vector2, Vector2Ext};
use std::fmt;

/// Seite eines Kontrollpunkts relativ zum Anker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleSide {
    /// Eingehender Handle (`control1`)
    Left,
    /// Ausgehender Handle (`control2`)
    Right,
}

impl fmt::Display for HandleSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleSide::Left => write!(f, "linker"),
            HandleSide::Right => write!(f, "rechter"),
        }
    }
}

/// Anker mit 0–2 Tangenten-Handles.
///
/// Zustände: keine Handles, nur links, nur rechts, beide. Verschieben des
/// Ankers verschiebt vorhandene Handles mit; Verschieben eines Handles
/// spiegelt die Richtung des anderen (G1-Stetigkeit), dessen Abstand bleibt.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorPoint {
    anchor: Vector2,
    control1: Option<Vector2>,
    control2: Option<Vector2>,
}

impl AnchorPoint {
    /// Erstellt einen Anker mit optionalen Handles.
    pub fn new(anchor: Vector2, control1: Option<Vector2>, control2: Option<Vector2>) -> Self {
        Self {
            anchor,
            control1,
            control2,
        }
    }

    /// Anker-Position
    pub fn anchor(&self) -> Vector2 {
        self.anchor
    }

    /// Linker (eingehender) Handle
    pub fn control1(&self) -> Option<Vector2> {
        self.control1
    }

    /// Rechter (ausgehender) Handle
    pub fn control2(&self) -> Option<Vector2> {
        self.control2
    }

    /// Handle einer Seite
    pub fn control(&self, side: HandleSide) -> Option<Vector2> {
        match side {
            HandleSide::Left => self.control1,
            HandleSide::Right => self.control2,
        }
    }

    pub fn has_left_control(&self) -> bool {
        self.control1.is_some()
    }

    pub fn has_right_control(&self) -> bool {
        self.control2.is_some()
    }

    pub fn has_both_controls(&self) -> bool {
        matches!((self.control1, self.control2), (Some(_), Some(_)))
    }

    /// Anzahl vorhandener Handles (0–2)
    pub fn control_count(&self) -> usize {
        usize::from(self.control1.is_some()) + usize::from(self.control2.is_some())
    }

    /// Verschiebt den Anker; vorhandene Handles wandern um dasselbe Delta mit.
    pub fn move_anchor(&mut self, new_position: Vector2) {
        let delta = new_position - self.anchor;
        self.anchor = new_position;
        if let Some(c1) = self.control1.as_mut() {
            *c1 += delta;
        }
        if let Some(c2) = self.control2.as_mut() {
            *c2 += delta;
        }
    }

    pub fn add_left_control(&mut self, control: Vector2) -> TrackResult<()> {
        self.add_control(HandleSide::Left, control)
    }

    pub fn add_right_control(&mut self, control: Vector2) -> TrackResult<()> {
        self.add_control(HandleSide::Right, control)
    }

    pub fn remove_left_control(&mut self) -> TrackResult<Vector2> {
        self.remove_control(HandleSide::Left)
    }

    pub fn remove_right_control(&mut self) -> TrackResult<Vector2> {
        self.remove_control(HandleSide::Right)
    }

    /// Fügt einen fehlenden Handle hinzu; ein vorhandener ist ein Fehler.
    pub fn add_control(&mut self, side: HandleSide, control: Vector2) -> TrackResult<()> {
        let slot = self.slot_mut(side);
        if slot.is_some() {
            return Err(TrackError::HandleAlreadyPresent(side));
        }
        *slot = Some(control);
        Ok(())
    }

    /// Entfernt einen vorhandenen Handle und gibt seine Position zurück.
    pub fn remove_control(&mut self, side: HandleSide) -> TrackResult<Vector2> {
        self.slot_mut(side)
            .take()
            .ok_or(TrackError::HandleMissing(side))
    }

    /// Setzt einen vorhandenen Handle ohne Spiegelung des anderen.
    ///
    /// Wird beim Laden verwendet, damit gespeicherte Positionen bitgenau erhalten bleiben.
    pub(crate) fn replace_control(&mut self, side: HandleSide, control: Vector2) -> TrackResult<()> {
        let slot = self.slot_mut(side);
        if slot.is_none() {
            return Err(TrackError::HandleMissing(side));
        }
        *slot = Some(control);
        Ok(())
    }

    /// Verschiebt einen oder beide Handles.
    ///
    /// Existiert der jeweils andere Handle, liegt er danach auf dem Strahl vom
    /// Anker entgegen dem verschobenen Handle, mit unverändertem Abstand.
    pub fn move_control(
        &mut self,
        new_left: Option<Vector2>,
        new_right: Option<Vector2>,
    ) -> TrackResult<()> {
        if new_left.is_none() && new_right.is_none() {
            return Err(TrackError::NoControlPosition);
        }
        if new_left.is_some() && self.control1.is_none() {
            return Err(TrackError::HandleMissing(HandleSide::Left));
        }
        if new_right.is_some() && self.control2.is_none() {
            return Err(TrackError::HandleMissing(HandleSide::Right));
        }

        if let Some(left) = new_left {
            self.control1 = Some(left);
            if let Some(right) = self.control2 {
                self.control2 = Some(self.mirrored(left, right));
            }
        }
        if let Some(right) = new_right {
            self.control2 = Some(right);
            if let Some(left) = self.control1 {
                self.control1 = Some(self.mirrored(right, left));
            }
        }
        Ok(())
    }

    /// Neue Position von `other`: gegenüber `moved`, Abstand von `other` bleibt.
    fn mirrored(&self, moved: Vector2, other: Vector2) -> Vector2 {
        let other_magnitude = (other - self.anchor).length();
        let other_tangent = (self.anchor - moved).normalized();
        self.anchor + other_tangent * other_magnitude
    }

    fn slot_mut(&mut self, side: HandleSide) -> &mut Option<Vector2> {
        match side {
            HandleSide::Left => &mut self.control1,
            HandleSide::Right => &mut self.control2,
        }
    }
}

/// Erzeugt das Segment zwischen zwei benachbarten Ankern.
///
/// Voraussetzung: `start` hat einen rechten, `end` einen linken Handle.
pub fn curve_from_anchors(start: &AnchorPoint, end: &AnchorPoint) -> TrackResult<BezierCurve> {
    let c0 = start.control2.ok_or(TrackError::CurveHandleMissing {
        side: HandleSide::Right,
        role: "Start",
    })?;
    let c1 = end.control1.ok_or(TrackError::CurveHandleMissing {
        side: HandleSide::Left,
        role: "End",
    })?;
    Ok(BezierCurve::new(start.anchor, c0, c1, end.anchor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use glam::Vec2;

    fn smooth_anchor() -> AnchorPoint {
        AnchorPoint::new(
            Vec2::new(100.0, 0.0),
            Some(Vec2::new(80.0, 0.0)),
            Some(Vec2::new(130.0, 0.0)),
        )
    }

    #[test]
    fn test_move_anchor_verschiebt_handles_mit() {
        let mut point = smooth_anchor();
        point.move_anchor(Vec2::new(110.0, 10.0));

        assert_eq!(point.anchor(), Vec2::new(110.0, 10.0));
        assert_eq!(point.control1(), Some(Vec2::new(90.0, 10.0)));
        assert_eq!(point.control2(), Some(Vec2::new(140.0, 10.0)));
    }

    #[test]
    fn test_move_control_spiegelt_gegenseite() {
        let mut point = smooth_anchor();
        point
            .move_control(Some(Vec2::new(100.0, -20.0)), None)
            .expect("linker Handle existiert");

        let right = point.control2().expect("rechter Handle bleibt");
        // Abstand 30 bleibt, Richtung entgegen dem linken Handle
        assert_abs_diff_eq!(right.x, 100.0, epsilon = 1e-4);
        assert_abs_diff_eq!(right.y, 30.0, epsilon = 1e-4);
    }

    #[test]
    fn test_move_control_ohne_gegenseite_spiegelt_nicht() {
        let mut point = AnchorPoint::new(Vec2::ZERO, None, Some(Vec2::new(10.0, 0.0)));
        point
            .move_control(None, Some(Vec2::new(0.0, 10.0)))
            .expect("rechter Handle existiert");
        assert_eq!(point.control1(), None);
        assert_eq!(point.control2(), Some(Vec2::new(0.0, 10.0)));
    }

    #[test]
    fn test_move_control_fehlerfaelle() {
        let mut point = AnchorPoint::new(Vec2::ZERO, None, Some(Vec2::new(10.0, 0.0)));
        assert_eq!(point.move_control(None, None), Err(TrackError::NoControlPosition));
        assert_eq!(
            point.move_control(Some(Vec2::ONE), None),
            Err(TrackError::HandleMissing(HandleSide::Left))
        );
        // Fehlerfall darf nichts verändert haben
        assert_eq!(point.control2(), Some(Vec2::new(10.0, 0.0)));
    }

    #[test]
    fn test_add_und_remove_zustandsmaschine() {
        let mut point = AnchorPoint::new(Vec2::ZERO, None, None);
        assert_eq!(point.control_count(), 0);

        point.add_left_control(Vec2::new(-5.0, 0.0)).unwrap();
        assert_eq!(
            point.add_left_control(Vec2::new(-6.0, 0.0)),
            Err(TrackError::HandleAlreadyPresent(HandleSide::Left))
        );
        point.add_right_control(Vec2::new(5.0, 0.0)).unwrap();
        assert!(point.has_both_controls());

        assert_eq!(point.remove_left_control(), Ok(Vec2::new(-5.0, 0.0)));
        assert_eq!(
            point.remove_left_control(),
            Err(TrackError::HandleMissing(HandleSide::Left))
        );
        assert!(point.has_right_control());
        assert!(!point.has_left_control());
    }

    #[test]
    fn test_curve_from_anchors_alle_kombinationen() {
        let full = |x: f32| {
            AnchorPoint::new(
                Vec2::new(x, 0.0),
                Some(Vec2::new(x - 10.0, 0.0)),
                Some(Vec2::new(x + 10.0, 0.0)),
            )
        };
        let without = |x: f32, side: HandleSide| {
            let mut point = full(x);
            point.remove_control(side).unwrap();
            point
        };

        assert!(curve_from_anchors(&full(0.0), &full(100.0)).is_ok());
        // Start ohne rechten Handle
        assert_eq!(
            curve_from_anchors(&without(0.0, HandleSide::Right), &full(100.0)),
            Err(TrackError::CurveHandleMissing {
                side: HandleSide::Right,
                role: "Start"
            })
        );
        // Ende ohne linken Handle
        assert_eq!(
            curve_from_anchors(&full(0.0), &without(100.0, HandleSide::Left)),
            Err(TrackError::CurveHandleMissing {
                side: HandleSide::Left,
                role: "End"
            })
        );
        // Beides fehlt: der Start wird zuerst geprüft
        assert!(matches!(
            curve_from_anchors(
                &without(0.0, HandleSide::Right),
                &without(100.0, HandleSide::Left)
            ),
            Err(TrackError::CurveHandleMissing {
                side: HandleSide::Right,
                ..
            })
        ));
        // Nicht benötigte Handles dürfen fehlen
        assert!(curve_from_anchors(
            &without(0.0, HandleSide::Left),
            &without(100.0, HandleSide::Right)
        )
        .is_ok());
    }
}
