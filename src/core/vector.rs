//! 2D-Vektor-Hilfsfunktionen auf Basis von `glam::Vec2`.
//!
//! `Vector2` ist ein reiner Werttyp: jede Operation liefert eine neue Instanz.
//! Winkel werden in Grad angegeben.

use glam::Vec2;

/// 2D-Vektor des Streckenmodells.
pub type Vector2 = Vec2;

/// Standard-Toleranz für Punktvergleiche (Welteinheiten).
pub const POINT_EPSILON: f32 = 1e-4;

/// Ergänzende Vektor-Operationen, die `glam` nicht direkt anbietet.
pub trait Vector2Ext: Sized {
    /// Kreuzprodukt (z-Komponente) `self.x * other.y - other.x * self.y`.
    fn cross(self, other: Self) -> f32;

    /// Einheitsvektor; Nullvektor bleibt Nullvektor.
    fn normalized(self) -> Self;

    /// Vektor gleicher Richtung mit neuer Länge.
    fn with_length(self, length: f32) -> Self;

    /// Rotation um `radians` gegen den Uhrzeigersinn.
    fn rotate_radians(self, radians: f32) -> Self;

    /// Rotation um `degrees` gegen den Uhrzeigersinn.
    fn rotate_degrees(self, degrees: f32) -> Self;

    /// Ungerichteter Winkel zwischen `self` und `other` in Grad (0..=180).
    fn angle_unsigned(self, other: Self) -> f32;

    /// Vorzeichenbehafteter Winkel in Grad (-180..=180).
    ///
    /// Vorzeichen = `sign(cross(other, self))`, bei kollinearen Vektoren 0.
    fn angle_signed(self, other: Self) -> f32;

    /// Winkel in Grad im Bereich 0..360.
    fn angle_360(self, other: Self) -> f32;

    /// Gleichheit mit Toleranz pro Komponente.
    fn equals_eps(self, other: Self, epsilon: f32) -> bool;

    /// Spiegelt `self` am Punkt `center` (`center * 2 - self`).
    fn reflect_through(self, center: Self) -> Self;
}

impl Vector2Ext for Vec2 {
    fn cross(self, other: Self) -> f32 {
        self.x * other.y - other.x * self.y
    }

    fn normalized(self) -> Self {
        self.normalize_or_zero()
    }

    fn with_length(self, length: f32) -> Self {
        self * (length / self.length())
    }

    fn rotate_radians(self, radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Vec2::new(self.x * cos - self.y * sin, self.y * cos + self.x * sin)
    }

    fn rotate_degrees(self, degrees: f32) -> Self {
        self.rotate_radians(degrees.to_radians())
    }

    fn angle_unsigned(self, other: Self) -> f32 {
        unit_dot(self, other).acos().to_degrees()
    }

    fn angle_signed(self, other: Self) -> f32 {
        let deg = unit_dot(self, other).acos().to_degrees();
        deg * sign(other.normalized().cross(self.normalized()))
    }

    fn angle_360(self, other: Self) -> f32 {
        let deg = unit_dot(self, other).acos().to_degrees();
        if other.normalized().cross(self.normalized()) > 0.0 {
            deg
        } else {
            360.0 - deg
        }
    }

    fn equals_eps(self, other: Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }

    fn reflect_through(self, center: Self) -> Self {
        center * 2.0 - self
    }
}

/// Skalarprodukt der Einheitsvektoren, auf [-1, 1] begrenzt (acos-sicher).
fn unit_dot(a: Vec2, b: Vec2) -> f32 {
    a.normalized().dot(b.normalized()).clamp(-1.0, 1.0)
}

/// Vorzeichen mit `sign(0) == 0` (im Gegensatz zu `f32::signum`).
fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}
