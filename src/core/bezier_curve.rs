//! Ein kubisches Bézier-Segment mit Ableitungen, Krümmung und Arc-Length-LUT.
//!
//! Die vier Kontrollpunkte sind nach der Konstruktion unveränderlich. Eine
//! "geänderte" Kurve wird immer durch eine neue Instanz ersetzt; nur der
//! Längen-Cache (`arc`, LUT) ist veränderbar.

use super::error::{TrackError, TrackResult};
use super::vector::{Vector2, Vector2Ext};
use glam::Vec2;

/// Standard-Stützstellenanzahl für Länge, Krümmung und LUT.
pub const DEFAULT_SAMPLES: usize = 20;

/// Achsenparalleles Rechteck (Welt-Koordinaten).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Linke obere Ecke (kleinste Koordinaten)
    pub min: Vector2,
    /// Rechte untere Ecke (größte Koordinaten)
    pub max: Vector2,
}

impl BoundingBox {
    /// Erstellt ein Rechteck aus Mittelpunkt und Größe.
    pub fn from_center_size(center: Vector2, size: Vector2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Mittelpunkt des Rechtecks
    pub fn center(&self) -> Vector2 {
        (self.min + self.max) * 0.5
    }

    /// Breite und Höhe
    pub fn size(&self) -> Vector2 {
        self.max - self.min
    }

    /// Rechnet einen Weltpunkt in normierte Rechteck-Koordinaten um.
    ///
    /// (0, 0) ist die linke obere, (1, 1) die rechte untere Ecke.
    pub fn normalized_coords(&self, point: Vector2) -> Vector2 {
        (point - self.min) / self.size()
    }
}

/// Kumulative Bogenlängen an `n + 1` gleichverteilten Parametern.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcLengthLut {
    samples: Vec<f32>,
    step: f32,
}

impl ArcLengthLut {
    /// Kumulative Längen (`samples[0] == 0`, monoton steigend)
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Parameter-Schrittweite `1 / n`
    pub fn step(&self) -> f32 {
        self.step
    }
}

/// Kubisches Bézier-Segment `p0 → p1` mit Handles `c0` (Start) und `c1` (Ende).
#[derive(Debug, Clone, PartialEq)]
pub struct BezierCurve {
    p0: Vector2,
    c0: Vector2,
    c1: Vector2,
    p1: Vector2,
    arc: f32,
    lut: Option<ArcLengthLut>,
}

impl BezierCurve {
    /// Erstellt eine Kurve aus Start-Anker, Start-Handle, End-Handle und End-Anker.
    pub fn new(p0: Vector2, c0: Vector2, c1: Vector2, p1: Vector2) -> Self {
        Self {
            p0,
            c0,
            c1,
            p1,
            arc: 0.0,
            lut: None,
        }
    }

    /// Start-Anker
    pub fn p0(&self) -> Vector2 {
        self.p0
    }

    /// Start-Handle
    pub fn c0(&self) -> Vector2 {
        self.c0
    }

    /// End-Handle
    pub fn c1(&self) -> Vector2 {
        self.c1
    }

    /// End-Anker
    pub fn p1(&self) -> Vector2 {
        self.p1
    }

    /// Zuletzt berechnete Bogenlänge (grob oder aus der LUT).
    pub fn arc(&self) -> f32 {
        self.arc
    }

    /// Lookup-Tabelle, falls bereits erzeugt
    pub fn lut(&self) -> Option<&ArcLengthLut> {
        self.lut.as_ref()
    }

    /// Gewichtete Summe der vier Kontrollpunkte.
    fn weighted(&self, p0w: f32, c0w: f32, c1w: f32, p1w: f32) -> Vector2 {
        self.p0 * p0w + self.p1 * p1w + self.c0 * c0w + self.c1 * c1w
    }

    /// B(d) = (1-d)³·p0 + 3(1-d)²d·c0 + 3(1-d)d²·c1 + d³·p1
    pub fn point(&self, d: f32) -> Vector2 {
        let d2 = d * d;
        let d3 = d2 * d;
        self.weighted(
            -d3 + 3.0 * d2 - 3.0 * d + 1.0,
            3.0 * d3 - 6.0 * d2 + 3.0 * d,
            -3.0 * d3 + 3.0 * d2,
            d3,
        )
    }

    /// Erste Ableitung B'(d)
    pub fn velocity(&self, d: f32) -> Vector2 {
        let d2 = d * d;
        self.weighted(
            -3.0 * d2 + 6.0 * d - 3.0,
            9.0 * d2 - 12.0 * d + 3.0,
            -9.0 * d2 + 6.0 * d,
            3.0 * d2,
        )
    }

    /// Zweite Ableitung B''(d)
    pub fn acceleration(&self, d: f32) -> Vector2 {
        self.weighted(-6.0 * d + 6.0, 18.0 * d - 12.0, -18.0 * d + 6.0, 6.0 * d)
    }

    /// Dritte Ableitung (konstant)
    pub fn jerk(&self) -> Vector2 {
        self.weighted(-6.0, 18.0, -18.0, 6.0)
    }

    /// Vorzeichenbehaftete Krümmung `cross(v, a) / |v|³`.
    ///
    /// An degenerierten Stellen (|v| = 0) ist das Ergebnis NaN bzw. unendlich;
    /// der Aufrufer muss das abfangen.
    pub fn curvature(&self, d: f32) -> f32 {
        let velocity = self.velocity(d);
        let acceleration = self.acceleration(d);
        velocity.cross(acceleration) / velocity.length().powi(3)
    }

    /// Einheits-Tangente
    pub fn tangent(&self, d: f32) -> Vector2 {
        self.velocity(d).normalized()
    }

    /// Tangente um +90° gedreht
    pub fn left_normal(&self, d: f32) -> Vector2 {
        let tangent = self.tangent(d);
        Vec2::new(-tangent.y, tangent.x)
    }

    /// Tangente um -90° gedreht
    pub fn right_normal(&self, d: f32) -> Vector2 {
        let tangent = self.tangent(d);
        Vec2::new(tangent.y, -tangent.x)
    }

    /// Punkt bei `d`, entlang der rechten Normalen um `offset` verschoben.
    pub fn point_offset(&self, d: f32, offset: f32) -> Vector2 {
        self.point(d) + self.right_normal(d) * offset
    }

    /// Linker und rechter Fahrbahnrand bei `d` für eine Breite `width`.
    pub fn mesh_points(&self, d: f32, width: f32) -> (Vector2, Vector2) {
        let point = self.point(d);
        let movement = self.right_normal(d) * (width / 2.0);
        (point - movement, point + movement)
    }

    /// Grobe Länge als Polylinie über `n` Stützstellen; aktualisiert `arc`.
    pub fn arc_length(&mut self, n: usize) -> f32 {
        let step = 1.0 / n as f32;
        let mut last_point = self.p0;
        let mut result = 0.0;
        for i in 1..=n {
            let cur_point = self.point(step * i as f32);
            result += cur_point.distance(last_point);
            last_point = cur_point;
        }
        self.arc = result;
        result
    }

    /// Größter Krümmungsbetrag über `n` Stützstellen (d = 1/n .. 1).
    pub fn max_curvature(&self, n: usize) -> f32 {
        let step = 1.0 / n as f32;
        (1..=n)
            .map(|i| self.curvature(step * i as f32).abs())
            .fold(0.0, f32::max)
    }

    /// Baut die Arc-Length-LUT mit `n` Intervallen; die Länge daraus ist maßgeblich.
    ///
    /// `n` wird auf mindestens 1 Intervall begrenzt.
    pub fn create_lut(&mut self, n: usize) -> f32 {
        let n = n.max(1);
        let step = 1.0 / n as f32;
        let mut samples = Vec::with_capacity(n + 1);
        samples.push(0.0);
        let mut last_point = self.p0;
        let mut arc_len = 0.0;
        for i in 1..=n {
            let cur_point = self.point(step * i as f32);
            arc_len += cur_point.distance(last_point);
            samples.push(arc_len);
            last_point = cur_point;
        }
        self.arc = arc_len;
        self.lut = Some(ArcLengthLut { samples, step });
        arc_len
    }

    /// Parameter `d` zu einer Bogenlänge `dst` (Umkehrung über die LUT).
    ///
    /// Innerhalb eines LUT-Intervalls wird linear im Parameterraum
    /// interpoliert. Der Fehler wächst mit der Krümmung im Intervall.
    pub fn point_distance(&self, dst: f32) -> TrackResult<f32> {
        let lut = self.lut.as_ref().ok_or(TrackError::MissingLut {
            operation: "point_distance",
        })?;
        if !(0.0..=self.arc).contains(&dst) {
            return Err(TrackError::DistanceOutOfRange {
                distance: dst,
                arc: self.arc,
            });
        }

        let samples = &lut.samples;
        let below = samples.partition_point(|&len| len < dst);
        let idx = below.saturating_sub(1).min(samples.len().saturating_sub(2));
        let span = samples[idx + 1] - samples[idx];
        let shift = if span > 0.0 {
            (dst - samples[idx]) / span
        } else {
            0.0
        };
        Ok(lut.step * (idx as f32 + shift))
    }

    /// Punkt in Bogenlänge `dst` vom Start entfernt.
    pub fn point_by_distance(&self, dst: f32) -> TrackResult<Vector2> {
        Ok(self.point(self.point_distance(dst)?))
    }

    /// Bogenlänge vom Start bis zum Parameter `d` (über die LUT).
    pub fn distance_of_point(&self, d: f32) -> TrackResult<f32> {
        let lut = self.lut.as_ref().ok_or(TrackError::MissingLut {
            operation: "distance_of_point",
        })?;
        if !(0.0..=1.0).contains(&d) {
            return Err(TrackError::ParameterOutOfRange(d));
        }
        if d == 1.0 {
            return Ok(self.arc);
        }

        let scaled = d / lut.step;
        let index = (scaled.floor() as usize).min(lut.samples.len().saturating_sub(2));
        let shift = scaled - index as f32;
        let (before, after) = (lut.samples[index], lut.samples[index + 1]);
        Ok(before + (after - before) * shift)
    }

    /// Parameter der nächstgelegenen von `n + 1` Stützstellen zu `position`.
    pub fn closest_parameter(&self, position: Vector2, n: usize) -> f32 {
        let step = 1.0 / n as f32;
        let mut best = (0.0, self.p0.distance_squared(position));
        for i in 1..=n {
            let d = step * i as f32;
            let dist = self.point(d).distance_squared(position);
            if dist < best.1 {
                best = (d, dist);
            }
        }
        best.0
    }

    /// Schnelle, lose Bounding-Box über alle vier Kontrollpunkte.
    pub fn quick_bb(&self) -> BoundingBox {
        let points = [self.p0, self.c0, self.c1, self.p1];
        let min = points.iter().copied().fold(Vec2::INFINITY, Vec2::min);
        let max = points.iter().copied().fold(Vec2::NEG_INFINITY, Vec2::max);
        BoundingBox { min, max }
    }
}
