//! Prozedurale Hindernisse und Boni für den Endlos-Modus.
//!
//! Ein Segment ist in zehn gleich lange Slots unterteilt. [`generate_road`]
//! würfelt pro Slot eine Gruppe (oder nichts), [`place_decorations`] setzt die
//! Objekte einer Planung entlang der Kurve ab.

use super::caps::clamp_distance;
use super::scene::Placement;
use crate::core::{BezierCurve, TrackError, TrackResult, Vector2Ext};
use glam::Vec2;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

/// Slots pro Segment
pub const SLOTS_PER_SEGMENT: usize = 10;
/// Abstand der Objekte zum Fahrbahnrand (Pixel, beide Seiten zusammen)
pub const ROAD_EDGE_MARGIN: f32 = 20.0;

const OBSTACLE_SPAN: f32 = 200.0;
const BONUS_SPAN: f32 = 300.0;

/// Objektfamilie (bestimmt den Objekttyp in der Host-Szene)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecorationFamily {
    Obstacle,
    Bonus,
}

/// Ein Objekt einer Gruppe mit seinen Zufallsbereichen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectTemplate {
    pub family: DecorationFamily,
    pub animation: &'static str,
    /// Seitlicher Bereich als Anteil der nutzbaren Fahrbahnbreite
    pub x_range: (f32, f32),
    /// Gesamtspanne des Längsversatzes (Pixel)
    pub y_span: f32,
}

/// Gewichtete Gruppe von Objekten, die gemeinsam in einem Slot landen
#[derive(Debug, PartialEq)]
pub struct DecorationGroup {
    pub objects: &'static [ObjectTemplate],
    /// Leere/Bonus-Slots, die nach diesem Hindernis folgen
    pub spacing: u32,
    log_base: f32,
    weight_offset: f32,
}

impl DecorationGroup {
    /// Gewicht bei zurückgelegter Distanz: `log_b(distance) · 100 + offset`
    pub fn weight(&self, distance: f32) -> f32 {
        distance.log2() / self.log_base.log2() * 100.0 + self.weight_offset
    }
}

const fn object(
    family: DecorationFamily,
    animation: &'static str,
    x_range: (f32, f32),
    y_span: f32,
) -> ObjectTemplate {
    ObjectTemplate {
        family,
        animation,
        x_range,
        y_span,
    }
}

const fn spikes(animation: &'static str) -> [ObjectTemplate; 1] {
    [object(DecorationFamily::Obstacle, animation, (-0.5, 0.5), OBSTACLE_SPAN)]
}

const fn single(animation: &'static str) -> [ObjectTemplate; 1] {
    [object(DecorationFamily::Bonus, animation, (-0.5, 0.5), BONUS_SPAN)]
}

const fn pair(animation: &'static str) -> [ObjectTemplate; 2] {
    [
        object(DecorationFamily::Bonus, animation, (-0.5, 0.0), BONUS_SPAN),
        object(DecorationFamily::Bonus, animation, (0.0, 0.5), BONUS_SPAN),
    ]
}

const fn triple(animation: &'static str) -> [ObjectTemplate; 3] {
    [
        object(DecorationFamily::Bonus, animation, (-0.5, -0.166), BONUS_SPAN),
        object(DecorationFamily::Bonus, animation, (-0.166, 0.166), BONUS_SPAN),
        object(DecorationFamily::Bonus, animation, (0.166, 0.5), BONUS_SPAN),
    ]
}

const fn group(
    objects: &'static [ObjectTemplate],
    spacing: u32,
    log_base: f32,
    weight_offset: f32,
) -> DecorationGroup {
    DecorationGroup {
        objects,
        spacing,
        log_base,
        weight_offset,
    }
}

const SPIKES_1: [ObjectTemplate; 1] = spikes("Spikes");
const SPIKES_2: [ObjectTemplate; 1] = spikes("Spikes2");
const SPIKES_3: [ObjectTemplate; 1] = spikes("Spikes3");
const SPIKES_4: [ObjectTemplate; 1] = spikes("Spikes4");

const COIN_1: [ObjectTemplate; 1] = single("Coin");
const COIN_2: [ObjectTemplate; 2] = pair("Coin");
const COIN_3: [ObjectTemplate; 3] = triple("Coin");
const NITRO_1: [ObjectTemplate; 1] = single("Nitro");
const NITRO_2: [ObjectTemplate; 2] = pair("Nitro");
const NITRO_3: [ObjectTemplate; 3] = triple("Nitro");
const ROCKET_1: [ObjectTemplate; 1] = single("Rocket");
const ROCKET_2: [ObjectTemplate; 2] = pair("Rocket");
const ROCKET_3: [ObjectTemplate; 3] = triple("Rocket");

/// Hindernisse: mehr Stacheln bedeuten mehr Abstand danach.
pub static OBSTACLE_GROUPS: [DecorationGroup; 4] = [
    group(&SPIKES_1, 1, 2.0, 4000.0),
    group(&SPIKES_2, 2, 1.5, 3500.0),
    group(&SPIKES_3, 3, 1.25, 2300.0),
    group(&SPIKES_4, 4, 1.125, 0.0),
];

/// Boni: je Sorte einzeln, als Paar oder als Dreierreihe.
pub static BONUS_GROUPS: [DecorationGroup; 9] = [
    group(&COIN_1, 0, 2.0, 4000.0),
    group(&COIN_2, 0, 1.5, 3500.0),
    group(&COIN_3, 0, 1.25, 2300.0),
    group(&NITRO_1, 0, 2.0, 4000.0),
    group(&NITRO_2, 0, 1.5, 3500.0),
    group(&NITRO_3, 0, 1.25, 2300.0),
    group(&ROCKET_1, 0, 2.0, 4000.0),
    group(&ROCKET_2, 0, 1.5, 3500.0),
    group(&ROCKET_3, 0, 1.25, 2300.0),
];

/// Inhalt eines Slots; `None` ist ein leerer Slot.
pub type DecorationSlot = Option<&'static DecorationGroup>;

/// Ergebnis von [`generate_road`]
#[derive(Debug, Clone, PartialEq)]
pub struct RoadPlan {
    pub slots: Vec<DecorationSlot>,
    /// Restabstand, der ins nächste Segment übernommen wird
    pub spacing: u32,
}

/// Platziertes Objekt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecorationPlacement {
    pub family: DecorationFamily,
    pub animation: &'static str,
    pub placement: Placement,
}

/// Gewichtete Zufallsauswahl; negative Gewichte zählen als 0.
///
/// Die Gruppen werden vorher gemischt, damit gleich schwere Gruppen keine
/// feste Reihenfolge haben. Sind alle Gewichte 0, gibt es kein Ergebnis.
pub fn weighted_pick<R: Rng + ?Sized>(
    rng: &mut R,
    distance: f32,
    groups: &'static [DecorationGroup],
) -> DecorationSlot {
    let roll: f32 = rng.random();
    let mut shuffled: Vec<&'static DecorationGroup> = groups.iter().collect();
    shuffled.shuffle(rng);

    let mut total = 0.0;
    let cumulative: Vec<f32> = shuffled
        .iter()
        .map(|g| {
            total += g.weight(distance).max(0.0);
            total
        })
        .collect();
    if total <= 0.0 {
        return None;
    }

    shuffled
        .into_iter()
        .zip(cumulative)
        .find(|&(_, sum)| sum / total > roll)
        .map(|(g, _)| g)
}

/// Würfelt die zehn Slots eines Segments.
///
/// Solange Restabstand besteht, ist ein Slot zur Hälfte Bonus, sonst leer.
/// Ohne Restabstand: leer (< 0.166), Bonus (> 0.833) oder ein Hindernis,
/// dessen `spacing` zum neuen Restabstand wird.
pub fn generate_road<R: Rng + ?Sized>(rng: &mut R, distance: f32, leftover_spacing: u32) -> RoadPlan {
    let mut spacing = leftover_spacing;
    let mut slots = Vec::with_capacity(SLOTS_PER_SEGMENT);
    for _ in 0..SLOTS_PER_SEGMENT {
        let roll: f32 = rng.random();
        if spacing > 0 {
            slots.push(if roll < 0.5 {
                weighted_pick(rng, distance, &BONUS_GROUPS)
            } else {
                None
            });
            spacing -= 1;
        } else if roll < 0.166 {
            slots.push(None);
        } else if roll > 0.833 {
            slots.push(weighted_pick(rng, distance, &BONUS_GROUPS));
        } else {
            let obstacle = weighted_pick(rng, distance, &OBSTACLE_GROUPS);
            if let Some(group) = obstacle {
                spacing = group.spacing;
            }
            slots.push(obstacle);
        }
    }
    RoadPlan { slots, spacing }
}

/// Setzt die Objekte einer Planung entlang `curve` ab (LUT nötig).
///
/// Slot `i` ist um die Bogenlänge bei `d = i · 0.1 + 0.05` zentriert. Jedes
/// Objekt wird zufällig längs (auf die Kurve geklemmt) und seitlich um
/// `x · (road_width - ROAD_EDGE_MARGIN)` verschoben und quer zur Fahrtrichtung gedreht.
pub fn place_decorations<R: Rng + ?Sized>(
    rng: &mut R,
    curve: &BezierCurve,
    slots: &[DecorationSlot],
    road_width: f32,
) -> TrackResult<Vec<DecorationPlacement>> {
    if slots.len() != SLOTS_PER_SEGMENT {
        return Err(TrackError::DecorationSlotCount {
            expected: SLOTS_PER_SEGMENT,
            actual: slots.len(),
        });
    }

    let usable_width = road_width - ROAD_EDGE_MARGIN;
    let mut placements = Vec::new();
    for (i, slot) in slots.iter().enumerate() {
        let Some(group) = slot else {
            continue;
        };
        let base = curve.distance_of_point(i as f32 * 0.1 + 0.05)?;
        for template in group.objects {
            let y_shift = rng.random_range(-0.5..0.5) * template.y_span;
            let (x_from, x_to) = template.x_range;
            let x_shift = rng.random_range(x_from..x_to) * usable_width;

            let d = curve.point_distance(clamp_distance(curve, base + y_shift))?;
            placements.push(DecorationPlacement {
                family: template.family,
                animation: template.animation,
                placement: Placement {
                    position: curve.point_offset(d, x_shift),
                    angle_degrees: -curve.tangent(d).angle_signed(Vec2::X) + 90.0,
                },
            });
        }
    }
    Ok(placements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn straight_with_lut() -> BezierCurve {
        let mut curve = BezierCurve::new(
            Vec2::ZERO,
            Vec2::new(0.0, 400.0),
            Vec2::new(0.0, 800.0),
            Vec2::new(0.0, 1200.0),
        );
        curve.create_lut(60);
        curve
    }

    #[test]
    fn test_gewichte() {
        assert_eq!(OBSTACLE_GROUPS[0].weight(1.0), 4000.0);
        assert!((OBSTACLE_GROUPS[0].weight(8.0) - 4300.0).abs() < 1e-2);
        // Negative Gewichte bei kleiner Distanz
        assert!(OBSTACLE_GROUPS[3].weight(0.5) < 0.0);
    }

    #[test]
    fn test_weighted_pick_ohne_gewicht_liefert_nichts() {
        static ZERO: [DecorationGroup; 1] = [group(&SPIKES_1, 1, 2.0, 0.0)];
        let mut rng = StdRng::seed_from_u64(7);
        // log2(1) · 100 + 0 = 0
        assert!(weighted_pick(&mut rng, 1.0, &ZERO).is_none());
    }

    #[test]
    fn test_weighted_pick_nur_positive_gruppe() {
        let mut rng = StdRng::seed_from_u64(11);
        // Bei Distanz 1 ist Spikes4 (Gewicht 0) nie dabei
        for _ in 0..200 {
            let picked = weighted_pick(&mut rng, 1.0, &OBSTACLE_GROUPS).unwrap();
            assert_ne!(picked.spacing, 4);
        }
    }

    #[test]
    fn test_generate_road_zehn_slots_und_abstand() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let plan = generate_road(&mut rng, 5000.0, 0);
            assert_eq!(plan.slots.len(), SLOTS_PER_SEGMENT);
            assert!(plan.spacing <= 4);
        }
    }

    #[test]
    fn test_nach_hindernis_folgt_kein_hindernis_im_abstand() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let plan = generate_road(&mut rng, 5000.0, 0);
            let mut cooldown = 0;
            for slot in &plan.slots {
                let is_obstacle = slot
                    .map(|g| g.objects[0].family == DecorationFamily::Obstacle)
                    .unwrap_or(false);
                if cooldown > 0 {
                    assert!(!is_obstacle);
                    cooldown -= 1;
                } else if let Some(g) = slot.filter(|_| is_obstacle) {
                    cooldown = g.spacing;
                }
            }
        }
    }

    #[test]
    fn test_restabstand_erzwingt_keine_hindernisse() {
        let mut rng = StdRng::seed_from_u64(9);
        let plan = generate_road(&mut rng, 5000.0, 10);
        assert_eq!(plan.spacing, 0);
        assert!(plan
            .slots
            .iter()
            .flatten()
            .all(|g| g.objects[0].family == DecorationFamily::Bonus));
    }

    #[test]
    fn test_place_decorations_falsche_slotzahl() {
        let mut rng = StdRng::seed_from_u64(1);
        let curve = straight_with_lut();
        assert_eq!(
            place_decorations(&mut rng, &curve, &[None; 3], 256.0),
            Err(TrackError::DecorationSlotCount {
                expected: 10,
                actual: 3
            })
        );
    }

    #[test]
    fn test_place_decorations_auf_der_fahrbahn() {
        let mut rng = StdRng::seed_from_u64(5);
        let curve = straight_with_lut();
        let mut slots: Vec<DecorationSlot> = vec![None; SLOTS_PER_SEGMENT];
        slots[0] = Some(&BONUS_GROUPS[2]);
        slots[9] = Some(&OBSTACLE_GROUPS[0]);

        let placed = place_decorations(&mut rng, &curve, &slots, 256.0).unwrap();
        assert_eq!(placed.len(), 4);
        for item in &placed {
            assert!(item.placement.position.x.abs() <= (256.0 - 20.0) / 2.0 + 1e-3);
            assert!(item.placement.position.y >= -1e-3);
            assert!(item.placement.position.y <= 1200.0 + 1e-3);
            // Tangente +y → 90° gegen x-Achse, negiert plus 90
            assert!((item.placement.angle_degrees - 0.0).abs() < 1e-3);
        }
        assert_eq!(placed[3].family, DecorationFamily::Obstacle);
        assert_eq!(placed[3].animation, "Spikes");
    }
}
