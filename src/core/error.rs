//! Fehlertypen des Streckenmodells.
//!
//! Jede Variante beschreibt eine verletzte Vorbedingung. Es gibt keine stille
//! Korrektur: der Aufrufer (Editor-Orchestrierung) bekommt den Fehler direkt.

use super::anchor_point::HandleSide;
use thiserror::Error;

/// Verletzte Invarianten von Kurve, Anker und Strecke.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackError {
    /// Distanz-Abfrage ohne vorher erzeugte Lookup-Tabelle
    #[error("LUT fehlt: create_lut() vor {operation}() aufrufen")]
    MissingLut {
        /// Name der Abfrage
        operation: &'static str,
    },

    /// Distanz liegt ausserhalb von [0, arc]
    #[error("Distanz {distance} liegt ausserhalb der Bogenlänge [0, {arc}]")]
    DistanceOutOfRange {
        /// Angefragte Distanz
        distance: f32,
        /// Bogenlänge der Kurve
        arc: f32,
    },

    /// Kurvenparameter liegt ausserhalb von [0, 1]
    #[error("Kurvenparameter {0} liegt ausserhalb von [0, 1]")]
    ParameterOutOfRange(f32),

    /// Kurve kann nicht erzeugt werden, weil ein Anker-Handle fehlt
    #[error("Kurve nicht erzeugbar: {side} Kontrollpunkt am {role}-Anker fehlt")]
    CurveHandleMissing {
        /// Fehlende Seite
        side: HandleSide,
        /// "Start" oder "End"
        role: &'static str,
    },

    /// Handle existiert bereits (add_* ist kein Verschieben)
    #[error("{0} Kontrollpunkt existiert bereits; zum Verschieben move_control() verwenden")]
    HandleAlreadyPresent(HandleSide),

    /// Handle existiert nicht
    #[error("{0} Kontrollpunkt existiert nicht")]
    HandleMissing(HandleSide),

    /// move_control() ohne neue Position
    #[error("Keine neue Kontrollpunkt-Position angegeben")]
    NoControlPosition,

    /// Neues Segment beginnt nicht am letzten Anker
    #[error("Segment beginnt bei ({x}, {y}) statt am letzten Anker")]
    SegmentNotConnected {
        /// Startpunkt des abgelehnten Segments (x)
        x: f32,
        /// Startpunkt des abgelehnten Segments (y)
        y: f32,
    },

    /// Anker-Index ausserhalb der Strecke
    #[error("Anker-Index {index} ausserhalb (Anzahl {len})")]
    AnchorOutOfRange {
        /// Angefragter Index
        index: usize,
        /// Anzahl Anker
        len: usize,
    },

    /// Segment-Index ausserhalb der Strecke
    #[error("Segment-Index {index} ausserhalb (Anzahl {len})")]
    SegmentOutOfRange {
        /// Angefragter Index
        index: usize,
        /// Anzahl Segmente
        len: usize,
    },

    /// Flaches Punkt-Array passt nicht zum Tripel-Layout
    #[error("Punkt-Array mit {len} Einträgen ist kein gültiges {layout}-Layout")]
    MalformedPointArray {
        /// Länge des Arrays
        len: usize,
        /// "offenes" oder "geschlossenes"
        layout: &'static str,
    },

    /// Operation würde weniger Anker als nötig hinterlassen
    #[error("Mindestens {required} Anker nötig, vorhanden: {actual}")]
    TooFewAnchors {
        /// Benötigte Anzahl
        required: usize,
        /// Tatsächliche Anzahl
        actual: usize,
    },

    /// Dekorations-Plan hat falsche Slot-Anzahl
    #[error("Dekorations-Plan braucht {expected} Slots, erhalten: {actual}")]
    DecorationSlotCount {
        /// Erwartete Slots pro Segment
        expected: usize,
        /// Erhaltene Slots
        actual: usize,
    },
}

/// Ergebnis-Typ des Streckenmodells.
pub type TrackResult<T> = Result<T, TrackError>;
