//! Zentrale Konfiguration für den Race-Track-Editor.
//!
//! `EditorOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use glam::Vec2;
use serde::{Deserialize, Serialize};

// ── Fahrbahn ────────────────────────────────────────────────────────

/// Fahrbahnbreite in Pixeln (Breite des Straßen-Meshes).
pub const ROAD_WIDTH: f32 = 256.0;
/// Höhe einer Textur-Kachel in Pixeln (Periode der Texturphase).
pub const TEXTURE_TILE_HEIGHT: f32 = 256.0;

// ── Tessellierung ───────────────────────────────────────────────────

/// Bogenlänge pro Mesh-Zeile vor der Krümmungsanpassung.
pub const TESSELLATION_LENGTH: f32 = 25.0;
/// Ab dieser maximalen Krümmung wird die Zeilenanzahl erhöht.
pub const CURVATURE_THRESHOLD: f32 = 1e-3;
/// Skalierung der Krümmung vor dem Logarithmus (`ln(k · scale) / 2`).
pub const CURVATURE_BOOST_SCALE: f32 = 10_000.0;
/// Stützstellen für grobe Länge, Picking und Standard-LUT.
pub const LUT_SAMPLES: usize = 20;
/// Standard-Auflösungsfaktor für `draw_mesh`.
pub const MESH_RESOLUTION: f32 = 1.0;

// ── Start/Ziel ──────────────────────────────────────────────────────

/// Bildgröße der Startlinie in Pixeln.
pub const START_CAP_IMAGE: [f32; 2] = [256.0, 128.0];
/// Bildgröße der Ziellinie in Pixeln.
pub const FINISH_CAP_IMAGE: [f32; 2] = [256.0, 128.0];
/// Rand um das Cap-Bild (Pixel), damit gebogene Caps in ihre Box passen.
pub const CAP_BUFFER: f32 = 64.0;
/// Abstand der Cap-Mesh-Zeilen entlang der Kurve (Pixel).
pub const CAP_ROW_STEP: f32 = 32.0;
/// Längsabstand zwischen den Startblock-Paaren.
pub const BRACKET_SPACING: f32 = 256.0;
/// Seitlicher Versatz der Startblöcke von der Mittellinie.
pub const BRACKET_OFFSET: f32 = 96.0;
/// Parkposition für ausgeblendete Objekte.
pub const HIDDEN_POSITION: [f32; 2] = [-10_000.0, -10_000.0];

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Alle zur Laufzeit änderbaren Editor-Optionen.
/// Wird als `race_track_editor.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EditorOptions {
    // ── Fahrbahn ────────────────────────────────────────────────
    /// Fahrbahnbreite in Pixeln
    pub road_width: f32,
    /// Höhe einer Textur-Kachel in Pixeln
    pub texture_tile_height: f32,

    // ── Tessellierung ───────────────────────────────────────────
    /// Bogenlänge pro Mesh-Zeile (vor Krümmungsanpassung)
    pub tessellation_length: f32,
    /// Krümmungs-Schwelle für feinere Tessellierung
    pub curvature_threshold: f32,
    /// Skalierung der Krümmung im Logarithmus
    pub curvature_boost_scale: f32,
    /// Stützstellen für grobe Länge und Picking
    pub lut_samples: usize,
    /// Auflösungsfaktor für die Mesh-Erzeugung
    #[serde(default = "default_mesh_resolution")]
    pub mesh_resolution: f32,

    // ── Start/Ziel ──────────────────────────────────────────────
    /// Bildgröße der Startlinie
    pub start_cap_image: [f32; 2],
    /// Bildgröße der Ziellinie
    pub finish_cap_image: [f32; 2],
    /// Rand um Cap-Bilder
    pub cap_buffer: f32,
    /// Zeilenabstand der Cap-Meshes
    pub cap_row_step: f32,
    /// Längsabstand der Startblock-Paare
    pub bracket_spacing: f32,
    /// Seitlicher Versatz der Startblöcke
    pub bracket_offset: f32,
    /// Parkposition ausgeblendeter Objekte
    #[serde(default = "default_hidden_position")]
    pub hidden_position: [f32; 2],
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            road_width: ROAD_WIDTH,
            texture_tile_height: TEXTURE_TILE_HEIGHT,

            tessellation_length: TESSELLATION_LENGTH,
            curvature_threshold: CURVATURE_THRESHOLD,
            curvature_boost_scale: CURVATURE_BOOST_SCALE,
            lut_samples: LUT_SAMPLES,
            mesh_resolution: MESH_RESOLUTION,

            start_cap_image: START_CAP_IMAGE,
            finish_cap_image: FINISH_CAP_IMAGE,
            cap_buffer: CAP_BUFFER,
            cap_row_step: CAP_ROW_STEP,
            bracket_spacing: BRACKET_SPACING,
            bracket_offset: BRACKET_OFFSET,
            hidden_position: HIDDEN_POSITION,
        }
    }
}

/// Serde-Default für `mesh_resolution` (ältere TOML-Dateien ohne das Feld).
fn default_mesh_resolution() -> f32 {
    MESH_RESOLUTION
}

fn default_hidden_position() -> [f32; 2] {
    HIDDEN_POSITION
}

impl EditorOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("race-track-editor"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("race_track_editor.toml")
    }

    /// Startlinien-Bildgröße als Vektor
    pub fn start_cap_size(&self) -> Vec2 {
        Vec2::from(self.start_cap_image)
    }

    /// Ziellinien-Bildgröße als Vektor
    pub fn finish_cap_size(&self) -> Vec2 {
        Vec2::from(self.finish_cap_image)
    }

    /// Parkposition als Vektor
    pub fn hidden_point(&self) -> Vec2 {
        Vec2::from(self.hidden_position)
    }
}
