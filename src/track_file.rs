//! JSON Import/Export der flachen Punktliste einer Strecke.
//!
//! Format: `{ "points": [[x, y], ...] }` im Layout von
//! [`BezierTrack::load_from_array`](crate::core::BezierTrack::load_from_array).
//! Ob die Strecke geschlossen ist, ergibt sich aus `len % 3 == 0`.

use crate::core::Vector2;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
struct TrackDocument {
    points: Vec<[f32; 2]>,
}

/// Prüft Endlichkeit und Tripel-Layout der Punktliste.
fn validate_points(points: &[Vector2]) -> Result<()> {
    if let Some(index) = points.iter().position(|p| !p.is_finite()) {
        bail!("Punkt {} ist nicht endlich", index);
    }
    if points.len() % 3 == 2 {
        bail!(
            "Punktanzahl {} passt weder zu einer offenen noch zu einer geschlossenen Strecke",
            points.len()
        );
    }
    Ok(())
}

/// Ob eine Punktliste eine geschlossene Strecke beschreibt
pub fn is_looped_layout(points: &[Vector2]) -> bool {
    points.len() % 3 == 0
}

/// Parsed eine Strecke aus einem JSON-String
pub fn parse_track_json(content: &str) -> Result<Vec<Vector2>> {
    let document: TrackDocument =
        serde_json::from_str(content).context("Track-JSON ist ungültig")?;
    let points: Vec<Vector2> = document.points.into_iter().map(Vector2::from).collect();
    validate_points(&points)?;
    Ok(points)
}

/// Schreibt eine Punktliste als JSON-String
pub fn write_track_json(points: &[Vector2]) -> Result<String> {
    validate_points(points)?;
    let document = TrackDocument {
        points: points.iter().map(|p| p.to_array()).collect(),
    };
    serde_json::to_string_pretty(&document).context("Track-JSON konnte nicht erzeugt werden")
}

/// Lädt eine Track-Datei
pub fn load_track_file(path: &Path) -> Result<Vec<Vector2>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Track-Datei nicht lesbar: {}", path.display()))?;
    let points = parse_track_json(&content)
        .with_context(|| format!("Track-Datei fehlerhaft: {}", path.display()))?;
    log::info!(
        "Track geladen aus {}: {} Punkte ({})",
        path.display(),
        points.len(),
        if is_looped_layout(&points) {
            "geschlossen"
        } else {
            "offen"
        }
    );
    Ok(points)
}

/// Speichert eine Track-Datei
pub fn save_track_file(path: &Path, points: &[Vector2]) -> Result<()> {
    let content = write_track_json(points)?;
    std::fs::write(path, content)
        .with_context(|| format!("Track-Datei nicht schreibbar: {}", path.display()))?;
    log::info!("Track gespeichert nach: {}", path.display());
    Ok(())
}
