//! Race Track Editor (CLI).
//!
//! Lädt eine Track-Datei, erzeugt alle Straßen-Meshes in einer In-Memory-Szene
//! und schreibt die Szene als JSON.
//!
//! Aufruf: `race-track-editor <track.json> [--options <datei.toml>] [--out <szene.json>]`

use anyhow::{bail, Context, Result};
use race_track_editor::{load_track_file, CurveEditor, EditorOptions, MemoryScene, SceneObjectKind};
use std::path::PathBuf;

/// Kommandozeilen-Argumente
#[derive(Debug, Default)]
struct CliArgs {
    track: PathBuf,
    options: Option<PathBuf>,
    out: Option<PathBuf>,
}

impl CliArgs {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut track = None;
        let mut options = None;
        let mut out = None;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--options" => {
                    let value = args.next().context("--options erwartet einen Pfad")?;
                    options = Some(PathBuf::from(value));
                }
                "--out" => {
                    let value = args.next().context("--out erwartet einen Pfad")?;
                    out = Some(PathBuf::from(value));
                }
                flag if flag.starts_with("--") => bail!("Unbekannte Option: {}", flag),
                path if track.is_none() => track = Some(PathBuf::from(path)),
                extra => bail!("Überzähliges Argument: {}", extra),
            }
        }
        let track = track.context(
            "Aufruf: race-track-editor <track.json> [--options <datei.toml>] [--out <szene.json>]",
        )?;
        Ok(Self {
            track,
            options,
            out,
        })
    }
}

fn main() -> Result<()> {
    // Logger initialisieren
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!(
        "Race Track Editor v{} startet...",
        env!("CARGO_PKG_VERSION")
    );

    let args = CliArgs::parse(std::env::args().skip(1))?;
    let options_path = args.options.unwrap_or_else(EditorOptions::config_path);
    let options = EditorOptions::load_from_file(&options_path);

    let points = load_track_file(&args.track)?;
    let mut editor = CurveEditor::new(MemoryScene::new(), options);
    editor
        .load_from_points(&points)
        .with_context(|| format!("Strecke nicht aufbaubar: {}", args.track.display()))?;

    let track = editor.track();
    let length: f32 = track.segments().map(|curve| curve.arc()).sum();
    let scene = editor.host();
    log::info!(
        "{} Segmente, Länge {:.1} px, {} Szenen-Objekte ({} Meshes)",
        track.num_segments(),
        length,
        scene.len(),
        scene.count_of(SceneObjectKind::RoadMesh)
    );

    let scene = editor.into_host();
    let json = serde_json::to_string_pretty(&scene).context("Szene nicht serialisierbar")?;
    match args.out {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Szene nicht schreibbar: {}", path.display()))?;
            log::info!("Szene gespeichert nach: {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
