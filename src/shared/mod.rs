//! Geteilte Typen für layer-übergreifende Verträge.
//!
//! Enthält die Konfiguration, die sowohl `app` als auch die Binary lesen.

pub mod options;

pub use options::EditorOptions;
