//! schalter-core – Gemeinsame Typen und Fehlertypen
//!
//! Dieses Crate stellt die Bausteine bereit, die von allen anderen
//! Schalter-Crates gemeinsam genutzt werden: Identifikationstypen,
//! den Plugin-Konfigurationsdatensatz und den globalen Fehler-Enum.

pub mod error;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{Result, SchalterError};
pub use types::{KonfigurationId, PluginId, PluginKonfiguration, RessourceId};
