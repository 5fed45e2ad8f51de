//! Fehlertypen fuer Schalter
//!
//! Zentraler Fehler-Enum fuer alle Nahtstellen (Live-Query, Kanaele,
//! Konfigurationsdateien). Die Abfragefunktionen selbst sind total und
//! liefern nie einen Fehler. Untermodule koennen eigene Fehler definieren
//! und via `From` konvertieren.

use thiserror::Error;

/// Globaler Result-Alias fuer Schalter
pub type Result<T> = std::result::Result<T, SchalterError>;

/// Alle moeglichen Fehler im Schalter-System
#[derive(Debug, Error)]
pub enum SchalterError {
    // --- Live-Query ---
    #[error("Unbekannte Entitaetsklasse: {0}")]
    UnbekannteKlasse(String),

    // --- Kanaele ---
    #[error("Kanal geschlossen: {0}")]
    KanalGeschlossen(String),

    // --- Konfiguration ---
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    // --- IO ---
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),
}

impl SchalterError {
    /// Gibt true zurueck wenn die Gegenseite eines Kanals weg ist
    pub fn ist_geschlossen(&self) -> bool {
        matches!(self, Self::KanalGeschlossen(_))
    }
}
