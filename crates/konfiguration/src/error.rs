//! Fehlertypen fuer den Konfigurations-Cache

use schalter_core::SchalterError;
use thiserror::Error;

/// Fehler an den Nahtstellen des Konfigurations-Caches
///
/// Die Lookups (`hat`, `hat_ressource`) sind total und erzeugen keine Fehler.
#[derive(Debug, Error)]
pub enum KonfigurationsFehler {
    // --- Live-Query ---
    #[error("Live-Query geschlossen")]
    AbfrageGeschlossen,

    #[error("Unbekannte Entitaetsklasse: {0}")]
    UnbekannteKlasse(String),

    // --- Dienst ---
    #[error("Dienst laeuft bereits")]
    BereitsGestartet,
}

/// Result-Alias fuer den Konfigurations-Cache
pub type Result<T> = std::result::Result<T, KonfigurationsFehler>;

impl From<KonfigurationsFehler> for SchalterError {
    fn from(e: KonfigurationsFehler) -> Self {
        match e {
            KonfigurationsFehler::AbfrageGeschlossen => {
                SchalterError::KanalGeschlossen("live-query".into())
            }
            KonfigurationsFehler::UnbekannteKlasse(k) => SchalterError::UnbekannteKlasse(k),
            KonfigurationsFehler::BereitsGestartet => {
                SchalterError::Konfiguration("Dienst laeuft bereits".into())
            }
        }
    }
}
