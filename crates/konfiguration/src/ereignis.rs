//! Ereignisse des Konfigurationsdienstes
//!
//! Unterscheidet die erste Lieferung (`Geladen`) von jeder spaeteren
//! (`Geaendert`). Ob auf `Geaendert` neu gestartet wird, entscheidet
//! der Empfaenger, nicht die Datenschicht.

use std::sync::Arc;

use crate::manager::ConfigurationManager;

/// Ereignisse die der Konfigurationsdienst ausstrahlt
#[derive(Debug, Clone)]
pub enum KonfigurationsEreignis {
    /// Erste Lieferung – vorheriger Snapshot war leer
    Geladen {
        konfiguration: Arc<ConfigurationManager>,
    },
    /// Lieferung nach bereits befuelltem Snapshot – erfordert Neustart
    Geaendert {
        vorher: Arc<ConfigurationManager>,
        nachher: Arc<ConfigurationManager>,
    },
}

impl KonfigurationsEreignis {
    /// Gibt den Ereignis-Namen zurueck (fuer Logging)
    pub fn name(&self) -> &'static str {
        match self {
            Self::Geladen { .. } => "konfiguration_geladen",
            Self::Geaendert { .. } => "konfiguration_geaendert",
        }
    }

    /// Snapshot nach dem Ereignis
    pub fn konfiguration(&self) -> &Arc<ConfigurationManager> {
        match self {
            Self::Geladen { konfiguration } => konfiguration,
            Self::Geaendert { nachher, .. } => nachher,
        }
    }

    pub fn erfordert_neustart(&self) -> bool {
        matches!(self, Self::Geaendert { .. })
    }
}
