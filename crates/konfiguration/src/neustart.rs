//! Neustart-Steuerung
//!
//! Konsumiert die Ereignisse des Konfigurationsdienstes und loest beim Host
//! genau einen Neustart pro `Geaendert` aus. Zur Laufzeit wird keine
//! Konfiguration inkrementell nachgezogen.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::ereignis::KonfigurationsEreignis;

/// Warum ein Neustart angefordert wurde
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeustartGrund {
    /// Anzahl Datensaetze vor der Aenderung
    pub vorher: usize,
    /// Anzahl Datensaetze nach der Aenderung
    pub nachher: usize,
}

/// Neustart-Mechanismus des Hosts
pub trait Neustart: Send + Sync {
    fn neu_laden(&self, grund: &NeustartGrund);
}

impl<F> Neustart for F
where
    F: Fn(&NeustartGrund) + Send + Sync,
{
    fn neu_laden(&self, grund: &NeustartGrund) {
        self(grund)
    }
}

/// Top-Level-Controller der ueber Neustarts entscheidet
pub struct NeustartController;

impl NeustartController {
    /// Startet den Controller-Task
    ///
    /// Endet wenn der Ereignis-Kanal geschlossen wird.
    pub fn starten(
        mut ereignisse: broadcast::Receiver<KonfigurationsEreignis>,
        neustart: Arc<dyn Neustart>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match ereignisse.recv().await {
                    Ok(ereignis) => {
                        Self::behandeln(&ereignis, neustart.as_ref());
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(verpasst = n, "Konfigurations-Ereignisse verpasst");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Verarbeitet ein einzelnes Ereignis
    ///
    /// Gibt true zurueck wenn ein Neustart ausgeloest wurde.
    pub fn behandeln(ereignis: &KonfigurationsEreignis, neustart: &dyn Neustart) -> bool {
        match ereignis {
            KonfigurationsEreignis::Geladen { konfiguration } => {
                info!(anzahl = konfiguration.anzahl(), "Erstkonfiguration – kein Neustart");
                false
            }
            KonfigurationsEreignis::Geaendert { vorher, nachher } => {
                let grund = NeustartGrund {
                    vorher: vorher.anzahl(),
                    nachher: nachher.anzahl(),
                };
                info!(vorher = grund.vorher, nachher = grund.nachher, "Neustart wird ausgeloest");
                neustart.neu_laden(&grund);
                true
            }
        }
    }
}
