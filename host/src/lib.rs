//! schalter-host – Bibliotheks-Root
//!
//! Baut die Anwendung aus Plugin-Quelle, Konfigurationsdienst und
//! Neustart-Controller zusammen. Ein "Neustart" beendet einen Durchlauf;
//! `main` baut die Anwendung dann vollstaendig neu auf.

pub mod config;
pub mod logging;
pub mod quelle;

use std::future::Future;
use std::sync::Arc;

use config::HostConfig;
use schalter_core::{Result, SchalterError};
use schalter_konfiguration::{
    DienstKonfiguration, KonfigurationsDienst, NeustartController, NeustartGrund, PraefixRegistry,
    SpeicherAbfrage,
};
use tokio::sync::mpsc;

use crate::quelle::DateiQuelle;

/// Wie ein Durchlauf der Anwendung geendet hat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ausgang {
    /// Konfiguration hat sich geaendert – Anwendung neu aufbauen
    Neustart(NeustartGrund),
    /// Shutdown-Signal empfangen
    Beendet,
}

/// Haelt die Host-Konfiguration zusammen
pub struct Host {
    pub config: HostConfig,
}

impl Host {
    /// Erstellt einen neuen Host aus der gegebenen Konfiguration
    pub fn neu(config: HostConfig) -> Self {
        Self { config }
    }

    /// Ein Durchlauf bis Neustart oder Ctrl-C
    pub async fn starten(&self) -> Result<Ausgang> {
        self.laufen(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(fehler = %e, "Ctrl-C-Handler konnte nicht registriert werden");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Ein Durchlauf bis Neustart oder bis `stopp` fertig ist
    ///
    /// Reihenfolge:
    /// 1. Plugin-Datei lesen und Live-Query fuellen
    /// 2. Konfigurationsdienst mit der Live-Query verbinden
    /// 3. Neustart-Controller starten
    /// 4. Auf Neustart, Stopp oder das Ende der Update-Schleife warten
    pub async fn laufen<F>(&self, stopp: F) -> Result<Ausgang>
    where
        F: Future<Output = ()>,
    {
        let abfrage = SpeicherAbfrage::neu();
        let quelle_task = DateiQuelle::neu(&self.config.quelle.datei, self.config.quelle.intervall())
            .starten(abfrage.clone())
            .await?;

        let dienst = KonfigurationsDienst::neu(
            DienstKonfiguration {
                kanal_groesse: self.config.konfiguration.kanal_groesse,
            },
            Arc::new(PraefixRegistry),
        );

        let (neustart_tx, mut neustart_rx) = mpsc::channel::<NeustartGrund>(1);
        let controller_task = NeustartController::starten(
            dienst.ereignisse(),
            Arc::new(move |grund: &NeustartGrund| {
                let _ = neustart_tx.try_send(grund.clone());
            }),
        );

        // Stellvertretend fuer UI-Bindungen: jeden Stand protokollieren
        let _abo = dienst.abonnieren(|m| {
            let aktiv: Vec<_> = m.aktivierte().iter().map(|p| p.to_string()).collect();
            let inaktiv: Vec<_> = m.deaktivierte().iter().map(|p| p.to_string()).collect();
            tracing::info!(aktiv = ?aktiv, inaktiv = ?inaktiv, "Plugin-Stand");
        });

        let mut dienst_task = dienst.verbinden(&abfrage)?;
        tracing::info!("Host laeuft. Warte auf Konfigurationsaenderung oder Shutdown-Signal (Ctrl-C)...");

        let ausgang = tokio::select! {
            Some(grund) = neustart_rx.recv() => Ok(Ausgang::Neustart(grund)),
            _ = stopp => Ok(Ausgang::Beendet),
            ergebnis = &mut dienst_task => match ergebnis {
                Ok(Ok(())) => Ok(Ausgang::Beendet),
                Ok(Err(e)) => Err(SchalterError::from(e)),
                Err(e) => Err(SchalterError::KanalGeschlossen(format!("Konfigurationsdienst: {e}"))),
            },
        };

        quelle_task.abort();
        dienst_task.abort();
        controller_task.abort();
        if let Err(e) = &ausgang {
            tracing::error!(fehler = %e, geschlossen = e.ist_geschlossen(), "Durchlauf abgebrochen");
        }
        ausgang
    }
}
