//! Schalter Host – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging und baut die
//! Anwendung bei jeder Konfigurationsaenderung vollstaendig neu auf.

use anyhow::Result;
use schalter_host::{Ausgang, Host, config::HostConfig, logging::logging_initialisieren};

#[tokio::main]
async fn main() -> Result<()> {
    // Konfigurationsdatei-Pfad aus Umgebungsvariable oder Standard
    let config_pfad = std::env::var("SCHALTER_CONFIG").unwrap_or_else(|_| "schalter.toml".into());

    // Konfiguration laden (Standardwerte falls Datei fehlt)
    let config = HostConfig::laden(&config_pfad)?;

    logging_initialisieren(&config.logging.level, &config.logging.format);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        plugins = %config.quelle.datei.display(),
        "Schalter Host wird initialisiert"
    );

    let host = Host::neu(config);
    let mut durchlauf = 0u64;
    loop {
        durchlauf += 1;
        tracing::info!(durchlauf, "Anwendung wird aufgebaut");
        match host.starten().await? {
            Ausgang::Neustart(grund) => {
                tracing::info!(
                    vorher = grund.vorher,
                    nachher = grund.nachher,
                    "Konfiguration geaendert, Anwendung wird neu geladen"
                );
            }
            Ausgang::Beendet => {
                tracing::info!("Shutdown-Signal empfangen, Host wird beendet");
                break;
            }
        }
    }

    Ok(())
}
