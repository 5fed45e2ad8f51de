//! Host-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Host ohne Konfigurationsdatei
//! lauffaehig ist.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::logging::{log_format_gueltig, log_level_gueltig};

/// Vollstaendige Host-Konfiguration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct HostConfig {
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
    /// Einstellungen des Konfigurationsdienstes
    pub konfiguration: KonfigurationsEinstellungen,
    /// Plugin-Quelle (Datei mit Konfigurationsdatensaetzen)
    pub quelle: QuellenEinstellungen,
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: trace, debug, info, warn, error
    pub level: String,
    /// Format: "text" oder "json"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Einstellungen des Konfigurationsdienstes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KonfigurationsEinstellungen {
    /// Kapazitaet des Ereignis-Kanals
    pub kanal_groesse: usize,
}

impl Default for KonfigurationsEinstellungen {
    fn default() -> Self {
        Self { kanal_groesse: 16 }
    }
}

/// Plugin-Quelle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuellenEinstellungen {
    /// TOML-Datei mit `[[plugin]]`-Eintraegen
    pub datei: PathBuf,
    /// Abfrageintervall in Millisekunden
    pub intervall_ms: u64,
}

impl Default for QuellenEinstellungen {
    fn default() -> Self {
        Self {
            datei: PathBuf::from("plugins.toml"),
            intervall_ms: 2000,
        }
    }
}

impl QuellenEinstellungen {
    pub fn intervall(&self) -> Duration {
        Duration::from_millis(self.intervall_ms.max(1))
    }
}

impl HostConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                config
                    .validieren()
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Prueft Werte die serde allein nicht abfangen kann
    pub fn validieren(&self) -> Result<(), String> {
        if !log_level_gueltig(&self.logging.level) {
            return Err(format!(
                "ungueltiges Log-Level '{}' (erlaubt: trace, debug, info, warn, error)",
                self.logging.level
            ));
        }
        if !log_format_gueltig(&self.logging.format) {
            return Err(format!(
                "ungueltiges Log-Format '{}' (erlaubt: text, json)",
                self.logging.format
            ));
        }
        Ok(())
    }
}
