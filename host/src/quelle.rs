//! Datei-Quelle – speist die In-Memory Live-Query aus einer TOML-Datei
//!
//! Die Datei wird periodisch gelesen. Nur wenn sich ihr Inhalt aendert,
//! wird der Datenbestand der Live-Query ersetzt (und damit neu verteilt).
//!
//! Format:
//! ```toml
//! [[plugin]]
//! pluginId = "tracker"
//! label = "Tracker"
//! enabled = false
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use schalter_core::{PluginKonfiguration, Result, SchalterError};
use schalter_konfiguration::SpeicherAbfrage;
use serde::Deserialize;
use tokio::task::JoinHandle;

#[derive(Debug, Default, Deserialize)]
struct PluginDatei {
    #[serde(default)]
    plugin: Vec<PluginKonfiguration>,
}

/// Parst den Inhalt einer Plugin-Datei
pub fn parsen(inhalt: &str) -> Result<Vec<PluginKonfiguration>> {
    let datei: PluginDatei = toml::from_str(inhalt)
        .map_err(|e| SchalterError::Konfiguration(format!("Plugin-Datei ungueltig: {e}")))?;
    Ok(datei.plugin)
}

/// Periodisch gelesene Plugin-Datei
pub struct DateiQuelle {
    pfad: PathBuf,
    intervall: Duration,
}

impl DateiQuelle {
    pub fn neu(pfad: impl Into<PathBuf>, intervall: Duration) -> Self {
        Self {
            pfad: pfad.into(),
            intervall,
        }
    }

    /// Liest die Datei einmal und fuellt die Live-Query,
    /// danach wird im Hintergrund auf Aenderungen geprueft
    pub async fn starten(self, ziel: SpeicherAbfrage) -> Result<JoinHandle<()>> {
        let mut letzter = match inhalt_lesen(&self.pfad).await? {
            Some(inhalt) => inhalt,
            None => {
                tracing::warn!(pfad = %self.pfad.display(), "Plugin-Datei nicht gefunden, starte ohne Datensaetze");
                String::new()
            }
        };
        ziel.ersetzen_alle(parsen(&letzter)?);
        tracing::info!(
            pfad = %self.pfad.display(),
            anzahl = ziel.datensaetze().len(),
            "Plugin-Datei geladen"
        );

        Ok(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.intervall);
            // Erster Tick kommt sofort
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let inhalt = match inhalt_lesen(&self.pfad).await {
                    Ok(i) => i.unwrap_or_default(),
                    Err(e) => {
                        tracing::warn!(pfad = %self.pfad.display(), fehler = %e, "Plugin-Datei nicht lesbar");
                        continue;
                    }
                };
                if inhalt == letzter {
                    continue;
                }
                match parsen(&inhalt) {
                    Ok(datensaetze) => {
                        tracing::info!(
                            pfad = %self.pfad.display(),
                            anzahl = datensaetze.len(),
                            "Plugin-Datei geaendert"
                        );
                        ziel.ersetzen_alle(datensaetze);
                        letzter = inhalt;
                    }
                    Err(e) => {
                        tracing::warn!(pfad = %self.pfad.display(), fehler = %e, "Plugin-Datei ungueltig, behalte alten Stand");
                    }
                }
            }
        }))
    }
}

/// Liest die Datei; `None` wenn sie nicht existiert
async fn inhalt_lesen(pfad: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(pfad).await {
        Ok(inhalt) => Ok(Some(inhalt)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(SchalterError::Io(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schalter_konfiguration::{Abfrage, LiveQuery};
    use tempfile::TempDir;

    const ZWEI_PLUGINS: &str = r#"
[[plugin]]
pluginId = "tracker"
label = "Tracker"
enabled = false

[[plugin]]
pluginId = "chunter"
label = "Chat"
"#;

    #[test]
    fn parsen_ok() {
        let liste = parsen(ZWEI_PLUGINS).unwrap();
        assert_eq!(liste.len(), 2);
        assert_eq!(liste[0].plugin_id.as_str(), "tracker");
        assert_eq!(liste[0].enabled, Some(false));
        assert_eq!(liste[1].enabled, None);
    }

    #[test]
    fn parsen_leer() {
        assert!(parsen("").unwrap().is_empty());
    }

    #[test]
    fn parsen_fehlerhaft() {
        let err = parsen("[[plugin]]\nlabel = \"ohne id\"").unwrap_err();
        assert!(matches!(err, SchalterError::Konfiguration(_)));
    }

    #[tokio::test]
    async fn fehlende_datei_ergibt_leeren_bestand() {
        let dir = TempDir::new().unwrap();
        let ziel = SpeicherAbfrage::neu();
        let handle = DateiQuelle::neu(dir.path().join("fehlt.toml"), Duration::from_secs(60))
            .starten(ziel.clone())
            .await
            .unwrap();
        assert!(ziel.datensaetze().is_empty());
        handle.abort();
    }

    #[tokio::test]
    async fn unlesbare_datei_ist_io_fehler() {
        let dir = TempDir::new().unwrap();
        // Ein Verzeichnis laesst sich nicht als Datei lesen
        let err = DateiQuelle::neu(dir.path(), Duration::from_secs(60))
            .starten(SpeicherAbfrage::neu())
            .await
            .unwrap_err();
        assert!(matches!(err, SchalterError::Io(_)));
    }

    #[tokio::test]
    async fn kaputte_datei_beim_start_ist_konfigurationsfehler() {
        let dir = TempDir::new().unwrap();
        let pfad = dir.path().join("plugins.toml");
        std::fs::write(&pfad, "[[plugin]\n").unwrap();
        let err = DateiQuelle::neu(&pfad, Duration::from_secs(60))
            .starten(SpeicherAbfrage::neu())
            .await
            .unwrap_err();
        assert!(matches!(err, SchalterError::Konfiguration(_)));
    }

    #[tokio::test]
    async fn aenderung_wird_verteilt() {
        let dir = TempDir::new().unwrap();
        let pfad = dir.path().join("plugins.toml");
        std::fs::write(&pfad, ZWEI_PLUGINS).unwrap();

        let ziel = SpeicherAbfrage::neu();
        let handle = DateiQuelle::neu(&pfad, Duration::from_millis(10))
            .starten(ziel.clone())
            .await
            .unwrap();
        assert_eq!(ziel.datensaetze().len(), 2);

        let mut rx = ziel.abfragen(Abfrage::plugin_konfigurationen()).unwrap();
        assert_eq!(rx.borrow_and_update().len(), 2);

        let tmp = pfad.with_extension("neu");
        std::fs::write(&tmp, "[[plugin]]\npluginId = \"tracker\"\n").unwrap();
        std::fs::rename(&tmp, &pfad).unwrap();
        tokio::time::timeout(Duration::from_secs(2), rx.changed())
            .await
            .expect("Aenderung sollte erkannt werden")
            .unwrap();
        assert_eq!(rx.borrow().len(), 1);
        handle.abort();
    }
}
