//! Live-Query – liefert bei jedem Abonnement und jeder Aenderung die
//! vollstaendige aktuelle Ergebnismenge
//!
//! Das echte Abfragesystem ist extern. Hier liegen die Nahtstelle
//! ([`LiveQuery`]) und eine In-Memory-Implementierung ([`SpeicherAbfrage`])
//! fuer Tests und den Host.

use std::sync::Arc;

use parking_lot::Mutex;
use schalter_core::{PluginId, PluginKonfiguration};
use tokio::sync::watch;

use crate::error::{KonfigurationsFehler, Result};

/// Entitaetsklassen die abgefragt werden koennen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Klasse {
    PluginKonfiguration,
    /// Beliebige andere Klasse des Abfragesystems
    Andere(String),
}

impl std::fmt::Display for Klasse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Klasse::PluginKonfiguration => write!(f, "core:class:PluginConfiguration"),
            Klasse::Andere(k) => write!(f, "{}", k),
        }
    }
}

/// Filterpraedikat; leer = alle Datensaetze
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub plugin_ids: Option<Vec<PluginId>>,
    pub enabled: Option<bool>,
}

impl Filter {
    /// Passt auf alles
    pub fn alle() -> Self {
        Self::default()
    }

    pub fn passt(&self, k: &PluginKonfiguration) -> bool {
        if let Some(ids) = &self.plugin_ids {
            if !ids.contains(&k.plugin_id) {
                return false;
            }
        }
        match self.enabled {
            Some(e) => k.enabled == Some(e),
            None => true,
        }
    }
}

/// Sortierung der Ergebnismenge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sortierung {
    LabelAufsteigend,
    LabelAbsteigend,
}

#[derive(Debug, Clone, Default)]
pub struct AbfrageOptionen {
    pub sortierung: Option<Sortierung>,
}

/// Vollstaendige Abfragebeschreibung
#[derive(Debug, Clone)]
pub struct Abfrage {
    pub klasse: Klasse,
    pub filter: Filter,
    pub optionen: AbfrageOptionen,
}

impl Abfrage {
    /// Alle Plugin-Konfigurationen, Label aufsteigend
    pub fn plugin_konfigurationen() -> Self {
        Self {
            klasse: Klasse::PluginKonfiguration,
            filter: Filter::alle(),
            optionen: AbfrageOptionen {
                sortierung: Some(Sortierung::LabelAufsteigend),
            },
        }
    }

    /// Filtert und sortiert eine Ergebnismenge gemaess dieser Abfrage
    pub fn anwenden(&self, datensaetze: &[PluginKonfiguration]) -> Vec<PluginKonfiguration> {
        let mut ergebnis: Vec<PluginKonfiguration> = datensaetze
            .iter()
            .filter(|k| self.filter.passt(k))
            .cloned()
            .collect();
        match self.optionen.sortierung {
            Some(Sortierung::LabelAufsteigend) => ergebnis.sort_by(|a, b| a.label.cmp(&b.label)),
            Some(Sortierung::LabelAbsteigend) => ergebnis.sort_by(|a, b| b.label.cmp(&a.label)),
            None => {}
        }
        ergebnis
    }
}

/// Empfangsseite einer Live-Query
///
/// Haelt immer nur die neueste Ergebnismenge. Wer langsamer liest als
/// geliefert wird, ueberspringt Zwischenstaende, sieht aber nie einen
/// veralteten Stand als letzten.
pub type ErgebnisEmpfaenger = watch::Receiver<Vec<PluginKonfiguration>>;

/// Nahtstelle zum Live-Query-System
///
/// Der Empfaenger enthaelt sofort die aktuelle Ergebnismenge und wird
/// danach bei jeder Aenderung mit der vollstaendigen Menge ueberschrieben.
pub trait LiveQuery: Send + Sync {
    fn abfragen(&self, abfrage: Abfrage) -> Result<ErgebnisEmpfaenger>;
}

struct Abonnent {
    abfrage: Abfrage,
    tx: watch::Sender<Vec<PluginKonfiguration>>,
}

/// In-Memory Live-Query. Clone teilt den inneren Zustand.
#[derive(Clone, Default)]
pub struct SpeicherAbfrage {
    inner: Arc<Mutex<SpeicherInner>>,
}

#[derive(Default)]
struct SpeicherInner {
    datensaetze: Vec<PluginKonfiguration>,
    abonnenten: Vec<Abonnent>,
}

impl SpeicherAbfrage {
    /// Erstellt eine leere Live-Query
    pub fn neu() -> Self {
        Self::default()
    }

    /// Erstellt eine Live-Query mit Startdaten
    pub fn mit_datensaetze(datensaetze: Vec<PluginKonfiguration>) -> Self {
        let abfrage = Self::neu();
        abfrage.inner.lock().datensaetze = datensaetze;
        abfrage
    }

    /// Fuegt einen Datensatz ein oder ersetzt den mit gleicher ID
    pub fn einfuegen(&self, datensatz: PluginKonfiguration) {
        let mut inner = self.inner.lock();
        match inner.datensaetze.iter_mut().find(|k| k.id == datensatz.id) {
            Some(vorhanden) => *vorhanden = datensatz,
            None => inner.datensaetze.push(datensatz),
        }
        inner.verteilen();
    }

    /// Entfernt alle Datensaetze eines Plugins
    ///
    /// Gibt die Anzahl entfernter Datensaetze zurueck.
    pub fn entfernen(&self, plugin: &PluginId) -> usize {
        let mut inner = self.inner.lock();
        let vorher = inner.datensaetze.len();
        inner.datensaetze.retain(|k| &k.plugin_id != plugin);
        let entfernt = vorher - inner.datensaetze.len();
        if entfernt > 0 {
            inner.verteilen();
        }
        entfernt
    }

    /// Ersetzt den gesamten Datenbestand und verteilt ihn neu
    pub fn ersetzen_alle(&self, datensaetze: Vec<PluginKonfiguration>) {
        let mut inner = self.inner.lock();
        inner.datensaetze = datensaetze;
        inner.verteilen();
    }

    /// Aktueller Datenbestand (unsortiert)
    pub fn datensaetze(&self) -> Vec<PluginKonfiguration> {
        self.inner.lock().datensaetze.clone()
    }

    /// Anzahl aktiver Abonnenten
    pub fn anzahl_abonnenten(&self) -> usize {
        let mut inner = self.inner.lock();
        inner.abonnenten.retain(|a| !a.tx.is_closed());
        inner.abonnenten.len()
    }
}

impl SpeicherInner {
    /// Ueberschreibt bei jedem Abonnenten die Ergebnismenge.
    /// Noch nicht gelesene Zwischenstaende werden dabei ersetzt.
    fn verteilen(&mut self) {
        let datensaetze = &self.datensaetze;
        self.abonnenten.retain(|a| {
            if a.tx.is_closed() {
                tracing::debug!(klasse = %a.abfrage.klasse, "Abonnent geschlossen, wird entfernt");
                return false;
            }
            a.tx.send_replace(a.abfrage.anwenden(datensaetze));
            true
        });
    }
}

impl LiveQuery for SpeicherAbfrage {
    fn abfragen(&self, abfrage: Abfrage) -> Result<ErgebnisEmpfaenger> {
        if abfrage.klasse != Klasse::PluginKonfiguration {
            return Err(KonfigurationsFehler::UnbekannteKlasse(
                abfrage.klasse.to_string(),
            ));
        }

        let mut inner = self.inner.lock();
        let (tx, rx) = watch::channel(abfrage.anwenden(&inner.datensaetze));
        inner.abonnenten.push(Abonnent { abfrage, tx });
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k(id: &str, label: &str, enabled: Option<bool>) -> PluginKonfiguration {
        PluginKonfiguration::neu(id, enabled).mit_label(label)
    }

    fn labels(v: &[PluginKonfiguration]) -> Vec<&str> {
        v.iter().map(|k| k.label.as_str()).collect()
    }

    #[test]
    fn sortierung_aufsteigend() {
        let daten = vec![k("b", "Zeta", None), k("a", "Alpha", None), k("c", "Mitte", None)];
        let ergebnis = Abfrage::plugin_konfigurationen().anwenden(&daten);
        assert_eq!(labels(&ergebnis), vec!["Alpha", "Mitte", "Zeta"]);
    }

    #[test]
    fn sortierung_absteigend() {
        let daten = vec![k("a", "Alpha", None), k("b", "Zeta", None)];
        let mut abfrage = Abfrage::plugin_konfigurationen();
        abfrage.optionen.sortierung = Some(Sortierung::LabelAbsteigend);
        assert_eq!(labels(&abfrage.anwenden(&daten)), vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn filter_leer_passt_auf_alles() {
        let f = Filter::alle();
        assert!(f.passt(&k("a", "A", None)));
        assert!(f.passt(&k("a", "A", Some(false))));
    }

    #[test]
    fn filter_nach_plugin_und_enabled() {
        let f = Filter {
            plugin_ids: Some(vec!["a".into()]),
            enabled: Some(false),
        };
        assert!(f.passt(&k("a", "A", Some(false))));
        assert!(!f.passt(&k("a", "A", Some(true))));
        assert!(!f.passt(&k("b", "B", Some(false))));
    }

    #[test]
    fn abonnement_liefert_sofort_ergebnis() {
        let quelle = SpeicherAbfrage::mit_datensaetze(vec![k("a", "A", Some(true))]);
        let rx = quelle.abfragen(Abfrage::plugin_konfigurationen()).unwrap();
        assert_eq!(rx.borrow().len(), 1);
    }

    #[tokio::test]
    async fn aenderung_liefert_volle_menge() {
        let quelle = SpeicherAbfrage::neu();
        let mut rx = quelle.abfragen(Abfrage::plugin_konfigurationen()).unwrap();
        assert!(rx.borrow_and_update().is_empty());

        quelle.einfuegen(k("b", "Beta", None));
        rx.changed().await.unwrap();
        assert_eq!(labels(&rx.borrow_and_update()), vec!["Beta"]);

        quelle.einfuegen(k("a", "Alpha", None));
        rx.changed().await.unwrap();
        assert_eq!(labels(&rx.borrow_and_update()), vec!["Alpha", "Beta"]);

        assert_eq!(quelle.entfernen(&"b".into()), 1);
        rx.changed().await.unwrap();
        assert_eq!(labels(&rx.borrow_and_update()), vec!["Alpha"]);
    }

    #[tokio::test]
    async fn schnelle_aenderungen_enden_auf_neuestem_stand() {
        let quelle = SpeicherAbfrage::neu();
        let mut rx = quelle.abfragen(Abfrage::plugin_konfigurationen()).unwrap();
        rx.borrow_and_update();

        // Mehr Lieferungen als ein Leser je puffern koennte
        for i in 0..40 {
            quelle.ersetzen_alle(vec![k("x", &format!("Stand {i}"), Some(i % 2 == 0))]);
        }
        quelle.ersetzen_alle(vec![k("x", "Endstand", Some(false))]);

        rx.changed().await.unwrap();
        let letzte = rx.borrow_and_update().clone();
        assert_eq!(labels(&letzte), vec!["Endstand"]);
        assert_eq!(letzte[0].enabled, Some(false));
        // Zwischenstaende wurden zusammengefasst, nichts steht mehr aus
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn einfuegen_gleicher_id_ersetzt() {
        let quelle = SpeicherAbfrage::neu();
        let mut datensatz = k("a", "A", Some(true));
        quelle.einfuegen(datensatz.clone());
        datensatz.enabled = Some(false);
        quelle.einfuegen(datensatz);

        let daten = quelle.datensaetze();
        assert_eq!(daten.len(), 1);
        assert_eq!(daten[0].enabled, Some(false));
    }

    #[test]
    fn fremde_klasse_abgelehnt() {
        let quelle = SpeicherAbfrage::neu();
        let mut abfrage = Abfrage::plugin_konfigurationen();
        abfrage.klasse = Klasse::Andere("core:class:Space".into());
        let err = quelle.abfragen(abfrage).unwrap_err();
        assert!(matches!(err, KonfigurationsFehler::UnbekannteKlasse(_)));
    }

    #[test]
    fn geschlossene_abonnenten_werden_entfernt() {
        let quelle = SpeicherAbfrage::neu();
        let rx = quelle.abfragen(Abfrage::plugin_konfigurationen()).unwrap();
        assert_eq!(quelle.anzahl_abonnenten(), 1);
        drop(rx);
        assert_eq!(quelle.anzahl_abonnenten(), 0);
    }

    #[test]
    fn verteilen_entfernt_geschlossene_abonnenten() {
        let quelle = SpeicherAbfrage::neu();
        let offen = quelle.abfragen(Abfrage::plugin_konfigurationen()).unwrap();
        drop(quelle.abfragen(Abfrage::plugin_konfigurationen()).unwrap());
        quelle.einfuegen(k("a", "A", None));
        assert_eq!(quelle.inner.lock().abonnenten.len(), 1);
        assert_eq!(offen.borrow().len(), 1);
    }
}
