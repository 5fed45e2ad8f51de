//! ConfigurationManager – unveraenderlicher Snapshot der Plugin-Konfiguration
//!
//! Beantwortet "ist Plugin P aktiviert?" und "ist das Plugin, dem
//! Ressource R gehoert, aktiviert?" gegen einen festen Datenstand.
//! Jede Aktualisierung erzeugt eine neue Instanz.

use std::collections::HashMap;

use schalter_core::{PluginId, PluginKonfiguration, RessourceId};

use crate::registry::RessourcenRegistry;

/// Snapshot aus geordneter Liste und abgeleitetem Index
#[derive(Debug, Clone, Default)]
pub struct ConfigurationManager {
    /// Datensaetze in gelieferter Reihenfolge (Label aufsteigend)
    liste: Vec<PluginKonfiguration>,
    /// PluginId -> Datensatz, letzter Eintrag gewinnt
    index: HashMap<PluginId, PluginKonfiguration>,
}

impl ConfigurationManager {
    /// Leerer Snapshot (Startzustand)
    pub fn leer() -> Self {
        Self::default()
    }

    /// Baut einen Snapshot aus einer gelieferten Ergebnismenge
    pub fn aus_liste(liste: Vec<PluginKonfiguration>) -> Self {
        let index = liste
            .iter()
            .map(|k| (k.plugin_id.clone(), k.clone()))
            .collect();
        Self { liste, index }
    }

    /// Ist das Plugin aktiviert?
    ///
    /// Unbekannte Plugins und Datensaetze ohne explizites `enabled = false`
    /// gelten als aktiviert.
    pub fn hat(&self, plugin: &PluginId) -> bool {
        self.index
            .get(plugin)
            .map(|k| !k.ist_deaktiviert())
            .unwrap_or(true)
    }

    /// Ist das Plugin aktiviert, dem die Ressource gehoert?
    ///
    /// Fehlende Ressource ergibt `false`, unbekanntes Plugin `true`.
    pub fn hat_ressource(
        &self,
        ressource: Option<&RessourceId>,
        registry: &dyn RessourcenRegistry,
    ) -> bool {
        match ressource {
            Some(r) => self.hat(&registry.plugin_von(r)),
            None => false,
        }
    }

    /// Alle Datensaetze in gelieferter Reihenfolge
    pub fn liste(&self) -> &[PluginKonfiguration] {
        &self.liste
    }

    /// Datensatz eines Plugins, falls vorhanden
    pub fn eintrag(&self, plugin: &PluginId) -> Option<&PluginKonfiguration> {
        self.index.get(plugin)
    }

    /// Anzahl der Datensaetze in der Liste (nicht im Index)
    pub fn anzahl(&self) -> usize {
        self.liste.len()
    }

    pub fn ist_leer(&self) -> bool {
        self.liste.is_empty()
    }

    /// Anzahl unterschiedlicher Plugins im Index
    pub fn anzahl_plugins(&self) -> usize {
        self.index.len()
    }

    /// Aktivierte Plugins in Listenreihenfolge
    pub fn aktivierte(&self) -> Vec<&PluginId> {
        self.plugins_gefiltert(true)
    }

    /// Explizit deaktivierte Plugins in Listenreihenfolge
    pub fn deaktivierte(&self) -> Vec<&PluginId> {
        self.plugins_gefiltert(false)
    }

    fn plugins_gefiltert(&self, aktiviert: bool) -> Vec<&PluginId> {
        let mut gesehen = std::collections::HashSet::new();
        self.liste
            .iter()
            .map(|k| &k.plugin_id)
            .filter(|id| gesehen.insert(*id))
            .filter(|id| self.hat(id) == aktiviert)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PraefixRegistry;

    fn k(id: &str, enabled: Option<bool>) -> PluginKonfiguration {
        PluginKonfiguration::neu(id, enabled)
    }

    #[test]
    fn leerer_manager_erlaubt_alles() {
        let m = ConfigurationManager::leer();
        assert!(m.ist_leer());
        assert!(m.hat(&"irgendwas".into()));
    }

    #[test]
    fn unbekanntes_plugin_ist_aktiviert() {
        let m = ConfigurationManager::aus_liste(vec![k("A", Some(true))]);
        assert!(m.hat(&"A".into()));
        assert!(m.hat(&"B".into()));
    }

    #[test]
    fn explizit_deaktiviert() {
        let m = ConfigurationManager::aus_liste(vec![k("A", Some(false))]);
        assert!(!m.hat(&"A".into()));
    }

    #[test]
    fn fehlendes_enabled_ist_aktiviert() {
        let m = ConfigurationManager::aus_liste(vec![k("A", None)]);
        assert!(m.hat(&"A".into()));
    }

    #[test]
    fn doppelte_plugins_letzter_gewinnt() {
        let m = ConfigurationManager::aus_liste(vec![k("A", Some(true)), k("A", Some(false))]);
        assert_eq!(m.anzahl(), 2);
        assert_eq!(m.anzahl_plugins(), 1);
        assert!(!m.hat(&"A".into()));
    }

    #[test]
    fn liste_behaelt_reihenfolge() {
        let m = ConfigurationManager::aus_liste(vec![
            k("c", None).mit_label("Alpha"),
            k("a", None).mit_label("Beta"),
        ]);
        let ids: Vec<_> = m.liste().iter().map(|k| k.plugin_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[test]
    fn ressource_ohne_wert_ist_false() {
        let m = ConfigurationManager::leer();
        assert!(!m.hat_ressource(None, &PraefixRegistry));
    }

    #[test]
    fn ressource_delegiert_an_plugin() {
        let m = ConfigurationManager::aus_liste(vec![k("tracker", Some(false)), k("chunter", None)]);
        let reg = PraefixRegistry;

        let r1 = RessourceId::from("tracker:component:IssueList");
        let r2 = RessourceId::from("chunter:function:Send");
        let r3 = RessourceId::from("lead:string:Title");

        assert!(!m.hat_ressource(Some(&r1), &reg));
        assert!(m.hat_ressource(Some(&r2), &reg));
        assert!(m.hat_ressource(Some(&r3), &reg));
        for r in [&r1, &r2, &r3] {
            assert_eq!(m.hat_ressource(Some(r), &reg), m.hat(&reg.plugin_von(r)));
        }
    }

    #[test]
    fn aktivierte_und_deaktivierte() {
        let m = ConfigurationManager::aus_liste(vec![
            k("a", Some(true)),
            k("b", Some(false)),
            k("c", None),
        ]);
        let aktiv: Vec<_> = m.aktivierte().into_iter().map(|p| p.as_str()).collect();
        let inaktiv: Vec<_> = m.deaktivierte().into_iter().map(|p| p.as_str()).collect();
        assert_eq!(aktiv, vec!["a", "c"]);
        assert_eq!(inaktiv, vec!["b"]);
    }

    #[test]
    fn eintrag_lookup() {
        let m = ConfigurationManager::aus_liste(vec![k("a", Some(true))]);
        assert!(m.eintrag(&"a".into()).is_some());
        assert!(m.eintrag(&"b".into()).is_none());
    }
}
