//! Ressourcen-Registry – ordnet Ressourcen ihrem Plugin zu

use dashmap::DashMap;
use schalter_core::{PluginId, RessourceId};

/// Aufloesung Ressource -> besitzendes Plugin
///
/// Die Aufloesung ist total: jede Ressource gehoert genau einem Plugin.
pub trait RessourcenRegistry: Send + Sync {
    fn plugin_von(&self, ressource: &RessourceId) -> PluginId;
}

/// Leitet das Plugin aus dem Praefix der Ressourcen-ID ab
///
/// `tracker:component:IssueList` gehoert zu `tracker`. IDs ohne `:` gehoeren
/// einem Plugin gleichen Namens.
#[derive(Debug, Clone, Copy, Default)]
pub struct PraefixRegistry;

impl RessourcenRegistry for PraefixRegistry {
    fn plugin_von(&self, ressource: &RessourceId) -> PluginId {
        praefix_plugin(ressource)
    }
}

fn praefix_plugin(ressource: &RessourceId) -> PluginId {
    let s = ressource.as_str();
    let plugin = s.split_once(':').map(|(p, _)| p).unwrap_or(s);
    PluginId::new(plugin)
}

/// Verzeichnis expliziter Zuordnungen – thread-sicher via DashMap
///
/// Nicht eingetragene Ressourcen werden ueber den Praefix aufgeloest.
pub struct RessourcenVerzeichnis {
    eintraege: DashMap<RessourceId, PluginId>,
}

impl RessourcenVerzeichnis {
    /// Erstellt ein neues leeres Verzeichnis
    pub fn neu() -> Self {
        Self {
            eintraege: DashMap::new(),
        }
    }

    /// Traegt eine Ressource fuer ein Plugin ein
    ///
    /// Gibt die vorherige Zuordnung zurueck, falls vorhanden.
    pub fn registrieren(&self, ressource: RessourceId, plugin: PluginId) -> Option<PluginId> {
        tracing::debug!(ressource = %ressource, plugin = %plugin, "Ressource registriert");
        self.eintraege.insert(ressource, plugin)
    }

    /// Entfernt eine explizite Zuordnung
    pub fn entfernen(&self, ressource: &RessourceId) -> Option<PluginId> {
        self.eintraege.remove(ressource).map(|(_, p)| p)
    }

    /// Alle explizit eingetragenen Ressourcen eines Plugins
    pub fn ressourcen_von(&self, plugin: &PluginId) -> Vec<RessourceId> {
        self.eintraege
            .iter()
            .filter(|e| e.value() == plugin)
            .map(|e| e.key().clone())
            .collect()
    }

    /// Anzahl expliziter Zuordnungen
    pub fn anzahl(&self) -> usize {
        self.eintraege.len()
    }
}

impl Default for RessourcenVerzeichnis {
    fn default() -> Self {
        Self::neu()
    }
}

impl RessourcenRegistry for RessourcenVerzeichnis {
    fn plugin_von(&self, ressource: &RessourceId) -> PluginId {
        self.eintraege
            .get(ressource)
            .map(|e| e.value().clone())
            .unwrap_or_else(|| praefix_plugin(ressource))
    }
}
