//! Gemeinsame Typen fuer Schalter
//!
//! Identifikatoren verwenden das Newtype-Pattern um Verwechslungen zwischen
//! Plugin- und Ressourcen-Kennungen zur Compilezeit auszuschliessen.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kennung eines Plugins (z.B. `"tracker"`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginId(pub String);

impl PluginId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PluginId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for PluginId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opake Kennung einer Ressource/Faehigkeit, die genau einem Plugin gehoert
///
/// Uebliche Form: `plugin:art:name`, z.B. `tracker:component:IssueList`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RessourceId(pub String);

impl RessourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RessourceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for RessourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Eindeutige ID eines Konfigurationsdatensatzes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KonfigurationId(pub Uuid);

impl KonfigurationId {
    /// Erstellt eine neue zufaellige KonfigurationId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for KonfigurationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for KonfigurationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "konfiguration:{}", self.0)
    }
}

/// Konfigurationsdatensatz eines optionalen Plugins
///
/// Gehoert dem externen Abfragesystem und wird hier nur gelesen.
/// `enabled = None` bedeutet "nicht festgelegt" und gilt als aktiviert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginKonfiguration {
    #[serde(default)]
    pub id: KonfigurationId,
    pub plugin_id: PluginId,
    /// Anzeigename, gleichzeitig Sortierschluessel der Abfrage
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub beta: bool,
    #[serde(default)]
    pub beschreibung: Option<String>,
    #[serde(default = "Utc::now")]
    pub geaendert_am: DateTime<Utc>,
}

impl PluginKonfiguration {
    /// Erstellt einen Datensatz mit Label = Plugin-ID
    pub fn neu(plugin_id: impl Into<PluginId>, enabled: Option<bool>) -> Self {
        let plugin_id = plugin_id.into();
        Self {
            id: KonfigurationId::new(),
            label: plugin_id.0.clone(),
            plugin_id,
            enabled,
            beta: false,
            beschreibung: None,
            geaendert_am: Utc::now(),
        }
    }

    /// Setzt das Label (Builder-Stil)
    pub fn mit_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Nur ein explizites `false` deaktiviert ein Plugin
    pub fn ist_deaktiviert(&self) -> bool {
        self.enabled == Some(false)
    }
}
