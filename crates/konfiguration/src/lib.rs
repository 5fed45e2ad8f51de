//! schalter-konfiguration – Reaktiver Plugin-Konfigurations-Cache
//!
//! Haelt fest, welche optionalen Plugins aktiviert sind, beantwortet
//! Lookups dagegen und verteilt jeden neuen Stand an Abonnenten.
//!
//! # Architektur
//! - [`manager::ConfigurationManager`] – unveraenderlicher Snapshot mit Index
//! - [`dienst::KonfigurationsDienst`] – aktueller Snapshot, Update-Schleife, Ereignisse
//! - [`store::Store`] – reaktiver Broadcast-Store fuer UI-Bindungen
//! - [`abfrage`] – Live-Query-Nahtstelle und In-Memory-Implementierung
//! - [`registry`] – Aufloesung Ressource -> Plugin
//! - [`neustart::NeustartController`] – entscheidet ueber Neustarts des Hosts

pub mod abfrage;
pub mod dienst;
pub mod ereignis;
pub mod error;
pub mod manager;
pub mod neustart;
pub mod registry;
pub mod store;

// Bequeme Re-Exporte
pub use abfrage::{
    Abfrage, ErgebnisEmpfaenger, Filter, Klasse, LiveQuery, Sortierung, SpeicherAbfrage,
};
pub use dienst::{DienstKonfiguration, KonfigurationsDienst};
pub use ereignis::KonfigurationsEreignis;
pub use error::{KonfigurationsFehler, Result};
pub use manager::ConfigurationManager;
pub use neustart::{Neustart, NeustartController, NeustartGrund};
pub use registry::{PraefixRegistry, RessourcenRegistry, RessourcenVerzeichnis};
pub use store::{Abonnement, Store};
