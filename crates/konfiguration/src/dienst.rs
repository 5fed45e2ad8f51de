//! KonfigurationsDienst – haelt den aktuellen Snapshot und verteilt ihn
//!
//! Einmal beim Start erzeugt und per Clone an alle Konsumenten
//! weitergereicht. Einziger Schreiber ist die Update-Schleife bzw.
//! [`KonfigurationsDienst::aktualisieren`]; Leser erhalten immer einen
//! vollstaendigen alten oder neuen Snapshot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{ReentrantMutex, RwLock};
use schalter_core::{PluginId, PluginKonfiguration, RessourceId};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::abfrage::{Abfrage, ErgebnisEmpfaenger, LiveQuery};
use crate::error::{KonfigurationsFehler, Result};
use crate::ereignis::KonfigurationsEreignis;
use crate::manager::ConfigurationManager;
use crate::registry::RessourcenRegistry;
use crate::store::{Abonnement, Store};

/// Standardgroesse des Ereignis-Kanals
pub const EREIGNIS_KANAL_GROESSE: usize = 16;

/// Konfiguration fuer den KonfigurationsDienst
#[derive(Debug, Clone)]
pub struct DienstKonfiguration {
    /// Kapazitaet des Broadcast-Kanals fuer Ereignisse
    pub kanal_groesse: usize,
}

impl Default for DienstKonfiguration {
    fn default() -> Self {
        Self {
            kanal_groesse: EREIGNIS_KANAL_GROESSE,
        }
    }
}

/// Prozessweiter Konfigurationsdienst. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct KonfigurationsDienst {
    inner: Arc<DienstInner>,
}

struct DienstInner {
    aktuell: RwLock<Arc<ConfigurationManager>>,
    store: Store<Arc<ConfigurationManager>>,
    ereignis_tx: broadcast::Sender<KonfigurationsEreignis>,
    registry: Arc<dyn RessourcenRegistry>,
    /// Serialisiert Aktualisierungen zwischen Threads. Reentrant, damit
    /// Store-Callbacks selbst `aktualisieren` aufrufen duerfen.
    schreib_sperre: ReentrantMutex<()>,
    gestartet: AtomicBool,
}

impl KonfigurationsDienst {
    /// Erstellt einen Dienst mit leerem Snapshot
    pub fn neu(konfiguration: DienstKonfiguration, registry: Arc<dyn RessourcenRegistry>) -> Self {
        let leer = Arc::new(ConfigurationManager::leer());
        let (ereignis_tx, _) = broadcast::channel(konfiguration.kanal_groesse.max(1));
        Self {
            inner: Arc::new(DienstInner {
                aktuell: RwLock::new(Arc::clone(&leer)),
                store: Store::neu(leer),
                ereignis_tx,
                registry,
                schreib_sperre: ReentrantMutex::new(()),
                gestartet: AtomicBool::new(false),
            }),
        }
    }

    /// Aktuell installierter Snapshot
    pub fn aktuell(&self) -> Arc<ConfigurationManager> {
        Arc::clone(&*self.inner.aktuell.read())
    }

    /// Installiert eine neu gelieferte Ergebnismenge
    ///
    /// War der vorherige Snapshot nicht leer, wird `Geaendert` ausgestrahlt,
    /// auch wenn der Inhalt identisch ist. Der neue Snapshot wird in jedem
    /// Fall installiert. Das Ereignis geht vor der Store-Verteilung raus;
    /// Store-Callbacks duerfen selbst wieder `aktualisieren` aufrufen.
    pub fn aktualisieren(&self, liste: Vec<PluginKonfiguration>) -> KonfigurationsEreignis {
        let _sperre = self.inner.schreib_sperre.lock();

        let nachher = Arc::new(ConfigurationManager::aus_liste(liste));
        let vorher = {
            let mut aktuell = self.inner.aktuell.write();
            std::mem::replace(&mut *aktuell, Arc::clone(&nachher))
        };

        let ereignis = if vorher.anzahl() > 0 {
            info!(
                vorher = vorher.anzahl(),
                nachher = nachher.anzahl(),
                "Plugin-Konfiguration geaendert – Neustart erforderlich"
            );
            KonfigurationsEreignis::Geaendert {
                vorher,
                nachher: Arc::clone(&nachher),
            }
        } else {
            info!(
                anzahl = nachher.anzahl(),
                plugins = nachher.anzahl_plugins(),
                "Plugin-Konfiguration geladen"
            );
            KonfigurationsEreignis::Geladen {
                konfiguration: Arc::clone(&nachher),
            }
        };

        if self.inner.ereignis_tx.send(ereignis.clone()).is_err() {
            debug!(ereignis = ereignis.name(), "Keine Ereignis-Empfaenger registriert");
        }

        self.inner.store.setzen(nachher);
        ereignis
    }

    /// Startet die Update-Schleife auf einem Live-Query-Empfaenger
    ///
    /// Die aktuell anliegende Ergebnismenge wird sofort installiert. Die
    /// Schleife endet mit [`KonfigurationsFehler::AbfrageGeschlossen`] wenn
    /// die Live-Query wegfaellt.
    pub fn starten(&self, ergebnisse: ErgebnisEmpfaenger) -> Result<JoinHandle<Result<()>>> {
        if self.inner.gestartet.swap(true, Ordering::SeqCst) {
            return Err(KonfigurationsFehler::BereitsGestartet);
        }
        Ok(tokio::spawn(self.clone().update_schleife(ergebnisse)))
    }

    async fn update_schleife(self, mut ergebnisse: ErgebnisEmpfaenger) -> Result<()> {
        loop {
            // Zwischenstaende die der Leser verpasst hat sind bereits
            // durch den neuesten ersetzt
            let liste = ergebnisse.borrow_and_update().clone();
            debug!(anzahl = liste.len(), "Ergebnismenge empfangen");
            self.aktualisieren(liste);

            if ergebnisse.changed().await.is_err() {
                warn!("Live-Query geschlossen, Konfigurationsdienst beendet");
                return Err(KonfigurationsFehler::AbfrageGeschlossen);
            }
        }
    }

    /// Abonniert alle Plugin-Konfigurationen (Label aufsteigend) und
    /// startet die Update-Schleife
    pub fn verbinden(&self, abfrage: &dyn LiveQuery) -> Result<JoinHandle<Result<()>>> {
        let rx = abfrage.abfragen(Abfrage::plugin_konfigurationen())?;
        self.starten(rx)
    }

    /// Ist das Plugin im aktuellen Snapshot aktiviert?
    pub fn hat(&self, plugin: &PluginId) -> bool {
        self.aktuell().hat(plugin)
    }

    /// Ist das Plugin der Ressource im aktuellen Snapshot aktiviert?
    pub fn hat_ressource(&self, ressource: Option<&RessourceId>) -> bool {
        self.aktuell()
            .hat_ressource(ressource, self.inner.registry.as_ref())
    }

    /// Registriert einen Callback auf dem Store (sofortiger Aufruf mit
    /// dem aktuellen Snapshot)
    #[must_use = "Abonnement endet beim Drop des Handles"]
    pub fn abonnieren<F>(&self, callback: F) -> Abonnement
    where
        F: Fn(&Arc<ConfigurationManager>) + Send + Sync + 'static,
    {
        self.inner.store.abonnieren(callback)
    }

    /// Store-Empfaenger fuer async Konsumenten
    pub fn beobachten(&self) -> watch::Receiver<Arc<ConfigurationManager>> {
        self.inner.store.beobachten()
    }

    /// Lesender Zugriff auf den Store; neue Werte setzt nur der Dienst
    pub fn store(&self) -> &Store<Arc<ConfigurationManager>> {
        &self.inner.store
    }

    /// Empfaenger fuer `Geladen`/`Geaendert`-Ereignisse
    pub fn ereignisse(&self) -> broadcast::Receiver<KonfigurationsEreignis> {
        self.inner.ereignis_tx.subscribe()
    }
}
