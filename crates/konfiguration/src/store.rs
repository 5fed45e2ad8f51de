//! Broadcast-Store – reaktiver Container fuer einen Wert
//!
//! Jeder neue Wert wird synchron an alle registrierten Callbacks verteilt.
//! Ein neuer Abonnent erhaelt sofort den aktuellen Wert. Fuer async
//! Konsumenten steht zusaetzlich ein `watch`-Empfaenger bereit.
//!
//! Ausserhalb des Crates ist der Store nur lesbar; geschrieben wird er
//! ausschliesslich vom Konfigurationsdienst.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Reaktiver Store. Clone teilt den inneren Zustand.
pub struct Store<T> {
    inner: Arc<StoreInner<T>>,
}

struct StoreInner<T> {
    wert: RwLock<T>,
    abonnenten: Mutex<Vec<(u64, Callback<T>)>>,
    naechste_id: AtomicU64,
    /// Wird bei jedem `setzen` erhoeht
    version: AtomicU64,
    watch_tx: watch::Sender<T>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Store<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Erstellt einen Store mit Startwert
    pub fn neu(start: T) -> Self {
        let (watch_tx, _) = watch::channel(start.clone());
        Self {
            inner: Arc::new(StoreInner {
                wert: RwLock::new(start),
                abonnenten: Mutex::new(Vec::new()),
                naechste_id: AtomicU64::new(0),
                version: AtomicU64::new(0),
                watch_tx,
            }),
        }
    }

    /// Ersetzt den Wert und benachrichtigt alle Abonnenten synchron
    ///
    /// Setzt ein Callback selbst einen neuen Wert, erhalten die restlichen
    /// Abonnenten nur noch diesen neueren Wert.
    pub(crate) fn setzen(&self, wert: T) {
        let version = {
            let mut aktuell = self.inner.wert.write();
            *aktuell = wert.clone();
            self.inner.version.fetch_add(1, Ordering::SeqCst) + 1
        };
        self.inner.watch_tx.send_replace(wert.clone());

        // Callbacks ausserhalb des Locks aufrufen, damit sie den Store
        // selbst lesen oder (ab)melden koennen
        let callbacks: Vec<Callback<T>> = self
            .inner
            .abonnenten
            .lock()
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for cb in callbacks {
            if self.inner.version.load(Ordering::SeqCst) != version {
                break;
            }
            cb(&wert);
        }
    }

    /// Aktueller Wert
    pub fn wert(&self) -> T {
        self.inner.wert.read().clone()
    }

    /// Registriert einen Callback; er wird sofort mit dem aktuellen Wert
    /// aufgerufen und danach bei jedem `setzen`.
    ///
    /// Das Abonnement endet wenn das zurueckgegebene Handle gedroppt wird.
    #[must_use = "Abonnement endet beim Drop des Handles"]
    pub fn abonnieren<F>(&self, callback: F) -> Abonnement
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.inner.naechste_id.fetch_add(1, Ordering::Relaxed);
        let callback: Callback<T> = Arc::new(callback);

        let aktuell = self.wert();
        callback(&aktuell);

        self.inner.abonnenten.lock().push((id, callback));

        let schwach: Weak<StoreInner<T>> = Arc::downgrade(&self.inner);
        Abonnement {
            abmelden: Some(Box::new(move || {
                if let Some(inner) = schwach.upgrade() {
                    inner.abonnenten.lock().retain(|(i, _)| *i != id);
                }
            })),
        }
    }

    /// Empfaenger fuer async Konsumenten
    pub fn beobachten(&self) -> watch::Receiver<T> {
        self.inner.watch_tx.subscribe()
    }

    /// Anzahl registrierter Callbacks
    pub fn anzahl_abonnenten(&self) -> usize {
        self.inner.abonnenten.lock().len()
    }
}

/// Handle auf ein Store-Abonnement
pub struct Abonnement {
    abmelden: Option<Box<dyn FnOnce() + Send>>,
}

impl Abonnement {
    /// Beendet das Abonnement sofort
    pub fn abmelden(mut self) {
        if let Some(f) = self.abmelden.take() {
            f();
        }
    }
}

impl Drop for Abonnement {
    fn drop(&mut self) {
        if let Some(f) = self.abmelden.take() {
            f();
        }
    }
}

impl std::fmt::Debug for Abonnement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Abonnement")
            .field("aktiv", &self.abmelden.is_some())
            .finish()
    }
}
