//! Sitzung – Ein verbundener, benannter Client
//!
//! Die Sitzung besitzt die Schreibseite der Verbindung. Geschrieben wird
//! nur ueber `schreiben`, geschlossen nur ueber die Registry. Nach dem
//! Schliessen ist der Schreiber weg (`None`), jeder weitere Schreibversuch
//! liefert `VerbindungGeschlossen` statt einen freigegebenen Handle zu
//! benutzen.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use schwatz_core::Benutzername;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{watch, Mutex, MutexGuard};
use uuid::Uuid;

use crate::error::{SignalingError, SignalingResult};

/// Typ-geloeschte Schreibseite einer Verbindung
pub type VerbindungsSchreiber = Box<dyn AsyncWrite + Send + Sync + Unpin>;

/// Serverseitiger Zustand eines verbundenen Benutzers
pub struct Sitzung {
    id: Uuid,
    benutzername: Benutzername,
    verbunden_seit: DateTime<Utc>,
    schreiber: Mutex<Option<VerbindungsSchreiber>>,
    /// Wird einmalig auf `true` gesetzt, wenn die Registry schliesst
    geschlossen_tx: watch::Sender<bool>,
}

impl Sitzung {
    /// Erstellt eine neue, noch nicht registrierte Sitzung
    pub fn neu(benutzername: Benutzername, schreiber: VerbindungsSchreiber) -> Arc<Self> {
        let (geschlossen_tx, _) = watch::channel(false);
        Arc::new(Self {
            id: Uuid::new_v4(),
            benutzername,
            verbunden_seit: Utc::now(),
            schreiber: Mutex::new(Some(schreiber)),
            geschlossen_tx,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn benutzername(&self) -> &Benutzername {
        &self.benutzername
    }

    /// Sitzungsdauer in Sekunden
    pub fn dauer_sek(&self) -> i64 {
        (Utc::now() - self.verbunden_seit).num_seconds()
    }

    /// Empfaenger fuer das Schliess-Signal
    ///
    /// Erst abonnieren, dann `ist_geschlossen` pruefen, sonst kann ein
    /// Schliessen dazwischen verloren gehen.
    pub fn geschlossen_signal(&self) -> watch::Receiver<bool> {
        self.geschlossen_tx.subscribe()
    }

    pub fn ist_geschlossen(&self) -> bool {
        *self.geschlossen_tx.borrow()
    }

    /// Schreibt eine Nachricht vollstaendig auf die Verbindung
    pub async fn schreiben(&self, daten: &[u8]) -> SignalingResult<()> {
        let mut schreiber = self.schreiber.lock().await;
        match schreiber.as_mut() {
            Some(w) => {
                schwatz_protocol::nachricht_schreiben(w, daten).await?;
                Ok(())
            }
            None => Err(SignalingError::VerbindungGeschlossen),
        }
    }

    /// Sperrt den Schreiber, z.B. damit die Handshake-Antwort vor jedem
    /// Broadcast auf der Leitung liegt
    pub(crate) async fn schreiber_sperren(&self) -> MutexGuard<'_, Option<VerbindungsSchreiber>> {
        self.schreiber.lock().await
    }

    /// Schliesst die Schreibseite und signalisiert dem Verbindungs-Task
    ///
    /// Gibt `true` zurueck wenn dieser Aufruf tatsaechlich geschlossen hat.
    pub(crate) async fn schliessen(&self) -> bool {
        let schreiber = self.schreiber.lock().await.take();
        self.entnommenen_schliessen(schreiber).await
    }

    /// Wie `schliessen`, fuer einen Schreiber der unter der Sperre bereits
    /// entnommen wurde
    pub(crate) async fn entnommenen_schliessen(&self, schreiber: Option<VerbindungsSchreiber>) -> bool {
        self.geschlossen_tx.send_replace(true);

        match schreiber {
            Some(mut w) => {
                if let Err(e) = w.shutdown().await {
                    tracing::debug!(benutzer = %self.benutzername, fehler = %e, "Shutdown der Verbindung fehlgeschlagen");
                }
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for Sitzung {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sitzung")
            .field("id", &self.id)
            .field("benutzername", &self.benutzername)
            .field("verbunden_seit", &self.verbunden_seit)
            .field("geschlossen", &self.ist_geschlossen())
            .finish()
    }
}
