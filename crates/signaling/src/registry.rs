//! Registry – Wer ist verbunden, unter welchem Namen?
//!
//! Eine einzige `parking_lot::Mutex` schuetzt die gesamte Map. Jede
//! Operation nimmt die Sperre genau einmal und gibt sie vor dem ersten
//! `.await` wieder frei. Damit gibt es keine doppelten Namen, keine
//! verlorenen Entfernungen und keinen halb entfernten Eintrag.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use schwatz_core::Benutzername;

use crate::error::{SignalingError, SignalingResult};
use crate::session::Sitzung;

/// Registry aller aktiven Sitzungen, indiziert nach Benutzername
///
/// Clone teilt den inneren Zustand.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<Mutex<HashMap<Benutzername, Arc<Sitzung>>>>,
}

impl Registry {
    /// Erstellt eine leere Registry
    pub fn neu() -> Self {
        Self::default()
    }

    /// Registriert eine Sitzung unter ihrem Benutzernamen
    ///
    /// Schlaegt mit `BenutzerExistiert` fehl, wenn der Name vergeben ist.
    /// Die bestehende Sitzung bleibt dann unberuehrt.
    pub fn hinzufuegen(&self, sitzung: Arc<Sitzung>) -> SignalingResult<()> {
        use std::collections::hash_map::Entry;

        let mut sitzungen = self.inner.lock();
        match sitzungen.entry(sitzung.benutzername().clone()) {
            Entry::Occupied(eintrag) => {
                tracing::debug!(benutzer = %eintrag.key(), "Benutzer existiert bereits");
                Err(SignalingError::BenutzerExistiert(eintrag.key().to_string()))
            }
            Entry::Vacant(eintrag) => {
                eintrag.insert(sitzung);
                Ok(())
            }
        }
    }

    /// Entfernt eine Sitzung und schliesst ihre Verbindung
    ///
    /// Von zwei gleichzeitigen Aufrufen fuer denselben Namen gewinnt genau
    /// einer, der andere sieht `BenutzerUnbekannt`. Geschlossen wird nur
    /// vom Gewinner.
    pub async fn entfernen(&self, name: &Benutzername) -> SignalingResult<Arc<Sitzung>> {
        let sitzung = match self.herausnehmen(name) {
            Some(s) => s,
            None => {
                tracing::debug!(benutzer = %name, "Benutzer nicht in der Registry");
                return Err(SignalingError::BenutzerUnbekannt(name.to_string()));
            }
        };

        sitzung.schliessen().await;
        Ok(sitzung)
    }

    /// Nimmt eine Sitzung aus der Map, ohne sie zu schliessen
    ///
    /// Fuer Aufrufer, die die Schreibsperre der Sitzung halten und selbst
    /// schliessen.
    pub(crate) fn herausnehmen(&self, name: &Benutzername) -> Option<Arc<Sitzung>> {
        self.inner.lock().remove(name)
    }

    /// Konsistente Momentaufnahme aller registrierten Namen
    pub fn benutzernamen_snapshot(&self) -> Vec<Benutzername> {
        self.inner.lock().keys().cloned().collect()
    }

    /// Gibt die Sitzung zu einem Namen zurueck
    pub fn holen(&self, name: &Benutzername) -> Option<Arc<Sitzung>> {
        self.inner.lock().get(name).cloned()
    }

    /// Prueft ob ein Name registriert ist
    pub fn enthaelt(&self, name: &Benutzername) -> bool {
        self.inner.lock().contains_key(name)
    }

    /// Anzahl der registrierten Sitzungen
    pub fn anzahl(&self) -> usize {
        self.inner.lock().len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
