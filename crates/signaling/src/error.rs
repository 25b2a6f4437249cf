//! Fehlertypen fuer den Signaling-Service

use thiserror::Error;

/// Fehlertyp fuer den Signaling-Service
#[derive(Debug, Error)]
pub enum SignalingError {
    /// Benutzername ist bereits registriert
    #[error("Benutzer existiert bereits: {0}")]
    BenutzerExistiert(String),

    /// Benutzername ist nicht (mehr) registriert
    #[error("Benutzer unbekannt: {0}")]
    BenutzerUnbekannt(String),

    /// IO-Fehler beim Lesen oder Schreiben einer Verbindung
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    /// Verbindung wurde bereits durch die Registry geschlossen
    #[error("Verbindung geschlossen")]
    VerbindungGeschlossen,

    /// Handshake abgebrochen, bevor der Benutzer registriert wurde
    #[error("Handshake abgebrochen: {0}")]
    Handshake(String),

    /// Listener konnte nicht gebunden werden
    #[error("Listener konnte nicht gestartet werden: {0}")]
    Lauschen(#[source] std::io::Error),

    /// accept() auf dem Listener ist fehlgeschlagen
    #[error("Verbindung konnte nicht angenommen werden: {0}")]
    Annehmen(#[source] std::io::Error),
}

impl SignalingError {
    /// Erstellt einen Handshake-Fehler
    pub fn handshake(msg: impl Into<String>) -> Self {
        Self::Handshake(msg.into())
    }

    /// Gibt true zurueck wenn der Fehler den ganzen Server beendet
    pub fn ist_fatal(&self) -> bool {
        matches!(self, Self::Lauschen(_) | Self::Annehmen(_))
    }
}

/// Result-Typ fuer den Signaling-Service
pub type SignalingResult<T> = Result<T, SignalingError>;
