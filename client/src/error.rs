//! Fehlertypen fuer den Client

use thiserror::Error;

/// Fehler die bei der Server-Verbindung auftreten koennen
#[derive(Debug, Error)]
pub enum ClientError {
    /// Lesen oder Schreiben auf der TCP-Verbindung fehlgeschlagen
    #[error("Verbindungsfehler: {0}")]
    Io(#[from] std::io::Error),

    /// Server hat vor der Handshake-Antwort geschlossen
    #[error("Server hat die Verbindung geschlossen")]
    VerbindungGetrennt,

    /// Konsoleneingabe nicht lesbar
    #[error("Eingabefehler: {0}")]
    Eingabe(#[source] std::io::Error),

    /// Ausgabe nicht schreibbar
    #[error("Ausgabefehler: {0}")]
    Ausgabe(#[source] std::io::Error),
}

/// Result-Typ fuer den Client
pub type ClientResult<T> = Result<T, ClientError>;
