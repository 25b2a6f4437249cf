//! Handshake – Benutzername anfragen, Zusage oder Absage erhalten
//!
//! Der Client schickt als allererste Nachricht seinen Benutzernamen. Der
//! Server antwortet mit genau einem der beiden festen Texte; bei einer
//! Absage schliesst er die Verbindung danach.

/// Antwort des Servers bei erfolgreicher Anmeldung
pub const VERBUNDEN: &[u8] = b"Connected!";

/// Antwort des Servers wenn der Benutzername bereits vergeben ist
pub const NAME_VERGEBEN: &[u8] =
    b"A user with this username already exists -- please, choose a different one";

/// Klassifizierte Handshake-Antwort aus Sicht des Clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeAntwort {
    /// Benutzername akzeptiert
    Verbunden,
    /// Benutzername bereits vergeben
    NameVergeben,
    /// Etwas anderes (z.B. bereits ein Broadcast im selben Read)
    Unbekannt(String),
}

impl HandshakeAntwort {
    /// Ordnet die erste Server-Nachricht einer Antwort zu
    ///
    /// Da ein Read mehrere Writes zusammenfassen kann, genuegt ein
    /// passender Anfang fuer `Verbunden`.
    pub fn aus_bytes(bytes: &[u8]) -> Self {
        if bytes == NAME_VERGEBEN {
            Self::NameVergeben
        } else if bytes.starts_with(VERBUNDEN) {
            Self::Verbunden
        } else {
            Self::Unbekannt(String::from_utf8_lossy(bytes).into_owned())
        }
    }

    pub fn ist_verbunden(&self) -> bool {
        matches!(self, Self::Verbunden)
    }
}
