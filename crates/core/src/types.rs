//! Identitaetstypen fuer Schwatz
//!
//! `Benutzername` ist ein Newtype, damit ein ungeprueftes `String` nie
//! versehentlich als Registry-Schluessel landet.

use std::borrow::Borrow;
use std::fmt;

use crate::error::{CoreError, Result};

/// Anzeigename des Servers in Broadcast-Frames
pub const SERVER_NAME: &str = "SERVER";

/// Eindeutiger Benutzername einer Sitzung
///
/// Nicht leer, Gross-/Kleinschreibung wird unterschieden. Der Name wird
/// beim Handshake festgelegt und bleibt fuer die Sitzung unveraenderlich.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Benutzername(String);

impl Benutzername {
    /// Erstellt einen Benutzernamen aus einem String
    pub fn neu(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(CoreError::LeererBenutzername);
        }
        Ok(Self(name))
    }

    /// Dekodiert den Benutzernamen aus den rohen Handshake-Bytes
    ///
    /// Die Bytes werden unveraendert uebernommen, es wird nichts getrimmt.
    pub fn aus_bytes(bytes: &[u8]) -> Result<Self> {
        let name = std::str::from_utf8(bytes).map_err(|_| CoreError::KeinUtf8)?;
        Self::neu(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Benutzername {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Benutzername {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Benutzername {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Herkunft einer Broadcast-Nachricht
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Absender {
    /// Systemmeldung (Join/Leave)
    Server,
    /// Nachricht eines verbundenen Benutzers
    Benutzer(Benutzername),
}

impl Absender {
    /// Name, der im Frame-Praefix erscheint
    pub fn anzeigename(&self) -> &str {
        match self {
            Self::Server => SERVER_NAME,
            Self::Benutzer(name) => name.as_str(),
        }
    }

    /// Prueft ob dieser Absender die Sitzung `name` ist
    ///
    /// Der Server ist nie ein Benutzer, auch wenn jemand "SERVER" heisst.
    pub fn ist_benutzer(&self, name: &Benutzername) -> bool {
        matches!(self, Self::Benutzer(eigener) if eigener == name)
    }
}

impl fmt::Display for Absender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.anzeigename())
    }
}
