//! Handshake mit dem Server
//!
//! Der Benutzername geht als allererste Nachricht raus, ohne Trennzeichen.
//! Die erste Antwort des Servers entscheidet ueber Zusage oder Absage.

use schwatz_core::Benutzername;
use schwatz_protocol::{nachricht_lesen, nachricht_schreiben, HandshakeAntwort};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::{ClientError, ClientResult};

/// Ergebnis des Handshakes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anmeldung {
    /// Klassifizierte Antwort
    pub antwort: HandshakeAntwort,
    /// Rohtext der ersten Server-Nachricht
    pub text: String,
}

/// Schickt den Benutzernamen und wartet auf die erste Antwort
pub async fn anmelden<S>(stream: &mut S, benutzername: &Benutzername, puffer_groesse: usize) -> ClientResult<Anmeldung>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    nachricht_schreiben(stream, benutzername.as_str().as_bytes()).await?;

    let antwort = nachricht_lesen(stream, puffer_groesse)
        .await?
        .ok_or(ClientError::VerbindungGetrennt)?;

    Ok(Anmeldung {
        antwort: HandshakeAntwort::aus_bytes(&antwort),
        text: String::from_utf8_lossy(&antwort).into_owned(),
    })
}
