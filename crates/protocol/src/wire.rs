//! Wire-Format fuer TCP-Verbindungen
//!
//! Es gibt weder Laengenpraefix noch Trennzeichen. Ein einzelner `read`
//! mit einem Puffer von hoechstens `PUFFER_GROESSE` Bytes gilt als eine
//! Nachricht.
//!
//! ## Broadcast-Frame
//!
//! ```text
//! "[" + absender + "] " + nachricht
//! ```
//!
//! Die Nachricht wird unveraendert angehaengt, ohne Escaping.
//!
//! ## Grenzen
//!
//! Laengere Nachrichten werden auf mehrere Reads verteilt und kommen beim
//! Empfaenger als mehrere Broadcasts an. Mehrere kurze Writes koennen
//! umgekehrt in einem Read zusammenfallen. Beides ist gewolltes Verhalten
//! dieses Protokolls.

use bytes::{BufMut, Bytes, BytesMut};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use schwatz_core::{Absender, Benutzername};

// ---------------------------------------------------------------------------
// Konstanten
// ---------------------------------------------------------------------------

/// Standard-Obergrenze fuer einen einzelnen Read
pub const PUFFER_GROESSE: usize = 1024;

// ---------------------------------------------------------------------------
// Frames
// ---------------------------------------------------------------------------

/// Baut den Broadcast-Frame `[absender] nachricht`
pub fn frame_bauen(absender: &Absender, nachricht: &[u8]) -> Bytes {
    let name = absender.anzeigename();
    let mut frame = BytesMut::with_capacity(name.len() + 3 + nachricht.len());
    frame.put_u8(b'[');
    frame.put_slice(name.as_bytes());
    frame.put_slice(b"] ");
    frame.put_slice(nachricht);
    frame.freeze()
}

/// Text der Beitrittsmeldung
pub fn beitritt_text(name: &Benutzername) -> Bytes {
    Bytes::from(format!("User {name} has joined the server"))
}

/// Text der Austrittsmeldung
pub fn austritt_text(name: &Benutzername) -> Bytes {
    Bytes::from(format!("User {name} has left the server"))
}

// ---------------------------------------------------------------------------
// Lesen / Schreiben
// ---------------------------------------------------------------------------

/// Fuehrt genau einen Read mit einem Puffer von `max_groesse` Bytes aus
///
/// Gibt `Ok(None)` zurueck wenn die Gegenseite die Verbindung geschlossen
/// hat. Ein Wert von 0 fuer `max_groesse` wird auf 1 angehoben.
pub async fn nachricht_lesen<R>(reader: &mut R, max_groesse: usize) -> io::Result<Option<Bytes>>
where
    R: AsyncRead + Unpin,
{
    let mut puffer = BytesMut::zeroed(max_groesse.max(1));
    let gelesen = reader.read(&mut puffer[..]).await?;
    if gelesen == 0 {
        return Ok(None);
    }
    puffer.truncate(gelesen);
    Ok(Some(puffer.freeze()))
}

/// Schreibt eine Nachricht vollstaendig und flusht den Writer
pub async fn nachricht_schreiben<W>(writer: &mut W, nachricht: &[u8]) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(nachricht).await?;
    writer.flush().await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
