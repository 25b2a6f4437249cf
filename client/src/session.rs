//! Laufende Chat-Sitzung
//!
//! Nach dem Handshake laufen Empfangen und Senden als eigene Tasks.
//! Bricht die Verbindung in einer Richtung, endet die ganze Sitzung.
//! Ist nur die Konsoleneingabe erschoepft, wird weiter empfangen.

use schwatz_protocol::{nachricht_lesen, nachricht_schreiben};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};

/// Warum eine Sitzung geendet hat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Beendigung {
    /// Server hat die Verbindung geschlossen
    ServerGetrennt,
    /// Empfangen oder Ausgeben fehlgeschlagen
    EmpfangFehlgeschlagen,
    /// Senden oder Konsoleneingabe fehlgeschlagen
    SendenFehlgeschlagen,
}

/// Gibt jede empfangene Nachricht als eigene Zeile aus.
///
/// Endet mit `Ok` wenn der Server schliesst.
pub async fn nachrichten_lesen<R, A>(mut leser: R, mut ausgabe: A, puffer_groesse: usize) -> ClientResult<()>
where
    R: AsyncRead + Unpin,
    A: AsyncWrite + Unpin,
{
    while let Some(nachricht) = nachricht_lesen(&mut leser, puffer_groesse).await? {
        ausgabe.write_all(&nachricht).await.map_err(ClientError::Ausgabe)?;
        ausgabe.write_all(b"\n").await.map_err(ClientError::Ausgabe)?;
        ausgabe.flush().await.map_err(ClientError::Ausgabe)?;
    }
    Ok(())
}

/// Schickt jede Eingabezeile ohne Zeilenende als eine Nachricht.
///
/// Leere Zeilen werden uebersprungen. Endet mit `Ok` bei Ende der Eingabe.
pub async fn nachrichten_senden<E, W>(eingabe: E, mut schreiber: W) -> ClientResult<()>
where
    E: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut zeilen = eingabe.lines();
    while let Some(zeile) = zeilen.next_line().await.map_err(ClientError::Eingabe)? {
        if zeile.is_empty() {
            continue;
        }
        nachricht_schreiben(&mut schreiber, zeile.as_bytes()).await?;
    }
    Ok(())
}

/// Fuehrt eine angemeldete Sitzung aus bis eine Richtung abbricht
pub async fn sitzung_ausfuehren<S, E, A>(stream: S, eingabe: E, ausgabe: A, puffer_groesse: usize) -> Beendigung
where
    S: AsyncRead + AsyncWrite + Send + 'static,
    E: AsyncBufRead + Send + Unpin + 'static,
    A: AsyncWrite + Send + Unpin + 'static,
{
    let (leser, schreiber) = tokio::io::split(stream);

    let mut empfang = tokio::spawn(nachrichten_lesen(leser, ausgabe, puffer_groesse));
    let mut versand = tokio::spawn(nachrichten_senden(eingabe, schreiber));

    tokio::select! {
        ergebnis = &mut empfang => {
            versand.abort();
            empfang_auswerten(ergebnis)
        }
        ergebnis = &mut versand => match ergebnis {
            Ok(Ok(())) => {
                debug!("Eingabe beendet, empfange weiter");
                empfang_auswerten(empfang.await)
            }
            Ok(Err(e)) => {
                warn!(fehler = %e, "Senden fehlgeschlagen");
                empfang.abort();
                Beendigung::SendenFehlgeschlagen
            }
            Err(e) => {
                warn!(fehler = %e, "Sende-Task abgebrochen");
                empfang.abort();
                Beendigung::SendenFehlgeschlagen
            }
        },
    }
}

fn empfang_auswerten(ergebnis: Result<ClientResult<()>, tokio::task::JoinError>) -> Beendigung {
    match ergebnis {
        Ok(Ok(())) => Beendigung::ServerGetrennt,
        Ok(Err(e)) => {
            warn!(fehler = %e, "Empfangen fehlgeschlagen");
            Beendigung::EmpfangFehlgeschlagen
        }
        Err(e) => {
            warn!(fehler = %e, "Empfangs-Task abgebrochen");
            Beendigung::EmpfangFehlgeschlagen
        }
    }
}
