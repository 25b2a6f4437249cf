//! TCP-Listener – Bindet Socket, akzeptiert Verbindungen, Handshake
//!
//! Der `SignalingServer` nimmt Verbindungen an und startet fuer jede einen
//! eigenen tokio-Task. Dort laeuft der Handshake (`verbindung_annehmen`),
//! danach uebernimmt eine `ClientConnection`. Die Accept-Loop selbst wartet
//! nie auf einen dieser Tasks.
//!
//! ## Handshake
//! 1. Genau ein Read: der Inhalt ist der gewuenschte Benutzername
//! 2. Registrieren. Vergeben: Absage schreiben, schliessen. Frei:
//!    `Connected!` schreiben, Beitritt ankuendigen, Lese-Task starten
//!
//! Scheitert Schritt 1, wird die Verbindung ohne Antwort geschlossen.
//!
//! ## Fehler
//! Fehler von `bind` oder `accept` beenden den Server. Alles, was eine
//! einzelne Verbindung betrifft, bleibt in deren Task.

use std::sync::Arc;

use schwatz_core::Benutzername;
use schwatz_protocol::handshake::{NAME_VERGEBEN, VERBUNDEN};
use schwatz_protocol::{nachricht_lesen, nachricht_schreiben};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, ToSocketAddrs};

use crate::connection::ClientConnection;
use crate::error::{SignalingError, SignalingResult};
use crate::server_state::SignalingState;
use crate::session::Sitzung;

/// TCP-Signaling-Server
pub struct SignalingServer {
    state: Arc<SignalingState>,
}

impl SignalingServer {
    /// Erstellt einen neuen SignalingServer
    pub fn neu(state: Arc<SignalingState>) -> Self {
        Self { state }
    }

    /// Bindet den Listener an die gegebene Adresse
    pub async fn binden(adresse: impl ToSocketAddrs) -> SignalingResult<TcpListener> {
        TcpListener::bind(adresse).await.map_err(SignalingError::Lauschen)
    }

    /// Accept-Loop
    ///
    /// Kehrt nur mit einem Fehler zurueck. Ein fehlgeschlagenes `accept`
    /// ist fatal, es wird nicht weiter angenommen.
    pub async fn starten(self, listener: TcpListener) -> SignalingResult<()> {
        let lokale_addr = listener.local_addr().map_err(SignalingError::Lauschen)?;
        tracing::info!(adresse = %lokale_addr, "Bereit, TCP-Server nimmt Verbindungen an");

        loop {
            let (stream, peer_addr) = match listener.accept().await {
                Ok(verbindung) => verbindung,
                Err(e) => {
                    tracing::error!(fehler = %e, "TCP-Accept-Fehler, Server wird beendet");
                    return Err(SignalingError::Annehmen(e));
                }
            };

            tracing::debug!(peer = %peer_addr, "Verbindung akzeptiert");
            let state = Arc::clone(&self.state);

            tokio::spawn(async move {
                match verbindung_annehmen(stream, state).await {
                    Ok(name) => {
                        tracing::info!(peer = %peer_addr, benutzer = %name, "Benutzer angemeldet");
                    }
                    Err(SignalingError::BenutzerExistiert(name)) => {
                        tracing::info!(peer = %peer_addr, benutzer = %name, "Benutzername vergeben, Verbindung abgelehnt");
                    }
                    Err(e) => {
                        tracing::warn!(peer = %peer_addr, fehler = %e, "Handshake fehlgeschlagen");
                    }
                }
            });
        }
    }
}

/// Fuehrt den Handshake auf einer frischen Verbindung durch
///
/// Bei Erfolg ist der Benutzer registriert, angekuendigt und sein
/// Lese-Task laeuft.
pub async fn verbindung_annehmen<S>(stream: S, state: Arc<SignalingState>) -> SignalingResult<Benutzername>
where
    S: AsyncRead + AsyncWrite + Send + Sync + Unpin + 'static,
{
    let puffer_groesse = state.config.puffer_groesse();
    let (mut leser, mut schreiber) = tokio::io::split(stream);

    let name = match benutzername_lesen(&mut leser, puffer_groesse).await {
        Ok(name) => name,
        Err(e) => {
            let _ = schreiber.shutdown().await;
            return Err(e);
        }
    };

    let sitzung = Sitzung::neu(name.clone(), Box::new(schreiber));
    {
        // Sperre halten, bis die Zusage geschrieben ist: kein Broadcast
        // darf vor "Connected!" ankommen.
        let mut schreiber = sitzung.schreiber_sperren().await;

        if let Err(e) = state.registry.hinzufuegen(Arc::clone(&sitzung)) {
            if let Some(w) = schreiber.as_mut() {
                if let Err(fehler) = nachricht_schreiben(w, NAME_VERGEBEN).await {
                    tracing::debug!(benutzer = %name, fehler = %fehler, "Absage konnte nicht gesendet werden");
                }
                let _ = w.shutdown().await;
            }
            return Err(e);
        }

        let zusage = match schreiber.as_mut() {
            Some(w) => nachricht_schreiben(w, VERBUNDEN).await,
            None => Ok(()),
        };
        if let Err(e) = zusage {
            // Noch unter der Sperre austragen: ein wartender Broadcast findet
            // danach keinen Schreiber mehr und meldet keinen Austritt fuer
            // einen nie angekuendigten Benutzer
            if state.registry.herausnehmen(&name).is_none() {
                tracing::debug!(benutzer = %name, "Benutzer war bereits entfernt");
            }
            let entnommen = schreiber.take();
            drop(schreiber);
            sitzung.entnommenen_schliessen(entnommen).await;
            return Err(SignalingError::Io(e));
        }
    }

    state.broadcaster.beitritt_melden(&name).await;

    let verbindung = ClientConnection::neu(Arc::clone(&sitzung), state.broadcaster.clone(), puffer_groesse);
    tokio::spawn(async move {
        verbindung.verarbeiten(leser).await;
    });

    Ok(name)
}

async fn benutzername_lesen<R>(leser: &mut R, puffer_groesse: usize) -> SignalingResult<Benutzername>
where
    R: AsyncRead + Unpin,
{
    let roh = nachricht_lesen(leser, puffer_groesse)
        .await?
        .ok_or_else(|| SignalingError::handshake("Verbindung vor dem Benutzernamen geschlossen"))?;

    Benutzername::aus_bytes(&roh).map_err(|e| SignalingError::handshake(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
