//! Client-Connection – Lese-Task einer registrierten Sitzung
//!
//! Jede Sitzung bekommt nach dem Handshake eine `ClientConnection` in
//! einem eigenen tokio-Task. Der Task liest nur, geschrieben wird auf die
//! eigene Verbindung ausschliesslich vom Broadcaster.
//!
//! ## State Machine
//! ```text
//! Aktiv --(Read ok)--> Broadcast --> Aktiv
//!   |
//!   +--(Read-Fehler / EOF)--> abmelden --> Beendet
//!   +--(Registry schliesst)-------------> Beendet
//! ```

use std::sync::Arc;

use schwatz_core::Absender;
use schwatz_protocol::nachricht_lesen;
use tokio::io::AsyncRead;

use crate::broadcast::Broadcaster;
use crate::error::SignalingError;
use crate::session::Sitzung;

/// Zustand des Verbindungs-Tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbindungsZustand {
    /// Liest und leitet weiter
    Aktiv,
    /// Sitzung beendet, Task endet
    Beendet,
}

/// Verarbeitet die Leseseite einer registrierten Sitzung
pub struct ClientConnection {
    sitzung: Arc<Sitzung>,
    broadcaster: Broadcaster,
    puffer_groesse: usize,
}

impl ClientConnection {
    /// Erstellt eine neue ClientConnection
    pub fn neu(sitzung: Arc<Sitzung>, broadcaster: Broadcaster, puffer_groesse: usize) -> Self {
        Self {
            sitzung,
            broadcaster,
            puffer_groesse,
        }
    }

    /// Startet die Leseschleife
    ///
    /// Laeuft bis die Verbindung bricht oder die Registry die Sitzung
    /// schliesst. Nachrichten eines Benutzers werden in Empfangsreihenfolge
    /// weitergeleitet.
    pub async fn verarbeiten<R>(self, mut leser: R) -> VerbindungsZustand
    where
        R: AsyncRead + Unpin,
    {
        let name = self.sitzung.benutzername().clone();
        let absender = Absender::Benutzer(name.clone());
        let mut geschlossen = self.sitzung.geschlossen_signal();

        if self.sitzung.ist_geschlossen() {
            return VerbindungsZustand::Beendet;
        }

        let mut zustand = VerbindungsZustand::Aktiv;
        while zustand == VerbindungsZustand::Aktiv {
            tokio::select! {
                // Schliessen geht vor: eine entfernte Sitzung leitet nichts mehr weiter
                biased;

                _ = geschlossen.changed() => {
                    tracing::debug!(benutzer = %name, "Sitzung von der Registry geschlossen");
                    zustand = VerbindungsZustand::Beendet;
                }

                ergebnis = nachricht_lesen(&mut leser, self.puffer_groesse) => {
                    match ergebnis {
                        Ok(Some(_)) if self.sitzung.ist_geschlossen() => {
                            tracing::debug!(benutzer = %name, "Nachricht nach dem Entfernen verworfen");
                            zustand = VerbindungsZustand::Beendet;
                        }
                        Ok(Some(nachricht)) => {
                            tracing::trace!(benutzer = %name, bytes = nachricht.len(), "Nachricht empfangen");
                            self.broadcaster.senden(absender.clone(), nachricht).await;
                        }
                        Ok(None) => {
                            tracing::info!(benutzer = %name, "Verbindung vom Client getrennt");
                            zustand = VerbindungsZustand::Beendet;
                        }
                        Err(e) => {
                            tracing::warn!(benutzer = %name, fehler = %e, "Lesefehler, Benutzer wird entfernt");
                            zustand = VerbindungsZustand::Beendet;
                        }
                    }

                    if zustand == VerbindungsZustand::Beendet && !self.sitzung.ist_geschlossen() {
                        self.abmelden().await;
                    }
                }
            }
        }

        tracing::debug!(benutzer = %name, sitzung = %self.sitzung.id(), "Verbindungs-Task beendet");
        zustand
    }

    async fn abmelden(&self) {
        let name = self.sitzung.benutzername();
        match self.broadcaster.abmelden(name).await {
            Ok(_) => {}
            Err(SignalingError::BenutzerUnbekannt(_)) => {
                tracing::debug!(benutzer = %name, "Benutzer war bereits entfernt");
            }
            Err(e) => {
                tracing::warn!(benutzer = %name, fehler = %e, "Abmelden fehlgeschlagen");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use schwatz_core::Benutzername;
    use schwatz_protocol::nachricht_schreiben;
    use tokio::io::{AsyncReadExt, DuplexStream};

    fn name(n: &str) -> Benutzername {
        Benutzername::neu(n).unwrap()
    }

    /// Registriert eine Sitzung; gibt Client-Seite und Server-Leseseite zurueck
    fn verbinden(registry: &Registry, n: &str) -> (DuplexStream, Arc<Sitzung>, tokio::io::ReadHalf<DuplexStream>) {
        let (client, server) = tokio::io::duplex(4096);
        let (leser, schreiber) = tokio::io::split(server);
        let sitzung = Sitzung::neu(name(n), Box::new(schreiber));
        registry.hinzufuegen(Arc::clone(&sitzung)).unwrap();
        (client, sitzung, leser)
    }

    async fn genau_lesen(client: &mut DuplexStream, erwartet: &[u8]) {
        let mut buf = vec![0u8; erwartet.len()];
        client.read_exact(&mut buf).await.unwrap();
        assert_eq!(String::from_utf8_lossy(&buf), String::from_utf8_lossy(erwartet));
    }

    #[tokio::test]
    async fn nachrichten_werden_weitergeleitet() {
        let registry = Registry::neu();
        let broadcaster = Broadcaster::neu(registry.clone());
        let (mut alice, alice_sitzung, alice_leser) = verbinden(&registry, "alice");
        let (mut bob, _bob_sitzung, _bob_leser) = verbinden(&registry, "bob");

        let task = tokio::spawn(
            ClientConnection::neu(alice_sitzung, broadcaster.clone(), 1024).verarbeiten(alice_leser),
        );

        nachricht_schreiben(&mut alice, b"hi").await.unwrap();
        genau_lesen(&mut bob, b"[alice] hi").await;

        nachricht_schreiben(&mut alice, b"zwei").await.unwrap();
        genau_lesen(&mut bob, b"[alice] zwei").await;

        // alice trennt: Task meldet den Austritt an bob
        drop(alice);
        genau_lesen(&mut bob, b"[SERVER] User alice has left the server").await;

        assert_eq!(task.await.unwrap(), VerbindungsZustand::Beendet);
        assert!(!registry.enthaelt(&name("alice")));
    }

    #[tokio::test]
    async fn registry_schliessen_beendet_task() {
        let registry = Registry::neu();
        let broadcaster = Broadcaster::neu(registry.clone());
        let (_alice, alice_sitzung, alice_leser) = verbinden(&registry, "alice");
        let (mut bob, _bob_sitzung, _bob_leser) = verbinden(&registry, "bob");

        let task = tokio::spawn(
            ClientConnection::neu(alice_sitzung, broadcaster.clone(), 1024).verarbeiten(alice_leser),
        );

        // Entfernen ohne Ankuendigung, z.B. nach fehlgeschlagener Zustellung
        registry.entfernen(&name("alice")).await.unwrap();
        assert_eq!(task.await.unwrap(), VerbindungsZustand::Beendet);

        // Der Task hat keinen zweiten Austritt gemeldet
        registry.entfernen(&name("bob")).await.unwrap();
        let mut rest = Vec::new();
        bob.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());
    }

    #[tokio::test]
    async fn nach_dem_entfernen_wird_nichts_weitergeleitet() {
        for _ in 0..20 {
            let registry = Registry::neu();
            let broadcaster = Broadcaster::neu(registry.clone());
            let (mut alice, alice_sitzung, alice_leser) = verbinden(&registry, "alice");
            let (mut bob, _bob_sitzung, _bob_leser) = verbinden(&registry, "bob");

            let task = tokio::spawn(
                ClientConnection::neu(alice_sitzung, broadcaster.clone(), 1024).verarbeiten(alice_leser),
            );
            // Task wartet jetzt im select auf Daten oder Schliessen
            tokio::task::yield_now().await;

            // Daten und Schliessen sind gleichzeitig bereit
            nachricht_schreiben(&mut alice, b"x").await.unwrap();
            registry.entfernen(&name("alice")).await.unwrap();
            assert_eq!(task.await.unwrap(), VerbindungsZustand::Beendet);

            registry.entfernen(&name("bob")).await.unwrap();
            let mut rest = Vec::new();
            bob.read_to_end(&mut rest).await.unwrap();
            assert!(rest.is_empty(), "bob hat {:?} bekommen", String::from_utf8_lossy(&rest));
        }
    }

    #[tokio::test]
    async fn bereits_geschlossene_sitzung_endet_sofort() {
        let registry = Registry::neu();
        let broadcaster = Broadcaster::neu(registry.clone());
        let (_alice, alice_sitzung, alice_leser) = verbinden(&registry, "alice");
        registry.entfernen(&name("alice")).await.unwrap();

        let zustand = ClientConnection::neu(alice_sitzung, broadcaster, 1024)
            .verarbeiten(alice_leser)
            .await;
        assert_eq!(zustand, VerbindungsZustand::Beendet);
    }

    #[tokio::test]
    async fn lange_nachricht_wird_in_teilen_weitergeleitet() {
        let registry = Registry::neu();
        let broadcaster = Broadcaster::neu(registry.clone());
        let (mut alice, alice_sitzung, alice_leser) = verbinden(&registry, "alice");
        let (mut bob, _bob_sitzung, _bob_leser) = verbinden(&registry, "bob");

        tokio::spawn(ClientConnection::neu(alice_sitzung, broadcaster, 4).verarbeiten(alice_leser));

        nachricht_schreiben(&mut alice, b"abcdef").await.unwrap();
        genau_lesen(&mut bob, b"[alice] abcd").await;
        genau_lesen(&mut bob, b"[alice] ef").await;
    }
}
