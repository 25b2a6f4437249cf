//! Broadcaster – Verteilt Nachrichten an alle registrierten Sitzungen
//!
//! Jede Nachricht wird als `[absender] nachricht` an alle Namen aus einer
//! Momentaufnahme der Registry geschrieben. Schlaegt ein Write fehl, gilt
//! der Empfaenger als getrennt: er wird entfernt und sein Austritt wird
//! als weiterer Broadcast angekuendigt.
//!
//! ## Austritte ohne Rekursion
//! Austrittsmeldungen landen in einer lokalen Warteschlange und werden
//! nach dem laufenden Broadcast abgearbeitet. Ein Name wird nur von dem
//! Aufrufer angekuendigt, dessen `entfernen` erfolgreich war. Auch wenn
//! alle Empfaenger gleichzeitig ausfallen, endet die Schleife, weil jeder
//! Austritt die Registry um einen Namen verkleinert.

use std::collections::VecDeque;
use std::sync::Arc;

use bytes::Bytes;
use schwatz_core::{Absender, Benutzername};
use schwatz_protocol::wire::{austritt_text, beitritt_text, frame_bauen};

use crate::error::{SignalingError, SignalingResult};
use crate::registry::Registry;
use crate::session::Sitzung;

/// Ergebnis eines Broadcasts
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BroadcastBericht {
    /// Anzahl erfolgreicher Zustellungen der urspruenglichen Nachricht
    pub zugestellt: usize,
    /// Benutzer, die waehrend des Broadcasts als getrennt entfernt wurden
    pub entfernt: Vec<Benutzername>,
}

/// Zentraler Broadcaster fuer alle verbundenen Clients
///
/// Clone teilt die Registry.
#[derive(Clone)]
pub struct Broadcaster {
    registry: Registry,
}

impl Broadcaster {
    /// Erstellt einen Broadcaster ueber der gegebenen Registry
    pub fn neu(registry: Registry) -> Self {
        Self { registry }
    }

    /// Sendet eine Nachricht an einen einzelnen Benutzer
    ///
    /// Fehler werden nicht behandelt, sondern an den Aufrufer gegeben.
    pub async fn an_benutzer_senden(&self, name: &Benutzername, daten: &[u8]) -> SignalingResult<()> {
        let sitzung = self
            .registry
            .holen(name)
            .ok_or_else(|| SignalingError::BenutzerUnbekannt(name.to_string()))?;
        sitzung.schreiben(daten).await
    }

    /// Sendet eine Nachricht an alle registrierten Benutzer
    ///
    /// Ein Benutzer-Absender bekommt seine eigene Nachricht nicht zurueck,
    /// Servermeldungen gehen an alle.
    pub async fn senden(&self, absender: Absender, nachricht: Bytes) -> BroadcastBericht {
        let mut bericht = BroadcastBericht::default();
        let mut warteschlange = VecDeque::from([(absender, nachricht)]);
        let mut urspruenglich = true;

        while let Some((absender, nachricht)) = warteschlange.pop_front() {
            let frame = frame_bauen(&absender, &nachricht);
            tracing::debug!(
                absender = %absender,
                nachricht = %String::from_utf8_lossy(&frame),
                "Broadcast"
            );

            for name in self.registry.benutzernamen_snapshot() {
                if absender.ist_benutzer(&name) {
                    continue;
                }

                match self.an_benutzer_senden(&name, &frame).await {
                    Ok(()) => {
                        if urspruenglich {
                            bericht.zugestellt += 1;
                        }
                    }
                    Err(SignalingError::BenutzerUnbekannt(_)) | Err(SignalingError::VerbindungGeschlossen) => {
                        // Zwischen Snapshot und Zustellung entfernt
                        tracing::debug!(benutzer = %name, "Empfaenger bereits entfernt, uebersprungen");
                    }
                    Err(e) => {
                        tracing::warn!(benutzer = %name, fehler = %e, "Zustellung fehlgeschlagen, Benutzer wird entfernt");
                        if self.austragen(&name).await.is_ok() {
                            bericht.entfernt.push(name.clone());
                            warteschlange.push_back((Absender::Server, austritt_text(&name)));
                        }
                    }
                }
            }

            urspruenglich = false;
        }

        bericht
    }

    /// Kuendigt einen neuen Benutzer an
    pub async fn beitritt_melden(&self, name: &Benutzername) -> BroadcastBericht {
        self.senden(Absender::Server, beitritt_text(name)).await
    }

    /// Entfernt einen Benutzer und kuendigt seinen Austritt an
    ///
    /// `BenutzerUnbekannt` heisst, dass jemand anderes schneller war und
    /// den Austritt bereits angekuendigt hat.
    pub async fn abmelden(&self, name: &Benutzername) -> SignalingResult<BroadcastBericht> {
        self.austragen(name).await?;
        Ok(self.senden(Absender::Server, austritt_text(name)).await)
    }

    async fn austragen(&self, name: &Benutzername) -> SignalingResult<Arc<Sitzung>> {
        let sitzung = self.registry.entfernen(name).await?;
        tracing::info!(
            benutzer = %name,
            sitzung = %sitzung.id(),
            dauer_sek = sitzung.dauer_sek(),
            "Benutzer hat den Server verlassen"
        );
        Ok(sitzung)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, DuplexStream};

    fn name(n: &str) -> Benutzername {
        Benutzername::neu(n).unwrap()
    }

    /// Registriert einen Benutzer und gibt die Client-Seite zurueck
    fn verbinden(registry: &Registry, n: &str) -> DuplexStream {
        let (client, server) = tokio::io::duplex(4096);
        registry
            .hinzufuegen(Sitzung::neu(name(n), Box::new(server)))
            .unwrap();
        client
    }

    /// Schliesst die Serverseite und liest alles, was der Client bekommen hat
    async fn alles_empfangene(registry: &Registry, n: &str, mut client: DuplexStream) -> Vec<u8> {
        registry.entfernen(&name(n)).await.unwrap();
        let mut buf = Vec::new();
        client.read_to_end(&mut buf).await.unwrap();
        buf
    }

    #[tokio::test]
    async fn servermeldung_an_alle_genau_einmal() {
        let registry = Registry::neu();
        let broadcaster = Broadcaster::neu(registry.clone());
        let a = verbinden(&registry, "a");
        let b = verbinden(&registry, "b");
        let c = verbinden(&registry, "c");
        let (mut fremd, fremd_server) = tokio::io::duplex(64);

        let bericht = broadcaster.senden(Absender::Server, Bytes::from_static(b"hallo")).await;
        assert_eq!(bericht.zugestellt, 3);
        assert!(bericht.entfernt.is_empty());

        assert_eq!(alles_empfangene(&registry, "a", a).await, b"[SERVER] hallo");
        assert_eq!(alles_empfangene(&registry, "b", b).await, b"[SERVER] hallo");
        assert_eq!(alles_empfangene(&registry, "c", c).await, b"[SERVER] hallo");

        // Nicht registrierter Client bekommt nichts
        drop(fremd_server);
        let mut buf = Vec::new();
        fremd.read_to_end(&mut buf).await.unwrap();
        assert!(buf.is_empty());
    }

    #[tokio::test]
    async fn absender_bekommt_eigene_nachricht_nicht() {
        let registry = Registry::neu();
        let broadcaster = Broadcaster::neu(registry.clone());
        let alice = verbinden(&registry, "alice");
        let bob = verbinden(&registry, "bob");

        let bericht = broadcaster
            .senden(Absender::Benutzer(name("alice")), Bytes::from_static(b"hi"))
            .await;
        assert_eq!(bericht.zugestellt, 1);

        assert_eq!(alles_empfangene(&registry, "bob", bob).await, b"[alice] hi");
        assert!(alles_empfangene(&registry, "alice", alice).await.is_empty());
    }

    #[tokio::test]
    async fn fehlgeschlagene_zustellung_entfernt_und_meldet_austritt() {
        let registry = Registry::neu();
        let broadcaster = Broadcaster::neu(registry.clone());
        let a = verbinden(&registry, "a");
        let b = verbinden(&registry, "b");
        let c = verbinden(&registry, "c");

        // b ist tot
        drop(b);

        let bericht = broadcaster.senden(Absender::Server, Bytes::from_static(b"M")).await;
        assert_eq!(bericht.zugestellt, 2);
        assert_eq!(bericht.entfernt, vec![name("b")]);
        assert!(!registry.enthaelt(&name("b")));

        let erwartet: &[u8] = b"[SERVER] M[SERVER] User b has left the server";
        assert_eq!(alles_empfangene(&registry, "a", a).await, erwartet);
        assert_eq!(alles_empfangene(&registry, "c", c).await, erwartet);
    }

    #[tokio::test]
    async fn alle_empfaenger_tot_terminiert() {
        let registry = Registry::neu();
        let broadcaster = Broadcaster::neu(registry.clone());
        for n in ["a", "b", "c", "d"] {
            drop(verbinden(&registry, n));
        }

        let bericht = broadcaster.senden(Absender::Server, Bytes::from_static(b"M")).await;
        assert_eq!(bericht.zugestellt, 0);
        assert_eq!(bericht.entfernt.len(), 4);
        assert_eq!(registry.anzahl(), 0);
    }

    #[tokio::test]
    async fn abmelden_meldet_austritt_an_die_anderen() {
        let registry = Registry::neu();
        let broadcaster = Broadcaster::neu(registry.clone());
        let alice = verbinden(&registry, "alice");
        let mut bob = verbinden(&registry, "bob");

        let bericht = broadcaster.abmelden(&name("bob")).await.unwrap();
        assert_eq!(bericht.zugestellt, 1);

        assert_eq!(
            alles_empfangene(&registry, "alice", alice).await,
            b"[SERVER] User bob has left the server"
        );
        let mut buf = Vec::new();
        bob.read_to_end(&mut buf).await.unwrap();
        assert!(buf.is_empty(), "bob darf seinen eigenen Austritt nicht bekommen");
    }

    #[tokio::test]
    async fn doppeltes_abmelden_meldet_nur_einmal() {
        let registry = Registry::neu();
        let broadcaster = Broadcaster::neu(registry.clone());
        let alice = verbinden(&registry, "alice");
        let _bob = verbinden(&registry, "bob");

        broadcaster.abmelden(&name("bob")).await.unwrap();
        let err = broadcaster.abmelden(&name("bob")).await.unwrap_err();
        assert!(matches!(err, SignalingError::BenutzerUnbekannt(_)));

        assert_eq!(
            alles_empfangene(&registry, "alice", alice).await,
            b"[SERVER] User bob has left the server"
        );
    }

    #[tokio::test]
    async fn an_unbekannten_benutzer_senden() {
        let registry = Registry::neu();
        let broadcaster = Broadcaster::neu(registry);

        let err = broadcaster.an_benutzer_senden(&name("niemand"), b"x").await.unwrap_err();
        assert!(matches!(err, SignalingError::BenutzerUnbekannt(_)));
    }

    #[tokio::test]
    async fn beitritt_geht_auch_an_den_neuen() {
        let registry = Registry::neu();
        let broadcaster = Broadcaster::neu(registry.clone());
        let alice = verbinden(&registry, "alice");

        broadcaster.beitritt_melden(&name("alice")).await;
        assert_eq!(
            alles_empfangene(&registry, "alice", alice).await,
            b"[SERVER] User alice has joined the server"
        );
    }
}
