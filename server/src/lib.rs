//! schwatz-server – Bibliotheks-Root
//!
//! Baut aus der Konfiguration den Signaling-Zustand, bindet den Listener
//! und betreibt die Accept-Loop bis zu einem fatalen Fehler.

pub mod config;

use anyhow::{Context, Result};
use config::ServerConfig;
use schwatz_signaling::{SignalingServer, SignalingState};

/// Haelt den Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Bindet den Listener und nimmt Verbindungen an
    ///
    /// Kehrt nur mit einem Fehler zurueck: entweder konnte nicht gebunden
    /// werden oder `accept` ist fehlgeschlagen.
    pub async fn starten(self) -> Result<()> {
        let adresse = self.config.netzwerk.bind_adresse.clone();
        let listener = SignalingServer::binden(adresse.as_str())
            .await
            .with_context(|| format!("Listener auf '{adresse}' konnte nicht gestartet werden"))?;

        let state = SignalingState::neu(self.config.signaling_config());
        tracing::info!(
            adresse = %adresse,
            puffer_groesse = state.config.puffer_groesse(),
            "Server startet"
        );

        SignalingServer::neu(state)
            .starten(listener)
            .await
            .context("Accept-Loop beendet")
    }
}
