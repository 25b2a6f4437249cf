//! Gemeinsamer Server-Zustand fuer den Signaling-Service
//!
//! Wird beim Start einmal gebaut und per `Arc` an Accept-Loop und
//! Verbindungs-Tasks verteilt. Kein globaler Zustand: mit dem letzten
//! `Arc` verschwindet auch die Registry.

use std::sync::Arc;

use schwatz_protocol::PUFFER_GROESSE;

use crate::broadcast::Broadcaster;
use crate::registry::Registry;

/// Konfiguration fuer den Signaling-Service
#[derive(Debug, Clone)]
pub struct SignalingConfig {
    /// Obergrenze fuer einen einzelnen Read (Handshake und Nachrichten)
    pub puffer_groesse: usize,
}

impl SignalingConfig {
    /// Effektive Puffergroesse, mindestens 1 Byte
    pub fn puffer_groesse(&self) -> usize {
        self.puffer_groesse.max(1)
    }
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            puffer_groesse: PUFFER_GROESSE,
        }
    }
}

/// Gemeinsamer Server-Zustand (thread-safe, Arc-geteilt)
pub struct SignalingState {
    /// Server-Konfiguration
    pub config: SignalingConfig,
    /// Registry aller Sitzungen
    pub registry: Registry,
    /// Broadcaster ueber derselben Registry
    pub broadcaster: Broadcaster,
}

impl SignalingState {
    /// Erstellt einen neuen SignalingState mit leerer Registry
    pub fn neu(config: SignalingConfig) -> Arc<Self> {
        let registry = Registry::neu();
        Arc::new(Self {
            config,
            broadcaster: Broadcaster::neu(registry.clone()),
            registry,
        })
    }
}
