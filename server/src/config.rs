//! Server-Konfiguration
//!
//! Alle Felder haben Standardwerte, der Server laeuft also ohne
//! Konfigurationsdatei. Die Adresse von der Kommandozeile ueberschreibt
//! `netzwerk.bind_adresse` immer.

use serde::{Deserialize, Serialize};
use schwatz_signaling::SignalingConfig;

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Verbindungs-Einstellungen
    pub verbindung: VerbindungsEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Listen-Adresse im Format `host:port`
    pub bind_adresse: String,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0:9987".into(),
        }
    }
}

/// Verbindungs-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerbindungsEinstellungen {
    /// Maximale Bytes pro Read; laengere Nachrichten werden aufgeteilt
    pub puffer_groesse: usize,
}

impl Default for VerbindungsEinstellungen {
    fn default() -> Self {
        Self {
            puffer_groesse: SignalingConfig::default().puffer_groesse,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Logging ist hier noch nicht initialisiert
                eprintln!("Konfigurationsdatei '{pfad}' nicht gefunden, verwende Standardwerte");
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Warnt bei Werten, die stillschweigend ersetzt werden
    pub fn pruefen(&self) {
        if !schwatz_observability::filter_gueltig(&self.logging.level) {
            tracing::warn!(level = %self.logging.level, "Ungueltiger Log-Filter, verwende info");
        }
        if self.logging.format.parse::<schwatz_observability::LogFormat>().is_err() {
            tracing::warn!(format = %self.logging.format, "Unbekanntes Log-Format, verwende text");
        }
        if self.verbindung.puffer_groesse == 0 {
            tracing::warn!("puffer_groesse = 0, verwende 1 Byte");
        }
    }

    /// Konfiguration fuer den Signaling-Service
    pub fn signaling_config(&self) -> SignalingConfig {
        SignalingConfig {
            puffer_groesse: self.verbindung.puffer_groesse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn standard_config_ist_valide() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.netzwerk.bind_adresse, "0.0.0.0:9987");
        assert_eq!(cfg.verbindung.puffer_groesse, 1024);
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.logging.format, "text");
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            [verbindung]
            puffer_groesse = 4096

            [logging]
            format = "json"
        "#;
        let cfg: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.verbindung.puffer_groesse, 4096);
        assert_eq!(cfg.logging.format, "json");
        // Nicht angegebene Felder behalten Standardwerte
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.netzwerk.bind_adresse, "0.0.0.0:9987");
    }

    #[test]
    fn signaling_config_uebernimmt_puffergroesse() {
        let mut cfg = ServerConfig::default();
        cfg.verbindung.puffer_groesse = 64;
        assert_eq!(cfg.signaling_config().puffer_groesse(), 64);
    }

    #[test]
    fn laden_aus_datei() {
        let mut datei = tempfile::NamedTempFile::new().unwrap();
        writeln!(datei, "[netzwerk]\nbind_adresse = \"127.0.0.1:7000\"").unwrap();

        let cfg = ServerConfig::laden(datei.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.netzwerk.bind_adresse, "127.0.0.1:7000");
    }

    #[test]
    fn fehlende_datei_ergibt_standardwerte() {
        let cfg = ServerConfig::laden("/gibt/es/nicht/schwatz.toml").unwrap();
        assert_eq!(cfg.verbindung.puffer_groesse, 1024);
    }

    #[test]
    fn kaputte_datei_ist_ein_fehler() {
        let mut datei = tempfile::NamedTempFile::new().unwrap();
        writeln!(datei, "[verbindung]\npuffer_groesse = \"viel\"").unwrap();

        let err = ServerConfig::laden(datei.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("Konfigurationsfehler"));
    }
}
