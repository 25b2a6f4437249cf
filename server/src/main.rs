//! Schwatz Server – Einstiegspunkt
//!
//! Aufruf: `schwatz-server ADDRESS`. Laedt die Konfiguration, initialisiert
//! das Logging und startet den Server. Fehler von Listener oder Accept
//! beenden den Prozess.

use anyhow::Result;
use schwatz_server::{config::ServerConfig, Server};

/// Optionaler Pfad zu einer TOML-Konfigurationsdatei
const CONFIG_ENV: &str = "SCHWATZ_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let [adresse] = args.as_slice() else {
        println!("Usage: schwatz-server ADDRESS");
        return Ok(());
    };

    // Konfigurationsdatei nur wenn explizit angegeben
    let mut config = match std::env::var(CONFIG_ENV) {
        Ok(pfad) => ServerConfig::laden(&pfad)?,
        Err(_) => ServerConfig::default(),
    };
    config.netzwerk.bind_adresse = adresse.clone();

    schwatz_observability::logging_initialisieren(&config.logging.level, &config.logging.format);
    config.pruefen();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        adresse = %config.netzwerk.bind_adresse,
        "Schwatz Server wird initialisiert"
    );

    Server::neu(config).starten().await
}
