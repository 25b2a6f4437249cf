//! Logging fuer Server und Client
//!
//! Level und Format kommen aus der Konfiguration, `SCHWATZ_LOG_LEVEL` und
//! `SCHWATZ_LOG_FORMAT` ueberschreiben sie. Geschrieben wird immer nach
//! stderr: stdout gehoert dem Chat des Clients.

use std::str::FromStr;

use tracing_subscriber::{fmt, EnvFilter};

/// Umgebungsvariable fuer den Log-Filter
pub const LOG_LEVEL_ENV: &str = "SCHWATZ_LOG_LEVEL";

/// Umgebungsvariable fuer das Log-Format
pub const LOG_FORMAT_ENV: &str = "SCHWATZ_LOG_FORMAT";

/// Rueckfall, wenn kein gueltiger Filter angegeben ist
const STANDARD_FILTER: &str = "info";

/// Ausgabeformat der Log-Zeilen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Menschenlesbar, eine Zeile pro Ereignis
    #[default]
    Text,
    /// Ein JSON-Objekt pro Zeile
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(wert: &str) -> Result<Self, Self::Err> {
        match wert {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            anderes => Err(format!("unbekanntes Log-Format '{anderes}'")),
        }
    }
}

/// Prueft ob ein Wert als `EnvFilter` taugt (`info`, `schwatz_signaling=debug`, ...)
pub fn filter_gueltig(filter: &str) -> bool {
    !filter.is_empty() && EnvFilter::try_new(filter).is_ok()
}

/// Wirksamer Filter: Umgebung vor Konfiguration, sonst `info`
fn filter_bestimmen(konfiguriert: &str) -> EnvFilter {
    std::env::var(LOG_LEVEL_ENV)
        .ok()
        .into_iter()
        .chain(std::iter::once(konfiguriert.to_string()))
        .find(|kandidat| filter_gueltig(kandidat))
        .and_then(|kandidat| EnvFilter::try_new(kandidat).ok())
        .unwrap_or_else(|| EnvFilter::new(STANDARD_FILTER))
}

/// Wirksames Format: Umgebung vor Konfiguration, Unbekanntes wird zu `Text`
fn format_bestimmen(konfiguriert: &str) -> LogFormat {
    std::env::var(LOG_FORMAT_ENV)
        .ok()
        .and_then(|wert| wert.parse().ok())
        .or_else(|| konfiguriert.parse().ok())
        .unwrap_or_default()
}

/// Installiert den globalen Subscriber.
///
/// Ein bereits installierter Subscriber bleibt bestehen.
pub fn logging_initialisieren(level: &str, format: &str) {
    let filter = filter_bestimmen(level);

    let ergebnis = match format_bestimmen(format) {
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .try_init(),
        LogFormat::Text => fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    if let Err(e) = ergebnis {
        tracing::debug!(fehler = %e, "Logging war bereits initialisiert");
    }
}
