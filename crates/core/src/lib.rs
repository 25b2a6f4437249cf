//! schwatz-core – Gemeinsame Typen und Fehlertypen
//!
//! Dieses Crate stellt die Bausteine bereit, die Server, Client und
//! Protokoll gemeinsam nutzen: den validierten Benutzernamen und den
//! Absender einer Nachricht.

pub mod error;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{CoreError, Result};
pub use types::{Absender, Benutzername};
