//! Fehlertypen fuer die gemeinsamen Typen

use thiserror::Error;

/// Result-Alias fuer schwatz-core
pub type Result<T> = std::result::Result<T, CoreError>;

/// Fehler beim Bilden der gemeinsamen Typen
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Benutzername darf nicht leer sein")]
    LeererBenutzername,

    #[error("Benutzername ist kein gueltiges UTF-8")]
    KeinUtf8,
}
