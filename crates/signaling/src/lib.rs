//! schwatz-signaling – TCP-Relay fuer Text-Broadcasts
//!
//! Nimmt TCP-Verbindungen an, vergibt per Handshake einen eindeutigen
//! Benutzernamen und leitet jede Nachricht an alle anderen Verbundenen
//! weiter.
//!
//! ## Architektur
//!
//! ```text
//! TCP Listener (SignalingServer)
//!     |
//!     v
//! Handshake (verbindung_annehmen, pro Verbindung ein Task)
//!     |  Registry.hinzufuegen -> "Connected!" -> Beitritt melden
//!     v
//! ClientConnection (Lese-Task pro Sitzung)
//!     |
//!     v
//! Broadcaster --> Registry (Snapshot, holen, entfernen)
//! ```
//!
//! Registry   – Wer ist verbunden, eine Sperre fuer alle Operationen
//! Broadcaster – `[absender] nachricht` an alle, tote Empfaenger entfernen

pub mod broadcast;
pub mod connection;
pub mod error;
pub mod registry;
pub mod server_state;
pub mod session;
pub mod tcp;

// Bequeme Re-Exporte
pub use broadcast::{BroadcastBericht, Broadcaster};
pub use connection::{ClientConnection, VerbindungsZustand};
pub use error::{SignalingError, SignalingResult};
pub use registry::Registry;
pub use server_state::{SignalingConfig, SignalingState};
pub use session::Sitzung;
pub use tcp::{verbindung_annehmen, SignalingServer};
