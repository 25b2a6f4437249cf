//! schwatz-client – Konsolen-Client fuer den Schwatz-Server
//!
//! Verbindet sich, schickt den Benutzernamen und laesst danach zwei Tasks
//! parallel laufen: einer gibt empfangene Broadcasts aus, der andere
//! schickt jede Konsolenzeile als Nachricht.

pub mod connection;
pub mod error;
pub mod session;

pub use connection::{anmelden, Anmeldung};
pub use error::{ClientError, ClientResult};
pub use session::{sitzung_ausfuehren, Beendigung};
