//! schwatz-protocol – Wire-Format zwischen Client und Server
//!
//! Das Protokoll kennt kein Framing: ein einzelner `read` ist eine
//! Nachricht. Dieses Crate haelt die festen Texte des Handshakes, baut
//! Broadcast-Frames und kapselt das Lesen und Schreiben einzelner
//! Nachrichten.

pub mod handshake;
pub mod wire;

pub use handshake::HandshakeAntwort;
pub use wire::{frame_bauen, nachricht_lesen, nachricht_schreiben, PUFFER_GROESSE};
