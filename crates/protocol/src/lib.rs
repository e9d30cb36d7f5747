//! sprechstunde-protocol – Wire-Format und Event-Definitionen
//!
//! Definiert das frame-basierte Wire-Format der persistenten Signaling-
//! Verbindung sowie alle Client- und Server-Events. Die Event-Namen und
//! Feldnamen (camelCase) sind vom bestehenden Web-Client vorgegeben.

pub mod signal;
pub mod wire;

// Bequeme Re-Exporte
pub use signal::{
    AnrufAblehnung, AnrufAnnahme, AnrufRichtung, AnrufStart, ClientEvent, HandshakeDaten,
    ServerEvent,
};
pub use wire::{ClientCodec, FrameCodec, ServerCodec, DEFAULT_MAX_FRAME_SIZE};
