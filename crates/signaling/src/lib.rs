//! sprechstunde-signaling – Anruf-Signaling ueber persistente Verbindungen
//!
//! Dieser Crate implementiert den Realtime-Kern: die Zuordnung
//! authentifizierter Benutzer zu lebenden Verbindungen, das
//! Initiate/Accept/Reject-Handshake zwischen Patient und Arzt und das
//! Verbindungs-Gate, das vor jedem Event die Identitaet prueft.
//!
//! ## Architektur
//!
//! ```text
//! TCP Listener (SignalingServer)
//!     |
//!     v
//! ClientVerbindung (pro Verbindung ein Task)
//!     |  Handshake-Gate: erst Token pruefen, dann registrieren
//!     |
//!     v
//! EventDispatcher
//!     |
//!     +-- AnrufVermittlung  (initiate / accept / reject Relay)
//!
//! PresenceRegister – userId -> lebender Verbindungs-Handle
//! ```
//!
//! Der Server haelt keinerlei Anruf-Zustand: jedes Relay ist ein
//! Registry-Lookup plus ein nicht-blockierendes Senden, Best-Effort,
//! stiller Drop wenn das Ziel nicht verbunden ist.

pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod presence;
pub mod relay;
pub mod server_state;
pub mod tcp;

// Bequeme Re-Exporte
pub use connection::ClientVerbindung;
pub use dispatcher::EventDispatcher;
pub use error::{SignalingError, SignalingResult};
pub use presence::{ClientSender, PresenceRegister};
pub use relay::AnrufVermittlung;
pub use server_state::{SignalingKonfig, SignalingState};
pub use tcp::SignalingServer;
