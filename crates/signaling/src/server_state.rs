//! Gemeinsamer Server-Zustand fuer den Signaling-Service
//!
//! Haelt alle geteilten Dienste als Arc-Referenzen, die sicher zwischen
//! tokio-Tasks geteilt werden koennen. Generisch ueber das Benutzer-
//! Verzeichnis, damit Tests die In-Memory-Implementierung einsetzen.

use sprechstunde_auth::{BenutzerVerzeichnis, IdentitaetsDienst};
use std::sync::Arc;

use crate::presence::PresenceRegister;
use crate::relay::AnrufVermittlung;

/// Konfiguration fuer den Signaling-Service
#[derive(Debug, Clone)]
pub struct SignalingKonfig {
    /// Maximale gleichzeitige Verbindungen
    pub max_clients: u32,
    /// Timeout fuer den Handshake in Sekunden
    pub handshake_timeout_sek: u64,
}

impl Default for SignalingKonfig {
    fn default() -> Self {
        Self {
            max_clients: 512,
            handshake_timeout_sek: 10,
        }
    }
}

/// Gemeinsamer Server-Zustand (thread-safe, Arc-geteilt)
pub struct SignalingState<V: BenutzerVerzeichnis + 'static> {
    /// Service-Konfiguration
    pub config: Arc<SignalingKonfig>,
    /// Identitaets-Dienst (Token-Pruefung + Benutzer-Nachschlag)
    pub identitaet: Arc<IdentitaetsDienst<V>>,
    /// Presence-Register (wer ist verbunden)
    pub presence: PresenceRegister,
    /// Anruf-Vermittlung (Relay auf Basis des Registers)
    pub vermittlung: AnrufVermittlung,
}

impl<V: BenutzerVerzeichnis + 'static> SignalingState<V> {
    /// Erstellt einen neuen SignalingState
    pub fn neu(konfig: SignalingKonfig, identitaet: Arc<IdentitaetsDienst<V>>) -> Arc<Self> {
        let presence = PresenceRegister::neu();
        let vermittlung = AnrufVermittlung::neu(presence.clone());
        Arc::new(Self {
            config: Arc::new(konfig),
            identitaet,
            presence,
            vermittlung,
        })
    }
}
